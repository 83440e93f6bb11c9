//! Signing capability injected into the engine
//!
//! The engine never touches key material. It is handed something that can
//! turn a 32-byte seal hash into a recoverable signature, either a
//! [`LocalSigner`] over an in-memory key or any closure with the right shape
//! (a keystore, a remote signer, a test double).

use aura_crypto::{CryptoError, PrivateKey};
use aura_types::{Address, SealSignature, H256};
use thiserror::Error;

/// Failure reported by a signing capability.
#[derive(Debug, Error)]
pub enum SignerError {
    /// Signing with a local key failed
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// The signature recovers to an address other than the authorized one
    #[error("signature recovers to {actual}, expected {expected}")]
    WrongKey {
        /// Authorized address
        expected: Address,
        /// Address the signature recovers to
        actual: Address,
    },

    /// The capability declined to sign
    #[error("signing refused: {0}")]
    Refused(String),
}

/// Produces seal signatures over header seal hashes.
pub trait SealSigner: Send + Sync {
    /// Signs `hash`, returning `r || s || v`.
    fn sign_hash(&self, hash: H256) -> Result<SealSignature, SignerError>;
}

impl<F> SealSigner for F
where
    F: Fn(H256) -> Result<SealSignature, SignerError> + Send + Sync,
{
    fn sign_hash(&self, hash: H256) -> Result<SealSignature, SignerError> {
        self(hash)
    }
}

/// Signs with a secp256k1 key held in memory.
#[derive(Debug, Clone)]
pub struct LocalSigner {
    key: PrivateKey,
}

impl LocalSigner {
    /// Wraps `key`.
    pub fn new(key: PrivateKey) -> Self {
        Self { key }
    }

    /// Address the signatures recover to.
    pub fn address(&self) -> Address {
        self.key.address()
    }
}

impl SealSigner for LocalSigner {
    fn sign_hash(&self, hash: H256) -> Result<SealSignature, SignerError> {
        Ok(self.key.sign_prehash(&hash)?.into())
    }
}

//! # Seal Keys
//!
//! Authorities seal headers with recoverable secp256k1 signatures over the
//! header's seal hash. Verifiers never see the public key directly: they
//! recover it from the signature and derive the address from it.
//!
//! ## Example
//!
//! ```rust
//! use aura_crypto::ecdsa::PrivateKey;
//! use aura_types::H256;
//!
//! let key = PrivateKey::random();
//! let digest = H256::keccak256(b"header");
//!
//! let signature = key.sign_prehash(&digest).unwrap();
//! let recovered = signature.recover_prehash(&digest).unwrap();
//! assert_eq!(recovered.to_address(), key.address());
//! ```

use crate::{CryptoError, Result};
use aura_types::{Address, SealSignature, H256, SIGNATURE_LENGTH};
use k256::{
    ecdsa::{RecoveryId, Signature as K256Signature, SigningKey, VerifyingKey},
    elliptic_curve::sec1::ToEncodedPoint,
};
use rand::rngs::OsRng;

/// An authority's secp256k1 signing key.
#[derive(Clone)]
pub struct PrivateKey {
    inner: SigningKey,
}

impl PrivateKey {
    /// Generate a random private key using the OS RNG.
    pub fn random() -> Self {
        Self {
            inner: SigningKey::random(&mut OsRng),
        }
    }

    /// Parses a 32-byte big-endian scalar.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are zero or not below the curve order.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self> {
        SigningKey::from_bytes(bytes.into())
            .map(|inner| Self { inner })
            .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))
    }

    /// Create a private key from a hex string, with or without `0x`.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let bytes = hex::decode(hex.strip_prefix("0x").unwrap_or(hex))?;
        let arr: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| CryptoError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            })?;
        Self::from_bytes(&arr)
    }

    /// Big-endian scalar bytes.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.inner.to_bytes().into()
    }

    /// Matching verifying key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            inner: *self.inner.verifying_key(),
        }
    }

    /// Address of the account controlled by this key.
    pub fn address(&self) -> Address {
        self.public_key().to_address()
    }

    /// Sign a 32-byte digest.
    ///
    /// The result is low-s normalised with a recovery id of 0 or 1.
    pub fn sign_prehash(&self, hash: &H256) -> Result<Signature> {
        let (sig, recovery_id) = self
            .inner
            .sign_prehash_recoverable(hash.as_bytes())
            .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;

        Ok(Signature {
            r: sig.r().to_bytes().into(),
            s: sig.s().to_bytes().into(),
            v: recovery_id.to_byte(),
        })
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("address", &self.address())
            .finish()
    }
}

/// ECDSA public key
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey {
    inner: VerifyingKey,
}

impl PublicKey {
    /// Create a public key from SEC1 bytes (33-byte compressed or 65-byte
    /// uncompressed).
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self> {
        let inner = VerifyingKey::from_sec1_bytes(bytes)
            .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Uncompressed public key bytes (64 bytes, without the 0x04 prefix).
    pub fn to_uncompressed(&self) -> [u8; 64] {
        let encoded = self.inner.to_encoded_point(false);
        let mut xy = [0u8; 64];
        xy.copy_from_slice(&encoded.as_bytes()[1..]);
        xy
    }

    /// Derive the Ethereum-style address of this key.
    pub fn to_address(&self) -> Address {
        Address::from_public_key(&self.to_uncompressed())
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublicKey")
            .field("address", &self.to_address())
            .finish()
    }
}

/// Recoverable signature in `r || s || v` layout
///
/// Contains:
/// - `r` - 32 bytes
/// - `s` - 32 bytes
/// - `v` - recovery ID (0 or 1; 27/28 are accepted and normalised)
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    /// Big-endian r
    pub r: [u8; 32],
    /// Big-endian s, low-half normalised when produced here
    pub s: [u8; 32],
    /// Recovery ID
    pub v: u8,
}

impl Signature {
    /// Assembles a signature from its parts.
    pub fn new(r: [u8; 32], s: [u8; 32], v: u8) -> Self {
        Self { r, s, v }
    }

    /// Splits a 65-byte seal signature.
    pub fn from_bytes(bytes: &[u8; SIGNATURE_LENGTH]) -> Self {
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..64]);
        Self { r, s, v: bytes[64] }
    }

    /// Joins the parts back into seal layout.
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LENGTH] {
        let mut bytes = [0u8; SIGNATURE_LENGTH];
        bytes[..32].copy_from_slice(&self.r);
        bytes[32..64].copy_from_slice(&self.s);
        bytes[64] = self.v;
        bytes
    }

    /// Get the normalized v value (0 or 1 for well-formed signatures).
    pub fn v_normalized(&self) -> u8 {
        if self.v >= 27 {
            self.v - 27
        } else {
            self.v
        }
    }

    fn to_k256_signature(&self) -> Result<K256Signature> {
        let mut bytes = [0u8; 64];
        bytes[..32].copy_from_slice(&self.r);
        bytes[32..].copy_from_slice(&self.s);
        K256Signature::from_bytes((&bytes).into())
            .map_err(|e| CryptoError::InvalidSignature(e.to_string()))
    }

    /// Recover the public key that produced this signature over `hash`.
    pub fn recover_prehash(&self, hash: &H256) -> Result<PublicKey> {
        let sig = self.to_k256_signature()?;
        let recovery_id = RecoveryId::from_byte(self.v_normalized())
            .ok_or_else(|| CryptoError::RecoveryFailed(format!("invalid recovery id {}", self.v)))?;

        let inner = VerifyingKey::recover_from_prehash(hash.as_bytes(), &sig, recovery_id)
            .map_err(|e| CryptoError::RecoveryFailed(e.to_string()))?;
        Ok(PublicKey { inner })
    }
}

impl From<&SealSignature> for Signature {
    fn from(signature: &SealSignature) -> Self {
        Self::from_bytes(signature.as_fixed_bytes())
    }
}

impl From<Signature> for SealSignature {
    fn from(signature: Signature) -> Self {
        SealSignature::new(signature.to_bytes())
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signature")
            .field("r", &hex::encode(self.r))
            .field("s", &hex::encode(self.s))
            .field("v", &self.v)
            .finish()
    }
}

/// Recover the address that produced `signature` over `hash`.
///
/// This is the full pipeline a verifier runs on a sealed header: public key
/// recovery, then keccak of the uncompressed key, low 20 bytes.
pub fn recover_address(hash: &H256, signature: &SealSignature) -> Result<Address> {
    Signature::from(signature)
        .recover_prehash(hash)
        .map(|key| key.to_address())
}

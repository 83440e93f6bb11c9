//! # Aura Crypto
//!
//! secp256k1 primitives used to seal and verify Aura headers.
//!
//! - [`PrivateKey`] signs a header's seal hash.
//! - [`recover_address`] turns a seal signature back into the authority
//!   address that produced it.
//!
//! ## Example
//!
//! ```rust
//! use aura_crypto::{recover_address, PrivateKey};
//! use aura_types::{SealSignature, H256};
//!
//! let key = PrivateKey::random();
//! let seal_hash = H256::keccak256(b"header fields");
//! let signature: SealSignature = key.sign_prehash(&seal_hash).unwrap().into();
//!
//! assert_eq!(recover_address(&seal_hash, &signature).unwrap(), key.address());
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod ecdsa;

pub use ecdsa::{recover_address, PrivateKey, PublicKey, Signature};

/// Key, signature and recovery failures
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// Scalar is zero or not below the curve order
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// Not a point on secp256k1
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Malformed r or s
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// No public key recoverable from the signature
    #[error("recovery failed: {0}")]
    RecoveryFailed(String),

    /// Invalid input length
    #[error("invalid input length: expected {expected}, got {actual}")]
    InvalidLength {
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// Hex decoding error
    #[error("bad hex: {0}")]
    HexError(String),
}

impl From<hex::FromHexError> for CryptoError {
    fn from(e: hex::FromHexError) -> Self {
        CryptoError::HexError(e.to_string())
    }
}

/// Result alias for this crate
pub type Result<T> = std::result::Result<T, CryptoError>;

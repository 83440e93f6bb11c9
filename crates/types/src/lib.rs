//! # Aura Types
//!
//! Header and block types for the Aura proof-of-authority engine.
//!
//! This crate provides:
//! - [`Address`], [`H256`], [`H64`] and [`Bloom`] - fixed-size primitives
//! - [`Header`] - the canonical header with an optional [`Seal`]
//! - [`AuraHeader`] - the wire form peers exchange, convertible to and from
//!   [`Header`] without changing either hash
//! - [`Block`] - header, opaque transactions and ommers
//!
//! ## Example
//!
//! ```rust
//! use aura_types::{AuraHeader, Header, SealSignature};
//!
//! let header = Header { number: 1, timestamp: 1_602_588_556, ..Default::default() };
//! let sealed = header.with_seal(320_517_711, SealSignature::new([0u8; 65]));
//!
//! // The signed digest does not depend on the seal.
//! assert_eq!(header.seal_hash(), sealed.seal_hash());
//!
//! // Wire conversion preserves the block hash.
//! let wire = AuraHeader::from_header(&sealed).unwrap();
//! assert_eq!(wire.hash(), sealed.hash());
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

mod macros;

pub mod address;
pub mod aura;
pub mod block;
pub mod bloom;
pub mod codec;
pub mod hash;
pub mod header;

// Re-export main types at crate root
pub use address::Address;
pub use alloy_primitives::U256;
pub use aura::AuraHeader;
pub use block::Block;
pub use bloom::Bloom;
pub use codec::list_items;
pub use hash::{keccak256, EMPTY_LIST_HASH, H256, H64};
pub use header::{Header, Seal, SealSignature, SIGNATURE_LENGTH};

/// Result type alias for Aura types operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when working with Aura types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid hex string
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// Invalid length for a fixed-size type
    #[error("invalid length: expected {expected}, got {actual}")]
    InvalidLength {
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// Invalid address format
    #[error("invalid address format: {0}")]
    InvalidAddress(String),

    /// Invalid hash format
    #[error("invalid hash format: {0}")]
    InvalidHash(String),

    /// Invalid bloom format
    #[error("invalid bloom format: {0}")]
    InvalidBloom(String),

    /// Invalid seal signature format
    #[error("invalid signature format: {0}")]
    InvalidSignature(String),

    /// A PoW field is set on a header headed for the wire
    #[error("{0} must be zero to encode an Aura header")]
    NonZeroPowField(&'static str),

    /// RLP decoding error
    #[error("RLP decode error: {0}")]
    RlpDecode(#[from] rlp::DecoderError),
}

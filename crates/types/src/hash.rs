//! 32-byte hash type with Keccak256 support, plus the 8-byte PoW nonce.
//!
//! [`H256`] is used for block hashes, seal hashes and every trie root carried
//! in a header. [`H64`] only exists because canonical headers still carry the
//! legacy PoW nonce, which Aura requires to be zero.

use crate::macros::impl_fixed_bytes;
use crate::Error;
use sha3::{Digest, Keccak256};
use std::fmt;

/// Size of a hash in bytes
pub const HASH_SIZE: usize = 32;

/// Keccak256 of the RLP encoding of an empty list (`0xc0`).
///
/// Aura never includes ommers, so every valid header carries this value in
/// its ommers hash field.
pub const EMPTY_LIST_HASH: H256 = H256([
    0x1d, 0xcc, 0x4d, 0xe8, 0xde, 0xc7, 0x5d, 0x7a, 0xab, 0x85, 0xb5, 0x67, 0xb6, 0xcc, 0xd4,
    0x1a, 0xd3, 0x12, 0x45, 0x1b, 0x94, 0x8a, 0x74, 0x13, 0xf0, 0xa1, 0x42, 0xfd, 0x40, 0xd4,
    0x93, 0x47,
]);

/// A 32-byte hash value.
///
/// # Example
///
/// ```rust
/// use aura_types::H256;
///
/// let hash = H256::keccak256(b"hello world");
/// let parsed: H256 = hash.to_hex().parse().unwrap();
/// assert_eq!(hash, parsed);
/// assert_ne!(hash, H256::ZERO);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct H256([u8; HASH_SIZE]);

impl_fixed_bytes!(H256, HASH_SIZE, Error::InvalidHash);

impl H256 {
    /// The zero hash.
    pub const ZERO: Self = Self([0u8; HASH_SIZE]);

    /// Computes the Keccak256 hash of the given data.
    pub fn keccak256(data: &[u8]) -> Self {
        Self(Keccak256::digest(data).into())
    }

    /// Computes the Keccak256 hash of several slices without concatenating them.
    pub fn keccak256_concat(parts: &[&[u8]]) -> Self {
        let mut hasher = Keccak256::new();
        for part in parts {
            hasher.update(part);
        }
        Self(hasher.finalize().into())
    }
}

impl fmt::Debug for H256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H256({})", self.to_hex())
    }
}

impl fmt::Display for H256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<alloy_primitives::B256> for H256 {
    fn from(hash: alloy_primitives::B256) -> Self {
        Self(hash.0)
    }
}

impl From<H256> for alloy_primitives::B256 {
    fn from(hash: H256) -> Self {
        alloy_primitives::B256::from(hash.0)
    }
}

/// The 8-byte nonce of a canonical header.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct H64([u8; 8]);

impl_fixed_bytes!(H64, 8, Error::InvalidHash);

impl H64 {
    /// The zero nonce.
    pub const ZERO: Self = Self([0u8; 8]);
}

impl fmt::Debug for H64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H64({})", self.to_hex())
    }
}

impl fmt::Display for H64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Computes the Keccak256 hash of the given data.
#[inline]
pub fn keccak256(data: &[u8]) -> H256 {
    H256::keccak256(data)
}

//! 2048-bit logs bloom filter.
//!
//! The consensus engine never inspects the bloom; it only carries it through
//! hashing and commits whatever the execution layer computed.

use crate::macros::impl_fixed_bytes;
use crate::Error;
use std::fmt;

/// Size of a logs bloom in bytes
pub const BLOOM_SIZE: usize = 256;

/// Logs bloom filter as stored in a block header.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bloom([u8; BLOOM_SIZE]);

impl_fixed_bytes!(Bloom, BLOOM_SIZE, Error::InvalidBloom);

impl Bloom {
    /// An empty bloom.
    pub const ZERO: Self = Self([0u8; BLOOM_SIZE]);
}

impl Default for Bloom {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Debug for Bloom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            f.write_str("Bloom(empty)")
        } else {
            write!(f, "Bloom({})", self.to_hex())
        }
    }
}

impl fmt::Display for Bloom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

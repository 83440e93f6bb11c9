//! Ethereum-compatible 20-byte address type.
//!
//! Authorities are identified by their address, which is derived from the
//! secp256k1 public key that seals their blocks.

use crate::macros::impl_fixed_bytes;
use crate::Error;
use sha3::{Digest, Keccak256};
use std::fmt;

/// Size of an Ethereum address in bytes
pub const ADDRESS_SIZE: usize = 20;

/// An Ethereum-compatible 20-byte address.
///
/// Displays with the EIP-55 checksum; parsing accepts any casing.
///
/// # Example
///
/// ```rust
/// use aura_types::Address;
///
/// let addr: Address = "0x70ad1a5fba52e27173d23ad87ad97c9bbe249abf".parse().unwrap();
/// assert!(!addr.is_zero());
/// assert_eq!(addr.to_hex(), "0x70ad1a5fba52e27173d23ad87ad97c9bbe249abf");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address([u8; ADDRESS_SIZE]);

impl_fixed_bytes!(Address, ADDRESS_SIZE, Error::InvalidAddress);

impl Address {
    /// The zero address.
    pub const ZERO: Self = Self([0u8; ADDRESS_SIZE]);

    /// Derives an address from a 64-byte uncompressed public key
    /// (the SEC1 encoding without its `0x04` prefix).
    ///
    /// The address is the low 20 bytes of the key's Keccak256 hash.
    pub fn from_public_key(pubkey: &[u8]) -> Self {
        let hash = Keccak256::digest(pubkey);
        let mut bytes = [0u8; ADDRESS_SIZE];
        bytes.copy_from_slice(&hash[12..]);
        Self(bytes)
    }

    /// Computes the EIP-55 mixed-case checksum encoding.
    pub fn to_checksum_string(&self) -> String {
        let lower = hex::encode(self.0);
        let hash = Keccak256::digest(lower.as_bytes());

        let mut out = String::with_capacity(2 + ADDRESS_SIZE * 2);
        out.push_str("0x");
        for (i, c) in lower.chars().enumerate() {
            let nibble = if i % 2 == 0 {
                hash[i / 2] >> 4
            } else {
                hash[i / 2] & 0x0f
            };
            if nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_checksum_string())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum_string())
    }
}

impl From<alloy_primitives::Address> for Address {
    fn from(addr: alloy_primitives::Address) -> Self {
        Self(addr.into_array())
    }
}

impl From<Address> for alloy_primitives::Address {
    fn from(addr: Address) -> Self {
        alloy_primitives::Address::from(addr.0)
    }
}

//! Shared plumbing for the fixed-size byte types.
//!
//! Every fixed-width value in a header (hashes, addresses, the bloom filter,
//! the PoW nonce and the seal signature) needs the same set of conversions:
//! slices, hex strings, RLP and serde. The macro below stamps those out; each
//! type still owns its `Display`/`Debug` so addresses can print checksummed.

macro_rules! impl_fixed_bytes {
    ($name:ident, $len:expr, $hex_err:path) => {
        impl $name {
            /// Number of bytes in this type.
            pub const LEN: usize = $len;

            /// Creates a value from a fixed-size array.
            #[inline]
            pub const fn new(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            /// Creates a value from a slice, failing unless it is exactly
            /// [`Self::LEN`] bytes long.
            pub fn from_slice(slice: &[u8]) -> $crate::Result<Self> {
                let bytes: [u8; $len] =
                    slice
                        .try_into()
                        .map_err(|_| $crate::Error::InvalidLength {
                            expected: $len,
                            actual: slice.len(),
                        })?;
                Ok(Self(bytes))
            }

            /// Returns the raw bytes.
            #[inline]
            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }

            /// Returns the raw bytes as a fixed-size array.
            #[inline]
            pub const fn as_fixed_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// Returns true when every byte is zero.
            #[inline]
            pub fn is_zero(&self) -> bool {
                self.0.iter().all(|b| *b == 0)
            }

            /// Parses a hex string, with or without a `0x` prefix.
            pub fn from_hex(s: &str) -> $crate::Result<Self> {
                let s = s
                    .strip_prefix("0x")
                    .or_else(|| s.strip_prefix("0X"))
                    .unwrap_or(s);
                if s.len() != $len * 2 {
                    return Err($hex_err(format!(
                        "expected {} hex characters, got {}",
                        $len * 2,
                        s.len()
                    )));
                }
                let bytes = hex::decode(s)?;
                Self::from_slice(&bytes)
            }

            /// Lowercase hex with a `0x` prefix.
            pub fn to_hex(&self) -> String {
                format!("0x{}", hex::encode(self.0))
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::Error;

            fn from_str(s: &str) -> $crate::Result<Self> {
                Self::from_hex(s)
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl From<$name> for [u8; $len] {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl std::fmt::LowerHex for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                if f.alternate() {
                    f.write_str("0x")?;
                }
                f.write_str(&hex::encode(self.0))
            }
        }

        impl rlp::Encodable for $name {
            fn rlp_append(&self, s: &mut rlp::RlpStream) {
                s.encoder().encode_value(&self.0);
            }
        }

        impl rlp::Decodable for $name {
            fn decode(rlp: &rlp::Rlp<'_>) -> std::result::Result<Self, rlp::DecoderError> {
                rlp.decoder().decode_value(|bytes| {
                    bytes
                        .try_into()
                        .map(Self)
                        .map_err(|_| rlp::DecoderError::RlpInvalidLength)
                })
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.collect_str(self)
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = <String as serde::Deserialize<'de>>::deserialize(deserializer)?;
                Self::from_hex(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

pub(crate) use impl_fixed_bytes;

//! Canonical block header and the Aura seal it may carry.
//!
//! A [`Header`] holds the fifteen standard Ethereum header fields plus an
//! optional [`Seal`]. Two hashes are defined over it:
//!
//! - [`Header::seal_hash`] covers the first thirteen fields only (everything
//!   except mix digest, nonce and the seal). This is the digest authorities
//!   sign, so attaching or stripping a seal never changes it.
//! - [`Header::hash`] is the block identity. For a sealed header it is the
//!   hash of the Aura wire encoding (thirteen fields, step, signature); for an
//!   unsealed header it is the hash of the fifteen canonical fields.
//!
//! ## Canonical RLP
//!
//! ```text
//! [parent, ommers, coinbase, state, txs, receipts, bloom, difficulty,
//!  number, gas_limit, gas_used, timestamp, extra, mix, nonce, (seal)?]
//! seal = [step as 8 little-endian bytes, 65-byte signature]
//! ```
//!
//! An empty seal list is accepted on decode and treated as "unsealed".

use crate::codec::list_items;
use crate::macros::impl_fixed_bytes;
use crate::{Address, Bloom, Error, Result, H256, H64};
use alloy_primitives::U256;
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of a recoverable secp256k1 signature: `r || s || v`.
pub const SIGNATURE_LENGTH: usize = 65;

/// Number of header fields covered by the seal hash.
pub(crate) const SEAL_HASH_FIELDS: usize = 13;

/// Number of fields in a canonical header without its seal.
const CANONICAL_FIELDS: usize = 15;

/// A 65-byte recoverable ECDSA signature over a header's seal hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SealSignature([u8; SIGNATURE_LENGTH]);

impl_fixed_bytes!(SealSignature, SIGNATURE_LENGTH, Error::InvalidSignature);

impl SealSignature {
    /// Returns the recovery id byte.
    pub fn v(&self) -> u8 {
        self.0[SIGNATURE_LENGTH - 1]
    }
}

impl fmt::Debug for SealSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SealSignature({})", self.to_hex())
    }
}

impl fmt::Display for SealSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Step and signature attached to a header by its sealing authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Seal {
    /// Time slot the header was sealed in (`timestamp / period`).
    pub step: u64,
    /// Signature over the header's seal hash.
    pub signature: SealSignature,
}

impl Seal {
    /// Creates a new seal.
    pub fn new(step: u64, signature: SealSignature) -> Self {
        Self { step, signature }
    }
}

/// A canonical block header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Hash of the parent block
    pub parent_hash: H256,
    /// Hash of the ommers list (always the empty-list hash under Aura)
    pub ommers_hash: H256,
    /// Beneficiary; the sealing authority under Aura
    pub coinbase: Address,
    /// World state root after executing this block
    pub state_root: H256,
    /// Transactions trie root
    pub transactions_root: H256,
    /// Receipts trie root
    pub receipts_root: H256,
    /// Logs bloom filter
    pub logs_bloom: Bloom,
    /// Block difficulty, derived from the step gap to the parent
    pub difficulty: U256,
    /// Block number
    pub number: u64,
    /// Gas limit
    pub gas_limit: u64,
    /// Gas used
    pub gas_used: u64,
    /// Unix timestamp in seconds
    pub timestamp: u64,
    /// Arbitrary extra data
    #[serde(with = "hex_bytes")]
    pub extra_data: Vec<u8>,
    /// PoW mix digest, zero under Aura
    pub mix_hash: H256,
    /// PoW nonce, zero under Aura
    pub nonce: H64,
    /// Aura seal, absent until the header is signed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seal: Option<Seal>,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            parent_hash: H256::ZERO,
            ommers_hash: crate::EMPTY_LIST_HASH,
            coinbase: Address::ZERO,
            state_root: H256::ZERO,
            transactions_root: H256::ZERO,
            receipts_root: H256::ZERO,
            logs_bloom: Bloom::ZERO,
            difficulty: U256::ZERO,
            number: 0,
            gas_limit: 0,
            gas_used: 0,
            timestamp: 0,
            extra_data: Vec::new(),
            mix_hash: H256::ZERO,
            nonce: H64::ZERO,
            seal: None,
        }
    }
}

impl Header {
    /// Hash of the first thirteen fields; the digest an authority signs.
    pub fn seal_hash(&self) -> H256 {
        let mut s = RlpStream::new_list(SEAL_HASH_FIELDS);
        self.append_seal_fields(&mut s);
        H256::keccak256(&s.out())
    }

    /// Block identity hash.
    ///
    /// Sealed headers hash as their wire form; unsealed headers hash as the
    /// fifteen canonical fields.
    pub fn hash(&self) -> H256 {
        match &self.seal {
            Some(seal) => {
                let mut s = RlpStream::new_list(SEAL_HASH_FIELDS + 2);
                self.append_seal_fields(&mut s);
                s.append(&seal.step);
                s.append(&seal.signature);
                H256::keccak256(&s.out())
            }
            None => {
                let mut s = RlpStream::new_list(CANONICAL_FIELDS);
                self.append_seal_fields(&mut s);
                s.append(&self.mix_hash);
                s.append(&self.nonce);
                H256::keccak256(&s.out())
            }
        }
    }

    /// The sealed step, if any.
    pub fn step(&self) -> Option<u64> {
        self.seal.map(|seal| seal.step)
    }

    /// Returns true once a seal is attached.
    pub fn is_sealed(&self) -> bool {
        self.seal.is_some()
    }

    /// Returns a copy of this header carrying the given seal.
    pub fn with_seal(&self, step: u64, signature: SealSignature) -> Self {
        let mut sealed = self.clone();
        sealed.seal = Some(Seal::new(step, signature));
        sealed
    }

    /// Returns true if both PoW fields are zero.
    pub fn has_empty_pow_fields(&self) -> bool {
        self.mix_hash.is_zero() && self.nonce.is_zero()
    }

    /// RLP encodes the header in canonical form.
    pub fn rlp_encode(&self) -> Vec<u8> {
        rlp::encode(self).to_vec()
    }

    /// Decodes a canonical header from RLP bytes.
    pub fn rlp_decode(data: &[u8]) -> Result<Self> {
        rlp::decode(data).map_err(Error::RlpDecode)
    }

    /// Appends the thirteen fields shared by the seal hash, the canonical
    /// encoding and the wire encoding.
    pub(crate) fn append_seal_fields(&self, s: &mut RlpStream) {
        s.append(&self.parent_hash);
        s.append(&self.ommers_hash);
        s.append(&self.coinbase);
        s.append(&self.state_root);
        s.append(&self.transactions_root);
        s.append(&self.receipts_root);
        s.append(&self.logs_bloom);
        append_u256(s, &self.difficulty);
        s.append(&self.number);
        s.append(&self.gas_limit);
        s.append(&self.gas_used);
        s.append(&self.timestamp);
        s.append(&self.extra_data);
    }

    /// Reads the thirteen shared fields; PoW fields are zero and no seal is set.
    pub(crate) fn decode_seal_fields(rlp: &Rlp<'_>) -> std::result::Result<Self, DecoderError> {
        Ok(Self {
            parent_hash: rlp.val_at(0)?,
            ommers_hash: rlp.val_at(1)?,
            coinbase: rlp.val_at(2)?,
            state_root: rlp.val_at(3)?,
            transactions_root: rlp.val_at(4)?,
            receipts_root: rlp.val_at(5)?,
            logs_bloom: rlp.val_at(6)?,
            difficulty: decode_u256(&rlp.at(7)?)?,
            number: rlp.val_at(8)?,
            gas_limit: rlp.val_at(9)?,
            gas_used: rlp.val_at(10)?,
            timestamp: rlp.val_at(11)?,
            extra_data: rlp.val_at(12)?,
            mix_hash: H256::ZERO,
            nonce: H64::ZERO,
            seal: None,
        })
    }
}

impl Encodable for Header {
    fn rlp_append(&self, s: &mut RlpStream) {
        let len = if self.seal.is_some() {
            CANONICAL_FIELDS + 1
        } else {
            CANONICAL_FIELDS
        };
        s.begin_list(len);
        self.append_seal_fields(s);
        s.append(&self.mix_hash);
        s.append(&self.nonce);
        if let Some(seal) = &self.seal {
            s.begin_list(2);
            s.append(&seal.step.to_le_bytes().as_slice());
            s.append(&seal.signature);
        }
    }
}

impl Decodable for Header {
    fn decode(rlp: &Rlp<'_>) -> std::result::Result<Self, DecoderError> {
        let count = list_items(rlp)?.len();
        if count != CANONICAL_FIELDS && count != CANONICAL_FIELDS + 1 {
            return Err(DecoderError::RlpIncorrectListLen);
        }

        let mut header = Self::decode_seal_fields(rlp)?;
        header.mix_hash = rlp.val_at(13)?;
        header.nonce = rlp.val_at(14)?;

        if count == CANONICAL_FIELDS + 1 {
            header.seal = decode_canonical_seal(&rlp.at(CANONICAL_FIELDS)?)?;
        }
        Ok(header)
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Header #{} (hash: {}", self.number, self.hash())?;
        if let Some(step) = self.step() {
            write!(f, ", step: {}", step)?;
        }
        write!(f, ", parent: {})", self.parent_hash)
    }
}

fn decode_canonical_seal(rlp: &Rlp<'_>) -> std::result::Result<Option<Seal>, DecoderError> {
    match list_items(rlp)?.len() {
        0 => Ok(None),
        2 => {
            let step_bytes: Vec<u8> = rlp.val_at(0)?;
            let step_bytes: [u8; 8] = step_bytes
                .as_slice()
                .try_into()
                .map_err(|_| DecoderError::RlpInvalidLength)?;
            Ok(Some(Seal {
                step: u64::from_le_bytes(step_bytes),
                signature: rlp.val_at(1)?,
            }))
        }
        _ => Err(DecoderError::RlpIncorrectListLen),
    }
}

/// Appends a 256-bit integer as a minimal big-endian RLP string.
pub(crate) fn append_u256(s: &mut RlpStream, value: &U256) {
    s.encoder().encode_value(&value.to_be_bytes_trimmed_vec());
}

/// Decodes a minimal big-endian RLP integer into a `U256`.
pub(crate) fn decode_u256(rlp: &Rlp<'_>) -> std::result::Result<U256, DecoderError> {
    if !rlp.is_data() {
        return Err(DecoderError::RlpExpectedToBeData);
    }
    let bytes = rlp.data()?;
    if bytes.first() == Some(&0) {
        return Err(DecoderError::RlpInvalidIndirection);
    }
    U256::try_from_be_slice(bytes).ok_or(DecoderError::RlpIsTooBig)
}

/// Serde helper for serializing bytes as hex.
mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let s = s.strip_prefix("0x").unwrap_or(&s);
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}

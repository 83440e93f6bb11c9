//! Wire form of a sealed header as exchanged between Aura peers.
//!
//! On the wire a header drops the PoW mix digest and nonce and carries the
//! seal inline instead:
//!
//! ```text
//! [parent, ommers, coinbase, state, txs, receipts, bloom, difficulty,
//!  number, gas_limit, gas_used, timestamp, extra, step, signature]
//! ```
//!
//! `step` is a plain RLP integer here, unlike the 8-byte little-endian form
//! inside the canonical seal list. A thirteen-item list is an unsealed wire
//! header.
//!
//! [`AuraHeader`] wraps a canonical [`Header`] whose PoW fields are zero,
//! which is what makes conversion in both directions lossless: hashing the
//! wire bytes and hashing the converted canonical header give the same
//! result, and so do the seal hashes.

use crate::header::SEAL_HASH_FIELDS;
use crate::codec::list_items;
use crate::{Error, Header, Result, Seal, SealSignature, H256};
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};

/// A header in Aura wire format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuraHeader(Header);

impl AuraHeader {
    /// Converts a canonical header to wire form.
    ///
    /// Fails with [`Error::NonZeroPowField`] when the mix digest or nonce is
    /// set, since the wire form has nowhere to put them.
    pub fn from_header(header: &Header) -> Result<Self> {
        if !header.mix_hash.is_zero() {
            return Err(Error::NonZeroPowField("mix_hash"));
        }
        if !header.nonce.is_zero() {
            return Err(Error::NonZeroPowField("nonce"));
        }
        Ok(Self(header.clone()))
    }

    /// The canonical view of this header.
    pub fn header(&self) -> &Header {
        &self.0
    }

    /// Consumes the wire header, yielding the canonical header.
    pub fn into_header(self) -> Header {
        self.0
    }

    /// Sealed step, if present.
    pub fn step(&self) -> Option<u64> {
        self.0.step()
    }

    /// Seal signature, if present.
    pub fn signature(&self) -> Option<&SealSignature> {
        self.0.seal.as_ref().map(|seal| &seal.signature)
    }

    /// Block identity hash, identical to [`Header::hash`] of the canonical
    /// form. For a sealed header this is the hash of the wire encoding.
    pub fn hash(&self) -> H256 {
        self.0.hash()
    }

    /// Digest signed by the sealing authority.
    pub fn seal_hash(&self) -> H256 {
        self.0.seal_hash()
    }

    /// Encodes this header alone.
    pub fn rlp_encode(&self) -> Vec<u8> {
        rlp::encode(self).to_vec()
    }

    /// Decodes a single wire header.
    pub fn rlp_decode(data: &[u8]) -> Result<Self> {
        rlp::decode(data).map_err(Error::RlpDecode)
    }

    /// Decodes an RLP list of wire headers, as found in a peer's
    /// block-headers message.
    pub fn decode_batch(data: &[u8]) -> Result<Vec<Self>> {
        list_items(&Rlp::new(data))?
            .iter()
            .map(|item| Self::decode(item).map_err(Error::RlpDecode))
            .collect()
    }

    /// Encodes a list of wire headers.
    pub fn encode_batch(headers: &[Self]) -> Vec<u8> {
        let mut s = RlpStream::new_list(headers.len());
        for header in headers {
            s.append(header);
        }
        s.out().to_vec()
    }
}

impl TryFrom<&Header> for AuraHeader {
    type Error = Error;

    fn try_from(header: &Header) -> Result<Self> {
        Self::from_header(header)
    }
}

impl From<AuraHeader> for Header {
    fn from(header: AuraHeader) -> Self {
        header.0
    }
}

impl From<&AuraHeader> for Header {
    fn from(header: &AuraHeader) -> Self {
        header.0.clone()
    }
}

impl Encodable for AuraHeader {
    fn rlp_append(&self, s: &mut RlpStream) {
        match &self.0.seal {
            Some(seal) => {
                s.begin_list(SEAL_HASH_FIELDS + 2);
                self.0.append_seal_fields(s);
                s.append(&seal.step);
                s.append(&seal.signature);
            }
            None => {
                s.begin_list(SEAL_HASH_FIELDS);
                self.0.append_seal_fields(s);
            }
        }
    }
}

impl Decodable for AuraHeader {
    fn decode(rlp: &Rlp<'_>) -> std::result::Result<Self, DecoderError> {
        let count = list_items(rlp)?.len();
        if count != SEAL_HASH_FIELDS && count != SEAL_HASH_FIELDS + 2 {
            return Err(DecoderError::RlpIncorrectListLen);
        }

        let mut header = Header::decode_seal_fields(rlp)?;
        if count == SEAL_HASH_FIELDS + 2 {
            header.seal = Some(Seal {
                step: rlp.val_at(SEAL_HASH_FIELDS)?,
                signature: rlp.val_at(SEAL_HASH_FIELDS + 1)?,
            });
        }
        Ok(Self(header))
    }
}

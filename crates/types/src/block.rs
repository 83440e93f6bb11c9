//! Block container: header, transactions and ommers.
//!
//! Transaction bodies belong to the execution layer, so a [`Block`] keeps
//! them as opaque RLP items and only guarantees they survive a round trip
//! byte for byte.

use crate::codec::list_items;
use crate::{Error, Header, Result, SealSignature, H256};
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use std::fmt;

/// A block as passed between the sealing engine and the chain machinery.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Block {
    /// The block header
    pub header: Header,
    /// Raw RLP of each transaction, in block order
    pub transactions: Vec<Vec<u8>>,
    /// Ommer headers; always empty for Aura blocks
    pub ommers: Vec<Header>,
}

impl Block {
    /// Creates a block without ommers.
    pub fn new(header: Header, transactions: Vec<Vec<u8>>) -> Self {
        Self {
            header,
            transactions,
            ommers: Vec::new(),
        }
    }

    /// Creates an empty block with the given header.
    pub fn empty(header: Header) -> Self {
        Self::new(header, Vec::new())
    }

    /// Returns the block hash (hash of the header).
    pub fn hash(&self) -> H256 {
        self.header.hash()
    }

    /// Returns the block number.
    pub fn number(&self) -> u64 {
        self.header.number
    }

    /// Returns a copy of this block whose header carries the given seal.
    ///
    /// The receiver is left untouched so other holders of the unsealed block
    /// never observe the change.
    pub fn with_seal(&self, step: u64, signature: SealSignature) -> Self {
        Self {
            header: self.header.with_seal(step, signature),
            transactions: self.transactions.clone(),
            ommers: self.ommers.clone(),
        }
    }

    /// RLP encodes the block as `[header, [txs...], [ommers...]]`.
    pub fn rlp_encode(&self) -> Vec<u8> {
        rlp::encode(self).to_vec()
    }

    /// Decodes a block from RLP bytes.
    pub fn rlp_decode(data: &[u8]) -> Result<Self> {
        rlp::decode(data).map_err(Error::RlpDecode)
    }
}

impl Encodable for Block {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(3);
        s.append(&self.header);
        s.begin_list(self.transactions.len());
        for tx in &self.transactions {
            s.append_raw(tx, 1);
        }
        s.begin_list(self.ommers.len());
        for ommer in &self.ommers {
            s.append(ommer);
        }
    }
}

impl Decodable for Block {
    fn decode(rlp: &Rlp<'_>) -> std::result::Result<Self, DecoderError> {
        let parts = list_items(rlp)?;
        if parts.len() != 3 {
            return Err(DecoderError::RlpIncorrectListLen);
        }

        let transactions = list_items(&parts[1])?
            .iter()
            .map(|tx| tx.as_raw().to_vec())
            .collect();
        let ommers = list_items(&parts[2])?
            .iter()
            .map(Header::decode)
            .collect::<std::result::Result<_, _>>()?;

        Ok(Self {
            header: Header::decode(&parts[0])?,
            transactions,
            ommers,
        })
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Block #{} (hash: {}, {} txs)",
            self.header.number,
            self.hash(),
            self.transactions.len()
        )
    }
}

//! Block header messages from peers
//!
//! Aura peers send `BlockHeaders` payloads whose items are wire headers:
//! thirteen canonical fields followed by step and signature. Peers running
//! the canonical encoding send fifteen or sixteen field headers instead.
//! Both shapes are accepted and normalised to [`Header`].

use aura_types::{list_items, AuraHeader, Header, SIGNATURE_LENGTH};
use bytes::Bytes;
use rlp::Rlp;
use tracing::{debug, warn};

use crate::error::{AuraError, Result};

/// Message code of a `BlockHeaders` reply.
pub const BLOCK_HEADERS_MSG: u64 = 0x04;

// Index of the signature in a sealed wire header.
const WIRE_SIGNATURE_INDEX: usize = 14;

/// A framed peer message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct P2pMessage {
    /// Protocol message code
    pub code: u64,
    /// RLP payload
    pub payload: Bytes,
}

impl P2pMessage {
    /// Builds a `BlockHeaders` message carrying `headers` in wire form.
    pub fn block_headers(headers: &[AuraHeader]) -> Self {
        Self {
            code: BLOCK_HEADERS_MSG,
            payload: Bytes::from(AuraHeader::encode_batch(headers)),
        }
    }
}

/// Decodes the canonical headers carried by a `BlockHeaders` message.
pub fn headers_from_message(msg: &P2pMessage) -> Result<Vec<Header>> {
    if msg.code != BLOCK_HEADERS_MSG {
        warn!(code = msg.code, "unexpected message code for headers");
        return Err(AuraError::UnexpectedMessage(msg.code));
    }

    let list = Rlp::new(&msg.payload);
    let items = list_items(&list).map_err(aura_types::Error::from)?;
    // Nothing may follow the list.
    if list.as_raw().len() != list.payload_info().map_err(aura_types::Error::from)?.total() {
        return Err(AuraError::Codec(
            rlp::DecoderError::RlpInconsistentLengthAndData.into(),
        ));
    }

    let mut headers = Vec::with_capacity(items.len());
    for item in &items {
        let header = if is_wire_header(item)? {
            AuraHeader::rlp_decode(item.as_raw())?.into_header()
        } else {
            Header::rlp_decode(item.as_raw())?
        };
        headers.push(header);
    }

    debug!(count = headers.len(), "decoded block headers");
    Ok(headers)
}

fn is_wire_header(item: &Rlp<'_>) -> Result<bool> {
    let fields = list_items(item).map_err(aura_types::Error::from)?;
    Ok(match fields.len() {
        13 => true,
        15 => {
            let last = fields[WIRE_SIGNATURE_INDEX]
                .data()
                .map_err(aura_types::Error::from)?;
            last.len() == SIGNATURE_LENGTH
        }
        _ => false,
    })
}

//! Strict access to RLP list items.
//!
//! `Rlp::iter` and `Rlp::item_count` stop at the first item that fails to
//! parse and report a shorter list instead of an error. Every list decoded
//! from untrusted bytes goes through [`list_items`], which rejects a payload
//! that is not fully covered by its items.

use rlp::{DecoderError, Rlp};

/// Items of the RLP list `rlp`.
///
/// Fails with `RlpInconsistentLengthAndData` when the items do not consume
/// the whole list payload.
pub fn list_items<'a>(rlp: &Rlp<'a>) -> Result<Vec<Rlp<'a>>, DecoderError> {
    if !rlp.is_list() {
        return Err(DecoderError::RlpExpectedToBeList);
    }
    let payload = rlp.payload_info()?.value_len;
    let items: Vec<Rlp<'a>> = rlp.iter().collect();
    let consumed: usize = items.iter().map(|item| item.as_raw().len()).sum();
    if consumed != payload {
        return Err(DecoderError::RlpInconsistentLengthAndData);
    }
    Ok(items)
}

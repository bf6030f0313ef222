// Copyright 2026, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Slot addresses, slot-sized reads and writes, and the storage collaborator
//! boundary.
//!
//! The codec never touches a node itself: hosts hand it raw 32-byte words
//! through [`StorageReader`] and receive [`SlotWrite`] batches to commit.
//! Everything in between is address arithmetic over [`U256`] slot keys.

use alloy_primitives::{keccak256, B256, U256};
use serde::Serialize;

use crate::layout::TypeDescriptor;

/// External "get raw storage slot" collaborator.
///
/// Reading dynamic types is a two-phase protocol: the resolver first fetches
/// a length/marker word through this trait, and only then knows which
/// content slots to emit. The two phases are strictly sequential. Any
/// timeout or retry policy belongs to the implementor, not the codec.
pub trait StorageReader {
    /// Returns the raw 32-byte word stored at `slot`.
    fn get_word(&self, slot: U256) -> B256;
}

impl<T: StorageReader + ?Sized> StorageReader for &T {
    fn get_word(&self, slot: U256) -> B256 {
        (**self).get_word(slot)
    }
}

/// One 32-byte word to commit to storage. Serializes its fields as
/// lowercase `0x`-prefixed 64-hex-digit strings for the external
/// "set raw storage slot" collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SlotWrite {
    /// The slot address.
    pub key: B256,
    /// The full word to store there.
    pub val: B256,
}

/// One slot the host must fetch so the decoder can reconstruct a value.
/// `length`, `label`, and `offset` are populated per encoding kind; the
/// decoder fails `MalformedInput` when a field its kind requires is absent.
#[derive(Clone, Debug)]
pub struct SlotRead<'a> {
    /// The slot address.
    pub key: B256,
    /// Descriptor of the value (or value fragment) stored at `key`.
    pub ty: &'a TypeDescriptor,
    /// Content byte count, for dynamic bytes/strings and array length slots.
    pub length: Option<usize>,
    /// Source label of the variable or member this read belongs to.
    pub label: Option<String>,
    /// Byte offset of the value within the word, from the low-order end.
    pub offset: Option<usize>,
}

/// A single pre-merge write: the word to store plus a lane mask recording
/// exactly which of its 32 bytes the encoder set. The mask is what lets
/// [`crate::merge`] combine packed neighbors without guessing whether a
/// zero byte is data or an untouched lane.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteOp {
    /// The slot address.
    pub slot: U256,
    /// The word, zero outside the masked lanes.
    pub word: B256,
    /// `0xff` for every byte of `word` the encoder wrote.
    pub mask: B256,
}

impl WriteOp {
    /// A write that owns its entire slot.
    pub(crate) fn full(slot: U256, word: B256) -> Self {
        Self {
            slot,
            word,
            mask: B256::from([0xff; 32]),
        }
    }

    /// A write of `bytes.len()` bytes ending `offset` bytes from the
    /// low-order end of the slot.
    pub(crate) fn lane(slot: U256, offset: usize, bytes: &[u8]) -> Self {
        debug_assert!(offset + bytes.len() <= 32);
        let start = 32 - offset - bytes.len();
        let mut word = B256::ZERO;
        let mut mask = B256::ZERO;
        word[start..start + bytes.len()].copy_from_slice(bytes);
        mask[start..start + bytes.len()].fill(0xff);
        Self { slot, word, mask }
    }
}

/// Where a dynamic type's content starts: `keccak256(slot)`.
pub(crate) fn hashed_base(slot: U256) -> U256 {
    keccak256(slot.to_be_bytes::<32>()).into()
}

/// The slot holding a mapping's value for an encoded key:
/// `keccak256(key_word ++ slot_word)`.
pub(crate) fn mapping_slot(key_word: B256, slot: U256) -> U256 {
    let data = key_word.concat_const::<32, 64>(slot.into());
    keccak256(data).into()
}

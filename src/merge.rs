// Copyright 2026, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Combines partial writes landing in the same slot into one word each.
//!
//! The encoder emits one [`WriteOp`] per value fragment, so several packed
//! neighbors produce several writes to the same slot. Each op carries the
//! lane mask of the bytes it actually set; merging ORs disjoint lanes
//! together and rejects any overlap as [`Error::BadPackedEncoding`]. Masks
//! make the overlap check exact: a data byte of `0x00` or `0xff` is never
//! confused with an untouched lane.

use std::collections::{hash_map::Entry, HashMap};

use alloy_primitives::U256;

use crate::{
    error::{Error, Result},
    slots::{SlotWrite, WriteOp},
};

/// Merges pre-merge writes into at most one [`SlotWrite`] per slot,
/// preserving the order slots first appeared in.
pub fn merge(ops: Vec<WriteOp>) -> Result<Vec<SlotWrite>> {
    let mut order: Vec<U256> = Vec::new();
    let mut merged: HashMap<U256, WriteOp> = HashMap::with_capacity(ops.len());

    for op in ops {
        match merged.entry(op.slot) {
            Entry::Vacant(vacant) => {
                order.push(op.slot);
                vacant.insert(op);
            }
            Entry::Occupied(mut occupied) => {
                let current = occupied.get_mut();
                if current
                    .mask
                    .iter()
                    .zip(op.mask.iter())
                    .any(|(a, b)| a & b != 0)
                {
                    return Err(Error::BadPackedEncoding(op.slot.into()));
                }
                for i in 0..32 {
                    current.word[i] |= op.word[i];
                    current.mask[i] |= op.mask[i];
                }
            }
        }
    }

    log::trace!("merged writes into {} slots", order.len());
    Ok(order
        .into_iter()
        .map(|slot| {
            let op = merged.remove(&slot).expect("slot was inserted above");
            SlotWrite {
                key: slot.into(),
                val: op.word,
            }
        })
        .collect())
}

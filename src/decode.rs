// Copyright 2026, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Reconstructs typed values from resolved slot reads and their raw words.
//!
//! The decoder consumes the flat list [`crate::resolve`] produced, paired
//! with the 32-byte word the host fetched for each read, and mirrors the
//! encoder's placement rules in reverse. Composites rely on the resolver's
//! root-slot-first ordering: a struct's placeholder, a long byte string's
//! marker, or an array's length word tells the decoder how many of the
//! following reads belong to it.

use alloy_primitives::{Address, B256, I256, U256};

use crate::{
    error::{Error, Result},
    layout::{EncodingKind, ScalarKind, StorageLayout},
    slots::SlotRead,
    value::Value,
};

/// Decodes one variable's resolved reads (paired with their fetched words)
/// back into a typed value. Fails `MalformedInput` when reads are missing,
/// left over, or lack a field their kind requires.
pub fn decode(layout: &StorageLayout, slots: &[(SlotRead<'_>, B256)]) -> Result<Value> {
    if slots.is_empty() {
        return Err(Error::MalformedInput("no slot reads to decode".to_string()));
    }
    let (value, used) = decode_value(layout, slots)?;
    if used != slots.len() {
        return Err(Error::MalformedInput(format!(
            "{} slot reads left over after decoding",
            slots.len() - used
        )));
    }
    Ok(value)
}

/// Decodes the value starting at `slots[0]`, returning it along with the
/// number of reads consumed.
fn decode_value(
    layout: &StorageLayout,
    slots: &[(SlotRead<'_>, B256)],
) -> Result<(Value, usize)> {
    let (read, word) = slots.first().ok_or_else(|| {
        Error::MalformedInput("slot reads truncated mid-value".to_string())
    })?;
    match read.ty.encoding()? {
        EncodingKind::Inplace => match &read.ty.members {
            Some(members) => {
                // skip the placeholder, then one value per member in
                // declaration order (mapping members were never resolved)
                let mut fields = std::collections::BTreeMap::new();
                let mut used = 1;
                for member in members {
                    let member_ty = layout.type_of(&member.type_id)?;
                    if member_ty.encoding()? == EncodingKind::Mapping {
                        continue;
                    }
                    let (value, consumed) = decode_value(layout, &slots[used..])?;
                    fields.insert(member.label.clone(), value);
                    used += consumed;
                }
                Ok((Value::Struct(fields), used))
            }
            None => Ok((decode_scalar(read, word)?, 1)),
        },
        EncodingKind::Bytes => {
            let length = required(read.length, read, "length")?;
            let data = if length <= 31 {
                word[..length].to_vec()
            } else {
                let content_slots = length.div_ceil(32);
                if slots.len() <= content_slots {
                    return Err(Error::MalformedInput(format!(
                        "byte string of {length} bytes needs {content_slots} content slots"
                    )));
                }
                let mut data = Vec::with_capacity(length);
                for (content_read, content_word) in &slots[1..=content_slots] {
                    let take = required(content_read.length, content_read, "length")?;
                    data.extend_from_slice(&content_word[..take.min(32)]);
                }
                data
            };
            let used = if length <= 31 { 1 } else { 1 + length.div_ceil(32) };
            if read.ty.label == "string" {
                let text = String::from_utf8(data).map_err(|_| {
                    Error::MalformedInput(format!(
                        "`{}` holds invalid UTF-8",
                        read.label.as_deref().unwrap_or("string")
                    ))
                })?;
                Ok((Value::String(text), used))
            } else {
                Ok((Value::Bytes(data), used))
            }
        }
        EncodingKind::Mapping => Err(Error::ResolverRequiresKey(
            read.label
                .clone()
                .unwrap_or_else(|| read.ty.label.clone()),
        )),
        EncodingKind::DynamicArray => {
            let length = required(read.length, read, "length")?;
            let mut items = Vec::with_capacity(length);
            let mut used = 1;
            for _ in 0..length {
                let (value, consumed) = decode_value(layout, &slots[used.min(slots.len())..])?;
                items.push(value);
                used += consumed;
            }
            Ok((Value::Array(items), used))
        }
    }
}

/// Decodes an inplace scalar from its byte lane within the word.
fn decode_scalar(read: &SlotRead<'_>, word: &B256) -> Result<Value> {
    let offset = required(read.offset, read, "offset")?;
    let bytes = read.ty.number_of_bytes()?;
    if offset + bytes > 32 {
        return Err(Error::MalformedInput(format!(
            "`{}` does not fit its slot: {bytes} bytes at offset {offset}",
            read.ty.label
        )));
    }
    let lane = &word[32 - offset - bytes..32 - offset];
    Ok(match read.ty.scalar_kind()? {
        ScalarKind::Address => Value::Address(Address::from_slice(lane)),
        ScalarKind::Bool => Value::Bool(lane[bytes - 1] != 0),
        ScalarKind::FixedBytes(_) => Value::FixedBytes(lane.to_vec()),
        ScalarKind::Uint(_) => Value::Uint(U256::from_be_slice(lane)),
        ScalarKind::Int(_) => {
            // sign-extend the lane to the full two's complement width
            let mut extended = if lane[0] & 0x80 != 0 { [0xff; 32] } else { [0; 32] };
            extended[32 - bytes..].copy_from_slice(lane);
            Value::Int(I256::from_be_bytes(extended))
        }
    })
}

fn required<T>(field: Option<T>, read: &SlotRead<'_>, name: &str) -> Result<T> {
    field.ok_or_else(|| {
        Error::MalformedInput(format!(
            "slot read for `{}` is missing its {name}",
            read.label.as_deref().unwrap_or(&read.ty.label)
        ))
    })
}

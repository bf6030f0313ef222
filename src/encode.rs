// Copyright 2026, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Turns value trees into flat lists of slot writes.
//!
//! Encoding mirrors the compiler's layout algorithm exactly: packed scalars
//! land in their byte lane, structs add their members' relative slots,
//! mappings hash their keys into child slots, and dynamic bytes/arrays use
//! the short/long and `keccak256(slot)` content rules. The per-assignment
//! [`WriteOp`]s are then merged into one word per slot; callers should
//! commit the resulting batch atomically.

use alloy_primitives::{B256, U256};

use crate::{
    error::{Error, Result},
    layout::{parse_slot, EncodingKind, ScalarKind, StorageLayout, TypeDescriptor},
    merge::merge,
    slots::{hashed_base, mapping_slot, SlotWrite, WriteOp},
    value::Value,
};

/// Encodes a set of assignments (variable name to value) into the minimal
/// merged batch of slot writes.
pub fn compute_writes(
    layout: &StorageLayout,
    assignments: &[(&str, Value)],
) -> Result<Vec<SlotWrite>> {
    let mut ops = Vec::new();
    for (name, value) in assignments {
        let entry = layout.entry(name)?;
        let ty = layout.type_of(&entry.type_id)?;
        encode_value(layout, ty, entry.base_slot()?, entry.offset, value, &mut ops)?;
    }
    log::debug!(
        "encoded {} assignments into {} writes",
        assignments.len(),
        ops.len()
    );
    merge(ops)
}

/// Recursively encodes one value at a base slot and byte offset.
fn encode_value(
    layout: &StorageLayout,
    ty: &TypeDescriptor,
    base: U256,
    offset: usize,
    value: &Value,
    ops: &mut Vec<WriteOp>,
) -> Result<()> {
    match ty.encoding()? {
        EncodingKind::Inplace => match &ty.members {
            Some(members) => {
                let Value::Struct(fields) = value else {
                    return Err(mismatch(ty, value, "a struct"));
                };
                for (label, field) in fields {
                    let member = members
                        .iter()
                        .find(|member| &member.label == label)
                        .ok_or_else(|| {
                            Error::VariableNotFound(format!("{}.{label}", ty.label))
                        })?;
                    let member_ty = layout.type_of(&member.type_id)?;
                    let member_base = base.wrapping_add(parse_slot(&member.slot)?);
                    encode_value(layout, member_ty, member_base, member.offset, field, ops)?;
                }
                Ok(())
            }
            None => {
                let lane = encode_scalar(ty, value)?;
                ops.push(WriteOp::lane(base, offset, &lane));
                Ok(())
            }
        },
        EncodingKind::Bytes => {
            let data = value.to_byte_string(&ty.label, ty.label == "string")?;
            if data.len() <= 31 {
                // short form: content left-aligned, low byte holds 2*len
                let mut word = B256::ZERO;
                word[..data.len()].copy_from_slice(&data);
                word[31] = (data.len() * 2) as u8;
                ops.push(WriteOp::full(base, word));
            } else {
                // long form: marker word 2*len+1, chunks under keccak256(slot)
                let marker = U256::from(data.len() * 2 + 1);
                ops.push(WriteOp::full(base, marker.into()));
                let content = hashed_base(base);
                for (i, chunk) in data.chunks(32).enumerate() {
                    ops.push(WriteOp::full(
                        content.wrapping_add(U256::from(i)),
                        B256::right_padding_from(chunk),
                    ));
                }
            }
            Ok(())
        }
        EncodingKind::Mapping => {
            let Value::Mapping(entries) = value else {
                return Err(mismatch(ty, value, "a mapping"));
            };
            let key_ty = layout.type_of(ty.key_type()?)?;
            let value_ty = layout.type_of(ty.value_type()?)?;
            for (key, entry_value) in entries {
                let key_word = encode_mapping_key(key_ty, &Value::String(key.clone()))?;
                let child = mapping_slot(key_word, base);
                log::trace!("mapping `{}` key `{key}` -> slot {child:#066x}", ty.label);
                encode_value(layout, value_ty, child, 0, entry_value, ops)?;
            }
            Ok(())
        }
        EncodingKind::DynamicArray => {
            let Value::Array(items) = value else {
                return Err(mismatch(ty, value, "an array"));
            };
            ops.push(WriteOp::full(base, U256::from(items.len()).into()));
            let elem_ty = layout.type_of(ty.base_type()?)?;
            let content = hashed_base(base);
            if elem_ty.packs_in_arrays()? {
                let width = elem_ty.number_of_bytes()?;
                let mut slot_index = 0u64;
                let mut lane_offset = 0usize;
                for item in items {
                    if lane_offset + width > 32 {
                        slot_index += 1;
                        lane_offset = 0;
                    }
                    let lane = encode_scalar(elem_ty, item)?;
                    ops.push(WriteOp::lane(
                        content.wrapping_add(U256::from(slot_index)),
                        lane_offset,
                        &lane,
                    ));
                    lane_offset += width;
                }
            } else {
                let stride = elem_ty.number_of_bytes()?.div_ceil(32).max(1);
                for (i, item) in items.iter().enumerate() {
                    let elem_base = content.wrapping_add(U256::from(stride * i));
                    encode_value(layout, elem_ty, elem_base, 0, item, ops)?;
                }
            }
            Ok(())
        }
    }
}

/// Encodes an inplace scalar into its `number_of_bytes`-wide lane.
fn encode_scalar(ty: &TypeDescriptor, value: &Value) -> Result<Vec<u8>> {
    Ok(match ty.scalar_kind()? {
        ScalarKind::Address => value.to_address()?.as_slice().to_vec(),
        ScalarKind::Bool => vec![value.to_bool()? as u8],
        ScalarKind::Uint(bytes) => {
            value.to_uint(&ty.label, bytes)?.to_be_bytes::<32>()[32 - bytes..].to_vec()
        }
        ScalarKind::Int(bytes) => {
            // range-checked above, so truncating the two's complement
            // representation to the lane is lossless
            value.to_int(&ty.label, bytes)?.to_be_bytes::<32>()[32 - bytes..].to_vec()
        }
        ScalarKind::FixedBytes(bytes) => value.to_fixed_bytes(&ty.label, bytes)?,
    })
}

/// Encodes a mapping key as the 32-byte word hashed with the mapping's slot:
/// right-aligned for integral keys, left-aligned for `bytesN` keys, and
/// passed through verbatim for anything else.
pub(crate) fn encode_mapping_key(ty: &TypeDescriptor, key: &Value) -> Result<B256> {
    match ty.scalar_kind() {
        Ok(ScalarKind::Address) => Ok(B256::left_padding_from(key.to_address()?.as_slice())),
        Ok(ScalarKind::Bool) => Ok(B256::left_padding_from(&[key.to_bool()? as u8])),
        Ok(ScalarKind::Uint(bytes)) => Ok(key.to_uint(&ty.label, bytes)?.into()),
        Ok(ScalarKind::Int(bytes)) => Ok(B256::from_slice(
            &key.to_int(&ty.label, bytes)?.to_be_bytes::<32>(),
        )),
        Ok(ScalarKind::FixedBytes(bytes)) => Ok(B256::right_padding_from(
            &key.to_fixed_bytes(&ty.label, bytes)?,
        )),
        // non-scalar keys arrive pre-encoded as a full 32-byte word
        Err(_) => Ok(B256::from_slice(&key.to_fixed_bytes(&ty.label, 32)?)),
    }
}

fn mismatch(ty: &TypeDescriptor, value: &Value, expected: &str) -> Error {
    Error::UnsupportedType {
        ty: ty.label.clone(),
        reason: format!("expected {expected} value, got {}", value.kind()),
    }
}

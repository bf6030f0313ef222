// Copyright 2026, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Derives the slot addresses holding a named variable.
//!
//! Resolution walks the variable's type the same way the encoder does, but
//! instead of producing writes it produces the [`SlotRead`] list the host
//! must fetch. Dynamic types need a phase-one read of their length/marker
//! word through the [`StorageReader`] collaborator before the content slots
//! are known; that dependency is the only I/O the codec ever requests.
//!
//! Composites emit their root slot first (a placeholder for structs, the
//! marker for long bytes, the length word for arrays) so the decoder can
//! reassemble nesting from the flat list.

use alloy_primitives::U256;

use crate::{
    encode::encode_mapping_key,
    error::{Error, Result},
    layout::{parse_slot, EncodingKind, StorageLayout, TypeDescriptor},
    slots::{hashed_base, mapping_slot, SlotRead, StorageReader},
    value::Value,
};

/// Computes the slot reads for a named variable, consuming one mapping key
/// per mapping level crossed on the way to the value.
pub fn compute_read_slots<'a>(
    layout: &'a StorageLayout,
    name: &str,
    keys: &[Value],
    reader: &impl StorageReader,
) -> Result<Vec<SlotRead<'a>>> {
    let entry = layout.entry(name)?;
    let ty = layout.type_of(&entry.type_id)?;
    let mut reads = Vec::new();
    resolve_into(
        layout,
        ty,
        entry.base_slot()?,
        entry.offset,
        &entry.label,
        keys,
        reader,
        &mut reads,
    )?;
    log::debug!("resolved `{name}` to {} slot reads", reads.len());
    Ok(reads)
}

#[allow(clippy::too_many_arguments)]
fn resolve_into<'a, R: StorageReader>(
    layout: &'a StorageLayout,
    ty: &'a TypeDescriptor,
    base: U256,
    offset: usize,
    label: &str,
    keys: &[Value],
    reader: &R,
    reads: &mut Vec<SlotRead<'a>>,
) -> Result<()> {
    match ty.encoding()? {
        EncodingKind::Inplace => match &ty.members {
            Some(members) => {
                // placeholder at the struct's own slot; the decoder skips it
                reads.push(SlotRead {
                    key: base.into(),
                    ty,
                    length: None,
                    label: Some(label.to_string()),
                    offset: None,
                });
                for member in members {
                    let member_ty = layout.type_of(&member.type_id)?;
                    // mapping members are unreachable without keys
                    if member_ty.encoding()? == EncodingKind::Mapping {
                        continue;
                    }
                    let member_base = base.wrapping_add(parse_slot(&member.slot)?);
                    resolve_into(
                        layout,
                        member_ty,
                        member_base,
                        member.offset,
                        &member.label,
                        &[],
                        reader,
                        reads,
                    )?;
                }
                Ok(())
            }
            None => {
                reads.push(SlotRead {
                    key: base.into(),
                    ty,
                    length: None,
                    label: Some(label.to_string()),
                    offset: Some(offset),
                });
                Ok(())
            }
        },
        EncodingKind::Bytes => {
            // phase one: the marker word decides the representation
            let marker: U256 = reader.get_word(base).into();
            if !marker.bit(0) {
                // short form: content lives in the marker slot itself
                let length = usize::try_from((marker >> 1) & U256::from(0xff))
                    .expect("masked to one byte");
                reads.push(SlotRead {
                    key: base.into(),
                    ty,
                    length: Some(length),
                    label: Some(label.to_string()),
                    offset: None,
                });
            } else {
                let length = usize::try_from((marker - U256::from(1)) / U256::from(2))
                    .map_err(|_| {
                        Error::MalformedInput(format!(
                            "`{label}` has an implausible byte length marker"
                        ))
                    })?;
                reads.push(SlotRead {
                    key: base.into(),
                    ty,
                    length: Some(length),
                    label: Some(label.to_string()),
                    offset: None,
                });
                let content = hashed_base(base);
                let slots = length.div_ceil(32);
                for i in 0..slots {
                    reads.push(SlotRead {
                        key: content.wrapping_add(U256::from(i)).into(),
                        ty,
                        length: Some((length - 32 * i).min(32)),
                        label: Some(label.to_string()),
                        offset: None,
                    });
                }
            }
            Ok(())
        }
        EncodingKind::Mapping => {
            let Some((key, rest)) = keys.split_first() else {
                return Err(Error::MissingMappingKey(label.to_string()));
            };
            let key_ty = layout.type_of(ty.key_type()?)?;
            let value_ty = layout.type_of(ty.value_type()?)?;
            let key_word = encode_mapping_key(key_ty, key)?;
            let child = mapping_slot(key_word, base);
            log::trace!("mapping `{label}` -> slot {child:#066x}");
            resolve_into(layout, value_ty, child, 0, label, rest, reader, reads)
        }
        EncodingKind::DynamicArray => {
            // phase one: the length word decides how many elements follow
            let length_word: U256 = reader.get_word(base).into();
            let length = usize::try_from(length_word).map_err(|_| {
                Error::MalformedInput(format!("`{label}` has an implausible array length"))
            })?;
            reads.push(SlotRead {
                key: base.into(),
                ty,
                length: Some(length),
                label: Some(label.to_string()),
                offset: None,
            });
            let elem_ty = layout.type_of(ty.base_type()?)?;
            let content = hashed_base(base);
            if elem_ty.packs_in_arrays()? {
                let width = elem_ty.number_of_bytes()?;
                let mut slot_index = 0u64;
                let mut lane_offset = 0usize;
                for i in 0..length {
                    if lane_offset + width > 32 {
                        slot_index += 1;
                        lane_offset = 0;
                    }
                    reads.push(SlotRead {
                        key: content.wrapping_add(U256::from(slot_index)).into(),
                        ty: elem_ty,
                        length: None,
                        label: Some(format!("{label}[{i}]")),
                        offset: Some(lane_offset),
                    });
                    lane_offset += width;
                }
            } else {
                let stride = elem_ty.number_of_bytes()?.div_ceil(32).max(1);
                for i in 0..length {
                    let elem_base = content.wrapping_add(U256::from(stride * i));
                    resolve_into(
                        layout,
                        elem_ty,
                        elem_base,
                        0,
                        &format!("{label}[{i}]"),
                        &[],
                        reader,
                        reads,
                    )?;
                }
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStorage;
    use alloy_primitives::B256;
    use serde_json::json;

    fn layout() -> StorageLayout {
        StorageLayout::from_value(json!({
            "storage": [
                { "label": "owner", "offset": 3, "slot": "0", "type": "t_address" },
                { "label": "blob", "offset": 0, "slot": "2", "type": "t_bytes" },
                { "label": "balances", "offset": 0, "slot": "3", "type": "t_map" },
                { "label": "flags", "offset": 0, "slot": "4", "type": "t_bool_array" },
                { "label": "config", "offset": 0, "slot": "6", "type": "t_config" },
            ],
            "types": {
                "t_address": { "encoding": "inplace", "label": "address", "numberOfBytes": "20" },
                "t_bool": { "encoding": "inplace", "label": "bool", "numberOfBytes": "1" },
                "t_uint256": { "encoding": "inplace", "label": "uint256", "numberOfBytes": "32" },
                "t_bytes": { "encoding": "bytes", "label": "bytes", "numberOfBytes": "32" },
                "t_map": {
                    "encoding": "mapping", "label": "mapping(uint256 => uint256)",
                    "numberOfBytes": "32", "key": "t_uint256", "value": "t_uint256"
                },
                "t_bool_array": {
                    "encoding": "dynamic_array", "label": "bool[]",
                    "numberOfBytes": "32", "base": "t_bool"
                },
                "t_config": {
                    "encoding": "inplace", "label": "struct Demo.Config", "numberOfBytes": "64",
                    "members": [
                        { "label": "max", "offset": 0, "slot": "0", "type": "t_uint256" },
                        { "label": "live", "offset": 0, "slot": "1", "type": "t_bool" },
                    ]
                },
            },
        }))
        .unwrap()
    }

    #[test]
    fn inplace_scalar_is_one_read() {
        let layout = layout();
        let reads = compute_read_slots(&layout, "owner", &[], &MemoryStorage::new()).unwrap();
        assert_eq!(reads.len(), 1);
        assert_eq!(reads[0].key, B256::from(U256::ZERO));
        assert_eq!(reads[0].offset, Some(3));
        assert_eq!(reads[0].label.as_deref(), Some("owner"));
    }

    #[test]
    fn struct_emits_placeholder_then_members() {
        let layout = layout();
        let reads = compute_read_slots(&layout, "config", &[], &MemoryStorage::new()).unwrap();
        assert_eq!(reads.len(), 3);
        assert_eq!(reads[0].key, B256::from(U256::from(6)));
        assert!(reads[0].ty.is_struct());
        assert_eq!(reads[1].key, B256::from(U256::from(6)));
        assert_eq!(reads[1].label.as_deref(), Some("max"));
        assert_eq!(reads[2].key, B256::from(U256::from(7)));
        assert_eq!(reads[2].label.as_deref(), Some("live"));
    }

    #[test]
    fn mapping_requires_a_key() {
        let layout = layout();
        let result = compute_read_slots(&layout, "balances", &[], &MemoryStorage::new());
        assert!(matches!(
            result,
            Err(Error::MissingMappingKey(label)) if label == "balances"
        ));
    }

    #[test]
    fn mapping_key_hashes_to_known_vector() {
        let layout = layout();
        let reads = compute_read_slots(
            &layout,
            "balances",
            &[Value::from("5")],
            &MemoryStorage::new(),
        )
        .unwrap();
        assert_eq!(reads.len(), 1);
        assert_eq!(
            reads[0].key,
            "0x405aad32e1adbac89bb7f176e338b8fc6e994ca210c9bb7bdca249b465942250"
                .parse::<B256>()
                .unwrap()
        );
    }

    #[test]
    fn short_bytes_reads_marker_only() {
        let layout = layout();
        let mut storage = MemoryStorage::new();
        // 5 content bytes, short form: low byte 10
        let mut word = B256::right_padding_from(&[1, 2, 3, 4, 5]);
        word[31] = 10;
        storage.set_word(U256::from(2), word);

        let reads = compute_read_slots(&layout, "blob", &[], &storage).unwrap();
        assert_eq!(reads.len(), 1);
        assert_eq!(reads[0].length, Some(5));
    }

    #[test]
    fn long_bytes_reads_marker_then_content() {
        let layout = layout();
        let mut storage = MemoryStorage::new();
        // 40 content bytes, long form: marker 81
        storage.set_word(U256::from(2), U256::from(81).into());

        let reads = compute_read_slots(&layout, "blob", &[], &storage).unwrap();
        assert_eq!(reads.len(), 3);
        assert_eq!(reads[0].key, B256::from(U256::from(2)));
        assert_eq!(reads[0].length, Some(40));

        let content = "0x405787fa12a823e0f2b7631cc41b3ba8828b3321ca811111fa75cd3aa3bb5ace"
            .parse::<B256>()
            .unwrap();
        assert_eq!(reads[1].key, content);
        assert_eq!(reads[1].length, Some(32));
        assert_eq!(reads[2].length, Some(8));
    }

    #[test]
    fn packed_array_shares_content_slots() {
        let layout = layout();
        let mut storage = MemoryStorage::new();
        storage.set_word(U256::from(4), U256::from(3).into());

        let reads = compute_read_slots(&layout, "flags", &[], &storage).unwrap();
        assert_eq!(reads.len(), 4);
        assert_eq!(reads[0].length, Some(3));

        let content = "0x8a35acfbc15ff81a39ae7d344fd709f28e8600b4aa8c65c6b64bfe7fe36bd19b"
            .parse::<B256>()
            .unwrap();
        for (i, read) in reads[1..].iter().enumerate() {
            assert_eq!(read.key, content);
            assert_eq!(read.offset, Some(i));
        }
    }
}

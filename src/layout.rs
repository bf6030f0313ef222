// Copyright 2026, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! The compiler's storage layout document and lookups into it.
//!
//! Solidity emits a `storageLayout` section when compiled with the
//! `storageLayout` output selection: a list of state variables (each with a
//! declared slot, byte offset, and type id) plus a table describing every
//! referenced type. This module deserializes that document and answers the
//! two questions the rest of the codec asks of it: "which entry is variable
//! X?" and "what does type id T look like?".
//!
//! A [`StorageLayout`] is loaded once per contract and never mutated; all
//! codec calls borrow it. There is no process-wide registry.

use std::collections::BTreeMap;

use alloy_primitives::U256;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// A contract's full storage layout: its state variables and the types they
/// reference.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct StorageLayout {
    /// One entry per state variable, in declaration order.
    #[serde(default, deserialize_with = "null_to_default")]
    pub storage: Vec<StorageEntry>,
    /// Every type reachable from `storage`, keyed by type id
    /// (e.g. `t_uint256`). The compiler emits `null` for contracts with no
    /// state, which deserializes to an empty table.
    #[serde(default, deserialize_with = "null_to_default")]
    pub types: BTreeMap<String, TypeDescriptor>,
}

/// A single state variable in the layout.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct StorageEntry {
    /// The variable's source name.
    pub label: String,
    /// Type id, resolvable through [`StorageLayout::type_of`].
    #[serde(rename = "type")]
    pub type_id: String,
    /// Declared slot, as a decimal string.
    pub slot: String,
    /// Byte offset within the slot, counted from the low-order end (0–31).
    #[serde(default)]
    pub offset: usize,
    /// The contract that declared the variable.
    #[serde(default)]
    pub contract: String,
}

/// How a type maps onto storage slots.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TypeDescriptor {
    /// The encoding kind, as the compiler spells it. Parse with
    /// [`TypeDescriptor::encoding`].
    pub encoding: String,
    /// Human-readable type name (e.g. `uint8`, `struct Demo.Config`).
    pub label: String,
    /// Size of one value of this type, as a decimal string.
    #[serde(rename = "numberOfBytes")]
    pub number_of_bytes: String,
    /// Key type id, for mappings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Value type id, for mappings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Element type id, for arrays.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    /// Member list, for structs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<StructMember>>,
}

/// A struct member. Its `slot` is relative: the struct's own slot is added
/// when deriving the member's storage address.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct StructMember {
    /// The member's source name.
    pub label: String,
    /// Type id of the member.
    #[serde(rename = "type")]
    pub type_id: String,
    /// Slot offset from the struct's base slot, as a decimal string.
    pub slot: String,
    /// Byte offset within the member's slot.
    #[serde(default)]
    pub offset: usize,
}

/// The four storage encodings the compiler produces. Every slot-address and
/// packing algorithm in this crate dispatches on this enum, one arm per kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EncodingKind {
    /// Contiguous from the declared slot, possibly packed with neighbors.
    Inplace,
    /// Dynamic `bytes`/`string` with the short/long split representation.
    Bytes,
    /// Key-value data under `keccak256(key ++ slot)`.
    Mapping,
    /// Length at the declared slot, contents under `keccak256(slot)`.
    DynamicArray,
}

impl StorageLayout {
    /// Parses a layout from its JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parses a layout from an already-deserialized JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Extracts the layout from a full compiler artifact, failing when the
    /// contract was compiled without the `storageLayout` output selection.
    pub fn from_compiler_output(artifact: &serde_json::Value) -> Result<Self> {
        let section = artifact.get("storageLayout").ok_or_else(|| {
            Error::MalformedInput("compiler output has no `storageLayout` section".to_string())
        })?;
        Self::from_value(section.clone())
    }

    /// Looks up the entry for a named state variable.
    pub fn entry(&self, name: &str) -> Result<&StorageEntry> {
        self.storage
            .iter()
            .find(|entry| entry.label == name)
            .ok_or_else(|| Error::VariableNotFound(name.to_string()))
    }

    /// Looks up the descriptor for a type id.
    pub fn type_of(&self, type_id: &str) -> Result<&TypeDescriptor> {
        self.types
            .get(type_id)
            .ok_or_else(|| Error::TypeNotFound(type_id.to_string()))
    }
}

impl StorageEntry {
    /// The variable's declared slot as a 256-bit address.
    pub fn base_slot(&self) -> Result<U256> {
        parse_slot(&self.slot)
    }
}

impl TypeDescriptor {
    /// Parses the declared encoding, rejecting anything outside the four
    /// recognized kinds.
    pub fn encoding(&self) -> Result<EncodingKind> {
        match self.encoding.as_str() {
            "inplace" => Ok(EncodingKind::Inplace),
            "bytes" => Ok(EncodingKind::Bytes),
            "mapping" => Ok(EncodingKind::Mapping),
            "dynamic_array" => Ok(EncodingKind::DynamicArray),
            other => Err(Error::UnsupportedEncoding(other.to_string())),
        }
    }

    /// The type's width in bytes.
    pub fn number_of_bytes(&self) -> Result<usize> {
        self.number_of_bytes.parse().map_err(|_| {
            Error::MalformedInput(format!(
                "type `{}` has non-decimal numberOfBytes `{}`",
                self.label, self.number_of_bytes
            ))
        })
    }

    /// Whether this is an inplace struct.
    pub fn is_struct(&self) -> bool {
        self.members.is_some()
    }

    /// The mapping key type id, or `MalformedInput` for non-mappings.
    pub(crate) fn key_type(&self) -> Result<&str> {
        self.key.as_deref().ok_or_else(|| {
            Error::MalformedInput(format!("mapping type `{}` has no key type", self.label))
        })
    }

    /// The mapping value type id, or `MalformedInput` for non-mappings.
    pub(crate) fn value_type(&self) -> Result<&str> {
        self.value.as_deref().ok_or_else(|| {
            Error::MalformedInput(format!("mapping type `{}` has no value type", self.label))
        })
    }

    /// The array element type id, or `MalformedInput` for non-arrays.
    pub(crate) fn base_type(&self) -> Result<&str> {
        self.base.as_deref().ok_or_else(|| {
            Error::MalformedInput(format!("array type `{}` has no base type", self.label))
        })
    }

    /// Whether array elements of this type share slots: bools and integers
    /// of at most 16 bytes pack, everything else takes whole slots.
    pub(crate) fn packs_in_arrays(&self) -> Result<bool> {
        if self.label == "bool" {
            return Ok(true);
        }
        let integral = self.label.starts_with("uint")
            || self.label.starts_with("int")
            || self.label.starts_with("enum ");
        Ok(integral && self.number_of_bytes()? <= 16)
    }

    /// Classifies an inplace scalar by its label. Enums count as unsigned
    /// integers and contract types as addresses. Fixed-size arrays carry
    /// `encoding: "inplace"` too but set `base` and span multiple words, so
    /// they are rejected here rather than misread as wide integers.
    pub(crate) fn scalar_kind(&self) -> Result<ScalarKind> {
        if self.base.is_some() {
            return Err(Error::UnsupportedType {
                ty: self.label.clone(),
                reason: "fixed-size arrays are not supported".to_string(),
            });
        }
        let bytes = self.number_of_bytes()?;
        if bytes == 0 || bytes > 32 {
            return Err(Error::UnsupportedType {
                ty: self.label.clone(),
                reason: format!("implausible scalar width of {bytes} bytes"),
            });
        }
        let label = self.label.as_str();
        if label == "address" || label.starts_with("contract ") {
            Ok(ScalarKind::Address)
        } else if label == "bool" {
            Ok(ScalarKind::Bool)
        } else if label.starts_with("bytes") && label != "bytes" {
            Ok(ScalarKind::FixedBytes(bytes))
        } else if label.starts_with("uint") || label.starts_with("enum ") {
            Ok(ScalarKind::Uint(bytes))
        } else if label.starts_with("int") {
            Ok(ScalarKind::Int(bytes))
        } else {
            Err(Error::UnsupportedType {
                ty: label.to_string(),
                reason: "not a supported inplace scalar".to_string(),
            })
        }
    }
}

/// The scalar families an inplace type can hold, with their widths.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ScalarKind {
    /// 20-byte address, right-aligned in its lane.
    Address,
    /// Single byte, 0 or 1.
    Bool,
    /// `bytesN`, filling its N-byte lane.
    FixedBytes(usize),
    /// Unsigned integer of the given byte width.
    Uint(usize),
    /// Two's complement integer of the given byte width.
    Int(usize),
}

/// Parses a decimal slot string into a 256-bit slot address.
pub(crate) fn parse_slot(slot: &str) -> Result<U256> {
    U256::from_str_radix(slot, 10)
        .map_err(|_| Error::MalformedInput(format!("non-decimal slot `{slot}`")))
}

fn null_to_default<'de, D, T>(deserializer: D) -> core::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn demo_layout() -> StorageLayout {
        StorageLayout::from_value(json!({
            "storage": [
                { "label": "total", "offset": 0, "slot": "1", "type": "t_uint256", "contract": "Demo" },
            ],
            "types": {
                "t_uint256": { "encoding": "inplace", "label": "uint256", "numberOfBytes": "32" },
                "t_weird": { "encoding": "spiral", "label": "weird", "numberOfBytes": "32" },
            },
        }))
        .unwrap()
    }

    #[test]
    fn entry_lookup() {
        let layout = demo_layout();
        assert_eq!(layout.entry("total").unwrap().slot, "1");
        assert!(matches!(
            layout.entry("missing"),
            Err(Error::VariableNotFound(name)) if name == "missing"
        ));
    }

    #[test]
    fn type_lookup() {
        let layout = demo_layout();
        assert_eq!(layout.type_of("t_uint256").unwrap().label, "uint256");
        assert!(matches!(
            layout.type_of("t_nope"),
            Err(Error::TypeNotFound(id)) if id == "t_nope"
        ));
    }

    #[test]
    fn encoding_dispatch() {
        let layout = demo_layout();
        let ty = layout.type_of("t_uint256").unwrap();
        assert_eq!(ty.encoding().unwrap(), EncodingKind::Inplace);

        let weird = layout.type_of("t_weird").unwrap();
        assert!(matches!(
            weird.encoding(),
            Err(Error::UnsupportedEncoding(kind)) if kind == "spiral"
        ));
    }

    #[test]
    fn null_sections_deserialize_empty() {
        let layout = StorageLayout::from_json(r#"{ "storage": null, "types": null }"#).unwrap();
        assert!(layout.storage.is_empty());
        assert!(layout.types.is_empty());
    }

    #[test]
    fn compiler_output_requires_layout_section() {
        let artifact = json!({ "abi": [] });
        assert!(matches!(
            StorageLayout::from_compiler_output(&artifact),
            Err(Error::MalformedInput(_))
        ));

        let artifact = json!({ "storageLayout": { "storage": [], "types": null } });
        assert!(StorageLayout::from_compiler_output(&artifact).is_ok());
    }

    #[test]
    fn scalar_kind_rejects_non_scalars() {
        let fixed_array = TypeDescriptor {
            encoding: "inplace".to_string(),
            label: "uint256[2]".to_string(),
            number_of_bytes: "64".to_string(),
            key: None,
            value: None,
            base: Some("t_uint256".to_string()),
            members: None,
        };
        assert!(matches!(
            fixed_array.scalar_kind(),
            Err(Error::UnsupportedType { ty, .. }) if ty == "uint256[2]"
        ));

        // widths a single word cannot hold are rejected even without `base`
        for bytes in ["0", "64"] {
            let wide = TypeDescriptor {
                encoding: "inplace".to_string(),
                label: "uint256".to_string(),
                number_of_bytes: bytes.to_string(),
                key: None,
                value: None,
                base: None,
                members: None,
            };
            assert!(matches!(
                wide.scalar_kind(),
                Err(Error::UnsupportedType { .. })
            ));
        }
    }

    #[test]
    fn array_packing_rule() {
        let cases = vec![
            ("inplace", "bool", "1", true),
            ("inplace", "uint8", "1", true),
            ("inplace", "uint128", "16", true),
            ("inplace", "int64", "8", true),
            ("inplace", "enum Demo.Mode", "1", true),
            ("inplace", "uint256", "32", false),
            ("inplace", "address", "20", false),
            ("inplace", "bytes4", "4", false),
        ];
        for (encoding, label, bytes, packs) in cases {
            let ty = TypeDescriptor {
                encoding: encoding.to_string(),
                label: label.to_string(),
                number_of_bytes: bytes.to_string(),
                key: None,
                value: None,
                base: None,
                members: None,
            };
            assert_eq!(ty.packs_in_arrays().unwrap(), packs, "{label}");
        }
    }
}

// Copyright 2026, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! The value tree the codec encodes from and decodes into.
//!
//! Callers may supply scalars in whichever shape is convenient: native
//! variants ([`Value::Uint`], [`Value::Bool`], ...) or string literals
//! (decimal, `0x`-hex, `"true"`/`"false"`). The coercions live here so the
//! encoder and the mapping-key path interpret literals identically. The
//! decoder always produces the native variants.

use std::collections::BTreeMap;

use alloy_primitives::{Address, I256, U256};

use crate::error::{Error, Result};

/// A typed storage value: a scalar, a struct, a mapping, a dynamic array, or
/// dynamic bytes/strings.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// A boolean.
    Bool(bool),
    /// An unsigned integer of any declared width.
    Uint(U256),
    /// A signed integer of any declared width.
    Int(I256),
    /// A 20-byte address.
    Address(Address),
    /// A `bytesN` value, exactly N bytes.
    FixedBytes(Vec<u8>),
    /// Dynamic `bytes`.
    Bytes(Vec<u8>),
    /// A UTF-8 string, or a scalar literal awaiting interpretation against
    /// the declared type.
    String(String),
    /// A dynamic array, in element order.
    Array(Vec<Value>),
    /// A struct, member label to value.
    Struct(BTreeMap<String, Value>),
    /// A mapping, with keys as literals interpreted against the declared
    /// key type.
    Mapping(BTreeMap<String, Value>),
}

impl Value {
    /// Short name of the variant, for error messages.
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Uint(_) => "uint",
            Value::Int(_) => "int",
            Value::Address(_) => "address",
            Value::FixedBytes(_) => "fixed bytes",
            Value::Bytes(_) => "bytes",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Struct(_) => "struct",
            Value::Mapping(_) => "mapping",
        }
    }

    /// Interprets the value as an unsigned integer fitting `bytes` bytes.
    pub(crate) fn to_uint(&self, ty: &str, bytes: usize) -> Result<U256> {
        let value = match self {
            Value::Uint(value) => *value,
            Value::String(literal) => parse_uint_literal(literal).ok_or_else(|| {
                Error::UnsupportedType {
                    ty: ty.to_string(),
                    reason: format!("`{literal}` is not an unsigned integer literal"),
                }
            })?,
            other => {
                return Err(Error::UnsupportedType {
                    ty: ty.to_string(),
                    reason: format!("expected an unsigned integer, got {}", other.kind()),
                })
            }
        };
        if bytes < 32 && value >> (8 * bytes) != U256::ZERO {
            return Err(Error::Overflow {
                value: value.to_string(),
                bytes,
            });
        }
        Ok(value)
    }

    /// Interprets the value as a signed integer fitting `bytes` bytes.
    pub(crate) fn to_int(&self, ty: &str, bytes: usize) -> Result<I256> {
        let value = match self {
            Value::Int(value) => *value,
            Value::Uint(value) => signed_from_magnitude(false, *value)?,
            Value::String(literal) => {
                // hex literals of exactly the declared width arrive
                // pre-encoded as two's complement
                if let Some(hex) = literal.strip_prefix("0x") {
                    if hex.len() == 2 * bytes {
                        let raw = decode_hex(hex).ok_or_else(|| Error::UnsupportedType {
                            ty: ty.to_string(),
                            reason: format!("`{literal}` is not an integer literal"),
                        })?;
                        let mut word = if raw[0] & 0x80 != 0 { [0xff; 32] } else { [0; 32] };
                        word[32 - bytes..].copy_from_slice(&raw);
                        return Ok(I256::from_be_bytes(word));
                    }
                }
                let (negative, magnitude) = literal
                    .strip_prefix('-')
                    .map(|rest| (true, rest))
                    .unwrap_or((false, literal.as_str()));
                let magnitude = parse_uint_literal(magnitude).ok_or_else(|| {
                    Error::UnsupportedType {
                        ty: ty.to_string(),
                        reason: format!("`{literal}` is not an integer literal"),
                    }
                })?;
                signed_from_magnitude(negative, magnitude)?
            }
            other => {
                return Err(Error::UnsupportedType {
                    ty: ty.to_string(),
                    reason: format!("expected a signed integer, got {}", other.kind()),
                })
            }
        };
        if bytes < 32 {
            let bound = I256::ONE << (8 * bytes - 1);
            if value >= bound || value < -bound {
                return Err(Error::Overflow {
                    value: value.to_string(),
                    bytes,
                });
            }
        }
        Ok(value)
    }

    /// Interprets the value as a boolean; accepts the `"true"`/`"false"`
    /// literals.
    pub(crate) fn to_bool(&self) -> Result<bool> {
        match self {
            Value::Bool(value) => Ok(*value),
            Value::String(literal) => match literal.as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                other => Err(Error::InvalidBoolLiteral(other.to_string())),
            },
            other => Err(Error::InvalidBoolLiteral(other.kind().to_string())),
        }
    }

    /// Interprets the value as a 20-byte address.
    pub(crate) fn to_address(&self) -> Result<Address> {
        match self {
            Value::Address(address) => Ok(*address),
            Value::String(literal) => literal
                .parse()
                .map_err(|_| Error::InvalidAddress(literal.clone())),
            other => Err(Error::InvalidAddress(other.kind().to_string())),
        }
    }

    /// Interprets the value as exactly `bytes` bytes of fixed-width data.
    pub(crate) fn to_fixed_bytes(&self, ty: &str, bytes: usize) -> Result<Vec<u8>> {
        let data = match self {
            Value::FixedBytes(data) => data.clone(),
            Value::String(literal) => decode_hex(literal).ok_or_else(|| {
                Error::UnsupportedType {
                    ty: ty.to_string(),
                    reason: format!("`{literal}` is not a hex literal"),
                }
            })?,
            other => {
                return Err(Error::UnsupportedType {
                    ty: ty.to_string(),
                    reason: format!("expected fixed bytes, got {}", other.kind()),
                })
            }
        };
        if data.len() != bytes {
            return Err(Error::InvalidBytesLength {
                ty: ty.to_string(),
                expected: bytes,
                got: data.len(),
            });
        }
        Ok(data)
    }

    /// Interprets the value as the content of a dynamic `bytes` or `string`
    /// field: strings are UTF-8-encoded, byte strings hex-decoded.
    pub(crate) fn to_byte_string(&self, ty: &str, utf8: bool) -> Result<Vec<u8>> {
        match self {
            Value::String(literal) if utf8 => Ok(literal.as_bytes().to_vec()),
            Value::String(literal) => decode_hex(literal).ok_or_else(|| {
                Error::UnsupportedType {
                    ty: ty.to_string(),
                    reason: format!("`{literal}` is not a hex literal"),
                }
            }),
            Value::Bytes(data) | Value::FixedBytes(data) => Ok(data.clone()),
            other => Err(Error::UnsupportedType {
                ty: ty.to_string(),
                reason: format!("expected bytes or a string, got {}", other.kind()),
            }),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Uint(U256::from(value))
    }
}

impl From<U256> for Value {
    fn from(value: U256) -> Self {
        Value::Uint(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(I256::try_from(value).expect("i64 fits I256"))
    }
}

impl From<I256> for Value {
    fn from(value: I256) -> Self {
        Value::Int(value)
    }
}

impl From<Address> for Value {
    fn from(value: Address) -> Self {
        Value::Address(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

/// Parses a decimal or `0x`-hex unsigned literal.
pub(crate) fn parse_uint_literal(literal: &str) -> Option<U256> {
    match literal.strip_prefix("0x") {
        Some(hex) => U256::from_str_radix(hex, 16).ok(),
        None => U256::from_str_radix(literal, 10).ok(),
    }
}

/// Decodes a hex literal, with or without the `0x` prefix.
pub(crate) fn decode_hex(literal: &str) -> Option<Vec<u8>> {
    hex::decode(literal.strip_prefix("0x").unwrap_or(literal)).ok()
}

/// Builds a signed value from a sign and a magnitude, rejecting magnitudes
/// outside the 256-bit two's complement range.
fn signed_from_magnitude(negative: bool, magnitude: U256) -> Result<I256> {
    let min_magnitude = U256::from(1) << 255;
    let overflow = || Error::Overflow {
        value: format!("{}{magnitude}", if negative { "-" } else { "" }),
        bytes: 32,
    };
    if negative {
        if magnitude > min_magnitude {
            return Err(overflow());
        }
        if magnitude == min_magnitude {
            return Ok(I256::MIN);
        }
        Ok(-I256::from_raw(magnitude))
    } else {
        if magnitude >= min_magnitude {
            return Err(overflow());
        }
        Ok(I256::from_raw(magnitude))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uint_literals() {
        let cases = vec![
            (Value::from(255u64), 255u64),
            (Value::from("255"), 255),
            (Value::from("0xff"), 255),
            (Value::from("0"), 0),
        ];
        for (value, want) in cases {
            assert_eq!(value.to_uint("uint8", 1).unwrap(), U256::from(want));
        }
    }

    #[test]
    fn uint_overflow() {
        assert!(matches!(
            Value::from(256u64).to_uint("uint8", 1),
            Err(Error::Overflow { bytes: 1, .. })
        ));
        assert!(Value::from(U256::MAX).to_uint("uint256", 32).is_ok());
    }

    #[test]
    fn int_literals() {
        let minus_one = Value::from("-1").to_int("int8", 1).unwrap();
        assert_eq!(minus_one, I256::MINUS_ONE);

        assert_eq!(
            Value::from("-128").to_int("int8", 1).unwrap(),
            I256::try_from(-128).unwrap()
        );
        assert!(matches!(
            Value::from("-129").to_int("int8", 1),
            Err(Error::Overflow { bytes: 1, .. })
        ));
        assert!(matches!(
            Value::from("128").to_int("int8", 1),
            Err(Error::Overflow { bytes: 1, .. })
        ));
    }

    #[test]
    fn width_matched_hex_is_twos_complement() {
        assert_eq!(
            Value::from("0xff").to_int("int8", 1).unwrap(),
            I256::MINUS_ONE
        );
        assert_eq!(
            Value::from("0x7f").to_int("int8", 1).unwrap(),
            I256::try_from(127).unwrap()
        );
        assert_eq!(
            Value::from("0xfffe").to_int("int16", 2).unwrap(),
            I256::try_from(-2).unwrap()
        );
    }

    #[test]
    fn bool_literals() {
        assert!(Value::from("true").to_bool().unwrap());
        assert!(!Value::from(false).to_bool().unwrap());
        assert!(matches!(
            Value::from("yes").to_bool(),
            Err(Error::InvalidBoolLiteral(literal)) if literal == "yes"
        ));
    }

    #[test]
    fn address_literals() {
        let address = Value::from("0x361594F5429D23ECE0A88E4fBE529E1c49D524d8")
            .to_address()
            .unwrap();
        assert_eq!(
            address,
            "0x361594F5429D23ECE0A88E4fBE529E1c49D524d8"
                .parse::<Address>()
                .unwrap()
        );
        assert!(matches!(
            Value::from("0x1234").to_address(),
            Err(Error::InvalidAddress(_))
        ));
    }

    #[test]
    fn fixed_bytes_length() {
        assert_eq!(
            Value::from("0xdeadbeef").to_fixed_bytes("bytes4", 4).unwrap(),
            vec![0xde, 0xad, 0xbe, 0xef]
        );
        assert!(matches!(
            Value::from("0xdead").to_fixed_bytes("bytes4", 4),
            Err(Error::InvalidBytesLength { expected: 4, got: 2, .. })
        ));
    }

    #[test]
    fn byte_strings() {
        assert_eq!(
            Value::from("hi").to_byte_string("string", true).unwrap(),
            b"hi".to_vec()
        );
        assert_eq!(
            Value::from("0x0102").to_byte_string("bytes", false).unwrap(),
            vec![1, 2]
        );
        assert!(Value::from("zz").to_byte_string("bytes", false).is_err());
    }
}

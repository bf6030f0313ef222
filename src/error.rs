// Copyright 2026, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Failure modes of the codec.
//!
//! Every error is synchronous and local: each one reflects either a caller
//! mistake or a request the storage layout cannot represent, never a
//! transient condition. Nothing here is worth retrying.

use alloy_primitives::B256;

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Errors produced while resolving, encoding, merging, or decoding storage.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No state variable with the given label exists in the layout.
    #[error("no state variable named `{0}` in storage layout")]
    VariableNotFound(String),

    /// A type id referenced by the layout is missing from its type table.
    #[error("no type `{0}` in storage layout")]
    TypeNotFound(String),

    /// A mapping was addressed without supplying a key for it.
    #[error("mapping `{0}` requires a key")]
    MissingMappingKey(String),

    /// The layout declares a storage encoding this codec does not know.
    #[error("unsupported storage encoding `{0}`")]
    UnsupportedEncoding(String),

    /// A value cannot be encoded as the declared type.
    #[error("cannot encode value as `{ty}`: {reason}")]
    UnsupportedType {
        /// The declared type label.
        ty: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// Two writes to the same slot touched the same byte lane.
    #[error("conflicting writes to packed slot {0}")]
    BadPackedEncoding(B256),

    /// A slot read or layout field is missing or structurally invalid.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// Mapping contents cannot be decoded without a key; keys are not
    /// enumerable from slot contents alone.
    #[error("cannot decode mapping `{0}` without a key")]
    ResolverRequiresKey(String),

    /// An integer value does not fit the declared width.
    #[error("value `{value}` does not fit in {bytes} bytes")]
    Overflow {
        /// The rejected literal.
        value: String,
        /// The declared width in bytes.
        bytes: usize,
    },

    /// A value could not be parsed as a 20-byte address.
    #[error("invalid address literal `{0}`")]
    InvalidAddress(String),

    /// A fixed-bytes value has the wrong length.
    #[error("expected {expected} bytes for `{ty}`, got {got}")]
    InvalidBytesLength {
        /// The declared type label.
        ty: String,
        /// The width the type requires.
        expected: usize,
        /// The width that was supplied.
        got: usize,
    },

    /// A value could not be parsed as a boolean.
    #[error("invalid boolean literal `{0}`")]
    InvalidBoolLiteral(String),

    /// The storage layout document is not valid JSON.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

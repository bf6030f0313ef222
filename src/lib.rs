// Copyright 2026, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! A codec for Solidity contract storage, driven by the compiler's layout.
//!
//! Given the `storageLayout` JSON that `solc` emits, this crate translates
//! between typed Solidity values and the raw 32-byte words a contract's
//! storage actually holds. It covers both directions:
//! - **Encoding**: turn named assignments like `balances[5] = 100` into the
//!   exact `(slot, word)` writes, packing neighbors into shared slots and
//!   rejecting conflicting writers of the same byte.
//! - **Resolution and decoding**: compute which slots hold a variable
//!   (hashing mapping keys and array bases, reading length markers through
//!   a [`StorageReader`]), then reassemble the fetched words into a typed
//!   [`Value`].
//!
//! Slot math follows Solidity's storage rules: packed in-place fields,
//! short/long byte strings, `keccak256`-derived mapping and array content
//! slots. Hashing and word types come from [Alloy][alloy].
//!
//! ```
//! use alloy_primitives::{B256, U256};
//! use storage_codec::{compute_writes, StorageLayout, Value};
//!
//! let layout = StorageLayout::from_json(r#"{
//!     "storage": [
//!         { "label": "count", "offset": 0, "slot": "0", "type": "t_uint256" }
//!     ],
//!     "types": {
//!         "t_uint256": { "encoding": "inplace", "label": "uint256", "numberOfBytes": "32" }
//!     }
//! }"#)?;
//!
//! let writes = compute_writes(&layout, &[("count", Value::from(7u64))])?;
//! assert_eq!(writes.len(), 1);
//! assert_eq!(writes[0].val, B256::from(U256::from(7)));
//! # Ok::<(), storage_codec::Error>(())
//! ```
//!
//! [alloy]: https://docs.rs/alloy-primitives/latest/alloy_primitives/

#![warn(missing_docs)]

pub use alloy_primitives;

mod decode;
mod encode;
mod error;
mod layout;
mod merge;
mod resolve;
mod slots;
mod value;

pub mod testing;

pub use decode::decode;
pub use encode::compute_writes;
pub use error::{Error, Result};
pub use layout::{EncodingKind, StorageEntry, StorageLayout, StructMember, TypeDescriptor};
pub use merge::merge;
pub use resolve::compute_read_slots;
pub use slots::{SlotRead, SlotWrite, StorageReader, WriteOp};
pub use value::Value;

// Copyright 2026, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! An in-memory word store for exercising the codec without a chain.
//!
//! [`MemoryStorage`] stands in for the host's storage backend: computed
//! writes can be applied to it and the resolver can read phase-one words
//! back out of it, which is enough to round-trip every supported type in
//! unit and integration tests.

use std::collections::HashMap;

use alloy_primitives::{B256, U256};

use crate::slots::{SlotWrite, StorageReader};

/// A `HashMap`-backed storage double. Unset slots read as the zero word,
/// matching an untouched contract.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    words: HashMap<U256, B256>,
}

impl MemoryStorage {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a single slot to the given word.
    pub fn set_word(&mut self, slot: U256, word: B256) {
        self.words.insert(slot, word);
    }

    /// Returns the word at a slot, zero if never written.
    pub fn word_at(&self, slot: U256) -> B256 {
        self.words.get(&slot).copied().unwrap_or_default()
    }

    /// Applies a batch of computed writes, overwriting whole words.
    pub fn apply(&mut self, writes: &[SlotWrite]) {
        for write in writes {
            self.words.insert(write.key.into(), write.val);
        }
    }
}

impl StorageReader for MemoryStorage {
    fn get_word(&self, slot: U256) -> B256 {
        self.word_at(slot)
    }
}

//! Ownership state of a draft in progress.
//!
//! The ledger holds two independent collections, keyed by card name:
//!
//! - the **collection**: copies of each card picked so far (a multiset)
//! - the **compare set**: cards staged for side-by-side comparison (at most one
//!   entry per card)
//!
//! # State Transitions
//!
//! ```text
//! collection:   absent ──pick──▶ owned(1) ──pick──▶ owned(n+1)
//!               absent ◀─remove─ owned(1) ◀─remove─ owned(n+1)
//!
//! compare set:  unstaged ──stage──▶ staged   (staging twice is a no-op)
//!               unstaged ◀─unstage / any pick / any remove / reset── staged
//!
//! Removing a card that is not owned still clears the compare set.
//! ```
//!
//! A card with zero copies is never stored. Comparisons are only meaningful
//! against a fixed collection, so every collection mutation clears the whole
//! compare set.
//!
//! The ledger does not know the catalogue; callers validate names first.

use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnershipLedger {
    collection: BTreeMap<String, u32>,
    compare: BTreeSet<String>,
    compare_clears: u64,
}

impl OwnershipLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one copy of `name`, returning the new count.
    pub fn pick(&mut self, name: &str) -> u32 {
        let count = self.collection.entry(name.to_owned()).or_insert(0);
        *count += 1;
        let count = *count;
        self.clear_compare();
        count
    }

    /// Removes one copy of `name`, returning the remaining count.
    ///
    /// Returns `None` if the card is not owned. The compare set is cleared
    /// either way.
    pub fn remove(&mut self, name: &str) -> Option<u32> {
        self.clear_compare();
        let count = self.collection.get_mut(name)?;
        *count -= 1;
        let remaining = *count;
        if remaining == 0 {
            self.collection.remove(name);
        }
        Some(remaining)
    }

    /// Stages `name` for comparison. Returns `false` if it was already staged.
    pub fn stage_compare(&mut self, name: &str) -> bool {
        if self.compare.contains(name) {
            return false;
        }
        self.compare.insert(name.to_owned())
    }

    /// Unstages `name`. Returns `false` if it was not staged.
    pub fn unstage_compare(&mut self, name: &str) -> bool {
        self.compare.remove(name)
    }

    /// Clears both the collection and the compare set.
    pub fn reset(&mut self) {
        self.collection.clear();
        self.clear_compare();
    }

    #[must_use]
    pub fn count(&self, name: &str) -> u32 {
        self.collection.get(name).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn is_owned(&self, name: &str) -> bool {
        self.collection.contains_key(name)
    }

    #[must_use]
    pub fn is_staged(&self, name: &str) -> bool {
        self.compare.contains(name)
    }

    /// Owned cards with their counts, sorted by name.
    pub fn collection(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.collection.iter().map(|(name, count)| (name.as_str(), *count))
    }

    /// Staged cards, sorted by name.
    pub fn compare_set(&self) -> impl Iterator<Item = &str> + '_ {
        self.compare.iter().map(String::as_str)
    }

    /// Number of distinct owned cards.
    #[must_use]
    pub fn distinct_owned(&self) -> usize {
        self.collection.len()
    }

    /// Total number of owned copies.
    #[must_use]
    pub fn total_owned(&self) -> u32 {
        self.collection.values().sum()
    }

    #[must_use]
    pub fn compare_len(&self) -> usize {
        self.compare.len()
    }

    /// How many times a non-empty compare set has been discarded.
    #[must_use]
    pub fn compare_clears(&self) -> u64 {
        self.compare_clears
    }

    fn clear_compare(&mut self) {
        if self.compare.is_empty() {
            return;
        }
        tracing::debug!(staged = self.compare.len(), "clearing compare set");
        self.compare.clear();
        self.compare_clears += 1;
    }
}

use std::ops::{Index, IndexMut};

use story_deck_protocol::ElementKey;

use super::record::TransitionRecord;

/// The app-wide list of transition records, one per element key.
///
/// Owned by the app root and lent to markers, the coordinator, and the
/// overlay. Lookups that miss return `None`; before a key's first render
/// that is the expected state, not an error.
#[derive(Debug, Default)]
pub struct TransitionRegistry {
    records: Vec<TransitionRecord>,
}

impl TransitionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position of the record for `key`.
    pub fn find(&self, key: &str) -> Option<usize> {
        self.records.iter().position(|r| r.key == key)
    }

    pub fn get(&self, key: &str) -> Option<&TransitionRecord> {
        self.find(key).map(|i| &self.records[i])
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut TransitionRecord> {
        self.find(key).map(|i| &mut self.records[i])
    }

    /// Position of the record for `key`, creating an inactive one if the
    /// key has never been seen.
    pub fn ensure(&mut self, key: &ElementKey) -> usize {
        if let Some(index) = self.find(key) {
            return index;
        }
        tracing::trace!(%key, "transition record created");
        self.records.push(TransitionRecord::new(key.clone()));
        self.records.len() - 1
    }

    pub fn iter(&self) -> impl Iterator<Item = &TransitionRecord> {
        self.records.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut TransitionRecord> {
        self.records.iter_mut()
    }

    /// Number of distinct keys ever seen.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Keys whose records are mid-cycle.
    pub fn active_keys(&self) -> impl Iterator<Item = &ElementKey> {
        self.records.iter().filter(|r| r.is_active).map(|r| &r.key)
    }
}

impl Index<usize> for TransitionRegistry {
    type Output = TransitionRecord;

    fn index(&self, index: usize) -> &TransitionRecord {
        &self.records[index]
    }
}

impl IndexMut<usize> for TransitionRegistry {
    fn index_mut(&mut self, index: usize) -> &mut TransitionRecord {
        &mut self.records[index]
    }
}

use crate::di::{Instance, TypeKey};
use std::collections::HashMap;

/// Manually supplied instances, consulted before any construction.
///
/// Entries are only ever added or replaced; the latest insert for a key wins.
#[derive(Clone, Default)]
pub struct OverrideRegistry {
    entries: HashMap<TypeKey, Instance>,
}

impl OverrideRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `instance` under `key`, returning the instance it replaced.
    pub fn insert(&mut self, key: TypeKey, instance: Instance) -> Option<Instance> {
        self.entries.insert(key, instance)
    }

    pub fn get(&self, key: &TypeKey) -> Option<Instance> {
        self.entries.get(key).cloned()
    }

    pub fn contains(&self, key: &TypeKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &TypeKey> {
        self.entries.keys()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for OverrideRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

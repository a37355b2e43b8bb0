//! Named schema store owned by an engine instance.
//!
//! Readers and writers share the cache through `&self`; the last write for a
//! name wins. Names are listed in first-insertion order.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use indexmap::IndexMap;
use tracing::debug;

use crate::ir::SchemaNode;

#[derive(Debug, Default)]
pub struct SchemaCache {
    entries: RwLock<IndexMap<String, SchemaNode>>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    // Map writes are single calls; a poisoned lock still guards a consistent map.
    fn read(&self) -> RwLockReadGuard<'_, IndexMap<String, SchemaNode>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, IndexMap<String, SchemaNode>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store `schema` under `name`, returning the schema it replaced.
    pub fn insert(&self, name: impl Into<String>, schema: SchemaNode) -> Option<SchemaNode> {
        let name = name.into();
        debug!(name = %name, kind = %schema.kind(), "caching schema");
        self.write().insert(name, schema)
    }

    pub fn get(&self, name: &str) -> Option<SchemaNode> {
        self.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    pub fn remove(&self, name: &str) -> Option<SchemaNode> {
        self.write().shift_remove(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn clear(&self) {
        let mut entries = self.write();
        debug!(count = entries.len(), "clearing schema cache");
        entries.clear();
    }
}

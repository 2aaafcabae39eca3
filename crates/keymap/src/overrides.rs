//! User customizations of canonical bindings.
//!
//! Overrides are authored by the settings layer as JSON and afterwards edited
//! through the customization UI. Each entry is a [`BindingOverride`] keyed by
//! command; setting an entry replaces the previous one wholesale.

use crate::binding::{BindingOverride, CommandId};
use crate::error::KeymapError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Root structure for override JSON files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverrideFile {
    /// Schema version for migrations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    /// Overrides keyed by command identifier.
    #[serde(default)]
    pub overrides: IndexMap<CommandId, BindingOverride>,
}

/// Per-command overrides, in the order they were first set.
#[derive(Clone, Debug, Default)]
pub struct OverrideStore {
    entries: IndexMap<CommandId, BindingOverride>,
}

impl OverrideStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an [`OverrideFile`] from JSON text.
    pub fn from_json(json: &str) -> Result<Self, KeymapError> {
        let file: OverrideFile = serde_json::from_str(json)?;
        Ok(Self::from(file))
    }

    /// Load overrides from `path`. A missing file yields an empty store.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, KeymapError> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "no override file, using defaults");
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)?;
        let store = Self::from_json(&content)?;
        debug!(path = %path.display(), overrides = store.len(), "loaded binding overrides");
        Ok(store)
    }

    /// Store `ov` for `id`, replacing any previous entry.
    pub fn set(&mut self, id: CommandId, ov: BindingOverride) -> Option<BindingOverride> {
        self.entries.insert(id, ov)
    }

    pub fn get(&self, id: &CommandId) -> Option<&BindingOverride> {
        self.entries.get(id)
    }

    /// Drop the entry for `id`, keeping the order of the rest.
    pub fn remove(&mut self, id: &CommandId) -> Option<BindingOverride> {
        self.entries.shift_remove(id)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&CommandId, &BindingOverride)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of the serializable part of the store.
    pub fn to_file(&self) -> OverrideFile {
        OverrideFile {
            schema_version: Some(env!("CARGO_PKG_VERSION").to_string()),
            overrides: self.entries.clone(),
        }
    }
}

impl From<OverrideFile> for OverrideStore {
    fn from(file: OverrideFile) -> Self {
        Self {
            entries: file.overrides,
        }
    }
}

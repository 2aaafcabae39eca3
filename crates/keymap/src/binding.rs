//! Binding structures and identifiers.
//!
//! This module defines the effective [`Binding`] type that connects a chord
//! and display metadata to an executable action, and the partial
//! [`BindingOverride`] users apply on top of a command's defaults.

use crate::action::Action;
use crate::keystroke::KeyChord;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

/// Dot-namespaced identifier of a command, e.g. `file.save`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandId(Arc<str>);

impl CommandId {
    /// Create a new command identifier.
    pub fn new(id: impl Into<String>) -> Self {
        let id: String = id.into();
        Self(Arc::<str>::from(id.into_boxed_str()))
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The part before the first `.`, e.g. `file` for `file.save`.
    pub fn namespace(&self) -> Option<&str> {
        self.0.split_once('.').map(|(namespace, _)| namespace)
    }
}

impl From<&str> for CommandId {
    fn from(value: &str) -> Self {
        Self(Arc::<str>::from(value))
    }
}

impl From<String> for CommandId {
    fn from(value: String) -> Self {
        Self(Arc::<str>::from(value.into_boxed_str()))
    }
}

impl AsRef<str> for CommandId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for CommandId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for CommandId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(CommandId::new(value))
    }
}

/// Identifier of a UI context such as `global` or `fileManager`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(Arc<str>);

impl ContextId {
    /// Tag of the context that is always active.
    pub const GLOBAL: &'static str = "global";

    /// Create a new context identifier.
    pub fn new(id: impl Into<String>) -> Self {
        let id: String = id.into();
        Self(Arc::<str>::from(id.into_boxed_str()))
    }

    /// The permanently active context.
    pub fn global() -> Self {
        Self::from(Self::GLOBAL)
    }

    pub fn is_global(&self) -> bool {
        &*self.0 == Self::GLOBAL
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ContextId {
    fn from(value: &str) -> Self {
        Self(Arc::<str>::from(value))
    }
}

impl From<String> for ContextId {
    fn from(value: String) -> Self {
        Self(Arc::<str>::from(value.into_boxed_str()))
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for ContextId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ContextId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(ContextId::new(value))
    }
}

/// The contexts a binding applies in. Duplicates are dropped on construction.
pub type ContextList = SmallVec<[ContextId; 2]>;

/// Build a [`ContextList`] from tags, keeping first occurrences only.
pub fn context_list<I, C>(contexts: I) -> ContextList
where
    I: IntoIterator<Item = C>,
    C: Into<ContextId>,
{
    let mut list = ContextList::new();
    for context in contexts {
        let context = context.into();
        if !list.contains(&context) {
            list.push(context);
        }
    }
    list
}

/// The effective definition of a command: chord, metadata, contexts and action.
#[derive(Clone, Debug)]
pub struct Binding {
    /// Chord that triggers the command.
    pub chord: KeyChord,
    /// Human readable description, used as the palette label.
    pub description: String,
    /// Optional grouping shown in menus.
    pub category: Option<String>,
    /// Contexts in which the binding is visible.
    pub contexts: ContextList,
    /// What runs when the binding fires.
    pub action: Action,
}

impl Binding {
    /// Returns `true` if any of the binding's contexts satisfies `is_active`.
    pub fn applies_in(&self, is_active: impl Fn(&ContextId) -> bool) -> bool {
        self.contexts.iter().any(is_active)
    }

    /// Overlay the fields present in `ov`, replacing each one wholesale.
    pub fn overlay(mut self, ov: &BindingOverride) -> Self {
        if let Some(chord) = &ov.chord {
            self.chord = chord.clone();
        }
        if let Some(description) = &ov.description {
            self.description = description.clone();
        }
        if let Some(category) = &ov.category {
            self.category = Some(category.clone());
        }
        if let Some(contexts) = &ov.contexts {
            self.contexts = contexts.clone();
        }
        if let Some(action) = &ov.action {
            self.action = action.clone();
        }
        self
    }
}

/// A partial customization of a command's default binding.
///
/// Absent fields fall through to the default. The action can only be set in
/// code; it is never read from or written to configuration files.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BindingOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chord: Option<KeyChord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contexts: Option<ContextList>,
    #[serde(skip)]
    pub action: Option<Action>,
}

impl BindingOverride {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chord(mut self, chord: KeyChord) -> Self {
        self.chord = Some(chord);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn contexts<I, C>(mut self, contexts: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<ContextId>,
    {
        self.contexts = Some(context_list(contexts));
        self
    }

    pub fn action(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }

    /// Returns `true` if no field is overridden.
    pub fn is_empty(&self) -> bool {
        self.chord.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.contexts.is_none()
            && self.action.is_none()
    }
}

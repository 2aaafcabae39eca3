//! The canonical command table.
//!
//! Registration happens in two phases. A [`RegistryBuilder`] collects the
//! declarations (chord, description, category, contexts) once at startup and
//! freezes them into a [`BindingRegistry`]. After that only the action slots
//! stay open: independent subsystems attach their behaviour in any order,
//! before or after the first resolution.

use crate::action::{Action, ActionSlot};
use crate::binding::{Binding, CommandId, ContextId, ContextList, context_list};
use crate::error::KeymapError;
use crate::keystroke::KeyChord;
use indexmap::IndexMap;
use tracing::debug;

/// Declaration of one canonical command.
#[derive(Clone, Debug)]
pub struct CommandDeclaration {
    pub id: CommandId,
    pub chord: KeyChord,
    pub description: String,
    pub category: Option<String>,
    pub contexts: ContextList,
}

impl CommandDeclaration {
    /// Declare a command that applies in the global context.
    pub fn new(id: impl Into<CommandId>, chord: KeyChord, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            chord,
            description: description.into(),
            category: None,
            contexts: context_list([ContextId::GLOBAL]),
        }
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Replace the contexts the command applies in.
    pub fn contexts<I, C>(mut self, contexts: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<ContextId>,
    {
        self.contexts = context_list(contexts);
        self
    }

    /// The default binding, carrying `action`.
    pub fn to_binding(&self, action: Action) -> Binding {
        Binding {
            chord: self.chord.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            contexts: self.contexts.clone(),
            action,
        }
    }
}

/// Builder for creating a [`BindingRegistry`].
#[derive(Default)]
pub struct RegistryBuilder {
    declarations: Vec<CommandDeclaration>,
}

impl RegistryBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a command declaration.
    pub fn declare(mut self, declaration: CommandDeclaration) -> Self {
        self.declarations.push(declaration);
        self
    }

    /// Add several command declarations.
    pub fn declare_all(
        mut self,
        declarations: impl IntoIterator<Item = CommandDeclaration>,
    ) -> Self {
        self.declarations.extend(declarations);
        self
    }

    /// Freeze the declarations. Every command must be declared exactly once
    /// and apply in at least one context.
    pub fn build(self) -> Result<BindingRegistry, KeymapError> {
        let mut entries = IndexMap::with_capacity(self.declarations.len());
        for declaration in self.declarations {
            if declaration.contexts.is_empty() {
                return Err(KeymapError::NoContexts(declaration.id));
            }
            if entries.contains_key(&declaration.id) {
                return Err(KeymapError::DuplicateCommand(declaration.id));
            }
            entries.insert(
                declaration.id.clone(),
                RegistryEntry {
                    declaration,
                    slot: ActionSlot::default(),
                },
            );
        }

        debug!(commands = entries.len(), "built binding registry");
        Ok(BindingRegistry { entries })
    }
}

#[derive(Clone, Debug)]
struct RegistryEntry {
    declaration: CommandDeclaration,
    slot: ActionSlot,
}

/// Result of attaching an action to a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttachOutcome {
    /// The command exists and now runs the new action.
    Attached,
    /// No such canonical command; nothing changed.
    Unknown,
}

/// Frozen table of canonical commands in declaration order.
#[derive(Clone, Debug, Default)]
pub struct BindingRegistry {
    entries: IndexMap<CommandId, RegistryEntry>,
}

impl BindingRegistry {
    /// Create a new builder.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Attach `action` to `id`, replacing any earlier attachment.
    pub fn attach_action(&mut self, id: &CommandId, action: Action) -> AttachOutcome {
        match self.entries.get_mut(id) {
            Some(entry) => {
                entry.slot.attach(action);
                AttachOutcome::Attached
            }
            None => AttachOutcome::Unknown,
        }
    }

    pub fn contains(&self, id: &CommandId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn declaration(&self, id: &CommandId) -> Option<&CommandDeclaration> {
        self.entries.get(id).map(|entry| &entry.declaration)
    }

    /// The action currently attached to `id`.
    pub fn action(&self, id: &CommandId) -> Option<&Action> {
        self.entries.get(id).map(|entry| entry.slot.current())
    }

    pub fn is_attached(&self, id: &CommandId) -> bool {
        self.entries
            .get(id)
            .map(|entry| entry.slot.is_attached())
            .unwrap_or(false)
    }

    /// Default binding of `id`: declared fields plus the attached action.
    pub fn default_binding(&self, id: &CommandId) -> Option<Binding> {
        self.entries
            .get(id)
            .map(|entry| entry.declaration.to_binding(entry.slot.current().clone()))
    }

    /// Iterate declarations with their attached actions, in declaration order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&CommandDeclaration, &Action)> {
        self.entries
            .values()
            .map(|entry| (&entry.declaration, entry.slot.current()))
    }

    /// Commands that still run the placeholder action.
    pub fn unattached(&self) -> impl Iterator<Item = &CommandId> {
        self.entries
            .values()
            .filter(|entry| !entry.slot.is_attached())
            .map(|entry| &entry.declaration.id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keystroke::Modifiers;

    fn declaration(id: &str, key: &str) -> CommandDeclaration {
        CommandDeclaration::new(id, KeyChord::new(key, Modifiers::CTRL), id)
    }

    #[test]
    fn preserves_declaration_order() {
        let registry = BindingRegistry::builder()
            .declare(declaration("b.second", "b"))
            .declare(declaration("a.first", "a"))
            .build()
            .unwrap();

        let ids: Vec<_> = registry.iter().map(|(d, _)| d.id.as_str()).collect();
        assert_eq!(ids, ["b.second", "a.first"]);
    }

    #[test]
    fn rejects_duplicate_declarations() {
        let result = BindingRegistry::builder()
            .declare(declaration("file.save", "s"))
            .declare(declaration("file.save", "w"))
            .build();
        assert!(matches!(
            result,
            Err(KeymapError::DuplicateCommand(id)) if id.as_str() == "file.save"
        ));
    }

    #[test]
    fn rejects_declarations_without_contexts() {
        let empty: [&str; 0] = [];
        let result = BindingRegistry::builder()
            .declare(declaration("file.save", "s").contexts(empty))
            .build();
        assert!(matches!(result, Err(KeymapError::NoContexts(_))));
    }

    #[test]
    fn attach_replaces_placeholder() {
        let mut registry = BindingRegistry::builder()
            .declare(declaration("file.save", "s"))
            .build()
            .unwrap();
        let id = CommandId::from("file.save");

        assert!(registry.action(&id).unwrap().is_noop());
        assert_eq!(registry.unattached().count(), 1);

        let action = Action::new(|| Ok(()));
        assert_eq!(registry.attach_action(&id, action.clone()), AttachOutcome::Attached);
        assert!(registry.action(&id).unwrap().same_as(&action));
        assert!(registry.is_attached(&id));
        assert_eq!(registry.unattached().count(), 0);
    }

    #[test]
    fn attach_to_unknown_command_is_ignored() {
        let mut registry = BindingRegistry::builder()
            .declare(declaration("file.save", "s"))
            .build()
            .unwrap();

        let outcome = registry.attach_action(&CommandId::from("file.nope"), Action::new(|| Ok(())));
        assert_eq!(outcome, AttachOutcome::Unknown);
        assert!(!registry.contains(&CommandId::from("file.nope")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn default_binding_uses_current_action() {
        let mut registry = BindingRegistry::builder()
            .declare(declaration("file.save", "s").category("File"))
            .build()
            .unwrap();
        let id = CommandId::from("file.save");

        let action = Action::new(|| Ok(()));
        registry.attach_action(&id, action.clone());

        let binding = registry.default_binding(&id).unwrap();
        assert!(binding.action.same_as(&action));
        assert_eq!(binding.category.as_deref(), Some("File"));
        assert!(binding.contexts[0].is_global());
    }
}

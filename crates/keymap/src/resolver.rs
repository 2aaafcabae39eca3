//! Computes the bindings visible under the current contexts.
//!
//! Resolution is a pure function of the registry (declarations and attached
//! actions), the override store and the active contexts. The table is always
//! rebuilt from scratch.

use crate::binding::{Binding, CommandId};
use crate::context::ContextSet;
use crate::keystroke::KeyChord;
use crate::overrides::OverrideStore;
use crate::registry::BindingRegistry;
use indexmap::IndexMap;
use tracing::debug;

/// Effective binding of one command: defaults, then the attached action,
/// then any override fields.
pub fn effective_binding(
    registry: &BindingRegistry,
    overrides: &OverrideStore,
    id: &CommandId,
) -> Option<Binding> {
    let binding = registry.default_binding(id)?;
    Some(match overrides.get(id) {
        Some(ov) => binding.overlay(ov),
        None => binding,
    })
}

/// Command → effective binding for every visible command, in declaration order.
#[derive(Clone, Debug, Default)]
pub struct ResolvedBindings {
    bindings: IndexMap<CommandId, Binding>,
}

impl ResolvedBindings {
    pub fn get(&self, id: &CommandId) -> Option<&Binding> {
        self.bindings.get(id)
    }

    pub fn contains(&self, id: &CommandId) -> bool {
        self.bindings.contains_key(id)
    }

    /// Iterate in declaration order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&CommandId, &Binding)> {
        self.bindings.iter()
    }

    pub fn ids(&self) -> impl ExactSizeIterator<Item = &CommandId> {
        self.bindings.keys()
    }

    /// First visible command bound to `chord`.
    pub fn command_for_chord(&self, chord: &KeyChord) -> Option<&CommandId> {
        self.bindings
            .iter()
            .find(|(_, binding)| !binding.chord.is_unbound() && &binding.chord == chord)
            .map(|(id, _)| id)
    }

    /// Groups of visible commands that share a chord, each in declaration order.
    pub fn collisions(&self) -> Vec<(KeyChord, Vec<CommandId>)> {
        let mut by_chord: IndexMap<&KeyChord, Vec<CommandId>> = IndexMap::new();
        for (id, binding) in &self.bindings {
            if binding.chord.is_unbound() {
                continue;
            }
            by_chord.entry(&binding.chord).or_default().push(id.clone());
        }
        by_chord
            .into_iter()
            .filter(|(_, ids)| ids.len() > 1)
            .map(|(chord, ids)| (chord.clone(), ids))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Build the table of bindings whose effective contexts intersect `contexts`.
pub fn resolve(
    registry: &BindingRegistry,
    overrides: &OverrideStore,
    contexts: &ContextSet,
) -> ResolvedBindings {
    let mut bindings = IndexMap::new();
    for (declaration, _) in registry.iter() {
        let Some(binding) = effective_binding(registry, overrides, &declaration.id) else {
            continue;
        };
        if binding.applies_in(|context| contexts.contains(context)) {
            bindings.insert(declaration.id.clone(), binding);
        }
    }

    let resolved = ResolvedBindings { bindings };

    let collisions = resolved.collisions();
    for (chord, ids) in &collisions {
        let ids: Vec<&str> = ids.iter().map(CommandId::as_str).collect();
        debug!(%chord, ?ids, "visible bindings share a chord, first declared wins");
    }

    let dead = overrides
        .iter()
        .filter(|(id, _)| !registry.contains(id))
        .count();

    debug!(
        visible = resolved.len(),
        declared = registry.len(),
        active_contexts = contexts.len(),
        collisions = collisions.len(),
        dead_overrides = dead,
        "resolved bindings"
    );

    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::binding::BindingOverride;
    use crate::keystroke::Modifiers;
    use crate::registry::CommandDeclaration;

    fn registry() -> BindingRegistry {
        BindingRegistry::builder()
            .declare(CommandDeclaration::new(
                "file.save",
                KeyChord::new("s", Modifiers::CTRL),
                "Save File",
            ))
            .declare(
                CommandDeclaration::new("git.push", KeyChord::parse("ctrl-alt-p").unwrap(), "Push")
                    .contexts(["git"]),
            )
            .declare(
                CommandDeclaration::new("file.copy", KeyChord::new("c", Modifiers::CTRL), "Copy")
                    .contexts(["fileManager"]),
            )
            .build()
            .unwrap()
    }

    fn ids(resolved: &ResolvedBindings) -> Vec<&str> {
        resolved.ids().map(CommandId::as_str).collect()
    }

    #[test]
    fn global_only_shows_global_commands() {
        let resolved = resolve(&registry(), &OverrideStore::new(), &ContextSet::new());
        assert_eq!(ids(&resolved), ["file.save"]);
    }

    #[test]
    fn adding_a_context_admits_exactly_its_commands() {
        let mut contexts = ContextSet::new();
        contexts.add("git");
        let resolved = resolve(&registry(), &OverrideStore::new(), &contexts);
        assert_eq!(ids(&resolved), ["file.save", "git.push"]);
    }

    #[test]
    fn override_contexts_decide_visibility() {
        let mut overrides = OverrideStore::new();
        overrides.set(
            CommandId::from("file.copy"),
            BindingOverride::new().contexts(["global"]),
        );
        overrides.set(
            CommandId::from("file.save"),
            BindingOverride::new().contexts(["editor"]),
        );

        let resolved = resolve(&registry(), &overrides, &ContextSet::new());
        assert_eq!(ids(&resolved), ["file.copy"]);
    }

    #[test]
    fn unknown_override_never_surfaces() {
        let mut overrides = OverrideStore::new();
        overrides.set(
            CommandId::from("ghost.command"),
            BindingOverride::new().contexts(["global"]),
        );

        let resolved = resolve(&registry(), &overrides, &ContextSet::new());
        assert!(!resolved.contains(&CommandId::from("ghost.command")));
        assert_eq!(resolved.len(), 1);
    }

    #[test]
    fn action_comes_from_registry_at_resolution_time() {
        let mut registry = registry();
        let mut overrides = OverrideStore::new();
        let id = CommandId::from("file.save");
        overrides.set(id.clone(), BindingOverride::new().description("Write"));

        let action = Action::new(|| Ok(()));
        registry.attach_action(&id, action.clone());

        let resolved = resolve(&registry, &overrides, &ContextSet::new());
        let binding = resolved.get(&id).unwrap();
        assert!(binding.action.same_as(&action));
        assert_eq!(binding.description, "Write");
    }

    #[test]
    fn override_action_wins_over_attached_action() {
        let mut registry = registry();
        let id = CommandId::from("file.save");
        registry.attach_action(&id, Action::new(|| Ok(())));

        let custom = Action::new(|| Ok(()));
        let mut overrides = OverrideStore::new();
        overrides.set(id.clone(), BindingOverride::new().action(custom.clone()));

        let binding = effective_binding(&registry, &overrides, &id).unwrap();
        assert!(binding.action.same_as(&custom));
    }

    #[test]
    fn reports_chord_collisions_in_declaration_order() {
        let mut contexts = ContextSet::new();
        contexts.add("fileManager");
        let mut overrides = OverrideStore::new();
        overrides.set(
            CommandId::from("file.copy"),
            BindingOverride::new().chord(KeyChord::parse("ctrl-S").unwrap()),
        );

        let resolved = resolve(&registry(), &overrides, &contexts);
        let collisions = resolved.collisions();
        assert_eq!(collisions.len(), 1);
        let ids: Vec<_> = collisions[0].1.iter().map(CommandId::as_str).collect();
        assert_eq!(ids, ["file.save", "file.copy"]);

        let chord = KeyChord::new("s", Modifiers::CTRL);
        assert_eq!(resolved.command_for_chord(&chord).unwrap().as_str(), "file.save");
    }
}

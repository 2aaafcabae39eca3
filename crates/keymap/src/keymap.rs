//! The keymap context object.
//!
//! [`Keymap`] owns the registry, the override store and the active contexts,
//! and keeps the resolved binding table and the command directory in sync
//! with them. Every mutation recomputes both synchronously and notifies
//! subscribers before returning.

use crate::action::Action;
use crate::binding::{Binding, BindingOverride, CommandId, ContextId};
use crate::context::{ContextOwner, ContextSet};
use crate::directory::CommandDirectory;
use crate::keystroke::KeyChord;
use crate::matcher::{self, Dispatch, KeyEvent};
use crate::overrides::OverrideStore;
use crate::registry::{AttachOutcome, BindingRegistry};
use crate::resolver::{self, ResolvedBindings};
use std::sync::Arc;
use tracing::{debug, warn};

/// An opaque identifier of which version of the resolved table is current.
/// The version changes whenever the table is recomputed.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Default, Debug)]
pub struct KeymapVersion(usize);

/// Result of storing an override.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverrideOutcome {
    /// The override applies to a canonical command.
    Applied,
    /// No such canonical command. The override is kept but never surfaces.
    Unknown,
}

/// A consistent view of the derived state at one version.
#[derive(Clone, Debug)]
pub struct KeymapSnapshot {
    pub version: KeymapVersion,
    pub bindings: Arc<ResolvedBindings>,
    pub commands: Arc<CommandDirectory>,
}

/// Handle returned by [`Keymap::subscribe`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&KeymapSnapshot) + Send>;

/// Registry, overrides and contexts, plus the state derived from them.
pub struct Keymap {
    registry: BindingRegistry,
    overrides: OverrideStore,
    contexts: ContextSet,
    snapshot: KeymapSnapshot,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl Keymap {
    /// Create a keymap over `registry` with no overrides and only `global` active.
    pub fn new(registry: BindingRegistry) -> Self {
        Self::with_overrides(registry, OverrideStore::new())
    }

    /// Create a keymap with overrides supplied by the settings layer.
    pub fn with_overrides(registry: BindingRegistry, overrides: OverrideStore) -> Self {
        for (id, _) in overrides.iter() {
            if !registry.contains(id) {
                warn!(command = %id, "override for unknown command will be ignored");
            }
        }

        let contexts = ContextSet::new();
        let bindings = resolver::resolve(&registry, &overrides, &contexts);
        let commands = CommandDirectory::from_bindings(&bindings);

        Self {
            registry,
            overrides,
            contexts,
            snapshot: KeymapSnapshot {
                version: KeymapVersion::default(),
                bindings: Arc::new(bindings),
                commands: Arc::new(commands),
            },
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Get the current version of the derived state.
    pub fn version(&self) -> KeymapVersion {
        self.snapshot.version
    }

    /// The current derived state. Cheap to clone and safe to keep.
    pub fn snapshot(&self) -> KeymapSnapshot {
        self.snapshot.clone()
    }

    /// The currently visible bindings.
    pub fn bindings(&self) -> Arc<ResolvedBindings> {
        self.snapshot.bindings.clone()
    }

    /// The currently visible commands, ready for a palette.
    pub fn commands(&self) -> Arc<CommandDirectory> {
        self.snapshot.commands.clone()
    }

    pub fn registry(&self) -> &BindingRegistry {
        &self.registry
    }

    pub fn overrides(&self) -> &OverrideStore {
        &self.overrides
    }

    pub fn contexts(&self) -> &ContextSet {
        &self.contexts
    }

    /// Effective binding of `id` regardless of the active contexts.
    pub fn binding(&self, id: &CommandId) -> Option<Binding> {
        resolver::effective_binding(&self.registry, &self.overrides, id)
    }

    /// First visible command bound to `chord`.
    pub fn command_for_chord(&self, chord: &KeyChord) -> Option<CommandId> {
        self.snapshot.bindings.command_for_chord(chord).cloned()
    }

    /// Register a listener that receives every recomputed snapshot.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&KeymapSnapshot) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    /// Attach the action that runs for `id`. The latest attachment wins.
    /// Unknown commands are ignored.
    pub fn register_action(&mut self, id: impl Into<CommandId>, action: Action) -> AttachOutcome {
        let id = id.into();
        let outcome = self.registry.attach_action(&id, action);
        match outcome {
            AttachOutcome::Attached => {
                debug!(command = %id, "attached action");
                self.recompute();
            }
            AttachOutcome::Unknown => {
                warn!(command = %id, "action for unknown command ignored");
            }
        }
        outcome
    }

    /// Store `ov` for `id`, replacing any previous override.
    pub fn update_override(
        &mut self,
        id: impl Into<CommandId>,
        ov: BindingOverride,
    ) -> OverrideOutcome {
        let id = id.into();
        let outcome = if self.registry.contains(&id) {
            OverrideOutcome::Applied
        } else {
            warn!(command = %id, "override for unknown command will be ignored");
            OverrideOutcome::Unknown
        };
        self.overrides.set(id, ov);
        self.recompute();
        outcome
    }

    /// Reset `id` to its default binding.
    pub fn remove_override(&mut self, id: &CommandId) -> Option<BindingOverride> {
        let removed = self.overrides.remove(id);
        if removed.is_some() {
            self.recompute();
        }
        removed
    }

    /// Reset every command to its default binding.
    pub fn clear_overrides(&mut self) {
        if !self.overrides.is_empty() {
            self.overrides.clear();
            self.recompute();
        }
    }

    /// Replace the whole override store, e.g. after reloading settings.
    pub fn replace_overrides(&mut self, overrides: OverrideStore) {
        for (id, _) in overrides.iter() {
            if !self.registry.contains(id) {
                warn!(command = %id, "override for unknown command will be ignored");
            }
        }
        self.overrides = overrides;
        self.recompute();
    }

    /// Activate `context`. Re-adding an active context is a no-op.
    pub fn add_context(&mut self, context: impl Into<ContextId>) {
        let context = context.into();
        if self.contexts.add(context.clone()) {
            debug!(%context, "context activated");
            self.recompute();
        }
    }

    /// Deactivate `context`. `global` and inactive contexts are ignored.
    pub fn remove_context(&mut self, context: impl Into<ContextId>) {
        let context = context.into();
        if self.contexts.remove(context.clone()) {
            debug!(%context, "context deactivated");
            self.recompute();
        }
    }

    pub fn has_context(&self, context: impl Into<ContextId>) -> bool {
        self.contexts.contains(&context.into())
    }

    /// Activate `context` on behalf of `owner`.
    pub fn acquire_context(&mut self, owner: ContextOwner, context: impl Into<ContextId>) {
        let context = context.into();
        if self.contexts.acquire(owner.clone(), context.clone()) {
            debug!(%context, %owner, "context activated");
            self.recompute();
        }
    }

    /// Drop `owner`'s hold on `context`; it stays active while others hold it.
    pub fn release_context(&mut self, owner: &ContextOwner, context: impl Into<ContextId>) {
        let context = context.into();
        if self.contexts.release(owner, context.clone()) {
            debug!(%context, %owner, "context deactivated");
            self.recompute();
        }
    }

    /// Drop every hold of `owner`, e.g. when its UI element goes away.
    pub fn release_owner(&mut self, owner: &ContextOwner) {
        let released = self.contexts.release_owner(owner);
        if !released.is_empty() {
            debug!(%owner, ?released, "contexts deactivated");
            self.recompute();
        }
    }

    /// Make `context` the only active context besides `global`.
    pub fn set_exclusive_context(&mut self, context: impl Into<ContextId>) {
        let context = context.into();
        if self.contexts.set_exclusive(context.clone()) {
            debug!(%context, "context set exclusively");
            self.recompute();
        }
    }

    /// Match `event` against the visible bindings and invoke the winner.
    ///
    /// Actions cannot reach back into this keymap while it is borrowed. Hosts
    /// whose actions change the keymap use [`Keymap::match_event`] instead.
    pub fn handle_key_event(&self, event: &KeyEvent) -> Dispatch {
        matcher::dispatch(&self.snapshot.bindings, event)
    }

    /// The command and action `event` would trigger right now, without
    /// running it.
    ///
    /// The result does not borrow the keymap, so the caller can release it
    /// and then run the action through [`matcher::invoke`]. `None` covers both
    /// suppressed and unmatched events.
    pub fn match_event(&self, event: &KeyEvent) -> Option<(CommandId, Action)> {
        if event.is_suppressed() {
            return None;
        }
        matcher::find_match(&self.snapshot.bindings, event)
            .map(|(command, binding)| (command.clone(), binding.action.clone()))
    }

    fn recompute(&mut self) {
        let bindings = resolver::resolve(&self.registry, &self.overrides, &self.contexts);
        let commands = CommandDirectory::from_bindings(&bindings);

        self.snapshot = KeymapSnapshot {
            version: KeymapVersion(self.snapshot.version.0 + 1),
            bindings: Arc::new(bindings),
            commands: Arc::new(commands),
        };

        for (_, subscriber) in &mut self.subscribers {
            subscriber(&self.snapshot);
        }
    }
}

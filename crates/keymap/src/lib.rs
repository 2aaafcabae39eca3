//! Context-aware key binding resolution and dispatch.
//!
//! The crate keeps a fixed table of canonical commands, layers user
//! overrides on top, filters the result by the UI contexts that are
//! currently active, and matches physical key events against what remains.
//! The visible bindings are also exposed as a flat command list for
//! palettes, filterable with the [`fuzzy`] ranker.
//!
//! # Example
//!
//! ```
//! use keymap::{Action, Keymap, KeyEvent, Modifiers, defaults};
//!
//! let mut keymap = Keymap::new(defaults::default_registry().unwrap());
//! keymap.register_action("file.save", Action::new(|| Ok(())));
//!
//! let dispatch = keymap.handle_key_event(&KeyEvent::new("s", Modifiers::CTRL));
//! assert_eq!(dispatch.command().unwrap().as_str(), "file.save");
//!
//! keymap.add_context("git");
//! assert!(keymap.bindings().contains(&"git.push".into()));
//! ```

pub mod action;
pub mod binding;
pub mod context;
pub mod defaults;
pub mod directory;
pub mod error;
pub mod keymap;
pub mod keystroke;
pub mod matcher;
pub mod overrides;
pub mod registry;
pub mod resolver;

// Re-export main types
pub use action::{Action, ActionSlot};
pub use binding::{Binding, BindingOverride, CommandId, ContextId, ContextList, context_list};
pub use context::{ContextOwner, ContextSet};
pub use directory::{CommandDirectory, CommandEntry, format_chord};
pub use error::KeymapError;
pub use keymap::{Keymap, KeymapSnapshot, KeymapVersion, OverrideOutcome, SubscriptionId};
pub use keystroke::{KeyChord, Modifiers};
pub use matcher::{Dispatch, EventTarget, KeyEvent, dispatch, matches};
pub use overrides::{OverrideFile, OverrideStore};
pub use registry::{AttachOutcome, BindingRegistry, CommandDeclaration, RegistryBuilder};
pub use resolver::{ResolvedBindings, resolve};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_workflow() {
        // Declare a command
        let registry = BindingRegistry::builder()
            .declare(CommandDeclaration::new(
                "file.save",
                KeyChord::parse("ctrl-s").unwrap(),
                "Save File",
            ))
            .build()
            .unwrap();
        let mut keymap = Keymap::new(registry);

        // Attach its action later
        assert_eq!(
            keymap.register_action("file.save", Action::new(|| Ok(()))),
            AttachOutcome::Attached
        );

        // Dispatch a matching event
        let dispatch = keymap.handle_key_event(&KeyEvent::new("S", Modifiers::CTRL));
        assert!(dispatch.prevents_default());
    }

    #[test]
    fn palette_filtering() {
        let keymap = Keymap::new(defaults::default_registry().unwrap());
        let commands = keymap.commands();
        let hits = commands.filter("toggle");
        let ids: Vec<_> = hits.iter().map(|entry| entry.id.as_str()).collect();
        assert_eq!(ids, ["view.toggleLeftSidebar", "view.toggleRightSidebar"]);
    }
}

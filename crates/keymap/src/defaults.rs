//! Built-in commands of the editor.
//!
//! Every command starts with a no-op action; the subsystem that owns it
//! attaches the real behaviour through [`Keymap::register_action`].
//!
//! [`Keymap::register_action`]: crate::Keymap::register_action

use crate::binding::ContextId;
use crate::error::KeymapError;
use crate::keystroke::{KeyChord, Modifiers};
use crate::registry::{BindingRegistry, CommandDeclaration, RegistryBuilder};

/// Well-known context tags.
pub mod contexts {
    pub const GLOBAL: &str = super::ContextId::GLOBAL;
    pub const COMMAND_PALETTE: &str = "commandPalette";
    pub const FILE_FINDER: &str = "fileFinder";
    pub const EDITOR: &str = "editor";
    pub const AI_ASSISTANT: &str = "aiAssistant";
    pub const GIT: &str = "git";
    pub const FILE_MANAGER: &str = "fileManager";
    pub const BOTTOM_PANE: &str = "bottomPane";

    /// All well-known tags, `global` first.
    pub const ALL: &[&str] = &[
        GLOBAL,
        COMMAND_PALETTE,
        FILE_FINDER,
        EDITOR,
        AI_ASSISTANT,
        GIT,
        FILE_MANAGER,
        BOTTOM_PANE,
    ];
}

use contexts::*;

const CTRL: Modifiers = Modifiers::CTRL;
const CTRL_SHIFT: Modifiers = Modifiers::CTRL.with(Modifiers::SHIFT);
const CTRL_ALT: Modifiers = Modifiers::CTRL.with(Modifiers::ALT);
const ALT: Modifiers = Modifiers::ALT;
const NONE: Modifiers = Modifiers::NONE;

/// A command in the global context; chain `.contexts(..)` to narrow it.
fn command(
    id: &str,
    key: &str,
    modifiers: Modifiers,
    description: &str,
    category: &str,
) -> CommandDeclaration {
    CommandDeclaration::new(id, KeyChord::new(key, modifiers), description).category(category)
}

/// Declarations of the built-in commands, in precedence order.
pub fn default_declarations() -> Vec<CommandDeclaration> {
    vec![
        // General
        command("command.showCommandPalette", "p", CTRL_SHIFT, "Show Command Palette", "General"),
        command("file.showFileFinder", "p", CTRL, "Show File Finder", "File"),
        command("modal.close", "Escape", NONE, "Close Modal", "General")
            .contexts([COMMAND_PALETTE, FILE_FINDER, AI_ASSISTANT]),
        command("vim.enableMode", "j", ALT, "Enable Vim Mode", "Navigation")
            .contexts([COMMAND_PALETTE, FILE_FINDER]),
        // Navigation
        command("navigation.goToEditor", "e", CTRL_SHIFT, "Go to Editor", "Navigation"),
        command("navigation.goToSettings", ",", CTRL, "Open Settings", "Navigation"),
        command("view.toggleLeftSidebar", "b", CTRL, "Toggle Left Sidebar", "View"),
        command("view.toggleRightSidebar", "b", CTRL_SHIFT, "Toggle Right Sidebar", "View"),
        // AI assistant
        command("ai.sendMessage", "Enter", CTRL, "Send Message", "AI Assistant")
            .contexts([AI_ASSISTANT]),
        command("ai.newConversation", "n", CTRL, "New Conversation", "AI Assistant")
            .contexts([AI_ASSISTANT]),
        // Git
        command("git.commit", "Enter", CTRL, "Commit Changes", "Git").contexts([GIT]),
        command("git.push", "p", CTRL_ALT, "Push Changes", "Git").contexts([GIT]),
        command("git.pull", "l", CTRL_ALT, "Pull Changes", "Git").contexts([GIT]),
        command("git.stash", "s", CTRL_ALT, "Stash Changes", "Git").contexts([GIT]),
        // File manager
        command("file.createFile", "n", CTRL, "New File", "File Manager").contexts([FILE_MANAGER]),
        command("file.createFolder", "n", CTRL_SHIFT, "New Folder", "File Manager")
            .contexts([FILE_MANAGER]),
        command("file.delete", "Delete", NONE, "Delete Selected", "File Manager")
            .contexts([FILE_MANAGER]),
        command("file.rename", "F2", NONE, "Rename", "File Manager").contexts([FILE_MANAGER]),
        command("file.copy", "c", CTRL, "Copy", "File Manager").contexts([FILE_MANAGER]),
        command("file.paste", "v", CTRL, "Paste", "File Manager").contexts([FILE_MANAGER]),
        // Files and settings
        command("file.save", "s", CTRL, "Save File", "File"),
        command("config.open", "", NONE, "Open Editor Configuration", "Settings"),
    ]
}

/// A builder pre-populated with the built-in commands.
pub fn default_builder() -> RegistryBuilder {
    RegistryBuilder::new().declare_all(default_declarations())
}

/// The registry of built-in commands.
pub fn default_registry() -> Result<BindingRegistry, KeymapError> {
    default_builder().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::CommandId;
    use crate::directory::format_chord;

    #[test]
    fn default_registry_builds() {
        let registry = default_registry().unwrap();
        assert_eq!(registry.len(), default_declarations().len());
        assert!(registry.iter().all(|(_, action)| action.is_noop()));
    }

    #[test]
    fn declarations_use_known_contexts() {
        for declaration in default_declarations() {
            for context in &declaration.contexts {
                assert!(
                    contexts::ALL.contains(&context.as_str()),
                    "{} uses unknown context {context}",
                    declaration.id
                );
            }
        }
    }

    #[test]
    fn palette_shortcut_formats() {
        let registry = default_registry().unwrap();
        let palette = registry
            .declaration(&CommandId::from("command.showCommandPalette"))
            .unwrap();
        assert_eq!(format_chord(&palette.chord), "Ctrl+Shift+P");
    }

    #[test]
    fn config_open_has_no_shortcut() {
        let registry = default_registry().unwrap();
        let config = registry.declaration(&CommandId::from("config.open")).unwrap();
        assert!(config.chord.is_unbound());
        assert_eq!(format_chord(&config.chord), "");
    }
}

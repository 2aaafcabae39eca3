//! Loading user overrides from disk and applying them to the built-in commands.

use std::fs;

use keymap::defaults::{self, contexts};
use keymap::{CommandId, KeyChord, KeyEvent, Keymap, KeymapError, Modifiers, OverrideStore};
use tempfile::TempDir;
use test_log::test;

const OVERRIDES: &str = r#"{
    "schema_version": "1",
    "overrides": {
        "file.save": { "chord": "ctrl-shift-s", "contexts": ["editor"] },
        "config.open": { "chord": "ctrl-alt-," },
        "ghost.command": { "description": "Nothing here" }
    }
}"#;

#[test]
fn loads_and_applies_override_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("keybindings.json");
    fs::write(&path, OVERRIDES).unwrap();

    let store = OverrideStore::load(&path).unwrap();
    assert_eq!(store.len(), 3);

    let mut keymap = Keymap::with_overrides(defaults::default_registry().unwrap(), store);
    let save = CommandId::from("file.save");
    assert!(!keymap.bindings().contains(&save));
    assert!(!keymap.bindings().contains(&CommandId::from("ghost.command")));

    keymap.add_context(contexts::EDITOR);
    let save_as = KeyEvent::new("S", Modifiers::CTRL.with(Modifiers::SHIFT));
    let dispatch = keymap.handle_key_event(&save_as);
    assert_eq!(dispatch.command(), Some(&save));

    let commands = keymap.commands();
    let config = commands.get(&CommandId::from("config.open")).unwrap();
    assert_eq!(config.shortcut, "Ctrl+Alt+,");
}

#[test]
fn missing_file_means_no_overrides() {
    let dir = TempDir::new().unwrap();
    let store = OverrideStore::load(dir.path().join("absent.json")).unwrap();
    assert!(store.is_empty());
}

#[test]
fn unknown_override_fields_are_rejected() {
    let json = r#"{ "overrides": { "file.save": { "keys": "ctrl-s" } } }"#;
    let result = OverrideStore::from_json(json);
    assert!(matches!(result, Err(KeymapError::Json(_))));
}

#[test]
fn replacing_overrides_restores_defaults() {
    let mut keymap = Keymap::with_overrides(
        defaults::default_registry().unwrap(),
        OverrideStore::from_json(OVERRIDES).unwrap(),
    );
    let save = CommandId::from("file.save");
    assert!(!keymap.bindings().contains(&save));

    keymap.replace_overrides(OverrideStore::new());
    let binding = keymap.binding(&save).unwrap();
    assert_eq!(binding.chord, KeyChord::new("s", Modifiers::CTRL));
    assert!(keymap.bindings().contains(&save));
}

#[test]
fn store_round_trips_through_file_form() {
    let store = OverrideStore::from_json(OVERRIDES).unwrap();
    let json = serde_json::to_string(&store.to_file()).unwrap();
    let reloaded = OverrideStore::from_json(&json).unwrap();

    let ids: Vec<_> = reloaded.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ids, ["file.save", "config.open", "ghost.command"]);
}

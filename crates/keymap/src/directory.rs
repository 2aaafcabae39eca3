//! Flat command list for palettes and menus.

use crate::action::Action;
use crate::binding::{Binding, CommandId};
use crate::keystroke::KeyChord;
use crate::resolver::ResolvedBindings;

/// Format a chord for display, e.g. `Ctrl+Shift+P`.
///
/// Modifiers appear in declaration order (ctrl, alt, shift, meta) with their
/// first letter capitalized; the key label is upper-cased. Unbound chords
/// format as an empty string.
pub fn format_chord(chord: &KeyChord) -> String {
    if chord.is_unbound() {
        return String::new();
    }
    let mut parts: Vec<String> = chord.modifiers.names().map(capitalize).collect();
    parts.push(chord.key_name().to_uppercase());
    parts.join("+")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// A visible binding reshaped for presentation.
#[derive(Clone, Debug)]
pub struct CommandEntry {
    pub id: CommandId,
    pub label: String,
    pub category: Option<String>,
    pub shortcut: String,
    pub action: Action,
}

impl CommandEntry {
    pub fn from_binding(id: &CommandId, binding: &Binding) -> Self {
        Self {
            id: id.clone(),
            label: binding.description.clone(),
            category: binding.category.clone(),
            shortcut: format_chord(&binding.chord),
            action: binding.action.clone(),
        }
    }
}

/// Every visible command, in declaration order.
#[derive(Clone, Debug, Default)]
pub struct CommandDirectory {
    entries: Vec<CommandEntry>,
}

impl CommandDirectory {
    pub fn from_bindings(bindings: &ResolvedBindings) -> Self {
        Self {
            entries: bindings
                .iter()
                .map(|(id, binding)| CommandEntry::from_binding(id, binding))
                .collect(),
        }
    }

    pub fn entries(&self) -> &[CommandEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CommandEntry> {
        self.entries.iter()
    }

    pub fn get(&self, id: &CommandId) -> Option<&CommandEntry> {
        self.entries.iter().find(|entry| &entry.id == id)
    }

    /// Entries whose label fuzzy-matches `query`, best first.
    pub fn filter(&self, query: &str) -> Vec<&CommandEntry> {
        fuzzy::rank(&self.entries, query, |entry| entry.label.as_str()).to_vec()
    }

    /// Entries grouped by category, groups in order of first appearance.
    /// Uncategorized entries are grouped under `None`.
    pub fn by_category(&self) -> Vec<(Option<&str>, Vec<&CommandEntry>)> {
        let mut groups: Vec<(Option<&str>, Vec<&CommandEntry>)> = Vec::new();
        for entry in &self.entries {
            let category = entry.category.as_deref();
            match groups.iter_mut().find(|(c, _)| *c == category) {
                Some((_, group)) => group.push(entry),
                None => groups.push((category, vec![entry])),
            }
        }
        groups
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a CommandDirectory {
    type Item = &'a CommandEntry;
    type IntoIter = std::slice::Iter<'a, CommandEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

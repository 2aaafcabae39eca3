//! Key chord parsing and comparison.
//!
//! This module handles chord strings like "ctrl-s" or "ctrl-shift-p". A chord
//! is one key label plus an exact set of modifiers; key labels compare
//! case-insensitively.

use anyhow::{Result, bail};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Modifier keys that can be combined with a key label.
///
/// Field order is the declaration order used when formatting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    /// No modifiers pressed.
    pub const NONE: Self = Self {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };

    pub const CTRL: Self = Self {
        ctrl: true,
        ..Self::NONE
    };

    pub const ALT: Self = Self {
        alt: true,
        ..Self::NONE
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };

    pub const META: Self = Self {
        meta: true,
        ..Self::NONE
    };

    /// Union of two modifier sets.
    pub const fn with(self, other: Self) -> Self {
        Self {
            ctrl: self.ctrl || other.ctrl,
            alt: self.alt || other.alt,
            shift: self.shift || other.shift,
            meta: self.meta || other.meta,
        }
    }

    /// Check if any modifiers are set.
    pub fn is_empty(&self) -> bool {
        !self.ctrl && !self.alt && !self.shift && !self.meta
    }

    /// Names of the modifiers present, in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        [
            (self.ctrl, "ctrl"),
            (self.alt, "alt"),
            (self.shift, "shift"),
            (self.meta, "meta"),
        ]
        .into_iter()
        .filter_map(|(held, name)| held.then_some(name))
    }

    /// Create modifiers from a list of modifier names.
    pub fn from_names(names: &[&str]) -> Result<Self> {
        let mut modifiers = Self::NONE;
        for name in names {
            match name.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => modifiers.ctrl = true,
                "alt" | "option" => modifiers.alt = true,
                "shift" => modifiers.shift = true,
                "meta" | "cmd" | "command" | "super" => modifiers.meta = true,
                _ => bail!("unknown modifier: {}", name),
            }
        }
        Ok(modifiers)
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.names().collect::<Vec<_>>().join("-"))
    }
}

/// Key label the platform reports for the space bar.
pub const SPACE: &str = " ";

/// Name used for [`SPACE`] in chord strings.
const SPACE_NAME: &str = "space";

/// A key label plus the exact set of modifiers that must be held.
///
/// An empty key label denotes a command that has no shortcut and is only
/// reachable from the command palette.
#[derive(Clone, Debug, Default)]
pub struct KeyChord {
    pub key: String,
    pub modifiers: Modifiers,
}

impl KeyChord {
    /// Create a new chord.
    pub fn new(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
        }
    }

    /// A chord without a key, for palette-only commands.
    pub fn unbound() -> Self {
        Self::default()
    }

    /// Returns `true` if this chord has no key label.
    pub fn is_unbound(&self) -> bool {
        self.key.is_empty()
    }

    /// Parse a chord from a string like "ctrl-s" or "ctrl-shift-p".
    ///
    /// Format: [modifier-]*key
    /// Modifiers: ctrl/control, alt/option, shift, meta/cmd/command/super
    ///
    /// Examples:
    /// - "s" -> key 's', no modifiers
    /// - "ctrl-shift-p" -> key 'p', ctrl+shift modifiers
    /// - "ctrl--" -> key '-', ctrl modifier
    /// - "ctrl-space" -> the space bar, ctrl modifier
    /// - "" -> unbound chord
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(Self::unbound());
        }

        // A trailing "--" means the key itself is '-'.
        let (modifier_part, key) = match input.strip_suffix("--") {
            Some(rest) => (rest, "-"),
            None if input == "-" => ("", "-"),
            None => input.rsplit_once('-').unwrap_or(("", input)),
        };

        if key.is_empty() {
            bail!("empty key in chord '{input}'");
        }

        let modifier_names: Vec<&str> = if modifier_part.is_empty() {
            Vec::new()
        } else {
            modifier_part.split('-').collect()
        };
        let modifiers = Modifiers::from_names(&modifier_names)?;

        let key = if key.eq_ignore_ascii_case(SPACE_NAME) {
            SPACE
        } else {
            key
        };
        Ok(Self::new(key, modifiers))
    }

    /// The key as written in chord strings: `space` for the space bar,
    /// otherwise the label itself.
    pub fn key_name(&self) -> &str {
        if self.key == SPACE {
            SPACE_NAME
        } else {
            &self.key
        }
    }

    /// Case-insensitive comparison of key labels.
    pub fn key_matches(&self, key: &str) -> bool {
        self.key.to_lowercase() == key.to_lowercase()
    }
}

impl PartialEq for KeyChord {
    fn eq(&self, other: &Self) -> bool {
        self.modifiers == other.modifiers && self.key_matches(&other.key)
    }
}

impl Eq for KeyChord {}

impl Hash for KeyChord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.to_lowercase().hash(state);
        self.modifiers.hash(state);
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Modifiers without a key cannot fire; they are not written.
        if self.is_unbound() || self.modifiers.is_empty() {
            write!(f, "{}", self.key_name())
        } else {
            write!(f, "{}-{}", self.modifiers, self.key_name())
        }
    }
}

impl std::str::FromStr for KeyChord {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for KeyChord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for KeyChord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        KeyChord::parse(&value).map_err(serde::de::Error::custom)
    }
}

//! Matching physical key events against visible bindings.
//!
//! Matching is exact: the key label must be equal ignoring case and all four
//! modifier flags must agree. A binding for `ctrl-s` does not fire on
//! `ctrl-shift-s`. The first visible binding in declaration order wins.

use crate::action::Action;
use crate::binding::{Binding, CommandId};
use crate::keystroke::{KeyChord, Modifiers};
use crate::resolver::ResolvedBindings;
use tracing::{error, trace};

/// Key label of the confirm key.
pub const ENTER: &str = "Enter";

/// What kind of UI element a key event originated from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EventTarget {
    /// A text-editing surface. Enter pressed here never triggers a command.
    TextEditor,
    #[default]
    Other,
}

/// A physical key press.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: String,
    pub modifiers: Modifiers,
    pub target: EventTarget,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
            target: EventTarget::Other,
        }
    }

    /// Build an event from the four independent modifier flags.
    pub fn from_flags(
        key: impl Into<String>,
        ctrl: bool,
        alt: bool,
        shift: bool,
        meta: bool,
    ) -> Self {
        Self::new(
            key,
            Modifiers {
                ctrl,
                alt,
                shift,
                meta,
            },
        )
    }

    /// Mark the event as coming from `target`.
    pub fn from_target(mut self, target: EventTarget) -> Self {
        self.target = target;
        self
    }

    /// Returns `true` for Enter pressed inside a text editor.
    pub fn is_suppressed(&self) -> bool {
        self.target == EventTarget::TextEditor && self.key == ENTER
    }

    /// The chord this event represents.
    pub fn chord(&self) -> KeyChord {
        KeyChord::new(self.key.clone(), self.modifiers)
    }
}

/// Returns `true` if `event` satisfies `binding`'s chord exactly.
/// Unbound chords never match.
pub fn matches(event: &KeyEvent, binding: &Binding) -> bool {
    !binding.chord.is_unbound()
        && event.modifiers == binding.chord.modifiers
        && binding.chord.key_matches(&event.key)
}

/// Outcome of handing a key event to [`dispatch`].
#[derive(Debug)]
pub enum Dispatch {
    /// Enter inside a text editor; no matching was attempted.
    Suppressed,
    /// No visible binding matched; the event passes through untouched.
    Unmatched,
    /// The action of `command` ran and returned `Ok`.
    Handled { command: CommandId },
    /// The action of `command` ran and returned an error. The error has been
    /// logged and does not affect later dispatches.
    Failed {
        command: CommandId,
        error: anyhow::Error,
    },
}

impl Dispatch {
    /// The command whose action was invoked, if any.
    pub fn command(&self) -> Option<&CommandId> {
        match self {
            Self::Handled { command } | Self::Failed { command, .. } => Some(command),
            Self::Suppressed | Self::Unmatched => None,
        }
    }

    /// Whether the platform's default handling of the event must be skipped.
    pub fn prevents_default(&self) -> bool {
        self.command().is_some()
    }
}

/// Find the first binding in `bindings` that `event` satisfies.
pub fn find_match<'a>(
    bindings: &'a ResolvedBindings,
    event: &KeyEvent,
) -> Option<(&'a CommandId, &'a Binding)> {
    bindings.iter().find(|(_, binding)| matches(event, binding))
}

/// Match `event` against `bindings` and invoke the winning action.
pub fn dispatch(bindings: &ResolvedBindings, event: &KeyEvent) -> Dispatch {
    if event.is_suppressed() {
        trace!(key = %event.key, "enter in text editor, not dispatching");
        return Dispatch::Suppressed;
    }

    let Some((command, binding)) = find_match(bindings, event) else {
        trace!(chord = %event.chord(), "no binding matched");
        return Dispatch::Unmatched;
    };

    trace!(%command, chord = %binding.chord, "dispatching key event");
    invoke(command, &binding.action)
}

/// Run `action` on behalf of `command`, logging a failure instead of
/// propagating it.
pub fn invoke(command: &CommandId, action: &Action) -> Dispatch {
    match action.invoke() {
        Ok(()) => Dispatch::Handled {
            command: command.clone(),
        },
        Err(err) => {
            error!(%command, "action failed: {err:#}");
            Dispatch::Failed {
                command: command.clone(),
                error: err,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::context_list;

    fn binding(chord: &str) -> Binding {
        Binding {
            chord: KeyChord::parse(chord).unwrap(),
            description: chord.into(),
            category: None,
            contexts: context_list(["global"]),
            action: Action::noop(),
        }
    }

    #[test]
    fn exact_modifier_match_required() {
        let save = binding("ctrl-s");

        assert!(matches(&KeyEvent::from_flags("s", true, false, false, false), &save));
        assert!(!matches(&KeyEvent::from_flags("s", true, false, true, false), &save));
        assert!(!matches(&KeyEvent::from_flags("s", false, false, false, false), &save));
        assert!(!matches(&KeyEvent::from_flags("s", true, false, false, true), &save));
    }

    #[test]
    fn key_label_ignores_case() {
        let palette = binding("ctrl-shift-p");
        assert!(matches(&KeyEvent::new("P", Modifiers::CTRL.with(Modifiers::SHIFT)), &palette));

        let close = binding("Escape");
        assert!(matches(&KeyEvent::new("escape", Modifiers::NONE), &close));
    }

    #[test]
    fn unbound_chord_never_matches() {
        let about = binding("");
        assert!(about.chord.is_unbound());
        assert!(!matches(&KeyEvent::new("", Modifiers::NONE), &about));
    }

    #[test]
    fn enter_in_text_editor_is_suppressed() {
        let event = KeyEvent::new("Enter", Modifiers::CTRL).from_target(EventTarget::TextEditor);
        assert!(event.is_suppressed());

        let elsewhere = KeyEvent::new("Enter", Modifiers::CTRL);
        assert!(!elsewhere.is_suppressed());

        let other_key = KeyEvent::new("s", Modifiers::CTRL).from_target(EventTarget::TextEditor);
        assert!(!other_key.is_suppressed());
    }

    #[test]
    fn dispatch_outcome_reports_command() {
        let handled = Dispatch::Handled {
            command: CommandId::from("file.save"),
        };
        assert!(handled.prevents_default());
        assert_eq!(handled.command().unwrap().as_str(), "file.save");

        assert!(!Dispatch::Unmatched.prevents_default());
        assert!(!Dispatch::Suppressed.prevents_default());
    }
}

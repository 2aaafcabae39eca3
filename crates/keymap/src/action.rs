//! Executable actions attached to commands.
//!
//! Commands are declared with a no-op action and wired up later by the
//! subsystems that own the behaviour. An [`ActionSlot`] holds the currently
//! attached action for one command.

use anyhow::Result;
use std::fmt;
use std::sync::Arc;

type ActionFn = dyn Fn() -> Result<()> + Send + Sync + 'static;

/// A cheaply cloneable handle to a command's behaviour.
///
/// Long-running work should be handed off by the action itself; invoking an
/// action never waits for anything beyond the closure's own return.
#[derive(Clone)]
pub struct Action {
    run: Arc<ActionFn>,
    noop: bool,
}

impl Action {
    /// Wrap a closure as an action.
    pub fn new<F>(run: F) -> Self
    where
        F: Fn() -> Result<()> + Send + Sync + 'static,
    {
        Self {
            run: Arc::new(run),
            noop: false,
        }
    }

    /// The placeholder every command starts with.
    pub fn noop() -> Self {
        Self {
            run: Arc::new(|| Ok(())),
            noop: true,
        }
    }

    /// Helper to check if this is the placeholder action.
    pub fn is_noop(&self) -> bool {
        self.noop
    }

    /// Run the action.
    pub fn invoke(&self) -> Result<()> {
        (self.run)()
    }

    /// Returns `true` if both handles point at the same closure.
    pub fn same_as(&self, other: &Action) -> bool {
        Arc::ptr_eq(&self.run, &other.run)
    }
}

impl Default for Action {
    fn default() -> Self {
        Self::noop()
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.noop {
            write!(f, "Action(noop)")
        } else {
            write!(f, "Action({:p})", Arc::as_ptr(&self.run))
        }
    }
}

/// The attachment point for one command's action.
#[derive(Clone, Debug, Default)]
pub struct ActionSlot {
    action: Action,
    attachments: usize,
}

impl ActionSlot {
    /// Replace the attached action. The latest attachment wins.
    pub fn attach(&mut self, action: Action) {
        self.action = action;
        self.attachments += 1;
    }

    /// The currently attached action, or the no-op placeholder.
    pub fn current(&self) -> &Action {
        &self.action
    }

    pub fn is_attached(&self) -> bool {
        self.attachments > 0
    }

    /// How many times an action has been attached.
    pub fn attachments(&self) -> usize {
        self.attachments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn noop_action_succeeds() {
        let action = Action::noop();
        assert!(action.is_noop());
        assert!(action.invoke().is_ok());
    }

    #[test]
    fn action_runs_closure() {
        let counter = Arc::new(AtomicUsize::new(0));
        let c = counter.clone();
        let action = Action::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        action.invoke().unwrap();
        action.clone().invoke().unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert!(!action.is_noop());
    }

    #[test]
    fn failing_action_reports_error() {
        let action = Action::new(|| Err(anyhow::anyhow!("disk full")));
        let err = action.invoke().unwrap_err();
        assert_eq!(err.to_string(), "disk full");
    }

    #[test]
    fn slot_latest_attachment_wins() {
        let mut slot = ActionSlot::default();
        assert!(!slot.is_attached());
        assert!(slot.current().is_noop());

        let first = Action::new(|| Ok(()));
        let second = Action::new(|| Ok(()));
        slot.attach(first.clone());
        slot.attach(second.clone());

        assert!(slot.current().same_as(&second));
        assert!(!slot.current().same_as(&first));
        assert_eq!(slot.attachments(), 2);
    }
}

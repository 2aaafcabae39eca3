//! The set of currently active UI contexts.
//!
//! A context is active while at least one holder keeps it. UI elements that
//! can overlap pass their own [`ContextOwner`] so one element going away does
//! not deactivate a context another element still needs. Callers that do not
//! care use the plain `add`/`remove` pair, which share a single anonymous
//! holder and therefore behave like a simple set.
//!
//! `global` is held permanently and can never be released.

use crate::binding::ContextId;
use indexmap::IndexMap;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

/// Who holds a context.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ContextOwner {
    /// The anonymous holder used by [`ContextSet::add`] and [`ContextSet::remove`].
    Shared,
    /// A named UI element, e.g. `"file-tree#3"`.
    Named(Arc<str>),
}

impl ContextOwner {
    pub fn named(name: impl AsRef<str>) -> Self {
        Self::Named(Arc::from(name.as_ref()))
    }
}

impl fmt::Display for ContextOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shared => f.write_str("shared"),
            Self::Named(name) => f.write_str(name),
        }
    }
}

type Holders = SmallVec<[ContextOwner; 1]>;

/// Active contexts with their holders, in activation order.
#[derive(Clone, Debug)]
pub struct ContextSet {
    holders: IndexMap<ContextId, Holders>,
}

impl Default for ContextSet {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextSet {
    /// A set containing only `global`.
    pub fn new() -> Self {
        let mut holders = IndexMap::new();
        holders.insert(ContextId::global(), Holders::from_elem(ContextOwner::Shared, 1));
        Self { holders }
    }

    /// Activate `context` through the shared holder.
    ///
    /// Returns `true` if the context was not active before.
    pub fn add(&mut self, context: impl Into<ContextId>) -> bool {
        self.acquire(ContextOwner::Shared, context)
    }

    /// Drop the shared hold on `context`. `global` is ignored.
    ///
    /// Returns `true` if the context became inactive.
    pub fn remove(&mut self, context: impl Into<ContextId>) -> bool {
        self.release(&ContextOwner::Shared, context)
    }

    /// Activate `context` on behalf of `owner`. Holding twice is a no-op.
    ///
    /// Returns `true` if the context was not active before.
    pub fn acquire(&mut self, owner: ContextOwner, context: impl Into<ContextId>) -> bool {
        let context = context.into();
        match self.holders.get_mut(&context) {
            Some(holders) => {
                if !holders.contains(&owner) {
                    holders.push(owner);
                }
                false
            }
            None => {
                self.holders.insert(context, Holders::from_elem(owner, 1));
                true
            }
        }
    }

    /// Release `owner`'s hold on `context`. Unknown holds and `global` are
    /// ignored.
    ///
    /// Returns `true` if the context became inactive.
    pub fn release(&mut self, owner: &ContextOwner, context: impl Into<ContextId>) -> bool {
        let context = context.into();
        if context.is_global() {
            return false;
        }
        let Some(holders) = self.holders.get_mut(&context) else {
            return false;
        };
        holders.retain(|held| held != owner);
        if holders.is_empty() {
            self.holders.shift_remove(&context);
            true
        } else {
            false
        }
    }

    /// Release every context held by `owner`, e.g. when a UI element unmounts.
    ///
    /// Returns the contexts that became inactive.
    pub fn release_owner(&mut self, owner: &ContextOwner) -> Vec<ContextId> {
        let held: Vec<ContextId> = self
            .holders
            .iter()
            .filter(|(_, holders)| holders.contains(owner))
            .map(|(context, _)| context.clone())
            .collect();

        held.into_iter()
            .filter(|context| self.release(owner, context.clone()))
            .collect()
    }

    /// Make `context` the only active context besides `global`.
    ///
    /// Returns `true` if the active set changed.
    pub fn set_exclusive(&mut self, context: impl Into<ContextId>) -> bool {
        let context = context.into();
        let before: Vec<ContextId> = self.iter().cloned().collect();

        self.holders.retain(|id, _| id.is_global());
        self.add(context);

        before.len() != self.holders.len() || !before.iter().all(|id| self.contains(id))
    }

    /// Snapshot membership test.
    pub fn contains(&self, context: &ContextId) -> bool {
        self.holders.contains_key(context)
    }

    /// Holders of `context`, empty if inactive.
    pub fn holders(&self, context: &ContextId) -> &[ContextOwner] {
        self.holders
            .get(context)
            .map(|holders| holders.as_slice())
            .unwrap_or(&[])
    }

    /// Active contexts in activation order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &ContextId> {
        self.holders.keys()
    }

    pub fn len(&self) -> usize {
        self.holders.len()
    }

    /// Never true: `global` is always present.
    pub fn is_empty(&self) -> bool {
        self.holders.is_empty()
    }
}

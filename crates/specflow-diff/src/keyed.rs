//! Set difference over keyed, ordered collections.
//!
//! Items are matched by [`Keyed::key`] and compared with `PartialEq`, so
//! equality is field-wise and independent of any serialized form.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// A record with a key that stays stable across revisions.
pub trait Keyed {
    type Key: Eq + Hash + Clone + fmt::Debug;

    fn key(&self) -> &Self::Key;
}

/// Kind of difference for one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Added => write!(f, "added"),
            ChangeKind::Modified => write!(f, "modified"),
            ChangeKind::Removed => write!(f, "removed"),
        }
    }
}

/// One difference between the old and new collection.
#[derive(Debug, PartialEq)]
pub enum KeyedChange<'a, T> {
    /// Only in the new collection.
    Added(&'a T),
    /// Only in the old collection.
    Removed(&'a T),
    /// In both, with different content.
    Modified { old: &'a T, new: &'a T },
}

// Manual impls: derive would require `T: Clone`/`T: Copy`.
impl<T> Clone for KeyedChange<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for KeyedChange<'_, T> {}

impl<'a, T: Keyed> KeyedChange<'a, T> {
    /// The change kind.
    pub fn kind(&self) -> ChangeKind {
        match self {
            KeyedChange::Added(_) => ChangeKind::Added,
            KeyedChange::Removed(_) => ChangeKind::Removed,
            KeyedChange::Modified { .. } => ChangeKind::Modified,
        }
    }

    /// Key of the changed item.
    pub fn key(&self) -> &'a T::Key {
        self.item().key()
    }

    /// The item as it stands after the change, or the removed item.
    pub fn item(&self) -> &'a T {
        match *self {
            KeyedChange::Added(item) | KeyedChange::Removed(item) => item,
            KeyedChange::Modified { new, .. } => new,
        }
    }
}

/// Compare two keyed collections.
///
/// Added and modified items are reported in the new collection's order,
/// followed by removed items in the old collection's order. Keys are
/// expected to be unique within each collection.
pub fn diff_keyed<'a, T>(old: &'a [T], new: &'a [T]) -> Vec<KeyedChange<'a, T>>
where
    T: Keyed + PartialEq,
{
    let old_by_key: HashMap<&T::Key, &T> = old.iter().map(|item| (item.key(), item)).collect();
    let new_keys: HashSet<&T::Key> = new.iter().map(|item| item.key()).collect();

    let mut changes = Vec::new();
    for item in new {
        match old_by_key.get(item.key()) {
            None => changes.push(KeyedChange::Added(item)),
            Some(&previous) if previous != item => changes.push(KeyedChange::Modified {
                old: previous,
                new: item,
            }),
            Some(_) => {}
        }
    }
    changes.extend(
        old.iter()
            .filter(|item| !new_keys.contains(item.key()))
            .map(KeyedChange::Removed),
    );
    changes
}

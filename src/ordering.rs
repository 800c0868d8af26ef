//! Membership ordering: the reorder engine and the move session.
//!
//! A gallery's membership list is an ordered `Vec<MembershipEntry>` whose
//! `order` fields must form the contiguous range `0..N-1`, matching each
//! entry's position. Every mutation in this module ends by renumbering, so
//! the invariant holds on return.
//!
//! ## Reorder engine
//!
//! [`move_entry`] implements classic array-move semantics: the entry at the
//! source index is removed and reinserted at the destination index, shifting
//! everything strictly between the two by one position. Moving an entry onto
//! its own index is a complete no-op. Indices out of range are a programming
//! error and panic; there is no recoverable failure mode here.
//!
//! Nothing in this module persists anything. Callers apply the mutation to
//! their working copy and write out on explicit save.
//!
//! ## Move session
//!
//! [`MoveSession`] is the drag-gesture lifecycle, kept free of any event
//! binding so it works the same for pointer, keyboard, or test drivers:
//!
//! ```text
//! Idle --begin_move(entry_id)--> Moving
//! Moving --complete_move(to)--> Idle   (applies the move unless to == from)
//! Moving --cancel_move()-----> Idle   (discards, no mutation)
//! ```
//!
//! While a move is in progress, [`MoveSession::active_entry`] names the
//! entry a caller should display as the drag proxy; it is `None` again the
//! moment the session returns to idle, on every path.

use crate::types::MembershipEntry;

/// Reassign every entry's `order` field to its positional index.
///
/// The one place order values are written. Called by every mutating
/// operation in this module before returning.
pub fn renumber(entries: &mut [MembershipEntry]) {
    for (idx, entry) in entries.iter_mut().enumerate() {
        entry.order = idx as u32;
    }
}

/// Whether `order` values form the contiguous permutation `0..N-1` in
/// positional order. Used by `check` and by tests.
pub fn is_contiguous(entries: &[MembershipEntry]) -> bool {
    entries
        .iter()
        .enumerate()
        .all(|(idx, entry)| entry.order == idx as u32)
}

/// Move the entry at `from` to position `to`, then renumber.
///
/// No-op (no state change) when `from == to`. Panics if either index is out
/// of range — invalid indices are a caller bug, not a runtime condition.
pub fn move_entry(entries: &mut Vec<MembershipEntry>, from: usize, to: usize) {
    assert!(from < entries.len(), "move source {from} out of range");
    assert!(to < entries.len(), "move destination {to} out of range");
    if from == to {
        return;
    }
    let entry = entries.remove(from);
    entries.insert(to, entry);
    renumber(entries);
}

/// Remove the entry with the given membership id, then renumber.
///
/// Returns the removed entry, or `None` (list untouched) when no entry has
/// that id. Relative order of the survivors is preserved.
pub fn remove_by_id(entries: &mut Vec<MembershipEntry>, entry_id: &str) -> Option<MembershipEntry> {
    let idx = entries.iter().position(|e| e.id == entry_id)?;
    let removed = entries.remove(idx);
    renumber(entries);
    Some(removed)
}

/// Position of a membership id within the list.
pub fn position_of(entries: &[MembershipEntry], entry_id: &str) -> Option<usize> {
    entries.iter().position(|e| e.id == entry_id)
}

/// The drag-gesture lifecycle for one membership list.
///
/// At most one entry can be in motion at a time. The session holds only the
/// moving entry's id; the list itself stays with the caller and is mutated
/// exactly once, on a completing drop over a different position.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum MoveSession {
    #[default]
    Idle,
    Moving {
        entry_id: String,
    },
}

impl MoveSession {
    pub fn new() -> Self {
        Self::Idle
    }

    /// Start moving an entry. Returns false (and stays idle) when the id is
    /// not in the list or another move is already in progress.
    pub fn begin_move(&mut self, entries: &[MembershipEntry], entry_id: &str) -> bool {
        if !matches!(self, Self::Idle) {
            return false;
        }
        if position_of(entries, entry_id).is_none() {
            return false;
        }
        *self = Self::Moving {
            entry_id: entry_id.to_string(),
        };
        true
    }

    /// Drop the moving entry at `to`. Applies the reorder unless the target
    /// equals the current position; either way the session returns to idle.
    ///
    /// Returns true when the list was actually mutated.
    pub fn complete_move(&mut self, entries: &mut Vec<MembershipEntry>, to: usize) -> bool {
        let Self::Moving { entry_id } = std::mem::take(self) else {
            return false;
        };
        // The entry can have been removed out from under the session; a drop
        // with no valid source is the same as a cancel.
        let Some(from) = position_of(entries, &entry_id) else {
            return false;
        };
        if to >= entries.len() || from == to {
            return false;
        }
        move_entry(entries, from, to);
        true
    }

    /// Abandon the move in progress (drop over nothing, focus loss). Never
    /// mutates the list.
    pub fn cancel_move(&mut self) {
        *self = Self::Idle;
    }

    /// Id of the entry to show as the drag proxy, while one is in motion.
    pub fn active_entry(&self) -> Option<&str> {
        match self {
            Self::Moving { entry_id } => Some(entry_id),
            Self::Idle => None,
        }
    }
}

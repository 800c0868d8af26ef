//! The gallery editing session.
//!
//! Editing a gallery happens against a working copy of its membership list
//! and cover selection, owned exclusively by one [`GalleryEditor`]. Moves,
//! caption edits, cover changes, and removals mutate only the working copy;
//! nothing reaches the catalog until an explicit [`GalleryEditor::save`].
//! A failed save leaves both the catalog and the working copy exactly as
//! they were, so the save is retryable.
//!
//! ## Removal confirmation
//!
//! Removing an entry is a two-step interaction: [`request_removal`] parks
//! the target until the user either [`confirm_removal`]s (the entry leaves
//! the list, survivors renumbered) or [`cancel_removal`]s (nothing changes).
//! The flow is modal — one pending target at a time; a second request while
//! one is pending is an error, not a queue.
//!
//! Confirmed removal of the entry whose image is the current cover also
//! clears the cover selection. Leaving the cover pointing at an image that
//! is no longer in the gallery would hand every later consumer a dangling
//! reference.
//!
//! [`request_removal`]: GalleryEditor::request_removal
//! [`confirm_removal`]: GalleryEditor::confirm_removal
//! [`cancel_removal`]: GalleryEditor::cancel_removal

use crate::catalog::{Catalog, CatalogError};
use crate::ordering::{self, MoveSession};
use crate::types::{MembershipEntry, MembershipRow};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditError {
    #[error("Entry not found: {0}")]
    EntryNotFound(String),
    #[error("Another removal is already awaiting confirmation")]
    RemovalPending,
    #[error("No removal is awaiting confirmation")]
    NoPendingRemoval,
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// One gallery's edit-in-progress state.
#[derive(Debug)]
pub struct GalleryEditor {
    gallery_id: String,
    entries: Vec<MembershipEntry>,
    cover_image_id: Option<String>,
    session: MoveSession,
    pending_removal: Option<String>,
    dirty: bool,
}

impl GalleryEditor {
    /// Start an editing session on a gallery, copying its current state.
    pub fn open(catalog: &Catalog, gallery_id: &str) -> Result<Self, EditError> {
        let gallery = catalog
            .gallery(gallery_id)
            .ok_or_else(|| CatalogError::GalleryNotFound(gallery_id.to_string()))?;
        Ok(Self {
            gallery_id: gallery_id.to_string(),
            entries: gallery.entries.clone(),
            cover_image_id: gallery.cover_image_id.clone(),
            session: MoveSession::new(),
            pending_removal: None,
            dirty: false,
        })
    }

    pub fn gallery_id(&self) -> &str {
        &self.gallery_id
    }

    /// The working membership list, in display order.
    pub fn entries(&self) -> &[MembershipEntry] {
        &self.entries
    }

    pub fn cover_image_id(&self) -> Option<&str> {
        self.cover_image_id.as_deref()
    }

    /// Whether the working copy has unsaved changes.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Render-time cover flag for one entry of this session.
    pub fn is_cover(&self, entry: &MembershipEntry) -> bool {
        self.cover_image_id.as_deref() == Some(entry.image_id.as_str())
    }

    // =========================================================================
    // Cover and captions
    // =========================================================================

    /// Designate an image as the cover. Overwrites unconditionally — callers
    /// pass ids drawn from currently listed entries, and that convention is
    /// not re-checked here.
    pub fn set_cover(&mut self, image_id: &str) {
        self.cover_image_id = Some(image_id.to_string());
        self.dirty = true;
    }

    /// Set or clear an entry's gallery-specific caption.
    pub fn set_caption(
        &mut self,
        entry_id: &str,
        caption: Option<&str>,
    ) -> Result<(), EditError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.id == entry_id)
            .ok_or_else(|| EditError::EntryNotFound(entry_id.to_string()))?;
        entry.description = caption.map(String::from);
        self.dirty = true;
        Ok(())
    }

    // =========================================================================
    // Moves
    // =========================================================================

    /// Pick up an entry. Returns false when the id is unknown or another
    /// move is already in progress.
    pub fn begin_move(&mut self, entry_id: &str) -> bool {
        self.session.begin_move(&self.entries, entry_id)
    }

    /// Drop the moving entry at a position; applies the reorder unless the
    /// drop lands back on the source. Returns true when the list changed.
    pub fn complete_move(&mut self, to: usize) -> bool {
        let moved = self.session.complete_move(&mut self.entries, to);
        if moved {
            self.dirty = true;
        }
        moved
    }

    /// Abandon a move in progress without touching the list.
    pub fn cancel_move(&mut self) {
        self.session.cancel_move();
    }

    /// The entry being dragged, while one is.
    pub fn active_entry(&self) -> Option<&str> {
        self.session.active_entry()
    }

    // =========================================================================
    // Removal confirmation
    // =========================================================================

    /// Ask to remove an entry. The mutation is deferred until
    /// [`confirm_removal`](Self::confirm_removal).
    pub fn request_removal(&mut self, entry_id: &str) -> Result<(), EditError> {
        if self.pending_removal.is_some() {
            return Err(EditError::RemovalPending);
        }
        if !self.entries.iter().any(|e| e.id == entry_id) {
            return Err(EditError::EntryNotFound(entry_id.to_string()));
        }
        self.pending_removal = Some(entry_id.to_string());
        Ok(())
    }

    /// The entry id awaiting confirmation, if any.
    pub fn pending_removal(&self) -> Option<&str> {
        self.pending_removal.as_deref()
    }

    /// Execute the pending removal. Survivors keep their relative order and
    /// are renumbered; a cover left without its image is cleared.
    pub fn confirm_removal(&mut self) -> Result<MembershipEntry, EditError> {
        let entry_id = self
            .pending_removal
            .take()
            .ok_or(EditError::NoPendingRemoval)?;
        let removed = ordering::remove_by_id(&mut self.entries, &entry_id)
            .ok_or(EditError::EntryNotFound(entry_id))?;
        if self.cover_image_id.as_deref() == Some(removed.image_id.as_str())
            && !self.entries.iter().any(|e| e.image_id == removed.image_id)
        {
            self.cover_image_id = None;
        }
        self.dirty = true;
        Ok(removed)
    }

    /// Drop the pending removal without mutating anything.
    pub fn cancel_removal(&mut self) {
        self.pending_removal = None;
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Write the working copy through to the catalog.
    ///
    /// On failure the catalog is untouched and the session stays dirty, so
    /// the user can retry or keep editing.
    pub fn save(&mut self, catalog: &mut Catalog) -> Result<(), EditError> {
        let rows: Vec<MembershipRow> = self
            .entries
            .iter()
            .map(|e| MembershipRow {
                image_id: e.image_id.clone(),
                description: e.description.clone(),
                order: e.order,
            })
            .collect();
        catalog.save_gallery_membership(&self.gallery_id, &rows, self.cover_image_id.as_deref())?;
        // Re-read so entry ids minted by the catalog land back in the session.
        self.entries = catalog
            .list_gallery_membership(&self.gallery_id)?
            .to_vec();
        self.dirty = false;
        Ok(())
    }

    /// Throw away unsaved edits and reload from the catalog. Also resets the
    /// move session and any pending removal; the cover selection reverts
    /// with the rest of the form.
    pub fn discard(&mut self, catalog: &Catalog) -> Result<(), EditError> {
        let gallery = catalog
            .gallery(&self.gallery_id)
            .ok_or_else(|| CatalogError::GalleryNotFound(self.gallery_id.clone()))?;
        self.entries = gallery.entries.clone();
        self.cover_image_id = gallery.cover_image_id.clone();
        self.session = MoveSession::new();
        self.pending_removal = None;
        self.dirty = false;
        Ok(())
    }
}

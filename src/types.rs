//! Shared catalog record types.
//!
//! These types are serialized into the catalog JSON file and passed between
//! the store, the editing session, and the publish stage. Identifiers are
//! opaque strings minted by the catalog (short content hashes); a membership
//! entry's id is distinct from the id of the image it wraps.

use serde::{Deserialize, Serialize};

/// An image known to the catalog.
///
/// Created on ingest, mutated by `image edit`, destroyed by `image rm`
/// (subject to the cross-gallery usage check). Galleries reference images
/// by id; deleting an image never happens implicitly through gallery edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Opaque unique identifier.
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Where the image lives — a library-relative path for ingested files.
    pub url: String,
    /// Tag ids. Order is not meaningful.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// A tag. Many-to-many with images.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub name: String,
}

/// The join record linking one image into one gallery.
///
/// Carries the gallery-specific caption and the zero-based position. The
/// `order` values of a gallery's entries always form the contiguous range
/// `0..N-1`, matching positional indices; [`crate::ordering`] is the sole
/// writer responsible for restoring that invariant after a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipEntry {
    /// Opaque unique identifier of the membership itself.
    pub id: String,
    /// Id of the wrapped [`ImageRecord`].
    pub image_id: String,
    /// Gallery-specific caption, independent of the image's description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Zero-based position within the gallery.
    pub order: u32,
}

/// A gallery: an ordered membership list plus a cover selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gallery {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Image id (not membership id) of the designated cover, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image_id: Option<String>,
    pub entries: Vec<MembershipEntry>,
}

impl Gallery {
    /// Whether this entry is the gallery's cover at render time.
    ///
    /// Compares the entry's underlying image id against the cover selection,
    /// so at most one entry of a gallery can ever be flagged.
    pub fn is_cover(&self, entry: &MembershipEntry) -> bool {
        self.cover_image_id.as_deref() == Some(entry.image_id.as_str())
    }
}

/// One gallery's claim on an image, as reported by the usage check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUsage {
    pub gallery_id: String,
    pub gallery_title: String,
    /// True when the image is that gallery's cover.
    pub is_cover: bool,
}

/// A membership row as sent to `save_gallery_membership`.
///
/// The wire shape carries no entry id; the catalog matches rows back to
/// existing entries by image id to keep membership ids stable across saves.
#[derive(Debug, Clone)]
pub struct MembershipRow {
    pub image_id: String,
    pub description: Option<String>,
    pub order: u32,
}

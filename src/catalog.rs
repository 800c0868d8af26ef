//! The catalog: JSON-backed store for images, tags, and galleries.
//!
//! The catalog file is the data source for everything else — the editing
//! session reads membership lists out of it, ingest registers new images
//! into it, and publish renders from it. It is a single versioned JSON
//! document:
//!
//! ```text
//! catalog.json
//! ├── version        # format version, mismatches are an error
//! ├── seq            # id-minting counter
//! ├── images[]       # ImageRecord: id, title, description, url, tags
//! ├── tags[]         # Tag: id, name
//! └── galleries[]    # Gallery: title, cover_image_id, entries[]
//! ```
//!
//! ## Identifiers
//!
//! Ids are short hex prefixes of a SHA-256 over (kind, seed, sequence
//! number). They are opaque and unique within the catalog; nothing parses
//! them back.
//!
//! ## Deletion rules
//!
//! Removing an image from a gallery destroys only the membership entry.
//! Deleting an image record outright checks cross-gallery usage first:
//! without `force`, a referenced image refuses to go; with `force`, the
//! cascade removes its membership entries (renumbering each gallery) and
//! clears any cover selection pointing at it.
//!
//! ## Persistence
//!
//! Unlike a derived cache, the catalog is primary data — a corrupt or
//! version-mismatched file is a hard error, never silently replaced with an
//! empty catalog. Saves go through a temp file and rename.

use crate::ordering;
use crate::types::{Gallery, ImageRecord, ImageUsage, MembershipEntry, MembershipRow, Tag};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Version of the catalog format. Bump on breaking schema changes.
const CATALOG_VERSION: u32 = 1;

/// Length of minted hex ids.
const ID_LEN: usize = 12;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Catalog version {found} not supported (expected {expected})")]
    Version { found: u32, expected: u32 },
    #[error("Image not found: {0}")]
    ImageNotFound(String),
    #[error("Gallery not found: {0}")]
    GalleryNotFound(String),
    #[error("Image {0} is already in this gallery")]
    DuplicateMembership(String),
    #[error("Image {id} is used by {} galleries (pass force to cascade)", .usages.len())]
    ImageInUse { id: String, usages: Vec<ImageUsage> },
    #[error("Membership orders must be contiguous from 0: {0}")]
    InvalidOrdering(String),
}

/// The whole store. Owns every record; all mutation goes through methods
/// here so invariants (contiguous orders, unique ids) survive every write.
#[derive(Debug, Serialize, Deserialize)]
pub struct Catalog {
    pub version: u32,
    /// Monotonic counter folded into minted ids.
    seq: u64,
    images: Vec<ImageRecord>,
    tags: Vec<Tag>,
    galleries: Vec<Gallery>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::empty()
    }
}

impl Catalog {
    pub fn empty() -> Self {
        Self {
            version: CATALOG_VERSION,
            seq: 0,
            images: Vec::new(),
            tags: Vec::new(),
            galleries: Vec::new(),
        }
    }

    /// Load a catalog file. A missing file is an empty catalog (first run);
    /// anything unreadable or from another format version is an error.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        if !path.exists() {
            return Ok(Self::empty());
        }
        let content = fs::read_to_string(path)?;
        let catalog: Self = serde_json::from_str(&content)?;
        if catalog.version != CATALOG_VERSION {
            return Err(CatalogError::Version {
                found: catalog.version,
                expected: CATALOG_VERSION,
            });
        }
        Ok(catalog)
    }

    /// Write the catalog out. Goes through a sibling temp file and rename so
    /// a failed write can't truncate the existing catalog.
    pub fn save(&self, path: &Path) -> Result<(), CatalogError> {
        let json = serde_json::to_string_pretty(self)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Mint a fresh opaque id: short hex of SHA-256(kind, seed, seq).
    fn mint_id(&mut self, kind: &str, seed: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(kind.as_bytes());
        hasher.update(b"\0");
        hasher.update(seed.as_bytes());
        hasher.update(self.seq.to_le_bytes());
        self.seq += 1;
        let digest = hasher.finalize();
        format!("{:x}", digest)[..ID_LEN].to_string()
    }

    // =========================================================================
    // Images
    // =========================================================================

    pub fn images(&self) -> &[ImageRecord] {
        &self.images
    }

    pub fn image(&self, id: &str) -> Option<&ImageRecord> {
        self.images.iter().find(|i| i.id == id)
    }

    fn image_mut(&mut self, id: &str) -> Result<&mut ImageRecord, CatalogError> {
        self.images
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| CatalogError::ImageNotFound(id.to_string()))
    }

    /// Register a new image record and return its id.
    pub fn add_image(&mut self, title: &str, description: Option<&str>, url: &str) -> String {
        let id = self.mint_id("image", url);
        self.images.push(ImageRecord {
            id: id.clone(),
            title: title.to_string(),
            description: description.map(String::from),
            url: url.to_string(),
            tags: Vec::new(),
        });
        id
    }

    pub fn set_image_title(&mut self, id: &str, title: &str) -> Result<(), CatalogError> {
        self.image_mut(id)?.title = title.to_string();
        Ok(())
    }

    pub fn set_image_description(
        &mut self,
        id: &str,
        description: Option<&str>,
    ) -> Result<(), CatalogError> {
        self.image_mut(id)?.description = description.map(String::from);
        Ok(())
    }

    /// Which galleries reference this image, and whether it is their cover.
    ///
    /// A gallery whose cover points at the image counts even if the image is
    /// no longer in its membership list (possible in hand-edited catalogs).
    pub fn check_image_usage(&self, image_id: &str) -> Vec<ImageUsage> {
        self.galleries
            .iter()
            .filter(|g| {
                g.entries.iter().any(|e| e.image_id == image_id)
                    || g.cover_image_id.as_deref() == Some(image_id)
            })
            .map(|g| ImageUsage {
                gallery_id: g.id.clone(),
                gallery_title: g.title.clone(),
                is_cover: g.cover_image_id.as_deref() == Some(image_id),
            })
            .collect()
    }

    /// Delete an image record.
    ///
    /// Refuses (`ImageInUse`) when any gallery references the image and
    /// `force` is false. A forced delete cascades: membership entries for
    /// the image are removed (each gallery renumbered) and cover selections
    /// pointing at it are cleared.
    pub fn delete_image(&mut self, image_id: &str, force: bool) -> Result<(), CatalogError> {
        if self.image(image_id).is_none() {
            return Err(CatalogError::ImageNotFound(image_id.to_string()));
        }
        let usages = self.check_image_usage(image_id);
        if !usages.is_empty() && !force {
            return Err(CatalogError::ImageInUse {
                id: image_id.to_string(),
                usages,
            });
        }
        for gallery in &mut self.galleries {
            let before = gallery.entries.len();
            gallery.entries.retain(|e| e.image_id != image_id);
            if gallery.entries.len() != before {
                ordering::renumber(&mut gallery.entries);
            }
            if gallery.cover_image_id.as_deref() == Some(image_id) {
                gallery.cover_image_id = None;
            }
        }
        self.images.retain(|i| i.id != image_id);
        Ok(())
    }

    // =========================================================================
    // Tags
    // =========================================================================

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn tag(&self, id: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.id == id)
    }

    /// Find a tag by name or create it. Returns the tag id.
    pub fn ensure_tag(&mut self, name: &str) -> String {
        if let Some(tag) = self.tags.iter().find(|t| t.name == name) {
            return tag.id.clone();
        }
        let id = self.mint_id("tag", name);
        self.tags.push(Tag {
            id: id.clone(),
            name: name.to_string(),
        });
        id
    }

    /// Attach a tag to an image. Idempotent.
    pub fn tag_image(&mut self, image_id: &str, tag_id: &str) -> Result<(), CatalogError> {
        let image = self.image_mut(image_id)?;
        if !image.tags.iter().any(|t| t == tag_id) {
            image.tags.push(tag_id.to_string());
        }
        Ok(())
    }

    pub fn untag_image(&mut self, image_id: &str, tag_id: &str) -> Result<(), CatalogError> {
        self.image_mut(image_id)?.tags.retain(|t| t != tag_id);
        Ok(())
    }

    // =========================================================================
    // Galleries
    // =========================================================================

    pub fn galleries(&self) -> &[Gallery] {
        &self.galleries
    }

    pub fn gallery(&self, id: &str) -> Option<&Gallery> {
        self.galleries.iter().find(|g| g.id == id)
    }

    fn gallery_mut(&mut self, id: &str) -> Result<&mut Gallery, CatalogError> {
        self.galleries
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| CatalogError::GalleryNotFound(id.to_string()))
    }

    /// Create an empty gallery and return its id.
    pub fn create_gallery(&mut self, title: &str, description: Option<&str>) -> String {
        let id = self.mint_id("gallery", title);
        self.galleries.push(Gallery {
            id: id.clone(),
            title: title.to_string(),
            description: description.map(String::from),
            cover_image_id: None,
            entries: Vec::new(),
        });
        id
    }

    pub fn set_gallery_title(&mut self, id: &str, title: &str) -> Result<(), CatalogError> {
        self.gallery_mut(id)?.title = title.to_string();
        Ok(())
    }

    pub fn set_gallery_description(
        &mut self,
        id: &str,
        description: Option<&str>,
    ) -> Result<(), CatalogError> {
        self.gallery_mut(id)?.description = description.map(String::from);
        Ok(())
    }

    /// Delete a gallery. Its images stay in the catalog.
    pub fn delete_gallery(&mut self, id: &str) -> Result<(), CatalogError> {
        if self.gallery(id).is_none() {
            return Err(CatalogError::GalleryNotFound(id.to_string()));
        }
        self.galleries.retain(|g| g.id != id);
        Ok(())
    }

    /// Append an image to the end of a gallery. Returns the new entry id.
    ///
    /// An image can appear in a gallery at most once — the cover flag is
    /// matched by image id, so duplicates would break its exactly-one
    /// guarantee.
    pub fn add_to_gallery(
        &mut self,
        gallery_id: &str,
        image_id: &str,
    ) -> Result<String, CatalogError> {
        if self.image(image_id).is_none() {
            return Err(CatalogError::ImageNotFound(image_id.to_string()));
        }
        let entry_id = self.mint_id("entry", image_id);
        let gallery = self.gallery_mut(gallery_id)?;
        if gallery.entries.iter().any(|e| e.image_id == image_id) {
            return Err(CatalogError::DuplicateMembership(image_id.to_string()));
        }
        let order = gallery.entries.len() as u32;
        gallery.entries.push(MembershipEntry {
            id: entry_id.clone(),
            image_id: image_id.to_string(),
            description: None,
            order,
        });
        Ok(entry_id)
    }

    /// The ordered membership list of a gallery.
    pub fn list_gallery_membership(
        &self,
        gallery_id: &str,
    ) -> Result<&[MembershipEntry], CatalogError> {
        self.gallery(gallery_id)
            .map(|g| g.entries.as_slice())
            .ok_or_else(|| CatalogError::GalleryNotFound(gallery_id.to_string()))
    }

    /// Replace a gallery's membership list and cover selection wholesale.
    ///
    /// Rows must reference existing images and carry contiguous `order`
    /// values starting at 0 (in any row order — they are sorted here).
    /// Existing entry ids are preserved by matching rows to current entries
    /// by image id; unmatched rows mint fresh ids. Nothing is written until
    /// every row validates, so a failed save leaves the gallery unchanged.
    pub fn save_gallery_membership(
        &mut self,
        gallery_id: &str,
        rows: &[MembershipRow],
        cover_image_id: Option<&str>,
    ) -> Result<(), CatalogError> {
        if self.gallery(gallery_id).is_none() {
            return Err(CatalogError::GalleryNotFound(gallery_id.to_string()));
        }
        for row in rows {
            if self.image(&row.image_id).is_none() {
                return Err(CatalogError::ImageNotFound(row.image_id.clone()));
            }
        }
        let mut sorted: Vec<&MembershipRow> = rows.iter().collect();
        sorted.sort_by_key(|r| r.order);
        for (idx, row) in sorted.iter().enumerate() {
            if row.order != idx as u32 {
                return Err(CatalogError::InvalidOrdering(format!(
                    "expected order {idx}, got {}",
                    row.order
                )));
            }
        }

        // Consume old entries by image id so membership ids survive saves.
        let mut old: Vec<MembershipEntry> =
            std::mem::take(&mut self.gallery_mut(gallery_id)?.entries);
        let mut entries = Vec::with_capacity(sorted.len());
        for (idx, row) in sorted.iter().enumerate() {
            let id = match old.iter().position(|e| e.image_id == row.image_id) {
                Some(pos) => old.remove(pos).id,
                None => self.mint_id("entry", &row.image_id),
            };
            entries.push(MembershipEntry {
                id,
                image_id: row.image_id.clone(),
                description: row.description.clone(),
                order: idx as u32,
            });
        }
        let gallery = self.gallery_mut(gallery_id)?;
        gallery.entries = entries;
        gallery.cover_image_id = cover_image_id.map(String::from);
        Ok(())
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Check catalog invariants without mutating anything.
    ///
    /// Returns human-readable findings: non-contiguous orders, membership
    /// entries referencing missing images, covers absent from their own
    /// membership lists, and tag references that resolve to nothing.
    pub fn validate(&self) -> Vec<String> {
        let mut findings = Vec::new();
        for gallery in &self.galleries {
            if !ordering::is_contiguous(&gallery.entries) {
                findings.push(format!(
                    "gallery '{}' has non-contiguous order values",
                    gallery.title
                ));
            }
            for entry in &gallery.entries {
                if self.image(&entry.image_id).is_none() {
                    findings.push(format!(
                        "gallery '{}' entry {} references missing image {}",
                        gallery.title, entry.id, entry.image_id
                    ));
                }
            }
            if let Some(cover) = &gallery.cover_image_id
                && !gallery.entries.iter().any(|e| &e.image_id == cover)
            {
                findings.push(format!(
                    "gallery '{}' cover {} is not in its membership list",
                    gallery.title, cover
                ));
            }
        }
        for image in &self.images {
            for tag_id in &image.tags {
                if self.tag(tag_id).is_none() {
                    findings.push(format!(
                        "image '{}' references missing tag {}",
                        image.title, tag_id
                    ));
                }
            }
        }
        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn catalog_with_images(n: usize) -> (Catalog, Vec<String>) {
        let mut catalog = Catalog::empty();
        let ids = (0..n)
            .map(|i| catalog.add_image(&format!("Image {i}"), None, &format!("library/{i}.jpg")))
            .collect();
        (catalog, ids)
    }

    fn row(image_id: &str, order: u32) -> MembershipRow {
        MembershipRow {
            image_id: image_id.to_string(),
            description: None,
            order,
        }
    }

    // =========================================================================
    // Ids and basic CRUD
    // =========================================================================

    #[test]
    fn minted_ids_are_unique_and_short() {
        let (catalog, ids) = catalog_with_images(10);
        let mut unique = ids.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 10);
        for id in &ids {
            assert_eq!(id.len(), 12);
            assert!(catalog.image(id).is_some());
        }
    }

    #[test]
    fn same_url_twice_gets_distinct_ids() {
        let mut catalog = Catalog::empty();
        let a = catalog.add_image("A", None, "library/x.jpg");
        let b = catalog.add_image("B", None, "library/x.jpg");
        assert_ne!(a, b);
    }

    #[test]
    fn edit_image_fields() {
        let (mut catalog, ids) = catalog_with_images(1);
        catalog.set_image_title(&ids[0], "Dawn").unwrap();
        catalog
            .set_image_description(&ids[0], Some("First light"))
            .unwrap();
        let image = catalog.image(&ids[0]).unwrap();
        assert_eq!(image.title, "Dawn");
        assert_eq!(image.description.as_deref(), Some("First light"));

        catalog.set_image_description(&ids[0], None).unwrap();
        assert!(catalog.image(&ids[0]).unwrap().description.is_none());
    }

    #[test]
    fn edit_missing_image_errors() {
        let mut catalog = Catalog::empty();
        assert!(matches!(
            catalog.set_image_title("nope", "x"),
            Err(CatalogError::ImageNotFound(_))
        ));
    }

    #[test]
    fn ensure_tag_is_idempotent_by_name() {
        let mut catalog = Catalog::empty();
        let a = catalog.ensure_tag("landscape");
        let b = catalog.ensure_tag("landscape");
        let c = catalog.ensure_tag("portrait");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(catalog.tags().len(), 2);
    }

    #[test]
    fn tagging_is_idempotent() {
        let (mut catalog, ids) = catalog_with_images(1);
        let tag = catalog.ensure_tag("bw");
        catalog.tag_image(&ids[0], &tag).unwrap();
        catalog.tag_image(&ids[0], &tag).unwrap();
        assert_eq!(catalog.image(&ids[0]).unwrap().tags, vec![tag.clone()]);
        catalog.untag_image(&ids[0], &tag).unwrap();
        assert!(catalog.image(&ids[0]).unwrap().tags.is_empty());
    }

    // =========================================================================
    // Gallery membership
    // =========================================================================

    #[test]
    fn add_to_gallery_appends_with_next_order() {
        let (mut catalog, ids) = catalog_with_images(2);
        let gallery = catalog.create_gallery("Trip", None);
        catalog.add_to_gallery(&gallery, &ids[0]).unwrap();
        catalog.add_to_gallery(&gallery, &ids[1]).unwrap();
        let entries = catalog.list_gallery_membership(&gallery).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].order, 0);
        assert_eq!(entries[1].order, 1);
        assert_eq!(entries[1].image_id, ids[1]);
    }

    #[test]
    fn duplicate_membership_rejected() {
        let (mut catalog, ids) = catalog_with_images(1);
        let gallery = catalog.create_gallery("Trip", None);
        catalog.add_to_gallery(&gallery, &ids[0]).unwrap();
        assert!(matches!(
            catalog.add_to_gallery(&gallery, &ids[0]),
            Err(CatalogError::DuplicateMembership(_))
        ));
    }

    #[test]
    fn add_unknown_image_rejected() {
        let mut catalog = Catalog::empty();
        let gallery = catalog.create_gallery("Trip", None);
        assert!(matches!(
            catalog.add_to_gallery(&gallery, "ghost"),
            Err(CatalogError::ImageNotFound(_))
        ));
    }

    #[test]
    fn save_membership_replaces_order_and_cover() {
        let (mut catalog, ids) = catalog_with_images(3);
        let gallery = catalog.create_gallery("Trip", None);
        for id in &ids {
            catalog.add_to_gallery(&gallery, id).unwrap();
        }
        // Reverse the order, set a cover.
        let rows = vec![row(&ids[2], 0), row(&ids[1], 1), row(&ids[0], 2)];
        catalog
            .save_gallery_membership(&gallery, &rows, Some(&ids[1]))
            .unwrap();
        let g = catalog.gallery(&gallery).unwrap();
        let order: Vec<&str> = g.entries.iter().map(|e| e.image_id.as_str()).collect();
        assert_eq!(order, vec![&ids[2], &ids[1], &ids[0]]);
        assert!(ordering::is_contiguous(&g.entries));
        assert_eq!(g.cover_image_id.as_deref(), Some(ids[1].as_str()));
    }

    #[test]
    fn save_membership_preserves_entry_ids_across_reorder() {
        let (mut catalog, ids) = catalog_with_images(2);
        let gallery = catalog.create_gallery("Trip", None);
        let e0 = catalog.add_to_gallery(&gallery, &ids[0]).unwrap();
        let e1 = catalog.add_to_gallery(&gallery, &ids[1]).unwrap();
        let rows = vec![row(&ids[1], 0), row(&ids[0], 1)];
        catalog
            .save_gallery_membership(&gallery, &rows, None)
            .unwrap();
        let g = catalog.gallery(&gallery).unwrap();
        assert_eq!(g.entries[0].id, e1);
        assert_eq!(g.entries[1].id, e0);
    }

    #[test]
    fn save_membership_accepts_unsorted_rows() {
        let (mut catalog, ids) = catalog_with_images(2);
        let gallery = catalog.create_gallery("Trip", None);
        let rows = vec![row(&ids[1], 1), row(&ids[0], 0)];
        catalog
            .save_gallery_membership(&gallery, &rows, None)
            .unwrap();
        let g = catalog.gallery(&gallery).unwrap();
        assert_eq!(g.entries[0].image_id, ids[0]);
    }

    #[test]
    fn save_membership_rejects_gapped_orders() {
        let (mut catalog, ids) = catalog_with_images(2);
        let gallery = catalog.create_gallery("Trip", None);
        let rows = vec![row(&ids[0], 0), row(&ids[1], 2)];
        assert!(matches!(
            catalog.save_gallery_membership(&gallery, &rows, None),
            Err(CatalogError::InvalidOrdering(_))
        ));
        // Failed save leaves the gallery untouched.
        assert!(catalog.gallery(&gallery).unwrap().entries.is_empty());
    }

    #[test]
    fn save_membership_rejects_unknown_image() {
        let (mut catalog, ids) = catalog_with_images(1);
        let gallery = catalog.create_gallery("Trip", None);
        catalog.add_to_gallery(&gallery, &ids[0]).unwrap();
        let rows = vec![row("ghost", 0)];
        assert!(matches!(
            catalog.save_gallery_membership(&gallery, &rows, None),
            Err(CatalogError::ImageNotFound(_))
        ));
        assert_eq!(catalog.gallery(&gallery).unwrap().entries.len(), 1);
    }

    #[test]
    fn save_membership_drops_removed_entries() {
        let (mut catalog, ids) = catalog_with_images(3);
        let gallery = catalog.create_gallery("Trip", None);
        for id in &ids {
            catalog.add_to_gallery(&gallery, id).unwrap();
        }
        let rows = vec![row(&ids[0], 0), row(&ids[2], 1)];
        catalog
            .save_gallery_membership(&gallery, &rows, None)
            .unwrap();
        let g = catalog.gallery(&gallery).unwrap();
        assert_eq!(g.entries.len(), 2);
        assert!(!g.entries.iter().any(|e| e.image_id == ids[1]));
        assert!(ordering::is_contiguous(&g.entries));
    }

    // =========================================================================
    // Usage check and deletion
    // =========================================================================

    #[test]
    fn usage_check_reports_galleries_and_cover() {
        let (mut catalog, ids) = catalog_with_images(2);
        let g1 = catalog.create_gallery("First", None);
        let g2 = catalog.create_gallery("Second", None);
        catalog.add_to_gallery(&g1, &ids[0]).unwrap();
        catalog.add_to_gallery(&g2, &ids[0]).unwrap();
        catalog.add_to_gallery(&g2, &ids[1]).unwrap();
        catalog
            .save_gallery_membership(
                &g2,
                &[row(&ids[0], 0), row(&ids[1], 1)],
                Some(&ids[0]),
            )
            .unwrap();

        let usages = catalog.check_image_usage(&ids[0]);
        assert_eq!(usages.len(), 2);
        let second = usages.iter().find(|u| u.gallery_title == "Second").unwrap();
        assert!(second.is_cover);
        let first = usages.iter().find(|u| u.gallery_title == "First").unwrap();
        assert!(!first.is_cover);

        assert!(catalog.check_image_usage(&ids[1]).len() == 1);
    }

    #[test]
    fn unused_image_has_no_usages() {
        let (catalog, ids) = catalog_with_images(1);
        assert!(catalog.check_image_usage(&ids[0]).is_empty());
    }

    #[test]
    fn delete_unused_image_needs_no_force() {
        let (mut catalog, ids) = catalog_with_images(1);
        catalog.delete_image(&ids[0], false).unwrap();
        assert!(catalog.images().is_empty());
    }

    #[test]
    fn delete_referenced_image_without_force_refuses() {
        let (mut catalog, ids) = catalog_with_images(1);
        let gallery = catalog.create_gallery("Trip", None);
        catalog.add_to_gallery(&gallery, &ids[0]).unwrap();
        let err = catalog.delete_image(&ids[0], false).unwrap_err();
        match err {
            CatalogError::ImageInUse { usages, .. } => assert_eq!(usages.len(), 1),
            other => panic!("expected ImageInUse, got {other:?}"),
        }
        // Nothing was mutated.
        assert!(catalog.image(&ids[0]).is_some());
        assert_eq!(catalog.gallery(&gallery).unwrap().entries.len(), 1);
    }

    #[test]
    fn force_delete_cascades_membership_and_cover() {
        let (mut catalog, ids) = catalog_with_images(3);
        let gallery = catalog.create_gallery("Trip", None);
        for id in &ids {
            catalog.add_to_gallery(&gallery, id).unwrap();
        }
        let rows: Vec<MembershipRow> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| row(id, i as u32))
            .collect();
        catalog
            .save_gallery_membership(&gallery, &rows, Some(&ids[1]))
            .unwrap();

        catalog.delete_image(&ids[1], true).unwrap();

        assert!(catalog.image(&ids[1]).is_none());
        let g = catalog.gallery(&gallery).unwrap();
        assert_eq!(g.entries.len(), 2);
        assert!(ordering::is_contiguous(&g.entries));
        let remaining: Vec<&str> = g.entries.iter().map(|e| e.image_id.as_str()).collect();
        assert_eq!(remaining, vec![&ids[0], &ids[2]]);
        assert!(g.cover_image_id.is_none());
    }

    #[test]
    fn edit_gallery_fields() {
        let mut catalog = Catalog::empty();
        let gallery = catalog.create_gallery("Trip", None);
        catalog.set_gallery_title(&gallery, "Japan Trip").unwrap();
        catalog
            .set_gallery_description(&gallery, Some("Two weeks"))
            .unwrap();
        let g = catalog.gallery(&gallery).unwrap();
        assert_eq!(g.title, "Japan Trip");
        assert_eq!(g.description.as_deref(), Some("Two weeks"));
    }

    #[test]
    fn delete_gallery_keeps_images() {
        let (mut catalog, ids) = catalog_with_images(1);
        let gallery = catalog.create_gallery("Trip", None);
        catalog.add_to_gallery(&gallery, &ids[0]).unwrap();
        catalog.delete_gallery(&gallery).unwrap();
        assert!(catalog.gallery(&gallery).is_none());
        assert!(catalog.image(&ids[0]).is_some());
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    #[test]
    fn save_and_load_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("catalog.json");
        let (mut catalog, ids) = catalog_with_images(2);
        let gallery = catalog.create_gallery("Trip", Some("Two weeks in Japan"));
        catalog.add_to_gallery(&gallery, &ids[0]).unwrap();
        catalog.save(&path).unwrap();

        let loaded = Catalog::load(&path).unwrap();
        assert_eq!(loaded.images().len(), 2);
        assert_eq!(loaded.galleries().len(), 1);
        let g = loaded.gallery(&gallery).unwrap();
        assert_eq!(g.description.as_deref(), Some("Two weeks in Japan"));
        assert_eq!(g.entries.len(), 1);
    }

    #[test]
    fn load_missing_file_is_empty_catalog() {
        let tmp = TempDir::new().unwrap();
        let catalog = Catalog::load(&tmp.path().join("catalog.json")).unwrap();
        assert!(catalog.images().is_empty());
    }

    #[test]
    fn load_corrupt_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("catalog.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(Catalog::load(&path), Err(CatalogError::Json(_))));
    }

    #[test]
    fn load_wrong_version_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("catalog.json");
        let json = format!(
            r#"{{"version": {}, "seq": 0, "images": [], "tags": [], "galleries": []}}"#,
            CATALOG_VERSION + 1
        );
        fs::write(&path, json).unwrap();
        assert!(matches!(
            Catalog::load(&path),
            Err(CatalogError::Version { .. })
        ));
    }

    #[test]
    fn seq_survives_reload_so_ids_stay_unique() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("catalog.json");
        let (mut catalog, ids) = catalog_with_images(1);
        catalog.save(&path).unwrap();
        let mut reloaded = Catalog::load(&path).unwrap();
        let new_id = reloaded.add_image("Later", None, "library/0.jpg");
        assert_ne!(new_id, ids[0]);
    }

    // =========================================================================
    // Validation
    // =========================================================================

    #[test]
    fn clean_catalog_validates_clean() {
        let (mut catalog, ids) = catalog_with_images(2);
        let gallery = catalog.create_gallery("Trip", None);
        catalog.add_to_gallery(&gallery, &ids[0]).unwrap();
        catalog
            .save_gallery_membership(&gallery, &[row(&ids[0], 0)], Some(&ids[0]))
            .unwrap();
        assert!(catalog.validate().is_empty());
    }

    #[test]
    fn validate_reports_dangling_cover() {
        let (mut catalog, ids) = catalog_with_images(2);
        let gallery = catalog.create_gallery("Trip", None);
        catalog.add_to_gallery(&gallery, &ids[0]).unwrap();
        // Cover points at an image not in the membership list.
        catalog
            .save_gallery_membership(&gallery, &[row(&ids[0], 0)], Some(&ids[1]))
            .unwrap();
        let findings = catalog.validate();
        assert_eq!(findings.len(), 1);
        assert!(findings[0].contains("cover"));
    }

    #[test]
    fn validate_reports_missing_tag_reference() {
        let (mut catalog, ids) = catalog_with_images(1);
        let tag = catalog.ensure_tag("temp");
        catalog.tag_image(&ids[0], &tag).unwrap();
        catalog.tags.retain(|t| t.id != tag);
        let findings = catalog.validate();
        assert!(findings.iter().any(|f| f.contains("missing tag")));
    }
}

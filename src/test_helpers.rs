//! Shared test utilities.
//!
//! Provides the seeded "Coastline" catalog most suites edit against, plus
//! lookup helpers that panic with the available candidates on a miss —
//! a failing test names what it wanted and what was actually there.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let (catalog, gallery_id, images) = coastline_catalog();
//! let gallery = find_gallery(&catalog, "Coastline");
//! assert_eq!(entry_image_ids(gallery), images);
//! ```

use crate::catalog::Catalog;
use crate::types::Gallery;

/// A catalog with one gallery, "Coastline", holding three images in order:
/// Dawn, Ridge, Harbor. No cover selected, no captions.
///
/// Returns `(catalog, gallery_id, image_ids)`.
pub fn coastline_catalog() -> (Catalog, String, Vec<String>) {
    let mut catalog = Catalog::empty();
    let images: Vec<String> = ["Dawn", "Ridge", "Harbor"]
        .iter()
        .enumerate()
        .map(|(i, title)| catalog.add_image(title, None, &format!("im{i}.jpg")))
        .collect();
    let gallery = catalog.create_gallery("Coastline", None);
    for id in &images {
        catalog.add_to_gallery(&gallery, id).unwrap();
    }
    (catalog, gallery, images)
}

/// Find a gallery by title. Panics with the available titles on a miss.
pub fn find_gallery<'a>(catalog: &'a Catalog, title: &str) -> &'a Gallery {
    catalog
        .galleries()
        .iter()
        .find(|g| g.title == title)
        .unwrap_or_else(|| {
            let titles: Vec<&str> = catalog.galleries().iter().map(|g| g.title.as_str()).collect();
            panic!("gallery '{title}' not found. Available: {titles:?}")
        })
}

/// Image ids of a gallery's entries, in membership order.
pub fn entry_image_ids(gallery: &Gallery) -> Vec<String> {
    gallery.entries.iter().map(|e| e.image_id.clone()).collect()
}

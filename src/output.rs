//! CLI output formatting.
//!
//! Output is information-centric, not id-centric: every entity displays as
//! a 1-based positional index plus its title, with ids, sources, and flags
//! as indented context lines. Each command has a `format_*` function that
//! returns lines (pure, testable) and a `print_*` wrapper that writes them
//! to stdout.
//!
//! ```text
//! Galleries
//! 001 Coastline (3 images)
//!     Id: 4c1f0a9b2e77
//!     001 Dawn [cover]
//!         Entry: 9b2e774c1f0a
//!         Caption: Low tide
//!     002 Ridge
//!         Entry: 2e774c1f0a9b
//!     003 Harbor
//!         Entry: 774c1f0a9b2e
//! ```

use crate::catalog::Catalog;
use crate::render::PublishSummary;
use crate::types::{Gallery, ImageUsage};
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{pos:0>3}")
}

/// 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Header line for an entity: index + title, optional image count.
fn entity_header(index: usize, title: &str, count: Option<usize>) -> String {
    match count {
        Some(n) => format!("{} {} ({} images)", format_index(index), title, n),
        None => format!("{} {}", format_index(index), title),
    }
}

// ============================================================================
// Catalog listings
// ============================================================================

/// One gallery with its membership list.
pub fn format_gallery(catalog: &Catalog, gallery: &Gallery, index: usize) -> Vec<String> {
    let mut lines = vec![
        entity_header(index, &gallery.title, Some(gallery.entries.len())),
        format!("{}Id: {}", indent(1), gallery.id),
    ];
    if let Some(desc) = &gallery.description {
        lines.push(format!("{}Description: {}", indent(1), desc));
    }
    for (pos, entry) in gallery.entries.iter().enumerate() {
        let title = catalog
            .image(&entry.image_id)
            .map(|i| i.title.as_str())
            .unwrap_or("(missing image)");
        let cover = if gallery.is_cover(entry) { " [cover]" } else { "" };
        lines.push(format!(
            "{}{}{cover}",
            indent(1),
            entity_header(pos + 1, title, None)
        ));
        lines.push(format!("{}Entry: {}", indent(2), entry.id));
        if let Some(caption) = &entry.description {
            lines.push(format!("{}Caption: {}", indent(2), caption));
        }
    }
    lines
}

/// All galleries.
pub fn format_gallery_listing(catalog: &Catalog) -> Vec<String> {
    let mut lines = vec!["Galleries".to_string()];
    if catalog.galleries().is_empty() {
        lines.push(format!("{}(none)", indent(1)));
        return lines;
    }
    for (idx, gallery) in catalog.galleries().iter().enumerate() {
        lines.extend(format_gallery(catalog, gallery, idx + 1));
    }
    lines
}

/// All images with their ids, sources, and tags.
pub fn format_image_listing(catalog: &Catalog) -> Vec<String> {
    let mut lines = vec!["Images".to_string()];
    if catalog.images().is_empty() {
        lines.push(format!("{}(none)", indent(1)));
        return lines;
    }
    for (idx, image) in catalog.images().iter().enumerate() {
        lines.push(entity_header(idx + 1, &image.title, None));
        lines.push(format!("{}Id: {}", indent(1), image.id));
        lines.push(format!("{}Source: {}", indent(1), image.url));
        if let Some(desc) = &image.description {
            lines.push(format!("{}Description: {}", indent(1), desc));
        }
        if !image.tags.is_empty() {
            let names: Vec<&str> = image
                .tags
                .iter()
                .filter_map(|id| catalog.tag(id).map(|t| t.name.as_str()))
                .collect();
            lines.push(format!("{}Tags: {}", indent(1), names.join(", ")));
        }
    }
    lines
}

// ============================================================================
// Deletion dialog
// ============================================================================

/// The usage report shown before confirming an image deletion.
pub fn format_usage_report(image_title: &str, usages: &[ImageUsage]) -> Vec<String> {
    if usages.is_empty() {
        return vec![format!("'{image_title}' is not used by any gallery.")];
    }
    let mut lines = vec![format!(
        "'{image_title}' is used by {} galleries:",
        usages.len()
    )];
    for (idx, usage) in usages.iter().enumerate() {
        let cover = if usage.is_cover { " [cover]" } else { "" };
        lines.push(format!(
            "{}{}{cover}",
            indent(1),
            entity_header(idx + 1, &usage.gallery_title, None)
        ));
    }
    lines.push("Deleting removes it from these galleries.".to_string());
    if usages.iter().any(|u| u.is_cover) {
        lines.push("Galleries using it as cover will need a new one.".to_string());
    }
    lines
}

// ============================================================================
// Publish
// ============================================================================

pub fn format_publish_summary(summary: &PublishSummary, output: &Path) -> Vec<String> {
    vec![format!(
        "Published {} galleries, {} images -> {}",
        summary.galleries,
        summary.images_copied,
        output.display()
    )]
}

// ============================================================================
// Print wrappers
// ============================================================================

pub fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

pub fn print_gallery_listing(catalog: &Catalog) {
    print_lines(&format_gallery_listing(catalog));
}

pub fn print_image_listing(catalog: &Catalog) {
    print_lines(&format_image_listing(catalog));
}

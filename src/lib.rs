//! # Gal Curator
//!
//! A catalog-driven gallery curator and static publisher for photography
//! collections. A single JSON catalog is the data source: it holds image
//! records, tags, and galleries — ordered membership lists with a cover
//! selection — and the CLI edits it through explicit, confirmable
//! operations before a `publish` run renders everything to plain HTML.
//!
//! # Architecture: Catalog → Curate → Publish
//!
//! ```text
//! 1. Ingest    photos/    →  library/ + catalog.json   (files → records)
//! 2. Curate    catalog    →  catalog.json              (order, covers, captions)
//! 3. Publish   catalog    →  dist/                     (themed HTML site)
//! ```
//!
//! Curation never mutates the catalog directly: gallery edits run in a
//! [`editing::GalleryEditor`] session against a working copy, and the
//! catalog changes only on an explicit save. Destructive operations are
//! gated twice — membership removal behind a pending-confirmation step, and
//! image deletion behind a [`confirm::DeletionDialog`] that reports which
//! galleries the deletion would cascade through before asking for the
//! force flag.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`catalog`] | JSON-backed store: images, tags, galleries; usage checks; force-delete cascade |
//! | [`ordering`] | Reorder engine — array-move + renumber — and the move-session lifecycle |
//! | [`editing`] | Gallery editing session: working membership copy, cover, captions, explicit save |
//! | [`confirm`] | Image-deletion dialog: usage-check lifecycle, stale-result tokens, force derivation |
//! | [`ingest`] | Ingestion pipeline: hash, copy, identify, thumbnail, register; thumbnail cache |
//! | [`imaging`] | Imaging seam: identify + thumbnail behind a trait, pure-Rust implementation |
//! | [`naming`] | `NNN-name` filename convention, title resolution, slug sanitization |
//! | [`config`] | `config.toml` loading/merging/validation, display modes, theme CSS |
//! | [`render`] | Maud HTML generation: index + gallery pages in grid/carousel/slideshow |
//! | [`output`] | Information-first CLI output formatting |
//! | [`types`] | Shared catalog records |
//!
//! # Design Decisions
//!
//! ## One JSON File Over a Database
//!
//! The catalog is a single versioned JSON document read and written whole.
//! Collections small enough to curate by hand are small enough to
//! serialize in one piece, and a human-readable catalog can be inspected,
//! diffed, and backed up with ordinary tools. There is exactly one writer
//! (the CLI process), so the file needs rename-atomicity, not locking.
//!
//! ## Contiguous Order Values
//!
//! Membership order is stored explicitly (`0..N-1`, matching positions)
//! rather than derived from array order alone, and [`ordering`] is the
//! only code that writes it. Every mutation renumbers before returning, so
//! consumers never see gaps or duplicates no matter how entries were
//! moved or removed.
//!
//! ## Content-Addressed Library
//!
//! Ingested originals are stored under a SHA-256 prefix of their content.
//! Re-ingesting the same bytes — from a renamed file, a second copy, a
//! re-run import — is a no-op, and thumbnail caching can key off the same
//! hash.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/): compile-time
//! checked templates, type-safe interpolation, XSS-safe by default, and no
//! template directory to ship or drift out of sync.
//!
//! ## Pure-Rust Imaging
//!
//! Thumbnails come from the `image` crate (Lanczos3 resampling) — no
//! ImageMagick, no system dependencies. The binary is self-contained, and
//! the imaging seam is a two-method trait so the whole ingest pipeline
//! tests against a recording mock without decoding a pixel.

pub mod catalog;
pub mod config;
pub mod confirm;
pub mod editing;
pub mod imaging;
pub mod ingest;
pub mod naming;
pub mod ordering;
pub mod output;
pub mod render;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;

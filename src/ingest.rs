//! Image ingestion: from a source file to a registered catalog record.
//!
//! Ingesting an image runs a short pipeline:
//!
//! ```text
//! hash source -> copy into library/ -> identify -> thumbnail -> register
//! ```
//!
//! Library files are content-addressed: the original is stored as
//! `<hash>.<ext>` and its thumbnail as `thumbs/<hash>.jpg`, so re-ingesting
//! the same bytes is a no-op and renamed source files never duplicate.
//! Ingesting a file whose content is already registered returns the
//! existing record instead of minting a second one.
//!
//! ## Thumbnail cache
//!
//! Thumbnail encoding is the expensive step, so it goes through a
//! [`ThumbCache`]: an explicit, caller-constructed object persisted next to
//! the thumbnails. A hit requires the stored params hash to match the
//! current [`ThumbnailSpec`] and the thumbnail file to still exist — config
//! changes re-encode, deleted files re-encode, nothing else does. The cache
//! is passed in by the caller; there is no ambient global state.
//!
//! ## Bulk ingest
//!
//! [`ingest_many`] splits the pipeline in two: the expensive per-file work
//! (hash, copy, identify, encode) fans out over rayon, then registration
//! mutates the catalog sequentially. Errors are per-file; one unreadable
//! source doesn't abort the batch.

use crate::catalog::Catalog;
use crate::imaging::{ImageOps, ImagingError, ThumbnailSpec};
use crate::naming;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Imaging(#[from] ImagingError),
    #[error("Source file not found: {0}")]
    SourceNotFound(PathBuf),
    #[error("Not a supported image format: {0}")]
    UnsupportedFormat(PathBuf),
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tif", "tiff", "webp"];

/// Length of the content-hash prefix used for library filenames.
const STEM_LEN: usize = 12;

/// Whether a path looks like an ingestable image (by extension).
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Subdirectory of the library holding thumbnails.
pub fn thumbs_dir(library: &Path) -> PathBuf {
    library.join("thumbs")
}

/// Thumbnail path (relative to the library) for a stored original.
pub fn thumb_rel(url: &str) -> String {
    let stem = Path::new(url)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    format!("thumbs/{stem}.jpg")
}

/// SHA-256 of a file's contents as a hex string. Content-based rather than
/// mtime-based so it survives `git checkout` and file copies.
pub fn hash_file(path: &Path) -> std::io::Result<String> {
    let bytes = fs::read(path)?;
    let digest = Sha256::digest(&bytes);
    Ok(format!("{digest:x}"))
}

/// SHA-256 over the thumbnail parameters. Any config change invalidates
/// previously encoded thumbnails.
pub fn hash_thumb_params(spec: &ThumbnailSpec) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"thumb\0");
    hasher.update(spec.aspect.0.to_le_bytes());
    hasher.update(spec.aspect.1.to_le_bytes());
    hasher.update(spec.short_edge.to_le_bytes());
    hasher.update([spec.quality]);
    format!("{:x}", hasher.finalize())
}

/// Name of the cache manifest inside the thumbs directory.
const CACHE_FILENAME: &str = ".thumb-cache.json";

/// Content-addressed record of which thumbnails were encoded with which
/// parameters. Constructed by the caller, passed into ingest, saved
/// explicitly — lifecycle is always visible at the call site.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ThumbCache {
    /// thumbnail filename → params hash it was encoded with.
    entries: HashMap<String, String>,
}

impl ThumbCache {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load from the thumbs directory. A missing or unreadable manifest is
    /// an empty cache — the penalty is re-encoding, never wrong output.
    pub fn load(library: &Path) -> Self {
        let path = thumbs_dir(library).join(CACHE_FILENAME);
        fs::read_to_string(&path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }

    pub fn save(&self, library: &Path) -> std::io::Result<()> {
        let dir = thumbs_dir(library);
        fs::create_dir_all(&dir)?;
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(dir.join(CACHE_FILENAME), json)
    }

    /// Whether `thumb_name` is already encoded with these parameters and
    /// still on disk.
    pub fn is_fresh(&self, library: &Path, thumb_name: &str, params_hash: &str) -> bool {
        self.entries.get(thumb_name).map(String::as_str) == Some(params_hash)
            && thumbs_dir(library).join(thumb_name).exists()
    }

    pub fn record(&mut self, thumb_name: &str, params_hash: &str) {
        self.entries
            .insert(thumb_name.to_string(), params_hash.to_string());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One file to ingest, with optional user-supplied metadata.
#[derive(Debug, Clone)]
pub struct IngestRequest {
    pub source: PathBuf,
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

impl IngestRequest {
    pub fn file(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            title: None,
            description: None,
            tags: Vec::new(),
        }
    }
}

/// What ingesting one file produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOutcome {
    pub image_id: String,
    /// False when the content was already registered.
    pub created: bool,
    /// True when the thumbnail came from the cache instead of the encoder.
    pub thumb_cached: bool,
}

/// Per-file work that needs no catalog access: everything up to
/// registration. Safe to run in parallel.
struct Prepared {
    url: String,
    title: String,
    description: Option<String>,
    tags: Vec<String>,
    thumb_cached: bool,
    thumb_name: String,
    params_hash: String,
}

fn prepare(
    library: &Path,
    imaging: &impl ImageOps,
    spec: &ThumbnailSpec,
    cache: &ThumbCache,
    request: &IngestRequest,
) -> Result<Prepared, IngestError> {
    let source = &request.source;
    if !source.exists() {
        return Err(IngestError::SourceNotFound(source.clone()));
    }
    if !is_image_file(source) {
        return Err(IngestError::UnsupportedFormat(source.clone()));
    }

    let hash = hash_file(source)?;
    let stem = &hash[..STEM_LEN];
    let ext = source
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let url = format!("{stem}.{ext}");

    fs::create_dir_all(library)?;
    let stored = library.join(&url);
    if !stored.exists() {
        fs::copy(source, &stored)?;
    }

    // Decodability gate: a file with an image extension but broken content
    // fails here, before it can enter the catalog.
    imaging.identify(&stored)?;

    let thumb_name = format!("{stem}.jpg");
    let params_hash = hash_thumb_params(spec);
    let thumb_cached = cache.is_fresh(library, &thumb_name, &params_hash);
    if !thumb_cached {
        fs::create_dir_all(thumbs_dir(library))?;
        imaging.thumbnail(&stored, &thumbs_dir(library).join(&thumb_name), spec)?;
    }

    let file_stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let parsed = naming::parse_source_stem(&file_stem);
    let title = naming::resolve_title(&[request.title.as_deref(), parsed.title.as_deref()])
        .unwrap_or_else(|| stem.to_string());

    Ok(Prepared {
        url,
        title,
        description: request.description.clone(),
        tags: request.tags.clone(),
        thumb_cached,
        thumb_name,
        params_hash,
    })
}

fn register(catalog: &mut Catalog, cache: &mut ThumbCache, prepared: Prepared) -> IngestOutcome {
    if !prepared.thumb_cached {
        cache.record(&prepared.thumb_name, &prepared.params_hash);
    }
    if let Some(existing) = catalog.images().iter().find(|i| i.url == prepared.url) {
        return IngestOutcome {
            image_id: existing.id.clone(),
            created: false,
            thumb_cached: prepared.thumb_cached,
        };
    }
    let image_id = catalog.add_image(
        &prepared.title,
        prepared.description.as_deref(),
        &prepared.url,
    );
    for tag_name in &prepared.tags {
        let tag_id = catalog.ensure_tag(tag_name);
        // The image was just added; tagging it cannot fail.
        let _ = catalog.tag_image(&image_id, &tag_id);
    }
    IngestOutcome {
        image_id,
        created: true,
        thumb_cached: prepared.thumb_cached,
    }
}

/// Ingest a single file.
pub fn ingest(
    catalog: &mut Catalog,
    library: &Path,
    imaging: &impl ImageOps,
    spec: &ThumbnailSpec,
    cache: &mut ThumbCache,
    request: &IngestRequest,
) -> Result<IngestOutcome, IngestError> {
    let prepared = prepare(library, imaging, spec, cache, request)?;
    Ok(register(catalog, cache, prepared))
}

/// Ingest a batch: expensive per-file work in parallel, registration
/// sequential. Results line up with the requests.
pub fn ingest_many(
    catalog: &mut Catalog,
    library: &Path,
    imaging: &(impl ImageOps + Sync),
    spec: &ThumbnailSpec,
    cache: &mut ThumbCache,
    requests: &[IngestRequest],
) -> Vec<Result<IngestOutcome, IngestError>> {
    let cache_ref: &ThumbCache = cache;
    let prepared: Vec<Result<Prepared, IngestError>> = requests
        .par_iter()
        .map(|request| prepare(library, imaging, spec, cache_ref, request))
        .collect();

    prepared
        .into_iter()
        .map(|result| result.map(|p| register(catalog, cache, p)))
        .collect()
}

/// Collect image files under a directory for import, ordered by the
/// `NNN-name` convention: numbered files first by number, then unnumbered
/// ones by name. Subdirectories are walked depth-first.
pub fn scan_import_dir(dir: &Path) -> Result<Vec<PathBuf>, IngestError> {
    let mut found: Vec<(u32, String, PathBuf)> = Vec::new();
    for entry in walkdir::WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| IngestError::Io(e.into()))?;
        let path = entry.path();
        if !entry.file_type().is_file() || !is_image_file(path) {
            continue;
        }
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let seq = naming::parse_source_stem(&stem).seq.unwrap_or(u32::MAX);
        found.push((seq, stem, path.to_path_buf()));
    }
    found.sort();
    Ok(found.into_iter().map(|(_, _, path)| path).collect())
}

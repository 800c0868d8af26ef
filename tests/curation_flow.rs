//! End-to-end curation flow against the public API with real image files:
//! ingest → gallery → reorder → cover → save → delete → publish.

use gal_curator::catalog::{Catalog, CatalogError};
use gal_curator::config::AppConfig;
use gal_curator::confirm::{DeletionDialog, UsageState};
use gal_curator::editing::GalleryEditor;
use gal_curator::imaging::{RustImaging, ThumbnailSpec};
use gal_curator::ingest::{self, IngestRequest, ThumbCache};
use gal_curator::render;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Write a real PNG the ingest pipeline can decode. Colors differ so
/// content hashes differ.
fn write_png(dir: &Path, name: &str, shade: u8) -> PathBuf {
    let path = dir.join(name);
    let img = image::RgbImage::from_pixel(48, 32, image::Rgb([shade, shade, 200]));
    img.save(&path).unwrap();
    path
}

struct Workspace {
    _tmp: TempDir,
    root: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().to_path_buf();
        Self { _tmp: tmp, root }
    }

    fn library(&self) -> PathBuf {
        self.root.join("library")
    }

    fn catalog_path(&self) -> PathBuf {
        self.root.join("catalog.json")
    }
}

/// Ingest three photos and put them in a "Coastline" gallery.
fn seed(ws: &Workspace) -> (Catalog, String, Vec<String>) {
    let sources = ws.root.join("photos");
    fs::create_dir_all(&sources).unwrap();
    let paths = vec![
        write_png(&sources, "010-dawn.png", 40),
        write_png(&sources, "020-ridge.png", 120),
        write_png(&sources, "030-harbor.png", 220),
    ];

    let mut catalog = Catalog::empty();
    let mut cache = ThumbCache::empty();
    let requests: Vec<IngestRequest> = paths.iter().map(IngestRequest::file).collect();
    let results = ingest::ingest_many(
        &mut catalog,
        &ws.library(),
        &RustImaging,
        &ThumbnailSpec::default(),
        &mut cache,
        &requests,
    );
    cache.save(&ws.library()).unwrap();

    let image_ids: Vec<String> = results
        .into_iter()
        .map(|r| r.unwrap().image_id)
        .collect();

    let gallery = catalog.create_gallery("Coastline", Some("Three mornings"));
    for id in &image_ids {
        catalog.add_to_gallery(&gallery, id).unwrap();
    }
    (catalog, gallery, image_ids)
}

#[test]
fn ingest_registers_ordered_titles_and_library_files() {
    let ws = Workspace::new();
    let (catalog, gallery, _) = seed(&ws);

    let titles: Vec<&str> = catalog
        .list_gallery_membership(&gallery)
        .unwrap()
        .iter()
        .map(|e| catalog.image(&e.image_id).unwrap().title.as_str())
        .collect();
    assert_eq!(titles, vec!["dawn", "ridge", "harbor"]);

    for image in catalog.images() {
        assert!(ws.library().join(&image.url).exists());
        assert!(ws.library().join(ingest::thumb_rel(&image.url)).exists());
    }
}

#[test]
fn edit_session_reorders_and_persists_through_reload() {
    let ws = Workspace::new();
    let (mut catalog, gallery, images) = seed(&ws);

    let mut editor = GalleryEditor::open(&catalog, &gallery).unwrap();
    let first = editor.entries()[0].id.clone();
    assert!(editor.begin_move(&first));
    assert!(editor.complete_move(2));
    editor.set_cover(&images[2]);
    editor.save(&mut catalog).unwrap();
    catalog.save(&ws.catalog_path()).unwrap();

    let reloaded = Catalog::load(&ws.catalog_path()).unwrap();
    let entries = reloaded.list_gallery_membership(&gallery).unwrap();
    let order: Vec<&str> = entries.iter().map(|e| e.image_id.as_str()).collect();
    assert_eq!(order, vec![&images[1], &images[2], &images[0]]);
    for (idx, entry) in entries.iter().enumerate() {
        assert_eq!(entry.order, idx as u32);
    }
    assert_eq!(
        reloaded.gallery(&gallery).unwrap().cover_image_id.as_deref(),
        Some(images[2].as_str())
    );
}

#[test]
fn cancelled_removal_keeps_everything() {
    let ws = Workspace::new();
    let (catalog, gallery, images) = seed(&ws);

    let mut editor = GalleryEditor::open(&catalog, &gallery).unwrap();
    let target = editor.entries()[1].id.clone();
    editor.request_removal(&target).unwrap();
    editor.cancel_removal();

    let order: Vec<&str> = editor.entries().iter().map(|e| e.image_id.as_str()).collect();
    assert_eq!(order, images.iter().map(String::as_str).collect::<Vec<_>>());
    assert!(!editor.is_dirty());
}

#[test]
fn deletion_dialog_drives_a_forced_cascade() {
    let ws = Workspace::new();
    let (mut catalog, gallery, images) = seed(&ws);

    // Make the doomed image the cover first.
    let mut editor = GalleryEditor::open(&catalog, &gallery).unwrap();
    editor.set_cover(&images[0]);
    editor.save(&mut catalog).unwrap();

    let mut dialog = DeletionDialog::new();
    let token = dialog.open(&images[0]).unwrap();
    dialog.resolve_usage(token, Ok(catalog.check_image_usage(&images[0])));

    match dialog.usage() {
        Some(UsageState::Ready(usages)) => {
            assert_eq!(usages.len(), 1);
            assert_eq!(usages[0].gallery_title, "Coastline");
            assert!(usages[0].is_cover);
        }
        other => panic!("expected resolved usage, got {other:?}"),
    }

    let request = dialog.confirm().unwrap();
    assert!(request.force);
    catalog.delete_image(&request.image_id, request.force).unwrap();

    let g = catalog.gallery(&gallery).unwrap();
    assert_eq!(g.entries.len(), 2);
    assert!(g.cover_image_id.is_none());
    assert!(catalog.image(&images[0]).is_none());
}

#[test]
fn unreferenced_delete_is_plain_and_refused_when_referenced() {
    let ws = Workspace::new();
    let (mut catalog, _, images) = seed(&ws);

    // Referenced without force: refused.
    assert!(matches!(
        catalog.delete_image(&images[1], false),
        Err(CatalogError::ImageInUse { .. })
    ));

    // A fresh, unreferenced image goes through the dialog without force.
    let loose = catalog.add_image("Loose", None, "loose.png");
    let mut dialog = DeletionDialog::new();
    let token = dialog.open(&loose).unwrap();
    dialog.resolve_usage(token, Ok(catalog.check_image_usage(&loose)));
    let request = dialog.confirm().unwrap();
    assert!(!request.force);
    catalog.delete_image(&request.image_id, request.force).unwrap();
}

#[test]
fn publish_renders_the_saved_order() {
    let ws = Workspace::new();
    let (mut catalog, gallery, images) = seed(&ws);

    let mut editor = GalleryEditor::open(&catalog, &gallery).unwrap();
    let last = editor.entries()[2].id.clone();
    editor.begin_move(&last);
    editor.complete_move(0);
    editor.set_cover(&images[2]);
    editor.save(&mut catalog).unwrap();

    let output = ws.root.join("dist");
    let summary = render::publish(
        &catalog,
        &AppConfig::default(),
        &ws.library(),
        &output,
        None,
    )
    .unwrap();
    assert_eq!(summary.galleries, 1);
    assert_eq!(summary.images_copied, 3);

    let page = fs::read_to_string(output.join("coastline/index.html")).unwrap();
    let harbor_url = &catalog.image(&images[2]).unwrap().url;
    let dawn_url = &catalog.image(&images[0]).unwrap().url;
    let harbor_pos = page.find(harbor_url.as_str()).unwrap();
    let dawn_pos = page.find(dawn_url.as_str()).unwrap();
    assert!(harbor_pos < dawn_pos, "saved order must drive the page");

    let index = fs::read_to_string(output.join("index.html")).unwrap();
    assert!(index.contains("Coastline"));
    // The cover image's thumbnail fronts the gallery card.
    assert!(index.contains(&ingest::thumb_rel(harbor_url)));
}

#[test]
fn reingesting_the_same_directory_is_idempotent() {
    let ws = Workspace::new();
    let (mut catalog, _, _) = seed(&ws);
    let before = catalog.images().len();

    let sources = ws.root.join("photos");
    let requests: Vec<IngestRequest> = ingest::scan_import_dir(&sources)
        .unwrap()
        .iter()
        .map(IngestRequest::file)
        .collect();
    let mut cache = ThumbCache::load(&ws.library());
    let results = ingest::ingest_many(
        &mut catalog,
        &ws.library(),
        &RustImaging,
        &ThumbnailSpec::default(),
        &mut cache,
        &requests,
    );

    for result in results {
        let outcome = result.unwrap();
        assert!(!outcome.created);
        assert!(outcome.thumb_cached);
    }
    assert_eq!(catalog.images().len(), before);
}

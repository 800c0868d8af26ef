use clap::{Args, Parser, Subcommand};
use gal_curator::catalog::Catalog;
use gal_curator::config::{self, DisplayMode};
use gal_curator::confirm::{DeletionDialog, UsageState};
use gal_curator::editing::GalleryEditor;
use gal_curator::imaging::RustImaging;
use gal_curator::ingest::{self, IngestRequest, ThumbCache};
use gal_curator::output;
use gal_curator::render;
use gal_curator::types::Gallery;
use std::error::Error;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "gal-curator")]
#[command(about = "Catalog-driven gallery curator and static publisher")]
#[command(long_about = "\
Catalog-driven gallery curator and static publisher

A JSON catalog is the data source: images, tags, and galleries with an
explicit order and a cover selection. Commands edit the catalog; publish
renders it to a static HTML site.

Workspace layout:

  ./
  ├── config.toml              # Site/theme config (optional)
  ├── catalog.json             # The catalog - images, tags, galleries
  ├── library/                 # Ingested originals, content-addressed
  │   ├── 3f9a2c1b4d07.jpg
  │   └── thumbs/              # Generated thumbnails + cache manifest
  └── dist/                    # Published site (publish command)

Typical session:

  gal-curator image add photos/*.jpg --tag travel
  gal-curator gallery create \"Japan\" --description \"Two weeks in spring\"
  gal-curator gallery add japan 3f9a2c 8c02d1 77e4b9
  gal-curator gallery move japan 3 1
  gal-curator gallery cover japan 8c02d1
  gal-curator publish --mode carousel

Images, galleries, and entries are addressed by id, unique id prefix, or
exact title; entries also by 1-based position.

Run 'gal-curator gen-config' to print a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Workspace directory (holds config.toml, catalog.json, library/)
    #[arg(long, default_value = ".", global = true)]
    dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Manage image records
    #[command(subcommand)]
    Image(ImageCmd),
    /// Manage galleries and their membership
    #[command(subcommand)]
    Gallery(GalleryCmd),
    /// Ingest a directory of images as a new gallery
    Import(ImportArgs),
    /// Render the catalog to a static HTML site
    Publish(PublishArgs),
    /// Validate catalog invariants and library files
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[derive(Subcommand)]
enum ImageCmd {
    /// Ingest image files into the library and catalog
    Add {
        /// Source image files
        paths: Vec<PathBuf>,
        /// Title (single file only; defaults to the filename)
        #[arg(long)]
        title: Option<String>,
        /// Description
        #[arg(long)]
        description: Option<String>,
        /// Tag to attach (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Also append the ingested images to this gallery
        #[arg(long)]
        gallery: Option<String>,
    },
    /// List all images
    List,
    /// Edit an image's title or description
    Edit {
        image: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Remove the description
        #[arg(long, conflicts_with = "description")]
        clear_description: bool,
    },
    /// Attach tags to an image
    Tag { image: String, tags: Vec<String> },
    /// Detach a tag from an image
    Untag { image: String, tag: String },
    /// Delete an image record (checks gallery usage first)
    Rm {
        image: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum GalleryCmd {
    /// Create an empty gallery
    Create {
        title: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// List all galleries with their membership
    List,
    /// Show one gallery
    Show { gallery: String },
    /// Append images to a gallery
    Add { gallery: String, images: Vec<String> },
    /// Move an entry from one position to another (1-based)
    Move {
        gallery: String,
        from: usize,
        to: usize,
    },
    /// Remove an entry from a gallery (the image stays in the catalog)
    Remove {
        gallery: String,
        entry: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Set the gallery's cover image
    Cover { gallery: String, image: String },
    /// Set or clear an entry's gallery-specific caption
    Caption {
        gallery: String,
        entry: String,
        text: Option<String>,
        /// Remove the caption
        #[arg(long, conflicts_with = "text")]
        clear: bool,
    },
    /// Delete a gallery (its images stay in the catalog)
    Rm {
        gallery: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args)]
struct ImportArgs {
    /// Directory of images; NNN- filename prefixes set the initial order
    source: PathBuf,
    /// Gallery title (defaults to the directory name)
    #[arg(long)]
    title: Option<String>,
}

#[derive(Args)]
struct PublishArgs {
    /// Output directory
    #[arg(long, default_value = "dist")]
    output: PathBuf,
    /// Override the configured display mode (grid, carousel, slideshow)
    #[arg(long)]
    mode: Option<DisplayMode>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let catalog_path = cli.dir.join("catalog.json");
    let library = cli.dir.join("library");

    match cli.command {
        Command::Image(cmd) => run_image(cmd, &cli.dir, &catalog_path, &library)?,
        Command::Gallery(cmd) => run_gallery(cmd, &catalog_path)?,
        Command::Import(args) => run_import(args, &cli.dir, &catalog_path, &library)?,
        Command::Publish(args) => {
            let config = config::load_config(&cli.dir)?;
            let catalog = Catalog::load(&catalog_path)?;
            let output_dir = cli.dir.join(&args.output);
            let summary = render::publish(&catalog, &config, &library, &output_dir, args.mode)?;
            output::print_lines(&output::format_publish_summary(&summary, &output_dir));
        }
        Command::Check => {
            let catalog = Catalog::load(&catalog_path)?;
            let mut findings = catalog.validate();
            for image in catalog.images() {
                if !library.join(&image.url).exists() {
                    findings.push(format!(
                        "image '{}' missing from library: {}",
                        image.title, image.url
                    ));
                }
            }
            if findings.is_empty() {
                println!("Catalog is valid");
            } else {
                for finding in &findings {
                    println!("{finding}");
                }
                return Err(format!("catalog has {} issues", findings.len()).into());
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

// ============================================================================
// Image commands
// ============================================================================

fn run_image(
    cmd: ImageCmd,
    dir: &Path,
    catalog_path: &Path,
    library: &Path,
) -> Result<(), Box<dyn Error>> {
    let mut catalog = Catalog::load(catalog_path)?;

    match cmd {
        ImageCmd::Add {
            paths,
            title,
            description,
            tags,
            gallery,
        } => {
            if paths.is_empty() {
                return Err("no files given".into());
            }
            if title.is_some() && paths.len() > 1 {
                return Err("--title applies to a single file".into());
            }
            let config = config::load_config(dir)?;
            // Resolve the target gallery up front; a typo should not cost a
            // full ingest run.
            let gallery_id = match &gallery {
                Some(needle) => Some(resolve_gallery(&catalog, needle)?),
                None => None,
            };
            init_worker_pool(&config.processing);
            let requests: Vec<IngestRequest> = paths
                .iter()
                .map(|path| IngestRequest {
                    source: path.clone(),
                    title: title.clone(),
                    description: description.clone(),
                    tags: tags.clone(),
                })
                .collect();
            let mut cache = ThumbCache::load(library);
            let results = ingest::ingest_many(
                &mut catalog,
                library,
                &RustImaging,
                &config.thumbnails.spec(),
                &mut cache,
                &requests,
            );
            cache.save(library)?;

            let mut failed = 0usize;
            for (request, result) in requests.iter().zip(results) {
                match result {
                    Ok(outcome) => {
                        let image = catalog.image(&outcome.image_id).expect("just ingested");
                        let status = if outcome.created {
                            "added"
                        } else {
                            "already in catalog"
                        };
                        println!("{} ({}): {}", image.title, image.id, status);
                        if let Some(gid) = &gallery_id {
                            match catalog.add_to_gallery(gid, &outcome.image_id) {
                                Ok(_) => {}
                                Err(gal_curator::catalog::CatalogError::DuplicateMembership(
                                    _,
                                )) => {}
                                Err(e) => return Err(e.into()),
                            }
                        }
                    }
                    Err(e) => {
                        failed += 1;
                        eprintln!("{}: {e}", request.source.display());
                    }
                }
            }
            catalog.save(catalog_path)?;
            if failed > 0 {
                return Err(format!("{failed} files failed to ingest").into());
            }
        }
        ImageCmd::List => output::print_image_listing(&catalog),
        ImageCmd::Edit {
            image,
            title,
            description,
            clear_description,
        } => {
            let id = resolve_image(&catalog, &image)?;
            if let Some(title) = &title {
                catalog.set_image_title(&id, non_blank(title, "image title")?)?;
            }
            if let Some(desc) = &description {
                catalog.set_image_description(&id, Some(desc))?;
            }
            if clear_description {
                catalog.set_image_description(&id, None)?;
            }
            catalog.save(catalog_path)?;
        }
        ImageCmd::Tag { image, tags } => {
            let id = resolve_image(&catalog, &image)?;
            for name in &tags {
                let tag_id = catalog.ensure_tag(name);
                catalog.tag_image(&id, &tag_id)?;
            }
            catalog.save(catalog_path)?;
        }
        ImageCmd::Untag { image, tag } => {
            let id = resolve_image(&catalog, &image)?;
            let tag_id = catalog
                .tags()
                .iter()
                .find(|t| t.name == tag)
                .map(|t| t.id.clone())
                .ok_or_else(|| format!("no tag named '{tag}'"))?;
            catalog.untag_image(&id, &tag_id)?;
            catalog.save(catalog_path)?;
        }
        ImageCmd::Rm { image, yes } => {
            let id = resolve_image(&catalog, &image)?;
            let title = catalog.image(&id).expect("resolved above").title.clone();

            // Two-step confirmation: the dialog holds the target while the
            // usage check reports what the deletion would cascade through.
            let mut dialog = DeletionDialog::new();
            let token = dialog.open(&id)?;
            let outcome: Result<_, String> = Ok(catalog.check_image_usage(&id));
            dialog.resolve_usage(token, outcome);

            if let Some(UsageState::Ready(usages)) = dialog.usage() {
                output::print_lines(&output::format_usage_report(&title, usages));
            }
            if !yes && !confirm_prompt(&format!("Delete '{title}'?"))? {
                dialog.cancel();
                println!("Cancelled");
                return Ok(());
            }
            let request = dialog.confirm()?;
            catalog.delete_image(&request.image_id, request.force)?;
            catalog.save(catalog_path)?;
            println!("Deleted '{title}'");
        }
    }
    Ok(())
}

// ============================================================================
// Gallery commands
// ============================================================================

fn run_gallery(cmd: GalleryCmd, catalog_path: &Path) -> Result<(), Box<dyn Error>> {
    let mut catalog = Catalog::load(catalog_path)?;

    match cmd {
        GalleryCmd::Create { title, description } => {
            let title = non_blank(&title, "gallery title")?;
            let id = catalog.create_gallery(title, description.as_deref());
            catalog.save(catalog_path)?;
            println!("Created '{title}' ({id})");
        }
        GalleryCmd::List => output::print_gallery_listing(&catalog),
        GalleryCmd::Show { gallery } => {
            let id = resolve_gallery(&catalog, &gallery)?;
            let g = catalog.gallery(&id).expect("resolved above");
            output::print_lines(&output::format_gallery(&catalog, g, 1));
        }
        GalleryCmd::Add { gallery, images } => {
            let id = resolve_gallery(&catalog, &gallery)?;
            for needle in &images {
                let image_id = resolve_image(&catalog, needle)?;
                catalog.add_to_gallery(&id, &image_id)?;
            }
            catalog.save(catalog_path)?;
        }
        GalleryCmd::Move { gallery, from, to } => {
            let id = resolve_gallery(&catalog, &gallery)?;
            let mut editor = GalleryEditor::open(&catalog, &id)?;
            let len = editor.entries().len();
            if from == 0 || to == 0 || from > len || to > len {
                return Err(format!("positions are 1..{len}").into());
            }
            let entry_id = editor.entries()[from - 1].id.clone();
            editor.begin_move(&entry_id);
            editor.complete_move(to - 1);
            editor.save(&mut catalog)?;
            catalog.save(catalog_path)?;
        }
        GalleryCmd::Remove {
            gallery,
            entry,
            yes,
        } => {
            let id = resolve_gallery(&catalog, &gallery)?;
            let mut editor = GalleryEditor::open(&catalog, &id)?;
            let entry_id = resolve_entry(&catalog, editor.entries(), &entry)?;
            let image_title = editor
                .entries()
                .iter()
                .find(|e| e.id == entry_id)
                .and_then(|e| catalog.image(&e.image_id))
                .map(|i| i.title.clone())
                .unwrap_or_else(|| entry_id.clone());

            editor.request_removal(&entry_id)?;
            if !yes && !confirm_prompt(&format!("Remove '{image_title}' from this gallery?"))? {
                editor.cancel_removal();
                println!("Cancelled");
                return Ok(());
            }
            editor.confirm_removal()?;
            editor.save(&mut catalog)?;
            catalog.save(catalog_path)?;
            println!("Removed '{image_title}'");
        }
        GalleryCmd::Cover { gallery, image } => {
            let id = resolve_gallery(&catalog, &gallery)?;
            let image_id = resolve_image(&catalog, &image)?;
            let mut editor = GalleryEditor::open(&catalog, &id)?;
            if !editor.entries().iter().any(|e| e.image_id == image_id) {
                return Err("image is not in this gallery".into());
            }
            editor.set_cover(&image_id);
            editor.save(&mut catalog)?;
            catalog.save(catalog_path)?;
        }
        GalleryCmd::Caption {
            gallery,
            entry,
            text,
            clear,
        } => {
            if text.is_none() && !clear {
                return Err("give caption text or --clear".into());
            }
            let id = resolve_gallery(&catalog, &gallery)?;
            let mut editor = GalleryEditor::open(&catalog, &id)?;
            let entry_id = resolve_entry(&catalog, editor.entries(), &entry)?;
            editor.set_caption(&entry_id, text.as_deref())?;
            editor.save(&mut catalog)?;
            catalog.save(catalog_path)?;
        }
        GalleryCmd::Rm { gallery, yes } => {
            let id = resolve_gallery(&catalog, &gallery)?;
            let title = catalog.gallery(&id).expect("resolved above").title.clone();
            if !yes && !confirm_prompt(&format!("Delete gallery '{title}'?"))? {
                println!("Cancelled");
                return Ok(());
            }
            catalog.delete_gallery(&id)?;
            catalog.save(catalog_path)?;
            println!("Deleted gallery '{title}' (its images stay in the catalog)");
        }
    }
    Ok(())
}

// ============================================================================
// Import
// ============================================================================

fn run_import(
    args: ImportArgs,
    dir: &Path,
    catalog_path: &Path,
    library: &Path,
) -> Result<(), Box<dyn Error>> {
    let config = config::load_config(dir)?;
    let mut catalog = Catalog::load(catalog_path)?;
    init_worker_pool(&config.processing);

    let paths = ingest::scan_import_dir(&args.source)?;
    if paths.is_empty() {
        return Err(format!("no images under {}", args.source.display()).into());
    }

    let requests: Vec<IngestRequest> = paths.iter().map(IngestRequest::file).collect();
    let mut cache = ThumbCache::load(library);
    let results = ingest::ingest_many(
        &mut catalog,
        library,
        &RustImaging,
        &config.thumbnails.spec(),
        &mut cache,
        &requests,
    );
    cache.save(library)?;

    let title = args.title.clone().unwrap_or_else(|| {
        args.source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "Imported".to_string())
    });
    let gallery_id = catalog.create_gallery(&title, None);

    let mut added = 0usize;
    let mut failed = 0usize;
    for (request, result) in requests.iter().zip(results) {
        match result {
            Ok(outcome) => {
                match catalog.add_to_gallery(&gallery_id, &outcome.image_id) {
                    Ok(_) => added += 1,
                    // Identical content appearing twice in the source tree.
                    Err(gal_curator::catalog::CatalogError::DuplicateMembership(_)) => {}
                    Err(e) => return Err(e.into()),
                }
            }
            Err(e) => {
                failed += 1;
                eprintln!("{}: {e}", request.source.display());
            }
        }
    }
    catalog.save(catalog_path)?;
    println!("Imported {added} images into '{title}' ({gallery_id})");
    if failed > 0 {
        return Err(format!("{failed} files failed to ingest").into());
    }
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

/// Size the rayon pool from config: users can constrain down, never up.
fn init_worker_pool(processing: &config::ProcessingConfig) {
    rayon::ThreadPoolBuilder::new()
        .num_threads(config::effective_workers(processing))
        .build_global()
        .ok();
}

/// Reject blank user-supplied text before it reaches the catalog.
fn non_blank<'a>(value: &'a str, what: &str) -> Result<&'a str, Box<dyn Error>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{what} must not be empty").into());
    }
    Ok(trimmed)
}

fn confirm_prompt(question: &str) -> std::io::Result<bool> {
    print!("{question} [y/N] ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(matches!(line.trim(), "y" | "Y" | "yes"))
}

/// Resolve user input to an image id: exact id, unique id prefix, or exact
/// title.
fn resolve_image(catalog: &Catalog, needle: &str) -> Result<String, Box<dyn Error>> {
    let ids: Vec<&str> = catalog
        .images()
        .iter()
        .filter(|i| i.id == needle || i.id.starts_with(needle) || i.title == needle)
        .map(|i| i.id.as_str())
        .collect();
    match ids.as_slice() {
        [id] => Ok(id.to_string()),
        [] => Err(format!("no image matches '{needle}'").into()),
        _ => Err(format!("'{needle}' is ambiguous ({} matches)", ids.len()).into()),
    }
}

/// Resolve user input to a gallery id: exact id, unique id prefix, exact
/// title, or sanitized-title match (`japan` finds "Japan").
fn resolve_gallery(catalog: &Catalog, needle: &str) -> Result<String, Box<dyn Error>> {
    let matches_gallery = |g: &&Gallery| {
        g.id == needle
            || g.id.starts_with(needle)
            || g.title == needle
            || gal_curator::naming::sanitize_stem(&g.title) == needle
    };
    let ids: Vec<&str> = catalog
        .galleries()
        .iter()
        .filter(matches_gallery)
        .map(|g| g.id.as_str())
        .collect();
    match ids.as_slice() {
        [id] => Ok(id.to_string()),
        [] => Err(format!("no gallery matches '{needle}'").into()),
        _ => Err(format!("'{needle}' is ambiguous ({} matches)", ids.len()).into()),
    }
}

/// Resolve user input to a membership entry id: 1-based position, exact
/// entry id, unique entry-id prefix, or the image's title.
fn resolve_entry(
    catalog: &Catalog,
    entries: &[gal_curator::types::MembershipEntry],
    needle: &str,
) -> Result<String, Box<dyn Error>> {
    if let Ok(pos) = needle.parse::<usize>() {
        if pos == 0 || pos > entries.len() {
            return Err(format!("positions are 1..{}", entries.len()).into());
        }
        return Ok(entries[pos - 1].id.clone());
    }
    let ids: Vec<&str> = entries
        .iter()
        .filter(|e| {
            e.id == needle
                || e.id.starts_with(needle)
                || catalog
                    .image(&e.image_id)
                    .is_some_and(|i| i.title == needle)
        })
        .map(|e| e.id.as_str())
        .collect();
    match ids.as_slice() {
        [id] => Ok(id.to_string()),
        [] => Err(format!("no entry matches '{needle}'").into()),
        _ => Err(format!("'{needle}' is ambiguous ({} matches)", ids.len()).into()),
    }
}

//! Static site generation.
//!
//! Renders the catalog into a publishable HTML site. Display strategies are
//! read-only consumers of the ordered membership list and the cover
//! selection — nothing here mutates catalog state.
//!
//! ## Generated pages
//!
//! - **Index** (`/index.html`): one card per non-empty gallery, cover
//!   thumbnail first.
//! - **Gallery pages** (`/{slug}/index.html`): the membership list in the
//!   configured display mode — `grid` (thumbnail grid), `carousel` (one
//!   image on stage with controls), or `slideshow` (carousel that
//!   auto-advances).
//!
//! ## Output structure
//!
//! ```text
//! dist/
//! ├── index.html
//! ├── media/                  # referenced originals, copied from library/
//! │   ├── 3f9a2c1b4d07.jpg
//! │   └── thumbs/
//! │       └── 3f9a2c1b4d07.jpg
//! ├── coastline/
//! │   └── index.html
//! └── harbor-nights/
//!     └── index.html
//! ```
//!
//! Only images some gallery actually shows are copied; loose catalog images
//! stay in the library.
//!
//! ## HTML generation
//!
//! Uses [maud](https://maud.lambda.xyz/) — compile-time templates, type-safe
//! interpolation, auto-escaped. CSS and the carousel/slideshow script are
//! embedded at compile time; colors and layout variables come from config.

use crate::catalog::Catalog;
use crate::config::{AppConfig, DisplayMode, generate_color_css, generate_theme_css};
use crate::ingest::thumb_rel;
use crate::naming::sanitize_stem;
use crate::types::{Gallery, ImageRecord, MembershipEntry};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Gallery '{gallery}' references missing image {image_id}")]
    MissingImage { gallery: String, image_id: String },
}

const CSS_STATIC: &str = include_str!("../static/style.css");
const JS: &str = include_str!("../static/gallery.js");

/// What a publish run produced.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PublishSummary {
    pub galleries: usize,
    pub images_copied: usize,
}

/// A membership entry joined with its image record, ready to display.
struct DisplayEntry<'a> {
    entry: &'a MembershipEntry,
    image: &'a ImageRecord,
}

impl DisplayEntry<'_> {
    /// Gallery caption wins over the image's own description.
    fn caption(&self) -> Option<&str> {
        self.entry
            .description
            .as_deref()
            .or(self.image.description.as_deref())
    }
}

/// Render the whole site into `output`.
///
/// `mode_override` (the `--mode` flag) beats the configured display mode.
pub fn publish(
    catalog: &Catalog,
    config: &AppConfig,
    library: &Path,
    output: &Path,
    mode_override: Option<DisplayMode>,
) -> Result<PublishSummary, PublishError> {
    let mode = mode_override.unwrap_or(config.publish.mode);
    let css = format!(
        "{}\n\n{}\n\n{}",
        generate_color_css(&config.colors),
        generate_theme_css(&config.theme),
        CSS_STATIC
    );

    fs::create_dir_all(output)?;

    let mut summary = PublishSummary::default();
    let mut referenced: BTreeSet<&str> = BTreeSet::new();
    let mut slugs: Vec<(String, &Gallery)> = Vec::new();
    let mut taken: BTreeSet<String> = BTreeSet::new();

    for gallery in catalog.galleries() {
        if gallery.entries.is_empty() {
            continue;
        }
        let slug = gallery_slug(gallery, &taken);
        taken.insert(slug.clone());
        slugs.push((slug, gallery));
    }

    // Gallery pages first; this is also where dangling references surface.
    for (slug, gallery) in &slugs {
        let entries = join_entries(catalog, gallery)?;
        for display in &entries {
            referenced.insert(display.image.url.as_str());
        }
        let page = render_gallery_page(gallery, &entries, mode, &config.publish.site_title, &css, config.publish.slideshow_interval);
        let dir = output.join(slug);
        fs::create_dir_all(&dir)?;
        fs::write(dir.join("index.html"), page.into_string())?;
        summary.galleries += 1;
    }

    // Index page.
    let index = render_index(catalog, &slugs, &config.publish.site_title, &css)?;
    fs::write(output.join("index.html"), index.into_string())?;

    // Copy referenced media.
    let media = output.join("media");
    fs::create_dir_all(media.join("thumbs"))?;
    for url in referenced {
        fs::copy(library.join(url), media.join(url))?;
        let thumb = thumb_rel(url);
        if library.join(&thumb).exists() {
            fs::copy(library.join(&thumb), media.join(&thumb))?;
        }
        summary.images_copied += 1;
    }

    Ok(summary)
}

/// URL slug for a gallery directory: sanitized title, falling back to (or
/// disambiguated by) the gallery id.
fn gallery_slug(gallery: &Gallery, taken: &BTreeSet<String>) -> String {
    let base = sanitize_stem(&gallery.title);
    let candidate = if base.is_empty() {
        gallery.id.clone()
    } else {
        base
    };
    if taken.contains(&candidate) {
        format!("{candidate}-{}", gallery.id)
    } else {
        candidate
    }
}

fn join_entries<'a>(
    catalog: &'a Catalog,
    gallery: &'a Gallery,
) -> Result<Vec<DisplayEntry<'a>>, PublishError> {
    gallery
        .entries
        .iter()
        .map(|entry| {
            catalog
                .image(&entry.image_id)
                .map(|image| DisplayEntry { entry, image })
                .ok_or_else(|| PublishError::MissingImage {
                    gallery: gallery.title.clone(),
                    image_id: entry.image_id.clone(),
                })
        })
        .collect()
}

// ============================================================================
// HTML components
// ============================================================================

/// The base HTML document shell.
fn base_document(title: &str, css: &str, body_class: Option<&str>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (css) }
            }
            body class=[body_class] {
                (content)
            }
        }
    }
}

/// Header with the breadcrumb trail.
fn site_header(breadcrumb: Markup) -> Markup {
    html! {
        header.site-header {
            nav.breadcrumb {
                (breadcrumb)
            }
        }
    }
}

/// The cover thumbnail a gallery card shows: the flagged entry, or the
/// first entry when no cover is selected.
fn card_thumb<'a>(gallery: &Gallery, entries: &[DisplayEntry<'a>]) -> Option<&'a ImageRecord> {
    entries
        .iter()
        .find(|d| gallery.is_cover(d.entry))
        .or_else(|| entries.first())
        .map(|d| d.image)
}

// ============================================================================
// Page renderers
// ============================================================================

fn render_index(
    catalog: &Catalog,
    slugs: &[(String, &Gallery)],
    site_title: &str,
    css: &str,
) -> Result<Markup, PublishError> {
    let mut cards = Vec::new();
    for (slug, gallery) in slugs {
        let entries = join_entries(catalog, gallery)?;
        let thumb = card_thumb(gallery, &entries);
        cards.push((slug.clone(), *gallery, thumb.cloned(), entries.len()));
    }

    let content = html! {
        (site_header(html! { span.site-title { (site_title) } }))
        main.index-page {
            div.gallery-cards {
                @for (slug, gallery, thumb, count) in &cards {
                    a.gallery-card href={ (slug) "/" } {
                        @if let Some(image) = thumb {
                            img src={ "media/" (thumb_rel(&image.url)) } alt=(gallery.title) loading="lazy";
                        }
                        span.card-title { (gallery.title) }
                        span.card-count { (count) " images" }
                    }
                }
            }
        }
    };
    Ok(base_document(site_title, css, None, content))
}

fn render_gallery_page(
    gallery: &Gallery,
    entries: &[DisplayEntry<'_>],
    mode: DisplayMode,
    site_title: &str,
    css: &str,
    slideshow_interval: u64,
) -> Markup {
    let breadcrumb = html! {
        a href="../" { (site_title) }
        " › "
        (gallery.title)
    };

    let description = gallery.description.as_deref().map(markdown);

    let body = match mode {
        DisplayMode::Grid => render_grid(gallery, entries),
        DisplayMode::Carousel => render_stage(gallery, entries, false, slideshow_interval),
        DisplayMode::Slideshow => render_stage(gallery, entries, true, slideshow_interval),
    };

    let content = html! {
        (site_header(breadcrumb))
        main class={ "gallery-page mode-" (mode.as_str()) } {
            header.gallery-header {
                h1 { (gallery.title) }
                @if let Some(desc) = &description {
                    div.gallery-description { (PreEscaped(desc.clone())) }
                }
            }
            (body)
        }
        @if !matches!(mode, DisplayMode::Grid) {
            script { (PreEscaped(JS)) }
        }
    };

    let page_title = format!("{site_title} - {}", gallery.title);
    let body_class = format!("mode-{}", mode.as_str());
    base_document(&page_title, css, Some(&body_class), content)
}

/// Thumbnail grid. Pure CSS, no script.
fn render_grid(gallery: &Gallery, entries: &[DisplayEntry<'_>]) -> Markup {
    html! {
        div.thumbnail-grid {
            @for display in entries {
                figure.thumb.cover[gallery.is_cover(display.entry)] {
                    a href={ "../media/" (display.image.url) } {
                        img src={ "../media/" (thumb_rel(&display.image.url)) }
                            alt=(display.image.title) loading="lazy";
                    }
                    @if gallery.is_cover(display.entry) {
                        span.cover-badge { "cover" }
                    }
                    @if let Some(caption) = display.caption() {
                        figcaption { (caption) }
                    }
                }
            }
        }
    }
}

/// Carousel / slideshow stage: all slides in the document, first active,
/// the embedded script drives visibility and (for slideshows) the timer.
fn render_stage(
    gallery: &Gallery,
    entries: &[DisplayEntry<'_>],
    autoplay: bool,
    interval: u64,
) -> Markup {
    html! {
        div.stage data-autoplay=(autoplay) data-interval=(interval) {
            @for (idx, display) in entries.iter().enumerate() {
                figure.slide.active[idx == 0] {
                    img src={ "../media/" (display.image.url) } alt=(display.image.title)
                        loading=[(idx > 0).then_some("lazy")];
                    @if let Some(caption) = display.caption() {
                        figcaption { (caption) }
                    }
                }
            }
            button.stage-prev aria-label="Previous image" { "‹" }
            button.stage-next aria-label="Next image" { "›" }
            span.stage-counter { "1 / " (entries.len()) }
        }
        div.stage-strip {
            @for (idx, display) in entries.iter().enumerate() {
                img.strip-thumb.active[idx == 0]
                    src={ "../media/" (thumb_rel(&display.image.url)) }
                    alt=(display.image.title) data-slide=(idx) loading="lazy"
                    data-cover=[gallery.is_cover(display.entry).then_some("true")];
            }
        }
    }
}

/// Markdown → HTML for gallery descriptions.
fn markdown(text: &str) -> String {
    let parser = Parser::new(text);
    let mut out = String::new();
    md_html::push_html(&mut out, parser);
    out
}

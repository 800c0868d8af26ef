//! Filename conventions and title resolution for ingested images.
//!
//! Source files often arrive pre-ordered with a numeric prefix
//! (`001-dawn.jpg`, `020-harbor.jpg`). Directory import honors that
//! convention for the initial gallery order, and the name part doubles as a
//! title fallback when nothing better is available.
//!
//! Titles resolve by priority: an explicit `--title` flag wins over the
//! filename-derived title; dashes in the name part read as spaces. Resolved
//! titles may end up in library filenames, so they pass through
//! [`sanitize_stem`] first.

/// Parsed source filename stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceName {
    /// Numeric prefix, when the stem follows `NNN-name`.
    pub seq: Option<u32>,
    /// Display title from the name part, dashes as spaces. `None` for
    /// number-only stems.
    pub title: Option<String>,
}

/// Parse an image filename stem.
///
/// - `"001-My-Museum"` → seq 1, title "My Museum"
/// - `"001"` / `"001-"` → seq 1, no title
/// - `"Museum"` → no seq, title "Museum"
pub fn parse_source_stem(stem: &str) -> SourceName {
    if let Some(dash) = stem.find('-')
        && let Ok(seq) = stem[..dash].parse::<u32>()
    {
        let name = &stem[dash + 1..];
        return SourceName {
            seq: Some(seq),
            title: display_title(name),
        };
    }
    if let Ok(seq) = stem.parse::<u32>() {
        return SourceName {
            seq: Some(seq),
            title: None,
        };
    }
    SourceName {
        seq: None,
        title: display_title(stem),
    }
}

fn display_title(name: &str) -> Option<String> {
    if name.is_empty() {
        None
    } else {
        Some(name.replace('-', " "))
    }
}

/// First non-empty title from a priority-ordered list of candidates.
pub fn resolve_title(sources: &[Option<&str>]) -> Option<String> {
    sources
        .iter()
        .filter_map(|opt| {
            opt.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        })
        .next()
}

const MAX_STEM_LEN: usize = 60;

/// Make a title safe for use as a library filename stem.
///
/// Non-alphanumeric runs collapse to single dashes, leading/trailing dashes
/// are stripped, and the result is truncated at a dash boundary.
pub fn sanitize_stem(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut pending_dash = false;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if out.len() <= MAX_STEM_LEN {
        return out;
    }
    let cut = &out[..MAX_STEM_LEN];
    match cut.rfind('-') {
        Some(pos) => cut[..pos].to_string(),
        None => cut.to_string(),
    }
}

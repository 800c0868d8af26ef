//! Workspace configuration.
//!
//! Loads `config.toml` from the workspace root. User files are sparse —
//! values merge on top of stock defaults, unknown keys are rejected to
//! catch typos early, and the merged result is validated before use.
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [publish]
//! site_title = "Gallery"
//! mode = "grid"             # grid | carousel | slideshow
//! slideshow_interval = 6    # seconds per slide
//!
//! [thumbnails]
//! aspect_ratio = [4, 5]     # width:height crop ratio
//! short_edge = 400          # pixels on the short edge
//! quality = 85              # JPEG quality (0-100)
//!
//! [theme]
//! thumbnail_gap = "1rem"
//! grid_padding = "2rem"
//!
//! [theme.frame]
//! size = "4vw"              # preferred frame padding around stage images
//! min = "1rem"
//! max = "3rem"
//!
//! [colors.light]
//! background = "#ffffff"
//! text = "#111111"
//! text_muted = "#666666"
//! border = "#e0e0e0"
//! accent = "#1a5fb4"
//!
//! [colors.dark]
//! background = "#0a0a0a"
//! text = "#eeeeee"
//! text_muted = "#999999"
//! border = "#333333"
//! accent = "#78a9e6"
//!
//! [processing]
//! max_workers = 4           # omit for auto = CPU cores
//! ```

use crate::imaging::ThumbnailSpec;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Workspace configuration loaded from `config.toml`.
///
/// Every field has a default; user files only carry overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Static-site publishing settings.
    pub publish: PublishConfig,
    /// Thumbnail crop and encoding settings.
    pub thumbnails: ThumbnailsConfig,
    /// Light and dark color schemes.
    pub colors: ColorConfig,
    /// Layout settings.
    pub theme: ThemeConfig,
    /// Parallel ingest settings.
    pub processing: ProcessingConfig,
}

impl AppConfig {
    /// Validate value ranges after merging.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.thumbnails.quality > 100 {
            return Err(ConfigError::Validation(
                "thumbnails.quality must be 0-100".into(),
            ));
        }
        if self.thumbnails.aspect_ratio[0] == 0 || self.thumbnails.aspect_ratio[1] == 0 {
            return Err(ConfigError::Validation(
                "thumbnails.aspect_ratio values must be non-zero".into(),
            ));
        }
        if self.thumbnails.short_edge == 0 {
            return Err(ConfigError::Validation(
                "thumbnails.short_edge must be non-zero".into(),
            ));
        }
        if self.publish.slideshow_interval == 0 {
            return Err(ConfigError::Validation(
                "publish.slideshow_interval must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// How gallery pages display their images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Thumbnail grid.
    Grid,
    /// One image on stage with prev/next controls.
    Carousel,
    /// Carousel that auto-advances.
    Slideshow,
}

impl DisplayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Grid => "grid",
            Self::Carousel => "carousel",
            Self::Slideshow => "slideshow",
        }
    }
}

impl FromStr for DisplayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "grid" => Ok(Self::Grid),
            "carousel" => Ok(Self::Carousel),
            "slideshow" => Ok(Self::Slideshow),
            other => Err(format!(
                "unknown display mode '{other}' (expected grid, carousel, or slideshow)"
            )),
        }
    }
}

/// Static-site publishing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PublishConfig {
    /// Title shown on the index page and in breadcrumbs.
    pub site_title: String,
    /// Display mode for gallery pages.
    pub mode: DisplayMode,
    /// Seconds per slide in slideshow mode.
    pub slideshow_interval: u64,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            site_title: "Gallery".to_string(),
            mode: DisplayMode::Grid,
            slideshow_interval: 6,
        }
    }
}

/// Thumbnail crop and encoding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailsConfig {
    /// Crop aspect ratio as `[width, height]`.
    pub aspect_ratio: [u32; 2],
    /// Pixel size of the shorter edge.
    pub short_edge: u32,
    /// JPEG quality (0-100).
    pub quality: u8,
}

impl Default for ThumbnailsConfig {
    fn default() -> Self {
        Self {
            aspect_ratio: [4, 5],
            short_edge: 400,
            quality: 85,
        }
    }
}

impl ThumbnailsConfig {
    /// The imaging-layer spec these settings describe.
    pub fn spec(&self) -> ThumbnailSpec {
        ThumbnailSpec {
            aspect: (self.aspect_ratio[0], self.aspect_ratio[1]),
            short_edge: self.short_edge,
            quality: self.quality,
        }
    }
}

/// A responsive CSS size rendered as `clamp(min, size, max)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClampSize {
    /// Preferred/fluid value, typically viewport-relative.
    pub size: String,
    pub min: String,
    pub max: String,
}

impl ClampSize {
    pub fn to_css(&self) -> String {
        format!("clamp({}, {}, {})", self.min, self.size, self.max)
    }
}

/// Layout settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeConfig {
    /// Padding around the stage image in carousel and slideshow modes.
    pub frame: ClampSize,
    /// Gap between thumbnails in grids.
    pub thumbnail_gap: String,
    /// Padding around grid containers.
    pub grid_padding: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            frame: ClampSize {
                size: "4vw".to_string(),
                min: "1rem".to_string(),
                max: "3rem".to_string(),
            },
            thumbnail_gap: "1rem".to_string(),
            grid_padding: "2rem".to_string(),
        }
    }
}

/// Light and dark color schemes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub light: ColorScheme,
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// One color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    pub background: String,
    pub text: String,
    /// Captions, breadcrumbs, counts.
    pub text_muted: String,
    pub border: String,
    /// Links, cover badge, active controls.
    pub accent: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#ffffff".to_string(),
            text: "#111111".to_string(),
            text_muted: "#666666".to_string(),
            border: "#e0e0e0".to_string(),
            accent: "#1a5fb4".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#0a0a0a".to_string(),
            text: "#eeeeee".to_string(),
            text_muted: "#999999".to_string(),
            border: "#333333".to_string(),
            accent: "#78a9e6".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

/// Parallel ingest settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum parallel ingest workers. Absent means one per CPU core;
    /// values above the core count are clamped down.
    pub max_workers: Option<usize>,
}

/// Resolve the effective worker count: users can constrain down, not up.
pub fn effective_workers(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_workers.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Loading and merging
// =============================================================================

/// Stock defaults as a `toml::Value::Table`, the base layer for merging.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(AppConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`: tables merge key-by-key,
/// everything else in the overlay replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as raw TOML. `Ok(None)` when the
/// file doesn't exist.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Load the workspace config: user values merged over stock defaults,
/// unknown keys rejected, ranges validated.
pub fn load_config(dir: &Path) -> Result<AppConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match load_raw_config(dir)? {
        Some(overlay) => merge_toml(base, overlay),
        None => base,
    };
    let config: AppConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// A fully-commented stock `config.toml`, printed by `gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# gal-curator configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys are an error.

# ---------------------------------------------------------------------------
# Publishing
# ---------------------------------------------------------------------------
[publish]
# Title shown on the index page and in breadcrumbs.
site_title = "Gallery"

# Display mode for gallery pages: "grid", "carousel", or "slideshow".
mode = "grid"

# Seconds per slide in slideshow mode.
slideshow_interval = 6

# ---------------------------------------------------------------------------
# Thumbnails
# ---------------------------------------------------------------------------
[thumbnails]
# Crop aspect ratio as [width, height].
# Common choices: [1, 1] square, [4, 5] portrait, [3, 2] landscape.
aspect_ratio = [4, 5]

# Pixels on the short edge.
short_edge = 400

# JPEG quality (0 = worst, 100 = best).
quality = 85

# ---------------------------------------------------------------------------
# Theme / layout
# ---------------------------------------------------------------------------
[theme]
# Gap between thumbnails in grids (CSS value).
thumbnail_gap = "1rem"

# Padding around grid containers (CSS value).
grid_padding = "2rem"

# Padding around the stage image in carousel/slideshow, as clamp(min, size, max).
[theme.frame]
size = "4vw"
min = "1rem"
max = "3rem"

# ---------------------------------------------------------------------------
# Colors - light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#ffffff"
text = "#111111"
text_muted = "#666666"    # Captions, breadcrumbs, counts
border = "#e0e0e0"
accent = "#1a5fb4"        # Links, cover badge, active controls

# ---------------------------------------------------------------------------
# Colors - dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#0a0a0a"
text = "#eeeeee"
text_muted = "#999999"
border = "#333333"
accent = "#78a9e6"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel ingest workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_workers = 4
"##
}

// =============================================================================
// CSS generation
// =============================================================================

/// CSS custom properties for the configured colors.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        r#":root {{
    --color-bg: {light_bg};
    --color-text: {light_text};
    --color-text-muted: {light_muted};
    --color-border: {light_border};
    --color-accent: {light_accent};
}}

@media (prefers-color-scheme: dark) {{
    :root {{
        --color-bg: {dark_bg};
        --color-text: {dark_text};
        --color-text-muted: {dark_muted};
        --color-border: {dark_border};
        --color-accent: {dark_accent};
    }}
}}"#,
        light_bg = colors.light.background,
        light_text = colors.light.text,
        light_muted = colors.light.text_muted,
        light_border = colors.light.border,
        light_accent = colors.light.accent,
        dark_bg = colors.dark.background,
        dark_text = colors.dark.text,
        dark_muted = colors.dark.text_muted,
        dark_border = colors.dark.border,
        dark_accent = colors.dark.accent,
    )
}

/// CSS custom properties for the configured layout.
pub fn generate_theme_css(theme: &ThemeConfig) -> String {
    format!(
        r#":root {{
    --stage-frame: {frame};
    --thumbnail-gap: {thumbnail_gap};
    --grid-padding: {grid_padding};
}}"#,
        frame = theme.frame.to_css(),
        thumbnail_gap = theme.thumbnail_gap,
        grid_padding = theme.grid_padding,
    )
}

//! Configuration for the pipeline, cache and server
//!
//! Everything that used to be process-wide (palette, cache location, look-back
//! window) lives in [`TrackPlotConfig`] and is passed in at construction, so a
//! test configuration and a production one can run side by side.
//!
//! ```yaml
//! CacheDir: cache/generated
//! ArchiveDir: cache/sessions
//! Bind: 127.0.0.1:5001
//! MaxYearsBack: 1
//! SessionKind: Race
//! Style:
//!   Dpi: 100.0
//!   Palette:
//!     Background: '#0f1724'
//! ```

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::annotate::DEFAULT_CORNER_OFFSET;
use crate::resolver::DEFAULT_MAX_YEARS_BACK;
use crate::types::{FigureSize, SessionKind};
use crate::{Result, TrackError};

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct TrackPlotConfig {
    /// Where rendered images are cached
    pub cache_dir: PathBuf,
    /// Root of the session archive
    pub archive_dir: PathBuf,
    /// HTTP listen address
    pub bind: SocketAddr,
    /// Previous seasons to try when the requested one has no data
    pub max_years_back: u32,
    /// Session used for the track shape
    pub session_kind: SessionKind,
    pub style: RenderStyle,
}

impl Default for TrackPlotConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("cache/generated"),
            archive_dir: PathBuf::from("cache/sessions"),
            bind: SocketAddr::from(([127, 0, 0, 1], 5001)),
            max_years_back: DEFAULT_MAX_YEARS_BACK,
            session_kind: SessionKind::Race,
            style: RenderStyle::default(),
        }
    }
}

impl TrackPlotConfig {
    /// Parse and validate YAML configuration
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: TrackPlotConfig = serde_yaml_ng::from_str(yaml)
            .map_err(|e| TrackError::parse_error("Configuration YAML", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading configuration");
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| TrackError::file_error(path.to_path_buf(), e))?;
        Self::from_yaml(&yaml)
    }

    pub fn validate(&self) -> Result<()> {
        self.style.validate()
    }
}

/// Visual parameters for rasterization
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct RenderStyle {
    pub palette: Palette,
    /// Pixels per inch
    pub dpi: f64,
    /// Figure used when a request gives no size
    pub figure: FigureSize,
    /// Track stroke width in pixels
    pub track_width: f64,
    /// Marker circle radius in pixels
    pub marker_radius: f64,
    pub marker_font_size: f64,
    /// Corner label distance from the corner, in source units
    pub corner_offset: f64,
    /// Empty border around the circuit in pixels
    pub padding: f64,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            palette: Palette::default(),
            dpi: 100.0,
            figure: FigureSize::DEFAULT,
            track_width: 4.0,
            marker_radius: 14.0,
            marker_font_size: 13.0,
            corner_offset: DEFAULT_CORNER_OFFSET,
            padding: 40.0,
        }
    }
}

impl RenderStyle {
    pub fn validate(&self) -> Result<()> {
        self.palette.validate()?;
        let positive = [
            ("Dpi", self.dpi),
            ("TrackWidth", self.track_width),
            ("MarkerRadius", self.marker_radius),
            ("MarkerFontSize", self.marker_font_size),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(TrackError::config_error(format!("{} must be positive, got {}", name, value)));
            }
        }
        if !self.padding.is_finite() || self.padding < 0.0 {
            return Err(TrackError::config_error(format!("Padding must not be negative, got {}", self.padding)));
        }
        if !self.corner_offset.is_finite() {
            return Err(TrackError::config_error("CornerOffset must be finite"));
        }
        FigureSize::new(self.figure.width, self.figure.height)
            .map_err(|_| TrackError::config_error("Figure must have positive width and height"))?;
        Ok(())
    }
}

/// Fixed colors, as `#rrggbb`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct Palette {
    pub background: String,
    pub track: String,
    pub marker_ring: String,
    pub marker_text: String,
    /// Connector lines
    pub connector: String,
    /// Title and axis text
    pub title: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: "#0f1724".to_string(),
            track: "#9aa6b2".to_string(),
            marker_ring: "#FFFFFF".to_string(),
            marker_text: "#000000".to_string(),
            connector: "#9aa6b2".to_string(),
            title: "#FFFFFF".to_string(),
        }
    }
}

impl Palette {
    pub fn validate(&self) -> Result<()> {
        let colors = [
            ("Background", &self.background),
            ("Track", &self.track),
            ("MarkerRing", &self.marker_ring),
            ("MarkerText", &self.marker_text),
            ("Connector", &self.connector),
            ("Title", &self.title),
        ];
        for (name, color) in colors {
            if !is_hex_color(color) {
                return Err(TrackError::config_error(format!(
                    "{} color '{}' is not #rrggbb",
                    name, color
                )));
            }
        }
        Ok(())
    }
}

fn is_hex_color(s: &str) -> bool {
    s.len() == 7 && s.starts_with('#') && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}

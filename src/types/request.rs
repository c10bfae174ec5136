//! Render requests and figure sizing

use serde::{Deserialize, Serialize};

use super::EventRef;
use crate::{Result, TrackError};

/// Figure size in inches
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FigureSize {
    pub width: f64,
    pub height: f64,
}

impl FigureSize {
    /// Default landscape figure
    pub const DEFAULT: FigureSize = FigureSize { width: 16.0, height: 9.0 };

    /// Validated constructor; both sides must be positive and finite.
    pub fn new(width: f64, height: f64) -> Result<Self> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(width) || !valid(height) {
            return Err(TrackError::invalid_request(format!(
                "figure size must be positive, got {}x{}",
                width, height
            )));
        }
        Ok(Self { width, height })
    }

    /// Pixel dimensions at `dpi`, never below one pixel
    pub fn pixels(self, dpi: f64) -> (u32, u32) {
        let px = |inches: f64| (inches * dpi).round().max(1.0) as u32;
        (px(self.width), px(self.height))
    }
}

impl Default for FigureSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A request for one rendered track image.
///
/// Every field except `force_refresh` participates in the cache key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderRequest {
    pub event: EventRef,
    /// Caller-supplied rotation in degrees (CCW positive)
    pub rotation_deg: Option<f64>,
    pub show_axes: bool,
    pub figure_size: Option<FigureSize>,
    /// Bypass and replace any cached entry
    pub force_refresh: bool,
}

impl RenderRequest {
    /// Plain request: no override, no axes, default size
    pub fn new(event: EventRef) -> Self {
        Self { event, rotation_deg: None, show_axes: false, figure_size: None, force_refresh: false }
    }

    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation_deg = Some(degrees);
        self
    }

    pub fn with_axes(mut self, show_axes: bool) -> Self {
        self.show_axes = show_axes;
        self
    }

    pub fn with_figure_size(mut self, size: FigureSize) -> Self {
        self.figure_size = Some(size);
        self
    }

    pub fn refreshed(mut self, force_refresh: bool) -> Self {
        self.force_refresh = force_refresh;
        self
    }

    /// Reject anything the strict public boundary does not accept
    pub fn ensure_strict(&self) -> Result<()> {
        if let Some(angle) = self.rotation_deg {
            return Err(TrackError::invalid_request(format!(
                "manual angle {} is not allowed: rotation comes from circuit metadata only",
                angle
            )));
        }
        Ok(())
    }
}

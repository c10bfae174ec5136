//! Recorded session documents
//!
//! A session document is one weekend segment as exported by the upstream
//! timing source: every recorded lap with its position samples, plus optional
//! circuit metadata. Weather and race-control messages may be present but are
//! never needed for track shape.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::CircuitInfo;
use crate::provider::LoadOptions;
use crate::types::{PositionTrace, SessionKind};
use crate::{Result, TrackError, yaml_utils};

/// One recorded session
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct SessionDocument {
    /// Full event name ("Monaco Grand Prix")
    pub event_name: String,
    /// Season year
    pub year: i32,
    /// Weekend segment
    pub session: SessionKind,
    /// Recorded laps
    pub laps: Vec<LapRecord>,
    /// Circuit metadata, when published
    pub circuit_info: Option<CircuitInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather: Option<serde_yaml_ng::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<serde_yaml_ng::Value>,
}

/// One lap and its position samples
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct LapRecord {
    pub lap_number: u32,
    /// Lap duration in seconds; untimed laps are never fastest
    pub lap_time: Option<f64>,
    pub driver: Option<String>,
    /// `[x, y]` samples in source units
    pub position: Vec<[f64; 2]>,
}

impl LapRecord {
    pub fn trace(&self) -> PositionTrace {
        PositionTrace::from_xy(&self.position)
    }

    fn timed(&self) -> Option<f64> {
        self.lap_time.filter(|t| t.is_finite() && *t > 0.0)
    }
}

impl SessionDocument {
    /// Parse a document from YAML (with preprocessing)
    pub fn parse(yaml: &str) -> Result<Self> {
        let preprocessed = yaml_utils::preprocess_session_yaml(yaml)?;

        let document = serde_yaml_ng::from_str::<SessionDocument>(&preprocessed).map_err(|e| {
            TrackError::parse_error(
                "Session YAML deserialization",
                format!("YAML parsing failed: {}", e),
            )
        })?;
        document.validate()?;
        Ok(document)
    }

    /// Validate structural completeness.
    ///
    /// Empty lap lists are not structural errors: they are a data-quality
    /// outcome the resolver handles through year fallback.
    pub fn validate(&self) -> Result<()> {
        if self.event_name.trim().is_empty() {
            return Err(TrackError::parse_error("Session validation", "Missing event name"));
        }
        if let Some(lap) = self.laps.iter().find(|lap| {
            lap.position.iter().any(|[x, y]| !x.is_finite() || !y.is_finite())
        }) {
            return Err(TrackError::parse_error(
                "Session validation",
                format!("Lap {} has non-finite position samples", lap.lap_number),
            ));
        }
        Ok(())
    }

    /// Drop the parts of the document a load did not ask for
    pub fn restrict(&mut self, options: &LoadOptions) {
        if !options.laps {
            self.laps.clear();
        }
        if !options.positions {
            for lap in &mut self.laps {
                lap.position.clear();
            }
        }
        if !options.weather {
            self.weather = None;
        }
        if !options.messages {
            self.messages = None;
        }
        debug!(
            event = %self.event_name,
            laps = self.laps.len(),
            "Session document restricted to requested load options"
        );
    }

    /// The timed lap with the minimum duration
    pub fn pick_fastest(&self) -> Option<&LapRecord> {
        self.laps
            .iter()
            .filter_map(|lap| lap.timed().map(|t| (t, lap)))
            .min_by(|(a, _), (b, _)| a.total_cmp(b))
            .map(|(_, lap)| lap)
    }
}

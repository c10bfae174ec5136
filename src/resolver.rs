//! Session resolution with bounded year fallback
//!
//! Given `(year, identifier, kind)`, the resolver walks from `year` back
//! towards `year - max_years_back`, newest first, until one season yields a
//! usable fastest-lap trace. Only the requested season may fall back: a
//! missing or unusable session there moves on to the previous season, while
//! the same outcome in any earlier season ends the walk as unavailable.
//! Provider faults stop the walk immediately.

use std::fmt;
use tracing::{debug, error, info, warn};

use crate::provider::{LoadOptions, SessionProvider, SessionRequest};
use crate::schema::{CircuitInfo, SessionDocument};
use crate::types::{PositionTrace, SessionKind};
use crate::{Result, TrackError};

/// Default number of previous seasons to try
pub const DEFAULT_MAX_YEARS_BACK: u32 = 1;

/// A usable trace and the season it came from
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSession {
    pub trace: PositionTrace,
    pub circuit: Option<CircuitInfo>,
    /// Season whose data was used; may precede the requested one
    pub effective_year: i32,
    pub kind: SessionKind,
    /// Lap the trace was taken from
    pub lap_number: u32,
}

/// Outcome of one resolution
#[derive(Debug)]
pub enum Resolution {
    /// A season in the window had usable data
    Resolved(ResolvedSession),
    /// Every season in the window was missing or unusable
    Unavailable { identifier: String, requested_year: i32, oldest_year: i32 },
    /// Provider fault; not retried across seasons
    Failed(TrackError),
}

impl Resolution {
    /// Collapse into a `Result`, mapping `Unavailable` to
    /// [`TrackError::SessionUnavailable`]
    pub fn into_result(self) -> Result<ResolvedSession> {
        match self {
            Resolution::Resolved(session) => Ok(session),
            Resolution::Unavailable { identifier, requested_year, oldest_year } => {
                Err(TrackError::session_unavailable(identifier, requested_year, oldest_year))
            }
            Resolution::Failed(e) => Err(e),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }
}

/// Why a season in the window was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Provider has no such session
    NotRecorded,
    /// Session loaded without laps
    NoLaps,
    /// Laps exist but none is timed
    NoTimedLap,
    /// Fastest lap has no position samples
    EmptyTrace,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SkipReason::NotRecorded => "session not available",
            SkipReason::NoLaps => "session contains no laps",
            SkipReason::NoTimedLap => "session contains no timed lap",
            SkipReason::EmptyTrace => "fastest lap has no positional data",
        })
    }
}

/// Resolves sessions against a [`SessionProvider`]
#[derive(Debug)]
pub struct SessionResolver<P> {
    provider: P,
    options: LoadOptions,
}

impl<P: SessionProvider> SessionResolver<P> {
    /// Resolver requesting laps and positions only
    pub fn new(provider: P) -> Self {
        Self { provider, options: LoadOptions::track_shape() }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Walk the season window newest first.
    ///
    /// `Unavailable::oldest_year` is the last season actually tried.
    pub async fn resolve(
        &self,
        year: i32,
        identifier: &str,
        kind: SessionKind,
        max_years_back: u32,
    ) -> Resolution {
        let window_end = year.saturating_sub(i32::try_from(max_years_back).unwrap_or(i32::MAX));

        for y in (window_end..=year).rev() {
            info!(year = y, identifier, session = %kind, provider = self.provider.name(), "Attempting to load session");

            let request = SessionRequest::new(y, identifier, kind);
            let skip = match self.provider.load_session(&request, &self.options).await {
                Ok(Some(document)) => match usable_session(document, y, kind) {
                    Ok(Ok(session)) => {
                        if y != year {
                            info!(requested = year, effective = y, identifier, "Using previous season's data");
                        }
                        return Resolution::Resolved(session);
                    }
                    Ok(Err(reason)) => reason,
                    Err(e) => {
                        error!(year = y, identifier, error = %e, "Corrupt session data");
                        return Resolution::Failed(e);
                    }
                },
                Ok(None) => SkipReason::NotRecorded,
                Err(e) => {
                    error!(year = y, identifier, error = %e, "Provider error loading session");
                    return Resolution::Failed(e);
                }
            };

            if y == year && y > window_end {
                warn!(year = y, identifier, reason = %skip, "Data unusable, falling back to previous year");
                continue;
            }
            warn!(year = y, identifier, reason = %skip, "Data unusable, no further fallback");
            return unavailable(identifier, year, y);
        }

        // `window_end <= year`, so the loop has always returned by here
        unavailable(identifier, year, year)
    }
}

fn unavailable(identifier: &str, requested_year: i32, oldest_year: i32) -> Resolution {
    warn!(identifier, requested_year, oldest_year, "No usable session in year window");
    Resolution::Unavailable { identifier: identifier.to_string(), requested_year, oldest_year }
}

/// Check a loaded document for a usable fastest-lap trace.
///
/// The outer `Err` is corrupt data (terminal); the inner `Err` is a
/// data-quality skip (retryable across seasons).
fn usable_session(
    document: SessionDocument,
    year: i32,
    kind: SessionKind,
) -> Result<std::result::Result<ResolvedSession, SkipReason>> {
    if document.laps.is_empty() {
        return Ok(Err(SkipReason::NoLaps));
    }
    let Some(lap) = document.pick_fastest() else {
        return Ok(Err(SkipReason::NoTimedLap));
    };
    let trace = lap.trace();
    if trace.is_empty() {
        return Ok(Err(SkipReason::EmptyTrace));
    }
    if !trace.is_finite() {
        return Err(TrackError::session_error(
            year,
            &document.event_name,
            format!("lap {} has non-finite position samples", lap.lap_number),
        ));
    }

    debug!(year, lap = lap.lap_number, samples = trace.len(), "Fastest lap selected");
    let lap_number = lap.lap_number;
    Ok(Ok(ResolvedSession {
        trace,
        circuit: document.circuit_info,
        effective_year: year,
        kind,
        lap_number,
    }))
}

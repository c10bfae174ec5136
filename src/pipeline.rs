//! Track image pipeline
//!
//! Orchestrates session resolution, normalization, corner annotation and
//! rasterization. [`TrackImagePipeline::render`] fails with a typed error;
//! [`TrackImagePipeline::render_view`] folds every outcome into a
//! [`TrackView`] so a serving process never sees a failure.

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::annotate::{CornerAnnotator, CornerSource};
use crate::cache::TrackRenderer;
use crate::config::TrackPlotConfig;
use crate::geometry::{Normalization, RotationPolicy, resolve_rotation};
use crate::provider::SessionProvider;
use crate::render::{AxesSpec, MAX_DIMENSION, Rasterizer, TrackScene};
use crate::resolver::{ResolvedSession, SessionResolver};
use crate::types::{EventRef, FigureSize, RenderRequest, SessionKind};
use crate::{Result, TrackError};

/// Per-call rendering options
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineOptions {
    /// Rotation override in radians, used as-is
    pub override_radians: Option<f64>,
    pub policy: RotationPolicy,
    pub show_axes: bool,
    /// `None` uses the configured figure
    pub figure_size: Option<FigureSize>,
    pub session_kind: SessionKind,
    pub max_years_back: u32,
}

impl PipelineOptions {
    /// Strict options with the configured session kind and look-back window
    pub fn from_config(config: &TrackPlotConfig) -> Self {
        Self {
            override_radians: None,
            policy: RotationPolicy::Strict,
            show_axes: false,
            figure_size: None,
            session_kind: config.session_kind,
            max_years_back: config.max_years_back,
        }
    }

    /// Options carrying a request's rendering fields
    pub fn for_request(request: &RenderRequest, config: &TrackPlotConfig) -> Self {
        Self {
            override_radians: request.rotation_deg.map(f64::to_radians),
            show_axes: request.show_axes,
            figure_size: request.figure_size,
            ..Self::from_config(config)
        }
    }

    pub fn with_policy(mut self, policy: RotationPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// A successful render
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedTrack {
    /// PNG bytes
    pub image: Vec<u8>,
    pub title: String,
    pub effective_year: i32,
}

/// Outcome of a render that never fails
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackView {
    #[serde(skip)]
    pub image: Option<Vec<u8>>,
    pub title: String,
    pub requested_year: i32,
    /// Season whose data was drawn, when any
    pub effective_year: Option<i32>,
    pub data_available: bool,
}

/// `"<identifier> (<year>)"`
pub fn success_title(identifier: &str, year: i32) -> String {
    format!("{} ({})", identifier, year)
}

/// Title naming the attempted season span
pub fn unavailable_title(identifier: &str, requested_year: i32, oldest_year: i32) -> String {
    let span = match requested_year - oldest_year {
        0 => requested_year.to_string(),
        1 => format!("{} or {}", requested_year, oldest_year),
        _ => format!("{} to {}", requested_year, oldest_year),
    };
    format!("Track Data Unavailable for {} ({})", identifier, span)
}

/// Title for every failure other than missing data
pub fn error_title(identifier: &str) -> String {
    format!("Error loading track data for {}.", identifier)
}

/// Session data in, PNG out
#[derive(Debug)]
pub struct TrackImagePipeline<P> {
    resolver: SessionResolver<P>,
    rasterizer: Rasterizer,
    config: TrackPlotConfig,
}

impl<P: SessionProvider> TrackImagePipeline<P> {
    /// Pipeline rendering with system fonts
    pub fn new(provider: P, config: TrackPlotConfig) -> Self {
        let rasterizer = Rasterizer::new(config.style.clone());
        Self::with_rasterizer(provider, config, rasterizer)
    }

    pub fn with_rasterizer(provider: P, config: TrackPlotConfig, rasterizer: Rasterizer) -> Self {
        Self { resolver: SessionResolver::new(provider), rasterizer, config }
    }

    pub fn config(&self) -> &TrackPlotConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        self.resolver.provider()
    }

    /// Render one event.
    pub async fn render(&self, event: &EventRef, options: &PipelineOptions) -> Result<RenderedTrack> {
        let style = &self.config.style;
        let (width, height) = options.figure_size.unwrap_or(style.figure).pixels(style.dpi);
        if width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(TrackError::invalid_request(format!(
                "figure of {}x{} pixels exceeds {} per side",
                width, height, MAX_DIMENSION
            )));
        }

        let identifier = event.identifier();
        let session = self
            .resolver
            .resolve(event.year(), identifier, options.session_kind, options.max_years_back)
            .await
            .into_result()?;

        let year = session.effective_year;
        let scene = self.compose_scene(&session, identifier, options, width, height)?;

        let rasterizer = self.rasterizer.clone();
        let image = tokio::task::spawn_blocking(move || rasterizer.rasterize(&scene))
            .await
            .map_err(|e| TrackError::render_error_with_source("rasterization task", Box::new(e)))??;

        info!(identifier, requested = event.year(), effective = year, bytes = image.len(), "Track rendered");
        Ok(RenderedTrack { image, title: success_title(identifier, year), effective_year: year })
    }

    /// Rotate, normalize and annotate a resolved trace into a drawable scene.
    pub fn compose_scene(
        &self,
        session: &ResolvedSession,
        identifier: &str,
        options: &PipelineOptions,
        width: u32,
        height: u32,
    ) -> Result<TrackScene> {
        let rotation = resolve_rotation(options.override_radians, session.circuit.as_ref(), options.policy);
        debug!(source = ?rotation.source, radians = rotation.radians, "Rotation resolved");

        let points = session.trace.points();
        let norm = Normalization::about_centroid(points, rotation.radians)
            .ok_or_else(|| TrackError::render_error("normalizing an empty trace"))?;
        let normalized = norm.apply_all(points);
        let markers = CornerAnnotator::new(self.config.style.corner_offset).annotate(
            &normalized,
            CornerSource::from_circuit(session.circuit.as_ref()),
            &norm,
        );

        Ok(TrackScene {
            width,
            height,
            track: normalized,
            markers,
            axes: options.show_axes.then(|| AxesSpec {
                title: format!("{} Track Layout ({})", identifier, session.effective_year),
            }),
        })
    }

    /// Render one event, folding failures into titles.
    pub async fn render_view(&self, event: &EventRef, options: &PipelineOptions) -> TrackView {
        let identifier = event.identifier();
        match self.render(event, options).await {
            Ok(rendered) => TrackView {
                image: Some(rendered.image),
                title: rendered.title,
                requested_year: event.year(),
                effective_year: Some(rendered.effective_year),
                data_available: true,
            },
            Err(TrackError::SessionUnavailable { identifier, requested_year, oldest_year }) => {
                warn!(%identifier, requested_year, oldest_year, "Track data unavailable");
                TrackView {
                    image: None,
                    title: unavailable_title(&identifier, requested_year, oldest_year),
                    requested_year: event.year(),
                    effective_year: None,
                    data_available: false,
                }
            }
            Err(e) => {
                error!(identifier, year = event.year(), error = %e, "Failed to render track");
                TrackView {
                    image: None,
                    title: error_title(identifier),
                    requested_year: event.year(),
                    effective_year: None,
                    data_available: false,
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl<P: SessionProvider> TrackRenderer for TrackImagePipeline<P> {
    async fn render_request(&self, request: &RenderRequest) -> Result<Vec<u8>> {
        let options = PipelineOptions::for_request(request, &self.config);
        self.render(&request.event, &options).await.map(|rendered| rendered.image)
    }
}

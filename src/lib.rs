//! Circuit plan-view images from recorded session position data.
//!
//! trackplot derives a 2D track layout from the fastest lap of a recorded
//! session, orients it from authoritative circuit metadata, marks the corners
//! and rasterizes the result to PNG behind a content-addressed cache.
//!
//! # Features
//!
//! - **Year fallback**: a missing season falls back to earlier ones within a
//!   bounded window, reporting the season actually drawn
//! - **Strict rotation**: only circuit metadata orients the public images
//! - **Immortal cache**: renders are keyed by SHA-256 of their parameters and
//!   replaced only on forced refresh
//! - **Pluggable sources**: any [`provider::SessionProvider`] can feed the
//!   pipeline
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use trackplot::config::TrackPlotConfig;
//! use trackplot::pipeline::{PipelineOptions, TrackImagePipeline};
//! use trackplot::providers::ArchiveProvider;
//! use trackplot::EventRef;
//!
//! #[tokio::main]
//! async fn main() -> trackplot::Result<()> {
//!     let config = TrackPlotConfig::default();
//!     let provider = ArchiveProvider::new(&config.archive_dir);
//!     let options = PipelineOptions::from_config(&config);
//!     let pipeline = TrackImagePipeline::new(provider, config);
//!
//!     let event = EventRef::new(2024, "Monaco Grand Prix")?;
//!     let rendered = pipeline.render(&event, &options).await?;
//!     println!("{}: {} bytes", rendered.title, rendered.image.len());
//!     Ok(())
//! }
//! ```

// Core types and error handling
mod error;
#[cfg_attr(any(test, feature = "benchmark"), path = "test_utils.rs")]
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;
mod yaml_utils;

// Session data
pub mod provider;
pub mod providers;
pub mod resolver;
pub mod schema;

// Image derivation
pub mod annotate;
pub mod cache;
pub mod config;
pub mod geometry;
pub mod pipeline;
pub mod render;
pub mod server;

// Core exports
pub use error::*;
pub use types::*;

// Main API exports
pub use cache::{CacheKey, RenderCache};
pub use config::TrackPlotConfig;
pub use pipeline::{RenderedTrack, TrackImagePipeline, TrackView};
pub use resolver::{Resolution, SessionResolver};

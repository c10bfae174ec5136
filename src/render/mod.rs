//! Rasterization of normalized tracks
//!
//! A [`TrackScene`] is laid out in pixel space (equal aspect, data y-axis up)
//! and written as an SVG document; the [`Rasterizer`] turns that document into
//! PNG bytes through `usvg`/`resvg`.

mod raster;
mod scene;

pub use raster::{MAX_DIMENSION, Rasterizer};
pub use scene::{AxesSpec, TrackScene};

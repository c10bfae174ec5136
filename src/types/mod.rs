//! Core request and data types.
//!
//! - [`EventRef`] names a race independently of its session, through the
//!   shared [`sanitize_identifier`] rule
//! - [`SessionKind`] selects the weekend segment
//! - [`PositionTrace`] is one lap's planar position samples
//! - [`RenderRequest`] and [`FigureSize`] describe one rendered image

mod event;
mod request;
mod session_kind;
mod trace;

pub use event::{EventRef, sanitize_identifier};
pub use request::{FigureSize, RenderRequest};
pub use session_kind::SessionKind;
pub use trace::{PositionTrace, centroid};

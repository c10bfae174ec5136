//! # Session Document Schema
//!
//! Serde model of a recorded session as exported by the upstream timing
//! source. Keys are PascalCase, matching the exporter's output:
//!
//! ```text
//! EventName: Monaco Grand Prix
//! Year: 2024
//! Session: R
//! Laps:
//!   - LapNumber: 12
//!     LapTime: 74.165
//!     Position: [[-7654.0, -8112.0], ...]
//! CircuitInfo:
//!   Rotation: 50.0
//!   Corners:
//!     - { Number: 1, Letter: '', X: -7410.9, Y: -6342.7, Angle: 91.2 }
//! ```
//!
//! Weather and messages blocks are accepted and dropped on load.

pub mod circuit;
pub mod document;

pub use circuit::{CircuitInfo, Corner};
pub use document::{LapRecord, SessionDocument};

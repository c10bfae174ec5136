//! Test utilities: synthetic circuits and scratch directories
//!
//! Session fixtures are generated rather than checked in, so tests and
//! benchmarks can build documents of any size without large files.

#![cfg(any(test, feature = "benchmark"))]

use std::f64::consts::TAU;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::provider::SessionRequest;
use crate::schema::{CircuitInfo, Corner, LapRecord, SessionDocument};
use crate::types::SessionKind;

static SCRATCH_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Create a fresh, empty directory under the system temp dir.
///
/// Names include the process id and a counter so parallel tests never share
/// a directory.
pub fn scratch_dir(label: &str) -> PathBuf {
    let n = SCRATCH_COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir().join(format!("trackplot-{}-{}-{}", label, std::process::id(), n));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("scratch dir should be creatable");
    dir
}

/// A closed, wobbly loop of `samples` points roughly 2km x 1km across.
///
/// The shape is asymmetric so rotations are observable.
pub fn synthetic_circuit(samples: usize) -> Vec<[f64; 2]> {
    (0..samples)
        .map(|i| {
            let t = TAU * i as f64 / samples.max(1) as f64;
            let wobble = 1.0 + 0.15 * (3.0 * t).sin();
            [1000.0 * t.cos() * wobble + 250.0, 500.0 * t.sin() * wobble - 120.0]
        })
        .collect()
}

/// Circuit info with `count` corners placed on the synthetic loop
pub fn synthetic_circuit_info(count: u32, rotation: f64) -> CircuitInfo {
    let samples = synthetic_circuit(count.max(1) as usize);
    let corners = samples
        .iter()
        .enumerate()
        .map(|(i, &[x, y])| Corner {
            number: i as u32 + 1,
            letter: if i == 2 { Some("a".to_string()) } else { None },
            x,
            y,
            angle: (i as f64) * 45.0,
        })
        .collect();
    CircuitInfo { rotation, corners }
}

/// A session document with a slow lap and a fastest lap of `samples` points
pub fn session_document(
    year: i32,
    event_name: &str,
    samples: usize,
    circuit_info: Option<CircuitInfo>,
) -> SessionDocument {
    SessionDocument {
        event_name: event_name.to_string(),
        year,
        session: SessionKind::Race,
        laps: vec![
            LapRecord {
                lap_number: 1,
                lap_time: Some(95.0),
                driver: Some("ALO".to_string()),
                position: synthetic_circuit(8),
            },
            LapRecord {
                lap_number: 2,
                lap_time: Some(78.3),
                driver: Some("ALO".to_string()),
                position: synthetic_circuit(samples),
            },
        ],
        circuit_info,
        weather: None,
        messages: None,
    }
}

/// Race request for `identifier` in `year`
pub fn race(year: i32, identifier: &str) -> SessionRequest {
    SessionRequest::new(year, identifier, SessionKind::Race)
}

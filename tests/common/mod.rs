//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::f64::consts::TAU;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use trackplot::config::TrackPlotConfig;
use trackplot::pipeline::TrackImagePipeline;
use trackplot::provider::SessionProvider;
use trackplot::render::Rasterizer;

static COUNTER: AtomicUsize = AtomicUsize::new(0);

pub fn scratch_dir(label: &str) -> PathBuf {
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir().join(format!("trackplot-it-{}-{}-{}", label, std::process::id(), n));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// YAML for a race with one slow lap and one fastest lap of `samples` points
pub fn race_yaml(event_name: &str, year: i32, samples: usize, with_circuit: bool) -> String {
    let loop_points = |n: usize| {
        (0..n)
            .map(|i| {
                let t = TAU * i as f64 / n as f64;
                format!("[{:.1}, {:.1}]", 1200.0 * t.cos() + 300.0, 600.0 * t.sin() * (1.0 + 0.2 * t.cos()))
            })
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut yaml = format!(
        "EventName: {event_name}\nYear: {year}\nSession: R\nLaps:\n  - LapNumber: 1\n    LapTime: 91.2\n    Driver: VER\n    Position: [{}]\n  - LapNumber: 2\n    LapTime: 74.165\n    Driver: LEC\n    Position: [{}]\n",
        loop_points(8),
        loop_points(samples)
    );
    if with_circuit {
        yaml.push_str(
            "CircuitInfo:\n  Rotation: 50.0\n  Corners:\n    - { Number: 1, Letter: '', X: 1500.0, Y: 0.0, Angle: 90.0 }\n    - { Number: 2, Letter: 'a', X: 300.0, Y: 600.0, Angle: 180.0 }\n",
        );
    }
    yaml.push_str("Weather:\n  AirTemp: 24.1\nMessages:\n  - Category: Flag\n    Message: GREEN LIGHT\n");
    yaml
}

/// Write an archived race document for `identifier`
pub fn archive_race(root: &Path, year: i32, identifier: &str, yaml: &str) {
    let dir = root.join(year.to_string()).join(identifier);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("R.yaml"), yaml).unwrap();
}

/// Small figures and a scratch cache; no fonts so runs are host independent
pub fn config(label: &str) -> TrackPlotConfig {
    let mut config = TrackPlotConfig::default();
    config.cache_dir = scratch_dir(&format!("{}-cache", label));
    config.archive_dir = scratch_dir(&format!("{}-archive", label));
    config.style.figure.width = 4.0;
    config.style.figure.height = 3.0;
    config
}

pub fn pipeline<P: SessionProvider>(provider: P, config: TrackPlotConfig) -> TrackImagePipeline<P> {
    let rasterizer = Rasterizer::with_fontdb(config.style.clone(), Arc::new(usvg::fontdb::Database::new()));
    TrackImagePipeline::with_rasterizer(provider, config, rasterizer)
}

pub const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

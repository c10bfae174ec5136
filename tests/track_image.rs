//! End-to-end: archived sessions through the pipeline and render cache

mod common;

use std::sync::Arc;

use common::{PNG_MAGIC, archive_race, config, pipeline, race_yaml};
use trackplot::cache::{CacheKey, CacheStatus, CacheStore, FsCacheStore, RenderCache};
use trackplot::pipeline::PipelineOptions;
use trackplot::providers::ArchiveProvider;
use trackplot::{EventRef, RenderRequest, TrackError};

#[tokio::test]
async fn monaco_current_season() {
    let config = config("monaco");
    archive_race(&config.archive_dir, 2024, "Monaco", &race_yaml("Monaco Grand Prix", 2024, 120, true));

    let pipeline = pipeline(ArchiveProvider::new(&config.archive_dir), config.clone());
    let event = EventRef::new(2024, "Monaco Grand Prix").unwrap();
    let view = pipeline.render_view(&event, &PipelineOptions::from_config(&config)).await;

    assert!(view.data_available);
    assert_eq!(view.title, "Monaco (2024)");
    assert_eq!(view.effective_year, Some(2024));
    assert!(view.image.unwrap().starts_with(PNG_MAGIC));
}

#[tokio::test]
async fn previous_season_is_used_when_current_is_missing() {
    let config = config("fallback");
    archive_race(&config.archive_dir, 2023, "Monaco", &race_yaml("Monaco Grand Prix", 2023, 64, false));

    let pipeline = pipeline(ArchiveProvider::new(&config.archive_dir), config.clone());
    let event = EventRef::new(2024, "Monaco").unwrap();
    let rendered = pipeline.render(&event, &PipelineOptions::from_config(&config)).await.unwrap();

    assert_eq!(rendered.effective_year, 2023);
    assert_eq!(rendered.title, "Monaco (2023)");
}

#[tokio::test]
async fn two_missing_seasons_are_unavailable() {
    let config = config("unavailable");
    archive_race(&config.archive_dir, 2022, "Monaco", &race_yaml("Monaco Grand Prix", 2022, 64, false));

    let pipeline = pipeline(ArchiveProvider::new(&config.archive_dir), config.clone());
    let event = EventRef::new(2024, "Monaco").unwrap();
    let options = PipelineOptions::from_config(&config);

    let err = pipeline.render(&event, &options).await.unwrap_err();
    assert!(matches!(err, TrackError::SessionUnavailable { requested_year: 2024, oldest_year: 2023, .. }));

    let view = pipeline.render_view(&event, &options).await;
    assert!(!view.data_available);
    assert!(view.image.is_none());
}

#[tokio::test]
async fn corrupt_archive_is_an_error_not_a_fallback() {
    let config = config("corrupt");
    archive_race(&config.archive_dir, 2024, "Monaco", "Laps: [this is not: valid");
    archive_race(&config.archive_dir, 2023, "Monaco", &race_yaml("Monaco Grand Prix", 2023, 64, false));

    let pipeline = pipeline(ArchiveProvider::new(&config.archive_dir), config.clone());
    let event = EventRef::new(2024, "Monaco").unwrap();
    let options = PipelineOptions::from_config(&config);

    let err = pipeline.render(&event, &options).await.unwrap_err();
    assert!(matches!(err, TrackError::Session { year: 2024, .. }));
    assert_eq!(pipeline.render_view(&event, &options).await.title, "Error loading track data for Monaco.");
}

#[tokio::test]
async fn cache_serves_verbatim_until_refreshed() {
    let config = config("cache");
    archive_race(&config.archive_dir, 2024, "Monaco", &race_yaml("Monaco Grand Prix", 2024, 120, true));

    let pipeline = Arc::new(pipeline(ArchiveProvider::new(&config.archive_dir), config.clone()));
    let cache = RenderCache::new(FsCacheStore::new(&config.cache_dir), Arc::clone(&pipeline));
    let request = RenderRequest::new(EventRef::new(2024, "Monaco").unwrap());

    let first = cache.get_or_render(&request).await.unwrap();
    assert_eq!(first.status, CacheStatus::Miss);
    let key = CacheKey::for_request(&request);
    assert_eq!(first.key, key);
    assert!(config.cache_dir.join(key.file_name()).is_file());

    // a changed archive is invisible until refresh
    archive_race(&config.archive_dir, 2024, "Monaco", &race_yaml("Monaco Grand Prix", 2024, 40, false));
    let cached = cache.get_or_render(&request).await.unwrap();
    assert_eq!(cached.status, CacheStatus::Hit);
    assert_eq!(cached.bytes, first.bytes);

    let refreshed = cache.get_or_render(&request.clone().refreshed(true)).await.unwrap();
    assert_eq!(refreshed.status, CacheStatus::Refreshed);
    assert_eq!(refreshed.key, key);
    assert_ne!(refreshed.bytes, first.bytes);
    assert_eq!(cache.store().read(&key).await.unwrap(), Some(refreshed.bytes));
}

#[tokio::test]
async fn unavailable_renders_are_not_cached() {
    let config = config("uncached");
    let pipeline = Arc::new(pipeline(ArchiveProvider::new(&config.archive_dir), config.clone()));
    let cache = RenderCache::new(FsCacheStore::new(&config.cache_dir), pipeline);
    let request = RenderRequest::new(EventRef::new(2024, "Monaco").unwrap());

    let err = cache.get_or_render(&request).await.unwrap_err();
    assert_eq!(err.status_code(), 404);
    assert!(!cache.store().exists(&CacheKey::for_request(&request)).await.unwrap());
}

#[test]
fn strict_boundary_rejects_angle() {
    let request = RenderRequest::new(EventRef::new(2024, "Monaco").unwrap()).with_rotation(15.0);
    let err = request.ensure_strict().unwrap_err();
    assert_eq!(err.status_code(), 400);
}

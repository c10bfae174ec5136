//! HTTP boundary
//!
//! Routes:
//! - `GET /track_image/{year}/{gp_name}`: PNG through the render cache,
//!   strict rotation only
//! - `GET /track/{year}/{gp_name}`: JSON summary of a render
//! - `GET /healthz`

use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::cache::{CacheStatus, CacheStore, FsCacheStore, RenderCache};
use crate::pipeline::{PipelineOptions, TrackImagePipeline};
use crate::provider::SessionProvider;
use crate::types::{EventRef, FigureSize, RenderRequest};
use crate::{Result, TrackError};

pub const CACHE_CONTROL_CACHED: &str = "public, max-age=3600";
pub const CACHE_CONTROL_REFRESHED: &str = "no-cache, no-store, must-revalidate";

pub type SharedPipeline = Arc<TrackImagePipeline<Arc<dyn SessionProvider>>>;
pub type SharedCache = RenderCache<Arc<dyn CacheStore>, SharedPipeline>;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pipeline: SharedPipeline,
    cache: Arc<SharedCache>,
}

impl AppState {
    pub fn new(pipeline: SharedPipeline, store: Arc<dyn CacheStore>) -> Self {
        let cache = Arc::new(RenderCache::new(store, Arc::clone(&pipeline)));
        Self { pipeline, cache }
    }

    /// State caching under the pipeline's configured directory
    pub fn from_pipeline(pipeline: SharedPipeline) -> Self {
        let store: Arc<dyn CacheStore> = Arc::new(FsCacheStore::new(&pipeline.config().cache_dir));
        Self::new(pipeline, store)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/track_image/{year}/{gp_name}", get(track_image))
        .route("/track/{year}/{gp_name}", get(track_summary))
        .with_state(state)
}

/// Bind and serve until the process ends
pub async fn serve(state: AppState, bind: std::net::SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!(addr = %listener.local_addr()?, "Listening");
    axum::serve(listener, router(state)).await
}

async fn healthz() -> &'static str {
    "ok"
}

fn error_response(err: &TrackError) -> Response {
    let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, err.to_string()).into_response()
}

/// `0`/`1` style flag; anything unparsable is false
fn flag(params: &HashMap<String, String>, name: &str) -> bool {
    params.get(name).and_then(|v| v.trim().parse::<i64>().ok()).is_some_and(|v| v != 0)
}

/// Build the public request from path and query.
///
/// Any angle is rejected; `w` and `h` take effect only together.
pub fn parse_image_request(year: i32, gp_name: &str, params: &HashMap<String, String>) -> Result<RenderRequest> {
    let event = EventRef::new(year, gp_name)?;
    let mut request = RenderRequest::new(event).with_axes(flag(params, "show_axes")).refreshed(flag(params, "refresh"));

    if let Some(raw) = params.get("angle") {
        let angle = raw.trim().parse::<f64>().map_err(|_| TrackError::invalid_request("Invalid angle parameter"))?;
        request = request.with_rotation(angle);
    }
    request.ensure_strict()?;

    if let (Some(w), Some(h)) = (params.get("w"), params.get("h")) {
        let parse = |v: &String| {
            v.trim().parse::<f64>().map_err(|_| TrackError::invalid_request("Invalid size parameters"))
        };
        request = request.with_figure_size(FigureSize::new(parse(w)?, parse(h)?)?);
    }
    Ok(request)
}

async fn track_image(
    State(state): State<AppState>,
    Path((year, gp_name)): Path<(i32, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let request = match parse_image_request(year, &gp_name, &params) {
        Ok(request) => request,
        Err(e) => {
            warn!(year, gp_name = %gp_name, error = %e, "Rejected track image request");
            return error_response(&e);
        }
    };

    match state.cache.get_or_render(&request).await {
        Ok(outcome) => {
            let cache_control = match outcome.status {
                CacheStatus::Refreshed => CACHE_CONTROL_REFRESHED,
                CacheStatus::Hit | CacheStatus::Miss => CACHE_CONTROL_CACHED,
            };
            (
                [(header::CONTENT_TYPE, "image/png"), (header::CACHE_CONTROL, cache_control)],
                outcome.bytes,
            )
                .into_response()
        }
        Err(e) => {
            warn!(event = %request.event, error = %e, "Track image request failed");
            error_response(&e)
        }
    }
}

/// JSON body of `/track/{year}/{gp_name}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackSummary {
    pub title: String,
    pub requested_year: i32,
    pub source_year: Option<i32>,
    pub data_available: bool,
    pub image_url: Option<String>,
}

async fn track_summary(State(state): State<AppState>, Path((year, gp_name)): Path<(i32, String)>) -> Response {
    let event = match EventRef::new(year, &gp_name) {
        Ok(event) => event,
        Err(e) => return error_response(&e),
    };

    let options = PipelineOptions::from_config(state.pipeline.config());
    let view = state.pipeline.render_view(&event, &options).await;
    let image_url =
        view.data_available.then(|| format!("/track_image/{}/{}", event.year(), event.identifier()));

    Json(TrackSummary {
        title: view.title,
        requested_year: view.requested_year,
        source_year: view.effective_year,
        data_available: view.data_available,
        image_url,
    })
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrackPlotConfig;
    use crate::providers::MemoryProvider;
    use crate::render::Rasterizer;
    use crate::test_utils::{race, scratch_dir, session_document};

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn state(provider: MemoryProvider) -> AppState {
        let mut config = TrackPlotConfig::default();
        config.style.figure = FigureSize { width: 3.0, height: 2.0 };
        config.cache_dir = scratch_dir("server");
        let rasterizer = Rasterizer::with_fontdb(config.style.clone(), Arc::new(usvg::fontdb::Database::new()));
        let provider: Arc<dyn SessionProvider> = Arc::new(provider);
        AppState::from_pipeline(Arc::new(TrackImagePipeline::with_rasterizer(provider, config, rasterizer)))
    }

    fn monaco_state() -> AppState {
        state(MemoryProvider::new().with_session(race(2024, "Monaco"), session_document(2024, "Monaco", 64, None)))
    }

    async fn get(state: AppState, year: i32, name: &str, query: &[(&str, &str)]) -> Response {
        track_image(State(state), Path((year, name.to_string())), Query(params(query))).await
    }

    async fn body(response: Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
    }

    #[test]
    fn query_parsing() {
        let request = parse_image_request(2024, "Monaco Grand Prix", &params(&[("show_axes", "1")])).unwrap();
        assert_eq!(request.event.identifier(), "Monaco");
        assert!(request.show_axes);
        assert!(!request.force_refresh);
        assert_eq!(request.figure_size, None);

        let request = parse_image_request(2024, "Monaco", &params(&[("show_axes", "yes"), ("refresh", "1")])).unwrap();
        assert!(!request.show_axes);
        assert!(request.force_refresh);

        // only one dimension is ignored
        let request = parse_image_request(2024, "Monaco", &params(&[("w", "8")])).unwrap();
        assert_eq!(request.figure_size, None);

        let request = parse_image_request(2024, "Monaco", &params(&[("w", "8"), ("h", "4.5")])).unwrap();
        assert_eq!(request.figure_size, Some(FigureSize { width: 8.0, height: 4.5 }));
    }

    #[test]
    fn query_rejections() {
        let err = parse_image_request(2024, "Monaco", &params(&[("angle", "15")])).unwrap_err();
        assert!(matches!(err, TrackError::InvalidRequest { .. }));

        let err = parse_image_request(2024, "Monaco", &params(&[("angle", "abc")])).unwrap_err();
        assert_eq!(err.to_string(), "Invalid request: Invalid angle parameter");

        for (w, h) in [("x", "9"), ("0", "9"), ("16", "-1")] {
            let err = parse_image_request(2024, "Monaco", &params(&[("w", w), ("h", h)])).unwrap_err();
            assert_eq!(err.status_code(), 400);
        }
        assert!(parse_image_request(2024, "Grand Prix", &params(&[])).is_err());
    }

    #[tokio::test]
    async fn image_is_served_and_cached() {
        let state = monaco_state();

        let response = get(state.clone(), 2024, "Monaco", &[]).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
        assert_eq!(response.headers()[header::CACHE_CONTROL], CACHE_CONTROL_CACHED);
        let first = body(response).await;
        assert!(first.starts_with(&[0x89, b'P', b'N', b'G']));

        let second = body(get(state.clone(), 2024, "Monaco", &[]).await).await;
        assert_eq!(first, second);

        let refreshed = get(state, 2024, "Monaco", &[("refresh", "1")]).await;
        assert_eq!(refreshed.headers()[header::CACHE_CONTROL], CACHE_CONTROL_REFRESHED);
    }

    #[tokio::test]
    async fn angle_is_rejected_even_when_cached() {
        let state = monaco_state();
        assert_eq!(get(state.clone(), 2024, "Monaco", &[]).await.status(), StatusCode::OK);

        let response = get(state, 2024, "Monaco", &[("angle", "15")]).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_data_is_not_found() {
        let response = get(state(MemoryProvider::new()), 2024, "Monaco", &[]).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn provider_fault_is_server_error() {
        let provider = MemoryProvider::new();
        provider.fail_on(race(2024, "Monaco"));
        let response = get(state(provider), 2024, "Monaco", &[]).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn summary_reports_fallback() {
        let state =
            state(MemoryProvider::new().with_session(race(2023, "Monaco"), session_document(2023, "Monaco", 64, None)));
        let response = track_summary(State(state), Path((2024, "Monaco Grand Prix".to_string()))).await;
        assert_eq!(response.status(), StatusCode::OK);

        let json: serde_json::Value = serde_json::from_slice(&body(response).await).unwrap();
        assert_eq!(json["title"], "Monaco (2023)");
        assert_eq!(json["requested_year"], 2024);
        assert_eq!(json["source_year"], 2023);
        assert_eq!(json["data_available"], true);
        assert_eq!(json["image_url"], "/track_image/2024/Monaco");
    }

    #[tokio::test]
    async fn summary_for_missing_data_is_ok() {
        let response = track_summary(State(state(MemoryProvider::new())), Path((2024, "Monaco".to_string()))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body(response).await).unwrap();
        assert_eq!(json["data_available"], false);
        assert_eq!(json["image_url"], serde_json::Value::Null);
        assert_eq!(json["title"], "Track Data Unavailable for Monaco (2024 or 2023)");
    }

    #[tokio::test]
    async fn health() {
        assert_eq!(healthz().await, "ok");
    }
}

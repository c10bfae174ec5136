//! Content-addressed render cache
//!
//! Entries are keyed by a SHA-256 over the request fields that affect the
//! image and never expire; a forced refresh deletes and regenerates one.
//! Storage failures other than a failed render never change the response.

mod store;

pub use store::{CacheStore, FsCacheStore};

use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::Result;
use crate::types::RenderRequest;

/// Hex SHA-256 of a request's canonical form
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Key over (year, identifier, rotation, show-axes, figure size).
    ///
    /// `force_refresh` is not part of the key.
    pub fn for_request(request: &RenderRequest) -> Self {
        let digest = Sha256::digest(canonical_form(request).as_bytes());
        CacheKey(format!("{:x}", digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of the stored image
    pub fn file_name(&self) -> String {
        format!("{}.png", self.0)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Newline-separated `field=value` lines; absent values are `-`.
///
/// Floats use their shortest round-trip form, so distinct values never
/// collide textually.
fn canonical_form(request: &RenderRequest) -> String {
    let rotation = request.rotation_deg.map_or_else(|| "-".to_string(), |deg| format!("{:?}", deg));
    let size = request
        .figure_size
        .map_or_else(|| "-".to_string(), |size| format!("{:?}x{:?}", size.width, size.height));
    format!(
        "year={}\nidentifier={}\nrotation={}\nshow_axes={}\nsize={}",
        request.event.year(),
        request.event.identifier(),
        rotation,
        request.show_axes,
        size
    )
}

/// Produces image bytes for a cache miss
#[async_trait::async_trait]
pub trait TrackRenderer: Send + Sync + 'static {
    async fn render_request(&self, request: &RenderRequest) -> Result<Vec<u8>>;
}

#[async_trait::async_trait]
impl<R: TrackRenderer + ?Sized> TrackRenderer for Arc<R> {
    async fn render_request(&self, request: &RenderRequest) -> Result<Vec<u8>> {
        (**self).render_request(request).await
    }
}

/// How a response was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
    /// Forced refresh; any previous entry was discarded
    Refreshed,
}

/// Image bytes with their provenance
#[derive(Debug, Clone, PartialEq)]
pub struct CacheOutcome {
    pub key: CacheKey,
    pub bytes: Vec<u8>,
    pub status: CacheStatus,
}

/// Serves stored renders or produces and stores new ones
#[derive(Debug)]
pub struct RenderCache<S, R> {
    store: S,
    renderer: R,
}

impl<S: CacheStore, R: TrackRenderer> RenderCache<S, R> {
    pub fn new(store: S, renderer: R) -> Self {
        Self { store, renderer }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Return cached bytes for `request`, rendering on a miss or refresh.
    ///
    /// Only render failures are returned as errors; nothing is stored for them.
    pub async fn get_or_render(&self, request: &RenderRequest) -> Result<CacheOutcome> {
        let key = CacheKey::for_request(request);

        if request.force_refresh {
            match self.store.delete(&key).await {
                Ok(removed) => debug!(%key, removed, "Refresh requested, cache entry discarded"),
                Err(e) => warn!(%key, error = %e, "Failed to delete cache entry before refresh"),
            }
        } else {
            match self.store.read(&key).await {
                Ok(Some(bytes)) => {
                    debug!(%key, event = %request.event, "Cache hit");
                    return Ok(CacheOutcome { key, bytes, status: CacheStatus::Hit });
                }
                Ok(None) => debug!(%key, event = %request.event, "Cache miss"),
                Err(e) => warn!(%key, error = %e, "Cache read failed, rendering instead"),
            }
        }

        let bytes = self.renderer.render_request(request).await?;

        match self.store.write(&key, &bytes).await {
            Ok(()) => info!(%key, event = %request.event, bytes = bytes.len(), "Cached rendered track"),
            Err(e) => warn!(%key, error = %e, "Failed to persist rendered track"),
        }

        let status = if request.force_refresh { CacheStatus::Refreshed } else { CacheStatus::Miss };
        Ok(CacheOutcome { key, bytes, status })
    }
}

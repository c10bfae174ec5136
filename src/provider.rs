//! Provider trait for session data sources

use std::sync::Arc;

use crate::Result;
use crate::schema::SessionDocument;
use crate::types::SessionKind;

/// One session lookup
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionRequest {
    pub year: i32,
    /// Sanitized event identifier
    pub identifier: String,
    pub kind: SessionKind,
}

impl SessionRequest {
    pub fn new(year: i32, identifier: impl Into<String>, kind: SessionKind) -> Self {
        Self { year, identifier: identifier.into(), kind }
    }
}

/// Which parts of a session a load should populate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    pub laps: bool,
    pub positions: bool,
    pub weather: bool,
    pub messages: bool,
}

impl LoadOptions {
    /// Laps and positions only; weather and messages are irrelevant to track shape
    pub fn track_shape() -> Self {
        Self { laps: true, positions: true, weather: false, messages: false }
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self::track_shape()
    }
}

/// Trait for session data sources
///
/// Providers abstract over where recorded sessions live (an on-disk archive,
/// memory, a remote service). They may cache independently; the resolver
/// never persists what they return.
#[async_trait::async_trait]
pub trait SessionProvider: Send + Sync + 'static {
    /// Load one session
    ///
    /// Returns:
    /// - `Ok(Some(document))` - Session loaded
    /// - `Ok(None)` - No session recorded for this request
    /// - `Err(e)` - Provider fault or corrupt data; never retried across years
    async fn load_session(
        &self,
        request: &SessionRequest,
        options: &LoadOptions,
    ) -> Result<Option<SessionDocument>>;

    /// Short name for logs
    fn name(&self) -> &str;
}

#[async_trait::async_trait]
impl<P: SessionProvider + ?Sized> SessionProvider for Arc<P> {
    async fn load_session(
        &self,
        request: &SessionRequest,
        options: &LoadOptions,
    ) -> Result<Option<SessionDocument>> {
        (**self).load_session(request, options).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

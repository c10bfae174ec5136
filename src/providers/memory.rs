//! In-memory provider
//!
//! Holds session documents keyed by request. Used by tests, benchmarks and
//! demos; supports fault injection and counts loads so year fallback can be
//! observed from the outside.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::provider::{LoadOptions, SessionProvider, SessionRequest};
use crate::schema::SessionDocument;
use crate::{Result, TrackError};

/// Provider serving documents from memory
#[derive(Debug, Default)]
pub struct MemoryProvider {
    sessions: Mutex<HashMap<SessionRequest, SessionDocument>>,
    faults: Mutex<HashSet<SessionRequest>>,
    loads: AtomicUsize,
    attempted: Mutex<Vec<SessionRequest>>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a session
    pub fn insert(&self, request: SessionRequest, document: SessionDocument) {
        lock(&self.sessions).insert(request, document);
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with_session(self, request: SessionRequest, document: SessionDocument) -> Self {
        self.insert(request, document);
        self
    }

    /// Make every load of `request` fail with a provider fault
    pub fn fail_on(&self, request: SessionRequest) {
        lock(&self.faults).insert(request);
    }

    /// Number of `load_session` calls so far
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Every request seen, in call order
    pub fn attempted(&self) -> Vec<SessionRequest> {
        lock(&self.attempted).clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait::async_trait]
impl SessionProvider for MemoryProvider {
    async fn load_session(
        &self,
        request: &SessionRequest,
        options: &LoadOptions,
    ) -> Result<Option<SessionDocument>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        lock(&self.attempted).push(request.clone());

        if lock(&self.faults).contains(request) {
            return Err(TrackError::session_error(
                request.year,
                &request.identifier,
                "injected provider fault",
            ));
        }

        let document = lock(&self.sessions).get(request).cloned();
        Ok(document.map(|mut doc| {
            doc.restrict(options);
            doc
        }))
    }

    fn name(&self) -> &str {
        "memory"
    }
}

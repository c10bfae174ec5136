//! Archive provider for exported session documents
//!
//! Reads `<root>/<year>/<identifier>/<code>.yaml`, where `code` is the
//! session's short code (`FP1`, `Q`, `R`, ...). A missing file means the
//! session was never recorded; anything else that goes wrong is a fault.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::provider::{LoadOptions, SessionProvider, SessionRequest};
use crate::schema::SessionDocument;
use crate::{Result, TrackError, yaml_utils};

/// Provider backed by a directory of session YAML files
#[derive(Debug, Clone)]
pub struct ArchiveProvider {
    root: PathBuf,
}

impl ArchiveProvider {
    /// Create a provider rooted at `root`. The directory need not exist yet.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        info!("Session archive at {}", root.display());
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of the document for `request`
    pub fn document_path(&self, request: &SessionRequest) -> PathBuf {
        self.root
            .join(request.year.to_string())
            .join(&request.identifier)
            .join(format!("{}.yaml", request.kind.code()))
    }

    /// Write a document where `load_session` will find it
    pub async fn store(&self, request: &SessionRequest, document: &SessionDocument) -> Result<()> {
        let path = self.document_path(request);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| TrackError::file_error(parent.to_path_buf(), e))?;
        }
        let yaml = serde_yaml_ng::to_string(document)
            .map_err(|e| TrackError::parse_error("Session YAML serialization", e.to_string()))?;
        tokio::fs::write(&path, yaml).await.map_err(|e| TrackError::file_error(path.clone(), e))
    }
}

#[async_trait::async_trait]
impl SessionProvider for ArchiveProvider {
    async fn load_session(
        &self,
        request: &SessionRequest,
        options: &LoadOptions,
    ) -> Result<Option<SessionDocument>> {
        let path = self.document_path(request);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No archived session");
                return Ok(None);
            }
            Err(e) => {
                return Err(TrackError::session_error_with_source(
                    request.year,
                    &request.identifier,
                    format!("cannot read {}", path.display()),
                    Box::new(e),
                ));
            }
        };

        let to_session_error = |e: TrackError| {
            TrackError::session_error_with_source(
                request.year,
                &request.identifier,
                format!("corrupt session document {}", path.display()),
                Box::new(e),
            )
        };
        let yaml = yaml_utils::decode_yaml_bytes(&bytes).map_err(to_session_error)?;
        let mut document = SessionDocument::parse(&yaml).map_err(to_session_error)?;
        document.restrict(options);

        debug!(
            path = %path.display(),
            laps = document.laps.len(),
            "Loaded archived session"
        );
        Ok(Some(document))
    }

    fn name(&self) -> &str {
        "archive"
    }
}

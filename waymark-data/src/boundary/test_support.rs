//! Shared fixtures for boundary loader tests.
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use waymark_core::Boundary;

use super::{BoundarySource, SourceError};

/// Stub [`BoundarySource`] that counts fetches.
///
/// Returns its boundary after `failing_first` HTTP 503 failures. Built
/// without a boundary it fails every fetch, as a missing file or an
/// unreachable host.
#[derive(Debug, Clone)]
pub struct StubBoundarySource {
    name: String,
    boundary: Option<Boundary>,
    unreachable: bool,
    failing_first: usize,
    delay: Option<Duration>,
    fetches: Arc<AtomicUsize>,
}

impl StubBoundarySource {
    /// Source that always returns `boundary`.
    pub fn succeeding(name: impl Into<String>, boundary: Boundary) -> Self {
        Self {
            name: name.into(),
            boundary: Some(boundary),
            unreachable: false,
            failing_first: 0,
            delay: None,
            fetches: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Source whose file never exists.
    pub fn missing(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            boundary: None,
            unreachable: false,
            failing_first: 0,
            delay: None,
            fetches: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Remote source whose host never answers.
    pub fn unreachable(name: impl Into<String>) -> Self {
        Self {
            unreachable: true,
            ..Self::missing(name)
        }
    }

    /// Fail the first `count` fetches with HTTP 503.
    #[must_use]
    pub fn failing_first(mut self, count: usize) -> Self {
        self.failing_first = count;
        self
    }

    /// Sleep before answering each fetch.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of fetches started so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Wrap into the trait object the loader takes.
    pub fn shared(self) -> (Arc<Self>, Arc<dyn BoundarySource>) {
        let stub = Arc::new(self);
        let source: Arc<dyn BoundarySource> = stub.clone();
        (stub, source)
    }
}

#[async_trait]
impl BoundarySource for StubBoundarySource {
    fn describe(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<Boundary, SourceError> {
        let attempt = self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let Some(boundary) = &self.boundary else {
            if self.unreachable {
                return Err(SourceError::Network {
                    url: self.name.clone(),
                    message: "connection refused".to_owned(),
                });
            }
            return Err(SourceError::Missing {
                path: self.name.clone(),
            });
        };
        if attempt < self.failing_first {
            return Err(SourceError::Http {
                url: self.name.clone(),
                status: 503,
            });
        }
        Ok(boundary.clone())
    }
}

//! Single-flight, process-lifetime cache over an ordered list of sources.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt, Shared};
use log::{debug, info, warn};
use waymark_core::{Boundary, BoundingBox, validate_point};

use super::{
    BoundarySource, BoundaryUnavailable, CountryMatcher, FileBoundarySource, GeofenceError,
    HttpBoundarySource, PolygonSourceConfig, SourceError, SourceFailure, build_client,
};

type LoadOutcome = Result<Arc<Boundary>, BoundaryUnavailable>;
type InFlight = Shared<BoxFuture<'static, LoadOutcome>>;

enum LoadState {
    Idle,
    Loading(InFlight),
    Ready(Arc<Boundary>),
}

/// Loads the country boundary once and shares it for the process lifetime.
///
/// Sources are tried in order; each attempt is bounded by the configured
/// timeout and any failure falls through to the next source. Concurrent
/// callers during the first load await the same in-flight attempt, so
/// every source is fetched at most once per load. A failed load is not
/// cached: the next call starts a fresh pass over the sources.
///
/// Construct one instance at start-up and pass it by reference to
/// consumers.
///
/// # Examples
/// ```no_run
/// use waymark_data::boundary::{PolygonSource, PolygonSourceConfig};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let source = PolygonSource::from_config(&PolygonSourceConfig::default())?;
/// let inside = source.contains(50.4501, 30.5234).await?;
/// assert!(inside);
/// # Ok(())
/// # }
/// ```
pub struct PolygonSource {
    sources: Arc<[Arc<dyn BoundarySource>]>,
    attempt_timeout: Duration,
    state: Mutex<LoadState>,
}

impl fmt::Debug for PolygonSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &*self.state.lock().unwrap_or_else(PoisonError::into_inner) {
            LoadState::Idle => "idle",
            LoadState::Loading(_) => "loading",
            LoadState::Ready(_) => "ready",
        };
        f.debug_struct("PolygonSource")
            .field("sources", &self.sources)
            .field("attempt_timeout", &self.attempt_timeout)
            .field("state", &state)
            .finish()
    }
}

impl PolygonSource {
    /// Create a loader over `sources`, tried in the given order.
    pub fn new<I>(sources: I, attempt_timeout: Duration) -> Self
    where
        I: IntoIterator<Item = Arc<dyn BoundarySource>>,
    {
        Self {
            sources: sources.into_iter().collect(),
            attempt_timeout,
            state: Mutex::new(LoadState::Idle),
        }
    }

    /// Create a loader trying every remote URL, then every local path.
    ///
    /// # Errors
    /// Fails when a remote URL is invalid or the HTTP client cannot be
    /// built.
    pub fn from_config(config: &PolygonSourceConfig) -> Result<Self, SourceError> {
        let matcher = CountryMatcher::new(&config.aliases);
        let mut sources: Vec<Arc<dyn BoundarySource>> = Vec::new();
        if !config.remote_urls.is_empty() {
            let client = build_client(config.timeout, &config.user_agent)?;
            for url in &config.remote_urls {
                let source = HttpBoundarySource::with_client(
                    client.clone(),
                    url,
                    matcher.clone(),
                    config.timeout,
                )?;
                sources.push(Arc::new(source));
            }
        }
        for path in &config.local_paths {
            sources.push(Arc::new(FileBoundarySource::new(
                path.clone(),
                matcher.clone(),
            )));
        }
        Ok(Self::new(sources, config.timeout))
    }

    /// Descriptions of the configured sources, in attempt order.
    pub fn describe_sources(&self) -> impl Iterator<Item = &str> + '_ {
        self.sources.iter().map(|source| source.describe())
    }

    /// The boundary, if a load has already succeeded.
    pub fn cached(&self) -> Option<Arc<Boundary>> {
        match &*self.lock_state() {
            LoadState::Ready(boundary) => Some(Arc::clone(boundary)),
            LoadState::Idle | LoadState::Loading(_) => None,
        }
    }

    /// Load the boundary, reusing the cached or in-flight result.
    ///
    /// # Errors
    /// Returns [`BoundaryUnavailable`] when every source failed.
    pub async fn load(&self) -> LoadOutcome {
        let in_flight = {
            let mut state = self.lock_state();
            match &*state {
                LoadState::Ready(boundary) => return Ok(Arc::clone(boundary)),
                LoadState::Loading(in_flight) => in_flight.clone(),
                LoadState::Idle => {
                    let in_flight =
                        load_in_order(Arc::clone(&self.sources), self.attempt_timeout)
                            .boxed()
                            .shared();
                    *state = LoadState::Loading(in_flight.clone());
                    in_flight
                }
            }
        };

        let outcome = in_flight.clone().await;

        let mut state = self.lock_state();
        if let LoadState::Loading(current) = &*state
            && current.ptr_eq(&in_flight)
        {
            *state = match &outcome {
                Ok(boundary) => LoadState::Ready(Arc::clone(boundary)),
                Err(_) => LoadState::Idle,
            };
        }
        outcome
    }

    /// Validate `lat`/`lng` and test the point against the boundary.
    ///
    /// Invalid points are rejected before any source is fetched.
    ///
    /// # Errors
    /// Returns [`GeofenceError::InvalidPoint`] for non-finite or
    /// out-of-range coordinates and [`GeofenceError::Unavailable`] when the
    /// boundary cannot be loaded.
    pub async fn contains(&self, lat: f64, lng: f64) -> Result<bool, GeofenceError> {
        let point = validate_point(lat, lng)?;
        let boundary = self.load().await?;
        Ok(boundary.contains(point))
    }

    /// Bounding box of the loaded boundary.
    ///
    /// # Errors
    /// Returns [`BoundaryUnavailable`] when every source failed.
    pub async fn bounds(&self) -> Result<BoundingBox, BoundaryUnavailable> {
        Ok(self.load().await?.bounds())
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, LoadState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn load_in_order(
    sources: Arc<[Arc<dyn BoundarySource>]>,
    attempt_timeout: Duration,
) -> LoadOutcome {
    let mut failures = Vec::with_capacity(sources.len());
    for source in sources.iter() {
        let origin = source.describe();
        debug!("loading country boundary from {origin}");
        let error = match tokio::time::timeout(attempt_timeout, source.fetch()).await {
            Ok(Ok(boundary)) => {
                info!(
                    "loaded country boundary {:?} from {origin}",
                    boundary.name()
                );
                return Ok(Arc::new(boundary));
            }
            Ok(Err(error)) => error,
            Err(_elapsed) => SourceError::Timeout {
                url: origin.to_owned(),
                timeout: attempt_timeout,
            },
        };
        warn!("boundary source {origin} failed: {error}");
        failures.push(SourceFailure {
            origin: origin.to_owned(),
            error,
        });
    }
    Err(BoundaryUnavailable::new(failures))
}

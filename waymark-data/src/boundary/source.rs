//! Boundary source strategies: remote GeoJSON over HTTP and local files.

use std::fmt::Debug;
use std::io;
use std::time::Duration;

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use reqwest::Client;
use url::Url;
use waymark_core::Boundary;

use super::{CountryMatcher, Selection, SourceError, parse_boundary};

/// Somewhere a country boundary can be fetched from.
///
/// Implementations perform a single attempt and report failures as
/// [`SourceError`]; retrying and fallback belong to the loader.
#[async_trait]
pub trait BoundarySource: Send + Sync + Debug {
    /// URL or path used in logs and error reports.
    fn describe(&self) -> &str;

    /// Fetch and parse the boundary once.
    async fn fetch(&self) -> Result<Boundary, SourceError>;
}

/// Build the HTTP client shared by remote sources.
///
/// # Errors
/// Returns [`SourceError::Client`] when the TLS backend cannot initialise.
pub fn build_client(timeout: Duration, user_agent: &str) -> Result<Client, SourceError> {
    Client::builder()
        .user_agent(user_agent)
        .connect_timeout(timeout)
        .timeout(timeout)
        .build()
        .map_err(|err| SourceError::Client {
            message: err.to_string(),
        })
}

/// Remote world or country GeoJSON served over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpBoundarySource {
    client: Client,
    url: Url,
    matcher: CountryMatcher,
    timeout: Duration,
}

impl HttpBoundarySource {
    /// Create a source with its own client.
    ///
    /// # Errors
    /// Fails when `url` is not an absolute HTTP(S) URL or the client cannot
    /// be built.
    pub fn new(
        url: &str,
        matcher: CountryMatcher,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, SourceError> {
        let client = build_client(timeout, user_agent)?;
        Self::with_client(client, url, matcher, timeout)
    }

    /// Create a source reusing an existing client.
    ///
    /// `timeout` is only used for error reporting; the client enforces its
    /// own.
    ///
    /// # Errors
    /// Fails when `url` is not an absolute HTTP(S) URL.
    pub fn with_client(
        client: Client,
        url: &str,
        matcher: CountryMatcher,
        timeout: Duration,
    ) -> Result<Self, SourceError> {
        let parsed = Url::parse(url).map_err(|err| SourceError::InvalidUrl {
            url: url.to_owned(),
            message: err.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SourceError::InvalidUrl {
                url: url.to_owned(),
                message: format!("unsupported scheme {}", parsed.scheme()),
            });
        }
        Ok(Self {
            client,
            url: parsed,
            matcher,
            timeout,
        })
    }

    /// Requested URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    fn convert_reqwest_error(&self, error: &reqwest::Error) -> SourceError {
        let url = self.url.as_str().to_owned();
        if error.is_timeout() {
            return SourceError::Timeout {
                url,
                timeout: self.timeout,
            };
        }

        if let Some(status) = error.status() {
            return SourceError::Http {
                url,
                status: status.as_u16(),
            };
        }

        SourceError::Network {
            url,
            message: error.to_string(),
        }
    }
}

#[async_trait]
impl BoundarySource for HttpBoundarySource {
    fn describe(&self) -> &str {
        self.url.as_str()
    }

    async fn fetch(&self) -> Result<Boundary, SourceError> {
        let body = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err))?
            .text()
            .await
            .map_err(|err| self.convert_reqwest_error(&err))?;
        parse_boundary(
            &body,
            self.url.as_str(),
            &self.matcher,
            Selection::MatchOrSole,
        )
    }
}

/// Bundled GeoJSON file on the local filesystem.
///
/// A missing file yields [`SourceError::Missing`] so the loader moves on to
/// the next candidate path.
#[derive(Debug, Clone)]
pub struct FileBoundarySource {
    path: Utf8PathBuf,
    matcher: CountryMatcher,
}

impl FileBoundarySource {
    /// Create a source reading `path`.
    pub fn new(path: impl Into<Utf8PathBuf>, matcher: CountryMatcher) -> Self {
        Self {
            path: path.into(),
            matcher,
        }
    }

    /// Path that will be read.
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    fn convert_io_error(&self, source: io::Error) -> SourceError {
        if waymark_fs::is_not_found(&source) {
            return SourceError::Missing {
                path: self.path.to_string(),
            };
        }
        SourceError::Io {
            path: self.path.to_string(),
            source,
        }
    }
}

#[async_trait]
impl BoundarySource for FileBoundarySource {
    fn describe(&self) -> &str {
        self.path.as_str()
    }

    async fn fetch(&self) -> Result<Boundary, SourceError> {
        let path = self.path.clone();
        let text = tokio::task::spawn_blocking(move || waymark_fs::read_utf8_file(&path))
            .await
            .map_err(io::Error::other)
            .and_then(|read| read)
            .map_err(|err| self.convert_io_error(err))?;
        parse_boundary(
            &text,
            self.path.as_str(),
            &self.matcher,
            Selection::MatchOrFirst,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    fn utf8_dir(temp: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("UTF-8 temp dir")
    }

    #[rstest]
    #[case("not a url")]
    #[case("ftp://example.org/ukraine.geojson")]
    #[case("file:///tmp/ukraine.geojson")]
    fn rejects_non_http_urls(#[case] url: &str) {
        let err = HttpBoundarySource::new(
            url,
            CountryMatcher::default(),
            Duration::from_secs(1),
            "waymark-test",
        )
        .expect_err("invalid url");
        assert!(matches!(err, SourceError::InvalidUrl { .. }));
    }

    #[rstest]
    fn http_sources_describe_their_url() {
        let source = HttpBoundarySource::new(
            "https://example.org/countries.geojson",
            CountryMatcher::default(),
            Duration::from_secs(1),
            "waymark-test",
        )
        .expect("valid url");
        assert_eq!(source.describe(), "https://example.org/countries.geojson");
    }

    #[tokio::test]
    async fn missing_files_are_reported_as_missing() {
        let temp = TempDir::new().expect("temp dir");
        let source =
            FileBoundarySource::new(utf8_dir(&temp).join("absent.geojson"), CountryMatcher::default());
        let err = source.fetch().await.expect_err("file is absent");
        assert!(matches!(err, SourceError::Missing { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn reads_and_parses_local_files() {
        let temp = TempDir::new().expect("temp dir");
        let path = utf8_dir(&temp).join("ukraine.geojson");
        std::fs::write(
            &path,
            r#"{"type":"FeatureCollection","features":[{"type":"Feature",
                "properties":{"NAME":"Ukraine"},
                "geometry":{"type":"Polygon","coordinates":[[[22,44],[41,44],[41,53],[22,53],[22,44]]]}}]}"#,
        )
        .expect("write fixture");
        let boundary = FileBoundarySource::new(path, CountryMatcher::default())
            .fetch()
            .await
            .expect("boundary loads");
        assert_eq!(boundary.name(), "Ukraine");
    }

    #[tokio::test]
    async fn malformed_files_fail_to_parse() {
        let temp = TempDir::new().expect("temp dir");
        let path = utf8_dir(&temp).join("broken.geojson");
        std::fs::write(&path, "{").expect("write fixture");
        let err = FileBoundarySource::new(path, CountryMatcher::default())
            .fetch()
            .await
            .expect_err("broken document");
        assert!(matches!(err, SourceError::Parse { .. }));
    }
}

//! Configuration for the boundary loader.

use std::time::Duration;

use camino::Utf8PathBuf;

use super::DEFAULT_ALIASES;

/// Default user agent for boundary requests.
pub const DEFAULT_USER_AGENT: &str = "waymark/0.1";

/// Default per-attempt timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 6;

/// Remote world/country GeoJSON documents tried before local files.
pub const DEFAULT_REMOTE_URLS: [&str; 2] = [
    "https://raw.githubusercontent.com/johan/world.geo.json/master/countries/UKR.geo.json",
    "https://raw.githubusercontent.com/datasets/geo-countries/master/data/countries.geojson",
];

/// Bundled boundary files, relative to the working directory.
pub const DEFAULT_LOCAL_PATHS: [&str; 2] = ["assets/ukraine.geojson", "../assets/ukraine.geojson"];

/// Configuration for [`PolygonSource`](super::PolygonSource).
///
/// `Default` reproduces the production setup. [`PolygonSourceConfig::new`]
/// starts with no sources so callers list exactly the ones they want.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use waymark_data::boundary::PolygonSourceConfig;
///
/// let config = PolygonSourceConfig::new()
///     .with_local_path("assets/ukraine.geojson")
///     .with_timeout(Duration::from_secs(2));
/// assert!(config.remote_urls.is_empty());
/// assert_eq!(config.local_paths.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolygonSourceConfig {
    /// Remote GeoJSON URLs, tried first and in order.
    pub remote_urls: Vec<String>,
    /// Local GeoJSON files, tried after every remote URL.
    pub local_paths: Vec<Utf8PathBuf>,
    /// Case-insensitive names or ISO codes identifying the country feature.
    pub aliases: Vec<String>,
    /// Budget for each individual attempt.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for PolygonSourceConfig {
    fn default() -> Self {
        Self {
            remote_urls: DEFAULT_REMOTE_URLS.iter().map(|url| (*url).to_owned()).collect(),
            local_paths: DEFAULT_LOCAL_PATHS.iter().map(Utf8PathBuf::from).collect(),
            ..Self::new()
        }
    }
}

impl PolygonSourceConfig {
    /// Configuration without sources, using the default aliases, timeout
    /// and user agent.
    #[must_use]
    pub fn new() -> Self {
        Self {
            remote_urls: Vec::new(),
            local_paths: Vec::new(),
            aliases: DEFAULT_ALIASES.iter().map(|alias| (*alias).to_owned()).collect(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }

    /// Append a remote URL.
    #[must_use]
    pub fn with_remote_url(mut self, url: impl Into<String>) -> Self {
        self.remote_urls.push(url.into());
        self
    }

    /// Append a local file path.
    #[must_use]
    pub fn with_local_path(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.local_paths.push(path.into());
        self
    }

    /// Replace the country aliases.
    #[must_use]
    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    /// Set the per-attempt timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn default_tries_remote_then_bundled_files() {
        let config = PolygonSourceConfig::default();
        assert_eq!(config.remote_urls.len(), 2);
        assert_eq!(
            config.local_paths,
            vec![
                Utf8PathBuf::from("assets/ukraine.geojson"),
                Utf8PathBuf::from("../assets/ukraine.geojson"),
            ]
        );
        assert_eq!(config.timeout, Duration::from_secs(6));
        assert_eq!(config.aliases, vec!["ukraine", "ukr", "ukraina"]);
    }

    #[rstest]
    fn builders_override_fields() {
        let config = PolygonSourceConfig::new()
            .with_remote_url("https://example.org/a.geojson")
            .with_aliases(["Moldova", "MDA"])
            .with_timeout(Duration::from_millis(250))
            .with_user_agent("tests/1.0");
        assert_eq!(config.remote_urls, vec!["https://example.org/a.geojson"]);
        assert!(config.local_paths.is_empty());
        assert_eq!(config.aliases, vec!["Moldova", "MDA"]);
        assert_eq!(config.timeout, Duration::from_millis(250));
        assert_eq!(config.user_agent, "tests/1.0");
    }
}

use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for a harvest run
///
/// Every section is optional in the TOML file; missing values fall back to
/// the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub harvester: HarvesterConfig,
    pub source: SourceConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub fetch: FetchConfig,
    pub output: OutputConfig,
}

impl Config {
    /// Pause between batches
    ///
    /// Uses `pause-secs` when set, otherwise half a second per batch item.
    pub fn pause(&self) -> Duration {
        let secs = self
            .harvester
            .pause_secs
            .unwrap_or(self.harvester.batch_size as f64 / 2.0);
        Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::MAX)
    }
}

/// Batch orchestration settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HarvesterConfig {
    /// Number of references fetched per batch
    #[serde(rename = "batch-size")]
    pub batch_size: usize,

    /// Maximum number of detail pages fetched at the same time
    pub concurrency: usize,

    /// Seconds to wait between batches (defaults to `batch-size / 2`)
    #[serde(rename = "pause-secs")]
    pub pause_secs: Option<f64>,
}

impl Default for HarvesterConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            concurrency: 2,
            pause_secs: None,
        }
    }
}

/// Where the index page lives
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Origin that relative detail links are resolved against
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Path of the index page below `base-url`
    #[serde(rename = "list-path")]
    pub list_path: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://bulbapedia.bulbagarden.net".to_string(),
            list_path: "/wiki/Pok%C3%A9mon_category".to_string(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "Bulpedia-scraper".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the `User-Agent` header value
    ///
    /// `Name/Version`, or `Name/Version (+ContactURL)` when a contact URL is set.
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(url) => format!("{}/{} (+{})", self.crawler_name, self.crawler_version, url),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

/// HTTP client timeouts
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the JSON record file
    #[serde(rename = "records-path")]
    pub records_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            records_path: "output/pokemons.json".to_string(),
        }
    }
}

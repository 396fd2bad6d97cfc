use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use url::Url;

/// Configuration for the relay server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Listener settings
    pub server: ServerConfig,

    /// Where segments live and how their URLs are shaped
    pub content_host: ContentHostConfig,

    /// Segment discovery settings
    pub discovery: DiscoveryConfig,

    /// Playlist output settings
    pub playlist: PlaylistConfig,

    /// Outbound HTTP client settings
    pub http: HttpConfig,

    /// Upstream catalog documents
    pub catalog: CatalogConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,

    /// Bind port
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentHostConfig {
    /// Base URL of the content host, without trailing slash
    pub base_url: String,

    /// Literal placed before the quality tier in segment file names
    pub segment_prefix: String,

    /// Zero-padded width of the sequence number
    pub sequence_width: usize,

    /// Segment file extension
    pub segment_extension: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Highest sequence number ever probed
    pub probe_ceiling: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaylistConfig {
    /// Value of `#EXT-X-TARGETDURATION`
    pub target_duration_secs: u32,

    /// Duration written in every `#EXTINF` tag
    pub nominal_segment_secs: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Request timeout in seconds (0 = no timeout)
    pub timeout_seconds: u64,

    /// User agent sent upstream
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Champion list document
    pub champions_url: String,

    /// Course dump document per game
    pub course_urls: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log level when RUST_LOG is unset
    pub level: String,
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        // Try to load from various locations
        let config_paths = [
            "vod-relay.toml",
            "config/vod-relay.toml",
            "/etc/vod-relay/config.toml",
        ];

        for path in &config_paths {
            if Path::new(path).exists() {
                match Self::load_from(path) {
                    Ok(config) => return Ok(config),
                    Err(e) => tracing::warn!("Failed to parse config file {}: {}", path, e),
                }
            }
        }

        // Fall back to defaults plus environment overrides
        Self::from_env()
    }

    /// Load configuration from a specific file, then apply environment overrides
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config_str = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Cannot read config file {}: {}", path.display(), e))?;
        let config: Config = toml::from_str(&config_str)?;
        tracing::info!("📄 Loaded configuration from: {}", path.display());
        Ok(config.with_env_overrides())
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self::default().with_env_overrides())
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(host) = std::env::var("VOD_RELAY_HOST") {
            self.server.host = host;
        }

        if let Ok(port) = std::env::var("VOD_RELAY_PORT") {
            self.server.port = port.parse().unwrap_or(self.server.port);
        }

        if let Ok(base_url) = std::env::var("VOD_RELAY_CONTENT_HOST") {
            self.content_host.base_url = base_url;
        }

        if let Ok(ceiling) = std::env::var("VOD_RELAY_PROBE_CEILING") {
            self.discovery.probe_ceiling = ceiling.parse().unwrap_or(self.discovery.probe_ceiling);
        }

        if let Ok(level) = std::env::var("VOD_RELAY_LOG_LEVEL") {
            self.logging.level = level;
        }

        self
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path.as_ref().display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(anyhow!("server.port must be greater than 0"));
        }

        if self.discovery.probe_ceiling == 0 {
            return Err(anyhow!("probe_ceiling must be greater than 0"));
        }

        if self.content_host.sequence_width == 0 {
            return Err(anyhow!("sequence_width must be greater than 0"));
        }

        if self.playlist.nominal_segment_secs <= 0.0 {
            return Err(anyhow!("nominal_segment_secs must be positive"));
        }

        Url::parse(&self.content_host.base_url)
            .map_err(|e| anyhow!("Invalid content host URL {}: {}", self.content_host.base_url, e))?;

        Url::parse(&self.catalog.champions_url)
            .map_err(|e| anyhow!("Invalid champions URL {}: {}", self.catalog.champions_url, e))?;

        for (game, url) in &self.catalog.course_urls {
            Url::parse(url).map_err(|e| anyhow!("Invalid course URL for {}: {}", game, e))?;
        }

        tracing::info!("✅ Configuration validation passed");
        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "VOD Relay Configuration:\n\
            - Listen: {}:{}\n\
            - Content Host: {}\n\
            - Probe Ceiling: {}\n\
            - Target Duration: {}s\n\
            - Catalog Games: {}",
            self.server.host,
            self.server.port,
            self.content_host.base_url,
            self.discovery.probe_ceiling,
            self.playlist.target_duration_secs,
            self.catalog.course_urls.keys().cloned().collect::<Vec<_>>().join(", ")
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            content_host: ContentHostConfig::default(),
            discovery: DiscoveryConfig::default(),
            playlist: PlaylistConfig::default(),
            http: HttpConfig::default(),
            catalog: CatalogConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for ContentHostConfig {
    fn default() -> Self {
        Self {
            base_url: "https://d13z5uuzt1wkbz.cloudfront.net".to_string(),
            segment_prefix: "HIDDEN".to_string(),
            sequence_width: 5,
            segment_extension: "ts".to_string(),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self { probe_ceiling: 1000 }
    }
}

impl Default for PlaylistConfig {
    fn default() -> Self {
        Self {
            target_duration_secs: 10,
            nominal_segment_secs: 10.0,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 0,
            user_agent: concat!("vod-relay/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        let mut course_urls = BTreeMap::new();
        course_urls.insert(
            "valorant".to_string(),
            "https://d20k8dfo6rtj2t.cloudfront.net/courses_v2/valorant/course_dump_1733423887447.json".to_string(),
        );
        course_urls.insert(
            "lol".to_string(),
            "https://d20k8dfo6rtj2t.cloudfront.net/courses_v2/lol/course_dump_1737851539960.json".to_string(),
        );

        Self {
            champions_url: "https://www.skill-capped.com/api/riot/championDataBasic".to_string(),
            course_urls,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string() }
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Start from an already loaded config
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.config.server.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn with_content_host(mut self, base_url: impl Into<String>) -> Self {
        self.config.content_host.base_url = base_url.into();
        self
    }

    pub fn with_probe_ceiling(mut self, ceiling: u32) -> Self {
        self.config.discovery.probe_ceiling = ceiling;
        self
    }

    pub fn with_champions_url(mut self, url: impl Into<String>) -> Self {
        self.config.catalog.champions_url = url.into();
        self
    }

    pub fn with_course_url(mut self, game: impl Into<String>, url: impl Into<String>) -> Self {
        self.config.catalog.course_urls.insert(game.into(), url.into());
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

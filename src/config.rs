//! Persistent application configuration model and defaults.

/// Root configuration persisted to `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Config {
    #[serde(default)]
    /// Remote catalog endpoint and transport settings.
    pub catalog: CatalogConfig,
    #[serde(default)]
    /// Retry bounds for the sampling loop.
    pub sampler: SamplerConfig,
    #[serde(default)]
    /// Log output preferences.
    pub logging: LoggingConfig,
}

/// Remote catalog endpoint and transport settings.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CatalogConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_resource_path")]
    pub resource_path: String,
    /// Highest identifier drawn; ids are sampled from `[1, catalog_size]`.
    #[serde(default = "default_catalog_size")]
    pub catalog_size: u32,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Retry bounds applied to one `draw_next` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct SamplerConfig {
    /// Consecutive predicate rejections before reporting exhaustion.
    #[serde(default = "default_max_consecutive_rejections")]
    pub max_consecutive_rejections: u32,
    /// Consecutive fetch failures before giving up on the draw.
    #[serde(default = "default_max_consecutive_fetch_failures")]
    pub max_consecutive_fetch_failures: u32,
}

/// Log output preferences.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub level: LogLevel,
}

/// Persisted log level filter.
#[derive(Debug, Clone, Copy, serde::Deserialize, serde::Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            resource_path: default_resource_path(),
            catalog_size: default_catalog_size(),
            connect_timeout_ms: default_connect_timeout_ms(),
            read_timeout_ms: default_read_timeout_ms(),
            requests_per_second: default_requests_per_second(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            max_consecutive_rejections: default_max_consecutive_rejections(),
            max_consecutive_fetch_failures: default_max_consecutive_fetch_failures(),
        }
    }
}

fn default_base_url() -> String {
    "https://pokeapi.co/api/v2".to_string()
}

fn default_resource_path() -> String {
    "pokemon".to_string()
}

fn default_catalog_size() -> u32 {
    898
}

fn default_connect_timeout_ms() -> u64 {
    5_000
}

fn default_read_timeout_ms() -> u64 {
    15_000
}

fn default_requests_per_second() -> u32 {
    5
}

fn default_user_agent() -> String {
    format!("creature-stumbler/{}", env!("CARGO_PKG_VERSION"))
}

fn default_max_consecutive_rejections() -> u32 {
    200
}

// One failure abandons the draw.
fn default_max_consecutive_fetch_failures() -> u32 {
    1
}

/// Clamps every numeric setting into its supported range.
pub fn sanitize_config(config: Config) -> Config {
    let Config {
        catalog,
        sampler,
        logging,
    } = config;
    let base_url = if catalog.base_url.trim().is_empty() {
        default_base_url()
    } else {
        catalog.base_url
    };
    let resource_path = if catalog.resource_path.trim().is_empty() {
        default_resource_path()
    } else {
        catalog.resource_path
    };
    let user_agent = if catalog.user_agent.trim().is_empty() {
        default_user_agent()
    } else {
        catalog.user_agent
    };

    Config {
        catalog: CatalogConfig {
            base_url,
            resource_path,
            catalog_size: catalog.catalog_size.clamp(1, 100_000),
            connect_timeout_ms: catalog.connect_timeout_ms.clamp(100, 120_000),
            read_timeout_ms: catalog.read_timeout_ms.clamp(100, 120_000),
            requests_per_second: catalog.requests_per_second.clamp(1, 50),
            user_agent,
        },
        sampler: SamplerConfig {
            max_consecutive_rejections: sampler.max_consecutive_rejections.clamp(1, 100_000),
            max_consecutive_fetch_failures: sampler.max_consecutive_fetch_failures.clamp(1, 100),
        },
        logging,
    }
}

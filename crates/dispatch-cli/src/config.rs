use dispatch_core::models::SeriesConfig;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub database_path: String,
    /// Default tracing filter; `RUST_LOG` wins when set.
    pub log_level: String,
    /// Run the window extender once before every command
    pub extend_on_startup: bool,
    pub series: SeriesConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: "dispatch.db".to_string(),
            log_level: "warn".to_string(),
            extend_on_startup: true,
            series: SeriesConfig::default(),
        }
    }
}

impl Config {
    /// Defaults, overlaid by `dispatch.toml`, overlaid by `DISPATCH_*`
    /// variables (`DISPATCH_SERIES__LOOKAHEAD_DAYS` for nested keys).
    pub fn new() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("dispatch.toml"))
            .merge(Env::prefixed("DISPATCH_").split("__"))
    }
}

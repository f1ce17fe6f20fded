#[macro_use]
extern crate tracing;

mod app_config;
mod args;
mod catalog;

use app_config::AppConfig;
pub use app_config::{
    get_config_dir,
    get_data_dir,
};
pub use args::Args;
pub use catalog::{
    AppEntry,
    AppId,
    Platform,
    PlatformFilter,
    PlatformFilterIter,
};
use chrono::NaiveDate;
use eyre::{
    bail,
    Result,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    collections::HashSet,
    path::Path,
    time::Duration,
};

const DEFAULT_CONFIG: &str = include_str!("default-config.yaml");

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(flatten, skip_serializing)]
    pub app_config: AppConfig,
    pub endpoint: url::Url,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub apps: Vec<AppEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_url: Option<url::Url>,
    #[serde(default)]
    pub platform: PlatformFilter,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub debug: bool,
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Layers the built-in defaults, `<config_dir>/config.yaml` and the command line, in that order.
    pub fn new(args: Args) -> Result<Self> {
        let config_dir = get_config_dir();
        let user_config = config::File::from(config_dir.join("config.yaml"))
            .format(config::FileFormat::Yaml)
            .required(false);
        Self::from_sources(args, Some(user_config))
    }

    /// Same as [`Config::new`] without looking at the user's config directory.
    pub fn with_defaults(args: Args) -> Result<Self> {
        Self::from_sources(args, None::<config::File<config::FileSourceFile, config::FileFormat>>)
    }

    fn from_sources(args: Args, user_config: Option<impl config::Source + Send + Sync + 'static>) -> Result<Self> {
        let data_dir = get_data_dir();
        let config_dir = get_config_dir();
        let mut builder = config::Config::builder()
            .set_default("data_dir", data_dir.to_string_lossy().to_string())?
            .set_default("config_dir", config_dir.to_string_lossy().to_string())?
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Yaml));

        if let Some(source) = user_config {
            builder = builder.add_source(source);
        }

        builder = builder.add_source(args);

        let cfg: Self = builder.build()?.try_deserialize()?;
        cfg.validate()?;
        debug!(endpoint = %cfg.endpoint, apps = cfg.apps.len(), "Loaded configuration");

        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for entry in &self.apps {
            if entry.id.as_str().is_empty() {
                bail!("App catalog contains an entry with an empty id");
            }
            if !seen.insert(&entry.id) {
                bail!("App catalog lists {} more than once", entry.id);
            }
        }
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if to < from {
                bail!("Configured range ends ({to}) before it starts ({from})");
            }
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn data_dir(&self) -> &Path {
        &self.app_config.data_dir
    }
}

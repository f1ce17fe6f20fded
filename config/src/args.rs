use crate::PlatformFilter;
use chrono::NaiveDate;
use clap::Parser;

/// Lens Apps Stats TUI
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version = version(), about, long_about = None)]
pub struct Args {
    /// Optional GraphQL endpoint to override the stored configuration.
    #[clap(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// First day of the initial date range (YYYY-MM-DD).
    #[clap(long, value_name = "DATE")]
    pub from: Option<NaiveDate>,

    /// Last day of the initial date range, included (YYYY-MM-DD).
    #[clap(long, value_name = "DATE")]
    pub to: Option<NaiveDate>,

    /// Only track apps of this platform: all, web or mobile.
    #[clap(long, value_name = "PLATFORM")]
    pub platform: Option<PlatformFilter>,

    /// Per-request timeout in seconds.
    #[clap(long = "request-timeout", value_name = "SECONDS")]
    pub request_timeout_secs: Option<u64>,

    /// Enables debug mode.
    ///  - lowers the log level to debug
    #[clap(long = "debug", action)]
    pub debug: bool,
}

mod config_ext {
    use super::*;
    use config::{
        Map,
        Source,
        Value,
    };
    use std::collections::HashMap;

    impl Source for Args {
        fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
            Box::new((*self).clone())
        }

        fn collect(&self) -> Result<Map<String, Value>, config::ConfigError> {
            let mut cache = HashMap::<String, Value>::new();
            if let Some(endpoint) = &self.endpoint {
                cache.insert("endpoint".to_string(), endpoint.clone().into());
            }
            if let Some(from) = &self.from {
                cache.insert("from".to_string(), from.to_string().into());
            }
            if let Some(to) = &self.to {
                cache.insert("to".to_string(), to.to_string().into());
            }
            if let Some(platform) = &self.platform {
                cache.insert("platform".to_string(), platform.to_string().into());
            }
            if let Some(timeout) = self.request_timeout_secs {
                cache.insert("request_timeout_secs".to_string(), timeout.into());
            }
            if self.debug {
                cache.insert("debug".to_string(), true.into());
            }
            Ok(cache)
        }
    }
}

pub fn version() -> String {
    let author = clap::crate_authors!();
    let config_dir_path = crate::get_config_dir().display().to_string();
    let data_dir_path = crate::get_data_dir().display().to_string();

    format!(
        "\
{version}

Authors: {author}

Config directory: {config_dir_path}
Data directory: {data_dir_path}",
        version = env!("CARGO_PKG_VERSION"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::Source as _;
    use pretty_assertions::assert_eq;

    #[test]
    fn only_given_flags_become_config_values() {
        let args = Args::parse_from(["lens-apps-stats", "--from", "2023-01-01", "--platform", "mobile"]);
        let collected = args.collect().unwrap();

        let mut keys = collected.keys().cloned().collect::<Vec<_>>();
        keys.sort();
        assert_eq!(keys, vec!["from".to_string(), "platform".to_string()]);
        assert_eq!(collected["from"].clone().into_string().unwrap(), "2023-01-01");
        assert_eq!(collected["platform"].clone().into_string().unwrap(), "mobile");
    }

    #[test]
    fn rejects_malformed_dates() {
        assert!(Args::try_parse_from(["lens-apps-stats", "--to", "05/01/2023"]).is_err());
    }
}

//! # Lens Apps Stats Report - Main Entry Point
//!
//! Collects the stats of every tracked app once and prints them as terminal tables, optionally
//! exporting the same data as JSON.

use clap::Parser;
use color_eyre::Result;
use lens_apps_stats_config::{
    Args,
    Config,
    PlatformFilter,
};
use lens_apps_stats_core::{
    Column,
    TableOrdering,
};
use lens_apps_stats_report::{
    Collector,
    StatsCollector,
};
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(name = "lens-apps-stats-report")]
#[command(about = "Ranks Lens Protocol apps by posts, mirrors and comments")]
#[command(version)]
struct Cli {
    /// GraphQL endpoint (overrides the configuration file)
    #[arg(long, env = "LENS_API_URL")]
    endpoint: Option<String>,

    /// First day of the range (YYYY-MM-DD)
    #[arg(long)]
    from: Option<chrono::NaiveDate>,

    /// Last day of the range, included (YYYY-MM-DD)
    #[arg(long)]
    to: Option<chrono::NaiveDate>,

    /// Only report apps of this platform: all, web or mobile
    #[arg(long)]
    platform: Option<PlatformFilter>,

    /// Column to rank by: posts, mirrors or comments
    #[arg(long, default_value = "posts")]
    sort: Column,

    /// Rank in ascending order instead of descending
    #[arg(long)]
    ascending: bool,

    /// How long to wait for all apps to answer (e.g., "30s", "2m")
    #[arg(long, default_value = "60s")]
    timeout: String,

    /// Output file path (optional, if provided the summary is also exported as JSON)
    #[arg(long)]
    output_file: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "lens_apps_stats_report={log_level},lens_apps_stats_core={log_level},lens_apps_stats_config={log_level},reqwest=warn"
        ))
        .init();

    color_eyre::install()?;

    info!("Starting Lens apps stats report");

    let deadline = parse_duration(&cli.timeout)?;
    let ordering = ordering(cli.sort, cli.ascending)?;

    let config = Config::new(Args {
        endpoint: cli.endpoint,
        from: cli.from,
        to: cli.to,
        platform: cli.platform,
        request_timeout_secs: None,
        debug: cli.verbose,
    })?;

    let mut collector = StatsCollector::from_config(&config, ordering, deadline)?;
    collector.collect().await?;

    println!("{}", collector.format());

    if let Some(output_file) = &cli.output_file {
        let json_string = serde_json::to_string_pretty(&collector.summary())?;
        tokio::fs::write(output_file, json_string).await?;
        info!("Data exported successfully to {}", output_file);
    }

    let failures = collector.failures();
    if !failures.is_empty() {
        let names = failures
            .iter()
            .map(|(id, _)| id.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        eyre::bail!("Stats could not be collected for: {names}");
    }

    info!("{} collection completed successfully", collector.name());
    Ok(())
}

fn ordering(column: Column, ascending: bool) -> Result<TableOrdering> {
    if !column.is_sortable() {
        eyre::bail!("Cannot rank by {column}, pick posts, mirrors or comments");
    }
    Ok(TableOrdering { column, ascending })
}

fn parse_duration(duration_str: &str) -> Result<Duration> {
    humantime::parse_duration(duration_str).map_err(|e| eyre::eyre!("Invalid duration '{}': {}", duration_str, e))
}

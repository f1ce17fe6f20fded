use clap::Parser;
use color_eyre::Result;
use lens_apps_stats_config::Args;
use lens_apps_stats_tui::{
    init_errors,
    start_tui,
};

#[tokio::main]
async fn main() -> Result<()> {
    init_errors()?;
    start_tui(Args::parse()).await
}

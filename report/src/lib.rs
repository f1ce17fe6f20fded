//! # Lens Apps Stats Report
//!
//! Headless counterpart of the dashboard: fetches the stats of every tracked app once, waits
//! until all of them have answered (or failed) and prints the ranking.
//!
//! ## Output
//!
//! - **Terminal**: ranking table plus one chart table per metric
//! - **JSON**: the same data for programmatic use, written with `--output-file`
//!
//! ## Usage
//!
//! ```bash
//! lens-apps-stats-report --from 2023-01-01 --to 2023-02-01 --sort mirrors
//! lens-apps-stats-report --platform mobile --output-file stats.json
//! ```

pub mod collector;

pub use collector::{
    Collector,
    StatsCollector,
};

use chrono::{
    DateTime,
    Utc,
};
use color_eyre::Result;
use comfy_table::{
    presets,
    Attribute,
    Cell,
    CellAlignment,
    Color,
    ContentArrangement,
    Table,
};
use eyre::WrapErr as _;
use lens_apps_stats_config::{
    AppId,
    Config,
    PlatformFilter,
};
use lens_apps_stats_core::{
    format_count,
    ordered_rows,
    platform_label,
    project_all,
    Catalog,
    CollectionStatus,
    Column,
    Dashboard,
    DashboardView,
    DateRange,
    LensClient,
    StatsEvent,
    StatsSource,
    TableOrdering,
    TableRow,
};
use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    time::Duration,
};
use strum::IntoEnumIterator as _;
use tokio::sync::mpsc::{
    self,
    UnboundedReceiver,
};
use tracing::{
    info,
    warn,
};

/// Trait for collecting and formatting data
pub trait Collector {
    /// Collect data until there is nothing left to wait for
    fn collect(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Format data for display
    fn format(&self) -> String;

    /// Get data summary as JSON
    fn summary(&self) -> serde_json::Value;

    /// Get the name of this collector
    fn name(&self) -> &'static str;
}

/// Runs one collection cycle of the dashboard and keeps its outcome.
pub struct StatsCollector {
    dashboard: Dashboard,
    events: UnboundedReceiver<StatsEvent>,
    ordering: TableOrdering,
    deadline: Duration,
    view: Option<DashboardView>,
    collected_at: Option<DateTime<Utc>>,
}

impl StatsCollector {
    pub fn new(
        catalog: Catalog,
        platform: PlatformFilter,
        range: DateRange,
        source: Arc<dyn StatsSource>,
        ordering: TableOrdering,
        deadline: Duration,
    ) -> Self {
        let (tx, events) = mpsc::unbounded_channel();
        Self {
            dashboard: Dashboard::new(catalog, platform, range, source, tx),
            events,
            ordering,
            deadline,
            view: None,
            collected_at: None,
        }
    }

    pub fn from_config(config: &Config, ordering: TableOrdering, deadline: Duration) -> Result<Self> {
        let source = Arc::new(LensClient::from_config(config)?);
        info!("Lens API: {}", source.endpoint());
        Ok(Self::new(
            Catalog::from_config(config),
            config.platform,
            DateRange::from_config(config),
            source,
            ordering,
            deadline,
        ))
    }

    pub fn view(&self) -> Option<&DashboardView> {
        self.view.as_ref()
    }

    /// Ranked rows, or `None` unless every tracked app reported.
    pub fn rows(&self) -> Option<Vec<TableRow>> {
        let view = self.view.as_ref()?;
        ordered_rows(view.snapshot.as_ref(), self.dashboard.catalog(), &self.ordering)
    }

    /// Apps whose fetch failed, with the reason.
    pub fn failures(&self) -> Vec<(AppId, String)> {
        let aggregator = self.dashboard.aggregator();
        aggregator
            .failed()
            .into_iter()
            .map(|id| {
                let reason = aggregator.failure_reason(&id).unwrap_or_default().to_string();
                (id, reason)
            })
            .collect()
    }

    fn header_title(&self, column: Column) -> String {
        match self.ordering.indicator(column) {
            Some(true) => format!("{} ▲", column.title()),
            Some(false) => format!("{} ▼", column.title()),
            None => column.title().to_string(),
        }
    }

    fn format_rankings(&self, rows: &[TableRow]) -> String {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(
                std::iter::once(Cell::new("#").add_attribute(Attribute::Bold)).chain(
                    Column::iter().map(|column| Cell::new(self.header_title(column)).add_attribute(Attribute::Bold)),
                ),
            );

        for (rank, row) in rows.iter().enumerate() {
            table.add_row(vec![
                Cell::new(rank + 1),
                Cell::new(&row.name).fg(Color::Cyan),
                Cell::new(platform_label(row.platform)),
                Cell::new(format_count(row.stats.total_posts)).set_alignment(CellAlignment::Right),
                Cell::new(format_count(row.stats.total_mirrors)).set_alignment(CellAlignment::Right),
                Cell::new(format_count(row.stats.total_comments)).set_alignment(CellAlignment::Right),
            ]);
        }
        format!("{table}\n")
    }

    fn format_charts(&self) -> String {
        let Some(snapshot) = self.view.as_ref().and_then(|view| view.snapshot.as_ref()) else {
            return String::new();
        };

        let mut output = String::new();
        for series in project_all(snapshot, self.dashboard.catalog()) {
            output.push_str(&format!("\n{} (total {})\n", series.title(), format_count(series.total())));
            let max = series.series.iter().copied().max().unwrap_or_default();

            let mut table = Table::new();
            table
                .load_preset(presets::UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec![
                    Cell::new("App").add_attribute(Attribute::Bold),
                    Cell::new("Bar").add_attribute(Attribute::Bold),
                    Cell::new("Value").add_attribute(Attribute::Bold),
                    Cell::new("Share").add_attribute(Attribute::Bold),
                ]);
            for ((label, value), share) in series.labels.iter().zip(&series.series).zip(series.shares()) {
                table.add_row(vec![
                    Cell::new(label),
                    Cell::new(bar(*value, max, 30)).fg(Color::Green),
                    Cell::new(format_count(*value)).set_alignment(CellAlignment::Right),
                    Cell::new(format!("{share:.1}%")).set_alignment(CellAlignment::Right),
                ]);
            }
            output.push_str(&format!("{table}\n"));
        }
        output
    }

    fn format_failures(&self, failures: &[(AppId, String)]) -> String {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("App").add_attribute(Attribute::Bold).fg(Color::Red),
                Cell::new("Error").add_attribute(Attribute::Bold).fg(Color::Red),
            ]);
        for (id, reason) in failures {
            table.add_row(vec![Cell::new(self.dashboard.catalog().display_name(id)), Cell::new(reason)]);
        }
        format!("{table}\n")
    }
}

impl Collector for StatsCollector {
    fn collect(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            let generation = self.dashboard.start();
            info!(
                "Collecting {} apps, generation {generation}",
                self.dashboard.aggregator().tracked().len()
            );

            let view = tokio::time::timeout(self.deadline, self.dashboard.settle(&mut self.events))
                .await
                .wrap_err_with(|| {
                    format!(
                        "Timed out after {} waiting for stats",
                        humantime::format_duration(self.deadline)
                    )
                })??;

            if let CollectionStatus::Failed { failed, .. } = &view.status {
                warn!("{} apps failed to report", failed.len());
            }
            self.view = Some(view);
            self.collected_at = Some(Utc::now());
            Ok(())
        })
    }

    fn format(&self) -> String {
        let Some(view) = &self.view else {
            return "No stats collected yet. Call collect() first.".to_string();
        };

        let mut output = String::new();
        let range = if view.range.is_empty() {
            "all time".to_string()
        } else {
            view.range.to_string()
        };
        output.push_str(&format!(
            "\nLens apps by {}\n• Range: {range}\n• Platform: {}\n\n",
            self.ordering.column, view.platform
        ));

        match self.rows() {
            Some(rows) if rows.is_empty() => output.push_str("No apps match the current filters.\n"),
            Some(rows) => {
                output.push_str(&self.format_rankings(&rows));
                output.push_str(&self.format_charts());
            }
            None => output.push_str("Rankings are incomplete, not every app reported.\n"),
        }

        let failures = self.failures();
        if !failures.is_empty() {
            output.push_str("\nFailed apps\n");
            output.push_str(&self.format_failures(&failures));
        }
        output
    }

    fn summary(&self) -> serde_json::Value {
        let Some(view) = &self.view else {
            return serde_json::json!({"error": "No stats collected yet"});
        };

        let apps = self
            .rows()
            .unwrap_or_default()
            .into_iter()
            .map(|row| {
                serde_json::json!({
                    "id": row.id,
                    "name": row.name,
                    "platform": row.platform,
                    "posts": row.stats.total_posts,
                    "mirrors": row.stats.total_mirrors,
                    "comments": row.stats.total_comments,
                })
            })
            .collect::<Vec<_>>();
        let failed = self
            .failures()
            .into_iter()
            .map(|(id, error)| serde_json::json!({ "id": id, "error": error }))
            .collect::<Vec<_>>();

        serde_json::json!({
            "collection_info": {
                "collected_at": self.collected_at,
                "generation": view.generation,
                "from": view.range.start,
                "to": view.range.end,
                "platform": view.platform,
                "sort": self.ordering.column,
                "ascending": self.ordering.ascending,
            },
            "complete": view.snapshot.is_some(),
            "apps": apps,
            "failed": failed,
        })
    }

    fn name(&self) -> &'static str {
        "Lens apps"
    }
}

fn bar(value: u64, max: u64, width: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let filled = ((value as f64 / max as f64) * width as f64).round() as usize;
    "█".repeat(filled)
}

use crate::{
    aggregator::Snapshot,
    catalog::Catalog,
    stats::Metric,
};
use serde::{
    Deserialize,
    Serialize,
};
use strum::IntoEnumIterator as _;

/// Labels and values of one metric, both in tracked order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub metric: Metric,
    pub labels: Vec<String>,
    pub series: Vec<u64>,
}

impl ChartSeries {
    pub fn project(snapshot: &Snapshot, catalog: &Catalog, metric: Metric) -> Self {
        let (labels, series) = snapshot
            .entries()
            .iter()
            .map(|(id, record)| (catalog.display_name(id), record.get(metric)))
            .unzip();
        Self { metric, labels, series }
    }

    pub fn title(&self) -> String {
        format!("Apps by {}", self.metric)
    }

    pub fn total(&self) -> u64 {
        self.series.iter().sum()
    }

    /// Percentage of the total per entry. All zero when the total is zero.
    pub fn shares(&self) -> Vec<f64> {
        let total = self.total();
        self.series
            .iter()
            .map(|value| {
                if total == 0 {
                    0.0
                } else {
                    *value as f64 * 100.0 / total as f64
                }
            })
            .collect()
    }
}

/// One series per metric: posts, mirrors, comments.
pub fn project_all(snapshot: &Snapshot, catalog: &Catalog) -> Vec<ChartSeries> {
    Metric::iter()
        .map(|metric| ChartSeries::project(snapshot, catalog, metric))
        .collect()
}

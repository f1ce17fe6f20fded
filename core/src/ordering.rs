use crate::{
    aggregator::Snapshot,
    catalog::Catalog,
    stats::{
        Metric,
        StatRecord,
    },
};
use lens_apps_stats_config::{
    AppId,
    Platform,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::cmp;
use strum::{
    Display,
    EnumIter,
    EnumString,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Column {
    Name,
    Platform,
    Posts,
    Mirrors,
    Comments,
}

impl Column {
    pub fn title(&self) -> &'static str {
        match self {
            Column::Name => "Name",
            Column::Platform => "Platform",
            Column::Posts => "Posts",
            Column::Mirrors => "Mirrors",
            Column::Comments => "Comments",
        }
    }

    /// Direction a column starts with when it becomes active. `None` means it cannot be sorted.
    pub fn default_ascending(&self) -> Option<bool> {
        match self {
            Column::Name | Column::Platform => None,
            Column::Posts | Column::Mirrors | Column::Comments => Some(false),
        }
    }

    pub fn is_sortable(&self) -> bool {
        self.default_ascending().is_some()
    }

    pub fn metric(&self) -> Option<Metric> {
        match self {
            Column::Posts => Some(Metric::Posts),
            Column::Mirrors => Some(Metric::Mirrors),
            Column::Comments => Some(Metric::Comments),
            Column::Name | Column::Platform => None,
        }
    }
}

/// Active sort column and direction of the rankings table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableOrdering {
    pub column: Column,
    pub ascending: bool,
}

impl Default for TableOrdering {
    fn default() -> Self {
        Self {
            column: Column::Posts,
            ascending: false,
        }
    }
}

impl TableOrdering {
    /// Header activation. Returns whether the ordering changed.
    pub fn activate(&mut self, column: Column) -> bool {
        let Some(default_ascending) = column.default_ascending() else {
            return false;
        };
        if self.column == column {
            self.ascending = !self.ascending;
        } else {
            self.column = column;
            self.ascending = default_ascending;
        }
        true
    }

    /// Direction marker for a header: `Some(ascending)` on the active column, `None` elsewhere.
    pub fn indicator(&self, column: Column) -> Option<bool> {
        (self.column == column).then_some(self.ascending)
    }

    /// Sorts by the active column. Equal keys keep their input order.
    pub fn apply(&self, rows: &[TableRow]) -> Vec<TableRow> {
        let mut sorted = rows.to_vec();
        sorted.sort_by(|a, b| {
            let order = a.compare(b, self.column);
            if self.ascending {
                order
            } else {
                order.reverse()
            }
        });
        sorted
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    pub id: AppId,
    pub name: String,
    pub platform: Option<Platform>,
    pub stats: StatRecord,
}

impl TableRow {
    /// One row per snapshot entry, in snapshot (tracked) order.
    pub fn from_snapshot(snapshot: &Snapshot, catalog: &Catalog) -> Vec<TableRow> {
        snapshot
            .entries()
            .iter()
            .map(|(id, stats)| TableRow {
                id: id.clone(),
                name: catalog.display_name(id),
                platform: catalog.platform(id),
                stats: *stats,
            })
            .collect()
    }

    fn compare(&self, other: &TableRow, column: Column) -> cmp::Ordering {
        match column.metric() {
            Some(metric) => self.stats.get(metric).cmp(&other.stats.get(metric)),
            None if column == Column::Name => self.name.cmp(&other.name),
            None => platform_label(self.platform).cmp(platform_label(other.platform)),
        }
    }
}

pub fn platform_label(platform: Option<Platform>) -> &'static str {
    match platform {
        Some(Platform::Web) => "Web",
        Some(Platform::Mobile) => "Mobile",
        None => "",
    }
}

/// Rows to display, or `None` while the snapshot is not ready.
pub fn ordered_rows(snapshot: Option<&Snapshot>, catalog: &Catalog, ordering: &TableOrdering) -> Option<Vec<TableRow>> {
    snapshot.map(|snapshot| ordering.apply(&TableRow::from_snapshot(snapshot, catalog)))
}

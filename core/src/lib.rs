#[macro_use]
extern crate tracing;

pub mod aggregator;
pub mod catalog;
pub mod chart;
pub mod dashboard;
pub mod dispatcher;
pub mod navigation;
pub mod ordering;
pub mod range;
pub mod source;
pub mod stats;

pub use aggregator::{
    Aggregator,
    CollectionStatus,
    Generation,
    ReportOutcome,
    Snapshot,
};
pub use catalog::Catalog;
pub use chart::{
    project_all,
    ChartSeries,
};
pub use dashboard::{
    Dashboard,
    DashboardView,
};
pub use dispatcher::StatsEvent;
pub use navigation::{
    open_app,
    Navigator,
    SystemNavigator,
};
pub use ordering::{
    ordered_rows,
    platform_label,
    Column,
    TableOrdering,
    TableRow,
};
pub use range::{
    DateRange,
    RangeFilter,
    StatsWindow,
};
pub use source::{
    LensClient,
    StatsSource,
};
pub use stats::{
    format_count,
    Metric,
    StatRecord,
};

use crate::{
    aggregator::{
        Aggregator,
        CollectionStatus,
        Generation,
        ReportOutcome,
        Snapshot,
    },
    catalog::Catalog,
    dispatcher::{
        dispatch,
        StatsEvent,
    },
    range::DateRange,
    source::StatsSource,
};
use eyre::{
    OptionExt as _,
    Result,
};
use lens_apps_stats_config::{
    AppId,
    PlatformFilter,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::sync::Arc;
use tokio::sync::mpsc::{
    UnboundedReceiver,
    UnboundedSender,
};

/// What a renderer needs to draw the current state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardView {
    pub generation: Generation,
    pub range: DateRange,
    pub platform: PlatformFilter,
    pub status: CollectionStatus,
    pub snapshot: Option<Snapshot>,
}

/// Drives the aggregator: every input change starts a generation and fans out one fetch per
/// tracked app. Completions come back through the channel given to [`Dashboard::new`] and must be
/// fed to [`Dashboard::handle_event`].
pub struct Dashboard {
    catalog: Catalog,
    aggregator: Aggregator,
    platform: PlatformFilter,
    source: Arc<dyn StatsSource>,
    events: UnboundedSender<StatsEvent>,
}

impl Dashboard {
    pub fn new(
        catalog: Catalog,
        platform: PlatformFilter,
        range: DateRange,
        source: Arc<dyn StatsSource>,
        events: UnboundedSender<StatsEvent>,
    ) -> Self {
        let aggregator = Aggregator::new(catalog.tracked(platform), range);
        Self {
            catalog,
            aggregator,
            platform,
            source,
            events,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    pub fn platform(&self) -> PlatformFilter {
        self.platform
    }

    pub fn range(&self) -> DateRange {
        self.aggregator.range()
    }

    /// Issues the fetches of the current generation that have not been answered yet.
    pub fn start(&mut self) -> Generation {
        self.fetch(self.aggregator.missing());
        self.aggregator.generation()
    }

    pub fn set_range(&mut self, range: DateRange) -> Generation {
        info!(%range, "Date range changed");
        self.aggregator.set_range_filter(range);
        self.start()
    }

    pub fn set_platform_filter(&mut self, platform: PlatformFilter) -> Generation {
        info!(%platform, "Platform filter changed");
        self.platform = platform;
        self.aggregator.set_tracked_applications(self.catalog.tracked(platform));
        self.start()
    }

    /// Refetches everything under the current inputs.
    pub fn refresh(&mut self) -> Generation {
        self.set_range(self.aggregator.range())
    }

    /// Refetches the apps that failed in the current generation. Returns how many were retried.
    pub fn retry_failed(&mut self) -> usize {
        let failed = self.aggregator.failed();
        for id in &failed {
            self.aggregator.clear_failure(id);
        }
        let retry = failed
            .into_iter()
            .filter(|id| self.aggregator.needs_fetch(id))
            .collect::<Vec<_>>();
        let count = retry.len();
        if count > 0 {
            info!(count, generation = %self.aggregator.generation(), "Retrying failed fetches");
            self.fetch(retry);
        }
        count
    }

    pub fn handle_event(&mut self, event: StatsEvent) -> ReportOutcome {
        let outcome = match event {
            StatsEvent::Received {
                app,
                generation,
                record,
            } => self.aggregator.report_result(app, record, generation),
            StatsEvent::Failed {
                app,
                generation,
                error,
            } => self.aggregator.report_failure(app, error, generation),
        };
        if outcome.changed_state() && matches!(self.aggregator.status(), CollectionStatus::Ready) {
            info!(generation = %self.aggregator.generation(), "All stats received");
        }
        outcome
    }

    /// Consumes events until every tracked app has either answered or failed.
    pub async fn settle(&mut self, events: &mut UnboundedReceiver<StatsEvent>) -> Result<DashboardView> {
        while !self.aggregator.is_settled() {
            let event = events.recv().await.ok_or_eyre("Stats channel closed before collection settled")?;
            self.handle_event(event);
        }
        Ok(self.view())
    }

    pub fn view(&self) -> DashboardView {
        DashboardView {
            generation: self.aggregator.generation(),
            range: self.aggregator.range(),
            platform: self.platform,
            status: self.aggregator.status(),
            snapshot: self.aggregator.snapshot(),
        }
    }

    fn fetch(&self, apps: Vec<AppId>) {
        if apps.is_empty() {
            return;
        }
        dispatch(
            self.source.clone(),
            apps,
            self.aggregator.window(),
            self.aggregator.generation(),
            self.events.clone(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dispatcher::tests::FakeSource,
        range::start_of_day,
        stats::StatRecord,
    };
    use chrono::NaiveDate;
    use lens_apps_stats_config::{
        AppEntry,
        Platform,
    };
    use pretty_assertions::assert_eq;
    use tokio::sync::mpsc::unbounded_channel;

    fn catalog() -> Catalog {
        Catalog::new([
            AppEntry::new("lenster").with_platform(Platform::Web),
            AppEntry::new("orb").with_platform(Platform::Mobile),
        ])
    }

    fn source() -> Arc<FakeSource> {
        Arc::new(FakeSource::new([
            ("lenster", StatRecord::new(10, 2, 1)),
            ("orb", StatRecord::new(5, 7, 3)),
        ]))
    }

    fn january() -> DateRange {
        DateRange::new(
            Some(start_of_day(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap())),
            Some(start_of_day(NaiveDate::from_ymd_opt(2023, 2, 1).unwrap())),
        )
    }

    #[tokio::test]
    async fn becomes_ready_once_every_app_answered() {
        let (tx, mut rx) = unbounded_channel();
        let source = source();
        let mut dashboard = Dashboard::new(catalog(), PlatformFilter::All, DateRange::default(), source.clone(), tx);

        assert_eq!(dashboard.view().snapshot, None);
        dashboard.start();
        let view = dashboard.settle(&mut rx).await.unwrap();

        assert_eq!(view.status, CollectionStatus::Ready);
        let snapshot = view.snapshot.unwrap();
        assert_eq!(
            snapshot.entries(),
            &[
                (AppId::from("lenster"), StatRecord::new(10, 2, 1)),
                (AppId::from("orb"), StatRecord::new(5, 7, 3)),
            ]
        );
        assert_eq!(source.calls().len(), 2);
    }

    #[tokio::test]
    async fn range_change_discards_in_flight_results() {
        let (tx, mut rx) = unbounded_channel();
        let mut dashboard = Dashboard::new(catalog(), PlatformFilter::All, DateRange::default(), source(), tx);
        let first = dashboard.start();

        let second = dashboard.set_range(january());
        assert!(second > first);

        // Both generations answer; only the second one may land.
        let mut stale = 0;
        while !dashboard.aggregator().is_settled() {
            let event = rx.recv().await.unwrap();
            if dashboard.handle_event(event) == ReportOutcome::Stale {
                stale += 1;
            }
        }
        assert!(stale <= 2);

        let view = dashboard.view();
        assert_eq!(view.generation, second);
        assert_eq!(view.range, january());
        assert_eq!(view.snapshot.unwrap().generation(), second);
    }

    #[tokio::test]
    async fn reset_while_loading_ignores_late_answers() {
        let (tx, _rx) = unbounded_channel();
        let mut dashboard = Dashboard::new(catalog(), PlatformFilter::All, january(), source(), tx);
        let loading = dashboard.start();
        dashboard.set_range(DateRange::default());

        let late = StatsEvent::Received {
            app: "lenster".into(),
            generation: loading,
            record: StatRecord::new(1, 1, 1),
        };
        assert_eq!(dashboard.handle_event(late), ReportOutcome::Stale);
        assert_eq!(dashboard.aggregator().received(), 0);
        assert_eq!(dashboard.view().range, DateRange::default());
    }

    #[tokio::test]
    async fn platform_filter_narrows_the_tracked_set() {
        let (tx, mut rx) = unbounded_channel();
        let mut dashboard = Dashboard::new(catalog(), PlatformFilter::All, DateRange::default(), source(), tx);
        dashboard.start();
        dashboard.set_platform_filter(PlatformFilter::Mobile);

        assert_eq!(dashboard.aggregator().tracked(), &[AppId::from("orb")]);
        let view = dashboard.settle(&mut rx).await.unwrap();
        assert_eq!(view.platform, PlatformFilter::Mobile);
        assert_eq!(view.snapshot.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failures_are_visible_and_retried() {
        let (tx, mut rx) = unbounded_channel();
        let catalog = Catalog::new([AppEntry::new("lenster"), AppEntry::new("ghost")]);
        let source = source();
        let mut dashboard = Dashboard::new(catalog, PlatformFilter::All, DateRange::default(), source.clone(), tx);
        let generation = dashboard.start();

        let view = dashboard.settle(&mut rx).await.unwrap();
        assert_eq!(view.snapshot, None);
        assert_eq!(
            view.status,
            CollectionStatus::Failed {
                failed: vec!["ghost".into()],
                received: 1,
                total: 2,
            }
        );

        assert_eq!(dashboard.retry_failed(), 1);
        assert_eq!(dashboard.aggregator().generation(), generation);
        assert!(matches!(dashboard.view().status, CollectionStatus::Loading { received: 1, total: 2 }));

        dashboard.settle(&mut rx).await.unwrap();
        let ghost_calls = source
            .calls()
            .into_iter()
            .filter(|(app, _)| app.as_str() == "ghost")
            .count();
        assert_eq!(ghost_calls, 2);
        assert_eq!(dashboard.retry_failed(), 1);
    }

    #[tokio::test]
    async fn refresh_starts_a_new_generation() {
        let (tx, mut rx) = unbounded_channel();
        let source = source();
        let mut dashboard = Dashboard::new(catalog(), PlatformFilter::All, january(), source.clone(), tx);
        let first = dashboard.start();
        dashboard.settle(&mut rx).await.unwrap();

        let second = dashboard.refresh();
        assert!(second > first);
        assert_eq!(dashboard.view().snapshot, None);
        assert_eq!(dashboard.range(), january());
        dashboard.settle(&mut rx).await.unwrap();
        assert_eq!(source.calls().len(), 4);
    }
}

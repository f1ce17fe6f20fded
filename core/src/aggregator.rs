//! Collects one [`StatRecord`] per tracked app and publishes a [`Snapshot`] once all of them
//! have reported for the current [`Generation`].
//!
//! Every change of the tracked set or of the date range starts a new generation. Fetches are
//! tagged with the generation they were issued for, and reports carrying any other generation
//! are dropped. In-flight requests are never cancelled; they are simply ignored when they land.

use crate::{
    range::{
        DateRange,
        StatsWindow,
    },
    stats::StatRecord,
};
use lens_apps_stats_config::AppId;
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    collections::{
        HashMap,
        HashSet,
    },
    fmt,
};

/// Version of one collection cycle. Only ever increases.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Generation(u64);

impl Generation {
    fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Complete per-app statistics for one generation, in tracked order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    generation: Generation,
    entries: Vec<(AppId, StatRecord)>,
}

impl Snapshot {
    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn entries(&self) -> &[(AppId, StatRecord)] {
        &self.entries
    }

    pub fn get(&self, id: &AppId) -> Option<&StatRecord> {
        self.entries
            .iter()
            .find_map(|(entry_id, record)| (entry_id == id).then_some(record))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// What happened to a reported result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutcome {
    Accepted,
    /// Same app reported twice in one generation; the later value wins.
    Replaced,
    /// Failure reported for an app that already has a value in this generation.
    Ignored,
    Stale,
    Untracked,
}

impl ReportOutcome {
    pub fn changed_state(&self) -> bool {
        matches!(self, ReportOutcome::Accepted | ReportOutcome::Replaced)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectionStatus {
    Loading {
        received: usize,
        total: usize,
    },
    /// At least one app failed in this generation, so no snapshot will appear without a retry.
    Failed {
        failed: Vec<AppId>,
        received: usize,
        total: usize,
    },
    Ready,
}

#[derive(Debug, Default, Clone)]
pub struct Aggregator {
    tracked: Vec<AppId>,
    range: DateRange,
    generation: Generation,
    records: HashMap<AppId, StatRecord>,
    failures: HashMap<AppId, String>,
}

impl Aggregator {
    pub fn new(tracked: impl IntoIterator<Item = AppId>, range: DateRange) -> Self {
        let mut aggregator = Self {
            range,
            ..Default::default()
        };
        aggregator.set_tracked_applications(tracked);
        aggregator
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn tracked(&self) -> &[AppId] {
        &self.tracked
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    pub fn window(&self) -> StatsWindow {
        self.range.window()
    }

    /// Replaces the tracked set. Duplicate ids are collapsed, keeping the first position.
    pub fn set_tracked_applications(&mut self, ids: impl IntoIterator<Item = AppId>) -> Generation {
        let mut seen = HashSet::new();
        self.tracked = ids.into_iter().filter(|id| seen.insert(id.clone())).collect();
        self.start_generation()
    }

    /// Always starts a new generation, even when `range` equals the current one.
    pub fn set_range_filter(&mut self, range: DateRange) -> Generation {
        self.range = range;
        self.start_generation()
    }

    fn start_generation(&mut self) -> Generation {
        self.generation = self.generation.next();
        self.records.clear();
        self.failures.clear();
        debug!(generation = %self.generation, tracked = self.tracked.len(), range = %self.range, "Started generation");
        self.generation
    }

    fn check_report(&self, id: &AppId, generation: Generation) -> Option<ReportOutcome> {
        if generation != self.generation {
            debug!(app = %id, %generation, current = %self.generation, "Dropping stale report");
            return Some(ReportOutcome::Stale);
        }
        if !self.tracked.contains(id) {
            warn!(app = %id, "Dropping report for untracked app");
            return Some(ReportOutcome::Untracked);
        }
        None
    }

    pub fn report_result(&mut self, id: AppId, record: StatRecord, generation: Generation) -> ReportOutcome {
        if let Some(outcome) = self.check_report(&id, generation) {
            return outcome;
        }
        self.failures.remove(&id);
        match self.records.insert(id, record) {
            Some(_) => ReportOutcome::Replaced,
            None => ReportOutcome::Accepted,
        }
    }

    pub fn report_failure(&mut self, id: AppId, reason: impl Into<String>, generation: Generation) -> ReportOutcome {
        if let Some(outcome) = self.check_report(&id, generation) {
            return outcome;
        }
        if self.records.contains_key(&id) {
            return ReportOutcome::Ignored;
        }
        self.failures.insert(id, reason.into());
        ReportOutcome::Accepted
    }

    /// Forgets the failure of `id` so it counts as loading again while it is refetched.
    pub fn clear_failure(&mut self, id: &AppId) -> bool {
        self.failures.remove(id).is_some()
    }

    /// Whether `id` still lacks a value in the current generation.
    pub fn needs_fetch(&self, id: &AppId) -> bool {
        self.tracked.contains(id) && !self.records.contains_key(id)
    }

    /// Tracked ids without a value, in tracked order.
    pub fn missing(&self) -> Vec<AppId> {
        self.tracked.iter().filter(|id| self.needs_fetch(id)).cloned().collect()
    }

    /// Tracked ids whose fetch failed in this generation, in tracked order.
    pub fn failed(&self) -> Vec<AppId> {
        self.tracked
            .iter()
            .filter(|id| self.failures.contains_key(*id))
            .cloned()
            .collect()
    }

    pub fn failure_reason(&self, id: &AppId) -> Option<&str> {
        self.failures.get(id).map(String::as_str)
    }

    pub fn received(&self) -> usize {
        self.records.len()
    }

    /// True once every tracked app either has a value or has failed.
    pub fn is_settled(&self) -> bool {
        self.tracked
            .iter()
            .all(|id| self.records.contains_key(id) || self.failures.contains_key(id))
    }

    fn is_complete(&self) -> bool {
        let reported = self.records.keys().collect::<HashSet<_>>();
        let tracked = self.tracked.iter().collect::<HashSet<_>>();
        reported == tracked
    }

    pub fn snapshot(&self) -> Option<Snapshot> {
        if !self.is_complete() {
            return None;
        }
        let entries = self
            .tracked
            .iter()
            .filter_map(|id| self.records.get(id).map(|record| (id.clone(), *record)))
            .collect();
        Some(Snapshot {
            generation: self.generation,
            entries,
        })
    }

    pub fn status(&self) -> CollectionStatus {
        if self.is_complete() {
            return CollectionStatus::Ready;
        }
        let failed = self.failed();
        let received = self.received();
        let total = self.tracked.len();
        if failed.is_empty() {
            CollectionStatus::Loading { received, total }
        } else {
            CollectionStatus::Failed {
                failed,
                received,
                total,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::start_of_day;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn ids(values: &[&str]) -> Vec<AppId> {
        values.iter().map(|value| AppId::from(*value)).collect()
    }

    fn permutations<T: Clone>(items: &[T]) -> Vec<Vec<T>> {
        if items.len() <= 1 {
            return vec![items.to_vec()];
        }
        let mut result = Vec::new();
        for index in 0..items.len() {
            let mut rest = items.to_vec();
            let head = rest.remove(index);
            for mut tail in permutations(&rest) {
                tail.insert(0, head.clone());
                result.push(tail);
            }
        }
        result
    }

    #[test]
    fn readiness_does_not_depend_on_completion_order() {
        let tracked = ids(&["lenster", "orb", "iris"]);
        let records = [
            StatRecord::new(10, 2, 1),
            StatRecord::new(5, 7, 3),
            StatRecord::new(8, 8, 8),
        ];
        let reports = tracked.iter().cloned().zip(records).collect::<Vec<_>>();

        for order in permutations(&reports) {
            let mut aggregator = Aggregator::new(tracked.clone(), DateRange::default());
            let generation = aggregator.generation();
            for (index, (id, record)) in order.iter().enumerate() {
                assert!(aggregator.snapshot().is_none());
                assert_eq!(
                    aggregator.report_result(id.clone(), *record, generation),
                    ReportOutcome::Accepted
                );
                assert_eq!(aggregator.snapshot().is_some(), index == order.len() - 1);
            }

            let snapshot = aggregator.snapshot().unwrap();
            assert_eq!(snapshot.entries(), reports.as_slice());
        }
    }

    #[test]
    fn two_app_scenario() {
        let mut aggregator = Aggregator::new(ids(&["lenster", "orb"]), DateRange::default());
        let generation = aggregator.generation();

        aggregator.report_result("lenster".into(), StatRecord::new(10, 2, 1), generation);
        assert_eq!(aggregator.snapshot(), None);
        assert_eq!(aggregator.status(), CollectionStatus::Loading { received: 1, total: 2 });

        aggregator.report_result("orb".into(), StatRecord::new(5, 7, 3), generation);
        let snapshot = aggregator.snapshot().unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get(&"orb".into()), Some(&StatRecord::new(5, 7, 3)));
        assert_eq!(aggregator.status(), CollectionStatus::Ready);
    }

    #[test]
    fn stale_reports_never_change_the_snapshot() {
        let mut aggregator = Aggregator::new(ids(&["lenster"]), DateRange::default());
        let old = aggregator.generation();
        let current = aggregator.set_range_filter(DateRange::default());

        assert_eq!(
            aggregator.report_result("lenster".into(), StatRecord::new(1, 1, 1), old),
            ReportOutcome::Stale
        );
        assert_eq!(aggregator.snapshot(), None);

        aggregator.report_result("lenster".into(), StatRecord::new(2, 2, 2), current);
        let before = aggregator.snapshot();
        assert_eq!(
            aggregator.report_result("lenster".into(), StatRecord::new(3, 3, 3), old),
            ReportOutcome::Stale
        );
        assert_eq!(
            aggregator.report_failure("lenster".into(), "timeout", old),
            ReportOutcome::Stale
        );
        assert_eq!(aggregator.snapshot(), before);
    }

    #[test]
    fn range_changes_always_start_a_new_generation() {
        let mut aggregator = Aggregator::new(ids(&["lenster"]), DateRange::default());
        let first = aggregator.generation();
        aggregator.report_result("lenster".into(), StatRecord::new(1, 1, 1), first);
        assert!(aggregator.snapshot().is_some());

        let second = aggregator.set_range_filter(DateRange::default());
        assert!(second > first);
        assert!(aggregator.snapshot().is_none());

        let range = DateRange::new(Some(start_of_day(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap())), None);
        let third = aggregator.set_range_filter(range);
        let fourth = aggregator.set_range_filter(range);
        assert!(third > second);
        assert!(fourth > third);
        assert_eq!(aggregator.range(), range);
    }

    #[test]
    fn tracked_set_changes_start_a_new_generation() {
        let mut aggregator = Aggregator::new(ids(&["lenster", "orb"]), DateRange::default());
        let first = aggregator.generation();
        aggregator.report_result("lenster".into(), StatRecord::new(1, 1, 1), first);

        let second = aggregator.set_tracked_applications(ids(&["lenster"]));
        assert!(second > first);
        assert!(aggregator.needs_fetch(&"lenster".into()));
        assert_eq!(aggregator.snapshot(), None);
    }

    #[test]
    fn duplicate_reports_overwrite_without_completing() {
        let mut aggregator = Aggregator::new(ids(&["lenster", "orb"]), DateRange::default());
        let generation = aggregator.generation();

        aggregator.report_result("lenster".into(), StatRecord::new(1, 1, 1), generation);
        assert_eq!(
            aggregator.report_result("lenster".into(), StatRecord::new(9, 9, 9), generation),
            ReportOutcome::Replaced
        );
        assert_eq!(aggregator.snapshot(), None);
        assert!(!aggregator.needs_fetch(&"lenster".into()));

        aggregator.report_result("orb".into(), StatRecord::new(2, 2, 2), generation);
        assert_eq!(
            aggregator.snapshot().unwrap().get(&"lenster".into()),
            Some(&StatRecord::new(9, 9, 9))
        );
    }

    #[test]
    fn untracked_reports_are_dropped() {
        let mut aggregator = Aggregator::new(ids(&["lenster"]), DateRange::default());
        let generation = aggregator.generation();
        assert_eq!(
            aggregator.report_result("orb".into(), StatRecord::new(1, 1, 1), generation),
            ReportOutcome::Untracked
        );
        assert_eq!(aggregator.snapshot(), None);
        assert!(!aggregator.needs_fetch(&"orb".into()));
    }

    #[test]
    fn duplicate_tracked_ids_are_collapsed() {
        let aggregator = Aggregator::new(ids(&["orb", "lenster", "orb"]), DateRange::default());
        assert_eq!(aggregator.tracked(), ids(&["orb", "lenster"]).as_slice());
    }

    #[test]
    fn failures_are_reported_but_never_complete_the_snapshot() {
        let mut aggregator = Aggregator::new(ids(&["lenster", "orb"]), DateRange::default());
        let generation = aggregator.generation();

        aggregator.report_result("lenster".into(), StatRecord::new(1, 1, 1), generation);
        aggregator.report_failure("orb".into(), "connection reset", generation);

        assert_eq!(aggregator.snapshot(), None);
        assert!(aggregator.is_settled());
        assert_eq!(aggregator.failure_reason(&"orb".into()), Some("connection reset"));
        assert_eq!(
            aggregator.status(),
            CollectionStatus::Failed {
                failed: ids(&["orb"]),
                received: 1,
                total: 2,
            }
        );

        assert!(aggregator.clear_failure(&"orb".into()));
        assert_eq!(aggregator.status(), CollectionStatus::Loading { received: 1, total: 2 });
        assert!(!aggregator.is_settled());

        aggregator.report_result("orb".into(), StatRecord::new(2, 2, 2), generation);
        assert_eq!(aggregator.status(), CollectionStatus::Ready);
    }

    #[test]
    fn late_failure_does_not_discard_a_value() {
        let mut aggregator = Aggregator::new(ids(&["lenster"]), DateRange::default());
        let generation = aggregator.generation();
        aggregator.report_result("lenster".into(), StatRecord::new(1, 1, 1), generation);
        assert_eq!(
            aggregator.report_failure("lenster".into(), "timeout", generation),
            ReportOutcome::Ignored
        );
        assert!(aggregator.snapshot().is_some());
    }

    #[test]
    fn empty_tracked_set_is_trivially_ready() {
        let aggregator = Aggregator::new(Vec::new(), DateRange::default());
        assert_eq!(aggregator.snapshot().map(|snapshot| snapshot.len()), Some(0));
    }
}

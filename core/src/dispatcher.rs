use crate::{
    aggregator::Generation,
    range::StatsWindow,
    source::StatsSource,
    stats::StatRecord,
};
use lens_apps_stats_config::AppId;
use serde::{
    Deserialize,
    Serialize,
};
use std::sync::Arc;
use tokio::{
    sync::mpsc::UnboundedSender,
    task::JoinHandle,
};

/// Completion of one fetch, tagged with the generation it was issued for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatsEvent {
    Received {
        app: AppId,
        generation: Generation,
        record: StatRecord,
    },
    Failed {
        app: AppId,
        generation: Generation,
        error: String,
    },
}

impl StatsEvent {
    pub fn app(&self) -> &AppId {
        match self {
            StatsEvent::Received { app, .. } | StatsEvent::Failed { app, .. } => app,
        }
    }

    pub fn generation(&self) -> Generation {
        match self {
            StatsEvent::Received { generation, .. } | StatsEvent::Failed { generation, .. } => *generation,
        }
    }
}

/// Spawns one fetch per app, all at once. Completions arrive on `events` in whatever order
/// the requests finish.
pub fn dispatch(
    source: Arc<dyn StatsSource>,
    apps: Vec<AppId>,
    window: StatsWindow,
    generation: Generation,
    events: UnboundedSender<StatsEvent>,
) -> Vec<JoinHandle<()>> {
    debug!(%generation, apps = apps.len(), source = source.name(), ?window, "Dispatching fetches");

    apps.into_iter()
        .map(|app| {
            let source = source.clone();
            let events = events.clone();
            tokio::spawn(async move {
                let event = match source.fetch(app.clone(), window).await {
                    Ok(record) => StatsEvent::Received {
                        app,
                        generation,
                        record,
                    },
                    Err(err) => {
                        warn!(%app, %generation, "Fetch failed: {err:#}");
                        StatsEvent::Failed {
                            app,
                            generation,
                            error: format!("{err:#}"),
                        }
                    }
                };
                if events.send(event).is_err() {
                    debug!(%generation, "Nobody is listening for stats anymore");
                }
            })
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::source::StatsFuture;
    use pretty_assertions::assert_eq;
    use std::{
        collections::HashMap,
        sync::Mutex,
    };
    use tokio::sync::mpsc::unbounded_channel;

    /// Answers from a fixed table and remembers every request.
    #[derive(Debug, Default)]
    pub(crate) struct FakeSource {
        answers: HashMap<AppId, StatRecord>,
        pub(crate) calls: Mutex<Vec<(AppId, StatsWindow)>>,
    }

    impl FakeSource {
        pub(crate) fn new(answers: impl IntoIterator<Item = (&'static str, StatRecord)>) -> Self {
            Self {
                answers: answers.into_iter().map(|(id, record)| (AppId::from(id), record)).collect(),
                calls: Default::default(),
            }
        }

        pub(crate) fn calls(&self) -> Vec<(AppId, StatsWindow)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl StatsSource for FakeSource {
        fn fetch(&self, app: AppId, window: StatsWindow) -> StatsFuture<'_> {
            self.calls.lock().unwrap().push((app.clone(), window));
            let answer = self.answers.get(&app).copied();
            Box::pin(async move { answer.ok_or_else(|| eyre::eyre!("no stats for {app}")) })
        }

        fn name(&self) -> &'static str {
            "fake"
        }
    }

    #[tokio::test]
    async fn one_event_per_app_tagged_with_generation() {
        let source = Arc::new(FakeSource::new([("lenster", StatRecord::new(10, 2, 1))]));
        let (tx, mut rx) = unbounded_channel();
        let generation = Generation::default();
        let window = StatsWindow {
            from_timestamp: Some(1),
            to_timestamp: None,
        };

        for handle in dispatch(
            source.clone(),
            vec!["lenster".into(), "orb".into()],
            window,
            generation,
            tx,
        ) {
            handle.await.unwrap();
        }

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events.sort_by(|a, b| a.app().cmp(b.app()));

        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            StatsEvent::Received {
                app: "lenster".into(),
                generation,
                record: StatRecord::new(10, 2, 1),
            }
        );
        assert!(matches!(&events[1], StatsEvent::Failed { app, error, .. } if app.as_str() == "orb" && error.contains("no stats")));
        assert!(events.iter().all(|event| event.generation() == generation));

        let mut calls = source.calls();
        calls.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(calls, vec![("lenster".into(), window), ("orb".into(), window)]);
    }
}

use lens_apps_stats_config::{
    AppEntry,
    AppId,
    Config,
    Platform,
    PlatformFilter,
};
use url::Url;

/// The ordered list of apps the dashboard knows about.
///
/// Catalog order is the tie-break order for every projection, so it is never re-sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<AppEntry>,
    fallback_url: Option<Url>,
}

impl Catalog {
    pub fn new(entries: impl IntoIterator<Item = AppEntry>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
            fallback_url: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            entries: config.apps.clone(),
            fallback_url: config.fallback_url.clone(),
        }
    }

    pub fn with_fallback_url(mut self, url: Url) -> Self {
        self.fallback_url = Some(url);
        self
    }

    pub fn entries(&self) -> &[AppEntry] {
        &self.entries
    }

    pub fn get(&self, id: &AppId) -> Option<&AppEntry> {
        self.entries.iter().find(|entry| &entry.id == id)
    }

    /// Ids matching `filter`, in catalog order.
    pub fn tracked(&self, filter: PlatformFilter) -> Vec<AppId> {
        self.entries
            .iter()
            .filter(|entry| filter.matches(entry.platform))
            .map(|entry| entry.id.clone())
            .collect()
    }

    /// Unknown ids fall back to the same capitalization rule as unnamed entries.
    pub fn display_name(&self, id: &AppId) -> String {
        match self.get(id) {
            Some(entry) => entry.display_name(),
            None => AppEntry::new(id.clone()).display_name(),
        }
    }

    pub fn platform(&self, id: &AppId) -> Option<Platform> {
        self.get(id).and_then(|entry| entry.platform)
    }

    /// Where activating the app's row should lead, if anywhere.
    pub fn navigation_target(&self, id: &AppId) -> Option<&Url> {
        self.get(id)
            .and_then(|entry| entry.url.as_ref())
            .or(self.fallback_url.as_ref())
    }
}

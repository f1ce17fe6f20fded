use derive_more::Display;
use serde::{
    Deserialize,
    Serialize,
};
use strum::{
    EnumIter,
    EnumString,
};

/// Stable identifier of a tracked app, as understood by the Lens API `sources` filter.
#[derive(Debug, Display, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppId(String);

impl AppId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AppId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for AppId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, EnumIter, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum Platform {
    Web,
    Mobile,
}

/// Narrows the catalog down to the apps that are tracked.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, strum::Display, EnumIter, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PlatformFilter {
    #[default]
    All,
    Web,
    Mobile,
}

impl PlatformFilter {
    /// Unclassified apps only pass the `All` filter.
    pub fn matches(&self, platform: Option<Platform>) -> bool {
        match self {
            PlatformFilter::All => true,
            PlatformFilter::Web => platform == Some(Platform::Web),
            PlatformFilter::Mobile => platform == Some(Platform::Mobile),
        }
    }
}

/// One catalog entry from the `apps` section of the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppEntry {
    pub id: AppId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<url::Url>,
}

impl AppEntry {
    pub fn new(id: impl Into<AppId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            platform: None,
            url: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn with_url(mut self, url: url::Url) -> Self {
        self.url = Some(url);
        self
    }

    /// The configured name, or the id with its first letter upper-cased.
    pub fn display_name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        capitalize(self.id.as_str())
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr as _;

    #[test]
    fn display_name_defaults_to_capitalized_id() {
        assert_eq!(AppEntry::new("lenster").display_name(), "Lenster");
        assert_eq!(AppEntry::new("").display_name(), "");
        assert_eq!(AppEntry::new("orb").with_name("Orb Mobile").display_name(), "Orb Mobile");
    }

    #[test]
    fn platform_filter_leaves_unclassified_apps_to_all() {
        assert!(PlatformFilter::All.matches(None));
        assert!(!PlatformFilter::Web.matches(None));
        assert!(PlatformFilter::Web.matches(Some(Platform::Web)));
        assert!(!PlatformFilter::Mobile.matches(Some(Platform::Web)));
    }

    #[test]
    fn platform_filter_parses_case_insensitively() {
        assert_eq!(PlatformFilter::from_str("Mobile").unwrap(), PlatformFilter::Mobile);
        assert_eq!(PlatformFilter::from_str("all").unwrap(), PlatformFilter::All);
        assert!(PlatformFilter::from_str("desktop").is_err());
    }

    #[test]
    fn entry_deserializes_from_yaml() {
        let entry: AppEntry = serde_yml::from_str("id: orb\nplatform: mobile\nurl: https://orb.ac/\n").unwrap();
        assert_eq!(
            entry,
            AppEntry::new("orb")
                .with_platform(Platform::Mobile)
                .with_url(url::Url::parse("https://orb.ac/").unwrap())
        );
    }
}

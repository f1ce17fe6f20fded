use super::components::{
    filters::FilterAction,
    rankings::RankingsAction,
};
use lens_apps_stats_config::{
    AppId,
    PlatformFilter,
};
use lens_apps_stats_core::{
    DashboardView,
    DateRange,
    StatsEvent,
};
use serde::{
    Deserialize,
    Serialize,
};
use serde_yml::with::singleton_map_recursive;
use strum::{
    Display,
    EnumIter,
};

#[derive(Display, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Action {
    Tick,
    Render,
    Resize(u16, u16),
    Suspend,
    Resume,
    Quit,
    ClearScreen,
    Error(String),

    Activate(Screen),
    /// A popup owns the keyboard while `true`, so keymaps are not consulted.
    InputMode(bool),

    Stats(StatsEvent),
    DashboardChanged(Box<DashboardView>),
    ApplyRange(DateRange),
    ApplyPlatform(PlatformFilter),
    Refresh,
    RetryFailed,
    OpenApp(AppId),

    #[serde(with = "singleton_map_recursive")]
    #[allow(private_interfaces)]
    Filter(FilterAction),

    #[serde(with = "singleton_map_recursive")]
    #[allow(private_interfaces)]
    Rankings(RankingsAction),
}

/// Top level screens, one per tab.
#[derive(Display, EnumIter, Default, Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Screen {
    #[default]
    Rankings,
    Charts,
    Logs,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn keymap_actions_read_from_yaml() {
        let actions: Vec<Action> = serde_yml::with::singleton_map_recursive::deserialize(
            serde_yml::Deserializer::from_str("- Quit\n- Activate: Charts\n- Rankings: SortByCursor\n"),
        )
        .unwrap();
        assert_eq!(
            actions,
            vec![
                Action::Quit,
                Action::Activate(Screen::Charts),
                Action::Rankings(RankingsAction::SortByCursor),
            ]
        );
    }
}

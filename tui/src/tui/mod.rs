mod action;
mod app;
mod components;
mod keybindings;
mod layout;
mod theme;
#[allow(clippy::module_inception)]
mod tui;
mod widgets;

pub(crate) use action::{
    Action,
    Screen,
};
pub use app::App;
use components::Component;
use theme::Theme;
use tui::Event;
pub use tui::Tui;

use crate::tui::{
    Action,
    Event,
};
use color_eyre::Result;
use crossterm::event::{
    KeyEvent,
    MouseEvent,
};
use lens_apps_stats_config::Config;
use ratatui::{
    layout::{
        Rect,
        Size,
    },
    Frame,
};
use tokio::sync::mpsc::UnboundedSender;

/// A piece of the screen that reacts to [`Action`]s and draws itself.
///
/// Every component sees every action in [`Component::update`]; only focused components get raw
/// terminal events through [`Component::handle_events`].
pub(crate) trait Component {
    /// Keep the sender around to emit actions outside of `update`.
    fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
        let _ = tx;
        Ok(())
    }

    fn register_config_handler(&mut self, config: Config) -> Result<()> {
        let _ = config;
        Ok(())
    }

    fn init(&mut self, area: Size) -> Result<()> {
        let _ = area;
        Ok(())
    }

    fn is_visible(&self) -> bool {
        true
    }

    fn is_focused(&self) -> bool {
        false
    }

    fn handle_events(&mut self, event: Option<Event>) -> Result<Option<Action>> {
        let action = match event {
            Some(Event::Key(key_event)) => self.handle_key_event(key_event)?,
            Some(Event::Mouse(mouse_event)) => self.handle_mouse_event(mouse_event)?,
            _ => None,
        };
        Ok(action)
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let _ = key;
        Ok(None)
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        let _ = mouse;
        Ok(None)
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        let _ = action;
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame<'_>, area: Rect) -> Result<()>;
}

use crate::tui::{
    layout,
    Action,
    Component,
    Screen,
};
use eyre::Result;
use ratatui::{
    layout::Rect,
    style::{
        Color,
        Modifier,
        Style,
    },
    text::Line,
    widgets::{
        Block,
        Borders,
        Tabs,
    },
    Frame,
};
use strum::IntoEnumIterator as _;

#[derive(Debug, Default)]
pub struct NavTabs {
    screen: Screen,
    status: Option<String>,
}

impl Component for NavTabs {
    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::Activate(screen) => self.screen = screen,
            Action::DashboardChanged(view) => {
                self.status = Some(format!("generation {}", view.generation));
            }
            _ => {}
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame<'_>, area: Rect) -> Result<()> {
        let [header_area, _main_area] = layout::header_and_main_area(area)?;

        let titles = Screen::iter()
            .enumerate()
            .map(|(index, screen)| format!("{screen} [{}]", index + 1))
            .collect::<Vec<_>>();

        let selected = Screen::iter().position(|screen| screen == self.screen).unwrap_or_default();

        let mut block = Block::new().borders(Borders::BOTTOM);
        if let Some(status) = &self.status {
            block = block.title_top(Line::from(status.clone()).right_aligned());
        }

        let tabs = Tabs::new(titles)
            .select(selected)
            .style(Style::default().fg(Color::Gray))
            .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            .block(block)
            .divider(" | ");

        frame.render_widget(tabs, header_area);
        Ok(())
    }
}

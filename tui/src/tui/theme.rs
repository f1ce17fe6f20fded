use ratatui::style::{
    Color,
    Modifier,
    Style,
};

#[derive(Clone, Copy, Debug)]
pub(super) struct Theme {
    pub(super) default: Style,
    pub(super) text_default: Style,
    pub(super) text_selected: Style,
    pub(super) text_dimmed: Style,
    pub(super) text_error: Style,
    pub(super) table_header: Style,
    pub(super) border_focused: Style,
    pub(super) border_unfocused: Style,
    pub(super) bar: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            default: Style::default().bg(Color::Black).fg(Color::Gray),
            text_default: Style::default(),
            text_selected: Style::default().fg(Color::Yellow),
            text_dimmed: Style::default().fg(Color::DarkGray),
            text_error: Style::default().fg(Color::Red),
            table_header: Style::default().bg(Color::DarkGray).fg(Color::White),
            border_focused: Style::default().fg(Color::White),
            border_unfocused: Style::default().fg(Color::DarkGray),
            bar: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        }
    }
}

impl Theme {
    pub(super) fn border(&self, focused: bool) -> Style {
        if focused {
            self.border_focused
        } else {
            self.border_unfocused
        }
    }
}

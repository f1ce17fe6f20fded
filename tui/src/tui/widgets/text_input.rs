use crate::tui::layout;
use eyre::Result;
use ratatui::{
    layout::Constraint,
    style::Style,
    text::Line,
    widgets::{
        Block,
        Borders,
        Clear,
    },
    Frame,
};
use tui_textarea::TextArea;

/// Single line editor shown as a popup.
#[derive(Debug)]
pub(crate) struct TextInput {
    editor: TextArea<'static>,
}

impl TextInput {
    pub(crate) fn new(title: impl Into<String>, placeholder: &'static str, content: impl ToString) -> Self {
        let mut editor = TextArea::new(vec![content.to_string()]);
        editor.set_cursor_line_style(Style::default());
        editor.set_placeholder_text(placeholder);
        editor.set_block(Block::default().borders(Borders::ALL).title(title.into()));
        editor.select_all();
        Self { editor }
    }

    /// Shown under the input, e.g. the accepted format or a lower bound.
    pub(crate) fn with_hint(mut self, hint: impl Into<String>) -> Self {
        if let Some(block) = self.editor.block().cloned() {
            self.editor
                .set_block(block.title_bottom(Line::from(hint.into()).right_aligned()));
        }
        self
    }

    pub(crate) fn draw(&mut self, frame: &mut Frame<'_>) -> Result<()> {
        let area = layout::center(
            frame.area(),
            Constraint::Max(60),
            Constraint::Length(3), // top and bottom border + content
        );
        frame.render_widget(Clear, area);
        frame.render_widget(&self.editor, area);
        Ok(())
    }

    pub(crate) fn handle_key_event(&mut self, key: crossterm::event::KeyEvent) -> bool {
        self.editor.input(key)
    }

    pub(crate) fn value(&self) -> String {
        self.editor.lines().join("\n").trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{
        KeyCode,
        KeyEvent,
        KeyModifiers,
    };
    use pretty_assertions::assert_eq;

    #[test]
    fn typing_replaces_the_preset_content() {
        let mut input = TextInput::new("Start date", "YYYY-MM-DD", "2023-01-01");
        assert_eq!(input.value(), "2023-01-01");

        for c in "2024-02-03".chars() {
            input.handle_key_event(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        }
        assert_eq!(input.value(), "2024-02-03");
    }
}

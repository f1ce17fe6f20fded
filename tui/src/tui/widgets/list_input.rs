use crate::tui::{
    layout,
    theme::Theme,
};
use crossterm::event::{
    KeyCode,
    KeyEvent,
};
use eyre::Result;
use ratatui::{
    layout::Constraint,
    widgets::{
        self,
        Block,
        Borders,
        Clear,
    },
    Frame,
};

#[derive(Debug)]
pub(crate) struct ListItem<T> {
    label: String,
    value: T,
}

impl<A, B, T> From<(A, B)> for ListItem<T>
where
    A: Into<String>,
    B: Into<T>,
{
    fn from(arg: (A, B)) -> Self {
        let (label, value) = arg;
        ListItem {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Popup list to pick one value from.
#[derive(Debug)]
pub(crate) struct ListInput<T> {
    title: &'static str,
    items: Vec<ListItem<T>>,
    list_state: widgets::ListState,
}

impl<T> ListInput<T> {
    pub(crate) fn new(
        title: &'static str,
        items: impl IntoIterator<Item = impl Into<ListItem<T>>>,
        selected: Option<usize>,
    ) -> Self {
        let items = items.into_iter().map(|ea| ea.into()).collect::<Vec<_>>();
        Self {
            title,
            items,
            list_state: widgets::ListState::default().with_selected(selected),
        }
    }

    pub(crate) fn draw(&mut self, frame: &mut Frame<'_>) -> Result<()> {
        let items = self
            .items
            .iter()
            .map(|item| widgets::ListItem::new(item.label.as_str()))
            .collect::<Vec<_>>();
        let line_count = self.items.len() as u16;

        let list = widgets::List::new(items)
            .block(Block::default().borders(Borders::ALL).title(self.title))
            .highlight_style(Theme::default().text_selected)
            .highlight_symbol("> ")
            .highlight_spacing(widgets::HighlightSpacing::Always);

        let area = layout::center(frame.area(), Constraint::Max(40), Constraint::Length(line_count + 2));
        frame.render_widget(Clear, area);
        frame.render_stateful_widget(list, area, &mut self.list_state);
        Ok(())
    }

    pub(crate) fn handle_key_event(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Up => self.list_state.select_previous(),
            KeyCode::Down => self.list_state.select_next(),
            KeyCode::Home => self.list_state.select_first(),
            KeyCode::End => self.list_state.select_last(),
            _ => return false,
        }
        true
    }

    pub(crate) fn finish(mut self) -> Option<(usize, T)> {
        let index = self.list_state.selected()?;
        (index < self.items.len()).then(|| (index, self.items.remove(index).value))
    }
}

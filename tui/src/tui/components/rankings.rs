use crate::tui::{
    layout::header_filters_and_content,
    Action,
    Component,
    Screen,
    Theme,
};
use color_eyre::Result;
use lens_apps_stats_config::AppId;
use lens_apps_stats_core::{
    format_count,
    ordered_rows,
    platform_label,
    Catalog,
    CollectionStatus,
    Column,
    DashboardView,
    Metric,
    TableOrdering,
    TableRow,
};
use ratatui::{
    layout::{
        Alignment,
        Constraint,
        Layout,
        Rect,
    },
    style::Modifier,
    text::Line,
    widgets::{
        Block,
        Borders,
        Cell,
        Paragraph,
        Row,
        Table,
        TableState,
    },
    Frame,
};
use serde::{
    Deserialize,
    Serialize,
};
use strum::{
    Display,
    IntoEnumIterator as _,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub(crate) enum RankingsAction {
    CursorLeft,
    CursorRight,
    SortByCursor,
    SelectPrevious,
    SelectNext,
    OpenSelected,
}

const COLUMN_WIDTHS: [Constraint; 5] = [
    Constraint::Percentage(28), // Name
    Constraint::Percentage(12), // Platform
    Constraint::Percentage(20), // Posts
    Constraint::Percentage(20), // Mirrors
    Constraint::Percentage(20), // Comments
];

/// Apps ranked by the active column. Nothing is listed until every tracked app has reported.
#[derive(Debug)]
pub struct Rankings {
    visible: bool,
    catalog: Catalog,
    ordering: TableOrdering,
    cursor: Column,
    view: Option<DashboardView>,
    rows: Vec<TableRow>,
    selected: Option<AppId>,
    table_state: TableState,
}

impl Rankings {
    pub fn new(catalog: Catalog) -> Self {
        let ordering = TableOrdering::default();
        Self {
            visible: true,
            catalog,
            cursor: ordering.column,
            ordering,
            view: None,
            rows: Vec::new(),
            selected: None,
            table_state: TableState::default(),
        }
    }

    fn refresh_rows(&mut self) {
        self.rows = self
            .view
            .as_ref()
            .and_then(|view| ordered_rows(view.snapshot.as_ref(), &self.catalog, &self.ordering))
            .unwrap_or_default();
        let keep = self
            .selected
            .as_ref()
            .is_some_and(|selected| self.rows.iter().any(|row| &row.id == selected));
        if !keep {
            self.selected = self.rows.first().map(|row| row.id.clone());
        }
        self.table_state.select(self.selected_index());
    }

    fn selected_index(&self) -> Option<usize> {
        let selected = self.selected.as_ref()?;
        self.rows.iter().position(|row| &row.id == selected)
    }

    fn move_cursor(&mut self, forward: bool) {
        let columns = Column::iter().collect::<Vec<_>>();
        let Some(index) = columns.iter().position(|column| *column == self.cursor) else {
            return;
        };
        let next = if forward {
            (index + 1).min(columns.len() - 1)
        } else {
            index.saturating_sub(1)
        };
        self.cursor = columns[next];
    }

    fn move_selection(&mut self, forward: bool) {
        let Some(index) = self.selected_index() else {
            self.selected = self.rows.first().map(|row| row.id.clone());
            self.table_state.select(self.selected_index());
            return;
        };
        let next = if forward {
            (index + 1).min(self.rows.len().saturating_sub(1))
        } else {
            index.saturating_sub(1)
        };
        self.selected = self.rows.get(next).map(|row| row.id.clone());
        self.table_state.select(Some(next));
    }

    fn placeholder(&self) -> String {
        match self.view.as_ref().map(|view| &view.status) {
            None => "Loading stats...".to_string(),
            Some(CollectionStatus::Loading { received, total }) => {
                format!("Loading stats... {received} of {total} apps reported")
            }
            Some(CollectionStatus::Failed { failed, .. }) => {
                let names = failed
                    .iter()
                    .map(|id| self.catalog.display_name(id))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("Could not load stats for {names}. Press t to retry.")
            }
            Some(CollectionStatus::Ready) => "No apps match the current filters.".to_string(),
        }
    }

    fn header_row(&self, theme: &Theme) -> Row<'static> {
        Row::new(Column::iter().map(|column| {
            let style = if column == self.cursor {
                theme.table_header.add_modifier(Modifier::REVERSED)
            } else if column.is_sortable() {
                theme.table_header
            } else {
                theme.table_header.patch(theme.text_dimmed)
            };
            Cell::from(self.header_title(column)).style(style)
        }))
        .style(theme.table_header)
        .height(1)
    }

    fn header_title(&self, column: Column) -> String {
        match self.ordering.indicator(column) {
            Some(true) => format!("{} ▲", column.title()),
            Some(false) => format!("{} ▼", column.title()),
            None => column.title().to_string(),
        }
    }
}

impl Component for Rankings {
    fn is_visible(&self) -> bool {
        self.visible
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::Activate(screen) => self.visible = screen == Screen::Rankings,
            Action::DashboardChanged(view) => {
                self.view = Some(*view);
                self.refresh_rows();
            }
            Action::Rankings(action) => match action {
                RankingsAction::CursorLeft => self.move_cursor(false),
                RankingsAction::CursorRight => self.move_cursor(true),
                RankingsAction::SortByCursor => {
                    if self.ordering.activate(self.cursor) {
                        debug!(column = %self.ordering.column, ascending = self.ordering.ascending, "Sorting");
                        self.refresh_rows();
                    }
                }
                RankingsAction::SelectPrevious => self.move_selection(false),
                RankingsAction::SelectNext => self.move_selection(true),
                RankingsAction::OpenSelected => return Ok(self.selected.clone().map(Action::OpenApp)),
            },
            _ => {}
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame<'_>, area: Rect) -> Result<()> {
        let theme = Theme::default();
        let [_, _, area] = header_filters_and_content(area)?;

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border(true))
            .title("Rankings")
            .title_bottom(Line::from(" <←/→> column, <o> sort, <↑/↓> select, <enter> open ").centered());

        if self.rows.is_empty() {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            let [header_area, body_area] = Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(inner);
            frame.render_widget(
                Table::new(Vec::<Row<'_>>::new(), COLUMN_WIDTHS).header(self.header_row(&theme)),
                header_area,
            );
            frame.render_widget(
                Paragraph::new(self.placeholder())
                    .style(theme.text_dimmed)
                    .alignment(Alignment::Center),
                body_area,
            );
            return Ok(());
        }

        let rows = self.rows.iter().map(|row| {
            Row::new(vec![
                Cell::from(row.name.clone()),
                Cell::from(platform_label(row.platform)),
                Cell::from(format_count(row.stats.get(Metric::Posts))),
                Cell::from(format_count(row.stats.get(Metric::Mirrors))),
                Cell::from(format_count(row.stats.get(Metric::Comments))),
            ])
            .style(theme.text_default)
        });

        let table = Table::new(rows, COLUMN_WIDTHS)
            .header(self.header_row(&theme))
            .block(block)
            .row_highlight_style(theme.text_selected)
            .highlight_symbol("> ")
            .column_spacing(1);

        frame.render_stateful_widget(table, area, &mut self.table_state);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lens_apps_stats_config::{
        AppEntry,
        Platform,
        PlatformFilter,
    };
    use lens_apps_stats_core::{
        Aggregator,
        DateRange,
        StatRecord,
    };
    use pretty_assertions::assert_eq;
    use ratatui::{
        backend::TestBackend,
        Terminal,
    };

    fn catalog() -> Catalog {
        Catalog::new([
            AppEntry::new("lenster").with_platform(Platform::Web),
            AppEntry::new("orb").with_platform(Platform::Mobile),
            AppEntry::new("phaver").with_platform(Platform::Mobile),
        ])
    }

    fn ready_view() -> Box<DashboardView> {
        let mut aggregator = Aggregator::new(catalog().tracked(PlatformFilter::All), DateRange::default());
        let generation = aggregator.generation();
        aggregator.report_result("lenster".into(), StatRecord::new(10, 2, 1), generation);
        aggregator.report_result("orb".into(), StatRecord::new(5, 7, 3), generation);
        aggregator.report_result("phaver".into(), StatRecord::new(8, 1, 9), generation);
        Box::new(DashboardView {
            generation,
            range: DateRange::default(),
            platform: PlatformFilter::All,
            status: aggregator.status(),
            snapshot: aggregator.snapshot(),
        })
    }

    fn names(rankings: &Rankings) -> Vec<&str> {
        rankings.rows.iter().map(|row| row.name.as_str()).collect()
    }

    #[test]
    fn ranks_by_posts_and_selects_the_leader() {
        let mut rankings = Rankings::new(catalog());
        rankings.update(Action::DashboardChanged(ready_view())).unwrap();

        assert_eq!(names(&rankings), vec!["Lenster", "Phaver", "Orb"]);
        assert_eq!(rankings.selected, Some("lenster".into()));
        assert_eq!(
            rankings.update(Action::Rankings(RankingsAction::OpenSelected)).unwrap(),
            Some(Action::OpenApp("lenster".into()))
        );
    }

    #[test]
    fn header_cursor_sorts_and_keeps_the_selection() {
        let mut rankings = Rankings::new(catalog());
        rankings.update(Action::DashboardChanged(ready_view())).unwrap();
        rankings.update(Action::Rankings(RankingsAction::SelectNext)).unwrap();
        assert_eq!(rankings.selected, Some("phaver".into()));

        rankings.update(Action::Rankings(RankingsAction::CursorRight)).unwrap();
        rankings.update(Action::Rankings(RankingsAction::SortByCursor)).unwrap();
        assert_eq!(rankings.ordering.column, Column::Mirrors);
        assert_eq!(names(&rankings), vec!["Orb", "Lenster", "Phaver"]);
        assert_eq!(rankings.selected, Some("phaver".into()));
        assert_eq!(rankings.table_state.selected(), Some(2));

        rankings.update(Action::Rankings(RankingsAction::SortByCursor)).unwrap();
        assert_eq!(names(&rankings), vec!["Phaver", "Lenster", "Orb"]);
    }

    #[test]
    fn name_column_cannot_be_sorted() {
        let mut rankings = Rankings::new(catalog());
        rankings.update(Action::DashboardChanged(ready_view())).unwrap();
        for _ in 0..5 {
            rankings.update(Action::Rankings(RankingsAction::CursorLeft)).unwrap();
        }
        assert_eq!(rankings.cursor, Column::Name);

        rankings.update(Action::Rankings(RankingsAction::SortByCursor)).unwrap();
        assert_eq!(rankings.ordering, TableOrdering::default());
        assert_eq!(names(&rankings), vec!["Lenster", "Phaver", "Orb"]);
    }

    #[test]
    fn nothing_listed_until_ready() {
        let mut rankings = Rankings::new(catalog());
        let mut view = ready_view();
        view.snapshot = None;
        view.status = CollectionStatus::Loading { received: 2, total: 3 };
        rankings.update(Action::DashboardChanged(view)).unwrap();

        assert!(rankings.rows.is_empty());
        assert_eq!(rankings.update(Action::Rankings(RankingsAction::OpenSelected)).unwrap(), None);
        assert_eq!(rankings.placeholder(), "Loading stats... 2 of 3 apps reported");
    }

    #[test]
    fn draws_rows_and_sort_marker() {
        let mut rankings = Rankings::new(catalog());
        rankings.update(Action::DashboardChanged(ready_view())).unwrap();

        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal.draw(|frame| rankings.draw(frame, frame.area()).unwrap()).unwrap();
        let screen = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>();
        assert!(screen.contains("Posts ▼"), "{screen}");
        assert!(screen.contains("Lenster"), "{screen}");
    }

    #[test]
    fn loading_keeps_the_header_above_the_placeholder() {
        let mut rankings = Rankings::new(catalog());
        let mut view = ready_view();
        view.snapshot = None;
        view.status = CollectionStatus::Loading { received: 1, total: 3 };
        rankings.update(Action::DashboardChanged(view)).unwrap();

        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal.draw(|frame| rankings.draw(frame, frame.area()).unwrap()).unwrap();
        let lines = terminal
            .backend()
            .buffer()
            .content()
            .chunks(100)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>();

        let header = lines.iter().position(|line| line.contains("Posts ▼")).unwrap();
        let placeholder = lines
            .iter()
            .position(|line| line.contains("Loading stats... 1 of 3 apps reported"))
            .unwrap();
        assert!(lines[header].contains("Comments"), "{}", lines[header]);
        assert!(placeholder > header);
    }
}

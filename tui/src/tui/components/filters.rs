use crate::tui::{
    layout::header_filters_and_content,
    widgets::{
        ListInput,
        TextInput,
    },
    Action,
    Component,
    Screen,
    Theme,
};
use chrono::{
    DateTime,
    NaiveDate,
    Utc,
};
use color_eyre::Result;
use crossterm::event::{
    KeyCode,
    KeyEvent,
};
use lens_apps_stats_config::{
    Config,
    PlatformFilter,
};
use lens_apps_stats_core::{
    range::start_of_day,
    CollectionStatus,
    DateRange,
    RangeFilter,
};
use ratatui::{
    layout::Rect,
    text::{
        Line,
        Span,
    },
    widgets::{
        Block,
        Borders,
        Paragraph,
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
use tokio::sync::mpsc::UnboundedSender;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub(crate) enum FilterAction {
    EditStart,
    EditEnd,
    ChoosePlatform,
    Load,
    Reset,
}

#[derive(Debug)]
enum Editor {
    Start(TextInput),
    End(TextInput),
    Platform(ListInput<PlatformFilter>),
}

/// Date range and platform selection. Date edits are staged until loaded.
#[derive(Debug)]
pub struct Filters {
    visible: bool,
    range: RangeFilter,
    platform: PlatformFilter,
    status: Option<CollectionStatus>,
    editor: Option<Editor>,
    message: Option<String>,
    action_tx: Option<UnboundedSender<Action>>,
}

impl Filters {
    pub fn new(range: DateRange, platform: PlatformFilter) -> Self {
        Self {
            visible: true,
            range: RangeFilter::new(range),
            platform,
            status: None,
            editor: None,
            message: None,
            action_tx: None,
        }
    }

    fn open_editor(&mut self, action: FilterAction) -> Option<Action> {
        let staged = self.range.staged();
        let editor = match action {
            FilterAction::EditStart => Editor::Start(
                TextInput::new("Start date", "YYYY-MM-DD", format_day(staged.start)).with_hint(" YYYY-MM-DD "),
            ),
            FilterAction::EditEnd => {
                let hint = match self.range.earliest_end() {
                    Some(start) => format!(" not before {} ", start.format(DATE_FORMAT)),
                    None => " YYYY-MM-DD ".to_string(),
                };
                Editor::End(TextInput::new("End date", "YYYY-MM-DD", format_day(staged.end)).with_hint(hint))
            }
            FilterAction::ChoosePlatform => {
                let selected = PlatformFilter::iter().position(|platform| platform == self.platform);
                Editor::Platform(ListInput::new(
                    "Platform",
                    PlatformFilter::iter().map(|platform| (platform.to_string(), platform)),
                    selected,
                ))
            }
            FilterAction::Load | FilterAction::Reset => return None,
        };
        self.message = None;
        self.editor = Some(editor);
        Some(Action::InputMode(true))
    }

    fn load(&mut self) -> Option<Action> {
        match self.range.commit() {
            Ok(range) => {
                self.message = None;
                Some(Action::ApplyRange(range))
            }
            Err(err) => {
                warn!("Not loading: {err}");
                self.message = Some(err.to_string());
                None
            }
        }
    }

    /// Applies the editor's value. Gives the editor back when the value is not acceptable.
    fn submit(&mut self, editor: Editor) -> Result<Option<Editor>> {
        let today = Utc::now().date_naive();
        match editor {
            Editor::Start(input) => match parse_day(&input.value(), today) {
                Ok(Some(start)) => self.range.set_start(start),
                Ok(None) => {}
                Err(message) => {
                    self.message = Some(message);
                    return Ok(Some(Editor::Start(input)));
                }
            },
            Editor::End(input) => match parse_day(&input.value(), today) {
                Ok(Some(end)) if !self.range.accepts_end(end) => {
                    self.message = Some(format!(
                        "End date must not be before {}",
                        format_day(self.range.earliest_end())
                    ));
                    return Ok(Some(Editor::End(input)));
                }
                Ok(Some(end)) => self.range.set_end(end),
                Ok(None) => {}
                Err(message) => {
                    self.message = Some(message);
                    return Ok(Some(Editor::End(input)));
                }
            },
            Editor::Platform(list) => {
                if let Some((_, platform)) = list.finish() {
                    if let Some(tx) = &self.action_tx {
                        tx.send(Action::ApplyPlatform(platform))?;
                    }
                }
            }
        }
        Ok(None)
    }

    fn status_line(&self) -> String {
        match &self.status {
            None => String::new(),
            Some(CollectionStatus::Ready) => " ready ".to_string(),
            Some(CollectionStatus::Loading { received, total }) => format!(" loading {received}/{total} "),
            Some(CollectionStatus::Failed { failed, .. }) => {
                let failed = failed.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ");
                format!(" failed: {failed} (t to retry) ")
            }
        }
    }
}

impl Component for Filters {
    fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(tx);
        Ok(())
    }

    fn register_config_handler(&mut self, config: Config) -> Result<()> {
        self.range = RangeFilter::new(DateRange::from_config(&config));
        self.platform = config.platform;
        Ok(())
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn is_focused(&self) -> bool {
        self.editor.is_some()
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::Activate(screen) => self.visible = screen != Screen::Logs,
            Action::DashboardChanged(view) => {
                self.platform = view.platform;
                self.status = Some(view.status);
            }
            Action::Filter(action) if self.visible && self.editor.is_none() => {
                return Ok(match action {
                    FilterAction::Load => self.load(),
                    FilterAction::Reset => {
                        self.message = None;
                        Some(Action::ApplyRange(self.range.reset()))
                    }
                    _ => self.open_editor(action),
                });
            }
            _ => {}
        }
        Ok(None)
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let Some(mut editor) = self.editor.take() else {
            return Ok(None);
        };
        match key.code {
            KeyCode::Esc => return Ok(Some(Action::InputMode(false))),
            KeyCode::Enter => {
                self.editor = self.submit(editor)?;
                return Ok(self.editor.is_none().then_some(Action::InputMode(false)));
            }
            _ => {}
        }
        match &mut editor {
            Editor::Start(input) | Editor::End(input) => {
                input.handle_key_event(key);
            }
            Editor::Platform(list) => {
                list.handle_key_event(key);
            }
        }
        self.editor = Some(editor);
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame<'_>, area: Rect) -> Result<()> {
        let theme = Theme::default();
        let [_, area, _] = header_filters_and_content(area)?;

        let staged = self.range.staged();
        let mut spans = vec![
            Span::styled(" Start ", theme.text_dimmed),
            Span::raw(format_day(staged.start)),
            Span::styled("  End ", theme.text_dimmed),
            Span::raw(format_day(staged.end)),
            Span::styled("  Platform ", theme.text_dimmed),
            Span::raw(self.platform.to_string()),
        ];
        if self.range.has_pending_edits() {
            spans.push(Span::styled("  (not loaded, l to load)", theme.text_selected));
        }

        let bottom = match &self.message {
            Some(message) => Line::styled(format!(" {message} "), theme.text_error),
            None => Line::from(" <s>tart <e>nd <l>oad <r>eset <p>latform <R>efresh "),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border(self.editor.is_some()))
            .title("Filters")
            .title_top(Line::from(self.status_line()).right_aligned())
            .title_bottom(bottom.centered());
        frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);

        match &mut self.editor {
            Some(Editor::Start(input) | Editor::End(input)) => input.draw(frame)?,
            Some(Editor::Platform(list)) => list.draw(frame)?,
            None => {}
        }
        Ok(())
    }
}

fn format_day(value: Option<DateTime<Utc>>) -> String {
    value.map_or_else(|| "any".to_string(), |value| value.format(DATE_FORMAT).to_string())
}

/// Empty input leaves the bound untouched. Days after `today` are rejected.
fn parse_day(value: &str, today: NaiveDate) -> std::result::Result<Option<DateTime<Utc>>, String> {
    if value.is_empty() || value == "any" {
        return Ok(None);
    }
    let day =
        NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| format!("{value} is not a date (YYYY-MM-DD)"))?;
    if day > today {
        return Err(format!("{value} is in the future"));
    }
    Ok(Some(start_of_day(day)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;
    use tokio::sync::mpsc::unbounded_channel;

    fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        start_of_day(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    fn press(filters: &mut Filters, code: KeyCode) -> Option<Action> {
        filters.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE)).unwrap()
    }

    fn enter_date(filters: &mut Filters, action: FilterAction, text: &str) -> Option<Action> {
        assert_eq!(
            filters.update(Action::Filter(action)).unwrap(),
            Some(Action::InputMode(true))
        );
        for c in text.chars() {
            assert_eq!(press(filters, KeyCode::Char(c)), None);
        }
        press(filters, KeyCode::Enter)
    }

    #[test]
    fn date_edits_are_staged_until_loaded() {
        let mut filters = Filters::new(DateRange::default(), PlatformFilter::All);

        assert_eq!(
            enter_date(&mut filters, FilterAction::EditStart, "2023-01-01"),
            Some(Action::InputMode(false))
        );
        assert!(!filters.is_focused());
        assert_eq!(filters.range.staged().start, Some(day(2023, 1, 1)));
        assert_eq!(filters.range.committed(), DateRange::default());

        assert_eq!(
            filters.update(Action::Filter(FilterAction::Load)).unwrap(),
            Some(Action::ApplyRange(DateRange::new(Some(day(2023, 1, 1)), None)))
        );
    }

    #[test]
    fn end_before_start_keeps_the_editor_open() {
        let mut filters = Filters::new(DateRange::default(), PlatformFilter::All);
        enter_date(&mut filters, FilterAction::EditStart, "2023-02-01");

        assert_eq!(enter_date(&mut filters, FilterAction::EditEnd, "2023-01-01"), None);
        assert!(filters.is_focused());
        assert!(filters.message.as_deref().unwrap().contains("2023-02-01"));
        assert_eq!(filters.range.staged().end, None);

        assert_eq!(press(&mut filters, KeyCode::Esc), Some(Action::InputMode(false)));
        assert!(!filters.is_focused());
    }

    #[test]
    fn inverted_range_is_not_loaded() {
        let mut filters = Filters::new(DateRange::default(), PlatformFilter::All);
        enter_date(&mut filters, FilterAction::EditEnd, "2023-01-10");
        enter_date(&mut filters, FilterAction::EditStart, "2023-02-01");

        assert_eq!(filters.update(Action::Filter(FilterAction::Load)).unwrap(), None);
        assert!(filters.message.is_some());
        assert_eq!(filters.range.committed(), DateRange::default());
    }

    #[test]
    fn malformed_dates_are_rejected() {
        let mut filters = Filters::new(DateRange::default(), PlatformFilter::All);
        assert_eq!(enter_date(&mut filters, FilterAction::EditStart, "yesterday"), None);
        assert_eq!(filters.range.staged(), DateRange::default());
    }

    #[test]
    fn future_dates_are_rejected() {
        let mut filters = Filters::new(DateRange::default(), PlatformFilter::All);
        let tomorrow = Utc::now().date_naive().succ_opt().unwrap().format(DATE_FORMAT).to_string();

        assert_eq!(enter_date(&mut filters, FilterAction::EditEnd, &tomorrow), None);
        assert!(filters.is_focused());
        assert!(filters.message.as_deref().unwrap().contains("in the future"));
        assert_eq!(filters.range.staged(), DateRange::default());
        press(&mut filters, KeyCode::Esc);

        let today = NaiveDate::from_ymd_opt(2023, 5, 1).unwrap();
        assert_eq!(parse_day("2023-05-01", today), Ok(Some(day(2023, 5, 1))));
        assert!(parse_day("2023-05-02", today).is_err());
    }

    #[test]
    fn same_day_range_is_loaded() {
        let mut filters = Filters::new(DateRange::default(), PlatformFilter::All);
        enter_date(&mut filters, FilterAction::EditStart, "2023-01-31");
        assert_eq!(
            enter_date(&mut filters, FilterAction::EditEnd, "2023-01-31"),
            Some(Action::InputMode(false))
        );

        let Some(Action::ApplyRange(range)) = filters.update(Action::Filter(FilterAction::Load)).unwrap() else {
            panic!("range was not applied");
        };
        assert_eq!(range.window().to_timestamp, Some(day(2023, 2, 1).timestamp()));
    }

    #[test]
    fn reset_publishes_the_empty_range() {
        let initial = DateRange::new(Some(day(2023, 1, 1)), Some(day(2023, 2, 1)));
        let mut filters = Filters::new(initial, PlatformFilter::All);
        assert_eq!(
            filters.update(Action::Filter(FilterAction::Reset)).unwrap(),
            Some(Action::ApplyRange(DateRange::default()))
        );
        assert!(!filters.range.has_pending_edits());
    }

    #[test]
    fn platform_choice_is_applied_right_away() {
        let (tx, mut rx) = unbounded_channel();
        let mut filters = Filters::new(DateRange::default(), PlatformFilter::All);
        filters.register_action_handler(tx).unwrap();

        assert_eq!(
            filters.update(Action::Filter(FilterAction::ChoosePlatform)).unwrap(),
            Some(Action::InputMode(true))
        );
        press(&mut filters, KeyCode::Down);
        assert_eq!(press(&mut filters, KeyCode::Enter), Some(Action::InputMode(false)));
        assert_eq!(rx.try_recv().unwrap(), Action::ApplyPlatform(PlatformFilter::Web));
    }

    #[test]
    fn hidden_on_the_logs_screen() {
        let mut filters = Filters::new(DateRange::default(), PlatformFilter::All);
        filters.update(Action::Activate(Screen::Logs)).unwrap();
        assert!(!filters.is_visible());
        assert_eq!(filters.update(Action::Filter(FilterAction::EditStart)).unwrap(), None);
    }
}

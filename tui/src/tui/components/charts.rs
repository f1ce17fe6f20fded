use crate::tui::{
    layout::header_filters_and_content,
    Action,
    Component,
    Screen,
    Theme,
};
use color_eyre::Result;
use eyre::bail;
use lens_apps_stats_core::{
    format_count,
    project_all,
    Catalog,
    ChartSeries,
};
use ratatui::{
    layout::{
        Constraint,
        Direction,
        Layout,
        Rect,
    },
    text::Line,
    widgets::{
        Bar,
        BarChart,
        BarGroup,
        Block,
        Paragraph,
    },
    Frame,
};

/// One horizontal bar chart per metric, bars in tracked order.
#[derive(Debug)]
pub struct Charts {
    visible: bool,
    catalog: Catalog,
    series: Vec<ChartSeries>,
}

impl Charts {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            visible: false,
            catalog,
            series: Vec::new(),
        }
    }
}

impl Component for Charts {
    fn is_visible(&self) -> bool {
        self.visible
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::Activate(screen) => self.visible = screen == Screen::Charts,
            Action::DashboardChanged(view) => {
                self.series = view
                    .snapshot
                    .map(|snapshot| project_all(&snapshot, &self.catalog))
                    .unwrap_or_default();
            }
            _ => {}
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame<'_>, area: Rect) -> Result<()> {
        let theme = Theme::default();
        let [_, _, area] = header_filters_and_content(area)?;

        if self.series.is_empty() {
            frame.render_widget(
                Paragraph::new("Charts appear once every app has reported.").block(Block::bordered().title("Charts")),
                area,
            );
            return Ok(());
        }

        let areas = Layout::default()
            .direction(Direction::Vertical)
            .constraints(self.series.iter().map(|_| Constraint::Ratio(1, self.series.len() as u32)))
            .split(area);
        if areas.len() != self.series.len() {
            bail!("Failed to split the area");
        }

        for (series, area) in self.series.iter().zip(areas.iter()) {
            let bars = series
                .labels
                .iter()
                .zip(&series.series)
                .zip(series.shares())
                .map(|((label, value), share)| {
                    Bar::default()
                        .label(Line::from(label.clone()))
                        .value(*value)
                        .text_value(format!("{} ({share:.1}%)", format_count(*value)))
                        .style(theme.bar)
                })
                .collect::<Vec<_>>();

            let chart = BarChart::default()
                .block(
                    Block::bordered()
                        .title(series.title())
                        .title_bottom(Line::from(format!(" total {} ", format_count(series.total()))).right_aligned()),
                )
                .direction(Direction::Horizontal)
                .bar_width(1)
                .bar_gap(0)
                .data(BarGroup::default().bars(&bars));
            frame.render_widget(chart, *area);
        }
        Ok(())
    }
}

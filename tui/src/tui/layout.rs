use eyre::{
    bail,
    Result,
};
use ratatui::{
    layout::{
        Constraint,
        Direction,
        Flex,
        Layout,
    },
    prelude::Rect,
};

/// Split the screen: main content and nav header
pub(crate) fn header_and_main_area(area: Rect) -> Result<[Rect; 2]> {
    let constraints = vec![
        Constraint::Max(2), // Header
        Constraint::Min(0), // Main area
    ];

    let [header_area, area] = *Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area)
    else {
        bail!("Failed to split the area");
    };

    Ok([header_area, area])
}

/// Split the screen: nav header, filter bar and content
pub(crate) fn header_filters_and_content(area: Rect) -> Result<[Rect; 3]> {
    let [header, area] = header_and_main_area(area)?;
    let [filters, content] = *Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area)
    else {
        bail!("Failed to split the area");
    };
    Ok([header, filters, content])
}

/// Centers a [`Rect`] within another [`Rect`] using the provided [`Constraint`]s.
pub(crate) fn center(area: Rect, horizontal: Constraint, vertical: Constraint) -> Rect {
    let [area] = Layout::horizontal([horizontal]).flex(Flex::Center).areas(area);
    let [area] = Layout::vertical([vertical]).flex(Flex::Center).areas(area);
    area
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn filter_bar_sits_between_header_and_content() {
        let [header, filters, content] = header_filters_and_content(Rect::new(0, 0, 80, 24)).unwrap();
        assert_eq!(header, Rect::new(0, 0, 80, 2));
        assert_eq!(filters, Rect::new(0, 2, 80, 3));
        assert_eq!(content, Rect::new(0, 5, 80, 19));
    }

    #[test]
    fn centers_popups() {
        let area = center(Rect::new(0, 0, 100, 21), Constraint::Length(40), Constraint::Length(3));
        assert_eq!(area, Rect::new(30, 9, 40, 3));
    }
}

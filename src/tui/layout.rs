use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Screen regions
pub struct AppLayout {
    pub header_area: Rect,
    pub body_area: Rect,
    pub history_area: Option<Rect>,
    pub status_area: Rect,
}

impl AppLayout {
    /// - Header: top row
    /// - Body: report (65% width when the history pane is shown)
    /// - History pane: 35% width on the right, optional
    /// - Status bar: bottom row
    pub fn new(area: Rect, show_history: bool) -> Self {
        let vertical_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Header
                Constraint::Min(3),    // Main area
                Constraint::Length(1), // Status bar
            ])
            .split(area);

        let main_area = vertical_chunks[1];
        let (body_area, history_area) = if show_history {
            let horizontal_chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
                .split(main_area);
            (horizontal_chunks[0], Some(horizontal_chunks[1]))
        } else {
            (main_area, None)
        };

        Self {
            header_area: vertical_chunks[0],
            body_area,
            history_area,
            status_area: vertical_chunks[2],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_without_history() {
        let area = Rect::new(0, 0, 100, 30);
        let layout = AppLayout::new(area, false);

        assert_eq!(layout.header_area.height, 1);
        assert_eq!(layout.header_area.y, 0);
        assert_eq!(layout.status_area.height, 1);
        assert_eq!(layout.status_area.y, 29);

        assert_eq!(layout.body_area.height, 28);
        assert_eq!(layout.body_area.width, 100);
        assert!(layout.history_area.is_none());
    }

    #[test]
    fn test_layout_with_history() {
        let area = Rect::new(0, 0, 100, 30);
        let layout = AppLayout::new(area, true);

        let history = layout.history_area.unwrap();
        assert_eq!(layout.body_area.width, 65);
        assert_eq!(history.width, 35);
        assert_eq!(history.x, 65);
        assert_eq!(history.height, 28);
    }

    #[test]
    fn test_layout_minimum_height() {
        let area = Rect::new(0, 0, 100, 5);
        let layout = AppLayout::new(area, false);

        assert_eq!(layout.header_area.height, 1);
        assert_eq!(layout.status_area.height, 1);
        assert_eq!(layout.body_area.height, 3);
    }
}

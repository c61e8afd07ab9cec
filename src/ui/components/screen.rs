use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::Widget,
};

use crate::{
    audio::view::PlayerSnapshot,
    ui::components::{
        controls::StatusWidget, item_list::ItemListWidget, progress::ProgressWidget,
    },
    util::colors,
};

pub struct PlayerScreen<'a> {
    snapshot: &'a PlayerSnapshot,
    selected: Option<usize>,
}

impl<'a> PlayerScreen<'a> {
    pub fn new(snapshot: &'a PlayerSnapshot, selected: Option<usize>) -> Self {
        Self { snapshot, selected }
    }
}

impl Widget for PlayerScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, Style::new().bg(colors::TRACK));

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(3)])
            .split(area);
        let footer = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(10), Constraint::Length(18)])
            .split(rows[1]);

        ItemListWidget::new(&self.snapshot.items, self.selected).render(rows[0], buf);
        ProgressWidget::new(self.snapshot).render(footer[0], buf);
        StatusWidget::new(self.snapshot).render(footer[1], buf);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        audio::{state::PlaybackState, view::ItemView},
        library::ItemId,
    };

    #[test]
    fn footer_shows_state_rate_and_elapsed() {
        let id = ItemId::from(9);
        let snapshot = PlayerSnapshot {
            items: vec![ItemView::active(
                id.clone(),
                "Gittin 10b".into(),
                false,
                Duration::from_secs(90),
                Some(Duration::from_secs(180)),
                0.75,
            )],
            state: PlaybackState::Paused,
            active: Some(id),
            position: Duration::from_secs(90),
            duration: Some(Duration::from_secs(180)),
            rate: 1.5,
        };
        let area = Rect::new(0, 0, 60, 8);
        let mut buf = Buffer::empty(area);

        PlayerScreen::new(&snapshot, Some(0)).render(area, &mut buf);

        let rendered: String = (0..area.height)
            .flat_map(|y| (0..area.width).map(move |x| (x, y)))
            .map(|pos| buf[pos].symbol().to_string())
            .collect();
        assert!(rendered.contains("paused"));
        assert!(rendered.contains("1.5x"));
        assert!(rendered.contains("01:30 / 03:00"));
        assert!(rendered.contains("Gittin 10b"));
    }
}

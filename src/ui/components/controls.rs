use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Stylize,
    symbols::{self, border},
    text::Line,
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::{audio::view::PlayerSnapshot, util::colors};

/// State and speed, shown next to the progress bar.
pub struct StatusWidget<'a> {
    snapshot: &'a PlayerSnapshot,
}

impl<'a> StatusWidget<'a> {
    pub fn new(snapshot: &'a PlayerSnapshot) -> Self {
        Self { snapshot }
    }
}

impl Widget for StatusWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let line = Line::from(vec![
            self.snapshot.state.label().fg(colors::TEXT),
            "  ".into(),
            format!("{}x", self.snapshot.rate).fg(colors::SELECTION),
        ]);

        let block = Block::default()
            .borders(Borders::TOP | Borders::BOTTOM | Borders::RIGHT)
            .border_set(border::Set {
                top_left: symbols::line::ROUNDED.horizontal_down,
                bottom_left: symbols::line::ROUNDED.horizontal_up,
                ..symbols::border::ROUNDED
            });

        Paragraph::new(line).block(block).centered().render(area, buf);
    }
}

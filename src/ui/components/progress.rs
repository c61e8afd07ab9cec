use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Style, Stylize},
    symbols::{self, border},
    text::ToSpan,
    widgets::{Block, Borders, Widget},
};

use crate::{
    audio::view::{PlayerSnapshot, elapsed_label, progress_ratio},
    ui::components::gauge::ProgressGauge,
    util::colors,
};

/// Bar for the active item, fed from the latest snapshot.
pub struct ProgressWidget<'a> {
    snapshot: &'a PlayerSnapshot,
}

impl<'a> ProgressWidget<'a> {
    pub fn new(snapshot: &'a PlayerSnapshot) -> Self {
        Self { snapshot }
    }
}

impl Widget for ProgressWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let active = self
            .snapshot
            .active
            .as_ref()
            .and_then(|id| self.snapshot.item(id));

        let (title, buffered) = match active {
            Some(view) => (format!(" {} {} ", view.glyph.symbol(), view.title), view.buffered),
            None => (" Nothing playing ".to_string(), 0.0),
        };

        let percent = progress_ratio(self.snapshot.position, self.snapshot.duration);
        let label = elapsed_label(self.snapshot.position, self.snapshot.duration);

        ProgressGauge::default()
            .block(
                Block::default()
                    .title_top(title)
                    .title_alignment(Alignment::Center)
                    .borders(Borders::ALL)
                    .border_set(border::Set {
                        top_right: symbols::line::ROUNDED.horizontal_down,
                        bottom_right: symbols::line::ROUNDED.horizontal_up,
                        ..symbols::border::ROUNDED
                    }),
            )
            .ratios(percent, buffered)
            .label(label.to_span().fg(Color::White))
            .played_style(Style::default().fg(colors::PLAYED).bg(colors::BUFFERED))
            .buffered_style(Style::default().fg(colors::BUFFERED).bg(colors::TRACK))
            .remaining_style(Style::default().fg(colors::TRACK).bg(colors::TRACK))
            .render(area, buf);
    }
}

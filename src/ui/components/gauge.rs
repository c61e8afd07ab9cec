use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    symbols,
    text::Span,
    widgets::{Block, Widget},
};

/// Horizontal bar with a played part, a buffered part and a centered label.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ProgressGauge<'a> {
    block: Option<Block<'a>>,
    played_ratio: f64,
    buffered_ratio: f64,
    label: Option<Span<'a>>,
    played_style: Style,
    buffered_style: Style,
    remaining_style: Style,
}

impl<'a> ProgressGauge<'a> {
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Ratios outside `0.0..=1.0` are clamped.
    pub fn ratios(mut self, played: f64, buffered: f64) -> Self {
        self.played_ratio = played.clamp(0.0, 1.0);
        self.buffered_ratio = buffered.clamp(0.0, 1.0).max(self.played_ratio);
        self
    }

    pub fn label<T>(mut self, label: T) -> Self
    where
        T: Into<Span<'a>>,
    {
        self.label = Some(label.into());
        self
    }

    pub fn played_style<S: Into<Style>>(mut self, style: S) -> Self {
        self.played_style = style.into();
        self
    }

    pub fn buffered_style<S: Into<Style>>(mut self, style: S) -> Self {
        self.buffered_style = style.into();
        self
    }

    pub fn remaining_style<S: Into<Style>>(mut self, style: S) -> Self {
        self.remaining_style = style.into();
        self
    }
}

fn partial_block(frac: f64) -> &'static str {
    match (frac * 8.0).round() as u16 {
        0 => " ",
        1 => symbols::block::ONE_EIGHTH,
        2 => symbols::block::ONE_QUARTER,
        3 => symbols::block::THREE_EIGHTHS,
        4 => symbols::block::HALF,
        5 => symbols::block::FIVE_EIGHTHS,
        6 => symbols::block::THREE_QUARTERS,
        7 => symbols::block::SEVEN_EIGHTHS,
        _ => symbols::block::FULL,
    }
}

impl Widget for ProgressGauge<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if let Some(ref block) = self.block {
            block.render(area, buf);
        }

        let inner = self.block.as_ref().map_or(area, |b| b.inner(area));
        if inner.is_empty() {
            return;
        }

        let width = inner.width as f64;
        let played_pos = width * self.played_ratio;
        let buffered_pos = width * self.buffered_ratio;

        for y in inner.top()..inner.bottom() {
            for x in inner.left()..inner.right() {
                let pos = (x - inner.left()) as f64;

                let (symbol, style) = if pos < played_pos {
                    let symbol = if pos + 1.0 > played_pos {
                        partial_block(played_pos - pos)
                    } else {
                        symbols::block::FULL
                    };
                    (symbol, self.played_style)
                } else if pos < buffered_pos {
                    (symbols::block::FULL, self.buffered_style)
                } else {
                    (" ", self.remaining_style)
                };

                buf[(x, y)]
                    .set_symbol(symbol)
                    .set_fg(style.fg.unwrap_or_default())
                    .set_bg(style.bg.unwrap_or_default());
            }
        }

        if let Some(label) = self.label.as_ref() {
            let label_width = (label.width() as u16).min(inner.width);
            let label_col = inner.left() + (inner.width - label_width) / 2;
            let label_row = inner.top() + inner.height / 2;
            buf.set_span(label_col, label_row, label, label_width);
        }
    }
}

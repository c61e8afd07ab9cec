use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, StatefulWidget},
};

use crate::{audio::view::ItemView, util::colors};

/// One row per registered item: glyph, title and the `elapsed / duration`
/// label. Non-interactive items are dimmed.
pub struct ItemListWidget<'a> {
    items: &'a [ItemView],
    selected: Option<usize>,
}

impl<'a> ItemListWidget<'a> {
    pub fn new(items: &'a [ItemView], selected: Option<usize>) -> Self {
        Self { items, selected }
    }

    fn row(view: &ItemView, width: u16) -> ListItem<'_> {
        let glyph = Span::raw(format!(" {} ", view.glyph.symbol()));
        let label_width = view.label.chars().count() as u16 + 1;
        let title_width = width.saturating_sub(label_width + 4) as usize;
        let title: String = view.title.chars().take(title_width).collect();
        let padding = title_width.saturating_sub(title.chars().count());

        let line = Line::from(vec![
            glyph,
            Span::raw(title),
            Span::raw(" ".repeat(padding)),
            Span::raw(format!(" {}", view.label)),
        ]);

        let style = if !view.interactive {
            Style::default().fg(colors::DIMMED).add_modifier(Modifier::ITALIC)
        } else if view.is_playing() {
            Style::default().fg(colors::PLAYED).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(colors::TEXT)
        };
        ListItem::new(line).style(style)
    }
}

impl ratatui::widgets::Widget for ItemListWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default().borders(Borders::ALL).title(" Shiurim ");
        let inner_width = block.inner(area).width;
        let rows: Vec<ListItem> = self
            .items
            .iter()
            .map(|view| Self::row(view, inner_width))
            .collect();

        let list = List::new(rows)
            .block(block)
            .highlight_style(Style::default().fg(colors::SELECTION).reversed());

        let mut state = ListState::default().with_selected(self.selected);
        StatefulWidget::render(list, area, buf, &mut state);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use ratatui::widgets::Widget;

    use super::*;
    use crate::library::ItemId;

    fn text(buf: &Buffer) -> String {
        let area = buf.area;
        (area.top()..area.bottom())
            .map(|y| {
                (area.left()..area.right())
                    .map(|x| buf[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn rows_show_glyph_title_and_label() {
        let items = vec![
            ItemView::active(
                ItemId::from(1),
                "Berachos 2a".into(),
                true,
                Duration::from_secs(61),
                None,
                0.0,
            ),
            ItemView::unavailable(ItemId::from(2), "Shmuez".into(), None),
        ];
        let area = Rect::new(0, 0, 50, 4);
        let mut buf = Buffer::empty(area);

        ItemListWidget::new(&items, Some(0)).render(area, &mut buf);

        let rendered = text(&buf);
        assert!(rendered.contains("⏸"));
        assert!(rendered.contains("Berachos 2a"));
        assert!(rendered.contains("01:01 / --:--"));
        assert!(rendered.contains("✕"));
        assert!(rendered.contains("Shmuez"));
        assert!(rendered.contains("Format not supported"));
    }
}

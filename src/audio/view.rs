//! Per-item presentation computed on every refresh pass. Front-ends only
//! draw what is in a [`PlayerSnapshot`].

use std::time::Duration;

use crate::{audio::state::PlaybackState, library::ItemId};

pub const DURATION_PLACEHOLDER: &str = "--:--";
pub const UNSUPPORTED_LABEL: &str = "Format not supported";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    Play,
    Pause,
    Unavailable,
}

impl Glyph {
    pub fn symbol(self) -> &'static str {
        match self {
            Glyph::Play => "▶",
            Glyph::Pause => "⏸",
            Glyph::Unavailable => "✕",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemView {
    pub id: ItemId,
    pub title: String,
    pub glyph: Glyph,
    pub interactive: bool,
    /// Fill of the progress bar, `0.0..=1.0`.
    pub progress: f64,
    pub buffered: f64,
    pub label: String,
}

impl ItemView {
    pub fn idle(id: ItemId, title: String) -> Self {
        Self {
            id,
            title,
            glyph: Glyph::Play,
            interactive: true,
            progress: 0.0,
            buffered: 0.0,
            label: elapsed_label(Duration::ZERO, None),
        }
    }

    /// Non-interactive row. The label names the extension when there is one.
    pub fn unavailable(id: ItemId, title: String, extension: Option<&str>) -> Self {
        let label = match extension {
            Some(ext) => format!("Cannot play .{ext} files"),
            None => UNSUPPORTED_LABEL.to_string(),
        };
        Self {
            id,
            title,
            glyph: Glyph::Unavailable,
            interactive: false,
            progress: 0.0,
            buffered: 0.0,
            label,
        }
    }

    pub fn active(
        id: ItemId,
        title: String,
        playing: bool,
        position: Duration,
        duration: Option<Duration>,
        buffered: f64,
    ) -> Self {
        Self {
            id,
            title,
            glyph: if playing { Glyph::Pause } else { Glyph::Play },
            interactive: true,
            progress: progress_ratio(position, duration),
            buffered: buffered.clamp(0.0, 1.0),
            label: elapsed_label(position, duration),
        }
    }

    pub fn is_playing(&self) -> bool {
        self.glyph == Glyph::Pause
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlayerSnapshot {
    pub items: Vec<ItemView>,
    pub state: PlaybackState,
    pub active: Option<ItemId>,
    pub position: Duration,
    pub duration: Option<Duration>,
    pub rate: f32,
}

impl PlayerSnapshot {
    pub fn item(&self, id: &ItemId) -> Option<&ItemView> {
        self.items.iter().find(|view| &view.id == id)
    }

    pub fn playing_items(&self) -> impl Iterator<Item = &ItemView> {
        self.items.iter().filter(|view| view.is_playing())
    }
}

pub fn progress_ratio(position: Duration, duration: Option<Duration>) -> f64 {
    match duration {
        Some(total) if !total.is_zero() => {
            (position.as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0)
        }
        _ => 0.0,
    }
}

pub fn elapsed_label(position: Duration, duration: Option<Duration>) -> String {
    let total = duration.map_or_else(|| DURATION_PLACEHOLDER.to_string(), format_timestamp);
    format!("{} / {}", format_timestamp(position), total)
}

pub fn format_timestamp(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

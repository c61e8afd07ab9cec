use crate::{audio::view::PlayerSnapshot, library::ItemId};

#[derive(Debug, Clone)]
#[allow(clippy::large_enum_variant)]
pub enum Event {
    Refreshed(PlayerSnapshot),
    ItemStarted(ItemId),
    ItemPaused(ItemId),
    ItemEnded(ItemId),
    LoadTimedOut(ItemId),
    PlaybackError(String),
}

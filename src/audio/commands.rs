use crate::library::{ItemId, PlayableItem};

#[derive(Debug, Clone)]
pub enum PlayerCommand {
    Register(Vec<PlayableItem>),
    Play(ItemId),
    TogglePlayPause,
    SkipBy(f64),
    SeekTo(f64),
    SetRate(f32),
    Stop,
    Shutdown,
}

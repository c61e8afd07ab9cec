/// What a key press asks the player to do.
#[derive(Debug, Clone, PartialEq)]
pub enum AppMessage {
    Quit,
    SelectNext,
    SelectPrevious,
    PlaySelected,
    TogglePlayPause,
    SeekForward,
    SeekBackward,
    /// Tenths of the duration, `0..=9`.
    SeekToTenth(u8),
    FasterRate,
    SlowerRate,
    Stop,
}

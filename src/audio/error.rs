use std::time::Duration;

use thiserror::Error;

use crate::library::ItemId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AudioError {
    #[error("Audio output device error: {0}")]
    DeviceError(String),

    #[error("Stream error: {0}")]
    StreamError(String),

    #[error("Decoding error: {0}")]
    DecodingError(String),

    #[error("Item not found: {0}")]
    UnknownItem(ItemId),

    #[error("Format {mime} is not supported for {id}")]
    UnsupportedFormat { id: ItemId, mime: String },

    #[error("Playback rate {0} is not one of the allowed speeds")]
    UnsupportedRate(f32),

    #[error("Seek fraction {0} is outside 0..=1")]
    InvalidSeekFraction(f64),

    #[error("Skip delta {0} is not a finite number of seconds")]
    InvalidSkipDelta(f64),

    #[error("Duration of the active item is not known yet")]
    DurationUnknown,

    #[error("No item is active")]
    NoActiveItem,

    #[error("Invalid stream locator: {0}")]
    InvalidLocator(String),

    #[error("Metadata for {id} did not arrive within {waited:?}")]
    LoadTimedOut { id: ItemId, waited: Duration },

    #[error("Player channel closed")]
    ChannelClosed,
}

pub mod colors;
#[cfg(feature = "playback")]
pub mod hook;
pub mod log;

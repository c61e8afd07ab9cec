pub mod commands;
pub mod config;
pub mod controller;
pub mod error;
#[cfg(feature = "playback")]
pub mod playback;
pub mod probe;
pub mod progress;
pub mod state;
pub mod system;
#[cfg(test)]
pub(crate) mod testing;
pub mod traits;
pub mod view;

//! Recordings as the player sees them: an identifier, a title and a way to
//! reach the audio bytes on the ShiurBank streaming endpoint.

mod item;
mod locator;

pub use item::{ItemId, PlayableItem};
pub use locator::{StreamLocator, content_type_for};

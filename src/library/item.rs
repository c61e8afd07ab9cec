use std::{borrow::Cow, fmt};

use reqwest::Url;

use crate::{
    audio::error::AudioError,
    library::locator::{StreamLocator, content_type_for},
};

/// Identifier of a recording. The backend hands out numeric ids, pages that
/// list raw bucket files use the file name instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<i64> for ItemId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayableItem {
    pub id: ItemId,
    pub title: String,
    pub locator: StreamLocator,
    pub mime_type: Option<String>,
}

impl PlayableItem {
    pub fn new(id: impl Into<ItemId>, title: impl Into<String>, locator: StreamLocator) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            locator,
            mime_type: None,
        }
    }

    /// Item for a file passed on the command line; the file name doubles as
    /// the id and its stem as the title.
    pub fn from_arg(arg: &str, series_id: Option<i64>) -> Self {
        let locator = StreamLocator::from_arg(arg, series_id);
        let file_name = locator.file_name();
        let title = match file_name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem.to_string(),
            _ => file_name.clone(),
        };
        Self::new(file_name, title, locator)
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// MIME type handed to the format probe. Falls back to the file
    /// extension when none was given.
    pub fn content_type(&self) -> Cow<'_, str> {
        match &self.mime_type {
            Some(mime) => Cow::Borrowed(mime.as_str()),
            None => Cow::Borrowed(content_type_for(&self.locator.file_name())),
        }
    }

    /// Lowercased extension of the file behind the locator, if it has one.
    pub fn extension(&self) -> Option<String> {
        let file_name = self.locator.file_name();
        match file_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext.to_lowercase()),
            _ => None,
        }
    }

    pub fn stream_url(&self, base: &Url) -> Result<Url, AudioError> {
        self.locator.resolve(base)
    }
}

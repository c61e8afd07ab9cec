use reqwest::Url;

use crate::audio::error::AudioError;

/// Where the bytes of a recording live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamLocator {
    /// Fully resolved URL, used as is.
    Url(String),
    /// File in the shared audio bucket, served by `/api/audio/stream/{file}`.
    Bucket { file_name: String },
    /// File in a series bucket, served by
    /// `/api/audio/series/{series}/stream/{file}`.
    Series { series_id: i64, file_name: String },
}

impl StreamLocator {
    pub fn url(url: impl Into<String>) -> Self {
        Self::Url(url.into())
    }

    pub fn bucket(file_name: impl Into<String>) -> Self {
        Self::Bucket {
            file_name: file_name.into(),
        }
    }

    pub fn series(series_id: i64, file_name: impl Into<String>) -> Self {
        Self::Series {
            series_id,
            file_name: file_name.into(),
        }
    }

    /// Interprets a command-line argument: full URLs are kept, anything else
    /// is a file name in the series bucket when a series is given, or in the
    /// shared bucket otherwise.
    pub fn from_arg(arg: &str, series_id: Option<i64>) -> Self {
        if arg.starts_with("http://") || arg.starts_with("https://") {
            return Self::url(arg);
        }
        match series_id {
            Some(series_id) => Self::series(series_id, arg),
            None => Self::bucket(arg),
        }
    }

    pub fn file_name(&self) -> String {
        match self {
            Self::Url(url) => url
                .split(['?', '#'])
                .next()
                .and_then(|path| path.rsplit('/').next())
                .unwrap_or_default()
                .to_string(),
            Self::Bucket { file_name } | Self::Series { file_name, .. } => file_name.clone(),
        }
    }

    /// Resolves the locator against the server base URL. The file name is
    /// escaped as a single path segment.
    pub fn resolve(&self, base: &Url) -> Result<Url, AudioError> {
        let (series, file_name) = match self {
            Self::Url(url) => {
                return Url::parse(url)
                    .map_err(|e| AudioError::InvalidLocator(format!("{url}: {e}")));
            }
            Self::Bucket { file_name } => (None, file_name),
            Self::Series {
                series_id,
                file_name,
            } => (Some(series_id.to_string()), file_name),
        };

        if file_name.is_empty() {
            return Err(AudioError::InvalidLocator("empty file name".into()));
        }

        let mut url = base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| AudioError::InvalidLocator(format!("{base} cannot be a base")))?;
            segments.pop_if_empty().extend(["api", "audio"]);
            if let Some(series) = &series {
                segments.extend(["series", series.as_str()]);
            }
            segments.extend(["stream", file_name.as_str()]);
        }
        url.set_query(None);
        url.set_fragment(None);

        Ok(url)
    }
}

/// MIME type used to probe a file before offering it for playback. Opus
/// files are announced with their Ogg container and codec so a probe that
/// only decodes Vorbis can turn them down.
pub fn content_type_for(file_name: &str) -> &'static str {
    let lower = file_name.to_lowercase();
    let extension = lower.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");

    match extension {
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" | "oga" => "audio/ogg",
        "opus" => "audio/ogg; codecs=\"opus\"",
        "m4a" | "mp4" | "m4b" => "audio/mp4",
        "aac" => "audio/aac",
        "flac" => "audio/flac",
        "webm" | "weba" => "audio/webm",
        "3gp" => "audio/3gpp",
        "amr" => "audio/amr",
        "aiff" | "aif" => "audio/aiff",
        "wma" => "audio/x-ms-wma",
        _ => "audio/mpeg",
    }
}

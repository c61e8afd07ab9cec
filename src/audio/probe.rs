use std::collections::HashMap;

use crate::audio::traits::FormatProbe;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatSupport {
    No,
    Maybe,
    Probably,
}

impl FormatSupport {
    pub fn is_supported(self) -> bool {
        !matches!(self, FormatSupport::No)
    }
}

/// Answers from a fixed table of MIME types. A `codecs` parameter is looked
/// up as `type; codecs=name` first and falls back to the bare type; other
/// parameters are ignored.
#[derive(Debug, Clone, Default)]
pub struct StaticFormatProbe {
    verdicts: HashMap<String, FormatSupport>,
}

impl StaticFormatProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, mime: &str, support: FormatSupport) -> Self {
        let (essence, codecs) = split_mime(mime);
        self.verdicts.insert(verdict_key(&essence, codecs.as_deref()), support);
        self
    }

    pub fn probably<'a>(mut self, mimes: impl IntoIterator<Item = &'a str>) -> Self {
        for mime in mimes {
            self = self.with(mime, FormatSupport::Probably);
        }
        self
    }
}

impl FormatProbe for StaticFormatProbe {
    fn can_play_type(&self, mime: &str) -> FormatSupport {
        let (essence, codecs) = split_mime(mime);
        codecs
            .and_then(|codecs| self.verdicts.get(&verdict_key(&essence, Some(codecs.as_str()))))
            .or_else(|| self.verdicts.get(&essence))
            .copied()
            .unwrap_or(FormatSupport::No)
    }
}

fn split_mime(mime: &str) -> (String, Option<String>) {
    let mut parts = mime.split(';');
    let essence = parts.next().unwrap_or_default().trim().to_lowercase();
    let codecs = parts.find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("codecs")
            .then(|| value.trim().trim_matches('"').to_lowercase())
    });
    (essence, codecs)
}

fn verdict_key(essence: &str, codecs: Option<&str>) -> String {
    match codecs {
        Some(codecs) => format!("{essence}; codecs={codecs}"),
        None => essence.to_string(),
    }
}

//! Validation Report
//!
//! Typed model of the checker's JSON output, see
//! <https://github.com/validator/validator/wiki/Output-%C2%BB-JSON>.
//!
//! Raw records carry a two-level classification (`type` plus an optional
//! `subType`). It is folded into a single [`MessageKind`] while decoding so
//! reporters never have to look at the raw pair again.

use serde::{Deserialize, Serialize};

/// Normalized kind of a checker message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageKind {
    Error,
    Warning,
    Info,
    NonDocumentError,
}

impl MessageKind {
    /// Classify a raw `type`/`subType` pair.
    pub fn classify(raw: RawType, sub_type: Option<&str>) -> Self {
        match raw {
            RawType::Error => MessageKind::Error,
            RawType::NonDocumentError => MessageKind::NonDocumentError,
            RawType::Info if sub_type == Some("warning") => MessageKind::Warning,
            RawType::Info => MessageKind::Info,
        }
    }

    /// Upper-case label used in rendered output
    pub fn label(self) -> &'static str {
        match self {
            MessageKind::Error => "ERROR",
            MessageKind::Warning => "WARNING",
            MessageKind::Info => "INFO",
            MessageKind::NonDocumentError => "NON-DOCUMENT-ERROR",
        }
    }

    /// Errors and non-document errors
    pub fn is_error(self) -> bool {
        matches!(self, MessageKind::Error | MessageKind::NonDocumentError)
    }
}

/// `type` field as emitted by the checker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RawType {
    Error,
    Info,
    NonDocumentError,
}

/// Highlighted range inside the extract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Highlight {
    pub start: u32,
    pub length: u32,
}

/// Where a message points to
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub url: Option<String>,
    pub first_line: Option<u32>,
    pub last_line: Option<u32>,
    pub first_column: Option<u32>,
    pub last_column: Option<u32>,
    pub highlight: Option<Highlight>,
}

impl Location {
    /// Url with the `file:` scheme prefix removed
    pub fn display_url(&self) -> &str {
        let url = self.url.as_deref().unwrap_or("");
        url.strip_prefix("file:").unwrap_or(url)
    }
}

/// A single diagnostic emitted by the checker
///
/// Serializes in this normalized shape; the checker's wire shape is only
/// accepted through [`ValidationReport::from_json`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationMessage {
    pub kind: MessageKind,
    pub text: Option<String>,
    pub snippet: Option<String>,
    pub location: Option<Location>,
    pub offset: Option<u32>,
}

/// Wire shape of a message; every field but `type` may be missing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMessage {
    #[serde(rename = "type")]
    raw_type: RawType,
    sub_type: Option<String>,
    message: Option<String>,
    extract: Option<String>,
    offset: Option<u32>,
    url: Option<String>,
    first_line: Option<u32>,
    last_line: Option<u32>,
    first_column: Option<u32>,
    last_column: Option<u32>,
    hilite_start: Option<u32>,
    hilite_length: Option<u32>,
}

impl From<RawMessage> for ValidationMessage {
    fn from(raw: RawMessage) -> Self {
        let kind = MessageKind::classify(raw.raw_type, raw.sub_type.as_deref());

        let highlight = match (raw.hilite_start, raw.hilite_length) {
            (Some(start), Some(length)) => Some(Highlight { start, length }),
            _ => None,
        };

        let location = if raw.url.is_some() || raw.last_line.is_some() || raw.first_column.is_some()
        {
            Some(Location {
                url: raw.url,
                first_line: raw.first_line,
                last_line: raw.last_line,
                first_column: raw.first_column,
                last_column: raw.last_column,
                highlight,
            })
        } else {
            None
        };

        Self {
            kind,
            text: raw.message,
            snippet: raw.extract,
            location,
            offset: raw.offset,
        }
    }
}

/// Source document echoed back by the checker when requested
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub code: String,
    #[serde(rename = "type")]
    pub content_type: Option<String>,
    pub encoding: Option<String>,
}

/// Decoded output of one checker invocation
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ValidationReport {
    /// Messages in emission order
    pub messages: Vec<ValidationMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Wire shape of the whole report
#[derive(Debug, Deserialize)]
struct RawReport {
    messages: Vec<RawMessage>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    source: Option<Source>,
    #[serde(default)]
    language: Option<String>,
}

impl From<RawReport> for ValidationReport {
    fn from(raw: RawReport) -> Self {
        Self {
            messages: raw.messages.into_iter().map(ValidationMessage::from).collect(),
            url: raw.url,
            source: raw.source,
            language: raw.language,
        }
    }
}

impl ValidationReport {
    /// Parse the checker's JSON document.
    pub fn from_json(input: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<RawReport>(input).map(Self::from)
    }

    /// Messages of one kind, in emission order
    pub fn of_kind(&self, kind: MessageKind) -> impl Iterator<Item = &ValidationMessage> {
        self.messages.iter().filter(move |m| m.kind == kind)
    }

    pub fn count(&self, kind: MessageKind) -> usize {
        self.of_kind(kind).count()
    }

    /// No errors, warnings or non-document errors
    pub fn is_clean(&self) -> bool {
        !self
            .messages
            .iter()
            .any(|m| m.kind != MessageKind::Info)
    }
}

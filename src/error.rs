use thiserror::Error;

/// Fatal failure while turning one transcript into statements.
///
/// Any of these aborts the whole document: there is no recovery mid-walk, and
/// the caller decides whether to skip the document or flag it for review.
#[derive(Debug, Error)]
pub enum AlpheusError {
    #[error("I don't know how to handle tag {0:?}")]
    UnknownTag(String),

    #[error("Trying to save a statement without content")]
    EmptyStatement,

    #[error("required metadata item {0:?} is missing")]
    MissingMetadata(&'static str),

    #[error("metadata item {field:?} has unusable value {value:?}")]
    InvalidMetadata { field: &'static str, value: String },

    #[error("document has no <{0}> element")]
    MissingElement(&'static str),

    #[error("attribute {attr:?} on <{tag}> has unusable value {value:?}")]
    InvalidAttribute {
        tag: String,
        attr: &'static str,
        value: String,
    },

    #[error("unexpected document structure: {0}")]
    Structure(String),

    #[error("malformed XML: {0}")]
    Xml(String),
}

impl From<quick_xml::Error> for AlpheusError {
    fn from(err: quick_xml::Error) -> Self {
        AlpheusError::Xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for AlpheusError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        AlpheusError::Xml(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no document at {0}")]
    NotFound(String),

    #[error("HTTP error {status} fetching {url}")]
    Status { status: u16, url: String },

    #[error("network error fetching {url}: {message}")]
    Network { url: String, message: String },
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    Parse(#[from] AlpheusError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("store failure: {0}")]
    Store(String),

    #[error("English and French documents disagree on source id ({en} vs {fr})")]
    SourceMismatch { en: i64, fr: i64 },

    #[error("document at source id {source_id} already exists but not sitting {sitting}")]
    DuplicateSource { source_id: i64, sitting: u32 },
}

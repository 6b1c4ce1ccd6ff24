pub mod configs;
pub mod dom;
pub mod error;
pub mod import;
pub mod runtime;
pub mod text;
pub mod transcript;
pub mod types;

pub use error::{AlpheusError, FetchError, ImportError};
pub use transcript::{parse_bytes, parse_str, DraftStatement, ParsedDocument};

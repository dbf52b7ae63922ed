//! Fatal parser errors. Anything recoverable becomes a parse warning instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    /// The document is not well-formed XML.
    #[error("malformed XML at byte {position}: {message}")]
    Malformed { position: u64, message: String },

    /// The document contains no elements.
    #[error("document contains no XML elements")]
    Empty,

    /// The root element cannot hold activities.
    #[error("unsupported root element <{name}>")]
    UnsupportedRoot { name: String },

    /// An `<iati-activities>` wrapper without any `<iati-activity>`.
    #[error("no <iati-activity> element found")]
    NoActivity,

    #[error("document is not valid UTF-8 at byte {position}")]
    InvalidUtf8 { position: u64 },
}

pub type Result<T> = std::result::Result<T, ParseError>;

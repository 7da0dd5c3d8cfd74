//! Error types
//!
//! Malformed or truncated XML is never reported here: the streamer simply
//! stops returning nodes once it cannot make progress.

use thiserror::Error;

/// Errors raised by parsers, chunk providers and streamers
#[derive(Debug, Error)]
pub enum Error {
    /// The named-element strategy was configured without an element name
    #[error("required option 'element_name' is not set")]
    MissingElementName,

    /// A rewind was attempted on a provider that cannot seek
    #[error("attempted to rewind an unseekable stream")]
    NotSeekable,

    /// The container accessor was called without container extraction enabled
    #[error("this method requires the 'extract_container' option to be true")]
    ContainerNotEnabled,

    /// The scanner isolated a span the classifier does not recognise
    #[error("internal error: unclassifiable tag span {0:?}")]
    UnclassifiedTag(String),

    /// I/O failure in a chunk provider
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn unclassified(span: &[u8]) -> Self {
        Error::UnclassifiedTag(String::from_utf8_lossy(span).into_owned())
    }

    /// Short machine-friendly reason, used for `{:error, reason}` terms
    pub fn reason(&self) -> &'static str {
        match self {
            Error::MissingElementName => "missing_element_name",
            Error::NotSeekable => "not_seekable",
            Error::ContainerNotEnabled => "container_not_enabled",
            Error::UnclassifiedTag(_) => "unclassified_tag",
            Error::Io { .. } => "io_error",
        }
    }
}

//! Fatal pipeline errors.
//!
//! Every variant terminates a conversion run. Cleanup passes never fail, so
//! they have no variant here.

use thiserror::Error;

/// Errors raised while converting an export archive into an email body.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("corrupt archive: {0}")]
    CorruptArchive(#[from] ArchiveError),

    #[error("archive does not contain an html document")]
    NoHtmlEntry,

    #[error("multiple html documents in export, not supported (`{first}`, `{second}`)")]
    MultipleHtmlEntries { first: String, second: String },

    #[error("failed inlining styles: {0}")]
    Inlining(String),
}

/// Reasons an archive could not be decoded.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("not a readable zip container")]
    Container(#[source] zip::result::ZipError),

    #[error("failed to open entry #{index}")]
    Open {
        index: usize,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("failed to decompress `{name}`")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("duplicate entry name `{0}`")]
    DuplicateName(String),
}

impl PipelineError {
    /// Short category label used by the CLI when reporting a failed run.
    pub const fn category(&self) -> &'static str {
        match self {
            Self::CorruptArchive(_) => "corrupt-archive",
            Self::NoHtmlEntry => "no-html-entry",
            Self::MultipleHtmlEntries { .. } => "multiple-html-entries",
            Self::Inlining(_) => "inlining",
        }
    }
}

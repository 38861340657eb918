//! Error taxonomy for the declaration generator.
//!
//! Three failure layers, each fatal for the run it occurs in:
//! configuration conflicts (rejected before any run starts), metadata query
//! failures (the provider cannot answer a structural question), and output
//! sink failures. [`GenerateError`] folds all of them for callers of the
//! emission driver.

use crate::provider::TypeRef;

/// Configuration construction failure. A config that fails to build never
/// reaches a generation run.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The same type was added to both the include and exclude sets.
    #[error("type {0:?} is present in both the include and exclude sets")]
    ConflictingType(TypeRef),

    /// The same name pattern was added to both the include and exclude sets.
    #[error("name pattern `{0}` is present in both the include and exclude sets")]
    ConflictingPattern(String),

    /// A name pattern is not a valid regular expression.
    #[error("invalid name pattern `{pattern}`")]
    InvalidPattern {
        /// The offending pattern text.
        pattern: String,
        /// The underlying regex parse error.
        #[source]
        source: regex::Error,
    },
}

/// The metadata provider could not answer a structural query.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    /// A handle that the provider never minted.
    #[error("unknown type reference {0:?}")]
    UnknownType(TypeRef),

    /// Member enumeration was requested for a type without named members.
    #[error("`{0}` is not a composite type")]
    NotComposite(String),

    /// Enum member enumeration was requested for a non-enum type.
    #[error("`{0}` is not an enum type")]
    NotEnum(String),

    /// A sequence-shaped type supplied no generic argument at any level of
    /// its inheritance chain, so no element type can be determined.
    #[error("no element type for collection `{0}`: no generic argument found on the type or any of its ancestors")]
    MissingElementType(String),
}

/// The output sink could not open, write, or close a stream.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// Opening a stream failed.
    #[error("failed to open output stream `{stream_id}`")]
    Open {
        /// The stream that could not be opened.
        stream_id: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Writing to the open stream failed.
    #[error("failed to write to output stream `{stream_id}`")]
    Write {
        /// The stream that could not be written.
        stream_id: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Flushing/closing the open stream failed.
    #[error("failed to close output stream `{stream_id}`")]
    Close {
        /// The stream that could not be closed.
        stream_id: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A write or close was issued with no stream open.
    #[error("no output stream is open")]
    NotOpen,
}

/// Any failure surfaced by a generation run. There is no local recovery:
/// the first error fails the whole run and the known-type set is left in its
/// accumulated state for caller inspection.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// Configuration conflict or invalid pattern.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Metadata provider failure during root collection, discovery, or
    /// rendering.
    #[error("metadata query failed: {0}")]
    Metadata(#[from] MetadataError),

    /// Output sink failure.
    #[error("output sink failed: {0}")]
    Sink(#[from] SinkError),
}

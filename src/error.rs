//! Error types shared across the crate.
//!
//! Identifier decoding fails loudly; everything on the encode side is
//! total and degrades silently (see the crate docs). The only other
//! loud failure is a malformed evaluation context.

use std::num::ParseIntError;
use thiserror::Error;

/// Errors returned by trace-wire operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TraceWireError {
    /// A span or trace identifier could not be parsed from its hex wire
    /// form.
    #[error("invalid hex identifier {value:?}: {source}")]
    InvalidId {
        /// The string that failed to parse.
        value: String,
        /// The underlying integer parse failure.
        #[source]
        source: ParseIntError,
    },

    /// A caller-supplied argument or ambient state was inconsistent,
    /// e.g. an evaluation context without a request id.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type for trace-wire operations.
pub type TraceWireResult<T> = Result<T, TraceWireError>;

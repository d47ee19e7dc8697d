//! The crate-wide error type.

use std::io;
use std::path::PathBuf;

use safeline_core::Cancelled;
use safeline_layout::AnchorError;

/// Errors surfaced by safeline.
///
/// Runtime screen problems never reach the caller as errors: an invalid
/// resolution skips one anchor update and an unready source defers polling.
/// What remains are cancelled waits and configuration mistakes.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A wait was cancelled before its condition held.
    #[error(transparent)]
    Cancelled(#[from] Cancelled),
    /// Anchors could not be computed for a snapshot.
    ///
    /// [`SafeAreaHost`](crate::SafeAreaHost) recovers from this on its own.
    /// The variant lets callers of [`anchors_for`](crate::anchors_for) use `?`
    /// inside functions returning [`Result`].
    #[error(transparent)]
    Anchor(#[from] AnchorError),
    /// A configuration file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// The file that was being read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// A configuration document could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
    /// A blank fraction lies outside `[0, 1]`.
    #[error("blank fraction for the {edge} edge must be within [0, 1], got {value}")]
    BlankOutOfRange {
        /// The offending edge.
        edge: &'static str,
        /// The rejected value.
        value: f32,
    },
}

/// Result alias using [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

impl Error {
    /// Returns `true` if this is a cancellation.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}

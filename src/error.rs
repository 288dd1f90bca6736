use semver::Version;
use thiserror::Error;

/// Failures that refuse a sync pass before it mutates anything.
///
/// A missing master is not an error: the pass disables the affected plugin,
/// logs a warning, and keeps going.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The running host predates the oldest supported API surface.
    #[error("host API version {found} is not supported (minimum {required})")]
    UnsupportedHost { found: Version, required: Version },

    /// An operator exception pattern failed to compile.
    #[error("exception pattern '{pattern}' is not a valid regular expression")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

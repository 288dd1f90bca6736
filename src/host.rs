//! Host API version negotiation.
//!
//! Hosts of different vintages expose the same operations under different
//! call surfaces and list encodings. Adapters declare each alternative with
//! the minimum host version that provides it; [`select_impl`] picks the
//! first one the running host satisfies, keeping version branches out of
//! the sync engine itself.

use semver::Version;

use crate::error::SyncError;

/// Oldest host API this crate can drive.
pub fn min_host_version() -> Version {
    Version::new(2, 4, 0)
}

/// Version assumed when a plugin snapshot does not state one.
pub fn default_host_version() -> Version {
    Version::new(2, 5, 0)
}

/// Rejects hosts older than [`min_host_version`] before anything mutates.
pub fn require_host(found: &Version) -> Result<(), SyncError> {
    let required = min_host_version();
    if *found < required {
        return Err(SyncError::UnsupportedHost {
            found: found.clone(),
            required,
        });
    }
    Ok(())
}

/// Returns the first alternative whose minimum version `host` satisfies.
/// Candidates must be listed newest first.
pub fn select_impl<T>(host: &Version, candidates: Vec<(Version, T)>) -> Option<T> {
    candidates
        .into_iter()
        .find(|(min, _)| host >= min)
        .map(|(_, chosen)| chosen)
}

/// How a persisted plugin list encodes enablement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListDialect {
    /// Every plugin listed, active entries prefixed with `*`.
    Starred,
    /// Only active plugins listed.
    ActiveOnly,
}

/// Hosts at 2.5.0 and later read the starred list; older supported hosts
/// expect only the active plugins.
pub fn plugin_list_dialect(host: &Version) -> ListDialect {
    select_impl(
        host,
        vec![
            (Version::new(2, 5, 0), ListDialect::Starred),
            (min_host_version(), ListDialect::ActiveOnly),
        ],
    )
    .unwrap_or(ListDialect::Starred)
}

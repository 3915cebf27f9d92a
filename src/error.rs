//! Error taxonomy for release resolution and asset acquisition.
//!
//! Every variant carries the input that triggered it (reference string,
//! tag, constraint expression, pattern text, filename) so callers can
//! report exactly what failed. Resolution errors abort the invocation
//! before any byte transfer; per-asset download errors are collected into
//! [`FetchError::DownloadFailed`].

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("invalid repository reference '{0}': expected a repository URL or owner/name")]
    InvalidReference(String),

    #[error("invalid custom instance: {0}")]
    InvalidInstance(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("tag '{0}' not found in repository")]
    TagNotFound(String),

    #[error("repository has no release tags")]
    NoReleases,

    #[error("no tag satisfies version constraint '{0}'")]
    NoMatchingVersion(String),

    #[error("invalid version constraint '{constraint}': {reason}")]
    InvalidConstraint { constraint: String, reason: String },

    #[error("tags {0:?} resolve to the same version; refusing to pick one")]
    AmbiguousVersion(Vec<String>),

    #[error("invalid asset pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("no release assets match pattern '{0}'")]
    NoAssetsMatched(String),

    #[error("authentication failed for {0}: check your access token")]
    Auth(String),

    #[error("API rate limit exceeded for {0}: retry later or supply a token")]
    RateLimit(String),

    #[error("refusing to overwrite existing file: {}", .0.display())]
    FileExists(PathBuf),

    #[error("duplicate filename '{0}' among matched assets")]
    DuplicateAsset(String),

    #[error("download of '{asset}' died mid-transfer: {reason}")]
    PartialWrite { asset: String, reason: String },

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Aggregate result of the download phase when at least one asset failed.
    ///
    /// `completed` holds the paths that were written successfully, in
    /// filter order, so partial progress is never silently discarded.
    #[error("{} of {} asset download(s) failed", .failures.len(), .failures.len() + .completed.len())]
    DownloadFailed {
        failures: Vec<(String, FetchError)>,
        completed: Vec<PathBuf>,
    },
}

impl FetchError {
    /// Which pipeline stage produced this error: parse, resolve, filter,
    /// or download. Remote API errors surface during the metadata phase
    /// and are attributed to resolve; transfer errors are always wrapped
    /// in [`FetchError::DownloadFailed`] before reaching a caller.
    pub fn stage(&self) -> &'static str {
        match self {
            FetchError::InvalidReference(_) | FetchError::InvalidInstance(_) => "parse",
            FetchError::NotFound(_)
            | FetchError::TagNotFound(_)
            | FetchError::NoReleases
            | FetchError::NoMatchingVersion(_)
            | FetchError::InvalidConstraint { .. }
            | FetchError::AmbiguousVersion(_)
            | FetchError::Auth(_)
            | FetchError::RateLimit(_)
            | FetchError::Http(_) => "resolve",
            FetchError::InvalidPattern { .. } | FetchError::NoAssetsMatched(_) => "filter",
            FetchError::FileExists(_)
            | FetchError::DuplicateAsset(_)
            | FetchError::PartialWrite { .. }
            | FetchError::Io(_)
            | FetchError::DownloadFailed { .. } => "download",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_classification() {
        assert_eq!(FetchError::InvalidReference("x".into()).stage(), "parse");
        assert_eq!(FetchError::TagNotFound("v1".into()).stage(), "resolve");
        assert_eq!(FetchError::NoAssetsMatched(".*".into()).stage(), "filter");
        assert_eq!(
            FetchError::DuplicateAsset("a.txt".into()).stage(),
            "download"
        );
    }

    #[test]
    fn test_download_failed_summary() {
        let err = FetchError::DownloadFailed {
            failures: vec![("a".into(), FetchError::NoReleases)],
            completed: vec![PathBuf::from("/tmp/b")],
        };
        assert_eq!(err.to_string(), "1 of 2 asset download(s) failed");
    }

    #[test]
    fn test_messages_carry_input() {
        let err = FetchError::InvalidPattern {
            pattern: "*".into(),
            reason: "repetition operator missing expression".into(),
        };
        assert!(err.to_string().contains('*'));

        let err = FetchError::NoMatchingVersion(">= 6.6.6".into());
        assert!(err.to_string().contains(">= 6.6.6"));
    }
}

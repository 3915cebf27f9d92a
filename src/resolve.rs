//! Version specifier classification and tag resolution.
//!
//! A specifier is classified exactly once into a [`VersionSpec`] variant,
//! so each resolution branch has an unambiguous contract and error kind
//! instead of successive loose string probes.

use std::fmt;

use semver::{Version, VersionReq};

use crate::error::FetchError;

/// A classified version specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSpec {
    /// The literal `latest`: first entry of the newest-first tag list.
    /// API ordering is authoritative here, never highest-semver; the two
    /// disagree when tags were pushed out of order.
    Latest,
    /// An exact, case-sensitive tag string.
    Exact(String),
    /// A semantic-version constraint expression.
    Constraint(VersionReq),
}

impl VersionSpec {
    /// Classify a raw specifier string.
    ///
    /// `latest` is the literal keyword; anything containing a comparator
    /// or wildcard character is parsed as a constraint (failing with
    /// [`FetchError::InvalidConstraint`]); everything else is an exact
    /// tag.
    pub fn classify(specifier: &str) -> Result<Self, FetchError> {
        let s = specifier.trim();
        if s == "latest" {
            return Ok(VersionSpec::Latest);
        }
        let looks_like_constraint = s
            .chars()
            .any(|c| matches!(c, '>' | '<' | '=' | '^' | '~' | '*' | ',') || c.is_whitespace());
        if looks_like_constraint {
            let req = VersionReq::parse(s).map_err(|e| FetchError::InvalidConstraint {
                constraint: s.to_string(),
                reason: e.to_string(),
            })?;
            return Ok(VersionSpec::Constraint(req));
        }
        Ok(VersionSpec::Exact(s.to_string()))
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionSpec::Latest => write!(f, "latest"),
            VersionSpec::Exact(tag) => write!(f, "{}", tag),
            VersionSpec::Constraint(req) => write!(f, "{}", req),
        }
    }
}

/// Parse a tag as a semantic version, tolerating a leading `v`.
fn tag_version(tag: &str) -> Option<Version> {
    Version::parse(tag.strip_prefix('v').unwrap_or(tag)).ok()
}

/// Resolve a classified specifier against a tag list.
///
/// Precondition: `tags` is ordered newest-first, as returned by
/// [`crate::client::ReleaseClient::list_tags`].
pub fn resolve(tags: &[String], spec: &VersionSpec) -> Result<String, FetchError> {
    match spec {
        VersionSpec::Latest => tags.first().cloned().ok_or(FetchError::NoReleases),

        VersionSpec::Exact(wanted) => tags
            .iter()
            .find(|tag| *tag == wanted)
            .cloned()
            .ok_or_else(|| FetchError::TagNotFound(wanted.clone())),

        VersionSpec::Constraint(req) => {
            // Tags that are not valid semver are skipped, not errors.
            let candidates: Vec<(Version, &str)> = tags
                .iter()
                .filter_map(|tag| tag_version(tag).map(|v| (v, tag.as_str())))
                .filter(|(v, _)| req.matches(v))
                .collect();

            let best = candidates
                .iter()
                .map(|(v, _)| v)
                .max()
                .ok_or_else(|| FetchError::NoMatchingVersion(req.to_string()))?
                .clone();

            let winners: Vec<&str> = candidates
                .iter()
                .filter(|(v, _)| *v == best)
                .map(|(_, tag)| *tag)
                .collect();

            if winners.len() > 1 {
                return Err(FetchError::AmbiguousVersion(
                    winners.iter().map(|t| t.to_string()).collect(),
                ));
            }
            Ok(winners[0].to_string())
        }
    }
}

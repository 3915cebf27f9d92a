//! Repository reference parsing.
//!
//! Turns a reference string (full URL or `owner/name` shorthand) plus an
//! optional custom instance into a structured [`GitHubRepo`]. Parsing is
//! pure: no network access, no ambient configuration.

use crate::error::FetchError;

/// Host of the public hosting instance.
pub const PUBLIC_BASE_URL: &str = "github.com";

/// API host of the public hosting instance.
pub const PUBLIC_API_URL: &str = "api.github.com";

/// A custom (enterprise-style) hosting instance.
///
/// Both halves must be supplied together; a base URL without an API URL
/// (or vice versa) is rejected as [`FetchError::InvalidInstance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubInstance {
    pub base_url: String,
    pub api_url: String,
}

impl GitHubInstance {
    fn validate(&self) -> Result<(), FetchError> {
        if self.base_url.trim().is_empty() {
            return Err(FetchError::InvalidInstance(
                "missing base URL (API URL given without a matching host)".to_string(),
            ));
        }
        if self.api_url.trim().is_empty() {
            return Err(FetchError::InvalidInstance(
                "missing API URL (host given without a matching API URL)".to_string(),
            ));
        }
        Ok(())
    }
}

/// A parsed repository reference. Immutable once constructed.
///
/// The base/API pair is internally consistent: both public defaults, or
/// both taken from the same [`GitHubInstance`].
#[derive(Debug, Clone)]
pub struct GitHubRepo {
    pub base_url: String,
    pub api_url: String,
    pub owner: String,
    pub name: String,
    pub token: Option<String>,
}

impl GitHubRepo {
    /// `owner/name`, for log and error messages.
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// Root URL for API calls. Hosts without a scheme get `https://`;
    /// a full URL (as used by tests against a local server) passes through.
    pub fn api_root(&self) -> String {
        if self.api_url.contains("://") {
            self.api_url.trim_end_matches('/').to_string()
        } else {
            format!("https://{}", self.api_url)
        }
    }
}

/// Parse a reference string into a [`GitHubRepo`].
///
/// Accepts `https://github.com/owner/name` (optionally with a `.git`
/// suffix or trailing path segments) and bare `owner/name` shorthand.
/// When `instance` is given, URLs must point at that instance's host.
pub fn parse_repo(
    reference: &str,
    token: Option<&str>,
    instance: Option<&GitHubInstance>,
) -> Result<GitHubRepo, FetchError> {
    let (base_url, api_url) = match instance {
        Some(inst) => {
            inst.validate()?;
            (inst.base_url.clone(), inst.api_url.clone())
        }
        None => (PUBLIC_BASE_URL.to_string(), PUBLIC_API_URL.to_string()),
    };

    let reference = reference.trim();
    let is_url = reference.contains("://");
    let stripped = reference
        .trim_start_matches("https://")
        .trim_start_matches("http://");

    let host = base_url
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/');

    let path = match stripped.strip_prefix(host) {
        // "github.community/..." must not pass as "github.com" + path.
        Some(rest) if !host.is_empty() && (rest.is_empty() || rest.starts_with('/')) => {
            rest.trim_start_matches('/')
        }
        _ if is_url => {
            // A URL whose host is not this instance cannot be decomposed
            // against it.
            return Err(FetchError::InvalidReference(reference.to_string()));
        }
        _ => stripped,
    };

    let mut segments = path.split('/').filter(|s| !s.is_empty());
    let owner = segments
        .next()
        .ok_or_else(|| FetchError::InvalidReference(reference.to_string()))?;
    let name = segments
        .next()
        .ok_or_else(|| FetchError::InvalidReference(reference.to_string()))?;
    let name = name.strip_suffix(".git").unwrap_or(name);

    if owner.is_empty()
        || name.is_empty()
        || owner.chars().any(char::is_whitespace)
        || name.chars().any(char::is_whitespace)
    {
        return Err(FetchError::InvalidReference(reference.to_string()));
    }

    Ok(GitHubRepo {
        base_url,
        api_url,
        owner: owner.to_string(),
        name: name.to_string(),
        token: token.map(str::to_string),
    })
}

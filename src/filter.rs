//! Asset selection by filename pattern.
//!
//! The pattern is a user-supplied regular expression matched against the
//! whole filename: not a glob, not a substring search, and never
//! auto-escaped. An asset whose name is byte-for-byte equal to the
//! pattern text also matches, so a literal filename full of regex
//! metacharacters (`hello+world.txt`) selects itself without escaping.

use regex::Regex;

use crate::client::Asset;
use crate::error::FetchError;

/// Select the assets whose filename fully matches `pattern`, preserving
/// the release's asset order.
///
/// An invalid pattern (e.g. a bare `*`) fails with
/// [`FetchError::InvalidPattern`]; a valid pattern matching nothing
/// returns an empty vec, and the caller decides whether that is an
/// error.
pub fn filter_assets(assets: &[Asset], pattern: &str) -> Result<Vec<Asset>, FetchError> {
    // Validate the raw pattern first so the error cites exactly what the
    // user typed, then anchor it for whole-name matching.
    Regex::new(pattern).map_err(|e| FetchError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;
    let anchored =
        Regex::new(&format!("^(?:{})$", pattern)).map_err(|e| FetchError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

    Ok(assets
        .iter()
        .filter(|asset| asset.name == pattern || anchored.is_match(&asset.name))
        .cloned()
        .collect())
}

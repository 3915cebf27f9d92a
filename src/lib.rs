//! Download tagged release assets from GitHub-style hosting APIs.
//!
//! relfetch resolves a version specifier (exact tag, semver constraint,
//! or `latest`) against a repository's release metadata, selects the
//! assets whose filenames match a regular expression, and downloads them
//! concurrently with per-asset failure isolation.
//!
//! # Example
//!
//! ```no_run
//! use relfetch::{
//!     download_release_assets, parse_repo, ClientConfig, DownloadRequest, ReleaseClient,
//! };
//!
//! # fn main() -> Result<(), relfetch::FetchError> {
//! let repo = parse_repo("gruntwork-io/health-checker", None, None)?;
//! let client = ReleaseClient::new(ClientConfig::default());
//! let request = DownloadRequest {
//!     repo,
//!     specifier: "v0.0.3".to_string(),
//!     pattern: "health-checker_linux_[a-z0-9]+".to_string(),
//!     dest_dir: "/tmp/assets".into(),
//!     overwrite: false,
//! };
//! let paths = download_release_assets(&client, &request)?;
//! # Ok(())
//! # }
//! ```
//!
//! All state lives for one invocation; nothing persists across runs.

pub mod client;
pub mod download;
pub mod error;
pub mod filter;
pub mod output;
pub mod repo;
pub mod resolve;

pub use client::{Asset, ClientConfig, Release, ReleaseClient};
pub use download::{download_release_assets, DownloadRequest};
pub use error::FetchError;
pub use filter::filter_assets;
pub use repo::{parse_repo, GitHubInstance, GitHubRepo};
pub use resolve::{resolve, VersionSpec};

//! Download orchestration: one invocation, one batch of assets.
//!
//! Resolution (classify, list tags, resolve, fetch release, filter) is
//! strictly sequential and fails fast: nothing is written before the
//! matched asset set is known. Transfers then fan out with bounded
//! parallelism, one task per asset, each isolated so a single failure
//! never cancels the other transfers.

use std::collections::HashSet;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indicatif::MultiProgress;
use tokio::sync::Semaphore;

use crate::client::{Asset, ReleaseClient};
use crate::error::FetchError;
use crate::filter::filter_assets;
use crate::output;
use crate::repo::GitHubRepo;
use crate::resolve::{resolve, VersionSpec};

/// Upper bound on concurrent transfers.
const DEFAULT_PARALLELISM: usize = 4;

/// The unit of work for one invocation.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub repo: GitHubRepo,
    /// Raw version specifier: exact tag, constraint expression, or `latest`.
    pub specifier: String,
    /// Regular expression matched against whole asset filenames.
    pub pattern: String,
    pub dest_dir: PathBuf,
    pub overwrite: bool,
}

/// Resolve a version specifier, select matching assets, and download
/// them concurrently into the destination directory.
///
/// On success, returns the written paths in the same order as the
/// matched assets regardless of transfer completion order. If any asset
/// failed, returns [`FetchError::DownloadFailed`] carrying per-asset
/// detail plus the paths that did succeed.
pub fn download_release_assets(
    client: &ReleaseClient,
    request: &DownloadRequest,
) -> Result<Vec<PathBuf>, FetchError> {
    let spec = VersionSpec::classify(&request.specifier)?;

    output::action(&format!("Resolving {}", request.repo.slug()));
    let tags = client.list_tags(&request.repo)?;
    let tag = resolve(&tags, &spec)?;
    output::detail(&format!("resolved {} -> {}", spec, tag));

    let release = client.get_release(&request.repo, &tag)?;
    let matched = filter_assets(&release.assets, &request.pattern)?;
    if matched.is_empty() {
        return Err(FetchError::NoAssetsMatched(request.pattern.clone()));
    }

    // Two writers racing on one path would corrupt the destination;
    // duplicate filenames among the matches are rejected up front.
    let mut seen = HashSet::new();
    for asset in &matched {
        if !seen.insert(asset.name.as_str()) {
            return Err(FetchError::DuplicateAsset(asset.name.clone()));
        }
    }

    std::fs::create_dir_all(&request.dest_dir)?;
    output::detail(&format!(
        "{} asset(s) match '{}'",
        matched.len(),
        request.pattern
    ));

    fetch_all(client, request, matched)
}

/// Fan out one transfer task per asset and reassemble results in the
/// original filter order.
fn fetch_all(
    client: &ReleaseClient,
    request: &DownloadRequest,
    matched: Vec<Asset>,
) -> Result<Vec<PathBuf>, FetchError> {
    let total = matched.len();
    let asset_names: Vec<String> = matched.iter().map(|a| a.name.clone()).collect();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let outcomes = runtime.block_on(async {
        let semaphore = Arc::new(Semaphore::new(DEFAULT_PARALLELISM));
        let progress = output::download_group();

        let mut tasks = Vec::with_capacity(total);
        for (index, asset) in matched.into_iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let client = client.clone();
            let repo = request.repo.clone();
            let dest_dir = request.dest_dir.clone();
            let overwrite = request.overwrite;
            let progress = progress.clone();

            tasks.push(tokio::spawn(async move {
                let name = asset.name.clone();
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        let err =
                            FetchError::Http("download pool closed before transfer".to_string());
                        return (index, name, Err(err));
                    }
                };

                // ureq transfers block, so each runs on the blocking pool.
                let result = match tokio::task::spawn_blocking(move || {
                    transfer_asset(&client, &repo, &asset, &dest_dir, overwrite, &progress)
                })
                .await
                {
                    Ok(result) => result,
                    Err(join_err) => Err(FetchError::PartialWrite {
                        asset: name.clone(),
                        reason: format!("download task aborted: {}", join_err),
                    }),
                };
                (index, name, result)
            }));
        }

        let mut outcomes = Vec::with_capacity(total);
        for (index, task) in tasks.into_iter().enumerate() {
            match task.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(join_err) => outcomes.push((
                    index,
                    asset_names[index].clone(),
                    Err(FetchError::PartialWrite {
                        asset: asset_names[index].clone(),
                        reason: format!("download task aborted: {}", join_err),
                    }),
                )),
            }
        }
        outcomes
    });

    // Transfers complete in any order; the result list follows the
    // matched-asset order.
    let mut written: Vec<Option<PathBuf>> = (0..total).map(|_| None).collect();
    let mut failures = Vec::new();
    for (index, name, result) in outcomes {
        match result {
            Ok(path) => written[index] = Some(path),
            Err(err) => failures.push((name, err)),
        }
    }

    let completed: Vec<PathBuf> = written.into_iter().flatten().collect();
    if failures.is_empty() {
        Ok(completed)
    } else {
        Err(FetchError::DownloadFailed {
            failures,
            completed,
        })
    }
}

/// Stream one asset to `<dest_dir>/<filename>`.
///
/// Bytes go through a temp file in the destination directory and are
/// persisted atomically on completion; a failed or cancelled transfer
/// drops the temp file, so no truncated file is ever left at the
/// destination path.
fn transfer_asset(
    client: &ReleaseClient,
    repo: &GitHubRepo,
    asset: &Asset,
    dest_dir: &Path,
    overwrite: bool,
    progress: &MultiProgress,
) -> Result<PathBuf, FetchError> {
    let dest = dest_dir.join(&asset.name);
    if dest.exists() {
        if !overwrite {
            return Err(FetchError::FileExists(dest));
        }
        output::warning(&format!("overwriting {}", dest.display()));
    }

    let pb = progress.add(output::create_download_progress(&format!(
        "downloading {}",
        asset.name
    )));
    let _guard = output::ProgressGuard::new(&pb);

    let config = client.config();
    let mut request = ureq::get(&asset.download_url)
        .timeout(config.timeout)
        .set("User-Agent", &config.user_agent);
    if let Some(token) = &repo.token {
        request = request.set("Authorization", &format!("Bearer {}", token));
    }

    // ureq follows the redirect chain to the CDN host itself.
    let response = request.call().map_err(|e| match e {
        ureq::Error::Status(404, _) => FetchError::NotFound(asset.name.clone()),
        other => FetchError::Http(format!("download of '{}' failed: {}", asset.name, other)),
    })?;

    if let Some(total) = response
        .header("content-length")
        .and_then(|s| s.parse::<u64>().ok())
        .or(asset.size)
    {
        output::upgrade_to_bytes(&pb, total);
    }

    let mut tmp = tempfile::NamedTempFile::new_in(dest_dir)?;
    let mut reader = response.into_reader();
    let mut buffer = [0u8; 64 * 1024];
    let mut transferred = 0u64;

    loop {
        let n = reader.read(&mut buffer).map_err(|e| FetchError::PartialWrite {
            asset: asset.name.clone(),
            reason: format!("read failed after {} bytes: {}", transferred, e),
        })?;
        if n == 0 {
            break;
        }
        tmp.write_all(&buffer[..n])
            .map_err(|e| FetchError::PartialWrite {
                asset: asset.name.clone(),
                reason: format!("write failed after {} bytes: {}", transferred, e),
            })?;
        transferred += n as u64;
        pb.set_position(transferred);
    }

    let persisted = if overwrite {
        tmp.persist(&dest)
    } else {
        tmp.persist_noclobber(&dest)
    };
    persisted.map_err(|e| {
        if !overwrite && e.error.kind() == std::io::ErrorKind::AlreadyExists {
            FetchError::FileExists(dest.clone())
        } else {
            FetchError::Io(e.error)
        }
    })?;

    Ok(dest)
}

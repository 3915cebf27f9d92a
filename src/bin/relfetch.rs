//! relfetch CLI - download tagged release assets
//!
//! Usage:
//!   relfetch owner/name                               Download all assets of the latest release
//!   relfetch owner/name --tag v0.0.3 --asset 'x_.*'   Download matching assets of a tag
//!   relfetch owner/name --tag '>= 1.0, < 2.0' --list  Show what a constraint would fetch

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use relfetch::{
    download_release_assets, filter_assets, output, parse_repo, resolve, ClientConfig,
    DownloadRequest, FetchError, GitHubInstance, GitHubRepo, ReleaseClient, VersionSpec,
};

#[derive(Parser)]
#[command(name = "relfetch")]
#[command(about = "Download release assets from GitHub-style hosting")]
#[command(version)]
struct Cli {
    /// Repository reference: URL or owner/name shorthand
    repo: String,

    /// Destination directory (created if missing)
    #[arg(default_value = ".")]
    dest: PathBuf,

    /// Version specifier: exact tag, semver constraint, or "latest"
    #[arg(short, long, default_value = "latest")]
    tag: String,

    /// Regular expression matched against whole asset filenames
    #[arg(short, long, default_value = ".*")]
    asset: String,

    /// Overwrite existing files at the destination
    #[arg(long)]
    overwrite: bool,

    /// List matching assets without downloading
    #[arg(long)]
    list: bool,

    /// API bearer token (raises rate limits; required for private repos)
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Custom instance host (must be paired with --api-url)
    #[arg(long)]
    base_url: Option<String>,

    /// Custom instance API root (must be paired with --base-url)
    #[arg(long)]
    api_url: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let instance = match (&cli.base_url, &cli.api_url) {
        (None, None) => None,
        (base, api) => Some(GitHubInstance {
            base_url: base.clone().unwrap_or_default(),
            api_url: api.clone().unwrap_or_default(),
        }),
    };

    let repo = parse_repo(&cli.repo, cli.token.as_deref(), instance.as_ref())
        .map_err(staged)?;
    let client = ReleaseClient::new(ClientConfig::from_env());

    if cli.list {
        return list_assets(&client, repo, &cli).map_err(staged);
    }

    let request = DownloadRequest {
        repo,
        specifier: cli.tag.clone(),
        pattern: cli.asset.clone(),
        dest_dir: cli.dest.clone(),
        overwrite: cli.overwrite,
    };

    let paths = download_release_assets(&client, &request).map_err(|err| {
        if let FetchError::DownloadFailed {
            failures,
            completed,
        } = &err
        {
            for (name, cause) in failures {
                output::error(&format!("{}: {}", name, cause));
            }
            for path in completed {
                output::detail(&format!("kept {}", path.display()));
            }
        }
        staged(err)
    })?;

    for path in &paths {
        println!("{}", path.display());
    }
    output::success(&format!(
        "downloaded {} asset(s) to {}",
        paths.len(),
        cli.dest.display()
    ));
    Ok(())
}

/// Resolve and print matching asset names without transferring bytes.
fn list_assets(
    client: &ReleaseClient,
    repo: GitHubRepo,
    cli: &Cli,
) -> Result<(), FetchError> {
    let spec = VersionSpec::classify(&cli.tag)?;
    let tags = client.list_tags(&repo)?;
    let tag = resolve(&tags, &spec)?;
    let release = client.get_release(&repo, &tag)?;
    let matched = filter_assets(&release.assets, &cli.asset)?;

    output::info(&format!(
        "release {} of {}: {} asset(s) match '{}'",
        tag,
        repo.slug(),
        matched.len(),
        cli.asset
    ));
    for asset in &matched {
        println!("{}", asset.name);
    }
    Ok(())
}

/// Attach the failing pipeline stage so automation can tell a parse
/// error from a resolution or transfer failure.
fn staged(err: FetchError) -> anyhow::Error {
    let stage = err.stage();
    anyhow::Error::new(err).context(format!("{} stage failed", stage))
}

pub mod diff;
pub mod fixture;
pub mod github;
pub mod types;

pub use types::{FileChange, FileStatus, PrState, PrUrl, PullRequest};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrError {
    #[error("GitHub API request failed: {0}")]
    ApiRequest(#[from] reqwest::Error),

    #[error("Invalid PR URL: {0} (expected https://github.com/owner/repo/pull/123 or owner/repo#123)")]
    InvalidUrl(String),

    #[error("Pull request not found: {0}")]
    NotFound(String),

    #[error("GitHub API rate limit exceeded{}", reset_hint(.reset))]
    RateLimited { reset: Option<u64> },

    #[error("Failed to read PR snapshot: {0}")]
    SnapshotRead(#[from] std::io::Error),

    #[error("Failed to decode PR snapshot: {0}")]
    SnapshotDecode(#[from] serde_json::Error),
}

fn reset_hint(reset: &Option<u64>) -> String {
    match reset {
        Some(epoch) => format!(" (resets at unix time {}); set GITHUB_TOKEN to raise the limit", epoch),
        None => "; set GITHUB_TOKEN to raise the limit".to_string(),
    }
}

/// Anything that can produce a pull request with its file list.
#[async_trait]
pub trait PrSource: Send + Sync {
    /// Short human-readable origin, used in logs (e.g. "github.com/org/repo#42")
    fn describe(&self) -> String;

    async fn load(&self) -> Result<PullRequest, PrError>;
}

/// Parse a GitHub PR reference into its component parts.
///
/// Accepted forms:
///   https://github.com/{owner}/{repo}/pull/{number}[/files|/commits|...]
///   github.com/{owner}/{repo}/pull/{number}
///   {owner}/{repo}#{number}
pub fn parse_pr_url(input: &str) -> Result<PrUrl, PrError> {
    let input = input.trim();
    let invalid = || PrError::InvalidUrl(input.to_string());

    if let Some(short) = parse_shorthand(input) {
        return Ok(short);
    }

    let normalized = if input.starts_with("http://") || input.starts_with("https://") {
        input.to_string()
    } else {
        format!("https://{}", input)
    };
    let parsed = reqwest::Url::parse(&normalized).map_err(|_| invalid())?;

    let host = parsed.host_str().ok_or_else(invalid)?;
    if host != "github.com" && !host.ends_with(".github.com") {
        return Err(invalid());
    }

    let segments: Vec<_> = parsed
        .path_segments()
        .ok_or_else(invalid)?
        .filter(|segment| !segment.is_empty())
        .collect();

    if segments.len() < 4 || segments[2] != "pull" {
        return Err(invalid());
    }

    let number = parse_pr_number(segments[3]).ok_or_else(invalid)?;

    Ok(PrUrl {
        owner: segments[0].to_string(),
        repo: segments[1].to_string(),
        number,
    })
}

fn parse_shorthand(input: &str) -> Option<PrUrl> {
    let (slug, number) = input.split_once('#')?;
    let (owner, repo) = slug.split_once('/')?;
    if !is_slug_part(owner) || !is_slug_part(repo) {
        return None;
    }
    Some(PrUrl {
        owner: owner.to_string(),
        repo: repo.to_string(),
        number: parse_pr_number(number)?,
    })
}

fn is_slug_part(part: &str) -> bool {
    !part.is_empty()
        && part
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

fn parse_pr_number(digits: &str) -> Option<u64> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

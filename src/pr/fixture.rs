use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{debug, instrument};

use super::github::{ApiFile, ApiPull};
use super::{parse_pr_url, FileChange, PrError, PrSource, PullRequest};

const DEMO_SNAPSHOT: &str = include_str!("../../tests/fixtures/sample_pr.json");

/// A saved API response pair: `{ "pull": {...}, "files": [...] }`.
#[derive(Debug, Deserialize)]
struct Snapshot {
    pull: ApiPull,
    files: Vec<ApiFile>,
}

enum Origin {
    Demo,
    File(PathBuf),
}

/// Loads a pull request from a JSON snapshot instead of the network.
pub struct FixtureSource {
    origin: Origin,
}

impl FixtureSource {
    /// The built-in demo PR, usable without a GitHub token.
    pub fn demo() -> Self {
        Self { origin: Origin::Demo }
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            origin: Origin::File(path.into()),
        }
    }
}

#[async_trait]
impl PrSource for FixtureSource {
    fn describe(&self) -> String {
        match &self.origin {
            Origin::Demo => "built-in demo PR".to_string(),
            Origin::File(path) => path.display().to_string(),
        }
    }

    #[instrument(skip(self), fields(source = %self.describe()))]
    async fn load(&self) -> Result<PullRequest, PrError> {
        let json = match &self.origin {
            Origin::Demo => DEMO_SNAPSHOT.to_string(),
            Origin::File(path) => tokio::fs::read_to_string(path).await?,
        };
        debug!(bytes = json.len(), "read PR snapshot");
        parse_snapshot(&json)
    }
}

fn parse_snapshot(json: &str) -> Result<PullRequest, PrError> {
    let snapshot: Snapshot = serde_json::from_str(json)?;
    let pr_url = parse_pr_url(&snapshot.pull.html_url)?;
    let files = snapshot.files.into_iter().map(FileChange::from).collect();
    Ok(snapshot.pull.into_pull_request(&pr_url, files))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pr::FileStatus;

    #[tokio::test]
    async fn test_demo_snapshot_loads() {
        let pr = FixtureSource::demo().load().await.unwrap();
        assert_eq!(pr.owner, "acme");
        assert_eq!(pr.repo, "webshop");
        assert_eq!(pr.number, 42);
        assert_eq!(pr.files.len(), 6);
        assert_eq!(pr.files[0].filename, "src/auth/mod.rs");
    }

    #[tokio::test]
    async fn test_demo_snapshot_covers_every_header_shape() {
        let pr = FixtureSource::demo().load().await.unwrap();
        let statuses: Vec<FileStatus> = pr.files.iter().map(|f| f.status).collect();
        assert!(statuses.contains(&FileStatus::Added));
        assert!(statuses.contains(&FileStatus::Removed));
        assert!(statuses.contains(&FileStatus::Renamed));
        assert!(statuses.contains(&FileStatus::Modified));
        assert!(pr.files.iter().any(|f| f.patch.is_none()));
    }

    #[tokio::test]
    async fn test_missing_file_is_read_error() {
        let source = FixtureSource::from_path("/nonexistent/pr-cart/snapshot.json");
        let err = source.load().await.unwrap_err();
        assert!(matches!(err, PrError::SnapshotRead(_)));
    }

    #[test]
    fn test_snapshot_with_bad_url_is_rejected() {
        let json = r#"{
            "pull": {
                "number": 1, "title": "t", "state": "open", "user": null,
                "base": { "ref": "main" }, "head": { "ref": "x" },
                "html_url": "https://example.com/not/a/pr"
            },
            "files": []
        }"#;
        assert!(matches!(parse_snapshot(json), Err(PrError::InvalidUrl(_))));
    }

    #[test]
    fn test_malformed_snapshot() {
        assert!(matches!(parse_snapshot("{"), Err(PrError::SnapshotDecode(_))));
    }
}

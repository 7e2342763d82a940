use serde::Deserialize;
use std::fmt;

/// A pull request with its ordered file list, as loaded from a [`super::PrSource`].
#[derive(Debug, Clone)]
pub struct PullRequest {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// PR number (e.g., 42)
    pub number: u64,
    /// PR title
    pub title: String,
    /// Author's GitHub login
    pub author: String,
    pub state: PrState,
    pub base_branch: String,
    pub head_branch: String,
    /// Link to the PR on github.com
    pub html_url: String,
    /// Changed files, in the order the host lists them
    pub files: Vec<FileChange>,
    /// Total lines added across the PR
    pub total_additions: u64,
    /// Total lines deleted across the PR
    pub total_deletions: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrState {
    Open,
    Closed,
    Merged,
}

impl fmt::Display for PrState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrState::Open => write!(f, "open"),
            PrState::Closed => write!(f, "closed"),
            PrState::Merged => write!(f, "merged"),
        }
    }
}

/// Change status of a single file, as reported by the files endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    Modified,
    Removed,
    Renamed,
    Copied,
    Changed,
    Unchanged,
    /// Any status string the host adds later. Handled like `Modified`.
    #[serde(other)]
    Unknown,
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FileStatus::Added => "added",
            FileStatus::Modified => "modified",
            FileStatus::Removed => "removed",
            FileStatus::Renamed => "renamed",
            FileStatus::Copied => "copied",
            FileStatus::Changed => "changed",
            FileStatus::Unchanged => "unchanged",
            FileStatus::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// One entry of a pull request's file list. Read-only input to the diff
/// classifier and the patch assembler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    /// Path in the post-change tree, unique within the PR
    pub filename: String,
    /// Path before the change; only set for renames
    pub previous_filename: Option<String>,
    pub status: FileStatus,
    /// Host-reported line counts. Authoritative, never recomputed from `patch`.
    pub additions: u64,
    pub deletions: u64,
    /// Blob sha of the post-change file
    pub sha: Option<String>,
    /// Raw unified-diff hunks. `None` for binary files or diffs the host omitted.
    pub patch: Option<String>,
}

impl FileChange {
    /// True when the file carries non-empty hunk text.
    pub fn has_patch(&self) -> bool {
        self.patch.as_deref().is_some_and(|p| !p.is_empty())
    }
}

/// Represents the parsed components of a GitHub PR URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrUrl {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

use std::fmt;
use std::path::PathBuf;

use crate::patch::SelectionStats;

/// Where an assembled patch goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Stdout,
    File(PathBuf),
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Stdout => write!(f, "stdout"),
            Destination::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Everything the checkout summary shows after a patch was exported.
#[derive(Debug, Clone)]
pub struct CheckoutSummary {
    pub owner: String,
    pub repo: String,
    pub number: u64,
    /// Host-reported totals for the selection
    pub stats: SelectionStats,
    /// Selected files left out of the patch because they carry no hunk text
    pub skipped: Vec<String>,
    pub destination: Destination,
    /// Size of the assembled patch
    pub bytes: usize,
    /// Branch name when exporting in branch mode
    pub branch: Option<String>,
}

pub mod types;

pub use types::{CheckoutSummary, Destination};

use crate::pr::diff::{DiffLine, LineKind};
use crate::pr::{FileChange, FileStatus, PullRequest};
use colored::Colorize;
use std::io::Write;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write patch: {0}")]
    Write(#[from] std::io::Error),
}

/// Format the PR header and its file list.
///
/// PR #42: "Add OAuth2 login flow" (open)
/// alice wants to merge feature/x into main
/// Files changed: 6 | +45 -17
///
///    1  modified  src/auth/mod.rs  +4 -1
pub fn render_file_list(pr: &PullRequest) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} \"{}\" ({})\n",
        format!("PR #{}:", pr.number).bold(),
        pr.title,
        pr.state
    ));
    out.push_str(&format!(
        "{} wants to merge {} into {}\n",
        pr.author, pr.head_branch, pr.base_branch
    ));
    out.push_str(&format!("{}\n", pr.html_url.dimmed()));
    out.push_str(&format!(
        "Files changed: {} | {} {}\n\n",
        pr.files.len(),
        format!("+{}", pr.total_additions).green(),
        format!("-{}", pr.total_deletions).red()
    ));

    let index_width = pr.files.len().to_string().len();
    for (i, file) in pr.files.iter().enumerate() {
        let name = match (&file.status, &file.previous_filename) {
            (FileStatus::Renamed, Some(previous)) => {
                format!("{} (from {})", file.filename, previous)
            }
            _ => file.filename.clone(),
        };
        let note = if file.has_patch() {
            String::new()
        } else {
            format!("  {}", "(no diff)".dimmed())
        };
        out.push_str(&format!(
            "  {:>width$}  {} {}  {} {}{}\n",
            i + 1,
            colorize_status(file.status),
            name,
            format!("+{}", file.additions).green(),
            format!("-{}", file.deletions).red(),
            note,
            width = index_width,
        ));
    }
    out
}

/// Format one file's classified diff as a two-column, line-numbered table.
pub fn render_preview(file: &FileChange, lines: &[DiffLine]) -> String {
    let mut out = String::new();
    let blob = file
        .sha
        .as_deref()
        .map(|sha| {
            let short: String = sha.chars().take(7).collect();
            format!("  {}", format!("blob {}", short).dimmed())
        })
        .unwrap_or_default();
    out.push_str(&format!(
        "{}  {} {}{}\n\n",
        file.filename.bold(),
        format!("+{}", file.additions).green(),
        format!("-{}", file.deletions).red(),
        blob
    ));

    if file.patch.is_none() {
        let message = match file.status {
            FileStatus::Removed => "File deleted - no diff available",
            _ => "Binary file or no changes to display",
        };
        out.push_str(&format!("{}\n", message.dimmed()));
        return out;
    }
    if lines.is_empty() {
        out.push_str(&format!("{}\n", "No changes in this file".dimmed()));
        return out;
    }

    let width = lines
        .iter()
        .flat_map(|l| [l.old_line, l.new_line])
        .flatten()
        .max()
        .unwrap_or(0)
        .to_string()
        .len();

    for line in lines {
        let number = |n: Option<usize>| n.map(|n| n.to_string()).unwrap_or_default();
        let row = match line.kind {
            LineKind::Header => format!("{}", line.text.cyan()),
            LineKind::Context => format!(
                "{:>w$} {:>w$} │  {}",
                number(line.old_line),
                number(line.new_line),
                line.text,
                w = width
            ),
            LineKind::Addition => format!(
                "{:>w$} {:>w$} │ {}",
                "",
                number(line.new_line),
                format!("+{}", line.text).green(),
                w = width
            ),
            LineKind::Deletion => format!(
                "{:>w$} {:>w$} │ {}",
                number(line.old_line),
                "",
                format!("-{}", line.text).red(),
                w = width
            ),
        };
        out.push_str(&row);
        out.push('\n');
    }
    out
}

/// Format the checkout summary shown after a patch is exported.
pub fn render_checkout(summary: &CheckoutSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{}\n",
        format!(
            "═══ Checkout: {}/{}#{} ═══",
            summary.owner, summary.repo, summary.number
        )
        .bold()
    ));
    out.push_str(&format!("Files selected  {}\n", summary.stats.file_count));
    out.push_str(&format!(
        "Lines added     {}\n",
        format!("+{}", summary.stats.additions).green()
    ));
    out.push_str(&format!(
        "Lines removed   {}\n",
        format!("-{}", summary.stats.deletions).red()
    ));

    if !summary.skipped.is_empty() {
        out.push_str(&format!(
            "{} {}\n",
            "Skipped (no diff text):".yellow(),
            summary.skipped.join(", ")
        ));
    }

    match &summary.destination {
        Destination::Stdout => {
            out.push_str(&format!("Patch written to stdout ({} bytes)\n", summary.bytes));
        }
        Destination::File(path) => {
            out.push_str(&format!(
                "Patch written to {} ({} bytes)\n",
                path.display(),
                summary.bytes
            ));
        }
    }

    if let Some(branch) = &summary.branch {
        let patch_name = summary.destination.to_string();
        out.push_str("\nTo apply:\n");
        out.push_str(&format!("  1. git checkout -b {}\n", branch));
        out.push_str(&format!("  2. git apply {}\n", patch_name));
        out.push_str(&format!(
            "  3. git commit -m \"Apply selected changes from PR #{}\"\n",
            summary.number
        ));
    }
    out
}

/// Write the assembled patch to stdout (None) or to a file.
#[instrument(skip(patch), fields(bytes = patch.len()))]
pub fn output(patch: &str, output_path: Option<&Path>) -> Result<(), ReportError> {
    match output_path {
        None => {
            debug!("writing patch to stdout");
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(patch.as_bytes())?;
            if !patch.is_empty() && !patch.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
            stdout.flush()?;
            Ok(())
        }
        Some(path) => {
            debug!(path = %path.display(), "writing patch to file");
            write_patch_file(patch, path)
        }
    }
}

/// Host hunk text has no trailing newline; `git apply` needs one.
fn write_patch_file(patch: &str, path: &Path) -> Result<(), ReportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut contents = patch.to_string();
    if !contents.is_empty() && !contents.ends_with('\n') {
        contents.push('\n');
    }
    std::fs::write(path, contents)?;
    Ok(())
}

fn colorize_status(status: FileStatus) -> colored::ColoredString {
    let label = format!("{:<9}", status.to_string());
    match status {
        FileStatus::Added => label.green(),
        FileStatus::Removed => label.red(),
        FileStatus::Renamed | FileStatus::Copied => label.blue(),
        _ => label.yellow(),
    }
}

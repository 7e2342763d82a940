pub mod header;
pub mod selection;

pub use header::synthesize_header;
pub use selection::{Selection, SelectionError};

use crate::pr::FileChange;

/// Totals for the selected files, taken from the host-reported counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionStats {
    pub file_count: usize,
    pub additions: u64,
    pub deletions: u64,
}

/// Assemble one `git apply`-compatible patch from the selected files.
///
/// Files keep the order of `files`. Unselected files and files without
/// hunk text (binary, or omitted by the host) contribute nothing. Each
/// included file becomes `header + hunks`, and blocks are joined by a
/// newline.
pub fn assemble(files: &[FileChange], selected: &Selection) -> String {
    files
        .iter()
        .filter(|file| selected.contains(&file.filename))
        .filter_map(|file| match file.patch.as_deref() {
            Some(hunks) if !hunks.is_empty() => Some(synthesize_header(file) + hunks),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Sum the host-reported counts of the selected files, whether or not they
/// carry hunk text.
pub fn compute_selection_stats(files: &[FileChange], selected: &Selection) -> SelectionStats {
    files
        .iter()
        .filter(|file| selected.contains(&file.filename))
        .fold(SelectionStats::default(), |stats, file| SelectionStats {
            file_count: stats.file_count + 1,
            additions: stats.additions + file.additions,
            deletions: stats.deletions + file.deletions,
        })
}

/// Selected files that [`assemble`] leaves out for lack of hunk text.
pub fn skipped_without_patch<'a>(
    files: &'a [FileChange],
    selected: &'a Selection,
) -> impl Iterator<Item = &'a FileChange> + 'a {
    files
        .iter()
        .filter(move |file| selected.contains(&file.filename) && !file.has_patch())
}

/// Default export name: `{owner}-{repo}-pr{number}-selection.patch`.
pub fn suggested_filename(owner: &str, repo: &str, number: u64) -> String {
    format!("{}-{}-pr{}-selection.patch", owner, repo, number)
}

/// Export name for the branch checkout mode: `{branch}.patch`, with runs of
/// whitespace collapsed to `-`. A blank branch name has no export name.
pub fn branch_patch_filename(branch: &str) -> Option<String> {
    let slug = branch.split_whitespace().collect::<Vec<_>>().join("-");
    if slug.is_empty() {
        return None;
    }
    Some(format!("{}.patch", slug))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pr::FileStatus;

    fn file(filename: &str, status: FileStatus, patch: Option<&str>) -> FileChange {
        FileChange {
            filename: filename.to_string(),
            previous_filename: None,
            status,
            additions: 0,
            deletions: 0,
            sha: None,
            patch: patch.map(str::to_string),
        }
    }

    fn sample_files() -> Vec<FileChange> {
        let mut renamed = file("b.txt", FileStatus::Renamed, Some(""));
        renamed.previous_filename = Some("old.txt".to_string());
        vec![
            file("a.txt", FileStatus::Added, Some("@@ -0,0 +1,2 @@\n+line1\n+line2")),
            renamed,
            file("logo.png", FileStatus::Added, None),
            file("src/lib.rs", FileStatus::Modified, Some("@@ -1 +1 @@\n-x\n+y")),
            file("gone.rs", FileStatus::Removed, Some("@@ -1 +0,0 @@\n-bye")),
        ]
    }

    #[test]
    fn test_assemble_added_file() {
        let files = sample_files();
        let selection = Selection::from_names(&files, ["a.txt"]).unwrap();
        let patch = assemble(&files, &selection);
        assert!(patch.starts_with(
            "diff --git a/a.txt b/a.txt\nnew file mode 100644\n--- /dev/null\n+++ b/a.txt\n@@ -0,0 +1,2 @@\n+line1\n+line2"
        ));
    }

    #[test]
    fn test_assemble_empty_selection() {
        assert_eq!(assemble(&sample_files(), &Selection::new()), "");
        assert_eq!(assemble(&[], &Selection::new()), "");
    }

    #[test]
    fn test_assemble_skips_files_without_patch() {
        let files = sample_files();
        let selection = Selection::from_names(&files, ["b.txt", "logo.png"]).unwrap();
        assert_eq!(assemble(&files, &selection), "");
    }

    #[test]
    fn test_assemble_all_keeps_input_order() {
        let files = sample_files();
        let patch = assemble(&files, &Selection::all(&files));

        let expected = [
            synthesize_header(&files[0]) + "@@ -0,0 +1,2 @@\n+line1\n+line2",
            synthesize_header(&files[3]) + "@@ -1 +1 @@\n-x\n+y",
            synthesize_header(&files[4]) + "@@ -1 +0,0 @@\n-bye",
        ]
        .join("\n");
        assert_eq!(patch, expected);
        assert!(!patch.contains("rename from"));
        assert!(!patch.contains("logo.png"));
    }

    #[test]
    fn test_assemble_is_deterministic() {
        let files = sample_files();
        let selection = Selection::all(&files);
        assert_eq!(assemble(&files, &selection), assemble(&files, &selection));
    }

    #[test]
    fn test_selection_stats_use_host_counts() {
        let mut first = file("one.rs", FileStatus::Modified, None);
        first.additions = 3;
        first.deletions = 1;
        let mut second = file("two.rs", FileStatus::Modified, Some("@@ -1 +1 @@\n+z"));
        second.additions = 5;
        let third = file("three.rs", FileStatus::Modified, None);
        let files = vec![first, second, third];

        let selection = Selection::from_names(&files, ["one.rs", "two.rs"]).unwrap();
        assert_eq!(
            compute_selection_stats(&files, &selection),
            SelectionStats {
                file_count: 2,
                additions: 8,
                deletions: 1,
            }
        );
        assert_eq!(
            compute_selection_stats(&files, &Selection::new()),
            SelectionStats::default()
        );
    }

    #[test]
    fn test_skipped_without_patch() {
        let files = sample_files();
        let selection = Selection::all(&files);
        let skipped: Vec<&str> = skipped_without_patch(&files, &selection)
            .map(|f| f.filename.as_str())
            .collect();
        assert_eq!(skipped, vec!["b.txt", "logo.png"]);
    }

    #[test]
    fn test_export_filenames() {
        assert_eq!(
            suggested_filename("acme", "webshop", 42),
            "acme-webshop-pr42-selection.patch"
        );
        assert_eq!(
            branch_patch_filename("fix  login flow").as_deref(),
            Some("fix-login-flow.patch")
        );
        assert_eq!(branch_patch_filename("feature/x").as_deref(), Some("feature/x.patch"));
    }

    #[test]
    fn test_blank_branch_has_no_filename() {
        assert_eq!(branch_patch_filename(""), None);
        assert_eq!(branch_patch_filename("   \t"), None);
    }
}

use crate::pr::{FileChange, FileStatus};

/// File mode written into new/deleted file headers. Executable bits are not
/// carried by the files endpoint, so every file is a regular file here.
pub const REGULAR_FILE_MODE: &str = "100644";

/// Build the `git diff` header that must precede a file's hunk text.
///
/// The result ends with a newline so the hunk text can be appended directly:
///
///   diff --git a/{path} b/{path}
///   [rename from / rename to | new file mode | deleted file mode]
///   --- a/{path} | /dev/null
///   +++ b/{path} | /dev/null
pub fn synthesize_header(file: &FileChange) -> String {
    let name = file.filename.as_str();
    let mut lines = Vec::with_capacity(5);

    match (file.status, file.previous_filename.as_deref()) {
        (FileStatus::Renamed, Some(previous)) => {
            lines.push(format!("diff --git a/{} b/{}", previous, name));
            lines.push(format!("rename from {}", previous));
            lines.push(format!("rename to {}", name));
        }
        _ => lines.push(format!("diff --git a/{} b/{}", name, name)),
    }

    match file.status {
        FileStatus::Added => {
            lines.push(format!("new file mode {}", REGULAR_FILE_MODE));
            lines.push("--- /dev/null".to_string());
            lines.push(format!("+++ b/{}", name));
        }
        FileStatus::Removed => {
            lines.push(format!("deleted file mode {}", REGULAR_FILE_MODE));
            lines.push(format!("--- a/{}", name));
            lines.push("+++ /dev/null".to_string());
        }
        FileStatus::Modified
        | FileStatus::Renamed
        | FileStatus::Copied
        | FileStatus::Changed
        | FileStatus::Unchanged
        | FileStatus::Unknown => {
            lines.push(format!("--- a/{}", name));
            lines.push(format!("+++ b/{}", name));
        }
    }

    let mut header = lines.join("\n");
    header.push('\n');
    header
}

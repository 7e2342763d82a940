/// Kind of a classified diff line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Header,
    Context,
    Addition,
    Deletion,
}

/// One displayable line of a file's diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub kind: LineKind,
    /// Line content without its leading marker. Hunk headers keep the full line.
    pub text: String,
    /// 1-based position in the pre-change file (context and deletion lines)
    pub old_line: Option<usize>,
    /// 1-based position in the post-change file (context and addition lines)
    pub new_line: Option<usize>,
}

/// Start lines declared by a hunk header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HunkHeader {
    pub old_start: usize,
    pub new_start: usize,
}

/// Classify one file's unified-diff text into typed, numbered lines.
///
/// The input is the hunk text GitHub returns per file:
///   @@ -{old_start},{old_count} +{new_start},{new_count} @@ {section}
/// followed by lines prefixed with '+', '-' or ' '.
///
/// Parsing is tolerant and never fails: a malformed `@@` line is kept as a
/// header without touching the line counters, and lines that are not part of
/// a hunk body (`\ No newline at end of file`, `index ...`) are dropped.
pub fn classify(patch: Option<&str>) -> Vec<DiffLine> {
    patch.map(classify_text).unwrap_or_default()
}

pub fn classify_text(text: &str) -> Vec<DiffLine> {
    text.lines()
        .scan(Cursor::default(), |cursor, line| Some(cursor.advance(line)))
        .flatten()
        .collect()
}

/// Running line counters for the hunk being scanned.
#[derive(Debug, Default, Clone, Copy)]
struct Cursor {
    old: usize,
    new: usize,
    in_hunk: bool,
}

impl Cursor {
    fn advance(&mut self, line: &str) -> Option<DiffLine> {
        if line.starts_with("@@") {
            if let Some(header) = parse_hunk_header(line) {
                self.old = header.old_start;
                self.new = header.new_start;
            }
            self.in_hunk = true;
            return Some(DiffLine {
                kind: LineKind::Header,
                text: line.to_string(),
                old_line: None,
                new_line: None,
            });
        }

        // File markers only show up before the first hunk; inside a hunk
        // "+++x" is an added "++x".
        if !self.in_hunk && (line.starts_with("+++ ") || line.starts_with("--- ")) {
            return None;
        }

        if let Some(content) = line.strip_prefix('+') {
            let new_line = self.new;
            self.new = self.new.saturating_add(1);
            return Some(DiffLine {
                kind: LineKind::Addition,
                text: content.to_string(),
                old_line: None,
                new_line: Some(new_line),
            });
        }

        if let Some(content) = line.strip_prefix('-') {
            let old_line = self.old;
            self.old = self.old.saturating_add(1);
            return Some(DiffLine {
                kind: LineKind::Deletion,
                text: content.to_string(),
                old_line: Some(old_line),
                new_line: None,
            });
        }

        let content = if line.is_empty() {
            ""
        } else {
            line.strip_prefix(' ')?
        };
        let (old_line, new_line) = (self.old, self.new);
        self.old = self.old.saturating_add(1);
        self.new = self.new.saturating_add(1);
        Some(DiffLine {
            kind: LineKind::Context,
            text: content.to_string(),
            old_line: Some(old_line),
            new_line: Some(new_line),
        })
    }
}

/// Parse `@@ -a[,b] +c[,d] @@...`. Counts are validated but not kept, and a
/// missing count means 1.
pub fn parse_hunk_header(line: &str) -> Option<HunkHeader> {
    let rest = line.strip_prefix("@@ -")?;
    let (old_part, rest) = rest.split_once(" +")?;
    let (new_part, _section) = rest.split_once(" @@")?;

    Some(HunkHeader {
        old_start: parse_range(old_part)?,
        new_start: parse_range(new_part)?,
    })
}

fn parse_range(part: &str) -> Option<usize> {
    let (start, count) = match part.split_once(',') {
        Some((start, "")) => (start, None),
        Some((start, count)) => (start, Some(count)),
        None => (part, None),
    };
    if let Some(count) = count {
        parse_number(count)?;
    }
    parse_number(start)
}

// usize::from_str would also accept a leading '+'. Digit runs too long for
// usize clamp to usize::MAX so an oversized start still resets the counters.
fn parse_number(digits: &str) -> Option<usize> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(digits.parse().unwrap_or(usize::MAX))
}

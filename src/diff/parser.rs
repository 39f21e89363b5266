//! Parse unified diff text into hunks with per-line numbering.
//!
//! Each hunk carries its old-file and new-file line ranges and every line is
//! annotated with the old/new line numbers it occupies, which is what lets
//! the mapper slice a file's diff down to the lines inside one symbol's span.

use serde::{Deserialize, Serialize};

/// A contiguous block of added/removed/context lines in a unified diff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hunk {
    #[serde(rename = "oldStart")]
    pub old_start: u32,
    #[serde(rename = "oldCount")]
    pub old_count: u32,
    #[serde(rename = "newStart")]
    pub new_start: u32,
    #[serde(rename = "newCount")]
    pub new_count: u32,
    pub lines: Vec<HunkLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HunkLine {
    pub kind: LineKind,
    pub content: String,
    #[serde(rename = "oldLine")]
    pub old_line: Option<u32>,
    #[serde(rename = "newLine")]
    pub new_line: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    Context,
    Added,
    Removed,
}

impl LineKind {
    /// The prefix character this line carries in unified-diff text.
    pub fn sigil(self) -> char {
        match self {
            LineKind::Context => ' ',
            LineKind::Added => '+',
            LineKind::Removed => '-',
        }
    }
}

impl Hunk {
    /// Inclusive new-file line range covered by this hunk. Zero-count hunks
    /// (pure deletions) collapse to their anchor line.
    pub fn new_range(&self) -> (u32, u32) {
        range_of(self.new_start, self.new_count)
    }

    /// Inclusive old-file line range covered by this hunk.
    pub fn old_range(&self) -> (u32, u32) {
        range_of(self.old_start, self.old_count)
    }
}

fn range_of(start: u32, count: u32) -> (u32, u32) {
    if count == 0 {
        (start, start)
    } else {
        (start, start + count - 1)
    }
}

/// Parse unified diff text into hunks.
///
/// File headers (`---`/`+++`/`diff --git`) and `\ No newline at end of file`
/// markers are skipped. Text that contains no parsable `@@` header yields an
/// empty vector; callers treat a non-empty diff with no hunks as malformed.
pub fn parse_unified_diff(diff: &str) -> Vec<Hunk> {
    let mut hunks = Vec::new();
    let mut current: Option<HunkBuilder> = None;

    for line in diff.lines() {
        if line.starts_with("@@") {
            if let Some(builder) = current.take() {
                hunks.push(builder.build());
            }
            if let Some((old_start, old_count, new_start, new_count)) = parse_hunk_header(line) {
                current = Some(HunkBuilder {
                    old_start,
                    old_count,
                    new_start,
                    new_count,
                    lines: Vec::new(),
                    old_line: old_start,
                    new_line: new_start,
                });
            }
        } else if let Some(ref mut builder) = current {
            if line.starts_with('+') && !line.starts_with("+++") {
                builder.push(LineKind::Added, &line[1..]);
            } else if line.starts_with('-') && !line.starts_with("---") {
                builder.push(LineKind::Removed, &line[1..]);
            } else if line.starts_with(' ') || line.is_empty() {
                let content = if line.is_empty() { "" } else { &line[1..] };
                builder.push(LineKind::Context, content);
            }
            // "\ No newline at end of file" and stray headers fall through.
        }
    }

    if let Some(builder) = current {
        hunks.push(builder.build());
    }

    hunks
}

struct HunkBuilder {
    old_start: u32,
    old_count: u32,
    new_start: u32,
    new_count: u32,
    lines: Vec<HunkLine>,
    old_line: u32,
    new_line: u32,
}

impl HunkBuilder {
    fn push(&mut self, kind: LineKind, content: &str) {
        let (old_line, new_line) = match kind {
            LineKind::Added => {
                let n = self.new_line;
                self.new_line += 1;
                (None, Some(n))
            }
            LineKind::Removed => {
                let o = self.old_line;
                self.old_line += 1;
                (Some(o), None)
            }
            LineKind::Context => {
                let o = self.old_line;
                let n = self.new_line;
                self.old_line += 1;
                self.new_line += 1;
                (Some(o), Some(n))
            }
        };
        self.lines.push(HunkLine {
            kind,
            content: content.to_owned(),
            old_line,
            new_line,
        });
    }

    fn build(self) -> Hunk {
        Hunk {
            old_start: self.old_start,
            old_count: self.old_count,
            new_start: self.new_start,
            new_count: self.new_count,
            lines: self.lines,
        }
    }
}

/// Parse `@@ -old_start,old_count +new_start,new_count @@ ...`.
fn parse_hunk_header(line: &str) -> Option<(u32, u32, u32, u32)> {
    let line = line.trim_start_matches("@@ ");
    let mut parts = line.split(' ');
    let old = parts.next()?.strip_prefix('-')?;
    let new = parts.next()?.strip_prefix('+')?;

    let (old_start, old_count) = parse_range(old)?;
    let (new_start, new_count) = parse_range(new)?;
    Some((old_start, old_count, new_start, new_count))
}

fn parse_range(range: &str) -> Option<(u32, u32)> {
    if let Some((start, count)) = range.split_once(',') {
        Some((start.parse().ok()?, count.parse().ok()?))
    } else {
        // "5" means line 5, count 1
        Some((range.parse().ok()?, 1))
    }
}

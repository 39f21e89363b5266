//! Line-set based conflict detection for 3-way merges.
//!
//! Each divergent variant is diffed against the common base; every non-equal
//! diff op becomes a `SideEdit` anchored at the base lines it touches. Two
//! sides conflict inside a span when their anchors overlap and the edits are
//! not the identical convergent change. Non-overlapping insertions merge
//! cleanly and are never flagged.

use similar::{DiffOp, TextDiff};

/// One contiguous edit a variant made against the base.
///
/// `old_start..old_end` is the half-open 0-based base line interval the edit
/// replaces (zero-width for pure insertions, anchored at the insertion gap).
/// `new_start..=new_end` is the 1-based inclusive line range of the edit's
/// output in the variant (empty for pure deletions).
#[derive(Debug, Clone)]
pub(crate) struct SideEdit {
    pub old_start: u32,
    pub old_end: u32,
    pub new_start: u32,
    pub new_end: u32,
    pub content: String,
}

/// Diff a variant against the base and collect its edits.
pub(crate) fn side_edits(base: &str, side: &str) -> Vec<SideEdit> {
    let side_lines: Vec<&str> = side.lines().collect();
    let diff = TextDiff::from_lines(base, side);

    let mut edits = Vec::new();
    for op in diff.ops() {
        match *op {
            DiffOp::Equal { .. } => {}
            DiffOp::Delete {
                old_index,
                old_len,
                new_index,
            } => edits.push(SideEdit {
                old_start: old_index as u32,
                old_end: (old_index + old_len) as u32,
                new_start: new_index as u32 + 1,
                new_end: new_index as u32,
                content: String::new(),
            }),
            DiffOp::Insert {
                old_index,
                new_index,
                new_len,
            } => edits.push(SideEdit {
                old_start: old_index as u32,
                old_end: old_index as u32,
                new_start: new_index as u32 + 1,
                new_end: (new_index + new_len) as u32,
                content: side_lines[new_index..new_index + new_len].join("\n"),
            }),
            DiffOp::Replace {
                old_index,
                old_len,
                new_index,
                new_len,
            } => edits.push(SideEdit {
                old_start: old_index as u32,
                old_end: (old_index + old_len) as u32,
                new_start: new_index as u32 + 1,
                new_end: (new_index + new_len) as u32,
                content: side_lines[new_index..new_index + new_len].join("\n"),
            }),
        }
    }
    edits
}

/// Whether two edits touch overlapping base lines. Insertions are zero-width
/// gaps: two insertions overlap only at the same gap, and an insertion
/// overlaps a replacement only strictly inside it.
fn base_overlap(a: &SideEdit, b: &SideEdit) -> bool {
    let a_zero = a.old_start == a.old_end;
    let b_zero = b.old_start == b.old_end;
    match (a_zero, b_zero) {
        (true, true) => a.old_start == b.old_start,
        (true, false) => b.old_start < a.old_start && a.old_start < b.old_end,
        (false, true) => a.old_start < b.old_start && b.old_start < a.old_end,
        (false, false) => a.old_start < b.old_end && b.old_start < a.old_end,
    }
}

/// Two overlapping edits conflict unless they are the identical change on
/// both sides (convergent edits merge cleanly).
fn edits_conflict(a: &SideEdit, b: &SideEdit) -> bool {
    base_overlap(a, b)
        && !(a.old_start == b.old_start && a.old_end == b.old_end && a.content == b.content)
}

/// Whether an edit touches the given 1-based inclusive base line span.
fn edit_in_base_span(edit: &SideEdit, span: (u32, u32)) -> bool {
    let (start, end) = span;
    if edit.old_start == edit.old_end {
        // Insertion gap g sits between base lines g and g+1.
        start.saturating_sub(1) <= edit.old_start && edit.old_start <= end
    } else {
        // Half-open 0-based [old_start, old_end) covers 1-based lines
        // old_start+1 ..= old_end.
        edit.old_start < end && start <= edit.old_end
    }
}

/// Whether an edit's output intersects a 1-based inclusive span in the
/// variant's own coordinates. Pure deletions produce no output lines.
fn edit_in_side_span(edit: &SideEdit, span: (u32, u32)) -> bool {
    let (start, end) = span;
    edit.new_start <= edit.new_end && edit.new_start <= end && start <= edit.new_end
}

/// Decide whether a symbol's region is in unresolvable conflict.
///
/// `base_span` is the symbol's line span in the base revision when it exists
/// there; otherwise `ours_span` (the span in the "ours" variant) selects the
/// relevant edits.
pub(crate) fn span_has_conflict(
    ours_edits: &[SideEdit],
    theirs_edits: &[SideEdit],
    base_span: Option<(u32, u32)>,
    ours_span: (u32, u32),
) -> bool {
    let relevant = ours_edits.iter().filter(|e| match base_span {
        Some(span) => edit_in_base_span(e, span),
        None => edit_in_side_span(e, ours_span),
    });

    for ours in relevant {
        if theirs_edits.iter().any(|theirs| edits_conflict(ours, theirs)) {
            return true;
        }
    }
    false
}

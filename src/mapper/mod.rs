//! Correlates a change description with symbol tables from two revisions.
//!
//! The mapper consumes either a unified diff or, for files under active
//! 3-way conflict, the two divergent full-text variants, and emits one
//! change record per symbol: a status, a diff fragment scoped to the
//! symbol's span, and (in 3-way mode) a conflict flag with the raw variant
//! texts. Everything here is pure and file-scoped; degraded inputs produce
//! empty mappings, never errors.

mod conflict;

use crate::diff::parser::{parse_unified_diff, Hunk};
use crate::diff::unified;
use crate::symbols::extractor::extract;
use crate::symbols::{Language, SymbolKind, SymbolTable};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Change status of a symbol, file, or folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Added,
    Removed,
    Modified,
    Unchanged,
}

impl Status {
    /// Whether this status represents an actual change.
    pub fn is_trivial(self) -> bool {
        self == Status::Unchanged
    }
}

/// The change description for one file: a single unified diff, or the two
/// divergent variants of an unresolved 3-way merge (with the common ancestor
/// when it is available).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ChangeInput {
    Unified { diff: String },
    ThreeWay {
        base: Option<String>,
        ours: String,
        theirs: String,
    },
}

/// Raw variant texts for a conflicted symbol, for side-by-side rendering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConflictSources {
    pub ours: String,
    pub theirs: String,
}

/// Per-symbol result of mapping a change description onto the tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolChange {
    pub kind: SymbolKind,
    pub status: Status,
    /// Unified-diff fragment scoped to the symbol (conflict-marker text for
    /// conflicted symbols). Empty for unchanged symbols.
    pub source: String,
    #[serde(rename = "hasConflict")]
    pub has_conflict: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict: Option<ConflictSources>,
}

/// Map a change description onto the symbols of one file.
///
/// Returns one entry per symbol present in either table, keyed by qualname,
/// in new-table order followed by removed symbols in old-table order. A
/// non-blank unified diff that parses to no hunks is malformed and yields an
/// empty mapping; callers fall back to whole-file diff display.
pub fn map_changes(
    old_table: &SymbolTable,
    new_table: &SymbolTable,
    input: &ChangeInput,
    language: Language,
) -> IndexMap<String, SymbolChange> {
    match input {
        ChangeInput::Unified { diff } => map_unified(old_table, new_table, diff),
        ChangeInput::ThreeWay { base, ours, theirs } => {
            map_three_way(old_table, new_table, base.as_deref(), ours, theirs, language)
        }
    }
}

fn map_unified(
    old_table: &SymbolTable,
    new_table: &SymbolTable,
    diff: &str,
) -> IndexMap<String, SymbolChange> {
    let mut result = IndexMap::new();

    let hunks = parse_unified_diff(diff);
    if hunks.is_empty() && !diff.trim().is_empty() {
        // Malformed diff: no symbol-level mapping.
        return result;
    }

    for (qualname, span) in new_table {
        let old_span = old_table.get(qualname);
        let (status, source) = match old_span {
            None => (
                Status::Added,
                scoped_fragment(&hunks, None, Some((span.start_line, span.end_line))),
            ),
            Some(old) => {
                let touched = hunks.iter().any(|h| {
                    let (hs, he) = h.new_range();
                    ranges_overlap(hs, he, span.start_line, span.end_line)
                });
                if touched {
                    (
                        Status::Modified,
                        scoped_fragment(
                            &hunks,
                            Some((old.start_line, old.end_line)),
                            Some((span.start_line, span.end_line)),
                        ),
                    )
                } else {
                    (Status::Unchanged, String::new())
                }
            }
        };

        result.insert(
            qualname.clone(),
            SymbolChange {
                kind: span.kind,
                status,
                source,
                has_conflict: false,
                conflict: None,
            },
        );
    }

    for (qualname, span) in old_table {
        if new_table.contains_key(qualname) {
            continue;
        }
        result.insert(
            qualname.clone(),
            SymbolChange {
                kind: span.kind,
                status: Status::Removed,
                source: scoped_fragment(&hunks, Some((span.start_line, span.end_line)), None),
                has_conflict: false,
                conflict: None,
            },
        );
    }

    result
}

fn map_three_way(
    old_table: &SymbolTable,
    new_table: &SymbolTable,
    base: Option<&str>,
    ours: &str,
    theirs: &str,
    language: Language,
) -> IndexMap<String, SymbolChange> {
    let base_text = base.unwrap_or("");
    let ours_edits = conflict::side_edits(base_text, ours);
    let theirs_edits = conflict::side_edits(base_text, theirs);
    let theirs_table = extract(theirs, language);

    let mut result = IndexMap::new();

    for (qualname, span) in new_table {
        let old_span = old_table.get(qualname);
        let status = match old_span {
            None => Status::Added,
            Some(old) if old.source_text != span.source_text => Status::Modified,
            Some(_) => Status::Unchanged,
        };

        let has_conflict = conflict::span_has_conflict(
            &ours_edits,
            &theirs_edits,
            old_span.map(|o| (o.start_line, o.end_line)),
            (span.start_line, span.end_line),
        );

        let source = if has_conflict {
            let theirs_text = theirs_table
                .get(qualname)
                .map(|s| s.source_text.as_str())
                .unwrap_or("");
            conflict_marker_text(&span.source_text, theirs_text)
        } else {
            let old_text = old_span.map(|o| o.source_text.as_str()).unwrap_or("");
            unified::symbol_diff(qualname, old_text, &span.source_text)
        };

        result.insert(
            qualname.clone(),
            SymbolChange {
                kind: span.kind,
                status,
                source,
                has_conflict,
                conflict: has_conflict.then(|| ConflictSources {
                    ours: span.source_text.clone(),
                    theirs: theirs_table
                        .get(qualname)
                        .map(|s| s.source_text.clone())
                        .unwrap_or_default(),
                }),
            },
        );
    }

    for (qualname, span) in old_table {
        if new_table.contains_key(qualname) {
            continue;
        }
        let has_conflict = conflict::span_has_conflict(
            &ours_edits,
            &theirs_edits,
            Some((span.start_line, span.end_line)),
            (span.start_line, span.end_line),
        );
        result.insert(
            qualname.clone(),
            SymbolChange {
                kind: span.kind,
                status: Status::Removed,
                source: unified::symbol_diff(qualname, &span.source_text, ""),
                has_conflict,
                conflict: has_conflict.then(|| ConflictSources {
                    ours: String::new(),
                    theirs: theirs_table
                        .get(qualname)
                        .map(|s| s.source_text.clone())
                        .unwrap_or_default(),
                }),
            },
        );
    }

    result
}

/// Render a conflicted symbol as git-style conflict-marker text.
fn conflict_marker_text(ours: &str, theirs: &str) -> String {
    format!("<<<<<<< ours\n{ours}\n=======\n{theirs}\n>>>>>>> theirs\n")
}

/// Inclusive range intersection.
fn ranges_overlap(a_start: u32, a_end: u32, b_start: u32, b_end: u32) -> bool {
    a_start <= b_end && b_start <= a_end
}

/// Re-frame the diff lines that fall inside a symbol's span as a minimal
/// valid unified-diff fragment, one synthetic hunk (with a recomputed `@@`
/// header) per intersecting input hunk.
fn scoped_fragment(
    hunks: &[Hunk],
    old_span: Option<(u32, u32)>,
    new_span: Option<(u32, u32)>,
) -> String {
    let mut out = String::new();

    for hunk in hunks {
        let lines: Vec<_> = hunk
            .lines
            .iter()
            .filter(|line| {
                let in_new = match (new_span, line.new_line) {
                    (Some((s, e)), Some(n)) => s <= n && n <= e,
                    _ => false,
                };
                let in_old = match (old_span, line.old_line) {
                    (Some((s, e)), Some(o)) => s <= o && o <= e,
                    _ => false,
                };
                in_new || in_old
            })
            .collect();

        if lines.is_empty() {
            continue;
        }

        let old_count = lines.iter().filter(|l| l.old_line.is_some()).count() as u32;
        let new_count = lines.iter().filter(|l| l.new_line.is_some()).count() as u32;
        let old_start = lines.iter().find_map(|l| l.old_line).unwrap_or(0);
        let new_start = lines.iter().find_map(|l| l.new_line).unwrap_or(0);

        out.push_str(&format!(
            "@@ -{old_start},{old_count} +{new_start},{new_count} @@\n"
        ));
        for line in lines {
            out.push(line.kind.sigil());
            out.push_str(&line.content);
            out.push('\n');
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::extractor::extract;

    fn unified(diff: &str) -> ChangeInput {
        ChangeInput::Unified {
            diff: diff.to_owned(),
        }
    }

    #[test]
    fn test_added_and_removed_from_presence() {
        let old = extract("def gone():\n    pass\n", Language::Python);
        let new = extract("def fresh():\n    pass\n", Language::Python);
        let diff = "\
@@ -1,2 +1,2 @@
-def gone():
-    pass
+def fresh():
+    pass
";
        let changes = map_changes(&old, &new, &unified(diff), Language::Python);
        assert_eq!(changes["fresh"].status, Status::Added);
        assert_eq!(changes["gone"].status, Status::Removed);
        // Added fragment only carries new-side lines, removed only old-side.
        assert!(changes["fresh"].source.contains("+def fresh():"));
        assert!(!changes["fresh"].source.contains("-def gone():"));
        assert!(changes["gone"].source.contains("-def gone():"));
    }

    #[test]
    fn test_swapping_revisions_complements_statuses() {
        let old = extract("def gone():\n    pass\n", Language::Python);
        let new = extract("def fresh():\n    pass\n", Language::Python);
        let forward = map_changes(&old, &new, &unified(""), Language::Python);
        let backward = map_changes(&new, &old, &unified(""), Language::Python);
        assert_eq!(forward["fresh"].status, Status::Added);
        assert_eq!(backward["fresh"].status, Status::Removed);
        assert_eq!(forward["gone"].status, Status::Removed);
        assert_eq!(backward["gone"].status, Status::Added);
    }

    #[test]
    fn test_class_with_two_methods_only_second_touched() {
        let old_src = "\
class Calc:
    def first(self):
        return 1

    def second(self):
        return 2
";
        let new_src = "\
class Calc:
    def first(self):
        return 1

    def second(self):
        return 20
";
        let old = extract(old_src, Language::Python);
        let new = extract(new_src, Language::Python);
        // Tight hunk touching only line 6 (inside `second`).
        let diff = "\
@@ -6,1 +6,1 @@
-        return 2
+        return 20
";
        let changes = map_changes(&old, &new, &unified(diff), Language::Python);
        assert_eq!(changes["Calc"].status, Status::Modified);
        assert_eq!(changes["Calc.first"].status, Status::Unchanged);
        assert_eq!(changes["Calc.second"].status, Status::Modified);
        // Parent and child independently carry the intersecting fragment.
        assert!(changes["Calc"].source.contains("+        return 20"));
        assert!(changes["Calc.second"].source.contains("+        return 20"));
        assert!(changes["Calc.first"].source.is_empty());
    }

    #[test]
    fn test_fragment_header_is_recomputed() {
        let old = extract("def f():\n    pass\n", Language::Python);
        let new = extract("def f():\n    pass\n    return 1\n", Language::Python);
        let diff = "\
@@ -1,2 +1,3 @@
 def f():
     pass
+    return 1
";
        let changes = map_changes(&old, &new, &unified(diff), Language::Python);
        let source = &changes["f"].source;
        assert!(source.starts_with("@@ -1,2 +1,3 @@\n"), "got: {source}");
        assert!(source.contains("+    return 1"));
    }

    #[test]
    fn test_malformed_diff_yields_empty_mapping() {
        let old = extract("def f():\n    pass\n", Language::Python);
        let new = extract("def f():\n    pass\n", Language::Python);
        let changes = map_changes(
            &old,
            &new,
            &unified("garbage that is not a diff"),
            Language::Python,
        );
        assert!(changes.is_empty());
    }

    #[test]
    fn test_empty_diff_marks_shared_symbols_unchanged() {
        let old = extract("def f():\n    pass\n", Language::Python);
        let new = extract("def f():\n    pass\n", Language::Python);
        let changes = map_changes(&old, &new, &unified(""), Language::Python);
        assert_eq!(changes["f"].status, Status::Unchanged);
        assert!(changes["f"].source.is_empty());
    }

    #[test]
    fn test_three_way_same_line_conflict() {
        let base = "def f():\n    a = 1\n    return a\n";
        let ours = "def f():\n    a = 10\n    return a\n";
        let theirs = "def f():\n    a = 99\n    return a\n";
        let old = extract(base, Language::Python);
        let new = extract(ours, Language::Python);
        let input = ChangeInput::ThreeWay {
            base: Some(base.to_owned()),
            ours: ours.to_owned(),
            theirs: theirs.to_owned(),
        };
        let changes = map_changes(&old, &new, &input, Language::Python);
        let f = &changes["f"];
        assert_eq!(f.status, Status::Modified);
        assert!(f.has_conflict);
        assert!(f.source.contains("<<<<<<< ours"));
        let sources = f.conflict.as_ref().unwrap();
        assert!(sources.ours.contains("a = 10"));
        assert!(sources.theirs.contains("a = 99"));
    }

    #[test]
    fn test_three_way_disjoint_insertions_no_conflict() {
        let base = "def f():\n    a = 1\n    b = 2\n    return a + b\n";
        let ours = "def f():\n    a = 1\n    x = 0\n    b = 2\n    return a + b\n";
        let theirs = "def f():\n    a = 1\n    b = 2\n    y = 9\n    return a + b\n";
        let old = extract(base, Language::Python);
        let new = extract(ours, Language::Python);
        let input = ChangeInput::ThreeWay {
            base: Some(base.to_owned()),
            ours: ours.to_owned(),
            theirs: theirs.to_owned(),
        };
        let changes = map_changes(&old, &new, &input, Language::Python);
        let f = &changes["f"];
        assert_eq!(f.status, Status::Modified);
        assert!(!f.has_conflict);
        // Clean modifications carry a unified diff of base -> ours.
        assert!(f.source.contains("+    x = 0"));
        assert!(f.conflict.is_none());
    }

    #[test]
    fn test_three_way_clean_sources_carry_qualname_labels() {
        let base = "def f():\n    a = 1\n\ndef gone():\n    pass\n";
        let ours = "def f():\n    a = 2\n";
        let theirs = base;
        let old = extract(base, Language::Python);
        let new = extract(ours, Language::Python);
        let input = ChangeInput::ThreeWay {
            base: Some(base.to_owned()),
            ours: ours.to_owned(),
            theirs: theirs.to_owned(),
        };
        let changes = map_changes(&old, &new, &input, Language::Python);
        // Modified and removed symbols both render as qualname-labeled diffs.
        assert!(changes["f"].source.starts_with("--- f:old\n+++ f:new\n"));
        assert!(changes["gone"]
            .source
            .starts_with("--- gone:old\n+++ gone:new\n"));
    }

    #[test]
    fn test_three_way_symbol_untouched_by_either_side() {
        let base = "def f():\n    pass\n\ndef g():\n    pass\n";
        let ours = "def f():\n    pass\n\ndef g():\n    changed = 1\n";
        let theirs = base;
        let old = extract(base, Language::Python);
        let new = extract(ours, Language::Python);
        let input = ChangeInput::ThreeWay {
            base: Some(base.to_owned()),
            ours: ours.to_owned(),
            theirs: theirs.to_owned(),
        };
        let changes = map_changes(&old, &new, &input, Language::Python);
        assert_eq!(changes["f"].status, Status::Unchanged);
        assert!(!changes["f"].has_conflict);
        assert_eq!(changes["g"].status, Status::Modified);
        assert!(!changes["g"].has_conflict);
    }

    #[test]
    fn test_unparsable_file_has_no_records() {
        // Both revisions unparsable: empty tables in, empty mapping out.
        let old = extract("%%%", Language::Python);
        let new = extract("@@@", Language::Python);
        let changes = map_changes(&old, &new, &unified(""), Language::Python);
        assert!(changes.is_empty());
    }
}

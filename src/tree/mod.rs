//! Assembles per-file records into the folder/file/symbol hierarchy.
//!
//! Folder nodes are created on demand from path segments; status and
//! conflict flags propagate bottom-up; children keep first-seen insertion
//! order so that UI selection state is reproducible across rebuilds.

use crate::mapper::{ConflictSources, Status};
use crate::symbols::{SymbolKind, SymbolSpan};
use serde::{Deserialize, Serialize};

/// What a tree node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Folder,
    File,
    Symbol,
}

/// How the folder hierarchy is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Folder chains with a single child folder and no sibling files are
    /// collapsed into one node labeled `a/b`.
    Flat,
    /// Full folder nesting preserved.
    Tree,
}

/// Location of a node in the new revision's file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CodePosition {
    pub start_line: u32,
    pub end_line: u32,
    pub start_column: u32,
    pub end_column: u32,
}

impl From<&SymbolSpan> for CodePosition {
    fn from(span: &SymbolSpan) -> Self {
        CodePosition {
            start_line: span.start_line,
            end_line: span.end_line,
            start_column: span.start_column,
            end_column: span.end_column,
        }
    }
}

/// One node in the rendered change tree: a folder, file, or symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffRecord {
    /// Stable across rebuilds: the path for folders/files, `path:qualname`
    /// for symbols.
    pub id: String,
    pub label: String,
    pub kind: RecordKind,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Unified-diff fragment (or conflict-marker text) scoped to this node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(rename = "symbolKind", skip_serializing_if = "Option::is_none")]
    pub symbol_kind: Option<SymbolKind>,
    #[serde(rename = "codePosition", skip_serializing_if = "Option::is_none")]
    pub code_position: Option<CodePosition>,
    #[serde(rename = "hasConflict")]
    pub has_conflict: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict: Option<ConflictSources>,
    pub children: Vec<DiffRecord>,
}

impl DiffRecord {
    fn folder(dir_path: &str, label: &str) -> DiffRecord {
        DiffRecord {
            id: dir_path.to_owned(),
            label: label.to_owned(),
            kind: RecordKind::Folder,
            status: Status::Unchanged,
            path: Some(dir_path.to_owned()),
            source: None,
            symbol_kind: None,
            code_position: None,
            has_conflict: false,
            conflict: None,
            children: Vec::new(),
        }
    }
}

/// Fold file records into root-level folder nodes.
///
/// Folder insertion is idempotent: revisiting an existing folder path reuses
/// the node. The whole tree is rebuilt on every call; it is never patched.
pub fn assemble(file_records: Vec<DiffRecord>, mode: ViewMode) -> Vec<DiffRecord> {
    let mut roots: Vec<DiffRecord> = Vec::new();

    for file in file_records {
        let path = file
            .path
            .clone()
            .unwrap_or_else(|| file.label.clone());
        let parts: Vec<&str> = path.split('/').collect();

        let mut children = &mut roots;
        let mut dir_path = String::new();
        for part in &parts[..parts.len() - 1] {
            if dir_path.is_empty() {
                dir_path.push_str(part);
            } else {
                dir_path = format!("{dir_path}/{part}");
            }
            let idx = match children
                .iter()
                .position(|n| n.kind == RecordKind::Folder && n.id == dir_path)
            {
                Some(idx) => idx,
                None => {
                    children.push(DiffRecord::folder(&dir_path, part));
                    children.len() - 1
                }
            };
            children = &mut children[idx].children;
        }
        children.push(file);
    }

    if mode == ViewMode::Flat {
        collapse_chains(&mut roots);
    }
    propagate(&mut roots);
    roots
}

/// Flat mode: a folder whose only child is another folder (no sibling
/// files) merges with it, joining the labels.
fn collapse_chains(nodes: &mut Vec<DiffRecord>) {
    for node in nodes.iter_mut() {
        if node.kind != RecordKind::Folder {
            continue;
        }
        collapse_chains(&mut node.children);
        while node.children.len() == 1 && node.children[0].kind == RecordKind::Folder {
            let mut child = node.children.remove(0);
            node.label = format!("{}/{}", node.label, child.label);
            node.id = child.id;
            node.path = child.path.take();
            node.children = std::mem::take(&mut child.children);
        }
    }
}

/// Bottom-up propagation of status and conflict flags.
///
/// Folders take `modified` when any descendant carries a non-trivial status;
/// files and symbols keep their own status. `has_conflict` is true iff any
/// descendant's is, at every level.
pub fn propagate(nodes: &mut [DiffRecord]) {
    for node in nodes {
        propagate(&mut node.children);

        if node.children.iter().any(|c| c.has_conflict) {
            node.has_conflict = true;
        }
        if node.kind == RecordKind::Folder {
            node.status = if node.children.iter().any(|c| !c.status.is_trivial()) {
                Status::Modified
            } else {
                Status::Unchanged
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, status: Status) -> DiffRecord {
        DiffRecord {
            id: path.to_owned(),
            label: path.rsplit('/').next().unwrap().to_owned(),
            kind: RecordKind::File,
            status,
            path: Some(path.to_owned()),
            source: None,
            symbol_kind: None,
            code_position: None,
            has_conflict: false,
            conflict: None,
            children: Vec::new(),
        }
    }

    #[test]
    fn test_folder_nodes_created_and_reused() {
        let roots = assemble(
            vec![
                file("src/core/a.py", Status::Modified),
                file("src/core/b.py", Status::Modified),
                file("src/util.py", Status::Modified),
            ],
            ViewMode::Tree,
        );
        assert_eq!(roots.len(), 1);
        let src = &roots[0];
        assert_eq!(src.id, "src");
        assert_eq!(src.kind, RecordKind::Folder);
        // core folder reused for both files, util.py directly under src.
        assert_eq!(src.children.len(), 2);
        assert_eq!(src.children[0].id, "src/core");
        assert_eq!(src.children[0].children.len(), 2);
        assert_eq!(src.children[1].label, "util.py");
    }

    #[test]
    fn test_children_keep_insertion_order() {
        let roots = assemble(
            vec![
                file("z.py", Status::Modified),
                file("a.py", Status::Added),
                file("m.py", Status::Removed),
            ],
            ViewMode::Tree,
        );
        let labels: Vec<&str> = roots.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["z.py", "a.py", "m.py"]);
    }

    #[test]
    fn test_folder_status_propagates_up() {
        let mut changed = file("src/deep/mod.py", Status::Modified);
        changed.has_conflict = true;
        let roots = assemble(
            vec![changed, file("src/other.py", Status::Unchanged)],
            ViewMode::Tree,
        );
        let src = &roots[0];
        assert_eq!(src.status, Status::Modified);
        assert!(src.has_conflict);
        let deep = &src.children[0];
        assert_eq!(deep.status, Status::Modified);
        assert!(deep.has_conflict);
        // Sibling file keeps its own trivial status.
        assert_eq!(src.children[1].status, Status::Unchanged);
        assert!(!src.children[1].has_conflict);
    }

    #[test]
    fn test_all_trivial_descendants_leave_folder_unchanged() {
        let roots = assemble(vec![file("pkg/a.py", Status::Unchanged)], ViewMode::Tree);
        assert_eq!(roots[0].status, Status::Unchanged);
    }

    #[test]
    fn test_flat_mode_collapses_single_child_chains() {
        let roots = assemble(
            vec![file("src/backend/core/parser.py", Status::Modified)],
            ViewMode::Flat,
        );
        assert_eq!(roots.len(), 1);
        let folder = &roots[0];
        assert_eq!(folder.label, "src/backend/core");
        assert_eq!(folder.id, "src/backend/core");
        assert_eq!(folder.children.len(), 1);
        assert_eq!(folder.children[0].label, "parser.py");
    }

    #[test]
    fn test_flat_mode_keeps_branching_folders() {
        let roots = assemble(
            vec![
                file("src/api/handlers.py", Status::Modified),
                file("src/core/engine.py", Status::Modified),
            ],
            ViewMode::Flat,
        );
        // src branches into two folders, so it cannot collapse further than
        // src -> {api, core}.
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].label, "src");
        assert_eq!(roots[0].children.len(), 2);
        assert_eq!(roots[0].children[0].label, "api");
        assert_eq!(roots[0].children[1].label, "core");
    }

    #[test]
    fn test_tree_mode_preserves_full_nesting() {
        let roots = assemble(
            vec![file("a/b/c.py", Status::Modified)],
            ViewMode::Tree,
        );
        assert_eq!(roots[0].label, "a");
        assert_eq!(roots[0].children[0].label, "b");
        assert_eq!(roots[0].children[0].children[0].label, "c.py");
    }

    #[test]
    fn test_root_level_file_has_no_folder() {
        let roots = assemble(vec![file("main.py", Status::Added)], ViewMode::Tree);
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].kind, RecordKind::File);
        assert_eq!(roots[0].status, Status::Added);
    }
}

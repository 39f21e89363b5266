//! Top-level pipeline: one changed file in, one annotated record out.
//!
//! For each changed file the engine extracts symbol tables from both
//! revisions, maps the change description onto them, and emits a file record
//! whose children are the file's definitions nested by qualified name.
//! Unsupported file types and files whose diff cannot be mapped degrade to a
//! whole-file record with no symbol children.

use crate::diff::unified;
use crate::mapper::{self, ChangeInput, Status, SymbolChange};
use crate::symbols::extractor::extract;
use crate::symbols::{Language, SymbolSpan, SymbolTable};
use crate::tree::{self, CodePosition, DiffRecord, RecordKind, ViewMode};

/// One changed file between two revisions: the full text on each side (when
/// the file exists there) plus the change description to map onto it.
#[derive(Debug, Clone)]
pub struct FileChange {
    /// Repository-relative path with `/` separators.
    pub path: String,
    pub old_text: Option<String>,
    pub new_text: Option<String>,
    pub change: ChangeInput,
}

/// Build the full change tree for a set of changed files.
pub fn build_diff_tree(files: &[FileChange], mode: ViewMode) -> Vec<DiffRecord> {
    let records = files.iter().map(diff_file).collect();
    tree::assemble(records, mode)
}

/// Build the record for a single changed file, with symbol children.
pub fn diff_file(file: &FileChange) -> DiffRecord {
    let old_text = file.old_text.as_deref().unwrap_or("");
    let new_text = file.new_text.as_deref().unwrap_or("");

    let status = file_status(file);
    let source = match &file.change {
        ChangeInput::Unified { diff } => diff.clone(),
        ChangeInput::ThreeWay { .. } => unified::file_diff(&file.path, old_text, new_text),
    };

    let mut record = DiffRecord {
        id: file.path.clone(),
        label: file
            .path
            .rsplit('/')
            .next()
            .unwrap_or(&file.path)
            .to_owned(),
        kind: RecordKind::File,
        status,
        path: Some(file.path.clone()),
        source: Some(source),
        symbol_kind: None,
        code_position: None,
        has_conflict: false,
        conflict: None,
        children: Vec::new(),
    };

    if let Some(language) = Language::from_path(&file.path) {
        let old_table = extract(old_text, language);
        let new_table = extract(new_text, language);
        let changes = mapper::map_changes(&old_table, &new_table, &file.change, language);
        if changes.is_empty() {
            log::debug!("no symbol mapping for {}, whole-file record only", file.path);
        }
        for (qualname, change) in &changes {
            let symbol =
                symbol_record(&file.path, qualname, change, &old_table, &new_table);
            attach_symbol(&mut record, &file.path, qualname, &changes, symbol);
        }
    }

    tree::propagate(std::slice::from_mut(&mut record));
    record
}

fn file_status(file: &FileChange) -> Status {
    match (&file.old_text, &file.new_text) {
        (None, Some(_)) => Status::Added,
        (Some(_), None) => Status::Removed,
        (Some(old), Some(new)) if old != new => Status::Modified,
        _ => Status::Unchanged,
    }
}

fn symbol_record(
    path: &str,
    qualname: &str,
    change: &SymbolChange,
    old_table: &SymbolTable,
    new_table: &SymbolTable,
) -> DiffRecord {
    // Position in the new revision when the symbol survives, otherwise its
    // last known position in the old revision.
    let span: Option<&SymbolSpan> = new_table.get(qualname).or_else(|| old_table.get(qualname));

    DiffRecord {
        id: format!("{path}:{qualname}"),
        label: qualname
            .rsplit('.')
            .next()
            .unwrap_or(qualname)
            .to_owned(),
        kind: RecordKind::Symbol,
        status: change.status,
        path: Some(path.to_owned()),
        source: Some(change.source.clone()),
        symbol_kind: Some(change.kind),
        code_position: span.map(CodePosition::from),
        has_conflict: change.has_conflict,
        conflict: change.conflict.clone(),
        children: Vec::new(),
    }
}

/// Place a symbol record under its enclosing definition when that definition
/// has a record of its own, otherwise directly under the file.
fn attach_symbol(
    file_record: &mut DiffRecord,
    path: &str,
    qualname: &str,
    changes: &indexmap::IndexMap<String, SymbolChange>,
    symbol: DiffRecord,
) {
    if let Some((parent_qual, _)) = qualname.rsplit_once('.') {
        if changes.contains_key(parent_qual) {
            let parent_id = format!("{path}:{parent_qual}");
            if let Some(parent) = find_symbol_mut(&mut file_record.children, &parent_id) {
                parent.children.push(symbol);
                return;
            }
        }
    }
    file_record.children.push(symbol);
}

fn find_symbol_mut<'a>(nodes: &'a mut [DiffRecord], id: &str) -> Option<&'a mut DiffRecord> {
    for node in nodes {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_symbol_mut(&mut node.children, id) {
            return Some(found);
        }
    }
    None
}

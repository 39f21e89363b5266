//! Symbol-level diff engine.
//!
//! Compares two revisions of a repository definition-by-definition instead of
//! line-by-line: source files are parsed with tree-sitter into tables of
//! named definitions, a unified diff (or a 3-way merge pair) is mapped onto
//! those definitions, and the results are folded into a folder/file/symbol
//! tree that a diff viewer can render directly.

pub mod diff;
pub mod engine;
pub mod mapper;
pub mod sources;
pub mod symbols;
pub mod tree;

#[cfg(feature = "cli")]
pub mod cli;

pub use engine::{build_diff_tree, diff_file, FileChange};
pub use mapper::{ChangeInput, Status};
pub use sources::local_git::LocalGitSource;
pub use symbols::extractor::extract;
pub use symbols::{Language, SymbolTable};
pub use tree::{DiffRecord, ViewMode};

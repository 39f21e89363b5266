//! Symbol extraction from source files using tree-sitter.
//!
//! Parses one file's source text into a table of definitions (functions,
//! classes, methods) keyed by qualified name, with precise line/column spans
//! and the exact source slice of each definition.

pub mod extractor;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The kind of definition extracted from source code.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Function,
    Class,
    Method,
    /// Other named definitions (Rust structs, enums, impls, inline modules).
    Definition,
}

/// One extracted definition with its full textual extent.
///
/// Lines are 1-based and inclusive; columns are 0-based (tree-sitter
/// convention). `source_text` is the exact slice of the file between the
/// definition's byte offsets, including decorators attached to it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SymbolSpan {
    pub qualname: String,
    pub kind: SymbolKind,
    #[serde(rename = "startLine")]
    pub start_line: u32,
    #[serde(rename = "endLine")]
    pub end_line: u32,
    #[serde(rename = "startColumn")]
    pub start_column: u32,
    #[serde(rename = "endColumn")]
    pub end_column: u32,
    #[serde(rename = "sourceText")]
    pub source_text: String,
}

impl SymbolSpan {
    /// The last segment of the qualified name (the display label).
    pub fn label(&self) -> &str {
        self.qualname.rsplit('.').next().unwrap_or(&self.qualname)
    }

    /// Whether a 1-based line number falls inside this span.
    pub fn contains_line(&self, line: u32) -> bool {
        self.start_line <= line && line <= self.end_line
    }
}

/// Mapping from qualified name to span for one file at one revision.
///
/// Insertion-ordered so that repeated extractions of the same text produce
/// identical iteration order. Sibling definitions that resolve to the same
/// qualname (two anonymous functions at one nesting level) collide and the
/// later one overwrites the earlier entry; callers key by qualname and depend
/// on that last-write-wins behavior.
pub type SymbolTable = IndexMap<String, SymbolSpan>;

/// A supported source language, selected by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Rust,
    Python,
    JavaScript,
    TypeScript,
    Tsx,
}

impl Language {
    /// Detect the language for a file path from its extension.
    pub fn from_path(path: &str) -> Option<Language> {
        let ext = path.rsplit('.').next()?.to_lowercase();
        match ext.as_str() {
            "rs" => Some(Language::Rust),
            "py" | "pyi" => Some(Language::Python),
            "js" | "jsx" | "mjs" | "cjs" => Some(Language::JavaScript),
            "ts" => Some(Language::TypeScript),
            "tsx" => Some(Language::Tsx),
            _ => None,
        }
    }

    pub(crate) fn grammar(self) -> tree_sitter::Language {
        match self {
            Language::Rust => tree_sitter_rust::LANGUAGE.into(),
            Language::Python => tree_sitter_python::LANGUAGE.into(),
            Language::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Language::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Language::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }
}

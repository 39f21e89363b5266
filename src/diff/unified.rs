//! Generate unified diff text from two full texts.

use similar::TextDiff;

/// Build a unified diff between two texts with the given `---`/`+++` labels.
/// Identical inputs produce an empty string.
pub fn unified_diff(old: &str, new: &str, from: &str, to: &str) -> String {
    if old == new {
        return String::new();
    }
    TextDiff::from_lines(old, new)
        .unified_diff()
        .context_radius(3)
        .header(from, to)
        .to_string()
}

/// Git-style whole-file diff (`a/path` → `b/path`).
pub fn file_diff(path: &str, old: &str, new: &str) -> String {
    unified_diff(old, new, &format!("a/{path}"), &format!("b/{path}"))
}

/// Diff scoped to a single definition, labeled `qualname:old/new` so it
/// renders independently of the rest of the file's diff.
pub fn symbol_diff(qualname: &str, old: &str, new: &str) -> String {
    unified_diff(
        old,
        new,
        &format!("{qualname}:old"),
        &format!("{qualname}:new"),
    )
}

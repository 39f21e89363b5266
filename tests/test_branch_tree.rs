//! End-to-end test: build a real git repository with two diverging branches,
//! collect the change set, and check the assembled symbol tree.
//!
//! Requires the `git` CLI; each test returns early when it is unavailable.

use std::fs;
use std::path::Path;
use std::process::Command;
use symdiff::tree::RecordKind;
use symdiff::{build_diff_tree, LocalGitSource, Status, ViewMode};

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_AUTHOR_NAME", "test")
        .env("GIT_AUTHOR_EMAIL", "test@example.com")
        .env("GIT_COMMITTER_NAME", "test")
        .env("GIT_COMMITTER_EMAIL", "test@example.com")
        .output()
        .expect("failed to run git")
        .status;
    assert!(status.success(), "git {args:?} failed");
}

#[test]
fn test_branch_comparison_produces_symbol_tree() {
    if !git_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    git(root, &["init", "-b", "main"]);
    fs::create_dir_all(root.join("src")).unwrap();
    fs::write(
        root.join("src/calc.py"),
        "class Calc:\n    def first(self):\n        return 1\n\n    def second(self):\n        return 2\n",
    )
    .unwrap();
    git(root, &["add", "."]);
    git(root, &["commit", "-m", "initial"]);

    git(root, &["checkout", "-b", "feature"]);
    fs::write(
        root.join("src/calc.py"),
        "class Calc:\n    def first(self):\n        return 1\n\n    def second(self):\n        return 20\n",
    )
    .unwrap();
    fs::write(root.join("src/util.py"), "def helper():\n    return 3\n").unwrap();
    git(root, &["add", "."]);
    git(root, &["commit", "-m", "tweak second, add helper"]);

    let source = LocalGitSource::new(root.to_path_buf()).unwrap();
    let changes = source.branch_changes("main", "feature").unwrap();
    assert_eq!(changes.len(), 2);

    let roots = build_diff_tree(&changes, ViewMode::Tree);
    assert_eq!(roots.len(), 1);
    let src = &roots[0];
    assert_eq!(src.label, "src");
    assert_eq!(src.kind, RecordKind::Folder);
    assert_eq!(src.status, Status::Modified);

    let calc = src
        .children
        .iter()
        .find(|n| n.label == "calc.py")
        .expect("calc.py record");
    assert_eq!(calc.status, Status::Modified);
    let class = &calc.children[0];
    assert_eq!(class.label, "Calc");
    assert_eq!(class.status, Status::Modified);
    let second = class
        .children
        .iter()
        .find(|n| n.label == "second")
        .expect("second method record");
    assert_eq!(second.status, Status::Modified);
    assert!(second.source.as_deref().unwrap().contains("+        return 20"));

    let util = src
        .children
        .iter()
        .find(|n| n.label == "util.py")
        .expect("util.py record");
    assert_eq!(util.status, Status::Added);
    assert_eq!(util.children[0].label, "helper");
    assert_eq!(util.children[0].status, Status::Added);
}

#[test]
fn test_diverging_edits_to_same_line_flag_conflict() {
    if !git_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    git(root, &["init", "-b", "main"]);
    fs::write(root.join("app.py"), "def f():\n    a = 1\n    return a\n").unwrap();
    git(root, &["add", "."]);
    git(root, &["commit", "-m", "initial"]);

    git(root, &["checkout", "-b", "feature"]);
    fs::write(root.join("app.py"), "def f():\n    a = 10\n    return a\n").unwrap();
    git(root, &["commit", "-am", "ours"]);

    git(root, &["checkout", "main"]);
    fs::write(root.join("app.py"), "def f():\n    a = 99\n    return a\n").unwrap();
    git(root, &["commit", "-am", "theirs"]);

    let source = LocalGitSource::new(root.to_path_buf()).unwrap();
    let changes = source.branch_changes("main", "feature").unwrap();
    let roots = build_diff_tree(&changes, ViewMode::Tree);

    let file = &roots[0];
    assert!(file.has_conflict);
    let f = &file.children[0];
    assert!(f.has_conflict);
    let sources = f.conflict.as_ref().expect("conflict sources");
    assert!(sources.ours.contains("a = 10"));
    assert!(sources.theirs.contains("a = 99"));
    assert!(f.source.as_deref().unwrap().contains("<<<<<<< ours"));
}

#[test]
fn test_flat_mode_collapses_deep_paths() {
    if !git_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    git(root, &["init", "-b", "main"]);
    fs::create_dir_all(root.join("src/backend/core")).unwrap();
    fs::write(root.join("src/backend/core/engine.py"), "def run():\n    pass\n").unwrap();
    git(root, &["add", "."]);
    git(root, &["commit", "-m", "initial"]);

    git(root, &["checkout", "-b", "feature"]);
    fs::write(
        root.join("src/backend/core/engine.py"),
        "def run():\n    done = 1\n",
    )
    .unwrap();
    git(root, &["commit", "-am", "change run"]);

    let source = LocalGitSource::new(root.to_path_buf()).unwrap();
    let changes = source.branch_changes("main", "feature").unwrap();
    let roots = build_diff_tree(&changes, ViewMode::Flat);

    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].label, "src/backend/core");
    assert_eq!(roots[0].children[0].label, "engine.py");
}

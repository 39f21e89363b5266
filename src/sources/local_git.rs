//! Reads branch comparisons out of a local git repository by shelling out to
//! the `git` CLI.
//!
//! `branch_changes` is the entry point the engine consumes: it diffs two
//! branches from their merge-base and emits one `FileChange` per changed
//! file. Files touched by only one branch carry a unified diff; files
//! touched by both branches since the merge-base carry the three full texts
//! so the mapper can run conflict analysis.

use crate::engine::FileChange;
use crate::mapper::ChangeInput;
use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;
use std::process::Command;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LocalGitError {
    #[error("Git error: {0}")]
    Git(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Not a git repository")]
    NotARepo,
}

/// Local and remote branch names, each sorted by most recent commit.
#[derive(Debug, Clone, Serialize)]
pub struct BranchList {
    pub local: Vec<String>,
    pub remote: Vec<String>,
}

#[derive(Debug)]
pub struct LocalGitSource {
    repo_path: PathBuf,
}

impl LocalGitSource {
    pub fn new(repo_path: PathBuf) -> Result<Self, LocalGitError> {
        if !repo_path.join(".git").exists() {
            return Err(LocalGitError::NotARepo);
        }
        Ok(Self { repo_path })
    }

    /// Get the current branch name
    pub fn get_current_branch(&self) -> Result<String, LocalGitError> {
        if let Ok(output) = self.run_git(&["rev-parse", "--abbrev-ref", "HEAD"]) {
            return Ok(output.trim().to_owned());
        }
        // Unborn branch: HEAD is symbolic ref but target has no commits
        let output = self.run_git(&["symbolic-ref", "--short", "HEAD"])?;
        Ok(output.trim().to_owned())
    }

    /// Get the default branch name (main or master)
    pub fn get_default_branch(&self) -> Result<String, LocalGitError> {
        // Try to get from remote origin HEAD
        if let Ok(output) = self.run_git(&["symbolic-ref", "refs/remotes/origin/HEAD"]) {
            if let Some(branch) = output.trim().strip_prefix("refs/remotes/origin/") {
                return Ok(branch.to_owned());
            }
        }
        // Fall back to checking if main or master exists
        if self.run_git(&["rev-parse", "--verify", "main"]).is_ok() {
            return Ok("main".to_owned());
        }
        if self.run_git(&["rev-parse", "--verify", "master"]).is_ok() {
            return Ok("master".to_owned());
        }
        // Last resort: use HEAD
        Ok("HEAD".to_owned())
    }

    /// List local and remote branches, sorted by most recent commit date.
    pub fn list_branches(&self) -> Result<BranchList, LocalGitError> {
        let mut local = Vec::new();
        let mut remote = Vec::new();

        let local_output = self.run_git(&[
            "for-each-ref",
            "--sort=-committerdate",
            "--format=%(refname:short)",
            "refs/heads/",
        ])?;
        for line in local_output.lines() {
            let branch = line.trim();
            if !branch.is_empty() {
                local.push(branch.to_owned());
            }
        }

        let remote_output = self.run_git(&[
            "for-each-ref",
            "--sort=-committerdate",
            "--format=%(refname:short)",
            "refs/remotes/",
        ])?;
        for line in remote_output.lines() {
            let branch = line.trim();
            if !branch.is_empty() && !branch.ends_with("/HEAD") {
                remote.push(branch.to_owned());
            }
        }

        local.dedup();
        remote.dedup();

        Ok(BranchList { local, remote })
    }

    /// Get the merge-base between two refs
    pub fn merge_base(&self, ref1: &str, ref2: &str) -> Result<String, LocalGitError> {
        let output = self.run_git(&["merge-base", ref1, ref2])?;
        Ok(output.trim().to_owned())
    }

    /// Full file content at a ref, or `None` if the file does not exist there.
    pub fn file_at_ref(&self, file_path: &str, git_ref: &str) -> Option<String> {
        let ref_spec = format!("{git_ref}:{file_path}");
        self.run_git(&["show", &ref_spec]).ok()
    }

    /// Unified diff for one file between two commits.
    pub fn file_diff(
        &self,
        from_ref: &str,
        to_ref: &str,
        file_path: &str,
    ) -> Result<String, LocalGitError> {
        let range = format!("{from_ref}..{to_ref}");
        self.run_git(&[
            "diff",
            "--histogram",
            "--no-renames",
            "--src-prefix=a/",
            "--dst-prefix=b/",
            &range,
            "--",
            file_path,
        ])
    }

    /// Paths changed between two commits (`git diff --name-status`).
    pub fn changed_paths(&self, from_ref: &str, to_ref: &str) -> Result<Vec<String>, LocalGitError> {
        let range = format!("{from_ref}..{to_ref}");
        let output = self.run_git(&["diff", "--name-status", "--no-renames", &range])?;

        let mut paths = Vec::new();
        for line in output.lines() {
            let parts: Vec<&str> = line.split('\t').collect();
            if parts.len() >= 2 {
                paths.push(parts[1].to_owned());
            }
        }
        Ok(paths)
    }

    /// Collect the change set of `compare` relative to `base`.
    ///
    /// Each file changed on the compare branch since the merge-base yields
    /// one `FileChange`. Files also changed on the base branch in the same
    /// window get the three full texts (merge-base, compare, base) so the
    /// mapper can detect semantic conflicts; the rest carry a plain unified
    /// diff.
    pub fn branch_changes(
        &self,
        base: &str,
        compare: &str,
    ) -> Result<Vec<FileChange>, LocalGitError> {
        let merge_base = match self.merge_base(base, compare) {
            Ok(b) => b,
            Err(_) => {
                log::warn!("no merge-base between {base} and {compare}, using {base}");
                base.to_owned()
            }
        };

        let compare_paths = self.changed_paths(&merge_base, compare)?;
        let base_paths: HashSet<String> = self
            .changed_paths(&merge_base, base)?
            .into_iter()
            .collect();

        let mut changes = Vec::with_capacity(compare_paths.len());
        for path in compare_paths {
            let ancestor_text = self.file_at_ref(&path, &merge_base);
            let compare_text = self.file_at_ref(&path, compare);

            let change = if base_paths.contains(&path) {
                log::debug!("{path} diverged on both branches, running 3-way analysis");
                ChangeInput::ThreeWay {
                    base: ancestor_text.clone(),
                    ours: compare_text.clone().unwrap_or_default(),
                    theirs: self.file_at_ref(&path, base).unwrap_or_default(),
                }
            } else {
                ChangeInput::Unified {
                    diff: self.file_diff(&merge_base, compare, &path)?,
                }
            };

            changes.push(FileChange {
                path,
                old_text: ancestor_text,
                new_text: compare_text,
                change,
            });
        }

        Ok(changes)
    }

    fn run_git(&self, args: &[&str]) -> Result<String, LocalGitError> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_path)
            .output()?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            Err(LocalGitError::Git(
                String::from_utf8_lossy(&output.stderr).to_string(),
            ))
        }
    }
}

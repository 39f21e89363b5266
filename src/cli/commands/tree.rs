use crate::cli::OutputFormat;
use crate::engine::build_diff_tree;
use crate::mapper::Status;
use crate::sources::local_git::LocalGitSource;
use crate::tree::{DiffRecord, RecordKind, ViewMode};
use colored::Colorize;
use std::path::PathBuf;

pub fn run(
    repo_path: &str,
    base: Option<String>,
    compare: Option<String>,
    flat: bool,
    format: OutputFormat,
) -> Result<(), String> {
    let source = LocalGitSource::new(PathBuf::from(repo_path)).map_err(|e| e.to_string())?;

    let base = match base {
        Some(b) => b,
        None => source.get_default_branch().map_err(|e| e.to_string())?,
    };
    let compare = match compare {
        Some(c) => c,
        None => source.get_current_branch().map_err(|e| e.to_string())?,
    };
    if base == compare {
        return Err(format!("Nothing to compare: both branches are '{base}'"));
    }

    let changes = source
        .branch_changes(&base, &compare)
        .map_err(|e| e.to_string())?;
    let mode = if flat { ViewMode::Flat } else { ViewMode::Tree };
    let roots = build_diff_tree(&changes, mode);

    if format == OutputFormat::Json {
        println!(
            "{}",
            serde_json::to_string_pretty(&roots).expect("failed to serialize JSON output")
        );
        return Ok(());
    }

    if roots.is_empty() {
        println!("No changes between {base} and {compare}");
        return Ok(());
    }

    println!("{} {}..{}", "Comparing".dimmed(), base, compare.bold());
    println!();
    for root in &roots {
        print_record(root, 0);
    }

    let (changed, conflicted) = count_changes(&roots);
    let mut summary = format!("{changed} changed definition(s)");
    if conflicted > 0 {
        summary.push_str(&format!(", {}", format!("{conflicted} conflicted").red()));
    }
    println!();
    println!("{} {summary}", "Total:".dimmed());

    Ok(())
}

fn print_record(record: &DiffRecord, depth: usize) {
    let indent = "  ".repeat(depth);
    let prefix = status_prefix(record.status);
    let conflict_mark = if record.has_conflict {
        format!(" {}", "!".red().bold())
    } else {
        String::new()
    };

    match record.kind {
        RecordKind::Folder => {
            println!("{indent}{prefix} {}{conflict_mark}", record.label.bold());
        }
        RecordKind::File => {
            println!("{indent}{prefix} {}{conflict_mark}", record.label);
        }
        RecordKind::Symbol => {
            let position = record
                .code_position
                .as_ref()
                .map(|p| format!("  L{}-{}", p.start_line, p.end_line))
                .unwrap_or_default();
            println!(
                "{indent}{prefix} {}{}{conflict_mark}",
                record.label,
                position.dimmed()
            );
        }
    }

    for child in &record.children {
        print_record(child, depth + 1);
    }
}

fn status_prefix(status: Status) -> String {
    match status {
        Status::Added => "+".green().to_string(),
        Status::Removed => "-".red().to_string(),
        Status::Modified => "~".yellow().to_string(),
        Status::Unchanged => "=".dimmed().to_string(),
    }
}

/// Count changed symbols and conflicted nodes across the tree.
fn count_changes(nodes: &[DiffRecord]) -> (usize, usize) {
    let mut changed = 0;
    let mut conflicted = 0;
    for node in nodes {
        if node.kind == RecordKind::Symbol {
            if !node.status.is_trivial() {
                changed += 1;
            }
            if node.has_conflict {
                conflicted += 1;
            }
        }
        let (c, k) = count_changes(&node.children);
        changed += c;
        conflicted += k;
    }
    (changed, conflicted)
}

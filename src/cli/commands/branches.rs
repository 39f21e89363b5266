use crate::cli::OutputFormat;
use crate::sources::local_git::LocalGitSource;
use colored::Colorize;
use std::path::PathBuf;

pub fn run(repo_path: &str, format: OutputFormat) -> Result<(), String> {
    let source = LocalGitSource::new(PathBuf::from(repo_path)).map_err(|e| e.to_string())?;
    let branches = source.list_branches().map_err(|e| e.to_string())?;
    let current = source.get_current_branch().unwrap_or_default();

    if format == OutputFormat::Json {
        println!(
            "{}",
            serde_json::to_string_pretty(&branches).expect("failed to serialize JSON output")
        );
        return Ok(());
    }

    for branch in &branches.local {
        if *branch == current {
            println!("* {}", branch.green());
        } else {
            println!("  {branch}");
        }
    }

    if !branches.remote.is_empty() {
        println!();
        println!("{}", "remote:".dimmed());
        for branch in &branches.remote {
            println!("  {branch}");
        }
    }

    Ok(())
}

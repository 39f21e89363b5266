use crate::cli::OutputFormat;
use crate::sources::local_git::LocalGitSource;
use crate::symbols::extractor::extract;
use crate::symbols::{Language, SymbolKind};
use colored::Colorize;
use std::path::PathBuf;

pub fn run(
    repo_path: &str,
    file: &str,
    rev: Option<&str>,
    format: OutputFormat,
) -> Result<(), String> {
    let source_text = match rev {
        Some(git_ref) => {
            let source =
                LocalGitSource::new(PathBuf::from(repo_path)).map_err(|e| e.to_string())?;
            source
                .file_at_ref(file, git_ref)
                .ok_or_else(|| format!("'{file}' not found at {git_ref}"))?
        }
        None => std::fs::read_to_string(PathBuf::from(repo_path).join(file))
            .map_err(|e| format!("Failed to read '{file}': {e}"))?,
    };

    let language =
        Language::from_path(file).ok_or_else(|| format!("Unsupported file type: {file}"))?;
    let table = extract(&source_text, language);

    if format == OutputFormat::Json {
        println!(
            "{}",
            serde_json::to_string_pretty(&table).expect("failed to serialize JSON output")
        );
        return Ok(());
    }

    if table.is_empty() {
        println!("No definitions found in {file}");
        return Ok(());
    }

    println!("{}", file.bold());
    for (qualname, span) in &table {
        let depth = qualname.matches('.').count();
        let indent = "  ".repeat(depth + 1);
        println!(
            "{indent}{}{}  {}",
            kind_badge(span.kind),
            span.label(),
            format!("L{}-{}", span.start_line, span.end_line).dimmed()
        );
    }

    Ok(())
}

fn kind_badge(kind: SymbolKind) -> String {
    match kind {
        SymbolKind::Function | SymbolKind::Method => format!("{} ", "fn".yellow()),
        SymbolKind::Class => format!("{}  ", "C".cyan()),
        SymbolKind::Definition => format!("{}  ", "D".magenta()),
    }
}

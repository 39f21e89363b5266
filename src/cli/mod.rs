pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "symdiff")]
#[command(author, version, about = "Diff branches definition-by-definition", long_about = None)]
pub struct Cli {
    /// Repository path (defaults to current directory)
    #[arg(short, long, global = true)]
    pub repo: Option<String>,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List local and remote branches
    Branches,

    /// Show the definitions extracted from one file
    Symbols {
        /// File to parse, relative to the repository root
        file: String,

        /// Read the file at this ref instead of the working tree
        #[arg(long)]
        rev: Option<String>,
    },

    /// Show the symbol-level change tree between two branches
    Tree {
        /// Base branch (defaults to the repository's default branch)
        base: Option<String>,

        /// Branch to compare (defaults to the current branch)
        compare: Option<String>,

        /// Collapse single-child folder chains
        #[arg(long)]
        flat: bool,
    },
}

impl Cli {
    /// Get the repository path, using current directory as default
    pub fn get_repo_path(&self) -> Result<String, String> {
        if let Some(ref repo) = self.repo {
            return Ok(repo.clone());
        }

        // Check current working directory and walk up to find .git
        let cwd = std::env::current_dir().map_err(|e| e.to_string())?;

        let mut current = cwd.as_path();
        loop {
            if current.join(".git").exists() {
                return Ok(current.to_string_lossy().to_string());
            }
            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }

        Err("Not a git repository. Use --repo to specify a repository path.".to_owned())
    }
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<(), String> {
    let repo_path = cli.get_repo_path()?;

    match cli.command {
        Commands::Branches => commands::branches::run(&repo_path, cli.format),
        Commands::Symbols { file, rev } => {
            commands::symbols::run(&repo_path, &file, rev.as_deref(), cli.format)
        }
        Commands::Tree {
            base,
            compare,
            flat,
        } => commands::tree::run(&repo_path, base, compare, flat, cli.format),
    }
}

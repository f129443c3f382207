//! CLI argument parsing using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// mcql - lint and inspect Marketing Cloud query activity SQL
#[derive(Parser, Debug)]
#[command(name = "mcql")]
#[command(about = "Lint SQL written for Marketing Cloud query activities", long_about = None)]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Lint SQL files (reads from stdin if none provided)
    Lint(LintArgs),

    /// Print the cursor context at a byte offset
    Context(ContextArgs),

    /// Print the JSON schema of the worker protocol and configuration types
    Schema {
        /// Compact JSON output (no pretty-printing)
        #[arg(short, long)]
        compact: bool,
    },

    /// Serve the lint worker protocol over stdin/stdout, one JSON message per line
    Worker(WorkerArgs),
}

#[derive(clap::Args, Debug)]
pub struct LintArgs {
    /// SQL files to lint
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "text", value_enum)]
    pub format: OutputFormat,

    /// JSON file with Data Extension metadata (array of tables)
    #[arg(short, long, value_name = "FILE")]
    pub metadata: Option<PathBuf>,

    /// Comma-separated list of diagnostic codes to exclude (e.g., ORDER_BY_WITHOUT_TOP)
    #[arg(long, value_delimiter = ',')]
    pub exclude_rules: Vec<String>,

    /// Output file (defaults to stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Compact JSON output (no pretty-printing)
    #[arg(short, long)]
    pub compact: bool,
}

#[derive(clap::Args, Debug)]
pub struct ContextArgs {
    /// SQL file (reads from stdin if omitted)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Cursor byte offset; defaults to the end of the input
    #[arg(long)]
    pub cursor: Option<usize>,

    /// JSON file with Data Extension metadata, used for the inline suggestion
    #[arg(short, long, value_name = "FILE")]
    pub metadata: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "text", value_enum)]
    pub format: OutputFormat,
}

#[derive(clap::Args, Debug)]
pub struct WorkerArgs {
    /// JSON file with Data Extension metadata
    #[arg(short, long, value_name = "FILE")]
    pub metadata: Option<PathBuf>,

    /// Comma-separated list of diagnostic codes to exclude
    #[arg(long, value_delimiter = ',')]
    pub exclude_rules: Vec<String>,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report
    Text,
    /// JSON
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lint() {
        let args = Args::parse_from(["mcql", "lint", "a.sql", "b.sql", "--format", "json"]);
        let Command::Lint(lint) = args.command else {
            panic!("expected lint");
        };
        assert_eq!(lint.files.len(), 2);
        assert_eq!(lint.format, OutputFormat::Json);
    }

    #[test]
    fn test_parse_exclude_rules() {
        let args = Args::parse_from([
            "mcql",
            "lint",
            "--exclude-rules",
            "ORDER_BY_WITHOUT_TOP,LIMIT_NOT_SUPPORTED",
        ]);
        let Command::Lint(lint) = args.command else {
            panic!("expected lint");
        };
        assert_eq!(
            lint.exclude_rules,
            vec!["ORDER_BY_WITHOUT_TOP", "LIMIT_NOT_SUPPORTED"]
        );
    }

    #[test]
    fn test_parse_context() {
        let args = Args::parse_from(["mcql", "context", "--cursor", "12", "q.sql"]);
        let Command::Context(context) = args.command else {
            panic!("expected context");
        };
        assert_eq!(context.cursor, Some(12));
        assert_eq!(context.file, Some(PathBuf::from("q.sql")));
    }

    #[test]
    fn test_parse_worker() {
        let args = Args::parse_from(["mcql", "worker"]);
        assert!(matches!(args.command, Command::Worker(_)));
    }

    #[test]
    fn test_invalid_format_rejected() {
        assert!(Args::try_parse_from(["mcql", "lint", "--format", "mermaid"]).is_err());
    }
}

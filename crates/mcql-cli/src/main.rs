//! mcql CLI - lint Marketing Cloud query activity SQL

use mcql_cli::cli::{Args, Command, ContextArgs, LintArgs, OutputFormat, WorkerArgs};
use mcql_cli::input;
use mcql_cli::output::{
    format_context_json, format_context_text, format_lint_json, format_lint_results,
    FileLintResult,
};
use mcql_cli::{schema, worker};

use anyhow::{Context, Result};
use clap::Parser;
use is_terminal::IsTerminal;
use mcql_core::{cursor_context, inline_suggestion, should_trigger, LintConfig, Linter};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

/// Lint violations found.
const EXIT_FAILURE: u8 = 1;
/// Configuration or I/O error (unreadable input, invalid metadata).
const EXIT_CONFIG_ERROR: u8 = 66;

fn main() -> ExitCode {
    let args = Args::parse();

    let result = match args.command {
        Command::Lint(lint) => run_lint(lint),
        Command::Context(context) => run_context(context).map(|()| false),
        Command::Schema { compact } => {
            write_output(&None, &schema::format_schema(compact)).map(|()| false)
        }
        Command::Worker(worker) => run_worker(worker).map(|()| false),
    };

    match result {
        Ok(true) => ExitCode::from(EXIT_FAILURE),
        Ok(false) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("mcql: error: {e:#}");
            ExitCode::from(EXIT_CONFIG_ERROR)
        }
    }
}

/// Returns true when any file has violations.
fn run_lint(args: LintArgs) -> Result<bool> {
    let started_at = Instant::now();

    let sources = input::read_input(&args.files)?;
    let linter = build_linter(args.metadata, args.exclude_rules)?;

    let results: Vec<FileLintResult> = sources
        .iter()
        .map(|source| {
            let diagnostics = linter.lint(&source.content);
            FileLintResult::from_diagnostics(&source.name, &source.content, &diagnostics)
        })
        .collect();

    let has_violations = results.iter().any(|r| !r.issues.is_empty());
    let colored = args.output.is_none() && io::stdout().is_terminal();

    let output_str = match args.format {
        OutputFormat::Json => format_lint_json(&results, args.compact),
        OutputFormat::Text => format_lint_results(&results, colored, started_at.elapsed()),
    };
    write_output(&args.output, &output_str)?;

    Ok(has_violations)
}

fn run_context(args: ContextArgs) -> Result<()> {
    let source = input::read_single(args.file.as_deref())?;
    let metadata = input::load_metadata(args.metadata.as_deref())?;
    let sql = &source.content;
    let cursor = args.cursor.unwrap_or(sql.len());

    let context = cursor_context(sql, cursor);
    let suggestion = inline_suggestion(sql, cursor, &metadata);
    let trigger = sql.get(..cursor.min(sql.len())).and_then(|s| s.chars().next_back());
    let open = should_trigger(trigger, &context.current_word);

    let out = match args.format {
        OutputFormat::Text => format_context_text(&context, suggestion.as_ref(), open),
        OutputFormat::Json => format_context_json(&context, suggestion.as_ref(), open),
    };
    write_output(&None, &out)
}

fn run_worker(args: WorkerArgs) -> Result<()> {
    let linter = Arc::new(build_linter(args.metadata, args.exclude_rules)?);
    let runtime = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;

    runtime.block_on(async move {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        worker::serve(linter, stdin, tokio::io::stdout()).await
    })?;
    Ok(())
}

fn build_linter(metadata: Option<PathBuf>, exclude_rules: Vec<String>) -> Result<Linter> {
    let metadata = input::load_metadata(metadata.as_deref())?;
    let config = LintConfig {
        disabled_rules: exclude_rules,
        ..LintConfig::default()
    };
    Ok(Linter::new(config).with_metadata(metadata))
}

fn write_output(path: &Option<PathBuf>, content: &str) -> Result<()> {
    if let Some(path) = path {
        fs::write(path, content)
            .with_context(|| format!("Failed to write to {}", path.display()))?;
    } else {
        io::stdout()
            .write_all(content.as_bytes())
            .context("Failed to write to stdout")?;
    }
    Ok(())
}

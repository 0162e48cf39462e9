//! ScssLint bridge CLI
//!
//! Runs the `scss-lint` gem against a single file from the command
//! line, or starts the LSP server editors talk to.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use scsslint_core::{
    CycleOutcome, LintEngine, LintRequest, LintSettings, Severity, SkipReason, SystemProcessHost,
    TriggerEvent,
};

/// ScssLint bridge - scss-lint diagnostics for editors
#[derive(Parser)]
#[command(name = "scsslint-bridge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Lint a single file and print its diagnostics
    Lint {
        /// File to lint
        file: PathBuf,

        /// Directory holding .scss-lint.yml, instead of searching
        /// upward from the file
        #[arg(long)]
        config_dir: Option<PathBuf>,
    },

    /// Start the LSP server on stdio
    Server,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(has_errors) => {
            if has_errors {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            error!("{:?}", e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<bool> {
    match cli.command {
        Commands::Lint { file, config_dir } => run_lint(file, config_dir),
        Commands::Server => run_server().map(|_| false),
    }
}

fn run_server() -> Result<()> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .into_diagnostic()?
        .block_on(async {
            scsslint_lsp::run().await;
        });
    Ok(())
}

fn run_lint(file: PathBuf, config_dir: Option<PathBuf>) -> Result<bool> {
    let document_path = std::path::absolute(&file).into_diagnostic()?;
    let document_text = std::fs::read_to_string(&document_path).into_diagnostic()?;
    let workspace_root = std::env::current_dir().into_diagnostic().ok();

    let settings = LintSettings {
        config_dir,
        ..LintSettings::default()
    };

    let engine = LintEngine::new(Arc::new(SystemProcessHost::new()));
    let request = LintRequest {
        document_path,
        document_text,
        trigger: TriggerEvent::Init,
        workspace_root,
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .into_diagnostic()?;
    let outcome = runtime.block_on(async { engine.run_cycle(&request, &settings).await });

    let result = match outcome {
        CycleOutcome::Skipped(SkipReason::Excluded) => {
            info!("{} matches an exclude pattern", request.document_path.display());
            return Ok(false);
        }
        CycleOutcome::Completed { result, .. } => result,
    };

    for fault in &result.faults {
        eprintln!("{}", fault.message);
    }

    for diag in &result.diagnostics {
        let severity = match diag.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        println!(
            "{}:{}:{} {}: {}",
            request.document_path.display(),
            diag.range.start_line + 1,
            diag.range.start_col + 1,
            severity,
            diag.message
        );
    }

    let errors = result.errors().count();
    let warnings = result.warnings().count();
    println!("{} errors, {} warnings", errors, warnings);

    if !result.faults.is_empty() {
        return Err(miette::miette!("linter did not run cleanly"));
    }

    Ok(errors > 0)
}

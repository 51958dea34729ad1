//! # diag-sentinel - Diagnostics for C++/JUCE audio projects
//!
//! Clasifica código fuente, logs de build y logs de crash con reglas de
//! expresiones regulares, vigila los directorios de logs en tiempo real y
//! mantiene un historial acotado de eventos con reportes Markdown.

use clap::Parser;
use colored::Colorize;
use commands::{Cli, CommandContext, Commands, Outcome};
use tracing_subscriber::EnvFilter;

// Módulos
pub mod classifier;
pub mod commands;
pub mod config;
pub mod daemon;
pub mod diagnostic;
pub mod files;
pub mod fixer;
pub mod report;
pub mod rules;
pub mod scanner;
pub mod store;
pub mod ui;

/// Código de salida para errores de configuración o fallos fatales.
const EXIT_FATAL: i32 = 2;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<Outcome> {
    if let Commands::Init { force } = cli.command {
        let root = commands::resolve_root(cli.project_root)?;
        commands::init::handle_init_command(&root, force)?;
        return Ok(Outcome::Clean);
    }

    let ctx = CommandContext::load(cli.project_root, cli.quiet)?;
    tracing::info!(root = %ctx.root.display(), sets = ctx.engine.rule_sets().len(), "proyecto cargado");

    match cli.command {
        Commands::Scan { options } => commands::scan::run_scan(&ctx, &options),
        Commands::File { path, options } => commands::scan::run_file(&ctx, &path, &options),
        Commands::Logs => commands::scan::run_logs(&ctx),
        Commands::Crash { path } => commands::scan::run_crash(&ctx, &path),
        Commands::Watch => commands::monitor::start_monitor(&ctx),
        Commands::Summary => commands::summary::run_summary(&ctx),
        Commands::Rules => commands::rules::handle_rules_command(&ctx),
        Commands::Init { .. } => Ok(Outcome::Clean),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let code = match run(cli) {
        Ok(outcome) => outcome.exit_code(),
        Err(e) => {
            eprintln!("{} {:#}", "❌ Error:".red().bold(), e);
            EXIT_FATAL
        }
    };
    std::process::exit(code);
}

//! Comandos de una sola pasada: `scan`, `file`, `logs`, `crash`.

use crate::classifier::LogRole;
use crate::commands::{write_report, CommandContext, Outcome};
use crate::report::{self, ReportOptions};
use crate::scanner::{self, ScanResult};
use crate::store::EventStore;
use crate::{fixer, ui};
use anyhow::Context;
use chrono::Local;
use clap::Args;
use colored::*;
use std::path::{Path, PathBuf};

const REPORT_TITLE: &str = "Code Quality Report";

/// Opciones comunes a `scan` y `file`.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceScanOptions {
    /// Ruta del reporte (por defecto runtime/code_quality_report_<fecha>.md)
    #[arg(long)]
    pub report: Option<PathBuf>,
    /// Planifica las correcciones automáticas seguras
    #[arg(long)]
    pub fix: bool,
    /// Con --fix: muestra qué se corregiría sin tocar archivos
    #[arg(long, requires = "fix")]
    pub dry_run: bool,
}

pub fn run_scan(ctx: &CommandContext, options: &SourceScanOptions) -> anyhow::Result<Outcome> {
    let roots: Vec<PathBuf> = ctx
        .config
        .source_roots
        .iter()
        .map(|root| ctx.resolve(root))
        .collect();

    let pb = (!ctx.quiet).then(|| ui::crear_progreso("Escaneando código fuente..."));
    let result = scanner::scan_tree(
        &ctx.engine,
        &roots,
        &ctx.config.source_extensions,
        &ctx.config.ignore_patterns,
    );
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    finish_source_scan(ctx, &result, options)
}

pub fn run_file(
    ctx: &CommandContext,
    path: &Path,
    options: &SourceScanOptions,
) -> anyhow::Result<Outcome> {
    let path = ctx.resolve(path);
    let result = scanner::scan_single_file(&ctx.engine, &path);
    finish_source_scan(ctx, &result, options)
}

/// Resumen en consola, reporte Markdown y, con `--fix`, el plan de correcciones.
fn finish_source_scan(
    ctx: &CommandContext,
    result: &ScanResult,
    options: &SourceScanOptions,
) -> anyhow::Result<Outcome> {
    ui::print_result(result, ctx.quiet);

    let now = Local::now().naive_local();
    let report_path = match &options.report {
        Some(path) => ctx.resolve(path),
        None => ctx.report_path("code_quality_report", now),
    };
    let report_options = ReportOptions {
        title: REPORT_TITLE.to_string(),
        generated_at: now,
        group_by_category: false,
    };
    write_report(&report_path, &report::summarize(&result.diagnostics, &report_options))?;
    println!("📄 Reporte guardado en {}", report_path.display());

    if options.fix {
        let summary = fixer::apply(&result.diagnostics, options.dry_run);
        println!(
            "{}",
            format!(
                "🔧 Correcciones: {} planificadas, {} omitidas",
                summary.planned, summary.skipped
            )
            .cyan()
        );
    }

    Ok(Outcome::from_failures(result.has_failures()))
}

pub fn run_logs(ctx: &CommandContext) -> anyhow::Result<Outcome> {
    let store = ctx.open_store()?;
    let targets: Vec<_> = ctx
        .config
        .log_dirs
        .iter()
        .map(|target| target.resolved(&ctx.root))
        .collect();

    let pb = (!ctx.quiet).then(|| ui::crear_progreso("Analizando logs existentes..."));
    let result = scanner::scan_logs(&ctx.engine, &targets, &ctx.config.ignore_patterns);
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    record(&store, &result)?;
    ui::print_result(&result, ctx.quiet);
    Ok(Outcome::from_failures(result.has_failures()))
}

pub fn run_crash(ctx: &CommandContext, path: &Path) -> anyhow::Result<Outcome> {
    let store = ctx.open_store()?;
    let path = ctx.resolve(path);
    let result = scanner::scan_log_file(&ctx.engine, &path, LogRole::Runtime);
    record(&store, &result)?;
    ui::print_result(&result, ctx.quiet);
    Ok(Outcome::from_failures(result.has_failures()))
}

fn record(store: &EventStore, result: &ScanResult) -> anyhow::Result<()> {
    let written = store
        .append_many(&result.diagnostics)
        .context("no se pudieron guardar los diagnósticos")?;
    tracing::info!(
        written,
        capacity = store.capacity(),
        store = %store.path().display(),
        "diagnósticos registrados"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn context(tmp: &TempDir) -> CommandContext {
        CommandContext::load(Some(tmp.path().to_path_buf()), true).unwrap()
    }

    #[test]
    fn test_scan_writes_report_and_fails_on_errors() {
        let tmp = TempDir::new().unwrap();
        let core = tmp.path().join("Source/Core");
        fs::create_dir_all(&core).unwrap();
        fs::write(core.join("PluginProcessor.cpp"), "std::mutex m;\n").unwrap();

        let report_path = tmp.path().join("out/report.md");
        let options = SourceScanOptions {
            report: Some(report_path.clone()),
            ..Default::default()
        };
        let outcome = run_scan(&context(&tmp), &options).unwrap();
        assert_eq!(outcome, Outcome::Failures);

        let text = fs::read_to_string(&report_path).unwrap();
        assert!(text.contains("## Error Issues (1)"));
        assert!(text.contains("blocking-primitive-in-realtime-context"));
    }

    #[test]
    fn test_scan_of_warnings_only_is_clean() {
        let tmp = TempDir::new().unwrap();
        let ui_dir = tmp.path().join("Source/UI");
        fs::create_dir_all(&ui_dir).unwrap();
        fs::write(ui_dir.join("Panel.cpp"), "memcpy(a, b, n);\n").unwrap();

        let options = SourceScanOptions {
            report: None,
            fix: true,
            dry_run: true,
        };
        let outcome = run_scan(&context(&tmp), &options).unwrap();
        assert_eq!(outcome, Outcome::Clean);
        let reports: Vec<_> = fs::read_dir(tmp.path().join("runtime")).unwrap().collect();
        assert_eq!(reports.len(), 1);
    }

    #[test]
    fn test_crash_appends_to_store() {
        let tmp = TempDir::new().unwrap();
        let dump = tmp.path().join("latest.dmp");
        fs::write(&dump, "Access violation reading location 0xDEADBEEF\n").unwrap();

        let ctx = context(&tmp);
        assert_eq!(run_crash(&ctx, &dump).unwrap(), Outcome::Failures);

        let stored = ctx.open_store().unwrap().load_all();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].category, "access-violation");
    }

    #[test]
    fn test_logs_without_directories_is_clean() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(&tmp);
        assert_eq!(run_logs(&ctx).unwrap(), Outcome::Clean);
        assert!(ctx.open_store().unwrap().load_all().is_empty());
    }

    #[test]
    fn test_file_scan_writes_default_report() {
        let tmp = TempDir::new().unwrap();
        let core = tmp.path().join("Source/Core");
        fs::create_dir_all(&core).unwrap();
        let source = core.join("PluginProcessor.cpp");
        fs::write(&source, "void f() {\n    std::mutex m;\n}\n").unwrap();

        let outcome = run_file(&context(&tmp), &source, &SourceScanOptions::default()).unwrap();
        assert_eq!(outcome, Outcome::Failures);

        let reports: Vec<PathBuf> = fs::read_dir(tmp.path().join("runtime"))
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        assert_eq!(reports.len(), 1, "got: {:?}", reports);
        let name = reports[0].file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("code_quality_report_") && name.ends_with(".md"));

        let text = fs::read_to_string(&reports[0]).unwrap();
        assert!(text.contains("blocking-primitive-in-realtime-context"));
        assert!(text.contains("PluginProcessor.cpp:2"));
    }

    #[test]
    fn test_logs_fail_before_scanning_when_state_dir_is_unwritable() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("runtime"), "not a directory").unwrap();
        let build = tmp.path().join("build");
        fs::create_dir_all(&build).unwrap();
        fs::write(build.join("a.log"), "fatal error C1083: Cannot open include file: 'foo.h'\n").unwrap();

        let ctx = context(&tmp);
        let err = run_logs(&ctx).unwrap_err();
        assert!(
            format!("{:#}", err).contains("no se pudo abrir el almacén"),
            "got: {:#}",
            err
        );
        assert_eq!(fs::read_to_string(tmp.path().join("runtime")).unwrap(), "not a directory");
        assert!(run_crash(&ctx, &build.join("a.log")).is_err());
    }
}

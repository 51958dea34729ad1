use crate::commands::{CommandContext, Outcome};
use crate::config::{self, LogTarget};
use crate::daemon::WatchDaemon;
use crate::ui;
use anyhow::Context;
use colored::*;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const TICK: Duration = Duration::from_secs(1);

/// Modo continuo: vigila los directorios de logs hasta recibir Ctrl-C.
pub fn start_monitor(ctx: &CommandContext) -> anyhow::Result<Outcome> {
    ui::mostrar_banner();

    let store = Arc::new(ctx.open_store()?);
    let targets: Vec<LogTarget> = ctx
        .config
        .watch_targets
        .iter()
        .map(|target| target.resolved(&ctx.root))
        .collect();

    let mut daemon = WatchDaemon::new(
        Arc::clone(&ctx.engine),
        Arc::clone(&store),
        Duration::from_millis(ctx.config.debounce_ms),
    )
    .on_diagnostic(|d| ui::print_diagnostic(d));

    let report = daemon.start(&targets).context("no se pudo iniciar la vigilancia")?;
    for dir in &report.skipped {
        println!("   ℹ️  {} no existe, se omite", dir.display());
    }
    if report.watched.is_empty() {
        println!("{}", "   ⚠️  Ningún directorio de logs existe todavía; nada que vigilar.".yellow());
        daemon.stop()?;
        return Ok(Outcome::Clean);
    }
    for dir in &report.watched {
        println!("   👀 Vigilando {}", dir.display());
    }

    println!(
        "\n{} {}",
        format!("🛡️ diag-sentinel v{} activo en:", config::SENTINEL_VERSION)
            .green()
            .bold(),
        ctx.root.display()
    );
    println!("   Eventos guardados en {}. Ctrl-C para salir.", store.path().display());

    let (stop_tx, stop_rx) = mpsc::channel::<()>();
    thread::Builder::new()
        .name("diag-signal".to_string())
        .spawn(move || {
            let rt = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
                Ok(rt) => rt,
                Err(e) => {
                    tracing::error!(error = %e, "no se pudo crear el runtime de señales");
                    return;
                }
            };
            rt.block_on(async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!(error = %e, "no se pudo escuchar Ctrl-C");
                    return;
                }
                let _ = stop_tx.send(());
            });
        })
        .context("no se pudo lanzar el hilo de señales")?;

    loop {
        match stop_rx.recv_timeout(TICK) {
            Ok(()) => break,
            Err(RecvTimeoutError::Timeout) => continue,
            // Manejador no registrado: la señal por defecto termina el proceso.
            Err(RecvTimeoutError::Disconnected) => thread::sleep(TICK),
        }
    }

    println!("\n{}", "🛑 Deteniendo, procesando eventos pendientes...".yellow());
    let stats = daemon.stop()?;
    println!(
        "   ✅ {} archivos procesados, {} diagnósticos registrados",
        stats.jobs, stats.diagnostics
    );
    if stats.dropped > 0 {
        println!(
            "{}",
            format!("   ⚠️  {} eventos descartados por cola llena", stats.dropped).yellow()
        );
    }
    Ok(Outcome::Clean)
}

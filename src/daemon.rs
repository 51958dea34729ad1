//! Watch daemon
//!
//! Vigila directorios de logs con `notify`, reclasifica cada archivo que se
//! crea o modifica y agrega los diagnósticos al almacén. Los callbacks de
//! `notify` solo encolan trabajos en una cola acotada; un único hilo worker
//! los consume y es el único escritor del almacén en este modo.

use crate::classifier::{Classifier, LogRole};
use crate::config::LogTarget;
use crate::diagnostic::Diagnostic;
use crate::rules::RuleEngine;
use crate::store::EventStore;
use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;

pub const QUEUE_CAPACITY: usize = 1024;
const WORKER_NAME: &str = "diag-watch-worker";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonState {
    Idle,
    Watching,
    Stopped,
}

impl fmt::Display for DaemonState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DaemonState::Idle => "idle",
            DaemonState::Watching => "watching",
            DaemonState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("no se puede iniciar el daemon en estado {0}")]
    InvalidTransition(DaemonState),
    #[error("no se pudo vigilar {dir}: {source}")]
    Watch {
        dir: String,
        #[source]
        source: notify::Error,
    },
    #[error("no se pudo lanzar el hilo worker: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("el hilo worker terminó con pánico")]
    WorkerPanicked,
}

/// Archivo a reclasificar con las reglas de su rol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchJob {
    pub path: PathBuf,
    pub role: LogRole,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WorkerStats {
    pub jobs: usize,
    pub diagnostics: usize,
    /// Eventos descartados por cola llena.
    pub dropped: usize,
}

/// Directorios efectivamente vigilados y los omitidos por no existir.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StartReport {
    pub watched: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

pub type DiagnosticSink = Arc<dyn Fn(&Diagnostic) + Send + Sync>;

pub struct WatchDaemon {
    engine: Arc<RuleEngine>,
    store: Arc<EventStore>,
    debounce: Duration,
    sink: Option<DiagnosticSink>,
    state: DaemonState,
    watchers: Vec<RecommendedWatcher>,
    worker: Option<JoinHandle<WorkerStats>>,
    dropped: Arc<AtomicUsize>,
}

impl WatchDaemon {
    pub fn new(engine: Arc<RuleEngine>, store: Arc<EventStore>, debounce: Duration) -> Self {
        Self {
            engine,
            store,
            debounce,
            sink: None,
            state: DaemonState::Idle,
            watchers: Vec::new(),
            worker: None,
            dropped: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Callback por cada diagnóstico nuevo, después de persistirlo.
    pub fn on_diagnostic<F>(mut self, sink: F) -> Self
    where
        F: Fn(&Diagnostic) + Send + Sync + 'static,
    {
        self.sink = Some(Arc::new(sink));
        self
    }

    pub fn state(&self) -> DaemonState {
        self.state
    }

    /// `Idle -> Watching`. Si falla un registro, no queda ningún watcher activo
    /// y el daemon sigue en `Idle`.
    pub fn start(&mut self, targets: &[LogTarget]) -> Result<StartReport, DaemonError> {
        if self.state != DaemonState::Idle {
            return Err(DaemonError::InvalidTransition(self.state));
        }

        let (tx, rx) = mpsc::sync_channel::<WatchJob>(QUEUE_CAPACITY);
        let mut report = StartReport::default();
        let mut watchers = Vec::new();

        for target in targets {
            if !target.dir.is_dir() {
                tracing::info!(dir = %target.dir.display(), "directorio inexistente, no se vigila");
                report.skipped.push(target.dir.clone());
                continue;
            }
            watchers.push(watch_target(target, tx.clone(), Arc::clone(&self.dropped))?);
            tracing::info!(dir = %target.dir.display(), role = ?target.role, "vigilando");
            report.watched.push(target.dir.clone());
        }
        // Solo los watchers conservan emisores: al soltarlos, el worker ve el fin de la cola.
        drop(tx);

        let engine = Arc::clone(&self.engine);
        let store = Arc::clone(&self.store);
        let sink = self.sink.clone();
        let debounce = self.debounce;
        let worker = thread::Builder::new()
            .name(WORKER_NAME.to_string())
            .spawn(move || worker_loop(rx, &engine, &store, debounce, sink.as_deref()))
            .map_err(DaemonError::Spawn)?;

        self.watchers = watchers;
        self.worker = Some(worker);
        self.state = DaemonState::Watching;
        Ok(report)
    }

    /// Cancela los watchers, espera a que el worker vacíe la cola y lo une.
    /// Es idempotente; `Idle -> Stopped` también es válido.
    pub fn stop(&mut self) -> Result<WorkerStats, DaemonError> {
        let previous = self.state;
        self.state = DaemonState::Stopped;
        if previous != DaemonState::Watching {
            return Ok(WorkerStats::default());
        }

        self.watchers.clear();
        let mut stats = match self.worker.take() {
            Some(handle) => handle.join().map_err(|_| DaemonError::WorkerPanicked)?,
            None => WorkerStats::default(),
        };
        stats.dropped = self.dropped.load(Ordering::Relaxed);
        tracing::info!(
            jobs = stats.jobs,
            diagnostics = stats.diagnostics,
            dropped = stats.dropped,
            "daemon detenido"
        );
        Ok(stats)
    }
}

impl Drop for WatchDaemon {
    fn drop(&mut self) {
        if self.state == DaemonState::Watching {
            if let Err(e) = self.stop() {
                tracing::error!(error = %e, "error al detener el daemon");
            }
        }
    }
}

fn is_relevant(kind: &EventKind) -> bool {
    match kind {
        EventKind::Create(_) => true,
        EventKind::Modify(ModifyKind::Metadata(_)) => false,
        EventKind::Modify(_) => true,
        _ => false,
    }
}

/// Encola sin bloquear el hilo de `notify`. Con la cola llena el evento se
/// descarta y se cuenta. Devuelve `false` si el worker ya terminó.
fn enqueue(tx: &SyncSender<WatchJob>, job: WatchJob, dropped: &AtomicUsize) -> bool {
    match tx.try_send(job) {
        Ok(()) => true,
        Err(TrySendError::Full(job)) => {
            dropped.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(path = %job.path.display(), "cola de vigilancia llena, evento descartado");
            true
        }
        Err(TrySendError::Disconnected(_)) => false,
    }
}

fn watch_target(
    target: &LogTarget,
    tx: SyncSender<WatchJob>,
    dropped: Arc<AtomicUsize>,
) -> Result<RecommendedWatcher, DaemonError> {
    let watch_err = |source| DaemonError::Watch {
        dir: target.dir.display().to_string(),
        source,
    };
    let filter = target.clone();

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(event) if is_relevant(&event.kind) => {
            for path in event.paths {
                if !filter.accepts(&path) {
                    continue;
                }
                if !enqueue(&tx, WatchJob { path, role: filter.role }, &dropped) {
                    break;
                }
            }
        }
        Ok(_) => {}
        Err(e) => tracing::warn!(error = %e, "error del watcher"),
    })
    .map_err(watch_err)?;

    watcher
        .watch(&target.dir, RecursiveMode::Recursive)
        .map_err(watch_err)?;
    Ok(watcher)
}

/// Consume la cola hasta que todos los emisores se cierran.
///
/// Tras cada trabajo espera `debounce` y absorbe lo encolado mientras tanto,
/// sin repetir trabajos, para que una ráfaga de eventos sobre un archivo lo
/// clasifique una sola vez.
fn worker_loop(
    rx: Receiver<WatchJob>,
    engine: &RuleEngine,
    store: &EventStore,
    debounce: Duration,
    sink: Option<&(dyn Fn(&Diagnostic) + Send + Sync)>,
) -> WorkerStats {
    let mut stats = WorkerStats::default();

    while let Ok(first) = rx.recv() {
        if !debounce.is_zero() {
            thread::sleep(debounce);
        }
        let mut batch = vec![first];
        while let Ok(job) = rx.try_recv() {
            if !batch.contains(&job) {
                batch.push(job);
            }
        }

        for job in batch {
            stats.jobs += 1;
            stats.diagnostics += handle_job(engine, store, &job, sink);
        }
    }

    stats
}

/// Clasifica un archivo, persiste el resultado y lo entrega al sink.
fn handle_job(
    engine: &RuleEngine,
    store: &EventStore,
    job: &WatchJob,
    sink: Option<&(dyn Fn(&Diagnostic) + Send + Sync)>,
) -> usize {
    let diagnostics = Classifier::new(engine).classify_log_file(&job.path, job.role);
    if diagnostics.is_empty() {
        return 0;
    }

    if let Err(e) = store.append_many(&diagnostics) {
        tracing::error!(file = %job.path.display(), error = %e, "no se pudieron guardar los diagnósticos");
    }
    if let Some(sink) = sink {
        for d in &diagnostics {
            sink(d);
        }
    }
    diagnostics.len()
}

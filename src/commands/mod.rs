pub mod init;
pub mod monitor;
pub mod rules;
pub mod scan;
pub mod summary;

use crate::config::{self, SentinelConfig};
use crate::rules::RuleEngine;
use crate::store::EventStore;
use scan::SourceScanOptions;
use anyhow::Context;
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "diag-sentinel")]
#[command(version, about = "Diagnostics for C++/JUCE audio projects: static checks, build and crash log analysis", long_about = None)]
pub struct Cli {
    /// Raíz del proyecto (por defecto se busca .diagsentinel.toml hacia arriba)
    #[arg(long, global = true)]
    pub project_root: Option<PathBuf>,
    /// Solo imprime el resumen final
    #[arg(short, long, global = true)]
    pub quiet: bool,
    /// Logging detallado en stderr (equivale a RUST_LOG=info)
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Escanea todo el código fuente y guarda un reporte Markdown
    Scan {
        #[command(flatten)]
        options: SourceScanOptions,
    },
    /// Escanea un único archivo fuente y guarda su reporte
    File {
        path: PathBuf,
        #[command(flatten)]
        options: SourceScanOptions,
    },
    /// Analiza los logs de build y de ejecución ya existentes
    Logs,
    /// Analiza un log de crash o volcado con las reglas de ejecución
    Crash {
        path: PathBuf,
    },
    /// Vigila los directorios de logs hasta Ctrl-C
    Watch,
    /// Resumen por frecuencia del almacén de eventos
    Summary,
    /// Lista los conjuntos de reglas cargados
    Rules,
    /// Escribe el archivo de configuración por defecto
    Init {
        /// Sobrescribe una configuración existente
        #[arg(long)]
        force: bool,
    },
}

/// Resultado de un comando que no falló por configuración.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Clean,
    Failures,
}

impl Outcome {
    pub fn from_failures(has_failures: bool) -> Self {
        if has_failures {
            Outcome::Failures
        } else {
            Outcome::Clean
        }
    }

    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Clean => 0,
            Outcome::Failures => 1,
        }
    }
}

/// Todo lo que un comando necesita, cargado una vez al inicio.
pub struct CommandContext {
    pub root: PathBuf,
    pub config: SentinelConfig,
    pub engine: Arc<RuleEngine>,
    pub quiet: bool,
}

impl CommandContext {
    /// Resuelve la raíz, carga la configuración y compila todas las reglas.
    /// Cualquier error aquí es de configuración y aborta antes de escanear.
    pub fn load(project_root: Option<PathBuf>, quiet: bool) -> anyhow::Result<Self> {
        let root = resolve_root(project_root)?;
        let config = SentinelConfig::load(&root)
            .with_context(|| format!("no se pudo cargar la configuración de {}", root.display()))?;

        let mut engine = RuleEngine::builtin(&config.realtime_paths)
            .context("reglas built-in inválidas")?;
        let rules_file = config::resolve(&root, &config.rules_file);
        if rules_file.is_file() {
            let added = engine
                .load_from_yaml(&rules_file)
                .with_context(|| format!("no se pudieron cargar las reglas de {}", rules_file.display()))?;
            tracing::info!(file = %rules_file.display(), sets = added, "reglas del proyecto cargadas");
        }

        Ok(Self {
            root,
            config,
            engine: Arc::new(engine),
            quiet,
        })
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        config::resolve(&self.root, path)
    }

    pub fn open_store(&self) -> anyhow::Result<EventStore> {
        let path = self.resolve(&self.config.store_path);
        EventStore::open(&path, self.config.store_capacity)
            .with_context(|| format!("no se pudo abrir el almacén {}", path.display()))
    }

    /// `<report_dir>/<prefix>_<YYYYmmdd_HHMMSS>.md`
    pub fn report_path(&self, prefix: &str, now: NaiveDateTime) -> PathBuf {
        self.resolve(&self.config.report_dir)
            .join(format!("{}_{}.md", prefix, now.format("%Y%m%d_%H%M%S")))
    }
}

pub fn resolve_root(project_root: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    if let Some(root) = project_root {
        return Ok(root);
    }
    let cwd = std::env::current_dir().context("no se pudo leer el directorio actual")?;
    Ok(SentinelConfig::find_project_root(&cwd).unwrap_or(cwd))
}

/// Escribe un reporte creando el directorio si hace falta.
pub fn write_report(path: &Path, content: &str) -> anyhow::Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("no se pudo crear {}", dir.display()))?;
    }
    std::fs::write(path, content).with_context(|| format!("no se pudo escribir {}", path.display()))
}

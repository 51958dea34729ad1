//! Configuración del proyecto (`.diagsentinel.toml`).
//!
//! Todos los campos tienen valor por defecto: un archivo ausente equivale a la
//! configuración por defecto, pero un archivo presente y mal formado es un
//! error fatal.

use crate::classifier::LogRole;
use crate::files;
use crate::rules::sets::DEFAULT_REALTIME_PATHS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Versión actual (leída desde Cargo.toml en tiempo de compilación)
pub const SENTINEL_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const CONFIG_FILE: &str = ".diagsentinel.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no se pudo leer {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("configuración inválida en {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("no se pudo serializar la configuración: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("configuración inválida: {0}")]
    Invalid(String),
}

/// Directorio de logs con su rol y los sufijos que interesan.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LogTarget {
    pub dir: PathBuf,
    pub role: LogRole,
    pub suffixes: Vec<String>,
}

impl LogTarget {
    pub fn new(dir: impl Into<PathBuf>, role: LogRole, suffixes: &[&str]) -> Self {
        Self {
            dir: dir.into(),
            role,
            suffixes: suffixes.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn accepts(&self, path: &Path) -> bool {
        files::has_suffix(path, &self.suffixes)
    }

    /// Copia con `dir` resuelto contra la raíz del proyecto.
    pub fn resolved(&self, root: &Path) -> Self {
        Self {
            dir: resolve(root, &self.dir),
            ..self.clone()
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SentinelConfig {
    pub version: String,
    /// Directorios de código fuente para `scan`.
    pub source_roots: Vec<PathBuf>,
    pub source_extensions: Vec<String>,
    /// Fragmentos de ruta que marcan archivos del hilo de audio.
    pub realtime_paths: Vec<String>,
    pub store_path: PathBuf,
    pub store_capacity: usize,
    pub report_dir: PathBuf,
    /// Reglas adicionales del proyecto (YAML); se cargan solo si existe.
    pub rules_file: PathBuf,
    pub debounce_ms: u64,
    pub ignore_patterns: Vec<String>,
    // Las tablas van al final del documento TOML.
    /// Directorios vigilados por `watch`.
    pub watch_targets: Vec<LogTarget>,
    /// Directorios analizados por `logs`.
    pub log_dirs: Vec<LogTarget>,
}

impl Default for SentinelConfig {
    fn default() -> Self {
        Self {
            version: SENTINEL_VERSION.to_string(),
            source_roots: vec![
                PathBuf::from("Source"),
                PathBuf::from("Tests"),
                PathBuf::from("External/tdd-guard"),
            ],
            source_extensions: vec!["cpp".to_string(), "h".to_string(), "hpp".to_string()],
            realtime_paths: DEFAULT_REALTIME_PATHS.iter().map(|s| s.to_string()).collect(),
            watch_targets: vec![
                LogTarget::new("build", LogRole::Build, &[".log"]),
                LogTarget::new("build-vs", LogRole::Build, &[".log"]),
                LogTarget::new("build-mingw", LogRole::Build, &[".log"]),
                LogTarget::new("runtime", LogRole::Runtime, &[".log", ".dmp", ".txt"]),
            ],
            log_dirs: vec![
                LogTarget::new("build", LogRole::Build, &[".log"]),
                LogTarget::new("logs", LogRole::Build, &[".log"]),
                LogTarget::new("runtime", LogRole::Runtime, &[".log"]),
            ],
            store_path: PathBuf::from("runtime/error_monitor.json"),
            store_capacity: crate::store::DEFAULT_CAPACITY,
            report_dir: PathBuf::from("runtime"),
            rules_file: PathBuf::from(".diagsentinel/rules.yaml"),
            debounce_ms: 200,
            ignore_patterns: vec![
                ".git".to_string(),
                "_deps".to_string(),
                "CMakeFiles".to_string(),
            ],
        }
    }
}

impl SentinelConfig {
    /// Carga `.diagsentinel.toml` desde `root`. Sin archivo, valores por defecto.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let config_path = root.join(CONFIG_FILE);
        if !config_path.exists() {
            tracing::info!(path = %config_path.display(), "sin archivo de configuración, usando valores por defecto");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(|source| ConfigError::Io {
            path: config_path.display().to_string(),
            source,
        })?;
        let config: SentinelConfig =
            toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: config_path.display().to_string(),
                source,
            })?;

        if config.version != SENTINEL_VERSION {
            tracing::info!(
                from = %config.version,
                to = SENTINEL_VERSION,
                "configuración escrita por otra versión; los campos nuevos toman su valor por defecto"
            );
        }

        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, root: &Path) -> Result<PathBuf, ConfigError> {
        let toml = toml::to_string_pretty(self)?;
        let config_path = root.join(CONFIG_FILE);
        fs::write(&config_path, toml).map_err(|source| ConfigError::Io {
            path: config_path.display().to_string(),
            source,
        })?;
        Ok(config_path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store_capacity == 0 {
            return Err(ConfigError::Invalid("store_capacity debe ser mayor que 0".into()));
        }
        if self.source_extensions.is_empty() {
            return Err(ConfigError::Invalid("source_extensions está vacío".into()));
        }
        for target in self.watch_targets.iter().chain(&self.log_dirs) {
            if target.suffixes.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "el directorio {} no declara sufijos",
                    target.dir.display()
                )));
            }
        }
        Ok(())
    }

    /// Busca hacia arriba desde `start` un directorio que contenga el archivo de configuración.
    pub fn find_project_root(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .find(|dir| dir.join(CONFIG_FILE).is_file())
            .map(Path::to_path_buf)
    }
}

/// Rutas relativas se resuelven contra la raíz del proyecto.
pub fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

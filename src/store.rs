//! Almacén de eventos
//!
//! Documento JSON único con los diagnósticos más recientes, acotado a
//! `capacity` registros. Cada escritura reemplaza el documento completo de
//! forma atómica: archivo temporal en el mismo directorio, fsync y rename.

use crate::diagnostic::Diagnostic;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tempfile::NamedTempFile;
use thiserror::Error;

pub const DEFAULT_CAPACITY: usize = 1000;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("el directorio de estado {path} no es escribible: {source}")]
    Unwritable {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("error de E/S en {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("no se pudo serializar el almacén: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("la capacidad del almacén debe ser mayor que 0")]
    ZeroCapacity,
}

/// Pertenece al comando o al worker del daemon; se comparte detrás de un `Arc`.
///
/// El mutex serializa los ciclos leer-modificar-escribir solo dentro del proceso.
pub struct EventStore {
    path: PathBuf,
    capacity: usize,
    lock: Mutex<()>,
}

impl EventStore {
    /// Prepara el almacén sin crear el documento (se crea en la primera escritura).
    ///
    /// Falla si el directorio contenedor no se puede crear o no admite archivos nuevos.
    pub fn open(path: impl Into<PathBuf>, capacity: usize) -> Result<Self, StoreError> {
        if capacity == 0 {
            return Err(StoreError::ZeroCapacity);
        }

        let path = path.into();
        let dir = state_dir(&path);
        let unwritable = |source| StoreError::Unwritable {
            path: dir.display().to_string(),
            source,
        };
        fs::create_dir_all(&dir).map_err(unwritable)?;
        NamedTempFile::new_in(&dir).map_err(unwritable)?;

        Ok(Self {
            path,
            capacity,
            lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Todos los registros en orden de inserción. Un documento ausente o
    /// corrupto se lee como vacío.
    pub fn load_all(&self) -> Vec<Diagnostic> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.read_document()
    }

    pub fn append(&self, diagnostic: Diagnostic) -> Result<(), StoreError> {
        self.append_many(std::slice::from_ref(&diagnostic))
            .map(|_| ())
    }

    /// Agrega en bloque; devuelve cuántos registros se escribieron.
    ///
    /// Solo retorna `Ok` después de que el documento nuevo quedó en disco.
    pub fn append_many(&self, diagnostics: &[Diagnostic]) -> Result<usize, StoreError> {
        if diagnostics.is_empty() {
            return Ok(0);
        }

        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut events = self.read_document();
        events.extend_from_slice(diagnostics);
        if events.len() > self.capacity {
            let overflow = events.len() - self.capacity;
            events.drain(..overflow);
        }

        let staged = self.stage(&events)?;
        self.commit(staged)?;
        tracing::debug!(
            path = %self.path.display(),
            added = diagnostics.len(),
            total = events.len(),
            "almacén actualizado"
        );
        Ok(diagnostics.len())
    }

    fn read_document(&self) -> Vec<Diagnostic> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "no se pudo leer el almacén; se trata como vacío");
                return Vec::new();
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(events) => events,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "almacén corrupto; se sobrescribirá en la próxima escritura");
                Vec::new()
            }
        }
    }

    /// Escribe el documento completo en un temporal junto al destino, ya sincronizado.
    fn stage(&self, events: &[Diagnostic]) -> Result<NamedTempFile, StoreError> {
        let dir = state_dir(&self.path);
        let io_err = |source| StoreError::Io {
            path: dir.display().to_string(),
            source,
        };

        let mut tmp = NamedTempFile::new_in(&dir).map_err(io_err)?;
        serde_json::to_writer_pretty(&mut tmp, events)?;
        tmp.write_all(b"\n").map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        Ok(tmp)
    }

    fn commit(&self, staged: NamedTempFile) -> Result<(), StoreError> {
        staged
            .persist(&self.path)
            .map_err(|e| StoreError::Io {
                path: self.path.display().to_string(),
                source: e.error,
            })?;
        sync_dir(&state_dir(&self.path))
    }
}

/// fsync del directorio para que el rename sobreviva a un corte de energía.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> Result<(), StoreError> {
    fs::File::open(dir)
        .and_then(|handle| handle.sync_all())
        .map_err(|source| StoreError::Io {
            path: dir.display().to_string(),
            source,
        })
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> Result<(), StoreError> {
    Ok(())
}

fn state_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

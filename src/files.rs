//! # Utilidades de archivos
//!
//! Lectura tolerante de texto y recorrido de directorios para el orquestador
//! de escaneo y el daemon de vigilancia.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Lee un archivo como texto, reemplazando los bytes UTF-8 inválidos.
///
/// Solo falla si el archivo no se puede leer; nunca por codificación.
pub fn read_lossy(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Verifica si la extensión del archivo está en la lista (sin distinguir
/// mayúsculas, con o sin punto inicial).
///
/// # Ejemplos
/// ```ignore
/// let exts = vec!["cpp".to_string(), ".h".to_string()];
/// assert!(has_extension(Path::new("Source/Engine.CPP"), &exts));
/// assert!(!has_extension(Path::new("notes.txt"), &exts));
/// ```
pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    extensions
        .iter()
        .any(|wanted| wanted.trim_start_matches('.').eq_ignore_ascii_case(ext))
}

/// Como [`has_extension`] pero comparando el final del nombre, para sufijos
/// compuestos como `.log.txt`.
pub fn has_suffix(path: &Path, suffixes: &[String]) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let name = name.to_lowercase();
    suffixes.iter().any(|suffix| {
        let suffix = suffix.to_lowercase();
        if suffix.starts_with('.') {
            name.ends_with(&suffix)
        } else {
            name.ends_with(&format!(".{}", suffix))
        }
    })
}

/// Recorre `root` recursivamente y devuelve los archivos aceptados, ordenados.
///
/// No aplica `.gitignore`: los directorios de build y de logs suelen estar
/// ignorados por git y aun así hay que analizarlos. Las rutas que contengan
/// algún `ignore_patterns` se descartan. Un `root` inexistente devuelve vacío.
pub fn collect_files<F>(root: &Path, ignore_patterns: &[String], accept: F) -> Vec<PathBuf>
where
    F: Fn(&Path) -> bool,
{
    if !root.is_dir() {
        return Vec::new();
    }

    let walker = ignore::WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .build();

    let mut files: Vec<PathBuf> = walker
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|entry| entry.into_path())
        .filter(|path| !is_ignored(root, path, ignore_patterns))
        .filter(|path| accept(path))
        .collect();

    files.sort();
    files
}

/// Solo se miran los componentes por debajo de `root`.
fn is_ignored(root: &Path, path: &Path, ignore_patterns: &[String]) -> bool {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative.components().any(|component| {
        let part = component.as_os_str().to_string_lossy();
        ignore_patterns.iter().any(|pattern| part == pattern.as_str())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_lossy_tolerates_invalid_utf8() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.log");
        fs::write(&path, b"error C2065: \xff\xfe 'x': undeclared identifier\n").unwrap();

        let text = read_lossy(&path).unwrap();
        assert!(text.contains("undeclared identifier"));
        assert!(text.contains('\u{FFFD}'));
    }

    #[test]
    fn test_read_lossy_missing_file_is_error() {
        let tmp = TempDir::new().unwrap();
        assert!(read_lossy(&tmp.path().join("nope.cpp")).is_err());
    }

    #[test]
    fn test_extension_and_suffix_matching() {
        let exts = vec!["cpp".to_string(), ".h".to_string()];
        assert!(has_extension(Path::new("Source/Engine.CPP"), &exts));
        assert!(has_extension(Path::new("Source/Engine.h"), &exts));
        assert!(!has_extension(Path::new("Source/Engine.hpp"), &exts));
        assert!(!has_extension(Path::new("Makefile"), &exts));

        let suffixes = vec![".log".to_string(), "dmp".to_string()];
        assert!(has_suffix(Path::new("runtime/crash.DMP"), &suffixes));
        assert!(has_suffix(Path::new("build/msbuild.log"), &suffixes));
        assert!(!has_suffix(Path::new("build/msbuild.log.bak"), &suffixes));
    }

    #[test]
    fn test_collect_files_sorted_filtered_and_ignoring() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("b")).unwrap();
        fs::create_dir_all(root.join("a")).unwrap();
        fs::create_dir_all(root.join("node_modules")).unwrap();
        fs::write(root.join("b/z.cpp"), "").unwrap();
        fs::write(root.join("a/y.h"), "").unwrap();
        fs::write(root.join("a/readme.md"), "").unwrap();
        fs::write(root.join("node_modules/x.cpp"), "").unwrap();

        let exts = vec!["cpp".to_string(), "h".to_string()];
        let ignore = vec!["node_modules".to_string()];
        let files = collect_files(root, &ignore, |p| has_extension(p, &exts));

        let rel: Vec<String> = files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(rel, vec!["a/y.h", "b/z.cpp"]);
    }

    #[test]
    fn test_collect_files_missing_root_is_empty() {
        let tmp = TempDir::new().unwrap();
        let files = collect_files(&tmp.path().join("missing"), &[], |_| true);
        assert!(files.is_empty());
    }
}

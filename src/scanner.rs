//! Orquestador de escaneo puntual: recorre raíces, clasifica y agrega.

use crate::classifier::{Classifier, LogRole};
use crate::config::LogTarget;
use crate::diagnostic::{self, Diagnostic, Severity};
use crate::files;
use crate::rules::RuleEngine;
use std::path::{Path, PathBuf};
use std::thread;

/// Diagnósticos de una corrida, en orden de archivo y de línea.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ScanResult {
    pub diagnostics: Vec<Diagnostic>,
    pub files_scanned: usize,
}

impl ScanResult {
    pub fn has_failures(&self) -> bool {
        diagnostic::has_failures(&self.diagnostics)
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    pub fn extend(&mut self, other: ScanResult) {
        self.diagnostics.extend(other.diagnostics);
        self.files_scanned += other.files_scanned;
    }
}

/// Escanea el código fuente bajo `roots`. Raíces inexistentes se omiten.
pub fn scan_tree(
    engine: &RuleEngine,
    roots: &[PathBuf],
    extensions: &[String],
    ignore_patterns: &[String],
) -> ScanResult {
    let mut paths = Vec::new();
    for root in roots {
        if !root.is_dir() {
            tracing::info!(root = %root.display(), "directorio de código inexistente, se omite");
            continue;
        }
        paths.extend(files::collect_files(root, ignore_patterns, |p| {
            files::has_extension(p, extensions)
        }));
    }
    paths.sort();
    paths.dedup();

    let classifier = Classifier::new(engine);
    let diagnostics = classify_in_parallel(&paths, |path| classifier.classify_source_file(path));
    ScanResult {
        diagnostics,
        files_scanned: paths.len(),
    }
}

pub fn scan_single_file(engine: &RuleEngine, path: &Path) -> ScanResult {
    ScanResult {
        diagnostics: Classifier::new(engine).classify_source_file(path),
        files_scanned: 1,
    }
}

/// Analiza los logs ya existentes de cada directorio con las reglas de su rol.
pub fn scan_logs(engine: &RuleEngine, targets: &[LogTarget], ignore_patterns: &[String]) -> ScanResult {
    let classifier = Classifier::new(engine);
    let mut result = ScanResult::default();

    for target in targets {
        if !target.dir.is_dir() {
            tracing::info!(dir = %target.dir.display(), "directorio de logs inexistente, se omite");
            continue;
        }
        let paths = files::collect_files(&target.dir, ignore_patterns, |p| target.accepts(p));
        let diagnostics =
            classify_in_parallel(&paths, |path| classifier.classify_log_file(path, target.role));
        result.extend(ScanResult {
            diagnostics,
            files_scanned: paths.len(),
        });
    }

    result
}

pub fn scan_log_file(engine: &RuleEngine, path: &Path, role: LogRole) -> ScanResult {
    ScanResult {
        diagnostics: Classifier::new(engine).classify_log_file(path, role),
        files_scanned: 1,
    }
}

/// Reparte los archivos en bloques contiguos, uno por hilo, y concatena los
/// resultados en el orden original.
fn classify_in_parallel<F>(paths: &[PathBuf], classify: F) -> Vec<Diagnostic>
where
    F: Fn(&Path) -> Vec<Diagnostic> + Sync,
{
    let workers = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(paths.len().max(1));
    if workers <= 1 {
        return paths.iter().flat_map(|p| classify(p.as_path())).collect();
    }

    let chunk_size = paths.len().div_ceil(workers);
    let classify = &classify;
    thread::scope(|scope| {
        let handles: Vec<_> = paths
            .chunks(chunk_size)
            .map(|chunk| {
                scope.spawn(move || {
                    chunk.iter().flat_map(|p| classify(p.as_path())).collect::<Vec<_>>()
                })
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|handle| match handle.join() {
                Ok(found) => found,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::SCAN_ERROR_CATEGORY;
    use crate::rules::sets::DEFAULT_REALTIME_PATHS;
    use std::fs;
    use tempfile::TempDir;

    fn engine() -> RuleEngine {
        let paths: Vec<String> = DEFAULT_REALTIME_PATHS.iter().map(|s| s.to_string()).collect();
        RuleEngine::builtin(&paths).unwrap()
    }

    fn exts() -> Vec<String> {
        vec!["cpp".to_string(), "h".to_string(), "hpp".to_string()]
    }

    #[test]
    fn test_scan_tree_is_sorted_and_skips_missing_roots() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("Source");
        fs::create_dir_all(source.join("Core")).unwrap();
        fs::create_dir_all(source.join("UI")).unwrap();
        fs::write(source.join("UI/Panel.cpp"), "memcpy(a, b, n);\n").unwrap();
        fs::write(source.join("Core/PluginProcessor.cpp"), "void f() {\n  std::mutex m;\n}\n").unwrap();
        fs::write(source.join("Core/notes.txt"), "std::mutex m;\n").unwrap();

        let roots = vec![source.clone(), tmp.path().join("Missing")];
        let result = scan_tree(&engine(), &roots, &exts(), &[]);

        assert_eq!(result.files_scanned, 2);
        let cats: Vec<&str> = result.diagnostics.iter().map(|d| d.category.as_str()).collect();
        assert_eq!(cats, vec!["blocking-primitive-in-realtime-context", "unsafe-copy"]);
        assert!(result.has_failures());
        assert_eq!(result.count(Severity::Warning), 1);
    }

    #[test]
    fn test_scan_tree_matches_sequential_order_with_many_files() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("Source");
        fs::create_dir_all(&source).unwrap();
        for n in 0..40 {
            fs::write(source.join(format!("f{:02}.cpp", n)), format!("memcpy(a{n}, b, n);\nstrcpy(x, y);\n")).unwrap();
        }

        let engine = engine();
        let parallel = scan_tree(&engine, &[source.clone()], &exts(), &[]);
        let sequential: Vec<Diagnostic> = files::collect_files(&source, &[], |_| true)
            .iter()
            .flat_map(|p| Classifier::new(&engine).classify_source_file(p))
            .collect();

        assert_eq!(parallel.diagnostics.len(), 80);
        assert_eq!(parallel.diagnostics, sequential);
    }

    #[test]
    fn test_clean_tree_has_no_failures() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("Source");
        fs::create_dir_all(&source).unwrap();
        fs::write(source.join("Gain.cpp"), "float gain(float x) { return x * 0.5f; }\n").unwrap();

        let result = scan_tree(&engine(), &[source], &exts(), &[]);
        assert_eq!(result.files_scanned, 1);
        assert!(result.diagnostics.is_empty());
        assert!(!result.has_failures());
    }

    #[test]
    fn test_scan_single_missing_file_reports_scan_error() {
        let tmp = TempDir::new().unwrap();
        let result = scan_single_file(&engine(), &tmp.path().join("Nope.cpp"));
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].category, SCAN_ERROR_CATEGORY);
        assert!(!result.has_failures());
    }

    #[test]
    fn test_scan_logs_uses_role_rules() {
        let tmp = TempDir::new().unwrap();
        let build = tmp.path().join("build");
        let runtime = tmp.path().join("runtime");
        fs::create_dir_all(&build).unwrap();
        fs::create_dir_all(&runtime).unwrap();
        fs::write(build.join("msbuild.log"), "error LNK2019: unresolved external symbol 'init'\n").unwrap();
        fs::write(build.join("cmake.txt"), "error LNK2019: unresolved external symbol 'skip'\n").unwrap();
        fs::write(runtime.join("host.log"), "Segmentation fault (core dumped)\n").unwrap();

        let targets = vec![
            LogTarget::new(&build, LogRole::Build, &[".log"]),
            LogTarget::new(&runtime, LogRole::Runtime, &[".log"]),
            LogTarget::new(tmp.path().join("logs"), LogRole::Build, &[".log"]),
        ];
        let result = scan_logs(&engine(), &targets, &[]);

        assert_eq!(result.files_scanned, 2);
        let cats: Vec<&str> = result.diagnostics.iter().map(|d| d.category.as_str()).collect();
        assert_eq!(cats, vec!["unresolved-symbol", "segfault"]);
        assert!(result.diagnostics.iter().all(|d| d.timestamp.is_some()));
    }
}

//! Correcciones en lote: planifica los arreglos mecánicos de los diagnósticos
//! auto-corregibles.
//!
//! Aquí nunca se reescriben archivos; el plan se informa y se cuenta.

use crate::diagnostic::Diagnostic;
use crate::rules::remediation;
use colored::Colorize;
use std::path::Path;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FixSummary {
    pub planned: usize,
    pub skipped: usize,
}

/// Una entrada del plan por archivo, en orden de ruta.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePlan<'a> {
    pub source: &'a str,
    pub fixes: Vec<&'a Diagnostic>,
}

pub fn plan(diagnostics: &[Diagnostic]) -> Vec<FilePlan<'_>> {
    remediation::group_auto_fixable(diagnostics)
        .into_iter()
        .map(|(source, fixes)| FilePlan { source, fixes })
        .collect()
}

/// Recorre el plan. Un archivo que ya no existe se cuenta como omitido.
pub fn apply(diagnostics: &[Diagnostic], dry_run: bool) -> FixSummary {
    let mut summary = FixSummary::default();
    let prefix = if dry_run { "[DRY RUN] " } else { "" };
    println!("🔧 {}Planificando correcciones seguras...", prefix);

    for entry in plan(diagnostics) {
        let count = entry.fixes.len();
        if !Path::new(entry.source).is_file() {
            tracing::warn!(file = entry.source, "archivo ausente, se omiten sus correcciones");
            println!("  {} {} ({} correcciones omitidas)", "❌".red(), entry.source, count);
            summary.skipped += count;
            continue;
        }

        for fix in &entry.fixes {
            tracing::debug!(
                file = entry.source,
                line = ?fix.line,
                category = %fix.category,
                "corrección planificada"
            );
        }
        summary.planned += count;
        println!("  {} {} correcciones planificadas en {}", "✅".green(), count, entry.source);
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::{Origin, Severity};
    use std::fs;
    use tempfile::TempDir;

    fn diag(source: &str, line: usize, auto_fixable: bool) -> Diagnostic {
        Diagnostic {
            origin: Origin::Source,
            source: source.to_string(),
            line: Some(line),
            located_file: None,
            rule: Some("cpp-memcpy".to_string()),
            category: "unsafe-copy".to_string(),
            severity: Severity::Warning,
            message: "memcpy(a, b, n);".to_string(),
            description: None,
            suggested_fix: Some("std::copy(src, src + size, dest);".to_string()),
            owner: None,
            auto_fixable,
            timestamp: None,
        }
    }

    #[test]
    fn test_plan_groups_only_auto_fixable_by_file() {
        let diagnostics = vec![
            diag("b.cpp", 1, true),
            diag("a.cpp", 4, true),
            diag("a.cpp", 2, false),
            diag("a.cpp", 9, true),
        ];
        let plan = plan(&diagnostics);
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].source, "a.cpp");
        let lines: Vec<Option<usize>> = plan[0].fixes.iter().map(|d| d.line).collect();
        assert_eq!(lines, vec![Some(4), Some(9)]);
        assert_eq!(plan[1].source, "b.cpp");
    }

    #[test]
    fn test_apply_counts_planned_and_skipped() {
        let tmp = TempDir::new().unwrap();
        let present = tmp.path().join("Panel.cpp");
        fs::write(&present, "memcpy(a, b, n);\nmemcpy(c, d, n);\n").unwrap();
        let present = present.to_string_lossy().to_string();
        let missing = tmp.path().join("Gone.cpp").to_string_lossy().to_string();

        let diagnostics = vec![
            diag(&present, 1, true),
            diag(&present, 2, true),
            diag(&missing, 1, true),
            diag(&present, 3, false),
        ];

        let summary = apply(&diagnostics, true);
        assert_eq!(summary, FixSummary { planned: 2, skipped: 1 });
        assert_eq!(
            fs::read_to_string(tmp.path().join("Panel.cpp")).unwrap(),
            "memcpy(a, b, n);\nmemcpy(c, d, n);\n",
            "planning never touches the file"
        );
    }

    #[test]
    fn test_apply_without_dry_run_only_plans() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("Panel.cpp");
        fs::write(&path, "memcpy(a, b, n);\n").unwrap();
        let source = path.to_string_lossy().to_string();

        let summary = apply(&[diag(&source, 1, true)], false);
        assert_eq!(summary, FixSummary { planned: 1, skipped: 0 });
        assert_eq!(fs::read_to_string(&path).unwrap(), "memcpy(a, b, n);\n");
    }

    #[test]
    fn test_apply_without_fixable_diagnostics_is_zero() {
        assert_eq!(apply(&[diag("x.cpp", 1, false)], false), FixSummary::default());
    }
}

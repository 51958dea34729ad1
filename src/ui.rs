//! Módulo de interfaz de usuario
//!
//! Salida de consola: banner, spinner y el formato de una línea por diagnóstico.

use crate::diagnostic::{Diagnostic, Severity};
use crate::scanner::ScanResult;
use colored::*;

/// Muestra el banner de diag-sentinel al inicio de los modos interactivos
pub fn mostrar_banner() {
    println!();
    println!(
        "{}",
        "╔═══════════════════════════════════════════════════════════╗".bright_cyan()
    );
    println!(
        "{}",
        "           🛡️  diag-sentinel: C++ / JUCE diagnostics  🛡️"
            .bright_white()
            .bold()
    );
    println!(
        "{}",
        "╚═══════════════════════════════════════════════════════════╝".bright_cyan()
    );
    println!();
}

/// Helper para mostrar un spinner durante escaneos largos
pub fn crear_progreso(mensaje: &str) -> indicatif::ProgressBar {
    let pb = indicatif::ProgressBar::new_spinner();
    if let Ok(style) = indicatif::ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(mensaje.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn etiqueta(severity: Severity) -> ColoredString {
    match severity {
        Severity::Critical => severity.label().red().bold(),
        Severity::Error => severity.label().red(),
        Severity::Warning => severity.label().yellow(),
        Severity::Info => severity.label().cyan(),
    }
}

/// Texto plano de `SEVERITY: category / message / fix / owner`.
///
/// Los campos opcionales ausentes se omiten.
pub fn diagnostic_line(d: &Diagnostic) -> String {
    let mut parts = vec![d.category.clone(), d.message.clone()];
    if let Some(fix) = &d.suggested_fix {
        parts.push(fix.clone());
    }
    if let Some(owner) = &d.owner {
        parts.push(owner.clone());
    }
    format!("{}: {}", d.severity.label(), parts.join(" / "))
}

pub fn print_diagnostic(d: &Diagnostic) {
    let line = diagnostic_line(d);
    let rest = line
        .strip_prefix(d.severity.label())
        .unwrap_or(line.as_str());
    println!("{}{}   {}", etiqueta(d.severity), rest, d.location().dimmed());
}

pub fn print_result(result: &ScanResult, quiet: bool) {
    if !quiet {
        for d in &result.diagnostics {
            print_diagnostic(d);
        }
    }
    let errors = result.count(Severity::Critical) + result.count(Severity::Error);
    let warnings = result.count(Severity::Warning);
    let resumen = format!(
        "📊 {} archivos, {} errores, {} advertencias",
        result.files_scanned, errors, warnings
    );
    if errors > 0 {
        println!("{}", resumen.red().bold());
    } else if warnings > 0 {
        println!("{}", resumen.yellow());
    } else {
        println!("{}", resumen.green());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::Origin;

    #[test]
    fn test_diagnostic_line_format() {
        let mut d = Diagnostic {
            origin: Origin::Build,
            source: "build/msbuild.log".to_string(),
            line: None,
            located_file: None,
            rule: Some("msvc-c1083".to_string()),
            category: "missing-header".to_string(),
            severity: Severity::Critical,
            message: "fatal error C1083: Cannot open include file: 'foo.h'".to_string(),
            description: None,
            suggested_fix: Some("Add missing include directory".to_string()),
            owner: Some("build-stability-monitor".to_string()),
            auto_fixable: false,
            timestamp: None,
        };
        assert_eq!(
            diagnostic_line(&d),
            "CRITICAL: missing-header / fatal error C1083: Cannot open include file: 'foo.h' / Add missing include directory / build-stability-monitor"
        );

        d.suggested_fix = None;
        d.owner = None;
        assert_eq!(
            diagnostic_line(&d),
            "CRITICAL: missing-header / fatal error C1083: Cannot open include file: 'foo.h'"
        );
    }
}

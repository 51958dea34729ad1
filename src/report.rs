//! Generación de reportes Markdown.
//!
//! Funciones puras: el instante de generación llega como parámetro para que
//! la salida sea reproducible.

use crate::diagnostic::{self, Diagnostic, Severity};
use chrono::NaiveDateTime;
use std::fmt::Write;

/// Categorías listadas en el resumen por frecuencia.
pub const TOP_CATEGORIES: usize = 10;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub title: String,
    pub generated_at: NaiveDateTime,
    /// Sub-agrupa cada sección de severidad por categoría.
    pub group_by_category: bool,
}

/// Reporte detallado agrupado por severidad (critical, error, warning, info).
/// Las severidades sin diagnósticos no generan sección.
pub fn summarize(diagnostics: &[Diagnostic], options: &ReportOptions) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}", options.title);
    let _ = writeln!(out, "Generated: {}", options.generated_at.format(TIMESTAMP_FORMAT));
    let _ = writeln!(out, "Total Issues: {}", diagnostics.len());
    out.push('\n');

    for severity in Severity::ORDERED {
        let group: Vec<&Diagnostic> = diagnostics.iter().filter(|d| d.severity == severity).collect();
        if group.is_empty() {
            continue;
        }
        let _ = writeln!(out, "## {} Issues ({})", severity.title(), group.len());
        out.push('\n');

        if options.group_by_category {
            for (category, members) in group_by_category(&group) {
                let _ = writeln!(out, "### {} ({})", category, members.len());
                out.push('\n');
                for d in members {
                    render_entry(&mut out, d, "####");
                }
            }
        } else {
            for d in group {
                render_entry(&mut out, d, "###");
            }
        }
    }

    out
}

fn render_entry(out: &mut String, d: &Diagnostic, heading: &str) {
    let _ = writeln!(out, "{} {}", heading, d.location());
    if d.located_file.is_some() {
        let _ = writeln!(out, "**Source**: {}", d.source);
    }
    let _ = writeln!(out, "**Category**: {}", d.category);
    let _ = writeln!(out, "**Message**: {}", d.message);
    if let Some(description) = &d.description {
        let _ = writeln!(out, "**Description**: {}", description);
    }
    if let Some(fix) = &d.suggested_fix {
        let _ = writeln!(out, "**Suggested Fix**: {}", fix);
    }
    if let Some(owner) = &d.owner {
        let _ = writeln!(out, "**Owner**: {}", owner);
    }
    if d.auto_fixable {
        let _ = writeln!(out, "**Auto-fixable**: ✅ Yes");
    } else {
        let _ = writeln!(out, "**Auto-fixable**: ❌ Manual review required");
    }
    out.push('\n');
}

/// Agrupa preservando el orden de primera aparición.
fn group_by_category<'a>(diagnostics: &[&'a Diagnostic]) -> Vec<(&'a str, Vec<&'a Diagnostic>)> {
    let mut groups: Vec<(&'a str, Vec<&'a Diagnostic>)> = Vec::new();
    for &d in diagnostics {
        match groups.iter_mut().find(|(cat, _)| *cat == d.category) {
            Some((_, members)) => members.push(d),
            None => groups.push((d.category.as_str(), vec![d])),
        }
    }
    groups
}

/// Categorías por cantidad descendente; empates por orden de primera aparición.
///
/// Cada entrada lleva el primer diagnóstico visto como representante.
pub fn category_frequencies(diagnostics: &[Diagnostic]) -> Vec<(&str, usize, &Diagnostic)> {
    let refs: Vec<&Diagnostic> = diagnostics.iter().collect();
    let mut ranked: Vec<(&str, usize, &Diagnostic)> = group_by_category(&refs)
        .into_iter()
        .map(|(category, members)| (category, members.len(), members[0]))
        .collect();
    // sort_by es estable: los empates conservan el orden de primera aparición
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

/// Resumen por frecuencia del almacén de eventos.
pub fn summarize_by_frequency(diagnostics: &[Diagnostic], options: &ReportOptions) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}", options.title);
    let _ = writeln!(out, "Generated: {}", options.generated_at.format(TIMESTAMP_FORMAT));
    let _ = writeln!(out, "Total Events: {}", diagnostics.len());
    out.push('\n');

    out.push_str("## Summary by Severity\n");
    for (severity, count) in diagnostic::count_by_severity(diagnostics) {
        if count > 0 {
            let _ = writeln!(out, "- {}: {}", severity.title(), count);
        }
    }
    out.push('\n');

    out.push_str("## Most Common Error Types\n");
    for (category, count, sample) in category_frequencies(diagnostics).into_iter().take(TOP_CATEGORIES) {
        let _ = writeln!(out, "- {}: {} occurrences", category, count);
        let _ = writeln!(out, "  Example: {}", sample.message);
        if let Some(fix) = &sample.suggested_fix {
            let _ = writeln!(out, "  💡 Fix: {}", fix);
        }
        if let Some(owner) = &sample.owner {
            let _ = writeln!(out, "  🤖 Owner: {}", owner);
        }
        out.push('\n');
    }

    out
}

//! Clasificador
//!
//! Aplica conjuntos de reglas a una unidad de texto (archivo fuente o log) y
//! produce diagnósticos. No tiene estado: se puede usar desde varios hilos
//! compartiendo el mismo [`RuleEngine`].

use crate::diagnostic::{Diagnostic, Origin, Severity};
use crate::files;
use crate::rules::{InputKind, MatchPolicy, Rule, RuleEngine, RuleSet};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// `path.ext:line` o `path.ext(line)`, con o sin unidad de Windows.
static LOCATOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"((?:[A-Za-z]:)?[^\s:()'"]+\.(?:cpp|cc|cxx|c|hpp|hh|hxx|h|inl|mm|m))(?::|\()(\d+)"#)
        .expect("static pattern")
});

/// Rol de un directorio de logs: decide qué reglas se aplican.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LogRole {
    Build,
    Runtime,
}

impl LogRole {
    pub fn input_kind(self) -> InputKind {
        match self {
            LogRole::Build => InputKind::BuildLog,
            LogRole::Runtime => InputKind::RuntimeLog,
        }
    }

    pub fn origin(self) -> Origin {
        match self {
            LogRole::Build => Origin::Build,
            LogRole::Runtime => Origin::Runtime,
        }
    }
}

pub struct SourceUnit<'a> {
    pub path: &'a Path,
    pub text: &'a str,
}

pub struct LogUnit<'a> {
    pub path: &'a Path,
    pub text: &'a str,
    pub role: LogRole,
    /// Se copia en cada diagnóstico; la clasificación no consulta el reloj.
    pub observed_at: DateTime<Utc>,
}

/// Clasifica un archivo fuente contra los conjuntos dados.
///
/// Orden de salida: por línea, luego por conjunto, luego por regla; las
/// heurísticas de archivo van al final.
pub fn classify_source<'r, I>(rule_sets: I, unit: &SourceUnit<'_>) -> Vec<Diagnostic>
where
    I: IntoIterator<Item = &'r RuleSet>,
{
    let source = unit.path.to_string_lossy();
    let applicable: Vec<&RuleSet> = rule_sets
        .into_iter()
        .filter(|set| set.input == InputKind::Source && set.applies_to(unit.path))
        .collect();
    let lines: Vec<&str> = unit.text.lines().collect();

    let mut diagnostics = Vec::new();
    for (idx, line) in lines.iter().enumerate() {
        for set in &applicable {
            for rule in matching_rules(set, line) {
                diagnostics.push(Diagnostic::from_rule(
                    rule,
                    Origin::Source,
                    &source,
                    Some(idx + 1),
                    line.trim().to_string(),
                ));
            }
        }
    }

    for set in &applicable {
        for analyzer in &set.analyzers {
            diagnostics.extend(analyzer.analyze(&source, &lines));
        }
    }

    diagnostics
}

/// Clasifica el contenido completo de un log.
pub fn classify_log<'r, I>(rule_sets: I, unit: &LogUnit<'_>) -> Vec<Diagnostic>
where
    I: IntoIterator<Item = &'r RuleSet>,
{
    let source = unit.path.to_string_lossy();
    let kind = unit.role.input_kind();
    let applicable: Vec<&RuleSet> = rule_sets
        .into_iter()
        .filter(|set| set.input == kind)
        .collect();

    let mut diagnostics = Vec::new();
    for line in unit.text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        for set in &applicable {
            for rule in matching_rules(set, line) {
                let mut diagnostic = Diagnostic::from_rule(
                    rule,
                    unit.role.origin(),
                    &source,
                    None,
                    line.trim().to_string(),
                );
                diagnostic.severity = log_severity(line, rule.severity);
                diagnostic.timestamp = Some(unit.observed_at);
                if let Some((file, line_no)) = locate(line) {
                    diagnostic.located_file = Some(file);
                    diagnostic.line = Some(line_no);
                }
                diagnostics.push(diagnostic);
            }
        }
    }

    diagnostics
}

/// Reglas de `set` que reportan sobre `line`, según la política del conjunto.
fn matching_rules<'s>(set: &'s RuleSet, line: &str) -> Vec<&'s Rule> {
    let mut matched = Vec::new();
    for rule in &set.rules {
        if rule_matches(rule, line, set.skip_comments) {
            matched.push(rule);
            if set.policy == MatchPolicy::FirstMatch {
                break;
            }
        }
    }
    matched
}

fn rule_matches(rule: &Rule, line: &str, skip_comments: bool) -> bool {
    if !skip_comments {
        return rule.pattern.is_match(line);
    }
    rule.pattern
        .find_iter(line)
        .any(|m| !preceded_by_comment(line, m.start()))
}

/// `true` si antes de `offset` hay un `//` o un `/*` sin cerrar.
fn preceded_by_comment(line: &str, offset: usize) -> bool {
    let before = &line[..offset];
    if before.contains("//") {
        return true;
    }
    match (before.rfind("/*"), before.rfind("*/")) {
        (Some(open), Some(close)) => open > close,
        (Some(_), None) => true,
        _ => false,
    }
}

/// `warning` manda sobre `fatal`; si no aparece ninguno, la severidad de la regla.
fn log_severity(line: &str, default: Severity) -> Severity {
    let lowered = line.to_lowercase();
    if lowered.contains("warning") {
        Severity::Warning
    } else if lowered.contains("fatal") {
        Severity::Critical
    } else {
        default
    }
}

fn locate(line: &str) -> Option<(String, usize)> {
    let caps = LOCATOR_RE.captures(line)?;
    let file = caps.get(1)?.as_str().to_string();
    let line_no = caps.get(2)?.as_str().parse().ok()?;
    Some((file, line_no))
}

/// Fachada sobre el registro para clasificar archivos del disco.
pub struct Classifier<'e> {
    engine: &'e RuleEngine,
}

impl<'e> Classifier<'e> {
    pub fn new(engine: &'e RuleEngine) -> Self {
        Self { engine }
    }

    pub fn classify_source_text(&self, path: &Path, text: &str) -> Vec<Diagnostic> {
        classify_source(
            self.engine.sets_for(InputKind::Source),
            &SourceUnit { path, text },
        )
    }

    pub fn classify_log_text(
        &self,
        path: &Path,
        text: &str,
        role: LogRole,
        observed_at: DateTime<Utc>,
    ) -> Vec<Diagnostic> {
        classify_log(
            self.engine.sets_for(role.input_kind()),
            &LogUnit {
                path,
                text,
                role,
                observed_at,
            },
        )
    }

    /// Un archivo ilegible produce un único diagnóstico `scan_error`.
    pub fn classify_source_file(&self, path: &Path) -> Vec<Diagnostic> {
        match files::read_lossy(path) {
            Ok(text) => self.classify_source_text(path, &text),
            Err(e) => vec![Diagnostic::scan_error(
                Origin::Source,
                &path.to_string_lossy(),
                e,
            )],
        }
    }

    pub fn classify_log_file(&self, path: &Path, role: LogRole) -> Vec<Diagnostic> {
        match files::read_lossy(path) {
            Ok(text) => self.classify_log_text(path, &text, role, Utc::now()),
            Err(e) => {
                let mut diagnostic =
                    Diagnostic::scan_error(role.origin(), &path.to_string_lossy(), e);
                diagnostic.timestamp = Some(Utc::now());
                vec![diagnostic]
            }
        }
    }
}

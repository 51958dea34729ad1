//! Registro de diagnóstico
//!
//! Unidad producida por la clasificación. Los diagnósticos son valores
//! inmutables: se crean en el clasificador y después solo se agregan o se
//! serializan.

use crate::rules::{remediation, Rule};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub use crate::rules::Severity;

/// Categoría reservada para archivos que no se pudieron leer.
pub const SCAN_ERROR_CATEGORY: &str = "scan_error";

/// De dónde proviene el texto clasificado.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Source,
    Build,
    Runtime,
}

/// Un hallazgo estructurado.
///
/// Los campos opcionales llevan `serde(default)`: los documentos escritos por
/// versiones anteriores siguen cargando cuando se agregan campos.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub origin: Origin,
    /// Archivo fuente o log del que sale el diagnóstico.
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// En registros de logs: el archivo indicado por el localizador `ruta:línea`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub located_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
    pub category: String,
    pub severity: Severity,
    /// Línea que coincidió (o el mensaje del error de lectura).
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_fix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default)]
    pub auto_fixable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Diagnostic {
    /// Construye un diagnóstico a partir de la regla que coincidió.
    pub fn from_rule(
        rule: &Rule,
        origin: Origin,
        source: &str,
        line: Option<usize>,
        message: String,
    ) -> Self {
        Self {
            origin,
            source: source.to_string(),
            line,
            located_file: None,
            rule: Some(rule.id.clone()),
            category: rule.category.clone(),
            severity: rule.severity,
            message,
            description: Some(rule.description.clone()),
            suggested_fix: remediation::suggest_fix(rule).map(str::to_string),
            owner: rule.owner.clone(),
            auto_fixable: remediation::is_auto_fixable(rule),
            timestamp: None,
        }
    }

    pub fn scan_error(origin: Origin, source: &str, err: impl Display) -> Self {
        Self {
            origin,
            source: source.to_string(),
            line: None,
            located_file: None,
            rule: None,
            category: SCAN_ERROR_CATEGORY.to_string(),
            severity: Severity::Warning,
            message: format!("Failed to scan file: {}", err),
            description: None,
            suggested_fix: None,
            owner: None,
            auto_fixable: false,
            timestamp: None,
        }
    }

    /// Clave `ruta:línea` de los reportes; en logs se prefiere el archivo localizado.
    pub fn location(&self) -> String {
        match (&self.located_file, self.line) {
            (Some(file), Some(line)) => format!("{}:{}", file, line),
            (Some(file), None) => file.clone(),
            (None, Some(line)) => format!("{}:{}", self.source, line),
            (None, None) => self.source.clone(),
        }
    }
}

/// `true` si algún diagnóstico debe hacer fallar el proceso.
pub fn has_failures(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(|d| d.severity.is_failure())
}

/// Cuenta diagnósticos por severidad, en el orden estable de los reportes.
pub fn count_by_severity(diagnostics: &[Diagnostic]) -> Vec<(Severity, usize)> {
    Severity::ORDERED
        .iter()
        .map(|sev| (*sev, diagnostics.iter().filter(|d| d.severity == *sev).count()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleSpec;

    fn sample(severity: Severity) -> Diagnostic {
        Diagnostic {
            origin: Origin::Build,
            source: "build/out.log".to_string(),
            line: None,
            located_file: None,
            rule: None,
            category: "missing-header".to_string(),
            severity,
            message: "fatal error C1083".to_string(),
            description: None,
            suggested_fix: None,
            owner: None,
            auto_fixable: false,
            timestamp: None,
        }
    }

    #[test]
    fn test_from_rule_copies_rule_fields() {
        let rule = RuleSpec::new("mutex", r"\bstd::mutex", "blocking", Severity::Error, "Mutex")
            .fix("Use atomics")
            .owner("rt-audio-guardian")
            .compile()
            .unwrap();
        let d = Diagnostic::from_rule(&rule, Origin::Source, "a.cpp", Some(3), "std::mutex m;".into());
        assert_eq!(d.rule.as_deref(), Some("mutex"));
        assert_eq!(d.category, "blocking");
        assert_eq!(d.severity, Severity::Error);
        assert_eq!(d.message, "std::mutex m;");
        assert_eq!(d.description.as_deref(), Some("Mutex"));
        assert_eq!(d.suggested_fix.as_deref(), Some("Use atomics"));
        assert_eq!(d.owner.as_deref(), Some("rt-audio-guardian"));
        assert!(!d.auto_fixable);
        assert_eq!(d.location(), "a.cpp:3");
    }

    #[test]
    fn test_location_prefers_located_file() {
        let mut d = sample(Severity::Error);
        assert_eq!(d.location(), "build/out.log");
        d.located_file = Some("C:\\src\\Engine.cpp".to_string());
        d.line = Some(42);
        assert_eq!(d.location(), "C:\\src\\Engine.cpp:42");
    }

    #[test]
    fn test_scan_error_is_a_warning() {
        let d = Diagnostic::scan_error(Origin::Source, "x.cpp", "permission denied");
        assert_eq!(d.category, SCAN_ERROR_CATEGORY);
        assert_eq!(d.severity, Severity::Warning);
        assert!(d.message.contains("permission denied"));
    }

    #[test]
    fn test_has_failures_only_for_error_and_critical() {
        assert!(!has_failures(&[sample(Severity::Warning), sample(Severity::Info)]));
        assert!(has_failures(&[sample(Severity::Warning), sample(Severity::Error)]));
        assert!(has_failures(&[sample(Severity::Critical)]));
        assert!(!has_failures(&[]));
    }

    #[test]
    fn test_optional_fields_default_when_missing() {
        let json = r#"{"origin":"runtime","source":"crash.log","category":"segfault","severity":"critical","message":"Segmentation fault (core dumped)"}"#;
        let d: Diagnostic = serde_json::from_str(json).unwrap();
        assert_eq!(d.line, None);
        assert!(!d.auto_fixable);
        assert_eq!(d.timestamp, None);
    }
}

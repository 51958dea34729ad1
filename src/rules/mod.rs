pub mod engine;
pub mod remediation;
pub mod sets;
pub mod static_analysis;

pub use engine::RuleEngine;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use static_analysis::StaticAnalyzer;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Error,
    Warning,
    Info,
}

impl Severity {
    /// Orden estable de los reportes: lo más grave primero.
    pub const ORDERED: [Severity; 4] = [
        Severity::Critical,
        Severity::Error,
        Severity::Warning,
        Severity::Info,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
            Severity::Info => "INFO",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::Error => "Error",
            Severity::Warning => "Warning",
            Severity::Info => "Info",
        }
    }

    /// `error` y `critical` hacen fallar un escaneo puntual.
    pub fn is_failure(self) -> bool {
        matches!(self, Severity::Critical | Severity::Error)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tipo de texto al que se aplica un conjunto de reglas.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum InputKind {
    Source,
    BuildLog,
    RuntimeLog,
}

impl InputKind {
    pub fn as_str(self) -> &'static str {
        match self {
            InputKind::Source => "source",
            InputKind::BuildLog => "build-log",
            InputKind::RuntimeLog => "runtime-log",
        }
    }

    pub fn is_log(self) -> bool {
        !matches!(self, InputKind::Source)
    }

    /// Política por defecto: exhaustiva para código, primera coincidencia para logs.
    pub fn default_policy(self) -> MatchPolicy {
        match self {
            InputKind::Source => MatchPolicy::AllMatches,
            InputKind::BuildLog | InputKind::RuntimeLog => MatchPolicy::FirstMatch,
        }
    }
}

/// Cuántas reglas de un conjunto pueden reportar sobre la misma línea.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum MatchPolicy {
    /// Cada regla que coincide produce su propio diagnóstico.
    AllMatches,
    /// Solo reporta la primera regla que coincide (orden de registro).
    FirstMatch,
}

impl MatchPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchPolicy::AllMatches => "all-matches",
            MatchPolicy::FirstMatch => "first-match",
        }
    }
}

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("la regla '{rule}' tiene un patrón inválido: {source}")]
    InvalidPattern {
        rule: String,
        #[source]
        source: regex::Error,
    },
    #[error("el conjunto de reglas '{0}' está definido más de una vez")]
    DuplicateSet(String),
    #[error("el conjunto de reglas '{0}' no contiene reglas")]
    EmptySet(String),
    #[error("no se pudo leer {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("archivo de reglas inválido {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Definición serializable de una regla (built-in o YAML del proyecto).
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RuleSpec {
    pub id: String,
    pub pattern: String,
    pub category: String,
    pub severity: Severity,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default)]
    pub auto_fixable: bool,
    #[serde(default)]
    pub case_insensitive: bool,
}

impl RuleSpec {
    pub fn new(id: &str, pattern: &str, category: &str, severity: Severity, description: &str) -> Self {
        Self {
            id: id.to_string(),
            pattern: pattern.to_string(),
            category: category.to_string(),
            severity,
            description: description.to_string(),
            fix: None,
            owner: None,
            auto_fixable: false,
            case_insensitive: false,
        }
    }

    pub fn fix(mut self, fix: &str) -> Self {
        self.fix = Some(fix.to_string());
        self
    }

    pub fn owner(mut self, owner: &str) -> Self {
        self.owner = Some(owner.to_string());
        self
    }

    pub fn auto_fixable(mut self) -> Self {
        self.auto_fixable = true;
        self
    }

    pub fn case_insensitive(mut self) -> Self {
        self.case_insensitive = true;
        self
    }

    /// Compila el patrón. Un patrón inválido es un error de configuración.
    pub fn compile(&self) -> Result<Rule, RuleError> {
        let pattern = RegexBuilder::new(&self.pattern)
            .case_insensitive(self.case_insensitive)
            .build()
            .map_err(|source| RuleError::InvalidPattern {
                rule: self.id.clone(),
                source,
            })?;

        Ok(Rule {
            id: self.id.clone(),
            pattern,
            category: self.category.clone(),
            severity: self.severity,
            description: self.description.clone(),
            remediation: self.fix.clone(),
            owner: self.owner.clone(),
            auto_fixable: self.auto_fixable,
        })
    }
}

/// Regla compilada e inmutable.
#[derive(Debug, Clone)]
pub struct Rule {
    pub id: String,
    pub pattern: Regex,
    pub category: String,
    pub severity: Severity,
    pub description: String,
    pub remediation: Option<String>,
    pub owner: Option<String>,
    pub auto_fixable: bool,
}

/// Filtro de elegibilidad: un archivo califica si su ruta contiene algún fragmento.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PathFilter {
    pub needles: Vec<String>,
}

impl PathFilter {
    pub fn new<I, S>(needles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            needles: needles.into_iter().map(Into::into).collect(),
        }
    }

    pub fn matches(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        self.needles
            .iter()
            .any(|needle| path_str.contains(needle.as_str()))
    }
}

/// Grupo ordenado de reglas con alcance a un tipo de entrada.
#[derive(Clone)]
pub struct RuleSet {
    pub name: String,
    pub input: InputKind,
    pub policy: MatchPolicy,
    pub path_filter: Option<PathFilter>,
    pub skip_comments: bool,
    pub rules: Vec<Rule>,
    pub analyzers: Vec<Arc<dyn StaticAnalyzer + Send + Sync>>,
}

impl RuleSet {
    pub fn applies_to(&self, path: &Path) -> bool {
        self.path_filter
            .as_ref()
            .map(|filter| filter.matches(path))
            .unwrap_or(true)
    }
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let analyzers: Vec<&str> = self.analyzers.iter().map(|a| a.name()).collect();
        f.debug_struct("RuleSet")
            .field("name", &self.name)
            .field("input", &self.input)
            .field("policy", &self.policy)
            .field("path_filter", &self.path_filter)
            .field("skip_comments", &self.skip_comments)
            .field("rules", &self.rules.len())
            .field("analyzers", &analyzers)
            .finish()
    }
}

/// Definición de un conjunto de reglas tal como aparece en el archivo del proyecto.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RuleSetSpec {
    pub name: String,
    pub input: InputKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<MatchPolicy>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path_filter: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_comments: Option<bool>,
    pub rules: Vec<RuleSpec>,
}

impl RuleSetSpec {
    pub fn compile(&self) -> Result<RuleSet, RuleError> {
        if self.rules.is_empty() {
            return Err(RuleError::EmptySet(self.name.clone()));
        }

        let rules = self
            .rules
            .iter()
            .map(RuleSpec::compile)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RuleSet {
            name: self.name.clone(),
            input: self.input,
            policy: self.policy.unwrap_or_else(|| self.input.default_policy()),
            path_filter: if self.path_filter.is_empty() {
                None
            } else {
                Some(PathFilter::new(self.path_filter.iter().cloned()))
            },
            skip_comments: self.skip_comments.unwrap_or(!self.input.is_log()),
            rules,
            analyzers: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_pattern_is_rejected_at_compile_time() {
        let spec = RuleSpec::new("broken", r"std::(mutex", "x", Severity::Error, "broken");
        match spec.compile() {
            Err(RuleError::InvalidPattern { rule, .. }) => assert_eq!(rule, "broken"),
            other => panic!("expected InvalidPattern, got {:?}", other.map(|r| r.id)),
        }
    }

    #[test]
    fn test_case_insensitive_flag_is_honored() {
        let strict = RuleSpec::new("a", "segmentation fault", "segfault", Severity::Critical, "")
            .compile()
            .unwrap();
        let relaxed = RuleSpec::new("b", "segmentation fault", "segfault", Severity::Critical, "")
            .case_insensitive()
            .compile()
            .unwrap();
        assert!(!strict.pattern.is_match("Segmentation Fault"));
        assert!(relaxed.pattern.is_match("Segmentation Fault"));
    }

    #[test]
    fn test_rule_set_spec_defaults_follow_input_kind() {
        let spec = RuleSetSpec {
            name: "custom-log".to_string(),
            input: InputKind::BuildLog,
            policy: None,
            path_filter: vec![],
            skip_comments: None,
            rules: vec![RuleSpec::new("r", "oops", "oops", Severity::Error, "oops")],
        };
        let set = spec.compile().unwrap();
        assert_eq!(set.policy, MatchPolicy::FirstMatch);
        assert!(!set.skip_comments, "log sets never skip comment-like text");
        assert!(set.path_filter.is_none());
    }

    #[test]
    fn test_empty_rule_set_is_a_configuration_error() {
        let spec = RuleSetSpec {
            name: "empty".to_string(),
            input: InputKind::Source,
            policy: None,
            path_filter: vec![],
            skip_comments: None,
            rules: vec![],
        };
        assert!(matches!(spec.compile(), Err(RuleError::EmptySet(_))));
    }

    #[test]
    fn test_path_filter_matches_substrings() {
        let filter = PathFilter::new(["PluginProcessor.cpp", "processBlock"]);
        assert!(filter.matches(Path::new("Source/Core/PluginProcessor.cpp")));
        assert!(filter.matches(Path::new("Source/dsp/processBlockHelpers.h")));
        assert!(!filter.matches(Path::new("Source/UI/Editor.cpp")));
    }

    #[test]
    fn test_severity_failure_contract() {
        assert!(Severity::Critical.is_failure());
        assert!(Severity::Error.is_failure());
        assert!(!Severity::Warning.is_failure());
        assert!(!Severity::Info.is_failure());
    }
}

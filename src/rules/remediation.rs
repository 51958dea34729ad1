//! Consultas de remediación sobre los campos de la propia regla, más la
//! agrupación que usa el planificador de correcciones en lote.

use crate::diagnostic::Diagnostic;
use crate::rules::Rule;
use std::collections::BTreeMap;

pub fn suggest_fix(rule: &Rule) -> Option<&str> {
    rule.remediation.as_deref()
}

pub fn is_auto_fixable(rule: &Rule) -> bool {
    rule.auto_fixable
}

/// Agrupa por archivo los diagnósticos marcados como auto-corregibles.
///
/// El orden dentro de cada archivo es el de entrada (orden de línea).
pub fn group_auto_fixable(diagnostics: &[Diagnostic]) -> BTreeMap<&str, Vec<&Diagnostic>> {
    let mut by_file: BTreeMap<&str, Vec<&Diagnostic>> = BTreeMap::new();
    for diagnostic in diagnostics.iter().filter(|d| d.auto_fixable) {
        by_file
            .entry(diagnostic.source.as_str())
            .or_default()
            .push(diagnostic);
    }
    by_file
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::Origin;
    use crate::rules::{RuleSpec, Severity};

    #[test]
    fn test_lookup_reads_rule_fields() {
        let plain = RuleSpec::new("a", "memcpy", "cpp", Severity::Warning, "memcpy")
            .compile()
            .unwrap();
        let fixable = RuleSpec::new("b", "memcpy", "cpp", Severity::Warning, "memcpy")
            .fix("std::copy(src, src + size, dest);")
            .auto_fixable()
            .compile()
            .unwrap();

        assert_eq!(suggest_fix(&plain), None);
        assert!(!is_auto_fixable(&plain));
        assert_eq!(suggest_fix(&fixable), Some("std::copy(src, src + size, dest);"));
        assert!(is_auto_fixable(&fixable));
    }

    #[test]
    fn test_group_auto_fixable_by_file() {
        let rule = RuleSpec::new("r", "x", "cpp", Severity::Warning, "x")
            .auto_fixable()
            .compile()
            .unwrap();
        let manual = RuleSpec::new("m", "x", "rt", Severity::Error, "x")
            .compile()
            .unwrap();

        let diagnostics = vec![
            Diagnostic::from_rule(&rule, Origin::Source, "b.cpp", Some(1), "x".into()),
            Diagnostic::from_rule(&manual, Origin::Source, "b.cpp", Some(2), "x".into()),
            Diagnostic::from_rule(&rule, Origin::Source, "a.cpp", Some(7), "x".into()),
            Diagnostic::from_rule(&rule, Origin::Source, "b.cpp", Some(9), "x".into()),
        ];

        let groups = group_auto_fixable(&diagnostics);
        assert_eq!(groups.keys().copied().collect::<Vec<_>>(), vec!["a.cpp", "b.cpp"]);
        let lines: Vec<_> = groups["b.cpp"].iter().map(|d| d.line).collect();
        assert_eq!(lines, vec![Some(1), Some(9)], "manual-review diagnostics are excluded");
    }
}

use crate::diagnostic::{Diagnostic, Origin, Severity};
use once_cell::sync::Lazy;
use regex::Regex;

static NEW_SITE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bnew\s+\w+").expect("static pattern"));
static DELETE_SITE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bdelete\s+\w+").expect("static pattern"));

/// Heurística que se evalúa una sola vez por archivo, después del barrido por líneas.
pub trait StaticAnalyzer {
    fn name(&self) -> &'static str;
    fn analyze(&self, source: &str, lines: &[&str]) -> Vec<Diagnostic>;
}

/// Compara sitios de `new` contra sitios de `delete` en todo el archivo.
pub struct MemoryBalanceAnalyzer;

impl MemoryBalanceAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Devuelve (líneas con `new`, cantidad de `delete`).
    fn count_sites(lines: &[&str]) -> (Vec<usize>, usize) {
        let mut new_lines = Vec::new();
        let mut delete_count = 0;

        for (idx, line) in lines.iter().enumerate() {
            // Las llamadas dentro de `std::` (make_unique, etc.) no cuentan como adquisición manual
            if NEW_SITE_RE.is_match(line) && !line.contains("std::") {
                new_lines.push(idx + 1);
            }
            if DELETE_SITE_RE.is_match(line) {
                delete_count += 1;
            }
        }

        (new_lines, delete_count)
    }
}

impl StaticAnalyzer for MemoryBalanceAnalyzer {
    fn name(&self) -> &'static str {
        "memory-balance"
    }

    fn analyze(&self, source: &str, lines: &[&str]) -> Vec<Diagnostic> {
        let (new_lines, delete_count) = Self::count_sites(lines);

        if new_lines.len() <= delete_count {
            return Vec::new();
        }

        vec![Diagnostic {
            origin: Origin::Source,
            source: source.to_string(),
            line: new_lines.first().copied(),
            located_file: None,
            rule: Some(self.name().to_string()),
            category: "potential-leak".to_string(),
            severity: Severity::Warning,
            message: format!(
                "Potential memory leak: {} new vs {} delete",
                new_lines.len(),
                delete_count
            ),
            description: Some("Unbalanced manual allocation".to_string()),
            suggested_fix: Some(
                "Consider using smart pointers (std::unique_ptr, std::shared_ptr)".to_string(),
            ),
            owner: None,
            auto_fixable: false,
            timestamp: None,
        }]
    }
}

/// Detecta `<windows.h>` incluido antes que los headers del framework.
pub struct IncludeOrderAnalyzer {
    framework_marker: String,
}

impl IncludeOrderAnalyzer {
    pub fn new(framework_marker: &str) -> Self {
        Self {
            framework_marker: framework_marker.to_lowercase(),
        }
    }
}

impl StaticAnalyzer for IncludeOrderAnalyzer {
    fn name(&self) -> &'static str {
        "include-order"
    }

    fn analyze(&self, source: &str, lines: &[&str]) -> Vec<Diagnostic> {
        let includes: Vec<(usize, String)> = lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.trim_start().starts_with("#include"))
            .map(|(idx, line)| (idx + 1, line.trim().to_lowercase()))
            .collect();

        let framework_pos = includes
            .iter()
            .position(|(_, inc)| inc.contains(&self.framework_marker));
        let windows_pos = includes
            .iter()
            .position(|(_, inc)| inc.contains("windows.h"));

        match (windows_pos, framework_pos) {
            (Some(win), Some(fw)) if win < fw => vec![Diagnostic {
                origin: Origin::Source,
                source: source.to_string(),
                line: Some(includes[win].0),
                located_file: None,
                rule: Some(self.name().to_string()),
                category: "include-order".to_string(),
                severity: Severity::Error,
                message: "windows.h included before JUCE headers (causes macro pollution)"
                    .to_string(),
                description: Some("Include order".to_string()),
                suggested_fix: Some("Move #include <windows.h> after JUCE includes".to_string()),
                owner: None,
                auto_fixable: true,
                timestamp: None,
            }],
            _ => Vec::new(),
        }
    }
}

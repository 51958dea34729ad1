//! Conjuntos de reglas incluidos en el binario.
//!
//! Cada submódulo aporta las definiciones de un conjunto; aquí se compilan y
//! se les adjuntan las heurísticas de archivo que correspondan.

pub mod build;
pub mod cpp;
pub mod crash;
pub mod framework;
pub mod realtime;

use crate::rules::static_analysis::{IncludeOrderAnalyzer, MemoryBalanceAnalyzer, StaticAnalyzer};
use crate::rules::{InputKind, PathFilter, RuleError, RuleSet, RuleSpec};
use std::sync::Arc;

pub const REALTIME_SAFETY: &str = "realtime-safety";
pub const FRAMEWORK_ANTIPATTERN: &str = "framework-antipattern";
pub const CPP_HYGIENE: &str = "cpp-hygiene";
pub const BUILD_DIAGNOSTICS: &str = "build-diagnostics";
pub const CRASH_DIAGNOSTICS: &str = "crash-diagnostics";

/// Archivos que corren en el hilo de audio por defecto.
pub const DEFAULT_REALTIME_PATHS: &[&str] = &[
    "PluginProcessor.cpp",
    "processBlock",
    "AtomicOscillator",
    "SpectralSynthEngine",
];

/// Compila todos los conjuntos built-in, en orden de registro.
pub fn builtin(realtime_paths: &[String]) -> Result<Vec<RuleSet>, RuleError> {
    let realtime_filter = PathFilter::new(realtime_paths.iter().cloned());

    Ok(vec![
        compile_set(
            REALTIME_SAFETY,
            InputKind::Source,
            realtime::rules(),
            Some(realtime_filter),
            Vec::new(),
        )?,
        compile_set(
            FRAMEWORK_ANTIPATTERN,
            InputKind::Source,
            framework::rules(),
            None,
            vec![Arc::new(IncludeOrderAnalyzer::new("juce_"))],
        )?,
        compile_set(
            CPP_HYGIENE,
            InputKind::Source,
            cpp::rules(),
            None,
            vec![Arc::new(MemoryBalanceAnalyzer::new())],
        )?,
        compile_set(BUILD_DIAGNOSTICS, InputKind::BuildLog, build::rules(), None, Vec::new())?,
        compile_set(CRASH_DIAGNOSTICS, InputKind::RuntimeLog, crash::rules(), None, Vec::new())?,
    ])
}

fn compile_set(
    name: &str,
    input: InputKind,
    specs: Vec<RuleSpec>,
    path_filter: Option<PathFilter>,
    analyzers: Vec<Arc<dyn StaticAnalyzer + Send + Sync>>,
) -> Result<RuleSet, RuleError> {
    let rules = specs
        .iter()
        .map(RuleSpec::compile)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RuleSet {
        name: name.to_string(),
        input,
        policy: input.default_policy(),
        path_filter,
        skip_comments: !input.is_log(),
        rules,
        analyzers,
    })
}

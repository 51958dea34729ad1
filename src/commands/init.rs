use crate::config::{SentinelConfig, CONFIG_FILE};
use colored::*;
use std::path::{Path, PathBuf};

/// Directorios de código habituales en proyectos JUCE/CMake.
const CANDIDATE_ROOTS: &[&str] = &["Source", "Tests", "src", "include", "External/tdd-guard"];

/// Devuelve los directorios candidatos que existen bajo `root`, en orden.
pub fn detect_source_roots(root: &Path) -> Vec<PathBuf> {
    CANDIDATE_ROOTS
        .iter()
        .map(PathBuf::from)
        .filter(|candidate| root.join(candidate).is_dir())
        .collect()
}

/// Escribe `.diagsentinel.toml` en `project_root`.
/// Falla si ya existe y `force == false`.
pub fn run_init(project_root: &Path, force: bool) -> anyhow::Result<PathBuf> {
    let config_path = project_root.join(CONFIG_FILE);
    if config_path.exists() && !force {
        anyhow::bail!(
            "Ya existe una configuración en {}. Usa --force para sobrescribir.",
            config_path.display()
        );
    }

    let mut config = SentinelConfig::default();
    let detected = detect_source_roots(project_root);
    if !detected.is_empty() {
        config.source_roots = detected;
    }

    Ok(config.save(project_root)?)
}

pub fn handle_init_command(project_root: &Path, force: bool) -> anyhow::Result<()> {
    println!("\n{}", "🚀 diag-sentinel init".bold().green());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let detected = detect_source_roots(project_root);
    if detected.is_empty() {
        println!("   ℹ️  No se detectaron directorios de código. Usando los valores por defecto.");
    } else {
        let names: Vec<String> = detected.iter().map(|p| p.display().to_string()).collect();
        println!("   🔍 Directorios detectados: {}", names.join(", ").cyan());
    }

    let config_path = run_init(project_root, force)?;
    println!("   ✅ Configuración creada en: {}", config_path.display().to_string().cyan());
    println!("\n   {} Próximos pasos:", "💡".yellow());
    println!("      diag-sentinel scan       # análisis estático del código");
    println!("      diag-sentinel logs       # análisis de logs existentes");
    println!("      diag-sentinel watch      # monitoreo continuo de build y runtime");
    Ok(())
}

use crate::commands::{CommandContext, Outcome};
use crate::rules::RuleSet;
use colored::Colorize;

/// Una línea por conjunto: nombre, entrada, política, filtro y cantidad de reglas.
pub fn describe(set: &RuleSet) -> String {
    let filter = set
        .path_filter
        .as_ref()
        .map(|f| f.needles.join(", "))
        .unwrap_or_else(|| "*".to_string());
    format!(
        "{:<24} {:<12} {:<12} {:>3} reglas  filtro: {}",
        set.name,
        set.input.as_str(),
        set.policy.as_str(),
        set.rules.len(),
        filter
    )
}

pub fn handle_rules_command(ctx: &CommandContext) -> anyhow::Result<Outcome> {
    println!("\n{}", "Conjuntos de reglas activos:".bold());

    for set in ctx.engine.rule_sets() {
        println!("  {} {}", "[ON]".green(), describe(set));
        if !ctx.quiet {
            for rule in &set.rules {
                println!(
                    "       {:<24} {:<9} {}",
                    rule.id.yellow(),
                    format!("[{}]", rule.severity.label()),
                    rule.category.dimmed()
                );
            }
        }
    }

    println!();
    println!(
        "   Info: Para agregar reglas del proyecto, crea {}",
        ctx.resolve(&ctx.config.rules_file).display()
    );
    Ok(Outcome::Clean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::sets::{DEFAULT_REALTIME_PATHS, REALTIME_SAFETY};
    use crate::rules::RuleEngine;

    #[test]
    fn test_describe_lists_policy_and_filter() {
        let paths: Vec<String> = DEFAULT_REALTIME_PATHS.iter().map(|s| s.to_string()).collect();
        let engine = RuleEngine::builtin(&paths).unwrap();

        let line = describe(engine.load_rule_set(REALTIME_SAFETY).unwrap());
        assert!(line.contains("all-matches"));
        assert!(line.contains("PluginProcessor.cpp, processBlock"));

        let build = describe(engine.load_rule_set("build-diagnostics").unwrap());
        assert!(build.contains("build-log"));
        assert!(build.contains("first-match"));
        assert!(build.ends_with("filtro: *"));
    }
}

use crate::rules::{sets, InputKind, RuleError, RuleSet, RuleSetSpec};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Archivo de reglas del proyecto: conjuntos extra que se agregan tras los built-in.
#[derive(Deserialize, Debug)]
struct RulePack {
    #[serde(default)]
    rule_sets: Vec<RuleSetSpec>,
}

/// Registro inmutable de conjuntos de reglas, cargado una vez por proceso.
pub struct RuleEngine {
    sets: Vec<RuleSet>,
}

impl RuleEngine {
    /// Registro con los conjuntos built-in.
    pub fn builtin(realtime_paths: &[String]) -> Result<Self, RuleError> {
        Self::from_sets(sets::builtin(realtime_paths)?)
    }

    pub fn from_sets(rule_sets: Vec<RuleSet>) -> Result<Self, RuleError> {
        let mut engine = Self { sets: Vec::new() };
        for set in rule_sets {
            engine.register(set)?;
        }
        Ok(engine)
    }

    fn register(&mut self, set: RuleSet) -> Result<(), RuleError> {
        if self.sets.iter().any(|s| s.name == set.name) {
            return Err(RuleError::DuplicateSet(set.name));
        }
        self.sets.push(set);
        Ok(())
    }

    /// Carga conjuntos adicionales desde un YAML del proyecto.
    ///
    /// Todos los patrones se compilan aquí: cualquier error aborta la carga
    /// completa y el registro queda sin cambios.
    pub fn load_from_yaml(&mut self, yaml_path: &Path) -> Result<usize, RuleError> {
        let content = fs::read_to_string(yaml_path).map_err(|source| RuleError::Io {
            path: yaml_path.display().to_string(),
            source,
        })?;
        let pack: RulePack = serde_yaml::from_str(&content).map_err(|source| RuleError::Yaml {
            path: yaml_path.display().to_string(),
            source,
        })?;

        let compiled = pack
            .rule_sets
            .iter()
            .map(RuleSetSpec::compile)
            .collect::<Result<Vec<_>, _>>()?;

        for set in &compiled {
            let clashes_existing = self.sets.iter().any(|s| s.name == set.name);
            let clashes_in_pack = compiled.iter().filter(|s| s.name == set.name).count() > 1;
            if clashes_existing || clashes_in_pack {
                return Err(RuleError::DuplicateSet(set.name.clone()));
            }
        }

        let added = compiled.len();
        self.sets.extend(compiled);
        Ok(added)
    }

    pub fn load_rule_set(&self, name: &str) -> Option<&RuleSet> {
        self.sets.iter().find(|s| s.name == name)
    }

    pub fn rule_sets(&self) -> &[RuleSet] {
        &self.sets
    }

    /// Conjuntos para un tipo de entrada, en orden de registro.
    pub fn sets_for(&self, input: InputKind) -> impl Iterator<Item = &RuleSet> {
        self.sets.iter().filter(move |s| s.input == input)
    }
}

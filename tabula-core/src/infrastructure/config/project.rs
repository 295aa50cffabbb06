// tabula-core/src/infrastructure/config/project.rs

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};
use validator::Validate;

use crate::domain::project::ProjectConfig;
use crate::infrastructure::error::InfrastructureError;

// --- LOADER ---

#[instrument(skip(project_dir))] // Log automatique de l'entrée/sortie de la fonction
pub fn load_project_config(project_dir: &Path) -> Result<ProjectConfig, InfrastructureError> {
    // 1. Découverte du fichier principal
    let config_path = find_main_config(project_dir)?;
    info!(path = ?config_path, "Loading project configuration");

    // 2. Chargement YAML
    let content = fs::read_to_string(&config_path)?;
    let mut config: ProjectConfig = serde_yaml::from_str(&content)?;

    // 3. Validation des réglages de transformation (Fail-Secure)
    config.transforms.validate().map_err(|e| {
        InfrastructureError::ConfigError(format!(
            "invalid 'transforms' settings in {:?}: {}",
            config_path, e
        ))
    })?;

    // 4. Override via Variables d'Environnement (Pattern 'Layering')
    // Permet de faire: TABULA_TARGET_PATH=/tmp/build tabula run
    apply_env_overrides(&mut config);

    Ok(config)
}

fn find_main_config(root: &Path) -> Result<PathBuf, InfrastructureError> {
    let candidates = ["tabula_project.yaml", "tabula.yaml"];
    for filename in candidates {
        let p = root.join(filename);
        if p.exists() {
            return Ok(p);
        }
    }
    Err(InfrastructureError::ConfigNotFound(format!(
        "No configuration file found in {:?}. Checked: {:?}",
        root, candidates
    )))
}

fn apply_env_overrides(config: &mut ProjectConfig) {
    if let Ok(val) = std::env::var("TABULA_TARGET_PATH") {
        info!(old = ?config.target_path, new = ?val, "Overriding target path via ENV");
        config.target_path = val;
    }
    if let Ok(val) = std::env::var("TABULA_DATA_PATH") {
        info!(old = ?config.data_path, new = ?val, "Overriding data path via ENV");
        config.data_path = val;
    }
}

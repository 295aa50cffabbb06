// tabula-core/src/infrastructure/config/recipe.rs

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::domain::ops::OperationSpec;
use crate::infrastructure::error::InfrastructureError;

/// An ordered, named list of operations — the YAML artifact a user iterates
/// on while cleaning a dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub operations: Vec<OperationSpec>,
}

pub fn load_recipe(path: &Path) -> Result<Recipe, InfrastructureError> {
    if !path.exists() {
        return Err(InfrastructureError::ConfigNotFound(format!(
            "Recipe file not found at {:?}",
            path
        )));
    }
    let content = fs::read_to_string(path)?;
    let recipe: Recipe = serde_yaml::from_str(&content)?;
    info!(name = %recipe.name, operations = recipe.operations.len(), "Recipe loaded");
    Ok(recipe)
}

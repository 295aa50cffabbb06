// src/domain/project/configuration.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProjectConfig {
    pub name: String,

    #[serde(default = "default_version")]
    pub version: String,

    #[serde(rename = "data-path", default = "default_data_path")]
    pub data_path: String,

    #[serde(rename = "target-path", default = "default_target_path")]
    pub target_path: String,

    #[serde(rename = "clean-targets", default = "default_clean_targets")]
    pub clean_targets: Vec<String>,

    #[serde(default)]
    pub transforms: TransformSettings,
}

/// Tunable transform defaults, collected in one validated config block.
/// Every operation falls back to these when its spec omits the parameter.
#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct TransformSettings {
    /// One-hot encoding refuses columns with more distinct categories.
    #[serde(default = "default_cardinality_ceiling")]
    #[validate(range(min = 2))]
    pub cardinality_ceiling: usize,

    #[serde(default = "default_iqr_multiplier")]
    #[validate(range(min = 0.0))]
    pub iqr_multiplier: f64,

    #[serde(default = "default_zscore_threshold")]
    #[validate(range(min = 0.0))]
    pub zscore_threshold: f64,

    #[serde(default = "default_contamination")]
    #[validate(range(min = 0.0, max = 0.5))]
    pub contamination: f64,

    /// drop_columns removes a column when its missing fraction exceeds this.
    #[serde(default = "default_missing_threshold")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub missing_threshold: f64,

    #[serde(default = "default_polynomial_degree")]
    #[validate(range(min = 2, max = 6))]
    pub polynomial_degree: u32,

    #[serde(default = "default_bins")]
    #[validate(range(min = 2))]
    pub bins: usize,

    #[serde(default = "default_window")]
    #[validate(range(min = 1))]
    pub window: usize,
}

impl Default for TransformSettings {
    fn default() -> Self {
        Self {
            cardinality_ceiling: default_cardinality_ceiling(),
            iqr_multiplier: default_iqr_multiplier(),
            zscore_threshold: default_zscore_threshold(),
            contamination: default_contamination(),
            missing_threshold: default_missing_threshold(),
            polynomial_degree: default_polynomial_degree(),
            bins: default_bins(),
            window: default_window(),
        }
    }
}

fn default_version() -> String {
    "0.1.0".to_string()
}
fn default_data_path() -> String {
    "data".to_string()
}
fn default_target_path() -> String {
    "target".to_string()
}
fn default_clean_targets() -> Vec<String> {
    vec!["target".to_string()]
}
fn default_cardinality_ceiling() -> usize {
    50
}
fn default_iqr_multiplier() -> f64 {
    1.5
}
fn default_zscore_threshold() -> f64 {
    3.0
}
fn default_contamination() -> f64 {
    0.1
}
fn default_missing_threshold() -> f64 {
    0.5
}
fn default_polynomial_degree() -> u32 {
    2
}
fn default_bins() -> usize {
    5
}
fn default_window() -> usize {
    7
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_minimal_yaml_gets_defaults() -> Result<()> {
        let config: ProjectConfig = serde_yaml::from_str("name: demo")?;
        assert_eq!(config.target_path, "target");
        assert_eq!(config.data_path, "data");
        assert_eq!(config.transforms.cardinality_ceiling, 50);
        assert!((config.transforms.iqr_multiplier - 1.5).abs() < f64::EPSILON);
        Ok(())
    }

    #[test]
    fn test_settings_validation_catches_bad_contamination() -> Result<()> {
        let yaml = "name: demo\ntransforms:\n  contamination: 0.8";
        let config: ProjectConfig = serde_yaml::from_str(yaml)?;
        assert!(config.transforms.validate().is_err());
        Ok(())
    }

    #[test]
    fn test_settings_validation_passes_defaults() {
        assert!(TransformSettings::default().validate().is_ok());
    }
}

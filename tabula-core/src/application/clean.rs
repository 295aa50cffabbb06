// tabula-core/src/application/clean.rs

use crate::error::TabulaError;
use crate::infrastructure::config::project::load_project_config;
use std::fs;
use std::path::Path;

/// Remove the build artifacts (`clean-targets`) of a project directory.
/// Relative targets only; anything resolving outside the project dir is a
/// traversal attempt and gets rejected.
pub fn clean_project(project_dir: &Path) -> Result<(), TabulaError> {
    tracing::info!("🧹 Initializing Tabula cleanup sequence...");

    let config = load_project_config(project_dir).map_err(TabulaError::Infrastructure)?;

    let targets = if config.clean_targets.is_empty() {
        vec!["target".to_string()]
    } else {
        config.clean_targets
    };

    for target_rel_path in targets {
        // Zero-Trust Path Traversal Guard: relative, no '..' components
        let rel = Path::new(&target_rel_path);
        let escapes = rel.is_absolute()
            || rel
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir));
        if escapes {
            return Err(TabulaError::UnsafePath(target_rel_path));
        }
        let full_path = project_dir.join(rel);

        if full_path.exists() {
            if full_path.is_dir() {
                fs::remove_dir_all(&full_path)?;
            } else {
                fs::remove_file(&full_path)?;
            }
            println!("   🗑️  Artifact removed: {}", target_rel_path);
        }
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    #[test]
    fn test_clean_removes_configured_target() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("tabula.yaml"), "name: demo")?;
        fs::create_dir_all(dir.path().join("target/data"))?;
        fs::write(dir.path().join("target/data/out.csv"), "a,b\n1,2\n")?;

        clean_project(dir.path())?;
        assert!(!dir.path().join("target").exists());
        Ok(())
    }

    #[test]
    fn test_clean_rejects_path_traversal() -> Result<()> {
        let dir = tempdir()?;
        fs::write(
            dir.path().join("tabula.yaml"),
            "name: demo\nclean-targets:\n  - ../escape",
        )?;

        let result = clean_project(dir.path());
        assert!(matches!(result, Err(TabulaError::UnsafePath(_))));
        Ok(())
    }
}

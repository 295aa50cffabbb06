// tabula/src/commands/clean.rs

use std::path::PathBuf;
use tabula_core::application::clean_project;

pub fn execute(project_dir: PathBuf) -> anyhow::Result<()> {
    clean_project(&project_dir)?;
    println!("✨ Project artifacts cleaned.");
    Ok(())
}

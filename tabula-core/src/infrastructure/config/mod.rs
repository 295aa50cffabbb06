// tabula-core/src/infrastructure/config/mod.rs

pub mod project;
pub mod recipe;

pub use project::load_project_config;
pub use recipe::{Recipe, load_recipe};

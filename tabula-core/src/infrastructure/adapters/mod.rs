// tabula-core/src/infrastructure/adapters/mod.rs

pub mod csv;
pub mod duckdb;
pub mod jsonl_store;

pub use duckdb::SqlWorkbench;
pub use jsonl_store::JsonlVersionStore;

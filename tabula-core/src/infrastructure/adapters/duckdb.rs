// tabula-core/src/infrastructure/adapters/duckdb.rs
//
// Embedded SQL workbench for ad-hoc SELECTs over a dataset. The caller is
// expected to run the query through `QueryGuard` first; this adapter only
// knows how to register a CSV as a view and fetch result rows as text.

use duckdb::{Config, Connection};
use std::sync::{Arc, Mutex};

use crate::infrastructure::error::InfrastructureError;

pub struct SqlWorkbench {
    conn: Arc<Mutex<Connection>>,
}

const RESULT_TABLE: &str = "__tabula_result";

impl SqlWorkbench {
    pub fn in_memory() -> Result<Self, InfrastructureError> {
        let config = Config::default();
        let conn = Connection::open_in_memory_with_flags(config)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, InfrastructureError> {
        self.conn
            .lock()
            .map_err(|_| InfrastructureError::Io(std::io::Error::other("DuckDB Mutex Poisoned")))
    }

    pub fn execute(&self, query: &str) -> Result<(), InfrastructureError> {
        let conn = self.lock()?;
        conn.execute(query, []).map(|_rows| ())?;
        Ok(())
    }

    /// Expose a CSV file as the view `name` (DuckDB does its own inference).
    pub fn register_csv(&self, name: &str, path: &str) -> Result<(), InfrastructureError> {
        let query = format!(
            "CREATE OR REPLACE VIEW \"{}\" AS SELECT * FROM read_csv_auto('{}')",
            name,
            path.replace('\'', "''")
        );
        self.execute(&query)
    }

    /// Run a SELECT and return (column names, up to `limit` rows rendered as
    /// text). The result set is materialized into a scratch table first so
    /// the schema can be read back through PRAGMA table_info.
    pub fn run_select(
        &self,
        sql: &str,
        limit: usize,
    ) -> Result<(Vec<String>, Vec<Vec<String>>), InfrastructureError> {
        self.execute(&format!(
            "CREATE OR REPLACE TABLE {} AS {}",
            RESULT_TABLE, sql
        ))?;

        let conn = self.lock()?;

        let mut schema_stmt = conn.prepare(&format!("PRAGMA table_info('{}')", RESULT_TABLE))?;
        let names: Vec<String> = schema_stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = conn.prepare(&format!("SELECT * FROM {} LIMIT {}", RESULT_TABLE, limit))?;
        let mut rows = stmt.query([])?;
        let mut rendered = Vec::new();
        while let Some(row) = rows.next()? {
            let values: Vec<String> = (0..names.len())
                .map(|i| match row.get_ref(i) {
                    Ok(duckdb::types::ValueRef::Null) => String::new(),
                    Ok(value) => format!("{:?}", value),
                    Err(_) => "ERROR".to_string(),
                })
                .collect();
            rendered.push(values);
        }

        Ok((names, rendered))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_workbench_runs_select_over_csv() -> Result<()> {
        let dir = tempdir()?;
        let csv_path = dir.path().join("pets.csv");
        fs::write(&csv_path, "name,age\nrex,3\nfelix,2\nrex,5\n")?;

        let workbench = SqlWorkbench::in_memory()?;
        workbench.register_csv("data", &csv_path.to_string_lossy())?;

        let (names, rows) = workbench.run_select(
            "SELECT name, count(*) AS n FROM data GROUP BY name ORDER BY name",
            10,
        )?;
        assert_eq!(names, vec!["name", "n"]);
        assert_eq!(rows.len(), 2);
        Ok(())
    }

    #[test]
    fn test_workbench_limit_caps_rows() -> Result<()> {
        let dir = tempdir()?;
        let csv_path = dir.path().join("nums.csv");
        fs::write(&csv_path, "x\n1\n2\n3\n4\n5\n")?;

        let workbench = SqlWorkbench::in_memory()?;
        workbench.register_csv("data", &csv_path.to_string_lossy())?;

        let (_, rows) = workbench.run_select("SELECT x FROM data", 2)?;
        assert_eq!(rows.len(), 2);
        Ok(())
    }

    #[test]
    fn test_invalid_sql_surfaces_database_error() -> Result<()> {
        let workbench = SqlWorkbench::in_memory()?;
        let result = workbench.execute("SELECT * FROM non_existent_table");
        assert!(matches!(
            result,
            Err(InfrastructureError::Database(_))
        ));
        Ok(())
    }
}

// tabula-core/src/infrastructure/adapters/jsonl_store.rs
//
// Default VersionStore adapter: one JSON document per line, append-only.
// Stands in for the managed backend the hosted deployment writes to; the
// record format is identical either way.

use async_trait::async_trait;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use tracing::warn;

use crate::domain::lineage::VersionRecord;
use crate::error::TabulaError;
use crate::ports::store::VersionStore;

pub struct JsonlVersionStore {
    path: PathBuf,
}

impl JsonlVersionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn read_all(&self) -> Result<Vec<VersionRecord>, TabulaError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)?;
        let mut records = Vec::new();
        for (number, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<VersionRecord>(line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    // A corrupt line must not poison the whole history.
                    warn!(line = number + 1, error = %e, "Skipping unreadable version record");
                }
            }
        }
        Ok(records)
    }

    /// Every record in the store, across datasets.
    pub async fn list_all(&self) -> Result<Vec<VersionRecord>, TabulaError> {
        let mut records = self.read_all()?;
        records.sort_by(|a, b| {
            (&a.dataset_id, a.version_number).cmp(&(&b.dataset_id, b.version_number))
        });
        Ok(records)
    }
}

#[async_trait]
impl VersionStore for JsonlVersionStore {
    async fn save_version(&self, record: &VersionRecord) -> Result<(), TabulaError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let line = serde_json::to_string(record)
            .map_err(|e| TabulaError::InternalError(format!("Serialization: {}", e)))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }

    async fn list_versions(&self, dataset_id: &str) -> Result<Vec<VersionRecord>, TabulaError> {
        let mut records: Vec<VersionRecord> = self
            .read_all()?
            .into_iter()
            .filter(|r| r.dataset_id == dataset_id)
            .collect();
        records.sort_by_key(|r| r.version_number);
        Ok(records)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::dataset::{Column, DataType, Table, Value};
    use crate::domain::lineage::StepResult;
    use crate::domain::ops::{OperationKind, OperationSpec};
    use anyhow::Result;
    use tempfile::tempdir;

    fn sample_record(dataset: &str, version: usize) -> VersionRecord {
        let table = Table::from_columns(vec![Column::new(
            "x",
            DataType::Integer,
            vec![Value::Int(1), Value::Int(1)],
        )])
        .unwrap();
        let smaller = Table::from_columns(vec![Column::new(
            "x",
            DataType::Integer,
            vec![Value::Int(1)],
        )])
        .unwrap();
        let step = StepResult::diff(
            &table,
            &smaller,
            OperationSpec::new(OperationKind::DropDuplicates),
            vec![],
        );
        VersionRecord::from_step(dataset, version, &step)
    }

    #[tokio::test]
    async fn test_roundtrip_and_dataset_filter() -> Result<()> {
        let dir = tempdir()?;
        let store = JsonlVersionStore::new(dir.path().join("target/versions.jsonl"));

        store.save_version(&sample_record("customers", 1)).await?;
        store.save_version(&sample_record("orders", 1)).await?;
        store.save_version(&sample_record("customers", 2)).await?;

        let customers = store.list_versions("customers").await?;
        assert_eq!(customers.len(), 2);
        assert_eq!(customers[0].version_number, 1);
        assert_eq!(customers[1].version_number, 2);

        let all = store.list_all().await?;
        assert_eq!(all.len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_corrupt_line_is_skipped() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("versions.jsonl");
        let store = JsonlVersionStore::new(&path);

        store.save_version(&sample_record("customers", 1)).await?;
        {
            let mut file = OpenOptions::new().append(true).open(&path)?;
            writeln!(file, "{{ not json")?;
        }
        store.save_version(&sample_record("customers", 2)).await?;

        let records = store.list_versions("customers").await?;
        assert_eq!(records.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_store_lists_nothing() -> Result<()> {
        let dir = tempdir()?;
        let store = JsonlVersionStore::new(dir.path().join("versions.jsonl"));
        assert!(store.list_versions("anything").await?.is_empty());
        Ok(())
    }
}

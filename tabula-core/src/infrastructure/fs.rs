// tabula-core/src/infrastructure/fs.rs

use crate::infrastructure::error::InfrastructureError;
use std::io::Write;
use std::path::Path;

/// All-or-nothing file write: the content lands in a temp file next to the
/// target, then an atomic rename swaps it in. A crash mid-write leaves the
/// previous file intact instead of a truncated artifact.
pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    content: C,
) -> Result<(), InfrastructureError> {
    let path = path.as_ref();
    let parent = path.parent().unwrap_or_else(|| Path::new("."));

    // The temp file must live in the target directory: rename is only
    // atomic within one filesystem.
    let mut temp_file = tempfile::NamedTempFile::new_in(parent).map_err(InfrastructureError::Io)?;
    temp_file
        .write_all(content.as_ref())
        .map_err(InfrastructureError::Io)?;
    temp_file
        .persist(path)
        .map_err(|e| InfrastructureError::Io(e.error))?;

    Ok(())
}

/// Pretty-printed JSON dump via `atomic_write`. Run summaries, quality
/// reports and lineage exports all land on disk through this.
pub fn write_json<T: serde::Serialize>(
    path: impl AsRef<Path>,
    data: &T,
) -> Result<(), InfrastructureError> {
    let content = serde_json::to_string_pretty(data)
        .map_err(|e| InfrastructureError::ConfigError(format!("JSON serialization: {}", e)))?;
    atomic_write(path, content)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_atomic_write_roundtrip() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("out.txt");

        atomic_write(&file_path, "first")?;
        atomic_write(&file_path, "second")?;

        assert_eq!(fs::read_to_string(&file_path)?, "second");
        Ok(())
    }

    #[test]
    fn test_write_json_produces_readable_document() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("report.json");

        write_json(&file_path, &serde_json::json!({ "rows": 5 }))?;

        let back: serde_json::Value = serde_json::from_str(&fs::read_to_string(&file_path)?)?;
        assert_eq!(back["rows"], 5);
        Ok(())
    }
}

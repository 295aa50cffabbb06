// tabula-core/src/ports/store.rs

// The version-store boundary. The core emits serializable `VersionRecord`
// documents and does not care whether they land in a managed database, a
// local file, or nowhere at all. Network-backed stores block, hence async.

use crate::domain::lineage::VersionRecord;
use crate::error::TabulaError;
use async_trait::async_trait;

#[async_trait]
pub trait VersionStore: Send + Sync {
    async fn save_version(&self, record: &VersionRecord) -> Result<(), TabulaError>;

    /// Records of one dataset, ordered by version number.
    async fn list_versions(&self, dataset_id: &str) -> Result<Vec<VersionRecord>, TabulaError>;
}

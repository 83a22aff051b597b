pub mod sqlite;

pub use sqlite::SqliteScanStore;

use crate::core::errors::ReconResult;
use crate::core::models::{ScanRecord, ScanTask};
use async_trait::async_trait;

/// Append-only log of finished tasks.
///
/// Rows are only ever added one at a time or dropped all at once; there is no
/// update and no single-row delete.
#[async_trait]
pub trait ScanStore: Send + Sync {
    /// Persist a finished task. The store assigns the id and timestamp.
    async fn append(&self, task: &ScanTask) -> ReconResult<ScanRecord>;

    /// Every record, most recent first.
    async fn list_all(&self) -> ReconResult<Vec<ScanRecord>>;

    async fn list_recent(&self, limit: usize) -> ReconResult<Vec<ScanRecord>>;

    /// Delete every record and return how many were removed.
    async fn clear_all(&self) -> ReconResult<usize>;
}

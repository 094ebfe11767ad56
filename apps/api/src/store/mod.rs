// Persistence boundary for alerts.
// The engine only ever loads one record and saves it back; listing,
// filtering, and pagination are collaborator-side concerns and have no
// place on this trait.

pub mod memory;
pub mod pg;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::alert::Alert;

pub use memory::MemoryAlertStore;
pub use pg::PgAlertStore;

/// Versioned alert persistence. Swapped behind `Arc<dyn AlertStore>` in
/// `AppState` so the lifecycle functions can be exercised against the
/// in-memory store in tests.
///
/// `save` is the single commit point of every transition and enforces the
/// optimistic lock: `alert.version == 0` inserts a new record, any other
/// value updates only if the stored version still matches, returning
/// `ConcurrentModification` otherwise. The persisted record comes back with
/// its version bumped and a fresh `updated_at`.
#[async_trait]
pub trait AlertStore: Send + Sync {
    async fn load(&self, id: Uuid) -> Result<Alert, AppError>;
    async fn save(&self, alert: Alert) -> Result<Alert, AppError>;
}

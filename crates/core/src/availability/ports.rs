//! Port interfaces for busy-interval sources
//!
//! These traits define the boundaries between the slot computation engine
//! and the stores that contribute busy time.

use async_trait::async_trait;
use bookslot_domain::{BusyInterval, ManualBlock, Result};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Store of instructor-declared unavailable windows.
#[async_trait]
pub trait ManualBlockRepository: Send + Sync {
    /// Save a manual block.
    async fn insert(&self, block: &ManualBlock) -> Result<()>;

    /// Delete a block owned by the instructor. Returns false if no such
    /// block exists.
    async fn delete(&self, instructor_id: Uuid, block_id: Uuid) -> Result<bool>;

    /// Blocks intersecting the given range for one instructor.
    async fn find_between(
        &self,
        instructor_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ManualBlock>>;
}

/// Read-only view of the instructor's externally synced calendar.
///
/// Implementations must degrade to an empty busy set when the account is not
/// connected or the provider fails; availability is always derivable from
/// internal data alone.
#[async_trait]
pub trait ExternalBusySource: Send + Sync {
    async fn busy_between(
        &self,
        instructor_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<BusyInterval>;
}

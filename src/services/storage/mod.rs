pub mod sheets;

use async_trait::async_trait;

use crate::errors::StoreError;
use crate::models::LeadRecord;

#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Appends a finished lead and returns where it landed.
    async fn append(&self, record: &LeadRecord) -> Result<String, StoreError>;
}

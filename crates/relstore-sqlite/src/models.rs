use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Audit-trail record for one load run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMeta {
    pub run_id: Uuid,
    pub host: String,
    pub started_at: String,
}

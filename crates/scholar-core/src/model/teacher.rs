use serde::{Deserialize, Serialize};

use super::entity_id::EntityId;

/// A teacher record. Teachers live only in the local session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: EntityId,
    pub name: String,
    /// Unique across all teachers (exact match).
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
}

use serde::{Deserialize, Serialize};

use super::entity_id::EntityId;

/// A course offered in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: EntityId,
    pub name: String,
    /// Non-negative, finite.
    pub price: f64,
    pub institute: String,
}

impl Course {
    /// Price as shown to operators, e.g. `$499.99`.
    pub fn price_display(&self) -> String {
        format!("${:.2}", self.price)
    }
}

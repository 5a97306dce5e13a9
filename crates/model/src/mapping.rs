use serde::{Deserialize, Serialize};

/// One source-column → destination-column assignment in a migration plan.
///
/// `destination_type` carries rendered ClickHouse syntax so that plans
/// round-trip through the ledger and hand-edited JSON unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldMapping {
    pub source_field: String,
    pub source_type: String,
    pub destination_field: String,
    pub destination_type: String,
    #[serde(default)]
    pub transformation: Option<String>,
    #[serde(default)]
    pub skip: bool,
}

impl FieldMapping {
    pub fn is_active(&self) -> bool {
        !self.skip
    }
}

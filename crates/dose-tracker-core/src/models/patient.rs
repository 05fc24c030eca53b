//! Patient models.

use serde::{Deserialize, Serialize};

/// A person whose doses and temperatures are being logged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    /// Database-assigned ID
    pub id: i64,
    /// Owning user
    pub user_id: i64,
    /// Patient name
    pub name: String,
}

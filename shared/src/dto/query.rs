use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

/// A raw statement typed into the query console
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QueryRequest {
    #[validate(length(min = 1, message = "Query cannot be empty"))]
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryResponse {
    pub result: Value,
    /// Milliseconds spent waiting for the data source
    pub elapsed_ms: u64,
}

/// Entry of the recent-queries list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryHistoryItem {
    pub query: String,
    /// Unix time in milliseconds
    pub timestamp: i64,
}

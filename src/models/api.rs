use crate::models::log_record::{History, HistoryEntry};
use serde::{Deserialize, Serialize};

/// Operator-authored draft, before validation
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DraftRecordRequest {
    pub level: String,
    pub message: String,
}

/// Filtered view for GET /logs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsResponse {
    pub entries: History,
    /// Entries that passed the filter
    pub total: usize,
    /// Entries in the full history
    pub unfiltered: usize,
}

/// Response for anything that inserts a record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResponse {
    pub success: bool,
    pub message: String,
    pub entry: Option<HistoryEntry>,
    /// History size after the insert
    pub total: usize,
    /// Non-fatal: the entry is in the history but was not persisted
    pub storage_warning: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearResponse {
    pub success: bool,
    pub message: String,
    pub removed: usize,
    pub storage_warning: Option<String>,
}

/// Entry counts per severity over the whole history
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogStatsResponse {
    pub debug_count: usize,
    pub info_count: usize,
    pub warning_count: usize,
    pub error_count: usize,
    pub total_count: usize,
}

/// Generic API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: Option<String>,
}

use serde::{Deserialize, Serialize};

/// One URL as reported by the host history store.
///
/// `visit_time` is the most recent visit (ms since epoch) within the queried range.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub url: String,
    pub visit_time: i64,
    pub visit_count: i64,
}

/// A single visit to a URL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VisitRecord {
    pub visit_id: String,
    pub visit_time: i64,
}

/// A bounded history search over `[start_time, end_time)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryQuery {
    /// Free-text filter; empty matches everything.
    pub text: String,
    pub start_time: i64,
    pub end_time: i64,
    pub max_results: usize,
}

/// Deduplicated URLs accumulated by one scan.
pub type MatchSet = std::collections::BTreeSet<String>;

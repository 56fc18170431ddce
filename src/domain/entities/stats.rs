//! Service-wide aggregate counters.

/// Totals across one backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Live (non-deleted) records.
    pub url_count: i64,
    /// Distinct non-empty owners across all records.
    pub user_count: i64,
}

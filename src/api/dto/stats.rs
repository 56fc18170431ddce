//! DTO for service statistics.

use serde::{Deserialize, Serialize};

use crate::domain::entities::Stats;

/// `GET /api/internal/stats` response body.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatsResponse {
    pub urls: i64,
    pub users: i64,
}

impl From<Stats> for StatsResponse {
    fn from(stats: Stats) -> Self {
        Self {
            urls: stats.url_count,
            users: stats.user_count,
        }
    }
}

//! DTOs for the owner listing endpoint.

use serde::{Deserialize, Serialize};

/// One record in `GET /api/user/urls`.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserUrl {
    pub short_url: String,
    pub original_url: String,
}

//! Data Transfer Objects for API request/response serialization.

pub mod shorten;
pub mod stats;
pub mod user_urls;

pub use shorten::{BatchRequestItem, BatchResponseItem, ShortenRequest, ShortenResponse};
pub use stats::StatsResponse;
pub use user_urls::UserUrl;

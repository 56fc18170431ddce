//! HTTP request handlers.

pub mod health;
pub mod redirect;
pub mod shorten;
pub mod stats;
pub mod user_urls;

pub use health::ping_handler;
pub use redirect::redirect_handler;
pub use shorten::{shorten_batch_handler, shorten_handler, shorten_text_handler};
pub use stats::stats_handler;
pub use user_urls::{delete_user_urls_handler, user_urls_handler};

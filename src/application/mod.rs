//! Application layer services implementing business logic.
//!
//! Services consume the repository trait and provide a clean API for HTTP
//! handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::shortener_service::ShortenerService`] - Shortening, resolution, listing and deletion
//! - [`services::auth_service::AuthService`] - Owner token issuing and verification

pub mod services;

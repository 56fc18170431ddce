//! Domain layer containing business entities and logic.
//!
//! - [`entities`] - Core data structures
//! - [`error`] - Backend-agnostic storage error classification
//! - [`repositories`] - Storage backend trait
//! - [`deletion_request`] - Owner-scoped deletion request
//! - [`deletion_worker`] - Bounded batch deletion pipeline
//!
//! # Deletion Flow
//!
//! 1. HTTP handler accepts a list of codes and answers `202 Accepted`
//! 2. [`crate::application::services::ShortenerService::delete_urls`] spawns
//!    [`deletion_worker::run_deletion`]
//! 3. Workers soft-delete sub-batches via [`repositories::UrlRepository::delete_urls`]

pub mod deletion_request;
pub mod deletion_worker;
pub mod entities;
pub mod error;
pub mod repositories;

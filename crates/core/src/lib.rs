//! Placify Core - Shared types library.
//!
//! This crate provides common types used across all Placify components:
//! - `client` - Session store and HTTP client wrapper for the Placify API
//! - `cli` - Command-line front end built on the client
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no storage
//! access, no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - ID newtypes, roles, rate-limit status, job and notification
//!   records, client-side pagination
//! - [`envelope`] - Normalization of the backend's response envelopes

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod envelope;
pub mod types;

pub use envelope::EnvelopeError;
pub use types::*;

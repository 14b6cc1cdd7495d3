//! Placify Client - session state and API access for Placify front ends.
//!
//! # Modules
//!
//! - [`session`] - Persistent auth session and per-endpoint rate-limit markers
//! - [`http`] - Authenticated HTTP client with 401 handling
//! - [`services`] - Login, job board and notification feed built on the client
//! - [`config`] - Environment-driven configuration
//! - [`clock`] - Time source used for rate-limit expiry

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod clock;
pub mod config;
pub mod http;
pub mod services;
pub mod session;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ClientConfig, ConfigError};
pub use http::{ApiClient, ApiError, ApiResponse, RequestOptions};
pub use services::ServiceError;
pub use session::{FileStore, KeyValueStore, MemoryStore, SessionError, SessionState, StorageError};

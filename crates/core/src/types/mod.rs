//! Core types for Placify.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod job;
pub mod notification;
pub mod page;
pub mod rate_limit;
pub mod role;

pub use id::*;
pub use job::{Job, JobListing};
pub use notification::{Notification, NotificationFilter};
pub use page::Page;
pub use rate_limit::RateLimitStatus;
pub use role::{Role, RoleError};

//! Shared types and constants for CV-Match client components
//!
//! This crate holds the pieces that every CV-Match client crate agrees on:
//! the user profile and role types exchanged with the backend, the route
//! constants the session layer navigates between, and the standard logging
//! initialization.

pub mod logging;
pub mod routes;
pub mod types;

pub use types::{AuthProviderKind, RoleParseError, UserProfile, UserProfileUpdate, UserRole};

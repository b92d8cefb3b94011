//! # A-Z Plan Shared Library
//!
//! Shared types, persistence and authentication primitives used by the
//! A-Z Plan API server, the plan generation service and the admin tooling.
//!
//! ## Module Organization
//!
//! - `models`: Database models and repository-style operations
//! - `auth`: Password hashing, JWT, API tokens and ownership checks
//! - `db`: Connection pool and embedded migrations

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the A-Z Plan shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}

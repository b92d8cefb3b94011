//! # A-Z Plan API Server Library
//!
//! The HTTP surface of A-Z Plan: accounts, projects, lettered plans, tasks,
//! comments, sharing and statistics, plus AI generation of plans B-Y.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration from the environment
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Response middleware
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;

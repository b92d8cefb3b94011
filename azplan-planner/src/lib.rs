//! # A-Z Plan Planner
//!
//! The two computations behind the planning endpoints:
//!
//! - `generation`: turns a Plan Z goal into 24 proposals for letters B-Y
//!   using an Ollama-compatible model server, falling back to a fixed
//!   placeholder sequence whenever the model cannot deliver
//! - `statistics`: cost, duration and completion figures across plans
//!
//! Neither touches the database; callers load plans and persist results.

pub mod config;
pub mod generation;
pub mod statistics;

pub use config::GeneratorConfig;
pub use generation::{ollama::OllamaGenerator, PlanGenerator};
pub use statistics::PlanStatistics;

//! Cash Flow Planner - personal-finance backend built around a cash-flow projection engine
//!
//! This library provides:
//! - Deterministic multi-year income, expense and savings projections
//! - Side-by-side rate scenarios over a shared baseline
//! - Per-user financial records behind a pluggable store
//! - Access-key authentication and a transport-independent HTTP router
//! - Static market reference data

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod market;
pub mod projection;
pub mod records;
pub mod scenario;
pub mod store;

// Re-export commonly used types
pub use api::{Api, ApiRequest, ApiResponse};
pub use config::ServiceConfig;
pub use error::{Error, Result};
pub use projection::{project, ProjectionInput, ProjectionSummary, YearlyProjection};
pub use scenario::{RateScenario, ScenarioRunner};
pub use store::{MemoryStore, Store};

//! itinera-services: HTTP collaborators for gap filling, cost estimation,
//! transport pricing and budget redistribution.

pub mod client;
pub mod collaborators;
pub mod config;
pub mod payload;
pub mod sanitize;

pub use client::HttpServices;
pub use config::ServiceConfig;
pub use payload::gap_budget_hint;

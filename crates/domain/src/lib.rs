//! news-digest domain crate
//!
//! This crate contains the core pipeline logic following hexagonal architecture:
//! - `model`: Domain entities and value objects
//! - `ports`: Trait definitions for external dependencies (adapters)
//! - `policy`: Category inference and candidate filtering rules
//! - `summarize`: AI summarization gateway with provider fallback
//! - `usecases`: Ingestion, digest assembly, queries, scheduling

pub mod model;
pub mod policy;
pub mod ports;
pub mod summarize;
pub mod usecases;

pub use model::*;
pub use ports::*;
pub use summarize::SummaryGateway;

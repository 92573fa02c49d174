//! Industry Dive layer over the Sailthru API
//!
//! Adds our own concepts on top of Sailthru: paginated campaign queries,
//! dive email type and dive brand classification, and responses normalized
//! against a known default shape.
//!
//! # Modules
//!
//! - `api`: The Sailthru capabilities we depend on and the response type.
//! - `classifier`: Email type and brand inference.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `models`: Campaign record, query and default-shape models.
//! - `normalize`: Deep merge of responses with default shapes.
//! - `sailthru_client`: Signed HTTP client for the Sailthru API.
//! - `service`: Campaign queries built on the modules above.

pub mod api;
pub mod classifier;
pub mod config;
pub mod errors;
pub mod models;
pub mod normalize;
pub mod sailthru_client;
pub mod service;

pub use api::{ApiResponse, SailthruApi};
pub use classifier::DiveEmailType;
pub use errors::AppError;
pub use models::{Campaign, StatsOptions};
pub use service::CampaignService;

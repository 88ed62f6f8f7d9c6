/// Feed Service Library
///
/// Social feed visibility and aggregation engine for the Pulse platform:
/// per-viewer post visibility, share-chain resolution with ban propagation,
/// engagement aggregation, and feed composition/pagination. Posts, likes,
/// comments, follows and images are owned by the platform's CRUD services;
/// this engine only reads them, apart from the like toggle.
///
/// # Modules
///
/// - `handlers`: thin HTTP request handlers over the feed operations
/// - `models`: domain types and response shapes
/// - `services`: visibility resolver, chain resolver, engagement aggregator,
///   feed composer
/// - `store`: relation store accessor (Postgres and in-memory)
/// - `error`: error types and handling
/// - `config`: configuration management
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod store;

pub use config::Config;
pub use error::{AppError, Result};

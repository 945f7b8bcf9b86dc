//! FarmersHub dashboard backend
//!
//! Thin proxy between the farmer dashboard and the upstream scoring and
//! analytics service:
//! - `model/`: SoilSample / CropSuitability contract + wire shapes
//! - `ranking`: local sort/filter of recommendation batches
//! - `catalog`: static crop reference data (no scoring)
//! - `irrigation`: weather-driven irrigation schedule and alerts
//! - `soil_health`: rule-based soil health score and advice
//! - `fallback`: data served when the upstream call fails
//! - `client`, `api_server`, `config`: HTTP plumbing (feature `api`)

pub mod model;
pub mod ranking;
pub mod catalog;
pub mod irrigation;
pub mod soil_health;
pub mod fallback;
pub mod config;

#[cfg(feature = "api")]
pub mod client;
#[cfg(feature = "api")]
pub mod api_server;

// Re-export commonly used types
pub use model::{CropSuitability, MarketDemand, Season, SoilSample, SoilType, SuitabilityLevel};
pub use ranking::{rank, ProfitabilityFilter, RankedBatch, RankingQuery, SortKey};
pub use catalog::CropCatalog;
pub use soil_health::{assess, SoilHealthReport};
pub use config::ServerConfig;

#[cfg(feature = "api")]
pub use api_server::{create_router, AppState};
#[cfg(feature = "api")]
pub use client::{ApiError, FarmApiClient};

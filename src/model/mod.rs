//! Data model for the dashboard backend
//!
//! - `soil.rs` - SoilSample input + range validation
//! - `crop.rs` - CropSuitability batch output, demand and suitability bands
//! - `wire.rs` - disease detection, weather and chatbot shapes

pub mod soil;
pub mod crop;
pub mod wire;

pub use soil::{CropRecommendationRequest, Season, SoilSample, SoilType, ValidationError};
pub use crop::{CropSuitability, MarketDemand, RecommendationResponse, SuitabilityLevel};
pub use wire::{
    ChatbotRequest, ChatbotResponse, CurrentWeather, DiseaseDetectionRequest,
    DiseaseDetectionResponse, ForecastDay, WeatherForecast, WeatherRequest,
};

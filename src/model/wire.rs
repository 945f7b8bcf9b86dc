//! Request/response shapes for the non-recommendation endpoints
//! (disease detection, weather, chatbot).

use serde::{Deserialize, Serialize};

// ============================================================================
// Disease Detection
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseDetectionRequest {
    pub image_base64: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseDetectionResponse {
    pub disease: String,
    pub confidence: f64,
    pub treatment: String,
    pub prevention: String,
    pub severity: String,
    pub success: bool,
}

// ============================================================================
// Weather
// ============================================================================

fn default_state() -> String {
    "Kerala".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeatherRequest {
    pub city: String,
    #[serde(default = "default_state")]
    pub state: String,
}

impl WeatherRequest {
    pub fn new(city: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            state: default_state(),
        }
    }

    /// Cache key fragment, case-insensitive on both parts
    pub fn cache_key(&self) -> String {
        format!("{}|{}", self.city.trim().to_lowercase(), self.state.trim().to_lowercase())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub wind_speed: f64,
    pub description: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: String,
    pub temperature: f64,
    pub humidity: f64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherForecast {
    pub forecast: Vec<ForecastDay>,
    pub total_days: usize,
}

// ============================================================================
// Chatbot
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatbotRequest {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatbotResponse {
    pub response: String,
    pub language: String,
    pub intent: String,
    pub timestamp: String,
    pub success: bool,
}

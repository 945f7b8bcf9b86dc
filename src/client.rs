//! Upstream Client - Typed HTTP calls to the scoring/analytics service
//!
//! One `reqwest::Client` per process. Every call is a single request: no
//! retries, no backoff. Callers decide what to do with a failure (the API
//! server swaps in fallback data, see `fallback.rs`).

use crate::model::{
    ChatbotRequest, ChatbotResponse, CurrentWeather, DiseaseDetectionRequest,
    DiseaseDetectionResponse, RecommendationResponse, SoilSample, ValidationError,
    WeatherForecast, WeatherRequest,
};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Forecast length accepted upstream
pub const MAX_FORECAST_DAYS: u32 = 7;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure (connect, timeout, TLS)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Body could not be decoded into the expected shape
    #[error("parse error: {0}")]
    Parse(String),

    /// Rejected locally before any request was made
    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValidationError),
}

/// Map non-success statuses to [`ApiError::Api`]
async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    if !resp.status().is_success() {
        return Err(ApiError::Api {
            status: resp.status().as_u16(),
            message: resp.text().await.unwrap_or_default(),
        });
    }
    Ok(resp)
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
    let resp = check_response(resp).await?;
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::Parse(e.to_string()))
}

#[derive(Debug, Clone)]
pub struct FarmApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl FarmApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ApiError::Parse(format!("invalid base URL '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Parse(format!("base URL '{}' cannot carry a path", base_url)));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("farmers_hub/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append path segments to the base URL (segments are percent-encoded)
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Checked in `new`
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        tracing::debug!("GET {}", url);
        let resp = self.http.get(url).send().await?;
        decode(resp).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, ApiError> {
        tracing::debug!("POST {}", url);
        let resp = self.http.post(url).json(body).send().await?;
        decode(resp).await
    }

    // ========================================================================
    // Endpoints
    // ========================================================================

    pub async fn health(&self) -> Result<serde_json::Value, ApiError> {
        self.get_json(self.endpoint(&["health"])).await
    }

    /// Validates the sample, then asks the scoring service for a batch
    pub async fn crop_recommendations(
        &self,
        sample: &SoilSample,
    ) -> Result<RecommendationResponse, ApiError> {
        sample.validate()?;
        let url = self.endpoint(&["api", "crop-recommendations"]);
        self.post_json(url, &sample.to_request()).await
    }

    /// Raw crop reference record as the service stores it
    pub async fn crop_details(&self, crop: &str) -> Result<serde_json::Value, ApiError> {
        self.get_json(self.endpoint(&["api", "crops", crop])).await
    }

    pub async fn detect_disease(
        &self,
        request: &DiseaseDetectionRequest,
    ) -> Result<DiseaseDetectionResponse, ApiError> {
        let url = self.endpoint(&["api", "disease-detection"]);
        self.post_json(url, request).await
    }

    pub async fn current_weather(&self, request: &WeatherRequest) -> Result<CurrentWeather, ApiError> {
        let url = self.endpoint(&["api", "weather", "current"]);
        self.post_json(url, request).await
    }

    /// `days` is clamped to 1..=7
    pub async fn weather_forecast(
        &self,
        request: &WeatherRequest,
        days: u32,
    ) -> Result<WeatherForecast, ApiError> {
        let mut url = self.endpoint(&["api", "weather", "forecast"]);
        url.query_pairs_mut()
            .append_pair("days", &clamp_forecast_days(days).to_string());
        self.post_json(url, request).await
    }

    pub async fn weather_summary(&self, request: &WeatherRequest) -> Result<serde_json::Value, ApiError> {
        let url = self.endpoint(&["api", "weather", "summary"]);
        self.post_json(url, request).await
    }

    pub async fn chat(&self, request: &ChatbotRequest) -> Result<ChatbotResponse, ApiError> {
        let url = self.endpoint(&["api", "chatbot"]);
        self.post_json(url, request).await
    }
}

pub fn clamp_forecast_days(days: u32) -> u32 {
    days.clamp(1, MAX_FORECAST_DAYS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Season, SoilType};

    fn client(base: &str) -> FarmApiClient {
        FarmApiClient::new(base, Duration::from_secs(1)).unwrap()
    }

    fn mock_response(status: u16, body: &'static str) -> reqwest::Response {
        reqwest::Response::from(
            ::http::Response::builder()
                .status(status)
                .body(body)
                .unwrap(),
        )
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let c = client("http://127.0.0.1:8000");
        assert_eq!(
            c.endpoint(&["api", "crop-recommendations"]).as_str(),
            "http://127.0.0.1:8000/api/crop-recommendations"
        );

        let c = client("http://backend.local/v1/");
        assert_eq!(
            c.endpoint(&["api", "crops", "Black Pepper"]).as_str(),
            "http://backend.local/v1/api/crops/Black%20Pepper"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            FarmApiClient::new("not a url", Duration::from_secs(1)),
            Err(ApiError::Parse(_))
        ));
        assert!(FarmApiClient::new("mailto:farmer@example.com", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn test_forecast_days_clamped() {
        assert_eq!(clamp_forecast_days(0), 1);
        assert_eq!(clamp_forecast_days(5), 5);
        assert_eq!(clamp_forecast_days(30), 7);
    }

    #[tokio::test]
    async fn test_check_response_api_error() {
        let err = check_response(mock_response(503, "down")).await.unwrap_err();
        assert!(matches!(err, ApiError::Api { status: 503, ref message } if message == "down"));
    }

    #[tokio::test]
    async fn test_decode_bad_body_is_parse_error() {
        let err = decode::<ChatbotResponse>(mock_response(200, "{\"nope\":1}"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }

    #[tokio::test]
    async fn test_invalid_sample_never_hits_network() {
        // Nothing listens on port 9; validation must fail first
        let c = client("http://127.0.0.1:9");
        let sample = SoilSample {
            ph: 12.0,
            nitrogen: 50.0,
            phosphorus: 40.0,
            potassium: 60.0,
            organic_matter: 2.0,
            soil_type: SoilType::Clay,
            rainfall: 1200.0,
            temperature: 25.0,
            season: Season::Rabi,
            location: String::new(),
        };
        let err = c.crop_recommendations(&sample).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(ref v) if v.field == "ph"));
    }
}

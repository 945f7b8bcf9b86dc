//! Fallback Data - What the dashboard shows when the upstream call fails
//!
//! Every upstream failure (transport, non-2xx, undecodable body) collapses
//! into one signal, and the recovery is always one of these fixtures. There is
//! no retry and no backoff.

use crate::model::{
    ChatbotResponse, CropSuitability, CurrentWeather, DiseaseDetectionResponse, ForecastDay,
    MarketDemand, RecommendationResponse, SuitabilityLevel, WeatherForecast, WeatherRequest,
};
use chrono::{Datelike, Duration, NaiveDate, Utc};
use serde::Serialize;

/// Where a payload came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Live,
    Fallback,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Live => "live",
            DataSource::Fallback => "fallback",
        }
    }
}

/// A payload tagged with its source
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub value: T,
    pub source: DataSource,
}

impl<T> Fetched<T> {
    pub fn live(value: T) -> Self {
        Self { value, source: DataSource::Live }
    }

    pub fn fallback(value: T) -> Self {
        Self { value, source: DataSource::Fallback }
    }

    pub fn is_fallback(&self) -> bool {
        self.source == DataSource::Fallback
    }

    /// Keep a live result, or log the failure and substitute fallback data
    pub fn or_fallback<E: std::fmt::Display>(
        result: Result<T, E>,
        what: &str,
        fallback: impl FnOnce() -> T,
    ) -> Self {
        match result {
            Ok(value) => Self::live(value),
            Err(e) => {
                tracing::warn!("{} unavailable, serving fallback data: {}", what, e);
                Self::fallback(fallback())
            }
        }
    }
}

// ============================================================================
// Crop Recommendations
// ============================================================================

/// Fixed example record shown when no live recommendation is available
pub fn example_recommendation() -> CropSuitability {
    CropSuitability {
        crop: "Rice".to_string(),
        suitability_score: 85.0,
        suitability_level: Some(SuitabilityLevel::Excellent),
        profit_potential: Some(21.3),
        estimated_yield: 2550.0,
        growth_period_days: 120,
        market_demand: MarketDemand::High,
        profit_margin: 0.25,
        ph_optimal: 5.8,
        rainfall_optimal: 1500.0,
        temp_optimal: 26.0,
        recommended_season: "Kharif".to_string(),
        market_price: None,
    }
}

pub fn recommendations() -> RecommendationResponse {
    RecommendationResponse::new(vec![example_recommendation()])
}

// ============================================================================
// Disease Detection
// ============================================================================

pub fn disease_detection() -> DiseaseDetectionResponse {
    DiseaseDetectionResponse {
        disease: "Unknown".to_string(),
        confidence: 0.0,
        treatment: "Consult with local agricultural extension officer. Apply general plant care practices.".to_string(),
        prevention: "Regular monitoring, proper nutrition, and timely pest management.".to_string(),
        severity: "Unknown".to_string(),
        success: false,
    }
}

// ============================================================================
// Weather
// ============================================================================

/// (temperature °C, humidity %, description) typical for a Kerala month
fn seasonal_average(month: u32) -> (f64, f64, &'static str) {
    match month {
        6..=10 => (26.0, 85.0, "monsoon rain"),
        3..=5 => (30.0, 75.0, "hot and humid"),
        _ => (24.0, 70.0, "mostly clear"),
    }
}

pub fn current_weather(request: &WeatherRequest) -> CurrentWeather {
    let now = Utc::now();
    let (temperature, humidity, description) = seasonal_average(now.month());
    CurrentWeather {
        temperature,
        humidity,
        pressure: 1010.0,
        wind_speed: 3.0,
        description: format!("{} (typical for {})", description, request.city),
        timestamp: now.to_rfc3339(),
    }
}

pub fn weather_forecast(days: u32) -> WeatherForecast {
    forecast_from(Utc::now().date_naive(), days)
}

fn forecast_from(start: NaiveDate, days: u32) -> WeatherForecast {
    let forecast: Vec<ForecastDay> = (1..=i64::from(days))
        .map(|offset| {
            let date = start + Duration::days(offset);
            let (temperature, humidity, description) = seasonal_average(date.month());
            ForecastDay {
                date: date.format("%Y-%m-%d").to_string(),
                temperature,
                humidity,
                description: description.to_string(),
            }
        })
        .collect();

    WeatherForecast {
        total_days: forecast.len(),
        forecast,
    }
}

pub fn weather_summary() -> serde_json::Value {
    serde_json::json!({ "error": "Unable to fetch weather data" })
}

// ============================================================================
// Chatbot
// ============================================================================

pub fn supported_languages() -> serde_json::Value {
    serde_json::json!({
        "en": "English",
        "ml": "Malayalam",
        "ta": "Tamil",
        "hi": "Hindi",
    })
}

fn fallback_reply(language: &str) -> Option<&'static str> {
    match language {
        "en" => Some("I understand you're asking about farming. While I'm processing your specific question, here are some general farming tips: Check your soil health regularly, monitor weather conditions, and follow sustainable farming practices. For more specific help, please contact your local agricultural extension officer."),
        "ml" => Some("നിങ്ങൾ കാർഷികത്തെക്കുറിച്ച് ചോദിക്കുന്നുവെന്ന് ഞാൻ മനസ്സിലാക്കുന്നു. നിങ്ങളുടെ മണ്ണിന്റെ ആരോഗ്യം പതിവായി പരിശോധിക്കുക, കാലാവസ്ഥാ സാഹചര്യങ്ങൾ നിരീക്ഷിക്കുക. കൂടുതൽ സഹായത്തിന് നിങ്ങളുടെ പ്രാദേശിക കൃഷി ഓഫീസറെ ബന്ധപ്പെടുക."),
        "ta" => Some("நீங்கள் விவசாயத்தைப் பற்றி கேட்கிறீர்கள் என்பதை நான் புரிந்துகொள்கிறேன். உங்கள் மண்ணின் ஆரோக்கியத்தை தவறாமல் சோதனை செய்யுங்கள், வானிலை நிலைமைகளை கண்காணிக்கவும். மேலும் உதவிக்கு உங்கள் உள்ளூர் விவசாய அதிகாரியைத் தொடர்பு கொள்ளுங்கள்."),
        "hi" => Some("मैं समझता हूं कि आप खेती के बारे में पूछ रहे हैं। अपनी मिट्टी के स्वास्थ्य की नियमित जांच करें और मौसम की स्थिति की निगरानी करें। अधिक सहायता के लिए अपने स्थानीय कृषि विस्तार अधिकारी से संपर्क करें।"),
        _ => None,
    }
}

pub fn chatbot(language: Option<&str>) -> ChatbotResponse {
    let requested = language.unwrap_or("en").trim().to_lowercase();
    let (language, response) = match fallback_reply(&requested) {
        Some(reply) => (requested, reply),
        None => ("en".to_string(), fallback_reply("en").unwrap_or_default()),
    };

    ChatbotResponse {
        response: response.to_string(),
        language,
        intent: "fallback".to_string(),
        timestamp: Utc::now().to_rfc3339(),
        success: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_or_fallback() {
        let ok: Fetched<u8> = Fetched::or_fallback(Ok::<u8, String>(7), "test", || 0);
        assert_eq!(ok, Fetched::live(7));

        let failed = Fetched::or_fallback(Err::<u8, _>("boom"), "test", || 1);
        assert!(failed.is_fallback());
        assert_eq!(failed.value, 1);
    }

    #[test]
    fn test_example_recommendation_is_consistent() {
        let rec = example_recommendation();
        assert_eq!(rec.level(), SuitabilityLevel::from_score(rec.suitability_score));
        let resp = recommendations();
        assert_eq!(resp.total_recommendations, 1);
    }

    #[test]
    fn test_forecast_dates_follow_start() {
        let start = NaiveDate::from_ymd_opt(2026, 5, 30).unwrap();
        let fc = forecast_from(start, 3);
        assert_eq!(fc.total_days, 3);
        let dates: Vec<_> = fc.forecast.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(dates, vec!["2026-05-31", "2026-06-01", "2026-06-02"]);
        // May is summer, June is monsoon
        assert_eq!(fc.forecast[0].temperature, 30.0);
        assert_eq!(fc.forecast[1].humidity, 85.0);
    }

    #[test]
    fn test_chatbot_language_fallback() {
        let reply = chatbot(Some("ml"));
        assert_eq!(reply.language, "ml");
        assert!(!reply.success);

        let reply = chatbot(Some("fr"));
        assert_eq!(reply.language, "en");
        assert!(reply.response.starts_with("I understand"));

        assert_eq!(chatbot(None).language, "en");
    }
}

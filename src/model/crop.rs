//! Crop Suitability - Output side of the crop recommendation contract
//!
//! One scoring call returns a batch of `CropSuitability` records. Scores are
//! only comparable within the batch they arrived in.

use serde::{Deserialize, Serialize};

/// Market demand band returned by the scoring service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum MarketDemand {
    Low,
    Medium,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

impl MarketDemand {
    /// Numeric stand-in used when sorting by demand
    pub fn demand_proxy(&self) -> u8 {
        match self {
            MarketDemand::VeryHigh => 95,
            MarketDemand::High => 80,
            MarketDemand::Medium => 60,
            MarketDemand::Low => 40,
        }
    }

    /// Weight used by the catalog's seasonal listing
    pub fn weight(&self) -> f64 {
        match self {
            MarketDemand::VeryHigh => 1.0,
            MarketDemand::High => 0.8,
            MarketDemand::Medium => 0.6,
            MarketDemand::Low => 0.4,
        }
    }

    pub fn display_text(&self) -> &'static str {
        match self {
            MarketDemand::Low => "Low",
            MarketDemand::Medium => "Medium",
            MarketDemand::High => "High",
            MarketDemand::VeryHigh => "Very High",
        }
    }
}

// Anything the service sends that we do not recognise lands in the lowest band.
impl From<String> for MarketDemand {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "very high" | "very_high" | "veryhigh" => MarketDemand::VeryHigh,
            "high" => MarketDemand::High,
            "medium" => MarketDemand::Medium,
            _ => MarketDemand::Low,
        }
    }
}

/// Suitability band derived from a 0-100 score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SuitabilityLevel {
    #[serde(alias = "poor")]
    Poor,
    #[serde(alias = "fair")]
    Fair,
    #[serde(alias = "good")]
    Good,
    #[serde(alias = "excellent")]
    Excellent,
}

impl SuitabilityLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            SuitabilityLevel::Excellent
        } else if score >= 60.0 {
            SuitabilityLevel::Good
        } else if score >= 40.0 {
            SuitabilityLevel::Fair
        } else {
            SuitabilityLevel::Poor
        }
    }
}

/// One candidate crop scored against one soil sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropSuitability {
    pub crop: String,
    /// 0-100
    pub suitability_score: f64,
    #[serde(default)]
    pub suitability_level: Option<SuitabilityLevel>,
    #[serde(default)]
    pub profit_potential: Option<f64>,
    pub estimated_yield: f64,
    pub growth_period_days: u32,
    pub market_demand: MarketDemand,
    /// Fraction, e.g. 0.35
    pub profit_margin: f64,
    pub ph_optimal: f64,
    pub rainfall_optimal: f64,
    pub temp_optimal: f64,
    pub recommended_season: String,
    /// Not sent by the scoring service today
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_price: Option<f64>,
}

impl CropSuitability {
    /// Level from the service when present, otherwise derived from the score
    pub fn level(&self) -> SuitabilityLevel {
        self.suitability_level
            .unwrap_or_else(|| SuitabilityLevel::from_score(self.suitability_score))
    }
}

/// Response of `POST /api/crop-recommendations`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub recommendations: Vec<CropSuitability>,
    pub total_recommendations: usize,
    pub timestamp: String,
}

impl RecommendationResponse {
    pub fn new(recommendations: Vec<CropSuitability>) -> Self {
        Self {
            total_recommendations: recommendations.len(),
            recommendations,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

//! Soil Sample - Input side of the crop recommendation contract
//!
//! One `SoilSample` is collected per recommendation request. It is validated
//! locally before anything is sent upstream, then projected onto the wire body
//! the scoring service accepts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use thiserror::Error;

// ============================================================================
// Accepted Ranges
// ============================================================================

pub const PH_RANGE: RangeInclusive<f64> = 3.0..=10.0;
/// Nitrogen, phosphorus and potassium share one range (mg/kg)
pub const NUTRIENT_RANGE: RangeInclusive<f64> = 0.0..=100.0;
/// Organic matter (%)
pub const ORGANIC_MATTER_RANGE: RangeInclusive<f64> = 0.0..=20.0;
/// Annual rainfall (mm/year)
pub const RAINFALL_RANGE: RangeInclusive<f64> = 0.0..=5000.0;
/// Average temperature (°C)
pub const TEMPERATURE_RANGE: RangeInclusive<f64> = 15.0..=45.0;

// ============================================================================
// Enums
// ============================================================================

/// Soil type as reported by the farmer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoilType {
    #[serde(alias = "clay")]
    Clay,
    #[serde(alias = "sandy")]
    Sandy,
    #[serde(alias = "loamy")]
    Loamy,
    #[serde(alias = "silt")]
    Silt,
    #[serde(alias = "laterite")]
    Laterite,
    #[serde(alias = "alluvial")]
    Alluvial,
}

impl SoilType {
    pub fn display_text(&self) -> &'static str {
        match self {
            SoilType::Clay => "Clay",
            SoilType::Sandy => "Sandy",
            SoilType::Loamy => "Loamy",
            SoilType::Silt => "Silt",
            SoilType::Laterite => "Laterite",
            SoilType::Alluvial => "Alluvial",
        }
    }
}

/// Planting season (Indian cropping calendar)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    #[serde(alias = "kharif")]
    Kharif,
    #[serde(alias = "rabi")]
    Rabi,
    #[serde(alias = "zaid")]
    Zaid,
    #[serde(rename = "Year-round", alias = "year-round", alias = "year_round")]
    YearRound,
}

impl Season {
    pub fn display_text(&self) -> &'static str {
        match self {
            Season::Kharif => "Kharif",
            Season::Rabi => "Rabi",
            Season::Zaid => "Zaid",
            Season::YearRound => "Year-round",
        }
    }

    /// Parse a path segment or free-text season name
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "kharif" => Some(Season::Kharif),
            "rabi" => Some(Season::Rabi),
            "zaid" => Some(Season::Zaid),
            "year-round" | "yearround" => Some(Season::YearRound),
            _ => None,
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_text())
    }
}

// ============================================================================
// Soil Sample
// ============================================================================

/// Soil chemistry plus environment for one recommendation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilSample {
    pub ph: f64,
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
    #[serde(default)]
    pub organic_matter: f64,
    pub soil_type: SoilType,
    pub rainfall: f64,
    pub temperature: f64,
    pub season: Season,
    #[serde(default)]
    pub location: String,
}

/// A numeric field outside its accepted range
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{field} = {value} is outside the accepted range {min}..={max}")]
pub struct ValidationError {
    pub field: &'static str,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

pub(crate) fn check(field: &'static str, value: f64, range: &RangeInclusive<f64>) -> Result<(), ValidationError> {
    // NaN fails `contains`, so non-finite input is rejected here too
    if value.is_finite() && range.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError {
            field,
            value,
            min: *range.start(),
            max: *range.end(),
        })
    }
}

impl SoilSample {
    /// Check every numeric field; reports the first violation in field order
    pub fn validate(&self) -> Result<(), ValidationError> {
        check("ph", self.ph, &PH_RANGE)?;
        check("nitrogen", self.nitrogen, &NUTRIENT_RANGE)?;
        check("phosphorus", self.phosphorus, &NUTRIENT_RANGE)?;
        check("potassium", self.potassium, &NUTRIENT_RANGE)?;
        check("organic_matter", self.organic_matter, &ORGANIC_MATTER_RANGE)?;
        check("rainfall", self.rainfall, &RAINFALL_RANGE)?;
        check("temperature", self.temperature, &TEMPERATURE_RANGE)?;
        Ok(())
    }

    /// Wire body for `POST /api/crop-recommendations`
    pub fn to_request(&self) -> CropRecommendationRequest {
        CropRecommendationRequest {
            ph: self.ph,
            nitrogen: self.nitrogen,
            phosphorus: self.phosphorus,
            potassium: self.potassium,
            rainfall: self.rainfall,
            temperature: self.temperature,
            soil_type: self.soil_type,
            season: self.season,
        }
    }
}

/// Body sent to the scoring service (organic matter and location stay local)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropRecommendationRequest {
    pub ph: f64,
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
    pub rainfall: f64,
    pub temperature: f64,
    pub soil_type: SoilType,
    pub season: Season,
}

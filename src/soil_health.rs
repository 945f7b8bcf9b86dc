//! Soil Health - Rule-based assessment of one soil sample
//!
//! Scores pH, the N/P/K balance and organic matter against reference ranges
//! for the sample's soil texture, estimates biological activity from organic
//! matter, and optionally scores physical properties when the lab measured
//! them. Every component is 0-100; the overall score is their weighted mean.
//!
//! Component weights: pH 0.2, nutrients 0.3, organic matter 0.2,
//! physical 0.2, biological 0.1. Without physical measurements the remaining
//! weights are renormalized.

use crate::model::soil::check;
use crate::model::{SoilSample, SoilType, ValidationError};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

const PH_WEIGHT: f64 = 0.2;
const NUTRIENT_WEIGHT: f64 = 0.3;
const ORGANIC_MATTER_WEIGHT: f64 = 0.2;
const PHYSICAL_WEIGHT: f64 = 0.2;
const BIOLOGICAL_WEIGHT: f64 = 0.1;

/// Accepted lab ranges for the optional physical block
pub const BULK_DENSITY_RANGE: RangeInclusive<f64> = 0.5..=2.5;
pub const WATER_HOLDING_RANGE: RangeInclusive<f64> = 0.0..=100.0;
pub const CEC_RANGE: RangeInclusive<f64> = 0.0..=100.0;

// ============================================================================
// Reference Ranges
// ============================================================================

/// Healthy interval for one soil property
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub min: f64,
    pub max: f64,
}

impl Band {
    const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn optimal(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    fn half_width(&self) -> f64 {
        (self.max - self.min) / 2.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SoilStandard {
    pub ph: Band,
    pub nitrogen: Band,
    pub phosphorus: Band,
    pub potassium: Band,
    pub organic_matter: Band,
    pub bulk_density: Band,
    pub water_holding_capacity: Band,
    pub cation_exchange_capacity: Band,
}

const CLAY: SoilStandard = SoilStandard {
    ph: Band::new(6.0, 7.5),
    nitrogen: Band::new(100.0, 200.0),
    phosphorus: Band::new(40.0, 80.0),
    potassium: Band::new(100.0, 200.0),
    organic_matter: Band::new(3.0, 6.0),
    bulk_density: Band::new(1.0, 1.3),
    water_holding_capacity: Band::new(40.0, 60.0),
    cation_exchange_capacity: Band::new(15.0, 40.0),
};

const LOAM: SoilStandard = SoilStandard {
    ph: Band::new(6.0, 7.0),
    nitrogen: Band::new(80.0, 150.0),
    phosphorus: Band::new(30.0, 60.0),
    potassium: Band::new(80.0, 150.0),
    organic_matter: Band::new(2.5, 5.0),
    bulk_density: Band::new(1.2, 1.5),
    water_holding_capacity: Band::new(30.0, 50.0),
    cation_exchange_capacity: Band::new(10.0, 25.0),
};

const SANDY: SoilStandard = SoilStandard {
    ph: Band::new(5.5, 7.0),
    nitrogen: Band::new(60.0, 120.0),
    phosphorus: Band::new(20.0, 50.0),
    potassium: Band::new(60.0, 120.0),
    organic_matter: Band::new(1.5, 4.0),
    bulk_density: Band::new(1.4, 1.7),
    water_holding_capacity: Band::new(20.0, 40.0),
    cation_exchange_capacity: Band::new(5.0, 15.0),
};

const LATERITE: SoilStandard = SoilStandard {
    ph: Band::new(5.0, 6.5),
    nitrogen: Band::new(70.0, 130.0),
    phosphorus: Band::new(25.0, 55.0),
    potassium: Band::new(70.0, 130.0),
    organic_matter: Band::new(2.0, 4.5),
    bulk_density: Band::new(1.1, 1.4),
    water_holding_capacity: Band::new(25.0, 45.0),
    cation_exchange_capacity: Band::new(8.0, 20.0),
};

/// Reference ranges for a soil type; textures without their own table use loam
pub fn standard_for(soil_type: SoilType) -> &'static SoilStandard {
    match soil_type {
        SoilType::Clay => &CLAY,
        SoilType::Sandy => &SANDY,
        SoilType::Laterite => &LATERITE,
        SoilType::Loamy | SoilType::Silt | SoilType::Alluvial => &LOAM,
    }
}

// ============================================================================
// Component Scores
// ============================================================================

/// Linear from 100 at the band centre to 0 at its edges; outside the band
/// 50 minus 10 per pH unit of distance
pub fn ph_score(ph: f64, band: &Band) -> f64 {
    let score = if band.contains(ph) {
        100.0 * (1.0 - (ph - band.optimal()).abs() / band.half_width())
    } else {
        let distance = if ph < band.min { band.min - ph } else { ph - band.max };
        50.0 - distance * 10.0
    };
    score.clamp(0.0, 100.0)
}

/// Shortfall is penalized harder than excess
pub fn nutrient_component_score(value: f64, band: &Band) -> f64 {
    let optimal = band.optimal();
    let score = if band.contains(value) {
        100.0 * (1.0 - (value - optimal).abs() / band.half_width())
    } else if value < band.min {
        100.0 - (band.min - value) / optimal * 50.0
    } else {
        100.0 - (value - band.max) / optimal * 30.0
    };
    score.clamp(0.0, 100.0)
}

/// N 0.4, P 0.3, K 0.3
pub fn nutrient_score(sample: &SoilSample, standard: &SoilStandard) -> f64 {
    nutrient_component_score(sample.nitrogen, &standard.nitrogen) * 0.4
        + nutrient_component_score(sample.phosphorus, &standard.phosphorus) * 0.3
        + nutrient_component_score(sample.potassium, &standard.potassium) * 0.3
}

pub fn organic_matter_score(organic_matter: f64, band: &Band) -> f64 {
    let score = if band.contains(organic_matter) {
        100.0
    } else if organic_matter < band.min {
        100.0 - (band.min - organic_matter) * 20.0
    } else {
        // Excess is never scored below 60
        (100.0 - (organic_matter - band.max) * 5.0).max(60.0)
    };
    score.clamp(0.0, 100.0)
}

/// Estimated from organic matter alone: carbon is taken as half the organic
/// matter and micronutrient availability as neutral (50)
pub fn biological_score(organic_matter: f64) -> f64 {
    let om_score = (organic_matter * 20.0).min(100.0);
    let carbon_score = (organic_matter * 0.5 * 40.0).min(100.0);
    om_score * 0.4 + carbon_score * 0.4 + 50.0 * 0.2
}

/// Lab-measured physical properties (optional part of an assessment)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalProperties {
    /// g/cm³
    pub bulk_density: f64,
    /// %
    pub water_holding_capacity: f64,
    /// meq/100g
    pub cation_exchange_capacity: f64,
}

impl PhysicalProperties {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check("bulk_density", self.bulk_density, &BULK_DENSITY_RANGE)?;
        check("water_holding_capacity", self.water_holding_capacity, &WATER_HOLDING_RANGE)?;
        check("cation_exchange_capacity", self.cation_exchange_capacity, &CEC_RANGE)?;
        Ok(())
    }
}

/// Bulk density 0.4, water holding capacity 0.3, CEC 0.3
pub fn physical_score(props: &PhysicalProperties, standard: &SoilStandard) -> f64 {
    let bd = &standard.bulk_density;
    let bd_score = if bd.contains(props.bulk_density) {
        100.0
    } else if props.bulk_density < bd.min {
        80.0
    } else {
        (100.0 - (props.bulk_density - bd.max) * 50.0).max(0.0)
    };

    let capacity_score = |value: f64, band: &Band| {
        if band.contains(value) {
            100.0
        } else if value < band.min {
            (100.0 - (band.min - value) * 2.0).max(0.0)
        } else {
            90.0
        }
    };
    let whc_score = capacity_score(props.water_holding_capacity, &standard.water_holding_capacity);
    let cec_score = capacity_score(props.cation_exchange_capacity, &standard.cation_exchange_capacity);

    bd_score * 0.4 + whc_score * 0.3 + cec_score * 0.3
}

// ============================================================================
// Assessment
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthLevel {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl HealthLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            HealthLevel::Excellent
        } else if score >= 60.0 {
            HealthLevel::Good
        } else if score >= 40.0 {
            HealthLevel::Fair
        } else {
            HealthLevel::Poor
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Urgent,
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn from_score(score: f64) -> Self {
        if score < 40.0 {
            Priority::Urgent
        } else if score < 60.0 {
            Priority::High
        } else if score < 80.0 {
            Priority::Medium
        } else {
            Priority::Low
        }
    }

    pub fn actions(&self) -> &'static [&'static str] {
        match self {
            Priority::Urgent => &[
                "Immediate soil improvement required",
                "Test soil annually and monitor progress",
                "Consider consulting with soil specialist",
            ],
            Priority::High => &[
                "Focus on major soil health issues",
                "Implement recommended soil amendments",
                "Monitor soil health every 6 months",
            ],
            Priority::Medium => &[
                "Maintain current practices with minor improvements",
                "Continue regular soil testing",
            ],
            Priority::Low => &[
                "Maintain excellent soil health practices",
                "Continue current management practices",
            ],
        }
    }
}

/// Body of `POST /api/soil-health/assess`
#[derive(Debug, Clone, Deserialize)]
pub struct SoilHealthRequest {
    #[serde(flatten)]
    pub sample: SoilSample,
    #[serde(default)]
    pub physical: Option<PhysicalProperties>,
}

/// Scores are rounded to one decimal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilHealthReport {
    pub overall_score: f64,
    pub ph_score: f64,
    pub nutrient_score: f64,
    pub organic_matter_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_score: Option<f64>,
    pub biological_score: f64,
    pub health_level: HealthLevel,
    pub priority: Priority,
    pub recommendations: Vec<String>,
    pub priority_actions: Vec<String>,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn assess(sample: &SoilSample, physical: Option<&PhysicalProperties>) -> SoilHealthReport {
    let standard = standard_for(sample.soil_type);

    let ph = ph_score(sample.ph, &standard.ph);
    let nutrients = nutrient_score(sample, standard);
    let organic = organic_matter_score(sample.organic_matter, &standard.organic_matter);
    let biological = biological_score(sample.organic_matter);
    let physical_component = physical.map(|props| physical_score(props, standard));

    let mut weighted = ph * PH_WEIGHT
        + nutrients * NUTRIENT_WEIGHT
        + organic * ORGANIC_MATTER_WEIGHT
        + biological * BIOLOGICAL_WEIGHT;
    let mut total_weight = PH_WEIGHT + NUTRIENT_WEIGHT + ORGANIC_MATTER_WEIGHT + BIOLOGICAL_WEIGHT;
    if let Some(score) = physical_component {
        weighted += score * PHYSICAL_WEIGHT;
        total_weight += PHYSICAL_WEIGHT;
    }
    let overall = weighted / total_weight;

    let recommendations = recommendations(sample, physical, ph, nutrients, organic, physical_component);
    let priority = Priority::from_score(overall);

    SoilHealthReport {
        overall_score: round1(overall),
        ph_score: round1(ph),
        nutrient_score: round1(nutrients),
        organic_matter_score: round1(organic),
        physical_score: physical_component.map(round1),
        biological_score: round1(biological),
        health_level: HealthLevel::from_score(overall),
        priority,
        recommendations,
        priority_actions: priority.actions().iter().map(|a| a.to_string()).collect(),
    }
}

/// Component scores under 60 trigger targeted advice; three general
/// practices are always appended
fn recommendations(
    sample: &SoilSample,
    physical: Option<&PhysicalProperties>,
    ph: f64,
    nutrients: f64,
    organic: f64,
    physical_component: Option<f64>,
) -> Vec<String> {
    let mut out: Vec<&str> = Vec::new();

    if ph < 60.0 {
        if sample.ph < 6.0 {
            out.push("Add lime to increase soil pH to optimal range (6.0-7.0)");
        } else if sample.ph > 7.5 {
            out.push("Add sulfur or organic matter to decrease soil pH");
        }
    }

    if nutrients < 60.0 {
        if sample.nitrogen < 80.0 {
            out.push("Apply nitrogen-rich fertilizers or organic manure");
        }
        if sample.phosphorus < 30.0 {
            out.push("Add phosphorus-rich fertilizers or rock phosphate");
        }
        if sample.potassium < 60.0 {
            out.push("Apply potassium-rich fertilizers or wood ash");
        }
    }

    if organic < 60.0 {
        out.push("Add compost, manure, or green manure to increase organic matter content");
        out.push("Practice crop rotation with leguminous crops");
    }

    if let (Some(props), Some(score)) = (physical, physical_component) {
        if score < 60.0 {
            if props.bulk_density > 1.5 {
                out.push("Improve soil structure by adding organic matter and reducing compaction");
            }
            if props.water_holding_capacity < 30.0 {
                out.push("Add organic matter to improve water holding capacity");
            }
        }
    }

    out.push("Practice conservation tillage to maintain soil structure");
    out.push("Use cover crops to protect soil from erosion");
    out.push("Implement crop rotation to maintain soil fertility");

    out.into_iter().map(String::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Season;
    use approx::assert_relative_eq;

    fn sample(soil_type: SoilType, ph: f64, n: f64, p: f64, k: f64, om: f64) -> SoilSample {
        SoilSample {
            ph,
            nitrogen: n,
            phosphorus: p,
            potassium: k,
            organic_matter: om,
            soil_type,
            rainfall: 1500.0,
            temperature: 27.0,
            season: Season::Kharif,
            location: String::new(),
        }
    }

    #[test]
    fn test_standard_defaults_to_loam() {
        assert_eq!(standard_for(SoilType::Silt), &LOAM);
        assert_eq!(standard_for(SoilType::Alluvial), &LOAM);
        assert_eq!(standard_for(SoilType::Laterite).ph, Band::new(5.0, 6.5));
    }

    #[test]
    fn test_ph_score_branches() {
        let band = LOAM.ph;
        // In range: linear from the centre
        assert_relative_eq!(ph_score(6.5, &band), 100.0);
        assert_relative_eq!(ph_score(6.25, &band), 50.0, epsilon = 1e-9);
        // Below / above: 50 - 10 per unit
        assert_relative_eq!(ph_score(4.0, &band), 30.0, epsilon = 1e-9);
        assert_relative_eq!(ph_score(8.0, &band), 40.0, epsilon = 1e-9);
        assert_eq!(ph_score(0.5, &band), 0.0);
    }

    #[test]
    fn test_nutrient_component_branches() {
        let n = LOAM.nitrogen; // 80-150, optimum 115
        assert_relative_eq!(nutrient_component_score(115.0, &n), 100.0);
        // 23 short of the minimum: 23 / 115 * 50 = 10
        assert_relative_eq!(nutrient_component_score(57.0, &n), 90.0, epsilon = 1e-9);
        assert_relative_eq!(nutrient_component_score(0.0, &n), 100.0 - 80.0 / 115.0 * 50.0, epsilon = 1e-9);

        let p = LOAM.phosphorus; // 30-60, optimum 45
        // 15 over the maximum: 15 / 45 * 30 = 10
        assert_relative_eq!(nutrient_component_score(75.0, &p), 90.0, epsilon = 1e-9);
    }

    #[test]
    fn test_organic_matter_branches() {
        let band = LOAM.organic_matter; // 2.5-5.0
        assert_eq!(organic_matter_score(3.0, &band), 100.0);
        assert_relative_eq!(organic_matter_score(1.5, &band), 80.0, epsilon = 1e-9);
        assert_relative_eq!(organic_matter_score(9.0, &band), 80.0, epsilon = 1e-9);
        // Excess floors at 60
        assert_eq!(organic_matter_score(20.0, &band), 60.0);
    }

    #[test]
    fn test_biological_estimate() {
        assert_relative_eq!(biological_score(3.0), 58.0, epsilon = 1e-9);
        assert_relative_eq!(biological_score(6.0), 90.0, epsilon = 1e-9);
        assert_relative_eq!(biological_score(0.0), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_physical_score_branches() {
        let ideal = PhysicalProperties {
            bulk_density: 1.3,
            water_holding_capacity: 40.0,
            cation_exchange_capacity: 15.0,
        };
        assert_relative_eq!(physical_score(&ideal, &LOAM), 100.0);

        // bd over by 0.2 -> 90, whc short by 10 -> 80, cec over -> 90
        let mixed = PhysicalProperties {
            bulk_density: 1.7,
            water_holding_capacity: 20.0,
            cation_exchange_capacity: 30.0,
        };
        assert_relative_eq!(physical_score(&mixed, &LOAM), 87.0, epsilon = 1e-9);
    }

    #[test]
    fn test_healthy_laterite_is_excellent() {
        let report = assess(&sample(SoilType::Laterite, 5.75, 100.0, 40.0, 100.0, 3.0), None);

        assert_eq!(report.ph_score, 100.0);
        assert_eq!(report.nutrient_score, 100.0);
        assert_eq!(report.organic_matter_score, 100.0);
        assert!(report.physical_score.is_none());
        assert_eq!(report.health_level, HealthLevel::Excellent);
        assert_eq!(report.priority, Priority::Low);
        // Only the three general practices
        assert_eq!(report.recommendations.len(), 3);
    }

    #[test]
    fn test_depleted_acid_loam() {
        // K sits on the band edge, which scores 0
        let report = assess(&sample(SoilType::Loamy, 4.0, 0.0, 0.0, 80.0, 0.2), None);

        // nutrients: 0.4 * (100 - 80/115*50) + 0.3 * (100 - 30/45*50) + 0 = 46.1
        assert_relative_eq!(report.nutrient_score, 46.1, epsilon = 0.051);
        // (0.2*30 + 0.3*46.09 + 0.2*54 + 0.1*13.2) / 0.8 = 39.9
        assert_relative_eq!(report.overall_score, 39.9, epsilon = 0.051);
        assert_eq!(report.health_level, HealthLevel::Poor);
        assert_eq!(report.priority, Priority::Urgent);
        assert_eq!(report.priority_actions.len(), 3);

        let recs = &report.recommendations;
        assert_eq!(recs.len(), 8);
        assert!(recs[0].contains("lime"));
        assert!(recs[1].contains("nitrogen"));
        assert!(recs[2].contains("phosphorus"));
        assert!(recs[3].contains("compost"));
        assert!(!recs.iter().any(|r| r.contains("potassium")));
    }

    #[test]
    fn test_physical_block_joins_the_mean() {
        let compacted = PhysicalProperties {
            bulk_density: 2.5,
            water_holding_capacity: 0.0,
            cation_exchange_capacity: 0.0,
        };
        let report = assess(&sample(SoilType::Loamy, 4.0, 0.0, 0.0, 80.0, 0.2), Some(&compacted));

        // bd 50*0.4 + whc 40*0.3 + cec 80*0.3 = 56
        assert_eq!(report.physical_score, Some(56.0));
        // 6 + 13.83 + 10.8 + 11.2 + 1.32
        assert_relative_eq!(report.overall_score, 43.1, epsilon = 0.051);
        assert_eq!(report.health_level, HealthLevel::Fair);
        assert!(report.recommendations.iter().any(|r| r.contains("compaction")));
        assert!(report.recommendations.iter().any(|r| r.contains("water holding")));
    }

    #[test]
    fn test_physical_validation() {
        let bad = PhysicalProperties {
            bulk_density: 3.0,
            water_holding_capacity: 40.0,
            cation_exchange_capacity: 15.0,
        };
        assert_eq!(bad.validate().unwrap_err().field, "bulk_density");
    }

    #[test]
    fn test_level_and_priority_edges() {
        assert_eq!(HealthLevel::from_score(80.0), HealthLevel::Excellent);
        assert_eq!(HealthLevel::from_score(59.9), HealthLevel::Fair);
        assert_eq!(HealthLevel::from_score(39.9), HealthLevel::Poor);
        assert_eq!(Priority::from_score(39.9), Priority::Urgent);
        assert_eq!(Priority::from_score(80.0), Priority::Low);
    }

    #[test]
    fn test_request_flattens_sample() {
        let json = r#"{
            "ph": 6.2, "nitrogen": 60, "phosphorus": 35, "potassium": 70,
            "organic_matter": 2.8, "soil_type": "laterite", "rainfall": 1800,
            "temperature": 27, "season": "Kharif",
            "physical": { "bulk_density": 1.3, "water_holding_capacity": 35, "cation_exchange_capacity": 12 }
        }"#;
        let req: SoilHealthRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.sample.soil_type, SoilType::Laterite);
        assert_eq!(req.physical.map(|p| p.bulk_density), Some(1.3));
    }
}

//! Crop Catalog - Static agronomic reference data
//!
//! Optimum ranges, soil types and market figures for the Kerala crops the
//! backend knows about. Used for the crop details fallback and the seasonal
//! listing. It does not score anything.

use crate::model::{MarketDemand, Season};
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::cmp::Ordering;

/// min / optimal / max for one agronomic factor
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Envelope {
    pub min: f64,
    pub optimal: f64,
    pub max: f64,
}

const fn env(min: f64, optimal: f64, max: f64) -> Envelope {
    Envelope { min, optimal, max }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropProfile {
    pub name: &'static str,
    pub ph: Envelope,
    pub rainfall: Envelope,
    pub temperature: Envelope,
    pub nitrogen: Envelope,
    pub phosphorus: Envelope,
    pub potassium: Envelope,
    pub soil_types: &'static [&'static str],
    pub seasons: &'static [Season],
    pub market_demand: MarketDemand,
    pub profit_margin: f64,
    pub yield_per_hectare: f64,
    pub growth_period_days: u32,
}

impl CropProfile {
    pub fn grows_in(&self, season: Season) -> bool {
        self.seasons.contains(&season) || self.seasons.contains(&Season::YearRound)
    }

    /// Flat record in the same shape the scoring service returns for `GET /api/crops/{name}`
    pub fn to_wire(&self) -> CropDetails {
        CropDetails {
            ph_min: self.ph.min,
            ph_max: self.ph.max,
            ph_optimal: self.ph.optimal,
            rainfall_min: self.rainfall.min,
            rainfall_max: self.rainfall.max,
            rainfall_optimal: self.rainfall.optimal,
            temp_min: self.temperature.min,
            temp_max: self.temperature.max,
            temp_optimal: self.temperature.optimal,
            nitrogen_min: self.nitrogen.min,
            nitrogen_max: self.nitrogen.max,
            nitrogen_optimal: self.nitrogen.optimal,
            phosphorus_min: self.phosphorus.min,
            phosphorus_max: self.phosphorus.max,
            phosphorus_optimal: self.phosphorus.optimal,
            potassium_min: self.potassium.min,
            potassium_max: self.potassium.max,
            potassium_optimal: self.potassium.optimal,
            soil_types: self.soil_types,
            seasons: self.seasons,
            market_demand: self.market_demand,
            profit_margin: self.profit_margin,
            yield_per_hectare: self.yield_per_hectare,
            growth_period_days: self.growth_period_days,
        }
    }
}

/// Crop reference record as served by the crop details endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropDetails {
    pub ph_min: f64,
    pub ph_max: f64,
    pub ph_optimal: f64,
    pub rainfall_min: f64,
    pub rainfall_max: f64,
    pub rainfall_optimal: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub temp_optimal: f64,
    pub nitrogen_min: f64,
    pub nitrogen_max: f64,
    pub nitrogen_optimal: f64,
    pub phosphorus_min: f64,
    pub phosphorus_max: f64,
    pub phosphorus_optimal: f64,
    pub potassium_min: f64,
    pub potassium_max: f64,
    pub potassium_optimal: f64,
    pub soil_types: &'static [&'static str],
    pub seasons: &'static [Season],
    pub market_demand: MarketDemand,
    pub profit_margin: f64,
    pub yield_per_hectare: f64,
    pub growth_period_days: u32,
}

/// Entry returned by [`CropCatalog::seasonal`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonalCrop {
    pub crop: &'static str,
    pub market_demand: MarketDemand,
    pub profit_margin: f64,
    pub growth_period_days: u32,
    pub yield_per_hectare: f64,
}

pub struct CropCatalog {
    profiles: Vec<CropProfile>,
    by_name: FxHashMap<String, usize>,
}

impl CropCatalog {
    pub fn new(profiles: Vec<CropProfile>) -> Self {
        let by_name = profiles
            .iter()
            .enumerate()
            .map(|(idx, p)| (p.name.to_lowercase(), idx))
            .collect();
        Self { profiles, by_name }
    }

    pub fn kerala() -> Self {
        Self::new(kerala_profiles())
    }

    /// Case-insensitive lookup
    pub fn get(&self, name: &str) -> Option<&CropProfile> {
        self.by_name
            .get(&name.trim().to_lowercase())
            .map(|&idx| &self.profiles[idx])
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CropProfile> {
        self.profiles.iter()
    }

    /// Crops for a season, best demand weight then best margin first
    pub fn seasonal(&self, season: Season, limit: usize) -> Vec<SeasonalCrop> {
        let mut crops: Vec<SeasonalCrop> = self
            .profiles
            .iter()
            .filter(|p| p.grows_in(season))
            .map(|p| SeasonalCrop {
                crop: p.name,
                market_demand: p.market_demand,
                profit_margin: p.profit_margin,
                growth_period_days: p.growth_period_days,
                yield_per_hectare: p.yield_per_hectare,
            })
            .collect();

        crops.sort_by(|a, b| {
            let wa = (a.market_demand.weight(), a.profit_margin);
            let wb = (b.market_demand.weight(), b.profit_margin);
            wb.partial_cmp(&wa).unwrap_or(Ordering::Equal)
        });
        crops.truncate(limit);
        crops
    }
}

// ============================================================================
// Built-in Table
// ============================================================================

const TWO_SEASONS: &[Season] = &[Season::Kharif, Season::Rabi];
const YEAR_ROUND: &[Season] = &[Season::YearRound];

fn kerala_profiles() -> Vec<CropProfile> {
    vec![
        CropProfile {
            name: "Rice",
            ph: env(5.0, 5.8, 6.5),
            rainfall: env(1000.0, 1500.0, 2000.0),
            temperature: env(20.0, 26.0, 35.0),
            nitrogen: env(80.0, 100.0, 120.0),
            phosphorus: env(40.0, 50.0, 60.0),
            potassium: env(40.0, 60.0, 80.0),
            soil_types: &["Alluvial", "Laterite", "Black"],
            seasons: TWO_SEASONS,
            market_demand: MarketDemand::High,
            profit_margin: 0.25,
            yield_per_hectare: 3000.0,
            growth_period_days: 120,
        },
        CropProfile {
            name: "Coconut",
            ph: env(5.2, 6.5, 8.0),
            rainfall: env(1300.0, 1800.0, 2300.0),
            temperature: env(20.0, 28.0, 35.0),
            nitrogen: env(100.0, 125.0, 150.0),
            phosphorus: env(50.0, 65.0, 80.0),
            potassium: env(100.0, 150.0, 200.0),
            soil_types: &["Laterite", "Alluvial", "Coastal Sandy"],
            seasons: YEAR_ROUND,
            market_demand: MarketDemand::VeryHigh,
            profit_margin: 0.35,
            yield_per_hectare: 80.0,
            growth_period_days: 365,
        },
        CropProfile {
            name: "Pepper",
            ph: env(5.5, 6.2, 7.0),
            rainfall: env(1250.0, 1600.0, 2000.0),
            temperature: env(18.0, 25.0, 32.0),
            nitrogen: env(60.0, 80.0, 100.0),
            phosphorus: env(30.0, 40.0, 50.0),
            potassium: env(80.0, 100.0, 120.0),
            soil_types: &["Laterite", "Red"],
            seasons: YEAR_ROUND,
            market_demand: MarketDemand::VeryHigh,
            profit_margin: 0.40,
            yield_per_hectare: 200.0,
            growth_period_days: 180,
        },
        CropProfile {
            name: "Cardamom",
            ph: env(5.0, 5.8, 6.5),
            rainfall: env(1500.0, 2500.0, 4000.0),
            temperature: env(15.0, 23.0, 28.0),
            nitrogen: env(100.0, 125.0, 150.0),
            phosphorus: env(50.0, 65.0, 80.0),
            potassium: env(100.0, 125.0, 150.0),
            soil_types: &["Laterite", "Forest"],
            seasons: YEAR_ROUND,
            market_demand: MarketDemand::High,
            profit_margin: 0.50,
            yield_per_hectare: 150.0,
            growth_period_days: 365,
        },
        CropProfile {
            name: "Rubber",
            ph: env(5.0, 5.8, 6.5),
            rainfall: env(1500.0, 2000.0, 2500.0),
            temperature: env(22.0, 27.0, 32.0),
            nitrogen: env(80.0, 100.0, 120.0),
            phosphorus: env(40.0, 50.0, 60.0),
            potassium: env(60.0, 80.0, 100.0),
            soil_types: &["Laterite", "Red"],
            seasons: YEAR_ROUND,
            market_demand: MarketDemand::Medium,
            profit_margin: 0.20,
            yield_per_hectare: 2000.0,
            growth_period_days: 2555, // 7 years to first tapping
        },
        CropProfile {
            name: "Tea",
            ph: env(4.5, 5.2, 6.0),
            rainfall: env(1200.0, 1800.0, 2500.0),
            temperature: env(15.0, 22.0, 28.0),
            nitrogen: env(120.0, 150.0, 180.0),
            phosphorus: env(30.0, 40.0, 50.0),
            potassium: env(60.0, 80.0, 100.0),
            soil_types: &["Laterite", "Forest"],
            seasons: YEAR_ROUND,
            market_demand: MarketDemand::Medium,
            profit_margin: 0.30,
            yield_per_hectare: 2000.0,
            growth_period_days: 365,
        },
        CropProfile {
            name: "Coffee",
            ph: env(6.0, 6.5, 7.0),
            rainfall: env(1500.0, 1750.0, 2000.0),
            temperature: env(18.0, 24.0, 28.0),
            nitrogen: env(80.0, 100.0, 120.0),
            phosphorus: env(40.0, 50.0, 60.0),
            potassium: env(80.0, 100.0, 120.0),
            soil_types: &["Laterite", "Forest"],
            seasons: YEAR_ROUND,
            market_demand: MarketDemand::High,
            profit_margin: 0.35,
            yield_per_hectare: 1000.0,
            growth_period_days: 365,
        },
        CropProfile {
            name: "Banana",
            ph: env(5.5, 6.2, 7.0),
            rainfall: env(1200.0, 1500.0, 1800.0),
            temperature: env(20.0, 27.0, 35.0),
            nitrogen: env(100.0, 125.0, 150.0),
            phosphorus: env(40.0, 50.0, 60.0),
            potassium: env(150.0, 175.0, 200.0),
            soil_types: &["Alluvial", "Laterite", "Black"],
            seasons: YEAR_ROUND,
            market_demand: MarketDemand::High,
            profit_margin: 0.30,
            yield_per_hectare: 40000.0,
            growth_period_days: 300,
        },
        CropProfile {
            name: "Ginger",
            ph: env(5.5, 6.0, 6.5),
            rainfall: env(1500.0, 2000.0, 3000.0),
            temperature: env(20.0, 25.0, 30.0),
            nitrogen: env(60.0, 80.0, 100.0),
            phosphorus: env(40.0, 50.0, 60.0),
            potassium: env(80.0, 100.0, 120.0),
            soil_types: &["Laterite", "Red"],
            seasons: TWO_SEASONS,
            market_demand: MarketDemand::High,
            profit_margin: 0.40,
            yield_per_hectare: 15000.0,
            growth_period_days: 240,
        },
        CropProfile {
            name: "Turmeric",
            ph: env(5.0, 6.2, 7.5),
            rainfall: env(1000.0, 1250.0, 1500.0),
            temperature: env(20.0, 26.0, 32.0),
            nitrogen: env(60.0, 80.0, 100.0),
            phosphorus: env(40.0, 50.0, 60.0),
            potassium: env(80.0, 100.0, 120.0),
            soil_types: &["Laterite", "Red", "Alluvial"],
            seasons: TWO_SEASONS,
            market_demand: MarketDemand::High,
            profit_margin: 0.35,
            yield_per_hectare: 20000.0,
            growth_period_days: 270,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let catalog = CropCatalog::kerala();
        assert_eq!(catalog.len(), 10);
        assert_eq!(catalog.get("pepper").map(|p| p.name), Some("Pepper"));
        assert_eq!(catalog.get(" COFFEE ").map(|p| p.growth_period_days), Some(365));
        assert!(catalog.get("Wheat").is_none());
    }

    #[test]
    fn test_seasonal_zaid_only_year_round_crops() {
        let catalog = CropCatalog::kerala();
        let crops = catalog.seasonal(Season::Zaid, 20);
        assert_eq!(crops.len(), 7);
        assert!(crops.iter().all(|c| !["Rice", "Ginger", "Turmeric"].contains(&c.crop)));
    }

    #[test]
    fn test_seasonal_ordering() {
        let catalog = CropCatalog::kerala();
        let crops = catalog.seasonal(Season::Kharif, 5);
        let names: Vec<_> = crops.iter().map(|c| c.crop).collect();
        // Very High demand first (Pepper 0.40 > Coconut 0.35), then High by margin
        assert_eq!(names, vec!["Pepper", "Coconut", "Cardamom", "Ginger", "Coffee"]);
    }

    #[test]
    fn test_profile_serializes_demand_label() {
        let catalog = CropCatalog::kerala();
        let json = serde_json::to_value(catalog.get("Coconut").unwrap()).unwrap();
        assert_eq!(json["market_demand"], "Very High");
        assert_eq!(json["seasons"][0], "Year-round");
    }

    #[test]
    fn test_wire_record_is_flat() {
        let catalog = CropCatalog::kerala();
        let json = serde_json::to_value(catalog.get("rice").unwrap().to_wire()).unwrap();
        let obj = json.as_object().unwrap();

        for key in ["ph_min", "ph_max", "ph_optimal", "rainfall_optimal", "temp_optimal", "nitrogen_optimal"] {
            assert!(obj.contains_key(key), "missing {}", key);
        }
        assert!(!obj.contains_key("ph"));
        assert!(!obj.contains_key("name"));
        assert_eq!(json["ph_optimal"], 5.8);
        assert_eq!(json["ph_min"], 5.0);
        assert_eq!(json["ph_max"], 6.5);
        assert_eq!(json["market_demand"], "High");
    }
}

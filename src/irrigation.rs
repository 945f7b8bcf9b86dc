//! Irrigation Planning - Weather-driven schedule and alerts
//!
//! Pure functions over a short run of daily weather points (today first).
//! No forecasting happens here; the points come from the weather endpoints
//! or from the dashboard.

use serde::{Deserialize, Serialize};

/// Soil moisture (%) below which irrigation is needed straight away
pub const DRY_SOIL_MOISTURE: f64 = 30.0;
/// Rain (mm) on a day at or above which that day needs no irrigation
pub const RAIN_SKIP_MM: f64 = 10.0;
const HOT_DAY_TEMP: f64 = 28.0;
const DRY_AIR_HUMIDITY: f64 = 70.0;
const SCHEDULE_DAYS: usize = 7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherPoint {
    /// ISO date (YYYY-MM-DD)
    pub date: String,
    pub temperature: f64,
    pub humidity: f64,
    #[serde(default)]
    pub wind_speed: f64,
    #[serde(default)]
    pub rainfall_mm: f64,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrrigationSlot {
    pub date: String,
    pub time: String,
    pub duration: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IrrigationPlan {
    pub immediate: bool,
    pub next_24h: bool,
    pub recommendation: String,
    pub schedule: Vec<IrrigationSlot>,
}

/// Build an irrigation plan from today's weather plus the days after it
pub fn irrigation_schedule(points: &[WeatherPoint], soil_moisture: f64) -> IrrigationPlan {
    let Some(today) = points.first() else {
        return IrrigationPlan::default();
    };

    let mut plan = IrrigationPlan::default();

    if soil_moisture < DRY_SOIL_MOISTURE || today.temperature > 30.0 {
        plan.immediate = true;
        plan.recommendation = "Immediate irrigation required".to_string();
    }

    let next_days = &points[1..points.len().min(3)];
    if !next_days.is_empty() {
        let n = next_days.len() as f64;
        let avg_temp = next_days.iter().map(|p| p.temperature).sum::<f64>() / n;
        let avg_humidity = next_days.iter().map(|p| p.humidity).sum::<f64>() / n;
        if avg_temp > HOT_DAY_TEMP && avg_humidity < DRY_AIR_HUMIDITY {
            plan.next_24h = true;
            plan.recommendation = "Irrigation recommended within 24 hours".to_string();
        }
    }

    plan.schedule = points
        .iter()
        .take(SCHEDULE_DAYS)
        .filter(|p| p.rainfall_mm < RAIN_SKIP_MM)
        .filter(|p| p.temperature > HOT_DAY_TEMP && p.humidity < DRY_AIR_HUMIDITY)
        .map(|p| IrrigationSlot {
            date: p.date.clone(),
            time: "Early morning (6-8 AM)".to_string(),
            duration: "30-45 minutes".to_string(),
            reason: format!(
                "High temperature ({}°C) and low humidity ({}%)",
                p.temperature, p.humidity
            ),
        })
        .collect();

    if plan.recommendation.is_empty() {
        plan.recommendation = if plan.schedule.is_empty() {
            "No irrigation needed in the coming days".to_string()
        } else {
            "Follow the irrigation schedule".to_string()
        };
    }

    plan
}

// ============================================================================
// Alerts
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    HeavyRain,
    HighTemperature,
    LowTemperature,
    HighHumidity,
    LowHumidity,
    StrongWind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherAlert {
    pub kind: AlertKind,
    pub severity: String,
    pub date: String,
    pub description: String,
    pub recommendation: String,
}

/// Threshold alerts for every point, in input order. Thresholds are inclusive.
pub fn weather_alerts(points: &[WeatherPoint]) -> Vec<WeatherAlert> {
    let mut alerts = Vec::new();

    for p in points {
        let mut push = |kind, severity: &str, description: String, recommendation: &str| {
            alerts.push(WeatherAlert {
                kind,
                severity: severity.to_string(),
                date: p.date.clone(),
                description,
                recommendation: recommendation.to_string(),
            });
        };

        if p.rainfall_mm >= 50.0 {
            push(
                AlertKind::HeavyRain,
                "High",
                format!("Heavy rainfall expected ({} mm)", p.rainfall_mm),
                "Reduce irrigation. Ensure proper drainage to prevent waterlogging.",
            );
        }
        if p.temperature >= 35.0 {
            push(
                AlertKind::HighTemperature,
                "High",
                format!("High temperature ({}°C)", p.temperature),
                "Increase irrigation frequency. Water early morning or late evening to reduce evaporation.",
            );
        }
        if p.temperature <= 15.0 {
            push(
                AlertKind::LowTemperature,
                "Medium",
                format!("Low temperature ({}°C)", p.temperature),
                "Protect sensitive seedlings and delay transplanting.",
            );
        }
        if p.humidity >= 90.0 {
            push(
                AlertKind::HighHumidity,
                "Medium",
                format!("High humidity ({}%)", p.humidity),
                "High humidity increases pest activity. Monitor crops closely and apply preventive measures.",
            );
        }
        if p.humidity <= 40.0 {
            push(
                AlertKind::LowHumidity,
                "Medium",
                format!("Low humidity ({}%)", p.humidity),
                "Consider mulching to retain soil moisture. Increase irrigation if needed.",
            );
        }
        if p.wind_speed >= 15.0 {
            push(
                AlertKind::StrongWind,
                "Medium",
                format!("Strong wind ({} m/s)", p.wind_speed),
                "Secure loose items and avoid spraying operations.",
            );
        }
    }

    alerts
}

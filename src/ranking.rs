//! Ranking - Sort and filter a batch of crop suitability records
//!
//! Three sort keys (all descending, all stable) and one filter dimension,
//! the profitability band derived from the suitability score. Everything
//! here is pure: the same batch and query always give the same output, and
//! an empty result is a `NoMatches` state rather than an error.

use crate::model::CropSuitability;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;
use thiserror::Error;

/// Score strictly above this is the high band
pub const HIGH_BAND_FLOOR: f64 = 80.0;
/// Score strictly above this (and not high) is the medium band
pub const MEDIUM_BAND_FLOOR: f64 = 60.0;

// ============================================================================
// Query Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Suitability,
    MarketPrice,
    MarketDemand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfitabilityBand {
    High,
    Medium,
    Low,
}

impl ProfitabilityBand {
    pub fn from_score(score: f64) -> Self {
        if score > HIGH_BAND_FLOOR {
            ProfitabilityBand::High
        } else if score > MEDIUM_BAND_FLOOR {
            ProfitabilityBand::Medium
        } else {
            ProfitabilityBand::Low
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfitabilityFilter {
    #[default]
    All,
    High,
    Medium,
    Low,
}

impl ProfitabilityFilter {
    pub fn matches(&self, record: &CropSuitability) -> bool {
        let band = ProfitabilityBand::from_score(record.suitability_score);
        match self {
            ProfitabilityFilter::All => true,
            ProfitabilityFilter::High => band == ProfitabilityBand::High,
            ProfitabilityFilter::Medium => band == ProfitabilityBand::Medium,
            ProfitabilityFilter::Low => band == ProfitabilityBand::Low,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct RankingParseError {
    pub kind: &'static str,
    pub value: String,
}

impl FromStr for SortKey {
    type Err = RankingParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "suitability" | "score" => Ok(SortKey::Suitability),
            "price" | "market_price" => Ok(SortKey::MarketPrice),
            "demand" | "market_demand" => Ok(SortKey::MarketDemand),
            other => Err(RankingParseError {
                kind: "sort key",
                value: other.to_string(),
            }),
        }
    }
}

impl FromStr for ProfitabilityFilter {
    type Err = RankingParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(ProfitabilityFilter::All),
            "high" => Ok(ProfitabilityFilter::High),
            "medium" => Ok(ProfitabilityFilter::Medium),
            "low" => Ok(ProfitabilityFilter::Low),
            other => Err(RankingParseError {
                kind: "profitability filter",
                value: other.to_string(),
            }),
        }
    }
}

/// Sort key + filter applied together by [`rank`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RankingQuery {
    pub sort: SortKey,
    pub profitability: ProfitabilityFilter,
}

impl RankingQuery {
    /// Build from optional query-string values; missing values use defaults
    pub fn parse(sort: Option<&str>, profitability: Option<&str>) -> Result<Self, RankingParseError> {
        Ok(Self {
            sort: sort.map(str::parse).transpose()?.unwrap_or_default(),
            profitability: profitability.map(str::parse).transpose()?.unwrap_or_default(),
        })
    }
}

// ============================================================================
// Operations
// ============================================================================

fn sort_value(record: &CropSuitability, key: SortKey) -> f64 {
    match key {
        SortKey::Suitability => record.suitability_score,
        // Missing price counts as zero, so upstream batches keep their order
        SortKey::MarketPrice => record.market_price.unwrap_or(0.0),
        SortKey::MarketDemand => f64::from(record.market_demand.demand_proxy()),
    }
}

/// Stable descending sort in place
pub fn sort_by_key(records: &mut [CropSuitability], key: SortKey) {
    records.sort_by(|a, b| {
        let (va, vb) = (sort_value(a, key), sort_value(b, key));
        vb.partial_cmp(&va).unwrap_or(Ordering::Equal)
    });
}

/// Records in the requested band, input order preserved
pub fn filter_by_profitability(
    records: &[CropSuitability],
    filter: ProfitabilityFilter,
) -> Vec<CropSuitability> {
    records.iter().filter(|r| filter.matches(r)).cloned().collect()
}

/// Outcome of ranking one batch
#[derive(Debug, Clone, PartialEq)]
pub enum RankedBatch {
    Matches(Vec<CropSuitability>),
    NoMatches,
}

impl RankedBatch {
    pub fn records(&self) -> &[CropSuitability] {
        match self {
            RankedBatch::Matches(records) => records,
            RankedBatch::NoMatches => &[],
        }
    }

    pub fn into_records(self) -> Vec<CropSuitability> {
        match self {
            RankedBatch::Matches(records) => records,
            RankedBatch::NoMatches => Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, RankedBatch::NoMatches)
    }

    /// Status string used in API responses
    pub fn status(&self) -> &'static str {
        match self {
            RankedBatch::Matches(_) => "ok",
            RankedBatch::NoMatches => "no_matches",
        }
    }
}

/// Filter, then sort
pub fn rank(batch: &[CropSuitability], query: &RankingQuery) -> RankedBatch {
    let mut records = filter_by_profitability(batch, query.profitability);
    if records.is_empty() {
        return RankedBatch::NoMatches;
    }
    sort_by_key(&mut records, query.sort);
    RankedBatch::Matches(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MarketDemand;

    fn rec(crop: &str, score: f64, demand: MarketDemand) -> CropSuitability {
        CropSuitability {
            crop: crop.to_string(),
            suitability_score: score,
            suitability_level: None,
            profit_potential: None,
            estimated_yield: 1000.0,
            growth_period_days: 120,
            market_demand: demand,
            profit_margin: 0.3,
            ph_optimal: 6.0,
            rainfall_optimal: 1500.0,
            temp_optimal: 26.0,
            recommended_season: "Kharif".to_string(),
            market_price: None,
        }
    }

    fn names(records: &[CropSuitability]) -> Vec<&str> {
        records.iter().map(|r| r.crop.as_str()).collect()
    }

    fn example() -> Vec<CropSuitability> {
        vec![
            rec("B", 65.0, MarketDemand::High),
            rec("C", 40.0, MarketDemand::VeryHigh),
            rec("A", 92.0, MarketDemand::Medium),
        ]
    }

    #[test]
    fn test_sort_by_suitability() {
        let ranked = rank(&example(), &RankingQuery::default());
        assert_eq!(names(ranked.records()), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_filter_bands() {
        let batch = example();
        let by = |f| names(&filter_by_profitability(&batch, f)).join(",");
        assert_eq!(by(ProfitabilityFilter::High), "A");
        assert_eq!(by(ProfitabilityFilter::Medium), "B");
        assert_eq!(by(ProfitabilityFilter::Low), "C");
        assert_eq!(by(ProfitabilityFilter::All), "B,C,A");
    }

    #[test]
    fn test_band_boundaries() {
        assert_eq!(ProfitabilityBand::from_score(80.0), ProfitabilityBand::Medium);
        assert_eq!(ProfitabilityBand::from_score(80.1), ProfitabilityBand::High);
        assert_eq!(ProfitabilityBand::from_score(60.0), ProfitabilityBand::Low);
        assert_eq!(ProfitabilityBand::from_score(60.5), ProfitabilityBand::Medium);
    }

    #[test]
    fn test_sort_by_demand() {
        let mut batch = example();
        sort_by_key(&mut batch, SortKey::MarketDemand);
        assert_eq!(names(&batch), vec!["C", "B", "A"]);
    }

    #[test]
    fn test_price_sort_keeps_order_without_prices() {
        let mut batch = example();
        sort_by_key(&mut batch, SortKey::MarketPrice);
        assert_eq!(names(&batch), vec!["B", "C", "A"]);
    }

    #[test]
    fn test_price_sort_uses_sourced_prices() {
        let mut batch = example();
        batch[1].market_price = Some(42.0);
        batch[2].market_price = Some(18.5);
        sort_by_key(&mut batch, SortKey::MarketPrice);
        assert_eq!(names(&batch), vec!["C", "A", "B"]);
    }

    #[test]
    fn test_empty_input_is_no_matches() {
        let ranked = rank(&[], &RankingQuery::default());
        assert_eq!(ranked, RankedBatch::NoMatches);
        assert_eq!(ranked.status(), "no_matches");
        assert!(ranked.records().is_empty());
    }

    #[test]
    fn test_filter_with_no_hits_is_no_matches() {
        let batch = vec![rec("C", 40.0, MarketDemand::Low)];
        let query = RankingQuery {
            sort: SortKey::Suitability,
            profitability: ProfitabilityFilter::High,
        };
        assert!(rank(&batch, &query).is_empty());
    }

    #[test]
    fn test_query_parse() {
        let q = RankingQuery::parse(Some("demand"), Some("HIGH")).unwrap();
        assert_eq!(q.sort, SortKey::MarketDemand);
        assert_eq!(q.profitability, ProfitabilityFilter::High);

        let q = RankingQuery::parse(None, None).unwrap();
        assert_eq!(q, RankingQuery::default());

        let err = RankingQuery::parse(Some("yield"), None).unwrap_err();
        assert_eq!(err.kind, "sort key");
    }
}

#![allow(dead_code)]

use std::{cmp::Ordering, time::SystemTime};

use serde::{Deserialize, Serialize};
use time::Date;

/// Unit used for every mandi price in the dashboard.
pub const QUINTAL: &str = "quintal";

/// Direction of a price move, derived from the sign of a change value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PriceDirection {
    Up,
    Down,
    Flat,
}

impl PriceDirection {
    pub fn of(value: f64) -> Self {
        match value.partial_cmp(&0.0) {
            Some(Ordering::Greater) => PriceDirection::Up,
            Some(Ordering::Less) => PriceDirection::Down,
            _ => PriceDirection::Flat,
        }
    }
}

/// A single commodity quote at one mandi.
///
/// `change` and `change_percent` always carry the same sign; build quotes
/// through [`PriceQuote::from_previous`] or [`PriceQuote::unchanged`].
#[derive(Clone, Debug, PartialEq)]
pub struct PriceQuote {
    pub commodity: String,
    pub price: f64,
    pub unit: String,
    pub change: f64,
    pub change_percent: f64,
    pub market: String,
    /// Lowest and highest trade of the day when the mandi reports them.
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub observed_at: SystemTime,
}

impl PriceQuote {
    /// Quote whose change is measured against `previous`.
    pub fn from_previous(
        commodity: impl Into<String>,
        market: impl Into<String>,
        price: f64,
        previous: f64,
        observed_at: SystemTime,
    ) -> Self {
        let (change, change_percent) = change_against(price, previous);
        Self {
            commodity: commodity.into(),
            price,
            unit: QUINTAL.to_string(),
            change,
            change_percent,
            market: market.into(),
            min_price: None,
            max_price: None,
            observed_at,
        }
    }

    /// Quote with no known baseline (live mandi records carry no history).
    pub fn unchanged(
        commodity: impl Into<String>,
        market: impl Into<String>,
        price: f64,
        observed_at: SystemTime,
    ) -> Self {
        Self::from_previous(commodity, market, price, price, observed_at)
    }

    pub fn with_range(mut self, min_price: Option<f64>, max_price: Option<f64>) -> Self {
        self.min_price = min_price;
        self.max_price = max_price;
        self
    }

    pub fn direction(&self) -> PriceDirection {
        PriceDirection::of(self.change)
    }
}

/// Absolute and percent change of `price` against `previous`.
///
/// A non-positive baseline has no meaningful percentage, so the move is
/// reported as flat.
pub fn change_against(price: f64, previous: f64) -> (f64, f64) {
    if previous.is_nan() || previous <= 0.0 || !price.is_finite() {
        return (0.0, 0.0);
    }
    let change = price - previous;
    let percent = change / previous * 100.0;
    if PriceDirection::of(percent) != PriceDirection::of(change) {
        // percent underflowed to zero
        return (0.0, 0.0);
    }
    (change, percent)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NutrientUnit {
    #[serde(rename = "kg/ha")]
    KgPerHectare,
    #[serde(rename = "ppm")]
    Ppm,
}

impl NutrientUnit {
    pub fn label(&self) -> &'static str {
        match self {
            NutrientUnit::KgPerHectare => "kg/ha",
            NutrientUnit::Ppm => "ppm",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NutrientLevel {
    pub value: f64,
    pub unit: NutrientUnit,
}

impl NutrientLevel {
    pub fn kg_per_ha(value: f64) -> Self {
        Self {
            value,
            unit: NutrientUnit::KgPerHectare,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Nutrient {
    Nitrogen,
    Phosphorus,
    Potassium,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NutrientStatus {
    Low,
    Medium,
    High,
}

impl NutrientStatus {
    pub fn label(&self) -> &'static str {
        match self {
            NutrientStatus::Low => "low",
            NutrientStatus::Medium => "medium",
            NutrientStatus::High => "high",
        }
    }

    fn banded(value: f64, low_below: f64, high_above: f64) -> Self {
        if value < low_below {
            NutrientStatus::Low
        } else if value > high_above {
            NutrientStatus::High
        } else {
            NutrientStatus::Medium
        }
    }
}

impl Nutrient {
    pub fn name(&self) -> &'static str {
        match self {
            Nutrient::Nitrogen => "Nitrogen (N)",
            Nutrient::Phosphorus => "Phosphorus (P)",
            Nutrient::Potassium => "Potassium (K)",
        }
    }

    /// Soil health card rating for a level. Only kg/ha readings have
    /// published bands, so ppm readings are unrated.
    pub fn rate(&self, level: NutrientLevel) -> Option<NutrientStatus> {
        if level.unit != NutrientUnit::KgPerHectare {
            return None;
        }
        let (low_below, high_above) = match self {
            Nutrient::Nitrogen => (280.0, 560.0),
            Nutrient::Phosphorus => (10.0, 25.0),
            Nutrient::Potassium => (108.0, 280.0),
        };
        Some(NutrientStatus::banded(level.value, low_below, high_above))
    }
}

/// Soil test results for one district.
#[derive(Clone, Debug, PartialEq)]
pub struct SoilSample {
    pub district: String,
    pub nitrogen: NutrientLevel,
    pub phosphorus: NutrientLevel,
    pub potassium: NutrientLevel,
    /// Organic carbon, percent by weight.
    pub organic_carbon: f64,
    pub ph: f64,
    pub sample_date: Date,
    pub recommendations: Vec<String>,
}

impl SoilSample {
    pub fn level(&self, nutrient: Nutrient) -> NutrientLevel {
        match nutrient {
            Nutrient::Nitrogen => self.nitrogen,
            Nutrient::Phosphorus => self.phosphorus,
            Nutrient::Potassium => self.potassium,
        }
    }

    pub fn rating(&self, nutrient: Nutrient) -> Option<NutrientStatus> {
        nutrient.rate(self.level(nutrient))
    }

    pub fn organic_carbon_status(&self) -> NutrientStatus {
        NutrientStatus::banded(self.organic_carbon, 0.5, 0.75)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Demand {
    Low,
    Moderate,
    High,
    #[serde(rename = "Very High", alias = "VeryHigh")]
    VeryHigh,
}

impl Demand {
    pub fn label(&self) -> &'static str {
        match self {
            Demand::Low => "Low",
            Demand::Moderate => "Moderate",
            Demand::High => "High",
            Demand::VeryHigh => "Very High",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TrendPoint {
    pub month: String,
    pub price: f64,
    pub demand: Demand,
    pub forecast: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MarketTrend {
    pub crop: String,
    pub time_range: String,
    pub points: Vec<TrendPoint>,
}

impl MarketTrend {
    pub fn average_price(&self) -> Option<f64> {
        if self.points.is_empty() {
            return None;
        }
        let total: f64 = self.points.iter().map(|point| point.price).sum();
        Some(total / self.points.len() as f64)
    }

    pub fn latest(&self) -> Option<&TrendPoint> {
        self.points.last()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct WeatherReport {
    pub location: String,
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub pressure_hpa: f64,
    pub condition: String,
    pub description: String,
    pub wind_speed_ms: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_change_follows_previous_price() {
        let quote = PriceQuote::from_previous("Wheat", "Delhi Mandi", 2550.0, 2500.0, SystemTime::now());
        assert_eq!(quote.change, 50.0);
        assert!((quote.change_percent - 2.0).abs() < 1e-9);
        assert_eq!(quote.direction(), PriceDirection::Up);
        assert_eq!(quote.unit, QUINTAL);
    }

    #[test]
    fn quote_without_baseline_is_flat() {
        let quote = PriceQuote::from_previous("Onion", "Nashik Mandi", 3500.0, 0.0, SystemTime::now());
        assert_eq!(quote.change, 0.0);
        assert_eq!(quote.change_percent, 0.0);

        let unchanged = PriceQuote::unchanged("Onion", "Nashik Mandi", 3500.0, SystemTime::now());
        assert_eq!(unchanged.direction(), PriceDirection::Flat);
    }

    #[test]
    fn negative_zero_counts_as_flat() {
        assert_eq!(PriceDirection::of(-0.0), PriceDirection::Flat);
        assert_eq!(PriceDirection::of(f64::NAN), PriceDirection::Flat);
    }

    #[test]
    fn nitrogen_bands_follow_soil_health_card() {
        let rate = |value| Nutrient::Nitrogen.rate(NutrientLevel::kg_per_ha(value));
        assert_eq!(rate(245.0), Some(NutrientStatus::Low));
        assert_eq!(rate(300.0), Some(NutrientStatus::Medium));
        assert_eq!(rate(600.0), Some(NutrientStatus::High));
    }

    #[test]
    fn ppm_readings_are_unrated() {
        let level = NutrientLevel {
            value: 18.0,
            unit: NutrientUnit::Ppm,
        };
        assert_eq!(Nutrient::Phosphorus.rate(level), None);
    }

    #[test]
    fn trend_average_over_points() {
        let trend = MarketTrend {
            crop: "wheat".into(),
            time_range: "6months".into(),
            points: vec![
                TrendPoint {
                    month: "Jan".into(),
                    price: 2300.0,
                    demand: Demand::High,
                    forecast: "Stable prices".into(),
                },
                TrendPoint {
                    month: "Feb".into(),
                    price: 2500.0,
                    demand: Demand::Moderate,
                    forecast: "Stable prices".into(),
                },
            ],
        };
        assert_eq!(trend.average_price(), Some(2400.0));
        assert_eq!(trend.latest().map(|p| p.month.as_str()), Some("Feb"));
    }
}

//! Sample data served whenever a live source is unavailable.
//!
//! Every generator draws uniformly from a fixed range and stamps the current
//! time. Nothing here caches or retries.

use std::time::SystemTime;

use rand::Rng;
use time::OffsetDateTime;

use crate::domain::{
    Demand, MarketTrend, NutrientLevel, PriceQuote, SoilSample, TrendPoint, WeatherReport,
};

pub const MODAL_PRICE_RANGE: (f64, f64) = (2500.0, 3500.0);
pub const MIN_PRICE_RANGE: (f64, f64) = (2000.0, 3000.0);
pub const MAX_PRICE_RANGE: (f64, f64) = (3000.0, 4000.0);
/// Largest day-over-day move for a sample quote, in INR.
pub const PRICE_MOVE: f64 = 150.0;

pub const NITROGEN_RANGE: (f64, f64) = (200.0, 500.0);
pub const PHOSPHORUS_RANGE: (f64, f64) = (10.0, 60.0);
pub const POTASSIUM_RANGE: (f64, f64) = (150.0, 550.0);
pub const ORGANIC_CARBON_RANGE: (f64, f64) = (0.0, 2.0);
pub const PH_RANGE: (f64, f64) = (6.0, 9.0);

pub const TREND_PRICE_RANGE: (f64, f64) = (2000.0, 3000.0);
pub const TREND_MONTHS: [&str; 6] = ["Jan", "Feb", "Mar", "Apr", "May", "Jun"];

pub const TEMPERATURE_RANGE: (f64, f64) = (20.0, 40.0);
pub const HUMIDITY_RANGE: (f64, f64) = (40.0, 80.0);
pub const PRESSURE_RANGE: (f64, f64) = (1000.0, 1050.0);
pub const WIND_RANGE: (f64, f64) = (0.0, 10.0);

const SOIL_RECOMMENDATIONS: [&str; 3] = [
    "Apply organic compost for better soil structure",
    "Consider crop rotation with legumes",
    "Maintain proper drainage during monsoon",
];

fn draw<R: Rng + ?Sized>(rng: &mut R, (low, high): (f64, f64)) -> f64 {
    rng.gen_range(low..high)
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

pub fn sample_mandi_prices<R: Rng + ?Sized>(
    rng: &mut R,
    commodity: &str,
    region: &str,
) -> Vec<PriceQuote> {
    let price = draw(rng, MODAL_PRICE_RANGE).floor();
    let previous = price - rng.gen_range(-PRICE_MOVE..PRICE_MOVE).round();
    let min_price = draw(rng, MIN_PRICE_RANGE).floor().min(price);
    let max_price = draw(rng, MAX_PRICE_RANGE).floor().max(price);

    let quote = PriceQuote::from_previous(
        commodity,
        format!("{region} Mandi"),
        price,
        previous,
        SystemTime::now(),
    )
    .with_range(Some(min_price), Some(max_price));
    vec![quote]
}

pub fn sample_soil<R: Rng + ?Sized>(rng: &mut R, district: &str) -> SoilSample {
    SoilSample {
        district: district.to_string(),
        nitrogen: NutrientLevel::kg_per_ha(draw(rng, NITROGEN_RANGE).floor()),
        phosphorus: NutrientLevel::kg_per_ha(draw(rng, PHOSPHORUS_RANGE).floor()),
        potassium: NutrientLevel::kg_per_ha(draw(rng, POTASSIUM_RANGE).floor()),
        organic_carbon: round_to(draw(rng, ORGANIC_CARBON_RANGE), 2),
        ph: round_to(rng.gen_range(PH_RANGE.0..=PH_RANGE.1), 1),
        sample_date: OffsetDateTime::now_utc().date(),
        recommendations: SOIL_RECOMMENDATIONS.iter().map(|s| s.to_string()).collect(),
    }
}

pub fn sample_market_trend<R: Rng + ?Sized>(
    rng: &mut R,
    crop: &str,
    time_range: &str,
) -> MarketTrend {
    let points = TREND_MONTHS
        .iter()
        .map(|month| TrendPoint {
            month: month.to_string(),
            price: draw(rng, TREND_PRICE_RANGE).floor(),
            demand: if rng.gen_bool(0.5) {
                Demand::High
            } else {
                Demand::Moderate
            },
            forecast: if rng.gen_bool(0.5) {
                "Price increase expected".to_string()
            } else {
                "Stable prices".to_string()
            },
        })
        .collect();

    MarketTrend {
        crop: crop.to_string(),
        time_range: time_range.to_string(),
        points,
    }
}

pub fn sample_weather<R: Rng + ?Sized>(rng: &mut R) -> WeatherReport {
    WeatherReport {
        location: "Your Location".to_string(),
        temperature_c: draw(rng, TEMPERATURE_RANGE).floor(),
        humidity_pct: draw(rng, HUMIDITY_RANGE).floor(),
        pressure_hpa: draw(rng, PRESSURE_RANGE).floor(),
        condition: "Clear".to_string(),
        description: "clear sky".to_string(),
        wind_speed_ms: round_to(draw(rng, WIND_RANGE), 1),
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::domain::{Nutrient, NutrientUnit, PriceDirection};

    fn within(value: f64, (low, high): (f64, f64)) -> bool {
        value >= low && value <= high
    }

    #[test]
    fn sample_quotes_keep_sign_and_range() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..500 {
            let quotes = sample_mandi_prices(&mut rng, "Wheat", "Punjab");
            assert_eq!(quotes.len(), 1);
            let quote = &quotes[0];
            assert_eq!(
                PriceDirection::of(quote.change),
                PriceDirection::of(quote.change_percent)
            );
            assert!(within(quote.price, (2000.0, 4000.0)));
            assert!(quote.min_price.unwrap_or(f64::NAN) <= quote.price);
            assert!(quote.max_price.unwrap_or(f64::NAN) >= quote.price);
            assert_eq!(quote.market, "Punjab Mandi");
        }
    }

    #[test]
    fn sample_soil_stays_agronomic() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..500 {
            let soil = sample_soil(&mut rng, "Ludhiana");
            assert!(within(soil.ph, PH_RANGE), "ph {}", soil.ph);
            assert!(soil.nitrogen.value >= 0.0);
            assert!(soil.phosphorus.value >= 0.0);
            assert!(soil.potassium.value >= 0.0);
            assert!(within(soil.organic_carbon, ORGANIC_CARBON_RANGE));
            assert_eq!(soil.recommendations.len(), 3);
        }
    }

    #[test]
    fn sample_soil_reads_in_kg_per_hectare() {
        let mut rng = StdRng::seed_from_u64(4);
        let soil = sample_soil(&mut rng, "Ludhiana");
        for nutrient in [Nutrient::Nitrogen, Nutrient::Phosphorus, Nutrient::Potassium] {
            assert_eq!(soil.level(nutrient).unit, NutrientUnit::KgPerHectare);
            assert!(soil.rating(nutrient).is_some(), "{nutrient:?} unrated");
        }
    }

    #[test]
    fn sample_trend_covers_six_months() {
        let mut rng = StdRng::seed_from_u64(5);
        let trend = sample_market_trend(&mut rng, "wheat", "6months");
        assert_eq!(trend.points.len(), 6);
        assert_eq!(trend.points[0].month, "Jan");
        assert!(trend
            .points
            .iter()
            .all(|point| within(point.price, TREND_PRICE_RANGE)));
    }

    #[test]
    fn sample_weather_within_ranges() {
        let mut rng = StdRng::seed_from_u64(9);
        let weather = sample_weather(&mut rng);
        assert!(within(weather.temperature_c, TEMPERATURE_RANGE));
        assert!(within(weather.humidity_pct, HUMIDITY_RANGE));
        assert!(within(weather.pressure_hpa, PRESSURE_RANGE));
        assert_eq!(weather.location, "Your Location");
    }
}

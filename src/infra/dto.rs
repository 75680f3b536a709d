//! Wire shapes of the upstream data sources and their domain conversions.

use std::time::SystemTime;

use serde::Deserialize;
use time::{format_description::FormatItem, macros::format_description, Date, OffsetDateTime};

use crate::domain::{
    Demand, MarketTrend, NutrientLevel, NutrientUnit, PriceQuote, SoilSample, TrendPoint,
    WeatherReport,
};

const ARRIVAL_DATE: &[FormatItem<'static>] = format_description!("[day]/[month]/[year]");
const ISO_DATE: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Agmarknet resource response from data.gov.in.
#[derive(Debug, Deserialize)]
pub(crate) struct MandiResponse {
    #[serde(default)]
    pub records: Vec<MandiRecordDto>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MandiRecordDto {
    pub commodity: String,
    #[serde(default)]
    pub market: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub min_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub max_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub modal_price: Option<f64>,
}

impl MandiRecordDto {
    /// Records without a modal price cannot be shown as a quote.
    pub fn into_quote(self, observed_at: SystemTime) -> Option<PriceQuote> {
        let price = self.modal_price?;
        let market = match (self.market, self.district.or(self.state)) {
            (Some(market), Some(area)) if !market.eq_ignore_ascii_case(&area) => {
                format!("{market} Mandi, {area}")
            }
            (Some(market), _) => format!("{market} Mandi"),
            (None, Some(area)) => format!("{area} Mandi"),
            (None, None) => "Unknown Mandi".to_string(),
        };
        Some(
            PriceQuote::unchanged(self.commodity, market, price, observed_at)
                .with_range(self.min_price, self.max_price),
        )
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SoilDto {
    #[serde(default)]
    pub district: Option<String>,
    #[serde(deserialize_with = "required_f64")]
    pub nitrogen: f64,
    #[serde(deserialize_with = "required_f64")]
    pub phosphorus: f64,
    #[serde(deserialize_with = "required_f64")]
    pub potassium: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub organic_carbon: Option<f64>,
    #[serde(deserialize_with = "required_f64")]
    pub ph: f64,
    #[serde(default)]
    pub unit: Option<NutrientUnit>,
    #[serde(default)]
    pub test_date: Option<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl SoilDto {
    pub fn into_sample(self, district: &str) -> SoilSample {
        let unit = self.unit.unwrap_or(NutrientUnit::KgPerHectare);
        let level = |value: f64| NutrientLevel { value, unit };
        SoilSample {
            district: self.district.unwrap_or_else(|| district.to_string()),
            nitrogen: level(self.nitrogen),
            phosphorus: level(self.phosphorus),
            potassium: level(self.potassium),
            organic_carbon: self.organic_carbon.unwrap_or(0.0),
            ph: self.ph,
            sample_date: parse_date(self.test_date.as_deref()),
            recommendations: self.recommendations,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct MarketTrendDto {
    #[serde(default)]
    pub crop: Option<String>,
    #[serde(default, alias = "timeRange")]
    pub time_range: Option<String>,
    #[serde(default)]
    pub data: Vec<TrendPointDto>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TrendPointDto {
    pub month: String,
    #[serde(deserialize_with = "required_f64")]
    pub price: f64,
    #[serde(default)]
    pub demand: Option<String>,
    #[serde(default)]
    pub forecast: Option<String>,
}

impl MarketTrendDto {
    pub fn into_trend(self, crop: &str, time_range: &str) -> MarketTrend {
        MarketTrend {
            crop: self.crop.unwrap_or_else(|| crop.to_string()),
            time_range: self.time_range.unwrap_or_else(|| time_range.to_string()),
            points: self
                .data
                .into_iter()
                .map(|point| TrendPoint {
                    month: point.month,
                    price: point.price,
                    demand: point
                        .demand
                        .as_deref()
                        .and_then(parse_demand)
                        .unwrap_or(Demand::Moderate),
                    forecast: point.forecast.unwrap_or_else(|| "Stable prices".to_string()),
                })
                .collect(),
        }
    }
}

fn parse_demand(raw: &str) -> Option<Demand> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "low" => Some(Demand::Low),
        "moderate" | "medium" => Some(Demand::Moderate),
        "high" => Some(Demand::High),
        "very high" | "veryhigh" => Some(Demand::VeryHigh),
        _ => None,
    }
}

/// OpenWeather current-conditions response (metric units).
#[derive(Debug, Deserialize)]
pub(crate) struct WeatherDto {
    pub main: WeatherMainDto,
    #[serde(default)]
    pub weather: Vec<WeatherConditionDto>,
    #[serde(default)]
    pub wind: Option<WindDto>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WeatherMainDto {
    pub temp: f64,
    pub humidity: f64,
    pub pressure: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WeatherConditionDto {
    pub main: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WindDto {
    #[serde(default)]
    pub speed: f64,
}

impl From<WeatherDto> for WeatherReport {
    fn from(dto: WeatherDto) -> Self {
        let condition = dto.weather.into_iter().next();
        Self {
            location: dto
                .name
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| "Your Location".to_string()),
            temperature_c: dto.main.temp,
            humidity_pct: dto.main.humidity,
            pressure_hpa: dto.main.pressure,
            condition: condition
                .as_ref()
                .map(|c| c.main.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            description: condition
                .and_then(|c| c.description)
                .unwrap_or_default(),
            wind_speed_ms: dto.wind.map(|wind| wind.speed).unwrap_or(0.0),
        }
    }
}

fn parse_date(raw: Option<&str>) -> Date {
    raw.and_then(|value| {
        let value = value.trim();
        Date::parse(value, ISO_DATE)
            .or_else(|_| Date::parse(value, ARRIVAL_DATE))
            .ok()
    })
    .unwrap_or_else(|| OffsetDateTime::now_utc().date())
}

/// Government feeds publish numbers as strings as often as numbers.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct StringOrNumber;

    impl<'de> serde::de::Visitor<'de> for StringOrNumber {
        type Value = Option<f64>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a number or numeric string")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            let trimmed = value.trim();
            if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("NR") {
                return Ok(None);
            }
            trimmed
                .replace(',', "")
                .parse::<f64>()
                .map(Some)
                .map_err(|_| E::invalid_value(serde::de::Unexpected::Str(value), &self))
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value as f64))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value as f64))
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(StringOrNumber)
}

fn required_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    lenient_f64(deserializer)?.ok_or_else(|| serde::de::Error::custom("missing numeric value"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::Nutrient;

    #[test]
    fn mandi_records_accept_string_prices() {
        let response: MandiResponse = serde_json::from_value(json!({
            "records": [{
                "state": "Punjab",
                "district": "Ludhiana",
                "market": "Khanna",
                "commodity": "Wheat",
                "arrival_date": "16/10/2026",
                "min_price": "2,300",
                "max_price": 2400,
                "modal_price": "2350"
            }, {
                "commodity": "Wheat",
                "market": "Jagraon",
                "modal_price": ""
            }]
        }))
        .expect("decode mandi response");

        let quotes: Vec<_> = response
            .records
            .into_iter()
            .filter_map(|record| record.into_quote(SystemTime::now()))
            .collect();
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].price, 2350.0);
        assert_eq!(quotes[0].min_price, Some(2300.0));
        assert_eq!(quotes[0].max_price, Some(2400.0));
        assert_eq!(quotes[0].market, "Khanna Mandi, Ludhiana");
        assert_eq!(quotes[0].change, 0.0);
    }

    #[test]
    fn soil_payload_maps_units_and_date() {
        let dto: SoilDto = serde_json::from_value(json!({
            "nitrogen": "245",
            "phosphorus": 18,
            "potassium": 280,
            "organic_carbon": 0.75,
            "ph": 7.2,
            "unit": "ppm",
            "test_date": "2026-03-14",
            "recommendations": ["Use DAP or SSP fertilizer"]
        }))
        .expect("decode soil payload");

        let sample = dto.into_sample("Ludhiana");
        assert_eq!(sample.district, "Ludhiana");
        assert_eq!(sample.nitrogen.value, 245.0);
        assert_eq!(sample.nitrogen.unit, NutrientUnit::Ppm);
        assert_eq!(sample.rating(Nutrient::Nitrogen), None);
        assert_eq!(sample.sample_date.year(), 2026);
        assert_eq!(u8::from(sample.sample_date.month()), 3);
    }

    #[test]
    fn soil_payload_without_ph_is_rejected() {
        let result = serde_json::from_value::<SoilDto>(json!({
            "nitrogen": 245,
            "phosphorus": 18,
            "potassium": 280
        }));
        assert!(result.is_err());
    }

    #[test]
    fn trend_payload_tolerates_unknown_demand() {
        let dto: MarketTrendDto = serde_json::from_value(json!({
            "timeRange": "6months",
            "data": [
                { "month": "Jan", "price": 2300, "demand": "Very High", "forecast": "Significant price rise" },
                { "month": "Feb", "price": "2450", "demand": "sideways" }
            ]
        }))
        .expect("decode trend payload");

        let trend = dto.into_trend("wheat", "1year");
        assert_eq!(trend.crop, "wheat");
        assert_eq!(trend.time_range, "6months");
        assert_eq!(trend.points[0].demand, Demand::VeryHigh);
        assert_eq!(trend.points[1].demand, Demand::Moderate);
        assert_eq!(trend.points[1].price, 2450.0);
    }

    #[test]
    fn openweather_payload_maps_to_report() {
        let dto: WeatherDto = serde_json::from_value(json!({
            "main": { "temp": 31.4, "humidity": 62, "pressure": 1008 },
            "weather": [{ "main": "Clouds", "description": "scattered clouds", "icon": "03d" }],
            "wind": { "speed": 3.6 },
            "name": "Chandigarh"
        }))
        .expect("decode weather payload");

        let report = WeatherReport::from(dto);
        assert_eq!(report.location, "Chandigarh");
        assert_eq!(report.condition, "Clouds");
        assert_eq!(report.description, "scattered clouds");
        assert_eq!(report.humidity_pct, 62.0);
        assert_eq!(report.wind_speed_ms, 3.6);
    }
}

#![allow(dead_code)]

//! Single access point for every external data category.
//!
//! - One async call per category; none of them fail outward.
//! - A missing credential or any upstream failure is answered with sample
//!   data, and the result is tagged so callers can tell the two apart.
//! - One attempt per call: no cache, no retry, no backoff.

use std::{
    fmt,
    sync::{Arc, Mutex, PoisonError},
    time::SystemTime,
};

use rand::{rngs::StdRng, SeedableRng};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::domain::{MarketTrend, PriceQuote, Season, SoilSample, WeatherReport};
use crate::infra::{
    advisory::{self, GenerateRequest, GenerateResponse},
    dto::{MandiResponse, MarketTrendDto, SoilDto, WeatherDto},
    fallback,
};
use crate::util::{
    config::{Endpoints, GatewayConfig},
    version::user_agent,
};

const MANDI_RECORD_LIMIT: &str = "100";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataCategory {
    MandiPrices,
    SoilHealth,
    MarketTrends,
    Weather,
    Advisory,
}

impl DataCategory {
    pub fn label(&self) -> &'static str {
        match self {
            DataCategory::MandiPrices => "mandi-prices",
            DataCategory::SoilHealth => "soil-health",
            DataCategory::MarketTrends => "market-trends",
            DataCategory::Weather => "weather",
            DataCategory::Advisory => "advisory",
        }
    }
}

impl fmt::Display for DataCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("no credential configured for {0}")]
    Unconfigured(DataCategory),
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("endpoint for {0} cannot take path segments")]
    InvalidEndpoint(DataCategory),
    #[error("http request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("response body could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{0} returned no usable data")]
    EmptyResponse(DataCategory),
}

impl GatewayError {
    pub fn fallback_reason(&self) -> FallbackReason {
        match self {
            GatewayError::Unconfigured(_) => FallbackReason::Unconfigured,
            _ => FallbackReason::Upstream,
        }
    }
}

/// Why a result carries sample data instead of live data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FallbackReason {
    /// No credential configured for the category; no request was made.
    Unconfigured,
    /// The request was made but failed, returned an error status, or
    /// returned a body that could not be used.
    Upstream,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataSource {
    Live,
    Fallback(FallbackReason),
}

impl DataSource {
    pub fn label(&self) -> &'static str {
        match self {
            DataSource::Live => "live",
            DataSource::Fallback(FallbackReason::Unconfigured) => "sample (not configured)",
            DataSource::Fallback(FallbackReason::Upstream) => "sample (source unavailable)",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GatewayResult<T> {
    pub data: T,
    pub fetched_at: SystemTime,
    pub source: DataSource,
}

impl<T> GatewayResult<T> {
    fn live(data: T) -> Self {
        Self {
            data,
            fetched_at: SystemTime::now(),
            source: DataSource::Live,
        }
    }

    fn fallback(data: T, reason: FallbackReason) -> Self {
        Self {
            data,
            fetched_at: SystemTime::now(),
            source: DataSource::Fallback(reason),
        }
    }

    pub fn is_live(&self) -> bool {
        self.source == DataSource::Live
    }

    pub fn is_fallback(&self) -> bool {
        !self.is_live()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> GatewayResult<U> {
        GatewayResult {
            data: f(self.data),
            fetched_at: self.fetched_at,
            source: self.source,
        }
    }
}

struct ResolvedEndpoints {
    mandi_prices: Url,
    soil_health: Url,
    market_trends: Url,
    weather: Url,
    advisory: Url,
}

impl ResolvedEndpoints {
    fn parse(endpoints: &Endpoints) -> Result<Self, url::ParseError> {
        Ok(Self {
            mandi_prices: Url::parse(&endpoints.mandi_prices)?,
            soil_health: Url::parse(&endpoints.soil_health)?,
            market_trends: Url::parse(&endpoints.market_trends)?,
            weather: Url::parse(&endpoints.weather)?,
            advisory: Url::parse(&endpoints.advisory)?,
        })
    }
}

#[derive(Clone)]
pub struct DataGateway {
    http: Client,
    config: Arc<GatewayConfig>,
    endpoints: Arc<ResolvedEndpoints>,
    rng: Arc<Mutex<StdRng>>,
}

impl DataGateway {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let endpoints = ResolvedEndpoints::parse(&config.endpoints)?;
        let http = Client::builder().user_agent(user_agent()).build()?;
        Ok(Self {
            http,
            config: Arc::new(config),
            endpoints: Arc::new(endpoints),
            rng: Arc::new(Mutex::new(StdRng::from_entropy())),
        })
    }

    /// Make sample data reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Arc::new(Mutex::new(StdRng::seed_from_u64(seed)));
        self
    }

    pub async fn fetch_mandi_prices(
        &self,
        commodity: &str,
        region: &str,
    ) -> GatewayResult<Vec<PriceQuote>> {
        let outcome = self.live_mandi_prices(commodity, region).await;
        self.settle(DataCategory::MandiPrices, outcome, |_, rng| {
            fallback::sample_mandi_prices(rng, commodity, region)
        })
    }

    pub async fn fetch_soil_health(&self, district: &str) -> GatewayResult<SoilSample> {
        let outcome = self.live_soil_health(district).await;
        self.settle(DataCategory::SoilHealth, outcome, |_, rng| {
            fallback::sample_soil(rng, district)
        })
    }

    pub async fn fetch_market_trends(
        &self,
        crop: &str,
        time_range: &str,
    ) -> GatewayResult<MarketTrend> {
        let outcome = self.live_market_trends(crop, time_range).await;
        self.settle(DataCategory::MarketTrends, outcome, |_, rng| {
            fallback::sample_market_trend(rng, crop, time_range)
        })
    }

    pub async fn fetch_weather(&self, latitude: f64, longitude: f64) -> GatewayResult<WeatherReport> {
        let outcome = self.live_weather(latitude, longitude).await;
        self.settle(DataCategory::Weather, outcome, |_, rng| {
            fallback::sample_weather(rng)
        })
    }

    /// Answer a farming question. Every call is independent; no conversation
    /// history is kept.
    pub async fn ask_advisor(&self, query: &str) -> GatewayResult<String> {
        let outcome = self.live_advice(query).await;
        self.settle(DataCategory::Advisory, outcome, |reason, _| match reason {
            FallbackReason::Unconfigured => advisory::capability_message(query),
            FallbackReason::Upstream => advisory::APOLOGY_MESSAGE.to_string(),
        })
    }

    async fn live_mandi_prices(
        &self,
        commodity: &str,
        region: &str,
    ) -> Result<Vec<PriceQuote>, GatewayError> {
        let category = DataCategory::MandiPrices;
        let key = self.credential(category)?;
        let mut url = self.endpoints.mandi_prices.clone();
        url.query_pairs_mut()
            .append_pair("api-key", key)
            .append_pair("format", "json")
            .append_pair("limit", MANDI_RECORD_LIMIT)
            .append_pair("filters[commodity]", commodity)
            .append_pair("filters[state]", region);

        let response: MandiResponse = self.fetch_json(category, self.http.get(url)).await?;
        let observed_at = SystemTime::now();
        let quotes: Vec<PriceQuote> = response
            .records
            .into_iter()
            .filter_map(|record| record.into_quote(observed_at))
            .collect();
        if quotes.is_empty() {
            return Err(GatewayError::EmptyResponse(category));
        }
        Ok(quotes)
    }

    async fn live_soil_health(&self, district: &str) -> Result<SoilSample, GatewayError> {
        let category = DataCategory::SoilHealth;
        let key = self.credential(category)?;
        let mut url = self.endpoints.soil_health.clone();
        url.path_segments_mut()
            .map_err(|_| GatewayError::InvalidEndpoint(category))?
            .pop_if_empty()
            .push(district);

        let dto: SoilDto = self
            .fetch_json(category, self.http.get(url).bearer_auth(key))
            .await?;
        Ok(dto.into_sample(district))
    }

    async fn live_market_trends(
        &self,
        crop: &str,
        time_range: &str,
    ) -> Result<MarketTrend, GatewayError> {
        let category = DataCategory::MarketTrends;
        let key = self.credential(category)?;
        let mut url = self.endpoints.market_trends.clone();
        url.query_pairs_mut()
            .append_pair("crop", crop)
            .append_pair("range", time_range)
            .append_pair("api-key", key);

        let dto: MarketTrendDto = self.fetch_json(category, self.http.get(url)).await?;
        let trend = dto.into_trend(crop, time_range);
        if trend.points.is_empty() {
            return Err(GatewayError::EmptyResponse(category));
        }
        Ok(trend)
    }

    async fn live_weather(&self, latitude: f64, longitude: f64) -> Result<WeatherReport, GatewayError> {
        let category = DataCategory::Weather;
        let key = self.credential(category)?;
        let mut url = self.endpoints.weather.clone();
        url.query_pairs_mut()
            .append_pair("lat", &latitude.to_string())
            .append_pair("lon", &longitude.to_string())
            .append_pair("appid", key)
            .append_pair("units", "metric");

        let dto: WeatherDto = self.fetch_json(category, self.http.get(url)).await?;
        Ok(WeatherReport::from(dto))
    }

    async fn live_advice(&self, query: &str) -> Result<String, GatewayError> {
        let category = DataCategory::Advisory;
        let key = self.credential(category)?;
        let mut url = self.endpoints.advisory.clone();
        url.query_pairs_mut().append_pair("key", key);

        let body = GenerateRequest::single_turn(advisory::advisory_prompt(query, Season::current()));
        let response: GenerateResponse = self
            .fetch_json(category, self.http.post(url).json(&body))
            .await?;
        response
            .into_text()
            .ok_or(GatewayError::EmptyResponse(category))
    }

    fn credential(&self, category: DataCategory) -> Result<&str, GatewayError> {
        let credentials = &self.config.credentials;
        let value = match category {
            DataCategory::MandiPrices => &credentials.agmarknet,
            DataCategory::SoilHealth => &credentials.soil_health,
            DataCategory::MarketTrends => &credentials.upag,
            DataCategory::Weather => &credentials.openweather,
            DataCategory::Advisory => &credentials.gemini,
        };
        value
            .as_deref()
            .ok_or(GatewayError::Unconfigured(category))
    }

    async fn fetch_json<T>(
        &self,
        category: DataCategory,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, GatewayError>
    where
        T: DeserializeOwned,
    {
        log::debug!("[{category}] requesting live data");
        let response = builder.send().await?.error_for_status()?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    fn settle<T>(
        &self,
        category: DataCategory,
        outcome: Result<T, GatewayError>,
        fallback: impl FnOnce(FallbackReason, &mut StdRng) -> T,
    ) -> GatewayResult<T> {
        match outcome {
            Ok(data) => {
                log::debug!("[{category}] served live data");
                GatewayResult::live(data)
            }
            Err(error) => {
                let reason = error.fallback_reason();
                match reason {
                    FallbackReason::Unconfigured => {
                        log::info!("[{category}] {error}; serving sample data")
                    }
                    FallbackReason::Upstream => {
                        log::warn!("[{category}] live fetch failed: {error}; serving sample data")
                    }
                }
                let data = {
                    let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
                    fallback(reason, &mut *rng)
                };
                GatewayResult::fallback(data, reason)
            }
        }
    }
}

use std::time::Duration;

use thiserror::Error;

use crate::{
    domain::{
        sample_fleet, Fleet, MarketTrend, Nutrient, PriceBoard, PriceDirection, PriceQuote,
        ShipmentKind, ShipmentUpdate, SoilSample, WeatherReport,
    },
    infra::{DataGateway, DataSource, GatewayError, GatewayResult},
    simulator::RefreshSimulator,
    util::config::{refresh_interval_from, GatewayConfig, DEFAULT_REFRESH_INTERVAL},
};

/// Default panel selections, matching what the dashboard opens with.
const DEFAULT_COMMODITY: &str = "Wheat";
const DEFAULT_REGION: &str = "Punjab";
const DEFAULT_DISTRICT: &str = "Ludhiana";
const DEFAULT_CROP: &str = "wheat";
const DEFAULT_TIME_RANGE: &str = "6months";
/// Chandigarh, used until the farmer shares a location.
const DEFAULT_LOCATION: (f64, f64) = (30.7333, 76.7794);

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to initialise data gateway: {0}")]
    Gateway(#[from] GatewayError),
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub gateway: GatewayConfig,
    pub refresh_interval: Duration,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let refresh_interval = match refresh_interval_from(|var| std::env::var(var).ok()) {
            Ok(Some(interval)) => interval,
            Ok(None) => DEFAULT_REFRESH_INTERVAL,
            Err(err) => {
                log::warn!("{err}; using {DEFAULT_REFRESH_INTERVAL:?}");
                DEFAULT_REFRESH_INTERVAL
            }
        };
        Self {
            gateway: GatewayConfig::from_env(),
            refresh_interval,
        }
    }
}

pub struct Dashboard {
    gateway: DataGateway,
    prices: PriceBoard,
    fleet: Fleet,
    refresh_interval: Duration,
}

impl Dashboard {
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        let configured = config.gateway.credentials.configured_count();
        log::info!("{configured} of 5 data sources configured");
        Ok(Self {
            gateway: DataGateway::new(config.gateway)?,
            prices: PriceBoard::default(),
            fleet: sample_fleet(),
            refresh_interval: config.refresh_interval,
        })
    }

    /// Load every panel once. Categories are fetched concurrently.
    pub async fn load_panels(&mut self) {
        let (prices, soil, trend, weather) = tokio::join!(
            self.gateway
                .fetch_mandi_prices(DEFAULT_COMMODITY, DEFAULT_REGION),
            self.gateway.fetch_soil_health(DEFAULT_DISTRICT),
            self.gateway
                .fetch_market_trends(DEFAULT_CROP, DEFAULT_TIME_RANGE),
            self.gateway
                .fetch_weather(DEFAULT_LOCATION.0, DEFAULT_LOCATION.1),
        );

        self.apply_prices(prices);
        render_prices(&self.prices);
        render_soil(&soil);
        render_trend(&trend);
        render_weather(&weather);
    }

    /// The refresh button on the price panel: live quotes replace the board
    /// entries, otherwise the sample board moves on its own.
    pub async fn refresh_prices(&mut self) {
        let result = self
            .gateway
            .fetch_mandi_prices(DEFAULT_COMMODITY, DEFAULT_REGION)
            .await;
        self.apply_prices(result);
        render_prices(&self.prices);
    }

    pub async fn ask(&self, query: &str) {
        let answer = self.gateway.ask_advisor(query).await;
        warn_if_sample("advisory", &answer.source);
        println!("\n== Advisor [{}]\n{}", answer.source.label(), answer.data);
    }

    /// Follow in-transit shipments until all are delivered or the user
    /// interrupts.
    pub async fn track_shipments(&mut self) {
        render_fleet(&self.fleet);
        if !self.fleet.has_moving() {
            println!("No shipments in transit.");
            return;
        }

        let simulator = RefreshSimulator::new(self.refresh_interval);
        log::info!(
            "Tracking {} shipment(s) every {:?}",
            self.fleet.in_transit().count(),
            simulator.interval()
        );
        let (handle, mut updates) = simulator.spawn(self.fleet.clone());

        loop {
            tokio::select! {
                update = updates.recv() => {
                    let Some(update) = update else { break };
                    self.apply_update(&update);
                    if !self.fleet.has_moving() {
                        println!("All shipments delivered.");
                        break;
                    }
                }
                signal = tokio::signal::ctrl_c() => {
                    if let Err(err) = signal {
                        log::warn!("Failed to listen for Ctrl-C: {err}");
                    }
                    println!("Stopping tracking.");
                    break;
                }
            }
        }

        handle.stop().await;
    }

    fn apply_prices(&mut self, result: GatewayResult<Vec<PriceQuote>>) {
        warn_if_sample("mandi prices", &result.source);
        match result.source {
            DataSource::Live => {
                for quote in result.data {
                    self.prices.upsert(quote);
                }
            }
            DataSource::Fallback(_) => {
                let mut rng = rand::thread_rng();
                self.prices.refresh(&mut rng);
            }
        }
    }

    fn apply_update(&mut self, update: &ShipmentUpdate) {
        if !self.fleet.apply(update) {
            log::debug!("Ignored update for {}", update.id);
            return;
        }
        if let Some(shipment) = self.fleet.get(&update.id) {
            println!(
                "{} {} -> {:.0}% {}",
                shipment.tracking_code,
                shipment.item,
                shipment.progress,
                shipment.status.label()
            );
        }
    }
}

pub async fn run(config: AppConfig, query: Option<String>) -> Result<(), AppError> {
    let mut dashboard = Dashboard::new(config)?;
    dashboard.load_panels().await;
    if let Some(query) = query {
        dashboard.ask(&query).await;
    }
    dashboard.refresh_prices().await;
    dashboard.track_shipments().await;
    Ok(())
}

fn warn_if_sample(panel: &str, source: &DataSource) {
    if let DataSource::Fallback(reason) = source {
        log::warn!("Showing sample {panel} ({reason:?}); values are illustrative only.");
    }
}

fn render_prices(board: &PriceBoard) {
    println!("\n== Mandi prices");
    for quote in board.quotes() {
        let arrow = match quote.direction() {
            PriceDirection::Up => "+",
            PriceDirection::Down => "-",
            PriceDirection::Flat => " ",
        };
        println!(
            "{:<16} INR {:>7.0}/{} {arrow}{:>5.0} ({:+.1}%)  {}",
            quote.commodity,
            quote.price,
            quote.unit,
            quote.change.abs(),
            quote.change_percent,
            quote.market
        );
    }
}

fn render_soil(result: &GatewayResult<SoilSample>) {
    warn_if_sample("soil health", &result.source);
    let soil = &result.data;
    println!(
        "\n== Soil health: {} ({}) [{}]",
        soil.district,
        soil.sample_date,
        result.source.label()
    );
    for nutrient in [Nutrient::Nitrogen, Nutrient::Phosphorus, Nutrient::Potassium] {
        let level = soil.level(nutrient);
        let rating = soil
            .rating(nutrient)
            .map(|status| status.label())
            .unwrap_or("unrated");
        println!(
            "{:<16} {:>6.0} {:<6} {rating}",
            nutrient.name(),
            level.value,
            level.unit.label()
        );
    }
    println!(
        "{:<16} {:>6.2} %      {}",
        "Organic Carbon",
        soil.organic_carbon,
        soil.organic_carbon_status().label()
    );
    println!("{:<16} {:>6.1}", "pH", soil.ph);
    for tip in &soil.recommendations {
        println!("  - {tip}");
    }
}

fn render_trend(result: &GatewayResult<MarketTrend>) {
    warn_if_sample("market trends", &result.source);
    let trend = &result.data;
    println!(
        "\n== Market trend: {} over {} [{}]",
        trend.crop,
        trend.time_range,
        result.source.label()
    );
    for point in &trend.points {
        println!(
            "{:<4} INR {:>6.0}  demand {:<9} {}",
            point.month,
            point.price,
            point.demand.label(),
            point.forecast
        );
    }
    if let Some(average) = trend.average_price() {
        println!("Average INR {average:.0}");
    }
}

fn render_weather(result: &GatewayResult<WeatherReport>) {
    warn_if_sample("weather", &result.source);
    let weather = &result.data;
    println!(
        "\n== Weather: {} [{}]\n{:.0}°C, {} ({}), humidity {:.0}%, pressure {:.0} hPa, wind {:.1} m/s",
        weather.location,
        result.source.label(),
        weather.temperature_c,
        weather.condition,
        weather.description,
        weather.humidity_pct,
        weather.pressure_hpa,
        weather.wind_speed_ms
    );
}

fn render_fleet(fleet: &Fleet) {
    println!("\n== Shipments");
    for shipment in fleet.shipments() {
        let kind = match shipment.kind {
            ShipmentKind::Delivery => "delivery",
            ShipmentKind::Pickup => "pickup",
        };
        println!(
            "{} {:<8} {:<18} {:<12} {} -> {}  {:.0}% {}  ETA {}  driver {} ({})",
            shipment.tracking_code,
            kind,
            shipment.item,
            shipment.quantity,
            shipment.origin,
            shipment.destination,
            shipment.progress,
            shipment.status.label(),
            shipment.estimated_time,
            shipment.driver,
            shipment.phone
        );
    }
}

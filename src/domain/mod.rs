//! Agricultural data and logistics types shown on the dashboard.

pub mod entities;
pub mod price_board;
pub mod season;
pub mod shipment;

#[allow(unused_imports)]
pub use entities::{
    change_against, Demand, MarketTrend, Nutrient, NutrientLevel, NutrientStatus, NutrientUnit,
    PriceDirection, PriceQuote, SoilSample, TrendPoint, WeatherReport, QUINTAL,
};
pub use price_board::PriceBoard;
pub use season::Season;
#[allow(unused_imports)]
pub use shipment::{
    advance, sample_fleet, Fleet, Shipment, ShipmentKind, ShipmentStatus, ShipmentUpdate,
};

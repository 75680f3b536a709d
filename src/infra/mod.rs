//! Upstream data sources and the sample data that stands in for them.

pub mod advisory;
mod dto;
pub mod fallback;
pub mod gateway;

#[allow(unused_imports)]
pub use gateway::{DataCategory, DataGateway, DataSource, FallbackReason, GatewayError, GatewayResult};

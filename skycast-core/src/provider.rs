use crate::{CurrentConditions, FetchError, ForecastDay};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// A source of current conditions and daily forecasts, looked up by city name.
///
/// Implementations perform exactly one request per call and never retry.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_current(&self, city: &str) -> Result<CurrentConditions, FetchError>;

    /// Up to five daily entries in ascending time order.
    async fn fetch_forecast(&self, city: &str) -> Result<Vec<ForecastDay>, FetchError>;
}


//! Core library for the `skycast` weather lookup.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather provider and its error classification
//! - Daily reduction of the 3-hour forecast
//! - The search session state machine that a view layer drives
//!
//! It is used by `skycast-cli`, but can also be reused by other front ends.

pub mod config;
pub mod error;
pub mod forecast;
pub mod model;
pub mod provider;
pub mod session;
pub mod units;

pub use config::{Config, ProviderConfig};
pub use error::FetchError;
pub use model::{Condition, CurrentConditions, ErrorInfo, ErrorKind, ForecastDay};
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider};
pub use session::{Action, Effect, Phase, Session, SessionState};
pub use units::TemperatureUnit;

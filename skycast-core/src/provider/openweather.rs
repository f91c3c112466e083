use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::{
    CurrentConditions, FetchError, ForecastDay,
    config::{Config, ProviderConfig},
    forecast::stride_daily,
    model::Condition,
};

use super::WeatherProvider;

const UNITS: &str = "metric";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    icon_url_template: String,
    http: Client,
}

impl OpenWeatherProvider {
    /// Provider against the public OpenWeather endpoints.
    pub fn new(api_key: String) -> Self {
        Self::with_endpoints(api_key, &ProviderConfig::default())
    }

    pub fn with_endpoints(api_key: String, endpoints: &ProviderConfig) -> Self {
        Self {
            api_key,
            base_url: endpoints.base_url.trim_end_matches('/').to_string(),
            icon_url_template: endpoints.icon_url_template.clone(),
            http: Client::new(),
        }
    }

    /// A missing key is passed through as empty; the provider then answers
    /// 401, which surfaces as [`FetchError::Auth`].
    pub fn from_config(config: &Config) -> Self {
        let api_key = config.api_key().unwrap_or_default().to_string();
        Self::with_endpoints(api_key, &config.provider)
    }

    pub fn icon_url(&self, code: &str) -> String {
        self.icon_url_template.replace("{icon}", code)
    }

    /// Sends one GET to `endpoint` and returns the body of a 2xx response.
    async fn get(&self, endpoint: &str, city: &str) -> Result<String, FetchError> {
        let url = format!("{}/{endpoint}", self.base_url);
        debug!(url = %url, city, "Requesting OpenWeather");

        let res = self
            .http
            .get(&url)
            .query(&[("q", city), ("appid", self.api_key.as_str()), ("units", UNITS)])
            .send()
            .await
            .map_err(classify_send_error)?;

        // A response arrived, so the status decides the error class. The body of
        // a failed response is only read for logging.
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            debug!(%status, body = %truncate_body(&body), "OpenWeather request failed");
            return Err(classify_status(status, city));
        }

        res.text().await.map_err(|e| FetchError::Network(e.without_url().to_string()))
    }

    fn condition(&self, weather: &[OwWeather]) -> Result<Condition, FetchError> {
        let first = weather
            .first()
            .ok_or_else(|| FetchError::Malformed("response contained no weather entry".into()))?;

        Ok(Condition {
            description: first.description.clone(),
            icon_url: self.icon_url(&first.icon),
        })
    }

    fn forecast_day(&self, entry: &OwForecastEntry) -> Result<ForecastDay, FetchError> {
        Ok(ForecastDay {
            epoch_seconds: entry.dt,
            condition: self.condition(&entry.weather)?,
            temperature_min_c: entry.main.temp_min,
            temperature_max_c: entry.main.temp_max,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    sys: OwSys,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp_min: f64,
    temp_max: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwForecastMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    #[instrument(skip(self))]
    async fn fetch_current(&self, city: &str) -> Result<CurrentConditions, FetchError> {
        let body = self.get("weather", city).await?;

        let parsed: OwCurrentResponse =
            serde_json::from_str(&body).map_err(|e| FetchError::Malformed(e.to_string()))?;

        Ok(CurrentConditions {
            condition: self.condition(&parsed.weather)?,
            city: parsed.name,
            country: parsed.sys.country,
            temperature_c: parsed.main.temp,
            humidity_pct: parsed.main.humidity,
            wind_speed_mps: parsed.wind.speed,
        })
    }

    #[instrument(skip(self))]
    async fn fetch_forecast(&self, city: &str) -> Result<Vec<ForecastDay>, FetchError> {
        let body = self.get("forecast", city).await?;

        let parsed: OwForecastResponse =
            serde_json::from_str(&body).map_err(|e| FetchError::Malformed(e.to_string()))?;

        let days = stride_daily(&parsed.list)
            .map(|entry| self.forecast_day(entry))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(samples = parsed.list.len(), days = days.len(), "Reduced forecast");
        Ok(days)
    }
}

fn classify_status(status: StatusCode, city: &str) -> FetchError {
    match status {
        StatusCode::NOT_FOUND => FetchError::NotFound { city: city.to_string() },
        StatusCode::UNAUTHORIZED => FetchError::Auth,
        other => FetchError::Provider { status: other.as_u16() },
    }
}

/// Builder errors never left the process; everything else happened on the wire.
/// The URL is dropped from the message since it carries the API key.
fn classify_send_error(err: reqwest::Error) -> FetchError {
    let is_builder = err.is_builder();
    let msg = err.without_url().to_string();

    if is_builder { FetchError::RequestSetup(msg) } else { FetchError::Network(msg) }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

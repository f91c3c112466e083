use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Weather condition as shown to the user: a short description and the
/// URL of the provider's glyph for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub description: String,
    pub icon_url: String,
}

/// Current conditions for one city, normalized from the provider response.
///
/// Temperatures are always stored in Celsius; unit conversion happens at
/// display time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub city: String,
    /// Two-letter country code as reported by the provider.
    pub country: String,
    pub condition: Condition,
    pub temperature_c: f64,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
}

/// One entry of the reduced daily forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub epoch_seconds: i64,
    pub condition: Condition,
    pub temperature_min_c: f64,
    pub temperature_max_c: f64,
}

impl ForecastDay {
    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.epoch_seconds, 0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Auth,
    Provider,
    Network,
    RequestSetup,
    Malformed,
}

/// User-facing description of the last failed lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forecast_day_time_from_epoch() {
        let day = ForecastDay {
            epoch_seconds: 1_700_000_000,
            condition: Condition {
                description: "light rain".into(),
                icon_url: "https://example.test/10d.png".into(),
            },
            temperature_min_c: 4.0,
            temperature_max_c: 9.5,
        };

        let time = day.time().expect("valid timestamp");
        assert_eq!(time.timestamp(), 1_700_000_000);
    }

    #[test]
    fn error_info_omits_missing_suggestion() {
        let info = ErrorInfo {
            kind: ErrorKind::Auth,
            message: "API key error".into(),
            suggestion: None,
        };

        let json = serde_json::to_value(&info).expect("serializes");
        assert_eq!(json["kind"], "auth");
        assert!(json.get("suggestion").is_none());
    }
}

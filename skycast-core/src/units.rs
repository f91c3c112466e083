use serde::{Deserialize, Serialize};

/// Display unit for temperatures. Values are stored in Celsius and only
/// converted when shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn toggle(self) -> Self {
        match self {
            TemperatureUnit::Celsius => TemperatureUnit::Fahrenheit,
            TemperatureUnit::Fahrenheit => TemperatureUnit::Celsius,
        }
    }

    pub fn is_celsius(self) -> bool {
        self == TemperatureUnit::Celsius
    }

    pub fn symbol(self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }

    /// Rounded display value of a Celsius temperature in this unit.
    pub fn display(self, celsius: f64) -> i64 {
        match self {
            TemperatureUnit::Celsius => round_half_up(celsius),
            TemperatureUnit::Fahrenheit => celsius_to_fahrenheit(celsius),
        }
    }
}

/// `round(C * 9/5 + 32)`
pub fn celsius_to_fahrenheit(celsius: f64) -> i64 {
    round_half_up(celsius * 9.0 / 5.0 + 32.0)
}

/// `round((F - 32) * 5/9)`
pub fn fahrenheit_to_celsius(fahrenheit: f64) -> i64 {
    round_half_up((fahrenheit - 32.0) * 5.0 / 9.0)
}

/// Halves round toward positive infinity, so -1.5 becomes -1 and 2.5 becomes 3.
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

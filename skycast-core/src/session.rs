//! Search session: the state behind the view.
//!
//! [`SessionState::apply`] is a pure reducer. It mutates state in response to
//! an [`Action`] and returns the [`Effect`]s (network lookups) the caller must
//! perform. [`Session`] is the driver that performs them against a
//! [`WeatherProvider`] and feeds the results back in as `*Settled` actions.
//!
//! Current-conditions failures surface as [`SessionState::error`]. Forecast
//! failures are only logged and leave the forecast empty.

use std::collections::VecDeque;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    CurrentConditions, ErrorInfo, FetchError, ForecastDay, TemperatureUnit, WeatherProvider,
    forecast::MAX_DAYS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Loading,
    Success,
    Failed,
}

/// User intents and fetch completions.
#[derive(Debug, Clone)]
pub enum Action {
    /// Implicit lookup of the default city when the session opens.
    Startup,
    QueryChanged(String),
    Submit,
    Retry,
    ToggleUnit,
    CurrentSettled {
        /// City as it was requested, used in error messages.
        requested: String,
        result: Result<CurrentConditions, FetchError>,
    },
    ForecastSettled {
        city: String,
        result: Result<Vec<ForecastDay>, FetchError>,
    },
}

/// Lookups requested by the reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchCurrent { city: String },
    FetchForecast { city: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionState {
    active_city: String,
    pending_query: String,
    is_loading: bool,
    unit: TemperatureUnit,
    current: Option<CurrentConditions>,
    error: Option<ErrorInfo>,
    forecast: Vec<ForecastDay>,
    forecast_loading: bool,
}

impl SessionState {
    /// Idle state; dispatch [`Action::Startup`] to look up `default_city`.
    pub fn new(default_city: impl Into<String>) -> Self {
        Self {
            active_city: default_city.into(),
            pending_query: String::new(),
            is_loading: false,
            unit: TemperatureUnit::default(),
            current: None,
            error: None,
            forecast: Vec::new(),
            forecast_loading: false,
        }
    }

    pub fn active_city(&self) -> &str {
        &self.active_city
    }

    pub fn pending_query(&self) -> &str {
        &self.pending_query
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn unit(&self) -> TemperatureUnit {
        self.unit
    }

    pub fn current(&self) -> Option<&CurrentConditions> {
        self.current.as_ref()
    }

    pub fn error(&self) -> Option<&ErrorInfo> {
        self.error.as_ref()
    }

    pub fn forecast(&self) -> &[ForecastDay] {
        &self.forecast
    }

    pub fn forecast_loading(&self) -> bool {
        self.forecast_loading
    }

    pub fn phase(&self) -> Phase {
        if self.is_loading {
            Phase::Loading
        } else if self.error.is_some() {
            Phase::Failed
        } else if self.current.is_some() {
            Phase::Success
        } else {
            Phase::Idle
        }
    }

    pub fn apply(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::Startup | Action::Retry => self.begin_fetch(self.active_city.clone()),
            Action::QueryChanged(query) => {
                self.pending_query = query;
                Vec::new()
            }
            Action::Submit => {
                let query = self.pending_query.trim();
                if query.is_empty() {
                    return Vec::new();
                }

                let query = query.to_string();
                self.pending_query.clear();
                self.active_city = query.clone();
                self.begin_fetch(query)
            }
            Action::ToggleUnit => {
                self.unit = self.unit.toggle();
                debug!(unit = ?self.unit, "Toggled temperature unit");
                Vec::new()
            }
            Action::CurrentSettled { requested, result } => self.settle_current(&requested, result),
            Action::ForecastSettled { city, result } => {
                self.settle_forecast(&city, result);
                Vec::new()
            }
        }
    }

    fn begin_fetch(&mut self, city: String) -> Vec<Effect> {
        info!(city = %city, "Looking up current conditions");
        self.is_loading = true;
        self.error = None;
        vec![Effect::FetchCurrent { city }]
    }

    fn settle_current(
        &mut self,
        requested: &str,
        result: Result<CurrentConditions, FetchError>,
    ) -> Vec<Effect> {
        self.is_loading = false;

        match result {
            Ok(conditions) => {
                // The forecast follows the displayed city, as named by the provider.
                let city_changed =
                    self.current.as_ref().is_none_or(|shown| shown.city != conditions.city);
                let city = conditions.city.clone();

                self.current = Some(conditions);
                self.error = None;

                if city_changed {
                    self.forecast.clear();
                    self.forecast_loading = true;
                    vec![Effect::FetchForecast { city }]
                } else {
                    Vec::new()
                }
            }
            Err(err) => {
                warn!(city = requested, error = %err, "Current conditions lookup failed");
                self.error = Some(err.to_error_info(requested));
                self.current = None;
                self.forecast.clear();
                self.forecast_loading = false;
                Vec::new()
            }
        }
    }

    fn settle_forecast(&mut self, city: &str, result: Result<Vec<ForecastDay>, FetchError>) {
        if self.current.is_none() {
            debug!(city, "Dropping forecast for a view that is no longer shown");
            return;
        }

        self.forecast_loading = false;

        match result {
            Ok(mut days) => {
                days.truncate(MAX_DAYS);
                self.forecast = days;
            }
            Err(err) => {
                warn!(city, error = %err, "Forecast lookup failed; showing no forecast");
                self.forecast.clear();
            }
        }
    }
}

/// Runs a [`SessionState`] against a provider.
///
/// Each dispatch runs all resulting lookups to completion before returning,
/// so results are applied in the order they settle.
#[derive(Debug)]
pub struct Session<P> {
    provider: P,
    state: SessionState,
}

impl<P: WeatherProvider> Session<P> {
    pub fn new(provider: P, default_city: impl Into<String>) -> Self {
        Self { provider, state: SessionState::new(default_city) }
    }

    /// Opens a session and looks up `default_city`.
    pub async fn start(provider: P, default_city: impl Into<String>) -> Self {
        let mut session = Self::new(provider, default_city);
        session.dispatch(Action::Startup).await;
        session
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub async fn dispatch(&mut self, action: Action) {
        let mut pending: VecDeque<Effect> = self.state.apply(action).into();

        while let Some(effect) = pending.pop_front() {
            let settled = self.perform(effect).await;
            pending.extend(self.state.apply(settled));
        }
    }

    /// Sets the query and submits it.
    pub async fn search(&mut self, query: impl Into<String>) {
        self.dispatch(Action::QueryChanged(query.into())).await;
        self.dispatch(Action::Submit).await;
    }

    async fn perform(&self, effect: Effect) -> Action {
        match effect {
            Effect::FetchCurrent { city } => {
                let result = self.provider.fetch_current(&city).await;
                Action::CurrentSettled { requested: city, result }
            }
            Effect::FetchForecast { city } => {
                let result = self.provider.fetch_forecast(&city).await;
                Action::ForecastSettled { city, result }
            }
        }
    }
}

use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone};
use skycast_core::{CurrentConditions, ErrorInfo, ForecastDay, SessionState, TemperatureUnit};

/// Renders the session as text, using the local clock and timezone.
pub fn render(state: &SessionState) -> String {
    render_at(state, &Local::now())
}

/// Renders the session as text. `now` supplies the header date and the
/// timezone in which forecast weekdays are named.
pub fn render_at<Tz>(state: &SessionState, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut lines = Vec::new();

    if let Some(error) = state.error() {
        error_lines(&mut lines, error);
    } else if let Some(current) = state.current() {
        current_lines(&mut lines, current, state.unit(), now);
        lines.push(String::new());
        forecast_lines(&mut lines, state, now);
    } else if state.is_loading() {
        lines.push("Loading weather data...".to_string());
    }

    lines.join("\n")
}

fn error_lines(lines: &mut Vec<String>, error: &ErrorInfo) {
    lines.push(format!("! {}", error.message));
    if let Some(suggestion) = &error.suggestion {
        lines.push(format!("  {suggestion}"));
    }
    lines.push("  Type /retry to try again.".to_string());
}

fn current_lines<Tz>(
    lines: &mut Vec<String>,
    current: &CurrentConditions,
    unit: TemperatureUnit,
    now: &DateTime<Tz>,
) where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    lines.push(format!("{}, {}", current.city, current.country));
    lines.push(now.format("%A, %B %-d, %Y").to_string());
    lines.push(String::new());
    lines.push(format!(
        "  {}{}  {}",
        unit.display(current.temperature_c),
        unit.symbol(),
        current.condition.description
    ));
    lines.push(format!("  Icon: {}", current.condition.icon_url));
    lines.push(format!("  Wind speed: {} m/s", current.wind_speed_mps));
    lines.push(format!("  Humidity: {}%", current.humidity_pct));
}

fn forecast_lines<Tz>(lines: &mut Vec<String>, state: &SessionState, now: &DateTime<Tz>)
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    lines.push("5-Day Forecast".to_string());

    if state.forecast_loading() {
        lines.push("  Loading forecast data...".to_string());
        return;
    }

    let tz = now.timezone();
    for day in state.forecast() {
        lines.push(forecast_line(day, state.unit(), &tz));
    }
}

fn forecast_line<Tz>(day: &ForecastDay, unit: TemperatureUnit, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let weekday = day
        .time()
        .map(|t| t.with_timezone(tz).format("%a").to_string())
        .unwrap_or_else(|| "???".to_string());

    format!(
        "  {weekday}  {:<20} {}° / {}°",
        day.condition.description,
        unit.display(day.temperature_min_c),
        unit.display(day.temperature_max_c)
    )
}

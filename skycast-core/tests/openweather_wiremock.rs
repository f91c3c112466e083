//! OpenWeather provider behavior against a mock HTTP server.

use skycast_core::{
    ErrorKind, FetchError, OpenWeatherProvider, Phase, ProviderConfig, Session, WeatherProvider,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

const API_KEY: &str = "test-key";

fn london_current() -> serde_json::Value {
    serde_json::json!({
        "coord": { "lon": -0.1257, "lat": 51.5085 },
        "weather": [
            { "id": 800, "main": "Clear", "description": "clear sky", "icon": "01d" }
        ],
        "base": "stations",
        "main": {
            "temp": 15.5,
            "feels_like": 14.8,
            "temp_min": 14.0,
            "temp_max": 17.0,
            "pressure": 1016,
            "humidity": 60
        },
        "visibility": 10000,
        "wind": { "speed": 3.2, "deg": 240 },
        "clouds": { "all": 0 },
        "dt": 1_700_000_000,
        "sys": { "country": "GB", "sunrise": 1_699_990_000, "sunset": 1_700_020_000 },
        "timezone": 0,
        "id": 2_643_743,
        "name": "London",
        "cod": 200
    })
}

/// `n` samples at 3-hour spacing; sample `i` has min `i` and max `i + 0.5`.
fn forecast_list(n: usize) -> serde_json::Value {
    let list: Vec<serde_json::Value> = (0..n)
        .map(|i| {
            serde_json::json!({
                "dt": 1_700_000_000 + (i as i64) * 10_800,
                "main": {
                    "temp": i as f64,
                    "temp_min": i as f64,
                    "temp_max": i as f64 + 0.5,
                    "humidity": 70
                },
                "weather": [
                    { "id": 500, "main": "Rain", "description": "light rain", "icon": "10d" }
                ],
                "wind": { "speed": 4.1, "deg": 200 },
                "dt_txt": "2023-11-14 22:00:00"
            })
        })
        .collect();

    serde_json::json!({
        "cod": "200",
        "message": 0,
        "cnt": n,
        "list": list,
        "city": { "id": 2_643_743, "name": "London", "country": "GB" }
    })
}

fn not_found_body() -> serde_json::Value {
    serde_json::json!({ "cod": "404", "message": "city not found" })
}

fn create_test_provider(mock_server: &MockServer) -> OpenWeatherProvider {
    let endpoints = ProviderConfig { base_url: mock_server.uri(), ..ProviderConfig::default() };
    OpenWeatherProvider::with_endpoints(API_KEY.to_string(), &endpoints)
}

async fn setup_mock(mock_server: &MockServer, endpoint: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(endpoint))
        .respond_with(response)
        .mount(mock_server)
        .await;
}

// ============================================================================
// Current conditions
// ============================================================================

#[tokio::test]
async fn current_conditions_are_normalized() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "London"))
        .and(query_param("appid", API_KEY))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(london_current()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = create_test_provider(&mock_server);
    let result = provider.fetch_current("London").await;

    assert!(result.is_ok(), "Expected success, got: {result:?}");

    let current = result.unwrap();
    assert_eq!(current.city, "London");
    assert_eq!(current.country, "GB");
    assert_eq!(current.condition.description, "clear sky");
    assert_eq!(current.condition.icon_url, "https://openweathermap.org/img/wn/01d@2x.png");
    assert!((current.temperature_c - 15.5).abs() < f64::EPSILON);
    assert_eq!(current.humidity_pct, 60);
    assert!((current.wind_speed_mps - 3.2).abs() < f64::EPSILON);
}

#[tokio::test]
async fn repeated_lookups_are_not_cached() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(london_current()))
        .expect(2)
        .mount(&mock_server)
        .await;

    let provider = create_test_provider(&mock_server);
    assert!(provider.fetch_current("London").await.is_ok());
    assert!(provider.fetch_current("London").await.is_ok());
}

#[tokio::test]
async fn not_found_is_classified() {
    let mock_server = MockServer::start().await;
    let response = ResponseTemplate::new(404).set_body_json(not_found_body());
    setup_mock(&mock_server, "/weather", response).await;

    let provider = create_test_provider(&mock_server);
    let result = provider.fetch_current("Xyzzyplace").await;

    assert_eq!(result, Err(FetchError::NotFound { city: "Xyzzyplace".into() }));
}

#[tokio::test]
async fn unauthorized_is_auth_error_for_any_city() {
    let mock_server = MockServer::start().await;
    setup_mock(
        &mock_server,
        "/weather",
        ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "cod": 401,
            "message": "Invalid API key. Please see https://openweathermap.org/faq#error401."
        })),
    )
    .await;

    let provider = create_test_provider(&mock_server);

    for city in ["London", "Xyzzyplace", ""] {
        let result = provider.fetch_current(city).await;
        assert_eq!(result, Err(FetchError::Auth), "city {city:?}");
    }
}

#[tokio::test]
async fn other_statuses_are_provider_errors() {
    let mock_server = MockServer::start().await;
    let response = ResponseTemplate::new(503).set_body_string("Unavailable");
    setup_mock(&mock_server, "/weather", response).await;

    let provider = create_test_provider(&mock_server);
    let result = provider.fetch_current("London").await;

    assert!(
        matches!(result, Err(FetchError::Provider { status: 503 })),
        "Expected Provider error, got: {result:?}"
    );
}

#[tokio::test]
async fn malformed_body_is_classified() {
    let mock_server = MockServer::start().await;
    let response = ResponseTemplate::new(200).set_body_string("not json");
    setup_mock(&mock_server, "/weather", response).await;

    let provider = create_test_provider(&mock_server);
    let result = provider.fetch_current("London").await;

    assert!(matches!(result, Err(FetchError::Malformed(_))), "got: {result:?}");
}

#[tokio::test]
async fn empty_weather_array_is_malformed() {
    let mock_server = MockServer::start().await;
    let mut body = london_current();
    body["weather"] = serde_json::json!([]);
    let response = ResponseTemplate::new(200).set_body_json(body);
    setup_mock(&mock_server, "/weather", response).await;

    let provider = create_test_provider(&mock_server);
    let result = provider.fetch_current("London").await;

    assert!(matches!(result, Err(FetchError::Malformed(_))), "got: {result:?}");
}

#[tokio::test]
async fn connection_refused_is_network_error() {
    // Reserve a port, then free it so nothing is listening there.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("addr").port();
    drop(listener);

    let provider = provider_at(format!("http://127.0.0.1:{port}"));

    let result = provider.fetch_current("London").await;

    match result {
        Err(FetchError::Network(msg)) => assert!(!msg.contains(API_KEY), "key leaked: {msg}"),
        other => panic!("Expected Network error, got: {other:?}"),
    }
}

#[tokio::test]
async fn invalid_base_url_is_request_setup_error() {
    let endpoints = ProviderConfig { base_url: "not a url".into(), ..ProviderConfig::default() };
    let provider = OpenWeatherProvider::with_endpoints(API_KEY.into(), &endpoints);

    let result = provider.fetch_current("London").await;

    assert!(matches!(result, Err(FetchError::RequestSetup(_))), "got: {result:?}");
}

/// Serves one response whose body is cut short: the headers promise more bytes
/// than are sent before the connection closes.
fn serve_truncated_response(status_line: &'static str) -> String {
    use std::io::{Read, Write};

    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");

    std::thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf);
            let response =
                format!("HTTP/1.1 {status_line}\r\nContent-Length: 500\r\n\r\n{{\"cod\"");
            let _ = stream.write_all(response.as_bytes());
            let _ = stream.flush();
        }
    });

    format!("http://{addr}")
}

fn provider_at(base_url: String) -> OpenWeatherProvider {
    let endpoints = ProviderConfig { base_url, ..ProviderConfig::default() };
    OpenWeatherProvider::with_endpoints(API_KEY.into(), &endpoints)
}

#[tokio::test]
async fn unreadable_not_found_body_is_still_not_found() {
    let provider = provider_at(serve_truncated_response("404 Not Found"));

    let result = provider.fetch_current("Xyzzyplace").await;

    assert_eq!(result, Err(FetchError::NotFound { city: "Xyzzyplace".into() }));
}

#[tokio::test]
async fn unreadable_unauthorized_body_is_still_auth() {
    let provider = provider_at(serve_truncated_response("401 Unauthorized"));

    let result = provider.fetch_current("London").await;

    assert_eq!(result, Err(FetchError::Auth));
}

#[tokio::test]
async fn unreadable_success_body_is_network_error() {
    let provider = provider_at(serve_truncated_response("200 OK"));

    let result = provider.fetch_current("London").await;

    assert!(matches!(result, Err(FetchError::Network(_))), "got: {result:?}");
}

// ============================================================================
// Forecast
// ============================================================================

#[tokio::test]
async fn forecast_takes_every_eighth_sample() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("q", "London"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_list(20)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = create_test_provider(&mock_server);
    let days = provider.fetch_forecast("London").await.expect("forecast");

    assert_eq!(days.len(), 3);
    let mins: Vec<f64> = days.iter().map(|d| d.temperature_min_c).collect();
    assert_eq!(mins, vec![0.0, 8.0, 16.0]);
    assert!((days[1].temperature_max_c - 8.5).abs() < f64::EPSILON);
    assert_eq!(days[2].epoch_seconds, 1_700_000_000 + 16 * 10_800);
    assert_eq!(days[0].condition.description, "light rain");
    assert_eq!(days[0].condition.icon_url, "https://openweathermap.org/img/wn/10d@2x.png");
}

#[tokio::test]
async fn full_forecast_reduces_to_five_days() {
    let mock_server = MockServer::start().await;
    let response = ResponseTemplate::new(200).set_body_json(forecast_list(40));
    setup_mock(&mock_server, "/forecast", response).await;

    let provider = create_test_provider(&mock_server);
    let days = provider.fetch_forecast("London").await.expect("forecast");

    assert_eq!(days.len(), 5);
    assert!(days.windows(2).all(|w| w[0].epoch_seconds < w[1].epoch_seconds));
}

#[tokio::test]
async fn skipped_samples_are_not_validated() {
    let mock_server = MockServer::start().await;
    let mut body = forecast_list(16);
    body["list"][3]["weather"] = serde_json::json!([]);
    let response = ResponseTemplate::new(200).set_body_json(body);
    setup_mock(&mock_server, "/forecast", response).await;

    let provider = create_test_provider(&mock_server);
    let days = provider.fetch_forecast("London").await.expect("forecast");

    assert_eq!(days.len(), 2);
}

#[tokio::test]
async fn retained_sample_without_weather_is_malformed() {
    let mock_server = MockServer::start().await;
    let mut body = forecast_list(16);
    body["list"][8]["weather"] = serde_json::json!([]);
    let response = ResponseTemplate::new(200).set_body_json(body);
    setup_mock(&mock_server, "/forecast", response).await;

    let provider = create_test_provider(&mock_server);
    let result = provider.fetch_forecast("London").await;

    assert!(matches!(result, Err(FetchError::Malformed(_))), "got: {result:?}");
}

#[tokio::test]
async fn forecast_not_found_is_classified() {
    let mock_server = MockServer::start().await;
    let response = ResponseTemplate::new(404).set_body_json(not_found_body());
    setup_mock(&mock_server, "/forecast", response).await;

    let provider = create_test_provider(&mock_server);
    let result = provider.fetch_forecast("Xyzzyplace").await;

    assert_eq!(result, Err(FetchError::NotFound { city: "Xyzzyplace".into() }));
}

// ============================================================================
// Session end to end
// ============================================================================

#[tokio::test]
async fn session_startup_shows_london() {
    let mock_server = MockServer::start().await;
    let response = ResponseTemplate::new(200).set_body_json(london_current());
    setup_mock(&mock_server, "/weather", response).await;
    let response = ResponseTemplate::new(200).set_body_json(forecast_list(40));
    setup_mock(&mock_server, "/forecast", response).await;

    let session = Session::start(create_test_provider(&mock_server), "London").await;
    let state = session.state();

    assert_eq!(state.phase(), Phase::Success);
    let current = state.current().expect("current conditions");
    assert_eq!(current.city, "London");
    assert_eq!(state.unit().display(current.temperature_c), 16);
    assert_eq!(state.forecast().len(), 5);
}

#[tokio::test]
async fn session_surfaces_not_found() {
    let mock_server = MockServer::start().await;
    let response = ResponseTemplate::new(404).set_body_json(not_found_body());
    setup_mock(&mock_server, "/weather", response).await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_list(40)))
        .expect(0)
        .mount(&mock_server)
        .await;

    let session = Session::start(create_test_provider(&mock_server), "Xyzzyplace").await;
    let state = session.state();

    assert_eq!(state.phase(), Phase::Failed);
    assert!(!state.is_loading());
    assert!(state.current().is_none());

    let error = state.error().expect("error");
    assert_eq!(error.kind, ErrorKind::NotFound);
    assert_eq!(error.message, "We couldn't find weather data for \"Xyzzyplace\"");
    assert!(error.suggestion.is_some());
}

#[tokio::test]
async fn session_hides_forecast_failure() {
    let mock_server = MockServer::start().await;
    let response = ResponseTemplate::new(200).set_body_json(london_current());
    setup_mock(&mock_server, "/weather", response).await;
    let response = ResponseTemplate::new(500);
    setup_mock(&mock_server, "/forecast", response).await;

    let session = Session::start(create_test_provider(&mock_server), "London").await;
    let state = session.state();

    assert_eq!(state.phase(), Phase::Success);
    assert!(state.error().is_none());
    assert!(state.forecast().is_empty());
}

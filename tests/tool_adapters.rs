//! HTTP-level tests for the weather and news adapters

use semantic_agent::domain::{Tool, ToolError};
use semantic_agent::infrastructure::llm::HttpClient;
use semantic_agent::infrastructure::tools::{NewsTool, WeatherTool};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn weather_tool_formats_openweathermap_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("q", "London"))
        .and(query_param("appid", "weather-key"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "London",
            "main": { "temp": 15.5 },
            "weather": [{ "description": "clear sky" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tool = WeatherTool::new(HttpClient::new(), Some("weather-key".into()))
        .with_base_url(server.uri());

    let report = tool.invoke("London").await.unwrap();

    assert_eq!(report, "The weather in London is clear sky with 15.5°C.");
}

#[tokio::test]
async fn weather_tool_reports_provider_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "cod": 401, "message": "Invalid API key." })),
        )
        .mount(&server)
        .await;

    let tool = WeatherTool::new(HttpClient::new(), Some("bad".into())).with_base_url(server.uri());

    let error = tool.invoke("London").await.unwrap_err();

    assert!(matches!(error, ToolError::Upstream { status: 401, .. }));
    assert_eq!(error.to_string(), "Error: Invalid API key.");
}

#[tokio::test]
async fn weather_tool_non_json_body_is_fetch_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let tool = WeatherTool::new(HttpClient::new(), Some("key".into())).with_base_url(server.uri());

    let error = tool.invoke("London").await.unwrap_err();

    assert!(error.to_string().starts_with("Error fetching weather:"));
}

#[tokio::test]
async fn news_tool_formats_gnews_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/search"))
        .and(query_param("q", "technology"))
        .and(query_param("apikey", "news-key"))
        .and(query_param("lang", "en"))
        .and(query_param("max", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalArticles": 2,
            "articles": [
                { "title": "New chip unveiled", "source": { "name": "The Verge" } },
                { "title": "Quantum milestone", "source": { "name": "Nature" } }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tool = NewsTool::new(HttpClient::new(), Some("news-key".into())).with_base_url(server.uri());

    let headlines = tool.invoke("technology").await.unwrap();

    assert_eq!(
        headlines,
        "- New chip unveiled (The Verge)\n- Quantum milestone (Nature)"
    );
}

#[tokio::test]
async fn news_tool_reports_errors_field() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/search"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "errors": ["You have reached your request limit for today."]
        })))
        .mount(&server)
        .await;

    let tool = NewsTool::new(HttpClient::new(), Some("key".into())).with_base_url(server.uri());

    let error = tool.invoke("AI").await.unwrap_err();

    assert_eq!(
        error.to_string(),
        "Error: You have reached your request limit for today."
    );
}

#[tokio::test]
async fn unreachable_provider_is_fetch_error() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let tool = NewsTool::new(HttpClient::new(), Some("key".into())).with_base_url(uri);

    let error = tool.invoke("AI").await.unwrap_err();

    assert!(error.to_string().starts_with("Error fetching news:"));
}

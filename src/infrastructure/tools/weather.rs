//! OpenWeatherMap current-conditions adapter

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::domain::tool::{Tool, ToolDescriptor, ToolError, ToolKind};
use crate::infrastructure::llm::HttpClientTrait;

pub const DEFAULT_BASE_URL: &str = "http://api.openweathermap.org";
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

const SUBJECT: &str = "weather";

/// Weather tool backed by the OpenWeatherMap `/data/2.5/weather` endpoint
#[derive(Debug)]
pub struct WeatherTool<C: HttpClientTrait> {
    client: C,
    api_key: Option<String>,
    base_url: String,
    units: String,
}

impl<C: HttpClientTrait> WeatherTool<C> {
    /// A missing key is reported per invocation, not at construction
    pub fn new(client: C, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: DEFAULT_BASE_URL.to_string(),
            units: "metric".to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = units.into();
        self
    }

    fn url(&self) -> String {
        format!("{}/data/2.5/weather", self.base_url)
    }

    fn unit_symbol(&self) -> &'static str {
        match self.units.as_str() {
            "imperial" => "°F",
            "standard" => "K",
            _ => "°C",
        }
    }

    fn format_report(&self, location: &str, body: &Value) -> Result<String, ToolError> {
        let temp = body
            .pointer("/main/temp")
            .filter(|t| t.is_number())
            .ok_or_else(|| ToolError::malformed(SUBJECT, "missing main.temp"))?;

        let description = body
            .pointer("/weather/0/description")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::malformed(SUBJECT, "missing weather description"))?;

        Ok(format!(
            "The weather in {} is {} with {}{}.",
            location,
            description,
            temp,
            self.unit_symbol()
        ))
    }
}

#[async_trait]
impl<C: HttpClientTrait> Tool for WeatherTool<C> {
    fn descriptor(&self) -> &ToolDescriptor {
        ToolKind::Weather.descriptor()
    }

    async fn invoke(&self, location: &str) -> Result<String, ToolError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ToolError::missing_credential(SUBJECT, API_KEY_ENV))?;

        debug!(location = %location, "Fetching current weather");

        let query = [
            ("q", location),
            ("appid", api_key),
            ("units", self.units.as_str()),
        ];

        let response = self
            .client
            .get_json(&self.url(), &query)
            .await
            .map_err(|e| ToolError::network(SUBJECT, e.to_string()))?;

        if !response.is_success() {
            let message = response
                .body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Unknown error");

            return Err(ToolError::upstream(response.status, message));
        }

        self.format_report(location, &response.body)
    }
}

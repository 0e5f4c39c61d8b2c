//! Tool adapters for the external data sources

mod news;
mod weather;

use std::sync::Arc;

pub use news::{
    NewsTool, API_KEY_ENV as NEWS_API_KEY_ENV, DEFAULT_BASE_URL as NEWS_DEFAULT_BASE_URL,
    DEFAULT_MAX_ARTICLES,
};
pub use weather::{
    WeatherTool, API_KEY_ENV as WEATHER_API_KEY_ENV, DEFAULT_BASE_URL as WEATHER_DEFAULT_BASE_URL,
};

use crate::domain::tool::{Tool, ToolKind};

/// The closed set of tool adapters, one per routable category
#[derive(Debug, Clone)]
pub struct ToolSet {
    weather: Arc<dyn Tool>,
    news: Arc<dyn Tool>,
}

impl ToolSet {
    pub fn new(weather: Arc<dyn Tool>, news: Arc<dyn Tool>) -> Self {
        Self { weather, news }
    }

    pub fn get(&self, kind: ToolKind) -> &Arc<dyn Tool> {
        match kind {
            ToolKind::Weather => &self.weather,
            ToolKind::News => &self.news,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tool::MockTool;

    #[test]
    fn test_tool_set_selects_by_kind() {
        let tools = ToolSet::new(
            Arc::new(MockTool::succeeding(*ToolKind::Weather.descriptor(), "sunny")),
            Arc::new(MockTool::succeeding(*ToolKind::News.descriptor(), "- headline (AP)")),
        );

        assert_eq!(tools.get(ToolKind::Weather).descriptor().name, "Weather Tool");
        assert_eq!(tools.get(ToolKind::News).descriptor().name, "News Tool");
    }
}

use serde::{Deserialize, Serialize};

use super::ToolDescriptor;
use crate::domain::routing::Category;

const WEATHER_TOOL: ToolDescriptor = ToolDescriptor::new(
    "Weather Tool",
    "Fetches current weather details for a specified location.",
);

const NEWS_TOOL: ToolDescriptor = ToolDescriptor::new(
    "News Tool",
    "Fetches the latest news headlines for a specified topic.",
);

/// The closed set of tools a routed query can be dispatched to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    Weather,
    News,
}

impl ToolKind {
    /// Tool handling a category; `None` for `Unknown`
    pub fn for_category(category: Category) -> Option<Self> {
        match category {
            Category::Weather => Some(ToolKind::Weather),
            Category::News => Some(ToolKind::News),
            Category::Unknown => None,
        }
    }

    pub fn descriptor(&self) -> &'static ToolDescriptor {
        match self {
            ToolKind::Weather => &WEATHER_TOOL,
            ToolKind::News => &NEWS_TOOL,
        }
    }

    /// What the tool fetches, used in error texts ("Error fetching weather: ...")
    pub fn subject(&self) -> &'static str {
        match self {
            ToolKind::Weather => "weather",
            ToolKind::News => "news",
        }
    }

    /// Prompt asking the model for this tool's single argument
    pub fn argument_prompt(&self, query: &str) -> String {
        let (what, example) = match self {
            ToolKind::Weather => ("the location (city name)", "London"),
            ToolKind::News => ("the news topic", "Artificial Intelligence"),
        };

        format!(
            r#"Extract {what} the user is asking about from the query below.

User Query: "{query}"

Return only {what} on a single line, for example: {example}. If there is none, return NONE."#
        )
    }

    /// Prompt asking the model to turn raw tool output into the final answer
    pub fn synthesis_prompt(&self, query: &str, tool_output: &str) -> String {
        let (task, expected) = match self {
            ToolKind::Weather => (
                "Summarize the weather for the location mentioned in",
                "A friendly weather report.",
            ),
            ToolKind::News => (
                "Summarize the latest news for the topic mentioned in",
                "A concise list of news headlines.",
            ),
        };

        format!(
            r#"{task}: '{query}'

Data from the {tool}:
{tool_output}

Use only the data above. Expected output: {expected}"#,
            tool = self.descriptor().name
        )
    }
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.subject())
    }
}

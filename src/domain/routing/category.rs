use serde::{Deserialize, Serialize};

/// Handling category for a query
///
/// `Unknown` is terminal: no tool is invoked for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Weather,
    News,
    Unknown,
}

impl Category {
    /// Normalize raw classifier output into a category.
    ///
    /// Output is trimmed and lowercased and must then be exactly one of the
    /// routable names. Anything else, including multi-word answers and
    /// punctuation, is `Unknown`.
    pub fn from_model_output(output: &str) -> Self {
        match output.trim().to_lowercase().as_str() {
            "weather" => Category::Weather,
            "news" => Category::News,
            _ => Category::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Weather => "weather",
            Category::News => "news",
            Category::Unknown => "unknown",
        }
    }

    pub fn is_routable(&self) -> bool {
        !matches!(self, Category::Unknown)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_outputs() {
        assert_eq!(Category::from_model_output("weather"), Category::Weather);
        assert_eq!(Category::from_model_output("news"), Category::News);
        assert_eq!(Category::from_model_output("unknown"), Category::Unknown);
    }

    #[test]
    fn test_output_is_trimmed_and_lowercased() {
        assert_eq!(Category::from_model_output("  Weather\n"), Category::Weather);
        assert_eq!(Category::from_model_output("NEWS"), Category::News);
    }

    #[test]
    fn test_malformed_outputs_are_unknown() {
        for output in [
            "",
            "   ",
            "weather.",
            "'news'",
            "The category is weather",
            "weather news",
            "sports",
            "météo",
        ] {
            assert_eq!(
                Category::from_model_output(output),
                Category::Unknown,
                "output {:?} should be unknown",
                output
            );
        }
    }

    #[test]
    fn test_routable() {
        assert!(Category::Weather.is_routable());
        assert!(Category::News.is_routable());
        assert!(!Category::Unknown.is_routable());
    }

    #[test]
    fn test_display_and_serde() {
        assert_eq!(Category::News.to_string(), "news");
        assert_eq!(serde_json::to_string(&Category::Weather).unwrap(), "\"weather\"");
    }
}

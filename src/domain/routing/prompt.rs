/// Build the prompt asking the model to pick exactly one category for `query`
pub fn classification_prompt(query: &str) -> String {
    format!(
        r#"Analyze the user query and classify it into exactly one of these categories: 'weather', 'news', or 'unknown'.

- 'weather': Queries about current weather, temperature, forecast, or atmospheric conditions.
- 'news': Queries about current events, headlines, world news, or specific topics in the news.
- 'unknown': Anything else that doesn't fit the above.

User Query: "{}"

Return only the category name in lowercase."#,
        query
    )
}

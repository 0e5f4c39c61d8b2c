//! Intent routing domain: categories and the classification prompt

mod category;
mod prompt;

pub use category::Category;
pub use prompt::classification_prompt;

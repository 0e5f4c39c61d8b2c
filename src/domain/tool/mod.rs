//! Tool adapter domain: descriptors, errors and the closed set of tool kinds

mod argument;
mod descriptor;
mod error;
mod kind;
mod provider;

pub use argument::{extract_argument_heuristic, normalize_extracted_argument, MAX_ARGUMENT_CHARS};
pub use descriptor::ToolDescriptor;
pub use error::ToolError;
pub use kind::ToolKind;
pub use provider::Tool;

#[cfg(test)]
pub use provider::mock::MockTool;

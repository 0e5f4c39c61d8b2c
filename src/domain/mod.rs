//! Domain layer - Core types and collaborator traits

pub mod embedding;
pub mod error;
pub mod llm;
pub mod query;
pub mod routing;
pub mod semantic_cache;
pub mod tool;

pub use error::DomainError;
pub use llm::{
    FinishReason, LlmProvider, LlmRequest, LlmRequestBuilder, LlmResponse, Message, MessageRole,
    Usage,
};
pub use query::{Query, QueryResponse, ResponseOrigin};
pub use routing::Category;
pub use tool::{Tool, ToolDescriptor, ToolError, ToolKind};

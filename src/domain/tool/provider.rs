use async_trait::async_trait;
use std::fmt::Debug;

use super::{ToolDescriptor, ToolError};

/// Uniform contract for one external data source.
///
/// Implementations never panic or raise past this boundary: every failure
/// comes back as a `ToolError`.
#[async_trait]
pub trait Tool: Send + Sync + Debug {
    fn descriptor(&self) -> &ToolDescriptor;

    async fn invoke(&self, argument: &str) -> Result<String, ToolError>;
}

use thiserror::Error;

/// Failure of a single tool invocation
///
/// Every rendering starts with the `Error` marker so the text stays
/// recognizable to users and to anything still matching on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error("Error: missing API key for {tool} (set {env_var})")]
    MissingCredential { tool: String, env_var: String },

    #[error("Error: {message}")]
    Upstream { status: u16, message: String },

    #[error("Error fetching {subject}: {message}")]
    Network { subject: String, message: String },

    #[error("Error fetching {subject}: malformed response ({message})")]
    MalformedPayload { subject: String, message: String },

    #[error("Error fetching {subject}: timed out after {seconds}s")]
    Timeout { subject: String, seconds: u64 },
}

impl ToolError {
    pub fn missing_credential(tool: impl Into<String>, env_var: impl Into<String>) -> Self {
        Self::MissingCredential {
            tool: tool.into(),
            env_var: env_var.into(),
        }
    }

    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            message: message.into(),
        }
    }

    pub fn network(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network {
            subject: subject.into(),
            message: message.into(),
        }
    }

    pub fn malformed(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedPayload {
            subject: subject.into(),
            message: message.into(),
        }
    }

    pub fn timeout(subject: impl Into<String>, seconds: u64) -> Self {
        Self::Timeout {
            subject: subject.into(),
            seconds,
        }
    }

    /// Short label used for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::MissingCredential { .. } => "missing_credential",
            ToolError::Upstream { .. } => "upstream",
            ToolError::Network { .. } => "network",
            ToolError::MalformedPayload { .. } => "malformed_payload",
            ToolError::Timeout { .. } => "timeout",
        }
    }
}

//! LLM provider implementations

mod http_client;
mod openai;

pub use http_client::{HttpClient, HttpClientTrait, JsonResponse};
pub use openai::{OpenAiProvider, DEFAULT_BASE_URL};

#[cfg(test)]
pub use http_client::mock::MockHttpClient;

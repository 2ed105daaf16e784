//! Provider adapter: turns bulk text into a structured deck outline by
//! calling OpenAI-compatible, Anthropic or Gemini endpoints.

pub mod extract;
pub mod outline;
pub mod prompt;
pub mod provider;
pub mod retry;
pub mod transport;

pub use extract::extract_json;
pub use outline::{generate_slide_outline, OutlineGenerator};
pub use prompt::Prompt;
pub use provider::{ChatApi, Provider, ProviderConfig, ProviderKind};
pub use retry::RetryPolicy;
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};

#[cfg(any(test, feature = "test-export-mocks"))]
pub use transport::MockHttpTransport;

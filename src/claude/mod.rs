//! Claude integration
//!
//! Prompt rendering, the Messages API client and the helpers that turn a raw
//! completion into JSON.

pub mod api;
pub mod prompt;
pub mod response;

pub use api::{ClaudeClient, CompletionClient};
pub use prompt::PromptBuilder;
pub use response::{extract_response_text, parse_json_response, strip_code_fences};

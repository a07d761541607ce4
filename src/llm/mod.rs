// LLM abstraction layer

pub mod provider;
pub mod openai;
pub mod anthropic;
pub mod query;

pub use provider::*;
pub use query::{LlmQueryService, QueryService};

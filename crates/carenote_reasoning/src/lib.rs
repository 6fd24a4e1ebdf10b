//! The care assistant: everything that talks to a language model.
//!
//! Every model call is optional. A failed or unconfigured provider degrades
//! to a rule-based reply or an empty result, never to an error the user sees.

pub mod api_types;
pub mod assistant;
pub mod llm;
pub mod prompts;
pub mod providers;
mod retry;

pub use assistant::{parse_micro_habits, CareAssistant};
pub use llm::{CompletionParams, LlmClient};
pub use prompts::ReportKind;
pub use providers::{build_client, MockProvider, OpenAiClient};

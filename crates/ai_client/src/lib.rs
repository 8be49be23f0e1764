pub mod analyze;
pub mod gemini;

pub use analyze::{analyze_debts, build_prompt, NO_DEBTS_MESSAGE};
pub use gemini::{GeminiClient, GeminiClientConfig, TextModel};

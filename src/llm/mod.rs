pub mod client;
pub mod prompts;

pub use client::{OpenAiClient, ReviewGenerator};
pub use prompts::{PromptTemplate, PromptTemplates};

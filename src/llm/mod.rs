pub mod agent;
pub mod client;
pub mod prompts;

pub use agent::InsightAgent;
pub use client::{LLMClient, Summarizer};

//! Article enrichment: generated tags and summaries.

mod generator;
mod repository;
mod service;
mod types;

pub use generator::{OpenAiGenerator, TextGenerator, SUMMARY_PROMPT, TAG_PROMPT};
pub use repository::{SummaryRepository, TagRepository};
pub use service::EnrichService;
pub use types::{Summary, Tag};

//! Deep-research pipeline for Confab
//!
//! Plans web searches from a research question, fetches and summarizes the
//! results, writes a report, and composes an email presenting it.

pub mod email;
pub mod manager;
pub mod planner;
pub mod search;
pub mod summarizer;
pub mod writer;

pub use email::EmailComposer;
pub use manager::{ResearchManager, ResearchReport};
pub use planner::{Planner, SearchItem, SearchPlan};
pub use search::{SearchProvider, SearchResult, SerpApiSearch};
pub use summarizer::Summarizer;
pub use writer::ReportWriter;

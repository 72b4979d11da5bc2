mod errors;
mod extractor;
mod prompts;
mod runner;
mod safety;
mod stream;
mod summarizer;


pub use errors::AgentError;
pub use extractor::{extract_sql, strip_sql_blocks};
pub use prompts::{SUMMARY_ROW_LIMIT, build_repair_prompt, build_summary_prompt, build_system_prompt};
pub use runner::Agent;
pub use safety::is_safe_query;
pub use summarizer::{NO_RESULTS_MESSAGE, ResultSummarizer};

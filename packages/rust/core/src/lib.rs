//! Core query-path logic for askbase: context budgeting, answer generation,
//! and the ingest/ask pipelines gluing the crawler and snapshot store
//! together.

pub mod answer;
pub mod context;
pub mod pipeline;

pub use answer::{AnswerGenerator, CompletionClient, NO_DATA_MESSAGE, REFUSAL_PHRASE};
pub use context::{ContextBudget, DEFAULT_PER_RECORD_CAP, DEFAULT_TOTAL_BUDGET, build_context};
pub use pipeline::{
    AskConfig, IngestConfig, IngestReport, ProgressReporter, SilentProgress, ask, ingest,
};

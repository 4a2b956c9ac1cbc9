//! Release publishing pipeline.
//!
//! This module implements the staged publish protocol:
//! - `run`: draft creation, isolated uploads, publish gate
//! - `upload`: bounded worker pool with index-addressed outcomes
//! - `retry`: per-call timeouts and backoff for the retryable stages
//! - `state`: states, outcomes and the run result

mod retry;
mod run;
mod state;
mod upload;

pub use run::ReleasePipeline;
pub use state::{FailureReason, PipelineResult, PipelineState, UploadOutcome};

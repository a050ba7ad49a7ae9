use chrono::NaiveDate;
use thiserror::Error;

use crate::classify::ErrorKind;

/// Failure taxonomy for one (agent, date) analysis. Every variant is
/// caught at the agent boundary and converted into a null result plus a
/// single classified log line; nothing here propagates to the
/// orchestrator.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("input folder not found for {0}")]
    MissingInputs(NaiveDate),

    #[error("insufficient signal: {0}")]
    InsufficientSignal(String),

    #[error("all providers in the fallback chain failed ({0})")]
    ChainExhausted(ErrorKind),

    #[error("response parse error: {0}")]
    Parse(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("store error: {0}")]
    Store(#[from] regent_store::StoreError),
}

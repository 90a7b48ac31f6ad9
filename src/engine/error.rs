//! Engine errors.
//!
//! Only explicit host requests can fail. Per-tick conditions (no player
//! attached, malformed annotation tokens, an auto-jump with no successor)
//! are handled inline as no-ops or fallbacks, never as errors.

/// Errors from explicit engine calls.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("no interval with sequence index {index}")]
    UnknownInterval { index: usize },

    #[error("no player attached")]
    PlayerNotAttached,
}

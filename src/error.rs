//! Structured error types for the DRR simulator.
//!
//! All fallible public APIs return `Result<T, SimError>`. Configuration
//! problems are caught when a simulator is built, so a constructed
//! `Simulator` never fails while running.

use thiserror::Error;

/// The top-level error type for the simulator.
#[derive(Debug, Error)]
pub enum SimError {
    // ── Configuration errors ──────────────────────────────

    /// The flow list or quantum cannot drive a simulation.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A scenario named a flow kind other than `cbr` or `poisson`.
    #[error("unsupported flow kind: {0:?}")]
    UnsupportedFlowKind(String),

    // ── Scenario / report I/O ─────────────────────────────

    /// Reading a scenario file or writing a report failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A scenario file was not valid JSON for the expected shape.
    #[error("scenario parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Convenience alias for `Result<T, SimError>`.
pub type SimResult<T> = Result<T, SimError>;

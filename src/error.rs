//! Error types shared across the simulator.

use std::io;
use thiserror::Error;

/// Failures reported by a channel simulator backend.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulatorError {
    /// The backend did not answer within the configured deadline.
    #[error("channel simulator timed out after {millis} ms")]
    Timeout { millis: u64 },

    /// The backend is gone (worker thread exited, process closed).
    #[error("channel simulator is unavailable")]
    Unavailable,

    /// The backend answered with an error of its own.
    #[error("channel simulator failed: {0}")]
    Backend(String),
}

/// Errors that abort a simulation run or reject a configuration.
#[derive(Debug, Error)]
pub enum Error {
    /// A simulated sample could not be produced. Fatal for the run.
    #[error("simulation {id} failed: {source}")]
    Simulator {
        id: String,
        #[source]
        source: SimulatorError,
    },

    /// An algorithm selector names something that does not exist.
    #[error("unsupported {kind} '{name}' (expected one of: {expected})")]
    UnsupportedAlgorithm {
        kind: &'static str,
        name: String,
        expected: &'static str,
    },

    /// A role refers to a terminal index outside the terminal list.
    #[error("terminal {index} does not exist ({count} terminals configured)")]
    UnknownTerminal { index: usize, count: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// An AoA estimate was requested without any antenna reading.
    #[error("no antenna readings available for AoA estimation")]
    EmptyReadings,

    #[error("malformed simulation id '{id}': {reason}")]
    MalformedSimulationId { id: String, reason: String },

    #[error("malformed flight log at line {line}: {reason}")]
    MalformedLog { line: usize, reason: String },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

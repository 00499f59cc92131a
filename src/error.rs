//!
//! Error types of the HMM engine
//!
use thiserror::Error;

///
/// Errors raised by model construction, training, scoring and persistence.
///
/// Numerical degeneracies (empty sequences, zero likelihoods, zero
/// denominators in re-estimation) are never errors; they have fallback
/// outputs.
///
#[derive(Debug, Error)]
pub enum HmmError {
    /// A model needs at least one hidden state and one emission symbol.
    #[error("invalid dimension: n_states={n_states} n_emissions={n_emissions}")]
    InvalidDimension { n_states: usize, n_emissions: usize },

    /// An emission symbol outside of `0..n_emissions`.
    #[error("emission {emission} at position {position} is out of range (n_emissions={n_emissions})")]
    DegenerateSequence {
        emission: usize,
        n_emissions: usize,
        position: usize,
    },

    /// Explicitly given parameters are not a valid HMM
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("species {species} is out of range (n_species={n_species})")]
    UnknownSpecies { species: usize, n_species: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HmmError>;

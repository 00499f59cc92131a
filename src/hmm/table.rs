//!
//! Table definitions
//!
//! Scaled Forward/Backward tables. For emissions `x[0..n]`,
//!
//! ```text
//! c[t]        = sum_i F~[t][i]                 (scale of step t)
//! F[t][i]     = F~[t][i] / c[t]                (sums to 1 over i)
//! B[t][i]     = P(x[t+1:n] | state i at t) / (c[t+1] ... c[n-1])
//! P(x[0..n])  = c[0] c[1] ... c[n-1]
//! ```
//!
//! where `F~[t]` is the forward vector computed from the scaled `F[t-1]`.
//!
use crate::prob::{p, Prob};
use ndarray::prelude::*;

/// Scaled forward tables and their scale factors.
///
/// `tables.len() == scales.len() ==` the number of emissions.
#[derive(Debug, Clone)]
pub struct ForwardResult {
    pub tables: Vec<Array1<f64>>,
    pub scales: Vec<f64>,
}

impl ForwardResult {
    /// The number of emissions that this result stores.
    pub fn n_emissions(&self) -> usize {
        self.tables.len()
    }
    ///
    /// P(emissions) as the product of the scale factors.
    /// An empty emission sequence has probability 1.
    ///
    pub fn full_prob(&self) -> Prob {
        self.scales.iter().map(|&c| p(c)).product()
    }
    ///
    /// Filtered state belief after the last emission, `P(state at n-1 | x)`.
    ///
    /// `None` for empty emissions or when the emissions are impossible under
    /// the model (every scale after that point is 0).
    ///
    pub fn last_belief(&self) -> Option<&Array1<f64>> {
        match (self.tables.last(), self.scales.last()) {
            (Some(table), Some(&scale)) if scale > 0.0 => Some(table),
            _ => None,
        }
    }
}

/// Scaled backward tables, sharing the scale factors of a `ForwardResult`.
#[derive(Debug, Clone)]
pub struct BackwardResult {
    pub tables: Vec<Array1<f64>>,
}

impl BackwardResult {
    pub fn n_emissions(&self) -> usize {
        self.tables.len()
    }
}

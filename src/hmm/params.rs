//!
//! Parameters of Baum-Welch training
//!
use derive_new::new;
use serde::{Deserialize, Serialize};

///
/// Stopping rule of `HmmModel::fit`.
///
/// Training stops after `max_iter` re-estimations, or as soon as one
/// re-estimation improves the log-likelihood by less than `tolerance`.
/// `max_iter` is the only bound on training latency.
///
#[derive(new, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainParams {
    pub max_iter: usize,
    pub tolerance: f64,
}

impl Default for TrainParams {
    fn default() -> Self {
        TrainParams::new(100, 1e-6)
    }
}

impl std::fmt::Display for TrainParams {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "max_iter={} tolerance={}", self.max_iter, self.tolerance)
    }
}

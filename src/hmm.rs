//!
//! Discrete HMM calculation
//!
//! # Overview of calculation
//!
//! x = x[0],...,x[n-1] : Emissions of length n
//!
//! Forward
//! F[t][i]
//!  = P(emits x[0..=t] and in state i at t), kept scaled so that it sums to 1
//!
//! Backward
//! B[t][i]
//!  = P(emits x[t+1..n] | in state i at t), scaled by the same factors
//!
//! Freq
//! G[t][i] = P(in state i at t | x) ∝ F[t][i] B[t][i]
//!
//! Training (`HmmModel::fit`) re-estimates the parameters from the expected
//! counts of G until the likelihood stops improving.
//!
pub mod backward;
pub mod forward;
pub mod freq;
pub mod mocks;
pub mod model;
pub mod params;
pub mod predict;
pub mod sampler;
pub mod table;
pub mod train;

pub use model::HmmModel;
pub use params::TrainParams;
pub use predict::Prediction;
pub use sampler::History;
pub use train::{fit_from_seed, FitResult};

pub mod config;
pub mod error;
pub mod hmm;
pub mod player;
pub mod prob;
pub mod species;

#[cfg(test)]
#[macro_use]
extern crate approx;

pub use error::{HmmError, Result};
pub use hmm::{HmmModel, Prediction, TrainParams};
pub use species::{Classification, SpeciesPool};

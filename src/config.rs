//!
//! Configuration of the bird hunting player
//!
use crate::error::Result;
use crate::hmm::TrainParams;
use serde::{Deserialize, Serialize};
use std::path::Path;

///
/// Player settings. Missing JSON fields take the default.
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// hidden states of every model
    pub n_states: usize,
    /// size of the movement alphabet
    pub n_emissions: usize,
    pub n_species: usize,
    /// time steps in a round
    pub n_steps_per_round: usize,
    /// minimum combined score to shoot
    pub shoot_threshold: f64,
    /// weight of the next-move confidence in the combined score
    pub move_weight: f64,
    /// weight of the species confidence in the combined score
    pub species_weight: f64,
    /// species that must never be shot (black stork)
    pub forbidden_species: Option<usize>,
    /// base seed of model initialization
    pub seed: u64,
    pub train: TrainParams,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        PlayerConfig {
            n_states: 6,
            n_emissions: 9,
            n_species: 6,
            n_steps_per_round: 100,
            shoot_threshold: 0.7,
            move_weight: 0.8,
            species_weight: 0.2,
            forbidden_species: Some(5),
            seed: 0,
            train: TrainParams::default(),
        }
    }
}

impl PlayerConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let config = serde_json::from_reader(std::io::BufReader::new(file))?;
        Ok(config)
    }
}

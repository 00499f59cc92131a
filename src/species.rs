//!
//! Per-species model pools and species classification
//!
use crate::error::{HmmError, Result};
use crate::hmm::{FitResult, HmmModel, TrainParams};
use crate::prob::Prob;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

///
/// Result of `SpeciesPool::classify`
///
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Classification {
    /// best matching species and the likelihood of its best model
    Species { species: usize, likelihood: Prob },
    /// no evidence (empty emissions) or no model can emit the emissions
    Unknown,
}

impl Classification {
    pub fn species(&self) -> Option<usize> {
        match self {
            Classification::Species { species, .. } => Some(*species),
            Classification::Unknown => None,
        }
    }
    /// likelihood of the winning model, `p=0` for `Unknown`
    pub fn likelihood(&self) -> Prob {
        match self {
            Classification::Species { likelihood, .. } => *likelihood,
            Classification::Unknown => Prob::zero(),
        }
    }
    pub fn is_unknown(&self) -> bool {
        matches!(self, Classification::Unknown)
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Classification::Species {
                species,
                likelihood,
            } => write!(f, "species={} likelihood={}", species, likelihood),
            Classification::Unknown => write!(f, "unknown"),
        }
    }
}

///
/// Ordered collection of models for every species.
///
/// Every species starts with a uniform placeholder model, so classification
/// is defined before any training data exists. Models are only appended
/// (most recent last) and are shared as `Arc`, so a model is never modified
/// once it is in the pool.
///
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesPool {
    n_states: usize,
    n_emissions: usize,
    pools: Vec<Vec<Arc<HmmModel>>>,
}

impl SpeciesPool {
    ///
    /// Pool of `n_species` species, each seeded with a uniform
    /// `n_states x n_emissions` model.
    ///
    pub fn new(n_species: usize, n_states: usize, n_emissions: usize) -> Result<Self> {
        if n_species == 0 {
            return Err(HmmError::InvalidParameters(
                "n_species must be positive".to_string(),
            ));
        }
        let placeholder = Arc::new(HmmModel::uniform(n_states, n_emissions)?);
        Ok(SpeciesPool {
            n_states,
            n_emissions,
            pools: vec![vec![placeholder]; n_species],
        })
    }
    pub fn n_species(&self) -> usize {
        self.pools.len()
    }
    pub fn n_states(&self) -> usize {
        self.n_states
    }
    pub fn n_emissions(&self) -> usize {
        self.n_emissions
    }
    /// Models of the species, in insertion order.
    pub fn models(&self, species: usize) -> Result<&[Arc<HmmModel>]> {
        self.check_species(species)?;
        Ok(&self.pools[species])
    }
    /// Total number of models over all species.
    pub fn n_models(&self) -> usize {
        self.pools.iter().map(|pool| pool.len()).sum()
    }
    ///
    /// Append a finished model to the species.
    ///
    /// The model must share the pool's emission alphabet.
    ///
    pub fn append(&mut self, species: usize, model: HmmModel) -> Result<()> {
        self.check_species(species)?;
        if model.n_emissions() != self.n_emissions {
            return Err(HmmError::InvalidParameters(format!(
                "model has {} emissions but the pool has {}",
                model.n_emissions(),
                self.n_emissions
            )));
        }
        self.pools[species].push(Arc::new(model));
        debug!(
            "species={} n_models={}",
            species,
            self.pools[species].len()
        );
        Ok(())
    }
    ///
    /// Train a fresh randomly initialized model on the emissions of a bird
    /// of known species and append it.
    ///
    pub fn train_and_append(
        &mut self,
        species: usize,
        emissions: &[usize],
        params: &TrainParams,
        seed: u64,
    ) -> Result<FitResult> {
        self.check_species(species)?;
        let r = HmmModel::random(self.n_states, self.n_emissions, seed)?.fit(emissions, params)?;
        info!(
            "species={} trained n_emissions={} ll={}",
            species,
            emissions.len(),
            r.log_likelihood()
        );
        self.append(species, r.model.clone())?;
        Ok(r)
    }
    ///
    /// Species whose model gives the emissions the highest likelihood.
    ///
    /// Ties go to the lowest species, then to the earliest model. Returns
    /// `Unknown` for empty emissions or when every likelihood is 0.
    ///
    pub fn classify(&self, emissions: &[usize]) -> Result<Classification> {
        if emissions.is_empty() {
            return Ok(Classification::Unknown);
        }
        let mut best = Classification::Unknown;
        for (species, pool) in self.pools.iter().enumerate() {
            for model in pool.iter() {
                let likelihood = model.forward_likelihood(emissions)?;
                if !likelihood.is_zero() && likelihood > best.likelihood() {
                    best = Classification::Species {
                        species,
                        likelihood,
                    };
                }
            }
        }
        Ok(best)
    }
    ///
    /// Save the pool as JSON.
    ///
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer(writer, self)?;
        Ok(())
    }
    ///
    /// Load a pool saved by `save`, checking every model.
    ///
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let pool: SpeciesPool = serde_json::from_reader(reader)?;
        if pool.pools.is_empty() || pool.pools.iter().any(|models| models.is_empty()) {
            return Err(HmmError::InvalidParameters(
                "every species needs at least one model".to_string(),
            ));
        }
        for model in pool.pools.iter().flatten() {
            model.validate()?;
            if model.n_emissions() != pool.n_emissions {
                return Err(HmmError::InvalidParameters(
                    "model alphabet differs from the pool".to_string(),
                ));
            }
        }
        Ok(pool)
    }
    fn check_species(&self, species: usize) -> Result<()> {
        if species < self.pools.len() {
            Ok(())
        } else {
            Err(HmmError::UnknownSpecies {
                species,
                n_species: self.pools.len(),
            })
        }
    }
}

//!
//! Bird hunting player built on the HMM engine
//!
//! Every time step the player fits a fresh model to each live bird's
//! movements, predicts its next movement, and guesses its species from the
//! species pools. At the end of a round the revealed species of the birds
//! extend the pools.
//!
use crate::config::PlayerConfig;
use crate::error::Result;
use crate::error::HmmError;
use crate::hmm::{fit_from_seed, Prediction};
use crate::prob::p;
use crate::species::{Classification, SpeciesPool};
use log::{debug, info};

///
/// Observed movements of a bird, one per time step. `None` once it is dead.
///
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bird {
    observations: Vec<Option<usize>>,
}

impl Bird {
    pub fn new(observations: Vec<Option<usize>>) -> Self {
        Bird { observations }
    }
    pub fn push(&mut self, observation: Option<usize>) {
        self.observations.push(observation);
    }
    /// number of observed time steps, including dead ones
    pub fn len(&self) -> usize {
        self.observations.len()
    }
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
    pub fn is_dead(&self) -> bool {
        matches!(self.observations.last(), Some(None))
    }
    ///
    /// Movements while the bird was alive.
    ///
    pub fn alive_sequence(&self) -> Vec<usize> {
        self.observations.iter().map_while(|o| *o).collect()
    }
}

impl From<Vec<usize>> for Bird {
    fn from(movements: Vec<usize>) -> Self {
        Bird::new(movements.into_iter().map(Some).collect())
    }
}

///
/// A candidate shot at a bird
///
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shot {
    /// index of the bird
    pub bird: usize,
    /// predicted next movement
    pub movement: usize,
    pub species: Classification,
    /// probability of `movement`
    pub move_confidence: f64,
    /// per-movement likelihood of the species guess
    pub species_confidence: f64,
    /// `move_weight * move_confidence + species_weight * species_confidence`
    pub score: f64,
}

pub struct Player {
    config: PlayerConfig,
    pool: SpeciesPool,
}

impl Player {
    pub fn new(config: PlayerConfig) -> Result<Self> {
        let pool = SpeciesPool::new(config.n_species, config.n_states, config.n_emissions)?;
        Ok(Player { config, pool })
    }
    pub fn with_pool(config: PlayerConfig, pool: SpeciesPool) -> Self {
        Player { config, pool }
    }
    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }
    pub fn pool(&self) -> &SpeciesPool {
        &self.pool
    }
    ///
    /// Decide whether and where to shoot at `time_step`.
    ///
    /// Waits until the last `birds.len()` steps of the round, then shoots at
    /// the live bird with the best score if it exceeds the threshold. Birds
    /// of unknown or forbidden species are never targeted.
    ///
    pub fn shoot(&self, birds: &[Bird], time_step: usize) -> Result<Option<Shot>> {
        if time_step + birds.len() < self.config.n_steps_per_round {
            return Ok(None);
        }
        let mut best: Option<Shot> = None;
        for (i, bird) in birds.iter().enumerate() {
            if bird.is_dead() {
                continue;
            }
            let emissions = bird.alive_sequence();
            if emissions.len() < 2 {
                continue;
            }
            let shot = self.assess(i, &emissions, time_step)?;
            debug!("time_step={} candidate={:?}", time_step, shot);
            if !self.is_allowed_target(&shot.species) {
                continue;
            }
            if best.map_or(true, |b| shot.score > b.score) {
                best = Some(shot);
            }
        }
        match best {
            Some(shot) if shot.score > self.config.shoot_threshold => {
                info!(
                    "time_step={} shoot bird={} movement={} score={:.4}",
                    time_step, shot.bird, shot.movement, shot.score
                );
                Ok(Some(shot))
            }
            _ => Ok(None),
        }
    }
    ///
    /// Species guess for every bird, from its movements while alive.
    ///
    pub fn guess(&self, birds: &[Bird]) -> Result<Vec<Classification>> {
        birds
            .iter()
            .map(|bird| {
                let c = self.pool.classify(&bird.alive_sequence())?;
                info!("guess {}", c);
                Ok(c)
            })
            .collect()
    }
    ///
    /// Learn from the true species of the birds (`None` where not revealed).
    /// Returns the number of models added.
    ///
    /// `species` must have one entry per bird.
    ///
    pub fn reveal(&mut self, birds: &[Bird], species: &[Option<usize>]) -> Result<usize> {
        if birds.len() != species.len() {
            return Err(HmmError::InvalidParameters(format!(
                "{} birds but {} revealed species",
                birds.len(),
                species.len()
            )));
        }
        let mut n_added = 0;
        for (bird, species) in birds.iter().zip(species.iter()) {
            let species = match species {
                Some(species) => *species,
                None => continue,
            };
            let emissions = bird.alive_sequence();
            if emissions.is_empty() {
                continue;
            }
            let seed = self.config.seed.wrapping_add(self.pool.n_models() as u64);
            self.pool
                .train_and_append(species, &emissions, &self.config.train, seed)?;
            n_added += 1;
        }
        info!("reveal added={} n_models={}", n_added, self.pool.n_models());
        Ok(n_added)
    }
    pub fn hit(&self, bird: usize) {
        info!("hit bird={}", bird);
    }
    fn assess(&self, bird: usize, emissions: &[usize], time_step: usize) -> Result<Shot> {
        let seed = self
            .config
            .seed
            .wrapping_add((bird as u64) << 32)
            .wrapping_add(time_step as u64);
        let fit = fit_from_seed(
            self.config.n_states,
            self.config.n_emissions,
            seed,
            emissions,
            &self.config.train,
        )?;
        let Prediction {
            emission,
            confidence,
        } = fit.model.predict_next(emissions)?;
        let species = self.pool.classify(emissions)?;
        let species_confidence = species.likelihood().per_emission(emissions.len());
        let score = p(self.config.move_weight) * p(confidence)
            + p(self.config.species_weight) * species_confidence;
        Ok(Shot {
            bird,
            movement: emission,
            species,
            move_confidence: confidence,
            species_confidence: species_confidence.to_value(),
            score: score.to_value(),
        })
    }
    fn is_allowed_target(&self, species: &Classification) -> bool {
        match species.species() {
            Some(s) => Some(s) != self.config.forbidden_species,
            None => false,
        }
    }
}

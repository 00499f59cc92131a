//!
//! Sampling emissions from the HmmModel
//!
use super::model::HmmModel;
use ndarray::prelude::*;
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;

///
/// Hidden state path and emissions of a sampled sequence
///
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    pub states: Vec<usize>,
    pub emissions: Vec<usize>,
}

impl History {
    pub fn len(&self) -> usize {
        self.emissions.len()
    }
    pub fn is_empty(&self) -> bool {
        self.emissions.is_empty()
    }
}

impl std::fmt::Display for History {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for (s, e) in self.states.iter().zip(self.emissions.iter()) {
            write!(f, "{}:{} ", s, e)?;
        }
        Ok(())
    }
}

impl HmmModel {
    ///
    /// Sample a sequence of `length` emissions with the seeded rng.
    ///
    pub fn sample(&self, length: usize, seed: u64) -> History {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let mut states = Vec::with_capacity(length);
        let mut emissions = Vec::with_capacity(length);
        for t in 0..length {
            let state = if t == 0 {
                pick(self.init().view(), &mut rng)
            } else {
                pick(self.trans().row(states[t - 1]), &mut rng)
            };
            emissions.push(pick(self.emit().row(state), &mut rng));
            states.push(state);
        }
        History { states, emissions }
    }
}

///
/// Pick an index with probability proportional to its weight.
///
fn pick<R: Rng>(weights: ArrayView1<f64>, rng: &mut R) -> usize {
    let total = weights.sum();
    let mut r = rng.gen::<f64>() * total;
    for (i, &w) in weights.iter().enumerate() {
        if r < w {
            return i;
        }
        r -= w;
    }
    // rounding left `r` past the last positive weight
    weights
        .iter()
        .rposition(|&w| w > 0.0)
        .unwrap_or(weights.len() - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hmm::mocks::{mock_cycle, mock_two_state};

    #[test]
    fn sample_is_seeded() {
        let m = mock_two_state();
        let h1 = m.sample(50, 0);
        let h2 = m.sample(50, 0);
        let h3 = m.sample(50, 1);
        println!("{}", h1);
        assert_eq!(h1, h2);
        assert_ne!(h1, h3);
        assert_eq!(h1.len(), 50);
        assert!(h1.emissions.iter().all(|&e| e < 3));
    }
    #[test]
    fn sample_deterministic_model() {
        let m = mock_cycle(4);
        let h = m.sample(9, 3);
        for w in h.emissions.windows(2) {
            assert_eq!(w[1], (w[0] + 1) % 4);
        }
        assert_eq!(h.states, h.emissions);
    }
}

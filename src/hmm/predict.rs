//!
//! Prediction of the next emission
//!
use super::model::HmmModel;
use crate::error::Result;
use ndarray::prelude::*;

///
/// Most probable next emission and its probability.
///
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub emission: usize,
    /// `P(next emission = emission | emissions so far)`, in `[0, 1]`
    pub confidence: f64,
}

impl HmmModel {
    ///
    /// Distribution of the emission following `emissions`,
    ///
    /// ```text
    /// p(e) = sum_j (sum_i b[i] trans[i, j]) emit[j, e]
    /// ```
    ///
    /// where `b` is the filtered state belief after the last emission.
    /// If there is no belief (empty or impossible emissions) this is the
    /// distribution of the first emission, `sum_i init[i] emit[i, e]`.
    ///
    pub fn next_emission_probs(&self, emissions: &[usize]) -> Result<Array1<f64>> {
        let forward = self.forward(emissions)?;
        let probs = match forward.last_belief() {
            Some(belief) => belief.dot(self.trans()).dot(self.emit()),
            None => self.first_emission_probs(),
        };
        Ok(probs)
    }
    ///
    /// Arg-max of `next_emission_probs`. Ties go to the lowest emission.
    ///
    pub fn predict_next(&self, emissions: &[usize]) -> Result<Prediction> {
        let probs = self.next_emission_probs(emissions)?;
        let (emission, confidence) = probs
            .iter()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |(e_max, p_max), (e, &p)| {
                if p > p_max {
                    (e, p)
                } else {
                    (e_max, p_max)
                }
            });
        Ok(Prediction {
            emission,
            confidence: confidence.clamp(0.0, 1.0),
        })
    }
}

//!
//! Baum-Welch training of a model on a single emission sequence
//!
use super::model::HmmModel;
use super::params::TrainParams;
use super::table::{BackwardResult, ForwardResult};
use crate::error::Result;
use crate::prob::{lp, Prob};
use log::debug;
use ndarray::prelude::*;

///
/// Output of `HmmModel::fit`
///
#[derive(Debug, Clone)]
pub struct FitResult {
    /// the fitted model
    pub model: HmmModel,
    /// log-likelihood of the initial model followed by that of every
    /// accepted re-estimation. Non-decreasing.
    pub log_likelihoods: Vec<f64>,
    /// number of re-estimations that were run (including a rejected last one)
    pub n_iter: usize,
    /// stopped by the tolerance or by a non-improving step, rather than by
    /// `max_iter`
    pub converged: bool,
}

impl FitResult {
    /// log-likelihood of the emissions under the fitted model
    pub fn log_likelihood(&self) -> f64 {
        self.log_likelihoods
            .last()
            .copied()
            .unwrap_or(f64::NEG_INFINITY)
    }
    pub fn likelihood(&self) -> Prob {
        lp(self.log_likelihood())
    }
}

impl HmmModel {
    ///
    /// Fit a new model to the emissions with Baum-Welch, starting from `self`.
    ///
    /// * sequences shorter than 2 carry no transition information, so `self`
    ///   is returned unchanged.
    /// * if the emissions are impossible under `self` there is nothing to
    ///   re-estimate from, and `self` is returned unchanged.
    /// * a re-estimation that does not improve the likelihood is dropped and
    ///   training stops there.
    ///
    /// Fails only with `DegenerateSequence` for out-of-alphabet emissions.
    ///
    pub fn fit(&self, emissions: &[usize], params: &TrainParams) -> Result<FitResult> {
        self.check_emissions(emissions)?;

        let mut model = self.clone();
        let mut forward = model.run_forward(emissions);
        let mut ll = forward.full_prob().to_log_value();
        let mut log_likelihoods = vec![ll];

        if emissions.len() < 2 || ll == f64::NEG_INFINITY {
            debug!(
                "fit skipped n_emissions={} ll={}",
                emissions.len(),
                ll
            );
            return Ok(FitResult {
                model,
                log_likelihoods,
                n_iter: 0,
                converged: emissions.len() < 2,
            });
        }

        let mut n_iter = 0;
        let mut converged = false;
        while n_iter < params.max_iter {
            n_iter += 1;
            let backward = model.run_backward(emissions, &forward);
            let next = model.reestimate(emissions, &forward, &backward);
            let next_forward = next.run_forward(emissions);
            let next_ll = next_forward.full_prob().to_log_value();
            debug!("fit iter={} ll={} next_ll={}", n_iter, ll, next_ll);

            // also rejects NaN
            if !(next_ll > ll) {
                converged = true;
                break;
            }
            let delta = next_ll - ll;
            model = next;
            forward = next_forward;
            ll = next_ll;
            log_likelihoods.push(ll);
            if delta < params.tolerance {
                converged = true;
                break;
            }
        }
        debug!(
            "fit done n_iter={} converged={} ll={}",
            n_iter, converged, ll
        );

        Ok(FitResult {
            model,
            log_likelihoods,
            n_iter,
            converged,
        })
    }
    ///
    /// One Baum-Welch re-estimation step.
    ///
    /// ```text
    /// init[i]     = gamma[0][i]
    /// trans[i, j] = sum_t xi[t][i, j] / sum_{t<n-1} gamma[t][i]
    /// emit[i, e]  = sum_{t: x[t]=e} gamma[t][i] / sum_t gamma[t][i]
    /// ```
    ///
    /// A row whose denominator is 0 keeps its previous value.
    ///
    pub(crate) fn reestimate(
        &self,
        emissions: &[usize],
        forward: &ForwardResult,
        backward: &BackwardResult,
    ) -> HmmModel {
        let freqs = self.to_freqs(emissions, forward, backward);

        let init = if freqs.first.sum() > 0.0 {
            freqs.first.clone()
        } else {
            self.init().clone()
        };
        let trans = divide_rows(&freqs.trans, &freqs.leaving, self.trans());
        let emit = divide_rows(&freqs.emit, &freqs.visits, self.emit());

        HmmModel::from_arrays(init, trans, emit)
    }
}

///
/// `numer[i, :] / denom[i]`, or `fallback[i, :]` where `denom[i]` is 0.
///
fn divide_rows(numer: &Array2<f64>, denom: &Array1<f64>, fallback: &Array2<f64>) -> Array2<f64> {
    let mut out = fallback.clone();
    for (i, mut row) in out.outer_iter_mut().enumerate() {
        if denom[i] > 0.0 {
            row.assign(&(&numer.row(i) / denom[i]));
        }
    }
    out
}

///
/// Fit a randomly initialized `n_states x n_emissions` model.
///
pub fn fit_from_seed(
    n_states: usize,
    n_emissions: usize,
    seed: u64,
    emissions: &[usize],
    params: &TrainParams,
) -> Result<FitResult> {
    HmmModel::random(n_states, n_emissions, seed)?.fit(emissions, params)
}

//!
//! Calculate hidden state/transition usage frequencies
//! from the result of Forward/Backward.
//!
//! - **State prob** `gamma[t][i]`
//!     P(state `i` at `t` | emissions)
//!
//! - **Transition prob** `xi[t][i, j]`
//!     P(state `i` at `t` and state `j` at `t+1` | emissions)
//!
//! Only the sums over `t` are kept, which is all the re-estimation needs.
//!
use super::model::HmmModel;
use super::table::{BackwardResult, ForwardResult};
use itertools::izip;
use ndarray::prelude::*;

/// Expected usage counts of hidden states, transitions and emissions.
#[derive(Debug, Clone)]
pub struct Freqs {
    /// `gamma[0][i]`
    pub first: Array1<f64>,
    /// `sum_{t < n-1} gamma[t][i]`, expected number of transitions out of `i`
    pub leaving: Array1<f64>,
    /// `sum_t gamma[t][i]`, expected number of visits to `i`
    pub visits: Array1<f64>,
    /// `sum_t xi[t][i, j]`
    pub trans: Array2<f64>,
    /// `sum_{t: x[t] = e} gamma[t][i]`
    pub emit: Array2<f64>,
}

impl HmmModel {
    ///
    /// Accumulate the expected counts for the emissions.
    ///
    /// A time step whose posterior cannot be normalized (the emissions are
    /// impossible under the model) contributes nothing.
    ///
    pub(crate) fn to_freqs(
        &self,
        emissions: &[usize],
        forward: &ForwardResult,
        backward: &BackwardResult,
    ) -> Freqs {
        let n_states = self.n_states();
        let mut freqs = Freqs {
            first: Array1::zeros(n_states),
            leaving: Array1::zeros(n_states),
            visits: Array1::zeros(n_states),
            trans: Array2::zeros((n_states, n_states)),
            emit: Array2::zeros((n_states, self.n_emissions())),
        };
        let n = emissions.len();

        for (t, (&emission, f, b)) in
            izip!(emissions, &forward.tables, &backward.tables).enumerate()
        {
            let gamma = match to_posterior(f * b) {
                Some(gamma) => gamma,
                None => continue,
            };
            if t == 0 {
                freqs.first.assign(&gamma);
            }
            if t + 1 < n {
                freqs.leaving += &gamma;
            }
            freqs.visits += &gamma;
            let mut column = freqs.emit.column_mut(emission);
            column += &gamma;
        }

        for t in 0..n.saturating_sub(1) {
            if let Some(xi) = self.xi(
                &forward.tables[t],
                &backward.tables[t + 1],
                emissions[t + 1],
            ) {
                freqs.trans += &xi;
            }
        }
        freqs
    }
    ///
    /// `xi[i, j] ∝ f_t[i] trans[i, j] emit[j, x[t+1]] b_t+1[j]`, normalized to
    /// sum to 1 over `(i, j)`.
    ///
    fn xi(&self, f: &Array1<f64>, b_next: &Array1<f64>, emission: usize) -> Option<Array2<f64>> {
        let to = &self.emit().column(emission) * b_next;
        let trans = self.trans();
        let xi = Array2::from_shape_fn(trans.dim(), |(i, j)| f[i] * trans[[i, j]] * to[j]);
        let total = xi.sum();
        if total > 0.0 && total.is_finite() {
            Some(xi / total)
        } else {
            None
        }
    }
}

fn to_posterior(x: Array1<f64>) -> Option<Array1<f64>> {
    let total = x.sum();
    if total > 0.0 && total.is_finite() {
        Some(x / total)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use crate::hmm::mocks::mock_two_state;

    #[test]
    fn freqs_are_consistent() {
        let m = mock_two_state();
        let xs = [0, 1, 2, 2, 0, 1, 1];
        let f = m.forward(&xs).unwrap();
        let b = m.run_backward(&xs, &f);
        let freqs = m.to_freqs(&xs, &f, &b);
        let n = xs.len() as f64;

        assert_abs_diff_eq!(freqs.first.sum(), 1.0, epsilon = 1e-10);
        assert_abs_diff_eq!(freqs.visits.sum(), n, epsilon = 1e-10);
        assert_abs_diff_eq!(freqs.leaving.sum(), n - 1.0, epsilon = 1e-10);
        assert_abs_diff_eq!(freqs.trans.sum(), n - 1.0, epsilon = 1e-10);
        assert_abs_diff_eq!(freqs.emit.sum(), n, epsilon = 1e-10);
        // transitions out of i are the visits of i except the last step
        for i in 0..m.n_states() {
            assert_abs_diff_eq!(freqs.trans.row(i).sum(), freqs.leaving[i], epsilon = 1e-10);
        }
        // emission counts per symbol equal the number of times it was emitted
        assert_abs_diff_eq!(freqs.emit.column(0).sum(), 2.0, epsilon = 1e-10);
        assert_abs_diff_eq!(freqs.emit.column(1).sum(), 3.0, epsilon = 1e-10);
        assert_abs_diff_eq!(freqs.emit.column(2).sum(), 2.0, epsilon = 1e-10);
    }
}

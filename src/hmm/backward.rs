//!
//! Backward algorithm definitions
//!
use super::model::HmmModel;
use super::table::{BackwardResult, ForwardResult};
use ndarray::prelude::*;

impl HmmModel {
    ///
    /// Run Backward algorithm to the emissions, reusing the scale factors of
    /// the forward run of the same emissions.
    ///
    /// `b_t[i]` = P(emits `x[t+1..n]` | state `i` at `t`), divided by
    /// `c[t+1] ... c[n-1]`.
    ///
    pub(crate) fn run_backward(&self, emissions: &[usize], forward: &ForwardResult) -> BackwardResult {
        let n = emissions.len();
        assert_eq!(forward.n_emissions(), n);
        if n == 0 {
            return BackwardResult { tables: Vec::new() };
        }
        let mut tables = Vec::with_capacity(n);
        let mut table = self.b_init();
        // feed the emissions backward
        for t in (0..n - 1).rev() {
            let prev = self.b_step(&table, emissions[t + 1], forward.scales[t + 1]);
            tables.push(std::mem::replace(&mut table, prev));
        }
        tables.push(table);
        // tables[t] corresponds to emissions[t]
        tables.reverse();
        BackwardResult { tables }
    }
    ///
    /// `b_n-1[i] = 1`
    ///
    fn b_init(&self) -> Array1<f64> {
        Array1::ones(self.n_states())
    }
    ///
    /// `b_t[i] = sum_j trans[i, j] emit[j, x[t+1]] b_t+1[j] / c[t+1]`
    ///
    fn b_step(&self, next: &Array1<f64>, emission: usize, scale: f64) -> Array1<f64> {
        let weighted = &self.emit().column(emission) * next;
        let table = self.trans().dot(&weighted);
        if scale > 0.0 {
            table / scale
        } else {
            Array1::zeros(self.n_states())
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::hmm::mocks::mock_two_state;

    #[test]
    fn forward_and_backward_are_consistent() {
        let m = mock_two_state();
        let xs = [0, 1, 2, 2, 0, 1];
        let f = m.forward(&xs).unwrap();
        let b = m.run_backward(&xs, &f);
        assert_eq!(b.n_emissions(), xs.len());
        // sum_i f_t[i] b_t[i] = 1 for every t under this scaling
        for t in 0..xs.len() {
            let s = (&f.tables[t] * &b.tables[t]).sum();
            assert_abs_diff_eq!(s, 1.0, epsilon = 1e-10);
        }
        // full prob from backward: sum_i init[i] emit[i, x0] b_0[i]
        let p0 = (m.init() * &m.emit().column(xs[0]) * &b.tables[0]).sum();
        let pb: f64 = p0.ln() + f.scales[1..].iter().map(|c| c.ln()).sum::<f64>();
        assert_relative_eq!(pb, f.full_prob().to_log_value(), max_relative = 1e-10);
    }
    #[test]
    fn backward_empty() {
        let m = mock_two_state();
        let f = m.forward(&[]).unwrap();
        assert_eq!(m.run_backward(&[], &f).n_emissions(), 0);
    }
}

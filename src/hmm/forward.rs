//!
//! Forward algorithm definitions
//!
use super::model::HmmModel;
use super::table::ForwardResult;
use crate::error::Result;
use crate::prob::Prob;
use ndarray::prelude::*;

impl HmmModel {
    ///
    /// Likelihood of the emissions `P(x[0..n] | model)`.
    ///
    /// The empty sequence has likelihood 1 (no evidence, no penalty).
    /// Fails with `DegenerateSequence` if an emission is out of the alphabet.
    ///
    pub fn forward_likelihood(&self, emissions: &[usize]) -> Result<Prob> {
        Ok(self.forward(emissions)?.full_prob())
    }
    ///
    /// Run Forward algorithm to the emissions
    ///
    /// `f_t[i]` = P(state `i` at `t` | emits `x[0..=t]`) with scale
    /// `c_t = P(x[t] | x[0..t])`.
    ///
    pub fn forward(&self, emissions: &[usize]) -> Result<ForwardResult> {
        self.check_emissions(emissions)?;
        Ok(self.run_forward(emissions))
    }
    ///
    /// Forward without the alphabet check.
    ///
    pub(crate) fn run_forward(&self, emissions: &[usize]) -> ForwardResult {
        let r0 = ForwardResult {
            tables: Vec::with_capacity(emissions.len()),
            scales: Vec::with_capacity(emissions.len()),
        };
        emissions.iter().fold(r0, |mut r, &emission| {
            let table = match r.tables.last() {
                None => self.f_init(emission),
                Some(prev) => self.f_step(prev, emission),
            };
            let (table, scale) = scale_table(table);
            r.tables.push(table);
            r.scales.push(scale);
            r
        })
    }
    ///
    /// `f~_0[i] = init[i] emit[i, x[0]]`
    ///
    fn f_init(&self, emission: usize) -> Array1<f64> {
        self.init() * &self.emit().column(emission)
    }
    ///
    /// `f~_t[j] = (sum_i f_t-1[i] trans[i, j]) emit[j, x[t]]`
    ///
    fn f_step(&self, prev: &Array1<f64>, emission: usize) -> Array1<f64> {
        prev.dot(self.trans()) * &self.emit().column(emission)
    }
}

///
/// Divide the table by its sum. A zero table stays zero with scale 0.
///
fn scale_table(mut table: Array1<f64>) -> (Array1<f64>, f64) {
    let scale = table.sum();
    if scale > 0.0 {
        table /= scale;
    }
    (table, scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HmmError;
    use crate::hmm::mocks::{brute_force_likelihood, mock_two_state};

    #[test]
    fn forward_empty_is_one() {
        let m = mock_two_state();
        assert_eq!(m.forward_likelihood(&[]).unwrap(), Prob::one());
        let m = HmmModel::random(6, 9, 3).unwrap();
        let l = m.forward_likelihood(&[]).unwrap();
        assert_eq!(l.cmp(&Prob::one()), std::cmp::Ordering::Equal);
        assert!(l.to_log_value().is_sign_positive());
    }
    #[test]
    fn forward_matches_brute_force() {
        let m = mock_two_state();
        for xs in [vec![0], vec![2, 1], vec![0, 1, 0, 2], vec![2, 2, 2, 0, 1]] {
            let p = m.forward_likelihood(&xs).unwrap();
            let q = brute_force_likelihood(&m, &xs);
            println!("{:?} p={} q={}", xs, p, q);
            assert_relative_eq!(p.to_value(), q, max_relative = 1e-10);
        }
    }
    #[test]
    fn forward_tables_are_beliefs() {
        let m = mock_two_state();
        let r = m.forward(&[0, 1, 2, 2, 0]).unwrap();
        assert_eq!(r.n_emissions(), 5);
        for table in r.tables.iter() {
            assert_abs_diff_eq!(table.sum(), 1.0, epsilon = 1e-12);
        }
        assert!(r.last_belief().is_some());
    }
    #[test]
    fn forward_long_sequence_does_not_underflow() {
        let m = HmmModel::uniform(6, 9).unwrap();
        let xs: Vec<usize> = (0..1000).map(|i| i % 9).collect();
        let p = m.forward_likelihood(&xs).unwrap();
        assert!(!p.is_zero());
        assert_relative_eq!(p.to_log_value(), 1000.0 * (1.0f64 / 9.0).ln(), max_relative = 1e-10);
    }
    #[test]
    fn forward_impossible_sequence_is_zero() {
        let m = HmmModel::from_params(
            vec![1.0, 0.0],
            vec![vec![1.0, 0.0], vec![0.0, 1.0]],
            vec![vec![1.0, 0.0], vec![0.0, 1.0]],
        )
        .unwrap();
        let r = m.forward(&[0, 0, 1, 0]).unwrap();
        assert!(r.full_prob().is_zero());
        assert!(r.last_belief().is_none());
        assert!(r.tables.iter().flatten().all(|x| !x.is_nan()));
    }
    #[test]
    fn forward_rejects_out_of_range() {
        let m = mock_two_state();
        assert!(matches!(
            m.forward_likelihood(&[0, 3]),
            Err(HmmError::DegenerateSequence { emission: 3, .. })
        ));
    }
}

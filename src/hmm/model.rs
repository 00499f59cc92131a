//!
//! Discrete HMM parameter bundle
//!
//! * `init[i]`: P(first state is `i`)
//! * `trans[i, j]`: P(next state is `j` | current state is `i`)
//! * `emit[i, e]`: P(emits `e` | in state `i`)
//!
use crate::error::{HmmError, Result};
use ndarray::prelude::*;
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

/// Allowed drift of a row sum from 1.
pub const ROW_SUM_TOLERANCE: f64 = 1e-6;

/// Relative amplitude of the noise added to uniform rows in `HmmModel::random`.
const PERTURBATION: f64 = 0.1;

///
/// Hidden Markov Model with `n_states` hidden states and `n_emissions`
/// discrete emission symbols.
///
/// A model is a value: training returns a new model instead of mutating the
/// input, so a model shared with a species pool never changes.
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HmmModel {
    n_states: usize,
    n_emissions: usize,
    init: Array1<f64>,
    trans: Array2<f64>,
    emit: Array2<f64>,
}

/// Constructors
impl HmmModel {
    ///
    /// Model whose every distribution is uniform.
    ///
    pub fn uniform(n_states: usize, n_emissions: usize) -> Result<Self> {
        check_dimension(n_states, n_emissions)?;
        Ok(HmmModel {
            n_states,
            n_emissions,
            init: Array1::from_elem(n_states, 1.0 / n_states as f64),
            trans: Array2::from_elem((n_states, n_states), 1.0 / n_states as f64),
            emit: Array2::from_elem((n_states, n_emissions), 1.0 / n_emissions as f64),
        })
    }
    ///
    /// Model whose distributions are uniform with a small random perturbation,
    /// so that Baum-Welch can break the symmetry between hidden states.
    ///
    /// The same seed always gives the same model.
    ///
    pub fn random(n_states: usize, n_emissions: usize, seed: u64) -> Result<Self> {
        let mut model = HmmModel::uniform(n_states, n_emissions)?;
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let mut perturb = |x: &mut f64| {
            let noise: f64 = rng.gen_range(-PERTURBATION..PERTURBATION);
            *x *= 1.0 + noise;
        };
        model.init.iter_mut().for_each(&mut perturb);
        model.trans.iter_mut().for_each(&mut perturb);
        model.emit.iter_mut().for_each(&mut perturb);
        model.normalize();
        Ok(model)
    }
    ///
    /// Model from explicit parameters.
    ///
    /// `trans` must be `n x n` and `emit` must be `n x m` where `n = init.len()`,
    /// and every distribution must sum to 1 within `ROW_SUM_TOLERANCE`.
    ///
    pub fn from_params(init: Vec<f64>, trans: Vec<Vec<f64>>, emit: Vec<Vec<f64>>) -> Result<Self> {
        let n_states = init.len();
        let n_emissions = emit.first().map_or(0, |row| row.len());
        check_dimension(n_states, n_emissions)?;
        if trans.len() != n_states || trans.iter().any(|row| row.len() != n_states) {
            return Err(HmmError::InvalidParameters(format!(
                "transition matrix must be {}x{}",
                n_states, n_states
            )));
        }
        if emit.len() != n_states || emit.iter().any(|row| row.len() != n_emissions) {
            return Err(HmmError::InvalidParameters(format!(
                "emission matrix must be {}x{}",
                n_states, n_emissions
            )));
        }
        let model = HmmModel {
            n_states,
            n_emissions,
            init: Array1::from(init),
            trans: to_array2(&trans, n_states),
            emit: to_array2(&emit, n_emissions),
        };
        model.validate()?;
        Ok(model)
    }
    ///
    /// Assemble a model from already shaped arrays and re-normalize it.
    ///
    pub(crate) fn from_arrays(init: Array1<f64>, trans: Array2<f64>, emit: Array2<f64>) -> Self {
        let mut model = HmmModel {
            n_states: init.len(),
            n_emissions: emit.ncols(),
            init,
            trans,
            emit,
        };
        model.normalize();
        model
    }
}

/// Accessors
impl HmmModel {
    pub fn n_states(&self) -> usize {
        self.n_states
    }
    pub fn n_emissions(&self) -> usize {
        self.n_emissions
    }
    /// Initial state distribution (length `n_states`)
    pub fn init(&self) -> &Array1<f64> {
        &self.init
    }
    /// State transition matrix (`n_states x n_states`, row-stochastic)
    pub fn trans(&self) -> &Array2<f64> {
        &self.trans
    }
    /// Emission matrix (`n_states x n_emissions`, row-stochastic)
    pub fn emit(&self) -> &Array2<f64> {
        &self.emit
    }
    ///
    /// Marginal distribution of the first emission,
    /// `p(e) = sum_i init[i] emit[i, e]`.
    ///
    pub fn first_emission_probs(&self) -> Array1<f64> {
        self.init.dot(&self.emit)
    }
}

/// Validation
impl HmmModel {
    ///
    /// Check the stochastic invariants: all entries are finite and
    /// non-negative, and `init` and every row of `trans`/`emit` sum to 1
    /// within `eps`.
    ///
    pub fn is_valid(&self, eps: f64) -> bool {
        let shape_ok = self.init.len() == self.n_states
            && self.trans.dim() == (self.n_states, self.n_states)
            && self.emit.dim() == (self.n_states, self.n_emissions);
        shape_ok
            && is_distribution(self.init.view(), eps)
            && self.trans.outer_iter().all(|row| is_distribution(row, eps))
            && self.emit.outer_iter().all(|row| is_distribution(row, eps))
    }
    ///
    /// `is_valid` with the default tolerance, as an error.
    ///
    pub fn validate(&self) -> Result<()> {
        check_dimension(self.n_states, self.n_emissions)?;
        if self.is_valid(ROW_SUM_TOLERANCE) {
            Ok(())
        } else {
            Err(HmmError::InvalidParameters(
                "distributions must be non-negative and sum to 1".to_string(),
            ))
        }
    }
    ///
    /// Check that every emission is in the alphabet `0..n_emissions`.
    ///
    pub fn check_emissions(&self, emissions: &[usize]) -> Result<()> {
        match emissions.iter().position(|&e| e >= self.n_emissions) {
            Some(position) => Err(HmmError::DegenerateSequence {
                emission: emissions[position],
                n_emissions: self.n_emissions,
                position,
            }),
            None => Ok(()),
        }
    }
    ///
    /// Re-normalize `init` and every row of `trans` and `emit`.
    ///
    /// Negative or non-finite entries are clamped to 0, and a row whose
    /// sum is 0 becomes uniform.
    ///
    pub(crate) fn normalize(&mut self) {
        normalize_row(self.init.view_mut());
        for row in self.trans.outer_iter_mut() {
            normalize_row(row);
        }
        for row in self.emit.outer_iter_mut() {
            normalize_row(row);
        }
    }
}

fn check_dimension(n_states: usize, n_emissions: usize) -> Result<()> {
    if n_states == 0 || n_emissions == 0 {
        Err(HmmError::InvalidDimension {
            n_states,
            n_emissions,
        })
    } else {
        Ok(())
    }
}

fn to_array2(rows: &[Vec<f64>], n_cols: usize) -> Array2<f64> {
    Array2::from_shape_fn((rows.len(), n_cols), |(i, j)| rows[i][j])
}

fn is_distribution(row: ArrayView1<f64>, eps: f64) -> bool {
    row.iter().all(|&x| x.is_finite() && x >= 0.0) && (row.sum() - 1.0).abs() <= eps
}

fn normalize_row(mut row: ArrayViewMut1<f64>) {
    row.mapv_inplace(|x| if x.is_finite() && x > 0.0 { x } else { 0.0 });
    let sum = row.sum();
    if sum > 0.0 {
        row /= sum;
    } else {
        let n = row.len() as f64;
        row.fill(1.0 / n);
    }
}

impl std::fmt::Display for HmmModel {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "n_states={} n_emissions={}", self.n_states, self.n_emissions)?;
        writeln!(f, "init\t{}", join(self.init.view()))?;
        for (i, row) in self.trans.outer_iter().enumerate() {
            writeln!(f, "trans[{}]\t{}", i, join(row))?;
        }
        for (i, row) in self.emit.outer_iter().enumerate() {
            writeln!(f, "emit[{}]\t{}", i, join(row))?;
        }
        Ok(())
    }
}

fn join(row: ArrayView1<f64>) -> String {
    row.iter()
        .map(|x| format!("{:.4}", x))
        .collect::<Vec<_>>()
        .join("\t")
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn uniform_model_is_valid() {
        let m = HmmModel::uniform(6, 9).unwrap();
        assert!(m.is_valid(1e-12));
        assert_eq!(m.n_states(), 6);
        assert_eq!(m.n_emissions(), 9);
        assert_abs_diff_eq!(m.trans()[[2, 3]], 1.0 / 6.0);
        assert_abs_diff_eq!(m.emit()[[5, 8]], 1.0 / 9.0);
    }
    #[test]
    fn random_model_is_valid_and_seeded() {
        let m0 = HmmModel::random(6, 9, 0).unwrap();
        let m0b = HmmModel::random(6, 9, 0).unwrap();
        let m1 = HmmModel::random(6, 9, 1).unwrap();
        assert!(m0.is_valid(1e-9));
        assert!(m1.is_valid(1e-9));
        assert_eq!(m0, m0b);
        assert_ne!(m0, m1);
        // still close to uniform
        for &x in m0.emit().iter() {
            assert!((x - 1.0 / 9.0).abs() < 0.05);
        }
    }
    #[test_case(0, 9 ; "no states")]
    #[test_case(6, 0 ; "no emissions")]
    #[test_case(0, 0 ; "nothing")]
    fn zero_dimension_is_rejected(n: usize, m: usize) {
        assert!(matches!(
            HmmModel::uniform(n, m),
            Err(HmmError::InvalidDimension { .. })
        ));
        assert!(matches!(
            HmmModel::random(n, m, 0),
            Err(HmmError::InvalidDimension { .. })
        ));
    }
    #[test]
    fn from_params_checks_shape_and_sums() {
        let ok = HmmModel::from_params(
            vec![0.6, 0.4],
            vec![vec![0.7, 0.3], vec![0.4, 0.6]],
            vec![vec![0.1, 0.4, 0.5], vec![0.7, 0.2, 0.1]],
        );
        assert!(ok.is_ok());
        let bad_sum = HmmModel::from_params(
            vec![0.6, 0.4],
            vec![vec![0.7, 0.4], vec![0.4, 0.6]],
            vec![vec![0.1, 0.4, 0.5], vec![0.7, 0.2, 0.1]],
        );
        assert!(matches!(bad_sum, Err(HmmError::InvalidParameters(_))));
        let bad_shape = HmmModel::from_params(
            vec![0.6, 0.4],
            vec![vec![1.0], vec![0.4, 0.6]],
            vec![vec![0.1, 0.4, 0.5], vec![0.7, 0.2, 0.1]],
        );
        assert!(matches!(bad_shape, Err(HmmError::InvalidParameters(_))));
        let empty = HmmModel::from_params(vec![], vec![], vec![]);
        assert!(matches!(empty, Err(HmmError::InvalidDimension { .. })));
    }
    #[test]
    fn check_emissions_reports_position() {
        let m = HmmModel::uniform(2, 3).unwrap();
        assert!(m.check_emissions(&[0, 1, 2, 0]).is_ok());
        assert!(m.check_emissions(&[]).is_ok());
        match m.check_emissions(&[0, 1, 3, 9]) {
            Err(HmmError::DegenerateSequence {
                emission, position, ..
            }) => {
                assert_eq!(emission, 3);
                assert_eq!(position, 2);
            }
            r => panic!("unexpected {:?}", r),
        }
    }
    #[test]
    fn normalize_fixes_zero_and_drifted_rows() {
        let mut m = HmmModel::uniform(2, 2).unwrap();
        m.trans.row_mut(0).fill(0.0);
        m.emit.row_mut(1).assign(&array![2.0, 6.0]);
        m.init.assign(&array![-1.0, 3.0]);
        m.normalize();
        assert!(m.is_valid(1e-12));
        assert_abs_diff_eq!(m.trans()[[0, 0]], 0.5);
        assert_abs_diff_eq!(m.emit()[[1, 1]], 0.75);
        assert_abs_diff_eq!(m.init()[0], 0.0);
    }
    #[test]
    fn json_round_trip() {
        let m = HmmModel::random(3, 4, 7).unwrap();
        let json = serde_json::to_string(&m).unwrap();
        let m2: HmmModel = serde_json::from_str(&json).unwrap();
        assert_eq!(m, m2);
        println!("{}", m);
    }
}

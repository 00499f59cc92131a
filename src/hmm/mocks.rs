//!
//! Mock HMMs for testing
//!
use super::model::HmmModel;
use itertools::Itertools;

///
/// Two hidden states and three emissions
///
/// ```text
/// init  = [0.6, 0.4]
/// trans = [[0.7, 0.3], [0.4, 0.6]]
/// emit  = [[0.1, 0.4, 0.5], [0.7, 0.2, 0.1]]
/// ```
///
pub fn mock_two_state() -> HmmModel {
    HmmModel::from_params(
        vec![0.6, 0.4],
        vec![vec![0.7, 0.3], vec![0.4, 0.6]],
        vec![vec![0.1, 0.4, 0.5], vec![0.7, 0.2, 0.1]],
    )
    .unwrap()
}

///
/// `n` states visited in a cycle `0 -> 1 -> ... -> n-1 -> 0`, where state
/// `i` always emits `i`. The first state is uniform.
///
pub fn mock_cycle(n: usize) -> HmmModel {
    let init = vec![1.0 / n as f64; n];
    let trans = (0..n)
        .map(|i| (0..n).map(|j| if j == (i + 1) % n { 1.0 } else { 0.0 }).collect())
        .collect();
    let emit = (0..n)
        .map(|i| (0..n).map(|j| if j == i { 1.0 } else { 0.0 }).collect())
        .collect();
    HmmModel::from_params(init, trans, emit).unwrap()
}

///
/// `P(emissions)` by summing over every hidden state path.
/// Exponential in the length; only for tiny inputs.
///
pub fn brute_force_likelihood(model: &HmmModel, emissions: &[usize]) -> f64 {
    if emissions.is_empty() {
        return 1.0;
    }
    (0..emissions.len())
        .map(|_| 0..model.n_states())
        .multi_cartesian_product()
        .map(|path| {
            path.iter()
                .zip(emissions.iter())
                .enumerate()
                .map(|(t, (&s, &e))| {
                    let p_state = if t == 0 {
                        model.init()[s]
                    } else {
                        model.trans()[[path[t - 1], s]]
                    };
                    p_state * model.emit()[[s, e]]
                })
                .product::<f64>()
        })
        .sum()
}

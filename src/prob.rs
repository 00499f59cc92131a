///
/// Log-space probability used for sequence likelihoods.
/// Addition is logaddexp.
///
use approx::AbsDiffEq;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::str::FromStr;

///
/// Wrapper of f64 that represents probability `0 <= p <= 1` by its logarithm.
///
/// Long emission sequences underflow `f64` quickly (`(1/9)^400 ~ 1e-382`), so
/// every likelihood that leaves the engine is a `Prob`.
///
#[derive(Clone, Copy, Debug, SerializeDisplay, DeserializeFromStr)]
pub struct Prob(f64);

///
/// short-hand of `Prob::from_prob`
///
pub fn p(p: f64) -> Prob {
    Prob::from_prob(p)
}

///
/// short-hand of `Prob::from_log_prob`
///
pub fn lp(lp: f64) -> Prob {
    Prob::from_log_prob(lp)
}

impl Prob {
    pub fn from_prob(value: f64) -> Prob {
        Prob::new(value.ln())
    }
    pub fn from_log_prob(log_value: f64) -> Prob {
        Prob::new(log_value)
    }
    /// `-0.0` is stored as `0.0` so that `p=1` has a single representation
    /// under `total_cmp`.
    fn new(log_value: f64) -> Prob {
        if log_value == 0.0 {
            Prob(0.0)
        } else {
            Prob(log_value)
        }
    }
    ///
    /// Get the probability (in `[0, 1]`)
    pub fn to_value(self) -> f64 {
        self.0.exp()
    }
    ///
    /// Get the log probability
    pub fn to_log_value(self) -> f64 {
        self.0
    }
    ///
    /// Is `p == 0` or not? (log p = -inf)
    ///
    pub fn is_zero(self) -> bool {
        self.0.is_infinite() && self.0.is_sign_negative()
    }
    ///
    /// Is `p == 1`? (log p = 0)
    ///
    pub fn is_one(self) -> bool {
        self.0 == 0.0
    }
    ///
    /// prob=0.0
    ///
    pub fn zero() -> Prob {
        Prob(f64::NEG_INFINITY)
    }
    ///
    /// prob=1.0
    ///
    pub fn one() -> Prob {
        Prob(0.0)
    }
    ///
    /// `p^(1/n)`, the per-emission (geometric mean) probability of a
    /// likelihood over `n` emissions. `n == 0` gives `p=1`.
    ///
    pub fn per_emission(self, n: usize) -> Prob {
        if n == 0 {
            Prob::one()
        } else {
            Prob::new(self.0 / n as f64)
        }
    }
}

impl std::fmt::Display for Prob {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}({:.4})", self.0, self.to_value())
    }
}

impl FromStr for Prob {
    type Err = std::num::ParseFloatError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // "-1.2(0.3012)" or a bare log value "-1.2"
        let front = match s.split_once('(') {
            Some((front, _)) => front,
            None => s,
        };
        front.trim().parse::<f64>().map(Prob::new)
    }
}

/// Addition of two probabilities `px + py` in log space
///
/// If `px > py`:
///
/// ```text
/// log(exp(x) + exp(y))
///  = x + log(1 + exp(y-x))
/// ```
impl std::ops::Add for Prob {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        let (x, y) = if self.0 >= other.0 {
            (self.0, other.0)
        } else {
            (other.0, self.0)
        };
        if y == f64::NEG_INFINITY {
            Prob::new(x)
        } else if x == y {
            Prob::new(x + 2f64.ln())
        } else {
            Prob::new(x + (y - x).exp().ln_1p())
        }
    }
}

/// Multiplication of two probabilities `px * py` in log space
impl std::ops::Mul for Prob {
    type Output = Self;
    fn mul(self, other: Self) -> Self {
        Prob::new(self.0 + other.0)
    }
}

impl std::iter::Product for Prob {
    fn product<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Prob::one(), |a, b| a * b)
    }
}
impl<'a> std::iter::Product<&'a Self> for Prob {
    fn product<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.fold(Prob::one(), |a, b| a * *b)
    }
}

/// for approx `assert_abs_diff_eq`
impl AbsDiffEq for Prob {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        f64::abs_diff_eq(&self.0, &other.0, epsilon)
    }
}

// Eq, PartialOrd and Ord all go through `total_cmp`, so `sort` and `max`
// agree with `<` and `==`.
impl PartialEq for Prob {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}
impl Eq for Prob {}
impl PartialOrd for Prob {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Prob {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prob_add_mul() {
        assert_eq!(p(0.0) + p(1.0), p(1.0));
        assert_eq!(p(0.0) * p(1.0), p(0.0));
        assert_abs_diff_eq!(p(0.3) + p(0.3), p(0.6), epsilon = 1e-12);
        assert_abs_diff_eq!(p(0.3) * p(0.3), p(0.09), epsilon = 1e-12);
        assert_abs_diff_eq!(p(0.5) + p(0.00001), p(0.50001), epsilon = 1e-12);
    }
    #[test]
    fn prob_product() {
        let xs: Vec<Prob> = vec![];
        let product: Prob = xs.iter().product();
        assert_eq!(product, p(1.0));
        assert!(product.to_log_value().is_sign_positive());

        let xs = vec![p(0.1), p(0.1), p(0.1)];
        let product: Prob = xs.iter().product();
        assert_relative_eq!(product.to_value(), 0.001, epsilon = 1e-12);
        let product: Prob = vec![p(0.5), p(0.0)].into_iter().product();
        assert!(product.is_zero());
    }
    #[test]
    fn prob_negative_zero_is_one() {
        use std::cmp::Ordering;
        let a = lp(0.0);
        let b = lp(-0.0);
        assert_eq!(a, b);
        assert_eq!(a.cmp(&b), Ordering::Equal);
        assert_eq!(a.partial_cmp(&b), Some(Ordering::Equal));
        assert!(b.is_one());
        assert_eq!(p(1.0) * lp(-0.0), Prob::one());
        assert_eq!(Prob::from_str("-0.0").unwrap().cmp(&Prob::one()), Ordering::Equal);
    }
    #[test]
    fn prob_sort_and_max() {
        let mut ps = vec![p(0.9), p(0.2), p(0.5), p(0.1), p(1.0), p(0.0)];
        ps.sort();
        assert_eq!(ps, vec![p(0.0), p(0.1), p(0.2), p(0.5), p(0.9), p(1.0)]);
        assert_eq!(*ps.iter().max().unwrap(), p(1.0));
        assert!(p(0.1) > p(0.09999));
        assert!(p(0.0) < p(0.01));
    }
    #[test]
    fn prob_underflow_is_representable() {
        // (1/9)^400 underflows f64 but not its log
        let x: Prob = std::iter::repeat(p(1.0 / 9.0)).take(400).product();
        assert!(!x.is_zero());
        assert_eq!(x.to_value(), 0.0);
        assert_relative_eq!(
            x.to_log_value(),
            400.0 * (1.0f64 / 9.0).ln(),
            max_relative = 1e-12
        );
    }
    #[test]
    fn prob_per_emission() {
        let x = p(0.5) * p(0.5) * p(0.5);
        assert_relative_eq!(x.per_emission(3).to_value(), 0.5, epsilon = 1e-12);
        assert_eq!(Prob::zero().per_emission(3), Prob::zero());
        assert_eq!(p(0.2).per_emission(0), Prob::one());
    }
    #[test]
    fn prob_serialize() {
        let p1 = Prob::one();
        let p05 = Prob::from_prob(0.5);
        let p0 = Prob::zero();
        assert_eq!(Prob::from_str(&p1.to_string()).unwrap(), p1);
        assert_eq!(Prob::from_str(&p05.to_string()).unwrap(), p05);
        assert_eq!(Prob::from_str(&p0.to_string()).unwrap(), p0);
        assert_eq!(Prob::from_str("-0.5").unwrap(), lp(-0.5));

        let f = |p: Prob| -> Prob {
            let json = serde_json::to_string(&p).unwrap();
            serde_json::from_str(&json).unwrap()
        };
        assert_eq!(p1, f(p1));
        assert_eq!(p05, f(p05));
        assert_eq!(p0, f(p0));
    }
}

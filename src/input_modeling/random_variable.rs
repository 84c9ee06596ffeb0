//! Random variables turn uniform numbers into draws from a target
//! distribution.  Every distribution here is an inverse transform (or, for
//! the normal distribution, a Box-Muller transform) of explicitly selected
//! uniforms, so a variable is fully reproducible from its parameters and
//! the positions of its uniforms.

use std::f64::consts::PI;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::calculation::CdfStep;
use crate::utils::errors::SimulationError;
use crate::utils::require_finite;

/// The Poisson inverse-CDF search is unbounded in theory.  For very large
/// rates `e^-lambda` underflows to zero and the cumulative probability
/// never grows, so the search stops here.
pub const MAX_POISSON_ITERATIONS: u64 = 10_000;

/// The binomial search walks the CDF one trial at a time, and traces keep
/// every step, so the number of trials is bounded.
pub const MAX_BINOMIAL_TRIALS: i64 = 100_000;

/// Geometric success probabilities are clamped into (0, 1) by this margin.
pub const GEOMETRIC_EPSILON: f64 = 1.0e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RandomVariable {
    /// Scaled by `lambda`: `x = lambda * -ln(1 - u)`, so the mean is `lambda`
    Exponential { lambda: f64 },
    Normal { mean: f64, std_dev: f64 },
    Poisson { lambda: f64 },
    /// Number of trials up to and including the first success
    Geometric { p: f64 },
    Binomial { n: i64, p: f64 },
}

/// The uniform numbers consumed by one transformation, already selected
/// from the uniform sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UniformDraws {
    Single(Vec<f64>),
    Paired(Vec<f64>, Vec<f64>),
}

impl UniformDraws {
    /// The number of draws a transformation will produce.
    pub fn len(&self) -> usize {
        match self {
            UniformDraws::Single(u) => u.len(),
            UniformDraws::Paired(u1, u2) => u1.len().min(u2.len()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn values(&self) -> Box<dyn Iterator<Item = &f64> + '_> {
        match self {
            UniformDraws::Single(u) => Box::new(u.iter()),
            UniformDraws::Paired(u1, u2) => Box::new(u1.iter().chain(u2.iter())),
        }
    }
}

/// The distribution and parameters actually applied to produce a set of
/// variates, after any clamping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariateMetadata {
    pub distribution: RandomVariable,
    pub parameters: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variates {
    pub values: Vec<f64>,
    pub metadata: VariateMetadata,
}

impl RandomVariable {
    /// A human-readable distribution name.
    pub fn name(&self) -> &'static str {
        match self {
            RandomVariable::Exponential { .. } => "Exponential",
            RandomVariable::Normal { .. } => "Normal",
            RandomVariable::Poisson { .. } => "Poisson",
            RandomVariable::Geometric { .. } => "Geometric",
            RandomVariable::Binomial { .. } => "Binomial",
        }
    }

    /// Whether the distribution consumes paired uniform selections.
    pub fn is_paired(&self) -> bool {
        matches!(self, RandomVariable::Normal { .. })
    }

    /// Validate the parameters, and apply the narrow clamping rules of the
    /// discrete distributions.  Out of domain parameters are otherwise
    /// rejected.
    pub fn normalized(&self) -> Result<RandomVariable, SimulationError> {
        match *self {
            RandomVariable::Exponential { lambda } => {
                if require_finite("lambda", lambda)? <= 0.0 {
                    return Err(SimulationError::invalid_parameter(
                        "lambda",
                        format!("expected lambda > 0, found {}", lambda),
                    ));
                }
                Ok(RandomVariable::Exponential { lambda })
            }
            RandomVariable::Normal { mean, std_dev } => {
                require_finite("mean", mean)?;
                if require_finite("std_dev", std_dev)? <= 0.0 {
                    return Err(SimulationError::invalid_parameter(
                        "std_dev",
                        format!("expected a standard deviation > 0, found {}", std_dev),
                    ));
                }
                Ok(RandomVariable::Normal { mean, std_dev })
            }
            RandomVariable::Poisson { lambda } => {
                let clamped = require_finite("lambda", lambda)?.max(0.0);
                if clamped != lambda {
                    warn!(lambda, clamped, "poisson rate clamped");
                }
                Ok(RandomVariable::Poisson { lambda: clamped })
            }
            RandomVariable::Geometric { p } => {
                let clamped = require_finite("p", p)?
                    .max(GEOMETRIC_EPSILON)
                    .min(1.0 - GEOMETRIC_EPSILON);
                if clamped != p {
                    warn!(p, clamped, "geometric probability clamped");
                }
                Ok(RandomVariable::Geometric { p: clamped })
            }
            RandomVariable::Binomial { n, p } => {
                if n < 0 {
                    return Err(SimulationError::invalid_parameter(
                        "n",
                        format!("expected a non-negative number of trials, found {}", n),
                    ));
                }
                if n > MAX_BINOMIAL_TRIALS {
                    return Err(SimulationError::invalid_parameter(
                        "n",
                        format!("expected at most {} trials, found {}", MAX_BINOMIAL_TRIALS, n),
                    ));
                }
                let clamped = require_finite("p", p)?.max(0.0).min(1.0);
                if clamped != p {
                    warn!(p, clamped, "binomial probability clamped");
                }
                Ok(RandomVariable::Binomial { n, p: clamped })
            }
        }
    }

    /// Normalize the parameters and check that the draws fit the
    /// distribution: the right shape, at least one value, equal pair
    /// lengths, and every uniform in [0, 1).
    pub(crate) fn prepare(&self, draws: &UniformDraws) -> Result<RandomVariable, SimulationError> {
        let variable = self.normalized()?;
        match (variable.is_paired(), draws) {
            (true, UniformDraws::Paired(u1, u2)) if u1.len() != u2.len() => {
                return Err(SimulationError::MismatchedPairing {
                    first: u1.len(),
                    second: u2.len(),
                });
            }
            (true, UniformDraws::Single(_)) => return Err(variable.selection_mismatch()),
            (false, UniformDraws::Paired(..)) => return Err(variable.selection_mismatch()),
            _ => {}
        }
        if draws.is_empty() {
            return Err(SimulationError::EmptySelection);
        }
        if let Some(u) = draws.values().find(|u| !(0.0..1.0).contains(*u)) {
            return Err(SimulationError::invalid_parameter(
                "u",
                format!("uniform values must lie in [0, 1), found {}", u),
            ));
        }
        Ok(variable)
    }

    /// Transform selected uniforms into variates, one per uniform (one per
    /// pair for the normal distribution).
    pub fn transform(&self, draws: &UniformDraws) -> Result<Variates, SimulationError> {
        let variable = self.prepare(draws)?;
        let values: Vec<f64> = match draws {
            UniformDraws::Single(u) => u
                .iter()
                .map(|u| variable.inverse_transform(*u))
                .collect::<Result<_, _>>()?,
            UniformDraws::Paired(u1, u2) => u1
                .iter()
                .zip(u2.iter())
                .map(|(u1, u2)| variable.pair_transform(*u1, *u2))
                .collect::<Result<_, _>>()?,
        };
        Ok(Variates {
            values,
            metadata: VariateMetadata {
                parameters: variable.to_string(),
                distribution: variable,
            },
        })
    }

    /// The generation of random variates drives stochastic behaviors
    /// outside of a fixed uniform sequence.  This function draws fresh
    /// uniforms from any random number generator (two for the normal
    /// distribution) and applies the same transforms.
    pub fn random_variate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<f64, SimulationError> {
        let variable = self.normalized()?;
        if variable.is_paired() {
            let u1: f64 = rng.gen();
            let u2: f64 = rng.gen();
            variable.pair_transform(u1, u2)
        } else {
            variable.inverse_transform(rng.gen())
        }
    }

    /// The error for draws of the wrong shape: paired draws for a
    /// single-selection distribution, or the reverse.
    pub(crate) fn selection_mismatch(&self) -> SimulationError {
        if self.is_paired() {
            SimulationError::invalid_parameter(
                "indices",
                format!("the {} distribution requires paired selections (U1, U2)", self.name()),
            )
        } else {
            SimulationError::invalid_parameter(
                "indices",
                format!("the {} distribution requires a single selection", self.name()),
            )
        }
    }

    /// Single-uniform transforms, for already normalized parameters.
    fn inverse_transform(&self, u: f64) -> Result<f64, SimulationError> {
        match *self {
            RandomVariable::Exponential { lambda } => Ok(exponential(u, lambda)),
            RandomVariable::Poisson { lambda } => Ok(poisson_search(u, lambda, |_| {}) as f64),
            RandomVariable::Geometric { p } => Ok(geometric(u, p)),
            RandomVariable::Binomial { n, p } => {
                Ok(binomial_search(u, n as u64, p, |_| {}) as f64)
            }
            RandomVariable::Normal { .. } => Err(self.selection_mismatch()),
        }
    }

    fn pair_transform(&self, u1: f64, u2: f64) -> Result<f64, SimulationError> {
        match *self {
            RandomVariable::Normal { mean, std_dev } => Ok(mean + std_dev * box_muller(u1, u2)),
            _ => Err(self.selection_mismatch()),
        }
    }
}

/// Parameter text, as shown next to a generated variable.
impl fmt::Display for RandomVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RandomVariable::Exponential { lambda } => write!(f, "λ={}", lambda),
            RandomVariable::Normal { mean, std_dev } => write!(f, "μ={}, σ={}", mean, std_dev),
            RandomVariable::Poisson { lambda } => write!(f, "λ={}", lambda),
            RandomVariable::Geometric { p } => write!(f, "p={}", p),
            RandomVariable::Binomial { n, p } => write!(f, "n={}, p={}", n, p),
        }
    }
}

pub(crate) fn exponential(u: f64, lambda: f64) -> f64 {
    lambda * -(1.0 - u).ln()
}

/// Standard normal value from the cosine branch of Box-Muller.  `1 - u1`
/// keeps the logarithm argument positive for `u1 = 0`.
pub(crate) fn box_muller(u1: f64, u2: f64) -> f64 {
    (-2.0 * (1.0 - u1).ln()).sqrt() * (2.0 * PI * u2).cos()
}

pub(crate) fn geometric(u: f64, p: f64) -> f64 {
    ((1.0 - u).ln() / (1.0 - p).ln()).ceil() + 0.0
}

/// Inverse-CDF search for the Poisson distribution, with the PMF recurrence
/// `P(k) = P(k - 1) * lambda / k`.  Each visited CDF step is reported to
/// `visit`, including the accepted one.
pub(crate) fn poisson_search(u: f64, lambda: f64, mut visit: impl FnMut(CdfStep)) -> u64 {
    let mut k = 0;
    let mut pmf = (-lambda).exp();
    let mut cdf = pmf;
    visit(CdfStep { k, pmf, cdf });
    while u > cdf {
        if k == MAX_POISSON_ITERATIONS {
            warn!(u, lambda, k, "poisson search reached its iteration cap");
            break;
        }
        k += 1;
        pmf *= lambda / k as f64;
        cdf += pmf;
        visit(CdfStep { k, pmf, cdf });
    }
    k
}

/// Inverse-CDF search for the binomial distribution, with the PMF
/// recurrence `P(k) = P(k - 1) * (n - k + 1) / k * p / q`.  The search is
/// bounded by `n`.  When `q^n` underflows to zero, the recurrence runs on
/// `ln P(k)` instead, starting from `n ln q`.
pub(crate) fn binomial_search(u: f64, n: u64, p: f64, mut visit: impl FnMut(CdfStep)) -> u64 {
    let q = 1.0 - p;
    let mut k = 0;
    let mut log_pmf = n as f64 * q.ln();
    let mut pmf = q.powf(n as f64);
    let log_space = pmf == 0.0 && q > 0.0;
    if log_space {
        warn!(n, p, "binomial pmf underflows, searching in log space");
    }
    let mut cdf = pmf;
    visit(CdfStep { k, pmf, cdf });
    while u > cdf && k < n {
        k += 1;
        pmf = if q == 0.0 {
            // All mass sits on k = n
            if k < n {
                0.0
            } else {
                1.0
            }
        } else if log_space {
            log_pmf += ((n - k + 1) as f64 / k as f64).ln() + (p / q).ln();
            log_pmf.exp()
        } else {
            pmf * (n - k + 1) as f64 / k as f64 * (p / q)
        };
        cdf += pmf;
        visit(CdfStep { k, pmf, cdf });
    }
    k
}

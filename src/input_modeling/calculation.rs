//! Calculation traces expose the intermediate values behind every variate,
//! so a learner can follow each transform by hand.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use super::random_variable::{
    binomial_search, box_muller, exponential, geometric, poisson_search, RandomVariable,
    UniformDraws,
};
use crate::utils::errors::SimulationError;

/// One step of an inverse-CDF search: the candidate value, its probability,
/// and the cumulative probability up to and including it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CdfStep {
    pub k: u64,
    pub pmf: f64,
    pub cdf: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CalculationStep {
    #[serde(rename_all = "camelCase")]
    Exponential {
        u: f64,
        one_minus_u: f64,
        neg_log: f64,
        x: f64,
    },
    #[serde(rename_all = "camelCase")]
    Normal {
        u1: f64,
        u2: f64,
        /// -2 ln(1 - u1)
        log_term: f64,
        sqrt_term: f64,
        /// 2 pi u2
        angle: f64,
        cosine: f64,
        z: f64,
        x: f64,
    },
    /// The search ends with the accepted step, whose `k` is the variate
    Poisson { u: f64, search: Vec<CdfStep>, x: f64 },
    #[serde(rename_all = "camelCase")]
    Geometric {
        u: f64,
        log_one_minus_u: f64,
        log_one_minus_p: f64,
        x: f64,
    },
    Binomial { u: f64, search: Vec<CdfStep>, x: f64 },
}

impl CalculationStep {
    /// The variate this step produced.
    pub fn value(&self) -> f64 {
        match self {
            CalculationStep::Exponential { x, .. }
            | CalculationStep::Normal { x, .. }
            | CalculationStep::Poisson { x, .. }
            | CalculationStep::Geometric { x, .. }
            | CalculationStep::Binomial { x, .. } => *x,
        }
    }
}

impl RandomVariable {
    /// Recompute every variate of `draws`, recording the intermediate values.
    /// The final values match `transform` exactly.
    pub fn trace(&self, draws: &UniformDraws) -> Result<Vec<CalculationStep>, SimulationError> {
        let variable = self.prepare(draws)?;
        let steps: Vec<CalculationStep> = match draws {
            UniformDraws::Paired(u1, u2) => u1
                .iter()
                .zip(u2.iter())
                .map(|(u1, u2)| variable.trace_pair(*u1, *u2))
                .collect::<Result<_, _>>()?,
            UniformDraws::Single(u) => u
                .iter()
                .map(|u| variable.trace_single(*u))
                .collect::<Result<_, _>>()?,
        };
        Ok(steps)
    }

    fn trace_single(&self, u: f64) -> Result<CalculationStep, SimulationError> {
        let step = match *self {
            RandomVariable::Exponential { lambda } => CalculationStep::Exponential {
                u,
                one_minus_u: 1.0 - u,
                neg_log: -(1.0 - u).ln(),
                x: exponential(u, lambda),
            },
            RandomVariable::Poisson { lambda } => {
                let mut search = Vec::new();
                let k = poisson_search(u, lambda, |step| search.push(step));
                CalculationStep::Poisson {
                    u,
                    search,
                    x: k as f64,
                }
            }
            RandomVariable::Geometric { p } => CalculationStep::Geometric {
                u,
                log_one_minus_u: (1.0 - u).ln(),
                log_one_minus_p: (1.0 - p).ln(),
                x: geometric(u, p),
            },
            RandomVariable::Binomial { n, p } => {
                let mut search = Vec::new();
                let k = binomial_search(u, n as u64, p, |step| search.push(step));
                CalculationStep::Binomial {
                    u,
                    search,
                    x: k as f64,
                }
            }
            RandomVariable::Normal { .. } => return Err(self.selection_mismatch()),
        };
        Ok(step)
    }

    fn trace_pair(&self, u1: f64, u2: f64) -> Result<CalculationStep, SimulationError> {
        match *self {
            RandomVariable::Normal { mean, std_dev } => {
                let log_term = -2.0 * (1.0 - u1).ln();
                let sqrt_term = log_term.sqrt();
                let angle = 2.0 * PI * u2;
                let cosine = angle.cos();
                let z = box_muller(u1, u2);
                Ok(CalculationStep::Normal {
                    u1,
                    u2,
                    log_term,
                    sqrt_term,
                    angle,
                    cosine,
                    z,
                    x: mean + std_dev * z,
                })
            }
            _ => Err(self.selection_mismatch()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_values_match_transform() {
        let cases = vec![
            (
                RandomVariable::Exponential { lambda: 1.5 },
                UniformDraws::Single(vec![0.1, 0.6, 0.95]),
            ),
            (
                RandomVariable::Normal {
                    mean: 5.0,
                    std_dev: 2.0,
                },
                UniformDraws::Paired(vec![0.2, 0.7], vec![0.9, 0.35]),
            ),
            (
                RandomVariable::Poisson { lambda: 3.0 },
                UniformDraws::Single(vec![0.05, 0.5, 0.99]),
            ),
            (
                RandomVariable::Geometric { p: 0.25 },
                UniformDraws::Single(vec![0.0, 0.4, 0.9]),
            ),
            (
                RandomVariable::Binomial { n: 6, p: 0.4 },
                UniformDraws::Single(vec![0.3, 0.8]),
            ),
        ];
        for (variable, draws) in cases {
            let values = variable.transform(&draws).unwrap().values;
            let traced: Vec<f64> = variable
                .trace(&draws)
                .unwrap()
                .iter()
                .map(CalculationStep::value)
                .collect();
            assert_eq!(values, traced);
        }
    }

    #[test]
    fn poisson_trace_records_every_search_step() {
        let steps = RandomVariable::Poisson { lambda: 2.0 }
            .trace(&UniformDraws::Single(vec![0.5]))
            .unwrap();
        match &steps[0] {
            CalculationStep::Poisson { search, x, .. } => {
                assert_eq!(*x, 2.0);
                let ks: Vec<u64> = search.iter().map(|step| step.k).collect();
                assert_eq!(ks, vec![0, 1, 2]);
                assert!(search[1].cdf < 0.5);
                assert!(search[2].cdf >= 0.5);
            }
            other => panic!("expected a Poisson step, found {:?}", other),
        }
    }

    #[test]
    fn binomial_trace_stops_at_n() {
        let steps = RandomVariable::Binomial { n: 2, p: 0.5 }
            .trace(&UniformDraws::Single(vec![0.99]))
            .unwrap();
        match &steps[0] {
            CalculationStep::Binomial { search, x, .. } => {
                assert_eq!(*x, 2.0);
                assert_eq!(search.len(), 3);
                assert!((search[2].cdf - 1.0).abs() < 1.0e-12);
            }
            other => panic!("expected a Binomial step, found {:?}", other),
        }
    }

    #[test]
    fn binomial_trace_with_many_trials_stops_near_the_median() {
        let steps = RandomVariable::Binomial { n: 1100, p: 0.5 }
            .trace(&UniformDraws::Single(vec![0.5]))
            .unwrap();
        match &steps[0] {
            CalculationStep::Binomial { search, x, .. } => {
                assert!((x - 550.0).abs() <= 1.0);
                assert_eq!(search.len(), *x as usize + 1);
                assert_eq!(search[0].pmf, 0.0);
                assert!(search.last().unwrap().cdf >= 0.5);
            }
            other => panic!("expected a Binomial step, found {:?}", other),
        }
    }

    #[test]
    fn normal_trace_exposes_box_muller_terms() {
        let steps = RandomVariable::Normal {
            mean: 0.0,
            std_dev: 1.0,
        }
        .trace(&UniformDraws::Paired(vec![0.5], vec![0.25]))
        .unwrap();
        match steps[0] {
            CalculationStep::Normal {
                log_term,
                angle,
                cosine,
                x,
                ..
            } => {
                assert!((log_term - 2.0 * 2f64.ln()).abs() < 1.0e-12);
                assert!((angle - PI / 2.0).abs() < 1.0e-12);
                assert!(cosine.abs() < 1.0e-12);
                assert!(x.abs() < 1.0e-12);
            }
            ref other => panic!("expected a Normal step, found {:?}", other),
        }
    }
}

use rand_core::{impls, Error, RngCore};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::utils::errors::SimulationError;

/// The two forms of the linear congruential recurrence.  The mixed form
/// adds an increment on every step, while the multiplicative form does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LcgVariant {
    Mixed,
    Multiplicative,
}

/// A full description of one generation call.  Every call restarts the
/// recurrence from `seed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LcgConfig {
    pub seed: i64,
    pub multiplier: i64,
    /// Required by the mixed variant, ignored by the multiplicative variant
    #[serde(default)]
    pub increment: Option<i64>,
    pub modulus: i64,
    pub count: i64,
    pub variant: LcgVariant,
}

impl LcgConfig {
    pub fn mixed(seed: i64, multiplier: i64, increment: i64, modulus: i64, count: i64) -> Self {
        Self {
            seed,
            multiplier,
            increment: Some(increment),
            modulus,
            count,
            variant: LcgVariant::Mixed,
        }
    }

    pub fn multiplicative(seed: i64, multiplier: i64, modulus: i64, count: i64) -> Self {
        Self {
            seed,
            multiplier,
            increment: None,
            modulus,
            count,
            variant: LcgVariant::Multiplicative,
        }
    }

    /// Build the generator state machine described by this configuration,
    /// positioned at the seed.
    pub fn rng(&self) -> Result<Lcg, SimulationError> {
        let increment = match self.variant {
            LcgVariant::Mixed => self.increment.ok_or_else(|| {
                SimulationError::invalid_parameter("c", "the mixed generator requires an increment")
            })?,
            LcgVariant::Multiplicative => 0,
        };
        Lcg::new(self.seed, self.multiplier, increment, self.modulus)
    }

    /// Produce `count` uniform numbers in [0, 1).
    pub fn generate(&self) -> Result<Vec<f64>, SimulationError> {
        if self.count <= 0 {
            return Err(SimulationError::invalid_parameter(
                "n",
                format!("expected a positive count, found {}", self.count),
            ));
        }
        let numbers: Vec<f64> = self.rng()?.take(self.count as usize).collect();
        debug!(
            seed = self.seed,
            modulus = self.modulus,
            count = numbers.len(),
            variant = ?self.variant,
            "generated uniform numbers"
        );
        Ok(numbers)
    }
}

/// Generate `n` uniform numbers with the linear congruential method.  See
/// `LcgConfig` for the structured form of the same call.
pub fn generate(
    x0: i64,
    a: i64,
    c: Option<i64>,
    m: i64,
    n: i64,
    variant: LcgVariant,
) -> Result<Vec<f64>, SimulationError> {
    LcgConfig {
        seed: x0,
        multiplier: a,
        increment: c,
        modulus: m,
        count: n,
        variant,
    }
    .generate()
}

/// `Lcg` is the running state of a linear congruential generator,
/// `x <- (a * x + c) mod m`.  Each step yields `x / m`.  Intermediate
/// products are computed in 128 bits, and the remainder is Euclidean, so
/// negative seeds and multipliers still produce states in [0, m).
///
/// Besides iterating over `f64` values, `Lcg` implements `RngCore`, so the
/// same sequence can drive any `rand` consumer.  The `u64` outputs are
/// `x / m` scaled onto the full `u64` range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lcg {
    state: i128,
    multiplier: i128,
    increment: i128,
    modulus: i128,
}

impl Lcg {
    pub fn new(seed: i64, multiplier: i64, increment: i64, modulus: i64) -> Result<Self, SimulationError> {
        if modulus <= 0 {
            return Err(SimulationError::invalid_parameter(
                "m",
                format!("expected a positive modulus, found {}", modulus),
            ));
        }
        Ok(Self {
            state: i128::from(seed),
            multiplier: i128::from(multiplier),
            increment: i128::from(increment),
            modulus: i128::from(modulus),
        })
    }

    fn advance(&mut self) -> i128 {
        self.state = (self.multiplier * self.state + self.increment).rem_euclid(self.modulus);
        self.state
    }

    /// Advance the recurrence one step and return the new uniform value.
    pub fn next_uniform(&mut self) -> f64 {
        self.advance() as f64 / self.modulus as f64
    }
}

impl Iterator for Lcg {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        Some(self.next_uniform())
    }
}

impl RngCore for Lcg {
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        let state = self.advance() as u128;
        ((state << 64) / self.modulus as u128) as u64
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        impls::fill_bytes_via_next(self, dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

//! The input modeling module provides the stochastic inputs of the
//! simulations.  The module includes a linear congruential generator of
//! uniform numbers, a range notation for selecting uniforms by position,
//! a set of inverse-transform random variables, and calculation traces
//! that expose each transform step by step.

pub mod calculation;
pub mod index_set;
pub mod random_variable;
pub mod uniform_rng;

pub use calculation::{CalculationStep, CdfStep};
pub use index_set::{IndexSelection, IndexSet};
pub use random_variable::{RandomVariable, UniformDraws, VariateMetadata, Variates};
pub use uniform_rng::{Lcg, LcgConfig, LcgVariant};

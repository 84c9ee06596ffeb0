//! # Overview
//! "Simlab" provides an educational simulation engine, for learning how
//! random numbers become simulation tables, one hand-checkable step at a
//! time.
//!
//! This repository contains:
//!
//! * Linear congruential generation of uniform numbers, in mixed and
//! multiplicative forms.
//! * A range notation ("1-5, 8, 10-12") for picking uniforms by position.
//! * Inverse-transform random variables (exponential, normal, Poisson,
//! geometric, binomial), with step-by-step calculation traces.
//! * Single-server queue and periodic-review inventory tables, built by
//! sequential recurrences over generated variables.
//! * A session object holding uniforms and named variables, with a
//! JS/WASM adapter for browser front-ends.
//!
//! Simlab is compatible with a wide variety of compilation targets,
//! including WASM. Simlab does not require nightly Rust.
pub mod input_modeling;
pub mod models;
pub mod simulator;
pub mod utils;

//! The utilies module provides general capabilities, that may span the
//! input modeling, models, and simulator modules.  The utilities are
//! centered around error reporting, debugging, and common arithmetic.

pub mod errors;

use errors::SimulationError;

/// Round a value to a fixed number of decimal places, for display.  Ties
/// round half to even, so `0.125` becomes `0.12`.  Recurrence state is
/// never passed through this function, only emitted values.
pub fn round_decimals(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    let scaled = value * factor;
    let mut nearest = scaled.round();
    if (nearest - scaled).abs() == 0.5 {
        nearest = 2.0 * (scaled / 2.0).round();
    }
    let rounded = nearest / factor;
    // Normalize negative zero, so "-0" is never rendered
    rounded + 0.0
}

/// Round a value to two decimal places, the precision of all simulation
/// tables.
pub fn round2(value: f64) -> f64 {
    round_decimals(value, 2)
}

/// Reject NaN and infinite parameters, which cannot be validated against a
/// numeric domain.
pub(crate) fn require_finite(parameter: &'static str, value: f64) -> Result<f64, SimulationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SimulationError::invalid_parameter(
            parameter,
            format!("expected a finite number, found {}", value),
        ))
    }
}

/// When the `console_error_panic_hook` feature is enabled, we can call the
/// `set_panic_hook` function at least once during initialization, and then
/// we will get better error messages if our code ever panics.
///
/// For more details see
/// <https://github.com/rustwasm/console_error_panic_hook#readme>
pub fn set_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_two_decimals() {
        assert![round2(1.234) == 1.23];
        assert![round2(1.235001) == 1.24];
        assert![round2(2.0) == 2.0];
        assert![round2(-0.001).to_string() == "0"];
    }

    #[test]
    fn ties_round_half_to_even() {
        assert![round2(0.125) == 0.12];
        assert![round2(0.375) == 0.38];
        assert![round2(-0.125) == -0.12];
        assert![round_decimals(2.5, 0) == 2.0];
        assert![round_decimals(3.5, 0) == 4.0];
    }

    #[test]
    fn rejects_non_finite_parameters() {
        assert!(require_finite("lambda", 2.5).is_ok());
        assert!(matches!(
            require_finite("lambda", f64::NAN),
            Err(SimulationError::InvalidParameter {
                parameter: "lambda",
                ..
            })
        ));
        assert!(require_finite("p", f64::INFINITY).is_err());
    }
}

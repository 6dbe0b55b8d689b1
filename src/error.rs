//! Error types for construction and parameter validation.
//!
//! Stepping an automaton never fails; only building one or changing its
//! parameters can be rejected.

use thiserror::Error;

/// Errors raised when constructing an automaton or changing its parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// A grid extent is below its minimum.
    #[error("invalid dimension: {name} must be at least {min}, got {value}")]
    InvalidDimension {
        name: &'static str,
        value: usize,
        min: usize,
    },

    /// A rule parameter is outside its valid range.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Check that a grid extent is at least `min`.
pub fn ensure_dimension(name: &'static str, value: usize, min: usize) -> Result<usize, SimError> {
    if value < min {
        return Err(SimError::InvalidDimension { name, value, min });
    }
    Ok(value)
}

/// Check that `value` is a probability in `[0, 1]`.
pub fn ensure_probability(name: &'static str, value: f64) -> Result<f64, SimError> {
    // NaN fails both comparisons, so test the accepted range positively
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(SimError::InvalidParameter {
            name,
            value: value.to_string(),
            reason: "must be between 0.0 and 1.0",
        })
    }
}

/// Check that a cycle length or duration is at least one tick.
pub fn ensure_positive(name: &'static str, value: u32) -> Result<u32, SimError> {
    if value < 1 {
        return Err(SimError::InvalidParameter {
            name,
            value: value.to_string(),
            reason: "must be at least 1",
        });
    }
    Ok(value)
}

/// Check that a vehicle velocity is within `[0, max]`.
pub fn ensure_velocity(value: u32, max: u32) -> Result<u32, SimError> {
    if value > max {
        return Err(SimError::InvalidParameter {
            name: "velocity",
            value: value.to_string(),
            reason: "exceeds the maximum velocity",
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_bounds() {
        assert_eq!(ensure_dimension("width", 1, 1), Ok(1));
        assert_eq!(
            ensure_dimension("length", 1, 2),
            Err(SimError::InvalidDimension {
                name: "length",
                value: 1,
                min: 2
            })
        );
    }

    #[test]
    fn test_probability_bounds() {
        assert!(ensure_probability("p", 0.0).is_ok());
        assert!(ensure_probability("p", 1.0).is_ok());
        assert!(ensure_probability("p", -0.01).is_err());
        assert!(ensure_probability("p", 1.5).is_err());
        assert!(ensure_probability("p", f64::NAN).is_err());
    }

    #[test]
    fn test_positive_and_velocity() {
        assert!(ensure_positive("cycle", 0).is_err());
        assert_eq!(ensure_positive("cycle", 3), Ok(3));
        assert!(ensure_velocity(6, 5).is_err());
        assert_eq!(ensure_velocity(5, 5), Ok(5));
    }

    #[test]
    fn test_error_message() {
        let err = ensure_probability("car_linger", 2.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid parameter: car_linger = 2 (must be between 0.0 and 1.0)"
        );
    }
}

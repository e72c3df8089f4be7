use thiserror::Error;

/// Errors raised by the field, motion and integration operations.
///
/// All of these are detected before any stepping begins. Numerical divergence
/// during a run is not an error and never shows up here.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LeniaError {
    /// A scalar input is outside its valid range.
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
    /// The particle set has no particles to aggregate over.
    #[error("particle set must contain at least one particle")]
    EmptyParticleSet,
}

impl LeniaError {
    pub fn invalid(name: &'static str, value: f64, reason: &'static str) -> Self {
        LeniaError::InvalidParameter { name, value, reason }
    }
}

/// Checks that `value` is finite.
pub fn ensure_finite(name: &'static str, value: f64) -> Result<(), LeniaError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(LeniaError::invalid(name, value, "must be finite"))
    }
}

/// Checks that `value` is finite and strictly positive.
pub fn ensure_positive(name: &'static str, value: f64) -> Result<(), LeniaError> {
    ensure_finite(name, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(LeniaError::invalid(name, value, "must be strictly positive"))
    }
}

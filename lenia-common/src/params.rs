use crate::error::{ensure_finite, ensure_positive, LeniaError};
use serde::{Deserialize, Serialize};

/// Shape parameters of the Particle Lenia fields. Immutable for a simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Centre of the attraction kernel (distance at which it peaks).
    pub mu_k: f64,
    /// Width of the attraction kernel.
    pub sigma_k: f64,
    /// Weight applied to the summed kernel.
    pub w_k: f64,
    /// Centre of the growth response.
    pub mu_g: f64,
    /// Width of the growth response.
    pub sigma_g: f64,
    /// Repulsion stiffness.
    pub c_rep: f64,
}

impl Params {
    pub fn new(mu_k: f64, sigma_k: f64, w_k: f64, mu_g: f64, sigma_g: f64, c_rep: f64) -> Self {
        Params { mu_k, sigma_k, w_k, mu_g, sigma_g, c_rep }
    }

    /// The reference "rotor" configuration.
    pub fn rotor() -> Self {
        Params::new(4.0, 1.0, 0.022, 0.6, 0.15, 1.0)
    }

    /// Checks that every scalar is finite and both widths are strictly positive.
    pub fn validate(&self) -> Result<(), LeniaError> {
        ensure_finite("mu_k", self.mu_k)?;
        ensure_positive("sigma_k", self.sigma_k)?;
        ensure_finite("w_k", self.w_k)?;
        ensure_finite("mu_g", self.mu_g)?;
        ensure_positive("sigma_g", self.sigma_g)?;
        ensure_finite("c_rep", self.c_rep)?;
        Ok(())
    }
}

impl Default for Params {
    fn default() -> Self {
        Params::rotor()
    }
}

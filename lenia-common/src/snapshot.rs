use serde::{Deserialize, Serialize};

/// A snapshot of the particle set and summary fields at a specific step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Number of Euler steps taken when the snapshot was recorded.
    pub step: usize,
    /// Simulation time (`step * dt`).
    pub time: f64,
    pub particle_count: u32,
    /// Mean of E evaluated at every particle's own position.
    pub mean_energy: f64,
    /// Mean of G evaluated at every particle's own position.
    pub mean_growth: f64,
    /// Mean of U evaluated at every particle's own position.
    pub mean_potential: f64,
    /// 1.2 times the largest absolute coordinate, the framing a renderer would use.
    pub extent: f64,
    /// False once any coordinate has become NaN or infinite.
    pub all_finite: bool,
    #[serde(skip_serializing_if = "Option::is_none")] // Don't write "positions": null
    pub positions: Option<Vec<(f64, f64)>>,
}

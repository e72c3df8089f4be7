pub mod config;
pub mod error;
pub mod params;
pub mod snapshot;
pub mod vecmath;

// Re-export key types for easier use by dependent crates
pub use config::{InitialConditions, LeniaConfig, OutputConfig, OutputFormat, TimingConfig};
pub use error::LeniaError;
pub use params::Params;
pub use snapshot::Snapshot;
pub use vecmath::Vec2;

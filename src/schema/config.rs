//! Configuration types for smoke simulation parameters.

use serde::{Deserialize, Serialize};

/// Smallest grid dimension that still leaves an interior inside the solid border.
pub const MIN_CELL_COUNT: usize = 3;

/// Top-level simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of cells along X, including the solid border.
    pub cell_count_x: usize,
    /// Number of cells along Y, including the solid border.
    pub cell_count_y: usize,
    /// Side length of one square cell in world units.
    pub cell_size: f32,
    /// Pressure solve and stepping parameters.
    #[serde(default)]
    pub solver: SolverConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            cell_count_x: 128,
            cell_count_y: 72,
            cell_size: 1.0,
            solver: SolverConfig::default(),
        }
    }
}

/// Tunables read by the solver every frame.
///
/// `sor` and `time_step_mul` are not validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Pressure relaxation sweeps per frame.
    pub iterations: usize,
    /// Successive over-relaxation factor (1.0 = no over-relaxation).
    pub sor: f32,
    /// Scales the nominal 1/60 s frame step.
    pub time_step_mul: f32,
    /// How each relaxation sweep reads neighbouring pressure.
    pub relaxation: RelaxationScheme,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            iterations: 40,
            sor: 1.7,
            time_step_mul: 1.0,
            relaxation: RelaxationScheme::GaussSeidel,
        }
    }
}

/// Read/write policy of a pressure relaxation sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelaxationScheme {
    /// Sweep in place (x-major, then y): later cells see values already
    /// updated earlier in the same sweep.
    #[default]
    GaussSeidel,
    /// Every cell in a sweep reads the previous sweep's snapshot.
    Jacobi,
}

impl SimulationConfig {
    /// Total number of cells.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cell_count_x * self.cell_count_y
    }

    /// Validate construction parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cell_count_x < MIN_CELL_COUNT || self.cell_count_y < MIN_CELL_COUNT {
            return Err(ConfigError::InvalidDimensions {
                x: self.cell_count_x,
                y: self.cell_count_y,
            });
        }
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(ConfigError::InvalidCellSize(self.cell_size));
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Grid must be at least 3x3 cells, got {x}x{y}")]
    InvalidDimensions { x: usize, y: usize },
    #[error("Cell size must be positive and finite, got {0}")]
    InvalidCellSize(f32),
}

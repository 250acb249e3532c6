//! Simulation state container.
//!
//! Owns every per-cell and per-face array. The solver stages mutate these
//! through crate-internal access; everything outside the crate goes through
//! read-only accessors or the [`FluidAccess`](super::FluidAccess) trait.

use crate::schema::{ConfigError, SimulationConfig};

use super::{Field2, GridLayout, Vec2};

/// Grid state: staggered velocities, cell pressure, dye and the solid mask.
///
/// Storage is `[y * width + x]` for every array.
#[derive(Clone, Debug)]
pub struct FluidState {
    pub(crate) layout: GridLayout,
    /// Horizontal velocity on vertical faces, `(cell_count_x + 1) x cell_count_y`.
    pub(crate) velocities_x: Field2,
    /// Vertical velocity on horizontal faces, `cell_count_x x (cell_count_y + 1)`.
    pub(crate) velocities_y: Field2,
    pub(crate) pressure: Field2,
    pub(crate) dye: Field2,
    pub(crate) solid: Field2<bool>,
}

impl FluidState {
    /// Create a zeroed grid with a solid border ring.
    ///
    /// # Panics
    /// If either count is below 3 or `cell_size` is not positive.
    pub fn new(cell_count_x: usize, cell_count_y: usize, cell_size: f32) -> Self {
        let layout = GridLayout::new(cell_count_x, cell_count_y, cell_size);
        let (fx_w, fx_h) = layout.faces_x_dims();
        let (fy_w, fy_h) = layout.faces_y_dims();

        Self {
            layout,
            velocities_x: Field2::new(fx_w, fx_h),
            velocities_y: Field2::new(fy_w, fy_h),
            pressure: Field2::new(cell_count_x, cell_count_y),
            dye: Field2::new(cell_count_x, cell_count_y),
            solid: Field2::from_fn(cell_count_x, cell_count_y, |x, y| layout.is_border(x, y)),
        }
    }

    /// Create from a validated configuration.
    pub fn from_config(config: &SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(
            config.cell_count_x,
            config.cell_count_y,
            config.cell_size,
        ))
    }

    #[inline]
    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    #[inline]
    pub fn cell_count_x(&self) -> usize {
        self.layout.cell_count_x()
    }

    #[inline]
    pub fn cell_count_y(&self) -> usize {
        self.layout.cell_count_y()
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.layout.cell_size()
    }

    pub fn velocities_x(&self) -> &Field2 {
        &self.velocities_x
    }

    pub fn velocities_y(&self) -> &Field2 {
        &self.velocities_y
    }

    pub fn pressure(&self) -> &Field2 {
        &self.pressure
    }

    pub fn dye(&self) -> &Field2 {
        &self.dye
    }

    pub fn solid_mask(&self) -> &Field2<bool> {
        &self.solid
    }

    /// Solid flag with the cell index clamped into the grid.
    #[inline]
    pub fn is_solid(&self, x: isize, y: isize) -> bool {
        self.solid.clamped(x, y)
    }

    /// Pressure with the cell index clamped into the grid.
    #[inline]
    pub fn pressure_clamped(&self, x: isize, y: isize) -> f32 {
        self.pressure.clamped(x, y)
    }

    /// Interpolated velocity at a world position.
    pub fn velocity_at(&self, pos: Vec2) -> Vec2 {
        let cell_size = self.layout.cell_size();
        Vec2::new(
            self.velocities_x.sample_bilinear(cell_size, pos),
            self.velocities_y.sample_bilinear(cell_size, pos),
        )
    }

    /// Net outflow rate of cell `(x, y)` from its four face velocities.
    ///
    /// # Panics
    /// If the cell is outside the grid.
    pub fn divergence_at(&self, x: usize, y: usize) -> f32 {
        let cell_size = self.layout.cell_size();
        let velocity_top = self.velocities_y.get(x, y + 1);
        let velocity_left = self.velocities_x.get(x, y);
        let velocity_right = self.velocities_x.get(x + 1, y);
        let velocity_bottom = self.velocities_y.get(x, y);

        let gradient_x = (velocity_right - velocity_left) / cell_size;
        let gradient_y = (velocity_top - velocity_bottom) / cell_size;
        gradient_x + gradient_y
    }

    /// Zero both velocity arrays and the pressure field. Dye is untouched.
    pub fn clear_velocities(&mut self) {
        self.velocities_x.fill(0.0);
        self.velocities_y.fill(0.0);
        self.pressure.fill(0.0);
    }

    /// Zero the dye field.
    pub fn clear_dye(&mut self) {
        self.dye.fill(0.0);
    }

    /// Total dye over all cells.
    pub fn total_dye(&self) -> f32 {
        self.dye.sum()
    }

    /// Iterator over non-solid cell coordinates.
    pub fn fluid_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.solid
            .iter_indexed()
            .filter(|&(_, _, solid)| !solid)
            .map(|(x, y, _)| (x, y))
    }
}

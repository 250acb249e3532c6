//! Pressure relaxation for incompressibility.
//!
//! Solves the discrete pressure Poisson equation on the cell grid with an
//! SOR-accelerated iterative sweep. Solid neighbours contribute nothing to
//! the stencil, which encodes the zero-flow wall condition.

use super::{Field2, FluidState};

/// Fluid density. The solver assumes a single constant-density fluid.
pub const DENSITY: f32 = 1.0;

/// Per-cell stencil data, rebuilt at the start of every pressure solve.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PressureSolveData {
    /// 1.0 when the neighbour in that direction is fluid, otherwise 0.0.
    pub flow_left: f32,
    pub flow_right: f32,
    pub flow_top: f32,
    pub flow_bottom: f32,
    /// Number of fluid neighbours (0..=4).
    pub flow_edge_count: u8,
    pub is_solid: bool,
    /// Net face outflow of the cell divided by the time step.
    pub velocity_term: f32,
}

impl PressureSolveData {
    /// Solid and fully enclosed cells are pinned to zero pressure.
    #[inline]
    pub fn is_pinned(&self) -> bool {
        self.is_solid || self.flow_edge_count == 0
    }
}

/// Compute stencil data for every cell from the current velocities.
pub fn prepare_pressure_solve(state: &FluidState, dt: f32, out: &mut Field2<PressureSolveData>) {
    assert_eq!(out.dims(), state.pressure.dims(), "solve data dimension mismatch");
    let flow = |x: isize, y: isize| if state.is_solid(x, y) { 0u8 } else { 1u8 };

    for y in 0..state.cell_count_y() {
        for x in 0..state.cell_count_x() {
            let (xi, yi) = (x as isize, y as isize);
            let flow_top = flow(xi, yi + 1);
            let flow_left = flow(xi - 1, yi);
            let flow_right = flow(xi + 1, yi);
            let flow_bottom = flow(xi, yi - 1);

            let velocity_top = state.velocities_y.get(x, y + 1);
            let velocity_left = state.velocities_x.get(x, y);
            let velocity_right = state.velocities_x.get(x + 1, y);
            let velocity_bottom = state.velocities_y.get(x, y);

            out.set(
                x,
                y,
                PressureSolveData {
                    flow_left: flow_left as f32,
                    flow_right: flow_right as f32,
                    flow_top: flow_top as f32,
                    flow_bottom: flow_bottom as f32,
                    flow_edge_count: flow_left + flow_right + flow_top + flow_bottom,
                    is_solid: state.is_solid(xi, yi),
                    velocity_term: (velocity_right - velocity_left + velocity_top
                        - velocity_bottom)
                        / dt,
                },
            );
        }
    }
}

/// Target pressure of one cell given neighbour values in `read`.
#[inline]
fn relaxed_pressure(read: &Field2, x: usize, y: usize, info: &PressureSolveData, cell_size: f32) -> f32 {
    if info.is_pinned() {
        return 0.0;
    }
    let (xi, yi) = (x as isize, y as isize);
    let pressure_top = read.clamped(xi, yi + 1) * info.flow_top;
    let pressure_left = read.clamped(xi - 1, yi) * info.flow_left;
    let pressure_right = read.clamped(xi + 1, yi) * info.flow_right;
    let pressure_bottom = read.clamped(xi, yi - 1) * info.flow_bottom;

    let pressure_sum = pressure_right + pressure_left + pressure_top + pressure_bottom;
    (pressure_sum - DENSITY * cell_size * info.velocity_term) / info.flow_edge_count as f32
}

/// One in-place sweep, x-major then y.
///
/// Cells later in the sweep read neighbours already updated by this sweep.
pub fn relax_gauss_seidel(
    pressure: &mut Field2,
    data: &Field2<PressureSolveData>,
    cell_size: f32,
    sor: f32,
) {
    for x in 0..pressure.width() {
        for y in 0..pressure.height() {
            let new_pressure = relaxed_pressure(pressure, x, y, &data.get(x, y), cell_size);
            let old_pressure = pressure.get(x, y);
            pressure.set(x, y, old_pressure + (new_pressure - old_pressure) * sor);
        }
    }
}

/// One sweep where every cell reads the previous sweep's values.
///
/// `snapshot` is scratch space with the same dimensions as `pressure`.
pub fn relax_jacobi(
    pressure: &mut Field2,
    snapshot: &mut Field2,
    data: &Field2<PressureSolveData>,
    cell_size: f32,
    sor: f32,
) {
    snapshot.copy_from(pressure);
    for y in 0..pressure.height() {
        for x in 0..pressure.width() {
            let new_pressure = relaxed_pressure(snapshot, x, y, &data.get(x, y), cell_size);
            let old_pressure = snapshot.get(x, y);
            pressure.set(x, y, old_pressure + (new_pressure - old_pressure) * sor);
        }
    }
}

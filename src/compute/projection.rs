//! Velocity projection: subtract the pressure gradient from face velocities.

use super::{DENSITY, FluidState};

/// Apply `v -= dt / (density * dx) * grad(p)` on every face between two fluid
/// cells. Faces touching a solid cell keep their current value.
pub fn update_velocities(state: &mut FluidState, dt: f32) {
    let k = dt / (DENSITY * state.cell_size());
    let FluidState {
        velocities_x,
        velocities_y,
        pressure,
        solid,
        ..
    } = state;

    for y in 0..velocities_x.height() {
        for x in 0..velocities_x.width() {
            let (xi, yi) = (x as isize, y as isize);
            if solid.clamped(xi, yi) || solid.clamped(xi - 1, yi) {
                continue;
            }
            let pressure_right = pressure.clamped(xi, yi);
            let pressure_left = pressure.clamped(xi - 1, yi);
            *velocities_x.get_mut(x, y) -= k * (pressure_right - pressure_left);
        }
    }

    for y in 0..velocities_y.height() {
        for x in 0..velocities_y.width() {
            let (xi, yi) = (x as isize, y as isize);
            if solid.clamped(xi, yi) || solid.clamped(xi, yi - 1) {
                continue;
            }
            let pressure_top = pressure.clamped(xi, yi);
            let pressure_bottom = pressure.clamped(xi, yi - 1);
            *velocities_y.get_mut(x, y) -= k * (pressure_top - pressure_bottom);
        }
    }
}

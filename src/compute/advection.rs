//! Semi-Lagrangian advection of velocity and dye.
//!
//! Each sample point is traced backward through the current velocity field
//! by one time step and the transported quantity is resampled there. Results
//! are written to scratch buffers which are then swapped in, so every sample
//! reads the field as it was at the start of the pass.

use super::{Field2, FluidState};

/// Self-advect both velocity components.
///
/// `temp_x` / `temp_y` must match the face array dimensions; on return they
/// hold the previous velocities.
pub fn advect_velocity(state: &mut FluidState, temp_x: &mut Field2, temp_y: &mut Field2, dt: f32) {
    assert_eq!(temp_x.dims(), state.velocities_x.dims(), "scratch dimension mismatch");
    assert_eq!(temp_y.dims(), state.velocities_y.dims(), "scratch dimension mismatch");
    let layout = state.layout;

    for y in 0..temp_x.height() {
        for x in 0..temp_x.width() {
            let (xi, yi) = (x as isize, y as isize);
            if state.is_solid(xi - 1, yi) || state.is_solid(xi, yi) {
                temp_x.set(x, y, state.velocities_x.get(x, y));
                continue;
            }
            let pos = layout.left_edge_center(x, y);
            let pos_prev = pos - state.velocity_at(pos) * dt;
            temp_x.set(x, y, state.velocity_at(pos_prev).x);
        }
    }

    for y in 0..temp_y.height() {
        for x in 0..temp_y.width() {
            let (xi, yi) = (x as isize, y as isize);
            if state.is_solid(xi, yi - 1) || state.is_solid(xi, yi) {
                temp_y.set(x, y, state.velocities_y.get(x, y));
                continue;
            }
            let pos = layout.bottom_edge_center(x, y);
            let pos_prev = pos - state.velocity_at(pos) * dt;
            temp_y.set(x, y, state.velocity_at(pos_prev).y);
        }
    }

    std::mem::swap(&mut state.velocities_x, temp_x);
    std::mem::swap(&mut state.velocities_y, temp_y);
}

/// Advect the dye field through the current velocities.
///
/// A cell is left unchanged when it, or its left-hand neighbour, is solid.
/// Only the left neighbour is checked: cells just above a solid cell are
/// still advected.
pub fn advect_dye(state: &mut FluidState, temp: &mut Field2, dt: f32) {
    assert_eq!(temp.dims(), state.dye.dims(), "scratch dimension mismatch");
    let layout = state.layout;
    let cell_size = layout.cell_size();

    for y in 0..temp.height() {
        for x in 0..temp.width() {
            let (xi, yi) = (x as isize, y as isize);
            if state.is_solid(xi - 1, yi) || state.is_solid(xi, yi) {
                temp.set(x, y, state.dye.get(x, y));
                continue;
            }
            let pos = layout.cell_center(x, y);
            let pos_prev = pos - state.velocity_at(pos) * dt;
            temp.set(x, y, state.dye.sample_bilinear(cell_size, pos_prev));
        }
    }

    std::mem::swap(&mut state.dye, temp);
}

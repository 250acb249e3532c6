//! Narrow read/perturb interface for code outside the solver.
//!
//! Renderers, input handlers and scene setup only ever see a
//! [`FluidAccess`]: they can sample fields and write localized deltas, but
//! cannot resize arrays or clear the solid border.

use crate::schema::ObstacleShape;

use super::{FluidState, GridLayout, Vec2};

/// Velocity component selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Rejected localized writes.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridError {
    #[error("index ({x}, {y}) is outside the {width}x{height} array")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
    #[error("cell ({x}, {y}) is on the domain border and must stay solid")]
    BorderCell { x: usize, y: usize },
}

/// Capability handed to external collaborators.
pub trait FluidAccess {
    fn layout(&self) -> &GridLayout;

    fn velocity_at(&self, pos: Vec2) -> Vec2;

    fn dye_at(&self, x: usize, y: usize) -> Result<f32, GridError>;

    fn pressure_at(&self, x: usize, y: usize) -> Result<f32, GridError>;

    fn divergence_at(&self, x: usize, y: usize) -> Result<f32, GridError>;

    fn is_solid(&self, x: usize, y: usize) -> Result<bool, GridError>;

    /// Add `delta` to face `(x, y)` of the chosen velocity array.
    fn add_velocity(&mut self, axis: Axis, x: usize, y: usize, delta: f32) -> Result<(), GridError>;

    fn set_velocity(&mut self, axis: Axis, x: usize, y: usize, value: f32) -> Result<(), GridError>;

    fn set_dye(&mut self, x: usize, y: usize, value: f32) -> Result<(), GridError>;

    fn add_dye(&mut self, x: usize, y: usize, delta: f32) -> Result<(), GridError>;

    /// Mark or clear an obstacle cell. Border cells cannot be cleared.
    fn set_solid(&mut self, x: usize, y: usize, solid: bool) -> Result<(), GridError>;
}

fn check_bounds(dims: (usize, usize), x: usize, y: usize) -> Result<(), GridError> {
    let (width, height) = dims;
    if x < width && y < height {
        Ok(())
    } else {
        Err(GridError::OutOfBounds {
            x,
            y,
            width,
            height,
        })
    }
}

impl FluidState {
    fn velocity_field_mut(&mut self, axis: Axis) -> &mut super::Field2 {
        match axis {
            Axis::X => &mut self.velocities_x,
            Axis::Y => &mut self.velocities_y,
        }
    }
}

impl FluidAccess for FluidState {
    fn layout(&self) -> &GridLayout {
        &self.layout
    }

    fn velocity_at(&self, pos: Vec2) -> Vec2 {
        FluidState::velocity_at(self, pos)
    }

    fn dye_at(&self, x: usize, y: usize) -> Result<f32, GridError> {
        check_bounds(self.dye.dims(), x, y)?;
        Ok(self.dye.get(x, y))
    }

    fn pressure_at(&self, x: usize, y: usize) -> Result<f32, GridError> {
        check_bounds(self.pressure.dims(), x, y)?;
        Ok(self.pressure.get(x, y))
    }

    fn divergence_at(&self, x: usize, y: usize) -> Result<f32, GridError> {
        check_bounds(self.pressure.dims(), x, y)?;
        Ok(FluidState::divergence_at(self, x, y))
    }

    fn is_solid(&self, x: usize, y: usize) -> Result<bool, GridError> {
        check_bounds(self.solid.dims(), x, y)?;
        Ok(self.solid.get(x, y))
    }

    fn add_velocity(&mut self, axis: Axis, x: usize, y: usize, delta: f32) -> Result<(), GridError> {
        let field = self.velocity_field_mut(axis);
        check_bounds(field.dims(), x, y)?;
        *field.get_mut(x, y) += delta;
        Ok(())
    }

    fn set_velocity(&mut self, axis: Axis, x: usize, y: usize, value: f32) -> Result<(), GridError> {
        let field = self.velocity_field_mut(axis);
        check_bounds(field.dims(), x, y)?;
        field.set(x, y, value);
        Ok(())
    }

    fn set_dye(&mut self, x: usize, y: usize, value: f32) -> Result<(), GridError> {
        check_bounds(self.dye.dims(), x, y)?;
        self.dye.set(x, y, value);
        Ok(())
    }

    fn add_dye(&mut self, x: usize, y: usize, delta: f32) -> Result<(), GridError> {
        check_bounds(self.dye.dims(), x, y)?;
        *self.dye.get_mut(x, y) += delta;
        Ok(())
    }

    fn set_solid(&mut self, x: usize, y: usize, solid: bool) -> Result<(), GridError> {
        check_bounds(self.solid.dims(), x, y)?;
        if !solid && self.layout.is_border(x, y) {
            return Err(GridError::BorderCell { x, y });
        }
        self.solid.set(x, y, solid);
        Ok(())
    }
}

/// Radial falloff used by both brushes: 1 at the centre, 0 at `radius`.
#[inline]
fn brush_weight(cell_pos: Vec2, centre: Vec2, radius: f32) -> f32 {
    1.0 - ((cell_pos - centre).length_squared() / (radius * radius)).clamp(0.0, 1.0)
}

/// In-grid cells of the square `half` cells around the cell nearest `pos`.
///
/// The footprint is clipped to the grid before iterating, so far-off
/// positions and huge radii cost at most one pass over the grid.
fn cells_around(layout: &GridLayout, pos: Vec2, half: i64) -> impl Iterator<Item = (usize, usize)> {
    let (cx, cy) = layout.cell_coord_from_pos(pos);
    let span = |centre: i32, count: usize| {
        let lo = i64::from(centre).saturating_sub(half).max(0);
        let hi = i64::from(centre).saturating_add(half).min(count as i64 - 1);
        if lo > hi { 0..0 } else { lo as usize..hi as usize + 1 }
    };
    let xs = span(cx, layout.cell_count_x());
    let ys = span(cy, layout.cell_count_y());
    ys.flat_map(move |y| xs.clone().map(move |x| (x, y)))
}

/// Drags fluid along with a moving pointer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VelocityBrush {
    pub radius: f32,
    pub strength: f32,
}

impl VelocityBrush {
    /// Push velocity `delta * strength` into faces near `pos`, fading to zero
    /// at the brush radius. Returns the number of cells touched.
    pub fn apply(&self, grid: &mut impl FluidAccess, pos: Vec2, delta: Vec2) -> usize {
        if self.radius <= 0.0 {
            return 0;
        }
        let layout = *grid.layout();
        let half = (self.radius / layout.cell_size() * 0.5).ceil() as i64;
        let mut touched = 0;

        for (x, y) in cells_around(&layout, pos, half) {
            let weight = brush_weight(layout.cell_center(x, y), pos, self.radius);
            // Cells come from the cell grid, so both face arrays contain (x, y).
            let applied = grid
                .add_velocity(Axis::X, x, y, delta.x * weight * self.strength)
                .and_then(|_| grid.add_velocity(Axis::Y, x, y, delta.y * weight * self.strength));
            if applied.is_ok() {
                touched += 1;
            }
        }
        touched
    }
}

/// Deposits dye around a point, never lowering existing dye.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DyeBrush {
    pub radius: f32,
}

impl DyeBrush {
    /// Returns the number of cells whose dye was raised.
    pub fn apply(&self, grid: &mut impl FluidAccess, pos: Vec2) -> usize {
        if self.radius <= 0.0 {
            return 0;
        }
        let layout = *grid.layout();
        let half = ((self.radius / layout.cell_size() * 0.5).ceil() as i64).saturating_mul(2);
        let mut raised = 0;

        for (x, y) in cells_around(&layout, pos, half) {
            if grid.is_solid(x, y).unwrap_or(true) {
                continue;
            }
            let weight = brush_weight(layout.cell_center(x, y), pos, self.radius);
            let amount = weight.powf(0.25);
            let Ok(current) = grid.dye_at(x, y) else {
                continue;
            };
            if amount > current && grid.set_dye(x, y, amount).is_ok() {
                raised += 1;
            }
        }
        raised
    }
}

/// Mark every interior cell whose centre lies inside `shape` as solid.
/// Returns the number of cells marked.
pub fn stamp_obstacle(grid: &mut impl FluidAccess, shape: &ObstacleShape) -> usize {
    let layout = *grid.layout();
    let mut marked = 0;
    for y in 1..layout.cell_count_y() - 1 {
        for x in 1..layout.cell_count_x() - 1 {
            if shape.contains(layout.cell_center(x, y)) && grid.set_solid(x, y, true).is_ok() {
                marked += 1;
            }
        }
    }
    log::debug!("stamped obstacle {shape:?} over {marked} cells");
    marked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_border_cannot_be_cleared() {
        let mut state = FluidState::new(6, 6, 1.0);
        assert_eq!(
            state.set_solid(0, 3, false),
            Err(GridError::BorderCell { x: 0, y: 3 })
        );
        assert!(state.set_solid(0, 3, true).is_ok());
        assert!(state.set_solid(2, 3, true).is_ok());
        assert!(FluidAccess::is_solid(&state, 2, 3).unwrap());
        assert!(state.set_solid(2, 3, false).is_ok());
        assert!(!FluidAccess::is_solid(&state, 2, 3).unwrap());
    }

    #[test]
    fn test_out_of_bounds_writes_rejected() {
        let mut state = FluidState::new(4, 5, 1.0);
        // The x-face array has one extra column.
        assert!(state.add_velocity(Axis::X, 4, 4, 1.0).is_ok());
        assert!(matches!(
            state.add_velocity(Axis::X, 5, 0, 1.0),
            Err(GridError::OutOfBounds { width: 5, height: 5, .. })
        ));
        // The y-face array has one extra row.
        assert!(state.set_velocity(Axis::Y, 3, 5, 1.0).is_ok());
        assert!(state.set_velocity(Axis::Y, 3, 6, 1.0).is_err());
        assert!(state.set_dye(4, 0, 1.0).is_err());
        assert!(state.dye_at(0, 5).is_err());
    }

    #[test]
    fn test_writes_are_not_value_checked() {
        let mut state = FluidState::new(4, 4, 1.0);
        assert!(state.set_velocity(Axis::X, 2, 2, f32::MAX).is_ok());
        assert!(state.add_dye(1, 1, -3.0).is_ok());
        assert_eq!(state.dye_at(1, 1), Ok(-3.0));
    }

    #[test]
    fn test_velocity_brush_pushes_along_delta() {
        let mut state = FluidState::new(16, 16, 1.0);
        let brush = VelocityBrush {
            radius: 2.0,
            strength: 2.0,
        };
        let centre = state.layout().cell_center(8, 8);
        let touched = brush.apply(&mut state, centre, Vec2::new(1.0, 0.0));
        assert_eq!(touched, 9);
        // Full weight at the centre cell.
        assert_eq!(state.velocities_x().get(8, 8), 2.0);
        assert_eq!(state.velocities_y().get(8, 8), 0.0);
        // Weaker one cell away, untouched outside the footprint.
        let side = state.velocities_x().get(9, 8);
        assert!(side > 0.0 && side < 2.0);
        assert_eq!(state.velocities_x().get(11, 8), 0.0);
    }

    #[test]
    fn test_velocity_brush_clips_at_grid_edge() {
        let mut state = FluidState::new(6, 6, 1.0);
        let brush = VelocityBrush {
            radius: 4.0,
            strength: 1.0,
        };
        let corner = state.layout().cell_center(0, 0);
        // half = 2, so a 5x5 footprint of which 3x3 is in the grid.
        assert_eq!(brush.apply(&mut state, corner, Vec2::new(1.0, 1.0)), 9);
    }

    #[test]
    fn test_far_off_brush_touches_nothing() {
        let mut state = FluidState::new(8, 8, 1.0);
        let brush = VelocityBrush {
            radius: 2.0,
            strength: 1.0,
        };
        for pos in [
            Vec2::new(1e12, 0.0),
            Vec2::new(-1e12, 1e12),
            Vec2::new(f32::MAX, f32::MIN),
        ] {
            assert_eq!(brush.apply(&mut state, pos, Vec2::new(1.0, 1.0)), 0);
            assert_eq!(DyeBrush { radius: 2.0 }.apply(&mut state, pos), 0);
        }
        assert!(state.velocities_x().as_slice().iter().all(|&v| v == 0.0));
        assert_eq!(state.total_dye(), 0.0);
    }

    #[test]
    fn test_huge_radius_covers_grid_once() {
        let mut state = FluidState::new(7, 5, 1.0);
        let centre = state.layout().cell_center(3, 2);
        let brush = VelocityBrush {
            radius: 1e30,
            strength: 1.0,
        };
        assert_eq!(brush.apply(&mut state, centre, Vec2::new(1.0, 0.0)), 7 * 5);
        assert_eq!(state.velocities_x().get(6, 4), 1.0);
        // Every fluid cell gets dye; border cells stay solid and dry.
        let raised = DyeBrush { radius: 1e30 }.apply(&mut state, centre);
        assert_eq!(raised, state.fluid_cells().count());
        assert_eq!(state.dye().get(0, 0), 0.0);
    }

    #[test]
    fn test_dye_brush_takes_max_and_skips_solid() {
        let mut state = FluidState::new(10, 10, 1.0);
        state.set_solid(5, 4, true).unwrap();
        state.set_dye(4, 5, 1.0).unwrap();
        let brush = DyeBrush { radius: 2.0 };
        let centre = state.layout().cell_center(5, 5);
        brush.apply(&mut state, centre);

        assert_eq!(state.dye().get(5, 5), 1.0);
        assert_eq!(state.dye().get(5, 4), 0.0);
        assert_eq!(state.dye().get(4, 5), 1.0);
        // One cell away: (1 - 1/4)^0.25
        assert!((state.dye().get(6, 5) - 0.75f32.powf(0.25)).abs() < 1e-6);
        // Border cells are solid and never receive dye.
        let edge = state.layout().cell_center(1, 1);
        brush.apply(&mut state, edge);
        assert_eq!(state.dye().get(0, 0), 0.0);
    }

    #[test]
    fn test_zero_radius_brushes_do_nothing() {
        let mut state = FluidState::new(5, 5, 1.0);
        let centre = state.layout().cell_center(2, 2);
        assert_eq!(DyeBrush { radius: 0.0 }.apply(&mut state, centre), 0);
        let brush = VelocityBrush {
            radius: 0.0,
            strength: 10.0,
        };
        assert_eq!(brush.apply(&mut state, centre, Vec2::new(1.0, 1.0)), 0);
        assert_eq!(state.total_dye(), 0.0);
    }

    #[test]
    fn test_stamp_circle_obstacle() {
        let mut state = FluidState::new(11, 11, 1.0);
        let shape = ObstacleShape::Circle {
            center: (0.0, 0.0),
            radius: 1.0,
        };
        // Centre cell plus its four direct neighbours.
        assert_eq!(stamp_obstacle(&mut state, &shape), 5);
        assert!(state.solid_mask().get(5, 5));
        assert!(state.solid_mask().get(4, 5));
        assert!(!state.solid_mask().get(4, 4));
    }

    #[test]
    fn test_stamp_rect_skips_border() {
        let mut state = FluidState::new(6, 4, 1.0);
        let shape = ObstacleShape::Rect {
            center: (0.0, 0.0),
            size: (100.0, 100.0),
        };
        assert_eq!(stamp_obstacle(&mut state, &shape), 4 * 2);
        assert_eq!(state.fluid_cells().count(), 0);
    }
}

//! Grid geometry: cell/face positions in world space.
//!
//! The domain is `cell_count_x * cell_count_y` square cells centred on the
//! world origin. Horizontal velocity lives on the left edge of each cell
//! (plus one extra column on the right), vertical velocity on the bottom
//! edge (plus one extra row on top).

use super::Vec2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridLayout {
    cell_count_x: usize,
    cell_count_y: usize,
    cell_size: f32,
    bounds_size: Vec2,
    bottom_left: Vec2,
}

impl GridLayout {
    pub fn new(cell_count_x: usize, cell_count_y: usize, cell_size: f32) -> Self {
        assert!(
            cell_count_x >= 3 && cell_count_y >= 3,
            "grid must be at least 3x3 cells, got {cell_count_x}x{cell_count_y}"
        );
        assert!(
            cell_size.is_finite() && cell_size > 0.0,
            "cell size must be positive, got {cell_size}"
        );
        let bounds_size = Vec2::new(cell_count_x as f32, cell_count_y as f32) * cell_size;
        Self {
            cell_count_x,
            cell_count_y,
            cell_size,
            bounds_size,
            bottom_left: bounds_size * -0.5,
        }
    }

    #[inline]
    pub fn cell_count_x(&self) -> usize {
        self.cell_count_x
    }

    #[inline]
    pub fn cell_count_y(&self) -> usize {
        self.cell_count_y
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cell_count_x * self.cell_count_y
    }

    /// World-space size of the whole domain.
    pub fn bounds_size(&self) -> Vec2 {
        self.bounds_size
    }

    /// World-space position of the domain's lower-left corner.
    pub fn bottom_left(&self) -> Vec2 {
        self.bottom_left
    }

    /// Dimensions of the horizontal-velocity face array.
    pub fn faces_x_dims(&self) -> (usize, usize) {
        (self.cell_count_x + 1, self.cell_count_y)
    }

    /// Dimensions of the vertical-velocity face array.
    pub fn faces_y_dims(&self) -> (usize, usize) {
        (self.cell_count_x, self.cell_count_y + 1)
    }

    pub fn is_border(&self, x: usize, y: usize) -> bool {
        x == 0 || y == 0 || x + 1 == self.cell_count_x || y + 1 == self.cell_count_y
    }

    pub fn cell_in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.cell_count_x && (y as usize) < self.cell_count_y
    }

    pub fn cell_center(&self, x: usize, y: usize) -> Vec2 {
        self.bottom_left + Vec2::new(x as f32 + 0.5, y as f32 + 0.5) * self.cell_size
    }

    /// Position of horizontal-velocity sample `(x, y)`.
    pub fn left_edge_center(&self, x: usize, y: usize) -> Vec2 {
        self.cell_center(x, y) - Vec2::new(0.5 * self.cell_size, 0.0)
    }

    /// Position of vertical-velocity sample `(x, y)`.
    pub fn bottom_edge_center(&self, x: usize, y: usize) -> Vec2 {
        self.cell_center(x, y) - Vec2::new(0.0, 0.5 * self.cell_size)
    }

    /// Nearest cell to a world position. May lie outside the grid.
    pub fn cell_coord_from_pos(&self, pos: Vec2) -> (i32, i32) {
        let local = pos - self.bottom_left;
        let x = local.x / self.cell_size - 0.5;
        let y = local.y / self.cell_size - 0.5;
        (x.round_ties_even() as i32, y.round_ties_even() as i32)
    }
}

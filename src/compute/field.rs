//! Dense 2D arrays stored as flat row-major buffers.
//!
//! Every out-of-range read in the solver goes through [`Field2::clamped`],
//! so the edge policy (fold back to the last valid index) lives in one place.

use super::Vec2;

#[derive(Clone, Debug, PartialEq)]
pub struct Field2<T = f32> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

impl<T: Copy + Default> Field2<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, T::default())
    }
}

impl<T: Copy> Field2<T> {
    pub fn filled(width: usize, height: usize, fill: T) -> Self {
        assert!(width > 0 && height > 0, "field dimensions must be non-zero");
        Self {
            width,
            height,
            data: vec![fill; width * height],
        }
    }

    pub fn from_fn(width: usize, height: usize, f: impl Fn(usize, usize) -> T) -> Self {
        assert!(width > 0 && height > 0, "field dimensions must be non-zero");
        let data = (0..width * height).map(|i| f(i % width, i / width)).collect();
        Self {
            width,
            height,
            data,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        debug_assert!(self.in_bounds(x, y), "({x}, {y}) outside {}x{}", self.width, self.height);
        y * self.width + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> T {
        self.data[self.idx(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let idx = self.idx(x, y);
        self.data[idx] = value;
    }

    #[inline]
    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut T {
        let idx = self.idx(x, y);
        &mut self.data[idx]
    }

    /// Read with both indices clamped into range.
    #[inline]
    pub fn clamped(&self, x: isize, y: isize) -> T {
        let cx = x.clamp(0, self.width as isize - 1) as usize;
        let cy = y.clamp(0, self.height as isize - 1) as usize;
        self.data[cy * self.width + cx]
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    pub fn copy_from(&mut self, other: &Self) {
        assert_eq!(self.dims(), other.dims(), "field dimension mismatch");
        self.data.copy_from_slice(&other.data);
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Iterate `(x, y, value)` in storage order.
    pub fn iter_indexed(&self) -> impl Iterator<Item = (usize, usize, T)> + '_ {
        let width = self.width;
        self.data
            .iter()
            .enumerate()
            .map(move |(i, &v)| (i % width, i / width, v))
    }
}

impl Field2<f32> {
    /// Bilinearly interpolate values laid out `cell_size` apart and centred
    /// on the world origin.
    ///
    /// The base index is clamped to `[0, dim - 2]` and the fractional offset
    /// to `[0, 1]`, so positions outside the array degrade to edge values.
    /// Both face arrays and cell-centred arrays use this: for each, index
    /// `(i, j)` lands exactly on its world-space sample point.
    pub fn sample_bilinear(&self, cell_size: f32, pos: Vec2) -> f32 {
        debug_assert!(self.width >= 2 && self.height >= 2);
        let width = (self.width - 1) as f32 * cell_size;
        let height = (self.height - 1) as f32 * cell_size;

        let px = (pos.x + width * 0.5) / cell_size;
        let py = (pos.y + height * 0.5) / cell_size;

        let left = (px.floor() as isize).clamp(0, self.width as isize - 2) as usize;
        let bottom = (py.floor() as isize).clamp(0, self.height as isize - 2) as usize;
        let right = left + 1;
        let top = bottom + 1;

        let x_frac = (px - left as f32).clamp(0.0, 1.0);
        let y_frac = (py - bottom as f32).clamp(0.0, 1.0);

        let value_top = lerp(self.get(left, top), self.get(right, top), x_frac);
        let value_bottom = lerp(self.get(left, bottom), self.get(right, bottom), x_frac);
        lerp(value_bottom, value_top, y_frac)
    }

    pub fn sum(&self) -> f32 {
        self.data.iter().sum()
    }

    pub fn min_max(&self) -> (f32, f32) {
        let mut iter = self.data.iter().copied().filter(|v| v.is_finite());
        let Some(first) = iter.next() else {
            return (0.0, 0.0);
        };
        iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)))
    }
}

/// Two-term lerp: returns `a` at `t == 0` and `b` at `t == 1` exactly.
#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

//! Seed types for initializing smoke simulations.
//!
//! A seed is a list of localized perturbations applied once, before the
//! first step, through [`FluidAccess`]. Positions are world coordinates
//! (the domain is centred on the origin).

use serde::{Deserialize, Serialize};

use crate::compute::{DyeBrush, FluidAccess, Vec2, VelocityBrush, stamp_obstacle};

/// Complete seed specification for simulation initialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seed {
    /// Patterns, applied in order.
    pub patterns: Vec<Pattern>,
}

impl Default for Seed {
    fn default() -> Self {
        Self {
            patterns: vec![
                Pattern::DyeBlob {
                    center: (0.0, 0.0),
                    radius: 6.0,
                },
                Pattern::VelocitySplat {
                    center: (0.0, 0.0),
                    radius: 6.0,
                    velocity: (1.0, 0.0),
                    strength: 20.0,
                },
            ],
        }
    }
}

/// Predefined perturbations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Pattern {
    /// Raise dye to `w^0.25` around a point, `w` falling off with distance.
    DyeBlob { center: (f32, f32), radius: f32 },
    /// Add `velocity * strength` to faces around a point, with radial falloff.
    VelocitySplat {
        center: (f32, f32),
        radius: f32,
        velocity: (f32, f32),
        strength: f32,
    },
    /// Mark interior cells covered by a shape as solid.
    Obstacle { shape: ObstacleShape },
    /// Explicit dye values as `(x, y, value)` cell entries.
    Custom { dye: Vec<(usize, usize, f32)> },
}

/// Obstacle geometry in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ObstacleShape {
    Circle { center: (f32, f32), radius: f32 },
    Rect { center: (f32, f32), size: (f32, f32) },
}

impl ObstacleShape {
    /// Whether a world-space point lies inside the shape.
    pub fn contains(&self, p: Vec2) -> bool {
        match *self {
            ObstacleShape::Circle { center, radius } => {
                (p - Vec2::from(center)).length_squared() <= radius * radius
            }
            ObstacleShape::Rect { center, size } => {
                let d = p - Vec2::from(center);
                d.x.abs() <= size.0 * 0.5 && d.y.abs() <= size.1 * 0.5
            }
        }
    }
}

impl Seed {
    /// Apply every pattern to the grid. Returns the number of cells touched.
    ///
    /// Custom entries outside the grid are skipped, matching how brushes
    /// clip at the domain edge.
    pub fn apply(&self, grid: &mut impl FluidAccess) -> usize {
        let mut touched = 0;
        for pattern in &self.patterns {
            touched += match pattern {
                Pattern::DyeBlob { center, radius } => {
                    DyeBrush { radius: *radius }.apply(grid, Vec2::from(*center))
                }
                Pattern::VelocitySplat {
                    center,
                    radius,
                    velocity,
                    strength,
                } => VelocityBrush {
                    radius: *radius,
                    strength: *strength,
                }
                .apply(grid, Vec2::from(*center), Vec2::from(*velocity)),
                Pattern::Obstacle { shape } => stamp_obstacle(grid, shape),
                Pattern::Custom { dye } => dye
                    .iter()
                    .filter(|&&(x, y, v)| grid.set_dye(x, y, v).is_ok())
                    .count(),
            };
        }
        log::debug!("seed applied {} patterns over {touched} cells", self.patterns.len());
        touched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::FluidState;

    #[test]
    fn test_default_seed_adds_dye_and_motion() {
        let mut state = FluidState::new(32, 32, 1.0);
        assert!(Seed::default().apply(&mut state) > 0);
        assert!(state.total_dye() > 0.0);
        assert!(state.velocities_x().as_slice().iter().any(|&v| v > 0.0));
    }

    #[test]
    fn test_custom_skips_out_of_range() {
        let mut state = FluidState::new(4, 4, 1.0);
        let seed = Seed {
            patterns: vec![Pattern::Custom {
                dye: vec![(1, 1, 0.5), (9, 9, 1.0), (2, 1, 0.25)],
            }],
        };
        assert_eq!(seed.apply(&mut state), 2);
        assert_eq!(state.dye().get(1, 1), 0.5);
        assert_eq!(state.dye().get(2, 1), 0.25);
    }

    #[test]
    fn test_obstacle_pattern_marks_cells() {
        let mut state = FluidState::new(12, 12, 0.5);
        let seed = Seed {
            patterns: vec![Pattern::Obstacle {
                shape: ObstacleShape::Rect {
                    center: (0.0, 0.0),
                    size: (1.0, 1.0),
                },
            }],
        };
        seed.apply(&mut state);
        assert!(state.solid_mask().get(5, 5));
        assert!(state.solid_mask().get(6, 6));
        assert!(!state.solid_mask().get(3, 3));
    }

    #[test]
    fn test_out_of_domain_splat_is_ignored() {
        let mut state = FluidState::new(10, 10, 1.0);
        let json = r#"{
            "patterns": [
                { "type": "VelocitySplat", "center": [1e12, 0.0], "radius": 2.0,
                  "velocity": [1.0, 0.0], "strength": 5.0 },
                { "type": "DyeBlob", "center": [0.0, -1e12], "radius": 2.0 }
            ]
        }"#;
        let seed: Seed = serde_json::from_str(json).unwrap();
        assert_eq!(seed.apply(&mut state), 0);
        assert!(state.velocities_x().as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_shape_contains() {
        let circle = ObstacleShape::Circle {
            center: (1.0, 1.0),
            radius: 0.5,
        };
        assert!(circle.contains(Vec2::new(1.2, 1.2)));
        assert!(!circle.contains(Vec2::new(1.6, 1.0)));
        let rect = ObstacleShape::Rect {
            center: (0.0, 0.0),
            size: (4.0, 1.0),
        };
        assert!(rect.contains(Vec2::new(1.9, 0.4)));
        assert!(!rect.contains(Vec2::new(0.0, 0.6)));
    }

    #[test]
    fn test_seed_json_format() {
        let json = r#"{
            "patterns": [
                { "type": "DyeBlob", "center": [0.0, 1.0], "radius": 2.0 },
                { "type": "Obstacle", "shape": { "kind": "circle", "center": [3.0, 0.0], "radius": 1.5 } }
            ]
        }"#;
        let seed: Seed = serde_json::from_str(json).unwrap();
        assert_eq!(seed.patterns.len(), 2);
        assert!(matches!(
            seed.patterns[1],
            Pattern::Obstacle {
                shape: ObstacleShape::Circle { radius, .. }
            } if radius == 1.5
        ));
        let back: Seed = serde_json::from_str(&serde_json::to_string(&seed).unwrap()).unwrap();
        assert_eq!(back, seed);
    }
}

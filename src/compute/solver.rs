//! CPU Solver - Main simulation driver for smoke.
//!
//! Orchestrates the per-frame stages: pressure relaxation, velocity
//! projection, dye advection and velocity self-advection.

use crate::schema::{RelaxationScheme, SolverConfig};

use super::{
    Field2, FluidState, PressureSolveData, advect_dye, advect_velocity, prepare_pressure_solve,
    relax_gauss_seidel, relax_jacobi, update_velocities,
};

/// Nominal frame cadence; one step advances `time_step_mul / FRAME_RATE` seconds.
pub const FRAME_RATE: f32 = 60.0;

/// Scratch buffers sized for one grid, reallocated if the grid changes.
struct Scratch {
    dims: (usize, usize),
    velocities_x: Field2,
    velocities_y: Field2,
    dye: Field2,
    pressure: Field2,
    solve_data: Field2<PressureSolveData>,
}

impl Scratch {
    fn for_state(state: &FluidState) -> Self {
        let (fx_w, fx_h) = state.velocities_x.dims();
        let (fy_w, fy_h) = state.velocities_y.dims();
        let (nx, ny) = (state.cell_count_x(), state.cell_count_y());
        Self {
            dims: (nx, ny),
            velocities_x: Field2::new(fx_w, fx_h),
            velocities_y: Field2::new(fy_w, fy_h),
            dye: Field2::new(nx, ny),
            pressure: Field2::new(nx, ny),
            solve_data: Field2::new(nx, ny),
        }
    }
}

/// CPU-based smoke solver.
///
/// Holds the tunables and scratch space; the grid itself lives in
/// [`FluidState`]. One solver can drive any number of states in turn.
pub struct CpuSolver {
    config: SolverConfig,
    scratch: Option<Scratch>,
}

impl CpuSolver {
    /// Create new solver from configuration.
    pub fn new(config: SolverConfig) -> Self {
        Self {
            config,
            scratch: None,
        }
    }

    /// Time advanced by each stage, in seconds.
    #[inline]
    pub fn time_step(&self) -> f32 {
        self.config.time_step_mul / FRAME_RATE
    }

    /// Get configuration reference.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn set_sor(&mut self, sor: f32) {
        self.config.sor = sor;
    }

    pub fn set_time_step_mul(&mut self, time_step_mul: f32) {
        self.config.time_step_mul = time_step_mul;
    }

    pub fn set_iterations(&mut self, iterations: usize) {
        self.config.iterations = iterations;
    }

    pub fn set_relaxation(&mut self, relaxation: RelaxationScheme) {
        self.config.relaxation = relaxation;
    }

    fn scratch_for(&mut self, state: &FluidState) -> &mut Scratch {
        let dims = (state.cell_count_x(), state.cell_count_y());
        if self.scratch.as_ref().is_some_and(|s| s.dims != dims) {
            self.scratch = None;
        }
        self.scratch.get_or_insert_with(|| {
            log::debug!("allocating solver scratch for {}x{} grid", dims.0, dims.1);
            Scratch::for_state(state)
        })
    }

    /// Rebuild the per-cell stencil data, then run `iterations` relaxation sweeps.
    pub fn run_pressure_solver(&mut self, state: &mut FluidState, iterations: usize) {
        let dt = self.time_step();
        let sor = self.config.sor;
        let relaxation = self.config.relaxation;
        let cell_size = state.cell_size();
        let scratch = self.scratch_for(state);

        prepare_pressure_solve(state, dt, &mut scratch.solve_data);

        match relaxation {
            RelaxationScheme::GaussSeidel => {
                for _ in 0..iterations {
                    relax_gauss_seidel(&mut state.pressure, &scratch.solve_data, cell_size, sor);
                }
            }
            RelaxationScheme::Jacobi => {
                for _ in 0..iterations {
                    relax_jacobi(
                        &mut state.pressure,
                        &mut scratch.pressure,
                        &scratch.solve_data,
                        cell_size,
                        sor,
                    );
                }
            }
        }
        log::debug!("pressure solve: {iterations} {relaxation:?} sweeps, sor={sor}");
    }

    /// Subtract the pressure gradient from all fluid faces.
    pub fn update_velocities(&mut self, state: &mut FluidState) {
        update_velocities(state, self.time_step());
    }

    /// Self-advect the velocity field.
    pub fn advect_velocity(&mut self, state: &mut FluidState) {
        let dt = self.time_step();
        let scratch = self.scratch_for(state);
        advect_velocity(state, &mut scratch.velocities_x, &mut scratch.velocities_y, dt);
    }

    /// Transport dye through the velocity field.
    pub fn advect_dye(&mut self, state: &mut FluidState) {
        let dt = self.time_step();
        let scratch = self.scratch_for(state);
        advect_dye(state, &mut scratch.dye, dt);
    }

    /// Perform one frame: solve, project, advect dye, advect velocity.
    pub fn step(&mut self, state: &mut FluidState) {
        self.run_pressure_solver(state, self.config.iterations);
        self.update_velocities(state);
        self.advect_dye(state);
        self.advect_velocity(state);
        log::trace!("step complete, dt={}", self.time_step());
    }

    /// Run simulation for specified number of steps.
    pub fn run(&mut self, state: &mut FluidState, steps: u64) {
        for _ in 0..steps {
            self.step(state);
        }
    }
}

/// Simulation statistics for monitoring.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SimulationStats {
    /// Mean |divergence| over fluid cells.
    pub mean_abs_divergence: f32,
    pub max_abs_divergence: f32,
    /// Largest interpolated speed at a fluid cell centre.
    pub max_speed: f32,
    pub total_dye: f32,
    pub min_pressure: f32,
    pub max_pressure: f32,
    pub fluid_cells: usize,
}

impl SimulationStats {
    /// Compute statistics from state.
    pub fn from_state(state: &FluidState) -> Self {
        let mut sum_divergence = 0.0f32;
        let mut max_abs_divergence = 0.0f32;
        let mut max_speed = 0.0f32;
        let mut fluid_cells = 0usize;

        for (x, y) in state.fluid_cells() {
            let divergence = state.divergence_at(x, y).abs();
            sum_divergence += divergence;
            max_abs_divergence = max_abs_divergence.max(divergence);
            let speed = state.velocity_at(state.layout().cell_center(x, y)).length();
            max_speed = max_speed.max(speed);
            fluid_cells += 1;
        }

        let (min_pressure, max_pressure) = state.pressure().min_max();

        Self {
            mean_abs_divergence: if fluid_cells > 0 {
                sum_divergence / fluid_cells as f32
            } else {
                0.0
            },
            max_abs_divergence,
            max_speed,
            total_dye: state.total_dye(),
            min_pressure,
            max_pressure,
            fluid_cells,
        }
    }

    /// False once the solve has blown up (NaN or infinite values).
    pub fn is_finite(&self) -> bool {
        self.mean_abs_divergence.is_finite() && self.max_speed.is_finite() && self.total_dye.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::{Axis, FluidAccess};

    fn unit_solver(iterations: usize) -> CpuSolver {
        CpuSolver::new(SolverConfig {
            iterations,
            sor: 1.0,
            time_step_mul: 1.0,
            relaxation: RelaxationScheme::GaussSeidel,
        })
    }

    fn mean_interior_divergence(state: &FluidState) -> f32 {
        SimulationStats::from_state(state).mean_abs_divergence
    }

    /// Deterministic swirl-plus-source field on interior faces.
    fn seeded_state() -> FluidState {
        let mut state = FluidState::new(16, 12, 1.0);
        for y in 1..11 {
            for x in 2..15 {
                let v = ((x * 7 + y * 3) % 5) as f32 - 2.0;
                state.set_velocity(Axis::X, x, y, v).unwrap();
            }
        }
        for y in 2..11 {
            for x in 1..15 {
                let v = ((x * 5 + y * 11) % 7) as f32 * 0.5 - 1.5;
                state.set_velocity(Axis::Y, x, y, v).unwrap();
            }
        }
        state
    }

    #[test]
    fn test_time_step() {
        let mut solver = unit_solver(1);
        assert!((solver.time_step() - 1.0 / 60.0).abs() < 1e-9);
        solver.set_time_step_mul(3.0);
        assert!((solver.time_step() - 0.05).abs() < 1e-7);
    }

    #[test]
    fn test_divergence_non_increasing_with_iterations() {
        let mut previous = f32::INFINITY;
        for iterations in [0, 5, 20, 80, 320] {
            let mut state = seeded_state();
            let mut solver = unit_solver(iterations);
            solver.run_pressure_solver(&mut state, iterations);
            solver.update_velocities(&mut state);
            let divergence = mean_interior_divergence(&state);
            assert!(
                divergence <= previous * 1.0001 + 1e-6,
                "{iterations} iterations: {divergence} > {previous}"
            );
            previous = divergence;
        }
        assert!(previous < 1e-2, "did not converge: {previous}");
    }

    #[test]
    fn test_inflow_column_becomes_divergence_free() {
        let mut state = FluidState::new(10, 10, 1.0);
        // Leftmost faces with fluid on both sides.
        for y in 1..9 {
            state.set_velocity(Axis::X, 2, y, 5.0).unwrap();
        }
        let before = state.velocities_x().clone();
        let initial = SimulationStats::from_state(&state).max_abs_divergence;
        assert_eq!(initial, 5.0);

        let mut solver = unit_solver(50);
        solver.run_pressure_solver(&mut state, 50);
        solver.update_velocities(&mut state);
        let after_50 = SimulationStats::from_state(&state);
        assert!(
            after_50.mean_abs_divergence < 1e-3,
            "50 sweeps left mean {}",
            after_50.mean_abs_divergence
        );
        assert!(
            after_50.max_abs_divergence < 2e-3,
            "50 sweeps left max {}",
            after_50.max_abs_divergence
        );

        // Continue to convergence.
        solver.run_pressure_solver(&mut state, 2000);
        solver.update_velocities(&mut state);
        for y in 1..9 {
            for x in 1..9 {
                let d = state.divergence_at(x, y);
                assert!(d.abs() < 1e-3, "cell ({x},{y}) divergence {d}");
            }
        }

        // Solid-adjacent faces never move.
        for y in 0..10 {
            for x in [0, 1, 9, 10] {
                assert_eq!(state.velocities_x().get(x, y), before.get(x, y));
            }
        }
        // With closed walls, net flux through any vertical line is zero.
        for x in 2..9 {
            let flux: f32 = (1..9).map(|y| state.velocities_x().get(x, y)).sum();
            assert!(flux.abs() < 1e-2, "column {x} flux {flux}");
        }
    }

    #[test]
    fn test_jacobi_also_converges() {
        let mut state = seeded_state();
        let mut solver = CpuSolver::new(SolverConfig {
            iterations: 3000,
            sor: 0.8,
            time_step_mul: 1.0,
            relaxation: RelaxationScheme::Jacobi,
        });
        let initial = mean_interior_divergence(&state);
        solver.run_pressure_solver(&mut state, 3000);
        solver.update_velocities(&mut state);
        assert!(mean_interior_divergence(&state) < initial * 1e-3);
    }

    #[test]
    fn test_step_keeps_solid_faces() {
        let mut state = seeded_state();
        state.set_solid(7, 6, true).unwrap();
        // Inject a value on a wall face; the boundary keeps it.
        state.set_velocity(Axis::X, 7, 6, 3.0).unwrap();
        state.set_velocity(Axis::Y, 7, 7, -2.0).unwrap();
        let before_x = state.velocities_x().clone();
        let before_y = state.velocities_y().clone();

        let mut solver = unit_solver(10);
        solver.run(&mut state, 3);

        for (x, y, v) in before_x.iter_indexed() {
            let (xi, yi) = (x as isize, y as isize);
            if state.is_solid(xi, yi) || state.is_solid(xi - 1, yi) {
                assert_eq!(state.velocities_x().get(x, y), v, "u face ({x},{y})");
            }
        }
        for (x, y, v) in before_y.iter_indexed() {
            let (xi, yi) = (x as isize, y as isize);
            if state.is_solid(xi, yi) || state.is_solid(xi, yi - 1) {
                assert_eq!(state.velocities_y().get(x, y), v, "v face ({x},{y})");
            }
        }
    }

    #[test]
    fn test_still_dye_stays_put() {
        let mut state = FluidState::new(10, 10, 1.0);
        state.clear_velocities();
        state.clear_dye();
        state.set_dye(4, 5, 1.0).unwrap();
        let mut solver = unit_solver(0);
        for _ in 0..10 {
            solver.advect_dye(&mut state);
            assert!((state.dye().get(4, 5) - 1.0).abs() < 1e-6);
        }
        assert!((state.total_dye() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_dye_moves_downstream() {
        let mut state = FluidState::new(24, 12, 1.0);
        for y in 1..11 {
            for x in 2..23 {
                state.set_velocity(Axis::X, x, y, 30.0).unwrap();
            }
        }
        state.set_dye(6, 6, 1.0).unwrap();
        let mut solver = unit_solver(0);
        for _ in 0..4 {
            solver.advect_dye(&mut state);
        }
        // Half a cell per step for four steps.
        assert!(state.dye().get(8, 6) > state.dye().get(6, 6));
    }

    #[test]
    fn test_scratch_follows_grid_size() {
        let mut solver = unit_solver(5);
        let mut small = FluidState::new(5, 5, 1.0);
        let mut large = FluidState::new(9, 7, 0.5);
        solver.step(&mut small);
        solver.step(&mut large);
        solver.step(&mut small);
        assert_eq!(large.dye().dims(), (9, 7));
        assert_eq!(small.velocities_x().dims(), (6, 5));
    }

    #[test]
    fn test_stats_on_quiet_grid() {
        let state = FluidState::new(6, 5, 1.0);
        let stats = SimulationStats::from_state(&state);
        assert_eq!(stats.fluid_cells, 4 * 3);
        assert_eq!(stats.mean_abs_divergence, 0.0);
        assert_eq!(stats.max_speed, 0.0);
        assert!(stats.is_finite());
    }

    #[test]
    fn test_stats_flag_blowup() {
        let mut state = FluidState::new(6, 6, 1.0);
        state.set_dye(2, 2, f32::NAN).unwrap();
        assert!(!SimulationStats::from_state(&state).is_finite());
    }
}

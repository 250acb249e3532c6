//! Smoke Sim - Grid-based incompressible fluid for interactive smoke.
//!
//! Velocities live on a staggered (MAC) grid, pressure and dye at cell
//! centres. Each frame relaxes pressure with SOR, projects velocities to be
//! divergence-free, then carries dye and velocity along the flow with
//! semi-Lagrangian advection.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Configuration types and seeding for simulations
//! - `compute`: Grid storage, solver stages and the [`FluidAccess`](compute::FluidAccess)
//!   capability used by external collaborators
//!
//! # Example
//!
//! ```rust,no_run
//! use smoke_sim::{
//!     schema::{Pattern, Seed, SimulationConfig},
//!     compute::{CpuSolver, FluidState},
//! };
//!
//! let config = SimulationConfig::default();
//! let mut state = FluidState::from_config(&config).expect("valid config");
//!
//! let seed = Seed {
//!     patterns: vec![Pattern::DyeBlob {
//!         center: (0.0, 0.0),
//!         radius: 8.0,
//!     }],
//! };
//! seed.apply(&mut state);
//!
//! let mut solver = CpuSolver::new(config.solver);
//! solver.run(&mut state, 100);
//!
//! println!("Total dye after 100 steps: {}", state.total_dye());
//! ```

pub mod compute;
pub mod schema;

// Re-export commonly used types
pub use compute::{CpuSolver, FluidAccess, FluidState, SimulationStats};
pub use schema::{Pattern, Seed, SimulationConfig};

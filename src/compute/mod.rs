//! Compute module - Grid storage and the per-frame fluid stages.

mod advection;
mod field;
mod interaction;
mod layout;
mod pressure;
mod projection;
mod solver;
mod state;
mod vec2;

pub use advection::*;
pub use field::*;
pub use interaction::*;
pub use layout::*;
pub use pressure::*;
pub use projection::*;
pub use solver::*;
pub use state::*;
pub use vec2::*;

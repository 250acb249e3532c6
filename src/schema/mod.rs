//! Schema module - Configuration and seeding types for smoke simulations.

mod config;
mod seed;

pub use config::*;
pub use seed::*;

//! Smoke Sim CLI - Run simulations from JSON configuration.

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use smoke_sim::{
    compute::{CpuSolver, FluidState, SimulationStats},
    schema::{Seed, SimulationConfig},
};

fn main() {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <config.json> [steps]", args[0]);
        eprintln!();
        eprintln!("Run smoke simulation from JSON configuration.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  config.json  Path to simulation configuration file");
        eprintln!("  steps        Number of simulation steps (default: 100)");
        eprintln!();
        eprintln!("Example configuration is generated with --example flag.");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_config();
        return;
    }

    let config_path = PathBuf::from(&args[1]);
    let steps: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(100);

    // Load configuration
    let config_str = fs::read_to_string(&config_path).unwrap_or_else(|e| {
        eprintln!("Error reading config file: {}", e);
        std::process::exit(1);
    });

    let config: SimulationConfig = serde_json::from_str(&config_str).unwrap_or_else(|e| {
        eprintln!("Error parsing config: {}", e);
        std::process::exit(1);
    });

    // Load or create seed
    let seed_path = config_path.with_extension("seed.json");
    let seed: Seed = if seed_path.exists() {
        let seed_str = fs::read_to_string(&seed_path).unwrap_or_else(|e| {
            eprintln!("Error reading seed file: {}", e);
            std::process::exit(1);
        });
        serde_json::from_str(&seed_str).unwrap_or_else(|e| {
            eprintln!("Error parsing seed: {}", e);
            std::process::exit(1);
        })
    } else {
        Seed::default()
    };

    let mut state = FluidState::from_config(&config).unwrap_or_else(|e| {
        eprintln!("Invalid config: {}", e);
        std::process::exit(1);
    });

    println!("Smoke Simulation");
    println!("================");
    println!(
        "Grid: {}x{} ({} cells, cell size {})",
        config.cell_count_x,
        config.cell_count_y,
        config.cell_count(),
        config.cell_size
    );
    println!(
        "Pressure: {} {:?} iterations, SOR {}",
        config.solver.iterations, config.solver.relaxation, config.solver.sor
    );
    println!("Seed patterns: {}", seed.patterns.len());
    println!("Steps: {}", steps);
    println!();

    // Initialize
    let touched = seed.apply(&mut state);
    let initial_stats = SimulationStats::from_state(&state);

    println!("Initial state:");
    println!("  Seeded cells: {}", touched);
    println!(
        "  Fluid cells: {} of {}",
        initial_stats.fluid_cells,
        state.layout().cell_count()
    );
    println!("  Total dye: {:.6}", initial_stats.total_dye);
    println!("  Max speed: {:.6}", initial_stats.max_speed);
    println!();

    let mut solver = CpuSolver::new(config.solver);
    println!("dt: {:.6}s", solver.time_step());

    // Run simulation
    println!("Running simulation...");
    let start = Instant::now();

    for i in 0..steps {
        solver.step(&mut state);

        // Print progress every 10%
        if (i + 1) % (steps / 10).max(1) == 0 {
            let stats = SimulationStats::from_state(&state);
            if !stats.is_finite() {
                log::warn!("non-finite values after step {}", i + 1);
            }
            let elapsed = start.elapsed().as_secs_f32();
            let steps_per_sec = (i + 1) as f32 / elapsed;
            println!(
                "  Step {}/{}: div={:.3e} (max {:.3e}), dye={:.4}, speed={:.4}, {:.1} steps/s",
                i + 1,
                steps,
                stats.mean_abs_divergence,
                stats.max_abs_divergence,
                stats.total_dye,
                stats.max_speed,
                steps_per_sec
            );
        }
    }

    let elapsed = start.elapsed();
    let final_stats = SimulationStats::from_state(&state);

    println!();
    println!("Final state:");
    println!("  Total dye: {:.6}", final_stats.total_dye);
    println!("  Max speed: {:.6}", final_stats.max_speed);
    println!(
        "  Divergence: mean {:.3e}, max {:.3e}",
        final_stats.mean_abs_divergence, final_stats.max_abs_divergence
    );
    println!(
        "  Pressure range: [{:.6}, {:.6}]",
        final_stats.min_pressure, final_stats.max_pressure
    );
    println!();
    println!(
        "Time: {:.2}s ({:.1} steps/s)",
        elapsed.as_secs_f32(),
        steps as f32 / elapsed.as_secs_f32()
    );
}

fn print_example_config() {
    let config = SimulationConfig::default();
    let seed = Seed::default();

    let (config_json, seed_json) = match (
        serde_json::to_string_pretty(&config),
        serde_json::to_string_pretty(&seed),
    ) {
        (Ok(c), Ok(s)) => (c, s),
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("Error serializing example: {}", e);
            std::process::exit(1);
        }
    };

    println!("Example configuration (config.json):");
    println!("{}", config_json);
    println!();
    println!("Example seed (config.seed.json):");
    println!("{}", seed_json);
}

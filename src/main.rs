//! CELLSIM - CLI Entry Point
//!
//! Runs one of the cellular automata from a YAML configuration.

use cellsim::{benchmark, Config, SimulationKind};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "cellsim")]
#[command(version)]
#[command(about = "Ocean, highway and motorway cellular automata")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation
    Run {
        /// Automaton to run
        #[arg(value_enum)]
        kind: SimulationKind,

        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Number of steps to simulate
        #[arg(short, long, default_value = "1000")]
        steps: u64,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Quiet mode (minimal output)
        #[arg(short, long)]
        quiet: bool,

        /// Print statistics as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Run performance benchmark
    Benchmark {
        /// Number of steps
        #[arg(short, long, default_value = "1000")]
        steps: u64,

        /// Random seed shared by all automata
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Generate default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            kind,
            config,
            steps,
            seed,
            quiet,
            json,
        } => run_simulation(kind, config, steps, seed, quiet, json),

        Commands::Benchmark { steps, seed } => {
            init_logging("info");
            run_benchmark(steps, seed)
        }

        Commands::Init { output } => {
            init_logging("info");
            generate_config(output)
        }
    }
}

/// `RUST_LOG` overrides the given default level
fn init_logging(default_level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn run_simulation(
    kind: SimulationKind,
    config_path: PathBuf,
    steps: u64,
    seed: Option<u64>,
    quiet: bool,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // Load or create config
    let config = if config_path.exists() {
        Config::from_file(&config_path)?
    } else {
        Config::default()
    };
    init_logging(&config.logging.log_level);

    if config_path.exists() {
        log::info!("Loaded config from {:?}", config_path);
    } else {
        log::info!("Using default configuration");
    }

    let mut automaton = kind.build(&config, seed)?;

    if !json {
        println!("Starting {} simulation", kind);
        println!("  Seed: {}", automaton.seed());
        println!("  Initial population: {}", automaton.population());
        println!("  Steps: {}", steps);
        println!();
    }

    let start = Instant::now();
    let stats_interval = config.logging.stats_interval;

    for _ in 0..steps {
        automaton.step();

        // Stats output
        if !quiet && automaton.generation() % stats_interval == 0 {
            if json {
                println!("{}", serde_json::to_string(&automaton.snapshot())?);
            } else {
                println!("{}", automaton.summary());
            }
        }

        // Empty roads stay meaningful, an empty ocean does not
        if kind == SimulationKind::Ocean && automaton.is_extinct() {
            log::info!("Ocean extinct at generation {}", automaton.generation());
            break;
        }
    }

    let elapsed = start.elapsed();

    if json {
        println!("{}", serde_json::to_string(&automaton.snapshot())?);
        return Ok(());
    }

    println!();
    println!("=== Simulation Complete ===");
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!("Generations: {}", automaton.generation());
    println!(
        "Speed: {:.1} steps/s",
        automaton.generation() as f64 / elapsed.as_secs_f64()
    );
    println!("{}", automaton.summary());

    if !quiet {
        println!();
        print!("{}", automaton);
    }

    Ok(())
}

fn run_benchmark(steps: u64, seed: u64) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== CELLSIM Benchmark ===");
    println!("Steps: {}", steps);
    println!("Seed: {}", seed);
    println!();

    for result in benchmark(steps, seed)? {
        println!("{}", result);
    }

    Ok(())
}

fn generate_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    config.save(&output)?;
    println!("Configuration saved to: {:?}", output);
    Ok(())
}

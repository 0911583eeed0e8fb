//! Station Stop entry point
//!
//! Natively this is the offline tool: par times, leaderboard audit and a
//! generator quality survey. The browser build is driven through
//! `platform::web` and has no work to do here.

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::path::{Path, PathBuf};
    use std::process::ExitCode;

    use clap::{Parser, Subcommand};
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;
    use thiserror::Error;

    use station_stop::audit::{AuditError, ParTable, audit, read_records};
    use station_stop::settings::{ConfigError, SimConfig};
    use station_stop::sim::{MinimumTime, TrackSpline, generate_with_report};

    #[derive(Debug, Error)]
    enum CliError {
        #[error(transparent)]
        Config(#[from] ConfigError),
        #[error(transparent)]
        Audit(#[from] AuditError),
        #[error("failed to encode report: {0}")]
        Encode(#[from] serde_json::Error),
    }

    #[derive(Parser)]
    #[command(name = "station-stop", version)]
    #[command(about = "Offline tools for the Station Stop driving sim")]
    struct Cli {
        #[command(subcommand)]
        command: Commands,
    }

    #[derive(Subcommand)]
    enum Commands {
        /// Print theoretical minimum completion times
        Par {
            #[arg(long, default_value_t = 1)]
            level: u32,
            /// Last level to print (inclusive)
            #[arg(long)]
            to: Option<u32>,
            #[arg(long, default_value_t = 42)]
            seed: u32,
            /// JSON config file (missing fields use defaults)
            #[arg(long)]
            config: Option<PathBuf>,
        },
        /// Flag leaderboard times faster than the theoretical minimum
        Audit {
            /// JSON array of {id, level, time_ms}
            #[arg(long)]
            records: PathBuf,
            #[arg(long, default_value_t = 42)]
            seed: u32,
            #[arg(long)]
            config: Option<PathBuf>,
        },
        /// Generate many seeds and report track quality per level
        Survey {
            #[arg(long, default_value_t = 64)]
            samples: u32,
            #[arg(long, default_value_t = 5)]
            levels: u32,
            #[arg(long = "base-seed", default_value_t = 1)]
            base_seed: u64,
            #[arg(long)]
            config: Option<PathBuf>,
        },
    }

    fn load_config(path: Option<&Path>) -> Result<SimConfig, ConfigError> {
        match path {
            Some(path) => SimConfig::load(path),
            None => Ok(SimConfig::default()),
        }
    }

    fn par(level: u32, to: Option<u32>, seed: u32, config: &SimConfig) {
        let last = to.unwrap_or(level).max(level);
        for level in level..=last {
            match station_stop::sim::minimum_time_ms(level, seed, config) {
                MinimumTime::Bound { ms } => println!("level {level}: {ms} ms"),
                MinimumTime::Unreachable(reason) => {
                    println!("level {level}: unreachable ({})", reason.as_str())
                }
            }
        }
    }

    fn survey(samples: u32, levels: u32, base_seed: u64, config: &SimConfig) {
        let mut rng = Pcg32::seed_from_u64(base_seed);
        let seeds: Vec<u32> = (0..samples).map(|_| rng.random()).collect();

        println!("level  length_m  mean_attempts  residual  unreachable");
        for level in 1..=levels {
            let resolved = config.for_level(level);
            let mut attempts = 0u64;
            let mut residual = 0u32;
            let mut unreachable = 0u32;
            let mut length = 0.0;
            for &seed in &seeds {
                let (path, report) = generate_with_report(seed, level, &resolved.track);
                attempts += report.attempts_run as u64;
                if report.intersections > 0 {
                    residual += 1;
                }
                length = TrackSpline::new(path, false).length();
                if !station_stop::sim::minimum_time_ms(level, seed, config).is_reachable() {
                    unreachable += 1;
                }
            }
            let mean_attempts = attempts as f64 / samples.max(1) as f64;
            println!(
                "{level:>5}  {length:>8.0}  {mean_attempts:>13.2}  {residual:>8}  {unreachable:>11}"
            );
        }
    }

    fn run(cli: Cli) -> Result<(), CliError> {
        match cli.command {
            Commands::Par {
                level,
                to,
                seed,
                config,
            } => {
                let config = load_config(config.as_deref())?;
                par(level, to, seed, &config);
            }
            Commands::Audit {
                records,
                seed,
                config,
            } => {
                let config = load_config(config.as_deref())?;
                let records = read_records(&records)?;
                let mut table = ParTable::new(seed, config);
                let report = audit(&records, &mut table);
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            Commands::Survey {
                samples,
                levels,
                base_seed,
                config,
            } => {
                let config = load_config(config.as_deref())?;
                survey(samples, levels, base_seed, &config);
            }
        }
        Ok(())
    }

    pub fn main() -> ExitCode {
        station_stop::platform::init_logging();
        match run(Cli::parse()) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                log::error!("{err}");
                eprintln!("error: {err}");
                ExitCode::FAILURE
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    cli::main()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry points live in station_stop::platform::web
}

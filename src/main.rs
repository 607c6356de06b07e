//! Beacon map - prepares recorded exposure notification beacons for a map
//!
//! Reads sightings from a JSONL recording, keeps the exposure notification
//! beacons after the configured cutoff, colours them per identifier run,
//! optionally jitters each position inside its accuracy radius, and writes
//! the display points for an external renderer.
//!
//! Module structure:
//! - `domain/` - Sightings, colours, display points, errors
//! - `services/` - Run colouring, geodesic jitter, pipeline
//! - `io/` - Sighting ingest and point export
//! - `infra/` - Configuration

use anyhow::Context;
use beacon_map::infra::config::{parse_not_before, Config};
use beacon_map::io::{read_sightings, Export, SightingFilter};
use beacon_map::services::MapPipeline;
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

/// Beacon map - colour and jitter beacon sightings for display
#[derive(Parser, Debug)]
#[command(name = "beacon-map", version, about)]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, env = "CONFIG_FILE", default_value = "config/dev.toml")]
    config: String,

    /// Sightings file (JSONL), overrides input.file
    #[arg(short, long)]
    input: Option<String>,

    /// Export file (JSONL), overrides output.file
    #[arg(short, long)]
    output: Option<String>,

    /// Only keep sightings after this date, overrides input.not_before
    #[arg(long)]
    not_before: Option<String>,

    /// Random seed for reproducible colours and jitter
    #[arg(long)]
    seed: Option<u64>,

    /// Jitter positions inside their accuracy radius
    #[arg(long)]
    jitter: bool,
}

fn main() -> anyhow::Result<()> {
    // Default: INFO, use RUST_LOG=debug for per-record detail
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::rfc_3339())
        .with_target(false)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "beacon_map_starting");

    let args = Args::parse();

    let mut config = Config::load_from_path(&args.config);
    if let Some(input) = &args.input {
        config = config.with_input_file(input);
    }
    if let Some(output) = &args.output {
        config = config.with_output_file(output);
    }
    if let Some(not_before) = &args.not_before {
        config = config.with_not_before(parse_not_before(not_before)?);
    }
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if args.jitter {
        config = config.with_jitter(true);
    }

    info!(
        config_file = %config.config_file(),
        input = %config.input_file(),
        output = %config.output_file(),
        service_uuid = %config.service_uuid(),
        not_before = ?config.not_before(),
        jitter = %config.jitter_enabled(),
        grouping = %config.grouping_mode().as_str(),
        seed = ?config.seed(),
        "config_loaded"
    );

    let sightings = read_sightings(config.input_file())?;
    let sightings = SightingFilter::from_config(&config).apply(sightings);

    if sightings.is_empty() {
        warn!("no_beacons_found");
        println!("No exposure notification beacons found!");
        return Ok(());
    }

    let mut rng = match config.seed() {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    let points = MapPipeline::from_config(&config)
        .run(&sightings, &mut rng)
        .context("Failed to build display points")?;

    Export::new(config.output_file()).write_points(&points)?;

    info!("beacon-map complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test so no other test races on CONFIG_FILE
    #[test]
    fn test_config_path_resolution() {
        std::env::set_var("CONFIG_FILE", "config/from_env.toml");
        let args = Args::try_parse_from(["beacon-map"]).unwrap();
        assert_eq!(args.config, "config/from_env.toml");

        let args = Args::try_parse_from(["beacon-map", "--config", "config/ramble.toml"]).unwrap();
        assert_eq!(args.config, "config/ramble.toml");

        let args = Args::try_parse_from(["beacon-map", "--config=config/ramble.toml"]).unwrap();
        assert_eq!(args.config, "config/ramble.toml");

        std::env::remove_var("CONFIG_FILE");
        let args = Args::try_parse_from(["beacon-map"]).unwrap();
        assert_eq!(args.config, "config/dev.toml");
    }

    #[test]
    fn test_overrides_parse() {
        let args = Args::try_parse_from([
            "beacon-map",
            "--input",
            "in.jsonl",
            "-o",
            "out.jsonl",
            "--seed",
            "7",
            "--jitter",
        ])
        .unwrap();
        assert_eq!(args.input.as_deref(), Some("in.jsonl"));
        assert_eq!(args.output.as_deref(), Some("out.jsonl"));
        assert_eq!(args.seed, Some(7));
        assert!(args.jitter);
        assert_eq!(args.not_before, None);
    }
}

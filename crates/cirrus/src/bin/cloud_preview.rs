//! # Cloud Preview
//!
//! Prints cloud tiles to the terminal and runs a short day/night sweep.
//!
//! Run with: cargo run --bin cloud_preview -- [clouds.toml]
//!
//! Set `RUST_LOG=debug` to watch weather changes and direction flips.

use std::process::ExitCode;

use cirrus::{CloudConfig, CloudSystem, ConfigError, RecordingActuator, TickOutcome, Weather};
use tracing_subscriber::EnvFilter;

/// Ticks in one half of the previewed day/night sweep.
const PREVIEW_PERIOD: u32 = 100;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("cloud preview failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), ConfigError> {
    let config = match std::env::args().nth(1) {
        Some(path) => CloudConfig::load(path)?,
        None => CloudConfig::default(),
    };

    let mut system = CloudSystem::new(&config, RecordingActuator::new())?;
    let layers: Vec<i32> = (0..config.synthesis.layer_count)
        .filter_map(|layer| i32::try_from(layer).ok())
        .collect();

    println!("╔══════════════════════════════════════════╗");
    println!("║  CIRRUS CLOUD PREVIEW  seed {:<13}║", config.seed);
    println!("╚══════════════════════════════════════════╝");

    for (weather, is_day) in [
        (Weather::Clear, true),
        (Weather::Clear, false),
        (Weather::Stormy, true),
        (Weather::Stormy, false),
    ] {
        system.set_weather(weather.as_str());
        system.set_daytime(is_day);

        for (layer, tile) in layers.iter().zip(system.refresh(&layers)?) {
            println!(
                "\n{} {} | layer {} | {} opaque",
                weather,
                if is_day { "day" } else { "night" },
                layer,
                tile.opaque_count()
            );
            print!("{}", tile.to_ascii());
        }
    }

    system.set_weather("clear");
    system.set_daytime(true);
    system.enable_cycle(PREVIEW_PERIOD)?;

    println!("\nday/night sweep ({PREVIEW_PERIOD} ticks per half):");
    for tick in 1..=PREVIEW_PERIOD * 2 {
        let outcome = system.tick();
        if tick % 20 == 0 {
            if let TickOutcome::Advanced {
                transition,
                brightness,
                direction_flipped,
            } = outcome
            {
                println!(
                    "  tick {tick:>3}  transition {transition:.2}  brightness {brightness:>5.1}{}",
                    if direction_flipped { "  (turning)" } else { "" }
                );
            }
            system.refresh(&layers)?;
        }
    }

    let stats = system.cache_stats();
    println!(
        "\n{} brightness updates, tile cache {} hits / {} misses",
        system.actuator().levels().len(),
        stats.hits,
        stats.misses
    );
    Ok(())
}

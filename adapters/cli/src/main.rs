#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives Charm Seasons without a game engine.

mod config;

use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use charm_seasons_core::{Event, Season, TileId, TileSink};
use charm_seasons_presentation::{
    render_level, CharmRegistry, ConsoleAudio, ConsoleHud, LevelSnapshot,
};
use charm_seasons_random::SeededRandom;
use charm_seasons_session::{Collaborators, Session, SessionConfig};
use charm_seasons_system_analytics::analyze_level;
use charm_seasons_system_spawning::select_spawn_cells;
use charm_seasons_system_terrain::Terrain;
use charm_seasons_world::SparseTilemap;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::Settings;

#[derive(Parser)]
#[command(name = "charm-seasons")]
#[command(about = "Seasonal platform level generator and session driver")]
struct Cli {
    /// TOML settings file; built-in defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Session seed every level build derives from.
    #[arg(long, global = true, default_value_t = 0)]
    seed: u64,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a single level and print it with its statistics.
    Preview {
        /// Season to build: spring, summer, autumn or winter.
        #[arg(long, default_value = "spring", value_parser = parse_season)]
        season: Season,
        /// Year counter driving density and chaos escalation.
        #[arg(long, default_value_t = 0)]
        year: u32,
        /// Also print the level as a shareable snapshot string.
        #[arg(long)]
        snapshot: bool,
    },
    /// Play a scripted session that collects a charm at a fixed cadence.
    Simulate {
        /// Game time simulated at most, in seconds.
        #[arg(long, default_value_t = 300.0)]
        seconds: f64,
        /// Tick length in seconds.
        #[arg(long, default_value_t = 0.25)]
        step: f64,
        /// Seconds between scripted pickups.
        #[arg(long, default_value_t = 4.0)]
        pickup_every: f64,
        /// Print the level after every rebuild.
        #[arg(long)]
        show_levels: bool,
    },
    /// Decode a level snapshot string and print the level.
    Show {
        /// Snapshot produced by `preview --snapshot`.
        snapshot: String,
    },
}

/// Entry point for the Charm Seasons command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("charm_seasons=info".parse()?))
        .init();

    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Preview {
            season,
            year,
            snapshot,
        } => preview(&settings, cli.seed, season, year, snapshot),
        Commands::Simulate {
            seconds,
            step,
            pickup_every,
            show_levels,
        } => simulate(&settings, cli.seed, seconds, step, pickup_every, show_levels),
        Commands::Show { snapshot } => show(&settings, &snapshot),
    }
}

fn parse_season(value: &str) -> Result<Season, String> {
    Season::from_name(value).ok_or_else(|| format!("unknown season `{value}`"))
}

fn preview(
    settings: &Settings,
    seed: u64,
    season: Season,
    year: u32,
    snapshot: bool,
) -> Result<()> {
    let assets = settings.assets.resolve()?;
    let progression = settings.progression.resolve()?;
    let terrain = Terrain::new(settings.generation.clone()).context("invalid generation settings")?;

    let mut tiles = SparseTilemap::default();
    let mut rng = SeededRandom::for_build(seed, 0, season, year);
    let build = terrain.generate(season, year, &assets, &mut tiles, &mut rng)?;
    let charms = select_spawn_cells(
        &tiles,
        terrain.config().map_span(),
        progression.charms_per_level,
        &mut rng,
    );
    let report = analyze_level(&tiles, terrain.config());

    println!(
        "{season} year {year}: density {:.2}, chaos {:.2}",
        build.density, build.chaos
    );
    print!("{}", render_level(&tiles, &charms, assets.dirt_tile));
    println!(
        "ground columns {}, platform tiles {}, surfaces {}/{} reachable",
        report.ground_columns,
        report.platform_tiles,
        report.reachable_surfaces,
        report.total_surfaces
    );
    for layer in &report.layers {
        println!(
            "  layer {:>3}: covered {:>3}, longest run {:>3}, longest gap {:>3}{}",
            layer.height,
            layer.covered_columns,
            layer.longest_run,
            layer.longest_gap,
            if layer.reachable { "" } else { ", unreachable" }
        );
    }

    if snapshot {
        println!("{}", LevelSnapshot::capture(&tiles, season, &charms).encode()?);
    }
    Ok(())
}

fn simulate(
    settings: &Settings,
    seed: u64,
    seconds: f64,
    step: f64,
    pickup_every: f64,
    show_levels: bool,
) -> Result<()> {
    if step <= 0.0 || pickup_every <= 0.0 {
        bail!("step and pickup cadence must be positive");
    }
    let step = Duration::try_from_secs_f64(step).context("invalid step")?;
    let horizon = Duration::try_from_secs_f64(seconds).context("invalid simulated time")?;
    let cadence = Duration::try_from_secs_f64(pickup_every).context("invalid pickup cadence")?;

    let config = SessionConfig {
        generation: settings.generation.clone(),
        progression: settings.progression.resolve()?,
        assets: settings.assets.resolve()?,
        seed,
    };
    let dirt = config.assets.dirt_tile;
    let mut session =
        Session::new(config, SparseTilemap::default()).context("invalid generation settings")?;

    let mut registry = CharmRegistry::new();
    let mut audio = ConsoleAudio::default();
    let mut hud = ConsoleHud::default();
    let mut collaborators = Collaborators {
        collectibles: &mut registry,
        audio: &mut audio,
        hud: &mut hud,
    };

    let mut events = session.start(&mut collaborators);
    let mut elapsed = Duration::ZERO;
    let mut since_pickup = Duration::ZERO;

    loop {
        report_events(&events, &session, show_levels, dirt);
        if session.progress().game_over || elapsed >= horizon {
            break;
        }

        events = session.tick(step, &mut collaborators);
        elapsed += step;
        since_pickup += step;

        if since_pickup >= cadence {
            since_pickup = Duration::ZERO;
            if let Some((charm, _)) = session.active_charms().first().copied() {
                events.extend(session.collect_charm(charm, &mut collaborators));
            }
        }
    }

    let progress = session.progress();
    info!(builds = session.builds(), "simulation finished");
    println!("{}", hud.time_text());
    println!("{}", hud.score_text());
    println!(
        "simulated {:.2}s, reached {} of year {}, {} charms live",
        elapsed.as_secs_f64(),
        progress.season,
        progress.year,
        registry.len()
    );
    Ok(())
}

fn report_events<T: TileSink>(
    events: &[Event],
    session: &Session<T>,
    show_levels: bool,
    dirt: Option<TileId>,
) {
    for event in events {
        match event {
            Event::SeasonChanged { season, year } => println!("-- {season}, year {year}"),
            Event::CharmCollected {
                score,
                time_remaining,
                ..
            } => println!(
                "   pickup: score {score}, {:.3}s left",
                time_remaining.as_secs_f64()
            ),
            Event::LevelAnalyzed { report } => {
                let unreachable = report.unreachable_layers();
                if !unreachable.is_empty() {
                    println!("   unreachable layers at {unreachable:?}");
                }
                if show_levels {
                    let charms: Vec<_> = session
                        .active_charms()
                        .into_iter()
                        .map(|(_, cell)| cell)
                        .collect();
                    print!("{}", render_level(session.tiles(), &charms, dirt));
                }
            }
            Event::GameOver { score } => println!("== game over, final score {score}"),
            _ => {}
        }
    }
}

fn show(settings: &Settings, encoded: &str) -> Result<()> {
    let snapshot = LevelSnapshot::decode(encoded).context("failed to decode level snapshot")?;
    let assets = settings.assets.resolve()?;
    let mut tiles = SparseTilemap::default();
    snapshot.restore_into(&mut tiles);

    println!("{} level, {} tiles", snapshot.season, tiles.len());
    print!("{}", render_level(&tiles, &snapshot.charms, assets.dirt_tile));
    Ok(())
}

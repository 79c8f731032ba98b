#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative progress state for Charm Seasons.
//!
//! The world owns the season/progress state machine and the registry of charms
//! currently placed in the level. All mutation flows through [`apply`], which
//! appends the resulting [`Event`] values for systems and adapters to observe.

mod tilemap;

use std::time::Duration;

use charm_seasons_core::{
    CellCoord, CharmId, Command, Event, ProgressSnapshot, ProgressionConfig, Season,
};
use tracing::{debug, info};

pub use tilemap::SparseTilemap;

/// Represents the authoritative Charm Seasons progress state.
#[derive(Debug)]
pub struct World {
    config: ProgressionConfig,
    progress: Progress,
    charms: Vec<Charm>,
    next_charm_id: u32,
}

impl World {
    /// Creates a world in its initial state: spring, year zero, full countdown.
    #[must_use]
    pub fn new(config: ProgressionConfig) -> Self {
        let progress = Progress::initial(config.start_time);
        Self {
            config,
            progress,
            charms: Vec::new(),
            next_charm_id: 0,
        }
    }

    fn quota(&self) -> u32 {
        // A zero quota would advance on every pickup before counting it.
        self.config.charm_quota.max(1)
    }

    fn accepts_gameplay(&self) -> bool {
        !self.progress.paused && !self.progress.game_over
    }

    fn take_charm(&mut self, charm: CharmId) -> Option<Charm> {
        let index = self.charms.iter().position(|entry| entry.id == charm)?;
        Some(self.charms.remove(index))
    }

    fn discard_charms(&mut self, out_events: &mut Vec<Event>) {
        for charm in self.charms.drain(..) {
            out_events.push(Event::CharmRemoved { charm: charm.id });
        }
    }

    fn advance_season(&mut self, out_events: &mut Vec<Event>) {
        let progress = &mut self.progress;
        progress.season = progress.season.next();
        progress.season_in_year = (progress.season_in_year + 1) % 4;
        if progress.season_in_year == 0 {
            progress.year = progress.year.saturating_add(1);
        }
        let (season, year) = (progress.season, progress.year);
        info!(%season, year, "season advanced");

        out_events.push(Event::SeasonChanged { season, year });
        out_events.push(Event::LevelRebuildRequested { season, year });
    }

    fn collect(&mut self, charm: CharmId, out_events: &mut Vec<Event>) {
        if !self.accepts_gameplay() {
            debug!(charm = charm.get(), "pickup ignored while inactive");
            return;
        }
        let Some(_) = self.take_charm(charm) else {
            debug!(charm = charm.get(), "pickup ignored for unknown charm");
            return;
        };

        let quota = self.quota();
        let bonus = self.config.pickup_bonus;
        let progress = &mut self.progress;
        progress.charms_collected += 1;
        progress.score = progress.score.saturating_add(1);
        progress.time_remaining = progress.time_remaining.saturating_add(bonus);

        let quota_reached = progress.charms_collected >= quota;
        if quota_reached {
            progress.charms_collected = 0;
        }

        out_events.push(Event::CharmCollected {
            charm,
            charms_collected: progress.charms_collected,
            score: progress.score,
            time_remaining: progress.time_remaining,
        });

        if quota_reached {
            self.advance_season(out_events);
        }
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        if !self.accepts_gameplay() {
            return;
        }

        let progress = &mut self.progress;
        progress.time_remaining = progress.time_remaining.saturating_sub(dt);
        out_events.push(Event::TimeAdvanced {
            dt,
            remaining: progress.time_remaining,
        });

        if progress.time_remaining.is_zero() {
            progress.game_over = true;
            info!(score = progress.score, "countdown expired");
            out_events.push(Event::GameOver {
                score: progress.score,
            });
        }
    }

    fn reset(&mut self, out_events: &mut Vec<Event>) {
        if !self.progress.paused && !self.progress.game_over {
            debug!("reset ignored while running");
            return;
        }

        self.progress = Progress::initial(self.config.start_time);
        out_events.push(Event::ProgressReset);
        out_events.push(Event::SeasonChanged {
            season: self.progress.season,
            year: self.progress.year,
        });
        out_events.push(Event::LevelRebuildRequested {
            season: self.progress.season,
            year: self.progress.year,
        });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::BeginSession => {
            let (season, year) = (world.progress.season, world.progress.year);
            out_events.push(Event::SeasonChanged { season, year });
            out_events.push(Event::LevelRebuildRequested { season, year });
        }
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::PlaceCharm { cell } => {
            let id = CharmId::new(world.next_charm_id);
            world.next_charm_id = world.next_charm_id.wrapping_add(1);
            world.charms.push(Charm { id, cell });
            out_events.push(Event::CharmPlaced {
                charm: id,
                cell,
                season: world.progress.season,
            });
        }
        Command::ClearCharms => world.discard_charms(out_events),
        Command::CollectCharm { charm } => world.collect(charm, out_events),
        Command::AdvanceSeason => {
            if world.progress.game_over {
                debug!("season advance ignored after game over");
                return;
            }
            world.advance_season(out_events);
        }
        Command::SetSeason { season } => {
            if world.progress.game_over {
                debug!("season override ignored after game over");
                return;
            }
            world.progress.season = season;
            let year = world.progress.year;
            info!(%season, year, "season set");
            out_events.push(Event::SeasonChanged { season, year });
            out_events.push(Event::LevelRebuildRequested { season, year });
        }
        Command::TogglePause => {
            world.progress.paused = !world.progress.paused;
            out_events.push(Event::PauseChanged {
                paused: world.progress.paused,
            });
        }
        Command::Reset => world.reset(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use charm_seasons_core::{CellCoord, CharmId, ProgressSnapshot, Season};

    use super::World;

    /// Captures the current progress state.
    #[must_use]
    pub fn progress(world: &World) -> ProgressSnapshot {
        world.progress.snapshot()
    }

    /// Active season.
    #[must_use]
    pub fn season(world: &World) -> Season {
        world.progress.season
    }

    /// Charms required per season.
    #[must_use]
    pub fn charm_quota(world: &World) -> u32 {
        world.quota()
    }

    /// Charms currently placed in the level, in placement order.
    #[must_use]
    pub fn active_charms(world: &World) -> Vec<(CharmId, CellCoord)> {
        world
            .charms
            .iter()
            .map(|charm| (charm.id, charm.cell))
            .collect()
    }
}

#[derive(Clone, Copy, Debug)]
struct Charm {
    id: CharmId,
    cell: CellCoord,
}

#[derive(Clone, Copy, Debug)]
struct Progress {
    season: Season,
    season_in_year: u32,
    year: u32,
    charms_collected: u32,
    score: u32,
    time_remaining: Duration,
    paused: bool,
    game_over: bool,
}

impl Progress {
    fn initial(start_time: Duration) -> Self {
        Self {
            season: Season::Spring,
            season_in_year: 0,
            year: 0,
            charms_collected: 0,
            score: 0,
            time_remaining: start_time,
            paused: false,
            game_over: false,
        }
    }

    fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            season: self.season,
            season_in_year: self.season_in_year,
            year: self.year,
            charms_collected: self.charms_collected,
            score: self.score,
            time_remaining: self.time_remaining,
            paused: self.paused,
            game_over: self.game_over,
        }
    }
}

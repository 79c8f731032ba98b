#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Explicit session context that drives a Charm Seasons game.
//!
//! A [`Session`] owns the world, the tilemap and every generation system. Each
//! public operation turns into a [`Command`] for the world, then pumps the
//! resulting events through terrain, analytics and spawning until no system
//! produces further commands. Collaborators receive their side effects while
//! events are dispatched, and the HUD is refreshed once the pump settles.
//!
//! Charms of the previous level are only cleared once a replacement level has
//! been built. When a build aborts, the previous level stays in place and is
//! restocked if no charm is left on it.

mod hud;

use std::{collections::BTreeMap, time::Duration};

use charm_seasons_core::{
    AudioSink, CellCoord, CharmId, CollectibleFactory, CollectibleHandle, Command, ConfigError,
    ControlEvent, Event, GenerationConfig, HudSink, LevelReport, ProgressSnapshot,
    ProgressionConfig, Season, SeasonAssets, TileSink,
};
use charm_seasons_random::SeededRandom;
use charm_seasons_system_analytics::Analytics;
use charm_seasons_system_spawning::{Config as SpawningConfig, Spawning};
use charm_seasons_system_terrain::{BuildSummary, Terrain};
use charm_seasons_world::{self as world, query, World};
use glam::Vec2;
use tracing::{debug, trace, warn};

pub use hud::{format_score, format_time_remaining};

const CHARM_ANCHOR: Vec2 = Vec2::new(0.5, 0.5);
const STINGER_VOLUME: f32 = 1.0;

/// Everything required to start a session.
#[derive(Clone, Debug, Default)]
pub struct SessionConfig {
    /// Terrain generation parameters.
    pub generation: GenerationConfig,
    /// Scoring and countdown tuning.
    pub progression: ProgressionConfig,
    /// Per-season asset references.
    pub assets: SeasonAssets,
    /// Seed from which every level build derives its random stream.
    pub seed: u64,
}

/// Adapter collaborators notified while events are dispatched.
pub struct Collaborators<'a> {
    /// Spawns and destroys charm objects.
    pub collectibles: &'a mut dyn CollectibleFactory,
    /// Plays ambience and sound effects.
    pub audio: &'a mut dyn AudioSink,
    /// Displays the countdown and score.
    pub hud: &'a mut dyn HudSink,
}

/// Owns the authoritative state of one game and the tilemap it builds into.
#[derive(Debug)]
pub struct Session<T> {
    world: World,
    tiles: T,
    terrain: Terrain,
    spawning: Spawning,
    analytics: Analytics,
    assets: SeasonAssets,
    seed: u64,
    build_index: u64,
    pickup_volume: f32,
    handles: BTreeMap<CharmId, CollectibleHandle>,
}

impl<T: TileSink> Session<T> {
    /// Creates a session that paints its levels into `tiles`.
    ///
    /// Nothing is generated until [`Session::start`] is called.
    pub fn new(config: SessionConfig, tiles: T) -> Result<Self, ConfigError> {
        let SessionConfig {
            generation,
            progression,
            assets,
            seed,
        } = config;

        let terrain = Terrain::new(generation)?;
        let spawning = Spawning::new(SpawningConfig::new(progression.charms_per_level));
        let pickup_volume = progression.pickup_volume;

        Ok(Self {
            world: World::new(progression),
            tiles,
            terrain,
            spawning,
            analytics: Analytics::new(),
            assets,
            seed,
            build_index: 0,
            pickup_volume,
            handles: BTreeMap::new(),
        })
    }

    /// Announces the first season and builds the first level.
    pub fn start(&mut self, collaborators: &mut Collaborators<'_>) -> Vec<Event> {
        self.submit(Command::BeginSession, collaborators)
    }

    /// Advances the countdown by `dt`.
    pub fn tick(&mut self, dt: Duration, collaborators: &mut Collaborators<'_>) -> Vec<Event> {
        self.submit(Command::Tick { dt }, collaborators)
    }

    /// Reports that the player touched `charm`.
    pub fn collect_charm(
        &mut self,
        charm: CharmId,
        collaborators: &mut Collaborators<'_>,
    ) -> Vec<Event> {
        self.submit(Command::CollectCharm { charm }, collaborators)
    }

    /// Skips to the next season as if the quota had been met, without scoring.
    pub fn advance_season(&mut self, collaborators: &mut Collaborators<'_>) -> Vec<Event> {
        self.submit(Command::AdvanceSeason, collaborators)
    }

    /// Switches to `season` and rebuilds the level, keeping score and year.
    pub fn set_season(
        &mut self,
        season: Season,
        collaborators: &mut Collaborators<'_>,
    ) -> Vec<Event> {
        self.submit(Command::SetSeason { season }, collaborators)
    }

    /// Routes a discrete input event.
    ///
    /// Pause and reset map onto world commands. Movement belongs to the
    /// physics layer and produces no events here.
    pub fn handle_control(
        &mut self,
        control: ControlEvent,
        collaborators: &mut Collaborators<'_>,
    ) -> Vec<Event> {
        match control {
            ControlEvent::Pause => self.submit(Command::TogglePause, collaborators),
            ControlEvent::Reset => self.submit(Command::Reset, collaborators),
            ControlEvent::MoveLeft | ControlEvent::MoveRight | ControlEvent::Jump => {
                trace!(?control, "movement input left to the physics layer");
                Vec::new()
            }
        }
    }

    /// Current progress state.
    #[must_use]
    pub fn progress(&self) -> ProgressSnapshot {
        query::progress(&self.world)
    }

    /// Charms required per season.
    #[must_use]
    pub fn charm_quota(&self) -> u32 {
        query::charm_quota(&self.world)
    }

    /// Tilemap holding the current level.
    #[must_use]
    pub fn tiles(&self) -> &T {
        &self.tiles
    }

    /// Generation parameters used by every build.
    #[must_use]
    pub fn generation(&self) -> &GenerationConfig {
        self.terrain.config()
    }

    /// Charms placed in the current level and not yet collected.
    #[must_use]
    pub fn active_charms(&self) -> Vec<(CharmId, CellCoord)> {
        query::active_charms(&self.world)
    }

    /// Statistics for the most recently analyzed level.
    #[must_use]
    pub fn last_report(&self) -> Option<&LevelReport> {
        self.analytics.last_report()
    }

    /// Decisions taken by the most recent successful build.
    #[must_use]
    pub fn last_build(&self) -> Option<&BuildSummary> {
        self.terrain.last_build()
    }

    /// Number of level builds attempted so far.
    #[must_use]
    pub fn builds(&self) -> u64 {
        self.build_index
    }

    fn submit(&mut self, command: Command, collaborators: &mut Collaborators<'_>) -> Vec<Event> {
        let mut log = Vec::new();
        let mut pending = vec![command];

        while !pending.is_empty() {
            let mut events = Vec::new();
            for command in pending.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }
            self.dispatch(&events, collaborators);

            let mut generated = Vec::new();
            for event in &events {
                if let Event::LevelRebuildRequested { season, year } = *event {
                    generated.extend(self.rebuild(event.clone(), season, year, &mut pending));
                }
            }
            log.extend(events);
            log.extend(generated);
        }

        self.refresh_hud(collaborators);
        log
    }

    fn rebuild(
        &mut self,
        request: Event,
        season: Season,
        year: u32,
        commands: &mut Vec<Command>,
    ) -> Vec<Event> {
        let mut rng = SeededRandom::for_build(self.seed, self.build_index, season, year);
        self.build_index = self.build_index.wrapping_add(1);

        let mut generated = Vec::new();
        self.terrain.handle(
            &[request],
            &self.assets,
            &mut self.tiles,
            &mut rng,
            &mut generated,
        );

        let mut analyzed = Vec::new();
        self.analytics.handle(
            &generated,
            &self.tiles,
            self.terrain.config(),
            &mut analyzed,
        );

        let span = self.terrain.config().map_span();
        let built = generated
            .iter()
            .any(|event| matches!(event, Event::TerrainGenerated { .. }));
        if built {
            commands.push(Command::ClearCharms);
            self.spawning
                .handle(&generated, &self.assets, &self.tiles, span, &mut rng, commands);
        } else if query::active_charms(&self.world).is_empty() && self.tiles.bounds().is_some() {
            warn!(%season, year, "rebuild aborted, placing charms on the kept level");
            self.spawning
                .place(season, &self.assets, &self.tiles, span, &mut rng, commands);
        }

        generated.extend(analyzed);
        generated
    }

    fn dispatch(&mut self, events: &[Event], collaborators: &mut Collaborators<'_>) {
        for event in events {
            match event {
                Event::SeasonChanged { season, .. } => match self.assets.music(*season) {
                    Ok(clip) => collaborators.audio.play_music(clip),
                    Err(error) => warn!(%error, "ambience unchanged"),
                },
                Event::CharmPlaced {
                    charm,
                    cell,
                    season,
                } => {
                    let prefab = match self.assets.charm_prefab(*season) {
                        Ok(prefab) => prefab,
                        Err(error) => {
                            warn!(%error, charm = charm.get(), "charm not spawned");
                            continue;
                        }
                    };
                    let position = self.tiles.cell_to_world(*cell) + CHARM_ANCHOR;
                    let handle = collaborators.collectibles.spawn(prefab, position);
                    let _ = self.handles.insert(*charm, handle);
                }
                Event::CharmCollected { charm, .. } => {
                    if let Some(clip) = &self.assets.pickup_clip {
                        collaborators.audio.play_one_shot(clip, self.pickup_volume);
                    }
                    self.despawn(*charm, collaborators);
                }
                Event::CharmRemoved { charm } => self.despawn(*charm, collaborators),
                Event::GameOver { score } => {
                    debug!(score, "stopping ambience");
                    collaborators.audio.stop();
                    if let Some(clip) = &self.assets.game_over_clip {
                        collaborators.audio.play_one_shot(clip, STINGER_VOLUME);
                    }
                }
                Event::TimeAdvanced { .. }
                | Event::LevelRebuildRequested { .. }
                | Event::TerrainGenerated { .. }
                | Event::LevelAnalyzed { .. }
                | Event::PauseChanged { .. }
                | Event::ProgressReset => {}
            }
        }
    }

    fn despawn(&mut self, charm: CharmId, collaborators: &mut Collaborators<'_>) {
        if let Some(handle) = self.handles.remove(&charm) {
            collaborators.collectibles.despawn(handle);
        }
    }

    fn refresh_hud(&self, collaborators: &mut Collaborators<'_>) {
        let progress = self.progress();
        collaborators
            .hud
            .show_time_remaining(&format_time_remaining(progress.time_remaining));
        collaborators
            .hud
            .show_score(&format_score(&progress, self.charm_quota()));
    }
}

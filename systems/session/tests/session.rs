use std::time::Duration;

use charm_seasons_core::{
    AudioSink, CellCoord, ClipId, CollectibleFactory, CollectibleHandle, ControlEvent, Event,
    GenerationConfig, HudSink, PrefabId, ProgressionConfig, Season, SeasonAssets, SeasonTable,
    TileId, TileSink,
};
use charm_seasons_session::{Collaborators, Session, SessionConfig};
use charm_seasons_world::SparseTilemap;
use glam::Vec2;

#[derive(Default)]
struct Factory {
    spawned: Vec<(PrefabId, Vec2, CollectibleHandle)>,
    despawned: Vec<CollectibleHandle>,
}

impl CollectibleFactory for Factory {
    fn spawn(&mut self, prefab: &PrefabId, position: Vec2) -> CollectibleHandle {
        let handle = CollectibleHandle::new(self.spawned.len() as u64);
        self.spawned.push((prefab.clone(), position, handle));
        handle
    }

    fn despawn(&mut self, handle: CollectibleHandle) {
        self.despawned.push(handle);
    }
}

#[derive(Default)]
struct Audio {
    music: Vec<ClipId>,
    one_shots: Vec<(ClipId, f32)>,
    stops: u32,
}

impl AudioSink for Audio {
    fn play_music(&mut self, clip: &ClipId) {
        self.music.push(clip.clone());
    }

    fn play_one_shot(&mut self, clip: &ClipId, volume: f32) {
        self.one_shots.push((clip.clone(), volume));
    }

    fn stop(&mut self) {
        self.stops += 1;
    }
}

#[derive(Default)]
struct Hud {
    times: Vec<String>,
    scores: Vec<String>,
}

impl HudSink for Hud {
    fn show_time_remaining(&mut self, text: &str) {
        self.times.push(text.to_owned());
    }

    fn show_score(&mut self, text: &str) {
        self.scores.push(text.to_owned());
    }
}

#[derive(Default)]
struct Fakes {
    factory: Factory,
    audio: Audio,
    hud: Hud,
}

impl Fakes {
    fn collaborators(&mut self) -> Collaborators<'_> {
        Collaborators {
            collectibles: &mut self.factory,
            audio: &mut self.audio,
            hud: &mut self.hud,
        }
    }
}

fn assets() -> SeasonAssets {
    SeasonAssets {
        ground_tiles: SeasonTable::new(
            TileId::new(1),
            TileId::new(2),
            TileId::new(3),
            TileId::new(4),
        ),
        music: SeasonTable::new(
            ClipId::new("spring-theme"),
            ClipId::new("summer-theme"),
            ClipId::new("autumn-theme"),
            ClipId::new("winter-theme"),
        ),
        charm_prefabs: SeasonTable::new(
            PrefabId::new("blossom"),
            PrefabId::new("shell"),
            PrefabId::new("acorn"),
            PrefabId::new("snowflake"),
        ),
        dirt_tile: Some(TileId::new(9)),
        pickup_clip: Some(ClipId::new("chime")),
        game_over_clip: Some(ClipId::new("stinger")),
    }
}

fn config(charms_per_level: usize) -> SessionConfig {
    SessionConfig {
        generation: GenerationConfig::default(),
        progression: ProgressionConfig {
            charm_quota: 3,
            charms_per_level,
            start_time: Duration::from_secs(60),
            pickup_bonus: Duration::from_secs(10),
            pickup_volume: 0.8,
        },
        assets: assets(),
        seed: 0x5eed,
    }
}

fn started(charms_per_level: usize) -> (Session<SparseTilemap>, Fakes, Vec<Event>) {
    let mut session =
        Session::new(config(charms_per_level), SparseTilemap::default()).expect("valid config");
    let mut fakes = Fakes::default();
    let events = session.start(&mut fakes.collaborators());
    (session, fakes, events)
}

#[test]
fn start_builds_level_and_spawns_charms() {
    let (session, fakes, events) = started(3);

    assert_eq!(
        &events[..2],
        &[
            Event::SeasonChanged {
                season: Season::Spring,
                year: 0,
            },
            Event::LevelRebuildRequested {
                season: Season::Spring,
                year: 0,
            },
        ]
    );
    assert!(events.contains(&Event::TerrainGenerated {
        season: Season::Spring,
        year: 0,
    }));
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::LevelAnalyzed { .. })));

    let charms = session.active_charms();
    assert_eq!(charms.len(), 3);
    assert_eq!(fakes.factory.spawned.len(), 3);
    for ((_, cell), (prefab, position, _)) in charms.iter().zip(&fakes.factory.spawned) {
        assert_eq!(prefab.as_str(), "blossom");
        assert!(!session.tiles().has_tile(*cell));
        assert_eq!(
            *position,
            Vec2::new(cell.x() as f32 + 0.5, cell.y() as f32 + 0.5)
        );
    }

    assert_eq!(fakes.audio.music, vec![ClipId::new("spring-theme")]);
    assert_eq!(fakes.hud.times.last().map(String::as_str), Some("Time Left: 01:00.000"));
    assert!(session.last_report().is_some());
    assert_eq!(session.builds(), 1);
}

#[test]
fn meeting_the_quota_rebuilds_for_the_next_season() {
    let (mut session, mut fakes, _) = started(4);
    let charms: Vec<_> = session.active_charms().into_iter().map(|(id, _)| id).collect();
    assert_eq!(charms.len(), 4);

    let mut events = Vec::new();
    for charm in charms.iter().take(3) {
        events.extend(session.collect_charm(*charm, &mut fakes.collaborators()));
    }

    let progress = session.progress();
    assert_eq!(progress.season, Season::Summer);
    assert_eq!(progress.score, 3);
    assert_eq!(progress.charms_collected, 0);
    assert_eq!(progress.time_remaining, Duration::from_secs(90));
    assert!(events.contains(&Event::TerrainGenerated {
        season: Season::Summer,
        year: 0,
    }));

    let despawned: Vec<u64> = fakes
        .factory
        .despawned
        .iter()
        .map(CollectibleHandle::get)
        .collect();
    assert_eq!(despawned, vec![0, 1, 2, 3], "collected and leftover charms vanish");

    assert_eq!(fakes.factory.spawned.len(), 8);
    assert!(fakes.factory.spawned[4..]
        .iter()
        .all(|(prefab, _, _)| prefab.as_str() == "shell"));
    assert_eq!(session.active_charms().len(), 4);

    assert_eq!(
        fakes.audio.one_shots,
        vec![(ClipId::new("chime"), 0.8); 3],
        "one pickup sound per charm"
    );
    assert_eq!(fakes.audio.music.last(), Some(&ClipId::new("summer-theme")));
    assert_eq!(
        fakes.hud.scores.last().map(String::as_str),
        Some("Score: 3 | Charms: 0/3 | summer Y1")
    );
    assert_eq!(fakes.hud.times.last().map(String::as_str), Some("Time Left: 01:30.000"));
    assert_eq!(session.builds(), 2);
}

#[test]
fn countdown_expiry_stops_music_once() {
    let (mut session, mut fakes, _) = started(3);

    let events = session.tick(Duration::from_secs(61), &mut fakes.collaborators());
    assert!(events.contains(&Event::GameOver { score: 0 }));
    assert_eq!(fakes.audio.stops, 1);
    assert_eq!(
        fakes.audio.one_shots.last(),
        Some(&(ClipId::new("stinger"), 1.0))
    );
    assert_eq!(fakes.hud.times.last().map(String::as_str), Some("Time Left: 00:00.000"));
    assert!(fakes
        .hud
        .scores
        .last()
        .is_some_and(|score| score.ends_with("GAME OVER")));

    let after = session.tick(Duration::from_secs(1), &mut fakes.collaborators());
    assert!(after.is_empty());
    assert_eq!(fakes.audio.stops, 1);
}

#[test]
fn reset_after_game_over_starts_a_fresh_level() {
    let (mut session, mut fakes, _) = started(3);
    let _ = session.tick(Duration::from_secs(61), &mut fakes.collaborators());

    let events = session.handle_control(ControlEvent::Reset, &mut fakes.collaborators());
    assert!(events.contains(&Event::ProgressReset));

    let progress = session.progress();
    assert!(!progress.game_over);
    assert_eq!(progress.season, Season::Spring);
    assert_eq!(progress.time_remaining, Duration::from_secs(60));

    assert_eq!(fakes.factory.despawned.len(), 3);
    assert_eq!(fakes.factory.spawned.len(), 6);
    assert_eq!(session.active_charms().len(), 3);
    assert_eq!(session.builds(), 2);
    assert_eq!(fakes.audio.music.last(), Some(&ClipId::new("spring-theme")));
}

#[test]
fn pause_control_freezes_the_countdown() {
    let (mut session, mut fakes, _) = started(3);

    let paused = session.handle_control(ControlEvent::Pause, &mut fakes.collaborators());
    assert_eq!(paused, vec![Event::PauseChanged { paused: true }]);
    assert!(session
        .tick(Duration::from_secs(5), &mut fakes.collaborators())
        .is_empty());
    assert_eq!(session.progress().time_remaining, Duration::from_secs(60));

    let ignored = session.handle_control(ControlEvent::Jump, &mut fakes.collaborators());
    assert!(ignored.is_empty());
}

#[test]
fn reset_while_running_is_ignored() {
    let (mut session, mut fakes, _) = started(3);
    let events = session.handle_control(ControlEvent::Reset, &mut fakes.collaborators());
    assert!(events.is_empty());
    assert_eq!(session.builds(), 1);
}

#[test]
fn missing_ground_tile_keeps_previous_level() {
    let mut config = config(3);
    let _ = config.assets.ground_tiles.set(Season::Summer, None);
    let mut session = Session::new(config, SparseTilemap::default()).expect("valid config");
    let mut fakes = Fakes::default();
    let _ = session.start(&mut fakes.collaborators());
    let before: Vec<_> = session.tiles().iter().collect();
    let charms_before = session.active_charms();

    let events = session.advance_season(&mut fakes.collaborators());
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::TerrainGenerated { .. })));
    assert_eq!(session.tiles().iter().collect::<Vec<_>>(), before);
    assert_eq!(session.active_charms(), charms_before, "charms survive the aborted build");
    assert!(fakes.factory.despawned.is_empty());
    assert_eq!(session.progress().season, Season::Summer);
}

#[test]
fn aborted_build_restocks_an_emptied_level() {
    let mut config = config(3);
    let _ = config.assets.ground_tiles.set(Season::Summer, None);
    let mut session = Session::new(config, SparseTilemap::default()).expect("valid config");
    let mut fakes = Fakes::default();
    let _ = session.start(&mut fakes.collaborators());
    let spring_level: Vec<_> = session.tiles().iter().collect();

    let charms: Vec<_> = session.active_charms().into_iter().map(|(id, _)| id).collect();
    for charm in charms {
        let _ = session.collect_charm(charm, &mut fakes.collaborators());
    }

    let progress = session.progress();
    assert_eq!(progress.season, Season::Summer);
    assert_eq!(progress.score, 3);
    assert_eq!(session.builds(), 2);
    assert_eq!(session.tiles().iter().collect::<Vec<_>>(), spring_level);

    let restocked = session.active_charms();
    assert_eq!(restocked.len(), 3, "the kept level still offers charms to collect");
    for (_, cell) in &restocked {
        assert!(!session.tiles().has_tile(*cell));
        assert!(session.tiles().has_tile(CellCoord::new(cell.x(), cell.y() - 1)));
    }
    assert_eq!(fakes.factory.spawned.len(), 6);
    assert!(fakes.factory.spawned[3..]
        .iter()
        .all(|(prefab, _, _)| prefab.as_str() == "shell"));

    let next = restocked[0].0;
    let events = session.collect_charm(next, &mut fakes.collaborators());
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::CharmCollected { score: 4, .. })));
}

#[test]
fn set_season_keeps_score_and_year() {
    let (mut session, mut fakes, _) = started(3);
    let charm = session.active_charms()[0].0;
    let _ = session.collect_charm(charm, &mut fakes.collaborators());

    let events = session.set_season(Season::Winter, &mut fakes.collaborators());
    assert!(events.contains(&Event::TerrainGenerated {
        season: Season::Winter,
        year: 0,
    }));
    let progress = session.progress();
    assert_eq!(progress.season, Season::Winter);
    assert_eq!(progress.score, 1);
    assert_eq!(progress.year, 0);
    let build = session.last_build().expect("winter level built");
    assert_eq!(build.season, Season::Winter);
    assert!(session.tiles().iter().any(|(_, tile)| tile == TileId::new(4)));
}

#[test]
fn equal_seeds_replay_identically() {
    let run = || {
        let (mut session, mut fakes, mut events) = started(3);
        let charm = session.active_charms()[1].0;
        events.extend(session.collect_charm(charm, &mut fakes.collaborators()));
        events.extend(session.advance_season(&mut fakes.collaborators()));
        events.extend(session.tick(Duration::from_millis(1_500), &mut fakes.collaborators()));
        (events, session.tiles().iter().collect::<Vec<_>>())
    };
    assert_eq!(run(), run());
}

#[test]
fn invalid_generation_config_is_rejected() {
    let mut config = config(3);
    config.generation.max_jump_horizontal = 0;
    assert!(Session::new(config, SparseTilemap::default()).is_err());
}

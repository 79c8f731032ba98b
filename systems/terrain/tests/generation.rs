use charm_seasons_core::{
    CellCoord, Event, GenerationConfig, Season, SeasonAssets, SeasonTable, TileId, TileSink,
};
use charm_seasons_random::SeededRandom;
use charm_seasons_system_terrain::{ColumnOutcome, RunKind, Terrain};
use charm_seasons_world::SparseTilemap;

const DIRT: TileId = TileId::new(9);

fn assets() -> SeasonAssets {
    SeasonAssets {
        ground_tiles: SeasonTable::new(TileId::new(1), TileId::new(2), TileId::new(3), TileId::new(4)),
        dirt_tile: Some(DIRT),
        ..SeasonAssets::default()
    }
}

fn calm_config() -> GenerationConfig {
    GenerationConfig {
        map_width: 10,
        base_ground_height: 2,
        first_layer_height: 5,
        last_layer_height: 5,
        layer_step: 4,
        platform_density: 1.0,
        chaos_level: 0.0,
        min_platform_length: 4,
        max_platform_length: 4,
        ..GenerationConfig::default()
    }
}

#[test]
fn ground_strip_spans_every_column() {
    let config = GenerationConfig {
        map_offset: (-6, 3),
        ..GenerationConfig::default()
    };
    let terrain = Terrain::new(config.clone()).expect("valid config");
    let assets = assets();

    for season in Season::ALL {
        for year in 0..4 {
            let mut tiles = SparseTilemap::default();
            let mut rng = SeededRandom::for_build(17, 0, season, year);
            let summary = terrain
                .generate(season, year, &assets, &mut tiles, &mut rng)
                .expect("build succeeds");

            assert_eq!(summary.ground_row, 3);
            for column in config.map_span().columns() {
                assert!(
                    tiles.has_tile(CellCoord::new(column, summary.ground_row)),
                    "column {column} missing ground in {season} year {year}"
                );
            }
        }
    }
}

#[test]
fn runs_respect_length_and_reach_limits() {
    let config = GenerationConfig::default();
    let terrain = Terrain::new(config.clone()).expect("valid config");
    let assets = assets();
    let platform_cap = config.max_platform_length.min(config.max_jump_horizontal);
    let gap_cap = config.max_gap_length.min(config.max_jump_horizontal);

    for seed in 0..64 {
        let year = (seed % 5) as u32;
        let mut tiles = SparseTilemap::default();
        let mut rng = SeededRandom::for_build(seed, 0, Season::Autumn, year);
        let summary = terrain
            .generate(Season::Autumn, year, &assets, &mut tiles, &mut rng)
            .expect("build succeeds");

        assert_eq!(summary.layers.len(), config.layer_rows().len());
        for layer in &summary.layers {
            let mut expected_start = 0;
            for run in &layer.runs {
                assert_eq!(run.start, expected_start, "runs must be contiguous");
                assert!(run.length >= 1);
                expected_start = run.start + run.length;

                match &run.kind {
                    RunKind::Gap => assert!(run.length <= gap_cap),
                    RunKind::Platform(columns) => {
                        assert!(run.length <= platform_cap);
                        assert_eq!(columns.len(), run.length as usize);
                        let remaining = config.map_width - run.start;
                        assert!(run.length >= config.min_platform_length.min(remaining));
                        for outcome in columns {
                            if let ColumnOutcome::Painted {
                                surface_row,
                                thickness,
                                ..
                            } = *outcome
                            {
                                assert!((1..=config.max_platform_thickness).contains(&thickness));
                                assert!((surface_row - layer.row).abs() <= 2);
                            }
                        }
                    }
                }
            }
            assert!(expected_start >= config.map_width, "layer must cover the map");
        }

        let span = config.map_span();
        for (cell, _) in tiles.iter() {
            assert!(
                span.columns().any(|column| column == cell.x()),
                "tile {cell:?} outside the map"
            );
        }
    }
}

#[test]
fn chaotic_platforms_never_bury_the_ground_strip() {
    let config = GenerationConfig {
        chaos_level: 1.0,
        max_platform_thickness: 6,
        ..GenerationConfig::default()
    };
    let terrain = Terrain::new(config.clone()).expect("valid config");
    let assets = assets();
    let ground_row = config.ground_row();

    for seed in 0..64 {
        let mut tiles = SparseTilemap::default();
        let mut rng = SeededRandom::for_build(seed, 0, Season::Winter, 8);
        let _ = terrain
            .generate(Season::Winter, 8, &assets, &mut tiles, &mut rng)
            .expect("build succeeds");

        for column in config.map_span().columns() {
            assert_eq!(
                tiles.tile(CellCoord::new(column, ground_row)),
                Some(TileId::new(4)),
                "ground at column {column} overwritten for seed {seed}"
            );
        }
        assert!(tiles.iter().all(|(cell, _)| cell.y() >= ground_row));
    }
}

#[test]
fn calm_full_density_level_is_flat() {
    let terrain = Terrain::new(calm_config()).expect("valid config");
    let mut tiles = SparseTilemap::default();
    let mut rng = SeededRandom::new(3);
    let summary = terrain
        .generate(Season::Spring, 0, &assets(), &mut tiles, &mut rng)
        .expect("build succeeds");

    let lengths: Vec<u32> = summary.layers[0].runs.iter().map(|run| run.length).collect();
    assert_eq!(lengths, vec![4, 4, 2]);

    for column in 0..10 {
        assert_eq!(tiles.tile(CellCoord::new(column, 2)), Some(TileId::new(1)));
        assert_eq!(tiles.tile(CellCoord::new(column, 5)), Some(TileId::new(1)));
        assert!(!tiles.has_tile(CellCoord::new(column, 4)));
        assert!(!tiles.has_tile(CellCoord::new(column, 6)));
    }
    assert_eq!(tiles.len(), 20);
}

#[test]
fn rebuild_replaces_previous_level() {
    let terrain = Terrain::new(calm_config()).expect("valid config");
    let mut tiles = SparseTilemap::default();
    tiles.set_tile(CellCoord::new(40, 40), TileId::new(7));

    let mut rng = SeededRandom::new(1);
    let _ = terrain
        .generate(Season::Winter, 0, &assets(), &mut tiles, &mut rng)
        .expect("build succeeds");

    assert!(!tiles.has_tile(CellCoord::new(40, 40)));
    assert_eq!(tiles.tile(CellCoord::new(0, 2)), Some(TileId::new(4)));
}

#[test]
fn missing_ground_tile_leaves_tilemap_untouched() {
    let mut terrain = Terrain::new(calm_config()).expect("valid config");
    let mut assets = assets();
    let _ = assets.ground_tiles.set(Season::Summer, None);

    let mut tiles = SparseTilemap::default();
    tiles.set_tile(CellCoord::new(1, 1), TileId::new(5));
    let mut rng = SeededRandom::new(8);
    let mut out = Vec::new();
    terrain.handle(
        &[Event::LevelRebuildRequested {
            season: Season::Summer,
            year: 2,
        }],
        &assets,
        &mut tiles,
        &mut rng,
        &mut out,
    );

    assert!(out.is_empty());
    assert!(terrain.last_build().is_none());
    assert_eq!(tiles.len(), 1);
    assert_eq!(tiles.tile(CellCoord::new(1, 1)), Some(TileId::new(5)));
}

#[test]
fn handle_reports_generated_terrain() {
    let mut terrain = Terrain::new(calm_config()).expect("valid config");
    let mut tiles = SparseTilemap::default();
    let mut rng = SeededRandom::new(8);
    let mut out = Vec::new();
    terrain.handle(
        &[
            Event::SeasonChanged {
                season: Season::Autumn,
                year: 1,
            },
            Event::LevelRebuildRequested {
                season: Season::Autumn,
                year: 1,
            },
        ],
        &assets(),
        &mut tiles,
        &mut rng,
        &mut out,
    );

    assert_eq!(
        out,
        vec![Event::TerrainGenerated {
            season: Season::Autumn,
            year: 1,
        }]
    );
    let build = terrain.last_build().expect("summary recorded");
    assert_eq!(build.season, Season::Autumn);
    assert!((build.chaos - 0.1).abs() < 1e-6);
}

#[test]
fn late_years_saturate_density_and_chaos() {
    let config = GenerationConfig {
        platform_density: 0.5,
        chaos_level: 0.5,
        ..GenerationConfig::default()
    };
    let terrain = Terrain::new(config).expect("valid config");
    let mut tiles = SparseTilemap::default();
    let mut rng = SeededRandom::new(21);
    let summary = terrain
        .generate(Season::Spring, 50, &assets(), &mut tiles, &mut rng)
        .expect("build succeeds");

    assert_eq!(summary.density, 1.0);
    assert_eq!(summary.chaos, 1.0);
    for layer in &summary.layers {
        assert!(
            layer
                .runs
                .iter()
                .all(|run| matches!(run.kind, RunKind::Platform(_))),
            "full density never opens a gap"
        );
    }
}

#[test]
fn identical_seeds_build_identical_levels() {
    let terrain = Terrain::new(GenerationConfig::default()).expect("valid config");
    let build = || {
        let mut tiles = SparseTilemap::default();
        let mut rng = SeededRandom::for_build(1234, 3, Season::Winter, 2);
        let summary = terrain
            .generate(Season::Winter, 2, &assets(), &mut tiles, &mut rng)
            .expect("build succeeds");
        (summary, tiles.iter().collect::<Vec<_>>())
    };

    assert_eq!(build(), build());
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Level analytics system that audits every freshly generated level.

mod metrics;

use std::collections::VecDeque;

use charm_seasons_core::{Event, GenerationConfig, LevelReport, TileSink};
use tracing::{info, warn};

pub use metrics::{analyze_level, standable_surfaces};

/// Pure analytics system that publishes a [`LevelReport`] after each build.
#[derive(Debug, Default)]
pub struct Analytics {
    last_report: Option<LevelReport>,
    scratch_frontier: VecDeque<usize>,
}

impl Analytics {
    /// Creates a new analytics system with empty caches and scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the last report published by the system, if any.
    #[must_use]
    pub fn last_report(&self) -> Option<&LevelReport> {
        self.last_report.as_ref()
    }

    /// Consumes world events and emits [`Event::LevelAnalyzed`] once per generated level.
    pub fn handle<T>(
        &mut self,
        events: &[Event],
        tiles: &T,
        config: &GenerationConfig,
        out: &mut Vec<Event>,
    ) where
        T: TileSink + ?Sized,
    {
        for event in events {
            let Event::TerrainGenerated { season, year } = *event else {
                continue;
            };

            let report = metrics::analyze_with(tiles, config, &mut self.scratch_frontier);
            let unreachable = report.unreachable_layers();
            if unreachable.is_empty() {
                info!(
                    %season,
                    year,
                    surfaces = report.total_surfaces,
                    reachable = report.reachable_surfaces,
                    "level analyzed"
                );
            } else {
                warn!(%season, year, ?unreachable, "level has unreachable layers");
            }

            self.last_report = Some(report.clone());
            out.push(Event::LevelAnalyzed { report });
        }
    }
}

use std::collections::BTreeMap;

use charm_seasons_core::{AudioSink, ClipId, CollectibleFactory, CollectibleHandle, HudSink, PrefabId};
use glam::Vec2;
use tracing::{debug, info};

/// Collectible factory that keeps live charms in memory.
#[derive(Debug, Default)]
pub struct CharmRegistry {
    next_handle: u64,
    live: BTreeMap<CollectibleHandle, (PrefabId, Vec2)>,
}

impl CharmRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Charms currently spawned, in handle order.
    pub fn live(&self) -> impl Iterator<Item = (CollectibleHandle, &PrefabId, Vec2)> + '_ {
        self.live
            .iter()
            .map(|(handle, (prefab, position))| (*handle, prefab, *position))
    }

    /// Number of charms currently spawned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Reports whether no charm is spawned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}

impl CollectibleFactory for CharmRegistry {
    fn spawn(&mut self, prefab: &PrefabId, position: Vec2) -> CollectibleHandle {
        let handle = CollectibleHandle::new(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);
        debug!(%prefab, x = position.x, y = position.y, "charm spawned");
        let _ = self.live.insert(handle, (prefab.clone(), position));
        handle
    }

    fn despawn(&mut self, handle: CollectibleHandle) {
        if self.live.remove(&handle).is_some() {
            debug!(handle = handle.get(), "charm despawned");
        }
    }
}

/// Audio collaborator that reports playback through the log.
#[derive(Debug, Default)]
pub struct ConsoleAudio {
    current_music: Option<ClipId>,
    one_shots: u32,
}

impl ConsoleAudio {
    /// Music clip currently looping, if any.
    #[must_use]
    pub fn current_music(&self) -> Option<&ClipId> {
        self.current_music.as_ref()
    }

    /// Number of sound effects played so far.
    #[must_use]
    pub fn one_shots(&self) -> u32 {
        self.one_shots
    }
}

impl AudioSink for ConsoleAudio {
    fn play_music(&mut self, clip: &ClipId) {
        info!(%clip, "music");
        self.current_music = Some(clip.clone());
    }

    fn play_one_shot(&mut self, clip: &ClipId, volume: f32) {
        debug!(%clip, volume, "sound effect");
        self.one_shots = self.one_shots.saturating_add(1);
    }

    fn stop(&mut self) {
        if let Some(clip) = self.current_music.take() {
            info!(%clip, "music stopped");
        }
    }
}

/// HUD collaborator that keeps the latest strings for printing.
#[derive(Debug, Default)]
pub struct ConsoleHud {
    time_text: String,
    score_text: String,
}

impl ConsoleHud {
    /// Latest countdown text.
    #[must_use]
    pub fn time_text(&self) -> &str {
        &self.time_text
    }

    /// Latest score text.
    #[must_use]
    pub fn score_text(&self) -> &str {
        &self.score_text
    }
}

impl HudSink for ConsoleHud {
    fn show_time_remaining(&mut self, text: &str) {
        text.clone_into(&mut self.time_text);
    }

    fn show_score(&mut self, text: &str) {
        text.clone_into(&mut self.score_text);
    }
}

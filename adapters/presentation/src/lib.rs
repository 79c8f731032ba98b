#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless presentation helpers shared by Charm Seasons adapters.
//!
//! Provides text rendering of the tilemap, console implementations of the
//! collectible, audio and HUD collaborators, and the single-line level
//! snapshot format used to share generated levels.

mod ascii;
mod console;
mod snapshot;

pub use ascii::render_level;
pub use console::{CharmRegistry, ConsoleAudio, ConsoleHud};
pub use snapshot::{LevelSnapshot, SnapshotError, SnapshotTile, SNAPSHOT_HEADER};

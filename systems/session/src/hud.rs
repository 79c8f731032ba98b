use std::time::Duration;

use charm_seasons_core::ProgressSnapshot;

/// Formats the countdown as `Time Left: mm:ss.mmm`.
///
/// Minutes are not wrapped, so bonus time beyond an hour shows as `61:00.000`.
#[must_use]
pub fn format_time_remaining(remaining: Duration) -> String {
    let total_millis = remaining.as_millis();
    let minutes = total_millis / 60_000;
    let seconds = (total_millis / 1_000) % 60;
    let millis = total_millis % 1_000;
    format!("Time Left: {minutes:02}:{seconds:02}.{millis:03}")
}

/// Formats the score line shown next to the countdown.
#[must_use]
pub fn format_score(progress: &ProgressSnapshot, quota: u32) -> String {
    let mut text = format!(
        "Score: {} | Charms: {}/{} | {} Y{}",
        progress.score,
        progress.charms_collected,
        quota,
        progress.season,
        progress.year.saturating_add(1),
    );
    if progress.game_over {
        text.push_str(" | GAME OVER");
    } else if progress.paused {
        text.push_str(" | PAUSED");
    }
    text
}

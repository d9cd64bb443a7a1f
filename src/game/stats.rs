use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Paths;
use crate::storage;

/// Lifetime Food Runner record, one JSON file in the data directory.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct RunnerStats {
    pub(crate) high_score: u32,
    pub(crate) games_played: u32,
    pub(crate) food_collected: u64,
    pub(crate) last_played_at: Option<DateTime<Utc>>,
}

impl Default for RunnerStats {
    fn default() -> Self {
        Self {
            high_score: 0,
            games_played: 0,
            food_collected: 0,
            last_played_at: None,
        }
    }
}

/// Fold one finished session into the lifetime record.
pub(crate) fn merge_session(
    mut cur: RunnerStats,
    level: u32,
    collected: u32,
    now: DateTime<Utc>,
) -> RunnerStats {
    cur.high_score = cur.high_score.max(level);
    cur.games_played += 1;
    cur.food_collected += u64::from(collected);
    cur.last_played_at = Some(now);
    cur
}

/// Load-merge-save at the end of a session and hand the merged record back
/// for display. This is the only code that writes the runner record, and the
/// driving loop calls it exactly once per `Running -> Over` transition; a
/// failed save is logged inside [`storage`] and the in-memory record is
/// returned regardless.
pub(crate) fn finalize(paths: &Paths, level: u32, collected: u32) -> RunnerStats {
    let cur = storage::load_runner_stats(&paths.runner_path);
    let merged = merge_session(cur, level, collected, Utc::now());
    storage::save_runner_stats(&paths.runner_path, &merged);
    log::debug!(
        "run finalized at level {level} with {collected} food, high score {}",
        merged.high_score
    );
    merged
}

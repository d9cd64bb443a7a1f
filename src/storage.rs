use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use std::{fs, path::Path};

use crate::config::atomic_rename;
use crate::game::RunnerStats;
use crate::model::MainData;

/// Missing or unreadable records fall back to defaults; the game never fails
/// over storage.
pub(crate) fn load_main_data(path: &Path) -> MainData {
    if let Ok(s) = fs::read_to_string(path) {
        match serde_json::from_str::<MainData>(&s) {
            Ok(data) => return data,
            Err(e) => log::warn!("pet record at {} is unreadable ({e}), starting fresh", path.display()),
        }
    }
    MainData::new(Utc::now())
}

pub(crate) fn save_main_data(path: &Path, data: &MainData) {
    if let Err(e) = write_json(path, data) {
        log::warn!("failed to save pet record to {}: {e:#}", path.display());
    }
}

pub(crate) fn load_runner_stats(path: &Path) -> RunnerStats {
    if let Ok(s) = fs::read_to_string(path) {
        match serde_json::from_str::<RunnerStats>(&s) {
            Ok(stats) => return stats,
            Err(e) => log::warn!(
                "runner record at {} is unreadable ({e}), starting fresh",
                path.display()
            ),
        }
    }
    RunnerStats::default()
}

pub(crate) fn save_runner_stats(path: &Path, stats: &RunnerStats) {
    if let Err(e) = write_json(path, stats) {
        log::warn!("failed to save runner record to {}: {e:#}", path.display());
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(value)?;
    fs::write(&tmp, data)?;
    atomic_rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch_path(name: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!("longdog-test-{}-{name}.json", std::process::id()));
        p
    }

    #[test]
    fn missing_records_default() {
        let path = scratch_path("missing");
        let _ = fs::remove_file(&path);

        let data = load_main_data(&path);
        assert_eq!(data.body_count, 1);
        assert_eq!(data.remaining_feeds, 3);

        let stats = load_runner_stats(&path);
        assert_eq!(stats.high_score, 0);
        assert!(stats.last_played_at.is_none());
    }

    #[test]
    fn corrupt_records_default() {
        let path = scratch_path("corrupt");
        fs::write(&path, b"{ not json").unwrap();

        let data = load_main_data(&path);
        assert_eq!(data.body_count, 1);
        let stats = load_runner_stats(&path);
        assert_eq!(stats.games_played, 0);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn records_round_trip() {
        let path = scratch_path("roundtrip");
        let _ = fs::remove_file(&path);

        let mut data = MainData::new(Utc::now());
        data.body_count = 7;
        data.runner_food_banked = 23;
        save_main_data(&path, &data);

        let back = load_main_data(&path);
        assert_eq!(back.body_count, 7);
        assert_eq!(back.runner_food_banked, 23);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn runner_stats_round_trip() {
        let path = scratch_path("runner-roundtrip");
        let _ = fs::remove_file(&path);

        let stats = RunnerStats {
            high_score: 12,
            games_played: 4,
            food_collected: 31,
            last_played_at: Some(Utc::now()),
        };
        save_runner_stats(&path, &stats);

        let back = load_runner_stats(&path);
        assert_eq!(back.high_score, 12);
        assert_eq!(back.games_played, 4);
        assert_eq!(back.food_collected, 31);
        assert!(back.last_played_at.is_some());

        let _ = fs::remove_file(&path);
    }
}

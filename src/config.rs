use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct Settings {
    /// Terminal bell on catches and game over.
    pub(crate) sound_enabled: bool,
    /// Screen-flash pulse on catches (the terminal stand-in for haptics).
    pub(crate) vibration_enabled: bool,
    pub(crate) tutorial_completed: bool,
    pub(crate) fps_cap: u32,
    pub(crate) enable_color: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            vibration_enabled: true,
            tutorial_completed: false,
            fps_cap: 30,
            enable_color: true,
        }
    }
}

pub(crate) struct Paths {
    pub(crate) main_path: PathBuf,
    pub(crate) runner_path: PathBuf,
    pub(crate) settings_path: PathBuf,
}

pub(crate) fn project_paths() -> Result<Paths> {
    let proj = ProjectDirs::from("com", "longdoglife", "LongDog")
        .context("could not resolve project directories")?;
    let dir = proj.data_local_dir().to_path_buf();
    fs::create_dir_all(&dir).ok();
    Ok(Paths {
        main_path: dir.join("main.json"),
        runner_path: dir.join("food_runner.json"),
        settings_path: dir.join("settings.json"),
    })
}

pub(crate) fn load_settings(path: &Path) -> Settings {
    if let Ok(s) = fs::read_to_string(path) {
        match serde_json::from_str::<Settings>(&s) {
            Ok(v) => return v,
            Err(e) => log::warn!(
                "settings at {} are unreadable ({e}), using defaults",
                path.display()
            ),
        }
    }
    Settings::default()
}

pub(crate) fn save_settings_atomic(path: &Path, s: &Settings) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(s)?;
    fs::write(&tmp, data)?;
    atomic_rename(&tmp, path)?;
    Ok(())
}

pub(crate) fn atomic_rename(from: &Path, to: &Path) -> Result<()> {
    // Best-effort atomic replace on same filesystem.
    if to.exists() {
        let _ = fs::remove_file(to);
    }
    fs::rename(from, to)?;
    Ok(())
}

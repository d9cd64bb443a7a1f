use chrono::{Local, Utc};
use crossterm::style::Color;
use std::time::{Duration, Instant};

use crate::config::{load_settings, project_paths, save_settings_atomic, Paths, Settings};
use crate::game::{self, RunnerConfig, RunnerPhase, RunnerSession, RunnerStats, TickEvent};
use crate::input::{map_event, Action, InputCollector, UiEvent};
use crate::model::{MainData, Scene};
use crate::pet::{self, FeedOutcome};
use crate::render::{self, PetMood, Terminal};
use crate::storage;

const AUTOSAVE_EVERY: Duration = Duration::from_secs(10);
const REACTION_SHOWN_FOR: Duration = Duration::from_millis(1500);
const COLLECT_FLASH_FOR: Duration = Duration::from_millis(250);

/// A finished run, kept for the game-over overlay.
struct SessionResult {
    level: u32,
    collected: u32,
    bonus_feeds: u32,
}

/// Read-only cosmetic gates, snapshotted from the settings when the session
/// opens so the tick path never touches configuration.
#[derive(Clone, Copy)]
struct Feedback {
    sound: bool,
    flash: bool,
}

/// Everything alive while the Food Runner scene is open. Dropping it cancels
/// any pending countdown step or tick deadline.
struct RunnerView {
    session: RunnerSession,
    stats: RunnerStats,
    feedback: Feedback,
    next_tick_at: Option<Instant>,
    next_count_at: Option<Instant>,
    flash_until: Option<Instant>,
    result: Option<SessionResult>,
    show_tutorial: bool,
}

struct Reaction {
    happy: bool,
    note: String,
    until: Instant,
}

pub(crate) struct App {
    settings: Settings,
    paths: Paths,
    data: MainData,
    scene: Scene,
    help_return: Scene,
    settings_cursor: usize,
    term: Terminal,
    input: InputCollector,
    runner: Option<RunnerView>,
    reaction: Option<Reaction>,
    neglected: bool,
    should_quit: bool,
    autosave_at: Instant,
    started_at: Instant,
}

impl App {
    fn init() -> anyhow::Result<Self> {
        let paths = project_paths()?;
        let settings = load_settings(&paths.settings_path);

        let mut data = storage::load_main_data(&paths.main_path);
        let neglected = pet::neglect_check(&mut data, Utc::now());
        if neglected {
            log::info!("long gap since the last visit, the dog is sulking");
        }
        data.last_played_at = Utc::now();
        storage::save_main_data(&paths.main_path, &data);
        log::debug!(
            "pet loaded: {} segments, {} feeds left today",
            data.body_count,
            data.remaining_feeds
        );

        let term = Terminal::begin()?;

        Ok(Self {
            settings,
            paths,
            data,
            scene: Scene::Pet,
            help_return: Scene::Pet,
            settings_cursor: 0,
            term,
            input: InputCollector::new(),
            runner: None,
            reaction: None,
            neglected,
            should_quit: false,
            autosave_at: Instant::now() + AUTOSAVE_EVERY,
            started_at: Instant::now(),
        })
    }

    fn run(&mut self) -> anyhow::Result<()> {
        let fps = self.settings.fps_cap.clamp(10, 240);
        let frame_dt = Duration::from_secs_f32(1.0 / fps as f32);

        while !self.should_quit {
            let _resized = self.term.resize_if_needed()?;

            let events = self.input.collect(frame_dt)?;
            for ev in events {
                if self.dismiss_tutorial(&ev) {
                    continue;
                }
                match map_event(self.scene, ev) {
                    Some(action) => self.handle(action),
                    None => {
                        // Help closes on any key.
                        if self.scene == Scene::Help {
                            self.scene = self.help_return;
                        }
                    }
                }
            }

            self.drive_runner();

            if let Some(r) = &self.reaction {
                if Instant::now() >= r.until {
                    self.reaction = None;
                }
            }

            self.render_frame()?;

            if Instant::now() >= self.autosave_at {
                storage::save_main_data(&self.paths.main_path, &self.data);
                self.autosave_at = Instant::now() + AUTOSAVE_EVERY;
            }

            spin_sleep(frame_dt, Instant::now());
        }

        self.data.total_play_secs += self.started_at.elapsed().as_secs();
        self.data.last_played_at = Utc::now();
        storage::save_main_data(&self.paths.main_path, &self.data);
        self.term.end()?;
        save_settings_atomic(&self.paths.settings_path, &self.settings)?;
        Ok(())
    }

    /// First-play tutorial overlay swallows the next key press.
    fn dismiss_tutorial(&mut self, ev: &UiEvent) -> bool {
        if self.scene != Scene::Runner {
            return false;
        }
        let Some(rv) = self.runner.as_mut() else {
            return false;
        };
        if rv.show_tutorial && matches!(ev, UiEvent::Key(_)) {
            rv.show_tutorial = false;
            self.settings.tutorial_completed = true;
            return true;
        }
        false
    }

    fn handle(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::HelpToggle => {
                if self.scene == Scene::Help {
                    self.scene = self.help_return;
                } else {
                    self.help_return = self.scene;
                    self.scene = Scene::Help;
                }
            }
            Action::Back => match self.scene {
                Scene::Help => self.scene = self.help_return,
                Scene::Settings => self.scene = Scene::Pet,
                Scene::Runner => {
                    // Tears down the session; pending countdown/tick deadlines
                    // die with it. An unfinished run is simply abandoned.
                    self.runner = None;
                    self.scene = Scene::Pet;
                }
                Scene::Pet => {}
            },
            Action::Feed => {
                let today = Local::now().date_naive();
                match pet::feed(&mut self.data, today) {
                    FeedOutcome::Fed { segments } => {
                        self.neglected = false;
                        self.react(true, format!("Munch! {segments} segments long now."));
                    }
                    FeedOutcome::OutOfFood => {
                        self.react(
                            false,
                            "No food left today. Earn treats in the Food Runner!".to_string(),
                        );
                    }
                }
                storage::save_main_data(&self.paths.main_path, &self.data);
            }
            Action::Stroke => {
                let today = Local::now().date_naive();
                pet::stroke(&mut self.data, today);
                self.neglected = false;
                self.react(true, "Wag wag.".to_string());
                storage::save_main_data(&self.paths.main_path, &self.data);
            }
            Action::OpenRunner => self.open_runner(),
            Action::OpenSettings => {
                self.settings_cursor = 0;
                self.scene = Scene::Settings;
            }
            Action::RunnerStart => {
                if let Some(rv) = self.runner.as_mut() {
                    match rv.session.phase {
                        RunnerPhase::Ready => begin_session(rv),
                        RunnerPhase::Over => {
                            rv.session.restart();
                            rv.result = None;
                            begin_session(rv);
                        }
                        _ => {}
                    }
                }
            }
            Action::RunnerDir(dir) => {
                if let Some(rv) = self.runner.as_mut() {
                    rv.session.commit_direction(dir);
                }
            }
            Action::RunnerSwipe { dx, dy } => {
                if let Some(rv) = self.runner.as_mut() {
                    rv.session.commit_swipe(dx, dy);
                }
            }
            Action::SettingsMove(delta) => {
                let len = render::SETTINGS_ENTRIES as i32;
                let mut next = self.settings_cursor as i32 + delta;
                if next < 0 {
                    next = len - 1;
                } else if next >= len {
                    next = 0;
                }
                self.settings_cursor = next as usize;
            }
            Action::SettingsToggle => match self.settings_cursor {
                0 => self.settings.sound_enabled = !self.settings.sound_enabled,
                1 => self.settings.vibration_enabled = !self.settings.vibration_enabled,
                _ => self.settings.enable_color = !self.settings.enable_color,
            },
        }
    }

    fn react(&mut self, happy: bool, note: String) {
        self.reaction = Some(Reaction {
            happy,
            note,
            until: Instant::now() + REACTION_SHOWN_FOR,
        });
    }

    fn open_runner(&mut self) {
        let stats = storage::load_runner_stats(&self.paths.runner_path);
        let show_tutorial = stats.games_played == 0 && !self.settings.tutorial_completed;
        self.runner = Some(RunnerView {
            session: RunnerSession::new(RunnerConfig::default()),
            stats,
            feedback: Feedback {
                sound: self.settings.sound_enabled,
                flash: self.settings.vibration_enabled,
            },
            next_tick_at: None,
            next_count_at: None,
            flash_until: None,
            result: None,
            show_tutorial,
        });
        self.scene = Scene::Runner;
    }

    /// Advance the runner's clocks: countdown steps on a one-second cadence,
    /// ticks on a deadline recomputed from the live level after every step.
    /// Leaving the scene (help overlay included) holds the clocks.
    fn drive_runner(&mut self) {
        if self.scene != Scene::Runner {
            return;
        }
        let Some(rv) = self.runner.as_mut() else {
            return;
        };
        let now = Instant::now();

        if let Some(until) = rv.flash_until {
            if now >= until {
                rv.flash_until = None;
            }
        }

        match rv.session.phase {
            RunnerPhase::Countdown { .. } => {
                if let Some(at) = rv.next_count_at {
                    if now >= at {
                        rv.session.countdown_step();
                        match rv.session.phase {
                            RunnerPhase::Countdown { .. } => {
                                rv.next_count_at = Some(at + Duration::from_secs(1));
                            }
                            RunnerPhase::Running => {
                                rv.next_count_at = None;
                                rv.next_tick_at = Some(now);
                            }
                            _ => {}
                        }
                    }
                }
            }
            RunnerPhase::Running => {
                if let Some(at) = rv.next_tick_at {
                    if now >= at {
                        match rv.session.advance() {
                            Some(TickEvent::Moved) => {
                                rv.next_tick_at = Some(now + rv.session.tick_interval());
                            }
                            Some(TickEvent::Collected { .. }) => {
                                if rv.feedback.flash {
                                    rv.flash_until = Some(now + COLLECT_FLASH_FOR);
                                }
                                if rv.feedback.sound {
                                    self.term.bell();
                                }
                                rv.next_tick_at = Some(now + rv.session.tick_interval());
                            }
                            Some(TickEvent::GameOver { level, collected }) => {
                                rv.next_tick_at = None;
                                // The one finalize per completed session,
                                // right at the Running -> Over transition.
                                let merged = game::finalize(&self.paths, level, collected);
                                let bonus_feeds =
                                    pet::bank_runner_food(&mut self.data, collected);
                                storage::save_main_data(&self.paths.main_path, &self.data);
                                rv.stats = merged;
                                rv.result = Some(SessionResult {
                                    level,
                                    collected,
                                    bonus_feeds,
                                });
                                if rv.feedback.sound {
                                    self.term.bell();
                                }
                            }
                            None => {}
                        }
                    }
                }
            }
            _ => {}
        }
    }

    fn render_frame(&mut self) -> anyhow::Result<()> {
        self.term.cur.clear(Color::Black);

        match self.scene {
            Scene::Pet => {
                let mood = match &self.reaction {
                    Some(r) if r.happy => PetMood::Happy,
                    _ if self.neglected => PetMood::Sulking,
                    _ => PetMood::Normal,
                };
                let note = match &self.reaction {
                    Some(r) => Some(r.note.as_str()),
                    None if self.neglected => Some("Someone missed you..."),
                    None => None,
                };
                let wag_tick = self.started_at.elapsed().as_millis() as u64 / 400;
                render::draw_pet_scene(
                    &mut self.term.cur,
                    &self.data,
                    &self.settings,
                    mood,
                    note,
                    wag_tick,
                );
            }
            Scene::Runner => {
                if let Some(rv) = self.runner.as_ref() {
                    let flash = rv.flash_until.is_some();
                    render::draw_runner_scene(
                        &mut self.term.cur,
                        &rv.session,
                        &rv.stats,
                        &self.settings,
                        flash,
                    );

                    if rv.show_tutorial {
                        render::draw_center_box(
                            &mut self.term.cur,
                            "How to play",
                            "Steer the dog with mouse drags (swipes)\n\
                             or the arrow keys / WASD.\n\n\
                             Catch the kibble to speed up.\n\
                             The fence ends the run.\n\
                             Every 10 kibble banked earns a bonus feed.\n\n\
                             Press any key to continue",
                        );
                    } else {
                        match rv.session.phase {
                            RunnerPhase::Ready => render::draw_center_box(
                                &mut self.term.cur,
                                "Food Runner",
                                "Catch the kibble, dodge the fence.\n\n\
                                 Enter to start",
                            ),
                            RunnerPhase::Over => {
                                if let Some(result) = &rv.result {
                                    let body = format!(
                                        "Final speed: {}\nFood collected: {}\nHigh score: {}\nBonus treats earned: {}\n\nEnter run again | Esc back",
                                        result.level,
                                        result.collected,
                                        rv.stats.high_score,
                                        result.bonus_feeds
                                    );
                                    render::draw_center_box(
                                        &mut self.term.cur,
                                        "Game over",
                                        &body,
                                    );
                                }
                            }
                            _ => {}
                        }
                    }
                }
            }
            Scene::Settings => {
                render::draw_settings(&mut self.term.cur, &self.settings, self.settings_cursor);
            }
            Scene::Help => {
                render::draw_center_box(
                    &mut self.term.cur,
                    "How to play",
                    "Feed the dog and it grows one segment longer\n\
                     (three feeds a day, streaks are tracked).\n\
                     Pet it to keep it cheerful.\n\n\
                     The Food Runner mini-game banks kibble;\n\
                     every 10 kibble converts to a bonus feed.\n\n\
                     f feed | s pet | g food runner\n\
                     tab settings | q quit\n\n\
                     Press any key to close",
                );
            }
        }

        self.term.present(true)?;
        Ok(())
    }
}

/// Arm the first deadline for a freshly-started session. Any stale deadline
/// from a previous run is dropped first so only one clock is ever live.
fn begin_session(rv: &mut RunnerView) {
    rv.next_tick_at = None;
    rv.next_count_at = None;
    rv.session.start();
    match rv.session.phase {
        RunnerPhase::Countdown { .. } => {
            rv.next_count_at = Some(Instant::now() + Duration::from_secs(1));
        }
        RunnerPhase::Running => {
            rv.next_tick_at = Some(Instant::now());
        }
        _ => {}
    }
}

pub(crate) fn run() -> anyhow::Result<()> {
    let mut app = App::init()?;
    app.run()?;
    Ok(())
}

/* -----------------------------
   Frame pacing helper
------------------------------ */

fn spin_sleep(target: Duration, now: Instant) {
    let end = now + target;
    loop {
        let t = Instant::now();
        if t >= end {
            break;
        }
        let left = end - t;
        if left > Duration::from_millis(2) {
            std::thread::sleep(Duration::from_millis(1));
        } else {
            std::hint::spin_loop();
        }
    }
}

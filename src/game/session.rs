use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::gesture;
use super::grid::{self, Direction, GridPos};

/// Session tuning: field geometry, input policy, and the speed curve.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RunnerConfig {
    pub(crate) grid_w: i32,
    pub(crate) grid_h: i32,
    pub(crate) spawn: GridPos,
    /// Accept a swipe straight back into the current facing.
    pub(crate) allow_reversal: bool,
    /// Three-step countdown before the first tick.
    pub(crate) use_countdown: bool,
    /// Body collision check; always a miss with a single segment but kept as
    /// the extension point for longer dogs.
    pub(crate) self_collision: bool,
    pub(crate) base_interval_ms: u64,
    pub(crate) step_decrement_ms: u64,
    pub(crate) min_interval_ms: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            grid_w: 10,
            grid_h: 15,
            spawn: GridPos::new(5, 7),
            allow_reversal: true,
            use_countdown: true,
            self_collision: true,
            base_interval_ms: 200,
            step_decrement_ms: 15,
            min_interval_ms: 50,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RunnerPhase {
    Ready,
    Countdown { step: u8 },
    Running,
    Over,
}

/// What a single tick produced, for the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TickEvent {
    Moved,
    Collected { level: u32 },
    GameOver { level: u32, collected: u32 },
}

/// One play-through of the Food Runner. All mutable state lives here and is
/// only touched from the driving loop; swipes land in the pending-direction
/// register (last write wins) and take effect on the next tick.
pub(crate) struct RunnerSession {
    cfg: RunnerConfig,
    rng: StdRng,
    pub(crate) phase: RunnerPhase,
    pub(crate) head: GridPos,
    pub(crate) facing: Direction,
    pub(crate) target: GridPos,
    /// Score and speed-curve input in one.
    pub(crate) level: u32,
    pub(crate) collected: u32,
    pending: Direction,
}

impl RunnerSession {
    pub(crate) fn new(cfg: RunnerConfig) -> Self {
        Self::with_rng(cfg, StdRng::from_entropy())
    }

    #[cfg(test)]
    pub(crate) fn with_seed(cfg: RunnerConfig, seed: u64) -> Self {
        Self::with_rng(cfg, StdRng::seed_from_u64(seed))
    }

    fn with_rng(cfg: RunnerConfig, mut rng: StdRng) -> Self {
        let head = cfg.spawn;
        let target = grid::place_target(cfg.grid_w, cfg.grid_h, &[head], &mut rng);
        Self {
            cfg,
            rng,
            phase: RunnerPhase::Ready,
            head,
            facing: Direction::Right,
            target,
            level: 1,
            collected: 0,
            pending: Direction::Right,
        }
    }

    /// Cells currently occupied by the dog. Length 1 today; the list keeps
    /// placement avoidance and the self-collision check honest for longer
    /// bodies.
    pub(crate) fn body(&self) -> Vec<GridPos> {
        vec![self.head]
    }

    pub(crate) fn start(&mut self) {
        if self.phase != RunnerPhase::Ready {
            return;
        }
        self.phase = if self.cfg.use_countdown {
            RunnerPhase::Countdown { step: 3 }
        } else {
            RunnerPhase::Running
        };
    }

    /// Advance the countdown one step; the last step lands in `Running`.
    pub(crate) fn countdown_step(&mut self) {
        if let RunnerPhase::Countdown { step } = self.phase {
            self.phase = if step <= 1 {
                RunnerPhase::Running
            } else {
                RunnerPhase::Countdown { step: step - 1 }
            };
        }
    }

    /// Full session reset back to `Ready`. The only way out of `Over`.
    pub(crate) fn restart(&mut self) {
        self.head = self.cfg.spawn;
        self.facing = Direction::Right;
        self.pending = Direction::Right;
        self.level = 1;
        self.collected = 0;
        let body = self.body();
        self.target = grid::place_target(self.cfg.grid_w, self.cfg.grid_h, &body, &mut self.rng);
        self.phase = RunnerPhase::Ready;
    }

    pub(crate) fn commit_swipe(&mut self, dx: f32, dy: f32) {
        if let Some(dir) = gesture::resolve_swipe(dx, dy) {
            self.commit_direction(dir);
        }
    }

    pub(crate) fn commit_direction(&mut self, dir: Direction) {
        if self.phase == RunnerPhase::Over {
            return;
        }
        if gesture::permitted(dir, self.facing, self.cfg.allow_reversal) {
            self.pending = dir;
        }
    }

    /// One simulation tick. Moves the dog one cell, handles the boundary and
    /// body checks, and replaces the target on a catch. Anything but the
    /// `Running` phase is a no-op, so the `Running -> Over` report fires
    /// exactly once per session.
    pub(crate) fn advance(&mut self) -> Option<TickEvent> {
        if self.phase != RunnerPhase::Running {
            return None;
        }

        self.facing = self.pending;
        let next = self.head.offset(self.facing);

        if !grid::in_bounds(next, self.cfg.grid_w, self.cfg.grid_h) {
            self.phase = RunnerPhase::Over;
            return Some(TickEvent::GameOver {
                level: self.level,
                collected: self.collected,
            });
        }

        if self.cfg.self_collision && grid::is_occupied(next, &self.body()) {
            self.phase = RunnerPhase::Over;
            return Some(TickEvent::GameOver {
                level: self.level,
                collected: self.collected,
            });
        }

        self.head = next;

        if self.head == self.target {
            self.level += 1;
            self.collected += 1;
            let body = self.body();
            self.target =
                grid::place_target(self.cfg.grid_w, self.cfg.grid_h, &body, &mut self.rng);
            return Some(TickEvent::Collected { level: self.level });
        }

        Some(TickEvent::Moved)
    }

    /// Delay until the next tick, recomputed from the live level so a catch
    /// speeds up the very next step.
    pub(crate) fn tick_interval(&self) -> Duration {
        tick_interval(&self.cfg, self.level)
    }

    pub(crate) fn grid_w(&self) -> i32 {
        self.cfg.grid_w
    }

    pub(crate) fn grid_h(&self) -> i32 {
        self.cfg.grid_h
    }
}

/// Pure speed curve: `max(floor, base - (level - 1) * step)`.
pub(crate) fn tick_interval(cfg: &RunnerConfig, level: u32) -> Duration {
    let dec = cfg.step_decrement_ms.saturating_mul(u64::from(level.saturating_sub(1)));
    let ms = cfg.base_interval_ms.saturating_sub(dec).max(cfg.min_interval_ms);
    Duration::from_millis(ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant_cfg() -> RunnerConfig {
        RunnerConfig {
            use_countdown: false,
            ..RunnerConfig::default()
        }
    }

    fn running_session(cfg: RunnerConfig) -> RunnerSession {
        let mut s = RunnerSession::with_seed(cfg, 42);
        s.target = GridPos::new(0, 0); // off the default path
        s.start();
        s
    }

    #[test]
    fn speed_curve_is_pure_and_floored() {
        let cfg = RunnerConfig::default();
        assert_eq!(tick_interval(&cfg, 1), Duration::from_millis(200));
        assert_eq!(tick_interval(&cfg, 2), Duration::from_millis(185));
        assert_eq!(tick_interval(&cfg, 11), Duration::from_millis(50));
        assert_eq!(tick_interval(&cfg, 100), Duration::from_millis(50));

        let mut prev = tick_interval(&cfg, 1);
        for level in 2..=80 {
            let cur = tick_interval(&cfg, level);
            assert!(cur <= prev, "interval grew at level {level}");
            prev = cur;
        }
    }

    #[test]
    fn uninput_run_hits_the_right_wall_after_five_ticks() {
        let mut s = running_session(instant_cfg());

        for expected_x in 6..=9 {
            let ev = s.advance();
            assert_eq!(ev, Some(TickEvent::Moved));
            assert_eq!(s.head, GridPos::new(expected_x, 7));
        }
        let ev = s.advance();
        assert_eq!(
            ev,
            Some(TickEvent::GameOver {
                level: 1,
                collected: 0
            })
        );
        assert_eq!(s.phase, RunnerPhase::Over);
        // The dog never leaves the grid.
        assert_eq!(s.head, GridPos::new(9, 7));
        // And the terminal report fires exactly once.
        assert_eq!(s.advance(), None);
        assert_eq!(s.phase, RunnerPhase::Over);
    }

    #[test]
    fn catching_the_target_levels_up_and_replaces_it() {
        let mut s = running_session(instant_cfg());
        s.target = GridPos::new(6, 7);

        s.commit_swipe(25.0, 0.0);
        let ev = s.advance();
        assert_eq!(ev, Some(TickEvent::Collected { level: 2 }));
        assert_eq!(s.head, GridPos::new(6, 7));
        assert_eq!(s.collected, 1);
        assert_ne!(s.target, GridPos::new(6, 7));
        assert!(grid::in_bounds(s.target, 10, 15));
        assert_eq!(s.tick_interval(), Duration::from_millis(185));
    }

    #[test]
    fn dead_zone_swipe_changes_nothing() {
        let mut s = running_session(instant_cfg());
        s.commit_swipe(5.0, 3.0);
        s.advance();
        assert_eq!(s.facing, Direction::Right);
        assert_eq!(s.head, GridPos::new(6, 7));
    }

    #[test]
    fn blocked_reversal_keeps_the_old_pending_direction() {
        let cfg = RunnerConfig {
            allow_reversal: false,
            ..instant_cfg()
        };
        let mut s = running_session(cfg);
        s.commit_direction(Direction::Left);
        s.advance();
        assert_eq!(s.facing, Direction::Right);
        assert_eq!(s.head, GridPos::new(6, 7));

        // Orthogonal turns still pass.
        s.commit_direction(Direction::Up);
        s.advance();
        assert_eq!(s.facing, Direction::Up);
        assert_eq!(s.head, GridPos::new(6, 6));
    }

    #[test]
    fn allowed_reversal_takes_effect() {
        let mut s = running_session(instant_cfg());
        s.commit_direction(Direction::Left);
        s.advance();
        assert_eq!(s.facing, Direction::Left);
        assert_eq!(s.head, GridPos::new(4, 7));
    }

    #[test]
    fn countdown_steps_through_three_to_running() {
        let mut s = RunnerSession::with_seed(RunnerConfig::default(), 42);
        assert_eq!(s.phase, RunnerPhase::Ready);
        s.start();
        assert_eq!(s.phase, RunnerPhase::Countdown { step: 3 });
        // No movement while counting down.
        assert_eq!(s.advance(), None);
        s.countdown_step();
        assert_eq!(s.phase, RunnerPhase::Countdown { step: 2 });
        s.countdown_step();
        assert_eq!(s.phase, RunnerPhase::Countdown { step: 1 });
        s.countdown_step();
        assert_eq!(s.phase, RunnerPhase::Running);
    }

    #[test]
    fn restart_is_a_full_reset() {
        let mut s = running_session(instant_cfg());
        s.target = GridPos::new(6, 7);
        s.advance(); // collect, level 2
        while s.phase == RunnerPhase::Running {
            s.advance();
        }
        assert_eq!(s.phase, RunnerPhase::Over);

        s.restart();
        assert_eq!(s.phase, RunnerPhase::Ready);
        assert_eq!(s.head, GridPos::new(5, 7));
        assert_eq!(s.facing, Direction::Right);
        assert_eq!(s.level, 1);
        assert_eq!(s.collected, 0);
        assert_ne!(s.target, s.head);
    }

    #[test]
    fn positions_stay_in_bounds_for_the_whole_session() {
        let cfg = instant_cfg();
        let mut s = RunnerSession::with_seed(cfg, 9);
        s.start();
        // Wander with a fixed input pattern until the wall ends it.
        let pattern = [
            Direction::Up,
            Direction::Left,
            Direction::Down,
            Direction::Right,
            Direction::Right,
        ];
        let mut i = 0;
        while s.phase == RunnerPhase::Running {
            s.commit_direction(pattern[i % pattern.len()]);
            s.advance();
            assert!(grid::in_bounds(s.head, cfg.grid_w, cfg.grid_h));
            assert!(grid::in_bounds(s.target, cfg.grid_w, cfg.grid_h));
            i += 1;
            assert!(i < 10_000, "session never terminated");
        }
    }
}

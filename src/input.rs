use crossterm::event::{
    self, Event, KeyCode, KeyEventKind, MouseButton, MouseEventKind,
};
use std::time::Duration;

use crate::game::Direction;
use crate::model::Scene;

/// One game cell is drawn two columns wide and one row tall; dragging across
/// one cell is worth 30 gesture points on either axis, so a short flick stays
/// inside the swipe dead zone.
const POINTS_PER_COL: f32 = 15.0;
const POINTS_PER_ROW: f32 = 30.0;

#[derive(Clone, Copy, Debug)]
pub(crate) enum UiEvent {
    Key(KeyCode),
    /// A completed mouse drag, scaled to gesture points.
    Swipe { dx: f32, dy: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Action {
    Quit,
    Back,
    HelpToggle,
    Feed,
    Stroke,
    OpenRunner,
    OpenSettings,
    RunnerStart,
    RunnerDir(Direction),
    RunnerSwipe { dx: f32, dy: f32 },
    SettingsMove(i32),
    SettingsToggle,
}

pub(crate) struct InputCollector {
    drag_origin: Option<(u16, u16)>,
}

impl InputCollector {
    pub(crate) fn new() -> Self {
        Self { drag_origin: None }
    }

    pub(crate) fn collect(&mut self, max_frame_time: Duration) -> anyhow::Result<Vec<UiEvent>> {
        let mut out = Vec::new();

        // poll with a tiny timeout so we stay responsive
        let timeout = std::cmp::min(Duration::from_millis(1), max_frame_time);
        while event::poll(timeout)? {
            match event::read()? {
                Event::Key(k) => {
                    if k.kind == KeyEventKind::Press || k.kind == KeyEventKind::Repeat {
                        out.push(UiEvent::Key(k.code));
                        if out.len() >= 32 {
                            break;
                        }
                    }
                }
                Event::Mouse(m) => match m.kind {
                    MouseEventKind::Down(MouseButton::Left) => {
                        self.drag_origin = Some((m.column, m.row));
                    }
                    MouseEventKind::Up(MouseButton::Left) => {
                        if let Some((ox, oy)) = self.drag_origin.take() {
                            let dx = (f32::from(m.column) - f32::from(ox)) * POINTS_PER_COL;
                            let dy = (f32::from(m.row) - f32::from(oy)) * POINTS_PER_ROW;
                            out.push(UiEvent::Swipe { dx, dy });
                        }
                    }
                    _ => {}
                },
                _ => {}
            }
        }
        Ok(out)
    }
}

pub(crate) fn map_event(scene: Scene, ev: UiEvent) -> Option<Action> {
    let key = match ev {
        UiEvent::Swipe { dx, dy } => {
            return if scene == Scene::Runner {
                Some(Action::RunnerSwipe { dx, dy })
            } else {
                None
            };
        }
        UiEvent::Key(key) => key,
    };

    // Global
    match key {
        KeyCode::Char('q') | KeyCode::Char('Q') => return Some(Action::Quit),
        KeyCode::Char('h') | KeyCode::Char('H') => return Some(Action::HelpToggle),
        KeyCode::Esc => return Some(Action::Back),
        _ => {}
    }

    match scene {
        Scene::Pet => match key {
            KeyCode::Char('f') | KeyCode::Char('F') => Some(Action::Feed),
            KeyCode::Char('s') | KeyCode::Char('S') => Some(Action::Stroke),
            KeyCode::Char('g') | KeyCode::Char('G') => Some(Action::OpenRunner),
            KeyCode::Tab => Some(Action::OpenSettings),
            _ => None,
        },
        Scene::Runner => match key {
            KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => {
                Some(Action::RunnerDir(Direction::Up))
            }
            KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => {
                Some(Action::RunnerDir(Direction::Down))
            }
            KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => {
                Some(Action::RunnerDir(Direction::Left))
            }
            KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => {
                Some(Action::RunnerDir(Direction::Right))
            }
            KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('r') | KeyCode::Char('R') => {
                Some(Action::RunnerStart)
            }
            _ => None,
        },
        Scene::Settings => match key {
            KeyCode::Up => Some(Action::SettingsMove(-1)),
            KeyCode::Down => Some(Action::SettingsMove(1)),
            KeyCode::Enter => Some(Action::SettingsToggle),
            KeyCode::Tab => Some(Action::Back),
            _ => None,
        },
        Scene::Help => None,
    }
}

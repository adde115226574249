/// Keyboard input tracker.
///
/// Movement is intent, not a held state: the last direction key seen
/// wins, and the player keeps that heading until another key arrives.
/// Restart and quit are edge-triggered on press.
///
/// Release events are ignored; terminals that report them would
/// otherwise produce a duplicate intent on key-up.

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::entity::Direction;

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_RESTART: &[KeyCode] = &[KeyCode::Char(' ')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];
const KEYS_PERF: &[KeyCode] = &[KeyCode::Char('p'), KeyCode::Char('P')];

pub fn direction_for(code: KeyCode) -> Option<Direction> {
    if KEYS_UP.contains(&code) {
        Some(Direction::UP)
    } else if KEYS_DOWN.contains(&code) {
        Some(Direction::DOWN)
    } else if KEYS_LEFT.contains(&code) {
        Some(Direction::LEFT)
    } else if KEYS_RIGHT.contains(&code) {
        Some(Direction::RIGHT)
    } else {
        None
    }
}

#[derive(Default)]
pub struct InputState {
    /// Keys pressed during the most recent drain_events() call.
    fresh_presses: Vec<KeyCode>,

    /// Last direction key pressed this drain.
    latest_direction: Option<Direction>,

    /// Raw key events collected during drain, for modifier checks.
    raw_events: Vec<KeyEvent>,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            fresh_presses: Vec::with_capacity(8),
            latest_direction: None,
            raw_events: Vec::with_capacity(8),
        }
    }

    /// Drain all pending terminal events. Call once per frame.
    pub fn drain_events(&mut self) {
        self.begin_frame();
        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.handle_key(key);
            }
        }
    }

    fn begin_frame(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();
        self.latest_direction = None;
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        self.raw_events.push(key);
        if let Some(dir) = direction_for(key.code) {
            self.latest_direction = Some(dir);
        }
        if !self.fresh_presses.contains(&key.code) {
            self.fresh_presses.push(key.code);
        }
    }

    /// Last direction pressed this frame, if any.
    pub fn direction(&self) -> Option<Direction> {
        self.latest_direction
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.fresh_presses.contains(c))
    }

    pub fn restart_pressed(&self) -> bool {
        self.any_pressed(KEYS_RESTART)
    }

    pub fn perf_toggle_pressed(&self) -> bool {
        self.any_pressed(KEYS_PERF)
    }

    pub fn quit_pressed(&self) -> bool {
        self.any_pressed(KEYS_QUIT) || self.ctrl_c_pressed()
    }

    /// Check if any raw event this frame has Ctrl+C
    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn feed(input: &mut InputState, codes: &[KeyCode]) {
        input.begin_frame();
        for &c in codes {
            input.handle_key(key(c));
        }
    }

    #[test]
    fn arrows_and_wasd_map_to_directions() {
        assert_eq!(direction_for(KeyCode::Up), Some(Direction::UP));
        assert_eq!(direction_for(KeyCode::Char('s')), Some(Direction::DOWN));
        assert_eq!(direction_for(KeyCode::Char('A')), Some(Direction::LEFT));
        assert_eq!(direction_for(KeyCode::Right), Some(Direction::RIGHT));
        assert_eq!(direction_for(KeyCode::Char('x')), None);
    }

    #[test]
    fn last_direction_wins() {
        let mut input = InputState::new();
        feed(&mut input, &[KeyCode::Up, KeyCode::Char('d'), KeyCode::Char('x')]);
        assert_eq!(input.direction(), Some(Direction::RIGHT));
        feed(&mut input, &[]);
        assert_eq!(input.direction(), None);
    }

    #[test]
    fn release_events_are_ignored() {
        let mut input = InputState::new();
        input.begin_frame();
        input.handle_key(KeyEvent {
            code: KeyCode::Left,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        });
        assert_eq!(input.direction(), None);
    }

    #[test]
    fn restart_and_quit_keys() {
        let mut input = InputState::new();
        feed(&mut input, &[KeyCode::Char(' ')]);
        assert!(input.restart_pressed());
        assert!(!input.quit_pressed());
        feed(&mut input, &[KeyCode::Char('P')]);
        assert!(input.perf_toggle_pressed());
        feed(&mut input, &[KeyCode::Esc]);
        assert!(input.quit_pressed());
        input.begin_frame();
        input.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(input.ctrl_c_pressed());
        assert!(input.quit_pressed());
    }
}

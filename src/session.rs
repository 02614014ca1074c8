use serde::Serialize;

use crate::dispatch::TestConfig;
use crate::runtime::SurfaceEvent;
use crate::score::{score_line, Remark, INITIAL_SCORE};

pub const INITIAL_SIZE: f64 = 250.0;
pub const SHRINK_FACTOR: f64 = 0.8;

/// Orientation of the optotype, named after the side the "E" opens towards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum_macros::Display)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Right,
        Direction::Left,
        Direction::Up,
        Direction::Down,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const LOW_CONTRAST_GRAY: Rgb = Rgb(200, 200, 200);
    pub const GLARE: Rgb = Rgb(255, 255, 250);
}

/// Supplies the target direction for each trial
pub trait DirectionSource {
    fn next_direction(&mut self) -> Direction;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Running,
    Done,
}

/// How a single input event was judged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    Correct,
    Incorrect,
    Quit,
    Interrupt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    #[strum(serialize = "incorrect response")]
    Incorrect,
    #[strum(serialize = "quit")]
    Quit,
    #[strum(serialize = "operator interrupt")]
    Interrupted,
    #[strum(serialize = "display failure")]
    Aborted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stimulus {
    pub size: f64,
    pub direction: Direction,
    pub color: Rgb,
}

/// Everything the surface needs to draw one trial
#[derive(Debug, Clone, PartialEq)]
pub struct StimulusFrame {
    pub label: &'static str,
    pub instruction: String,
    pub stimulus: Stimulus,
    pub background: Rgb,
}

/// Outcome of a finished session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcuityResult {
    pub label: &'static str,
    pub last_direction: Direction,
    pub score: String,
    pub remark: Remark,
    pub correct_responses: u32,
    pub final_size: f64,
    pub end_reason: EndReason,
}

/// Staircase state for one run of an acuity test
#[derive(Debug, Clone)]
pub struct TestSession {
    config: &'static TestConfig,
    size: f64,
    direction: Direction,
    score: String,
    state: SessionState,
    correct_responses: u32,
    end_reason: Option<EndReason>,
}

impl TestSession {
    pub fn new<D: DirectionSource + ?Sized>(config: &'static TestConfig, directions: &mut D) -> Self {
        Self {
            config,
            size: INITIAL_SIZE,
            direction: directions.next_direction(),
            score: INITIAL_SCORE.to_string(),
            state: SessionState::Running,
            correct_responses: 0,
            end_reason: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == SessionState::Running
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    /// Always the score line for the current size
    pub fn score(&self) -> &str {
        &self.score
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn frame(&self) -> StimulusFrame {
        StimulusFrame {
            label: self.config.label,
            instruction: format!("Direction: {}. Press ESC to quit.", self.direction),
            stimulus: Stimulus {
                size: self.size,
                direction: self.direction,
                color: self.config.optotype,
            },
            background: self.config.background,
        }
    }

    /// Applies one surface event. Returns `None` when the event has no
    /// meaning for the staircase (or the session is already done).
    pub fn on_event<D: DirectionSource + ?Sized>(
        &mut self,
        event: SurfaceEvent,
        directions: &mut D,
    ) -> Option<Response> {
        if !self.is_running() {
            return None;
        }

        match event {
            SurfaceEvent::Direction(answer) => Some(self.respond(answer, directions)),
            SurfaceEvent::Quit => {
                self.end(EndReason::Quit);
                Some(Response::Quit)
            }
            SurfaceEvent::Interrupt => {
                self.end(EndReason::Interrupted);
                Some(Response::Interrupt)
            }
            SurfaceEvent::Other => None,
        }
    }

    fn respond<D: DirectionSource + ?Sized>(
        &mut self,
        answer: Direction,
        directions: &mut D,
    ) -> Response {
        if answer == self.direction {
            self.size *= SHRINK_FACTOR;
            self.score = score_line(self.size);
            self.correct_responses += 1;
            log::debug!(
                "{}: correct, size {:.2}, score {}",
                self.config.label,
                self.size,
                self.score
            );
            self.direction = directions.next_direction();
            Response::Correct
        } else {
            log::debug!(
                "{}: incorrect ({} shown, {} answered), score stays {}",
                self.config.label,
                self.direction,
                answer,
                self.score
            );
            self.end(EndReason::Incorrect);
            Response::Incorrect
        }
    }

    /// Ends the session after the surface stopped working
    pub fn abort(&mut self) {
        if self.is_running() {
            self.end(EndReason::Aborted);
        }
    }

    fn end(&mut self, reason: EndReason) {
        self.state = SessionState::Done;
        self.end_reason = Some(reason);
    }

    pub fn finish(self) -> AcuityResult {
        AcuityResult {
            label: self.config.label,
            last_direction: self.direction,
            remark: Remark::from_score_line(&self.score),
            score: self.score,
            correct_responses: self.correct_responses,
            final_size: self.size,
            end_reason: self.end_reason.unwrap_or(EndReason::Quit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acuity::ScriptedDirections;
    use crate::dispatch::{TestKind, TEST_CONFIGS};

    fn cataract() -> &'static TestConfig {
        TestKind::Cataract.config()
    }

    #[test]
    fn new_session_starts_at_initial_state() {
        let mut dirs = ScriptedDirections::new(vec![Direction::Left]);
        let session = TestSession::new(cataract(), &mut dirs);

        assert_eq!(session.size(), 250.0);
        assert_eq!(session.score(), "20/200");
        assert_eq!(session.direction(), Direction::Left);
        assert!(session.is_running());
    }

    #[test]
    fn correct_response_shrinks_and_rescores() {
        let mut dirs = ScriptedDirections::new(vec![Direction::Up, Direction::Down]);
        let mut session = TestSession::new(cataract(), &mut dirs);

        let r = session.on_event(SurfaceEvent::Direction(Direction::Up), &mut dirs);

        assert_eq!(r, Some(Response::Correct));
        assert_eq!(session.size(), 200.0);
        assert_eq!(session.score(), "20/640");
        assert_eq!(session.direction(), Direction::Down);
        assert!(session.is_running());
    }

    #[test]
    fn size_shrinks_geometrically_on_every_correct_response() {
        let mut dirs = ScriptedDirections::new(vec![Direction::Right]);
        let mut session = TestSession::new(cataract(), &mut dirs);

        let mut expected = 250.0;
        for _ in 0..10 {
            let before = session.size();
            session.on_event(SurfaceEvent::Direction(Direction::Right), &mut dirs);
            expected *= 0.8;
            assert!(session.size() < before);
            assert_eq!(session.size(), expected);
            assert_eq!(session.score(), score_line(session.size()));
        }
        assert_eq!(session.correct_responses, 10);
    }

    #[test]
    fn incorrect_response_keeps_last_score_and_ends() {
        let mut dirs = ScriptedDirections::new(vec![Direction::Up, Direction::Left]);
        let mut session = TestSession::new(cataract(), &mut dirs);

        session.on_event(SurfaceEvent::Direction(Direction::Up), &mut dirs);
        let r = session.on_event(SurfaceEvent::Direction(Direction::Right), &mut dirs);

        assert_eq!(r, Some(Response::Incorrect));
        assert_eq!(session.state(), SessionState::Done);
        assert_eq!(session.size(), 200.0);

        let result = session.finish();
        assert_eq!(result.score, "20/640");
        assert_eq!(result.end_reason, EndReason::Incorrect);
    }

    #[test]
    fn incorrect_first_response_reports_initial_score() {
        let mut dirs = ScriptedDirections::new(vec![Direction::Up]);
        let mut session = TestSession::new(cataract(), &mut dirs);

        session.on_event(SurfaceEvent::Direction(Direction::Down), &mut dirs);
        let result = session.finish();

        assert_eq!(result.score, "20/200");
        assert_eq!(result.remark, Remark::Poor);
        assert_eq!(result.final_size, 250.0);
    }

    #[test]
    fn quit_freezes_current_score() {
        let mut dirs = ScriptedDirections::new(vec![Direction::Left]);
        let mut session = TestSession::new(cataract(), &mut dirs);
        session.on_event(SurfaceEvent::Direction(Direction::Left), &mut dirs);
        session.on_event(SurfaceEvent::Direction(Direction::Left), &mut dirs);
        let score = session.score().to_string();

        assert_eq!(
            session.on_event(SurfaceEvent::Quit, &mut dirs),
            Some(Response::Quit)
        );
        assert!(!session.is_running());

        let result = session.finish();
        assert_eq!(result.score, score);
        assert_eq!(result.end_reason, EndReason::Quit);
    }

    #[test]
    fn other_events_are_ignored() {
        let mut dirs = ScriptedDirections::new(vec![Direction::Left]);
        let mut session = TestSession::new(cataract(), &mut dirs);

        assert_eq!(session.on_event(SurfaceEvent::Other, &mut dirs), None);
        assert!(session.is_running());
        assert_eq!(session.size(), 250.0);
    }

    #[test]
    fn done_session_ignores_further_events() {
        let mut dirs = ScriptedDirections::new(vec![Direction::Left]);
        let mut session = TestSession::new(cataract(), &mut dirs);
        session.on_event(SurfaceEvent::Interrupt, &mut dirs);

        assert_eq!(
            session.on_event(SurfaceEvent::Direction(Direction::Left), &mut dirs),
            None
        );
        assert_eq!(session.size(), 250.0);
        assert_eq!(session.finish().end_reason, EndReason::Interrupted);
    }

    #[test]
    fn frame_carries_config_colors_and_instruction() {
        let mut dirs = ScriptedDirections::new(vec![Direction::Down]);
        let config = &TEST_CONFIGS[2];
        let session = TestSession::new(config, &mut dirs);
        let frame = session.frame();

        assert_eq!(frame.label, "LOW CONTRAST");
        assert_eq!(frame.instruction, "Direction: DOWN. Press ESC to quit.");
        assert_eq!(frame.stimulus.color, Rgb::LOW_CONTRAST_GRAY);
        assert_eq!(frame.background, Rgb::WHITE);
        assert_eq!(frame.stimulus.size, 250.0);
    }

    #[test]
    fn abort_only_applies_while_running() {
        let mut dirs = ScriptedDirections::new(vec![Direction::Up]);
        let mut session = TestSession::new(cataract(), &mut dirs);
        session.on_event(SurfaceEvent::Quit, &mut dirs);
        session.abort();
        assert_eq!(session.finish().end_reason, EndReason::Quit);
    }
}

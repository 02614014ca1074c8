use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use crate::kiosk::IdleStatus;
use crate::session::{Direction, StimulusFrame};

/// Input events the kiosk and the acuity engine react to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceEvent {
    Direction(Direction),
    Quit,
    /// Operator-initiated shutdown (Ctrl+C)
    Interrupt,
    Other,
}

/// Drawing target plus its input event source
pub trait RenderSurface {
    /// Stages one stimulus frame; nothing is shown until `present`
    fn draw_frame(&mut self, frame: &StimulusFrame) -> io::Result<()>;

    fn present(&mut self) -> io::Result<()>;

    /// Draws the between-tests screen
    fn draw_idle(&mut self, status: &IdleStatus) -> io::Result<()>;

    /// With `Some(timeout)`, waits at most that long and returns `Ok(None)`
    /// if nothing arrived. With `None`, blocks until an event arrives.
    fn next_event(&mut self, timeout: Option<Duration>) -> io::Result<Option<SurfaceEvent>>;
}

/// Scripted surface for tests.
///
/// Blocking reads (during a session) pop from the session script, timed reads
/// (the idle loop) pop from the idle script, where `None` stands for a poll
/// that timed out. An exhausted script yields `Interrupt` so loops terminate.
#[derive(Debug, Default)]
pub struct ScriptedSurface {
    session_events: VecDeque<SurfaceEvent>,
    idle_events: VecDeque<Option<SurfaceEvent>>,
    pub frames: Vec<StimulusFrame>,
    pub presented: Vec<StimulusFrame>,
    pub idle_draws: usize,
    pub idle_polls: usize,
    staged: Option<StimulusFrame>,
    fail_draws: bool,
}

impl ScriptedSurface {
    pub fn new(session_events: Vec<SurfaceEvent>) -> Self {
        Self {
            session_events: session_events.into(),
            ..Self::default()
        }
    }

    pub fn with_idle(mut self, idle_events: Vec<Option<SurfaceEvent>>) -> Self {
        self.idle_events = idle_events.into();
        self
    }

    /// Makes every `draw_frame` fail, as a detached terminal would
    pub fn failing() -> Self {
        Self {
            fail_draws: true,
            ..Self::default()
        }
    }

    pub fn remaining_session_events(&self) -> usize {
        self.session_events.len()
    }
}

impl RenderSurface for ScriptedSurface {
    fn draw_frame(&mut self, frame: &StimulusFrame) -> io::Result<()> {
        if self.fail_draws {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "surface detached"));
        }
        self.frames.push(frame.clone());
        self.staged = Some(frame.clone());
        Ok(())
    }

    fn present(&mut self) -> io::Result<()> {
        if let Some(frame) = self.staged.take() {
            self.presented.push(frame);
        }
        Ok(())
    }

    fn draw_idle(&mut self, _status: &IdleStatus) -> io::Result<()> {
        self.idle_draws += 1;
        Ok(())
    }

    fn next_event(&mut self, timeout: Option<Duration>) -> io::Result<Option<SurfaceEvent>> {
        match timeout {
            None => Ok(Some(
                self.session_events
                    .pop_front()
                    .unwrap_or(SurfaceEvent::Interrupt),
            )),
            Some(_) => {
                self.idle_polls += 1;
                Ok(self
                    .idle_events
                    .pop_front()
                    .unwrap_or(Some(SurfaceEvent::Interrupt)))
            }
        }
    }
}

use log::{error, info};
use rand::{rngs::ThreadRng, Rng};

use crate::dispatch::TestConfig;
use crate::runtime::RenderSurface;
use crate::session::{AcuityResult, Direction, DirectionSource, TestSession};

/// Uniformly random directions, independent of the previous draw
#[derive(Debug, Clone)]
pub struct RandomDirections<R: Rng> {
    rng: R,
}

impl RandomDirections<ThreadRng> {
    pub fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }
}

impl Default for RandomDirections<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> RandomDirections<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> DirectionSource for RandomDirections<R> {
    fn next_direction(&mut self) -> Direction {
        Direction::ALL[self.rng.gen_range(0..Direction::ALL.len())]
    }
}

/// Replays a fixed sequence of directions, wrapping around at the end
#[derive(Debug, Clone)]
pub struct ScriptedDirections {
    sequence: Vec<Direction>,
    next: usize,
}

impl ScriptedDirections {
    pub fn new(sequence: Vec<Direction>) -> Self {
        assert!(!sequence.is_empty(), "direction script must not be empty");
        Self { sequence, next: 0 }
    }
}

impl DirectionSource for ScriptedDirections {
    fn next_direction(&mut self) -> Direction {
        let d = self.sequence[self.next % self.sequence.len()];
        self.next += 1;
        d
    }
}

/// Drives one session from the initial stimulus until it is done.
///
/// Every iteration stages and presents exactly one frame, then blocks until
/// the surface delivers an event the staircase reacts to. A surface failure
/// ends the session early; the caller still gets a well-formed result.
pub fn run_session<S, D>(config: &'static TestConfig, surface: &mut S, directions: &mut D) -> AcuityResult
where
    S: RenderSurface + ?Sized,
    D: DirectionSource + ?Sized,
{
    info!("Launching {} test", config.label);
    let mut session = TestSession::new(config, directions);

    while session.is_running() {
        let shown = surface
            .draw_frame(&session.frame())
            .and_then(|_| surface.present());
        if let Err(e) = shown {
            error!("{} test: could not draw stimulus: {}", config.label, e);
            session.abort();
            break;
        }

        if let Err(e) = wait_for_response(&mut session, surface, directions) {
            error!("{} test: input source failed: {}", config.label, e);
            session.abort();
        }
    }

    let result = session.finish();
    info!("TEST SCORE: {}", result.score);
    info!("TEST REMARK: {}", result.remark.operator_text());
    info!(
        "{} TEST COMPLETE ({}, {} correct). Final Score Logged: {}",
        result.label, result.end_reason, result.correct_responses, result.score
    );
    match serde_json::to_string(&result) {
        Ok(json) => info!("RESULT {}", json),
        Err(e) => error!("could not serialize result: {}", e),
    }
    result
}

fn wait_for_response<S, D>(
    session: &mut TestSession,
    surface: &mut S,
    directions: &mut D,
) -> std::io::Result<()>
where
    S: RenderSurface + ?Sized,
    D: DirectionSource + ?Sized,
{
    loop {
        if let Some(event) = surface.next_event(None)? {
            if session.on_event(event, directions).is_some() {
                return Ok(());
            }
        }
    }
}

use std::collections::VecDeque;
use std::time::Duration;

use log::{error, info};

use crate::acuity::run_session;
use crate::channel::{CommandChannel, Transport};
use crate::config::Config;
use crate::dispatch::{default_action, dispatch, Action, SystemCommand};
use crate::error::{KioskError, Result};
use crate::runtime::{RenderSurface, SurfaceEvent};
use crate::session::{AcuityResult, DirectionSource, EndReason};

const RECENT_ACTIVITY: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopSettings {
    pub poll_interval: Duration,
    pub discard_backlog: bool,
    pub exit_on_shutdown_command: bool,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(10),
            discard_backlog: true,
            exit_on_shutdown_command: false,
        }
    }
}

impl From<&Config> for LoopSettings {
    fn from(cfg: &Config) -> Self {
        Self {
            poll_interval: Duration::from_millis(cfg.poll_interval_ms),
            discard_backlog: cfg.discard_backlog,
            exit_on_shutdown_command: cfg.exit_on_shutdown_command,
        }
    }
}

/// What the idle screen shows between tests
#[derive(Debug, Clone, Default)]
pub struct IdleStatus {
    pub port: String,
    pub baud_rate: u32,
    pub last_result: Option<AcuityResult>,
    pub recent: VecDeque<String>,
    pub sessions_run: usize,
}

impl IdleStatus {
    pub fn new(port: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            port: port.into(),
            baud_rate,
            ..Self::default()
        }
    }

    pub fn record(&mut self, line: impl Into<String>) {
        if self.recent.len() == RECENT_ACTIVITY {
            self.recent.pop_front();
        }
        self.recent.push_back(line.into());
    }
}

/// Why the listen loop returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shutdown {
    /// Esc on the idle screen
    Operator,
    /// Ctrl+C, on the idle screen or during a test
    Interrupted,
    ShutdownCommand,
}

pub struct Kiosk<T: Transport, S: RenderSurface, D: DirectionSource> {
    channel: CommandChannel<T>,
    surface: S,
    directions: D,
    settings: LoopSettings,
    status: IdleStatus,
}

impl<T: Transport, S: RenderSurface, D: DirectionSource> Kiosk<T, S, D> {
    pub fn new(
        channel: CommandChannel<T>,
        surface: S,
        directions: D,
        settings: LoopSettings,
        baud_rate: u32,
    ) -> Self {
        let status = IdleStatus::new(channel.port_name(), baud_rate);
        Self {
            channel,
            surface,
            directions,
            settings,
            status,
        }
    }

    pub fn status(&self) -> &IdleStatus {
        &self.status
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Runs until the operator stops the kiosk or the link fails.
    ///
    /// A transport error is fatal: the channel is closed before the error is
    /// returned. Every other exit path leaves closing to `Drop`.
    pub fn run(&mut self) -> Result<Shutdown> {
        info!(
            "Listener active on {} @ {} bps",
            self.status.port, self.status.baud_rate
        );
        match self.listen() {
            Ok(shutdown) => {
                info!("Listener stopped ({:?})", shutdown);
                Ok(shutdown)
            }
            Err(e) => {
                error!("FATAL: {}", e);
                self.channel.close();
                Err(e)
            }
        }
    }

    fn listen(&mut self) -> Result<Shutdown> {
        let mut redraw = true;
        loop {
            if redraw {
                self.surface
                    .draw_idle(&self.status)
                    .map_err(KioskError::surface)?;
                redraw = false;
            }

            if let Some(command) = self.channel.try_read_command()? {
                match dispatch(&command) {
                    Action::Ignore => {}
                    Action::RunTest(config) => {
                        self.status.record(format!("{} test started", config.label));
                        let result = run_session(config, &mut self.surface, &mut self.directions);
                        let interrupted = result.end_reason == EndReason::Interrupted;
                        self.finish_session(result)?;
                        if interrupted {
                            return Ok(Shutdown::Interrupted);
                        }
                    }
                    action => {
                        default_action(&action);
                        self.status.record(command.as_str());
                        if action == Action::System(SystemCommand::Shutdown)
                            && self.settings.exit_on_shutdown_command
                        {
                            return Ok(Shutdown::ShutdownCommand);
                        }
                    }
                }
                redraw = true;
            }

            // doubles as the idle sleep between channel polls
            match self
                .surface
                .next_event(Some(self.settings.poll_interval))
                .map_err(KioskError::surface)?
            {
                Some(SurfaceEvent::Quit) => return Ok(Shutdown::Operator),
                Some(SurfaceEvent::Interrupt) => return Ok(Shutdown::Interrupted),
                Some(_) => redraw = true,
                None => {}
            }
        }
    }

    fn finish_session(&mut self, result: AcuityResult) -> Result<()> {
        self.status.record(format!(
            "{} test: {} ({})",
            result.label, result.score, result.remark
        ));
        self.status.sessions_run += 1;
        self.status.last_result = Some(result);

        if self.settings.discard_backlog {
            self.channel.discard_backlog()?;
        }
        Ok(())
    }
}

pub mod optotype;
pub mod screen;

use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, style::Color, Terminal};

use crate::kiosk::IdleStatus;
use crate::runtime::{RenderSurface, SurfaceEvent};
use crate::session::{Direction, Rgb, StimulusFrame};
use screen::{IdleScreen, StimulusScreen};

pub fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

/// Maps a key press onto a surface event
pub fn map_key(key: KeyEvent) -> SurfaceEvent {
    if key.kind != KeyEventKind::Press {
        return SurfaceEvent::Other;
    }
    match key.code {
        KeyCode::Up => SurfaceEvent::Direction(Direction::Up),
        KeyCode::Down => SurfaceEvent::Direction(Direction::Down),
        KeyCode::Left => SurfaceEvent::Direction(Direction::Left),
        KeyCode::Right => SurfaceEvent::Direction(Direction::Right),
        KeyCode::Esc => SurfaceEvent::Quit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            SurfaceEvent::Interrupt
        }
        _ => SurfaceEvent::Other,
    }
}

/// Full-screen terminal surface. Raw mode and the alternate screen are held
/// for the lifetime of the value and restored on drop.
pub struct TerminalSurface {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    staged: Option<StimulusFrame>,
    shown: Option<StimulusFrame>,
}

impl TerminalSurface {
    pub fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(e);
        }
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        Ok(Self {
            terminal,
            staged: None,
            shown: None,
        })
    }

    fn redraw_stimulus(&mut self) -> io::Result<()> {
        if let Some(frame) = &self.shown {
            self.terminal
                .draw(|f| f.render_widget(StimulusScreen { frame }, f.area()))?;
        }
        Ok(())
    }
}

impl RenderSurface for TerminalSurface {
    fn draw_frame(&mut self, frame: &StimulusFrame) -> io::Result<()> {
        self.staged = Some(frame.clone());
        Ok(())
    }

    fn present(&mut self) -> io::Result<()> {
        if let Some(frame) = self.staged.take() {
            self.shown = Some(frame);
        }
        self.redraw_stimulus()
    }

    fn draw_idle(&mut self, status: &IdleStatus) -> io::Result<()> {
        self.shown = None;
        self.terminal
            .draw(|f| f.render_widget(IdleScreen { status }, f.area()))?;
        Ok(())
    }

    fn next_event(&mut self, timeout: Option<Duration>) -> io::Result<Option<SurfaceEvent>> {
        if let Some(t) = timeout {
            if !event::poll(t)? {
                return Ok(None);
            }
        }
        match event::read()? {
            Event::Key(key) => Ok(Some(map_key(key))),
            Event::Resize(_, _) => {
                self.terminal.autoresize()?;
                self.redraw_stimulus()?;
                Ok(Some(SurfaceEvent::Other))
            }
            _ => Ok(Some(SurfaceEvent::Other)),
        }
    }
}

impl Drop for TerminalSurface {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn arrows_map_to_directions() {
        assert_eq!(
            map_key(press(KeyCode::Up)),
            SurfaceEvent::Direction(Direction::Up)
        );
        assert_eq!(
            map_key(press(KeyCode::Down)),
            SurfaceEvent::Direction(Direction::Down)
        );
        assert_eq!(
            map_key(press(KeyCode::Left)),
            SurfaceEvent::Direction(Direction::Left)
        );
        assert_eq!(
            map_key(press(KeyCode::Right)),
            SurfaceEvent::Direction(Direction::Right)
        );
    }

    #[test]
    fn escape_quits_and_ctrl_c_interrupts() {
        assert_eq!(map_key(press(KeyCode::Esc)), SurfaceEvent::Quit);
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            SurfaceEvent::Interrupt
        );
        assert_eq!(map_key(press(KeyCode::Char('c'))), SurfaceEvent::Other);
    }

    #[test]
    fn other_keys_and_releases_are_other() {
        assert_eq!(map_key(press(KeyCode::Enter)), SurfaceEvent::Other);
        let mut release = press(KeyCode::Up);
        release.kind = KeyEventKind::Release;
        assert_eq!(map_key(release), SurfaceEvent::Other);
    }

    #[test]
    fn colors_convert_to_rgb() {
        assert_eq!(to_color(Rgb::GLARE), Color::Rgb(255, 255, 250));
    }
}

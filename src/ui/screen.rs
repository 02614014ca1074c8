use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use super::{optotype::Optotype, to_color};
use crate::kiosk::IdleStatus;
use crate::session::{Rgb, StimulusFrame};

const HORIZONTAL_MARGIN: u16 = 2;

/// One trial: label, instruction line and the optotype on the test background
pub struct StimulusScreen<'a> {
    pub frame: &'a StimulusFrame,
}

impl Widget for StimulusScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let frame = self.frame;
        let text_style = Style::default()
            .fg(to_color(Rgb::BLACK))
            .bg(to_color(frame.background));
        buf.set_style(area, text_style);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // label
                Constraint::Length(1), // instruction
                Constraint::Min(0),    // stimulus
            ])
            .split(area);

        Paragraph::new(Span::styled(
            format!("{} TEST", frame.label),
            text_style.add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

        Paragraph::new(Span::styled(frame.instruction.as_str(), text_style))
            .render(chunks[1], buf);

        Optotype {
            stimulus: &frame.stimulus,
        }
        .render(chunks[2], buf);
    }
}

/// Between tests: connection info, the last result and recent commands
pub struct IdleScreen<'a> {
    pub status: &'a IdleStatus,
}

impl Widget for IdleScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let status = self.status;
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .constraints([
                Constraint::Length(3), // header
                Constraint::Length(5), // last result
                Constraint::Min(0),    // activity
                Constraint::Length(1), // help
            ])
            .split(area);

        Paragraph::new(vec![
            Line::from(Span::styled(
                format!(
                    "--- Listener Active on {} @ {} bps ---",
                    status.port, status.baud_rate
                ),
                bold_style.fg(Color::Green),
            )),
            Line::from(Span::styled(
                "Waiting for commands from the kiosk...",
                dim_style,
            )),
        ])
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

        let result_lines = match &status.last_result {
            Some(result) => vec![
                Line::from(vec![
                    Span::styled(format!("{} TEST  ", result.label), bold_style),
                    Span::styled(result.score.clone(), bold_style.fg(Color::Cyan)),
                ]),
                Line::from(result.remark.operator_text()),
                Line::from(Span::styled(
                    format!(
                        "{} correct, ended by {}",
                        result.correct_responses, result.end_reason
                    ),
                    dim_style,
                )),
            ],
            None => vec![Line::from(Span::styled("No tests run yet", dim_style))],
        };
        Paragraph::new(result_lines)
            .block(Block::default().borders(Borders::ALL).title("Last test"))
            .wrap(Wrap { trim: true })
            .render(chunks[1], buf);

        let activity: Vec<Line> = status
            .recent
            .iter()
            .rev()
            .map(|l| Line::from(l.as_str()))
            .collect();
        Paragraph::new(activity)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Recent activity ({} tests)", status.sessions_run)),
            )
            .render(chunks[2], buf);

        Paragraph::new(Span::styled("(esc) stop listener", dim_style))
            .alignment(Alignment::Center)
            .render(chunks[3], buf);
    }
}

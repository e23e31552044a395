use crate::shared::DisplayState;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use super::grid::draw_step_grid;
use super::mode::TuiState;

const HELP: &str =
    "space play/stop  s stop  arrows move  enter cycle  r random  i enter tx  [ ] { } bpm  - = swing  l share  q quit";

pub fn render(frame: &mut Frame, area: Rect, state: &DisplayState, ts: &TuiState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // identifier / entry box
            Constraint::Min(8),    // step grid
            Constraint::Length(1), // status line
            Constraint::Length(1), // notice
            Constraint::Length(1), // help
        ])
        .split(area);

    draw_header(frame, sections[0], state, ts);
    let playhead = state.playing.then_some(state.playhead);
    draw_step_grid(frame, sections[1], &state.cells, playhead, state.selected);
    draw_status(frame, sections[2], state);
    draw_notice(frame, sections[3], state);
    frame.render_widget(
        Paragraph::new(HELP).style(Style::default().fg(Color::DarkGray)),
        sections[4],
    );
}

fn draw_header(frame: &mut Frame, area: Rect, state: &DisplayState, ts: &TuiState) {
    let (title, body, style) = match ts.entry_text() {
        Some(text) => (
            " enter tx hash (enter to load, esc to cancel) ",
            format!("{text}_"),
            Style::default().fg(Color::Yellow),
        ),
        None => (" txbeat ", state.identifier.clone(), Style::default().fg(Color::White)),
    };
    let block = Block::default().borders(Borders::ALL).title(title);
    frame.render_widget(Paragraph::new(body).style(style).block(block), area);
}

fn draw_status(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let play = if state.playing {
        Span::styled("▶ playing", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
    } else {
        Span::styled("■ stopped", Style::default().fg(Color::Gray))
    };
    let line = Line::from(vec![
        play,
        Span::raw(format!("  {} bpm  swing {}%  ", state.bpm, state.swing)),
        Span::raw(format!("step {:02}  ", state.playhead + 1)),
        Span::styled(state.audio.label(), Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_notice(frame: &mut Frame, area: Rect, state: &DisplayState) {
    if let Some(text) = &state.notice {
        let notice = Paragraph::new(text.as_str()).style(Style::default().fg(Color::Yellow));
        frame.render_widget(notice, area);
    }
}

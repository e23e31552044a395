use crate::shared::{StepKind, STEPS, STEPS_PER_BAR};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

const COLS: usize = STEPS_PER_BAR;
const ROWS: usize = STEPS / STEPS_PER_BAR;

fn cell_style(kind: StepKind) -> Style {
    match kind {
        StepKind::Kick => Style::default().fg(Color::Black).bg(Color::LightCyan),
        StepKind::Snare => Style::default().fg(Color::Black).bg(Color::LightMagenta),
        StepKind::Off => Style::default().fg(Color::DarkGray),
    }
}

fn cell_glyph(kind: StepKind) -> &'static str {
    match kind {
        StepKind::Kick => "K",
        StepKind::Snare => "S",
        StepKind::Off => "·",
    }
}

pub fn draw_step_grid(
    frame: &mut Frame,
    area: Rect,
    cells: &[StepKind; STEPS],
    playhead: Option<usize>,
    selected: usize,
) {
    let row_constraints = [Constraint::Ratio(1, ROWS as u32); ROWS];
    let col_constraints = [Constraint::Ratio(1, COLS as u32); COLS];

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(row_constraints)
        .split(area);

    for (row_idx, row_area) in rows.iter().enumerate() {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(col_constraints)
            .split(*row_area);

        for (col_idx, cell_area) in cols.iter().enumerate() {
            let idx = row_idx * COLS + col_idx;
            let kind = cells[idx];
            let mut style = cell_style(kind);
            if playhead == Some(idx) {
                style = style.bg(Color::Yellow).fg(Color::Black).add_modifier(Modifier::BOLD);
            }
            // beat starts get a brighter border so bars read at a glance
            let border = if idx == selected {
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
            } else if idx % 4 == 0 {
                Style::default().fg(Color::Gray)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            let block = Block::default().borders(Borders::ALL).border_style(border);
            let cell = Paragraph::new(Line::from(cell_glyph(kind)).centered())
                .style(style)
                .block(block);
            frame.render_widget(cell, *cell_area);
        }
    }
}

use std::time::Duration;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crate::shared::InputEvent;
use super::mode::{Mode, TuiState};

// identifiers are 66 chars, leave a little room for pasted whitespace
const MAX_ENTRY: usize = 80;

// poll for input from tui, tracks entry state in tuistate,
// resolves keys to sequences of input events for the backend to handle
pub fn poll_input(timeout: Duration, ts: &mut TuiState) -> anyhow::Result<Vec<InputEvent>> {
    if !event::poll(timeout)? {
        return Ok(vec![]);
    }

    match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => Ok(handle_key(key.code, ts)),
        Event::Paste(text) => {
            if let Mode::Entry(buf) = &mut ts.mode {
                push_text(buf, &text);
            }
            Ok(vec![])
        }
        _ => Ok(vec![]),
    }
}

pub fn handle_key(code: KeyCode, ts: &mut TuiState) -> Vec<InputEvent> {
    if let Mode::Entry(buf) = &mut ts.mode {
        return match code {
            KeyCode::Enter => {
                let text = std::mem::take(buf);
                ts.mode = Mode::Normal;
                vec![InputEvent::SubmitIdentifier(text)]
            }
            KeyCode::Esc => {
                ts.mode = Mode::Normal;
                vec![]
            }
            KeyCode::Backspace => {
                buf.pop();
                vec![]
            }
            KeyCode::Char(c) => {
                push_text(buf, &c.to_string());
                vec![]
            }
            _ => vec![],
        };
    }

    match code {
        KeyCode::Esc | KeyCode::Char('q') => vec![InputEvent::Quit],
        KeyCode::Char(' ') => {
            if ts.playing {
                vec![InputEvent::Stop]
            } else {
                vec![InputEvent::Play]
            }
        }
        KeyCode::Char('s') => vec![InputEvent::Stop],

        // grid
        KeyCode::Left => vec![InputEvent::MoveSelection { dx: -1, dy: 0 }],
        KeyCode::Right => vec![InputEvent::MoveSelection { dx: 1, dy: 0 }],
        KeyCode::Up => vec![InputEvent::MoveSelection { dx: 0, dy: -1 }],
        KeyCode::Down => vec![InputEvent::MoveSelection { dx: 0, dy: 1 }],
        KeyCode::Enter => vec![InputEvent::CycleStep(ts.selected as u8)],

        // pattern source
        KeyCode::Char('r') => vec![InputEvent::RandomIdentifier],
        KeyCode::Char('i') => {
            ts.mode = Mode::Entry(String::new());
            vec![]
        }
        KeyCode::Char('l') => vec![InputEvent::ShareLink],

        // tempo, shifted brackets take bigger steps
        KeyCode::Char('[') => vec![InputEvent::AdjustBpm(-1)],
        KeyCode::Char(']') => vec![InputEvent::AdjustBpm(1)],
        KeyCode::Char('{') => vec![InputEvent::AdjustBpm(-10)],
        KeyCode::Char('}') => vec![InputEvent::AdjustBpm(10)],
        KeyCode::Char('-') => vec![InputEvent::AdjustSwing(-1)],
        KeyCode::Char('=') => vec![InputEvent::AdjustSwing(1)],

        _ => vec![],
    }
}

fn push_text(buf: &mut String, text: &str) {
    for c in text.chars().filter(|c| !c.is_control()) {
        if buf.chars().count() >= MAX_ENTRY {
            break;
        }
        buf.push(c);
    }
}

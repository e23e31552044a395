// state local to tui, resolves keys into semantic inputevents
// playing is synced from DisplayState per loop
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Normal,
    // typing an identifier, holds what's been typed so far
    Entry(String),
}

#[derive(Clone, Debug, Default)]
pub struct TuiState {
    pub mode: Mode,
    // synced from DisplayState each frame
    pub playing: bool,
    pub selected: usize,
}

impl TuiState {
    pub fn entry_text(&self) -> Option<&str> {
        match &self.mode {
            Mode::Entry(text) => Some(text),
            Mode::Normal => None,
        }
    }
}

// The current input plan:
//
// Transport:
//   Space         //  TogglePlay, resolved by the tui into Play / Stop
//   s             //  Stop
//
// Grid (64 cells, 4 rows of 16):
//   arrows        //  MoveSelection
//   Enter         //  CycleStep(selected)
//
// Pattern source:
//   r             //  RandomIdentifier
//   i             //  start typing an identifier; Enter = SubmitIdentifier, Esc = cancel
//   l             //  ShareLink
//
// Tempo:
//   [ / ]         //  AdjustBpm(-1 / +1)
//   { / }         //  AdjustBpm(-10 / +10)
//   - / =         //  AdjustSwing(-1 / +1)
//
// Quit:
//   Esc / q       //  Quit
//
// Same split as always: only the middle layer owns the pattern and the
// transport, the TUI just renders whatever `middle.display_state()` says.

pub const STEPS_PER_BAR: usize = 16;
pub const NUM_BARS: usize = 4;
pub const STEPS: usize = STEPS_PER_BAR * NUM_BARS; // 64 sixteenths

/// What a single step plays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StepKind {
    Kick,
    Snare,
    #[default]
    Off,
}

impl StepKind {
    // Kick -> Snare -> Off -> Kick
    pub fn next(self) -> Self {
        match self {
            StepKind::Kick => StepKind::Snare,
            StepKind::Snare => StepKind::Off,
            StepKind::Off => StepKind::Kick,
        }
    }

    pub fn drum(self) -> Option<Drum> {
        match self {
            StepKind::Kick => Some(Drum::Kick),
            StepKind::Snare => Some(Drum::Snare),
            StepKind::Off => None,
        }
    }
}

/// The two timbres the engine knows how to make.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Drum {
    Kick,
    Snare,
}

#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    Play,
    Stop,
    CycleStep(u8), // index 0-63
    MoveSelection { dx: i8, dy: i8 },
    RandomIdentifier,
    SubmitIdentifier(String),
    AdjustBpm(i32),
    AdjustSwing(i32),
    ShareLink,
    Quit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioStatus {
    Idle, // nothing opened yet, happens on first play
    Live,
    Unavailable,
}

impl AudioStatus {
    pub fn label(self) -> &'static str {
        match self {
            AudioStatus::Idle => "audio idle",
            AudioStatus::Live => "audio on",
            AudioStatus::Unavailable => "audio off",
        }
    }
}

#[derive(Clone, Debug)]
pub struct DisplayState {
    pub cells: [StepKind; STEPS],
    pub playhead: usize, // visual cursor, follows the transport
    pub selected: usize, // cell the user is editing
    pub playing: bool,
    pub bpm: u32,
    pub swing: u32,
    pub identifier: String,
    pub notice: Option<String>, // short-lived message, like a toast
    pub audio: AudioStatus,
}

mod shared;
mod tui;
mod audio_api;
mod audio;
mod middle;
mod pipeline;
mod sequencer;

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use anyhow::Context;
use clap::Parser;
use crossterm::terminal;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use audio::LazyAudio;
use middle::Middle;
use pipeline::identifier::{self, TxHash};
use pipeline::pattern::Pattern;
use pipeline::settings::{self, Settings};
use pipeline::{bounce, tip};
use sequencer::{ClockScheduler, Tempo};
use shared::InputEvent;

const FRAME: Duration = Duration::from_millis(16); // ~60fps
// the wallet fills this in when it picks up the request
const WALLET_PLACEHOLDER: &str = "<wallet>";
const DEFAULT_LOG_FILE: &str = "txbeat.log";

/// Turn a transaction hash into a four-bar drum loop.
#[derive(Parser, Debug)]
#[command(name = "txbeat", version, about)]
struct Cli {
    /// Transaction hash to start from. Also takes `tx=0x..` or a share link.
    #[arg(long)]
    tx: Option<String>,

    /// Tempo, 40-220.
    #[arg(long)]
    bpm: Option<u32>,

    /// Swing percent, 0-60.
    #[arg(long)]
    swing: Option<u32>,

    /// Directory holding .txbeat/settings.json.
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Bounce the loop to a WAV file instead of starting the UI.
    #[arg(long, value_name = "WAV")]
    render: Option<PathBuf>,

    /// Passes over the pattern when rendering.
    #[arg(long, default_value_t = 1)]
    loops: usize,

    /// Sample rate used when rendering.
    #[arg(long, default_value_t = 48_000)]
    sample_rate: u32,

    /// Print the share link and exit.
    #[arg(long)]
    share: bool,

    /// Print a wallet_sendCalls request tipping this many USDC and exit.
    #[arg(long, value_name = "AMOUNT")]
    tip: Option<String>,

    /// Where logs go while the UI is up. Defaults to txbeat.log in the temp dir.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn headless(&self) -> bool {
        self.render.is_some() || self.share || self.tip.is_some()
    }

    // headless runs log to stderr, the UI owns the terminal so it logs to a file
    fn log_path(&self) -> Option<PathBuf> {
        if self.headless() {
            return None;
        }
        Some(
            self.log_file
                .clone()
                .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_LOG_FILE)),
        )
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_path().as_deref());
    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn init_logging(log_path: Option<&Path>) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(path) = log_path {
        // anything on stderr would draw over the grid
        let target: Box<dyn std::io::Write + Send> = match open_log_file(path) {
            Ok(file) => Box::new(file),
            Err(_) => Box::new(std::io::sink()),
        };
        builder.target(env_logger::Target::Pipe(target));
    }
    builder.init();
}

fn open_log_file(path: &Path) -> anyhow::Result<File> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating {}", dir.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening {}", path.display()))
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let dir = cli.dir.clone().unwrap_or_else(|| PathBuf::from("."));
    let settings = settings::load_settings(&dir);
    let tempo = Tempo::new(
        cli.bpm.unwrap_or(settings.bpm),
        cli.swing.unwrap_or(settings.swing),
    );
    if cli.bpm.is_some_and(|b| b != tempo.bpm()) || cli.swing.is_some_and(|s| s != tempo.swing()) {
        log::warn!("tempo clamped to {} bpm, swing {}%", tempo.bpm(), tempo.swing());
    }

    if cli.headless() {
        run_headless(&cli, &settings, tempo)
    } else {
        run_tui(&cli, &settings, tempo)
    }
}

fn run_headless(cli: &Cli, settings: &Settings, tempo: Tempo) -> anyhow::Result<()> {
    let hash = match &cli.tx {
        Some(raw) => TxHash::parse(identifier::identifier_from_query(raw))
            .with_context(|| format!("bad --tx {raw:?}"))?,
        None => TxHash::parse(identifier::PLACEHOLDER)?,
    };

    if cli.share {
        println!("{}", identifier::share_url(&settings.home_url, &hash));
    }

    if let Some(amount) = &cli.tip {
        let req = tip::tip_request(
            WALLET_PLACEHOLDER,
            &settings.recipient,
            &settings.token_contract,
            amount,
        )?;
        println!("{}", serde_json::to_string_pretty(&req)?);
    }

    if let Some(path) = &cli.render {
        let pattern = Pattern::derive(hash.as_str());
        let buf = bounce::bounce(&pattern, tempo, cli.loops, cli.sample_rate);
        buf.write_wav(path, cli.sample_rate)?;
        println!(
            "wrote {} ({:.2}s, {} loop(s) at {} bpm)",
            path.display(),
            buf.duration_secs(cli.sample_rate),
            cli.loops,
            tempo.bpm()
        );
    }
    Ok(())
}

fn run_tui(cli: &Cli, settings: &Settings, tempo: Tempo) -> anyhow::Result<()> {
    let start = TxHash::parse(identifier::PLACEHOLDER)?;
    let mut middle = Middle::new(
        ClockScheduler::new(),
        LazyAudio::new(),
        tempo,
        start,
        settings.home_url.clone(),
        Box::new(Pcg32::from_entropy()),
    );
    // a bad --tx just leaves the placeholder up with a notice
    if let Some(raw) = &cli.tx {
        let raw = identifier::identifier_from_query(raw).to_string();
        middle.handle_input(InputEvent::SubmitIdentifier(raw));
    }

    terminal::enable_raw_mode().context("enabling raw mode")?;
    let _ = crossterm::execute!(std::io::stdout(), crossterm::event::EnableBracketedPaste);
    let _guard = RawModeGuard; // auto drops when out of scope

    let backend = CrosstermBackend::new(std::io::stdout());
    let mut term = Terminal::new(backend)?;
    term.clear()?;

    let mut last_tick = Instant::now();
    let mut tui_state = tui::mode::TuiState::default();

    loop {
        // fire everything that came due while we were drawing or waiting
        let now = Instant::now();
        while let Some(handle) = middle.scheduler_mut().take_due(now) {
            middle.on_timer(handle);
        }

        let ds = middle.display_state();
        tui_state.playing = ds.playing;
        tui_state.selected = ds.selected;

        term.draw(|frame| {
            tui::view::render(frame, frame.area(), &ds, &tui_state);
        })?;

        // never sleep past the next step
        let timeout = middle
            .scheduler()
            .next_deadline()
            .map_or(FRAME, |d| d.saturating_duration_since(Instant::now()).min(FRAME));

        let events = tui::input::poll_input(timeout, &mut tui_state)?;
        for event in events {
            if event == InputEvent::Quit {
                middle.handle_input(InputEvent::Stop);
                return Ok(());
            }
            middle.handle_input(event);
        }

        let elapsed = last_tick.elapsed().as_secs_f64();
        last_tick = Instant::now();
        middle.tick(elapsed);
    }
}

struct RawModeGuard;
impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = crossterm::execute!(
            std::io::stdout(),
            crossterm::event::DisableBracketedPaste
        );
        let _ = terminal::disable_raw_mode();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn ui_logs_to_a_file_and_headless_to_stderr() {
        let ui = Cli::parse_from(["txbeat", "--log-file", "/tmp/x/beat.log"]);
        assert_eq!(ui.log_path(), Some(PathBuf::from("/tmp/x/beat.log")));

        let ui_default = Cli::parse_from(["txbeat"]);
        assert_eq!(ui_default.log_path(), Some(std::env::temp_dir().join(DEFAULT_LOG_FILE)));

        for args in [
            vec!["txbeat", "--share"],
            vec!["txbeat", "--tip", "1"],
            vec!["txbeat", "--render", "out.wav"],
        ] {
            assert_eq!(Cli::parse_from(args).log_path(), None);
        }
    }

    #[test]
    fn log_file_is_created_and_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("txbeat.log");
        writeln!(open_log_file(&path).unwrap(), "one").unwrap();
        writeln!(open_log_file(&path).unwrap(), "two").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "one\ntwo\n");
    }
}

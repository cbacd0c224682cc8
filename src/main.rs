//! Scry Alert - a modal alert dialog for the terminal.
//!
//! Presents a sample alert, waits for it to be dismissed and prints the
//! collected value as JSON.

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use scry_alert::alert::{AlertOptions, Platform};
use scry_alert::app::{sample_options, App, SampleKind};
use scry_alert::config::Config;
use scry_alert::{input, logging};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Ios,
    Md,
}

impl From<ModeArg> for Platform {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Ios => Platform::Ios,
            ModeArg::Md => Platform::Md,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "scry-alert", version, about = "Show a modal alert in the terminal")]
struct Cli {
    /// Kind of inputs the sample alert carries
    #[arg(long, value_enum, default_value_t = SampleKind::Radio)]
    kind: SampleKind,

    /// Platform look and default animations
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,

    /// Config file (defaults to ~/.config/scry-alert/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Ignore Esc / backdrop clicks
    #[arg(long)]
    no_backdrop_dismiss: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load(),
    };
    logging::init(&config.logging)?;

    let mut base = AlertOptions::from_defaults(&config.alert);
    if let Some(mode) = cli.mode {
        base = base.mode(mode.into());
    }
    if cli.no_backdrop_dismiss {
        base = base.enable_backdrop_dismiss(false);
    }
    let mut app = App::new(sample_options(cli.kind, base), &config);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    let local = tokio::task::LocalSet::new();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let res = local.block_on(&runtime, input::run_app(&mut terminal, &mut app, &config));

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;

    let output = match &app.outcome {
        Some(detail) => serde_json::json!({
            "role": detail.role,
            "data": detail.data.to_json(),
        }),
        None => serde_json::Value::Null,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

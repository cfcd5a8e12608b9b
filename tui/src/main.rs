//! Diet Planner TUI Entry Point
//!
//! Usage:
//!   diet-planner [OPTIONS]
//!
//! Logs go to `~/.cache/diet-planner/planner.log` since the terminal is
//! taken by the UI. Set `RUST_LOG` to change the level.

use std::fs::{self, File};
use std::io::{self, IsTerminal};
use std::panic;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use diet_planner_tui::App;
use planner_core::{default_config_path, load_config_from_path, ConfigOverrides, PlannerConfig};

/// Diet Planner - weekly meal plans in your terminal
#[derive(Parser, Debug)]
#[command(name = "diet-planner")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Backend base URL
    #[arg(short = 'u', long, env = "DIET_PLANNER_API_URL", value_name = "URL")]
    api_url: Option<String>,

    /// Configuration file path
    #[arg(short = 'c', long, env = "DIET_PLANNER_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Backend request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout_secs: Option<u64>,

    /// How long notifications stay on screen, in milliseconds
    #[arg(long, value_name = "MS")]
    notify_ms: Option<u64>,
}

fn load_config(args: &Args) -> anyhow::Result<PlannerConfig> {
    let mut config = load_config_from_path(args.config.clone().or_else(default_config_path))
        .context("Failed to load configuration")?;

    let mut overrides = ConfigOverrides::new();
    if let Some(url) = &args.api_url {
        overrides = overrides.with_base_url(url.clone());
    }
    if let Some(secs) = args.timeout_secs {
        overrides = overrides.with_request_timeout_secs(secs);
    }
    if let Some(ms) = args.notify_ms {
        overrides = overrides.with_notification_timeout_ms(ms);
    }
    overrides.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    Ok(config)
}

/// Log to a file under the cache directory; no file means no logs
fn init_logging() {
    let Some(dir) = dirs::cache_dir().map(|d| d.join("diet-planner")) else {
        return;
    };
    if fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = File::create(dir.join("planner.log")) else {
        return;
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new("diet_planner_tui=info,planner_core=info")
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("Error: diet-planner requires a terminal (TTY)");
        eprintln!();
        eprintln!("Run it interactively, or over SSH with -t.");
        std::process::exit(1);
    }

    let config = load_config(&args)?;
    init_logging();
    tracing::info!(
        base_url = %config.base_url,
        config_file = ?config.config_file_path,
        "Starting diet planner"
    );

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut app = App::new(&config);
    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Some(goodbye) = app.goodbye() {
        println!("\n\x1b[32mDiet Planner:\x1b[0m {goodbye}\n");
    }

    result
}

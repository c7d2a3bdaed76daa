use std::io::{self, stdout, Stdout};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use crossbeam_channel::{Receiver, TryRecvError};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::{backend::CrosstermBackend, Terminal};

use taskdeck::app::LogicThread;
use taskdeck::config::Config;
use taskdeck::render::RenderState;
use taskdeck::session::Session;
use taskdeck::{tlog, ui, Result};

const FRAME_DURATION: Duration = Duration::from_micros(16_666); // 60fps

/// Taskdeck - terminal client for a task-management API
#[derive(Parser, Debug)]
#[command(name = "taskdeck")]
#[command(version, about, long_about = None)]
#[command(
    after_help = "ENVIRONMENT:\n    TASKDECK_DEBUG=1    Enable debug logging (alternative to --debug)\n    TASKDECK_HOME       Override the state directory (default ~/.taskdeck)"
)]
pub struct Cli {
    /// API base URL (overrides the config file)
    #[arg(short = 's', long)]
    pub server: Option<String>,

    /// Enable debug logging (writes to ~/.taskdeck/taskdeck.log)
    #[arg(short = 'd', long)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Remove the persisted session without launching the TUI
    Logout,

    /// Show whether a session is present and which server is configured
    Status,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on debug flag
    taskdeck::log::init_with_debug(cli.debug);

    let mut config = Config::load()?;
    if let Some(server) = cli.server {
        config.server_url = Some(server);
    }

    match cli.command {
        Some(Command::Logout) => {
            return run_logout();
        }
        Some(Command::Status) => {
            return run_status(&config);
        }
        None => {
            // No subcommand: launch the TUI
        }
    }

    if cli.debug {
        tlog!("taskdeck starting (debug mode enabled)");
    } else {
        tlog!("taskdeck starting");
    }

    // Session guard input: present -> dashboard, absent -> login screen
    let session = Session::load()?;

    let shutdown = Arc::new(AtomicBool::new(false));
    let (state_tx, state_rx) = crossbeam_channel::bounded::<RenderState>(1);

    let shutdown_clone = shutdown.clone();
    let logic_handle =
        thread::spawn(move || LogicThread::run(config, session, state_tx, shutdown_clone));

    let mut terminal = setup_terminal()?;
    let result = render_loop(&mut terminal, state_rx, &shutdown);

    shutdown.store(true, Ordering::SeqCst);
    let _ = logic_handle.join();
    restore_terminal(&mut terminal)?;
    result
}

fn run_logout() -> Result<()> {
    if Session::clear()? {
        println!("Logged out.");
    } else {
        println!("No active session.");
    }
    Ok(())
}

fn run_status(config: &Config) -> Result<()> {
    println!("Server:  {}", config.effective_server_url());
    match Session::load()? {
        Some(session) => println!("Session: present (token {})", session.token_preview()),
        None => println!("Session: none (launch taskdeck to log in)"),
    }
    Ok(())
}

fn render_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    state_rx: Receiver<RenderState>,
    shutdown: &AtomicBool,
) -> Result<()> {
    let mut state = RenderState::default();
    let mut last_version: u64 = 0;
    let mut last_frame = Instant::now();
    let mut dirty = true;

    loop {
        if shutdown.load(Ordering::Relaxed) {
            break;
        }

        match state_rx.try_recv() {
            Ok(s) => {
                dirty = dirty || s.version != last_version;
                state = s;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => break,
        }

        if last_frame.elapsed() < FRAME_DURATION {
            thread::sleep(Duration::from_micros(500));
            continue;
        }
        last_frame = Instant::now();

        if dirty {
            terminal.draw(|f| ui::draw(f, &state))?;
            last_version = state.version;
            dirty = false;
        }
    }
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.hide_cursor()?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    terminal.show_cursor()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(disable_raw_mode()?)
}

use std::io;
use std::panic;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    event::{self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use markln::app::{App, AppEvent};
use markln::config::Config;
use markln::core::SessionOptions;
use markln::{logging, theme};

#[derive(Parser)]
#[command(name = "markln", version, about = "A split-pane terminal markdown editor")]
struct Cli {
    /// File to open; created on first save if it does not exist
    file: Option<PathBuf>,

    /// Theme name, overriding the configured one
    #[arg(long)]
    theme: Option<String>,

    /// Config file to use instead of the platform default
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> io::Result<()> {
    markln::markdown::code_highlight::ensure_loaded();

    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => Config::default_path().map_err(|e| io::Error::new(io::ErrorKind::NotFound, e))?,
    };
    let _log_guard = config_path.parent().and_then(logging::init);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), config = %config_path.display(), "starting");

    let config = Config::load_or_default(&config_path);
    let requested_theme = cli.theme.unwrap_or_else(|| config.theme.clone());
    let (theme_name, palette) = theme::resolve(&requested_theme, &config.theme_folder());
    let options = SessionOptions {
        view: config.window_mode,
        render_delay: config.render_delay(),
        auto_preview: config.auto_preview,
    };

    let app = App::launch(cli.file, options, palette, theme_name);
    let app = run_editor(app)?;

    save_config(config, &app, &config_path);
    tracing::info!("exiting");
    Ok(())
}

/// Sets up the terminal, runs the TUI editor, and restores the terminal on exit.
fn run_editor(mut app: App) -> io::Result<App> {
    // Setup panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal();
        original_hook(info);
    }));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    restore_terminal()?;

    if let Err(e) = result {
        tracing::error!(error = %e, "terminal loop failed");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(app)
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> io::Result<()> {
    let mut title = String::new();

    loop {
        app.render_frame(terminal, Instant::now())?;

        let current = app.title();
        if current != title {
            execute!(io::stdout(), SetTitle(&current))?;
            title = current;
        }

        // Block up to 100ms waiting for the first event (prevents busy-loop,
        // gives the debounce deadline a chance to fire ~10x/sec).
        if event::poll(Duration::from_millis(100))? {
            // Drain all queued events without blocking, then render immediately.
            loop {
                let ev = event::read()?;
                app.dispatch(AppEvent::Input(ev));
                if app.should_quit() {
                    break;
                }
                if !event::poll(Duration::ZERO)? {
                    break;
                }
            }
        }

        if app.should_quit() {
            break;
        }
    }

    Ok(())
}

/// Writes the active theme and the last file back; other settings are left
/// as the user wrote them.
fn save_config(mut config: Config, app: &App, path: &Path) {
    config.theme = app.theme_name().to_string();
    if let Some(file) = app.session.file_path() {
        config.last_file = Some(file.to_path_buf());
    }
    if let Err(err) = config.save(path) {
        tracing::warn!(error = %err, "could not save config");
    }
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(
        io::stdout(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    Ok(())
}

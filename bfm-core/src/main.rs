//! src/main.rs
//! bfm: keyboard-driven terminal file browser

use std::{
    io::{self, Stdout},
    panic::PanicHookInfo,
    path::{Path, PathBuf},
    sync::Arc,
    time::Instant,
};

use anyhow::{Context, Result};
use crossterm::{
    event::Event as TerminalEvent,
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Frame, Terminal, backend::CrosstermBackend};
use tracing::{debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;

use bfm_core::{
    Logger,
    config::{AppPaths, Config},
    controller::{
        action_dispatcher::Dispatcher,
        event_loop::{AppEvent, Effect, EventLoop},
        key_bindings::key_name,
    },
    fs::{dir_scanner::LocalFileSystem, utils::resolve_symlink},
    logging::LoggerConfig,
    tasks::process_task::SystemProcessRunner,
    view::{
        help::{generate_help, write_help},
        ui::UIRenderer,
    },
};

type AppTerminal = Terminal<CrosstermBackend<Stdout>>;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> Result<()> {
    setup_panic_handler();

    let paths = AppPaths::discover().context("Failed to locate application directories")?;
    let config = Config::load(&paths.config_file).await;
    let paths = paths.with_config(&config);

    let _guard: WorkerGuard =
        Logger::init_tracing(LoggerConfig::new(&config.logging, paths.log_dir.clone()))
            .await
            .context("Failed to initialize logging")?;
    info!("Starting bfm");

    let start_dir = start_directory(std::env::args().nth(1).as_deref())?;

    let app = App::new(config, paths, &start_dir).context("Failed to initialize application")?;
    app.run().await.context("Application runtime error")?;

    info!("Application exited cleanly");
    Ok(())
}

/// First CLI argument when it resolves to a directory, else the current
/// directory.
fn start_directory(arg: Option<&str>) -> Result<PathBuf> {
    if let Some(arg) = arg {
        match resolve_symlink(Path::new(arg)) {
            Ok(dir) if dir.is_dir() => return Ok(dir),
            Ok(other) => warn!("{} is not a directory", other.display()),
            Err(e) => warn!("Ignoring start directory {}: {}", arg, e),
        }
    }
    std::env::current_dir().context("Failed to get current directory")
}

struct App {
    terminal: AppTerminal,
    event_loop: EventLoop,
    dispatcher: Dispatcher,
    ui_renderer: UIRenderer,
}

impl App {
    fn new(config: Config, paths: AppPaths, start_dir: &Path) -> Result<Self> {
        let help_file = paths.help_file.clone();
        let dispatcher = Dispatcher::new(
            Arc::new(config),
            paths,
            Arc::new(LocalFileSystem),
            start_dir,
        );

        let help = generate_help(dispatcher.bindings(), &dispatcher.config().plugin_registry());
        if let Err(e) = write_help(&help_file, &help) {
            warn!("Could not write help file: {}", e);
        }

        let terminal = setup_terminal().context("Failed to initialize terminal")?;
        let mut app = Self {
            terminal,
            event_loop: EventLoop::new(Arc::new(SystemProcessRunner)),
            dispatcher,
            ui_renderer: UIRenderer::new(),
        };

        let height = app.terminal.size().context("Failed to query terminal size")?.height;
        app.dispatcher
            .set_viewport_height(UIRenderer::listing_height(height));

        info!("Application initialized successfully");
        Ok(app)
    }

    async fn run(mut self) -> Result<()> {
        info!("Starting event loop");

        loop {
            self.render()?;

            let Some(event) = self.event_loop.next_event().await else {
                break;
            };

            let effects = match event {
                AppEvent::Terminal(TerminalEvent::Key(key)) => match key_name(&key) {
                    Some(name) => self.dispatcher.handle_key(&name),
                    None => Vec::new(),
                },
                AppEvent::Terminal(TerminalEvent::Resize(_, height)) => {
                    self.dispatcher
                        .set_viewport_height(UIRenderer::listing_height(height));
                    Vec::new()
                }
                AppEvent::Terminal(_) => Vec::new(),
                AppEvent::Task(result) => self.dispatcher.handle_task_result(result),
            };

            if !self.apply_effects(effects).await? {
                break;
            }
        }

        info!("Event loop terminated cleanly");
        Ok(())
    }

    /// Execute effects in order. `false` once a quit was requested.
    async fn apply_effects(&mut self, effects: Vec<Effect>) -> Result<bool> {
        for effect in effects {
            match effect {
                Effect::Quit => {
                    info!("Quit requested");
                    return Ok(false);
                }
                Effect::Run { request, purpose } => {
                    let interactive = request.stdio.is_interactive();
                    debug!("Effect run {} (interactive: {})", request.full_command(), interactive);

                    if interactive {
                        suspend_terminal(&mut self.terminal)?;
                    }
                    self.event_loop.execute(request, purpose).await;
                    if interactive {
                        resume_terminal(&mut self.terminal)?;
                    }
                }
            }
        }
        Ok(true)
    }

    fn render(&mut self) -> Result<()> {
        if !self.dispatcher.state.ui.needs_redraw() {
            return Ok(());
        }

        let start = Instant::now();
        let Self {
            terminal,
            dispatcher,
            ui_renderer,
            ..
        } = self;

        terminal
            .draw(|frame: &mut Frame<'_>| {
                ui_renderer.render(frame, &dispatcher.state, dispatcher.config());
            })
            .context("Failed to draw terminal")?;
        dispatcher.state.ui.clear_redraw();

        let duration = start.elapsed();
        if duration.as_millis() > 16 {
            warn!("Slow render: {}ms", duration.as_millis());
        }
        Ok(())
    }
}

impl Drop for App {
    fn drop(&mut self) {
        if let Err(e) = cleanup_terminal(&mut self.terminal) {
            warn!("Failed to cleanup terminal: {}", e);
        }
    }
}

fn setup_terminal() -> Result<AppTerminal> {
    enable_raw_mode().context("Failed to enable raw mode")?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;

    info!("Terminal setup complete");
    Ok(terminal)
}

/// Hand the terminal to a child process.
fn suspend_terminal(terminal: &mut AppTerminal) -> Result<()> {
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    disable_raw_mode().context("Failed to disable raw mode")?;
    terminal.show_cursor().context("Failed to show cursor")?;
    Ok(())
}

/// Take the terminal back and force a full repaint.
fn resume_terminal(terminal: &mut AppTerminal) -> Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    execute!(terminal.backend_mut(), EnterAlternateScreen)
        .context("Failed to enter alternate screen")?;
    terminal.clear().context("Failed to clear terminal")?;
    Ok(())
}

fn cleanup_terminal(terminal: &mut AppTerminal) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    info!("Terminal cleanup complete");
    Ok(())
}

fn setup_panic_handler() {
    let original_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info: &PanicHookInfo<'_>| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);

        error!("Application panicked: {}", panic_info);
        original_hook(panic_info);
    }));
}

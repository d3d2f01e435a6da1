use std::fs;
use std::io;
use std::net::TcpListener;
use std::sync::Once;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Frame;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::style::Style;
use ratatui::widgets::{Block, Paragraph};
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use typetype::app::App;
use typetype::config::{Config, CursorMode};
use typetype::event::{AppEvent, EventHandler};
use typetype::provider::service;
use typetype::provider::{EmbeddedTexts, HttpTextProvider, TextProvider};
use typetype::relay::tcp::{self, TcpSink};
use typetype::relay::{EventSink, NullSink, Relay};
use typetype::session::{Keystroke, Status};
use typetype::timer::ThreadTicker;
use typetype::ui::components::peer_feed::PeerPanel;
use typetype::ui::components::progress_bar::PassageProgress;
use typetype::ui::components::results_panel::ResultsPanel;
use typetype::ui::components::stats_header::StatsHeader;
use typetype::ui::components::typing_area::TypingArea;
use typetype::ui::layout::{AppLayout, centered_rect, pack_hint_lines};
use typetype::ui::theme::Theme;

#[derive(Parser)]
#[command(name = "typetype", version, about = "Terminal typing-speed game")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[arg(long, help = "Use the built-in passages instead of the text service")]
    offline: bool,

    #[arg(long, help = "Base URL of the text service")]
    api_url: Option<String>,

    #[arg(long, help = "Relay address (host:port) for live progress sharing")]
    relay: Option<String>,

    #[arg(short, long, help = "Test length in seconds")]
    time_limit: Option<u32>,

    #[arg(long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, value_enum, help = "Cursor style")]
    cursor_mode: Option<CursorArg>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the built-in passages and a progress relay for other players
    Serve {
        #[arg(long, default_value = "127.0.0.1:3000", help = "Address for the text API")]
        http: String,

        #[arg(long, default_value = "127.0.0.1:3001", help = "Address for the relay")]
        relay: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum CursorArg {
    Highlight,
    Caret,
}

impl From<CursorArg> for CursorMode {
    fn from(arg: CursorArg) -> Self {
        match arg {
            CursorArg::Highlight => CursorMode::Highlight,
            CursorArg::Caret => CursorMode::Caret,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Command::Serve { http, relay }) = cli.command {
        init_stderr_logging();
        return run_server(&http, &relay);
    }

    let _log_guard = init_file_logging();
    install_panic_hook();

    let config_path = Config::config_path();
    let mut config = Config::load().unwrap_or_else(|err| {
        warn!(%err, "config_unreadable_using_defaults");
        Config::default()
    });
    if !config_path.exists() {
        if let Err(err) = config.save_to(&config_path) {
            warn!(path = %config_path.display(), %err, "config_write_failed");
        }
    }
    if cli.offline {
        config.offline = true;
    }
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    if let Some(addr) = cli.relay {
        config.relay_addr = Some(addr);
    }
    if let Some(secs) = cli.time_limit {
        config.time_limit_secs = secs;
    }
    if let Some(theme) = cli.theme {
        if !Theme::available_themes().contains(&theme) {
            warn!(%theme, "theme_not_bundled");
        }
        config.theme = theme;
    }
    if let Some(mode) = cli.cursor_mode {
        config.cursor_mode = mode.into();
    }
    config.normalize();

    let events = EventHandler::new(Duration::from_millis(50));

    let (sink, connected): (Box<dyn EventSink>, bool) = match config.relay_addr.as_deref() {
        Some(addr) => {
            let tx = events.sender();
            match TcpSink::connect(addr, move |event| tx.send(AppEvent::Peer(event)).is_ok()) {
                Ok(sink) => {
                    info!(addr, "relay_connected");
                    (Box::new(sink), true)
                }
                Err(err) => {
                    warn!(addr, %err, "relay_unavailable");
                    (Box::new(NullSink), false)
                }
            }
        }
        None => (Box::new(NullSink), false),
    };

    let provider: Box<dyn TextProvider> = if config.offline {
        Box::new(EmbeddedTexts)
    } else {
        Box::new(HttpTextProvider::new(&config.api_url))
    };
    let ticker = Box::new(ThreadTicker::new(events.sender(), Duration::from_secs(1)));

    let mut app = App::new(config, provider, sink, ticker);
    app.load_new_text();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, &events, connected);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn init_file_logging() -> Option<WorkerGuard> {
    let log_dir = Config::data_dir();
    fs::create_dir_all(&log_dir).ok()?;
    let file_appender = tracing_appender::rolling::never(&log_dir, "typetype.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .ok()?;
    Some(guard)
}

fn init_stderr_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .try_init();
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

fn run_server(http_addr: &str, relay_addr: &str) -> Result<()> {
    let texts = TcpListener::bind(http_addr)?;
    let relay = TcpListener::bind(relay_addr)?;
    eprintln!("Text API on http://{}", texts.local_addr()?);
    eprintln!("Relay listening on {}", relay.local_addr()?);

    thread::spawn(move || {
        if let Err(err) = service::serve(texts, EmbeddedTexts) {
            error!(%err, "text_service_stopped");
        }
    });
    tcp::serve(relay, Relay::new())?;
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
    connected: bool,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app, connected))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Tick { generation } => {
                app.on_tick(generation);
            }
            AppEvent::Peer(event) => app.on_peer(event),
            AppEvent::Resize(_, _) => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => app.should_quit = true,
            KeyCode::Char('r') => app.restart(),
            KeyCode::Char('n') => app.load_new_text(),
            KeyCode::Char('t') => app.toggle_cursor_mode(),
            _ => {}
        }
        return;
    }

    match app.session.status() {
        Status::Idle => handle_idle_key(app, key),
        Status::Active => handle_typing_key(app, key),
        Status::Finished => handle_result_key(app, key),
    }
}

fn handle_idle_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.start(),
        KeyCode::Char('n') => app.load_new_text(),
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        _ => {}
    }
}

fn handle_typing_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.reset(),
        KeyCode::Backspace => app.handle_keystroke(Keystroke::Backspace),
        KeyCode::Char(ch) => app.handle_keystroke(Keystroke::from_char(ch)),
        _ => {}
    }
}

fn handle_result_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Char('r') => app.restart(),
        KeyCode::Char('n') => app.load_new_text(),
        KeyCode::Char('s') => {
            app.share_results();
        }
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        _ => {}
    }
}

fn render(frame: &mut Frame, app: &App, connected: bool) {
    let area = frame.area();
    let colors = &app.theme.colors;
    frame.render_widget(Block::default().style(Style::default().bg(colors.bg())), area);

    let layout = AppLayout::new(area);
    let stats = app.display();
    let status = app.session.status();

    frame.render_widget(StatsHeader::new(&stats, status, app.theme), layout.header);
    frame.render_widget(
        TypingArea::new(&app.session, app.cursor_mode, app.theme),
        layout.main,
    );
    if let Some(sidebar) = layout.sidebar {
        frame.render_widget(PeerPanel::new(&app.peers, connected, app.theme), sidebar);
    }
    frame.render_widget(PassageProgress::new(&app.session, app.theme), layout.progress);

    let hints: &[&str] = match status {
        Status::Idle => &["[Enter] Start", "[n] New text", "[^T] Cursor", "[q] Quit"],
        Status::Active => &["[^R] Restart", "[^N] New text", "[Esc] Stop", "[^T] Cursor"],
        Status::Finished => &["[Enter] Restart", "[n] New text", "[s] Share", "[q] Quit"],
    };
    let footer = pack_hint_lines(hints, layout.footer.width as usize).join("\n");
    frame.render_widget(
        Paragraph::new(footer).style(Style::default().fg(colors.muted())),
        layout.footer,
    );

    if status == Status::Finished {
        if let Some(result) = &app.last_result {
            let popup = centered_rect(50, 50, area);
            frame.render_widget(
                ResultsPanel::new(result, app.notice.as_deref(), app.theme),
                popup,
            );
        }
    }
}

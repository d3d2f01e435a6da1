use std::collections::VecDeque;
use std::sync::Arc;

use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{debug, info};

use crate::config::{Config, CursorMode};
use crate::provider::{self, TextProvider};
use crate::relay::{EventSink, ServerEvent};
use crate::reporter::{DisplayStats, ProgressReporter};
use crate::session::clock::{Clock, SystemClock};
use crate::session::input::{self, KeyOutcome, Keystroke};
use crate::session::result::ResultSummary;
use crate::session::state::{TickOutcome, TypingSession};
use crate::share::{self, CommandTarget, ShareOutcome, ShareTarget};
use crate::timer::{TickHandle, TickScheduler};
use crate::ui::theme::Theme;

const PEER_FEED_LEN: usize = 6;

/// Most recent relay activity, newest last.
#[derive(Debug, Default)]
pub struct PeerFeed {
    lines: VecDeque<String>,
}

impl PeerFeed {
    pub fn push(&mut self, line: String) {
        if self.lines.len() == PEER_FEED_LEN {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

pub struct App {
    pub config: Config,
    pub session: TypingSession,
    pub last_result: Option<ResultSummary>,
    pub peers: PeerFeed,
    pub notice: Option<String>,
    pub cursor_mode: CursorMode,
    pub theme: &'static Theme,
    pub should_quit: bool,
    reporter: ProgressReporter,
    ticker: Box<dyn TickScheduler>,
    tick_handle: Option<TickHandle>,
    provider: Box<dyn TextProvider>,
    rng: SmallRng,
}

impl App {
    pub fn new(
        config: Config,
        provider: Box<dyn TextProvider>,
        sink: Box<dyn EventSink>,
        ticker: Box<dyn TickScheduler>,
    ) -> Self {
        Self::with_clock(config, provider, sink, ticker, Arc::new(SystemClock))
    }

    pub fn with_clock(
        config: Config,
        provider: Box<dyn TextProvider>,
        sink: Box<dyn EventSink>,
        ticker: Box<dyn TickScheduler>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let theme = Theme::load(&config.theme).unwrap_or_default();
        let theme: &'static Theme = Box::leak(Box::new(theme));
        Self {
            session: TypingSession::with_clock(config.time_limit_secs, clock),
            cursor_mode: config.cursor_mode,
            config,
            last_result: None,
            peers: PeerFeed::default(),
            notice: None,
            theme,
            should_quit: false,
            reporter: ProgressReporter::new(sink),
            ticker,
            tick_handle: None,
            provider,
            rng: SmallRng::from_entropy(),
        }
    }

    /// Fetch a fresh passage and return to idle.
    pub fn load_new_text(&mut self) {
        let text = provider::random_passage(self.provider.as_ref(), &mut self.rng);
        self.load_text(&text);
    }

    pub fn load_text(&mut self, text: &str) {
        self.cancel_timer();
        self.session.load_passage(text);
        self.last_result = None;
        self.notice = None;
    }

    /// Abandon the current attempt and go back to idle on the same passage.
    pub fn reset(&mut self) {
        if let Some(text) = self.session.passage().map(|p| p.text().to_string()) {
            self.load_text(&text);
        }
    }

    pub fn start(&mut self) {
        self.cancel_timer();
        if !self.session.start() {
            debug!("start_without_passage");
            return;
        }
        self.tick_handle = Some(self.ticker.schedule(self.session.generation()));
        self.last_result = None;
        self.notice = None;
        self.reporter.started(Utc::now().timestamp_millis());
        info!(generation = self.session.generation(), "test_started");
    }

    /// Throw away the running attempt and start over on the same passage.
    pub fn restart(&mut self) {
        self.cancel_timer();
        self.start();
    }

    pub fn handle_keystroke(&mut self, key: Keystroke) {
        match input::process_keystroke(&mut self.session, key) {
            KeyOutcome::Ignored => {}
            KeyOutcome::Accepted => self.reporter.progress(&self.session),
            KeyOutcome::Completed(summary) => {
                self.reporter.progress(&self.session);
                self.complete(summary);
            }
        }
    }

    /// Apply a tick from the scheduler. Ticks from an older session are dropped.
    pub fn on_tick(&mut self, generation: u64) -> bool {
        let live = self
            .tick_handle
            .as_ref()
            .is_some_and(|h| h.generation() == generation && !h.is_cancelled());
        if !live || generation != self.session.generation() {
            debug!(generation, current = self.session.generation(), "stale_tick_dropped");
            return false;
        }
        match self.session.tick() {
            TickOutcome::Ignored => false,
            TickOutcome::Counted { .. } => true,
            TickOutcome::Expired(summary) => {
                self.complete(summary);
                true
            }
        }
    }

    fn complete(&mut self, summary: ResultSummary) {
        self.cancel_timer();
        self.reporter.complete(&summary);
        info!(
            wpm = summary.wpm,
            accuracy = summary.accuracy,
            secs = summary.elapsed_secs,
            errors = summary.error_count,
            "test_complete"
        );
        self.last_result = Some(summary);
    }

    fn cancel_timer(&mut self) {
        if let Some(handle) = self.tick_handle.take() {
            handle.cancel();
        }
    }

    pub fn timer_running(&self) -> bool {
        self.tick_handle.as_ref().is_some_and(|h| !h.is_cancelled())
    }

    pub fn on_peer(&mut self, event: ServerEvent) {
        let line = event.describe();
        info!(user = event.user_id(), "{line}");
        self.peers.push(line);
    }

    pub fn share_results(&mut self) -> Option<ShareOutcome> {
        let text = self.last_result.as_ref()?.share_text();
        let share_target = CommandTarget::from_config(self.config.share_command.as_ref());
        let clipboard = CommandTarget::from_config(self.config.clipboard_command.as_ref());
        let outcome = share::share_text(
            &text,
            share_target.as_ref().map(|t| t as &dyn ShareTarget),
            clipboard.as_ref().map(|t| t as &dyn ShareTarget),
        );
        self.notice = Some(match &outcome {
            ShareOutcome::Shared => "Results shared!".to_string(),
            ShareOutcome::Copied => "Results copied to clipboard!".to_string(),
            ShareOutcome::Manual(text) => format!("Copy these results: {text}"),
        });
        Some(outcome)
    }

    pub fn toggle_cursor_mode(&mut self) {
        self.cursor_mode = self.cursor_mode.toggled();
    }

    pub fn display(&self) -> DisplayStats {
        ProgressReporter::display(&self.session)
    }
}

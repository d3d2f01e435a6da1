use tracing::debug;

use crate::relay::{ClientEvent, EventSink, TestResults};
use crate::session::result::ResultSummary;
use crate::session::state::TypingSession;

/// Display strings for the live stats row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayStats {
    pub wpm: String,
    pub accuracy: String,
    pub timer: String,
}

/// Turns session transitions into outgoing relay events.
pub struct ProgressReporter {
    sink: Box<dyn EventSink>,
}

impl ProgressReporter {
    pub fn new(sink: Box<dyn EventSink>) -> Self {
        Self { sink }
    }

    pub fn started(&mut self, timestamp_ms: i64) {
        self.send(ClientEvent::StartTest {
            timestamp: timestamp_ms,
        });
    }

    pub fn progress(&mut self, session: &TypingSession) {
        self.send(progress_event(session));
    }

    pub fn complete(&mut self, summary: &ResultSummary) {
        self.send(ClientEvent::TestComplete {
            results: TestResults::from(summary),
        });
    }

    fn send(&mut self, event: ClientEvent) {
        if let Err(err) = self.sink.emit(&event) {
            debug!(event = event.name(), %err, "relay_emit_dropped");
        }
    }

    pub fn display(session: &TypingSession) -> DisplayStats {
        DisplayStats {
            wpm: format!("{}", session.compute_wpm().round() as i64),
            accuracy: format!("{}%", session.compute_accuracy().round() as i64),
            timer: format!("{}s", session.remaining_secs()),
        }
    }
}

pub fn progress_event(session: &TypingSession) -> ClientEvent {
    ClientEvent::TypingProgress {
        progress: session.progress_percent(),
        wpm: session.compute_wpm(),
        accuracy: session.compute_accuracy(),
    }
}

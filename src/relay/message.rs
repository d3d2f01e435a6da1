//! Relay wire events.
//!
//! Each event travels as one JSON object `{"event": <name>, "data": <payload>}`
//! with camelCase payload fields, one object per line on the TCP transport.

use serde::{Deserialize, Serialize};

use crate::session::result::ResultSummary;

pub type UserId = String;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResults {
    pub wpm: f64,
    pub accuracy: f64,
    /// Elapsed seconds.
    pub time: u32,
    pub errors: usize,
}

impl From<&ResultSummary> for TestResults {
    fn from(summary: &ResultSummary) -> Self {
        Self {
            wpm: summary.wpm,
            accuracy: summary.accuracy,
            time: summary.elapsed_secs,
            errors: summary.error_count,
        }
    }
}

/// Events a typing client sends to the relay.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    StartTest {
        /// Epoch milliseconds.
        timestamp: i64,
    },
    TypingProgress {
        progress: f64,
        wpm: f64,
        accuracy: f64,
    },
    TestComplete {
        results: TestResults,
    },
}

/// Events the relay fans out to everyone except the sender.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    #[serde(rename_all = "camelCase")]
    UserStartedTest { user_id: UserId },
    #[serde(rename_all = "camelCase")]
    UserTypingProgress {
        user_id: UserId,
        progress: f64,
        wpm: f64,
        accuracy: f64,
    },
    #[serde(rename_all = "camelCase")]
    UserTestComplete {
        user_id: UserId,
        results: TestResults,
    },
}

impl ClientEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::StartTest { .. } => "startTest",
            ClientEvent::TypingProgress { .. } => "typingProgress",
            ClientEvent::TestComplete { .. } => "testComplete",
        }
    }

    /// The rebroadcast form of this event, attributed to `user_id`.
    /// The start timestamp is not forwarded.
    pub fn into_broadcast(self, user_id: &str) -> ServerEvent {
        let user_id = user_id.to_string();
        match self {
            ClientEvent::StartTest { .. } => ServerEvent::UserStartedTest { user_id },
            ClientEvent::TypingProgress {
                progress,
                wpm,
                accuracy,
            } => ServerEvent::UserTypingProgress {
                user_id,
                progress,
                wpm,
                accuracy,
            },
            ClientEvent::TestComplete { results } => {
                ServerEvent::UserTestComplete { user_id, results }
            }
        }
    }
}

impl ServerEvent {
    pub fn user_id(&self) -> &str {
        match self {
            ServerEvent::UserStartedTest { user_id }
            | ServerEvent::UserTypingProgress { user_id, .. }
            | ServerEvent::UserTestComplete { user_id, .. } => user_id,
        }
    }

    /// Short human-readable line for the peer feed.
    pub fn describe(&self) -> String {
        match self {
            ServerEvent::UserStartedTest { user_id } => format!("{user_id} started a test"),
            ServerEvent::UserTypingProgress {
                user_id,
                progress,
                wpm,
                accuracy,
            } => format!(
                "{user_id}: {progress:.0}% at {wpm:.0} wpm ({accuracy:.0}%)"
            ),
            ServerEvent::UserTestComplete { user_id, results } => format!(
                "{user_id} finished: {:.0} wpm, {:.0}% in {}s",
                results.wpm, results.accuracy, results.time
            ),
        }
    }
}

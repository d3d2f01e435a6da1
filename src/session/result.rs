use serde::{Deserialize, Serialize};

/// Outcome of one finished session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub wpm: f64,
    pub accuracy: f64,
    pub elapsed_secs: u32,
    pub error_count: usize,
}

impl ResultSummary {
    pub fn rounded_wpm(&self) -> i64 {
        self.wpm.round() as i64
    }

    pub fn rounded_accuracy(&self) -> i64 {
        self.accuracy.round() as i64
    }

    /// The one-line brag offered when a test ends.
    pub fn share_text(&self) -> String {
        format!(
            "I just achieved {} WPM with {}% accuracy in {} seconds on TypeType!",
            self.rounded_wpm(),
            self.rounded_accuracy(),
            self.elapsed_secs
        )
    }
}

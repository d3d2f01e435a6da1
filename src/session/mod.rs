pub mod clock;
pub mod input;
pub mod passage;
pub mod result;
pub mod state;

pub use input::{CharState, KeyOutcome, Keystroke};
pub use result::ResultSummary;
pub use state::{Status, TickOutcome, TypingSession, WordState};

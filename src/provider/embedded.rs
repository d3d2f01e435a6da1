use crate::provider::{ProviderError, TextProvider};

/// Passages the text service ships with.
pub const SEED_TEXTS: &[&str] = &[
    "The quick brown fox jumps over the lazy dog. This pangram contains every letter of the alphabet at least once. Pangrams are often used to display font samples and test keyboards.",
    "Programming is the art of telling another human being what one wants the computer to do. It requires logical thinking and creative problem-solving skills.",
    "The internet is a global system of interconnected computer networks that use the standard Internet protocol suite to link devices worldwide.",
    "Artificial intelligence is the simulation of human intelligence in machines that are programmed to think and learn like humans.",
    "JavaScript is a high-level, interpreted programming language that conforms to the ECMAScript specification. It is a language that is also characterized as dynamic, weakly typed, prototype-based and multi-paradigm.",
];

/// Used whenever the text service cannot be reached.
pub const FALLBACK_TEXTS: &[&str] = &[
    "The quick brown fox jumps over the lazy dog. This pangram contains every letter of the alphabet at least once. Pangrams are often used to display font samples and test keyboards.",
    "Programming is the art of telling another human being what one wants the computer to do. It requires logical thinking and creative problem-solving skills.",
    "The internet is a global system of interconnected computer networks that use the standard Internet protocol suite to link devices worldwide.",
    "Artificial intelligence is the simulation of human intelligence in machines that are programmed to think and learn like humans.",
    "JavaScript is a high-level, interpreted programming language that conforms to the ECMAScript specification. It is a language that is also characterized as dynamic, weakly typed, prototype-based and multi-paradigm.",
    "Computer science is the study of computers and computational systems. Unlike electrical and computer engineers, computer scientists deal mostly with software and software systems.",
    "Web development is the work involved in developing a website for the Internet or an intranet. Web development can range from developing a simple single static page of plain text to complex web applications.",
    "Machine learning is a subset of artificial intelligence that enables computers to learn and make decisions from data without being explicitly programmed for every task.",
];

/// Serves `SEED_TEXTS` without touching the network.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmbeddedTexts;

impl TextProvider for EmbeddedTexts {
    fn texts(&self) -> Result<Vec<String>, ProviderError> {
        Ok(SEED_TEXTS.iter().map(|t| t.to_string()).collect())
    }

    fn text(&self, id: usize) -> Result<String, ProviderError> {
        SEED_TEXTS
            .get(id)
            .map(|t| t.to_string())
            .ok_or(ProviderError::NotFound(id))
    }
}

pub mod embedded;
pub mod http;
pub mod service;

use rand::Rng;
use thiserror::Error;
use tracing::{info, warn};

pub use embedded::{EmbeddedTexts, FALLBACK_TEXTS, SEED_TEXTS};
pub use http::HttpTextProvider;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[cfg(feature = "network")]
    #[error("text service unreachable: {0}")]
    Network(#[from] reqwest::Error),
    #[error("text service answered with status {0}")]
    Status(u16),
    #[error("malformed text payload: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("no text with id {0}")]
    NotFound(usize),
    #[error("text service returned no passages")]
    Empty,
    #[error("built without network support")]
    Offline,
}

/// Where passages come from.
pub trait TextProvider {
    fn texts(&self) -> Result<Vec<String>, ProviderError>;
    fn text(&self, id: usize) -> Result<String, ProviderError>;
}

/// Pick a random passage from `provider`, falling back to the built-in list.
pub fn random_passage<R: Rng>(provider: &dyn TextProvider, rng: &mut R) -> String {
    match provider.texts().and_then(|texts| {
        if texts.is_empty() {
            Err(ProviderError::Empty)
        } else {
            Ok(texts)
        }
    }) {
        Ok(mut texts) => {
            let idx = rng.gen_range(0..texts.len());
            info!(idx, available = texts.len(), "passage_fetched");
            texts.swap_remove(idx)
        }
        Err(err) => {
            warn!(%err, "text_provider_failed_using_fallback");
            FALLBACK_TEXTS[rng.gen_range(0..FALLBACK_TEXTS.len())].to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    struct Fixed(Vec<String>);

    impl TextProvider for Fixed {
        fn texts(&self) -> Result<Vec<String>, ProviderError> {
            Ok(self.0.clone())
        }

        fn text(&self, id: usize) -> Result<String, ProviderError> {
            self.0.get(id).cloned().ok_or(ProviderError::NotFound(id))
        }
    }

    struct Down;

    impl TextProvider for Down {
        fn texts(&self) -> Result<Vec<String>, ProviderError> {
            Err(ProviderError::Status(503))
        }

        fn text(&self, _id: usize) -> Result<String, ProviderError> {
            Err(ProviderError::Status(503))
        }
    }

    #[test]
    fn test_picks_from_provider() {
        let mut rng = SmallRng::seed_from_u64(7);
        let provider = Fixed(vec!["only one".to_string()]);
        assert_eq!(random_passage(&provider, &mut rng), "only one");
    }

    #[test]
    fn test_falls_back_on_error() {
        let mut rng = SmallRng::seed_from_u64(7);
        let text = random_passage(&Down, &mut rng);
        assert!(FALLBACK_TEXTS.contains(&text.as_str()));
    }

    #[test]
    fn test_falls_back_on_empty_list() {
        let mut rng = SmallRng::seed_from_u64(7);
        let text = random_passage(&Fixed(Vec::new()), &mut rng);
        assert!(FALLBACK_TEXTS.contains(&text.as_str()));
    }

    #[test]
    fn test_falls_back_on_malformed_payload() {
        struct Garbled;
        impl TextProvider for Garbled {
            fn texts(&self) -> Result<Vec<String>, ProviderError> {
                Ok(serde_json::from_str::<Vec<String>>("{not json")?)
            }
            fn text(&self, id: usize) -> Result<String, ProviderError> {
                Err(ProviderError::NotFound(id))
            }
        }
        let mut rng = SmallRng::seed_from_u64(1);
        let text = random_passage(&Garbled, &mut rng);
        assert!(FALLBACK_TEXTS.contains(&text.as_str()));
    }
}

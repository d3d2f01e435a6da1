/// A passage split into words on single spaces.
///
/// Consecutive spaces yield empty words, kept at their position so word
/// indices line up with the raw text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Passage {
    text: String,
    words: Vec<Vec<char>>,
}

impl Passage {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            words: text.split(' ').map(|w| w.chars().collect()).collect(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn word(&self, index: usize) -> Option<&[char]> {
        self.words.get(index).map(Vec::as_slice)
    }

    pub fn word_len(&self, index: usize) -> usize {
        self.words.get(index).map_or(0, Vec::len)
    }

    pub fn words(&self) -> impl Iterator<Item = &[char]> {
        self.words.iter().map(Vec::as_slice)
    }
}

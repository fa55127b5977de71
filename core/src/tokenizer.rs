use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref WORD: Regex = Regex::new(r"(?u)[\p{L}\p{N}][\p{L}\p{N}']*").expect("valid regex");
}

/// Lazy stream of normalized words pulled out of a block of text.
///
/// The text is NFKC-normalized and lowercased once up front; a word is a
/// letter or digit followed by letters, digits or apostrophes. The stream
/// is finite and not restartable. Minimum-length and stop-word filtering
/// happen at indexing time, not here.
pub struct WordStream {
    text: String,
    pos: usize,
}

impl WordStream {
    pub fn new(text: &str) -> Self {
        let folded = text.nfkc().collect::<String>().to_lowercase();
        WordStream { text: folded, pos: 0 }
    }

    /// Return the next word, or `None` once the text is exhausted.
    pub fn next_word(&mut self) -> Option<String> {
        let m = WORD.find(&self.text[self.pos..])?;
        let word = m.as_str().to_string();
        self.pos += m.end();
        Some(word)
    }
}

impl Iterator for WordStream {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.next_word()
    }
}

/// Tokenize a whole block of text at once.
pub fn tokenize(text: &str) -> Vec<String> {
    WordStream::new(text).collect()
}

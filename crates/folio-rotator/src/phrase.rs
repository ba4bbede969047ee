#![forbid(unsafe_code)]

//! Phrases split on extended grapheme cluster boundaries.
//!
//! Typing and deleting move one grapheme at a time, so an emoji or a letter
//! with a combining mark appears and disappears as a single keystroke.

use std::fmt;

use folio_core::error::{FolioError, Result};
use unicode_segmentation::UnicodeSegmentation;

/// One phrase plus the byte offset at which each grapheme ends.
#[derive(Clone, PartialEq, Eq)]
pub struct Phrase {
    text: String,
    ends: Vec<usize>,
}

impl Phrase {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let ends = text
            .grapheme_indices(true)
            .map(|(start, g)| start + g.len())
            .collect();
        Self { text, ends }
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length in graphemes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.ends.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ends.is_empty()
    }

    /// The first `graphemes` graphemes. Saturates at the full phrase.
    #[must_use]
    pub fn prefix(&self, graphemes: usize) -> &str {
        match graphemes.min(self.len()) {
            0 => "",
            n => &self.text[..self.ends[n - 1]],
        }
    }
}

impl fmt::Debug for Phrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Phrase").field(&self.text).finish()
    }
}

impl From<&str> for Phrase {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Phrase {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

/// Ordered, cyclic, non-empty list of phrases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseSequence {
    phrases: Vec<Phrase>,
}

impl PhraseSequence {
    /// Build a sequence.
    ///
    /// # Errors
    ///
    /// Returns [`FolioError::EmptyPhraseSequence`] if `phrases` is empty.
    pub fn new<I, P>(phrases: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<Phrase>,
    {
        let phrases: Vec<Phrase> = phrases.into_iter().map(Into::into).collect();
        if phrases.is_empty() {
            return Err(FolioError::EmptyPhraseSequence);
        }
        Ok(Self { phrases })
    }

    /// Number of phrases; never zero.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    /// Phrase at `index`, wrapping around the end of the sequence.
    #[must_use]
    pub fn get(&self, index: usize) -> &Phrase {
        &self.phrases[index % self.phrases.len()]
    }

    /// Index that follows `index`, wrapping to 0 after the last phrase.
    #[inline]
    #[must_use]
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.phrases.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Phrase> {
        self.phrases.iter()
    }
}

use crate::selector::Chain;
use regex::Regex;
use std::collections::HashSet;

/// Set of lower-cased words seen in free text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordUsage {
    seen: HashSet<String>,
}

impl WordUsage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            seen: words.into_iter().map(|w| w.as_ref().to_lowercase()).collect(),
        }
    }

    pub fn merge(&mut self, other: WordUsage) {
        self.seen.extend(other.seen);
    }

    pub fn contains(&self, word: &str) -> bool {
        self.seen.contains(&word.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Every position needs its tag, id, classes and attribute names to
    /// appear as words
    pub fn includes(&self, chain: &Chain) -> bool {
        chain.iter().all(|compound| {
            compound.tag.as_deref().map_or(true, |tag| self.contains(tag))
                && compound.id.as_deref().map_or(true, |id| self.contains(id))
                && compound.classes.iter().all(|class| self.contains(class))
                && compound.attributes.iter().all(|attr| self.contains(attr))
        })
    }
}

/// Splits text into runs of letters, digits and `-`
pub struct WordExtractor {
    word: Regex,
}

impl WordExtractor {
    pub fn new() -> Self {
        Self {
            word: Regex::new(r"[\p{L}\p{N}-]+").expect("word pattern is valid"),
        }
    }

    pub fn extract(&self, text: &str) -> WordUsage {
        WordUsage {
            seen: self
                .word
                .find_iter(text)
                .map(|m| m.as_str().to_lowercase())
                .collect(),
        }
    }
}

impl Default for WordExtractor {
    fn default() -> Self {
        Self::new()
    }
}

use crate::selector::Chain;
use regex::Regex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PatternError {
    #[error("invalid pattern {pattern:?}: {source}")]
    Invalid {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Regular expressions matched against class names or ids
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<Regex>,
}

impl PatternSet {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, PatternError> {
        let patterns = patterns
            .iter()
            .map(|pattern| {
                let pattern = pattern.as_ref();
                Regex::new(pattern).map_err(|source| PatternError::Invalid {
                    pattern: pattern.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    fn matches(&self, value: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.is_match(value))
    }

    /// Every position needs at least one class matching some pattern.
    /// A position without classes is never satisfied.
    pub fn includes_classes(&self, chain: &Chain) -> bool {
        chain
            .iter()
            .all(|compound| compound.classes.iter().any(|class| self.matches(class)))
    }

    /// Every position needs an id matching some pattern. A position without
    /// an id is never satisfied.
    pub fn includes_ids(&self, chain: &Chain) -> bool {
        chain
            .iter()
            .all(|compound| compound.id.as_deref().map_or(false, |id| self.matches(id)))
    }
}

//! Selector model used for purging
//!
//! Selectors are reduced to the parts that can be checked against markup:
//! tag, id, classes and attribute names. Pseudo-classes and pseudo-elements
//! are kept for completeness but never take part in matching.

mod parser;

pub use parser::{parse, SelectorError};

use std::collections::BTreeSet;

/// A single selector fragment without combinators, e.g. `div.foo#bar[data-x]`
///
/// The same type describes a seen HTML node: a start tag carries a tag, an id,
/// classes and attribute names, which is all a requirement can ask for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compound {
    /// Lower-cased tag name
    pub tag: Option<String>,

    /// Lower-cased id
    pub id: Option<String>,

    /// Lower-cased class names
    pub classes: BTreeSet<String>,

    /// Lower-cased attribute names
    pub attributes: BTreeSet<String>,

    /// Pseudo-class names, including functional ones like `not`
    pub pseudo_classes: Vec<String>,

    /// Pseudo-element names
    pub pseudo_elements: Vec<String>,
}

impl Compound {
    /// Compound with only a tag name
    pub fn tag(name: impl Into<String>) -> Self {
        Self {
            tag: Some(name.into()),
            ..Self::default()
        }
    }

    /// True for the universal selector `*`, i.e. every field is empty
    pub fn is_universal(&self) -> bool {
        self.tag.is_none()
            && self.id.is_none()
            && self.classes.is_empty()
            && self.attributes.is_empty()
            && self.pseudo_classes.is_empty()
            && self.pseudo_elements.is_empty()
    }

    /// One-sided subset test of this requirement against a candidate node.
    ///
    /// Fields absent from the requirement impose no constraint.
    pub fn matches(&self, candidate: &Compound) -> bool {
        if let Some(tag) = &self.tag {
            if candidate.tag.as_ref() != Some(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if candidate.id.as_ref() != Some(id) {
                return false;
            }
        }
        self.classes.is_subset(&candidate.classes)
            && self.attributes.is_subset(&candidate.attributes)
    }
}

/// Ordered compounds of one selector, combinators discarded
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chain(Vec<Compound>);

impl Chain {
    pub fn new(compounds: Vec<Compound>) -> Self {
        Self(compounds)
    }

    /// Chain holding only the universal selector
    pub fn universal() -> Self {
        Self(vec![Compound::default()])
    }

    pub fn compounds(&self) -> &[Compound] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Compound> {
        self.0.iter()
    }

    pub fn into_compounds(self) -> Vec<Compound> {
        self.0
    }
}

impl<'a> IntoIterator for &'a Chain {
    type Item = &'a Compound;
    type IntoIter = std::slice::Iter<'a, Compound>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

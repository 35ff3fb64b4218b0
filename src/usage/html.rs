use crate::selector::{self, Chain, Compound, SelectorError};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;
use std::borrow::Cow;
use thiserror::Error;

/// Selectors every document implicitly uses
pub const DEFAULT_PRESET: &[&str] = &["html", "head", "body"];

/// Elements whose content is raw text and must not be tokenized as markup
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HtmlError {
    #[error("HTML syntax error at offset {offset}: {message}")]
    Syntax { message: String, offset: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PresetError {
    #[error("invalid selector {selector:?}: {source}")]
    InvalidSelector {
        selector: String,
        #[source]
        source: SelectorError,
    },
}

/// Bag of nodes seen in markup, one compound per start tag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlUsage {
    seen: Vec<Compound>,
}

impl HtmlUsage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_nodes(seen: Vec<Compound>) -> Self {
        Self { seen }
    }

    /// Extract the nodes of one document
    pub fn extract(source: &str) -> Result<Self, HtmlError> {
        HtmlExtractor::new().extract(source)
    }

    /// Build a bag from literal selectors. Comma lists are split; every
    /// compound of every selector becomes a node.
    pub fn from_selectors<S: AsRef<str>>(selectors: &[S]) -> Result<Self, PresetError> {
        let mut seen = Vec::new();

        for selector in selectors {
            for part in selector.as_ref().split(',') {
                let part = part.trim();
                if part.is_empty() {
                    continue;
                }

                let chain = selector::parse(part).map_err(|source| PresetError::InvalidSelector {
                    selector: part.to_string(),
                    source,
                })?;
                seen.extend(chain.into_compounds());
            }
        }

        Ok(Self { seen })
    }

    /// Concatenate another bag onto this one
    pub fn merge(&mut self, other: HtmlUsage) {
        self.seen.extend(other.seen);
    }

    pub fn seen(&self) -> &[Compound] {
        &self.seen
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// True iff every position of the chain is matched by at least one node.
    /// One node may satisfy several positions.
    pub fn includes(&self, chain: &Chain) -> bool {
        let mut pending = chain.len();
        let mut found = vec![false; pending];

        for node in &self.seen {
            for (index, requirement) in chain.iter().enumerate() {
                if found[index] || !requirement.matches(node) {
                    continue;
                }

                found[index] = true;
                pending -= 1;
                if pending == 0 {
                    return true;
                }
            }
        }

        false
    }
}

/// HTML start-tag walker built on the quick-xml reader in lenient mode
pub struct HtmlExtractor {
    raw_text: Vec<Regex>,
}

impl HtmlExtractor {
    pub fn new() -> Self {
        let raw_text = RAW_TEXT_ELEMENTS
            .iter()
            .map(|name| {
                Regex::new(&format!(r"(?is)(<{name}\b[^>]*>).*?(</{name}\s*>)"))
                    .expect("raw text pattern is valid")
            })
            .collect();

        Self { raw_text }
    }

    /// Walk every start tag of a document and record its tag, id, classes
    /// and attribute names, all lower-cased
    pub fn extract(&self, source: &str) -> Result<HtmlUsage, HtmlError> {
        let markup = self.blank_raw_text(source);

        let mut reader = Reader::from_str(&markup);
        reader.trim_text(true);
        reader.check_end_names(false);

        let mut seen = Vec::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                    let node = node_of(e).map_err(|message| HtmlError::Syntax {
                        message,
                        offset: reader.buffer_position(),
                    })?;
                    seen.push(node);
                }
                Ok(Event::Eof) => {
                    if let Some(offset) = truncated_tag(&markup) {
                        return Err(HtmlError::Syntax {
                            message: "unexpected end of input inside a tag".to_string(),
                            offset,
                        });
                    }
                    break;
                }
                Err(e) => {
                    return Err(HtmlError::Syntax {
                        message: e.to_string(),
                        offset: reader.buffer_position(),
                    });
                }
                _ => {}
            }
            buf.clear();
        }

        Ok(HtmlUsage::from_nodes(seen))
    }

    /// Empty the content of script, style and textarea elements
    fn blank_raw_text<'a>(&self, source: &'a str) -> Cow<'a, str> {
        let mut markup = Cow::Borrowed(source);
        for pattern in &self.raw_text {
            if let Cow::Owned(replaced) = pattern.replace_all(&markup, "$1$2") {
                markup = Cow::Owned(replaced);
            }
        }
        markup
    }
}

impl Default for HtmlExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn node_of(start: &BytesStart<'_>) -> Result<Compound, String> {
    let mut node = Compound::tag(lower(start.name().as_ref()));

    let mut attributes = start.html_attributes();
    attributes.with_checks(false);

    for attribute in attributes {
        let attribute = attribute.map_err(|e| e.to_string())?;
        let name = lower(attribute.key.as_ref());
        let value = String::from_utf8_lossy(&attribute.value);

        match name.as_str() {
            "id" => {
                node.id = Some(unquote(&value).to_lowercase());
            }
            "class" => {
                node.classes.extend(
                    value
                        .split_whitespace()
                        .map(|class| unquote(class).to_lowercase())
                        .filter(|class| !class.is_empty()),
                );
            }
            _ => {
                node.attributes.insert(name);
            }
        }
    }

    Ok(node)
}

/// Offset of a tag opened at the end of the markup and never closed.
/// The lenient reader drops such a tail without an error.
fn truncated_tag(markup: &str) -> Option<usize> {
    let open = markup.rfind('<')?;
    let tail = &markup[open + 1..];
    if tail.contains('>') {
        return None;
    }
    let next = tail.chars().next()?;
    (next.is_alphabetic() || next == '/' || next == '!').then_some(open)
}

fn lower(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).to_lowercase()
}

fn unquote(value: &str) -> &str {
    value.trim_matches(|c| c == '"' || c == '\'')
}

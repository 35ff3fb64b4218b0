//! Usage indices
//!
//! Every index answers one question: might this selector chain match
//! something in the corpus? Answers are approximate and err on the side of
//! keeping. Each position of a chain is checked on its own; ancestry and
//! sibling order are never modelled.

mod css;
mod html;
mod pattern;
mod word;

pub use css::{CssUsage, CssUsageError};
pub(crate) use css::font_name;
pub use html::{HtmlError, HtmlExtractor, HtmlUsage, PresetError, DEFAULT_PRESET};
pub use pattern::{PatternError, PatternSet};
pub use word::{WordExtractor, WordUsage};

use crate::selector::Chain;

/// Read-only index consulted by the purge engine
#[derive(Debug, Clone)]
pub enum UsageIndex {
    /// Nodes seen in HTML documents
    Html(HtmlUsage),

    /// Words seen in auxiliary text files
    Words(WordUsage),

    /// Class names matching any of these patterns are always used
    ClassPatterns(PatternSet),

    /// Ids matching any of these patterns are always used
    IdPatterns(PatternSet),

    /// Nodes built from selectors that are always kept
    Preset(HtmlUsage),

    /// Logical OR of the members
    Union(Vec<UsageIndex>),
}

impl UsageIndex {
    /// Whether the chain might be used. Side-effect free.
    pub fn includes(&self, chain: &Chain) -> bool {
        match self {
            UsageIndex::Html(usage) | UsageIndex::Preset(usage) => usage.includes(chain),
            UsageIndex::Words(usage) => usage.includes(chain),
            UsageIndex::ClassPatterns(patterns) => patterns.includes_classes(chain),
            UsageIndex::IdPatterns(patterns) => patterns.includes_ids(chain),
            UsageIndex::Union(members) => members.iter().any(|member| member.includes(chain)),
        }
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            UsageIndex::Html(_) => "html",
            UsageIndex::Words(_) => "words",
            UsageIndex::ClassPatterns(_) => "class patterns",
            UsageIndex::IdPatterns(_) => "id patterns",
            UsageIndex::Preset(_) => "preset",
            UsageIndex::Union(_) => "union",
        }
    }
}

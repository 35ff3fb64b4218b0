use super::UsageIndex;
use crate::css::{self, CssError, GrammarEvent, GrammarKind};
use crate::selector::{self, Chain, SelectorError};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CssUsageError {
    #[error(transparent)]
    Css(#[from] CssError),

    #[error("invalid selector {selector:?}: {source}")]
    Selector {
        selector: String,
        #[source]
        source: SelectorError,
    },
}

/// Which selectors reference each font family and each keyframes name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CssUsage {
    font_faces: HashMap<String, Vec<Chain>>,
    keyframes: HashMap<String, Vec<Chain>>,
}

impl CssUsage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walk one stylesheet and record the selectors of every ruleset that
    /// declares a font family or an animation
    pub fn extract(source: &str) -> Result<Self, CssUsageError> {
        let mut usage = Self::default();
        let mut ruleset = Ruleset::default();

        // nesting depth inside a keyframes block, whose rules are never recorded
        let mut keyframes_depth = 0usize;

        for event in css::parse(source) {
            let event = event?;

            if keyframes_depth > 0 {
                match event.kind {
                    GrammarKind::BeginAtRule => keyframes_depth += 1,
                    GrammarKind::EndAtRule => keyframes_depth -= 1,
                    _ => {}
                }
                continue;
            }

            match event.kind {
                GrammarKind::BeginAtRule if css::is_keyframes(event.at_name()) => {
                    keyframes_depth = 1;
                }
                GrammarKind::QualifiedRule | GrammarKind::BeginRuleset => {
                    ruleset.selectors.push(event.text());
                }
                GrammarKind::Declaration if !ruleset.selectors.is_empty() => {
                    ruleset.declaration(&event);
                }
                GrammarKind::EndRuleset => {
                    usage.record(&ruleset)?;
                    ruleset = Ruleset::default();
                }
                _ => {}
            }
        }

        Ok(usage)
    }

    fn record(&mut self, ruleset: &Ruleset) -> Result<(), CssUsageError> {
        if ruleset.font_faces.is_empty() && ruleset.keyframes.is_empty() {
            return Ok(());
        }

        let chains = ruleset
            .selectors
            .iter()
            .map(|text| {
                selector::parse(text).map_err(|source| CssUsageError::Selector {
                    selector: text.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        for name in &ruleset.font_faces {
            self.font_faces
                .entry(name.clone())
                .or_default()
                .extend(chains.iter().cloned());
        }
        for name in &ruleset.keyframes {
            self.keyframes
                .entry(name.clone())
                .or_default()
                .extend(chains.iter().cloned());
        }

        Ok(())
    }

    /// Concatenate the per-name selector lists of another stylesheet
    pub fn merge(&mut self, other: CssUsage) {
        for (name, chains) in other.font_faces {
            self.font_faces.entry(name).or_default().extend(chains);
        }
        for (name, chains) in other.keyframes {
            self.keyframes.entry(name).or_default().extend(chains);
        }
    }

    pub fn font_faces(&self) -> &HashMap<String, Vec<Chain>> {
        &self.font_faces
    }

    pub fn keyframes(&self) -> &HashMap<String, Vec<Chain>> {
        &self.keyframes
    }

    /// Whether any selector using this font family is included
    pub fn font_face_used(&self, family: &str, index: &UsageIndex) -> bool {
        any_included(self.font_faces.get(family), index)
    }

    /// Whether any selector using this animation is included
    pub fn keyframes_used(&self, name: &str, index: &UsageIndex) -> bool {
        any_included(self.keyframes.get(name), index)
    }
}

fn any_included(chains: Option<&Vec<Chain>>, index: &UsageIndex) -> bool {
    chains.map_or(false, |chains| chains.iter().any(|chain| index.includes(chain)))
}

/// Accumulators for the ruleset being walked
#[derive(Default)]
struct Ruleset {
    selectors: Vec<String>,
    font_faces: Vec<String>,
    keyframes: Vec<String>,
}

impl Ruleset {
    fn declaration(&mut self, event: &GrammarEvent<'_>) {
        let property = css::unprefixed(event.data);

        if property.eq_ignore_ascii_case("font-family") {
            for family in event.values.split(|value| *value == ",") {
                let joined = family.concat();
                let name = font_name(&joined);
                if !name.is_empty() {
                    self.font_faces.push(name.to_string());
                }
            }
        } else if property.eq_ignore_ascii_case("animation")
            || property.eq_ignore_ascii_case("animation-name")
        {
            for value in &event.values {
                if *value == " " || *value == "," {
                    continue;
                }
                let name = unquote(value);
                if !name.is_empty() {
                    self.keyframes.push(name.to_string());
                }
            }
        }
    }
}

/// Font family as written in `font-family` of both rulesets and font-faces
pub(crate) fn font_name(raw: &str) -> &str {
    unquote(raw.trim()).trim()
}

fn unquote(value: &str) -> &str {
    value.trim_matches(|c| c == '"' || c == '\'')
}

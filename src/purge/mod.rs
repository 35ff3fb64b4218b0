//! Streaming purge of one stylesheet
//!
//! Grammar events drive a single loop over an explicit state. Rules whose
//! selectors are all unused are dropped, conditional group rules are only
//! opened once something inside them survives, and `@font-face` and
//! `@keyframes` blocks are kept only when a surviving rule references them.

mod emitter;

pub use emitter::Emitter;

use crate::css::{self, CssError, GrammarEvent, GrammarKind};
use crate::selector::{self, SelectorError};
use crate::usage::{CssUsage, UsageIndex};
use serde::Serialize;
use std::io::{self, Write};
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Error, Debug)]
pub enum PurgeError {
    #[error(transparent)]
    Css(#[from] CssError),

    #[error("invalid selector {selector:?}: {source}")]
    Selector {
        selector: String,
        #[source]
        source: SelectorError,
    },

    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

/// Counters for one purged stylesheet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PurgeStats {
    pub selectors_kept: usize,
    pub selectors_removed: usize,
    pub rulesets_removed: usize,
    pub font_faces_removed: usize,
    pub keyframes_removed: usize,
    pub bytes_in: u64,
    pub bytes_out: u64,
}

impl std::ops::AddAssign for PurgeStats {
    fn add_assign(&mut self, other: Self) {
        self.selectors_kept += other.selectors_kept;
        self.selectors_removed += other.selectors_removed;
        self.rulesets_removed += other.rulesets_removed;
        self.font_faces_removed += other.font_faces_removed;
        self.keyframes_removed += other.keyframes_removed;
        self.bytes_in += other.bytes_in;
        self.bytes_out += other.bytes_out;
    }
}

/// Conditional group rules, opened lazily
const CONDITIONAL_RULES: &[&str] = &[
    "media",
    "supports",
    "container",
    "layer",
    "document",
    "scope",
    "starting-style",
];

/// Purges stylesheets against a frozen usage index
pub struct Purger<'a> {
    index: &'a UsageIndex,
    css_usage: &'a CssUsage,
}

impl<'a> Purger<'a> {
    pub fn new(index: &'a UsageIndex, css_usage: &'a CssUsage) -> Self {
        Self { index, css_usage }
    }

    /// Write the retained parts of `source` to `out`.
    ///
    /// Any grammar error or unparsable selector aborts the stylesheet; what
    /// was written before the error stays written.
    pub fn purge<W: Write>(&self, source: &str, out: W) -> Result<PurgeStats, PurgeError> {
        let mut run = Run {
            index: self.index,
            css_usage: self.css_usage,
            source,
            out: Emitter::new(out),
            state: State::Outer,
            blocks: Vec::new(),
            retained: false,
            font_face: None,
            stats: PurgeStats {
                bytes_in: source.len() as u64,
                ..PurgeStats::default()
            },
        };

        for event in css::parse(source) {
            run.step(event?)?;
        }

        run.finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Outer,

    /// Dropping a ruleset whose selectors were all unused
    SkipRuleset { depth: usize },

    /// Inside `@keyframes`, copied verbatim from `start` when kept
    Keyframes { keep: bool, start: usize, depth: usize },
}

/// Open at-rule blocks, innermost last
#[derive(Debug)]
enum Block {
    /// Conditional prelude not written yet
    Pending(String),
    Open,
    FontFace,
}

struct FontFace {
    buffer: Emitter<Vec<u8>>,
    family: String,
}

struct Run<'a, 's, W: Write> {
    index: &'a UsageIndex,
    css_usage: &'a CssUsage,
    source: &'s str,
    out: Emitter<W>,
    state: State,
    blocks: Vec<Block>,

    /// A selector of the current rule was kept
    retained: bool,

    /// Set while inside `@font-face`; output goes to its buffer
    font_face: Option<FontFace>,

    stats: PurgeStats,
}

impl<'a, 's, W: Write> Run<'a, 's, W> {
    fn step(&mut self, event: GrammarEvent<'s>) -> Result<(), PurgeError> {
        let state = self.state;
        self.state = match state {
            State::Outer => self.outer(&event)?,
            State::SkipRuleset { depth } => skip_ruleset(event.kind, depth),
            State::Keyframes { keep, start, depth } => self.keyframes(&event, keep, start, depth)?,
        };
        Ok(())
    }

    fn finish(mut self) -> Result<PurgeStats, PurgeError> {
        self.out.flush()?;
        Ok(PurgeStats {
            bytes_out: self.out.written(),
            ..self.stats
        })
    }

    fn outer(&mut self, event: &GrammarEvent<'s>) -> Result<State, PurgeError> {
        match event.kind {
            GrammarKind::Comment => {
                if event.data.starts_with("/*!") || event.data.starts_with("/*#") {
                    self.write(event.data)?;
                    self.write("\n")?;
                }
            }
            GrammarKind::QualifiedRule => self.selector(event)?,
            GrammarKind::BeginRuleset => {
                self.selector(event)?;
                if !self.retained {
                    self.stats.rulesets_removed += 1;
                    return Ok(State::SkipRuleset { depth: 1 });
                }
                self.write("{")?;
                self.retained = false;
            }
            GrammarKind::EndRuleset => self.close()?,
            GrammarKind::Declaration | GrammarKind::CustomPropertyDeclaration => {
                self.declaration(event)?;
            }
            GrammarKind::AtRule => {
                self.flush_pending()?;
                self.write(&event.prelude())?;
                self.write(";")?;
            }
            GrammarKind::BeginAtRule => return self.begin_at_rule(event),
            GrammarKind::EndAtRule => self.end_at_rule()?,
        }

        Ok(State::Outer)
    }

    fn selector(&mut self, event: &GrammarEvent<'s>) -> Result<(), PurgeError> {
        let text = event.text();
        let chain = selector::parse(&text).map_err(|source| PurgeError::Selector {
            selector: text.clone(),
            source,
        })?;

        if !self.index.includes(&chain) {
            debug!("Excluding selector: {}", text);
            self.stats.selectors_removed += 1;
            return Ok(());
        }

        // something inside is kept, so every enclosing block must exist
        self.flush_pending()?;

        if self.retained {
            self.write(",")?;
        }
        self.retained = true;
        self.stats.selectors_kept += 1;
        self.write(&text)?;
        Ok(())
    }

    fn declaration(&mut self, event: &GrammarEvent<'s>) -> io::Result<()> {
        if let Some(face) = &mut self.font_face {
            if event.data.eq_ignore_ascii_case("font-family") {
                face.family = crate::usage::font_name(&event.text()).to_string();
            }
        }

        match &mut self.font_face {
            Some(face) => face.buffer.declaration(event.data, &event.values),
            None => self.out.declaration(event.data, &event.values),
        }
    }

    fn begin_at_rule(&mut self, event: &GrammarEvent<'s>) -> Result<State, PurgeError> {
        let name = event.at_name();

        if css::is_keyframes(name) {
            let animation = event.text();
            let animation = animation.trim_matches(|c| c == '"' || c == '\'');
            let keep = self.css_usage.keyframes_used(animation, self.index);
            if !keep {
                debug!("Excluding keyframes: {}", animation);
                self.stats.keyframes_removed += 1;
            }
            return Ok(State::Keyframes {
                keep,
                start: event.span.start,
                depth: 1,
            });
        }

        let lowered = css::unprefixed(name).to_ascii_lowercase();

        if CONDITIONAL_RULES.contains(&lowered.as_str()) {
            self.blocks.push(Block::Pending(event.prelude()));
        } else if lowered == "font-face" && self.font_face.is_none() {
            self.font_face = Some(FontFace {
                buffer: Emitter::new(Vec::new()),
                family: String::new(),
            });
            self.write(&event.prelude())?;
            self.write("{")?;
            self.blocks.push(Block::FontFace);
        } else {
            self.flush_pending()?;
            self.write(&event.prelude())?;
            self.write("{")?;
            self.blocks.push(Block::Open);
        }

        Ok(State::Outer)
    }

    fn end_at_rule(&mut self) -> io::Result<()> {
        match self.blocks.pop() {
            Some(Block::Pending(prelude)) => {
                trace!("Dropping empty block: {}", prelude);
                Ok(())
            }
            Some(Block::FontFace) => self.end_font_face(),
            Some(Block::Open) | None => self.close(),
        }
    }

    fn end_font_face(&mut self) -> io::Result<()> {
        let face = match self.font_face.take() {
            Some(face) => face,
            None => return Ok(()),
        };

        let mut buffer = face.buffer;
        buffer.close()?;

        if self.css_usage.font_face_used(&face.family, self.index) {
            self.flush_pending()?;
            self.out.write_bytes(&buffer.into_inner())
        } else {
            debug!("Excluding font-face: {}", face.family);
            self.stats.font_faces_removed += 1;
            Ok(())
        }
    }

    fn keyframes(
        &mut self,
        event: &GrammarEvent<'s>,
        keep: bool,
        start: usize,
        depth: usize,
    ) -> Result<State, PurgeError> {
        let depth = match event.kind {
            GrammarKind::BeginAtRule => depth + 1,
            GrammarKind::EndAtRule => depth - 1,
            _ => depth,
        };

        if depth > 0 {
            return Ok(State::Keyframes { keep, start, depth });
        }

        if keep {
            self.flush_pending()?;
            let source = self.source;
            self.write(&source[start..event.span.end])?;
        }
        Ok(State::Outer)
    }

    /// Open every pending conditional block, outermost first
    fn flush_pending(&mut self) -> io::Result<()> {
        for block in self.blocks.iter_mut() {
            if let Block::Pending(prelude) = block {
                self.out.write(prelude)?;
                self.out.write("{")?;
                *block = Block::Open;
            }
        }
        Ok(())
    }

    fn write(&mut self, text: &str) -> io::Result<()> {
        match &mut self.font_face {
            Some(face) => face.buffer.write(text),
            None => self.out.write(text),
        }
    }

    fn close(&mut self) -> io::Result<()> {
        match &mut self.font_face {
            Some(face) => face.buffer.close(),
            None => self.out.close(),
        }
    }
}

fn skip_ruleset(kind: GrammarKind, depth: usize) -> State {
    let depth = match kind {
        GrammarKind::BeginRuleset => depth + 1,
        GrammarKind::EndRuleset => depth - 1,
        _ => depth,
    };

    if depth == 0 {
        State::Outer
    } else {
        State::SkipRuleset { depth }
    }
}

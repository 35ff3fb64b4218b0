use super::{unprefixed, CssError};
use cssparser::{ParseError, ParseErrorKind, Parser, ParserInput, SourcePosition, Token};
use std::ops::Range;
use tracing::trace;

/// Kind of a grammar event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrammarKind {
    Comment,
    /// A selector of a list, not the last one
    QualifiedRule,
    /// The last selector of a list, the body follows
    BeginRuleset,
    EndRuleset,
    Declaration,
    CustomPropertyDeclaration,
    /// Statement at-rule ending in `;`
    AtRule,
    BeginAtRule,
    EndAtRule,
}

/// One grammar event with the raw text it was built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarEvent<'i> {
    pub kind: GrammarKind,

    /// Raw text of the triggering token: the property name, the at-keyword
    /// including `@`, the selector, the comment, or `}` for end events
    pub data: &'i str,

    /// Component values with whitespace runs collapsed to a single space,
    /// comments dropped and the ends trimmed
    pub values: Vec<&'i str>,

    /// Byte range in the source
    pub span: Range<usize>,
}

impl<'i> GrammarEvent<'i> {
    /// Concatenated component values
    pub fn text(&self) -> String {
        self.values.concat()
    }

    /// At-rule name without `@`
    pub fn at_name(&self) -> &'i str {
        self.data.trim_start_matches('@')
    }

    /// At-keyword followed by its prelude: `@media screen`
    pub fn prelude(&self) -> String {
        if self.values.is_empty() {
            self.data.to_string()
        } else {
            format!("{} {}", self.data, self.values.concat())
        }
    }
}

/// Iterator over the grammar events of one stylesheet.
///
/// Yields every event in source order, then the syntax error if the
/// stylesheet was malformed. Exhaustion is the clean end.
pub struct GrammarStream<'i> {
    events: std::vec::IntoIter<GrammarEvent<'i>>,
    error: Option<CssError>,
}

impl<'i> Iterator for GrammarStream<'i> {
    type Item = Result<GrammarEvent<'i>, CssError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.events.next() {
            Some(event) => Some(Ok(event)),
            None => self.error.take().map(Err),
        }
    }
}

/// Group a stylesheet into grammar events
pub fn parse(source: &str) -> GrammarStream<'_> {
    let mut input = ParserInput::new(source);
    let mut parser = Parser::new(&mut input);

    let mut events = Vec::new();
    let error = rule_list(&mut parser, &mut events).err().map(CssError::from);

    trace!("{} grammar events, malformed: {}", events.len(), error.is_some());

    GrammarStream {
        events: events.into_iter(),
        error,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Malformed {
    message: String,
    offset: usize,
}

impl Malformed {
    fn new(message: impl Into<String>, offset: usize) -> Self {
        Self {
            message: message.into(),
            offset,
        }
    }
}

impl From<Malformed> for CssError {
    fn from(malformed: Malformed) -> Self {
        CssError::Syntax {
            message: malformed.message,
            offset: malformed.offset,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Body {
    Rules,
    Declarations,
}

/// Bodies of conditional group rules and keyframes hold rules, everything
/// else (font-face, page, counter-style, unknown) holds declarations
fn body_of(at_name: &str) -> Body {
    let name = unprefixed(at_name).to_ascii_lowercase();
    match name.as_str() {
        "media" | "supports" | "document" | "layer" | "container" | "scope" | "keyframes"
        | "starting-style" => Body::Rules,
        _ => Body::Declarations,
    }
}

/// Whitespace-collapsing accumulator for component values
#[derive(Default)]
struct Components<'i> {
    values: Vec<&'i str>,
    space: bool,
}

impl<'i> Components<'i> {
    fn push(&mut self, value: &'i str) {
        if self.space && !self.values.is_empty() {
            self.values.push(" ");
        }
        self.space = false;
        self.values.push(value);
    }

    fn space(&mut self) {
        self.space = true;
    }

    fn finish(&mut self) -> Vec<&'i str> {
        self.space = false;
        std::mem::take(&mut self.values)
    }
}

fn event<'i>(kind: GrammarKind, data: &'i str, values: Vec<&'i str>, span: Range<usize>) -> GrammarEvent<'i> {
    GrammarEvent {
        kind,
        data,
        values,
        span,
    }
}

/// Raw text of the token just read; blocks are consumed whole
fn component<'i>(parser: &mut Parser<'i, '_>, start: SourcePosition, token: &Token<'i>) -> Result<&'i str, Malformed> {
    match token {
        Token::BadString(_) => return Err(Malformed::new("unterminated string", start.byte_index())),
        Token::BadUrl(_) => return Err(Malformed::new("malformed url", start.byte_index())),
        Token::Function(_)
        | Token::ParenthesisBlock
        | Token::SquareBracketBlock
        | Token::CurlyBracketBlock => skip_block(parser),
        _ => {}
    }
    Ok(parser.slice_from(start))
}

fn skip_block(parser: &mut Parser<'_, '_>) {
    let _: Result<(), ParseError<'_, ()>> = parser.parse_nested_block(|_| Ok(()));
}

fn nested<'i>(parser: &mut Parser<'i, '_>, events: &mut Vec<GrammarEvent<'i>>, body: Body) -> Result<(), Malformed> {
    let offset = parser.position().byte_index();
    let result: Result<(), ParseError<'i, Malformed>> = parser.parse_nested_block(|block| {
        let outcome = match body {
            Body::Rules => rule_list(block, events),
            Body::Declarations => declaration_list(block, events),
        };
        outcome.map_err(|malformed| block.new_custom_error(malformed))
    });

    result.map_err(|error| match error.kind {
        ParseErrorKind::Custom(malformed) => malformed,
        ParseErrorKind::Basic(kind) => Malformed::new(format!("{:?}", kind), offset),
    })
}

fn rule_list<'i>(parser: &mut Parser<'i, '_>, events: &mut Vec<GrammarEvent<'i>>) -> Result<(), Malformed> {
    loop {
        let state = parser.state();
        let start = parser.position();
        let token = match parser.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => return Ok(()),
        };

        match token {
            Token::WhiteSpace(_) | Token::CDO | Token::CDC | Token::Semicolon => {}
            Token::Comment(_) => {
                let data = parser.slice_from(start);
                let end = parser.position().byte_index();
                events.push(event(GrammarKind::Comment, data, Vec::new(), start.byte_index()..end));
            }
            Token::AtKeyword(_) => at_rule(parser, events, start)?,
            Token::CloseCurlyBracket
            | Token::CloseParenthesis
            | Token::CloseSquareBracket
            | Token::BadString(_)
            | Token::BadUrl(_) => {
                return Err(Malformed::new(
                    format!("unexpected {:?} in rule list", token),
                    start.byte_index(),
                ));
            }
            _ => {
                parser.reset(&state);
                qualified_rule(parser, events)?;
            }
        }
    }
}

/// Selector list and its declaration block
fn qualified_rule<'i>(parser: &mut Parser<'i, '_>, events: &mut Vec<GrammarEvent<'i>>) -> Result<(), Malformed> {
    let mut components = Components::default();
    let mut selector_start = parser.position();

    loop {
        let before = parser.position();
        let token = match parser.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => {
                return Err(Malformed::new(
                    "unexpected end of input in selector",
                    before.byte_index(),
                ))
            }
        };

        match token {
            Token::Comma | Token::CurlyBracketBlock => {
                let values = components.finish();
                if values.is_empty() {
                    return Err(Malformed::new("empty selector", before.byte_index()));
                }

                let raw = parser.slice(selector_start..before);
                let trimmed = raw.trim_start();
                let offset = selector_start.byte_index() + (raw.len() - trimmed.len());
                let data = trimmed.trim_end();
                let span = offset..offset + data.len();

                if token == Token::Comma {
                    events.push(event(GrammarKind::QualifiedRule, data, values, span));
                    selector_start = parser.position();
                    continue;
                }

                events.push(event(GrammarKind::BeginRuleset, data, values, span));
                nested(parser, events, Body::Declarations)?;
                let end = parser.position().byte_index();
                events.push(event(GrammarKind::EndRuleset, "}", Vec::new(), closing(parser, before, end)));
                return Ok(());
            }
            Token::WhiteSpace(_) => components.space(),
            Token::Comment(_) => {}
            Token::Semicolon | Token::CloseCurlyBracket => {
                return Err(Malformed::new(
                    format!("unexpected {:?} in selector", token),
                    before.byte_index(),
                ));
            }
            ref other => {
                let raw = component(parser, before, other)?;
                components.push(raw);
            }
        }
    }
}

/// Span of the `}` closing a block opened at `open`, empty when the block
/// ran to the end of input unclosed
fn closing(parser: &Parser<'_, '_>, open: SourcePosition, end: usize) -> Range<usize> {
    if parser.slice_from(open).ends_with('}') {
        end - 1..end
    } else {
        end..end
    }
}

fn declaration_list<'i>(parser: &mut Parser<'i, '_>, events: &mut Vec<GrammarEvent<'i>>) -> Result<(), Malformed> {
    loop {
        let start = parser.position();
        let token = match parser.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => return Ok(()),
        };

        match token {
            Token::WhiteSpace(_) | Token::Semicolon => {}
            Token::Comment(_) => {
                let data = parser.slice_from(start);
                let end = parser.position().byte_index();
                events.push(event(GrammarKind::Comment, data, Vec::new(), start.byte_index()..end));
            }
            Token::AtKeyword(_) => at_rule(parser, events, start)?,
            Token::Ident(_) => declaration(parser, events, start)?,
            other => {
                return Err(Malformed::new(
                    format!("unexpected {:?} in declaration block", other),
                    start.byte_index(),
                ));
            }
        }
    }
}

/// `property: value...` up to `;` or the end of the block
fn declaration<'i>(
    parser: &mut Parser<'i, '_>,
    events: &mut Vec<GrammarEvent<'i>>,
    start: SourcePosition,
) -> Result<(), Malformed> {
    let data = parser.slice_from(start);

    loop {
        let before = parser.position();
        match parser.next_including_whitespace_and_comments() {
            Ok(Token::WhiteSpace(_)) | Ok(Token::Comment(_)) => {}
            Ok(Token::Colon) => break,
            Ok(other) => {
                return Err(Malformed::new(
                    format!("expected ':' after {}, found {:?}", data, other),
                    before.byte_index(),
                ));
            }
            Err(_) => {
                return Err(Malformed::new(
                    format!("expected ':' after {}", data),
                    before.byte_index(),
                ));
            }
        }
    }

    let value_start = parser.position();
    let mut value_end = value_start;
    let mut components = Components::default();

    loop {
        let before = parser.position();
        let token = match parser.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };

        match token {
            Token::Semicolon => break,
            Token::WhiteSpace(_) => components.space(),
            Token::Comment(_) => {}
            ref other => {
                let raw = component(parser, before, other)?;
                components.push(raw);
            }
        }
        value_end = parser.position();
    }

    let span = start.byte_index()..value_end.byte_index();

    if data.starts_with("--") {
        let raw = parser.slice(value_start..value_end).trim();
        let values = if raw.is_empty() { Vec::new() } else { vec![raw] };
        events.push(event(GrammarKind::CustomPropertyDeclaration, data, values, span));
    } else {
        events.push(event(GrammarKind::Declaration, data, components.finish(), span));
    }

    Ok(())
}

/// `@name prelude;` or `@name prelude { body }`
fn at_rule<'i>(
    parser: &mut Parser<'i, '_>,
    events: &mut Vec<GrammarEvent<'i>>,
    start: SourcePosition,
) -> Result<(), Malformed> {
    let data = parser.slice_from(start);
    let mut components = Components::default();

    loop {
        let before = parser.position();
        let token = match parser.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => {
                let span = start.byte_index()..before.byte_index();
                events.push(event(GrammarKind::AtRule, data, components.finish(), span));
                return Ok(());
            }
        };

        match token {
            Token::Semicolon => {
                let span = start.byte_index()..parser.position().byte_index();
                events.push(event(GrammarKind::AtRule, data, components.finish(), span));
                return Ok(());
            }
            Token::CurlyBracketBlock => {
                let span = start.byte_index()..before.byte_index();
                events.push(event(GrammarKind::BeginAtRule, data, components.finish(), span));

                let name = data.trim_start_matches('@');
                nested(parser, events, body_of(name))?;

                let end = parser.position().byte_index();
                events.push(event(GrammarKind::EndAtRule, "}", Vec::new(), closing(parser, before, end)));
                return Ok(());
            }
            Token::WhiteSpace(_) => components.space(),
            Token::Comment(_) => {}
            ref other => {
                let raw = component(parser, before, other)?;
                components.push(raw);
            }
        }
    }
}

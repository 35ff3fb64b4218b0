use super::{Chain, Compound};
use cssparser::{ParseError, Parser, ParserInput, Token};
use thiserror::Error;

/// Attributes whose presence says nothing stable about the markup
const VOLATILE_ATTRIBUTES: &[&str] = &[
    "checked",
    "class",
    "disabled",
    "open",
    "readonly",
    "selected",
    "value",
];

/// Selector grammar errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("unexpected token {token} at offset {offset} {context}")]
    UnexpectedToken {
        token: String,
        offset: usize,
        context: &'static str,
    },
    #[error("unexpected end of selector at offset {offset} {context}")]
    UnexpectedEnd {
        offset: usize,
        context: &'static str,
    },
}

/// Parse a single selector (no comma lists) into a chain of compounds.
///
/// Combinators and whitespace split compounds; their identity is dropped.
/// A selector that reduces to nothing, like `*`, yields the universal chain.
pub fn parse(selector: &str) -> Result<Chain, SelectorError> {
    let mut input = ParserInput::new(selector);
    let mut parser = Parser::new(&mut input);

    let mut compounds = Vec::new();
    let mut current = Compound::default();

    loop {
        let offset = parser.position().byte_index();
        let token = match parser.next_including_whitespace() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };

        match token {
            Token::IDHash(id) | Token::Hash(id) => {
                current.id = Some(id.to_lowercase());
            }
            Token::Ident(name) => {
                current.tag = Some(name.to_lowercase());
            }
            Token::Delim('*') => {}
            Token::Delim('.') => {
                let class = expect_ident(&mut parser, "while parsing class selector")?;
                current.classes.insert(class);
            }
            Token::Delim('>' | '+' | '~') | Token::WhiteSpace(_) => {
                close_compound(&mut compounds, &mut current);
            }
            Token::Colon => parse_pseudo(&mut parser, &mut current)?,
            Token::SquareBracketBlock => parse_attribute(&mut parser, &mut current)?,
            other => return Err(unexpected(&other, offset, "in selector")),
        }
    }

    close_compound(&mut compounds, &mut current);

    // nothing survived, so this was a lone '*'
    if compounds.is_empty() {
        return Ok(Chain::universal());
    }

    Ok(Chain::new(compounds))
}

fn close_compound(compounds: &mut Vec<Compound>, current: &mut Compound) {
    if !current.is_universal() {
        compounds.push(std::mem::take(current));
    }
}

fn expect_ident(parser: &mut Parser<'_, '_>, context: &'static str) -> Result<String, SelectorError> {
    let offset = parser.position().byte_index();
    match parser.next_including_whitespace() {
        Ok(Token::Ident(name)) => Ok(name.to_lowercase()),
        Ok(other) => Err(unexpected(other, offset, context)),
        Err(_) => Err(SelectorError::UnexpectedEnd { offset, context }),
    }
}

/// `:ident`, `:fn(...)`, `::ident`. Function arguments are skipped by the
/// tokenizer when the next token is requested.
fn parse_pseudo(parser: &mut Parser<'_, '_>, current: &mut Compound) -> Result<(), SelectorError> {
    const CONTEXT: &str = "after colon";

    let offset = parser.position().byte_index();
    let token = match parser.next_including_whitespace() {
        Ok(token) => token.clone(),
        Err(_) => return Err(SelectorError::UnexpectedEnd { offset, context: CONTEXT }),
    };

    match token {
        Token::Ident(name) | Token::Function(name) => {
            current.pseudo_classes.push(name.to_lowercase());
        }
        Token::Colon => {
            let offset = parser.position().byte_index();
            match parser.next_including_whitespace() {
                Ok(Token::Ident(name)) | Ok(Token::Function(name)) => {
                    current.pseudo_elements.push(name.to_lowercase());
                }
                Ok(other) => return Err(unexpected(other, offset, CONTEXT)),
                Err(_) => return Err(SelectorError::UnexpectedEnd { offset, context: CONTEXT }),
            }
        }
        other => return Err(unexpected(&other, offset, CONTEXT)),
    }

    Ok(())
}

/// `[name]`, `[name=value]`, `[name~="value" i]`: only the name is kept
fn parse_attribute(parser: &mut Parser<'_, '_>, current: &mut Compound) -> Result<(), SelectorError> {
    const CONTEXT: &str = "while parsing attribute name";

    let mut outcome = Ok(String::new());
    let _: Result<(), ParseError<'_, ()>> = parser.parse_nested_block(|block| {
        block.skip_whitespace();
        let offset = block.position().byte_index();
        outcome = match block.next_including_whitespace() {
            Ok(Token::Ident(name)) => Ok(name.to_lowercase()),
            Ok(other) => Err(unexpected(other, offset, CONTEXT)),
            Err(_) => Err(SelectorError::UnexpectedEnd { offset, context: CONTEXT }),
        };
        Ok(())
    });

    let name = outcome?;
    if !VOLATILE_ATTRIBUTES.contains(&name.as_str()) {
        current.attributes.insert(name);
    }
    Ok(())
}

fn unexpected(token: &Token<'_>, offset: usize, context: &'static str) -> SelectorError {
    SelectorError::UnexpectedToken {
        token: format!("{:?}", token),
        offset,
        context,
    }
}

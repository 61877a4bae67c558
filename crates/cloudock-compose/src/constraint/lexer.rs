//! Tokenization of version constraint expressions using `nom`.
//!
//! Whitespace is discarded between tokens; adjacency of two comparators in
//! the token stream means logical AND.

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char, multispace0},
    combinator::{value, verify},
};

use crate::error::{ConfigurationError, Result};

/// Comparison operator prefixing a version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `=` or `==`.
    Eq,
    /// `!=`.
    Ne,
    /// `>`.
    Gt,
    /// `>=`.
    Ge,
    /// `<`.
    Lt,
    /// `<=`.
    Le,
    /// `~` (next significant release).
    Tilde,
    /// `^` (next major release).
    Caret,
}

/// A token in a constraint expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `||` or `|` separating alternatives.
    Or,
    /// `,` separating comparators of one alternative.
    Comma,
    /// ` - ` joining the bounds of a hyphen range.
    Hyphen,
    /// A comparison operator.
    Op(Operator),
    /// A (possibly partial or wildcard) version literal.
    Version(String),
}

const fn is_version_start(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '*' | 'x' | 'X' | 'v' | 'V')
}

const fn is_version_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '*' | '-' | '+' | '_')
}

fn version_literal(input: &str) -> IResult<&str, Token> {
    let (input, text) = verify(take_while1(is_version_char), |s: &str| {
        s.starts_with(is_version_start)
    })
    .parse(input)?;
    Ok((input, Token::Version(text.to_string())))
}

fn operator(input: &str) -> IResult<&str, Token> {
    alt((
        value(Token::Op(Operator::Ge), tag(">=")),
        value(Token::Op(Operator::Le), tag("<=")),
        value(Token::Op(Operator::Ne), tag("!=")),
        value(Token::Op(Operator::Eq), tag("==")),
        value(Token::Op(Operator::Gt), char('>')),
        value(Token::Op(Operator::Lt), char('<')),
        value(Token::Op(Operator::Eq), char('=')),
        value(Token::Op(Operator::Tilde), char('~')),
        value(Token::Op(Operator::Caret), char('^')),
    ))
    .parse(input)
}

fn separator(input: &str) -> IResult<&str, Token> {
    alt((
        value(Token::Or, tag("||")),
        value(Token::Or, char('|')),
        value(Token::Comma, char(',')),
        value(Token::Hyphen, char('-')),
    ))
    .parse(input)
}

fn single_token(input: &str) -> IResult<&str, Token> {
    alt((operator, version_literal, separator)).parse(input)
}

/// Tokenizes a constraint expression.
///
/// # Errors
///
/// Returns an error if the input contains characters that cannot start a token.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut remaining = input;

    loop {
        let (rest, _) = multispace0::<&str, nom::error::Error<&str>>(remaining).map_err(|e| {
            ConfigurationError::InvalidConstraint {
                expression: input.to_string(),
                message: format!("lexer error skipping whitespace: {e}"),
            }
        })?;
        remaining = rest;

        if remaining.is_empty() {
            break;
        }

        let (rest, token) =
            single_token(remaining).map_err(|_| ConfigurationError::InvalidConstraint {
                expression: input.to_string(),
                message: format!(
                    "unexpected character at \"{}\"",
                    remaining.chars().take(20).collect::<String>()
                ),
            })?;
        tokens.push(token);
        remaining = rest;
    }

    Ok(tokens)
}

//! Lambda-expression syntax validation using nom parser combinators.
//!
//! A `lambda_expression` tagged map carries the literal source text of the
//! closure that produced it. Before the text is resolved through the
//! expression registry, it is checked against a small expression grammar:
//! an optional closure header (`|params|`) followed by a single expression
//! built from literals, paths, calls, method chains, indexing, and unary or
//! binary operators. Invalid text fails loudly with a syntax-error failure
//! instead of producing a silently broken callable.

use nom::{
	IResult, Parser,
	branch::alt,
	bytes::complete::{is_not, tag, take_while1},
	character::complete::{alpha1, alphanumeric1, char, digit1, multispace0},
	combinator::{all_consuming, opt, recognize, value},
	error::Error,
	multi::{many0, many0_count, separated_list0},
	sequence::{delimited, pair, preceded},
};

use crate::error::{CallableKind, SeriluxError, SeriluxResult};

/// Wraps a parser with optional surrounding whitespace.
fn ws<'a, O, F>(inner: F) -> impl Parser<&'a str, Output = O, Error = Error<&'a str>>
where
	F: Parser<&'a str, Output = O, Error = Error<&'a str>>,
{
	delimited(multispace0, inner, multispace0)
}

/// Parse an identifier (letter or underscore, then alphanumerics or underscores).
fn identifier(input: &str) -> IResult<&str, &str> {
	recognize(pair(
		alt((alpha1, tag("_"))),
		many0_count(alt((alphanumeric1, tag("_")))),
	))
	.parse(input)
}

/// Parse a path: identifiers joined by `::`.
fn path(input: &str) -> IResult<&str, &str> {
	recognize(pair(
		identifier,
		many0_count(preceded(tag("::"), identifier)),
	))
	.parse(input)
}

/// Parse a numeric literal with an optional fractional part.
fn number(input: &str) -> IResult<&str, ()> {
	value((), pair(digit1, opt(preceded(char('.'), digit1)))).parse(input)
}

/// Parse a double-quoted string literal (no escape handling; the grammar
/// only has to accept or reject, not interpret).
fn string_literal(input: &str) -> IResult<&str, ()> {
	value((), delimited(char('"'), opt(is_not("\"")), char('"'))).parse(input)
}

/// Parse a parenthesized expression.
fn parenthesized(input: &str) -> IResult<&str, ()> {
	value((), delimited(char('('), ws(expression), char(')'))).parse(input)
}

/// Parse a call argument list: `( expr, expr, ... )`.
fn call_arguments(input: &str) -> IResult<&str, ()> {
	value(
		(),
		delimited(
			ws(char('(')),
			separated_list0(ws(char(',')), expression),
			ws(char(')')),
		),
	)
	.parse(input)
}

/// Parse a primary term: literal, parenthesized expression, or path.
fn primary(input: &str) -> IResult<&str, ()> {
	alt((number, string_literal, parenthesized, value((), path))).parse(input)
}

/// Parse a postfix chain after a primary: calls (including macro-style
/// `path!(args)`), method calls, field access, and indexing.
fn postfix(input: &str) -> IResult<&str, ()> {
	value(
		(),
		many0(alt((
			value((), pair(opt(char('!')), call_arguments)),
			value(
				(),
				preceded(ws(char('.')), pair(identifier, opt(call_arguments))),
			),
			value((), delimited(ws(char('[')), expression, ws(char(']')))),
		))),
	)
	.parse(input)
}

/// Parse a term: optional unary operators, then a primary and its postfix chain.
fn term(input: &str) -> IResult<&str, ()> {
	value(
		(),
		pair(
			many0_count(ws(alt((char('!'), char('-'), char('&'), char('*'))))),
			pair(primary, postfix),
		),
	)
	.parse(input)
}

/// Parse a binary operator. Multi-character operators come first.
fn binary_operator(input: &str) -> IResult<&str, &str> {
	alt((
		tag("=="),
		tag("!="),
		tag("<="),
		tag(">="),
		tag("&&"),
		tag("||"),
		tag("<"),
		tag(">"),
		tag("+"),
		tag("-"),
		tag("*"),
		tag("/"),
		tag("%"),
	))
	.parse(input)
}

/// Parse an expression: a term, optionally chained with binary operators.
fn expression(input: &str) -> IResult<&str, ()> {
	value(
		(),
		pair(term, many0(pair(ws(binary_operator), term))),
	)
	.parse(input)
}

/// Parse a closure parameter type annotation, loosely: references, paths,
/// generics, and lifetimes are accepted without interpretation.
fn type_annotation(input: &str) -> IResult<&str, ()> {
	value(
		(),
		take_while1(|c: char| {
			c.is_ascii_alphanumeric() || matches!(c, '_' | ':' | '&' | '<' | '>' | '\'' | ' ')
		}),
	)
	.parse(input)
}

/// Parse a closure parameter: `name` or `name: Type`.
fn closure_parameter(input: &str) -> IResult<&str, ()> {
	value(
		(),
		pair(ws(identifier), opt(preceded(char(':'), type_annotation))),
	)
	.parse(input)
}

/// Parse a closure header and body: `|a, b: &T| expr` or `|a| { expr }`.
fn closure(input: &str) -> IResult<&str, ()> {
	value(
		(),
		pair(
			delimited(
				char('|'),
				separated_list0(char(','), closure_parameter),
				char('|'),
			),
			ws(alt((
				value((), delimited(ws(char('{')), expression, ws(char('}')))),
				expression,
			))),
		),
	)
	.parse(input)
}

/// Validates that `source` is a well-formed lambda-like expression.
///
/// # Errors
///
/// Returns [`SeriluxError::Callable`] with the expression kind when the
/// text does not parse as a closure or a bare expression.
pub fn validate_expression(source: &str) -> SeriluxResult<()> {
	let trimmed = source.trim();
	let parsed = all_consuming(ws(alt((closure, expression)))).parse(trimmed);
	match parsed {
		Ok(_) => Ok(()),
		Err(_) => Err(SeriluxError::Callable {
			message: format!("syntax error in expression '{source}'"),
			callable_type: CallableKind::Expression,
		}),
	}
}

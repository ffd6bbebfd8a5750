// ABOUTME: Reader: turns a character stream into S-Expr (+ remaining input).

use crate::error::RagnarokError;
use crate::sexpr::SExpr;
use nom::{
    branch::alt,
    bytes::complete::{escaped, tag, tag_no_case, take_while1},
    character::complete::{char, digit1, multispace0, none_of, one_of},
    combinator::{map, opt, recognize},
    multi::many0,
    sequence::{delimited, preceded},
    IResult, Parser,
};
use num_bigint::BigInt;

type RResult<'a, O> = IResult<&'a str, O>;

fn ws(input: &str) -> RResult<'_, ()> {
    let (input, _) = multispace0(input)?;
    Ok((input, ()))
}

/// Strips leading whitespace, then runs `p`. Every atom parser below is
/// built this way so tokens may be separated by any amount of whitespace.
fn lexeme<'a, O>(
    mut p: impl Parser<&'a str, Output = O, Error = nom::error::Error<&'a str>>,
) -> impl FnMut(&'a str) -> RResult<'a, O> {
    move |input: &'a str| {
        let (input, _) = ws(input)?;
        p.parse(input)
    }
}

/// `"..."` with `\"` and `\\` escapes. Only those two escapes are unescaped
/// eagerly; `\n`/`\t` are left as the literal two-character sequence until
/// `Value::display` interprets them.
fn parse_string(input: &str) -> RResult<'_, SExpr> {
    let (input, _) = char('"')(input)?;
    if let Ok((rest, _)) = char::<_, nom::error::Error<&str>>('"')(input) {
        return Ok((rest, SExpr::String(String::new())));
    }
    let (input, content) = escaped(none_of("\"\\"), '\\', one_of("\"\\ntr")).parse(input)?;
    let (input, _) = char('"')(input)?;
    let unescaped = content.replace("\\\"", "\"").replace("\\\\", "\\");
    Ok((input, SExpr::String(unescaped)))
}

/// `-?[0-9]+`
fn parse_integer(input: &str) -> RResult<'_, SExpr> {
    let (input, text) = recognize((opt(char('-')), digit1)).parse(input)?;
    let n = text.parse::<BigInt>().map_err(|_| {
        nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Digit))
    })?;
    Ok((input, SExpr::Integer(n)))
}

/// `#t` / `#f`, case-insensitive.
fn parse_boolean(input: &str) -> RResult<'_, SExpr> {
    alt((
        map(tag_no_case("#t"), |_| SExpr::Boolean(true)),
        map(tag_no_case("#f"), |_| SExpr::Boolean(false)),
    ))
    .parse(input)
}

/// `#prim(NAME)` - an opaque reference to a named primitive, resolved
/// against the engine's primitive registry when converted onward.
fn parse_primitive_literal(input: &str) -> RResult<'_, SExpr> {
    let (input, _) = tag("#prim(")(input)?;
    let (input, name) = take_while1(|c: char| c != ')')(input)?;
    let (input, _) = char(')')(input)?;
    Ok((input, SExpr::Primitive(name.to_string())))
}

fn parse_nil(input: &str) -> RResult<'_, SExpr> {
    map(tag("#nil"), |_| SExpr::Nil).parse(input)
}

/// `#dict((k v)...)` literal.
fn parse_dict_literal(input: &str) -> RResult<'_, SExpr> {
    let (input, _) = tag("#dict")(input)?;
    let (input, _) = lexeme(char('('))(input)?;
    let (input, entries) = many0(lexeme(parse_dict_entry)).parse(input)?;
    let (input, _) = lexeme(char(')'))(input)?;
    Ok((input, SExpr::Dict(entries)))
}

fn parse_dict_entry(input: &str) -> RResult<'_, (SExpr, SExpr)> {
    let (input, _) = char('(')(input)?;
    let (input, key) = parse_sexpr(input)?;
    let (input, value) = lexeme(parse_sexpr).parse(input)?;
    let (input, _) = lexeme(char(')'))(input)?;
    Ok((input, (key, value)))
}

/// Any run of non-whitespace, non-paren, non-quote, non-comment, non-string
/// characters - the catch-all last alternative in the reader's priority
/// order.
fn parse_symbol(input: &str) -> RResult<'_, SExpr> {
    let (input, text) =
        take_while1(|c: char| !c.is_whitespace() && !"()'\";".contains(c))(input)?;
    Ok((input, SExpr::Symbol(text.to_string())))
}

/// `'X` reads as `(quote X)`.
fn parse_quoted(input: &str) -> RResult<'_, SExpr> {
    let (input, inner) = preceded(char('\''), parse_sexpr).parse(input)?;
    Ok((
        input,
        SExpr::list(vec![SExpr::Symbol("quote".to_string()), inner]),
    ))
}

fn parse_list(input: &str) -> RResult<'_, SExpr> {
    let (input, items) = delimited(
        char('('),
        many0(lexeme(parse_sexpr)),
        lexeme(char(')')),
    )
    .parse(input)?;
    Ok((input, SExpr::list(items)))
}

/// Recognized atoms, in priority order (first match wins): string,
/// signed integer, boolean, opaque primitive literal, `#nil`, dict
/// literal, then any other run of non-whitespace non-paren non-quote
/// characters as a symbol.
fn parse_sexpr(input: &str) -> RResult<'_, SExpr> {
    let (input, _) = ws(input)?;
    alt((
        parse_string,
        parse_integer,
        parse_boolean,
        parse_primitive_literal,
        parse_nil,
        parse_dict_literal,
        parse_quoted,
        parse_list,
        parse_symbol,
    ))
    .parse(input)
}

/// Reads one s-expression from `input`, returning it together with
/// whatever text remains unconsumed. Does not itself decide whether
/// trailing input is an error - callers in strict mode (the engine's
/// `read`) are responsible for rejecting a non-empty, non-whitespace
/// remainder.
pub fn read(input: &str) -> Result<(SExpr, &str), RagnarokError> {
    match parse_sexpr(input) {
        Ok((rest, sexpr)) => Ok((sexpr, rest)),
        Err(_) => {
            if input.trim_start().starts_with('"') {
                Err(RagnarokError::read_error(
                    "unterminated string literal",
                ))
            } else {
                Err(RagnarokError::read_error(format!(
                    "cannot read an expression from '{}'",
                    input
                )))
            }
        }
    }
}

//! nom-based parser for routing expressions.
//!
//! Precedence, lowest first: `||`, `&&`, comparisons (non-associative),
//! unary `!` / `-`, then literals, field names and parenthesized groups.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{alpha1, alphanumeric1, char, digit0, digit1, multispace0},
    combinator::{all_consuming, map, map_res, not, opt, recognize, value},
    error::ParseError,
    multi::many0,
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};

use super::{CompareOp, Expr, ExprError, LogicalOp, UnaryOp, Value};

/// Parse a complete expression. Trailing input is an error.
pub fn parse(expression: &str) -> Result<Expr, ExprError> {
    match all_consuming(ws(parse_or))(expression) {
        Ok((_, expr)) => Ok(expr),
        Err(nom::Err::Error(e) | nom::Err::Failure(e)) => Err(ExprError {
            expression: expression.to_string(),
            offset: expression.len() - e.input.len(),
            message: describe(e.input),
        }),
        Err(nom::Err::Incomplete(_)) => Err(ExprError {
            expression: expression.to_string(),
            offset: expression.len(),
            message: "unexpected end of expression".into(),
        }),
    }
}

fn describe(rest: &str) -> String {
    rest.chars().next().map_or_else(
        || "unexpected end of expression".to_string(),
        |c| format!("unexpected '{c}'"),
    )
}

fn ws<'a, F, O, E: ParseError<&'a str>>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O, E>
where
    F: FnMut(&'a str) -> IResult<&'a str, O, E>,
{
    delimited(multispace0, inner, multispace0)
}

fn parse_identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))(input)
}

fn parse_number(input: &str) -> IResult<&str, Value> {
    map_res(
        recognize(pair(digit1, opt(pair(char('.'), digit0)))),
        |s: &str| s.parse::<f64>().map(Value::Number),
    )(input)
}

fn parse_string(input: &str) -> IResult<&str, Value> {
    map(
        alt((
            delimited(char('\''), take_while(|c| c != '\''), char('\'')),
            delimited(char('"'), take_while(|c| c != '"'), char('"')),
        )),
        |s: &str| Value::Str(s.to_string()),
    )(input)
}

fn parse_word(input: &str) -> IResult<&str, Expr> {
    map(parse_identifier, |name| match name {
        "true" => Expr::Literal(Value::Bool(true)),
        "false" => Expr::Literal(Value::Bool(false)),
        field => Expr::Field(field.to_string()),
    })(input)
}

fn parse_primary(input: &str) -> IResult<&str, Expr> {
    ws(alt((
        map(parse_number, Expr::Literal),
        map(parse_string, Expr::Literal),
        parse_word,
        delimited(char('('), parse_or, char(')')),
    )))(input)
}

fn parse_unary(input: &str) -> IResult<&str, Expr> {
    alt((
        map(
            preceded(ws(pair(char('!'), not(char('=')))), parse_unary),
            |operand| Expr::Unary {
                op: UnaryOp::Not,
                operand: Box::new(operand),
            },
        ),
        map(preceded(ws(char('-')), parse_unary), |operand| Expr::Unary {
            op: UnaryOp::Neg,
            operand: Box::new(operand),
        }),
        parse_primary,
    ))(input)
}

fn parse_compare_op(input: &str) -> IResult<&str, CompareOp> {
    ws(alt((
        value(CompareOp::Eq, tag("==")),
        value(CompareOp::Ne, tag("!=")),
        value(CompareOp::Le, tag("<=")),
        value(CompareOp::Ge, tag(">=")),
        value(CompareOp::Lt, tag("<")),
        value(CompareOp::Gt, tag(">")),
    )))(input)
}

fn parse_comparison(input: &str) -> IResult<&str, Expr> {
    let (input, left) = parse_unary(input)?;
    let (input, rest) = opt(tuple((parse_compare_op, parse_unary)))(input)?;

    Ok((
        input,
        match rest {
            Some((op, right)) => Expr::Compare {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            None => left,
        },
    ))
}

fn parse_and(input: &str) -> IResult<&str, Expr> {
    let (input, left) = parse_comparison(input)?;
    let (input, rest) = many0(preceded(ws(tag("&&")), parse_comparison))(input)?;

    Ok((input, fold_logical(LogicalOp::And, left, rest)))
}

fn parse_or(input: &str) -> IResult<&str, Expr> {
    let (input, left) = parse_and(input)?;
    let (input, rest) = many0(preceded(ws(tag("||")), parse_and))(input)?;

    Ok((input, fold_logical(LogicalOp::Or, left, rest)))
}

fn fold_logical(op: LogicalOp, first: Expr, rest: Vec<Expr>) -> Expr {
    rest.into_iter().fold(first, |acc, right| Expr::Logical {
        op,
        left: Box::new(acc),
        right: Box::new(right),
    })
}

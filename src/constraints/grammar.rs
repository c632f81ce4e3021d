//! Textual constraint grammar
//!
//! A constraint can be written as a single line such as `"-3 <= Param1 <= 3"`,
//! `"ParamA <= ParamB"` or `"0.2 <= X/Y <= 0.8"`. The shapes overlap, so
//! [`interpret`] tries them in a fixed order and keeps the first one that
//! consumes the whole line:
//!
//! | # | shape                          | result                  |
//! |---|--------------------------------|-------------------------|
//! | 1 | `NUM <(=) NAME <(=) NUM`       | fixed, both sides       |
//! | 2 | `NAME <(=) NUM`                | fixed, maximum          |
//! | 3 | `NAME >(=) NUM`                | fixed, minimum          |
//! | 4 | `NUM <(=) NAME`                | fixed, minimum          |
//! | 5 | `NUM >(=) NAME`                | fixed, maximum          |
//! | 6 | `NAME <(=) NAME`               | ordering                |
//! | 7 | `NAME >(=) NAME`               | ordering, swapped       |
//! | 8 | `NAME/NAME <(=) NUM`           | ratio, maximum          |
//! | 9 | `NAME/NAME >(=) NUM`           | ratio, minimum          |
//! | 10| `NUM <(=) NAME/NAME <(=) NUM`  | ratio, both sides       |
//!
//! Numbers come before names wherever both could match, so `x <= 5` is a
//! bound and not an ordering against a parameter named `5`. Strict and
//! non-strict operators are treated alike. Whitespace around tokens is
//! ignored.
//!
//! A number is a decimal with optional sign, fraction and exponent, or a
//! simple `int/int` fraction. `inf` and `nan` are names, not numbers. A name
//! is one or more word characters or any of `# : * & ^ % $ ! @`.
//!
//! A standalone token made only of digits, signs, `.` and `e`/`E`, with at
//! least one digit, is always claimed as a number. If it does not parse, as
//! in `x <= 5e` or `1.2.3 <= x`, the whole line is rejected rather than read
//! as a parameter name. Tokens that run on into name characters (`2x`, `e5b`)
//! stay names.

use crate::constraints::error::ConstraintError;
use crate::constraints::{Constraint, FixedBound, OrderingBound, RatioBound};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char, digit1, multispace0},
    combinator::{all_consuming, map_res},
    error::{Error, ErrorKind},
    sequence::{delimited, separated_pair},
    IResult, Parser,
};

type Pattern = fn(&str) -> IResult<&str, Constraint>;

/// Grammar shapes in priority order
const PATTERNS: [Pattern; 10] = [
    two_sided_bound,
    name_below_number,
    name_above_number,
    number_below_name,
    number_above_name,
    name_below_name,
    name_above_name,
    ratio_below_number,
    ratio_above_number,
    two_sided_ratio,
];

/// Parse a single-line constraint expression
///
/// # Examples
///
/// ```
/// use choice_constraints::constraints::{interpret, Constraint, FixedBound};
///
/// let c = interpret("-3 <= Param1 <= 3").unwrap();
/// assert_eq!(c, Constraint::from(FixedBound::new("Param1", Some(-3.0), Some(3.0))));
///
/// assert!(interpret("Param1 == 3").is_err());
/// ```
pub fn interpret(text: &str) -> Result<Constraint, ConstraintError> {
    for pattern in PATTERNS {
        match all_consuming(pattern).parse(text) {
            Ok((_, constraint)) => return Ok(constraint),
            // A malformed number ends the search
            Err(nom::Err::Failure(_)) => break,
            Err(_) => continue,
        }
    }
    Err(ConstraintError::Parse {
        text: text.to_string(),
    })
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || "#:*&^%$!@".contains(c)
}

/// Parameter name with surrounding whitespace
fn name(input: &str) -> IResult<&str, &str> {
    delimited(multispace0, take_while1(is_name_char), multispace0).parse(input)
}

/// `int/int`
fn fraction(input: &str) -> IResult<&str, f64> {
    map_res(
        separated_pair(digit1, char('/'), digit1),
        |(num, den): (&str, &str)| -> Result<f64, std::num::ParseFloatError> {
            Ok(num.parse::<f64>()? / den.parse::<f64>()?)
        },
    )
    .parse(input)
}

fn is_number_char(c: char) -> bool {
    c.is_ascii_digit() || "+-.eE".contains(c)
}

fn decimal(input: &str) -> IResult<&str, f64> {
    let (rest, token) = take_while1(is_number_char).parse(input)?;
    if rest.starts_with(is_name_char) || !token.contains(|c: char| c.is_ascii_digit()) {
        return Err(nom::Err::Error(Error::new(input, ErrorKind::Float)));
    }
    match token.parse::<f64>() {
        Ok(value) => Ok((rest, value)),
        Err(_) => Err(nom::Err::Failure(Error::new(input, ErrorKind::Float))),
    }
}

/// Numeric literal with surrounding whitespace
fn number(input: &str) -> IResult<&str, f64> {
    delimited(multispace0, alt((fraction, decimal)), multispace0).parse(input)
}

fn less(input: &str) -> IResult<&str, &str> {
    alt((tag("<="), tag("<"))).parse(input)
}

fn greater(input: &str) -> IResult<&str, &str> {
    alt((tag(">="), tag(">"))).parse(input)
}

/// `NAME/NAME`
fn ratio(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(name, char('/'), name).parse(input)
}

fn two_sided_bound(input: &str) -> IResult<&str, Constraint> {
    let (input, (minimum, _, p, _, maximum)) = (number, less, name, less, number).parse(input)?;
    Ok((input, FixedBound::new(p, Some(minimum), Some(maximum)).into()))
}

fn name_below_number(input: &str) -> IResult<&str, Constraint> {
    let (input, (p, _, maximum)) = (name, less, number).parse(input)?;
    Ok((input, FixedBound::new(p, None, Some(maximum)).into()))
}

fn name_above_number(input: &str) -> IResult<&str, Constraint> {
    let (input, (p, _, minimum)) = (name, greater, number).parse(input)?;
    Ok((input, FixedBound::new(p, Some(minimum), None).into()))
}

fn number_below_name(input: &str) -> IResult<&str, Constraint> {
    let (input, (minimum, _, p)) = (number, less, name).parse(input)?;
    Ok((input, FixedBound::new(p, Some(minimum), None).into()))
}

fn number_above_name(input: &str) -> IResult<&str, Constraint> {
    let (input, (maximum, _, p)) = (number, greater, name).parse(input)?;
    Ok((input, FixedBound::new(p, None, Some(maximum)).into()))
}

fn name_below_name(input: &str) -> IResult<&str, Constraint> {
    let (input, (p_less, _, p_more)) = (name, less, name).parse(input)?;
    Ok((input, OrderingBound::new(p_less, p_more).into()))
}

fn name_above_name(input: &str) -> IResult<&str, Constraint> {
    let (input, (p_more, _, p_less)) = (name, greater, name).parse(input)?;
    Ok((input, OrderingBound::new(p_less, p_more).into()))
}

fn ratio_below_number(input: &str) -> IResult<&str, Constraint> {
    let (input, ((p_num, p_den), _, max_ratio)) = (ratio, less, number).parse(input)?;
    Ok((input, RatioBound::new(p_num, p_den, None, Some(max_ratio)).into()))
}

fn ratio_above_number(input: &str) -> IResult<&str, Constraint> {
    let (input, ((p_num, p_den), _, min_ratio)) = (ratio, greater, number).parse(input)?;
    Ok((input, RatioBound::new(p_num, p_den, Some(min_ratio), None).into()))
}

fn two_sided_ratio(input: &str) -> IResult<&str, Constraint> {
    let (input, (min_ratio, _, (p_num, p_den), _, max_ratio)) =
        (number, less, ratio, less, number).parse(input)?;
    Ok((
        input,
        RatioBound::new(p_num, p_den, Some(min_ratio), Some(max_ratio)).into(),
    ))
}

//! Reusable parsers for the `version-constraints` library.

use nom::bytes::complete::take_while1;
use nom::character::complete::{char, digit1};
use nom::combinator::{map_res, recognize};
use nom::multi::separated_list1;
use nom::{IResult, Parser};
use num_bigint::BigUint;

/// Parse an unsigned integer of any size.
pub fn unsigned(i: &str) -> IResult<&str, BigUint> {
    map_res(digit1, |s: &str| s.parse::<BigUint>()).parse(i)
}

/// A run of ASCII alphanumerics and hyphens, as allowed in a single
/// prerelease identifier.
pub fn hyphenated_alphanums(i: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '-').parse(i)
}

/// Build metadata, including its leading `+`. Only the text after the `+` is
/// yielded.
pub fn meta(i: &str) -> IResult<&str, String> {
    let (i, _) = char('+').parse(i)?;
    let (i, m) = recognize(separated_list1(
        char('.'),
        take_while1(|c: char| c.is_ascii_alphanumeric() || c == '-' || c == '~'),
    ))
    .parse(i)?;

    Ok((i, m.to_string()))
}

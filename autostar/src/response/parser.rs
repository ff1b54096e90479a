use core::str::{from_utf8, FromStr};

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1, take_while_m_n},
    character::complete::{char, space0},
    combinator::{all_consuming, map, map_res, opt, recognize, verify},
    sequence::{pair, preceded, tuple},
    IResult,
};
use thiserror::Error;

use super::{CalendarDate, Sexagesimal, SubMinute};

/// Fixed count of ASCII digits parsed as a number
fn digits<'a, T: FromStr>(
    min: usize,
    max: usize,
) -> impl FnMut(&'a [u8]) -> IResult<&'a [u8], T> {
    map_res(
        take_while_m_n(min, max, |b: u8| b.is_ascii_digit()),
        |d: &[u8]| from_utf8(d).map_err(|_| ()).and_then(|s| s.parse().map_err(|_| ())),
    )
}

/// Two digit minutes or seconds, 00 to 59
fn sixtieths(input: &[u8]) -> IResult<&[u8], u8> {
    verify(digits::<u8>(2, 2), |v: &u8| *v < 60)(input)
}

/// `true` for a leading minus
fn sign(input: &[u8]) -> IResult<&[u8], bool> {
    map(opt(alt((char('+'), char('-')))), |s| s == Some('-'))(input)
}

/// Separator after degrees, the mount usually sends 0xDF rather than `*`
fn degree_separator(input: &[u8]) -> IResult<&[u8], &[u8]> {
    alt((tag("*"), tag(&[0xDFu8][..]), tag(":")))(input)
}

fn unit(input: &[u8]) -> IResult<&[u8], &[u8]> {
    alt((tag("*"), tag(&[0xDFu8][..]), tag("'")))(input)
}

/// `sDD*MM`, `sDD*MM'SS`, `sDD*MM:SS` or the three digit `DDD*MM` forms
pub fn angle(input: &[u8]) -> IResult<&[u8], Sexagesimal> {
    let (input, (negative, whole, _, minutes, seconds)) = tuple((
        sign,
        digits(1, 3),
        degree_separator,
        sixtieths,
        opt(preceded(alt((char(':'), char('\''))), sixtieths)),
    ))(input)?;
    let fraction = seconds.map_or(SubMinute::None, SubMinute::Seconds);
    Ok((input, Sexagesimal::new(negative, whole, minutes, fraction)))
}

/// `HH:MM:SS` or the low precision `HH:MM.T`, told apart by the separator after minutes
pub fn time(input: &[u8]) -> IResult<&[u8], Sexagesimal> {
    let (input, (hours, _, minutes, fraction)) = tuple((
        digits(2, 2),
        char(':'),
        sixtieths,
        opt(alt((
            map(preceded(char(':'), sixtieths), SubMinute::Seconds),
            map(preceded(char('.'), digits(1, 1)), SubMinute::Tenths),
        ))),
    ))(input)?;
    Ok((
        input,
        Sexagesimal::new(false, hours, minutes, fraction.unwrap_or(SubMinute::None)),
    ))
}

/// `MM/DD/YY`
pub fn date(input: &[u8]) -> IResult<&[u8], CalendarDate> {
    let (input, (month, _, day, _, year)) = tuple((
        digits(2, 2),
        char('/'),
        digits(2, 2),
        char('/'),
        digits(2, 2),
    ))(input)?;
    Ok((input, CalendarDate { month, day, year }))
}

/// Signed integer, optionally followed by a unit mark (`DD*`, `NNN'`)
pub fn integer(input: &[u8]) -> IResult<&[u8], i32> {
    let (input, (_, negative, magnitude, _)) =
        tuple((space0, sign, digits::<i32>(1, 9), opt(unit)))(input)?;
    Ok((input, if negative { -magnitude } else { magnitude }))
}

/// Signed fixed point number (`sMM.M`, `TT.T`, `sdd.ddd`, `sHH`)
pub fn decimal(input: &[u8]) -> IResult<&[u8], f64> {
    let number = recognize(tuple((
        opt(alt((char('+'), char('-')))),
        take_while1(|b: u8| b.is_ascii_digit()),
        opt(pair(char('.'), take_while1(|b: u8| b.is_ascii_digit()))),
    )));
    map_res(preceded(space0, number), |n: &[u8]| {
        from_utf8(n)
            .map_err(|_| ())
            .and_then(|s| s.parse::<f64>().map_err(|_| ()))
    })(input)
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Could not parse {0:?}")]
pub struct ParseValueError(pub String);

impl FromStr for Sexagesimal {
    type Err = ParseValueError;

    /// Accepts the wire forms, `05:35:17`, `05:35.3`, `-05*07`, `+45*30:15`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        all_consuming(alt((time, angle)))(s.as_bytes())
            .map(|(_, v)| v)
            .map_err(|_| ParseValueError(s.to_string()))
    }
}

impl FromStr for CalendarDate {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        all_consuming(date)(s.as_bytes())
            .map(|(_, v)| v)
            .map_err(|_| ParseValueError(s.to_string()))
    }
}

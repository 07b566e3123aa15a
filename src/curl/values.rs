//! Grammars for option arguments that curl reads as numbers.

use nom::{
    IResult,
    branch::alt,
    character::complete::{char, digit0, digit1, one_of, space0},
    combinator::{all_consuming, map, map_res, opt, recognize},
    error::context,
    sequence::{pair, preceded, terminated, tuple},
};

/// `1`, `2.5`, `.5`, `+3`: curl's `str2udouble` without the trailing garbage.
fn decimal(input: &str) -> IResult<&str, f64> {
    context(
        "decimal",
        map_res(
            recognize(tuple((
                opt(one_of("+-")),
                alt((
                    recognize(pair(digit1, opt(pair(char('.'), digit0)))),
                    recognize(pair(char('.'), digit1)),
                )),
            ))),
            str::parse::<f64>,
        ),
    )(input)
}

fn integer(input: &str) -> IResult<&str, i64> {
    context(
        "integer",
        map_res(
            recognize(pair(opt(one_of("+-")), digit1)),
            str::parse::<i64>,
        ),
    )(input)
}

fn size_unit(input: &str) -> IResult<&str, u64> {
    context(
        "size unit",
        map(opt(one_of("kKmMgGtTbB")), |unit| match unit {
            Some('k' | 'K') => 1 << 10,
            Some('m' | 'M') => 1 << 20,
            Some('g' | 'G') => 1 << 30,
            Some('t' | 'T') => 1 << 40,
            _ => 1,
        }),
    )(input)
}

fn size(input: &str) -> IResult<&str, u64> {
    context(
        "size",
        map_res(
            pair(terminated(digit1, space0), size_unit),
            |(digits, unit): (&str, u64)| {
                digits
                    .parse::<u64>()
                    .map(|n| n.saturating_mul(unit))
            },
        ),
    )(input)
}

fn port_range(input: &str) -> IResult<&str, (u16, Option<u16>)> {
    context(
        "port range",
        pair(
            map_res(digit1, str::parse::<u16>),
            opt(preceded(char('-'), map_res(digit1, str::parse::<u16>))),
        ),
    )(input)
}

fn whole<'a, O>(
    parser: impl FnMut(&'a str) -> IResult<&'a str, O>,
    input: &'a str,
) -> Option<O> {
    all_consuming(preceded(space0, terminated(parser, space0)))(input)
        .ok()
        .map(|(_, out)| out)
}

/// Seconds for `--max-time`, `--connect-timeout` and friends.
pub fn parse_seconds(input: &str) -> Option<f64> {
    whole(decimal, input).filter(|secs| *secs >= 0.0)
}

pub fn parse_integer(input: &str) -> Option<i64> {
    whole(integer, input)
}

/// Byte counts with an optional `K`, `M`, `G` or `T` suffix.
pub fn parse_size(input: &str) -> Option<u64> {
    whole(size, input)
}

/// `--local-port N` or `--local-port N-M`.
pub fn parse_port_range(input: &str) -> Option<(u16, Option<u16>)> {
    whole(port_range, input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case("5", Some(5.0))]
    #[case(" 2.5 ", Some(2.5))]
    #[case(".5", Some(0.5))]
    #[case("3.", Some(3.0))]
    #[case("-1", None)]
    #[case("abc", None)]
    #[case("1.5s", None)]
    #[case("", None)]
    fn test_parse_seconds(#[case] input: &str, #[case] expected: Option<f64>) {
        assert_eq!(parse_seconds(input), expected);
    }

    #[rstest]
    #[case("42", Some(42))]
    #[case(" +7", Some(7))]
    #[case("-3", Some(-3))]
    #[case("4.2", None)]
    fn test_parse_integer(#[case] input: &str, #[case] expected: Option<i64>) {
        assert_eq!(parse_integer(input), expected);
    }

    #[rstest]
    #[case("100", Some(100))]
    #[case("100K", Some(102_400))]
    #[case("2m", Some(2 * 1024 * 1024))]
    #[case("1G", Some(1 << 30))]
    #[case("1 T", Some(1 << 40))]
    #[case("10X", None)]
    fn test_parse_size(#[case] input: &str, #[case] expected: Option<u64>) {
        assert_eq!(parse_size(input), expected);
    }

    #[rstest]
    #[case("8000", Some((8000, None)))]
    #[case("8000-8010", Some((8000, Some(8010))))]
    #[case("70000", None)]
    #[case("80-", None)]
    fn test_parse_port_range(#[case] input: &str, #[case] expected: Option<(u16, Option<u16>)>) {
        assert_eq!(parse_port_range(input), expected);
    }
}

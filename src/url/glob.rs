//! curl's URL globbing: `{a,b}` sets and `[1-9]`, `[a-z]`, `[1-10:2]` ranges.

use winnow::{
    ModalResult, Parser,
    ascii::digit1,
    combinator::{alt, cut_err, delimited, opt, preceded, repeat, separated},
    error::{StrContext, StrContextValue},
    token::{any, one_of, take_till, take_while},
};

use crate::{
    error::{CurlError, Result},
    value::{ArgValue, Segment},
};

/// curl refuses globs that expand to more URLs than this.
pub const MAX_URLS: usize = 10_000;

#[derive(Debug, Clone, PartialEq)]
enum Part {
    Text(String),
    Choice(Vec<String>),
}

fn escaped(s: &mut &str) -> ModalResult<Part> {
    preceded('\\', one_of(['[', ']', '{', '}']))
        .map(|c: char| Part::Text(c.to_string()))
        .parse_next(s)
}

fn text(s: &mut &str) -> ModalResult<Part> {
    alt((
        take_till(1.., ['\\', '{', '[']),
        "\\",
    ))
    .map(|t: &str| Part::Text(t.to_string()))
    .parse_next(s)
}

/// `[::1]` and friends are IPv6 hosts, not ranges.
fn ipv6(s: &mut &str) -> ModalResult<Part> {
    delimited(
        '[',
        take_while(2.., |c: char| c.is_ascii_alphanumeric() || ":.%".contains(c))
            .verify(|addr: &str| addr.matches(':').count() >= 2),
        ']',
    )
    .map(|addr: &str| Part::Text(format!("[{addr}]")))
    .parse_next(s)
}

fn set(s: &mut &str) -> ModalResult<Part> {
    preceded(
        '{',
        cut_err(
            (
                separated(1.., take_till(0.., [',', '}', '{']).map(str::to_string), ','),
                '}',
            )
                .map(|(items, _)| Part::Choice(items))
                .context(StrContext::Label("set"))
                .context(StrContext::Expected(StrContextValue::CharLiteral('}'))),
        ),
    )
    .parse_next(s)
}

fn step(s: &mut &str) -> ModalResult<usize> {
    preceded(':', digit1.try_map(str::parse::<usize>))
        .verify(|n: &usize| *n > 0)
        .parse_next(s)
}

#[derive(Debug)]
enum Range {
    Alpha(char, char, usize),
    Numeric(String, String, usize),
}

fn alpha_range(s: &mut &str) -> ModalResult<Range> {
    (any, '-', any, opt(step))
        .verify(|(lo, _, hi, _): &(char, char, char, Option<usize>)| {
            (lo.is_ascii_lowercase() && hi.is_ascii_lowercase()
                || lo.is_ascii_uppercase() && hi.is_ascii_uppercase())
                && lo <= hi
        })
        .map(|(lo, _, hi, step)| Range::Alpha(lo, hi, step.unwrap_or(1)))
        .parse_next(s)
}

fn numeric_range(s: &mut &str) -> ModalResult<Range> {
    (digit1, '-', digit1, opt(step))
        .map(|(lo, _, hi, step): (&str, char, &str, Option<usize>)| {
            Range::Numeric(lo.to_string(), hi.to_string(), step.unwrap_or(1))
        })
        .parse_next(s)
}

fn range(s: &mut &str) -> ModalResult<Range> {
    preceded(
        '[',
        cut_err(
            (alt((numeric_range, alpha_range)), ']')
                .map(|(range, _)| range)
                .context(StrContext::Label("range")),
        ),
    )
    .parse_next(s)
}

fn expand_range(range: Range) -> std::result::Result<Part, String> {
    match range {
        Range::Alpha(lo, hi, step) => Ok(Part::Choice(
            (lo..=hi).step_by(step).map(|c| c.to_string()).collect(),
        )),
        Range::Numeric(lo, hi, step) => {
            let (Ok(start), Ok(end)) = (lo.parse::<u64>(), hi.parse::<u64>()) else {
                return Err(format!("range [{lo}-{hi}] is too large"));
            };
            if start > end {
                return Err(format!("range [{lo}-{hi}] goes backwards"));
            }
            if (end - start) / step as u64 >= MAX_URLS as u64 {
                return Err(format!("range [{lo}-{hi}] expands to more than {MAX_URLS} URLs"));
            }
            // `[01-10]` pads to the width of the lower bound
            let width = if lo.len() > 1 && lo.starts_with('0') { lo.len() } else { 0 };
            Ok(Part::Choice(
                (start..=end)
                    .step_by(step)
                    .map(|n| format!("{n:0width$}"))
                    .collect(),
            ))
        }
    }
}

fn pattern(s: &mut &str) -> ModalResult<Vec<std::result::Result<Part, String>>> {
    repeat(
        0..,
        alt((
            escaped.map(Ok),
            ipv6.map(Ok),
            set.map(Ok),
            range.map(expand_range),
            text.map(Ok),
        )),
    )
    .parse_next(s)
}

fn parse_pattern(url: &ArgValue, literal: &str) -> Result<Vec<Part>> {
    let malformed = |reason: String| CurlError::MalformedUrl {
        url: url.to_string(),
        reason,
    };
    let parts = pattern
        .parse(literal)
        .map_err(|e| malformed(format!("bad glob pattern at position {}: {}", e.offset(), e.inner())))?;
    parts.into_iter().map(|p| p.map_err(&malformed)).collect()
}

/// Expands `url` into every URL its glob pattern names, in curl's order.
///
/// Only literal segments are globbed; a dynamic segment is copied into every URL.
pub fn expand(url: &ArgValue) -> Result<Vec<ArgValue>> {
    let mut urls = vec![ArgValue::new()];
    for segment in url.segments() {
        let parts = match segment {
            Segment::Literal(literal) => parse_pattern(url, literal)?,
            dynamic => {
                for u in &mut urls {
                    u.push_segment(dynamic.clone());
                }
                continue;
            }
        };
        for part in parts {
            match part {
                Part::Text(t) => {
                    for u in &mut urls {
                        u.push_str(&t);
                    }
                }
                Part::Choice(items) => {
                    if urls.len() * items.len() > MAX_URLS {
                        return Err(CurlError::MalformedUrl {
                            url: url.to_string(),
                            reason: format!("expands to more than {MAX_URLS} URLs"),
                        });
                    }
                    urls = urls
                        .iter()
                        .flat_map(|u| items.iter().map(move |item| {
                            let mut next = u.clone();
                            next.push_str(item);
                            next
                        }))
                        .collect();
                }
            }
        }
    }
    if urls.len() > 1 {
        tracing::debug!(url = %url, count = urls.len(), "expanded URL glob");
    }
    Ok(urls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    fn urls(pattern: &str) -> Vec<String> {
        expand(&ArgValue::from(pattern))
            .unwrap()
            .iter()
            .map(|u| u.to_string())
            .collect()
    }

    #[rstest]
    #[case("http://a.com/", vec!["http://a.com/"])]
    #[case("a.com/{x,y}", vec!["a.com/x", "a.com/y"])]
    #[case("a.com/[1-3]", vec!["a.com/1", "a.com/2", "a.com/3"])]
    #[case("a.com/[08-10]", vec!["a.com/08", "a.com/09", "a.com/10"])]
    #[case("a.com/[1-10:4]", vec!["a.com/1", "a.com/5", "a.com/9"])]
    #[case("a.com/[a-c]", vec!["a.com/a", "a.com/b", "a.com/c"])]
    #[case("a.com/[A-E:2]", vec!["a.com/A", "a.com/C", "a.com/E"])]
    #[case("{a,b}.com/[1-2]", vec!["a.com/1", "a.com/2", "b.com/1", "b.com/2"])]
    #[case("http://[::1]:8080/", vec!["http://[::1]:8080/"])]
    #[case("http://[fe80::1%25eth0]/", vec!["http://[fe80::1%25eth0]/"])]
    #[case("a.com/\\{x\\}", vec!["a.com/{x}"])]
    #[case("a.com/c:\\path", vec!["a.com/c:\\path"])]
    #[case("a.com/{,x}", vec!["a.com/", "a.com/x"])]
    fn test_expand(#[case] pattern: &str, #[case] expected: Vec<&str>) {
        assert_eq!(urls(pattern), expected);
    }

    #[rstest]
    #[case("a.com/{x,y")]
    #[case("a.com/[1-")]
    #[case("a.com/[9-1]")]
    #[case("a.com/[a-Z]")]
    #[case("a.com/[1-5:0]")]
    #[case("a.com/[1-100000]")]
    #[case("a.com/[1-200]/[1-200]")]
    #[case("a.com/[0-18446744073709551615]")]
    #[case("a.com/[0-18446744073709551616]")]
    fn test_malformed(#[case] pattern: &str) {
        assert!(matches!(
            expand(&ArgValue::from(pattern)),
            Err(CurlError::MalformedUrl { .. })
        ));
    }

    #[test]
    fn test_dynamic_segments_are_copied() {
        let url = ArgValue::from_segments([
            Segment::EnvVar("HOST".into()),
            Segment::Literal("/item/[1-2]".into()),
        ]);
        let expanded = expand(&url).unwrap();
        assert_eq!(expanded.len(), 2);
        assert_eq!(expanded[1].to_string(), "$HOST/item/2");
    }
}

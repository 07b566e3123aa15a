//! Query strings and `application/x-www-form-urlencoded` bodies.
//!
//! A query is kept as a flat list of decoded pairs. When every component decodes and
//! re-encodes to exactly the text the user wrote, the query "round-trips" and code
//! generators may use the list (or the grouped dictionary) instead of the raw string.

use std::collections::HashSet;

use indexmap::IndexMap;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use serde::Serialize;
use winnow::{
    ModalResult, Parser,
    combinator::{alt, delimited, repeat},
    token::{take_till, take_while},
};

use crate::value::{ArgValue, Segment};

/// Everything except `A-Za-z0-9-._~` is escaped.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// How a query spells the characters that have two accepted encodings. `None`
/// means the query never contains one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Spelling {
    plus_spaces: Option<bool>,
    raw_brackets: Option<bool>,
}

impl Spelling {
    fn encode(&self, value: &ArgValue, key: bool) -> ArgValue {
        let mut out = if self.plus_spaces == Some(true) {
            encode_component(value)
        } else {
            percent_encode(value)
        };
        if key && self.raw_brackets == Some(true) {
            out = out.replace("%5B", "[").replace("%5D", "]");
        }
        out
    }

    /// How `raw` spells `decoded`, if it is one of the accepted encodings.
    fn of(raw: &ArgValue, decoded: &ArgValue, key: bool) -> Option<Spelling> {
        let has_space = decoded.contains(" ");
        let has_bracket = key && (decoded.contains("[") || decoded.contains("]"));
        for plus in [false, true] {
            for brackets in [false, true] {
                let spelling = Spelling {
                    plus_spaces: has_space.then_some(plus),
                    raw_brackets: has_bracket.then_some(brackets),
                };
                if spelling.encode(decoded, key) == *raw {
                    return Some(spelling);
                }
            }
        }
        None
    }

    fn merge(self, other: Spelling) -> Option<Spelling> {
        fn pick(a: Option<bool>, b: Option<bool>) -> Option<Option<bool>> {
            match (a, b) {
                (Some(a), Some(b)) if a != b => None,
                _ => Some(a.or(b)),
            }
        }
        Some(Spelling {
            plus_spaces: pick(self.plus_spaces, other.plus_spaces)?,
            raw_brackets: pick(self.raw_brackets, other.raw_brackets)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryValue {
    One(ArgValue),
    Many(Vec<ArgValue>),
    /// From bracketed keys such as `user[name]=x`.
    Nested(IndexMap<String, QueryValue>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Query {
    /// Decoded `(key, value)` pairs in source order.
    pub list: Vec<(ArgValue, ArgValue)>,
    pub dict: Option<IndexMap<String, QueryValue>>,
    /// `to_query_string` reproduces the source text exactly.
    pub round_trips: bool,
    #[serde(skip)]
    spelling: Spelling,
}

impl Query {
    /// Rebuilds the query string from `list`. `None` when it would not match the
    /// original text.
    pub fn to_query_string(&self) -> Option<ArgValue> {
        if !self.round_trips {
            return None;
        }
        let pairs: Vec<ArgValue> = self
            .list
            .iter()
            .map(|(k, v)| {
                let mut pair = self.spelling.encode(k, true);
                pair.push_char('=');
                pair.append(&self.spelling.encode(v, false));
                pair
            })
            .collect();
        Some(ArgValue::join(&pairs, "&"))
    }
}

fn map_literals(value: &ArgValue, f: impl Fn(&str) -> String) -> ArgValue {
    ArgValue::from_segments(value.segments().iter().map(|s| match s {
        Segment::Literal(text) => Segment::Literal(f(text)),
        other => other.clone(),
    }))
}

/// Percent-encodes the literal parts of `value`, spaces as `%20`.
pub fn percent_encode(value: &ArgValue) -> ArgValue {
    map_literals(value, |text| utf8_percent_encode(text, COMPONENT).to_string())
}

/// Like [`percent_encode`] but with spaces as `+`. This is what
/// `--data-urlencode` sends.
pub fn encode_component(value: &ArgValue) -> ArgValue {
    map_literals(value, |text| {
        utf8_percent_encode(text, COMPONENT)
            .to_string()
            .replace("%20", "+")
    })
}

fn well_formed(s: &mut &str) -> ModalResult<()> {
    repeat(
        0..,
        alt((
            ('%', take_while(2, |c: char| c.is_ascii_hexdigit())).void(),
            take_till(1.., '%').void(),
        )),
    )
    .parse_next(s)
}

fn decode_text(text: &str) -> Option<String> {
    well_formed.parse(text).ok()?;
    percent_decode_str(&text.replace('+', " "))
        .decode_utf8()
        .ok()
        .map(|s| s.into_owned())
}

/// Decodes `+` and `%XX` in the literal parts of `value`.
pub fn decode_component(value: &ArgValue) -> Option<ArgValue> {
    let mut out = ArgValue::new();
    for segment in value.segments() {
        match segment {
            Segment::Literal(text) => out.push_str(&decode_text(text)?),
            other => out.push_segment(other.clone()),
        }
    }
    Some(out)
}

/// Parses a query string or urlencoded body.
///
/// Returns `None` for an empty query, and for queries that cannot be expressed as
/// pairs at all: a parameter without `=` or a broken `%` escape.
pub fn parse_query(value: &ArgValue) -> Option<Query> {
    if value.is_empty() {
        return None;
    }

    let mut list = Vec::new();
    let mut round_trips = true;
    let mut spelling = Spelling::default();
    for param in value.split("&") {
        let (key, val) = param.split_once("=")?;
        let decoded_key = decode_component(&key)?;
        let decoded_val = decode_component(&val)?;
        if round_trips {
            let merged = Spelling::of(&key, &decoded_key, true)
                .and_then(|s| spelling.merge(s))
                .and_then(|s| Spelling::of(&val, &decoded_val, false).and_then(|v| s.merge(v)));
            match merged {
                Some(merged) => spelling = merged,
                None => round_trips = false,
            }
        }
        list.push((decoded_key, decoded_val));
    }

    let dict = if round_trips { group(&list) } else { None };
    tracing::debug!(pairs = list.len(), round_trips, "parsed query");
    Some(Query {
        list,
        dict,
        round_trips,
        spelling,
    })
}

fn bracket_path<'s>(s: &mut &'s str) -> ModalResult<(&'s str, Vec<&'s str>)> {
    (
        take_till(1.., '['),
        repeat(1.., delimited('[', take_till(0.., ['[', ']']), ']')),
    )
        .parse_next(s)
}

fn insert_nested(
    map: &mut IndexMap<String, QueryValue>,
    base: &str,
    path: &[&str],
    value: &ArgValue,
) -> Option<()> {
    match path.split_first() {
        None => {
            if map.contains_key(base) {
                return None;
            }
            map.insert(base.to_string(), QueryValue::One(value.clone()));
        }
        Some((&"", rest)) => {
            if !rest.is_empty() {
                return None;
            }
            match map
                .entry(base.to_string())
                .or_insert_with(|| QueryValue::Many(Vec::new()))
            {
                QueryValue::Many(values) => values.push(value.clone()),
                _ => return None,
            }
        }
        Some((name, rest)) => match map
            .entry(base.to_string())
            .or_insert_with(|| QueryValue::Nested(IndexMap::new()))
        {
            QueryValue::Nested(inner) => insert_nested(inner, name, rest, value)?,
            _ => return None,
        },
    }
    Some(())
}

/// Groups repeated keys. Plain keys may only repeat back to back; bracketed keys
/// build nested values.
fn group(list: &[(ArgValue, ArgValue)]) -> Option<IndexMap<String, QueryValue>> {
    let mut dict: IndexMap<String, QueryValue> = IndexMap::new();
    let mut plain: HashSet<&str> = HashSet::new();
    let mut prev: Option<&str> = None;
    for (key, value) in list {
        let key = key.as_literal()?;
        if let Ok((base, path)) = bracket_path.parse(key) {
            if plain.contains(base) {
                return None;
            }
            insert_nested(&mut dict, base, &path, value)?;
        } else if prev == Some(key) {
            let entry = dict.get_mut(key)?;
            match entry {
                QueryValue::One(first) => {
                    *entry = QueryValue::Many(vec![first.clone(), value.clone()]);
                }
                QueryValue::Many(values) => values.push(value.clone()),
                QueryValue::Nested(_) => return None,
            }
        } else if dict.contains_key(key) {
            return None;
        } else {
            plain.insert(key);
            dict.insert(key.to_string(), QueryValue::One(value.clone()));
        }
        prev = Some(key);
    }
    Some(dict)
}

/// Splits a `Cookie` header value into `(name, value)` pairs. `None` when a name
/// repeats.
pub fn parse_cookies(value: &ArgValue) -> Option<Vec<(ArgValue, ArgValue)>> {
    let mut cookies: Vec<(ArgValue, ArgValue)> = Vec::new();
    for cookie in value.split(";") {
        let cookie = cookie.trim();
        if cookie.is_empty() {
            continue;
        }
        let (name, value) = cookie
            .split_once("=")
            .unwrap_or_else(|| (cookie.clone(), ArgValue::new()));
        let name = name.trim();
        if cookies.iter().any(|(n, _)| *n == name) {
            return None;
        }
        cookies.push((name, value.trim()));
    }
    Some(cookies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    fn query(s: &str) -> Query {
        parse_query(&ArgValue::from(s)).unwrap()
    }

    fn one(s: &str) -> QueryValue {
        QueryValue::One(ArgValue::from(s))
    }

    fn many(values: &[&str]) -> QueryValue {
        QueryValue::Many(values.iter().map(|v| ArgValue::from(*v)).collect())
    }

    #[rstest]
    #[case("a=1&b=2")]
    #[case("q=hello+world&lang=en")]
    #[case("q=hello%20world")]
    #[case("empty=&x=%2B")]
    #[case("k%C3%A9y=caf%C3%A9")]
    #[case("a=1&a=2&b=3")]
    #[case("tags[]=a&tags[]=b")]
    #[case("tags%5B%5D=a")]
    fn test_round_trip(#[case] s: &str) {
        let q = query(s);
        assert!(q.round_trips);
        assert_eq!(q.to_query_string().unwrap().as_literal(), Some(s));
    }

    #[rstest]
    #[case("a=%41")]
    #[case("a=hello+world&b=x%20y")]
    #[case("a=b+c%20d")]
    #[case("a=%2f")]
    #[case("a[]=1&b%5B%5D=2")]
    fn test_lossy(#[case] s: &str) {
        let q = query(s);
        assert!(!q.round_trips);
        assert!(q.dict.is_none());
        assert!(q.to_query_string().is_none());
    }

    #[rstest]
    #[case("")]
    #[case("flag")]
    #[case("a=1&flag")]
    #[case("a=%zz")]
    #[case("a=%ff")]
    fn test_unparseable(#[case] s: &str) {
        assert!(parse_query(&ArgValue::from(s)).is_none());
    }

    #[test]
    fn test_decoding() {
        let q = query("name=J%C3%BCrgen+M&x=a%26b");
        assert_eq!(
            q.list,
            vec![
                (ArgValue::from("name"), ArgValue::from("Jürgen M")),
                (ArgValue::from("x"), ArgValue::from("a&b")),
            ]
        );
    }

    #[test]
    fn test_dict_grouping() {
        let dict = query("a=1&a=2&b=3").dict.unwrap();
        assert_eq!(dict["a"], many(&["1", "2"]));
        assert_eq!(dict["b"], one("3"));

        // a repeat with another key in between cannot be a dict
        assert!(query("a=1&b=2&a=3").dict.is_none());
    }

    #[test]
    fn test_bracket_keys() {
        let dict = query("tags[]=a&x=1&tags[]=b").dict.unwrap();
        assert_eq!(dict["tags"], many(&["a", "b"]));

        let dict = query("user[name]=bo&user[roles][]=admin&user[roles][]=dev").dict.unwrap();
        let QueryValue::Nested(user) = &dict["user"] else {
            panic!("expected nested value, got {:?}", dict["user"]);
        };
        assert_eq!(user["name"], one("bo"));
        assert_eq!(user["roles"], many(&["admin", "dev"]));

        assert!(query("a=1&a[]=2").dict.is_none());
        assert!(query("a[x]=1&a[]=2").dict.is_none());
        assert!(query("a[][x]=1").dict.is_none());
        assert!(query("a[x]=1&a[x]=2").dict.is_none());
    }

    #[test]
    fn test_dynamic_values() {
        let value = ArgValue::from_segments([
            Segment::Literal("token=".into()),
            Segment::EnvVar("TOKEN".into()),
            Segment::Literal("&page=2".into()),
        ]);
        let q = parse_query(&value).unwrap();
        assert!(q.round_trips);
        assert_eq!(q.list[0].1, ArgValue::env("TOKEN"));
        assert!(q.dict.is_some());

        let key = ArgValue::from_segments([Segment::EnvVar("KEY".into()), Segment::Literal("=1".into())]);
        assert!(parse_query(&key).unwrap().dict.is_none());
    }

    #[rstest]
    #[case("a b", "a+b")]
    #[case("a+b", "a%2Bb")]
    #[case("x=y&z", "x%3Dy%26z")]
    #[case("~safe-._", "~safe-._")]
    #[case("é", "%C3%A9")]
    fn test_encode_component(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(encode_component(&ArgValue::from(input)).as_literal(), Some(expected));
    }

    #[test]
    fn test_parse_cookies() {
        let cookies = parse_cookies(&ArgValue::from("a=1; b=two;  c")).unwrap();
        assert_eq!(
            cookies,
            vec![
                (ArgValue::from("a"), ArgValue::from("1")),
                (ArgValue::from("b"), ArgValue::from("two")),
                (ArgValue::from("c"), ArgValue::new()),
            ]
        );
        assert!(parse_cookies(&ArgValue::from("a=1; a=2")).is_none());
    }
}

use serde::{Serialize, Serializer, ser::SerializeSeq};

use crate::{value::ArgValue, warnings::Warnings};

/// Request headers in the order they were given. Names compare case-insensitively.
///
/// A `None` value means the header was suppressed with `-H 'Name:'` and must not be
/// sent, not even curl's default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Headers {
    entries: Vec<(ArgValue, Option<ArgValue>)>,
    lowercase: bool,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds headers from `-H` (or `--proxy-header`) arguments.
    pub fn from_args<'a>(
        args: impl IntoIterator<Item = &'a ArgValue>,
        option: &str,
        warnings: &mut Warnings,
    ) -> Self {
        let mut headers = Headers::new();
        for arg in args {
            if arg.starts_with("@") {
                warnings.push(
                    "header-file",
                    format!("reading headers from a file with {option} is not supported: {arg}"),
                );
                continue;
            }
            if let Some((name, value)) = arg.split_once(":") {
                // `Host: ` keeps its blank value, other headers with only blanks are unset
                let blank = if name.to_lowercase().eq_str("host") {
                    value.is_empty()
                } else {
                    value.trim().is_empty()
                };
                let value = (!blank).then(|| value.strip_prefix(" ").unwrap_or(value));
                headers.entries.push((name, value));
            } else if let Some((name, _)) = arg.split_once(";") {
                // `Name;` sends an empty header
                headers.entries.push((name, Some(ArgValue::new())));
            } else {
                warnings.push(
                    "header-format",
                    format!("ignoring {option} {:?}, it has no ':'", arg.to_string()),
                );
            }
        }

        headers.lowercase = !headers.entries.is_empty()
            && headers
                .entries
                .iter()
                .all(|(name, _)| *name == name.to_lowercase());
        let mut seen: Vec<String> = Vec::new();
        for (name, _) in &headers.entries {
            let lower = name.to_lowercase().to_string();
            if seen.contains(&lower) {
                continue;
            }
            let count = headers.count(&lower);
            if count > 1 {
                warnings.push(
                    "repeated-header",
                    format!("found {count} \"{name}\" headers, all of them are sent"),
                );
            }
            seen.push(lower);
        }
        headers
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (ArgValue, Option<ArgValue>)> {
        self.entries.iter()
    }

    fn matches(name: &ArgValue, lookup: &str) -> bool {
        name.to_lowercase().eq_str(&lookup.to_lowercase())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(n, _)| Self::matches(n, name))
    }

    /// The first header called `name`. `Some(None)` if it is suppressed.
    pub fn get(&self, name: &str) -> Option<Option<&ArgValue>> {
        self.position(name).map(|i| self.entries[i].1.as_ref())
    }

    pub fn has(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn count(&self, name: &str) -> usize {
        self.entries.iter().filter(|(n, _)| Self::matches(n, name)).count()
    }

    fn spell(&self, name: &str) -> ArgValue {
        if self.lowercase {
            ArgValue::from(name.to_lowercase())
        } else {
            ArgValue::from(name)
        }
    }

    /// Adds `name` unless the user already set or suppressed it. Names follow the
    /// user's casing when all of theirs are lowercase.
    pub fn set_if_missing(&mut self, name: &str, value: impl Into<ArgValue>) -> bool {
        if self.has(name) {
            return false;
        }
        let name = self.spell(name);
        self.entries.push((name, Some(value.into())));
        true
    }

    /// Replaces the first `name` in place, or appends it.
    pub fn set(&mut self, name: &str, value: impl Into<ArgValue>) {
        let value = Some(value.into());
        match self.position(name) {
            Some(i) => self.entries[i].1 = value,
            None => {
                let name = self.spell(name);
                self.entries.push((name, value));
            }
        }
    }

    pub fn delete(&mut self, name: &str) {
        self.entries.retain(|(n, _)| !Self::matches(n, name));
    }

    /// The media type of `Content-Type`, without parameters.
    pub fn content_type(&self) -> Option<String> {
        let value = self.get("content-type").flatten()?;
        let media = value.split(";").into_iter().next()?;
        Some(media.trim().to_string())
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = &'a (ArgValue, Option<ArgValue>);
    type IntoIter = std::slice::Iter<'a, (ArgValue, Option<ArgValue>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl Serialize for Headers {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.entries.len()))?;
        for entry in &self.entries {
            seq.serialize_element(entry)?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    fn parse_headers(args: &[&str]) -> (Headers, Warnings) {
        let mut warnings = Warnings::new();
        let args: Vec<ArgValue> = args.iter().map(|a| ArgValue::from(*a)).collect();
        (Headers::from_args(&args, "--header", &mut warnings), warnings)
    }

    #[rstest]
    #[case("Accept: text/html", "Accept", Some("text/html"))]
    #[case("Accept:text/html", "Accept", Some("text/html"))]
    #[case("X-Empty;", "X-Empty", Some(""))]
    #[case("X-Gone:", "X-Gone", None)]
    #[case("X-Gone:   ", "X-Gone", None)]
    #[case("Host: ", "Host", Some(""))]
    #[case("X-Url: http://a.b:80/", "X-Url", Some("http://a.b:80/"))]
    fn test_header_forms(#[case] arg: &str, #[case] name: &str, #[case] expected: Option<&str>) {
        let (headers, _) = parse_headers(&[arg]);
        assert_eq!(headers.len(), 1);
        let value = headers.get(name).unwrap();
        assert_eq!(value.map(|v| v.to_string()).as_deref(), expected);
    }

    #[test]
    fn test_order_and_duplicates_kept() {
        let (headers, warnings) = parse_headers(&["B: 1", "a: 2", "b: 3"]);
        let names: Vec<String> = headers.iter().map(|(n, _)| n.to_string()).collect();
        assert_eq!(names, vec!["B", "a", "b"]);
        assert_eq!(headers.count("b"), 2);
        assert_eq!(headers.get("b").unwrap().unwrap().as_literal(), Some("1"));
        assert_eq!(warnings.codes(), vec!["repeated-header"]);
    }

    #[test]
    fn test_file_and_malformed_args_warn() {
        let (headers, warnings) = parse_headers(&["@headers.txt", "nocolon"]);
        assert!(headers.is_empty());
        assert_eq!(warnings.codes(), vec!["header-file", "header-format"]);
    }

    #[test]
    fn test_set_if_missing() {
        let (mut headers, _) = parse_headers(&["content-type: text/plain", "X-Gone:"]);
        assert!(!headers.set_if_missing("Content-Type", "application/json"));
        assert!(!headers.set_if_missing("x-gone", "1"));
        assert!(headers.set_if_missing("Accept", "*/*"));
        assert_eq!(headers.content_type().as_deref(), Some("text/plain"));

        let (mut lower, _) = parse_headers(&["accept: */*"]);
        lower.set_if_missing("User-Agent", "x");
        assert!(lower.iter().any(|(n, _)| n.eq_str("user-agent")));
    }

    #[test]
    fn test_set_and_delete() {
        let (mut headers, _) = parse_headers(&["A: 1", "B: 2"]);
        headers.set("a", "9");
        assert_eq!(headers.iter().next().unwrap().1.as_ref().unwrap().as_literal(), Some("9"));
        headers.delete("B");
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_content_type_strips_parameters() {
        let (headers, _) = parse_headers(&["Content-Type: application/json; charset=utf-8"]);
        assert_eq!(headers.content_type().as_deref(), Some("application/json"));
    }
}

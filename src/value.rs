//! Symbolic shell values.
//!
//! A curl argument is not always a plain string: `"$TOKEN"` or `$(cat key)` must survive
//! all the way to code generation so that the generated program reads the variable or
//! runs the command when *it* runs. [`ArgValue`] keeps those pieces as tagged segments.
//! Every string operation the builder needs is defined here and never drops a dynamic
//! segment; a dynamic segment counts as one position for indexing.

use std::fmt;

use serde::{Serialize, Serializer, ser::SerializeSeq};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Segment {
    Literal(String),
    /// `$NAME` or `${...}`; holds what is between the braces.
    EnvVar(String),
    /// `$(...)` or a backtick command; holds the command text.
    CommandSub(String),
}

impl Segment {
    pub fn is_dynamic(&self) -> bool {
        !matches!(self, Segment::Literal(_))
    }
}

/// One indexable position of an [`ArgValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Piece<'a> {
    Char(char),
    Dynamic(&'a Segment),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ArgValue(Vec<Segment>);

impl ArgValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_segments(segments: impl IntoIterator<Item = Segment>) -> Self {
        let mut value = Self::new();
        for segment in segments {
            value.push_segment(segment);
        }
        value
    }

    pub fn env(name: impl Into<String>) -> Self {
        Self(vec![Segment::EnvVar(name.into())])
    }

    pub fn command(cmd: impl Into<String>) -> Self {
        Self(vec![Segment::CommandSub(cmd.into())])
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    /// Appends a segment, merging adjacent literals and dropping empty ones.
    pub fn push_segment(&mut self, segment: Segment) {
        match segment {
            Segment::Literal(text) => self.push_str(&text),
            other => self.0.push(other),
        }
    }

    pub fn push_str(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Segment::Literal(last)) = self.0.last_mut() {
            last.push_str(text);
        } else {
            self.0.push(Segment::Literal(text.to_string()));
        }
    }

    pub fn push_char(&mut self, c: char) {
        let mut buf = [0u8; 4];
        self.push_str(c.encode_utf8(&mut buf));
    }

    pub fn append(&mut self, other: &ArgValue) {
        for segment in &other.0 {
            self.push_segment(segment.clone());
        }
    }

    pub fn prepend_str(&self, text: &str) -> ArgValue {
        let mut out = ArgValue::from(text);
        out.append(self);
        out
    }

    pub fn join(values: &[ArgValue], sep: &str) -> ArgValue {
        let mut out = ArgValue::new();
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                out.push_str(sep);
            }
            out.append(value);
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_literal(&self) -> bool {
        self.0.iter().all(|s| !s.is_dynamic())
    }

    /// The plain text, if there are no dynamic segments.
    pub fn as_literal(&self) -> Option<&str> {
        match self.0.as_slice() {
            [] => Some(""),
            [Segment::Literal(text)] => Some(text),
            _ => None,
        }
    }

    pub fn first_dynamic(&self) -> Option<&Segment> {
        self.0.iter().find(|s| s.is_dynamic())
    }

    pub fn len(&self) -> usize {
        self.0
            .iter()
            .map(|s| match s {
                Segment::Literal(text) => text.chars().count(),
                _ => 1,
            })
            .sum()
    }

    pub fn pieces(&self) -> impl Iterator<Item = Piece<'_>> {
        self.0.iter().flat_map(segment_pieces)
    }

    pub fn get(&self, index: usize) -> Option<Piece<'_>> {
        self.pieces().nth(index)
    }

    pub fn slice(&self, start: usize, end: usize) -> ArgValue {
        let mut out = ArgValue::new();
        for piece in self.pieces().skip(start).take(end.saturating_sub(start)) {
            match piece {
                Piece::Char(c) => out.push_char(c),
                Piece::Dynamic(s) => out.push_segment(s.clone()),
            }
        }
        out
    }

    pub fn slice_from(&self, start: usize) -> ArgValue {
        self.slice(start, self.len())
    }

    /// Position of the first match of `pat`, searched within literal segments only.
    pub fn find(&self, pat: &str) -> Option<usize> {
        self.find_from(pat, 0)
    }

    pub fn find_from(&self, pat: &str, from: usize) -> Option<usize> {
        let mut offset = 0;
        for segment in &self.0 {
            match segment {
                Segment::Literal(text) => {
                    let count = text.chars().count();
                    if offset + count > from {
                        let skip = from.saturating_sub(offset);
                        let byte_skip = text
                            .char_indices()
                            .nth(skip)
                            .map(|(i, _)| i)
                            .unwrap_or(text.len());
                        if let Some(found) = text[byte_skip..].find(pat) {
                            return Some(offset + skip + text[byte_skip..byte_skip + found].chars().count());
                        }
                    }
                    offset += count;
                }
                _ => offset += 1,
            }
        }
        None
    }

    pub fn contains(&self, pat: &str) -> bool {
        self.find(pat).is_some()
    }

    pub fn split_once(&self, pat: &str) -> Option<(ArgValue, ArgValue)> {
        let at = self.find(pat)?;
        Some((
            self.slice(0, at),
            self.slice_from(at + pat.chars().count()),
        ))
    }

    pub fn split(&self, pat: &str) -> Vec<ArgValue> {
        let mut parts = Vec::new();
        let pat_len = pat.chars().count();
        let mut start = 0;
        while let Some(at) = self.find_from(pat, start) {
            parts.push(self.slice(start, at));
            start = at + pat_len.max(1);
        }
        parts.push(self.slice_from(start));
        parts
    }

    pub fn starts_with(&self, pat: &str) -> bool {
        match self.0.first() {
            Some(Segment::Literal(text)) => text.starts_with(pat),
            Some(_) => pat.is_empty(),
            None => pat.is_empty(),
        }
    }

    pub fn ends_with(&self, pat: &str) -> bool {
        match self.0.last() {
            Some(Segment::Literal(text)) => text.ends_with(pat),
            Some(_) => pat.is_empty(),
            None => pat.is_empty(),
        }
    }

    pub fn strip_prefix(&self, pat: &str) -> Option<ArgValue> {
        if self.starts_with(pat) {
            Some(self.slice_from(pat.chars().count()))
        } else {
            None
        }
    }

    pub fn trim(&self) -> ArgValue {
        let mut segments = self.0.clone();
        if let Some(Segment::Literal(text)) = segments.first_mut() {
            *text = text.trim_start().to_string();
        }
        if let Some(Segment::Literal(text)) = segments.last_mut() {
            *text = text.trim_end().to_string();
        }
        ArgValue::from_segments(segments)
    }

    pub fn to_lowercase(&self) -> ArgValue {
        self.map_literals(|text| text.to_lowercase())
    }

    pub fn to_uppercase(&self) -> ArgValue {
        self.map_literals(|text| text.to_uppercase())
    }

    pub fn replace(&self, from: &str, to: &str) -> ArgValue {
        self.map_literals(|text| text.replace(from, to))
    }

    fn map_literals(&self, f: impl Fn(&str) -> String) -> ArgValue {
        ArgValue::from_segments(self.0.iter().map(|s| match s {
            Segment::Literal(text) => Segment::Literal(f(text)),
            other => other.clone(),
        }))
    }

    pub fn eq_str(&self, other: &str) -> bool {
        self.as_literal() == Some(other)
    }
}

impl From<&str> for ArgValue {
    fn from(text: &str) -> Self {
        let mut value = ArgValue::new();
        value.push_str(text);
        value
    }
}

impl From<String> for ArgValue {
    fn from(text: String) -> Self {
        ArgValue::from(text.as_str())
    }
}

fn segment_pieces(segment: &Segment) -> Box<dyn Iterator<Item = Piece<'_>> + '_> {
    match segment {
        Segment::Literal(text) => Box::new(text.chars().map(Piece::Char)),
        other => Box::new(std::iter::once(Piece::Dynamic(other))),
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_plain_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_') && chars.all(is_name_char)
}

/// Renders shell text: `$NAME`, `${NAME}` where braces are needed, `$(cmd)`.
impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                Segment::Literal(text) => f.write_str(text)?,
                Segment::EnvVar(name) => {
                    let next_glues = matches!(
                        self.0.get(i + 1),
                        Some(Segment::Literal(text)) if text.starts_with(is_name_char)
                    );
                    let special = name.len() == 1 && !is_plain_name(name);
                    if (is_plain_name(name) && !next_glues) || special {
                        write!(f, "${name}")?;
                    } else {
                        write!(f, "${{{name}}}")?;
                    }
                }
                Segment::CommandSub(cmd) => write!(f, "$({cmd})")?,
            }
        }
        Ok(())
    }
}

/// Plain strings serialize as strings, anything with a dynamic part as its segment list.
impl Serialize for ArgValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if let Some(text) = self.as_literal() {
            return serializer.serialize_str(text);
        }
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for segment in &self.0 {
            seq.serialize_element(segment)?;
        }
        seq.end()
    }
}

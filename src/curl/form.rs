//! `-F` / `--form-string` arguments.

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag, take_till, take_until},
    character::complete::char,
    combinator::{all_consuming, map},
    error::context,
    multi::many1,
    sequence::{delimited, preceded, separated_pair},
};
use serde::Serialize;

use crate::{
    error::{CurlError, Result},
    value::ArgValue,
    warnings::Warnings,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormSource {
    /// `name=value`
    Text,
    /// `name=@path`, uploaded as a file.
    File,
    /// `name=<path`, the file's contents sent as a text field.
    FileContents,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormArg {
    pub name: ArgValue,
    pub source: FormSource,
    /// Text, or the path for file sources.
    pub value: ArgValue,
    pub content_type: Option<String>,
    pub filename: Option<String>,
    pub headers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
enum Modifier {
    Type(String),
    Filename(String),
    Headers(String),
    Encoder(String),
}

fn modifier_value(input: &str) -> IResult<&str, String> {
    context(
        "modifier value",
        alt((
            map(delimited(char('"'), take_until("\""), char('"')), str::to_string),
            map(take_till(|c: char| c == ';'), |v: &str| v.trim().to_string()),
        )),
    )(input)
}

fn modifier(input: &str) -> IResult<&str, Modifier> {
    context(
        "form modifier",
        preceded(
            char(';'),
            map(
                separated_pair(
                    alt((tag("type"), tag("filename"), tag("headers"), tag("encoder"))),
                    char('='),
                    modifier_value,
                ),
                |(key, value)| match key {
                    "type" => Modifier::Type(value),
                    "filename" => Modifier::Filename(value),
                    "headers" => Modifier::Headers(value),
                    _ => Modifier::Encoder(value),
                },
            ),
        ),
    )(input)
}

fn modifiers(input: &str) -> IResult<&str, Vec<Modifier>> {
    all_consuming(many1(modifier))(input)
}

/// Position of the first `;type=`-style suffix in `value`, if any.
fn modifiers_start(value: &ArgValue) -> Option<usize> {
    [";type=", ";filename=", ";headers=", ";encoder="]
        .iter()
        .filter_map(|m| value.find(m))
        .min()
}

/// Parses one `-F` argument. `literal` is set for `--form-string`, which takes the
/// value verbatim.
pub fn parse_form(arg: &ArgValue, literal: bool, warnings: &mut Warnings) -> Result<FormArg> {
    let (name, mut value) = arg.split_once("=").ok_or_else(|| CurlError::InvalidArgument {
        option: "--form".into(),
        reason: format!("expected name=content, got {:?}", arg.to_string()),
    })?;

    let mut form = FormArg {
        name,
        source: FormSource::Text,
        value: ArgValue::new(),
        content_type: None,
        filename: None,
        headers: Vec::new(),
    };
    if literal {
        form.value = value;
        return Ok(form);
    }

    if let Some(rest) = value.strip_prefix("@") {
        form.source = FormSource::File;
        value = rest;
    } else if let Some(rest) = value.strip_prefix("<") {
        form.source = FormSource::FileContents;
        value = rest;
    }

    if let Some(at) = modifiers_start(&value) {
        let suffix = value.slice_from(at);
        match suffix.as_literal().map(modifiers) {
            Some(Ok((_, parsed))) => {
                value = value.slice(0, at);
                for m in parsed {
                    match m {
                        Modifier::Type(t) => form.content_type = Some(t),
                        Modifier::Filename(f) => form.filename = Some(f),
                        Modifier::Headers(h) => form.headers.push(h),
                        Modifier::Encoder(e) => warnings.push(
                            "form-encoder",
                            format!("ignoring encoder={e} for form field {}", form.name),
                        ),
                    }
                }
            }
            _ => warnings.push(
                "form-modifier",
                format!("could not parse form field options {suffix}, keeping them in the value"),
            ),
        }
    }

    if form.source == FormSource::File && form.filename.is_none() {
        // curl sends the basename of the uploaded path
        if let Some(path) = value.as_literal() {
            let base = path.rsplit(['/', '\\']).next().unwrap_or(path);
            form.filename = Some(base.to_string());
        }
    }
    form.value = value;
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    fn parse(arg: &str) -> FormArg {
        let mut warnings = Warnings::new();
        parse_form(&ArgValue::from(arg), false, &mut warnings).unwrap()
    }

    #[rstest]
    #[case("name=value", FormSource::Text, "value", None, None)]
    #[case("f=@file.bin", FormSource::File, "file.bin", None, Some("file.bin"))]
    #[case("f=@dir/photo.png;type=image/png", FormSource::File, "dir/photo.png", Some("image/png"), Some("photo.png"))]
    #[case("f=@a.txt;filename=\"b c.txt\"", FormSource::File, "a.txt", None, Some("b c.txt"))]
    #[case("story=<story.txt", FormSource::FileContents, "story.txt", None, None)]
    #[case("a=b=c", FormSource::Text, "b=c", None, None)]
    fn test_parse_form(
        #[case] arg: &str,
        #[case] source: FormSource,
        #[case] value: &str,
        #[case] content_type: Option<&str>,
        #[case] filename: Option<&str>,
    ) {
        let form = parse(arg);
        assert_eq!(form.source, source);
        assert_eq!(form.value.as_literal(), Some(value));
        assert_eq!(form.content_type.as_deref(), content_type);
        assert_eq!(form.filename.as_deref(), filename);
    }

    #[test]
    fn test_form_string_is_verbatim() {
        let mut warnings = Warnings::new();
        let form = parse_form(&ArgValue::from("f=@not-a-file;type=x"), true, &mut warnings).unwrap();
        assert_eq!(form.source, FormSource::Text);
        assert_eq!(form.value.as_literal(), Some("@not-a-file;type=x"));
    }

    #[test]
    fn test_missing_equals_is_an_error() {
        let mut warnings = Warnings::new();
        assert!(matches!(
            parse_form(&ArgValue::from("novalue"), false, &mut warnings),
            Err(CurlError::InvalidArgument { .. })
        ));
    }
}

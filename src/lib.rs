//! Parses pasted curl commands into a list of normalized [`Request`]s plus the
//! [`Warnings`] collected on the way.
//!
//! ```
//! let output = curlir::parse_curl_command("curl -d a=1 -d b=2 https://example.com").unwrap();
//! let request = &output.requests[0];
//! assert_eq!(request.urls[0].method.to_string(), "POST");
//! ```
//!
//! Arguments keep their shell expansions: `$TOKEN` stays an environment variable
//! reference in the IR instead of being expanded.

pub mod curl;
pub mod error;
pub mod headers;
pub mod query;
pub mod request;
pub mod shell;
pub mod url;
pub mod value;
pub mod warnings;

#[cfg(test)]
mod test_util;

use serde::Serialize;

pub use crate::{
    curl::{CurlOption, SupportedOptions},
    error::{CurlError, Result},
    request::{Request, RequestUrl, Support, first_request, warn_if_parts_ignored},
    value::{ArgValue, Segment},
    warnings::{Warning, Warnings},
};

use crate::{
    curl::curl_parsers::{is_curl, parse_args},
    request::build_requests,
    shell::split_statements,
};

/// Everything a code generator needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParseOutput {
    /// One per curl invocation, in order.
    pub requests: Vec<Request>,
    pub warnings: Warnings,
}

/// A parser configured for one code generator.
#[derive(Debug, Clone, Default)]
pub struct CurlParser {
    supported: Option<SupportedOptions>,
}

impl CurlParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options outside `supported` are ignored with an `unsupported-option` warning.
    pub fn with_supported(mut self, supported: SupportedOptions) -> Self {
        self.supported = Some(supported);
        self
    }

    /// Parses shell text containing one or more curl commands.
    pub fn parse(&self, command: &str) -> Result<ParseOutput> {
        let mut warnings = Warnings::new();
        let statements = split_statements(command, &mut warnings)?;
        let mut requests = Vec::new();
        for statement in &statements {
            let parsed = parse_args(&statement.argv, self.supported.as_ref(), &mut warnings)?;
            requests.extend(build_requests(
                &parsed,
                statement.stdin.as_ref(),
                statement.stdin_file.as_ref(),
                &mut warnings,
            )?);
        }
        Ok(ParseOutput { requests, warnings })
    }

    /// Parses an argv that was already split, e.g. `["curl", "-I", "example.com"]`.
    /// Every argument is literal text.
    pub fn parse_argv<S: AsRef<str>>(&self, argv: &[S]) -> Result<ParseOutput> {
        let argv: Vec<ArgValue> = argv.iter().map(|a| ArgValue::from(a.as_ref())).collect();
        if !is_curl(&argv) {
            return Err(CurlError::NotCurl(
                argv.first().map(|a| a.to_string()).unwrap_or_default(),
            ));
        }
        let mut warnings = Warnings::new();
        let parsed = parse_args(&argv, self.supported.as_ref(), &mut warnings)?;
        let requests = build_requests(&parsed, None, None, &mut warnings)?;
        Ok(ParseOutput { requests, warnings })
    }
}

pub fn parse_curl_command(command: &str) -> Result<ParseOutput> {
    CurlParser::new().parse(command)
}

pub fn parse_curl_argv(argv: &[&str]) -> Result<ParseOutput> {
    CurlParser::new().parse_argv(argv)
}

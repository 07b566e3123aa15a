use thiserror::Error;

pub type Result<T> = std::result::Result<T, CurlError>;

/// Hard failures. Anything recoverable goes to [`crate::warnings::Warnings`] instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CurlError {
    #[error("syntax error at {line}:{column}: {message}")]
    Syntax {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("option {option}: is unknown{}", .hint.as_ref().map(|h| format!(" ({h})")).unwrap_or_default())]
    UnknownOption { option: String, hint: Option<String> },

    #[error("option {option}: is ambiguous (could be {})", .candidates.join(", "))]
    AmbiguousOption {
        option: String,
        candidates: Vec<String>,
    },

    #[error("option {0}: requires parameter")]
    MissingArgument(String),

    #[error("option {option}: {reason}")]
    InvalidArgument { option: String, reason: String },

    #[error("{0}")]
    UnsupportedCombination(String),

    #[error("malformed URL {url:?}: {reason}")]
    MalformedUrl { url: String, reason: String },

    #[error("command substitution nested deeper than {0} levels")]
    NestingTooDeep(usize),

    #[error("no URL specified")]
    NoUrl,

    #[error("not a curl command: {0}")]
    NotCurl(String),

    #[error("option {0} could be anything, it contains a shell expansion")]
    DynamicOption(String),
}

impl CurlError {
    pub(crate) fn unknown(option: impl Into<String>) -> Self {
        CurlError::UnknownOption {
            option: option.into(),
            hint: None,
        }
    }

    pub(crate) fn syntax(message: impl Into<String>, src: &str, offset: usize) -> Self {
        let (line, column) = line_column(src, offset);
        CurlError::Syntax {
            message: message.into(),
            line,
            column,
        }
    }
}

/// 1-based line and column (in chars) of a byte offset.
pub(crate) fn line_column(src: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(src.len());
    let before = &src[..offset];
    let line = before.matches('\n').count() + 1;
    let column = match before.rfind('\n') {
        Some(nl) => before[nl + 1..].chars().count() + 1,
        None => before.chars().count() + 1,
    };
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case("curl 'abc", 5, (1, 6))]
    #[case("curl \\\n  -H 'x", 12, (2, 6))]
    #[case("", 0, (1, 1))]
    fn test_line_column(#[case] src: &str, #[case] offset: usize, #[case] expected: (usize, usize)) {
        assert_eq!(line_column(src, offset), expected);
    }

    #[test]
    fn test_ambiguous_message_lists_candidates() {
        let err = CurlError::AmbiguousOption {
            option: "--s".into(),
            candidates: vec!["--silent".into(), "--sslv2".into()],
        };
        assert_eq!(
            err.to_string(),
            "option --s: is ambiguous (could be --silent, --sslv2)"
        );
    }

    #[test]
    fn test_unknown_message_with_hint() {
        let err = CurlError::UnknownOption {
            option: "-9".into(),
            hint: Some("used to be short for --crlf until curl 7.10.8".into()),
        };
        assert_eq!(
            err.to_string(),
            "option -9: is unknown (used to be short for --crlf until curl 7.10.8)"
        );
        assert_eq!(
            CurlError::unknown("--frobnicate").to_string(),
            "option --frobnicate: is unknown"
        );
    }
}

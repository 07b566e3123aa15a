use winnow::{
    ModalResult, Parser,
    ascii::digit1,
    combinator::{alt, delimited, opt, preceded},
    error::{ContextError, ErrMode},
    token::{one_of, take_till, take_while},
};

use crate::{
    error::{CurlError, Result},
    value::{ArgValue, Segment},
    warnings::Warnings,
};

use super::MAX_NESTING;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Separator {
    Semicolon,
    And,
    Or,
    Pipe,
    Background,
    Newline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RedirectOp {
    Input,
    HereString,
    HereDoc,
    HereDocStripTabs,
    Output,
    Append,
    Duplicate,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Word {
        value: ArgValue,
        raw: String,
        offset: usize,
    },
    Separator(Separator),
    Redirect {
        op: RedirectOp,
        target: ArgValue,
        offset: usize,
    },
}

fn single_quoted<'s>(s: &mut &'s str) -> ModalResult<&'s str> {
    delimited('\'', take_till(0.., '\''), '\'').parse_next(s)
}

fn variable_name<'s>(s: &mut &'s str) -> ModalResult<&'s str> {
    (
        one_of(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_'),
    )
        .take()
        .parse_next(s)
}

fn special_parameter(s: &mut &str) -> ModalResult<char> {
    one_of(|c: char| c.is_ascii_digit() || "@*#?$!-".contains(c)).parse_next(s)
}

fn separator(s: &mut &str) -> ModalResult<Separator> {
    alt((
        "&&".value(Separator::And),
        "||".value(Separator::Or),
        "|&".value(Separator::Pipe),
        "|".value(Separator::Pipe),
        ";".value(Separator::Semicolon),
        "&".value(Separator::Background),
    ))
    .parse_next(s)
}

fn redirect_op(s: &mut &str) -> ModalResult<RedirectOp> {
    alt((
        "&>>".value(RedirectOp::Append),
        "&>".value(RedirectOp::Output),
        preceded(
            opt(digit1),
            alt((
                "<<<".value(RedirectOp::HereString),
                "<<-".value(RedirectOp::HereDocStripTabs),
                "<<".value(RedirectOp::HereDoc),
                "<&".value(RedirectOp::Duplicate),
                "<>".value(RedirectOp::Input),
                "<".value(RedirectOp::Input),
                ">>".value(RedirectOp::Append),
                ">&".value(RedirectOp::Duplicate),
                ">|".value(RedirectOp::Output),
                ">".value(RedirectOp::Output),
            )),
        ),
    ))
    .parse_next(s)
}

/// Is `raw` (source text of a word) an unquoted `NAME=...` assignment?
pub(crate) fn is_assignment(raw: &str) -> bool {
    let mut input = raw;
    (variable_name, '=').parse_next(&mut input).is_ok()
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r')
}

fn is_word_end(c: char) -> bool {
    is_blank(c) || matches!(c, '\n' | ';' | '&' | '|' | '<' | '>' | '(' | ')')
}

struct PendingHeredoc {
    token: usize,
    delimiter: String,
    strip_tabs: bool,
    quoted: bool,
}

/// Splits shell source into words, separators and redirects.
///
/// Quoting is resolved here; variables and command substitutions become dynamic
/// [`Segment`]s instead of being expanded.
pub(crate) struct Lexer<'s, 'w> {
    src: &'s str,
    pos: usize,
    warnings: &'w mut Warnings,
    heredocs: Vec<PendingHeredoc>,
}

impl<'s, 'w> Lexer<'s, 'w> {
    pub(crate) fn new(src: &'s str, warnings: &'w mut Warnings) -> Self {
        Self {
            src,
            pos: 0,
            warnings,
            heredocs: Vec::new(),
        }
    }

    fn rest(&self) -> &'s str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn run<O>(&mut self, mut parser: impl Parser<&'s str, O, ErrMode<ContextError>>) -> Option<O> {
        let mut input = self.rest();
        match parser.parse_next(&mut input) {
            Ok(out) => {
                self.pos = self.src.len() - input.len();
                Some(out)
            }
            Err(_) => None,
        }
    }

    fn error(&self, message: &str, offset: usize) -> CurlError {
        CurlError::syntax(message, self.src, offset)
    }

    pub(crate) fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            self.skip_blanks();
            let Some(c) = self.peek() else { break };
            let start = self.pos;
            match c {
                '#' => {
                    let comment = take_till(0.., '\n');
                    self.run(comment);
                }
                '\n' => {
                    self.bump();
                    tokens.push(Token::Separator(Separator::Newline));
                    self.read_heredoc_bodies(&mut tokens)?;
                }
                '(' | ')' => {
                    self.bump();
                    self.warnings.push(
                        "unsupported-shell",
                        format!("ignoring subshell parenthesis at offset {start}"),
                    );
                    tokens.push(Token::Separator(Separator::Semicolon));
                }
                '<' | '>' if self.peek_second() == Some('(') => {
                    let value = self.read_process_substitution()?;
                    tokens.push(Token::Word {
                        value,
                        raw: self.src[start..self.pos].to_string(),
                        offset: start,
                    });
                }
                _ => {
                    if let Some(op) = self.run(redirect_op) {
                        let token = self.read_redirect(op, start, tokens.len())?;
                        tokens.push(token);
                    } else if let Some(sep) = self.run(separator) {
                        tokens.push(Token::Separator(sep));
                    } else {
                        let value = self.read_word()?;
                        tokens.push(Token::Word {
                            value,
                            raw: self.src[start..self.pos].to_string(),
                            offset: start,
                        });
                    }
                }
            }
        }
        if let Some(pending) = self.heredocs.first() {
            self.warnings.push(
                "heredoc",
                format!("here-document delimited by {:?} has no body", pending.delimiter),
            );
        }
        tracing::debug!(tokens = tokens.len(), "tokenized shell input");
        Ok(tokens)
    }

    fn skip_blanks(&mut self) {
        loop {
            match self.peek() {
                Some(c) if is_blank(c) => {
                    self.bump();
                }
                Some('\\') if self.peek_second() == Some('\n') => {
                    self.pos += 2;
                }
                _ => break,
            }
        }
    }

    fn read_redirect(&mut self, op: RedirectOp, start: usize, index: usize) -> Result<Token> {
        self.skip_blanks();
        let target_start = self.pos;
        if self.peek().is_none_or(is_word_end) {
            return Err(self.error("expected a word after redirection", start));
        }
        let target = self.read_word()?;
        if matches!(op, RedirectOp::HereDoc | RedirectOp::HereDocStripTabs) {
            let raw = &self.src[target_start..self.pos];
            self.heredocs.push(PendingHeredoc {
                token: index,
                delimiter: target.to_string(),
                strip_tabs: op == RedirectOp::HereDocStripTabs,
                quoted: raw.contains(['\'', '"', '\\']),
            });
        }
        Ok(Token::Redirect {
            op,
            target,
            offset: start,
        })
    }

    fn read_heredoc_bodies(&mut self, tokens: &mut [Token]) -> Result<()> {
        let pending = std::mem::take(&mut self.heredocs);
        for heredoc in pending {
            // source ranges of the body lines, leading tabs already stripped
            let mut lines = Vec::new();
            let mut terminated = false;
            while self.pos < self.src.len() {
                let line_end = self.rest().find('\n').map_or(self.src.len(), |i| self.pos + i);
                let mut line_start = self.pos;
                self.pos = (line_end + 1).min(self.src.len());
                if heredoc.strip_tabs {
                    line_start = line_end - self.src[line_start..line_end].trim_start_matches('\t').len();
                }
                if self.src[line_start..line_end] == heredoc.delimiter {
                    terminated = true;
                    break;
                }
                lines.push((line_start, line_end));
            }
            if !terminated {
                self.warnings.push(
                    "heredoc",
                    format!(
                        "here-document delimited by {:?} is not terminated",
                        heredoc.delimiter
                    ),
                );
            }
            let mut value = ArgValue::new();
            for (start, end) in lines {
                if heredoc.quoted {
                    value.push_str(&self.src[start..end]);
                    value.push_char('\n');
                } else if end < self.src.len() {
                    value.append(&self.expand_heredoc(start, end + 1)?);
                } else {
                    value.append(&self.expand_heredoc(start, end)?);
                    value.push_char('\n');
                }
            }
            if let Some(Token::Redirect { target, .. }) = tokens.get_mut(heredoc.token) {
                *target = value;
            }
        }
        Ok(())
    }

    /// Re-reads `src[start..end]` with double-quote expansion rules.
    fn expand_heredoc(&mut self, start: usize, end: usize) -> Result<ArgValue> {
        let resume = self.pos;
        self.pos = start;
        let mut value = ArgValue::new();
        while self.pos < end {
            match self.peek() {
                Some('\\') if matches!(self.peek_second(), Some('\\' | '$' | '`')) => {
                    self.bump();
                    if let Some(c) = self.bump() {
                        value.push_char(c);
                    }
                }
                Some('\\') if self.peek_second() == Some('\n') => self.pos += 2,
                Some('$') => self.read_dollar(&mut value, true)?,
                Some('`') => self.read_backtick(&mut value)?,
                Some(c) => {
                    self.bump();
                    value.push_char(c);
                }
                None => break,
            }
        }
        self.pos = resume;
        Ok(value)
    }

    fn read_word(&mut self) -> Result<ArgValue> {
        let mut value = ArgValue::new();
        while let Some(c) = self.peek() {
            if is_word_end(c) {
                break;
            }
            match c {
                '\\' => {
                    self.bump();
                    match self.bump() {
                        Some('\n') => {}
                        Some(escaped) => value.push_char(escaped),
                        None => value.push_char('\\'),
                    }
                }
                '\'' => {
                    let start = self.pos;
                    let text = self
                        .run(single_quoted)
                        .ok_or_else(|| self.error("unterminated single quote", start))?;
                    value.push_str(text);
                }
                '"' => self.read_double_quoted(&mut value)?,
                '$' => self.read_dollar(&mut value, false)?,
                '`' => self.read_backtick(&mut value)?,
                _ => {
                    self.bump();
                    value.push_char(c);
                }
            }
        }
        Ok(value)
    }

    fn read_double_quoted(&mut self, value: &mut ArgValue) -> Result<()> {
        let start = self.pos;
        self.bump();
        loop {
            match self.peek() {
                None => return Err(self.error("unterminated double quote", start)),
                Some('"') => {
                    self.bump();
                    return Ok(());
                }
                Some('\\') => {
                    self.bump();
                    match self.peek() {
                        Some('\n') => {
                            self.bump();
                        }
                        Some(c @ ('\\' | '$' | '`' | '"')) => {
                            self.bump();
                            value.push_char(c);
                        }
                        _ => value.push_char('\\'),
                    }
                }
                Some('$') => self.read_dollar(value, true)?,
                Some('`') => self.read_backtick(value)?,
                Some(c) => {
                    self.bump();
                    value.push_char(c);
                }
            }
        }
    }

    fn read_dollar(&mut self, value: &mut ArgValue, in_double_quotes: bool) -> Result<()> {
        let start = self.pos;
        self.bump();
        match self.peek() {
            Some('\'') if !in_double_quotes => {
                let body = self.scan_ansi_c(start)?;
                value.push_str(&decode_ansi_c(body));
            }
            Some('"') if !in_double_quotes => self.read_double_quoted(value)?,
            Some('(') if self.peek_second() == Some('(') => {
                let end = self.scan_parens(self.pos + 1, 1)?;
                self.pos = end;
                let text = &self.src[start..end];
                self.warnings.push(
                    "unsupported-shell",
                    format!("arithmetic expansion {text} is kept as literal text"),
                );
                value.push_str(text);
            }
            Some('(') => {
                let end = self.scan_parens(self.pos + 1, 1)?;
                let command = self.src[self.pos + 1..end - 1].trim().to_string();
                self.pos = end;
                self.warnings.push(
                    "expansion",
                    format!("command substitution $({command}) is evaluated at runtime"),
                );
                value.push_segment(Segment::CommandSub(command));
            }
            Some('{') => {
                let close = self.scan_braces(self.pos + 1, start)?;
                let name = self.src[self.pos + 1..close].to_string();
                if name.is_empty() {
                    return Err(self.error("bad substitution ${}", start));
                }
                self.pos = close + 1;
                self.push_variable(value, name);
            }
            _ => {
                if let Some(name) = self.run(variable_name) {
                    self.push_variable(value, name.to_string());
                } else if let Some(special) = self.run(special_parameter) {
                    self.warnings.push(
                        "special-variable",
                        format!("special shell parameter ${special} has no portable value"),
                    );
                    self.push_variable(value, special.to_string());
                } else {
                    value.push_char('$');
                }
            }
        }
        Ok(())
    }

    fn push_variable(&mut self, value: &mut ArgValue, name: String) {
        self.warnings.push(
            "expansion",
            format!("variable ${name} is read from the environment at runtime"),
        );
        value.push_segment(Segment::EnvVar(name));
    }

    fn read_backtick(&mut self, value: &mut ArgValue) -> Result<()> {
        let start = self.pos;
        self.bump();
        let mut command = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated backtick", start)),
                Some('`') => break,
                Some('\\') => match self.bump() {
                    Some(c @ ('\\' | '`' | '$')) => command.push(c),
                    Some(c) => {
                        command.push('\\');
                        command.push(c);
                    }
                    None => return Err(self.error("unterminated backtick", start)),
                },
                Some(c) => command.push(c),
            }
        }
        let command = command.trim().to_string();
        self.warnings.push(
            "expansion",
            format!("command substitution `{command}` is evaluated at runtime"),
        );
        value.push_segment(Segment::CommandSub(command));
        Ok(())
    }

    /// Returns the raw body of `$'...'` and moves past the closing quote.
    fn scan_ansi_c(&mut self, start: usize) -> Result<&'s str> {
        self.bump();
        let body_start = self.pos;
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated $' string", start)),
                Some('\\') => {
                    self.bump();
                }
                Some('\'') => return Ok(&self.src[body_start..self.pos - 1]),
                Some(_) => {}
            }
        }
    }

    fn read_process_substitution(&mut self) -> Result<ArgValue> {
        let start = self.pos;
        let end = self.scan_parens(self.pos + 2, 1)?;
        self.pos = end;
        let text = &self.src[start..end];
        self.warnings.push(
            "unsupported-shell",
            format!("process substitution {text} is kept as literal text"),
        );
        Ok(ArgValue::from(text))
    }

    /// Finds the closing `}` of a `${...}` whose body starts at `from`,
    /// skipping nested `${...}` and quoted text.
    fn scan_braces(&self, from: usize, start: usize) -> Result<usize> {
        let mut level = 0usize;
        let mut chars = self.src[from..].char_indices().peekable();
        while let Some((i, c)) = chars.next() {
            match c {
                '\\' => {
                    chars.next();
                }
                '\'' => {
                    let at = from + i;
                    let close = self.src[at + 1..]
                        .find('\'')
                        .ok_or_else(|| self.error("unterminated single quote", at))?;
                    let resume = at + 1 + close + 1;
                    while chars.peek().is_some_and(|&(j, _)| from + j < resume) {
                        chars.next();
                    }
                }
                '$' if chars.peek().is_some_and(|&(_, n)| n == '{') => {
                    chars.next();
                    level += 1;
                    if level > MAX_NESTING {
                        return Err(CurlError::NestingTooDeep(MAX_NESTING));
                    }
                }
                '}' if level == 0 => return Ok(from + i),
                '}' => level -= 1,
                _ => {}
            }
        }
        Err(self.error("unterminated ${ expansion", start))
    }

    /// Finds the end (one past the closing paren) of a parenthesized region
    /// starting at `from`, just after its opening paren.
    fn scan_parens(&self, from: usize, depth: usize) -> Result<usize> {
        if depth > MAX_NESTING {
            return Err(CurlError::NestingTooDeep(MAX_NESTING));
        }
        let open = from.saturating_sub(1);
        let mut level = 0usize;
        let mut chars = self.src[from..].char_indices().peekable();
        while let Some((i, c)) = chars.next() {
            let at = from + i;
            match c {
                '\\' => {
                    chars.next();
                }
                '\'' => {
                    let close = self.src[at + 1..]
                        .find('\'')
                        .ok_or_else(|| self.error("unterminated single quote", at))?;
                    let resume = at + 1 + close + 1;
                    while chars.peek().is_some_and(|&(j, _)| from + j < resume) {
                        chars.next();
                    }
                }
                '"' => {
                    let mut escaped = false;
                    let mut closed = false;
                    for (_, q) in chars.by_ref() {
                        match q {
                            _ if escaped => escaped = false,
                            '\\' => escaped = true,
                            '"' => {
                                closed = true;
                                break;
                            }
                            _ => {}
                        }
                    }
                    if !closed {
                        return Err(self.error("unterminated double quote", at));
                    }
                }
                '$' if chars.peek().is_some_and(|&(_, n)| n == '(') => {
                    let (j, _) = chars.next().unwrap_or((i, '('));
                    let inner_end = self.scan_parens(from + j + 1, depth + 1)?;
                    while chars.peek().is_some_and(|&(k, _)| from + k < inner_end) {
                        chars.next();
                    }
                }
                '(' => level += 1,
                ')' if level == 0 => return Ok(at + 1),
                ')' => level -= 1,
                _ => {}
            }
        }
        Err(self.error("unterminated command substitution", open))
    }
}

/// Decodes the body of a `$'...'` string.
pub(crate) fn decode_ansi_c(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(e) = chars.next() else {
            out.push('\\');
            break;
        };
        match e {
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            'e' | 'E' => out.push('\x1b'),
            'f' => out.push('\x0c'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\x0b'),
            '\\' | '\'' | '"' | '?' => out.push(e),
            '0'..='7' => {
                let mut code = e.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|d| d.to_digit(8)) {
                        Some(d) => {
                            code = code * 8 + d;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.push(char::from_u32(code & 0xff).unwrap_or('\u{fffd}'));
            }
            'x' | 'u' | 'U' => {
                let max = match e {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let mut code = 0u32;
                let mut digits = 0;
                while digits < max {
                    match chars.peek().and_then(|d| d.to_digit(16)) {
                        Some(d) => {
                            code = code * 16 + d;
                            chars.next();
                            digits += 1;
                        }
                        None => break,
                    }
                }
                if digits == 0 {
                    out.push('\\');
                    out.push(e);
                } else {
                    out.push(char::from_u32(code).unwrap_or('\u{fffd}'));
                }
            }
            'c' => match chars.next() {
                Some(ctl) => out.push(char::from_u32(ctl.to_ascii_uppercase() as u32 ^ 0x40).unwrap_or(ctl)),
                None => {
                    out.push('\\');
                    out.push('c');
                }
            },
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    fn words(src: &str) -> Vec<ArgValue> {
        let mut warnings = Warnings::new();
        Lexer::new(src, &mut warnings)
            .tokenize()
            .unwrap()
            .into_iter()
            .filter_map(|t| match t {
                Token::Word { value, .. } => Some(value),
                _ => None,
            })
            .collect()
    }

    #[rstest]
    #[case(r#" 'rakudo star' "#, "rakudo star")]
    #[case(r#"'rakulang "rocks"'"#, r#"rakulang "rocks""#)]
    fn test_parse_single_quoted(#[case] input: &str, #[case] expected: &str) {
        let mut input = input.trim_start();
        assert_eq!(single_quoted(&mut input).unwrap(), expected);
    }

    #[rstest]
    #[case(r#"curl "a b""#, vec!["curl", "a b"])]
    #[case(r#"curl 'it'\''s'"#, vec!["curl", "it's"])]
    #[case(r#"curl "say \"hi\" \x""#, vec!["curl", r#"say "hi" \x"#])]
    #[case("curl a\\ b", vec!["curl", "a b"])]
    #[case("curl \\\n  -s", vec!["curl", "-s"])]
    #[case("curl ''", vec!["curl", ""])]
    #[case("curl a#b # comment", vec!["curl", "a#b"])]
    #[case("curl $'a\\tb\\x41\\u00e9'", vec!["curl", "a\tbAé"])]
    #[case("curl -d$'\\''", vec!["curl", "-d'"])]
    fn test_words(#[case] src: &str, #[case] expected: Vec<&str>) {
        let words: Vec<String> = words(src).iter().map(|w| w.to_string()).collect();
        assert_eq!(words, expected);
    }

    #[test]
    fn test_variables_become_segments() {
        let mut warnings = Warnings::new();
        let tokens = Lexer::new(r#"curl -H "Authorization: Bearer $TOKEN" $(echo url)"#, &mut warnings)
            .tokenize()
            .unwrap();
        let Token::Word { value, .. } = &tokens[2] else {
            panic!("expected a word, got {:?}", tokens[2]);
        };
        assert_eq!(
            value.segments(),
            &[
                Segment::Literal("Authorization: Bearer ".into()),
                Segment::EnvVar("TOKEN".into())
            ]
        );
        let Token::Word { value, .. } = &tokens[3] else {
            panic!("expected a word");
        };
        assert_eq!(value.segments(), &[Segment::CommandSub("echo url".into())]);
        assert_eq!(warnings.codes(), vec!["expansion", "expansion"]);
    }

    #[test]
    fn test_single_quotes_do_not_expand() {
        let words = words("curl '$HOME' \"${HOME}x\" `id -u`");
        assert_eq!(words[1].as_literal(), Some("$HOME"));
        assert_eq!(
            words[2].segments(),
            &[Segment::EnvVar("HOME".into()), Segment::Literal("x".into())]
        );
        assert_eq!(words[3].segments(), &[Segment::CommandSub("id -u".into())]);
    }

    #[rstest]
    #[case("curl 'abc", "unterminated single quote", 1, 6)]
    #[case("curl \\\n -d \"abc", "unterminated double quote", 2, 5)]
    #[case("curl $(echo", "unterminated command substitution", 1, 7)]
    fn test_unterminated(
        #[case] src: &str,
        #[case] message: &str,
        #[case] line: usize,
        #[case] column: usize,
    ) {
        let mut warnings = Warnings::new();
        let err = Lexer::new(src, &mut warnings).tokenize().unwrap_err();
        assert_eq!(
            err,
            CurlError::Syntax {
                message: message.into(),
                line,
                column
            }
        );
    }

    #[test]
    fn test_nesting_limit() {
        let mut src = String::from("curl ");
        for _ in 0..=MAX_NESTING {
            src.push_str("$(echo ");
        }
        for _ in 0..=MAX_NESTING {
            src.push(')');
        }
        let mut warnings = Warnings::new();
        let err = Lexer::new(&src, &mut warnings).tokenize().unwrap_err();
        assert_eq!(err, CurlError::NestingTooDeep(MAX_NESTING));

        let nested = "curl $(echo $(echo $(echo x)))";
        assert_eq!(
            words(nested)[1].segments(),
            &[Segment::CommandSub("echo $(echo $(echo x))".into())]
        );
    }

    #[test]
    fn test_separators_and_redirects() {
        let mut warnings = Warnings::new();
        let tokens = Lexer::new("curl a > out.txt && curl b <<< 'x=1' 2>/dev/null", &mut warnings)
            .tokenize()
            .unwrap();
        let kinds: Vec<String> = tokens
            .iter()
            .map(|t| match t {
                Token::Word { value, .. } => value.to_string(),
                Token::Separator(s) => format!("{s:?}"),
                Token::Redirect { op, target, .. } => format!("{op:?}:{target}"),
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                "curl",
                "a",
                "Output:out.txt",
                "And",
                "curl",
                "b",
                "HereString:x=1",
                "Output:/dev/null"
            ]
        );
    }

    #[test]
    fn test_heredoc_body() {
        let mut warnings = Warnings::new();
        let src = "curl -d @- url <<EOF\n{\"user\": \"$USER\"}\nEOF\n";
        let tokens = Lexer::new(src, &mut warnings).tokenize().unwrap();
        let body = tokens
            .iter()
            .find_map(|t| match t {
                Token::Redirect {
                    op: RedirectOp::HereDoc,
                    target,
                    ..
                } => Some(target.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(body.to_string(), "{\"user\": \"$USER\"}\n");
        assert!(body.first_dynamic().is_some());

        let quoted = "curl -d @- url <<'EOF'\n$USER\nEOF";
        let tokens = Lexer::new(quoted, &mut warnings).tokenize().unwrap();
        assert!(tokens.iter().any(|t| matches!(
            t,
            Token::Redirect { target, .. } if target.as_literal() == Some("$USER\n")
        )));
    }

    #[rstest]
    #[case("<<-EOF\n\tuser=$USER\n\tEOF\n", "user=$USER\n", true)]
    #[case("<<-'EOF'\n\tuser=$USER\n\tEOF\n", "user=$USER\n", false)]
    #[case("<<EOF\n\tuser=$USER\\\nx\nEOF", "\tuser=${USER}x\n", true)]
    #[case("<<-EOF\n\t\ta\n\tb", "a\nb\n", false)]
    fn test_heredoc_strip_tabs(#[case] heredoc: &str, #[case] expected: &str, #[case] dynamic: bool) {
        let mut warnings = Warnings::new();
        let src = format!("curl -d @- url {heredoc}");
        let tokens = Lexer::new(&src, &mut warnings).tokenize().unwrap();
        let body = tokens
            .iter()
            .find_map(|t| match t {
                Token::Redirect { target, .. } => Some(target.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(body.to_string(), expected);
        assert_eq!(body.first_dynamic().is_some(), dynamic);
    }

    #[rstest]
    #[case("curl ${A:-${B}}/x", "A:-${B}", "/x")]
    #[case("curl ${A:-'}'}y", "A:-'}'", "y")]
    #[case("curl ${HOST}z", "HOST", "z")]
    fn test_braced_variable(#[case] src: &str, #[case] name: &str, #[case] rest: &str) {
        let mut warnings = Warnings::new();
        let tokens = Lexer::new(src, &mut warnings).tokenize().unwrap();
        let Token::Word { value, .. } = &tokens[1] else {
            panic!("expected a word, got {:?}", tokens[1]);
        };
        assert_eq!(
            value.segments(),
            [Segment::EnvVar(name.into()), Segment::Literal(rest.into())]
        );
    }

    #[rstest]
    #[case("FOO=bar", true)]
    #[case("_x=", true)]
    #[case("'FOO=bar'", false)]
    #[case("-d", false)]
    #[case("1A=b", false)]
    fn test_is_assignment(#[case] raw: &str, #[case] expected: bool) {
        assert_eq!(is_assignment(raw), expected);
    }

    #[test]
    fn test_arithmetic_is_literal() {
        let mut warnings = Warnings::new();
        let tokens = Lexer::new("curl x$((1+2))", &mut warnings).tokenize().unwrap();
        assert!(matches!(&tokens[1], Token::Word { value, .. } if value.as_literal() == Some("x$((1+2))")));
        assert!(warnings.has("unsupported-shell"));
    }

    #[rstest]
    #[case(r"\101\x42\cA", "AB\x01")]
    #[case(r"\q", r"\q")]
    #[case(r"\'", "'")]
    fn test_decode_ansi_c(#[case] body: &str, #[case] expected: &str) {
        assert_eq!(decode_ansi_c(body), expected);
    }
}

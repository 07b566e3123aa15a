//! Shell-level handling of a pasted command: quoting, statements, pipes and redirects.

pub(crate) mod lexer;

use crate::{
    error::{CurlError, Result},
    value::{ArgValue, Segment},
    warnings::Warnings,
};

use lexer::{Lexer, RedirectOp, Separator, Token, is_assignment};

/// Deepest `$(...)` nesting the lexer accepts.
pub const MAX_NESTING: usize = 16;

/// One `curl ...` invocation found in the input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurlStatement {
    /// `argv[0]` is the command name.
    pub argv: Vec<ArgValue>,
    pub stdin: Option<ArgValue>,
    pub stdin_file: Option<ArgValue>,
}

#[derive(Debug, Default)]
struct Command {
    words: Vec<(ArgValue, String, usize)>,
    redirects: Vec<(RedirectOp, ArgValue, usize)>,
}

impl Command {
    fn is_empty(&self) -> bool {
        self.words.is_empty() && self.redirects.is_empty()
    }
}

/// Splits `src` into curl statements. Everything that is not a curl invocation is
/// skipped with a warning, unless it feeds a curl command through a pipe.
pub fn split_statements(src: &str, warnings: &mut Warnings) -> Result<Vec<CurlStatement>> {
    let tokens = Lexer::new(src, warnings).tokenize()?;

    let mut pipelines: Vec<Vec<Command>> = Vec::new();
    let mut pipeline: Vec<Command> = Vec::new();
    let mut current = Command::default();
    for token in tokens {
        match token {
            Token::Word { value, raw, offset } => current.words.push((value, raw, offset)),
            Token::Redirect { op, target, offset } => current.redirects.push((op, target, offset)),
            Token::Separator(Separator::Pipe) => pipeline.push(std::mem::take(&mut current)),
            Token::Separator(_) => {
                pipeline.push(std::mem::take(&mut current));
                pipelines.push(std::mem::take(&mut pipeline));
            }
        }
    }
    pipeline.push(current);
    pipelines.push(pipeline);

    let mut statements = Vec::new();
    let mut first_other: Option<String> = None;
    for pipeline in pipelines {
        let stages: Vec<Command> = pipeline.into_iter().filter(|c| !c.is_empty()).collect();
        let mut feed: Option<Feed> = None;
        for (i, stage) in stages.iter().enumerate() {
            let words = strip_preamble(stage, warnings);
            let Some((name, _, offset)) = words.first() else {
                continue;
            };
            if is_curl_name(name) {
                let mut statement = CurlStatement {
                    argv: std::iter::once(ArgValue::from("curl"))
                        .chain(words[1..].iter().map(|(w, _, _)| w.clone()))
                        .collect(),
                    ..Default::default()
                };
                match feed.take() {
                    Some(Feed::Content(content)) => statement.stdin = Some(content),
                    Some(Feed::File(file)) => statement.stdin_file = Some(file),
                    None => {}
                }
                apply_redirects(&mut statement, stage, warnings);
                tracing::debug!(args = statement.argv.len(), "found curl statement");
                statements.push(statement);
                continue;
            }

            let feeds_curl = stages
                .get(i + 1)
                .and_then(|next| strip_preamble_quiet(next).first().map(|(n, _, _)| is_curl_name(n)))
                .unwrap_or(false);
            if feeds_curl {
                feed = stdin_feed(&words);
                if feed.is_none() {
                    warnings.push(
                        "pipe",
                        format!("cannot tell what {name} writes to curl's standard input"),
                    );
                }
            } else {
                warnings.push(
                    "extra-command",
                    format!("skipping command {name} at offset {offset}"),
                );
            }
            first_other.get_or_insert_with(|| name.to_string());
        }
    }

    if statements.is_empty() {
        return Err(CurlError::NotCurl(
            first_other.unwrap_or_else(|| "empty input".to_string()),
        ));
    }
    Ok(statements)
}

enum Feed {
    Content(ArgValue),
    File(ArgValue),
}

/// What `echo`, `printf` or `cat FILE` pipe into the next command.
fn stdin_feed(words: &[&(ArgValue, String, usize)]) -> Option<Feed> {
    let (name, _, _) = words.first()?;
    let args: Vec<ArgValue> = words[1..].iter().map(|(w, _, _)| w.clone()).collect();
    match name.as_literal()? {
        "echo" => {
            let (newline, args) = match args.split_first() {
                Some((first, rest)) if first.eq_str("-n") => (false, rest.to_vec()),
                _ => (true, args),
            };
            let mut content = ArgValue::join(&args, " ");
            if newline {
                content.push_char('\n');
            }
            Some(Feed::Content(content))
        }
        "printf" if args.len() == 1 => Some(Feed::Content(args[0].clone())),
        "cat" if args.len() == 1 => Some(Feed::File(args[0].clone())),
        _ => None,
    }
}

fn is_curl_name(name: &ArgValue) -> bool {
    match name.segments() {
        [Segment::Literal(text)] => text == "curl" || text.ends_with("/curl"),
        // `$curl` pasted from a prompt without the space
        [Segment::EnvVar(var)] => var == "curl",
        _ => false,
    }
}

fn strip_preamble_quiet(stage: &Command) -> Vec<&(ArgValue, String, usize)> {
    let skip = stage
        .words
        .iter()
        .take_while(|(value, raw, _)| is_assignment(raw) || value.eq_str("$"))
        .count();
    stage.words[skip..].iter().collect()
}

/// Drops leading `NAME=value` assignments and a stray `$` prompt.
fn strip_preamble<'c>(
    stage: &'c Command,
    warnings: &mut Warnings,
) -> Vec<&'c (ArgValue, String, usize)> {
    for (value, raw, _) in &stage.words {
        if is_assignment(raw) {
            warnings.push("command-preamble", format!("skipping variable assignment {raw}"));
        } else if value.eq_str("$") {
            warnings.push("command-preamble", "skipping copied shell prompt \"$\"");
        } else {
            break;
        }
    }
    strip_preamble_quiet(stage)
}

fn apply_redirects(statement: &mut CurlStatement, stage: &Command, warnings: &mut Warnings) {
    let mut inputs = 0;
    for (op, target, _) in &stage.redirects {
        match op {
            RedirectOp::Input => {
                statement.stdin = None;
                statement.stdin_file = Some(target.clone());
                inputs += 1;
            }
            RedirectOp::HereString | RedirectOp::HereDoc | RedirectOp::HereDocStripTabs => {
                statement.stdin_file = None;
                statement.stdin = Some(target.clone());
                inputs += 1;
            }
            RedirectOp::Output | RedirectOp::Append | RedirectOp::Duplicate => {
                warnings.push("redirect", format!("ignoring output redirect to {target}"));
            }
        }
    }
    if inputs > 1 {
        warnings.push(
            "multiple-redirects",
            format!("found {inputs} input redirects, only the last one is used"),
        );
    }
}

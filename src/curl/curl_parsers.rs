use crate::{
    curl::{CurlOption, Invocation, OPTION_TABLE, OptValue, OperationConfig, ParsedArgs, SupportedOptions},
    error::{CurlError, Result},
    value::{ArgValue, Piece},
    warnings::Warnings,
};

const CURL_CMD: &str = "curl";

pub fn is_curl(argv: &[ArgValue]) -> bool {
    argv.first().is_some_and(|name| name.eq_str(CURL_CMD))
}

struct Matcher<'a> {
    supported: Option<&'a SupportedOptions>,
    warnings: &'a mut Warnings,
    operations: Vec<OperationConfig>,
    global: OperationConfig,
}

impl Matcher<'_> {
    fn current(&mut self) -> &mut OperationConfig {
        if self.operations.is_empty() {
            self.operations.push(OperationConfig::default());
        }
        let last = self.operations.len() - 1;
        &mut self.operations[last]
    }

    fn record(&mut self, option: CurlOption, value: OptValue, spelled: String) {
        if let Some(supported) = self.supported {
            if !matches!(option, CurlOption::Url | CurlOption::Next) && !supported.contains(option) {
                self.warnings.push(
                    "unsupported-option",
                    format!("{spelled} is not a supported option, ignoring it"),
                );
                return;
            }
        }

        if option == CurlOption::Next {
            let current = self.current();
            let urls = current.count(CurlOption::Url);
            // curl ignores --next until the current section has a URL
            if value == OptValue::Bool(true)
                && urls > 0
                && urls >= current.count(CurlOption::UploadFile)
                && urls >= current.count(CurlOption::Output)
            {
                self.operations.push(OperationConfig::default());
            }
            return;
        }

        let invocation = Invocation {
            option,
            value,
            spelled,
        };
        if option.global() {
            self.global.push(invocation);
        } else {
            self.current().push(invocation);
        }
    }
}

fn dynamic_option(arg: &ArgValue) -> CurlError {
    CurlError::DynamicOption(arg.to_string())
}

/// Matches `argv` (whose first element is the command name) against curl's options.
///
/// Long options may be abbreviated to any unambiguous prefix and take their value
/// either from the next argument or after `=`. Short options can be clustered
/// (`-sSL`) and the last one may carry its value (`-XPOST`). Everything after `--`
/// is a URL.
pub fn parse_args(
    argv: &[ArgValue],
    supported: Option<&SupportedOptions>,
    warnings: &mut Warnings,
) -> Result<ParsedArgs> {
    let mut matcher = Matcher {
        supported,
        warnings,
        operations: vec![OperationConfig::default()],
        global: OperationConfig::default(),
    };

    let mut still_flags = true;
    let mut i = 1;
    while i < argv.len() {
        let arg = &argv[i];
        if still_flags && arg.starts_with("-") {
            if arg.eq_str("--") {
                still_flags = false;
            } else if arg.starts_with("--") {
                i = parse_long(&mut matcher, argv, i)?;
            } else {
                i = parse_short(&mut matcher, argv, i)?;
            }
        } else {
            if arg.segments().first().is_some_and(|s| s.is_dynamic()) {
                matcher.warnings.push(
                    "ambiguous-argument",
                    format!("{arg} could expand to an option, treating it as a URL"),
                );
            }
            matcher.record(CurlOption::Url, OptValue::Value(arg.clone()), String::new());
        }
        i += 1;
    }

    let mut operations = matcher.operations;
    if operations.len() > 1 && operations.last().is_some_and(|o| o.is_empty()) {
        operations.pop();
    }
    tracing::debug!(operations = operations.len(), "matched curl options");
    Ok(ParsedArgs {
        operations,
        global: matcher.global,
    })
}

/// Handles `argv[i]`, a `--long` option. Returns the index of the last argument used.
fn parse_long(matcher: &mut Matcher<'_>, argv: &[ArgValue], i: usize) -> Result<usize> {
    let arg = &argv[i];
    let (name, attached) = match arg.split_once("=") {
        Some((name, value)) if name.is_literal() => (name, Some(value)),
        _ => (arg.clone(), None),
    };
    let name = name.as_literal().ok_or_else(|| dynamic_option(arg))?;
    let spelling = &name[2..];
    let resolved = OPTION_TABLE.lookup_long(spelling)?;
    let option = resolved.option;
    if let Some(version) = resolved.removed_in {
        matcher.warnings.push(
            "deprecated-option",
            format!("{name} was removed in curl {version}, use {option} instead"),
        );
    }

    if !option.takes_value() {
        if attached.is_some() {
            return Err(CurlError::UnknownOption {
                option: name.to_string(),
                hint: Some("does not take a value".into()),
            });
        }
        matcher.record(option, OptValue::Bool(!resolved.negated), name.to_string());
        return Ok(i);
    }

    let (value, used) = match attached {
        Some(value) => (value, i),
        None => {
            let value = argv
                .get(i + 1)
                .ok_or_else(|| CurlError::MissingArgument(name.to_string()))?;
            (value.clone(), i + 1)
        }
    };
    matcher.record(option, OptValue::Value(value), name.to_string());
    Ok(used)
}

/// Handles `argv[i]`, a cluster of short options such as `-sSL` or `-XPOST`.
fn parse_short(matcher: &mut Matcher<'_>, argv: &[ArgValue], i: usize) -> Result<usize> {
    let arg = &argv[i];
    if arg.len() == 1 {
        return Err(CurlError::unknown("-"));
    }
    let mut used = i;
    for j in 1..arg.len() {
        let c = match arg.get(j) {
            Some(Piece::Char(c)) => c,
            _ => return Err(dynamic_option(arg)),
        };
        let spelled = format!("-{c}");
        let Some(resolved) = OPTION_TABLE.short(c) else {
            return Err(CurlError::UnknownOption {
                hint: OPTION_TABLE.changed_short(c).map(str::to_string),
                option: spelled,
            });
        };
        let option = resolved.option;
        if !option.takes_value() {
            matcher.record(option, OptValue::Bool(!resolved.negated), spelled);
            continue;
        }
        let value = if j + 1 < arg.len() {
            arg.slice_from(j + 1)
        } else {
            used = i + 1;
            argv.get(i + 1)
                .cloned()
                .ok_or_else(|| CurlError::MissingArgument(spelled.clone()))?
        };
        matcher.record(option, OptValue::Value(value), spelled);
        break;
    }
    Ok(used)
}

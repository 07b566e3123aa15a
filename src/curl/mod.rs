pub mod curl_parsers;
pub mod form;
pub mod opts;
pub mod values;

use std::collections::BTreeSet;

use serde::Serialize;

use crate::{
    error::{CurlError, Result},
    value::ArgValue,
};

pub use opts::{CurlOption, OPTION_TABLE};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OptValue {
    Bool(bool),
    Value(ArgValue),
}

impl OptValue {
    pub fn as_value(&self) -> Option<&ArgValue> {
        match self {
            OptValue::Value(v) => Some(v),
            OptValue::Bool(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptValue::Bool(b) => Some(*b),
            OptValue::Value(_) => None,
        }
    }
}

/// One option as it appeared on the command line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Invocation {
    pub option: CurlOption,
    pub value: OptValue,
    /// How the user wrote it, e.g. `-X`, `--req`, `--no-compressed`. Empty for a
    /// positional URL.
    pub spelled: String,
}

/// The options of one `--next`-separated section, in encounter order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct OperationConfig {
    invocations: Vec<Invocation>,
}

impl OperationConfig {
    /// Records an invocation. A later value replaces an earlier one unless the
    /// option accumulates, e.g. `--header`.
    pub fn push(&mut self, invocation: Invocation) {
        if !invocation.option.repeatable() {
            self.invocations.retain(|i| i.option != invocation.option);
        }
        self.invocations.push(invocation);
    }

    pub fn invocations(&self) -> &[Invocation] {
        &self.invocations
    }

    pub fn is_empty(&self) -> bool {
        self.invocations.is_empty()
    }

    pub fn filter<'o>(&self, options: &'o [CurlOption]) -> impl Iterator<Item = &Invocation> {
        self.invocations.iter().filter(move |i| options.contains(&i.option))
    }

    /// Every value given for `option`, oldest first.
    pub fn values(&self, option: CurlOption) -> impl Iterator<Item = &ArgValue> {
        self.invocations
            .iter()
            .filter(move |i| i.option == option)
            .filter_map(|i| i.value.as_value())
    }

    /// The value that wins for a non-repeatable option.
    pub fn last(&self, option: CurlOption) -> Option<&ArgValue> {
        self.values(option).last()
    }

    pub fn flag(&self, option: CurlOption) -> Option<bool> {
        self.invocations
            .iter()
            .rev()
            .find(|i| i.option == option)
            .and_then(|i| i.value.as_bool())
    }

    pub fn enabled(&self, option: CurlOption) -> bool {
        self.flag(option) == Some(true)
    }

    pub fn has(&self, option: CurlOption) -> bool {
        self.invocations.iter().any(|i| i.option == option)
    }

    pub fn count(&self, option: CurlOption) -> usize {
        self.invocations.iter().filter(|i| i.option == option).count()
    }

    pub fn last_of(&self, options: &[CurlOption]) -> Option<&Invocation> {
        self.filter(options).last()
    }

    pub fn urls(&self) -> impl Iterator<Item = &ArgValue> {
        self.values(CurlOption::Url)
    }
}

/// Result of matching one argv.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedArgs {
    pub operations: Vec<OperationConfig>,
    /// Options such as `--verbose` that apply to every operation.
    pub global: OperationConfig,
}

/// The options a code generator knows how to translate. Anything else still
/// parses, but produces an `unsupported-option` warning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupportedOptions(BTreeSet<CurlOption>);

impl SupportedOptions {
    /// What every generator handles: URLs, method, headers, basic auth and data.
    pub fn common() -> Self {
        use CurlOption::*;
        Self(
            [
                Url,
                ProtoDefault,
                Globoff,
                DisallowUsernameInUrl,
                Request,
                Get,
                Head,
                Header,
                UserAgent,
                Referer,
                Range,
                TimeCond,
                Cookie,
                Oauth2Bearer,
                User,
                Basic,
                Data,
                DataRaw,
                DataAscii,
                DataBinary,
                DataUrlencode,
                Json,
                UrlQuery,
            ]
            .into_iter()
            .collect(),
        )
    }

    pub fn with(mut self, options: impl IntoIterator<Item = CurlOption>) -> Self {
        self.0.extend(options);
        self
    }

    pub fn from_names<S: AsRef<str>>(names: impl IntoIterator<Item = S>) -> Result<Self> {
        let mut set = BTreeSet::new();
        for name in names {
            let name = name.as_ref().trim_start_matches('-');
            let option = CurlOption::from_name(name).ok_or_else(|| CurlError::unknown(name))?;
            set.insert(option);
        }
        Ok(Self(set))
    }

    pub fn contains(&self, option: CurlOption) -> bool {
        self.0.contains(&option)
    }
}

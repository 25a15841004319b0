//! # Argument Parsing
//!
//! Splits the controller's raw tokens into positional arguments and an
//! option bag.
//!
//! A `--name` token is an option. It takes the next token as its value
//! unless that token is itself `--`-prefixed or absent, in which case the
//! option is a bare [`OptionValue::Flag`] and the next token is parsed on
//! its own. Parsing never fails; each command validates what it needs.

use std::collections::BTreeMap;

use solprog_core::{ControllerError, ControllerResult};

const OPTION_PREFIX: &str = "--";

/// Value recorded for an option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    /// `--name value`
    Text(String),
    /// `--name` with no value following it.
    Flag,
}

/// A parsed controller invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandRequest {
    /// Positional arguments in encounter order. The first one is the command.
    pub positional: Vec<String>,
    /// Options by name, without the `--` prefix. Later occurrences win.
    pub options: BTreeMap<String, OptionValue>,
}

impl CommandRequest {
    /// Parse raw tokens.
    pub fn parse<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut request = Self::default();
        let mut tokens = tokens.into_iter().map(Into::into).peekable();

        while let Some(token) = tokens.next() {
            let Some(name) = token.strip_prefix(OPTION_PREFIX) else {
                request.positional.push(token);
                continue;
            };
            let value = match tokens.next_if(|next| !next.starts_with(OPTION_PREFIX)) {
                Some(next) => OptionValue::Text(next),
                None => OptionValue::Flag,
            };
            request.options.insert(name.to_string(), value);
        }

        request
    }

    /// The command name, or `""` when none was given.
    pub fn command(&self) -> &str {
        self.positional.first().map(String::as_str).unwrap_or("")
    }

    /// Raw option lookup.
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.options.get(name)
    }

    /// Trimmed text value of a required option.
    ///
    /// A bare flag or a blank value counts as missing.
    pub fn require(&self, name: &str) -> ControllerResult<String> {
        self.optional_text(name)
            .ok_or_else(|| ControllerError::MissingOption(name.to_string()))
    }

    /// Trimmed text value of an optional option, `None` if absent, blank,
    /// or given as a bare flag.
    pub fn optional_text(&self, name: &str) -> Option<String> {
        match self.get(name) {
            Some(OptionValue::Text(v)) => {
                let v = v.trim();
                (!v.is_empty()).then(|| v.to_string())
            }
            Some(OptionValue::Flag) | None => None,
        }
    }

    /// Boolean reading of an option; absent means `false`.
    pub fn flag(&self, name: &str) -> bool {
        self.get(name).map(OptionValue::as_bool).unwrap_or(false)
    }
}

impl OptionValue {
    /// `Flag` is true; text is true only for `1`, `true`, `yes` or `on`.
    pub fn as_bool(&self) -> bool {
        match self {
            OptionValue::Flag => true,
            OptionValue::Text(v) => parse_bool(v),
        }
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

//! Match expressions for label text.
//!
//! Every query in the engine compares a candidate's label against a
//! [`MatchExpression`]. A plain string literal is an exact match; the
//! operator prefixes `^=`, `$=` and `*=` turn it into a prefix, suffix or
//! substring match, mirroring CSS attribute selectors:
//!
//! ```
//! use pokeui_core::pattern::{matches, MatchExpression};
//!
//! assert!(matches(&"Complex label".into(), "Complex label"));
//! assert!(matches(&"^=Compl".into(), "Complex label"));
//! assert!(matches(&"$=abel".into(), "Complex label"));
//! assert!(matches(&"*=ex la".into(), "Complex label"));
//!
//! let re = MatchExpression::regex(r"there once.+text", "i").unwrap();
//! assert!(matches(&re, "There once was a text area."));
//! ```
//!
//! Regular expressions are compiled when the expression is built, so a
//! malformed pattern is reported where it is written rather than when it is
//! first matched.

use std::fmt;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::PatternError;

/// A label match expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "MatchSpec", into = "MatchSpec")]
pub enum MatchExpression {
    /// Case-sensitive full equality.
    Exact(String),
    /// The candidate starts with the text (`^=`).
    Prefix(String),
    /// The candidate ends with the text (`$=`).
    Suffix(String),
    /// The candidate contains the text anywhere (`*=`).
    Substring(String),
    /// The candidate contains a match for the pattern.
    Regex {
        /// The compiled pattern.
        regex: Regex,
        /// The pattern source as written.
        source: String,
        /// The flags the pattern was compiled with.
        flags: String,
    },
}

impl MatchExpression {
    /// Parses an operator-prefixed literal.
    ///
    /// `^=`, `$=` and `*=` select prefix, suffix and substring matching;
    /// anything else is an exact match on the whole string.
    pub fn literal(text: &str) -> Self {
        if let Some(rest) = text.strip_prefix("^=") {
            Self::Prefix(rest.to_string())
        } else if let Some(rest) = text.strip_prefix("$=") {
            Self::Suffix(rest.to_string())
        } else if let Some(rest) = text.strip_prefix("*=") {
            Self::Substring(rest.to_string())
        } else {
            Self::Exact(text.to_string())
        }
    }

    /// Compiles a regular expression with JavaScript-style flags.
    ///
    /// `i`, `m`, `s` and `x` change matching; `g`, `u` and `y` are accepted
    /// and have no effect on a single test.
    pub fn regex(pattern: &str, flags: &str) -> Result<Self, PatternError> {
        let mut builder = RegexBuilder::new(pattern);
        for flag in flags.chars() {
            match flag {
                'i' => {
                    builder.case_insensitive(true);
                }
                'm' => {
                    builder.multi_line(true);
                }
                's' => {
                    builder.dot_matches_new_line(true);
                }
                'x' => {
                    builder.ignore_whitespace(true);
                }
                'g' | 'u' | 'y' => {}
                other => return Err(PatternError::UnsupportedFlag(other)),
            }
        }
        let regex = builder.build().map_err(|source| PatternError::InvalidRegex {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self::Regex {
            regex,
            source: pattern.to_string(),
            flags: flags.to_string(),
        })
    }

    /// Returns true if `candidate` satisfies this expression.
    pub fn is_match(&self, candidate: &str) -> bool {
        match self {
            Self::Exact(text) => candidate == text,
            Self::Prefix(text) => candidate.starts_with(text.as_str()),
            Self::Suffix(text) => candidate.ends_with(text.as_str()),
            Self::Substring(text) => candidate.contains(text.as_str()),
            Self::Regex { regex, .. } => regex.is_match(candidate),
        }
    }
}

/// Evaluates `expr` against `candidate`.
pub fn matches(expr: &MatchExpression, candidate: &str) -> bool {
    expr.is_match(candidate)
}

impl From<&str> for MatchExpression {
    fn from(text: &str) -> Self {
        Self::literal(text)
    }
}

impl From<String> for MatchExpression {
    fn from(text: String) -> Self {
        Self::literal(&text)
    }
}

impl From<&MatchExpression> for MatchExpression {
    fn from(expr: &MatchExpression) -> Self {
        expr.clone()
    }
}

impl From<Regex> for MatchExpression {
    fn from(regex: Regex) -> Self {
        Self::Regex {
            source: regex.as_str().to_string(),
            regex,
            flags: String::new(),
        }
    }
}

impl fmt::Display for MatchExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(text) => write!(f, "'{}'", text),
            Self::Prefix(text) => write!(f, "'^={}'", text),
            Self::Suffix(text) => write!(f, "'$={}'", text),
            Self::Substring(text) => write!(f, "'*={}'", text),
            Self::Regex { source, flags, .. } => write!(f, "/{}/{}", source, flags),
        }
    }
}

/// Serialized form: a literal string or a `{ "regex", "flags" }` object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum MatchSpec {
    Literal(String),
    Regex {
        regex: String,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        flags: String,
    },
}

impl TryFrom<MatchSpec> for MatchExpression {
    type Error = PatternError;

    fn try_from(spec: MatchSpec) -> Result<Self, Self::Error> {
        match spec {
            MatchSpec::Literal(text) => Ok(Self::literal(&text)),
            MatchSpec::Regex { regex, flags } => Self::regex(&regex, &flags),
        }
    }
}

impl From<MatchExpression> for MatchSpec {
    fn from(expr: MatchExpression) -> Self {
        match expr {
            MatchExpression::Exact(text) => MatchSpec::Literal(text),
            MatchExpression::Prefix(text) => MatchSpec::Literal(format!("^={}", text)),
            MatchExpression::Suffix(text) => MatchSpec::Literal(format!("$={}", text)),
            MatchExpression::Substring(text) => MatchSpec::Literal(format!("*={}", text)),
            MatchExpression::Regex { source, flags, .. } => MatchSpec::Regex { regex: source, flags },
        }
    }
}

//! Error types shared across the engine.
//!
//! [`UiError`] is what every assertion and action on a [`Ui`](crate::ui::Ui)
//! returns on failure. The runner records its `Display` text against the
//! failing use-case, so messages name the category and expression involved.

use thiserror::Error;

use crate::host::HostError;
use crate::label::ElementCategory;

/// A malformed match expression.
#[derive(Error, Debug)]
pub enum PatternError {
    /// The regular expression did not compile.
    #[error("Invalid regular expression '{pattern}': {source}")]
    InvalidRegex {
        /// The pattern as written.
        pattern: String,
        /// The compiler's complaint.
        #[source]
        source: regex::Error,
    },

    /// A regex flag outside `imsxguy`.
    #[error("Unsupported regular expression flag '{0}'")]
    UnsupportedFlag(char),
}

/// Errors raised by queries, assertions and simulated interactions.
#[derive(Error, Debug)]
pub enum UiError {
    /// A match expression could not be built.
    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// No element of the category matched.
    #[error("No {category} matches {expr}")]
    NoMatch {
        category: ElementCategory,
        expr: String,
    },

    /// More than one element matched where exactly one was required.
    #[error("{count} {category} elements match {expr}, expected exactly one")]
    AmbiguousMatch {
        category: ElementCategory,
        expr: String,
        count: usize,
    },

    /// Elements matched where none were expected.
    #[error("Expected no {category} to match {expr}, found {count}")]
    UnexpectedMatch {
        category: ElementCategory,
        expr: String,
        count: usize,
    },

    /// The number of matching elements differed from the expected count.
    #[error("Expected {expected} {category} elements matching {expr}, found {actual}")]
    CountMismatch {
        category: ElementCategory,
        expr: String,
        expected: usize,
        actual: usize,
    },

    /// A form field's value did not satisfy the expected expression.
    #[error("Field {field} has value '{actual}', expected {expected}")]
    ValueMismatch {
        field: String,
        expected: String,
        actual: String,
    },

    /// The resolved element cannot take focus.
    #[error("Element '{label}' cannot be focused")]
    NotFocusable { label: String },

    /// A field expected to hold focus does not.
    #[error("Field {field} is not focused")]
    NotFocused { field: String },

    /// Typing or pasting with nothing focused.
    #[error("No field is focused")]
    NoFocusedField,

    /// The focused element does not accept text.
    #[error("Focused element '{label}' does not accept text input")]
    NotEditable { label: String },

    /// A grab was attempted while another element is held.
    #[error("Cannot grab another element while '{held}' is grabbed")]
    NothingToGrab { held: String },

    /// Drag or drop without a grabbed element.
    #[error("No element is grabbed")]
    NoActiveGrab,

    /// Drop while holding an element that was never dragged over a target.
    #[error("Grabbed element '{held}' has not been dragged over a target")]
    NoDropTarget { held: String },

    /// No load completed within the configured wait.
    #[error("No document load completed within {timeout_ms}ms")]
    NavigationTimeout { timeout_ms: u64 },

    /// The current location did not satisfy a location assertion.
    #[error("Expected {what} {expected}, found {actual}")]
    LocationMismatch {
        what: &'static str,
        expected: String,
        actual: String,
    },

    /// A path or href could not be resolved to a location.
    #[error("Invalid location '{href}': {source}")]
    InvalidLocation {
        href: String,
        #[source]
        source: url::ParseError,
    },

    /// The document host failed to load or clear a document.
    #[error("Host error: {0}")]
    Host(#[from] HostError),
}

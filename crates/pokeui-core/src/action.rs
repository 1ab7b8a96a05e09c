//! Action types and the action journal.
//!
//! Every assertion and interaction a use-case performs on a
//! [`Ui`](crate::ui::Ui) is described by an [`ActionType`] and recorded as an
//! [`ActionLog`]. The same vocabulary is what JSON plans are written in, so a
//! plan step and a journal entry look alike.
//!
//! # Action Types
//!
//! - **Queries**: [`ActionType::CountElements`], [`ActionType::NoElementsMatch`], [`ActionType::SomeElementsMatch`]
//! - **Field state**: [`ActionType::FieldValue`], [`ActionType::FieldFocused`]
//! - **Interaction**: [`ActionType::Click`], [`ActionType::Focus`], [`ActionType::TypeText`], [`ActionType::PasteText`]
//! - **Gestures**: [`ActionType::Grab`], [`ActionType::DragOver`], [`ActionType::Drop`]
//! - **Navigation**: [`ActionType::Refresh`], [`ActionType::WaitForLoad`], [`ActionType::LocationPath`], [`ActionType::QueryParam`], [`ActionType::Fragment`]
//! - **Logging**: [`ActionType::LogComment`]
//!
//! # Example
//!
//! ```
//! use pokeui_core::action::{ActionLog, ActionResult, ActionType};
//! use pokeui_core::label::ElementCategory;
//!
//! let action = ActionType::Click {
//!     category: ElementCategory::Button,
//!     label: "Click this".into(),
//! };
//! let log = ActionLog::new(action, ActionResult::Success, Some(3));
//! println!("Action {} at {}", log.id, log.timestamp);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::label::ElementCategory;
use crate::pattern::MatchExpression;

/// The result of performing an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionResult {
    /// The action completed successfully.
    Success,

    /// The action failed with the given error message.
    Failure(String),
}

/// Things a use-case can do to a loaded document.
///
/// Serialized as JSON with a `type` tag discriminator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ActionType {
    /// Assert the number of elements matching a label.
    CountElements {
        category: ElementCategory,
        label: MatchExpression,
        expected: usize,
    },

    /// Assert that no element matches a label.
    NoElementsMatch {
        category: ElementCategory,
        label: MatchExpression,
    },

    /// Assert that at least one element matches a label.
    SomeElementsMatch {
        category: ElementCategory,
        label: MatchExpression,
    },

    /// Assert a form field's current value.
    FieldValue {
        /// Label of the field.
        field: MatchExpression,
        /// Expected value text.
        value: MatchExpression,
    },

    /// Assert that a form field holds keyboard focus.
    FieldFocused { field: MatchExpression },

    /// Click an element.
    Click {
        category: ElementCategory,
        label: MatchExpression,
    },

    /// Focus an element without clicking it.
    Focus {
        category: ElementCategory,
        label: MatchExpression,
    },

    /// Type into the focused field, one key at a time.
    TypeText { text: String },

    /// Paste into the focused field.
    PasteText { text: String },

    /// Start dragging an element.
    Grab {
        category: ElementCategory,
        label: MatchExpression,
    },

    /// Drag the grabbed element over another.
    DragOver {
        category: ElementCategory,
        label: MatchExpression,
    },

    /// Drop the grabbed element on the current target.
    Drop,

    /// Reload the current document.
    Refresh,

    /// Wait for a pending navigation to finish loading.
    WaitForLoad,

    /// Assert the current path.
    LocationPath { path: String },

    /// Assert a query parameter of the current location.
    QueryParam { key: String, value: String },

    /// Assert the current fragment; `None` asserts there is none.
    Fragment { fragment: Option<String> },

    /// Record a comment in the journal.
    LogComment {
        /// The comment text.
        message: String,
    },
}

impl ActionType {
    /// Returns a short, static name for this action type suitable for use in
    /// tracing span metadata.
    pub fn name(&self) -> &'static str {
        match self {
            ActionType::CountElements { .. } => "count_elements",
            ActionType::NoElementsMatch { .. } => "no_elements_match",
            ActionType::SomeElementsMatch { .. } => "some_elements_match",
            ActionType::FieldValue { .. } => "field_value",
            ActionType::FieldFocused { .. } => "field_focused",
            ActionType::Click { .. } => "click",
            ActionType::Focus { .. } => "focus",
            ActionType::TypeText { .. } => "type_text",
            ActionType::PasteText { .. } => "paste_text",
            ActionType::Grab { .. } => "grab",
            ActionType::DragOver { .. } => "drag_over",
            ActionType::Drop => "drop",
            ActionType::Refresh => "refresh",
            ActionType::WaitForLoad => "wait_for_load",
            ActionType::LocationPath { .. } => "location_path",
            ActionType::QueryParam { .. } => "query_param",
            ActionType::Fragment { .. } => "fragment",
            ActionType::LogComment { .. } => "log_comment",
        }
    }
}

/// A journaled action with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLog {
    /// Unique identifier for this log entry.
    pub id: Uuid,

    /// When the action finished.
    pub timestamp: DateTime<Utc>,

    /// The action that was performed.
    pub action: ActionType,

    /// The result of the action.
    pub result: ActionResult,

    /// How long the action took in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl ActionLog {
    /// Creates a new action log entry.
    ///
    /// The entry is assigned a new UUID and timestamped with the current time.
    ///
    /// # Arguments
    ///
    /// * `action` - The action that was performed
    /// * `result` - The result of the action
    /// * `duration_ms` - How long it took, when measured
    pub fn new(action: ActionType, result: ActionResult, duration_ms: Option<u64>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            action,
            result,
            duration_ms,
        }
    }
}

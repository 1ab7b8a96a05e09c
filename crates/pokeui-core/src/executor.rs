//! Dispatching [`ActionType`] values onto a [`Ui`].
//!
//! Plans are written as lists of actions; the [`ActionExecutor`] turns each
//! one into the matching `Ui` call. The `Ui` journals the call itself, so the
//! executor only adds a tracing span and a human-readable result.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use pokeui_core::action::ActionType;
//! use pokeui_core::config::EngineConfig;
//! use pokeui_core::executor::ActionExecutor;
//! use pokeui_core::host::FixtureHost;
//! use pokeui_core::label::ElementCategory;
//! use pokeui_core::navigation::Location;
//! use pokeui_core::ui::Ui;
//!
//! #[tokio::main]
//! async fn main() {
//!     let host = Arc::new(FixtureHost::new().page("a.html", "<button>Go</button>"));
//!     let location = Location::parse("a.html").unwrap();
//!     let mut ui = Ui::load(host, location, EngineConfig::default()).await.unwrap();
//!
//!     let result = ActionExecutor::new(&mut ui)
//!         .execute(ActionType::Click {
//!             category: ElementCategory::Button,
//!             label: "Go".into(),
//!         })
//!         .await;
//!
//!     if result.success {
//!         println!("Clicked!");
//!     }
//! }
//! ```

use std::time::Instant;

use tracing::{debug, info_span, Instrument};

use crate::action::ActionType;
use crate::error::UiError;
use crate::ui::Ui;

/// Result of executing an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Whether the action completed successfully.
    pub success: bool,
    /// Human-readable description of the result.
    pub message: String,
    /// Additional data returned by the action (a count, a location).
    pub data: Option<String>,
}

impl ExecutionResult {
    /// Creates a successful result with a message.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }

    /// Creates a failure result with an error message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }

    /// Adds data to the result.
    pub fn with_data(mut self, data: String) -> Self {
        self.data = Some(data);
        self
    }
}

/// Executes actions against a borrowed [`Ui`].
pub struct ActionExecutor<'a> {
    ui: &'a mut Ui,
}

impl<'a> ActionExecutor<'a> {
    pub fn new(ui: &'a mut Ui) -> Self {
        Self { ui }
    }

    /// The `Ui` actions run against.
    pub fn ui(&self) -> &Ui {
        self.ui
    }

    /// Executes an action, folding any error into a failed result.
    pub async fn execute(&mut self, action: ActionType) -> ExecutionResult {
        match self.try_execute(action).await {
            Ok(result) => result,
            Err(e) => ExecutionResult::failure(e.to_string()),
        }
    }

    /// Executes an action, returning the error that stopped it.
    pub async fn try_execute(&mut self, action: ActionType) -> Result<ExecutionResult, UiError> {
        let span = info_span!("execute_action", action = action.name());
        async {
            let start = Instant::now();
            let result = self.execute_inner(action).await;
            debug!(
                elapsed_ms = start.elapsed().as_millis() as u64,
                success = result.is_ok(),
                "action complete"
            );
            result
        }
        .instrument(span)
        .await
    }

    async fn execute_inner(&mut self, action: ActionType) -> Result<ExecutionResult, UiError> {
        let ui = &mut *self.ui;
        match action {
            ActionType::CountElements {
                category,
                label,
                expected,
            } => {
                let message = format!("{} {} elements match {}", expected, category, label);
                ui.count_elements_with_label(category, label, expected)?;
                Ok(ExecutionResult::success(message))
            }

            ActionType::NoElementsMatch { category, label } => {
                let message = format!("No {} matches {}", category, label);
                ui.no_elements_match(category, label)?;
                Ok(ExecutionResult::success(message))
            }

            ActionType::SomeElementsMatch { category, label } => {
                let message = format!("{} elements match {}", category, label);
                let count = ui.some_elements_match(category, label)?;
                Ok(ExecutionResult::success(message).with_data(count.to_string()))
            }

            ActionType::FieldValue { field, value } => {
                let message = format!("Field {} has value {}", field, value);
                ui.field_should_have_value(field, value)?;
                Ok(ExecutionResult::success(message))
            }

            ActionType::FieldFocused { field } => {
                let message = format!("Field {} is focused", field);
                ui.field_should_be_focused(field)?;
                Ok(ExecutionResult::success(message))
            }

            ActionType::Click { category, label } => {
                let message = format!("Clicked {} {}", category, label);
                ui.click_element(category, label)?;
                Ok(ExecutionResult::success(message))
            }

            ActionType::Focus { category, label } => {
                let message = format!("Focused {} {}", category, label);
                ui.focus_element(category, label)?;
                Ok(ExecutionResult::success(message))
            }

            ActionType::TypeText { text } => {
                ui.type_into_focused_field(&text).await?;
                Ok(ExecutionResult::success(format!("Typed '{}'", text)))
            }

            ActionType::PasteText { text } => {
                ui.paste_into_focused_field(&text)?;
                Ok(ExecutionResult::success(format!("Pasted '{}'", text)))
            }

            ActionType::Grab { category, label } => {
                let message = format!("Grabbed {} {}", category, label);
                ui.grab_element(category, label)?;
                Ok(ExecutionResult::success(message))
            }

            ActionType::DragOver { category, label } => {
                let message = format!("Dragged over {} {}", category, label);
                ui.drag_grabbed_element_over(category, label).await?;
                Ok(ExecutionResult::success(message))
            }

            ActionType::Drop => {
                ui.drop_grabbed_element()?;
                Ok(ExecutionResult::success("Dropped"))
            }

            ActionType::Refresh => {
                ui.refresh().await?;
                Ok(ExecutionResult::success("Reloaded").with_data(ui.current_location().to_string()))
            }

            ActionType::WaitForLoad => {
                let location = ui.after_load().await?;
                Ok(ExecutionResult::success(format!("Loaded {}", location)).with_data(location.to_string()))
            }

            ActionType::LocationPath { path } => {
                ui.location_path_should_be(&path)?;
                Ok(ExecutionResult::success(format!("Path is {}", path)))
            }

            ActionType::QueryParam { key, value } => {
                ui.query_param_should_be(&key, &value)?;
                Ok(ExecutionResult::success(format!("Query parameter {}={}", key, value)))
            }

            ActionType::Fragment { fragment } => {
                ui.fragment_should_be(fragment.as_deref())?;
                let message = match fragment {
                    Some(fragment) => format!("Fragment is #{}", fragment),
                    None => "No fragment".to_string(),
                };
                Ok(ExecutionResult::success(message))
            }

            ActionType::LogComment { message } => {
                ui.log_comment(message.clone());
                Ok(ExecutionResult::success(message))
            }
        }
    }
}

//! The façade a use-case body drives.
//!
//! A [`Ui`] owns one loaded [`Document`] together with its input device state
//! and navigation tracker. Queries read the document; actions and assertions
//! go through the simulator and are journaled as [`ActionLog`] entries, which
//! the runner copies into the use-case report.
//!
//! ```no_run
//! use std::sync::Arc;
//! use pokeui_core::config::EngineConfig;
//! use pokeui_core::host::FixtureHost;
//! use pokeui_core::label::ElementCategory;
//! use pokeui_core::navigation::Location;
//! use pokeui_core::ui::Ui;
//!
//! # async fn demo() -> Result<(), pokeui_core::error::UiError> {
//! let host = Arc::new(FixtureHost::new().page("index.html", "<button>Go</button>"));
//! let mut ui = Ui::load(host, Location::parse("index.html")?, EngineConfig::default()).await?;
//! ui.count_elements_with_label(ElementCategory::Button, "Go", 1)?;
//! ui.click_element(ElementCategory::Button, "Go")?;
//! # Ok(())
//! # }
//! ```

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use crate::action::{ActionLog, ActionResult, ActionType};
use crate::config::EngineConfig;
use crate::dom::Document;
use crate::error::UiError;
use crate::host::DocumentHost;
use crate::interaction::{InputDeviceState, Simulator};
use crate::label::ElementCategory;
use crate::navigation::{Location, NavigationTracker, PendingNavigation};
use crate::pattern::MatchExpression;
use crate::query::{self, ResolvedElement};

/// One loaded document and everything a use-case can do to it.
pub struct Ui {
    host: Arc<dyn DocumentHost>,
    config: EngineConfig,
    document: Document,
    devices: InputDeviceState,
    navigation: NavigationTracker,
    journal: VecDeque<ActionLog>,
}

impl std::fmt::Debug for Ui {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ui")
            .field("location", &self.navigation.current().to_string())
            .field("document", &self.document)
            .field("devices", &self.devices)
            .field("journal", &self.journal.len())
            .finish()
    }
}

impl Ui {
    /// Loads `location` through `host` into a fresh context.
    pub async fn load(
        host: Arc<dyn DocumentHost>,
        location: Location,
        config: EngineConfig,
    ) -> Result<Self, UiError> {
        let document = host.load(&location).await?;
        debug!(location = %location, "document loaded");
        Ok(Self {
            host,
            config,
            document,
            devices: InputDeviceState::default(),
            navigation: NavigationTracker::new(location),
            journal: VecDeque::new(),
        })
    }

    fn record<T>(&mut self, action: ActionType, started: Instant, result: Result<T, UiError>) -> Result<T, UiError> {
        let elapsed_ms = started.elapsed().as_millis() as u64;
        let outcome = match &result {
            Ok(_) => ActionResult::Success,
            Err(e) => ActionResult::Failure(e.to_string()),
        };
        debug!(action = action.name(), elapsed_ms, success = result.is_ok(), "action complete");
        let limit = self.config.journal_limit;
        if limit > 0 {
            while self.journal.len() >= limit {
                self.journal.pop_front();
            }
            self.journal.push_back(ActionLog::new(action, outcome, Some(elapsed_ms)));
        }
        result
    }

    fn simulator(&mut self) -> Simulator<'_> {
        Simulator::new(&mut self.document, &mut self.devices, self.config.area_policy)
            .with_keystroke_delay(self.config.keystroke_delay())
    }

    /// Elements of `category` whose label satisfies `label`.
    pub fn matching(&self, category: ElementCategory, label: impl Into<MatchExpression>) -> Vec<ResolvedElement> {
        query::matching(&self.document, category, &label.into(), self.config.area_policy)
    }

    /// How many elements of `category` match `label`.
    pub fn count(&self, category: ElementCategory, label: impl Into<MatchExpression>) -> usize {
        query::count(&self.document, category, &label.into(), self.config.area_policy)
    }

    /// The one element of `category` matching `label`.
    pub fn exactly_one(
        &self,
        category: ElementCategory,
        label: impl Into<MatchExpression>,
    ) -> Result<ResolvedElement, UiError> {
        query::exactly_one(&self.document, category, &label.into(), self.config.area_policy)
    }

    /// Asserts that exactly `expected` elements match.
    pub fn count_elements_with_label(
        &mut self,
        category: ElementCategory,
        label: impl Into<MatchExpression>,
        expected: usize,
    ) -> Result<(), UiError> {
        let started = Instant::now();
        let label = label.into();
        let actual = query::count(&self.document, category, &label, self.config.area_policy);
        let result = if actual == expected {
            Ok(())
        } else {
            Err(UiError::CountMismatch {
                category,
                expr: label.to_string(),
                expected,
                actual,
            })
        };
        self.record(ActionType::CountElements { category, label, expected }, started, result)
    }

    /// Asserts that nothing matches.
    pub fn no_elements_match(&mut self, category: ElementCategory, label: impl Into<MatchExpression>) -> Result<(), UiError> {
        let started = Instant::now();
        let label = label.into();
        let result = query::none(&self.document, category, &label, self.config.area_policy);
        self.record(ActionType::NoElementsMatch { category, label }, started, result)
    }

    /// Asserts that something matches and returns how many did.
    pub fn some_elements_match(
        &mut self,
        category: ElementCategory,
        label: impl Into<MatchExpression>,
    ) -> Result<usize, UiError> {
        let started = Instant::now();
        let label = label.into();
        let result = query::any_match(&self.document, category, &label, self.config.area_policy);
        self.record(ActionType::SomeElementsMatch { category, label }, started, result)
    }

    /// The current value text of the form field labelled `field`.
    pub fn field_value(&self, field: impl Into<MatchExpression>) -> Result<String, UiError> {
        let found = self.exactly_one(ElementCategory::FormField, field)?;
        Ok(self.document.value(found.node).unwrap_or_default())
    }

    /// Asserts that the field labelled `field` has a value matching `value`.
    pub fn field_should_have_value(
        &mut self,
        field: impl Into<MatchExpression>,
        value: impl Into<MatchExpression>,
    ) -> Result<(), UiError> {
        let started = Instant::now();
        let field = field.into();
        let value = value.into();
        let result = self.field_value(&field).and_then(|actual| {
            if value.is_match(&actual) {
                Ok(())
            } else {
                Err(UiError::ValueMismatch {
                    field: field.to_string(),
                    expected: value.to_string(),
                    actual,
                })
            }
        });
        self.record(ActionType::FieldValue { field, value }, started, result)
    }

    /// Asserts that the field labelled `field` holds keyboard focus.
    pub fn field_should_be_focused(&mut self, field: impl Into<MatchExpression>) -> Result<(), UiError> {
        let started = Instant::now();
        let field = field.into();
        let result = self.exactly_one(ElementCategory::FormField, &field).and_then(|found| {
            match &self.devices.focused {
                Some(focused) if focused.node == found.node => Ok(()),
                _ => Err(UiError::NotFocused {
                    field: field.to_string(),
                }),
            }
        });
        self.record(ActionType::FieldFocused { field }, started, result)
    }

    /// Clicks the single element matching `label`.
    ///
    /// Clicking a link queues a navigation; await
    /// [`after_load`](Self::after_load) to perform it. Links to other sites
    /// or schemes dispatch their events but queue nothing.
    pub fn click_element(&mut self, category: ElementCategory, label: impl Into<MatchExpression>) -> Result<(), UiError> {
        let started = Instant::now();
        let label = label.into();
        let result = self.click_inner(category, &label);
        self.record(ActionType::Click { category, label }, started, result)
    }

    fn click_inner(&mut self, category: ElementCategory, label: &MatchExpression) -> Result<(), UiError> {
        if let Some(href) = self.simulator().click(category, label)? {
            let target = self.navigation.current().join(&href)?;
            if !target.is_on_site() {
                debug!(target = %target, "off-site link, nothing to load");
                return Ok(());
            }
            debug!(target = %target, "navigation queued");
            self.navigation.enqueue(target);
        }
        Ok(())
    }

    /// Focuses the single element matching `label`.
    pub fn focus_element(&mut self, category: ElementCategory, label: impl Into<MatchExpression>) -> Result<(), UiError> {
        let started = Instant::now();
        let label = label.into();
        let result = self.simulator().focus(category, &label);
        self.record(ActionType::Focus { category, label }, started, result)
    }

    /// Types `text` into the focused field, resolving once every key is in.
    pub async fn type_into_focused_field(&mut self, text: &str) -> Result<(), UiError> {
        let started = Instant::now();
        let result = self.simulator().type_text(text).await;
        self.record(ActionType::TypeText { text: text.to_string() }, started, result)
    }

    /// Pastes `text` into the focused field.
    pub fn paste_into_focused_field(&mut self, text: &str) -> Result<(), UiError> {
        let started = Instant::now();
        let result = self.simulator().paste_text(text);
        self.record(ActionType::PasteText { text: text.to_string() }, started, result)
    }

    /// Grabs the single element matching `label`.
    pub fn grab_element(&mut self, category: ElementCategory, label: impl Into<MatchExpression>) -> Result<(), UiError> {
        let started = Instant::now();
        let label = label.into();
        let result = self.simulator().grab(category, &label);
        self.record(ActionType::Grab { category, label }, started, result)
    }

    /// Drags the grabbed element over the single element matching `label`.
    pub async fn drag_grabbed_element_over(
        &mut self,
        category: ElementCategory,
        label: impl Into<MatchExpression>,
    ) -> Result<(), UiError> {
        let started = Instant::now();
        let label = label.into();
        let result = self.simulator().drag_over(category, &label).await;
        self.record(ActionType::DragOver { category, label }, started, result)
    }

    /// Drops the grabbed element on the element it was dragged over.
    pub fn drop_grabbed_element(&mut self) -> Result<(), UiError> {
        let started = Instant::now();
        let result = self.simulator().drop_grabbed();
        self.record(ActionType::Drop, started, result)
    }

    /// Reloads the current document and waits for the load.
    pub async fn refresh(&mut self) -> Result<(), UiError> {
        let started = Instant::now();
        self.navigation.enqueue_reload();
        let result = self.wait_for_load().await.map(|_| ());
        self.record(ActionType::Refresh, started, result)
    }

    /// Waits for the pending navigation to complete and returns the new
    /// location.
    ///
    /// Fails with [`UiError::NavigationTimeout`] when nothing completes
    /// within the configured wait, which is always the case when no
    /// navigation is pending.
    pub async fn after_load(&mut self) -> Result<Location, UiError> {
        let started = Instant::now();
        let result = self.wait_for_load().await;
        self.record(ActionType::WaitForLoad, started, result)
    }

    async fn wait_for_load(&mut self) -> Result<Location, UiError> {
        let timeout_ms = self.config.navigation_timeout_ms;
        let wait = self.config.navigation_timeout();
        let Some(pending) = self.navigation.take_pending() else {
            tokio::time::sleep(wait).await;
            return Err(UiError::NavigationTimeout { timeout_ms });
        };
        match tokio::time::timeout(wait, self.perform(pending.clone())).await {
            Ok(result) => result,
            Err(_) => {
                debug!(target = %pending.target, timeout_ms, "load timed out, navigation kept pending");
                self.navigation.requeue(pending);
                Err(UiError::NavigationTimeout { timeout_ms })
            }
        }
    }

    async fn perform(&mut self, pending: PendingNavigation) -> Result<Location, UiError> {
        if self.navigation.stays_in_document(&pending) {
            debug!(target = %pending.target, "fragment navigation");
            self.navigation.move_within(pending.target.clone());
            return Ok(pending.target);
        }
        let document = self.host.load(&pending.target).await?;
        self.document = document;
        self.devices.reset();
        self.navigation.complete(pending.target.clone());
        debug!(location = %pending.target, loads = self.navigation.loads(), "document reloaded");
        Ok(pending.target)
    }

    /// The location of the last completed navigation.
    pub fn current_location(&self) -> &Location {
        self.navigation.current()
    }

    /// Asserts the current path. A missing leading `/` is implied.
    pub fn location_path_should_be(&mut self, path: &str) -> Result<(), UiError> {
        let started = Instant::now();
        let expected = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };
        let actual = self.navigation.current().path().to_string();
        let result = if actual == expected {
            Ok(())
        } else {
            Err(UiError::LocationMismatch {
                what: "path",
                expected,
                actual,
            })
        };
        self.record(ActionType::LocationPath { path: path.to_string() }, started, result)
    }

    /// Asserts the value of a query parameter.
    pub fn query_param_should_be(&mut self, key: &str, value: &str) -> Result<(), UiError> {
        let started = Instant::now();
        let actual = self.navigation.current().query_param(key);
        let result = if actual.as_deref() == Some(value) {
            Ok(())
        } else {
            Err(UiError::LocationMismatch {
                what: "query parameter",
                expected: format!("{}={}", key, value),
                actual: match actual {
                    Some(actual) => format!("{}={}", key, actual),
                    None => format!("no '{}' parameter", key),
                },
            })
        };
        self.record(
            ActionType::QueryParam {
                key: key.to_string(),
                value: value.to_string(),
            },
            started,
            result,
        )
    }

    /// Asserts the fragment; `None` asserts there is none.
    pub fn fragment_should_be(&mut self, fragment: Option<&str>) -> Result<(), UiError> {
        let started = Instant::now();
        let actual = self.navigation.current().fragment();
        let result = if actual == fragment {
            Ok(())
        } else {
            Err(UiError::LocationMismatch {
                what: "fragment",
                expected: fragment.map_or_else(|| "none".to_string(), |f| format!("#{}", f)),
                actual: actual.map_or_else(|| "none".to_string(), |f| format!("#{}", f)),
            })
        };
        self.record(
            ActionType::Fragment {
                fragment: fragment.map(str::to_string),
            },
            started,
            result,
        )
    }

    /// Adds a comment to the journal.
    pub fn log_comment(&mut self, message: impl Into<String>) {
        let started = Instant::now();
        let _ = self.record(ActionType::LogComment { message: message.into() }, started, Ok(()));
    }

    /// The loaded document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The loaded document, for test setup that needs to change it.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Focus, grab and pointer state.
    pub fn devices(&self) -> &InputDeviceState {
        &self.devices
    }

    /// The settings this `Ui` was loaded with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Journaled actions, oldest first.
    pub fn journal(&self) -> &VecDeque<ActionLog> {
        &self.journal
    }

    /// Completed document loads, the initial one included.
    pub fn load_count(&self) -> usize {
        self.navigation.loads()
    }

    /// Empties the journal, returning its entries.
    pub fn take_journal(&mut self) -> Vec<ActionLog> {
        self.journal.drain(..).collect()
    }
}

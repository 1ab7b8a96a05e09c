//! # pokeui-core
//!
//! Label-driven UI testing: find elements by the text a person would use to
//! describe them, interact with them the way a person would, and run named
//! use-cases against freshly loaded documents.
//!
//! ## Modules
//!
//! - [`pattern`] - Label match expressions (`^=`, `$=`, `*=`, regex)
//! - [`dom`] - The in-memory document: tree, text, values and events
//! - [`label`] - Element categories and label resolution
//! - [`query`] - Counting and resolving elements by label
//! - [`interaction`] - Click, focus, typing, paste and drag-and-drop simulation
//! - [`navigation`] - Locations and pending navigations
//! - [`host`] - Where documents come from
//! - [`ui`] - The per-document façade use-cases drive
//! - [`suite`] - Suites, use-cases and the runner that chains them
//! - [`session`] - Run events, broadcast and JSON Lines persistence
//! - [`action`] - Action types and the action journal
//! - [`executor`] - Applying actions to a `Ui`
//! - [`plan`] - Declarative JSON plans
//! - [`config`] - Engine settings
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use pokeui_core::host::DirectoryHost;
//! use pokeui_core::label::ElementCategory;
//! use pokeui_core::suite::{test_document, DocumentOptions, SuiteRunner};
//!
//! #[tokio::main]
//! async fn main() {
//!     let host = Arc::new(DirectoryHost::new("site"));
//!     let report = SuiteRunner::new(host)
//!         .then(|| {
//!             test_document("test-pages/button.html", DocumentOptions { clear_on_finish: true })
//!                 .use_case("Counting clicks", |ui| Box::pin(async move {
//!                     ui.click_element(ElementCategory::Button, "Click this")?;
//!                     ui.some_elements_match(ElementCategory::Area, "1 clicks")?;
//!                     Ok(())
//!                 }))
//!         })
//!         .run()
//!         .await;
//!     println!("{} passed, {} failed", report.passed_count(), report.failed_count());
//! }
//! ```

pub mod action;
pub mod config;
pub mod dom;
pub mod error;
pub mod executor;
pub mod host;
pub mod interaction;
pub mod label;
pub mod navigation;
pub mod pattern;
pub mod plan;
pub mod query;
pub mod session;
pub mod suite;
pub mod ui;

pub use error::{PatternError, UiError};
pub use label::ElementCategory;
pub use pattern::MatchExpression;
pub use suite::{test_document, DocumentOptions, SuiteRunner};
pub use ui::Ui;

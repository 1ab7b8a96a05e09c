//! Shared fixtures for integration tests.
//!
//! Every page lives under `tests/pages/` and is served at
//! `test-pages/<name>.html`. Page scripts play the part of the page's own
//! application code.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pokeui_core::config::EngineConfig;
use pokeui_core::dom::{Document, EventKind};
use pokeui_core::host::FixtureHost;
use pokeui_core::navigation::Location;
use pokeui_core::ui::Ui;

pub const MATCHING: &str = "test-pages/matching.html";
pub const BUTTON: &str = "test-pages/button.html";
pub const INPUT: &str = "test-pages/input.html";
pub const DRAG_DROP: &str = "test-pages/drag-drop.html";
pub const NAVIGATION: &str = "test-pages/navigation.html";

/// Writes "You clicked a <tag>[#id]" into `#report` for every click.
fn report_clicks(doc: &mut Document) {
    let root = doc.root();
    doc.add_event_listener(root, EventKind::Click, |doc, event| {
        let message = format!("You clicked a {}", doc.describe(event.target));
        if let Some(report) = doc.get_element_by_id("report") {
            doc.set_text_content(report, message);
        }
    });
}

/// Keeps `#counter` at "N clicks".
fn count_clicks(doc: &mut Document) {
    let Some(button) = doc.get_element_by_id("clicker") else {
        return;
    };
    let clicks = Arc::new(AtomicUsize::new(0));
    doc.add_event_listener(button, EventKind::Click, move |doc, _event| {
        let n = clicks.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(counter) = doc.get_element_by_id("counter") {
            doc.set_text_content(counter, format!("{} clicks", n));
        }
    });
}

/// Echoes the field's value into `#echo` on every input event.
fn echo_input(doc: &mut Document) {
    let Some(field) = doc.get_element_by_id("text") else {
        return;
    };
    doc.add_event_listener(field, EventKind::Input, |doc, event| {
        let value = doc.value(event.target).unwrap_or_default();
        if let Some(echo) = doc.get_element_by_id("echo") {
            doc.set_text_content(echo, format!("You typed {}", value));
        }
    });
}

/// Reacts to drags over and drops on `#target`.
fn accept_drops(doc: &mut Document) {
    let Some(target) = doc.get_element_by_id("target") else {
        return;
    };
    for kind in [EventKind::DragEnter, EventKind::DragOver] {
        doc.add_event_listener(target, kind, |doc, event| {
            event.prevent_default();
            doc.set_text_content(event.current_target, "Drop it now");
        });
    }
    doc.add_event_listener(target, EventKind::DragLeave, |doc, event| {
        doc.set_text_content(event.current_target, "Bring it over");
    });
    doc.add_event_listener(target, EventKind::Drop, |doc, event| {
        doc.set_text_content(event.current_target, "There you go!");
    });
}

/// A host serving every test page with its script.
pub fn fixture_host() -> FixtureHost {
    FixtureHost::new()
        .scripted_page(MATCHING, include_str!("../pages/matching.html"), report_clicks)
        .scripted_page(BUTTON, include_str!("../pages/button.html"), count_clicks)
        .scripted_page(INPUT, include_str!("../pages/input.html"), echo_input)
        .scripted_page(DRAG_DROP, include_str!("../pages/drag-drop.html"), accept_drops)
        .page(NAVIGATION, include_str!("../pages/navigation.html"))
}

/// Loads one fixture page outside a runner.
pub async fn load(path: &str) -> Ui {
    load_with(path, EngineConfig::default()).await
}

pub async fn load_with(path: &str, config: EngineConfig) -> Ui {
    let host = Arc::new(fixture_host());
    Ui::load(host, Location::parse(path).unwrap(), config).await.unwrap()
}

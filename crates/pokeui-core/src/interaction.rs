//! Simulated user input.
//!
//! A [`Simulator`] borrows a document and its [`InputDeviceState`] for the
//! duration of one gesture. Each operation resolves its target through the
//! query engine, dispatches the event sequence a real user would cause, and
//! updates the device state.
//!
//! Failure never leaves the state half-updated: a failed drag-over keeps the
//! grab, and a drop without a grab changes nothing.

use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::dom::{Document, Event, EventKind, NodeId};
use crate::error::UiError;
use crate::label::{is_disabled, is_editable, is_focusable, is_link, AreaPolicy, ElementCategory};
use crate::pattern::MatchExpression;
use crate::query::{exactly_one, ResolvedElement};

/// Focus, grab and pointer state for one loaded document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InputDeviceState {
    /// The element holding keyboard focus.
    pub focused: Option<ResolvedElement>,
    /// The element being dragged.
    pub grabbed: Option<ResolvedElement>,
    /// The element last dragged over.
    pub pointer_target: Option<ResolvedElement>,
}

impl InputDeviceState {
    /// Forgets everything; called on every load.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Drives input events into a document.
pub struct Simulator<'a> {
    doc: &'a mut Document,
    devices: &'a mut InputDeviceState,
    policy: AreaPolicy,
    keystroke_delay: Duration,
}

impl<'a> Simulator<'a> {
    pub fn new(doc: &'a mut Document, devices: &'a mut InputDeviceState, policy: AreaPolicy) -> Self {
        Self {
            doc,
            devices,
            policy,
            keystroke_delay: Duration::ZERO,
        }
    }

    /// Waits this long after each typed character instead of just yielding.
    pub fn with_keystroke_delay(mut self, delay: Duration) -> Self {
        self.keystroke_delay = delay;
        self
    }

    fn resolve(&self, category: ElementCategory, expr: &MatchExpression) -> Result<ResolvedElement, UiError> {
        exactly_one(self.doc, category, expr, self.policy)
    }

    fn fire(&mut self, kind: EventKind, target: NodeId) -> Event {
        self.doc.dispatch(Event::new(kind, target))
    }

    /// Clicks the single element matching `expr`.
    ///
    /// Returns the `href` of a clicked link whose default action was not
    /// prevented; the caller turns it into a pending navigation.
    pub fn click(&mut self, category: ElementCategory, expr: &MatchExpression) -> Result<Option<String>, UiError> {
        let target = self.resolve(category, expr)?;
        let node = target.node;
        if is_disabled(self.doc, node) {
            debug!(label = %target.label, "click on disabled control ignored");
            return Ok(None);
        }
        self.fire(EventKind::PointerDown, node);
        self.fire(EventKind::MouseDown, node);
        if is_focusable(self.doc, node) {
            self.focus_node(target.clone());
        }
        self.fire(EventKind::PointerUp, node);
        self.fire(EventKind::MouseUp, node);
        let click = self.fire(EventKind::Click, node);
        debug!(label = %target.label, element = %self.doc.describe(node), "clicked");

        if click.default_prevented() || !is_link(self.doc, node) {
            return Ok(None);
        }
        Ok(self.doc.attribute(node, "href").map(str::to_string))
    }

    /// Moves keyboard focus to the single element matching `expr`.
    pub fn focus(&mut self, category: ElementCategory, expr: &MatchExpression) -> Result<(), UiError> {
        let target = self.resolve(category, expr)?;
        if !is_focusable(self.doc, target.node) {
            return Err(UiError::NotFocusable { label: target.label });
        }
        self.focus_node(target);
        Ok(())
    }

    fn focus_node(&mut self, target: ResolvedElement) {
        if let Some(previous) = &self.devices.focused {
            if previous.node == target.node {
                return;
            }
            let previous = previous.node;
            if self.doc.is_connected(previous) {
                self.fire(EventKind::Blur, previous);
            }
        }
        let node = target.node;
        self.devices.focused = Some(target);
        self.fire(EventKind::Focus, node);
    }

    fn editable_focus(&self) -> Result<ResolvedElement, UiError> {
        let focused = self
            .devices
            .focused
            .clone()
            .filter(|focused| self.doc.is_connected(focused.node))
            .ok_or(UiError::NoFocusedField)?;
        if !is_editable(self.doc, focused.node) {
            return Err(UiError::NotEditable { label: focused.label });
        }
        Ok(focused)
    }

    /// Types `text` one character at a time into the focused field.
    ///
    /// Each character produces `keydown`, an `input` carrying the character
    /// and `keyup`, then yields so listeners scheduled by the page can run.
    /// A listener that prevents the default on `keydown` swallows that
    /// character.
    pub async fn type_text(&mut self, text: &str) -> Result<(), UiError> {
        let field = self.editable_focus()?;
        let node = field.node;
        for ch in text.chars() {
            let key = ch.to_string();
            let keydown = self.doc.dispatch(Event::new(EventKind::KeyDown, node).with_key(key.as_str()));
            if !keydown.default_prevented() {
                let mut value = self.doc.value(node).unwrap_or_default();
                value.push(ch);
                self.doc.set_value(node, value);
                self.doc.dispatch(
                    Event::new(EventKind::Input, node)
                        .with_data(key.as_str())
                        .with_input_type("insertText"),
                );
            }
            self.doc.dispatch(Event::new(EventKind::KeyUp, node).with_key(key));
            if self.keystroke_delay.is_zero() {
                tokio::task::yield_now().await;
            } else {
                tokio::time::sleep(self.keystroke_delay).await;
            }
        }
        debug!(field = %field.label, chars = text.chars().count(), "typed");
        Ok(())
    }

    /// Appends `text` to the focused field in one step.
    pub fn paste_text(&mut self, text: &str) -> Result<(), UiError> {
        let field = self.editable_focus()?;
        let node = field.node;
        let paste = self.doc.dispatch(Event::new(EventKind::Paste, node).with_data(text));
        if paste.default_prevented() {
            debug!(field = %field.label, "paste prevented by page");
            return Ok(());
        }
        let mut value = self.doc.value(node).unwrap_or_default();
        value.push_str(text);
        self.doc.set_value(node, value);
        self.doc.dispatch(
            Event::new(EventKind::Input, node)
                .with_data(text)
                .with_input_type("insertFromPaste"),
        );
        debug!(field = %field.label, "pasted");
        Ok(())
    }

    /// Starts dragging the single element matching `expr`.
    pub fn grab(&mut self, category: ElementCategory, expr: &MatchExpression) -> Result<(), UiError> {
        if let Some(held) = &self.devices.grabbed {
            return Err(UiError::NothingToGrab {
                held: held.label.clone(),
            });
        }
        let source = self.resolve(category, expr)?;
        let node = source.node;
        self.devices.grabbed = Some(source);
        self.fire(EventKind::PointerDown, node);
        self.fire(EventKind::DragStart, node);
        Ok(())
    }

    /// Moves the grabbed element over the single element matching `expr`.
    pub async fn drag_over(&mut self, category: ElementCategory, expr: &MatchExpression) -> Result<(), UiError> {
        let source = self.devices.grabbed.clone().ok_or(UiError::NoActiveGrab)?;
        let target = self.resolve(category, expr)?;
        if let Some(previous) = self.devices.pointer_target.take() {
            if previous.node != target.node && self.doc.is_connected(previous.node) {
                self.fire(EventKind::DragLeave, previous.node);
            }
        }
        let node = target.node;
        self.devices.pointer_target = Some(target);
        self.fire(EventKind::DragEnter, node);
        self.fire(EventKind::DragOver, node);
        self.fire(EventKind::Drag, source.node);
        tokio::task::yield_now().await;
        Ok(())
    }

    /// Drops the grabbed element onto the last drag-over target.
    pub fn drop_grabbed(&mut self) -> Result<(), UiError> {
        let source = self.devices.grabbed.clone().ok_or(UiError::NoActiveGrab)?;
        let target = self
            .devices
            .pointer_target
            .clone()
            .ok_or_else(|| UiError::NoDropTarget {
                held: source.label.clone(),
            })?;
        self.fire(EventKind::Drop, target.node);
        self.fire(EventKind::DragEnd, source.node);
        self.devices.grabbed = None;
        self.devices.pointer_target = None;
        debug!(source = %source.label, target = %target.label, "dropped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn record(doc: &mut Document, log: &Arc<Mutex<Vec<String>>>, kinds: &[EventKind]) {
        let root = doc.root();
        for &kind in kinds {
            let log = log.clone();
            doc.add_event_listener(root, kind, move |doc, event| {
                log.lock().unwrap().push(format!("{}:{}", event.kind.name(), doc.describe(event.target)));
            });
        }
    }

    fn expr(text: &str) -> MatchExpression {
        MatchExpression::from(text)
    }

    #[test]
    fn test_click_event_sequence() {
        let mut doc = Document::parse("<button id='b'>Go</button>");
        let log = Arc::new(Mutex::new(Vec::new()));
        record(
            &mut doc,
            &log,
            &[EventKind::PointerDown, EventKind::MouseDown, EventKind::PointerUp, EventKind::MouseUp, EventKind::Click],
        );
        let mut devices = InputDeviceState::default();
        let href = Simulator::new(&mut doc, &mut devices, AreaPolicy::default())
            .click(ElementCategory::Button, &expr("Go"))
            .unwrap();
        assert_eq!(href, None);
        assert_eq!(
            *log.lock().unwrap(),
            ["pointerdown:button#b", "mousedown:button#b", "pointerup:button#b", "mouseup:button#b", "click:button#b"]
        );
        assert_eq!(devices.focused.unwrap().label, "Go");
    }

    #[test]
    fn test_click_disabled_dispatches_nothing() {
        let mut doc = Document::parse("<button disabled>Off</button>");
        let log = Arc::new(Mutex::new(Vec::new()));
        record(&mut doc, &log, &[EventKind::Click]);
        let mut devices = InputDeviceState::default();
        Simulator::new(&mut doc, &mut devices, AreaPolicy::default())
            .click(ElementCategory::Button, &expr("Off"))
            .unwrap();
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_link_click_returns_href_unless_prevented() {
        let mut doc = Document::parse("<a href='?test=me'>Test param</a><a id='x' href='other.html'>Stay</a>");
        let stay = doc.get_element_by_id("x").unwrap();
        doc.add_event_listener(stay, EventKind::Click, |_, event| event.prevent_default());
        let mut devices = InputDeviceState::default();
        let mut sim = Simulator::new(&mut doc, &mut devices, AreaPolicy::default());
        assert_eq!(sim.click(ElementCategory::Link, &expr("Test param")).unwrap().as_deref(), Some("?test=me"));
        assert_eq!(sim.click(ElementCategory::Link, &expr("Stay")).unwrap(), None);
    }

    #[test]
    fn test_focus_moves_with_blur() {
        let mut doc = Document::parse("<input aria-label='One'><input aria-label='Two'><p tabindex='-1'>Para</p><div>Plain</div>");
        let log = Arc::new(Mutex::new(Vec::new()));
        let fields = doc.get_elements_by_tag("input");
        for &field in &fields {
            for kind in [EventKind::Focus, EventKind::Blur] {
                let log = log.clone();
                doc.add_event_listener(field, kind, move |doc, event| {
                    let name = doc.attribute(event.target, "aria-label").unwrap_or_default().to_string();
                    log.lock().unwrap().push(format!("{}:{}", event.kind.name(), name));
                });
            }
        }
        let mut devices = InputDeviceState::default();
        let mut sim = Simulator::new(&mut doc, &mut devices, AreaPolicy::default());
        sim.focus(ElementCategory::FormField, &expr("One")).unwrap();
        sim.focus(ElementCategory::FormField, &expr("Two")).unwrap();
        sim.focus(ElementCategory::Any, &expr("Para")).unwrap();
        let err = sim.focus(ElementCategory::Area, &expr("Plain")).unwrap_err();
        assert!(matches!(err, UiError::NotFocusable { ref label } if label == "Plain"));
        assert_eq!(*log.lock().unwrap(), ["focus:One", "blur:One", "focus:Two", "blur:Two"]);
        assert_eq!(devices.focused.unwrap().label, "Para");
    }

    #[tokio::test]
    async fn test_type_appends_per_character() {
        let mut doc = Document::parse("<input aria-label='Name' value='ab'>");
        let input = doc.get_elements_by_tag("input")[0];
        let inputs = Arc::new(Mutex::new(Vec::new()));
        let seen = inputs.clone();
        doc.add_event_listener(input, EventKind::Input, move |doc, event| {
            seen.lock().unwrap().push((event.data.clone().unwrap(), doc.value(event.target).unwrap()));
        });
        let mut devices = InputDeviceState::default();
        let mut sim = Simulator::new(&mut doc, &mut devices, AreaPolicy::default());
        sim.focus(ElementCategory::FormField, &expr("Name")).unwrap();
        sim.type_text("cd").await.unwrap();
        assert_eq!(doc.value(input).as_deref(), Some("abcd"));
        assert_eq!(
            *inputs.lock().unwrap(),
            [("c".to_string(), "abc".to_string()), ("d".to_string(), "abcd".to_string())]
        );
    }

    #[tokio::test]
    async fn test_type_requires_editable_focus() {
        let mut doc = Document::parse("<button>Go</button><select aria-label='Pick'><option>a</option></select>");
        let mut devices = InputDeviceState::default();
        let mut sim = Simulator::new(&mut doc, &mut devices, AreaPolicy::default());
        assert!(matches!(sim.type_text("x").await, Err(UiError::NoFocusedField)));
        sim.focus(ElementCategory::FormField, &expr("Pick")).unwrap();
        assert!(matches!(sim.type_text("x").await, Err(UiError::NotEditable { .. })));
        assert!(matches!(sim.paste_text("x"), Err(UiError::NotEditable { .. })));
    }

    #[test]
    fn test_paste_single_input_event() {
        let mut doc = Document::parse("<textarea aria-label='Notes'>a</textarea>");
        let area = doc.get_elements_by_tag("textarea")[0];
        let types = Arc::new(Mutex::new(Vec::new()));
        let seen = types.clone();
        doc.add_event_listener(area, EventKind::Input, move |_, event| {
            seen.lock().unwrap().push(event.input_type.unwrap_or_default());
        });
        let mut devices = InputDeviceState::default();
        let mut sim = Simulator::new(&mut doc, &mut devices, AreaPolicy::default());
        sim.focus(ElementCategory::FormField, &expr("Notes")).unwrap();
        sim.paste_text("bc").unwrap();
        assert_eq!(doc.value(area).as_deref(), Some("abc"));
        assert_eq!(*types.lock().unwrap(), ["insertFromPaste"]);
    }

    #[tokio::test]
    async fn test_gesture_state_machine() {
        let mut doc = Document::parse("<div>Drag me</div><div>Bring it over</div><div>Elsewhere</div>");
        let mut devices = InputDeviceState::default();
        let mut sim = Simulator::new(&mut doc, &mut devices, AreaPolicy::default());

        assert!(matches!(sim.drop_grabbed(), Err(UiError::NoActiveGrab)));
        assert!(matches!(
            sim.drag_over(ElementCategory::Any, &expr("Bring it over")).await,
            Err(UiError::NoActiveGrab)
        ));

        sim.grab(ElementCategory::Any, &expr("Drag me")).unwrap();
        let err = sim.grab(ElementCategory::Any, &expr("Elsewhere")).unwrap_err();
        assert!(matches!(err, UiError::NothingToGrab { ref held } if held == "Drag me"));
        assert!(matches!(sim.drop_grabbed(), Err(UiError::NoDropTarget { .. })));

        assert!(sim.drag_over(ElementCategory::Any, &expr("Missing")).await.is_err());
        sim.drag_over(ElementCategory::Any, &expr("Bring it over")).await.unwrap();
        sim.drop_grabbed().unwrap();
        assert!(matches!(sim.drop_grabbed(), Err(UiError::NoActiveGrab)));
        assert_eq!(devices, InputDeviceState::default());
    }

    #[tokio::test]
    async fn test_failed_drag_over_keeps_grab() {
        let mut doc = Document::parse("<div>Drag me</div>");
        let mut devices = InputDeviceState::default();
        let mut sim = Simulator::new(&mut doc, &mut devices, AreaPolicy::default());
        sim.grab(ElementCategory::Any, &expr("Drag me")).unwrap();
        assert!(sim.drag_over(ElementCategory::Any, &expr("Nowhere")).await.is_err());
        assert_eq!(devices.grabbed.unwrap().label, "Drag me");
        assert!(devices.pointer_target.is_none());
    }

    #[tokio::test]
    async fn test_drag_leave_on_target_change() {
        let mut doc = Document::parse("<div>Drag me</div><div id='a'>First</div><div id='b'>Second</div>");
        let log = Arc::new(Mutex::new(Vec::new()));
        record(&mut doc, &log, &[EventKind::DragEnter, EventKind::DragLeave, EventKind::Drop]);
        let mut devices = InputDeviceState::default();
        let mut sim = Simulator::new(&mut doc, &mut devices, AreaPolicy::default());
        sim.grab(ElementCategory::Any, &expr("Drag me")).unwrap();
        sim.drag_over(ElementCategory::Any, &expr("First")).await.unwrap();
        sim.drag_over(ElementCategory::Any, &expr("Second")).await.unwrap();
        sim.drop_grabbed().unwrap();
        assert_eq!(
            *log.lock().unwrap(),
            ["dragenter:div#a", "dragleave:div#a", "dragenter:div#b", "drop:div#b"]
        );
    }
}

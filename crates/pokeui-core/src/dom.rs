//! In-memory document model.
//!
//! A [`Document`] is an arena of nodes parsed from markup. It is the
//! DOM-like collaborator the rest of the engine works against: the label
//! resolver reads element names, attributes, text and form values from it,
//! and the interaction simulator mutates form values and dispatches events
//! through it.
//!
//! Page behaviour (what a click on a button actually *does*) is expressed as
//! event listeners installed on the document, usually by a page script
//! registered with a [`FixtureHost`](crate::host::FixtureHost):
//!
//! ```
//! use pokeui_core::dom::{Document, EventKind};
//!
//! let mut doc = Document::parse(r#"<button id="b">Go</button><p id="out"></p>"#);
//! let button = doc.get_element_by_id("b").unwrap();
//! let out = doc.get_element_by_id("out").unwrap();
//! doc.add_event_listener(button, EventKind::Click, move |doc, _event| {
//!     doc.set_text_content(out, "clicked");
//! });
//! doc.dispatch(pokeui_core::dom::Event::new(EventKind::Click, button));
//! assert_eq!(doc.text_content(out), "clicked");
//! ```
//!
//! Node ids index the arena of one document only. Removing content detaches
//! nodes but never reuses their ids.

use std::fmt;
use std::sync::Arc;

use scraper::{ElementRef, Html, Node as HtmlNode};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Elements whose content is never text.
const NON_RENDERED_TAGS: &[&str] = &[
    "head", "script", "style", "template", "noscript", "title", "meta", "link",
];

/// Phrasing elements that do not start a new block of text.
const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "br", "button", "cite", "code", "data", "dfn", "em", "i",
    "img", "input", "kbd", "label", "mark", "meter", "option", "output", "progress", "q", "s",
    "samp", "select", "small", "span", "strong", "sub", "sup", "textarea", "time", "u", "var",
    "wbr",
];

/// Returns true for phrasing (inline) element names.
pub fn is_inline_tag(tag: &str) -> bool {
    INLINE_TAGS.contains(&tag)
}

/// Collapses runs of whitespace to single spaces and trims the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Identifies a node within one [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    /// The arena index of this node.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Element name, attributes and form state.
#[derive(Debug, Clone)]
pub struct ElementData {
    tag: String,
    attrs: Vec<(String, String)>,
    value: Option<String>,
}

impl ElementData {
    /// The lowercase element name.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Looks up an attribute value.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// The payload of a node.
#[derive(Debug, Clone)]
pub enum NodeData {
    /// The document root.
    Document,
    /// An element.
    Element(ElementData),
    /// A run of character data.
    Text(String),
}

#[derive(Debug)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// The kinds of events the simulator dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    PointerDown,
    MouseDown,
    PointerUp,
    MouseUp,
    Click,
    Focus,
    Blur,
    KeyDown,
    KeyUp,
    Input,
    Paste,
    DragStart,
    Drag,
    DragEnter,
    DragOver,
    DragLeave,
    Drop,
    DragEnd,
}

impl EventKind {
    /// The DOM event type name.
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::PointerDown => "pointerdown",
            EventKind::MouseDown => "mousedown",
            EventKind::PointerUp => "pointerup",
            EventKind::MouseUp => "mouseup",
            EventKind::Click => "click",
            EventKind::Focus => "focus",
            EventKind::Blur => "blur",
            EventKind::KeyDown => "keydown",
            EventKind::KeyUp => "keyup",
            EventKind::Input => "input",
            EventKind::Paste => "paste",
            EventKind::DragStart => "dragstart",
            EventKind::Drag => "drag",
            EventKind::DragEnter => "dragenter",
            EventKind::DragOver => "dragover",
            EventKind::DragLeave => "dragleave",
            EventKind::Drop => "drop",
            EventKind::DragEnd => "dragend",
        }
    }

    /// Focus events stay on their target; everything else bubbles.
    pub fn bubbles(&self) -> bool {
        !matches!(self, EventKind::Focus | EventKind::Blur)
    }
}

/// An event travelling from its target up through its ancestors.
#[derive(Debug, Clone)]
pub struct Event {
    /// What happened.
    pub kind: EventKind,
    /// The node the event was dispatched on.
    pub target: NodeId,
    /// The node whose listeners are currently running.
    pub current_target: NodeId,
    /// The key for keyboard events.
    pub key: Option<String>,
    /// Inserted text for input and paste events.
    pub data: Option<String>,
    /// `insertText` or `insertFromPaste` for input events.
    pub input_type: Option<&'static str>,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl Event {
    /// Creates an event aimed at `target`.
    pub fn new(kind: EventKind, target: NodeId) -> Self {
        Self {
            kind,
            target,
            current_target: target,
            key: None,
            data: None,
            input_type: None,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    /// Sets the key of a keyboard event.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Sets the inserted text.
    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Sets the input type of an input event.
    pub fn with_input_type(mut self, input_type: &'static str) -> Self {
        self.input_type = Some(input_type);
        self
    }

    /// Cancels the default action (link navigation for clicks).
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Whether a listener cancelled the default action.
    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Stops the event from reaching further ancestors.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }
}

/// An installed event listener.
pub type Listener = Arc<dyn Fn(&mut Document, &mut Event) + Send + Sync>;

struct Registration {
    node: NodeId,
    kind: EventKind,
    listener: Listener,
}

/// A mutable document tree.
pub struct Document {
    nodes: Vec<Node>,
    listeners: Vec<Registration>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.nodes.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Document {
    /// Creates a document holding only its root node.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                data: NodeData::Document,
                parent: None,
                children: Vec::new(),
            }],
            listeners: Vec::new(),
        }
    }

    /// Parses an HTML document.
    ///
    /// Parsing never fails; malformed markup is repaired the way browsers
    /// repair it, so `<html>`, `<head>` and `<body>` always exist.
    pub fn parse(markup: &str) -> Self {
        let html = Html::parse_document(markup);
        let mut doc = Self::new();
        let root_element = html.root_element();
        let html_id = doc.push(
            NodeData::Element(element_data(root_element)),
            Some(doc.root()),
        );
        doc.import_children(root_element, html_id);
        doc.init_form_values();
        trace!(nodes = doc.nodes.len(), "document parsed");
        doc
    }

    fn import_children(&mut self, parent_ref: ElementRef<'_>, parent: NodeId) {
        for child in parent_ref.children() {
            if let Some(element) = ElementRef::wrap(child) {
                let id = self.push(NodeData::Element(element_data(element)), Some(parent));
                self.import_children(element, id);
            } else if let HtmlNode::Text(text) = child.value() {
                self.push(NodeData::Text(text.to_string()), Some(parent));
            }
        }
    }

    fn init_form_values(&mut self) {
        for node in self.elements() {
            let initial = match self.tag(node) {
                Some("input") => Some(self.attribute(node, "value").unwrap_or_default().to_string()),
                Some("textarea") => Some(self.text_content(node)),
                _ => None,
            };
            if let Some(value) = initial {
                if let NodeData::Element(el) = &mut self.nodes[node.0].data {
                    el.value = Some(value);
                }
            }
        }
    }

    fn push(&mut self, data: NodeData, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            data,
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        id
    }

    /// The document root.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// The `<body>` element, if present.
    pub fn body(&self) -> Option<NodeId> {
        self.elements()
            .into_iter()
            .find(|&node| self.tag(node) == Some("body"))
    }

    /// The node's payload.
    pub fn data(&self, node: NodeId) -> &NodeData {
        &self.nodes[node.0].data
    }

    /// The element payload, if `node` is an element.
    pub fn element(&self, node: NodeId) -> Option<&ElementData> {
        match &self.nodes.get(node.0)?.data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    /// The element name, if `node` is an element.
    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(ElementData::tag)
    }

    /// Reads an attribute.
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)?.attr(name)
    }

    /// Returns true if the attribute is present, whatever its value.
    pub fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.attribute(node, name).is_some()
    }

    /// Reads an attribute, treating blank values as absent.
    pub fn non_empty_attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.attribute(node, name)
            .map(collapse_whitespace)
            .filter(|value| !value.is_empty())
    }

    /// Sets or replaces an attribute.
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: impl Into<String>) {
        let value = value.into();
        if let NodeData::Element(el) = &mut self.nodes[node.0].data {
            match el.attrs.iter_mut().find(|(key, _)| key == name) {
                Some(entry) => entry.1 = value,
                None => el.attrs.push((name.to_string(), value)),
            }
        }
    }

    /// Removes an attribute.
    pub fn remove_attribute(&mut self, node: NodeId, name: &str) {
        if let NodeData::Element(el) = &mut self.nodes[node.0].data {
            el.attrs.retain(|(key, _)| key != name);
        }
    }

    /// The parent node.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0)?.parent
    }

    /// The direct children of a node.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    /// Ancestors from the parent up to the root.
    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(node), move |&current| self.parent(current))
    }

    /// Descendants of `node` in document order, excluding `node`.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[node.0].children.iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.nodes[current.0].children.iter().rev().copied());
        }
        out
    }

    /// Every element attached to the document, in document order.
    pub fn elements(&self) -> Vec<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .filter(|&node| self.element(node).is_some())
            .collect()
    }

    /// Returns true if `node` is still reachable from the root.
    pub fn is_connected(&self, node: NodeId) -> bool {
        if node.0 >= self.nodes.len() {
            return false;
        }
        node == self.root() || self.ancestors(node).any(|ancestor| ancestor == self.root())
    }

    /// Finds the first element with the given `id` attribute.
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.elements()
            .into_iter()
            .find(|&node| self.attribute(node, "id") == Some(id))
    }

    /// All elements with the given name, in document order.
    pub fn get_elements_by_tag(&self, tag: &str) -> Vec<NodeId> {
        self.elements()
            .into_iter()
            .filter(|&node| self.tag(node) == Some(tag))
            .collect()
    }

    /// Creates a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(
            NodeData::Element(ElementData {
                tag: tag.to_ascii_lowercase(),
                attrs: Vec::new(),
                value: None,
            }),
            None,
        )
    }

    /// Appends a detached node to `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Removes a node from its parent.
    pub fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|&child| child != node);
        }
    }

    /// Concatenation of every text node below `node`, unnormalised.
    pub fn text_content(&self, node: NodeId) -> String {
        if let NodeData::Text(text) = &self.nodes[node.0].data {
            return text.clone();
        }
        self.descendants(node)
            .into_iter()
            .filter_map(|child| match &self.nodes[child.0].data {
                NodeData::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Replaces the children of `node` with a single text node.
    pub fn set_text_content(&mut self, node: NodeId, text: impl Into<String>) {
        for child in std::mem::take(&mut self.nodes[node.0].children) {
            self.nodes[child.0].parent = None;
        }
        let text = text.into();
        if !text.is_empty() {
            self.push(NodeData::Text(text), Some(node));
        }
    }

    /// The element's own text nodes, whitespace-collapsed.
    pub fn direct_text(&self, node: NodeId) -> String {
        let raw: Vec<&str> = self.nodes[node.0]
            .children
            .iter()
            .filter_map(|child| match &self.nodes[child.0].data {
                NodeData::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect();
        collapse_whitespace(&raw.join(""))
    }

    /// The text a reader would see inside `node`, whitespace-collapsed.
    ///
    /// Non-rendered elements, `hidden` elements and the contents of
    /// `textarea` and `select` are skipped; block elements are separated by
    /// a space.
    pub fn visible_text(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, false, &mut out);
        collapse_whitespace(&out)
    }

    /// Like [`visible_text`](Self::visible_text), but images contribute
    /// their `alt` text and elements with an `aria-label` contribute that
    /// label instead of their content.
    pub fn accessible_text(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, true, &mut out);
        collapse_whitespace(&out)
    }

    fn collect_text(&self, node: NodeId, accessible: bool, out: &mut String) {
        for &child in &self.nodes[node.0].children {
            match &self.nodes[child.0].data {
                NodeData::Text(text) => out.push_str(text),
                NodeData::Element(el) => {
                    let tag = el.tag();
                    if NON_RENDERED_TAGS.contains(&tag)
                        || matches!(tag, "textarea" | "select")
                        || el.attr("hidden").is_some()
                    {
                        continue;
                    }
                    if accessible {
                        if el.attr("aria-hidden") == Some("true") {
                            continue;
                        }
                        let substitute = el
                            .attr("aria-label")
                            .or(if tag == "img" { el.attr("alt") } else { None });
                        if let Some(substitute) = substitute {
                            out.push(' ');
                            out.push_str(substitute);
                            out.push(' ');
                            continue;
                        }
                    }
                    let block = !is_inline_tag(tag);
                    if block {
                        out.push(' ');
                    }
                    self.collect_text(child, accessible, out);
                    if block {
                        out.push(' ');
                    }
                }
                NodeData::Document => {}
            }
        }
    }

    /// The current value of a form control.
    ///
    /// Inputs and text areas report their edited value; a `select` reports
    /// the text of its selected option (the first option when none is
    /// marked `selected`). Other nodes have no value.
    pub fn value(&self, node: NodeId) -> Option<String> {
        let el = self.element(node)?;
        if el.tag() == "select" {
            let options = self
                .descendants(node)
                .into_iter()
                .filter(|&child| self.tag(child) == Some("option"))
                .collect::<Vec<_>>();
            let selected = options
                .iter()
                .copied()
                .find(|&option| self.has_attribute(option, "selected"))
                .or_else(|| options.first().copied())?;
            return Some(collapse_whitespace(&self.text_content(selected)));
        }
        el.value.clone()
    }

    /// Overwrites the value of an input or text area.
    pub fn set_value(&mut self, node: NodeId, value: impl Into<String>) {
        if let NodeData::Element(el) = &mut self.nodes[node.0].data {
            if matches!(el.tag.as_str(), "input" | "textarea") {
                el.value = Some(value.into());
            }
        }
    }

    /// Installs a listener for `kind` events reaching `node`.
    pub fn add_event_listener<F>(&mut self, node: NodeId, kind: EventKind, listener: F)
    where
        F: Fn(&mut Document, &mut Event) + Send + Sync + 'static,
    {
        self.listeners.push(Registration {
            node,
            kind,
            listener: Arc::new(listener),
        });
    }

    /// Dispatches an event at its target, bubbling through ancestors.
    ///
    /// Listeners run synchronously and may mutate the document. Returns the
    /// event after dispatch so callers can inspect `default_prevented`.
    pub fn dispatch(&mut self, mut event: Event) -> Event {
        let mut path = vec![event.target];
        path.extend(self.ancestors(event.target));
        for node in path {
            let listeners: Vec<Listener> = self
                .listeners
                .iter()
                .filter(|registration| registration.node == node && registration.kind == event.kind)
                .map(|registration| registration.listener.clone())
                .collect();
            event.current_target = node;
            for listener in listeners {
                listener(self, &mut event);
            }
            if event.propagation_stopped || !event.kind.bubbles() {
                break;
            }
        }
        trace!(event = event.kind.name(), target = %event.target, "event dispatched");
        event
    }

    /// A short description such as `div#fake-region`, used in messages.
    pub fn describe(&self, node: NodeId) -> String {
        match self.element(node) {
            Some(el) => match el.attr("id") {
                Some(id) => format!("{}#{}", el.tag(), id),
                None => el.tag().to_string(),
            },
            None => node.to_string(),
        }
    }
}

fn element_data(element: ElementRef<'_>) -> ElementData {
    let el = element.value();
    ElementData {
        tag: el.name().to_ascii_lowercase(),
        attrs: el
            .attrs()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect(),
        value: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_parse_builds_html_body() {
        let doc = Document::parse("<p id='a'>Hello</p>");
        let body = doc.body().unwrap();
        let p = doc.get_element_by_id("a").unwrap();
        assert_eq!(doc.parent(p), Some(body));
        assert_eq!(doc.text_content(p), "Hello");
        assert!(doc.is_connected(p));
    }

    #[test]
    fn test_visible_text_collapses_and_skips() {
        let doc = Document::parse(
            "<div id='d'>  Complex\n   <b>label</b><script>ignored()</script>\
             <textarea>inside</textarea><span hidden>gone</span></div>",
        );
        let d = doc.get_element_by_id("d").unwrap();
        assert_eq!(doc.visible_text(d), "Complex label");
    }

    #[test]
    fn test_block_elements_are_separated() {
        let doc = Document::parse("<div id='d'><p>One</p><p>Two</p></div>");
        let d = doc.get_element_by_id("d").unwrap();
        assert_eq!(doc.visible_text(d), "One Two");
    }

    #[test]
    fn test_accessible_text_uses_alt_and_aria_label() {
        let doc = Document::parse(
            "<button id='b'><img alt='😁'></button><a id='a' href='#'><i aria-label='Home'>⌂</i></a>",
        );
        let b = doc.get_element_by_id("b").unwrap();
        let a = doc.get_element_by_id("a").unwrap();
        assert_eq!(doc.accessible_text(b), "😁");
        assert_eq!(doc.visible_text(b), "");
        assert_eq!(doc.accessible_text(a), "Home");
    }

    #[test]
    fn test_form_values() {
        let doc = Document::parse(
            "<input id='i' value='Input 1&apos;s value'>\
             <textarea id='t'>There once was a text area.</textarea>\
             <select id='s'><option>option 1</option><option>option 2</option></select>\
             <select id='s2'><option>a</option><option selected>b</option></select>",
        );
        let value = |id: &str| doc.value(doc.get_element_by_id(id).unwrap());
        assert_eq!(value("i").as_deref(), Some("Input 1's value"));
        assert_eq!(value("t").as_deref(), Some("There once was a text area."));
        assert_eq!(value("s").as_deref(), Some("option 1"));
        assert_eq!(value("s2").as_deref(), Some("b"));
    }

    #[test]
    fn test_set_value_only_for_editable_controls() {
        let mut doc = Document::parse("<input id='i'><div id='d'></div>");
        let i = doc.get_element_by_id("i").unwrap();
        let d = doc.get_element_by_id("d").unwrap();
        doc.set_value(i, "typed");
        doc.set_value(d, "ignored");
        assert_eq!(doc.value(i).as_deref(), Some("typed"));
        assert_eq!(doc.value(d), None);
    }

    #[test]
    fn test_set_text_content_detaches_children() {
        let mut doc = Document::parse("<div id='d'><span id='s'>x</span></div>");
        let d = doc.get_element_by_id("d").unwrap();
        let s = doc.get_element_by_id("s").unwrap();
        doc.set_text_content(d, "replaced");
        assert!(!doc.is_connected(s));
        assert_eq!(doc.text_content(d), "replaced");
        assert_eq!(doc.get_element_by_id("s"), None);
    }

    #[test]
    fn test_dispatch_bubbles_to_root() {
        let mut doc = Document::parse("<main><button id='b'>Go</button></main>");
        let b = doc.get_element_by_id("b").unwrap();
        let root = doc.root();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        doc.add_event_listener(root, EventKind::Click, move |doc, event| {
            assert_eq!(doc.tag(event.target), Some("button"));
            counter.fetch_add(1, Ordering::SeqCst);
        });
        doc.dispatch(Event::new(EventKind::Click, b));
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_focus_does_not_bubble() {
        let mut doc = Document::parse("<input id='i'>");
        let i = doc.get_element_by_id("i").unwrap();
        let root = doc.root();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        doc.add_event_listener(root, EventKind::Focus, move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        doc.dispatch(Event::new(EventKind::Focus, i));
        assert_eq!(seen.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_prevent_default_and_stop_propagation() {
        let mut doc = Document::parse("<div id='d'><a id='a' href='x.html'>x</a></div>");
        let a = doc.get_element_by_id("a").unwrap();
        let d = doc.get_element_by_id("d").unwrap();
        doc.add_event_listener(a, EventKind::Click, |_, event| {
            event.prevent_default();
            event.stop_propagation();
        });
        doc.add_event_listener(d, EventKind::Click, |_, _| panic!("should not bubble"));
        let event = doc.dispatch(Event::new(EventKind::Click, a));
        assert!(event.default_prevented());
    }

    #[test]
    fn test_describe() {
        let doc = Document::parse("<div id='fake-region'></div><main></main>");
        let div = doc.get_element_by_id("fake-region").unwrap();
        let main = doc.get_elements_by_tag("main")[0];
        assert_eq!(doc.describe(div), "div#fake-region");
        assert_eq!(doc.describe(main), "main");
    }
}

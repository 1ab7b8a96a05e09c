//! Label resolution.
//!
//! Tests identify elements by the text a person would use to describe them,
//! never by selectors. Which elements are eligible and which texts count as
//! their labels depends on the [`ElementCategory`] being queried:
//!
//! | Category     | Eligible elements                                  | Labels                                           |
//! |--------------|----------------------------------------------------|--------------------------------------------------|
//! | `button`     | `button`, input buttons, `[role=button]`           | aria-label, title, accessible content or value   |
//! | `form field` | text-like inputs, `textarea`, `select`             | associated label text, placeholder, current value|
//! | `link`       | `a[href]`, `[role=link]`                           | aria-label, title, accessible content            |
//! | `decoration` | styled inline phrasing elements                    | own visible text                                 |
//! | `area`       | landmarks, named regions, closest enclosing blocks | explicit name plus the text blocks they own      |
//! | `*`          | all of the above                                   | union per element                                |
//!
//! Labels are computed fresh on every call; nothing here caches, because the
//! document changes between actions.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dom::{collapse_whitespace, is_inline_tag, Document, NodeId};

/// Which kind of element a query targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementCategory {
    #[serde(rename = "button")]
    Button,
    #[serde(rename = "form field")]
    FormField,
    #[serde(rename = "area")]
    Area,
    #[serde(rename = "decoration")]
    Decoration,
    #[serde(rename = "link")]
    Link,
    #[serde(rename = "*", alias = "any")]
    Any,
}

impl ElementCategory {
    /// Every concrete category, in the order `Any` unions them.
    pub const CONCRETE: [ElementCategory; 5] = [
        ElementCategory::Button,
        ElementCategory::FormField,
        ElementCategory::Link,
        ElementCategory::Decoration,
        ElementCategory::Area,
    ];

    /// The name used in test code and plans.
    pub fn name(&self) -> &'static str {
        match self {
            ElementCategory::Button => "button",
            ElementCategory::FormField => "form field",
            ElementCategory::Area => "area",
            ElementCategory::Decoration => "decoration",
            ElementCategory::Link => "link",
            ElementCategory::Any => "*",
        }
    }
}

impl fmt::Display for ElementCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementCategory::Any => f.write_str("element"),
            other => f.write_str(other.name()),
        }
    }
}

/// An unrecognised category name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown element category '{0}' (expected button, form field, area, decoration, link or *)")]
pub struct UnknownCategory(pub String);

impl FromStr for ElementCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "button" => Ok(ElementCategory::Button),
            "form field" | "form-field" | "field" => Ok(ElementCategory::FormField),
            "area" => Ok(ElementCategory::Area),
            "decoration" => Ok(ElementCategory::Decoration),
            "link" => Ok(ElementCategory::Link),
            "*" | "any" => Ok(ElementCategory::Any),
            _ => Err(UnknownCategory(s.to_string())),
        }
    }
}

/// How a text block picks its owning area when several ancestors qualify.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaPolicy {
    /// The innermost landmark or explicitly named ancestor.
    #[default]
    InnermostFirst,
    /// The innermost explicitly named ancestor, then the innermost landmark.
    NamedFirst,
}

/// An eligible element and every text it can be identified by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub node: NodeId,
    pub labels: Vec<String>,
}

const LANDMARK_TAGS: &[&str] = &[
    "main", "header", "footer", "aside", "section", "nav", "article", "form", "fieldset", "dialog",
];

const LANDMARK_ROLES: &[&str] = &[
    "main",
    "banner",
    "contentinfo",
    "complementary",
    "region",
    "navigation",
    "article",
    "form",
    "group",
    "dialog",
];

const DECORATION_TAGS: &[&str] = &[
    "span", "i", "b", "em", "strong", "small", "mark", "s", "u", "sub", "sup", "abbr", "code",
    "kbd", "q", "cite",
];

const TEXT_INPUT_TYPES: &[&str] = &[
    "text", "search", "email", "url", "tel", "password", "number", "date", "time",
    "datetime-local", "month", "week",
];

const BUTTON_INPUT_TYPES: &[&str] = &["button", "submit", "reset", "image"];

const SKIPPED_TAGS: &[&str] = &["head", "script", "style", "template", "noscript", "title"];

fn role(doc: &Document, node: NodeId) -> Option<&str> {
    doc.attribute(node, "role").map(str::trim)
}

fn input_type(doc: &Document, node: NodeId) -> String {
    doc.attribute(node, "type")
        .map(|t| t.trim().to_ascii_lowercase())
        .unwrap_or_else(|| "text".to_string())
}

/// Buttons: `<button>`, input buttons and `[role=button]`.
pub fn is_button(doc: &Document, node: NodeId) -> bool {
    match doc.tag(node) {
        Some("button") => true,
        Some("input") => BUTTON_INPUT_TYPES.contains(&input_type(doc, node).as_str()),
        Some(_) => role(doc, node) == Some("button"),
        None => false,
    }
}

/// Text-entry controls and selects.
pub fn is_form_field(doc: &Document, node: NodeId) -> bool {
    match doc.tag(node) {
        Some("input") => TEXT_INPUT_TYPES.contains(&input_type(doc, node).as_str()),
        Some("textarea") | Some("select") => true,
        Some(_) => role(doc, node) == Some("textbox"),
        None => false,
    }
}

/// `a[href]` and `[role=link]`.
pub fn is_link(doc: &Document, node: NodeId) -> bool {
    match doc.tag(node) {
        Some("a") if doc.has_attribute(node, "href") => true,
        Some(_) => role(doc, node) == Some("link"),
        None => false,
    }
}

/// Buttons, form fields and links.
pub fn is_control(doc: &Document, node: NodeId) -> bool {
    is_button(doc, node) || is_form_field(doc, node) || is_link(doc, node)
}

/// Styled inline phrasing that is not itself a control.
pub fn is_decoration(doc: &Document, node: NodeId) -> bool {
    let Some(tag) = doc.tag(node) else {
        return false;
    };
    if !DECORATION_TAGS.contains(&tag) || is_button(doc, node) || is_link(doc, node) {
        return false;
    }
    doc.has_attribute(node, "class")
        || doc.has_attribute(node, "style")
        || matches!(role(doc, node), Some("presentation") | Some("none"))
}

/// A structural region by element name or ARIA role.
pub fn is_landmark(doc: &Document, node: NodeId) -> bool {
    match doc.tag(node) {
        Some(tag) if LANDMARK_TAGS.contains(&tag) => true,
        Some(_) => role(doc, node).is_some_and(|r| LANDMARK_ROLES.contains(&r)),
        None => false,
    }
}

/// Controls that are switched off.
pub fn is_disabled(doc: &Document, node: NodeId) -> bool {
    let native = matches!(
        doc.tag(node),
        Some("button") | Some("input") | Some("select") | Some("textarea")
    ) && doc.has_attribute(node, "disabled");
    native || doc.attribute(node, "aria-disabled") == Some("true")
}

/// Elements that can take keyboard focus.
pub fn is_focusable(doc: &Document, node: NodeId) -> bool {
    if is_disabled(doc, node) {
        return false;
    }
    is_form_field(doc, node)
        || is_button(doc, node)
        || (doc.tag(node) == Some("a") && doc.has_attribute(node, "href"))
        || doc.has_attribute(node, "tabindex")
}

/// Inputs and text areas that accept typed text.
pub fn is_editable(doc: &Document, node: NodeId) -> bool {
    matches!(doc.tag(node), Some("input") | Some("textarea"))
        && is_form_field(doc, node)
        && !is_disabled(doc, node)
        && !doc.has_attribute(node, "readonly")
}

/// Label texts of `node` under `category`. Empty when the node is not
/// eligible.
pub fn labels_of(
    doc: &Document,
    category: ElementCategory,
    node: NodeId,
    policy: AreaPolicy,
) -> Vec<String> {
    candidates_of(doc, category, policy)
        .into_iter()
        .find(|candidate| candidate.node == node)
        .map(|candidate| candidate.labels)
        .unwrap_or_default()
}

/// Every eligible element of `category` with its labels, in document order.
pub fn candidates_of(doc: &Document, category: ElementCategory, policy: AreaPolicy) -> Vec<Candidate> {
    match category {
        ElementCategory::Button => per_element(doc, is_button, button_labels),
        ElementCategory::FormField => per_element(doc, is_form_field, field_labels),
        ElementCategory::Link => per_element(doc, is_link, link_labels),
        ElementCategory::Decoration => per_element(doc, is_decoration, |doc, node| {
            vec![doc.visible_text(node)]
        }),
        ElementCategory::Area => area_candidates(doc, policy),
        ElementCategory::Any => any_candidates(doc, policy),
    }
}

fn per_element(
    doc: &Document,
    eligible: fn(&Document, NodeId) -> bool,
    labels: impl Fn(&Document, NodeId) -> Vec<String>,
) -> Vec<Candidate> {
    doc.elements()
        .into_iter()
        .filter(|&node| !is_hidden(doc, node) && eligible(doc, node))
        .map(|node| Candidate {
            node,
            labels: tidy(labels(doc, node)),
        })
        .collect()
}

fn is_hidden(doc: &Document, node: NodeId) -> bool {
    std::iter::once(node).chain(doc.ancestors(node)).any(|n| {
        doc.has_attribute(n, "hidden")
            || doc.tag(n).is_some_and(|tag| SKIPPED_TAGS.contains(&tag))
            || (doc.tag(n) == Some("input") && input_type(doc, n) == "hidden")
    })
}

/// Drops blanks and repeats, keeping first occurrences in order.
fn tidy(labels: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(labels.len());
    for label in labels {
        let label = collapse_whitespace(&label);
        if !label.is_empty() && !out.contains(&label) {
            out.push(label);
        }
    }
    out
}

fn button_labels(doc: &Document, node: NodeId) -> Vec<String> {
    let mut labels = explicit_names(doc, node);
    labels.extend(doc.non_empty_attribute(node, "title"));
    if doc.tag(node) == Some("input") {
        labels.extend(doc.non_empty_attribute(node, "value"));
        labels.extend(doc.non_empty_attribute(node, "alt"));
    } else {
        labels.push(doc.accessible_text(node));
    }
    labels
}

fn field_labels(doc: &Document, node: NodeId) -> Vec<String> {
    let mut labels = explicit_names(doc, node);
    if let Some(id) = doc.attribute(node, "id").filter(|id| !id.is_empty()) {
        for label in doc.get_elements_by_tag("label") {
            if doc.attribute(label, "for") == Some(id) {
                labels.push(doc.visible_text(label));
            }
        }
    }
    if let Some(enclosing) = doc
        .ancestors(node)
        .find(|&ancestor| doc.tag(ancestor) == Some("label"))
    {
        labels.push(doc.visible_text(enclosing));
    }
    labels.extend(doc.non_empty_attribute(node, "placeholder"));
    labels.extend(doc.non_empty_attribute(node, "title"));
    labels.extend(doc.value(node));
    labels
}

fn link_labels(doc: &Document, node: NodeId) -> Vec<String> {
    let mut labels = explicit_names(doc, node);
    labels.extend(doc.non_empty_attribute(node, "title"));
    labels.push(doc.accessible_text(node));
    labels
}

/// `aria-label` and the text of `aria-labelledby` targets.
fn explicit_names(doc: &Document, node: NodeId) -> Vec<String> {
    let mut names: Vec<String> = doc.non_empty_attribute(node, "aria-label").into_iter().collect();
    if let Some(ids) = doc.attribute(node, "aria-labelledby") {
        let text = ids
            .split_whitespace()
            .filter_map(|id| doc.get_element_by_id(id))
            .map(|target| doc.accessible_text(target))
            .collect::<Vec<_>>()
            .join(" ");
        names.push(text);
    }
    names.retain(|name| !name.trim().is_empty());
    names
}

fn control_labels(doc: &Document, node: NodeId) -> Vec<String> {
    if is_button(doc, node) {
        button_labels(doc, node)
    } else if is_form_field(doc, node) {
        field_labels(doc, node)
    } else {
        link_labels(doc, node)
    }
}

/// A run of text attributed to exactly one area.
struct TextBlock {
    owner: NodeId,
    labels: Vec<String>,
}

fn collect_blocks(doc: &Document, node: NodeId, in_block: bool, out: &mut Vec<TextBlock>) {
    for &child in doc.children(node) {
        let Some(tag) = doc.tag(child) else {
            continue;
        };
        if SKIPPED_TAGS.contains(&tag) || doc.has_attribute(child, "hidden") {
            continue;
        }
        if doc.tag(child) == Some("input") && input_type(doc, child) == "hidden" {
            continue;
        }
        if is_control(doc, child) {
            let labels = tidy(control_labels(doc, child));
            if !labels.is_empty() {
                out.push(TextBlock { owner: child, labels });
            }
            continue;
        }
        if tag == "img" {
            if let Some(alt) = doc.non_empty_attribute(child, "alt") {
                out.push(TextBlock {
                    owner: child,
                    labels: vec![alt],
                });
            }
            continue;
        }
        let mut owns_block = false;
        let inline_in_block = in_block && is_inline_tag(tag);
        if !inline_in_block && !is_decoration(doc, child) && !doc.direct_text(child).is_empty() {
            let text = doc.visible_text(child);
            if !text.is_empty() {
                out.push(TextBlock {
                    owner: child,
                    labels: vec![text],
                });
                owns_block = true;
            }
        }
        collect_blocks(doc, child, in_block || owns_block, out);
    }
}

fn is_named(doc: &Document, node: NodeId) -> bool {
    !explicit_names(doc, node).is_empty()
}

/// The area owning a text block, per `policy`.
fn container_of(doc: &Document, owner: NodeId, policy: AreaPolicy) -> Option<NodeId> {
    let chain: Vec<NodeId> = std::iter::once(owner)
        .chain(doc.ancestors(owner))
        .filter(|&node| {
            doc.tag(node).is_some() && !is_control(doc, node) && !is_decoration(doc, node)
        })
        .collect();
    let block_level = |node: &&NodeId| doc.tag(**node).is_some_and(|tag| !is_inline_tag(tag));
    let named = |node: &&NodeId| block_level(node) && is_named(doc, **node);
    let landmark = |node: &&NodeId| is_landmark(doc, **node);

    let chosen = match policy {
        AreaPolicy::InnermostFirst => chain.iter().find(|node| landmark(node) || named(node)),
        AreaPolicy::NamedFirst => chain
            .iter()
            .find(|node| named(node))
            .or_else(|| chain.iter().find(|node| landmark(node))),
    };
    chosen.or_else(|| chain.iter().find(block_level)).copied()
}

fn area_candidates(doc: &Document, policy: AreaPolicy) -> Vec<Candidate> {
    let mut blocks = Vec::new();
    collect_blocks(doc, doc.root(), false, &mut blocks);

    let mut owned: HashMap<NodeId, Vec<String>> = HashMap::new();
    for block in blocks {
        if let Some(container) = container_of(doc, block.owner, policy) {
            owned.entry(container).or_default().extend(block.labels);
        }
    }

    doc.elements()
        .into_iter()
        .filter_map(|node| {
            let texts = owned.remove(&node)?;
            let mut labels = explicit_names(doc, node);
            labels.extend(texts);
            Some(Candidate {
                node,
                labels: tidy(labels),
            })
        })
        .collect()
}

fn any_candidates(doc: &Document, policy: AreaPolicy) -> Vec<Candidate> {
    let mut merged: HashMap<NodeId, Vec<String>> = HashMap::new();
    for category in ElementCategory::CONCRETE {
        for candidate in candidates_of(doc, category, policy) {
            merged.entry(candidate.node).or_default().extend(candidate.labels);
        }
    }
    doc.elements()
        .into_iter()
        .filter_map(|node| {
            let labels = merged.remove(&node)?;
            Some(Candidate {
                node,
                labels: tidy(labels),
            })
        })
        .collect()
}

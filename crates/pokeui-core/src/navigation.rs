//! Document addresses and pending navigations.
//!
//! Every loaded document has a [`Location`] rooted at `http://localhost/`.
//! Link clicks and refreshes do not load anything by themselves: they enqueue
//! a navigation on the [`NavigationTracker`], which the [`Ui`](crate::ui::Ui)
//! performs the next time a use-case awaits `after_load`.

use std::fmt;

use serde::{Serialize, Serializer};
use url::Url;

use crate::error::UiError;

const BASE: &str = "http://localhost/";

/// The address of a loaded document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    url: Url,
}

impl Location {
    /// Parses a document path such as `test-pages/matching.html?x=1#top`.
    ///
    /// Relative paths are resolved against the site root.
    pub fn parse(path: &str) -> Result<Self, UiError> {
        let base = Url::parse(BASE).map_err(|source| UiError::InvalidLocation {
            href: BASE.to_string(),
            source,
        })?;
        let url = base
            .join(path.trim_start_matches("./"))
            .map_err(|source| UiError::InvalidLocation {
                href: path.to_string(),
                source,
            })?;
        Ok(Self { url })
    }

    /// Resolves an `href` relative to this location.
    pub fn join(&self, href: &str) -> Result<Self, UiError> {
        let url = self.url.join(href).map_err(|source| UiError::InvalidLocation {
            href: href.to_string(),
            source,
        })?;
        Ok(Self { url })
    }

    /// The path, always starting with `/`.
    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// The path without its leading slash, as a host would look it up.
    pub fn document_path(&self) -> &str {
        self.url.path().trim_start_matches('/')
    }

    /// Query pairs in the order they appear.
    pub fn query(&self) -> Vec<(String, String)> {
        self.url
            .query_pairs()
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect()
    }

    /// The first value for `key`.
    pub fn query_param(&self, key: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value.into_owned())
    }

    /// The fragment without its `#`.
    pub fn fragment(&self) -> Option<&str> {
        self.url.fragment()
    }

    /// True when `other` differs from this location only in its fragment.
    pub fn same_document(&self, other: &Location) -> bool {
        let mut a = self.url.clone();
        let mut b = other.url.clone();
        a.set_fragment(None);
        b.set_fragment(None);
        a == b
    }

    /// True when the location is on the site a host serves, rather than
    /// another origin or a scheme such as `mailto:`.
    pub fn is_on_site(&self) -> bool {
        self.url.scheme() == "http" && self.url.host_str() == Some("localhost") && self.url.port().is_none()
    }

    /// The path with query and fragment for on-site locations, the full URL
    /// for anything else.
    pub fn as_relative(&self) -> &str {
        let full = self.url.as_str();
        if !self.is_on_site() {
            return full;
        }
        full.strip_prefix(&BASE[..BASE.len() - 1])
            .filter(|rest| rest.starts_with('/'))
            .unwrap_or(full)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_relative())
    }
}

impl Serialize for Location {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_relative())
    }
}

/// A navigation waiting for the next `after_load`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingNavigation {
    /// Where to go.
    pub target: Location,
    /// Reload even when only the fragment differs (or nothing does).
    pub reload: bool,
}

/// Tracks the current location and at most one pending navigation.
#[derive(Debug, Clone)]
pub struct NavigationTracker {
    current: Location,
    pending: Option<PendingNavigation>,
    loads: usize,
}

impl NavigationTracker {
    /// Starts tracking after the initial load of `current`.
    pub fn new(current: Location) -> Self {
        Self {
            current,
            pending: None,
            loads: 1,
        }
    }

    /// The location of the last completed navigation.
    pub fn current(&self) -> &Location {
        &self.current
    }

    /// The navigation waiting to be performed, if any.
    pub fn pending(&self) -> Option<&PendingNavigation> {
        self.pending.as_ref()
    }

    /// Queues a navigation to `target`, replacing any earlier one.
    pub fn enqueue(&mut self, target: Location) {
        self.pending = Some(PendingNavigation { target, reload: false });
    }

    /// Queues a reload of the current location, replacing any earlier one.
    pub fn enqueue_reload(&mut self) {
        self.pending = Some(PendingNavigation {
            target: self.current.clone(),
            reload: true,
        });
    }

    /// Removes and returns the pending navigation.
    pub fn take_pending(&mut self) -> Option<PendingNavigation> {
        self.pending.take()
    }

    /// Puts back a navigation that was taken but did not complete.
    ///
    /// A navigation queued in the meantime wins.
    pub fn requeue(&mut self, pending: PendingNavigation) {
        if self.pending.is_none() {
            self.pending = Some(pending);
        }
    }

    /// True when `pending` can complete without loading a new document.
    pub fn stays_in_document(&self, pending: &PendingNavigation) -> bool {
        !pending.reload && pending.target.same_document(&self.current)
    }

    /// Records a completed document load.
    pub fn complete(&mut self, location: Location) {
        self.current = location;
        self.loads += 1;
    }

    /// Records a fragment change inside the current document.
    pub fn move_within(&mut self, location: Location) {
        self.current = location;
    }

    /// Completed document loads, the initial one included.
    pub fn loads(&self) -> usize {
        self.loads
    }
}

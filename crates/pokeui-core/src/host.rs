//! Document hosts.
//!
//! A [`DocumentHost`] turns a [`Location`] into a freshly parsed
//! [`Document`]. The engine never reads files or builds pages itself; it asks
//! the host, which keeps the runner independent of where pages come from.
//!
//! Two hosts ship with the crate:
//!
//! - [`FixtureHost`]: pages registered in memory, each with an optional page
//!   script that installs event listeners on every load. This is how tests
//!   give a page behaviour.
//! - [`DirectoryHost`]: pages read from a directory on disk. Static markup
//!   only.
//!
//! ```
//! use pokeui_core::host::FixtureHost;
//!
//! let host = FixtureHost::new()
//!     .page("index.html", "<h1>Hello</h1>")
//!     .scripted_page("counter.html", "<button>Add</button>", |_doc| {
//!         // install listeners here
//!     });
//! assert_eq!(host.load_count(), 0);
//! ```

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::dom::Document;
use crate::navigation::Location;

/// Errors that can occur while loading or clearing a document.
#[derive(Error, Debug)]
pub enum HostError {
    /// No document exists at the requested path.
    #[error("Document not found: {0}")]
    NotFound(String),

    /// Reading the document failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Loads documents into isolated contexts.
///
/// Every call to [`load`](DocumentHost::load) must return a new, independent
/// document: nothing done to one load may be visible in the next.
#[async_trait]
pub trait DocumentHost: Send + Sync {
    /// Load the document at `location`.
    ///
    /// The query string and fragment are part of the location but do not
    /// select a different document.
    async fn load(&self, location: &Location) -> Result<Document, HostError>;

    /// Tear down whatever the host keeps for `location`.
    ///
    /// Called once after a suite created with `clear_on_finish` completes.
    async fn clear(&self, _location: &Location) -> Result<(), HostError> {
        Ok(())
    }
}

/// A page script: runs against every freshly loaded copy of a page.
pub type PageScript = Arc<dyn Fn(&mut Document) + Send + Sync>;

struct FixturePage {
    markup: String,
    script: Option<PageScript>,
}

/// In-memory pages keyed by path.
#[derive(Default)]
pub struct FixtureHost {
    pages: HashMap<String, FixturePage>,
    loads: AtomicUsize,
    clears: AtomicUsize,
}

impl std::fmt::Debug for FixtureHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut paths: Vec<&String> = self.pages.keys().collect();
        paths.sort();
        f.debug_struct("FixtureHost")
            .field("pages", &paths)
            .field("loads", &self.load_count())
            .field("clears", &self.clear_count())
            .finish()
    }
}

impl FixtureHost {
    /// Creates a host with no pages.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers static markup at `path`.
    pub fn page(mut self, path: &str, markup: &str) -> Self {
        self.pages.insert(
            normalize(path),
            FixturePage {
                markup: markup.to_string(),
                script: None,
            },
        );
        self
    }

    /// Registers markup plus a script that runs after each load.
    ///
    /// # Arguments
    ///
    /// * `path` - The path the page is served at, e.g. `test-pages/button.html`
    /// * `markup` - The HTML source
    /// * `script` - Installs listeners and initial state on the parsed document
    pub fn scripted_page<F>(mut self, path: &str, markup: &str, script: F) -> Self
    where
        F: Fn(&mut Document) + Send + Sync + 'static,
    {
        self.pages.insert(
            normalize(path),
            FixturePage {
                markup: markup.to_string(),
                script: Some(Arc::new(script)),
            },
        );
        self
    }

    /// Number of loads served so far.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Number of clears requested so far.
    pub fn clear_count(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

fn normalize(path: &str) -> String {
    path.trim_start_matches("./").trim_start_matches('/').to_string()
}

#[async_trait]
impl DocumentHost for FixtureHost {
    async fn load(&self, location: &Location) -> Result<Document, HostError> {
        let path = location.document_path();
        let page = self
            .pages
            .get(path)
            .ok_or_else(|| HostError::NotFound(path.to_string()))?;
        let mut doc = Document::parse(&page.markup);
        if let Some(script) = &page.script {
            script(&mut doc);
        }
        self.loads.fetch_add(1, Ordering::SeqCst);
        debug!(path, "fixture page loaded");
        Ok(doc)
    }

    async fn clear(&self, location: &Location) -> Result<(), HostError> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        debug!(path = location.document_path(), "fixture page cleared");
        Ok(())
    }
}

/// Pages read from files under a root directory.
#[derive(Debug, Clone)]
pub struct DirectoryHost {
    root: PathBuf,
}

impl DirectoryHost {
    /// Serves files below `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory pages are read from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, document_path: &str) -> Result<PathBuf, HostError> {
        let relative = Path::new(document_path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes || document_path.is_empty() {
            return Err(HostError::NotFound(document_path.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl DocumentHost for DirectoryHost {
    async fn load(&self, location: &Location) -> Result<Document, HostError> {
        let path = self.resolve(location.document_path())?;
        let markup = match tokio::fs::read_to_string(&path).await {
            Ok(markup) => markup,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(HostError::NotFound(location.document_path().to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), "page read from disk");
        Ok(Document::parse(&markup))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::EventKind;
    use std::io::Write;

    #[tokio::test]
    async fn test_fixture_host_loads_fresh_documents() {
        let host = FixtureHost::new().scripted_page(
            "/pages/a.html",
            "<p id='out'>0</p><button id='b'>Go</button>",
            |doc| {
                let button = doc.get_element_by_id("b").unwrap();
                let out = doc.get_element_by_id("out").unwrap();
                doc.add_event_listener(button, EventKind::Click, move |doc, _| {
                    doc.set_text_content(out, "1");
                });
            },
        );
        let loc = Location::parse("pages/a.html?x=1").unwrap();

        let mut first = host.load(&loc).await.unwrap();
        let button = first.get_element_by_id("b").unwrap();
        first.dispatch(crate::dom::Event::new(EventKind::Click, button));
        let out = first.get_element_by_id("out").unwrap();
        assert_eq!(first.text_content(out), "1");

        let second = host.load(&loc).await.unwrap();
        let out = second.get_element_by_id("out").unwrap();
        assert_eq!(second.text_content(out), "0");
        assert_eq!(host.load_count(), 2);
    }

    #[tokio::test]
    async fn test_fixture_host_missing_page() {
        let host = FixtureHost::new();
        let err = host.load(&Location::parse("nope.html").unwrap()).await.unwrap_err();
        assert!(matches!(err, HostError::NotFound(ref p) if p == "nope.html"));
    }

    #[tokio::test]
    async fn test_fixture_host_counts_clears() {
        let host = FixtureHost::new().page("a.html", "<p>a</p>");
        host.clear(&Location::parse("a.html").unwrap()).await.unwrap();
        assert_eq!(host.clear_count(), 1);
    }

    #[tokio::test]
    async fn test_directory_host_reads_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("pages")).unwrap();
        let mut file = std::fs::File::create(dir.path().join("pages/index.html")).unwrap();
        write!(file, "<h1 id='h'>From disk</h1>").unwrap();

        let host = DirectoryHost::new(dir.path());
        let doc = host.load(&Location::parse("pages/index.html").unwrap()).await.unwrap();
        let h = doc.get_element_by_id("h").unwrap();
        assert_eq!(doc.visible_text(h), "From disk");

        let err = host.load(&Location::parse("pages/missing.html").unwrap()).await.unwrap_err();
        assert!(matches!(err, HostError::NotFound(_)));
    }

    #[test]
    fn test_directory_host_rejects_escapes() {
        let host = DirectoryHost::new("/srv/pages");
        assert!(host.resolve("../etc/passwd").is_err());
        assert!(host.resolve("").is_err());
        assert_eq!(host.resolve("a/b.html").unwrap(), PathBuf::from("/srv/pages/a/b.html"));
    }
}

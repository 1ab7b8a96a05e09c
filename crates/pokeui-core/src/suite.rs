//! Use-case suites and the runner that chains them.
//!
//! A suite is one document plus an ordered list of named use-cases. Each
//! use-case body receives a freshly loaded [`Ui`] and returns once it is
//! done; the runner never starts the next use-case before the previous body
//! has resolved.
//!
//! ```no_run
//! use std::sync::Arc;
//! use pokeui_core::host::FixtureHost;
//! use pokeui_core::label::ElementCategory;
//! use pokeui_core::suite::{test_document, DocumentOptions, SuiteRunner};
//!
//! # async fn demo() {
//! let host = Arc::new(FixtureHost::new().page("pages/a.html", "<button>Go</button>"));
//! let report = SuiteRunner::new(host)
//!     .then(|| {
//!         test_document("pages/a.html", DocumentOptions { clear_on_finish: true })
//!             .use_case("Has a button", |ui| Box::pin(async move {
//!                 ui.count_elements_with_label(ElementCategory::Button, "Go", 1)
//!             }))
//!     })
//!     .run()
//!     .await;
//! assert!(report.passed());
//! # }
//! ```
//!
//! Within a suite the first failure stops the suite: later use-cases are
//! reported as [`Outcome::Skipped`]. The chain always moves on to the next
//! suite.

use std::any::Any;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::action::ActionLog;
use crate::config::EngineConfig;
use crate::error::UiError;
use crate::host::DocumentHost;
use crate::navigation::Location;
use crate::session::{RunEvent, Session};
use crate::ui::Ui;

/// The future a use-case body returns.
pub type UseCaseFuture<'a> = Pin<Box<dyn Future<Output = Result<(), UiError>> + Send + 'a>>;

/// A use-case body: borrows the `Ui` for as long as it runs.
pub type UseCaseBody = Arc<dyn for<'a> Fn(&'a mut Ui) -> UseCaseFuture<'a> + Send + Sync>;

/// Builds a suite when its turn in the chain comes.
pub type SuiteFactory = Box<dyn FnOnce() -> TestDocument + Send>;

/// One named scenario.
#[derive(Clone)]
pub struct UseCase {
    pub name: String,
    body: UseCaseBody,
}

impl std::fmt::Debug for UseCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UseCase").field("name", &self.name).finish()
    }
}

/// Per-suite options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentOptions {
    /// Ask the host to tear the document's context down after the suite.
    #[serde(default)]
    pub clear_on_finish: bool,
}

/// A document and the use-cases to run against it.
#[derive(Debug, Clone)]
pub struct TestDocument {
    path: String,
    options: DocumentOptions,
    use_cases: Vec<UseCase>,
}

/// Starts building a suite for the document at `path`.
pub fn test_document(path: impl Into<String>, options: DocumentOptions) -> TestDocument {
    TestDocument {
        path: path.into(),
        options,
        use_cases: Vec::new(),
    }
}

impl TestDocument {
    /// Appends a use-case.
    ///
    /// The body is called with a `Ui` loaded fresh for this use-case and is
    /// written as `|ui| Box::pin(async move { ... })`.
    pub fn use_case<F>(mut self, name: impl Into<String>, body: F) -> Self
    where
        F: for<'a> Fn(&'a mut Ui) -> UseCaseFuture<'a> + Send + Sync + 'static,
    {
        self.use_cases.push(UseCase {
            name: name.into(),
            body: Arc::new(body),
        });
        self
    }

    /// The document path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The suite options.
    pub fn options(&self) -> DocumentOptions {
        self.options
    }

    /// The registered use-cases, in order.
    pub fn use_cases(&self) -> &[UseCase] {
        &self.use_cases
    }
}

/// How a use-case (or suite) ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum Outcome {
    Passed,
    Failed(String),
    Skipped,
}

impl Outcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, Outcome::Passed)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

/// Result of one use-case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UseCaseReport {
    pub name: String,
    pub outcome: Outcome,
    pub duration_ms: u64,
    /// The journal of the use-case's `Ui`. Empty when the body panicked.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionLog>,
}

/// Result of one suite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    pub document: String,
    /// `Passed`, or `Failed` with the first failing use-case's message.
    pub outcome: Outcome,
    pub use_cases: Vec<UseCaseReport>,
    /// Whether the host cleared the document's context afterwards.
    pub cleared: bool,
}

/// Result of a whole run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub suites: Vec<SuiteReport>,
}

impl RunReport {
    fn use_cases(&self) -> impl Iterator<Item = &UseCaseReport> {
        self.suites.iter().flat_map(|suite| suite.use_cases.iter())
    }

    /// True when no use-case failed.
    pub fn passed(&self) -> bool {
        self.failed_count() == 0
    }

    pub fn passed_count(&self) -> usize {
        self.use_cases().filter(|uc| uc.outcome.is_passed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.use_cases().filter(|uc| uc.outcome.is_failed()).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.use_cases()
            .filter(|uc| matches!(uc.outcome, Outcome::Skipped))
            .count()
    }
}

/// Runs suites one after another.
pub struct SuiteRunner {
    host: Arc<dyn DocumentHost>,
    config: EngineConfig,
    queue: Vec<SuiteFactory>,
    session: Arc<Session>,
}

impl std::fmt::Debug for SuiteRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuiteRunner")
            .field("config", &self.config)
            .field("queued", &self.queue.len())
            .field("session", &self.session.id)
            .finish()
    }
}

impl SuiteRunner {
    /// Creates a runner loading documents through `host` with default
    /// settings.
    pub fn new(host: Arc<dyn DocumentHost>) -> Self {
        let config = EngineConfig::default();
        let session = Session::new(config.log_dir.as_deref(), "run");
        Self {
            host,
            config,
            queue: Vec::new(),
            session,
        }
    }

    /// Replaces the settings.
    ///
    /// Starts a new session, so subscribe after calling this.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.session = Session::new(config.log_dir.as_deref(), "run");
        self.config = config;
        self
    }

    /// Queues a suite built by `factory` when the previous suite finishes.
    pub fn then<F>(mut self, factory: F) -> Self
    where
        F: FnOnce() -> TestDocument + Send + 'static,
    {
        self.queue.push(Box::new(factory));
        self
    }

    /// Queues an already-built suite.
    pub fn suite(self, document: TestDocument) -> Self {
        self.then(move || document)
    }

    /// The session events are published through.
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Subscribes to run events.
    pub fn subscribe(&self) -> broadcast::Receiver<RunEvent> {
        self.session.subscribe()
    }

    /// Runs every queued suite in order.
    pub async fn run(self) -> RunReport {
        let started = Instant::now();
        let started_at = Utc::now();
        let run_id = self.session.id;
        self.session.publish(RunEvent::RunStarted { run_id }).await;
        info!(%run_id, suites = self.queue.len(), "run started");

        let mut suites = Vec::with_capacity(self.queue.len());
        let Self {
            host,
            config,
            queue,
            session,
        } = self;
        let runner = Runner { host, config, session };
        for factory in queue {
            let document = factory();
            let span = info_span!("suite", document = %document.path);
            suites.push(runner.run_suite(document).instrument(span).await);
        }

        let report = RunReport {
            run_id,
            started_at,
            duration_ms: started.elapsed().as_millis() as u64,
            suites,
        };
        runner
            .session
            .publish(RunEvent::RunFinished {
                passed: report.passed_count(),
                failed: report.failed_count(),
                skipped: report.skipped_count(),
            })
            .await;
        info!(
            %run_id,
            passed = report.passed_count(),
            failed = report.failed_count(),
            skipped = report.skipped_count(),
            "run finished"
        );
        report
    }
}

struct Runner {
    host: Arc<dyn DocumentHost>,
    config: EngineConfig,
    session: Arc<Session>,
}

impl Runner {
    async fn run_suite(&self, document: TestDocument) -> SuiteReport {
        let TestDocument {
            path,
            options,
            use_cases,
        } = document;
        self.session
            .publish(RunEvent::SuiteStarted { document: path.clone() })
            .await;

        let location = Location::parse(&path).map_err(|e| e.to_string());
        let mut reports = Vec::with_capacity(use_cases.len());
        let mut first_failure: Option<String> = None;
        for use_case in use_cases {
            let report = if first_failure.is_some() {
                UseCaseReport {
                    name: use_case.name,
                    outcome: Outcome::Skipped,
                    duration_ms: 0,
                    actions: Vec::new(),
                }
            } else {
                self.session
                    .publish(RunEvent::UseCaseStarted {
                        document: path.clone(),
                        name: use_case.name.clone(),
                    })
                    .await;
                let span = info_span!("use_case", name = %use_case.name);
                self.run_use_case(&location, use_case).instrument(span).await
            };
            if let Outcome::Failed(message) = &report.outcome {
                first_failure = Some(format!("{}: {}", report.name, message));
            }
            self.session
                .publish(RunEvent::UseCaseFinished {
                    document: path.clone(),
                    name: report.name.clone(),
                    outcome: report.outcome.clone(),
                    duration_ms: report.duration_ms,
                })
                .await;
            reports.push(report);
        }

        let cleared = match (&location, options.clear_on_finish) {
            (Ok(location), true) => match self.host.clear(location).await {
                Ok(()) => true,
                Err(e) => {
                    warn!(document = %path, error = %e, "clearing document failed");
                    false
                }
            },
            _ => false,
        };

        let outcome = match first_failure {
            Some(message) => Outcome::Failed(message),
            None => Outcome::Passed,
        };
        self.session
            .publish(RunEvent::SuiteFinished {
                document: path.clone(),
                outcome: outcome.clone(),
                cleared,
            })
            .await;
        SuiteReport {
            document: path,
            outcome,
            use_cases: reports,
            cleared,
        }
    }

    async fn run_use_case(&self, location: &Result<Location, String>, use_case: UseCase) -> UseCaseReport {
        let started = Instant::now();
        let UseCase { name, body } = use_case;
        let failed = |message: String, started: Instant| UseCaseReport {
            name: name.clone(),
            outcome: Outcome::Failed(message),
            duration_ms: started.elapsed().as_millis() as u64,
            actions: Vec::new(),
        };

        let location = match location {
            Ok(location) => location.clone(),
            Err(message) => return failed(message.clone(), started),
        };
        let ui = match Ui::load(self.host.clone(), location, self.config.clone()).await {
            Ok(ui) => ui,
            Err(e) => {
                warn!(error = %e, "document load failed");
                return failed(e.to_string(), started);
            }
        };

        let handle = tokio::spawn(
            async move {
                let mut ui = ui;
                let result = body(&mut ui).await;
                (result, ui.take_journal())
            }
            .in_current_span(),
        );

        let (outcome, actions) = match handle.await {
            Ok((Ok(()), actions)) => (Outcome::Passed, actions),
            Ok((Err(e), actions)) => (Outcome::Failed(e.to_string()), actions),
            Err(join_error) if join_error.is_panic() => {
                let message = panic_message(join_error.into_panic());
                (Outcome::Failed(format!("use-case panicked: {}", message)), Vec::new())
            }
            Err(join_error) => (Outcome::Failed(join_error.to_string()), Vec::new()),
        };
        match &outcome {
            Outcome::Failed(message) => warn!(%message, "use-case failed"),
            _ => info!("use-case passed"),
        }
        UseCaseReport {
            name,
            outcome,
            duration_ms: started.elapsed().as_millis() as u64,
            actions,
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

//! Run sessions: identity, event broadcast and persistence.
//!
//! Every [`SuiteRunner`](crate::suite::SuiteRunner) owns a [`Session`].
//! The runner publishes a [`RunEvent`] whenever a run, suite or use-case
//! starts or finishes:
//!
//! - Events are kept in a ring buffer for later inspection
//! - Subscribers receive them through a broadcast channel
//! - When a log directory is configured, every event is appended to a
//!   JSON Lines file named after the run
//!
//! # Example
//!
//! ```no_run
//! use pokeui_core::session::{RunEvent, Session};
//!
//! #[tokio::main]
//! async fn main() {
//!     let session = Session::new(None, "nightly");
//!     let mut rx = session.subscribe();
//!     session.publish(RunEvent::RunStarted { run_id: session.id }).await;
//!     assert!(matches!(rx.recv().await, Ok(RunEvent::RunStarted { .. })));
//! }
//! ```

use std::collections::VecDeque;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::warn;
use uuid::Uuid;

use crate::suite::Outcome;

/// Maximum number of events retained in the ring buffer.
const MAX_EVENT_LOG_SIZE: usize = 1000;

/// Progress notifications published while a run executes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    /// The run has started.
    RunStarted {
        /// The unique identifier for this run.
        run_id: Uuid,
    },

    /// A suite's document is about to be loaded for its first use-case.
    SuiteStarted { document: String },

    /// A use-case body is about to run.
    UseCaseStarted { document: String, name: String },

    /// A use-case finished, was skipped or failed to load.
    UseCaseFinished {
        document: String,
        name: String,
        outcome: Outcome,
        duration_ms: u64,
    },

    /// Every use-case of a suite has been accounted for.
    SuiteFinished {
        document: String,
        outcome: Outcome,
        cleared: bool,
    },

    /// The last suite finished.
    RunFinished {
        passed: usize,
        failed: usize,
        skipped: usize,
    },
}

#[derive(Serialize)]
struct LoggedEvent<'a> {
    timestamp: DateTime<Utc>,
    #[serde(flatten)]
    event: &'a RunEvent,
}

/// Shared state for one run.
pub struct Session {
    /// The unique identifier for this run.
    pub id: Uuid,

    /// When this run was created.
    pub created_at: DateTime<Utc>,

    events: RwLock<VecDeque<RunEvent>>,
    event_tx: broadcast::Sender<RunEvent>,
    log_writer: Mutex<Option<Box<dyn Write + Send>>>,
}

impl Session {
    /// Creates a new session.
    ///
    /// # Arguments
    ///
    /// * `log_dir` - Directory for the JSON Lines event log; `None` disables it
    /// * `name` - Prefix of the log file name
    ///
    /// # Returns
    ///
    /// An `Arc<Session>` for sharing with subscribers. The log file, when
    /// enabled, is `{log_dir}/{name}_{timestamp}.jsonl`. A log file that cannot
    /// be created is reported at `warn` and the run continues without it.
    pub fn new(log_dir: Option<&Path>, name: &str) -> Arc<Self> {
        let (event_tx, _) = broadcast::channel(256);
        let created_at = Utc::now();

        let log_writer = log_dir.and_then(|dir| {
            let timestamp = created_at.format("%Y%m%d_%H%M%S");
            let path = dir.join(format!("{}_{}.jsonl", name, timestamp));
            let opened = std::fs::create_dir_all(dir).and_then(|_| std::fs::File::create(&path));
            match opened {
                Ok(file) => Some(Box::new(BufWriter::new(file)) as Box<dyn Write + Send>),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "cannot create run log");
                    None
                }
            }
        });

        Arc::new(Self {
            id: Uuid::new_v4(),
            created_at,
            events: RwLock::new(VecDeque::new()),
            event_tx,
            log_writer: Mutex::new(log_writer),
        })
    }

    /// Subscribes to run events.
    ///
    /// Receivers that fall too far behind miss events.
    pub fn subscribe(&self) -> broadcast::Receiver<RunEvent> {
        self.event_tx.subscribe()
    }

    /// Records an event, persists it and broadcasts it to subscribers.
    pub async fn publish(&self, event: RunEvent) {
        {
            let mut events = self.events.write().await;
            if events.len() >= MAX_EVENT_LOG_SIZE {
                events.pop_front();
            }
            events.push_back(event.clone());
        }

        {
            let mut writer_guard = self.log_writer.lock().await;
            if let Some(writer) = writer_guard.as_mut() {
                let line = LoggedEvent {
                    timestamp: Utc::now(),
                    event: &event,
                };
                if let Err(e) = append_line(writer, &line) {
                    warn!(error = %e, "cannot write run log, disabling it");
                    *writer_guard = None;
                }
            }
        }

        // No subscribers is expected.
        let _ = self.event_tx.send(event);
    }

    /// Returns every retained event in order.
    pub async fn events(&self) -> Vec<RunEvent> {
        self.events.read().await.iter().cloned().collect()
    }
}

fn append_line(writer: &mut dyn Write, line: &LoggedEvent<'_>) -> std::io::Result<()> {
    let json = serde_json::to_string(line)?;
    writeln!(writer, "{}", json)?;
    writer.flush()
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("created_at", &self.created_at)
            .field("events", &"<RwLock<VecDeque<RunEvent>>>")
            .field("event_tx", &"<broadcast::Sender>")
            .field("log_writer", &"<Mutex<Option<Box<dyn Write>>>>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_broadcasts_and_retains() {
        let session = Session::new(None, "test");
        let mut rx = session.subscribe();
        session
            .publish(RunEvent::SuiteStarted {
                document: "a.html".to_string(),
            })
            .await;
        let received = rx.recv().await.unwrap();
        assert_eq!(
            received,
            RunEvent::SuiteStarted {
                document: "a.html".to_string()
            }
        );
        assert_eq!(session.events().await.len(), 1);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers() {
        let session = Session::new(None, "test");
        session.publish(RunEvent::RunStarted { run_id: session.id }).await;
        assert_eq!(session.events().await, vec![RunEvent::RunStarted { run_id: session.id }]);
    }

    #[tokio::test]
    async fn test_events_written_as_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let logs = dir.path().join("logs");
        let session = Session::new(Some(&logs), "run");
        session.publish(RunEvent::RunStarted { run_id: session.id }).await;
        session
            .publish(RunEvent::RunFinished {
                passed: 2,
                failed: 1,
                skipped: 0,
            })
            .await;

        let entries: Vec<_> = std::fs::read_dir(&logs).unwrap().collect();
        assert_eq!(entries.len(), 1);
        let path = entries[0].as_ref().unwrap().path();
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("run_"));
        let content = std::fs::read_to_string(path).unwrap();
        let lines: Vec<serde_json::Value> = content
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["event"], "run_started");
        assert_eq!(lines[1]["event"], "run_finished");
        assert_eq!(lines[1]["failed"], 1);
        assert!(lines[1]["timestamp"].is_string());
    }

    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "no space left"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_failing_log_is_dropped_and_events_still_flow() {
        let session = Session::new(None, "test");
        *session.log_writer.lock().await = Some(Box::new(FullDisk));
        let mut rx = session.subscribe();

        session.publish(RunEvent::RunStarted { run_id: session.id }).await;
        assert!(session.log_writer.lock().await.is_none());
        assert_eq!(rx.recv().await.unwrap(), RunEvent::RunStarted { run_id: session.id });

        session
            .publish(RunEvent::RunFinished {
                passed: 0,
                failed: 0,
                skipped: 0,
            })
            .await;
        assert_eq!(session.events().await.len(), 2);
    }
}

//! Declarative JSON plans.
//!
//! A plan lists suites whose use-cases are sequences of [`ActionType`]
//! steps:
//!
//! ```json
//! {
//!   "suites": [{
//!     "document": "test-pages/button.html",
//!     "clear_on_finish": true,
//!     "use_cases": [{
//!       "name": "Clicking counts",
//!       "steps": [
//!         { "type": "Click", "category": "button", "label": "Click this" },
//!         { "type": "SomeElementsMatch", "category": "area", "label": "1 clicks" }
//!       ]
//!     }]
//!   }]
//! }
//! ```
//!
//! Labels use the string notation of [`MatchExpression`](crate::pattern::MatchExpression)
//! or a `{ "regex": "...", "flags": "i" }` object.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::action::ActionType;
use crate::config::EngineConfig;
use crate::executor::ActionExecutor;
use crate::host::DocumentHost;
use crate::suite::{test_document, DocumentOptions, SuiteRunner, TestDocument};

/// Errors from reading a plan.
#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Cannot read plan {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid plan: {0}")]
    Json(#[from] serde_json::Error),
}

/// A whole plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub suites: Vec<SuitePlan>,
}

/// One suite of a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuitePlan {
    pub document: String,
    #[serde(default)]
    pub clear_on_finish: bool,
    #[serde(default)]
    pub use_cases: Vec<UseCasePlan>,
}

/// One use-case of a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UseCasePlan {
    pub name: String,
    #[serde(default)]
    pub steps: Vec<ActionType>,
}

impl Plan {
    pub fn from_json(json: &str) -> Result<Self, PlanError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a plan file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, PlanError> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path).await.map_err(|source| PlanError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Total use-cases across all suites.
    pub fn use_case_count(&self) -> usize {
        self.suites.iter().map(|suite| suite.use_cases.len()).sum()
    }

    /// Builds the suites, in plan order.
    pub fn test_documents(&self) -> Vec<TestDocument> {
        self.suites.iter().map(SuitePlan::test_document).collect()
    }

    /// Queues every suite on a runner using `host` and `config`.
    pub fn into_runner(self, host: Arc<dyn DocumentHost>, config: EngineConfig) -> SuiteRunner {
        self.test_documents()
            .into_iter()
            .fold(SuiteRunner::new(host).with_config(config), SuiteRunner::suite)
    }
}

impl SuitePlan {
    fn test_document(&self) -> TestDocument {
        let options = DocumentOptions {
            clear_on_finish: self.clear_on_finish,
        };
        self.use_cases
            .iter()
            .fold(test_document(&self.document, options), |document, use_case| {
                let steps = Arc::new(use_case.steps.clone());
                document.use_case(&use_case.name, move |ui| {
                    let steps = Arc::clone(&steps);
                    Box::pin(async move {
                        let mut executor = ActionExecutor::new(ui);
                        for step in steps.iter() {
                            executor.try_execute(step.clone()).await?;
                        }
                        Ok(())
                    })
                })
            })
    }
}

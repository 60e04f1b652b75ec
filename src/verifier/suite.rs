use crate::verifier::engine::{VerificationOutcome, VerificationRequest, Verifier};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// A named verification within a suite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteCase {
    pub name: String,
    pub request: VerificationRequest,
}

impl SuiteCase {
    pub fn new<S: Into<String>>(name: S, request: VerificationRequest) -> Self {
        Self {
            name: name.into(),
            request,
        }
    }
}

/// How a single case ended
#[derive(Debug, Serialize)]
#[serde(tag = "result", rename_all = "kebab-case")]
pub enum CaseResult {
    Completed(VerificationOutcome),
    /// The suite itself is wrong; the API was possibly never called
    AuthoringError { message: String },
}

impl CaseResult {
    pub fn outcome(&self) -> Option<&VerificationOutcome> {
        match self {
            CaseResult::Completed(outcome) => Some(outcome),
            CaseResult::AuthoringError { .. } => None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CaseReport {
    pub name: String,
    #[serde(flatten)]
    pub result: CaseResult,
}

/// Aggregated results of a suite run, in case order
#[derive(Debug, Serialize)]
pub struct SuiteReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub cases: Vec<CaseReport>,
}

impl SuiteReport {
    pub fn total(&self) -> usize {
        self.cases.len()
    }

    pub fn passed(&self) -> usize {
        self.cases
            .iter()
            .filter(|case| case.result.outcome().is_some_and(|o| o.passed))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.cases
            .iter()
            .filter(|case| case.result.outcome().is_some_and(|o| !o.passed))
            .count()
    }

    pub fn errored(&self) -> usize {
        self.total() - self.passed() - self.failed()
    }

    pub fn is_success(&self) -> bool {
        self.passed() == self.total()
    }
}

impl fmt::Display for SuiteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for case in &self.cases {
            match &case.result {
                CaseResult::Completed(outcome) => writeln!(f, "{} ... {}", case.name, outcome)?,
                CaseResult::AuthoringError { message } => writeln!(f, "{} ... ERROR {}", case.name, message)?,
            }
        }
        write!(
            f,
            "{} cases: {} passed, {} failed, {} authoring errors",
            self.total(),
            self.passed(),
            self.failed(),
            self.errored()
        )
    }
}

/// Fans out suite cases over a shared verifier
pub struct SuiteRunner {
    verifier: Arc<Verifier>,
    max_concurrency: usize,
}

impl SuiteRunner {
    pub fn new(verifier: Arc<Verifier>) -> Self {
        let max_concurrency = verifier.config().max_concurrency.max(1);
        Self {
            verifier,
            max_concurrency,
        }
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// Run every case, at most `max_concurrency` at a time, and wait for all
    pub async fn run(&self, cases: Vec<SuiteCase>) -> SuiteReport {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!("Suite run {} started: {} cases", run_id, cases.len());

        let reports: Vec<CaseReport> = stream::iter(cases)
            .map(|case| {
                let verifier = self.verifier.clone();
                async move {
                    let result = match verifier.verify(&case.request).await {
                        Ok(outcome) => CaseResult::Completed(outcome),
                        Err(e) => {
                            error!("Case '{}' is misconfigured: {}", case.name, e);
                            CaseResult::AuthoringError { message: e.to_string() }
                        }
                    };
                    CaseReport { name: case.name, result }
                }
            })
            .buffered(self.max_concurrency)
            .collect()
            .await;

        let report = SuiteReport {
            run_id,
            started_at,
            cases: reports,
        };
        info!(
            "Suite run {} finished: {} passed, {} failed, {} errored",
            run_id,
            report.passed(),
            report.failed(),
            report.errored()
        );
        report
    }
}

//! Shared data model for AutoApply runs.
//!
//! Everything here is transient, in-memory state for a single automation
//! run. Persistence belongs to the caller's `ResultSink` collaborator; no
//! type in this crate outlives the run that produced it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Configuration for one automation run. Immutable once the run starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Portal account name.
    pub username: String,
    /// Portal account secret, already decrypted by the credential provider.
    pub secret: String,
    /// Search keyword, e.g. a job title.
    #[serde(default)]
    pub job_title: Option<String>,
    /// Search location.
    #[serde(default)]
    pub job_location: Option<String>,
    /// Free-text CV body pasted into the application.
    pub cv_text: String,
    /// Cap on attempted applications, counted per attempt, not per candidate
    /// inspected.
    #[serde(default = "default_max_applications")]
    pub max_applications: usize,
    #[serde(default = "default_headless")]
    pub headless: bool,
    /// Delay inserted between page interactions, in milliseconds.
    #[serde(default = "default_action_delay_ms")]
    pub action_delay_ms: u64,
    /// Directory for diagnostic screenshots. None disables capture.
    #[serde(default)]
    pub screenshots_dir: Option<String>,
}

fn default_max_applications() -> usize {
    5
}

fn default_headless() -> bool {
    true
}

fn default_action_delay_ms() -> u64 {
    50
}

/// How a discovered job's application flow was classified.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobClassification {
    /// First-party multi-step wizard the engine can drive.
    Internal,
    /// Redirects to a third-party applicant tracking system. Skipped.
    External,
    /// Could not be determined. Skipped.
    Unknown,
}

/// A job posting discovered by the search step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateJob {
    pub title: String,
    pub url: String,
    pub classification: Option<JobClassification>,
}

impl CandidateJob {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            classification: None,
        }
    }
}

/// Logical application steps, in the order the driver visits them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StepName {
    ContactDetails,
    RightToWork,
    CvText,
    Safeguarding,
    FitnessToPractice,
    GuaranteedInterview,
    EqualityDiversity,
    SocioEconomic,
    Declaration,
}

impl StepName {
    /// The fixed step sequence. The driver visits every entry once per
    /// application, in this order, whether or not the portal presents it.
    pub const SEQUENCE: [StepName; 9] = [
        StepName::ContactDetails,
        StepName::RightToWork,
        StepName::CvText,
        StepName::Safeguarding,
        StepName::FitnessToPractice,
        StepName::GuaranteedInterview,
        StepName::EqualityDiversity,
        StepName::SocioEconomic,
        StepName::Declaration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StepName::ContactDetails => "Contact Details",
            StepName::RightToWork => "Right to Work",
            StepName::CvText => "CV",
            StepName::Safeguarding => "Safeguarding",
            StepName::FitnessToPractice => "Fitness to Practice",
            StepName::GuaranteedInterview => "Guaranteed Interview Scheme",
            StepName::EqualityDiversity => "Equality & Diversity",
            StepName::SocioEconomic => "Socio-Economic Background",
            StepName::Declaration => "Declaration",
        }
    }
}

impl std::fmt::Display for StepName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one step executor invocation. Append-only within an attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepOutcome {
    pub step: StepName,
    pub success: bool,
    /// Free-text diagnostic, populated on failure.
    #[serde(default)]
    pub detail: Option<String>,
}

impl StepOutcome {
    pub fn succeeded(step: StepName) -> Self {
        Self {
            step,
            success: true,
            detail: None,
        }
    }

    pub fn failed(step: StepName, detail: impl Into<String>) -> Self {
        Self {
            step,
            success: false,
            detail: Some(detail.into()),
        }
    }
}

/// One candidate job's full application attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationResult {
    pub job_title: String,
    pub job_url: String,
    pub success: bool,
    /// Best-effort reference number scraped from the confirmation page.
    /// May be absent even on success.
    pub reference_number: Option<String>,
    pub error: Option<String>,
    pub steps: Vec<StepOutcome>,
    pub attempted_at: DateTime<Utc>,
}

impl ApplicationResult {
    pub fn started(job: &CandidateJob) -> Self {
        Self {
            job_title: job.title.clone(),
            job_url: job.url.clone(),
            success: false,
            reference_number: None,
            error: None,
            steps: Vec::new(),
            attempted_at: Utc::now(),
        }
    }

    pub fn record(&mut self, outcome: StepOutcome) {
        self.steps.push(outcome);
    }
}

/// Aggregate over every attempt in a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub results: Vec<ApplicationResult>,
}

impl RunSummary {
    pub fn from_results(results: Vec<ApplicationResult>) -> Self {
        let successful = results.iter().filter(|r| r.success).count();
        Self {
            total: results.len(),
            successful,
            failed: results.len() - successful,
            results,
        }
    }

    pub fn empty() -> Self {
        Self::from_results(Vec::new())
    }
}

//! Contracts for the external collaborators a run touches.
//!
//! Implementations live with the caller (database, key store, mailer); the
//! engine only depends on these traits. Sink and notifier failures are
//! logged by the callers here and never abort a run.

use anyhow::Result;
use async_trait::async_trait;

use autoapply_models::{ApplicationResult, RunSummary};

/// Portal account credentials, already decrypted.
#[derive(Debug, Clone)]
pub struct PortalCredentials {
    pub username: String,
    pub secret: String,
}

/// The applicant's default free-text profile.
#[derive(Debug, Clone)]
pub struct ApplicantProfile {
    pub cv_text: String,
}

/// Stored search criteria for a run.
#[derive(Debug, Clone)]
pub struct JobSearchConfig {
    pub job_title: Option<String>,
    pub job_location: Option<String>,
}

#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn credentials(&self, user_id: i64, portal: &str) -> Result<Option<PortalCredentials>>;
}

#[async_trait]
pub trait ProfileProvider: Send + Sync {
    async fn default_profile(&self, user_id: i64) -> Result<Option<ApplicantProfile>>;
}

#[async_trait]
pub trait JobConfigProvider: Send + Sync {
    async fn config(&self, config_id: i64) -> Result<Option<JobSearchConfig>>;
}

#[async_trait]
pub trait ResultSink: Send + Sync {
    async fn record_application(
        &self,
        result: &ApplicationResult,
        user_id: i64,
        config_id: i64,
    ) -> Result<()>;
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_run_summary(&self, email: &str, summary: &RunSummary) -> Result<()>;

    async fn send_run_failure(&self, email: &str, error: &str) -> Result<()>;
}

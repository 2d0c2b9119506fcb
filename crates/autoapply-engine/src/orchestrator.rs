//! Run orchestration: browser lifecycle, the per-job loop, and the
//! service facade that wires in the caller's collaborators.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};
use uuid::Uuid;

use autoapply_browser::{ChromeSession, PortalPage};
use autoapply_models::{JobClassification, RunConfig, RunSummary};

use crate::collaborators::{
    CredentialProvider, JobConfigProvider, Notifier, ProfileProvider, ResultSink,
};
use crate::error::AutomationError;
use crate::selectors::SelectorRegistry;
use crate::session::SessionDriver;
use crate::steps::Pacing;

/// A live browser session. The orchestrator holds one for the duration of
/// a run and closes it no matter how the run ends.
#[async_trait]
pub trait PortalSession: Send {
    fn page(&self) -> &dyn PortalPage;

    async fn close(self: Box<Self>);
}

/// Browser factory, behind a trait so tests can hand the orchestrator a
/// scripted session.
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    async fn launch(&self, config: &RunConfig)
    -> Result<Box<dyn PortalSession>, AutomationError>;
}

/// Launches a real Chromium via `autoapply-browser`.
pub struct ChromeLauncher;

struct ChromePortalSession {
    session: ChromeSession,
}

#[async_trait]
impl PortalSession for ChromePortalSession {
    fn page(&self) -> &dyn PortalPage {
        self.session.page()
    }

    async fn close(self: Box<Self>) {
        self.session.close().await;
    }
}

#[async_trait]
impl SessionLauncher for ChromeLauncher {
    async fn launch(
        &self,
        config: &RunConfig,
    ) -> Result<Box<dyn PortalSession>, AutomationError> {
        let session = ChromeSession::launch(config.headless, config.action_delay_ms)
            .await
            .map_err(|error| AutomationError::BrowserLaunch(error.to_string()))?;
        Ok(Box::new(ChromePortalSession { session }))
    }
}

/// Runs one configured automation pass: launch, login, search, then the
/// per-job classify/apply loop up to the configured attempt cap.
pub struct Orchestrator {
    launcher: Arc<dyn SessionLauncher>,
    registry: SelectorRegistry,
    pacing: Pacing,
}

impl Orchestrator {
    pub fn new(launcher: Arc<dyn SessionLauncher>) -> Self {
        Self {
            launcher,
            registry: SelectorRegistry::default(),
            pacing: Pacing::portal(),
        }
    }

    pub fn with_registry(mut self, registry: SelectorRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub async fn run(&self, config: &RunConfig) -> Result<RunSummary, AutomationError> {
        let run_id = Uuid::new_v4();
        info!(%run_id, max_applications = config.max_applications, "starting automation run");

        let session = self.launcher.launch(config).await?;
        let outcome = self.drive(session.page(), config).await;
        session.close().await;

        match &outcome {
            Ok(summary) => info!(
                %run_id,
                total = summary.total,
                successful = summary.successful,
                failed = summary.failed,
                "run finished"
            ),
            Err(error) => error!(%run_id, %error, "run aborted"),
        }
        outcome
    }

    async fn drive(
        &self,
        page: &dyn PortalPage,
        config: &RunConfig,
    ) -> Result<RunSummary, AutomationError> {
        let driver = SessionDriver::new(
            page,
            &self.registry,
            self.pacing,
            config.screenshots_dir.clone(),
        );

        if !driver.login(config).await {
            return Err(AutomationError::LoginFailed);
        }

        let jobs = driver.search(config).await;
        if jobs.is_empty() {
            info!("no search results, nothing to do");
            return Ok(RunSummary::empty());
        }

        let mut results = Vec::new();
        // Counts attempts, not successes: a failed attempt still consumes
        // budget, so a broken wizard cannot make the run loop forever.
        let mut attempts = 0usize;

        for mut job in jobs {
            if attempts >= config.max_applications {
                info!(cap = config.max_applications, "attempt cap reached");
                break;
            }

            let classification = driver.classify(&job).await;
            job.classification = Some(classification);
            if classification != JobClassification::Internal {
                info!(job = %job.title, ?classification, "skipping");
                continue;
            }

            if !driver.start_application().await {
                warn!(job = %job.title, "could not start the application, skipping");
                continue;
            }

            attempts += 1;
            let result = driver.apply(&job, &config.cv_text).await;
            results.push(result);

            if attempts < config.max_applications && !self.pacing.between_applications.is_zero() {
                tokio::time::sleep(self.pacing.between_applications).await;
            }
        }

        Ok(RunSummary::from_results(results))
    }
}

/// A user on whose behalf a run is executed.
#[derive(Debug, Clone)]
pub struct UserRef {
    pub id: i64,
    pub email: String,
}

/// Per-invocation knobs layered over the stored configuration.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub max_applications: usize,
    pub headless: bool,
    pub action_delay_ms: u64,
    pub screenshots_dir: Option<String>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            max_applications: 5,
            headless: true,
            action_delay_ms: 50,
            screenshots_dir: None,
        }
    }
}

/// Facade over the orchestrator plus the caller's collaborators: assembles
/// the run configuration, runs, persists results and notifies the user.
pub struct AutomationService {
    orchestrator: Orchestrator,
    credentials: Arc<dyn CredentialProvider>,
    profiles: Arc<dyn ProfileProvider>,
    configs: Arc<dyn JobConfigProvider>,
    sink: Arc<dyn ResultSink>,
    notifier: Arc<dyn Notifier>,
}

impl AutomationService {
    pub fn new(
        orchestrator: Orchestrator,
        credentials: Arc<dyn CredentialProvider>,
        profiles: Arc<dyn ProfileProvider>,
        configs: Arc<dyn JobConfigProvider>,
        sink: Arc<dyn ResultSink>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            orchestrator,
            credentials,
            profiles,
            configs,
            sink,
            notifier,
        }
    }

    pub async fn run_for_user(
        &self,
        user: &UserRef,
        config_id: i64,
        options: RunOptions,
    ) -> Result<RunSummary, AutomationError> {
        let portal = self.orchestrator.registry.profile.portal_id.clone();

        let credentials = self
            .credentials
            .credentials(user.id, &portal)
            .await?
            .ok_or(AutomationError::MissingCredentials { portal })?;
        let profile = self
            .profiles
            .default_profile(user.id)
            .await?
            .ok_or(AutomationError::MissingProfile)?;
        let search = self
            .configs
            .config(config_id)
            .await?
            .ok_or(AutomationError::MissingConfig { config_id })?;

        let config = RunConfig {
            username: credentials.username,
            secret: credentials.secret,
            job_title: search.job_title,
            job_location: search.job_location,
            cv_text: profile.cv_text,
            max_applications: options.max_applications,
            headless: options.headless,
            action_delay_ms: options.action_delay_ms,
            screenshots_dir: options.screenshots_dir,
        };

        match self.orchestrator.run(&config).await {
            Ok(summary) => {
                for result in &summary.results {
                    if let Err(error) =
                        self.sink.record_application(result, user.id, config_id).await
                    {
                        error!(%error, job = %result.job_title, "failed to persist result");
                    }
                }
                if let Err(error) = self.notifier.send_run_summary(&user.email, &summary).await {
                    warn!(%error, "summary notification failed");
                }
                Ok(summary)
            }
            Err(run_error) => {
                if let Err(error) = self
                    .notifier
                    .send_run_failure(&user.email, &run_error.to_string())
                    .await
                {
                    warn!(%error, "failure notification failed");
                }
                Err(run_error)
            }
        }
    }
}

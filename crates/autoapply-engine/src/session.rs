//! Per-session driver: login, search, classification and the step loop,
//! all against one live page.
//!
//! The driver never propagates a page failure past its own operation.
//! Login reports `false`, search reports an empty list, classification
//! reports `Unknown`, and a step error becomes a failed outcome for that
//! step while the loop continues. Diagnostic screenshots are captured at
//! each containment point when a directory is configured.

use tracing::{debug, info, warn};
use url::Url;

use autoapply_browser::{PortalPage, capture_failure, click_if_present, fill_if_present};
use autoapply_models::{
    ApplicationResult, CandidateJob, JobClassification, RunConfig, StepName, StepOutcome,
};

use crate::selectors::SelectorRegistry;
use crate::steps::{ApplicationStep, Pacing, StepContext, step_sequence};

pub struct SessionDriver<'a> {
    page: &'a dyn PortalPage,
    registry: &'a SelectorRegistry,
    pacing: Pacing,
    screenshots_dir: Option<String>,
}

fn is_external_url(url: &str, external_host: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };
    host == external_host || host.ends_with(&format!(".{external_host}"))
}

impl<'a> SessionDriver<'a> {
    pub fn new(
        page: &'a dyn PortalPage,
        registry: &'a SelectorRegistry,
        pacing: Pacing,
        screenshots_dir: Option<String>,
    ) -> Self {
        Self {
            page,
            registry,
            pacing,
            screenshots_dir,
        }
    }

    async fn capture(&self, label: &str) {
        capture_failure(self.page, self.screenshots_dir.as_deref(), label).await;
    }

    /// Sign in with the configured account. Returns whether the portal
    /// accepted the credentials as far as we can tell.
    pub async fn login(&self, config: &RunConfig) -> bool {
        let profile = &self.registry.profile;

        if let Err(error) = self.page.goto(&profile.candidate_home_url).await {
            warn!(%error, "could not reach the candidate portal");
            self.capture("login-error").await;
            return false;
        }
        self.pacing.settle().await;

        // Already-signed-in sessions skip straight past the link.
        if click_if_present(self.page, &profile.sign_in_link, self.pacing.wait_short).await {
            self.pacing.settle().await;
        }

        if !fill_if_present(
            self.page,
            &profile.username_input,
            &config.username,
            self.pacing.wait_medium,
        )
        .await
        {
            warn!("username field not found");
            self.capture("login-error").await;
            return false;
        }
        self.pacing.breathe().await;

        if !fill_if_present(
            self.page,
            &profile.password_input,
            &config.secret,
            self.pacing.wait_medium,
        )
        .await
        {
            warn!("password field not found");
            self.capture("login-error").await;
            return false;
        }
        self.pacing.breathe().await;

        if !click_if_present(self.page, &profile.login_submit, self.pacing.wait_medium).await {
            warn!("login submit not found");
            self.capture("login-error").await;
            return false;
        }
        self.pacing.settle().await;

        // Some accounts land on a dashboard with a search shortcut.
        if click_if_present(self.page, &profile.go_to_search, self.pacing.wait_short).await {
            self.pacing.settle().await;
        }

        info!(username = %config.username, "logged in");
        true
    }

    /// Run the configured search and scrape the result list. Page failures
    /// yield an empty list.
    pub async fn search(&self, config: &RunConfig) -> Vec<CandidateJob> {
        let profile = &self.registry.profile;

        // An unparseable configured search URL must force a navigation; a
        // prefix check against an empty path would match everything.
        let on_search_page = match Url::parse(&profile.search_url) {
            Ok(target) => match self.page.current_url().await {
                Ok(url) => Url::parse(&url)
                    .map(|url| url.path().starts_with(target.path()))
                    .unwrap_or(false),
                Err(_) => false,
            },
            Err(_) => false,
        };
        if !on_search_page
            && let Err(error) = self.page.goto(&profile.search_url).await
        {
            warn!(%error, "could not reach the search page");
            self.capture("search-error").await;
            return Vec::new();
        }
        self.pacing.settle().await;

        if let Some(title) = &config.job_title {
            fill_if_present(self.page, &profile.keyword_input, title, self.pacing.wait_medium)
                .await;
            self.pacing.breathe().await;
        }
        if let Some(location) = &config.job_location {
            fill_if_present(
                self.page,
                &profile.location_input,
                location,
                self.pacing.wait_medium,
            )
            .await;
            self.pacing.breathe().await;
        }

        if !click_if_present(self.page, &profile.search_submit, self.pacing.wait_medium).await {
            warn!("search submit not found");
            self.capture("search-error").await;
            return Vec::new();
        }
        self.pacing.settle().await;

        match self.page.collect_links(&profile.job_link_selector).await {
            Ok(links) => {
                let jobs: Vec<CandidateJob> = links
                    .into_iter()
                    .filter(|link| !link.href.is_empty())
                    .map(|link| CandidateJob::new(link.text.trim(), link.href))
                    .collect();
                info!(count = jobs.len(), "search results collected");
                jobs
            }
            Err(error) => {
                warn!(%error, "could not scrape search results");
                self.capture("search-error").await;
                Vec::new()
            }
        }
    }

    /// Open the posting and decide whether its application flow is the
    /// first-party wizard or a third-party redirect.
    pub async fn classify(&self, job: &CandidateJob) -> JobClassification {
        let profile = &self.registry.profile;

        if let Err(error) = self.page.goto(&job.url).await {
            warn!(job = %job.title, %error, "could not open job posting");
            return JobClassification::Unknown;
        }
        self.pacing.settle().await;

        if let Ok(url) = self.page.current_url().await {
            if is_external_url(&url, &profile.external_host) {
                return JobClassification::External;
            }
            if url.contains(&profile.application_base_path) {
                return JobClassification::Internal;
            }
        }

        // Follow the apply affordance and see where it lands.
        let mut followed =
            click_if_present(self.page, &profile.apply_link, self.pacing.wait_short).await;
        if !followed {
            followed = self
                .page
                .click_by_text(&["button", "a"], "apply")
                .await
                .unwrap_or(false);
        }
        if !followed {
            debug!(job = %job.title, "no apply affordance found");
            return JobClassification::Unknown;
        }
        if let Err(error) = self.page.wait_for_navigation().await {
            debug!(%error, "navigation after apply did not settle");
        }
        self.pacing.settle().await;

        let Ok(url) = self.page.current_url().await else {
            return JobClassification::Unknown;
        };
        if is_external_url(&url, &profile.external_host) {
            JobClassification::External
        } else if url.contains(&profile.application_base_path) {
            JobClassification::Internal
        } else {
            JobClassification::Unknown
        }
    }

    /// Push past the application landing page into the task list. A job
    /// whose start control cannot be found is skipped without an attempt.
    pub async fn start_application(&self) -> bool {
        let profile = &self.registry.profile;

        if click_if_present(self.page, &profile.start_application, self.pacing.wait_medium).await {
            self.pacing.settle().await;
            return true;
        }
        if self
            .page
            .click_by_text(&["button", "input"], "start application")
            .await
            .unwrap_or(false)
        {
            self.pacing.settle().await;
            return true;
        }
        if self
            .page
            .click_by_text(&["a"], "apply")
            .await
            .unwrap_or(false)
        {
            self.pacing.settle().await;
            return true;
        }
        false
    }

    /// Drive the full step sequence for one job.
    pub async fn apply(&self, job: &CandidateJob, cv_text: &str) -> ApplicationResult {
        let steps = step_sequence(self.registry);
        self.run_steps(&steps, job, cv_text).await
    }

    pub(crate) async fn run_steps(
        &self,
        steps: &[Box<dyn ApplicationStep>],
        job: &CandidateJob,
        cv_text: &str,
    ) -> ApplicationResult {
        let mut result = ApplicationResult::started(job);
        let ctx = StepContext {
            page: self.page,
            cv_text,
            pacing: self.pacing,
        };

        for step in steps {
            let name = step.name();
            debug!(step = %name, job = %job.title, "running step");
            match step.run(&ctx).await {
                Ok(report) => {
                    if report.success {
                        result.record(StepOutcome::succeeded(name));
                    } else {
                        let detail = report
                            .detail
                            .clone()
                            .unwrap_or_else(|| "step did not complete".to_string());
                        warn!(step = %name, %detail, "step failed");
                        result.record(StepOutcome::failed(name, detail));
                    }
                    if name == StepName::Declaration {
                        result.success = report.success;
                        result.reference_number = report.reference_number;
                        if !result.success {
                            result.error = report.detail;
                        }
                    }
                }
                Err(error) => {
                    warn!(step = %name, %error, "step errored, continuing");
                    let label = format!("step-{name:?}").to_lowercase();
                    self.capture(&label).await;
                    result.record(StepOutcome::failed(name, error.to_string()));
                    if name == StepName::Declaration {
                        result.error = Some(error.to_string());
                    }
                }
            }
        }

        if result.success {
            info!(job = %job.title, reference = ?result.reference_number, "application submitted");
        } else {
            warn!(job = %job.title, error = ?result.error, "application not submitted");
        }
        result
    }
}

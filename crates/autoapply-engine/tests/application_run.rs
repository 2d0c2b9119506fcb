//! End-to-end runs against a scripted portal: a fake page that models the
//! candidate site's elements, driven through the real orchestrator.

use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use async_trait::async_trait;

use autoapply_browser::{LinkRef, PortalPage};
use autoapply_engine::{
    AutomationError, Orchestrator, Pacing, PortalSession, SessionLauncher,
};
use autoapply_models::{RunConfig, RunSummary, StepName};

const INTERNAL_JOB_URL: &str = "https://www.jobs.nhs.uk/candidate/application/101";
const EXTERNAL_JOB_URL: &str = "https://apps.trac.jobs/vacancy/202";

#[derive(Default)]
struct FakePage {
    present: HashSet<String>,
    jobs: Vec<LinkRef>,
    confirmation: String,
    fail_body: bool,
    url: Mutex<String>,
    clicks: Mutex<Vec<String>>,
    fills: Mutex<Vec<(String, String)>>,
    searches: AtomicUsize,
}

impl FakePage {
    fn click_count(&self, selector: &str) -> usize {
        self.clicks
            .lock()
            .unwrap()
            .iter()
            .filter(|clicked| *clicked == selector)
            .count()
    }
}

#[async_trait]
impl PortalPage for FakePage {
    async fn goto(&self, url: &str) -> Result<()> {
        *self.url.lock().unwrap() = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.url.lock().unwrap().clone())
    }

    async fn exists(&self, selector: &str) -> Result<bool> {
        Ok(self.present.contains(selector))
    }

    async fn click(&self, selector: &str) -> Result<()> {
        self.clicks.lock().unwrap().push(selector.to_string());
        Ok(())
    }

    async fn clear_and_type(&self, selector: &str, text: &str) -> Result<()> {
        self.fills
            .lock()
            .unwrap()
            .push((selector.to_string(), text.to_string()));
        Ok(())
    }

    async fn is_checked(&self, _selector: &str) -> Result<bool> {
        Ok(false)
    }

    async fn click_by_text(&self, _tags: &[&str], _needle: &str) -> Result<bool> {
        Ok(false)
    }

    async fn collect_links(&self, _selector: &str) -> Result<Vec<LinkRef>> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        Ok(self.jobs.clone())
    }

    async fn body_text(&self) -> Result<String> {
        if self.fail_body {
            return Err(anyhow!("page detached"));
        }
        Ok(self.confirmation.clone())
    }

    async fn wait_for_navigation(&self) -> Result<()> {
        Ok(())
    }

    async fn screenshot(&self, _path: &Path) -> Result<()> {
        Ok(())
    }
}

struct FakeSession {
    page: Arc<FakePage>,
    closed: Arc<AtomicBool>,
}

#[async_trait]
impl PortalSession for FakeSession {
    fn page(&self) -> &dyn PortalPage {
        self.page.as_ref()
    }

    async fn close(self: Box<Self>) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

struct FakeLauncher {
    page: Arc<FakePage>,
    closed: Arc<AtomicBool>,
}

impl FakeLauncher {
    fn new(page: Arc<FakePage>) -> Self {
        Self {
            page,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }
}

#[async_trait]
impl SessionLauncher for FakeLauncher {
    async fn launch(&self, _config: &RunConfig) -> Result<Box<dyn PortalSession>, AutomationError> {
        Ok(Box::new(FakeSession {
            page: Arc::clone(&self.page),
            closed: Arc::clone(&self.closed),
        }))
    }
}

/// Every element of a healthy portal: login form, search form, start
/// control, all nine task pages and the confirmation.
fn full_portal() -> HashSet<String> {
    [
        "#candidate_sign_in",
        "#username",
        "#password",
        "#submit-button",
        "#keyword",
        "#location",
        "#search",
        "#save_continue[value=\"Start Application\"]",
        "#contact_details_task_link",
        "#communication_preference_id_option_1",
        "#right_to_work_task_link",
        "#rtw_choice_id_option_1",
        "a[href*=\"/cv/input\"]",
        "#cv",
        "#safeguarding_task_link",
        "#convictions_id_option_2",
        "#fitness_to_practice_task_link",
        "#gis_task_link",
        "#physical_limitation_id_option_2",
        "#armedForcesVeteran_id_option_2",
        "#equality_and_diversity_task_link",
        "#gender_choice_id_option_1",
        "#gender_same_at_birth_id_option_1",
        "#marital_status_id_option_2",
        "#pregnant_or_maternity_id_option_2",
        "#describe_sexuality_id_option_7",
        "#age_range_id_option_7",
        "#ethnicity_id_option_18",
        "#religion_id_option_11",
        "#socio_economic_background_task_link",
        "#mainHouseholdOccupation_option_10",
        "#attendedSchoolType_option_7",
        "#eligibleForFreeSchoolMeals_option_6",
        "#declaration_task_link",
        "#declaration_id",
        "#send_application",
        "#save_continue",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn internal_job(index: usize) -> LinkRef {
    LinkRef {
        text: format!("Staff Nurse {index}"),
        href: format!("https://www.jobs.nhs.uk/candidate/application/{}", 100 + index),
    }
}

fn config(max_applications: usize) -> RunConfig {
    RunConfig {
        username: "applicant@example.com".into(),
        secret: "hunter2".into(),
        job_title: Some("Nurse".into()),
        job_location: Some("London".into()),
        cv_text: "Registered nurse, ten years of ward experience.".into(),
        max_applications,
        headless: true,
        action_delay_ms: 0,
        screenshots_dir: None,
    }
}

fn orchestrator(page: &Arc<FakePage>) -> (Orchestrator, Arc<AtomicBool>) {
    let launcher = FakeLauncher::new(Arc::clone(page));
    let closed = Arc::clone(&launcher.closed);
    let orchestrator = Orchestrator::new(Arc::new(launcher)).with_pacing(Pacing::none());
    (orchestrator, closed)
}

async fn run(page: &Arc<FakePage>, max_applications: usize) -> Result<RunSummary, AutomationError> {
    let (orchestrator, _) = orchestrator(page);
    orchestrator.run(&config(max_applications)).await
}

#[tokio::test]
async fn submits_one_internal_job_end_to_end() {
    let page = Arc::new(FakePage {
        present: full_portal(),
        jobs: vec![LinkRef {
            text: "Staff Nurse".into(),
            href: INTERNAL_JOB_URL.into(),
        }],
        confirmation: "Thank you. Your reference: ABC-123".into(),
        ..FakePage::default()
    });

    let summary = run(&page, 5).await.unwrap();

    assert_eq!(summary.total, 1);
    assert_eq!(summary.successful, 1);
    assert_eq!(summary.failed, 0);

    let result = &summary.results[0];
    assert!(result.success);
    assert_eq!(result.reference_number.as_deref(), Some("ABC-123"));
    assert_eq!(result.job_url, INTERNAL_JOB_URL);

    let visited: Vec<StepName> = result.steps.iter().map(|s| s.step).collect();
    assert_eq!(visited, StepName::SEQUENCE.to_vec());

    assert_eq!(page.click_count("#send_application"), 1);
    let fills = page.fills.lock().unwrap();
    assert!(fills.iter().any(|(sel, text)| sel == "#cv" && text.contains("Registered nurse")));
}

#[tokio::test]
async fn attempt_cap_bounds_the_run() {
    let page = Arc::new(FakePage {
        present: full_portal(),
        jobs: (1..=5).map(internal_job).collect(),
        confirmation: "Reference: JOB-1".into(),
        ..FakePage::default()
    });

    let summary = run(&page, 2).await.unwrap();

    assert_eq!(summary.total, 2);
    assert_eq!(page.click_count("#send_application"), 2);
}

#[tokio::test]
async fn external_postings_are_never_attempted() {
    let page = Arc::new(FakePage {
        present: full_portal(),
        jobs: vec![
            LinkRef {
                text: "Externally Hosted Role".into(),
                href: EXTERNAL_JOB_URL.into(),
            },
            internal_job(1),
        ],
        confirmation: "Reference: JOB-1".into(),
        ..FakePage::default()
    });

    let summary = run(&page, 5).await.unwrap();

    assert_eq!(summary.total, 1);
    assert_eq!(summary.results[0].job_title, "Staff Nurse 1");
}

#[tokio::test]
async fn missing_declaration_checkbox_fails_the_attempt() {
    let mut present = full_portal();
    present.remove("#declaration_id");
    let page = Arc::new(FakePage {
        present,
        jobs: vec![internal_job(1)],
        ..FakePage::default()
    });

    let summary = run(&page, 5).await.unwrap();

    assert_eq!(summary.total, 1);
    assert_eq!(summary.successful, 0);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.total, summary.successful + summary.failed);

    let result = &summary.results[0];
    assert!(!result.success);
    assert!(result.reference_number.is_none());
    assert_eq!(result.error.as_deref(), Some("declaration checkbox not found"));
    assert_eq!(page.click_count("#send_application"), 0);
}

#[tokio::test]
async fn missing_task_link_counts_as_already_complete() {
    let mut present = full_portal();
    present.remove("#contact_details_task_link");
    let page = Arc::new(FakePage {
        present,
        jobs: vec![internal_job(1)],
        confirmation: "Reference: JOB-1".into(),
        ..FakePage::default()
    });

    let summary = run(&page, 5).await.unwrap();

    let result = &summary.results[0];
    assert!(result.success);
    let contact = result
        .steps
        .iter()
        .find(|s| s.step == StepName::ContactDetails)
        .unwrap();
    assert!(contact.success);
    assert_eq!(page.click_count("#communication_preference_id_option_1"), 0);
}

#[tokio::test]
async fn failed_login_aborts_and_still_closes_the_browser() {
    let mut present = full_portal();
    present.remove("#username");
    let page = Arc::new(FakePage {
        present,
        jobs: vec![internal_job(1)],
        ..FakePage::default()
    });

    let (orchestrator, closed) = orchestrator(&page);
    let outcome = orchestrator.run(&config(5)).await;

    assert!(matches!(outcome, Err(AutomationError::LoginFailed)));
    assert_eq!(page.searches.load(Ordering::SeqCst), 0);
    assert!(closed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn unreadable_confirmation_page_degrades_to_a_null_reference() {
    let page = Arc::new(FakePage {
        present: full_portal(),
        jobs: vec![internal_job(1)],
        fail_body: true,
        ..FakePage::default()
    });

    let summary = run(&page, 5).await.unwrap();

    assert_eq!(summary.total, 1);
    assert_eq!(summary.successful, 1);
    let result = &summary.results[0];
    assert!(result.success);
    assert!(result.reference_number.is_none());
    assert!(result.error.is_none());
    assert_eq!(result.steps.len(), StepName::SEQUENCE.len());
    assert!(result.steps.iter().all(|step| step.success));
    assert_eq!(page.click_count("#send_application"), 1);
}

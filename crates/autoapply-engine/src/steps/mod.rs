//! Step executors for the application wizard.
//!
//! Each executor completes one logical step and shares the same contract:
//!
//! - Entry guard: try the step's task link; if it is absent the portal
//!   considers the step complete, so the executor returns success without
//!   touching anything else.
//! - Body: answer the step's questions through the soft primitives. A
//!   single missing control never aborts the step.
//! - Exit: attempt the save/continue controls; absence is logged, not
//!   failed.
//!
//! The declaration is the exception on both ends: it proceeds without a
//! task link (the wizard often lands on it directly) and its success is
//! defined by checkbox plus submission, because that is what decides
//! whether an application went in.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tokio::time::sleep;

use autoapply_browser::{
    MEDIUM_TIMEOUT, PortalPage, SHORT_TIMEOUT, click_if_present, select_radio_if_present,
    wait_for_any,
};
use autoapply_models::StepName;

use crate::selectors::{SelectorRegistry, StepSelectors};

mod contact_details;
mod cv_text;
mod declaration;
mod equality_diversity;
mod fitness_to_practice;
mod guaranteed_interview;
mod right_to_work;
mod safeguarding;
mod socio_economic;

pub use contact_details::ContactDetailsStep;
pub use cv_text::CvTextStep;
pub use declaration::DeclarationStep;
pub use equality_diversity::EqualityDiversityStep;
pub use fitness_to_practice::FitnessToPracticeStep;
pub use guaranteed_interview::GuaranteedInterviewStep;
pub use right_to_work::RightToWorkStep;
pub use safeguarding::SafeguardingStep;
pub use socio_economic::SocioEconomicStep;

/// Waits and settling delays for one run. Element waits bound how long the
/// primitives poll; pauses pace interactions so the portal is not hammered.
/// Tests zero everything.
#[derive(Debug, Clone, Copy)]
pub struct Pacing {
    pub wait_short: Duration,
    pub wait_medium: Duration,
    pub page_settle: Duration,
    pub input_pause: Duration,
    pub between_applications: Duration,
}

impl Pacing {
    pub fn portal() -> Self {
        Self {
            wait_short: SHORT_TIMEOUT,
            wait_medium: MEDIUM_TIMEOUT,
            page_settle: Duration::from_secs(3),
            input_pause: Duration::from_secs(1),
            between_applications: Duration::from_secs(5),
        }
    }

    pub fn none() -> Self {
        Self {
            wait_short: Duration::ZERO,
            wait_medium: Duration::ZERO,
            page_settle: Duration::ZERO,
            input_pause: Duration::ZERO,
            between_applications: Duration::ZERO,
        }
    }

    pub async fn settle(&self) {
        if !self.page_settle.is_zero() {
            sleep(self.page_settle).await;
        }
    }

    pub async fn breathe(&self) {
        if !self.input_pause.is_zero() {
            sleep(self.input_pause).await;
        }
    }
}

/// Everything a step executor may touch during one invocation.
pub struct StepContext<'a> {
    pub page: &'a dyn PortalPage,
    pub cv_text: &'a str,
    pub pacing: Pacing,
}

/// Outcome of one executor invocation.
#[derive(Debug, Clone)]
pub struct StepReport {
    pub success: bool,
    pub detail: Option<String>,
    /// Populated by the declaration when a confirmation page yields one.
    pub reference_number: Option<String>,
}

impl StepReport {
    pub fn completed() -> Self {
        Self {
            success: true,
            detail: None,
            reference_number: None,
        }
    }

    pub fn submitted(reference_number: Option<String>) -> Self {
        Self {
            success: true,
            detail: None,
            reference_number,
        }
    }

    pub fn failed(detail: impl Into<String>) -> Self {
        Self {
            success: false,
            detail: Some(detail.into()),
            reference_number: None,
        }
    }
}

/// One logical wizard step.
///
/// `run` may return `Err` for unexpected page-level failures; the session
/// driver converts that into a failed outcome for this step only and moves
/// on to the next one.
#[async_trait]
pub trait ApplicationStep: Send + Sync {
    fn name(&self) -> StepName;

    async fn run(&self, ctx: &StepContext<'_>) -> Result<StepReport>;
}

/// The fixed sequence the driver visits for every application.
pub fn step_sequence(registry: &SelectorRegistry) -> Vec<Box<dyn ApplicationStep>> {
    vec![
        Box::new(ContactDetailsStep::new(
            registry.step(StepName::ContactDetails).clone(),
        )),
        Box::new(RightToWorkStep::new(
            registry.step(StepName::RightToWork).clone(),
        )),
        Box::new(CvTextStep::new(registry.step(StepName::CvText).clone())),
        Box::new(SafeguardingStep::new(
            registry.step(StepName::Safeguarding).clone(),
        )),
        Box::new(FitnessToPracticeStep::new(
            registry.step(StepName::FitnessToPractice).clone(),
        )),
        Box::new(GuaranteedInterviewStep::new(
            registry.step(StepName::GuaranteedInterview).clone(),
        )),
        Box::new(EqualityDiversityStep::new(
            registry.step(StepName::EqualityDiversity).clone(),
        )),
        Box::new(SocioEconomicStep::new(
            registry.step(StepName::SocioEconomic).clone(),
        )),
        Box::new(DeclarationStep::new(
            registry.step(StepName::Declaration).clone(),
        )),
    ]
}

/// Entry guard shared by the executors: click the task link, settle if it
/// was there.
pub(crate) async fn enter_step(ctx: &StepContext<'_>, selectors: &StepSelectors) -> bool {
    let entered = click_if_present(ctx.page, &selectors.task_link, ctx.pacing.wait_medium).await;
    if entered {
        ctx.pacing.settle().await;
    }
    entered
}

/// Click through an optional intro page.
pub(crate) async fn pass_intro(ctx: &StepContext<'_>, selectors: &StepSelectors) {
    if let Some(intro) = &selectors.intro_continue
        && click_if_present(ctx.page, intro, ctx.pacing.wait_short).await
    {
        ctx.pacing.settle().await;
    }
}

/// Attempt the step's save/continue controls. Absence is tolerated.
pub(crate) async fn save_and_exit(ctx: &StepContext<'_>, selectors: &StepSelectors) {
    if let Some(save) = &selectors.save_continue {
        click_if_present(ctx.page, save, ctx.pacing.wait_medium).await;
        ctx.pacing.settle().await;
    }
    if let Some(exit) = &selectors.exit_continue {
        click_if_present(ctx.page, exit, ctx.pacing.wait_short).await;
        ctx.pacing.settle().await;
    }
}

/// Answer a battery of radio questions in order.
///
/// When the portal renders one question per page, the next answer control
/// is not on screen after answering, so an incremental save-continue is
/// clicked to advance. On a single-page battery every control is already
/// present and the incremental save never fires.
pub(crate) async fn answer_battery(ctx: &StepContext<'_>, selectors: &StepSelectors) {
    for (index, answer) in selectors.answers.iter().enumerate() {
        select_radio_if_present(ctx.page, answer, ctx.pacing.wait_medium).await;
        ctx.pacing.breathe().await;

        if let Some(next) = selectors.answers.get(index + 1)
            && wait_for_any(ctx.page, next, Duration::ZERO).await.is_none()
            && let Some(save) = &selectors.save_continue
        {
            click_if_present(ctx.page, save, ctx.pacing.wait_short).await;
            ctx.pacing.settle().await;
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashSet;
    use std::path::Path;
    use std::sync::Mutex;

    use anyhow::Result;
    use async_trait::async_trait;
    use autoapply_browser::{LinkRef, PortalPage};

    /// Scripted page for step-level tests: a set of present selectors and
    /// a click/fill log.
    #[derive(Default)]
    pub struct ScriptedPage {
        pub present: HashSet<String>,
        pub checked: HashSet<String>,
        pub body: String,
        pub fail_body: bool,
        pub url: Mutex<String>,
        pub clicks: Mutex<Vec<String>>,
        pub fills: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedPage {
        pub fn with_present<const N: usize>(selectors: [&str; N]) -> Self {
            Self {
                present: selectors.iter().map(|s| s.to_string()).collect(),
                ..Self::default()
            }
        }

        pub fn click_count(&self, selector: &str) -> usize {
            self.clicks
                .lock()
                .unwrap()
                .iter()
                .filter(|clicked| *clicked == selector)
                .count()
        }
    }

    #[async_trait]
    impl PortalPage for ScriptedPage {
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

        async fn is_checked(&self, selector: &str) -> Result<bool> {
            Ok(self.checked.contains(selector))
        }

        async fn click_by_text(&self, _tags: &[&str], _needle: &str) -> Result<bool> {
            Ok(false)
        }

        async fn collect_links(&self, _selector: &str) -> Result<Vec<LinkRef>> {
            Ok(Vec::new())
        }

        async fn body_text(&self) -> Result<String> {
            if self.fail_body {
                anyhow::bail!("page detached");
            }
            Ok(self.body.clone())
        }

        async fn wait_for_navigation(&self) -> Result<()> {
            Ok(())
        }

        async fn screenshot(&self, _path: &Path) -> Result<()> {
            Ok(())
        }
    }
}

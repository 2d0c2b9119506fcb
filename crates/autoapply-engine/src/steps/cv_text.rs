use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, warn};

use autoapply_browser::fill_if_present;
use autoapply_models::StepName;

use super::{ApplicationStep, StepContext, StepReport, enter_step, save_and_exit};
use crate::selectors::StepSelectors;

/// Pastes the applicant's CV text into the free-text CV field.
///
/// Unlike the survey steps this one fails when its input is missing: an
/// application without a CV is not worth submitting.
pub struct CvTextStep {
    selectors: StepSelectors,
}

impl CvTextStep {
    pub fn new(selectors: StepSelectors) -> Self {
        Self { selectors }
    }
}

#[async_trait]
impl ApplicationStep for CvTextStep {
    fn name(&self) -> StepName {
        StepName::CvText
    }

    async fn run(&self, ctx: &StepContext<'_>) -> Result<StepReport> {
        if !enter_step(ctx, &self.selectors).await {
            debug!("cv already complete");
            return Ok(StepReport::completed());
        }

        let Some(input) = &self.selectors.text_input else {
            return Ok(StepReport::failed("no cv input configured"));
        };
        if !fill_if_present(ctx.page, input, ctx.cv_text, ctx.pacing.wait_medium).await {
            warn!("cv textarea not found");
            return Ok(StepReport::failed("cv textarea not found"));
        }
        ctx.pacing.breathe().await;

        save_and_exit(ctx, &self.selectors).await;
        Ok(StepReport::completed())
    }
}

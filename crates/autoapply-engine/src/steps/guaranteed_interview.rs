use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use autoapply_models::StepName;

use super::{ApplicationStep, StepContext, StepReport, answer_battery, enter_step, save_and_exit};
use crate::selectors::StepSelectors;

/// Declines the guaranteed interview scheme questions.
pub struct GuaranteedInterviewStep {
    selectors: StepSelectors,
}

impl GuaranteedInterviewStep {
    pub fn new(selectors: StepSelectors) -> Self {
        Self { selectors }
    }
}

#[async_trait]
impl ApplicationStep for GuaranteedInterviewStep {
    fn name(&self) -> StepName {
        StepName::GuaranteedInterview
    }

    async fn run(&self, ctx: &StepContext<'_>) -> Result<StepReport> {
        if !enter_step(ctx, &self.selectors).await {
            debug!("guaranteed interview already complete");
            return Ok(StepReport::completed());
        }

        answer_battery(ctx, &self.selectors).await;
        save_and_exit(ctx, &self.selectors).await;
        Ok(StepReport::completed())
    }
}

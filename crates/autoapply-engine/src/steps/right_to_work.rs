use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use autoapply_models::StepName;

use super::{ApplicationStep, StepContext, StepReport, answer_battery, enter_step, save_and_exit};
use crate::selectors::StepSelectors;

/// Answers the right-to-work question affirmatively.
pub struct RightToWorkStep {
    selectors: StepSelectors,
}

impl RightToWorkStep {
    pub fn new(selectors: StepSelectors) -> Self {
        Self { selectors }
    }
}

#[async_trait]
impl ApplicationStep for RightToWorkStep {
    fn name(&self) -> StepName {
        StepName::RightToWork
    }

    async fn run(&self, ctx: &StepContext<'_>) -> Result<StepReport> {
        if !enter_step(ctx, &self.selectors).await {
            debug!("right to work already complete");
            return Ok(StepReport::completed());
        }

        answer_battery(ctx, &self.selectors).await;
        save_and_exit(ctx, &self.selectors).await;
        Ok(StepReport::completed())
    }
}

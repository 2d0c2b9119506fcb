use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use autoapply_models::StepName;

use super::{
    ApplicationStep, StepContext, StepReport, answer_battery, enter_step, pass_intro, save_and_exit,
};
use crate::selectors::StepSelectors;

/// Declares no convictions on the safeguarding page.
pub struct SafeguardingStep {
    selectors: StepSelectors,
}

impl SafeguardingStep {
    pub fn new(selectors: StepSelectors) -> Self {
        Self { selectors }
    }
}

#[async_trait]
impl ApplicationStep for SafeguardingStep {
    fn name(&self) -> StepName {
        StepName::Safeguarding
    }

    async fn run(&self, ctx: &StepContext<'_>) -> Result<StepReport> {
        if !enter_step(ctx, &self.selectors).await {
            debug!("safeguarding already complete");
            return Ok(StepReport::completed());
        }

        pass_intro(ctx, &self.selectors).await;
        answer_battery(ctx, &self.selectors).await;
        save_and_exit(ctx, &self.selectors).await;
        Ok(StepReport::completed())
    }
}

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use autoapply_models::StepName;

use super::{ApplicationStep, StepContext, StepReport, answer_battery, enter_step, save_and_exit};
use crate::selectors::StepSelectors;

/// Confirms contact details and picks the email communication preference.
pub struct ContactDetailsStep {
    selectors: StepSelectors,
}

impl ContactDetailsStep {
    pub fn new(selectors: StepSelectors) -> Self {
        Self { selectors }
    }
}

#[async_trait]
impl ApplicationStep for ContactDetailsStep {
    fn name(&self) -> StepName {
        StepName::ContactDetails
    }

    async fn run(&self, ctx: &StepContext<'_>) -> Result<StepReport> {
        if !enter_step(ctx, &self.selectors).await {
            debug!("contact details already complete");
            return Ok(StepReport::completed());
        }

        answer_battery(ctx, &self.selectors).await;
        save_and_exit(ctx, &self.selectors).await;
        Ok(StepReport::completed())
    }
}

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use autoapply_models::StepName;

use super::{ApplicationStep, StepContext, StepReport, answer_battery, enter_step, save_and_exit};
use crate::selectors::StepSelectors;

/// Works through the equality and diversity survey, preferring the
/// prefer-not-to-say options where offered. The portal sometimes renders
/// the survey one question per page; the battery helper handles both
/// layouts.
pub struct EqualityDiversityStep {
    selectors: StepSelectors,
}

impl EqualityDiversityStep {
    pub fn new(selectors: StepSelectors) -> Self {
        Self { selectors }
    }
}

#[async_trait]
impl ApplicationStep for EqualityDiversityStep {
    fn name(&self) -> StepName {
        StepName::EqualityDiversity
    }

    async fn run(&self, ctx: &StepContext<'_>) -> Result<StepReport> {
        if !enter_step(ctx, &self.selectors).await {
            debug!("equality and diversity already complete");
            return Ok(StepReport::completed());
        }

        answer_battery(ctx, &self.selectors).await;
        save_and_exit(ctx, &self.selectors).await;
        Ok(StepReport::completed())
    }
}

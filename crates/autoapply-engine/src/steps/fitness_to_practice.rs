use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use autoapply_browser::{click_if_present, select_radio_if_present, wait_for_any};
use autoapply_models::StepName;

use super::{ApplicationStep, StepContext, StepReport, enter_step, pass_intro};
use crate::selectors::StepSelectors;

/// The portal asks a variable number of fitness-to-practice declarations,
/// one per page, all using the same control id. The cap bounds the loop if
/// the page stops advancing.
const MAX_DECLARATION_ROUNDS: usize = 5;

/// Answers "no" to each fitness-to-practice declaration until the portal
/// stops asking.
pub struct FitnessToPracticeStep {
    selectors: StepSelectors,
}

impl FitnessToPracticeStep {
    pub fn new(selectors: StepSelectors) -> Self {
        Self { selectors }
    }
}

#[async_trait]
impl ApplicationStep for FitnessToPracticeStep {
    fn name(&self) -> StepName {
        StepName::FitnessToPractice
    }

    async fn run(&self, ctx: &StepContext<'_>) -> Result<StepReport> {
        if !enter_step(ctx, &self.selectors).await {
            debug!("fitness to practice already complete");
            return Ok(StepReport::completed());
        }

        pass_intro(ctx, &self.selectors).await;

        if let Some(answer) = self.selectors.answers.first() {
            for round in 0..MAX_DECLARATION_ROUNDS {
                if wait_for_any(ctx.page, answer, ctx.pacing.wait_medium)
                    .await
                    .is_none()
                {
                    debug!(rounds = round, "no further declarations");
                    break;
                }
                select_radio_if_present(ctx.page, answer, ctx.pacing.wait_short).await;
                ctx.pacing.breathe().await;
                if let Some(save) = &self.selectors.save_continue {
                    click_if_present(ctx.page, save, ctx.pacing.wait_short).await;
                    ctx.pacing.settle().await;
                }
            }
        }

        if let Some(exit) = &self.selectors.exit_continue {
            click_if_present(ctx.page, exit, ctx.pacing.wait_short).await;
            ctx.pacing.settle().await;
        }
        Ok(StepReport::completed())
    }
}

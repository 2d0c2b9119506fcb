use std::sync::LazyLock;

use anyhow::Result;
use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, info, warn};

use autoapply_browser::{check_if_present, click_if_present};
use autoapply_models::StepName;

use super::{ApplicationStep, StepContext, StepReport};
use crate::selectors::StepSelectors;

static REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)reference[:\s]*([A-Z0-9-]+)").unwrap());

/// Accepts the declaration and sends the application.
///
/// This step alone defines whether the application went in, so it does not
/// treat a missing task link as success: the wizard frequently lands on the
/// declaration page directly, and the checkbox plus submission are the real
/// signal.
pub struct DeclarationStep {
    selectors: StepSelectors,
}

impl DeclarationStep {
    pub fn new(selectors: StepSelectors) -> Self {
        Self { selectors }
    }
}

fn extract_reference(body: &str) -> Option<String> {
    REFERENCE
        .captures(body)
        .map(|captures| captures[1].to_string())
}

#[async_trait]
impl ApplicationStep for DeclarationStep {
    fn name(&self) -> StepName {
        StepName::Declaration
    }

    async fn run(&self, ctx: &StepContext<'_>) -> Result<StepReport> {
        if click_if_present(ctx.page, &self.selectors.task_link, ctx.pacing.wait_medium).await {
            ctx.pacing.settle().await;
        } else {
            debug!("no declaration task link, assuming we are on the page");
        }

        let Some(agreement) = &self.selectors.agreement else {
            return Ok(StepReport::failed("no declaration checkbox configured"));
        };
        if !check_if_present(ctx.page, agreement, ctx.pacing.wait_medium).await {
            warn!("declaration checkbox not found");
            return Ok(StepReport::failed("declaration checkbox not found"));
        }
        ctx.pacing.breathe().await;

        let Some(submit) = &self.selectors.submit else {
            return Ok(StepReport::failed("no send control configured"));
        };
        if !click_if_present(ctx.page, submit, ctx.pacing.wait_medium).await {
            warn!("send application control not found");
            return Ok(StepReport::failed("send application control not found"));
        }
        ctx.pacing.settle().await;

        // The application is in once the submit click lands. A confirmation
        // page that cannot be read costs us the reference number, nothing
        // more.
        let reference = match ctx.page.body_text().await {
            Ok(body) => extract_reference(&body),
            Err(error) => {
                warn!(%error, "could not read the confirmation page");
                None
            }
        };
        match &reference {
            Some(reference) => info!(%reference, "application submitted"),
            None => info!("application submitted, no reference found on confirmation page"),
        }
        Ok(StepReport::submitted(reference))
    }
}

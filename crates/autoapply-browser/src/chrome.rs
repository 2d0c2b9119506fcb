//! Live Chromium implementation of the page seam, driven over CDP.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::{Page, ScreenshotParams};
use futures_util::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::actions::NAVIGATION_TIMEOUT;
use crate::page::{LinkRef, PortalPage};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const LAUNCH_ARGS: [&str; 4] = [
    "--no-sandbox",
    "--disable-setuid-sandbox",
    "--disable-dev-shm-usage",
    "--disable-gpu",
];

/// One Chromium process plus the single tab a run drives.
///
/// The session is exclusively owned by the run that launched it and must be
/// released through [`ChromeSession::close`] on every exit path.
pub struct ChromeSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
    page: ChromePage,
}

impl ChromeSession {
    pub async fn launch(headless: bool, action_delay_ms: u64) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .window_size(1920, 1080)
            .args(LAUNCH_ARGS);
        if !headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(|message| anyhow!(message))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch Chromium")?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .context("failed to open tab")?;
        page.execute(
            SetUserAgentOverrideParams::builder()
                .user_agent(USER_AGENT)
                .build()
                .map_err(|message| anyhow!(message))?,
        )
        .await
        .context("failed to set user agent")?;

        info!(headless, "browser session ready");

        Ok(Self {
            browser,
            handler_task,
            page: ChromePage {
                inner: page,
                action_delay: Duration::from_millis(action_delay_ms),
            },
        })
    }

    pub fn page(&self) -> &ChromePage {
        &self.page
    }

    /// Close the browser process. Best effort; the handler task is always
    /// reaped.
    pub async fn close(mut self) {
        if let Err(error) = self.browser.close().await {
            warn!(%error, "browser close reported an error");
        }
        if timeout(Duration::from_secs(5), &mut self.handler_task)
            .await
            .is_err()
        {
            self.handler_task.abort();
        }
        debug!("browser session released");
    }
}

/// [`PortalPage`] over a live Chromium tab.
pub struct ChromePage {
    inner: Page,
    action_delay: Duration,
}

impl ChromePage {
    async fn pause(&self) {
        if !self.action_delay.is_zero() {
            sleep(self.action_delay).await;
        }
    }

    fn js_literal(value: &str) -> String {
        serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
    }

    /// Existence probe that only counts visible elements. `offsetParent`
    /// is null for `position: fixed` elements, hence the bounding-box
    /// fallback.
    fn visibility_probe(selector: &str) -> String {
        format!(
            "(() => {{ const el = document.querySelector({sel}); \
               if (!el) return false; \
               if (el.offsetParent !== null) return true; \
               const rect = el.getBoundingClientRect(); \
               return rect.width > 0 && rect.height > 0; }})()",
            sel = Self::js_literal(selector)
        )
    }
}

#[async_trait]
impl PortalPage for ChromePage {
    async fn goto(&self, url: &str) -> Result<()> {
        let navigated = timeout(NAVIGATION_TIMEOUT, async {
            self.inner.goto(url).await?;
            self.inner.wait_for_navigation().await?;
            Ok::<_, anyhow::Error>(())
        })
        .await;

        match navigated {
            Ok(result) => result,
            Err(_) => Err(anyhow!("navigation to {url} timed out")),
        }?;

        self.pause().await;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.inner.url().await?.unwrap_or_default())
    }

    async fn exists(&self, selector: &str) -> Result<bool> {
        Ok(self
            .inner
            .evaluate(Self::visibility_probe(selector))
            .await?
            .into_value()?)
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let element = self.inner.find_element(selector).await?;
        element.click().await?;
        self.pause().await;
        Ok(())
    }

    async fn clear_and_type(&self, selector: &str, text: &str) -> Result<()> {
        let clear = format!(
            "(() => {{ const el = document.querySelector({sel}); if (el) el.value = ''; }})()",
            sel = Self::js_literal(selector)
        );
        self.inner.evaluate(clear).await?;

        let element = self.inner.find_element(selector).await?;
        element.click().await?;
        element.type_str(text).await?;
        self.pause().await;
        Ok(())
    }

    async fn is_checked(&self, selector: &str) -> Result<bool> {
        let script = format!(
            "(() => {{ const el = document.querySelector({sel}); return !!(el && el.checked); }})()",
            sel = Self::js_literal(selector)
        );
        Ok(self.inner.evaluate(script).await?.into_value()?)
    }

    async fn click_by_text(&self, tags: &[&str], needle: &str) -> Result<bool> {
        let script = format!(
            "(() => {{ \
               const needle = {needle}.toLowerCase(); \
               for (const tag of {tags}) {{ \
                 for (const el of document.querySelectorAll(tag)) {{ \
                   if ((el.textContent || '').toLowerCase().includes(needle)) {{ el.click(); return true; }} \
                 }} \
               }} \
               return false; \
             }})()",
            needle = Self::js_literal(needle),
            tags = serde_json::to_string(tags)?,
        );
        let clicked: bool = self.inner.evaluate(script).await?.into_value()?;
        if clicked {
            self.pause().await;
        }
        Ok(clicked)
    }

    async fn collect_links(&self, selector: &str) -> Result<Vec<LinkRef>> {
        let script = format!(
            "Array.from(document.querySelectorAll({sel})).map(el => \
             ({{ text: (el.textContent || '').trim(), href: el.href || '' }}))",
            sel = Self::js_literal(selector)
        );
        Ok(self.inner.evaluate(script).await?.into_value()?)
    }

    async fn body_text(&self) -> Result<String> {
        Ok(self
            .inner
            .evaluate("document.body ? document.body.innerText : ''")
            .await?
            .into_value()?)
    }

    async fn wait_for_navigation(&self) -> Result<()> {
        match timeout(NAVIGATION_TIMEOUT, self.inner.wait_for_navigation()).await {
            Ok(result) => {
                result?;
                Ok(())
            }
            Err(_) => Err(anyhow!("navigation wait timed out")),
        }
    }

    async fn screenshot(&self, path: &Path) -> Result<()> {
        self.inner
            .save_screenshot(
                ScreenshotParams::builder()
                    .format(CaptureScreenshotFormat::Png)
                    .full_page(true)
                    .build(),
                path,
            )
            .await?;
        Ok(())
    }
}

//! Failure-tolerant action primitives.
//!
//! Each primitive waits for its target up to a timeout, tries the
//! locator's alternate selectors in order, performs the action, and logs
//! the outcome. The return value is a plain `bool`: absence or timeout is
//! a normal, expected result on a portal that reorders and omits pages,
//! not an error. Step executors rely on this to treat "step not present"
//! the same as "step already completed".

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use tokio::time::{Instant, sleep};
use tracing::{debug, warn};

use crate::page::PortalPage;

/// Element-wait timeout for controls expected on the current page.
pub const SHORT_TIMEOUT: Duration = Duration::from_secs(3);
/// Element-wait timeout for controls that may arrive after a page settle.
pub const MEDIUM_TIMEOUT: Duration = Duration::from_secs(5);
/// Full page transition timeout.
pub const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// One logical control on the portal, with the ordered fallback selectors
/// that have been observed rendering it. Primitives try alternates in
/// order so flow code never branches on portal markup variants.
#[derive(Debug, Clone)]
pub struct Locator {
    pub description: String,
    pub alternates: Vec<String>,
}

impl Locator {
    pub fn new(description: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            alternates: vec![selector.into()],
        }
    }

    pub fn with_fallbacks<I, S>(description: impl Into<String>, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            description: description.into(),
            alternates: selectors.into_iter().map(Into::into).collect(),
        }
    }
}

/// Poll until any alternate selector matches, returning the one that did.
pub async fn wait_for_any(
    page: &dyn PortalPage,
    locator: &Locator,
    timeout: Duration,
) -> Option<String> {
    let deadline = Instant::now() + timeout;
    loop {
        for selector in &locator.alternates {
            match page.exists(selector).await {
                Ok(true) => return Some(selector.clone()),
                Ok(false) => {}
                Err(error) => {
                    debug!(control = %locator.description, selector = %selector, %error, "existence probe failed");
                }
            }
        }
        if Instant::now() >= deadline {
            return None;
        }
        sleep(POLL_INTERVAL).await;
    }
}

/// Click the control if any alternate appears within the timeout.
pub async fn click_if_present(
    page: &dyn PortalPage,
    locator: &Locator,
    timeout: Duration,
) -> bool {
    let Some(selector) = wait_for_any(page, locator, timeout).await else {
        debug!(control = %locator.description, "not present, skipping click");
        return false;
    };

    match page.click(&selector).await {
        Ok(()) => {
            debug!(control = %locator.description, selector = %selector, "clicked");
            true
        }
        Err(error) => {
            warn!(control = %locator.description, selector = %selector, %error, "click failed");
            false
        }
    }
}

/// Clear and fill the control if any alternate appears within the timeout.
pub async fn fill_if_present(
    page: &dyn PortalPage,
    locator: &Locator,
    text: &str,
    timeout: Duration,
) -> bool {
    let Some(selector) = wait_for_any(page, locator, timeout).await else {
        debug!(control = %locator.description, "not present, skipping fill");
        return false;
    };

    match page.clear_and_type(&selector, text).await {
        Ok(()) => {
            debug!(control = %locator.description, selector = %selector, "filled");
            true
        }
        Err(error) => {
            warn!(control = %locator.description, selector = %selector, %error, "fill failed");
            false
        }
    }
}

/// Select a radio option if present. Already-selected options are left
/// untouched and count as success.
pub async fn select_radio_if_present(
    page: &dyn PortalPage,
    locator: &Locator,
    timeout: Duration,
) -> bool {
    set_checked_if_present(page, locator, timeout, "radio").await
}

/// Tick a checkbox if present. Already-ticked boxes are left untouched
/// and count as success.
pub async fn check_if_present(
    page: &dyn PortalPage,
    locator: &Locator,
    timeout: Duration,
) -> bool {
    set_checked_if_present(page, locator, timeout, "checkbox").await
}

async fn set_checked_if_present(
    page: &dyn PortalPage,
    locator: &Locator,
    timeout: Duration,
    kind: &str,
) -> bool {
    let Some(selector) = wait_for_any(page, locator, timeout).await else {
        debug!(control = %locator.description, kind, "not present, skipping");
        return false;
    };

    match page.is_checked(&selector).await {
        Ok(true) => {
            debug!(control = %locator.description, kind, "already in desired state");
            return true;
        }
        Ok(false) => {}
        Err(error) => {
            debug!(control = %locator.description, %error, "checked-state probe failed, clicking anyway");
        }
    }

    match page.click(&selector).await {
        Ok(()) => {
            debug!(control = %locator.description, selector = %selector, kind, "selected");
            true
        }
        Err(error) => {
            warn!(control = %locator.description, selector = %selector, kind, %error, "selection failed");
            false
        }
    }
}

/// Best-effort diagnostic screenshot. `dir` of `None` disables capture.
pub async fn capture_failure(page: &dyn PortalPage, dir: Option<&str>, label: &str) {
    let Some(dir) = dir else {
        return;
    };

    let stamp = Utc::now().format("%Y%m%dT%H%M%S%.3f");
    let path: PathBuf = Path::new(dir).join(format!("{stamp}-{label}.png"));

    if let Some(parent) = path.parent()
        && let Err(error) = tokio::fs::create_dir_all(parent).await
    {
        warn!(%error, "could not create screenshot directory");
        return;
    }

    match page.screenshot(&path).await {
        Ok(()) => debug!(path = %path.display(), "saved diagnostic screenshot"),
        Err(error) => warn!(label, %error, "screenshot capture failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::LinkRef;
    use anyhow::{Result, bail};
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Page stub with a fixed set of present selectors.
    #[derive(Default)]
    struct StubPage {
        present: HashSet<String>,
        checked: HashSet<String>,
        clicks: Mutex<Vec<String>>,
        fills: Mutex<Vec<(String, String)>>,
        fail_clicks: bool,
    }

    impl StubPage {
        fn with_present<const N: usize>(selectors: [&str; N]) -> Self {
            Self {
                present: selectors.iter().map(|s| s.to_string()).collect(),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl PortalPage for StubPage {
        async fn goto(&self, _url: &str) -> Result<()> {
            Ok(())
        }

        async fn current_url(&self) -> Result<String> {
            Ok("about:blank".into())
        }

        async fn exists(&self, selector: &str) -> Result<bool> {
            Ok(self.present.contains(selector))
        }

        async fn click(&self, selector: &str) -> Result<()> {
            if self.fail_clicks {
                bail!("node detached");
            }
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
            Ok(String::new())
        }

        async fn wait_for_navigation(&self) -> Result<()> {
            Ok(())
        }

        async fn screenshot(&self, _path: &Path) -> Result<()> {
            Ok(())
        }
    }

    fn instant() -> Duration {
        Duration::from_millis(0)
    }

    #[tokio::test]
    async fn click_tries_alternates_in_order() {
        let page = StubPage::with_present(["#continue"]);
        let locator =
            Locator::with_fallbacks("continue control", ["#save_continue", "#continue"]);

        assert!(click_if_present(&page, &locator, instant()).await);
        assert_eq!(*page.clicks.lock().unwrap(), vec!["#continue".to_string()]);
    }

    #[tokio::test]
    async fn click_reports_false_when_absent() {
        let page = StubPage::default();
        let locator = Locator::new("missing control", "#nowhere");

        assert!(!click_if_present(&page, &locator, instant()).await);
        assert!(page.clicks.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn click_swallows_page_errors() {
        let mut page = StubPage::with_present(["#submit"]);
        page.fail_clicks = true;
        let locator = Locator::new("submit", "#submit");

        assert!(!click_if_present(&page, &locator, instant()).await);
    }

    #[tokio::test]
    async fn radio_is_noop_when_already_selected() {
        let mut page = StubPage::with_present(["#option_2"]);
        page.checked.insert("#option_2".to_string());
        let locator = Locator::new("no option", "#option_2");

        assert!(select_radio_if_present(&page, &locator, instant()).await);
        assert!(page.clicks.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn radio_clicks_when_unselected() {
        let page = StubPage::with_present(["#option_2"]);
        let locator = Locator::new("no option", "#option_2");

        assert!(select_radio_if_present(&page, &locator, instant()).await);
        assert_eq!(*page.clicks.lock().unwrap(), vec!["#option_2".to_string()]);
    }

    #[tokio::test]
    async fn fill_records_text() {
        let page = StubPage::with_present(["#cv"]);
        let locator = Locator::new("cv textarea", "#cv");

        assert!(fill_if_present(&page, &locator, "experienced nurse", instant()).await);
        assert_eq!(
            *page.fills.lock().unwrap(),
            vec![("#cv".to_string(), "experienced nurse".to_string())]
        );
    }

    #[tokio::test]
    async fn capture_is_silent_without_directory() {
        let page = StubPage::default();
        capture_failure(&page, None, "login-error").await;
    }

    #[tokio::test]
    async fn capture_creates_the_screenshot_directory() {
        let page = StubPage::default();
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("shots");

        capture_failure(&page, dir.to_str(), "login-error").await;

        assert!(dir.is_dir());
    }
}

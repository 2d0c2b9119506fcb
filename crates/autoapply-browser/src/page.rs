//! Raw page operations behind a trait object.

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A scraped anchor: visible text plus resolved href.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkRef {
    pub text: String,
    pub href: String,
}

/// Raw operations against one live page.
///
/// Every method is fallible and performs no waiting of its own; the soft
/// primitives in [`crate::actions`] layer polling and fallback selectors on
/// top. Implementations must be safe to call repeatedly on a page the
/// portal has navigated away from.
#[async_trait]
pub trait PortalPage: Send + Sync {
    async fn goto(&self, url: &str) -> Result<()>;

    async fn current_url(&self) -> Result<String>;

    /// Whether an element matching the selector is present and visible
    /// right now. Elements in the DOM but hidden do not count; a positive
    /// answer means the element can be interacted with.
    async fn exists(&self, selector: &str) -> Result<bool>;

    async fn click(&self, selector: &str) -> Result<()>;

    /// Clear any existing value, then type the text into the element.
    async fn clear_and_type(&self, selector: &str, text: &str) -> Result<()>;

    /// Checked state of a radio button or checkbox. A missing element
    /// reads as unchecked.
    async fn is_checked(&self, selector: &str) -> Result<bool>;

    /// Click the first element among `tags` whose visible text contains
    /// `needle` case-insensitively. Returns whether anything was clicked.
    async fn click_by_text(&self, tags: &[&str], needle: &str) -> Result<bool>;

    /// Scrape text and href of every anchor matching the selector.
    async fn collect_links(&self, selector: &str) -> Result<Vec<LinkRef>>;

    /// Full visible text of the document body.
    async fn body_text(&self) -> Result<String>;

    /// Block until the pending navigation settles. Not every click
    /// navigates; callers tolerate failure here.
    async fn wait_for_navigation(&self) -> Result<()>;

    async fn screenshot(&self, path: &Path) -> Result<()>;
}

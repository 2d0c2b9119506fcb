//! Browser seam for AutoApply.
//!
//! The third-party portal's DOM is an unstable, externally controlled
//! contract, so everything above this crate interacts with a page through
//! two layers:
//! - [`PortalPage`]: raw, fallible page operations behind a trait object,
//!   implemented for a live Chromium tab and for scripted pages in tests.
//! - [`actions`]: soft primitives built on `PortalPage` that wait, retry
//!   alternate selectors, and report `bool` instead of erroring. Element
//!   absence is an ordinary branch up there, never an exception.

pub mod actions;
pub mod chrome;
pub mod page;

pub use actions::{
    Locator, NAVIGATION_TIMEOUT, SHORT_TIMEOUT, MEDIUM_TIMEOUT, capture_failure,
    check_if_present, click_if_present, fill_if_present, select_radio_if_present, wait_for_any,
};
pub use chrome::{ChromePage, ChromeSession};
pub use page::{LinkRef, PortalPage};

//! Portal application automation engine.
//!
//! Drives a headless browser through a multi-page job-application wizard on
//! a recruitment portal: login, search, classification of each posting as
//! automatable or external, then a fixed sequence of defensive step
//! executors ending in a submitted application with a captured reference
//! number.
//!
//! The portal's markup is an unstable external contract. Every locator
//! lives in the [`selectors`] registry as data, page interaction goes
//! through the soft primitives in `autoapply-browser`, and nothing below
//! the orchestrator propagates an error past its own scope: steps convert
//! failures to recorded outcomes, jobs convert failures to skips, and only
//! login or browser launch aborts a run.

pub mod collaborators;
pub mod error;
pub mod notify;
pub mod orchestrator;
pub mod selectors;
pub mod session;
pub mod steps;

pub use collaborators::{
    ApplicantProfile, CredentialProvider, JobConfigProvider, JobSearchConfig, Notifier,
    PortalCredentials, ResultSink,
};
pub use error::AutomationError;
pub use notify::{SmtpConfig, SmtpNotifier};
pub use orchestrator::{
    AutomationService, ChromeLauncher, Orchestrator, PortalSession, RunOptions, SessionLauncher,
    UserRef,
};
pub use selectors::{PortalProfile, SelectorRegistry, StepSelectors};
pub use session::SessionDriver;
pub use steps::{ApplicationStep, Pacing, StepContext, StepReport};

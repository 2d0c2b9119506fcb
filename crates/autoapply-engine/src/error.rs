use thiserror::Error;

/// Fatal conditions that abort a run before or instead of producing a
/// summary. Everything else is contained at the job or step level.
#[derive(Debug, Error)]
pub enum AutomationError {
    #[error("browser launch failed: {0}")]
    BrowserLaunch(String),

    #[error("portal login failed")]
    LoginFailed,

    #[error("no credentials stored for portal '{portal}'")]
    MissingCredentials { portal: String },

    #[error("no default applicant profile found")]
    MissingProfile,

    #[error("job configuration {config_id} not found")]
    MissingConfig { config_id: i64 },

    #[error("collaborator error: {0}")]
    Collaborator(#[from] anyhow::Error),
}

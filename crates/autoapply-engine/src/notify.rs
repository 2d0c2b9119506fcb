//! Email notification of run outcomes over SMTP.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use lettre::message::{Mailbox, Message};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use tracing::info;

use autoapply_models::RunSummary;

use crate::collaborators::Notifier;

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub use_tls: bool,
    /// Sender address. Usually the same as `username`.
    pub from: String,
}

/// [`Notifier`] that mails plain-text run reports.
pub struct SmtpNotifier {
    config: SmtpConfig,
}

impl SmtpNotifier {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        let credentials = Credentials::new(
            self.config.username.clone(),
            self.config.password.clone(),
        );
        let mailer = if self.config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.server)?
                .port(self.config.port)
                .credentials(credentials)
                .build()
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.config.server)
                .port(self.config.port)
                .credentials(credentials)
                .build()
        };
        Ok(mailer)
    }

    async fn send(&self, to: &str, subject: &str, body: String) -> Result<()> {
        let from: Mailbox = self
            .config
            .from
            .parse()
            .map_err(|e| anyhow!("invalid sender address '{}': {e}", self.config.from))?;
        let to: Mailbox = to
            .parse()
            .map_err(|e| anyhow!("invalid recipient address '{to}': {e}"))?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .body(body)?;

        self.transport()?
            .send(message)
            .await
            .map_err(|e| anyhow!("failed to send email: {e}"))?;
        info!(subject, "notification sent");
        Ok(())
    }
}

fn render_summary(summary: &RunSummary) -> (String, String) {
    let subject = format!(
        "Job applications: {} of {} submitted",
        summary.successful, summary.total
    );

    let mut body = format!(
        "Application run finished.\n\nAttempted: {}\nSubmitted: {}\nFailed: {}\n",
        summary.total, summary.successful, summary.failed
    );
    if !summary.results.is_empty() {
        body.push('\n');
    }
    for result in &summary.results {
        if result.success {
            let reference = result.reference_number.as_deref().unwrap_or("not captured");
            body.push_str(&format!(
                "[submitted] {} (reference: {})\n  {}\n",
                result.job_title, reference, result.job_url
            ));
        } else {
            let error = result.error.as_deref().unwrap_or("unknown error");
            body.push_str(&format!(
                "[failed] {} ({})\n  {}\n",
                result.job_title, error, result.job_url
            ));
        }
    }
    (subject, body)
}

fn render_failure(error: &str) -> (String, String) {
    (
        "Job application run failed".to_string(),
        format!("The application run did not complete.\n\nError: {error}\n"),
    )
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send_run_summary(&self, email: &str, summary: &RunSummary) -> Result<()> {
        let (subject, body) = render_summary(summary);
        self.send(email, &subject, body).await
    }

    async fn send_run_failure(&self, email: &str, error: &str) -> Result<()> {
        let (subject, body) = render_failure(error);
        self.send(email, &subject, body).await
    }
}

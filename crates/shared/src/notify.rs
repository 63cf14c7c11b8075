//! Email notifications for reimbursement status changes.
//!
//! Uses `lettre` for SMTP transport. Delivery is best-effort: callers fire
//! notifications after their database writes commit and only log failures.

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::header::ContentType, transport::smtp::authentication::Credentials,
};
use thiserror::Error;

use crate::config::EmailConfig;

/// Notification errors.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Failed to build the email message.
    #[error("Failed to build email: {0}")]
    Build(String),
    /// Failed to send the email.
    #[error("Failed to send email: {0}")]
    Send(String),
    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

/// Email service for sending status-change notifications.
#[derive(Clone)]
pub struct NotificationService {
    config: EmailConfig,
}

impl NotificationService {
    /// Creates a new notification service.
    #[must_use]
    pub const fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Creates an SMTP transport.
    fn create_transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, NotifyError> {
        let creds = Credentials::new(
            self.config.smtp_username.clone(),
            self.config.smtp_password.clone(),
        );

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.smtp_host)
            .map_err(|e| NotifyError::Send(e.to_string()))?
            .port(self.config.smtp_port)
            .credentials(creds)
            .build();

        Ok(transport)
    }

    /// Notifies a requester that their reimbursement request changed status.
    ///
    /// # Errors
    ///
    /// Returns an error if the email cannot be built or sent. Callers treat
    /// this as non-fatal.
    pub async fn send_status_change(
        &self,
        to_email: &str,
        status: &str,
    ) -> Result<(), NotifyError> {
        let subject = format!("Your reimbursement request is now {status}");
        let body = format!(
            r"Hello,

The status of your reimbursement request has changed to: {status}.

You can review the request and any notes from the approver in the portal.

Best regards,
Bursar"
        );

        self.send_email(to_email, &subject, &body).await
    }

    /// Sends a generic plain-text email.
    ///
    /// # Errors
    ///
    /// Returns an error if the email cannot be built or sent.
    pub async fn send_email(
        &self,
        to_email: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), NotifyError> {
        let from = format!("{} <{}>", self.config.from_name, self.config.from_email);

        let email = Message::builder()
            .from(
                from.parse()
                    .map_err(|e| NotifyError::InvalidAddress(format!("{e}")))?,
            )
            .to(to_email
                .parse()
                .map_err(|e| NotifyError::InvalidAddress(format!("{e}")))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| NotifyError::Build(e.to_string()))?;

        let transport = self.create_transport()?;
        transport
            .send(email)
            .await
            .map_err(|e| NotifyError::Send(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_recipient_address() {
        let service = NotificationService::new(EmailConfig::default());
        let result = service.send_email("not an address", "s", "b").await;
        assert!(matches!(result, Err(NotifyError::InvalidAddress(_))));
    }

    #[tokio::test]
    async fn test_status_change_subject_builds() {
        // Message construction happens before any network I/O; a bad
        // recipient is the only way to fail without an SMTP server.
        let service = NotificationService::new(EmailConfig::default());
        let result = service.send_status_change("bad recipient", "approved").await;
        assert!(matches!(result, Err(NotifyError::InvalidAddress(_))));
    }
}

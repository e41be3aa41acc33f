use crate::config::EmailConfig;
use crate::error::app_error::AppError;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Send a password reset email carrying the plain reset token.
    pub async fn send_password_reset_email(&self, to_email: &str, to_name: &str, reset_token: &str, reset_url: &str) -> Result<(), AppError> {
        if !self.config.enabled {
            tracing::warn!("Email service is disabled, skipping password reset email to {}", to_email);
            return Ok(());
        }

        let reset_link = format!("{}?token={}", reset_url, reset_token);

        let subject = "Reset your Saajha password";
        let html_body = self.generate_reset_email_html(to_name, &reset_link);
        let text_body = self.generate_reset_email_text(to_name, &reset_link);

        self.send_email(to_email, subject, &html_body, &text_body).await
    }

    fn generate_reset_email_html(&self, to_name: &str, reset_link: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="UTF-8"><title>Reset your Saajha password</title></head>
<body style="font-family: sans-serif; color: #1a1a1a;">
  <h1>Reset your password</h1>
  <p>Hi {},</p>
  <p>We received a request to reset your Saajha password. Use the link below to set a new one.</p>
  <p><a href="{}">Reset your password</a></p>
  <p>This link expires in 10 minutes.</p>
  <p>If you did not request this, you can safely ignore this message and your current password stays active.</p>
  <p>Saajha</p>
</body>
</html>
"#,
            to_name, reset_link
        )
    }

    fn generate_reset_email_text(&self, to_name: &str, reset_link: &str) -> String {
        format!(
            r#"Saajha | Password Reset

Hi {},

We received a request to reset your Saajha password.

Reset your password using the link below:
{}

This link expires in 10 minutes.

If you did not request this, you can safely ignore this message and your current password stays active.

Saajha
"#,
            to_name, reset_link
        )
    }

    async fn send_email(&self, to_email: &str, subject: &str, html_body: &str, text_body: &str) -> Result<(), AppError> {
        let email = Message::builder()
            .from(
                format!("{} <{}>", self.config.from_name, self.config.from_address)
                    .parse()
                    .map_err(|e| AppError::email(format!("Invalid from address: {}", e)))?,
            )
            .to(to_email.parse().map_err(|e| AppError::email(format!("Invalid to address: {}", e)))?)
            .subject(subject)
            .multipart(
                lettre::message::MultiPart::alternative()
                    .singlepart(
                        lettre::message::SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        lettre::message::SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )
            .map_err(|e| AppError::email(format!("Failed to build email: {}", e)))?;

        let creds = Credentials::new(self.config.smtp_username.clone(), self.config.smtp_password.clone());

        let mailer = SmtpTransport::relay(&self.config.smtp_host)
            .map_err(|e| AppError::email(format!("Failed to create SMTP transport: {}", e)))?
            .credentials(creds)
            .port(self.config.smtp_port)
            .build();

        // SMTP send is blocking; keep it off the async workers.
        let result = tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| AppError::email(format!("Failed to spawn email sending task: {}", e)))?;

        result.map_err(|e| AppError::email(format!("Failed to send email: {}", e)))?;

        tracing::info!("Password reset email sent successfully to {}", to_email);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> EmailConfig {
        EmailConfig {
            smtp_host: "localhost".to_string(),
            smtp_port: 587,
            smtp_username: "test".to_string(),
            smtp_password: "test".to_string(),
            from_address: "noreply@saajha.app".to_string(),
            from_name: "Saajha".to_string(),
            enabled: false,
        }
    }

    #[test]
    fn reset_email_bodies_contain_name_and_link() {
        let service = EmailService::new(test_config());

        let html = service.generate_reset_email_html("Ravi", "https://example.com/reset?token=abc123");
        assert!(html.contains("Ravi"));
        assert!(html.contains("https://example.com/reset?token=abc123"));
        assert!(html.contains("10 minutes"));

        let text = service.generate_reset_email_text("Ravi", "https://example.com/reset?token=abc123");
        assert!(text.contains("Ravi"));
        assert!(text.contains("https://example.com/reset?token=abc123"));
    }

    #[rocket::async_test]
    async fn disabled_service_is_a_no_op() {
        let service = EmailService::new(test_config());
        let result = service.send_password_reset_email("user@example.com", "User", "token", "https://example.com/reset").await;
        assert!(result.is_ok());
    }
}

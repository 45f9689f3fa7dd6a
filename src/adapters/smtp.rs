use crate::config::toml_config::{SmtpConfig, SmtpSecurity, WatchConfig};
use crate::domain::model::Digest;
use crate::domain::ports::Mailer;
use crate::utils::error::Result;
use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;

/// Authenticated SMTP submission to a single recipient.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
    relay: String,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig, username: &str, password: String) -> Result<Self> {
        let builder = match config.security {
            SmtpSecurity::Starttls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            }
            SmtpSecurity::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?,
        };

        let mut builder = builder
            .port(config.port)
            .credentials(Credentials::new(username.to_string(), password));
        if let Some(seconds) = config.timeout_seconds {
            builder = builder.timeout(Some(Duration::from_secs(seconds)));
        }

        Ok(Self {
            transport: builder.build(),
            from: config.from.parse()?,
            to: config.to.parse()?,
            relay: format!("{}:{}", config.host, config.port),
        })
    }

    pub fn from_config(config: &WatchConfig) -> Result<Self> {
        Self::new(&config.smtp, config.smtp_username(), config.smtp_password()?)
    }

    pub fn relay(&self) -> &str {
        &self.relay
    }
}

/// `multipart/alternative` message carrying the plain and HTML bodies.
pub fn compose_message(from: &Mailbox, to: &Mailbox, digest: &Digest) -> Result<Message> {
    let message = Message::builder()
        .from(from.clone())
        .to(to.clone())
        .subject(digest.subject.clone())
        .multipart(MultiPart::alternative_plain_html(
            digest.text_body.clone(),
            digest.html_body.clone(),
        ))?;
    Ok(message)
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, digest: &Digest) -> Result<()> {
        let message = compose_message(&self.from, &self.to, digest)?;

        tracing::debug!("Sending '{}' to {} via {}", digest.subject, self.to, self.relay);
        let response = self.transport.send(message).await?;
        tracing::debug!("SMTP relay answered {}", response.code());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::digest::{compose_digest, DEFAULT_SUBJECT};
    use crate::utils::error::WatchError;

    fn smtp_config() -> SmtpConfig {
        SmtpConfig {
            host: "smtp.gmail.com".to_string(),
            port: 587,
            security: SmtpSecurity::Starttls,
            from: "watcher@gmail.com".to_string(),
            username: None,
            password: Some("abcd efgh ijkl mnop".to_string()),
            to: "student@web.de".to_string(),
            subject: None,
            timeout_seconds: Some(15),
        }
    }

    #[test]
    fn test_message_headers_and_parts() {
        let titles = vec!["A".to_string(), "B".to_string()];
        let digest =
            compose_digest(&titles, &titles[1..], DEFAULT_SUBJECT, chrono::Utc::now()).unwrap();
        let from: Mailbox = "watcher@gmail.com".parse().unwrap();
        let to: Mailbox = "student@web.de".parse().unwrap();

        let message = compose_message(&from, &to, &digest).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("Subject: LMU Thesis Topics Update"));
        assert!(raw.contains("From: watcher@gmail.com"));
        assert!(raw.contains("To: student@web.de"));
        assert!(raw.contains("multipart/alternative"));
        assert!(raw.contains("text/plain"));
        assert!(raw.contains("text/html"));
    }

    #[test]
    fn test_mailer_from_config() {
        let mailer = SmtpMailer::new(&smtp_config(), "watcher@gmail.com", "pw".to_string()).unwrap();
        assert_eq!(mailer.relay(), "smtp.gmail.com:587");

        let mut implicit_tls = smtp_config();
        implicit_tls.security = SmtpSecurity::Tls;
        implicit_tls.port = 465;
        let mailer = SmtpMailer::new(&implicit_tls, "watcher@gmail.com", "pw".to_string()).unwrap();
        assert_eq!(mailer.relay(), "smtp.gmail.com:465");
    }

    #[test]
    fn test_mailer_rejects_bad_recipient() {
        let mut config = smtp_config();
        config.to = "student at web.de".to_string();

        assert!(matches!(
            SmtpMailer::new(&config, "watcher@gmail.com", "pw".to_string()),
            Err(WatchError::AddressError(_))
        ));
    }
}

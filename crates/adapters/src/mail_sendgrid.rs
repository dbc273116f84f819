//! SendGrid mail adapter for digest delivery

use async_trait::async_trait;
use news_digest_domain::{MailError, Mailer, OutgoingEmail};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::time::Duration;

const DEFAULT_FROM: &str = "no-reply@news-digest.app";

/// Mailer backed by the SendGrid v3 send API
///
/// Without an API key the mailer is disabled: sends become logged no-ops so
/// digest generation proceeds without email delivery.
pub struct SendGridMailer {
    client: Client,
    api_key: Option<SecretString>,
    base_url: String,
    from: String,
}

impl SendGridMailer {
    pub fn new(api_key: Option<SecretString>, from: Option<String>) -> Self {
        Self::with_base_url(api_key, "https://api.sendgrid.com".to_string(), from)
    }

    pub fn with_base_url(
        api_key: Option<SecretString>,
        base_url: String,
        from: Option<String>,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key,
            base_url,
            from: from.unwrap_or_else(|| DEFAULT_FROM.to_string()),
        }
    }

    /// Disabled mailer (no credential)
    pub fn disabled() -> Self {
        Self::new(None, None)
    }
}

#[derive(Serialize)]
struct SendRequest<'a> {
    personalizations: Vec<Personalization<'a>>,
    from: Address<'a>,
    subject: &'a str,
    content: Vec<Body<'a>>,
}

#[derive(Serialize)]
struct Personalization<'a> {
    to: Vec<Address<'a>>,
}

#[derive(Serialize)]
struct Address<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct Body<'a> {
    r#type: &'a str,
    value: &'a str,
}

#[async_trait]
impl Mailer for SendGridMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        let Some(api_key) = &self.api_key else {
            tracing::warn!("Mail API key not set, skipping email send");
            return Ok(());
        };

        let request = SendRequest {
            personalizations: vec![Personalization {
                to: vec![Address { email: &email.to }],
            }],
            from: Address { email: &self.from },
            subject: &email.subject,
            content: vec![Body {
                r#type: "text/plain",
                value: &email.body,
            }],
        };

        let url = format!("{}/v3/mail/send", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key.expose_secret()))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MailError::Network("timeout".to_string())
                } else {
                    MailError::Network(e.to_string())
                }
            })?;

        if response.status() == 401 {
            return Err(MailError::Auth("Invalid mail API key".to_string()));
        }

        if response.status() == 429 {
            return Err(MailError::RateLimited);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Api(format!("API returned {status}: {body}")));
        }

        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn email() -> OutgoingEmail {
        OutgoingEmail {
            to: "ada@example.net".to_string(),
            subject: "Your Daily Personalized News Digest".to_string(),
            body: "Hi Ada".to_string(),
        }
    }

    #[tokio::test]
    async fn posts_message_to_send_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v3/mail/send"))
            .and(header("Authorization", "Bearer sg-test"))
            .and(body_partial_json(serde_json::json!({
                "personalizations": [{"to": [{"email": "ada@example.net"}]}],
                "subject": "Your Daily Personalized News Digest"
            })))
            .respond_with(ResponseTemplate::new(202))
            .mount(&server)
            .await;

        let mailer = SendGridMailer::with_base_url(
            Some(SecretString::new("sg-test".into())),
            server.uri(),
            Some("digest@news.site".to_string()),
        );

        mailer.send(&email()).await.unwrap();
    }

    #[tokio::test]
    async fn disabled_mailer_is_a_no_op() {
        let mailer = SendGridMailer::disabled();
        assert!(!mailer.is_enabled());
        mailer.send(&email()).await.unwrap();
    }

    #[tokio::test]
    async fn maps_failure_statuses() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let mailer = SendGridMailer::with_base_url(
            Some(SecretString::new("sg-test".into())),
            server.uri(),
            None,
        );

        let result = mailer.send(&email()).await;
        assert!(matches!(result, Err(MailError::RateLimited)));
    }
}

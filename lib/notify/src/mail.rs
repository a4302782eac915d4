use serde::Deserialize;

use crate::error::NotifyError;

/// Transactional mail API configuration (Mailgun-style messages endpoint).
#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    /// API root, e.g. `https://api.mailgun.net/v3`.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Sending domain registered with the provider.
    pub domain: String,
    pub api_key: String,
}

fn default_api_base() -> String {
    "https://api.mailgun.net/v3".to_string()
}

/// An outbound email. Validated before any send is attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub sender: String,
    pub recipients: Vec<String>,
    pub subject: String,
    pub body: String,
}

impl EmailMessage {
    /// Reject a missing sender or any syntactically invalid recipient.
    pub fn validate(&self) -> Result<(), NotifyError> {
        if self.sender.trim().is_empty() {
            return Err(NotifyError::InvalidAddress("sender address missing".into()));
        }
        if self.recipients.is_empty() {
            return Err(NotifyError::InvalidAddress("no recipients".into()));
        }
        for recipient in &self.recipients {
            if !is_valid_address(recipient) {
                return Err(NotifyError::InvalidAddress(format!(
                    "invalid recipient address: {recipient}"
                )));
            }
        }
        Ok(())
    }
}

/// Minimal syntactic check: one `@`, non-empty local part, dotted domain,
/// no whitespace.
pub fn is_valid_address(addr: &str) -> bool {
    let mut parts = addr.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !addr.chars().any(char::is_whitespace)
}

/// Send one email through the messages endpoint.
pub async fn send(
    client: &reqwest::Client,
    config: &MailConfig,
    message: &EmailMessage,
) -> Result<(), NotifyError> {
    message.validate()?;

    let url = format!("{}/{}/messages", config.api_base, config.domain);
    let form = [
        ("from", message.sender.clone()),
        ("to", message.recipients.join(",")),
        ("subject", message.subject.clone()),
        ("html", message.body.clone()),
    ];

    let response = client
        .post(&url)
        .basic_auth("api", Some(&config.api_key))
        .form(&form)
        .send()
        .await
        .map_err(|e| NotifyError::Http(e.to_string()))?;

    if !response.status().is_success() {
        return Err(NotifyError::Api(format!(
            "mail API returned {}",
            response.status()
        )));
    }
    Ok(())
}

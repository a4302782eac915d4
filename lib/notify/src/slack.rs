use serde::Deserialize;

use crate::error::NotifyError;

/// Slack workspace API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SlackConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    pub token: String,
}

fn default_api_base() -> String {
    "https://slack.com/api".to_string()
}

#[derive(Debug, Deserialize)]
struct MembersResponse {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    members: Vec<Member>,
}

#[derive(Debug, Deserialize)]
struct Member {
    id: String,
    #[serde(default)]
    profile: Profile,
}

#[derive(Debug, Default, Deserialize)]
struct Profile {
    #[serde(default)]
    email: Option<String>,
}

/// Resolve a workspace user id by email via the member list.
pub async fn lookup_user_id(
    client: &reqwest::Client,
    config: &SlackConfig,
    email: &str,
) -> Result<Option<String>, NotifyError> {
    let url = format!("{}/users.list", config.api_base);
    let response = client
        .get(&url)
        .bearer_auth(&config.token)
        .send()
        .await
        .map_err(|e| NotifyError::Http(e.to_string()))?;

    let body: MembersResponse = response
        .json()
        .await
        .map_err(|e| NotifyError::Api(e.to_string()))?;
    if !body.ok {
        return Err(NotifyError::Api("users.list returned ok=false".into()));
    }

    Ok(body
        .members
        .into_iter()
        .find(|m| m.profile.email.as_deref() == Some(email))
        .map(|m| m.id))
}

/// Post a direct message to a resolved user id.
pub async fn post_message(
    client: &reqwest::Client,
    config: &SlackConfig,
    user_id: &str,
    text: &str,
) -> Result<(), NotifyError> {
    let url = format!("{}/chat.postMessage", config.api_base);
    let response = client
        .post(&url)
        .bearer_auth(&config.token)
        .json(&serde_json::json!({
            "channel": user_id,
            "text": text,
        }))
        .send()
        .await
        .map_err(|e| NotifyError::Http(e.to_string()))?;

    let body: serde_json::Value = response
        .json()
        .await
        .map_err(|e| NotifyError::Api(e.to_string()))?;
    if body.get("ok").and_then(|v| v.as_bool()) != Some(true) {
        return Err(NotifyError::Api(format!(
            "chat.postMessage failed: {}",
            body.get("error").and_then(|v| v.as_str()).unwrap_or("unknown")
        )));
    }
    Ok(())
}

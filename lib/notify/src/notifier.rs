use std::sync::Mutex;

use tracing::warn;

use crate::mail::{self, EmailMessage, MailConfig};
use crate::slack::{self, SlackConfig};

/// A workflow side effect to deliver. Carries everything rendering
/// needs so the dispatcher never reads back into module storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    RedemptionCreated {
        society: String,
        reason: String,
        value: i64,
    },
    RedemptionApproved {
        society: String,
        request_name: String,
        request_id: String,
        requester_email: String,
        center: String,
    },
    RedemptionRejected {
        society: String,
        reason: String,
        requester_email: String,
    },
    RedemptionCommented {
        society: String,
        comment: String,
        requester_email: String,
    },
    RedemptionCompleted {
        society: String,
        request_name: String,
        requester_email: String,
        cio_emails: Vec<String>,
    },
    ActivityInfoRequested {
        activity_name: String,
        activity_id: String,
        comment: String,
        owner_email: String,
        society: String,
    },
    ActivityApproved {
        activity_name: String,
        value: i64,
        owner_email: String,
    },
    ActivityRejected {
        activity_name: String,
        owner_email: String,
    },
}

/// Fire-and-forget notification sink. Implementations must never block
/// the caller and must swallow delivery failures.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Drops every notification. Useful when no mail/Slack credentials are
/// configured.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _notification: Notification) {}
}

/// Records notifications instead of delivering them, for test
/// assertions on workflow side effects.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.sent.lock().unwrap().push(notification);
    }
}

/// Finance contact for a center. Kampala's mailbox predates the naming
/// convention and keeps its dotted form.
pub fn finance_email(center: &str) -> String {
    let center = center.to_lowercase();
    if center == "kampala" {
        format!("{center}.finance@andela.com")
    } else {
        format!("{center}-finance@andela.com")
    }
}

/// Configuration for the production dispatcher.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Sender address for all outbound email.
    pub sender: String,
    /// CIO mailbox for redemption creation notices.
    pub cio_email: String,
    /// Public base URL used in email links.
    pub base_url: String,
    pub mail: Option<MailConfig>,
    pub slack: Option<SlackConfig>,
}

/// Renders notifications into email/Slack sends and spawns them onto
/// the runtime. Delivery failures are logged, never propagated.
pub struct Dispatcher {
    config: DispatcherConfig,
    client: reqwest::Client,
    handle: tokio::runtime::Handle,
}

/// One rendered delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Email(EmailMessage),
    Slack { email: String, text: String },
}

impl Dispatcher {
    /// Capture the current runtime handle; must be called from within a
    /// tokio runtime.
    pub fn new(config: DispatcherConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            handle: tokio::runtime::Handle::current(),
        }
    }

    /// Render a notification into the concrete sends it implies.
    /// Pure over the config — exercised directly by tests.
    pub fn render(config: &DispatcherConfig, notification: &Notification) -> Vec<Outbound> {
        let email = |recipients: Vec<String>, subject: String, body: String| {
            Outbound::Email(EmailMessage {
                sender: config.sender.clone(),
                recipients,
                subject,
                body,
            })
        };

        match notification {
            Notification::RedemptionCreated { society, reason, value } => vec![email(
                vec![config.cio_email.clone()],
                format!("RedemptionRequest for {society}"),
                format!(
                    "Redemption Request reason: {reason}. \
                     Redemption Request value: {value} points"
                ),
            )],

            Notification::RedemptionApproved {
                society,
                request_name,
                request_id,
                requester_email,
                center,
            } => vec![
                email(
                    vec![finance_email(center)],
                    format!("RedemptionRequest for {society}"),
                    format!(
                        "Redemption Request on {request_name} has been approved. \
                         Click <a href='{}/api/v1/societies/redeem/{request_id}'>here</a> \
                         to view more details.",
                        config.base_url
                    ),
                ),
                email(
                    vec![requester_email.clone()],
                    format!("RedemptionRequest for {society}"),
                    format!(
                        "Redemption Request on {request_name} has been approved. \
                         Finance will be in touch."
                    ),
                ),
            ],

            Notification::RedemptionRejected { society, reason, requester_email } => vec![
                email(
                    vec![requester_email.clone()],
                    format!("Redemption Request for {society}"),
                    format!(
                        "This redemption request has been rejected for this reason: {reason}"
                    ),
                ),
                Outbound::Slack {
                    email: requester_email.clone(),
                    text: format!(
                        "Redemption Request for {society} has been rejected \
                         for this reason: *{reason}*"
                    ),
                },
            ],

            Notification::RedemptionCommented { society, comment, requester_email } => vec![email(
                vec![requester_email.clone()],
                format!("More Info on RedemptionRequest for {society}"),
                comment.clone(),
            )],

            Notification::RedemptionCompleted {
                society,
                request_name,
                requester_email,
                cio_emails,
            } => {
                let mut recipients = cio_emails.clone();
                recipients.push(requester_email.clone());
                vec![email(
                    recipients,
                    format!("RedemptionRequest for {society}"),
                    format!(
                        "Redemption Request on {request_name} has been completed. \
                         Finance has wired the money to the recipient."
                    ),
                )]
            }

            Notification::ActivityInfoRequested {
                activity_name,
                activity_id,
                comment,
                owner_email,
                society,
            } => vec![email(
                vec![owner_email.clone()],
                format!("More Info on Logged Activity for {society}"),
                format!(
                    "Success Ops needs more information on this logged activity: \
                     {activity_name}. Context: {comment}. \
                     Click <a href='{}/api/v1/logged-activities/{activity_id}'>here</a> \
                     to view the logged activity and edit the description.",
                    config.base_url
                ),
            )],

            Notification::ActivityApproved { activity_name, value, owner_email } => vec![email(
                vec![owner_email.clone()],
                "Logged activity approved".to_string(),
                format!(
                    "Your logged activity {activity_name} has been approved \
                     for {value} points."
                ),
            )],

            Notification::ActivityRejected { activity_name, owner_email } => vec![email(
                vec![owner_email.clone()],
                "Logged activity rejected".to_string(),
                format!("Your logged activity {activity_name} has been rejected."),
            )],
        }
    }

    async fn deliver(
        client: reqwest::Client,
        config: DispatcherConfig,
        outbound: Outbound,
    ) {
        match outbound {
            Outbound::Email(message) => {
                let Some(mail_config) = config.mail.as_ref() else {
                    return;
                };
                if let Err(e) = mail::send(&client, mail_config, &message).await {
                    warn!(error = %e, subject = %message.subject, "email notification failed");
                }
            }
            Outbound::Slack { email, text } => {
                let Some(slack_config) = config.slack.as_ref() else {
                    return;
                };
                match slack::lookup_user_id(&client, slack_config, &email).await {
                    Ok(Some(user_id)) => {
                        if let Err(e) =
                            slack::post_message(&client, slack_config, &user_id, &text).await
                        {
                            warn!(error = %e, "slack notification failed");
                        }
                    }
                    Ok(None) => warn!(%email, "slack user not found"),
                    Err(e) => warn!(error = %e, "slack user lookup failed"),
                }
            }
        }
    }
}

impl Notifier for Dispatcher {
    fn notify(&self, notification: Notification) {
        for outbound in Self::render(&self.config, &notification) {
            let client = self.client.clone();
            let config = self.config.clone();
            self.handle.spawn(Self::deliver(client, config, outbound));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DispatcherConfig {
        DispatcherConfig {
            sender: "societies@andela.com".into(),
            cio_email: "cio@andela.com".into(),
            base_url: "https://societies.andela.com".into(),
            mail: None,
            slack: None,
        }
    }

    #[test]
    fn finance_email_special_cases_kampala() {
        assert_eq!(finance_email("Kampala"), "kampala.finance@andela.com");
        assert_eq!(finance_email("Nairobi"), "nairobi-finance@andela.com");
        assert_eq!(finance_email("lagos"), "lagos-finance@andela.com");
    }

    #[test]
    fn approval_notifies_finance_and_requester() {
        let sends = Dispatcher::render(
            &config(),
            &Notification::RedemptionApproved {
                society: "Sparks".into(),
                request_name: "Team lunch".into(),
                request_id: "r1".into(),
                requester_email: "president@andela.com".into(),
                center: "Nairobi".into(),
            },
        );
        assert_eq!(sends.len(), 2);
        let Outbound::Email(finance) = &sends[0] else { panic!("expected email") };
        assert_eq!(finance.recipients, vec!["nairobi-finance@andela.com"]);
        assert!(finance.body.contains("/api/v1/societies/redeem/r1"));
        let Outbound::Email(requester) = &sends[1] else { panic!("expected email") };
        assert_eq!(requester.recipients, vec!["president@andela.com"]);
    }

    #[test]
    fn rejection_sends_email_and_slack() {
        let sends = Dispatcher::render(
            &config(),
            &Notification::RedemptionRejected {
                society: "Phoenix".into(),
                reason: "insufficient detail".into(),
                requester_email: "president@andela.com".into(),
            },
        );
        assert_eq!(sends.len(), 2);
        assert!(matches!(&sends[1], Outbound::Slack { email, text }
            if email == "president@andela.com" && text.contains("*insufficient detail*")));
    }

    #[test]
    fn completion_copies_cio_role_holders() {
        let sends = Dispatcher::render(
            &config(),
            &Notification::RedemptionCompleted {
                society: "Invictus".into(),
                request_name: "Hoodies".into(),
                requester_email: "president@andela.com".into(),
                cio_emails: vec!["cio-1@andela.com".into(), "cio-2@andela.com".into()],
            },
        );
        let Outbound::Email(message) = &sends[0] else { panic!("expected email") };
        assert_eq!(
            message.recipients,
            vec!["cio-1@andela.com", "cio-2@andela.com", "president@andela.com"]
        );
    }

    #[test]
    fn recording_notifier_captures_order() {
        let recorder = RecordingNotifier::new();
        recorder.notify(Notification::ActivityRejected {
            activity_name: "Hackathon".into(),
            owner_email: "fellow@andela.com".into(),
        });
        recorder.notify(Notification::RedemptionCreated {
            society: "Sparks".into(),
            reason: "Lunch".into(),
            value: 100,
        });
        let sent = recorder.sent();
        assert_eq!(sent.len(), 2);
        assert!(matches!(sent[0], Notification::ActivityRejected { .. }));
    }
}

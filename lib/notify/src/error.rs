use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    /// Malformed recipient or missing sender — caught before any send.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Transport-level failure reaching the mail/Slack API.
    #[error("http error: {0}")]
    Http(String),

    /// The remote API answered with a failure.
    #[error("api error: {0}")]
    Api(String),
}

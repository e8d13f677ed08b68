use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdvisorError {
    /// Any failure while talking to the completion service or reading its reply.
    #[error("completion service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("config load error: {0}")]
    ConfigLoad(String),
}

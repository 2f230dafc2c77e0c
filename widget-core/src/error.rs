use reqwest::StatusCode;

/// Classified failure of a single fetch attempt.
///
/// Every variant is terminal for the attempt that produced it; nothing retries.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Could not build request URL: {url}")]
    BadUrl { url: String },

    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Server responded with status {0}")]
    BadHttpStatus(StatusCode),

    #[error("Server returned an empty response")]
    EmptyBody,

    #[error("Failed to decode server response: {0}")]
    Decode(String),
}

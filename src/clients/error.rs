use thiserror::Error;

/// Errors raised by the HTTP and Graphite clients
#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport-level HTTP failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote answered with something else than 200 OK
    #[error("Unexpected response from {url}: expected 200, got {status}: {body}")]
    UnexpectedStatus {
        url: String,
        status: u16,
        body: String,
    },

    /// The response body could not be decoded
    #[error("Invalid JSON payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// A configured address is not a valid URL
    #[error("Invalid address: {0}")]
    InvalidAddress(#[from] url::ParseError),

    /// Points were sent before a connection was opened
    #[error("Graphite client is not connected")]
    NotConnected,

    /// Opening the Graphite connection took too long
    #[error("Timed out connecting to graphite at {address}")]
    ConnectTimeout { address: String },

    /// Socket error while talking to Graphite
    #[error("Graphite I/O error: {0}")]
    Io(#[from] std::io::Error),
}

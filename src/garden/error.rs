use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to connect to socket `{path}`: {source}")]
    SocketConnect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("HTTP handshake with the garden server failed: {0}")]
    Handshake(#[source] hyper::Error),
    #[error("failed to build request for `{uri}`: {source}")]
    InvalidRequest {
        uri: String,
        #[source]
        source: hyper::http::Error,
    },
    #[error("request `{uri}` failed: {source}")]
    Request {
        uri: String,
        #[source]
        source: hyper::Error,
    },
    #[error("garden server answered `{uri}` with status {status}: {message}")]
    Status {
        uri: String,
        status: u16,
        message: String,
    },
    #[error("failed to decode response of `{uri}`: {source}")]
    Decode {
        uri: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Record feed unreachable at {url}: {source}")]
    Unreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Record feed unhealthy (HTTP {status})")]
    Unhealthy { status: u16 },
    #[error("Record feed returned HTTP {status} for {url}")]
    Status { url: String, status: u16 },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Record feed returned no records")]
    EmptyPayload,
}

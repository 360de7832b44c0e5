use thiserror::Error;

/// Failures a caller may want to tell apart from plain I/O errors
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Unknown job portal: {0}")]
    UnknownPortal(String),

    #[error("Request to {url} failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },
}

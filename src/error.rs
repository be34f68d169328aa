// Error types for the API client.
//
// `ApiError` covers listing and search calls, `DownloadError` covers
// fetching a file body to disk and always names the file involved.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("error occurred during request to {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} failed with status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("error occurred while decoding response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot build endpoint URL: {0}")]
    Endpoint(String),
}

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("error occurred while downloading {name}, ID: {id}, size: {size}: {source}")]
    Request {
        id: String,
        name: String,
        size: u64,
        #[source]
        source: reqwest::Error,
    },

    #[error("error occurred while downloading {name}, ID: {id}, size: {size}: server answered {status}")]
    Status {
        id: String,
        name: String,
        size: u64,
        status: reqwest::StatusCode,
    },

    #[error("download of {name}, ID: {id}, size: {size} was interrupted: {source}")]
    Interrupted {
        id: String,
        name: String,
        size: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{name} (ID: {id}) is a directory")]
    IsDirectory { id: String, name: String },

    #[error("refusing to write file with unsafe name {0:?}")]
    InvalidName(String),

    #[error(transparent)]
    Endpoint(#[from] ApiError),
}

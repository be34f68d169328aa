// API client module: a small blocking HTTP client for the dhokla.net API.
// Each call is one request/response cycle; nothing is cached or retried.

use crate::config::{Config, Endpoints};
use crate::error::{ApiError, DownloadError};
use crate::models::{Directory, File, FileIndex, SearchResult};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::{Client, Response};
use reqwest::Url;
use std::fs;
use std::io::{Read, Write};
use std::path::{Component, Path, PathBuf};

const CHUNK_SIZE: usize = 64 * 1024;

/// Blocking API client holding a reqwest client, the base URL, the
/// endpoint paths and the configured download directory.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    endpoints: Endpoints,
    download_dir: PathBuf,
}

/// Result of a finished download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Downloaded {
    pub path: PathBuf,
    pub bytes: u64,
}

impl ApiClient {
    /// Create an ApiClient from the user's config file and `DHOKLA_*`
    /// environment variables. See `Config::load`.
    pub fn from_env() -> Result<Self> {
        let config = Config::load()?;
        Self::new(&config)
    }

    pub fn new(config: &Config) -> Result<Self> {
        // reqwest's blocking client defaults to 30s; `None` means unbounded.
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ApiClient {
            client,
            base_url: config.base_url.clone(),
            endpoints: config.endpoints.clone(),
            download_dir: config.download_dir.clone(),
        })
    }

    /// Directory the shell saves downloads into.
    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Fetch a directory listing; `None` (or an empty id) means the root
    /// directory.
    pub fn directory(&self, id: Option<&str>) -> Result<Directory, ApiError> {
        let url = match id.filter(|id| !id.is_empty()) {
            Some(id) => self.endpoint(&self.endpoints.directory, Some(id))?,
            None => self.endpoint(&self.endpoints.root, None)?,
        };
        let body = self.get_text(&url)?;
        Directory::from_json(&body).map_err(|source| decode_error(&url, source))
    }

    /// Fetch a directory listing and flatten it into an id lookup.
    pub fn fetch_directory(&self, id: Option<&str>) -> Result<FileIndex, ApiError> {
        Ok(self.directory(id)?.into_index())
    }

    /// Search files by name. The query is sent as a single path segment.
    pub fn search(&self, query: &str) -> Result<Vec<File>, ApiError> {
        let url = self.endpoint(&self.endpoints.search, Some(query))?;
        let body = self.get_text(&url)?;
        let result = SearchResult::from_json(&body).map_err(|source| decode_error(&url, source))?;
        Ok(result.files)
    }

    /// Stream a file's contents to `dest_dir/<file.name>`, overwriting any
    /// existing file. A failed transfer leaves whatever was written so far.
    pub fn download(&self, file: &File, dest_dir: &Path) -> Result<Downloaded, DownloadError> {
        if file.dir {
            return Err(DownloadError::IsDirectory {
                id: file.id.clone(),
                name: file.name.clone(),
            });
        }
        let path = dest_dir.join(safe_file_name(&file.name)?);
        let size = file.size.unwrap_or_default();

        log::info!("Started downloading {}, ID: {}, size: {}", file.name, file.id, size);
        let url = self.endpoint(&self.endpoints.download, Some(&file.id))?;
        log::debug!("GET {url}");

        let mut res = self
            .client
            .get(url)
            .send()
            .map_err(|source| DownloadError::Request {
                id: file.id.clone(),
                name: file.name.clone(),
                size,
                source,
            })?;
        if !res.status().is_success() {
            return Err(DownloadError::Status {
                id: file.id.clone(),
                name: file.name.clone(),
                size,
                status: res.status(),
            });
        }

        let mut out = fs::File::create(&path).map_err(|source| DownloadError::Io {
            path: path.clone(),
            source,
        })?;

        let progress = progress_bar(file.size.or(res.content_length()));
        let mut buf = vec![0u8; CHUNK_SIZE];
        let mut bytes = 0u64;
        loop {
            let n = match res.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(source) => {
                    progress.abandon();
                    log::warn!("download of {} interrupted after {} bytes", file.name, bytes);
                    return Err(DownloadError::Interrupted {
                        id: file.id.clone(),
                        name: file.name.clone(),
                        size,
                        source,
                    });
                }
            };
            out.write_all(&buf[..n]).map_err(|source| DownloadError::Io {
                path: path.clone(),
                source,
            })?;
            bytes += n as u64;
            progress.inc(n as u64);
        }
        out.flush().map_err(|source| DownloadError::Io {
            path: path.clone(),
            source,
        })?;
        progress.finish_and_clear();

        log::info!("Finished downloading {} ({} bytes)", path.display(), bytes);
        Ok(Downloaded { path, bytes })
    }

    /// Join an endpoint prefix onto the base URL and append `segment`
    /// percent-encoded as one path segment.
    fn endpoint(&self, prefix: &str, segment: Option<&str>) -> Result<Url, ApiError> {
        let mut url = self
            .base_url
            .join(prefix.trim_start_matches('/'))
            .map_err(|e| ApiError::Endpoint(format!("{prefix}: {e}")))?;
        if let Some(segment) = segment {
            // URL normalization would collapse these instead of sending them.
            if segment == "." || segment == ".." {
                return Err(ApiError::Endpoint(format!(
                    "{segment:?} is not a valid id or query"
                )));
            }
            url.path_segments_mut()
                .map_err(|_| ApiError::Endpoint(format!("{prefix} cannot take a path")))?
                .pop_if_empty()
                .push(segment);
        }
        Ok(url)
    }

    /// GET `url` and return the body as text. Non-2xx answers are errors.
    fn get_text(&self, url: &Url) -> Result<String, ApiError> {
        log::debug!("GET {url}");
        let res: Response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|source| request_error(url, source))?;
        if !res.status().is_success() {
            return Err(ApiError::Status {
                url: url.to_string(),
                status: res.status(),
            });
        }
        res.text().map_err(|source| request_error(url, source))
    }
}

fn request_error(url: &Url, source: reqwest::Error) -> ApiError {
    ApiError::Request {
        url: url.to_string(),
        source,
    }
}

fn decode_error(url: &Url, source: serde_json::Error) -> ApiError {
    log::warn!("could not decode response from {url}: {source}");
    ApiError::Decode {
        url: url.to_string(),
        source,
    }
}

/// Server-provided names must be a single plain path component.
fn safe_file_name(name: &str) -> Result<&str, DownloadError> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !name.contains(['/', '\\']) => Ok(name),
        _ => Err(DownloadError::InvalidName(name.to_string())),
    }
}

fn progress_bar(len: Option<u64>) -> ProgressBar {
    match len {
        Some(len) => {
            let pb = ProgressBar::new(len);
            if let Ok(style) = ProgressStyle::with_template(
                "{bar:40} {bytes}/{total_bytes} ({bytes_per_sec}, {eta})",
            ) {
                pb.set_style(style);
            }
            pb
        }
        None => ProgressBar::new_spinner(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_names_are_accepted() {
        assert_eq!(safe_file_name("report.pdf").unwrap(), "report.pdf");
        assert_eq!(safe_file_name("with space.txt").unwrap(), "with space.txt");
    }

    #[test]
    fn names_that_escape_the_directory_are_rejected() {
        for name in ["", ".", "..", "../x", "a/b", "/etc/passwd", "a\\b"] {
            assert!(
                matches!(safe_file_name(name), Err(DownloadError::InvalidName(_))),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn endpoints_are_built_from_config() {
        let config = Config::with_base_url("http://files.test/mirror").unwrap();
        let api = ApiClient::new(&config).unwrap();
        assert_eq!(
            api.endpoint("api/d/", None).unwrap().as_str(),
            "http://files.test/mirror/api/d/"
        );
        assert_eq!(
            api.endpoint("/api/d/", Some("abc")).unwrap().as_str(),
            "http://files.test/mirror/api/d/abc"
        );
        assert_eq!(
            api.endpoint("api/s/", Some("holiday pics/2023")).unwrap().as_str(),
            "http://files.test/mirror/api/s/holiday%20pics%2F2023"
        );
        assert_eq!(
            api.endpoint("api/s/", Some("...")).unwrap().as_str(),
            "http://files.test/mirror/api/s/..."
        );
        for dots in [".", ".."] {
            assert!(matches!(
                api.endpoint("api/d/", Some(dots)),
                Err(ApiError::Endpoint(_))
            ));
        }
    }
}

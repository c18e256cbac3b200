//! HTTP client for the flight log backend.
//!
//! Thin request/response wrappers; no retries. A 404 on a single-resource
//! call becomes [`Error::NotFound`], every other failure keeps its status.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::config::Config;
use crate::controller::LogSource;
use crate::error::{Error, Result};
use crate::model::{Attachment, DeleteResponse, FlightLog, FlightLogUpdate, LogPage, NewFlightLog, Stats, Tag};
use crate::query::QuerySpec;

/// Extension the backend accepts for flight log uploads.
const LOG_EXTENSION: &str = "ulg";

/// Longest tag name the backend stores.
const MAX_TAG_LEN: usize = 100;

/// Client for the flight log REST API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base: Url,
    client: reqwest::Client,
}

/// Error body returned by the backend.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct NewTag<'a> {
    name: &'a str,
}

#[derive(Debug, Deserialize)]
struct Health {
    status: String,
}

impl ApiClient {
    /// Create a client for the backend at `base`.
    ///
    /// # Errors
    ///
    /// Returns an error if `base` cannot be a base URL or the HTTP client
    /// cannot be built.
    pub fn new(mut base: Url, timeout: Duration) -> Result<Self> {
        if base.cannot_be_a_base() {
            return Err(Error::invalid_input(format!("{base} cannot be used as an API base URL")));
        }
        base.set_query(None);
        base.set_fragment(None);
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { base, client })
    }

    /// Create a client from the loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured URL is invalid.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.api_url()?, config.timeout())
    }

    /// The backend base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Build the URL for `segments` below the base URL, percent-encoding each
    /// segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| Error::internal("API base URL cannot have path segments"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// List one page of flight logs.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    pub async fn list_logs(&self, spec: &QuerySpec) -> Result<LogPage> {
        let response = self
            .client
            .get(self.endpoint(&["api", "logs"])?)
            .query(&spec.api_params())
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    /// Fetch one flight log.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the log does not exist.
    pub async fn get_log(&self, id: &str) -> Result<FlightLog> {
        let response = self
            .client
            .get(self.endpoint(&["api", "logs", id])?)
            .send()
            .await?;
        Ok(check_log(response, id).await?.json().await?)
    }

    /// Update the editable fields of a flight log.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the log does not exist.
    pub async fn update_log(&self, id: &str, update: &FlightLogUpdate) -> Result<FlightLog> {
        if update.is_empty() {
            return Err(Error::invalid_input("Nothing to update."));
        }
        let response = self
            .client
            .put(self.endpoint(&["api", "logs", id])?)
            .json(update)
            .send()
            .await?;
        info!(id, "Updated flight log");
        Ok(check_log(response, id).await?.json().await?)
    }

    /// Delete a flight log and its file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the log does not exist.
    pub async fn delete_log(&self, id: &str) -> Result<DeleteResponse> {
        let response = self
            .client
            .delete(self.endpoint(&["api", "logs", id])?)
            .send()
            .await?;
        Ok(check_log(response, id).await?.json().await?)
    }

    /// Download the raw `.ulg` file of a log into `dest`, returning the
    /// number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the log or its file does not exist, or an
    /// error if `dest` cannot be written.
    pub async fn download_log(&self, id: &str, dest: &Path) -> Result<u64> {
        let response = self
            .client
            .get(self.endpoint(&["api", "logs", id, "download"])?)
            .send()
            .await?;
        let written = save(check_log(response, id).await?, dest).await?;
        debug!(id, path = %dest.display(), bytes = written, "Downloaded flight log");
        Ok(written)
    }

    /// Upload a new `.ulg` flight log.
    ///
    /// # Errors
    ///
    /// Returns an error if `file` is not a `.ulg` file, cannot be read, or the
    /// backend rejects the upload.
    pub async fn upload_log(&self, file: &Path, log: &NewFlightLog) -> Result<FlightLog> {
        if !has_log_extension(file) {
            return Err(Error::invalid_input("File must be a .ulg file"));
        }

        let mut form = Form::new()
            .part("file", file_part(file).await?)
            .text("title", log.title.clone())
            .text("pilot", log.pilot.clone())
            .text("drone_model", log.drone_model.as_str());
        if let Some(serial) = &log.serial_number {
            form = form.text("serial_number", serial.clone());
        }
        if let Some(comment) = &log.comment {
            form = form.text("comment", comment.clone());
        }
        if !log.tags.is_empty() {
            form = form.text("tags", log.tags.join(","));
        }

        let response = self
            .client
            .post(self.endpoint(&["api", "logs"])?)
            .multipart(form)
            .send()
            .await?;
        let created: FlightLog = check(response).await?.json().await?;
        info!(id = %created.id, title = %created.title, "Uploaded flight log");
        Ok(created)
    }

    /// Distinct pilot names, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_pilots(&self) -> Result<Vec<String>> {
        let response = self
            .client
            .get(self.endpoint(&["api", "pilots"])?)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    /// All tags, optionally filtered by a case-insensitive name fragment.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_tags(&self, search: Option<&str>) -> Result<Vec<Tag>> {
        let mut request = self.client.get(self.endpoint(&["api", "tags"])?);
        if let Some(search) = search.filter(|s| !s.trim().is_empty()) {
            request = request.query(&[("search", search)]);
        }
        Ok(check(request.send().await?).await?.json().await?)
    }

    /// Create a tag, or return the existing one with the same name.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` is blank or longer than the backend allows,
    /// or if the request fails.
    pub async fn create_tag(&self, name: &str) -> Result<Tag> {
        let name = name.trim();
        if name.is_empty() || name.chars().count() > MAX_TAG_LEN {
            return Err(Error::invalid_input(format!(
                "Tag names must be 1 to {MAX_TAG_LEN} characters."
            )));
        }
        let response = self
            .client
            .post(self.endpoint(&["api", "tags"])?)
            .json(&NewTag { name })
            .send()
            .await?;
        let tag: Tag = check(response).await?.json().await?;
        debug!(id = tag.id, name = %tag.name, "Created tag");
        Ok(tag)
    }

    /// Fleet statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn stats(&self) -> Result<Stats> {
        let response = self
            .client
            .get(self.endpoint(&["api", "stats"])?)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    /// Attach files to a flight log.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the log does not exist, or an error if a
    /// file cannot be read.
    pub async fn upload_attachments(&self, id: &str, files: &[PathBuf]) -> Result<Vec<Attachment>> {
        if files.is_empty() {
            return Err(Error::invalid_input("No files to attach."));
        }
        let mut form = Form::new();
        for file in files {
            form = form.part("files", file_part(file).await?);
        }
        let response = self
            .client
            .post(self.endpoint(&["api", "logs", id, "attachments"])?)
            .multipart(form)
            .send()
            .await?;
        Ok(check_log(response, id).await?.json().await?)
    }

    /// Remove one attachment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the log or attachment does not exist.
    pub async fn delete_attachment(&self, id: &str, attachment_id: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.endpoint(&["api", "logs", id, "attachments", attachment_id])?)
            .send()
            .await?;
        check_attachment(response, id, attachment_id).await?;
        Ok(())
    }

    /// Download one attachment into `dest`, returning the number of bytes
    /// written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the log, the attachment or its file does
    /// not exist, or an error if `dest` cannot be written.
    pub async fn download_attachment(&self, id: &str, attachment_id: &str, dest: &Path) -> Result<u64> {
        let response = self
            .client
            .get(self.endpoint(&["api", "logs", id, "attachments", attachment_id])?)
            .send()
            .await?;
        let written = save(check_attachment(response, id, attachment_id).await?, dest).await?;
        debug!(id, attachment_id, path = %dest.display(), bytes = written, "Downloaded attachment");
        Ok(written)
    }

    /// The backend's health status, `healthy` when it is up.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached.
    pub async fn health(&self) -> Result<String> {
        let response = self.client.get(self.endpoint(&["health"])?).send().await?;
        let health: Health = check(response).await?.json().await?;
        Ok(health.status)
    }
}

#[async_trait]
impl LogSource for ApiClient {
    async fn list_logs(&self, spec: &QuerySpec) -> Result<LogPage> {
        ApiClient::list_logs(self, spec).await
    }
}

/// Whether `path` has the `.ulg` extension.
#[must_use]
pub fn has_log_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(LOG_EXTENSION))
}

async fn file_part(path: &Path) -> Result<Part> {
    let bytes = tokio::fs::read(path).await?;
    let name = path
        .file_name()
        .map_or_else(|| "upload".to_string(), |n| n.to_string_lossy().into_owned());
    Ok(Part::bytes(bytes).file_name(name))
}

/// Map a 404 on a flight log endpoint to [`Error::NotFound`].
async fn check_log(response: Response, id: &str) -> Result<Response> {
    if response.status() == StatusCode::NOT_FOUND {
        return Err(Error::log_not_found(id));
    }
    check(response).await
}

/// Map a 404 on an attachment endpoint to [`Error::NotFound`] for the log
/// or the attachment, whichever the backend reports missing.
async fn check_attachment(response: Response, id: &str, attachment_id: &str) -> Result<Response> {
    if response.status() != StatusCode::NOT_FOUND {
        return check(response).await;
    }
    let body = response.text().await.unwrap_or_default();
    if names_missing_log(&error_detail(&body)) {
        return Err(Error::log_not_found(id));
    }
    Err(Error::NotFound {
        resource: "attachment",
        id: attachment_id.to_string(),
    })
}

fn names_missing_log(detail: &str) -> bool {
    detail.starts_with("Flight log")
}

/// Write a response body to `dest`.
async fn save(response: Response, dest: &Path) -> Result<u64> {
    let bytes = response.bytes().await?;
    tokio::fs::write(dest, &bytes)
        .await
        .map_err(|source| Error::FileWrite {
            path: dest.to_path_buf(),
            source,
        })?;
    Ok(bytes.len() as u64)
}

/// Turn a non-success response into [`Error::Status`], keeping the backend's
/// `detail` message when there is one.
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::Status {
        status,
        message: error_detail(&body),
    })
}

fn error_detail(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            detail: serde_json::Value::String(detail),
        }) => detail,
        Ok(ErrorBody { detail }) => detail.to_string(),
        Err(_) if body.trim().is_empty() => "no details".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(Url::parse(base).unwrap(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let api = client("http://localhost:8000");
        assert_eq!(
            api.endpoint(&["api", "logs", "abc"]).unwrap().as_str(),
            "http://localhost:8000/api/logs/abc"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let api = client("https://example.com/flightlog/");
        assert_eq!(
            api.endpoint(&["api", "stats"]).unwrap().as_str(),
            "https://example.com/flightlog/api/stats"
        );
    }

    #[test]
    fn test_endpoint_encodes_ids() {
        let api = client("http://localhost:8000");
        assert_eq!(
            api.endpoint(&["api", "logs", "a/b c"]).unwrap().as_str(),
            "http://localhost:8000/api/logs/a%2Fb%20c"
        );
    }

    #[test]
    fn test_new_strips_query() {
        let api = client("http://localhost:8000/?x=1#frag");
        assert_eq!(api.base_url().as_str(), "http://localhost:8000/");
    }

    #[test]
    fn test_new_rejects_non_base_url() {
        let result = ApiClient::new(Url::parse("mailto:a@b.c").unwrap(), Duration::from_secs(1));
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_has_log_extension() {
        assert!(has_log_extension(Path::new("flight.ulg")));
        assert!(has_log_extension(Path::new("/tmp/FLIGHT.ULG")));
        assert!(!has_log_extension(Path::new("flight.bin")));
        assert!(!has_log_extension(Path::new("ulg")));
    }

    #[test]
    fn test_names_missing_log() {
        assert!(names_missing_log("Flight log with id 'x' not found"));
        assert!(!names_missing_log("Attachment not found"));
        assert!(!names_missing_log("Attachment file not found on disk"));
    }

    #[test]
    fn test_error_detail() {
        assert_eq!(error_detail(r#"{"detail": "File must be a .ulg file"}"#), "File must be a .ulg file");
        assert!(error_detail(r#"{"detail": [{"loc": ["query", "page"]}]}"#).contains("loc"));
        assert_eq!(error_detail("Bad Gateway"), "Bad Gateway");
        assert_eq!(error_detail(""), "no details");
    }
}

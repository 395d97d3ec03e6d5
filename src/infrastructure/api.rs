//! HTTP client for the orphanage API.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::blocking::{multipart, Client, Response};
use reqwest::{StatusCode, Url};
use thiserror::Error;

use crate::domain::{OrphanageDetails, OrphanageId, OrphanageSummary, SubmissionForm, IMAGE_FIELD, IMAGE_MIME};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),
    #[error("Server rejected the request (HTTP {status})")]
    Status { status: u16 },
    #[error("Unexpected response from server: {0}")]
    Decode(#[source] reqwest::Error),
    #[error("Could not read image {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid API url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl ApiError {
    /// True when the server answered; false for transport or local failures.
    pub fn is_rejection(&self) -> bool {
        matches!(self, ApiError::Status { .. })
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// The three endpoints the client consumes.
pub trait OrphanageApi: Send {
    fn list_orphanages(&self) -> ApiResult<Vec<OrphanageSummary>>;
    fn get_orphanage(&self, id: &OrphanageId) -> ApiResult<OrphanageDetails>;
    fn create_orphanage(&self, form: &SubmissionForm) -> ApiResult<()>;
}

pub struct HttpApi {
    client: Client,
    base_url: Url,
}

impl HttpApi {
    pub fn new(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        let invalid = |reason: String| ApiError::InvalidUrl {
            url: base_url.to_string(),
            reason,
        };

        let base_url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(invalid("expected an http(s) base url".to_string()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Network)?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn check(response: Response) -> ApiResult<Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(ApiError::Status {
                status: status.as_u16(),
            })
        }
    }

    fn build_form(form: &SubmissionForm) -> ApiResult<multipart::Form> {
        let mut multipart = multipart::Form::new();
        for (name, value) in form.text_fields() {
            multipart = multipart.text(*name, value.clone());
        }

        for image in form.images() {
            let part = multipart::Part::file(&image.path)
                .map_err(|source| ApiError::Image {
                    path: image.path.clone(),
                    source,
                })?
                .file_name(image.file_name.clone())
                .mime_str(IMAGE_MIME)
                .map_err(ApiError::Decode)?;
            multipart = multipart.part(IMAGE_FIELD, part);
        }

        Ok(multipart)
    }
}

impl OrphanageApi for HttpApi {
    fn list_orphanages(&self) -> ApiResult<Vec<OrphanageSummary>> {
        let url = self.endpoint(&["orphanages"]);
        tracing::debug!(%url, "GET orphanages");

        let response = self.client.get(url).send().map_err(ApiError::Network)?;
        Self::check(response)?.json().map_err(ApiError::Decode)
    }

    fn get_orphanage(&self, id: &OrphanageId) -> ApiResult<OrphanageDetails> {
        let url = self.endpoint(&["orphanages", id.as_str()]);
        tracing::debug!(%url, "GET orphanage");

        let response = self.client.get(url).send().map_err(ApiError::Network)?;
        Self::check(response)?.json().map_err(ApiError::Decode)
    }

    fn create_orphanage(&self, form: &SubmissionForm) -> ApiResult<()> {
        let url = self.endpoint(&["orphanages"]);
        let multipart = Self::build_form(form)?;
        tracing::debug!(%url, images = form.images().len(), "POST orphanage");

        let response = self
            .client
            .post(url)
            .multipart(multipart)
            .send()
            .map_err(ApiError::Network)?;
        let response = Self::check(response)?;
        if response.status() != StatusCode::CREATED {
            tracing::debug!(status = %response.status(), "orphanage accepted with non-201 status");
        }
        Ok(())
    }
}

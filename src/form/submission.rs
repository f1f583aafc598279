//! Submission lifecycle types and the HTTP transport

use async_trait::async_trait;
use reqwest::Client;

use super::error::{SubmitError, SubmitRejected};

/// Label of the submit control while idle
pub const SUBMIT_LABEL: &str = "Submit Brief";

/// Label of the submit control while a request is in flight
pub const SUBMITTING_LABEL: &str = "Submitting...";

/// Where the form is in its submission lifecycle.
///
/// `NotSubmitted -> Submitting -> {Succeeded | Failed}`, with
/// `Failed -> Submitting` as the only way back in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionStatus {
    #[default]
    NotSubmitted,
    Submitting,
    Succeeded,
    Failed,
}

impl SubmissionStatus {
    /// Check whether a new attempt may start from this state
    pub fn can_begin(&self) -> Result<(), SubmitRejected> {
        match self {
            SubmissionStatus::NotSubmitted | SubmissionStatus::Failed => Ok(()),
            SubmissionStatus::Submitting => Err(SubmitRejected::InFlight),
            SubmissionStatus::Succeeded => Err(SubmitRejected::AlreadySucceeded),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SubmissionStatus::Succeeded)
    }

    pub fn label(&self) -> &'static str {
        match self {
            SubmissionStatus::NotSubmitted => "not submitted",
            SubmissionStatus::Submitting => "submitting",
            SubmissionStatus::Succeeded => "succeeded",
            SubmissionStatus::Failed => "failed",
        }
    }
}

/// Visual state of the submit button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitControl {
    pub enabled: bool,
    pub loading: bool,
    pub label: String,
    original_label: String,
}

impl SubmitControl {
    pub fn new(label: &str) -> Self {
        Self {
            enabled: true,
            loading: false,
            label: label.to_string(),
            original_label: label.to_string(),
        }
    }

    /// Disable and show the in-progress label
    pub fn lock(&mut self) {
        self.enabled = false;
        self.loading = true;
        self.label = SUBMITTING_LABEL.to_string();
    }

    /// Re-enable with the original label
    pub fn restore(&mut self) {
        self.enabled = true;
        self.loading = false;
        self.label = self.original_label.clone();
    }
}

impl Default for SubmitControl {
    fn default() -> Self {
        Self::new(SUBMIT_LABEL)
    }
}

/// Delivers a serialized form somewhere.
///
/// Implementations make exactly one attempt per call.
#[async_trait]
pub trait FormTransport: Send + Sync {
    /// Post all pairs url-encoded; `Ok` only for a 2xx response
    async fn post_form(&self, fields: &[(String, String)]) -> Result<(), SubmitError>;

    /// Human-readable destination, for logs
    fn destination(&self) -> &str;
}

/// POSTs `application/x-www-form-urlencoded` bodies with reqwest
pub struct HttpTransport {
    client: Client,
    url: String,
}

impl HttpTransport {
    /// Build a transport for `path` on `origin` (e.g. `https://example.com` + `/`)
    pub fn new(origin: &str, path: &str) -> Self {
        Self {
            client: Client::new(),
            url: join_url(origin, path),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Join an origin and a path without doubling or dropping the slash
pub fn join_url(origin: &str, path: &str) -> String {
    let origin = origin.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{origin}/{path}")
}

#[async_trait]
impl FormTransport for HttpTransport {
    async fn post_form(&self, fields: &[(String, String)]) -> Result<(), SubmitError> {
        // `.form` sets Content-Type: application/x-www-form-urlencoded
        let response = self
            .client
            .post(&self.url)
            .form(fields)
            .send()
            .await
            .map_err(|e| SubmitError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(url = %self.url, status = %status, "Form accepted");
            Ok(())
        } else {
            tracing::warn!(url = %self.url, status = %status, "Form rejected");
            Err(SubmitError::Status(status.as_u16()))
        }
    }

    fn destination(&self) -> &str {
        &self.url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_begin_from_each_state() {
        assert!(SubmissionStatus::NotSubmitted.can_begin().is_ok());
        assert!(SubmissionStatus::Failed.can_begin().is_ok());
        assert_eq!(
            SubmissionStatus::Submitting.can_begin(),
            Err(SubmitRejected::InFlight)
        );
        assert_eq!(
            SubmissionStatus::Succeeded.can_begin(),
            Err(SubmitRejected::AlreadySucceeded)
        );
    }

    #[test]
    fn test_only_success_is_terminal() {
        assert!(SubmissionStatus::Succeeded.is_terminal());
        assert!(!SubmissionStatus::Failed.is_terminal());
        assert!(!SubmissionStatus::NotSubmitted.is_terminal());
    }

    #[test]
    fn test_control_lock_and_restore() {
        let mut control = SubmitControl::default();
        assert!(control.enabled);
        assert_eq!(control.label, SUBMIT_LABEL);

        control.lock();
        assert!(!control.enabled);
        assert!(control.loading);
        assert_eq!(control.label, SUBMITTING_LABEL);

        control.restore();
        assert!(control.enabled);
        assert!(!control.loading);
        assert_eq!(control.label, SUBMIT_LABEL);
    }

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("http://localhost:8080", "/"), "http://localhost:8080/");
        assert_eq!(join_url("http://localhost:8080/", "/"), "http://localhost:8080/");
        assert_eq!(
            join_url("https://example.com", "forms/brief"),
            "https://example.com/forms/brief"
        );
    }

    #[test]
    fn test_http_transport_url() {
        let transport = HttpTransport::new("https://studio.example", "/");
        assert_eq!(transport.url(), "https://studio.example/");
        assert_eq!(transport.destination(), "https://studio.example/");
    }
}

//! End-of-session report delivery.
//!
//! `Reporter` is the messaging capability seam; the production implementation
//! POSTs the report to a webhook. Invoked at most once per session, only when
//! at least one attendance event was recorded.

use std::time::Duration;
use thiserror::Error;

const REPORT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
    #[error("webhook returned status {0}")]
    BadStatus(reqwest::StatusCode),
}

/// Messaging capability: deliver a report body to a destination.
pub trait Reporter {
    fn send(&self, destination: &str, body: &str) -> Result<(), ReportError>;
}

/// POSTs `{ "to": destination, "body": body }` to a configured webhook.
pub struct WebhookReporter {
    client: reqwest::blocking::Client,
    url: String,
}

impl WebhookReporter {
    pub fn new(url: impl Into<String>) -> Result<Self, ReportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REPORT_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl Reporter for WebhookReporter {
    fn send(&self, destination: &str, body: &str) -> Result<(), ReportError> {
        let response = self
            .client
            .post(&self.url)
            .json(&serde_json::json!({ "to": destination, "body": body }))
            .send()?;

        if !response.status().is_success() {
            return Err(ReportError::BadStatus(response.status()));
        }
        tracing::info!(destination, "session report delivered");
        Ok(())
    }
}

/// Fallback when no webhook is configured: the report goes to the log.
pub struct LogReporter;

impl Reporter for LogReporter {
    fn send(&self, destination: &str, body: &str) -> Result<(), ReportError> {
        tracing::info!(destination, report = body, "no webhook configured, logging report");
        Ok(())
    }
}

/// Format the session's records into the report body.
pub fn format_report(records: &[String]) -> String {
    format!("Attendance Report:\n\n{}", records.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_format_report_single_record() {
        let records = vec!["Entry - Asha at 09:00:05".to_string()];
        assert_eq!(
            format_report(&records),
            "Attendance Report:\n\nEntry - Asha at 09:00:05"
        );
    }

    #[test]
    fn test_format_report_joins_with_newlines() {
        let records = vec![
            "Entry - Asha at 09:00:05".to_string(),
            "Exit - Asha at 09:00:07".to_string(),
            "Entry - Ben at 09:01:00".to_string(),
        ];
        let body = format_report(&records);
        assert!(body.starts_with("Attendance Report:\n\n"));
        assert_eq!(body.lines().count(), 5);
        assert!(body.ends_with("Entry - Ben at 09:01:00"));
    }

    /// Recording double for the capability seam.
    struct RecordingReporter {
        sent: RefCell<Vec<(String, String)>>,
    }

    impl Reporter for RecordingReporter {
        fn send(&self, destination: &str, body: &str) -> Result<(), ReportError> {
            self.sent
                .borrow_mut()
                .push((destination.to_string(), body.to_string()));
            Ok(())
        }
    }

    #[test]
    fn test_reporter_seam_accepts_doubles() {
        let reporter = RecordingReporter {
            sent: RefCell::new(Vec::new()),
        };
        reporter
            .send("operator", "Attendance Report:\n\nEntry - Asha at 09:00:05")
            .unwrap();
        let sent = reporter.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "operator");
    }
}

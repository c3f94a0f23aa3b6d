//! Feedback form state and submission.
//!
//! The form has an anonymous toggle: switching it on disables and clears the
//! first and last name fields; switching it off re-enables them empty.
//! Submission goes through a [`FeedbackSubmitter`]; no network backend ships
//! with the crate, only [`LoggingSubmitter`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Errors a feedback backend may report.
#[derive(Error, Debug)]
pub enum SubmitError {
    /// The backend refused the submission.
    #[error("feedback rejected: {reason}")]
    Rejected {
        /// Why it was refused.
        reason: String,
    },

    /// The backend could not be reached.
    #[error("feedback transport failed: {0}")]
    Transport(String),
}

/// A text input that can be disabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameField {
    value: String,
    enabled: bool,
}

impl Default for NameField {
    fn default() -> Self {
        Self {
            value: String::new(),
            enabled: true,
        }
    }
}

impl NameField {
    /// Current contents.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Whether the field accepts input.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Replace the contents. Ignored while disabled; returns whether the
    /// write took effect.
    pub fn set(&mut self, value: impl Into<String>) -> bool {
        if !self.enabled {
            return false;
        }
        self.value = value.into();
        true
    }
}

/// In-memory state of the feedback form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedbackForm {
    first_name: NameField,
    last_name: NameField,
    anonymous: bool,
    /// Free-text feedback.
    pub message: String,
    /// Facility the feedback is about, if any.
    pub unit_id: Option<String>,
}

impl FeedbackForm {
    /// Create an empty, identified form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// First name field.
    #[must_use]
    pub fn first_name(&self) -> &NameField {
        &self.first_name
    }

    /// Last name field.
    #[must_use]
    pub fn last_name(&self) -> &NameField {
        &self.last_name
    }

    /// Mutable first name field.
    pub fn first_name_mut(&mut self) -> &mut NameField {
        &mut self.first_name
    }

    /// Mutable last name field.
    pub fn last_name_mut(&mut self) -> &mut NameField {
        &mut self.last_name
    }

    /// Whether the anonymous toggle is on.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.anonymous
    }

    /// Handle a change of the anonymous toggle.
    ///
    /// Entering anonymous disables and clears both name fields. Leaving it
    /// re-enables them; cleared values are not restored.
    pub fn set_anonymous(&mut self, anonymous: bool) {
        self.anonymous = anonymous;
        for field in [&mut self.first_name, &mut self.last_name] {
            field.enabled = !anonymous;
            if anonymous {
                field.value.clear();
            }
        }
    }

    /// Snapshot the form for submission.
    #[must_use]
    pub fn to_submission(&self) -> FeedbackSubmission {
        let name = |field: &NameField| {
            Some(field.value.trim())
                .filter(|v| !self.anonymous && !v.is_empty())
                .map(str::to_string)
        };
        FeedbackSubmission {
            first_name: name(&self.first_name),
            last_name: name(&self.last_name),
            anonymous: self.anonymous,
            message: self.message.clone(),
            unit_id: self.unit_id.clone(),
            submitted_at: Utc::now(),
        }
    }

    /// Submit the form.
    ///
    /// This replaces the browser's default form navigation: nothing happens
    /// besides handing the snapshot to `submitter`.
    ///
    /// # Errors
    ///
    /// Returns whatever the submitter reports.
    pub async fn submit(&self, submitter: &dyn FeedbackSubmitter) -> Result<(), SubmitError> {
        submitter.submit(&self.to_submission()).await
    }
}

/// What gets sent to a feedback backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackSubmission {
    /// First name, absent when anonymous or blank.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Last name, absent when anonymous or blank.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Whether the sender chose to stay anonymous.
    pub anonymous: bool,
    /// Free-text feedback.
    pub message: String,
    /// Facility the feedback is about.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_id: Option<String>,
    /// When the form was submitted.
    pub submitted_at: DateTime<Utc>,
}

/// A backend that accepts feedback.
#[async_trait]
pub trait FeedbackSubmitter: Send + Sync {
    /// Deliver one submission.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects or cannot receive it.
    async fn submit(&self, submission: &FeedbackSubmission) -> Result<(), SubmitError>;
}

/// Placeholder backend: logs the submission and accepts it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingSubmitter;

#[async_trait]
impl FeedbackSubmitter for LoggingSubmitter {
    async fn submit(&self, submission: &FeedbackSubmission) -> Result<(), SubmitError> {
        info!(
            anonymous = submission.anonymous,
            unit_id = submission.unit_id.as_deref().unwrap_or("-"),
            message_len = submission.message.len(),
            "Feedback submitted (no backend configured)"
        );
        Ok(())
    }
}

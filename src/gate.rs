// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Submission gate: the single entry point the UI calls before writing.
//!
//! New issues pass, in order: rate limits (hour, then day), content rules,
//! the photo, the reporting radius and duplicate detection. Comments pass
//! the comment rate limit, the comment content rules and a check that the
//! issue still exists. The first rejection ends the run. Rate counters are
//! only bumped once every step has passed, so a rejected attempt leaves the
//! store untouched.

use crate::clock::{Clock, SystemClock};
use crate::config::GateConfig;
use crate::content::ContentValidator;
use crate::duplicate::DuplicateDetector;
use crate::error::{Rejection, Result, StoreError, Verdict};
use crate::geo::{Coordinates, GeofenceValidator};
use crate::issues::IssueLog;
use crate::limiter::{RateCategory, RateLimiter};
use crate::photo::{ImageDecoder, ImageUpload, ImageValidator, PixelDecoder};
use crate::store::KeyValueStore;
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of the pipeline steps: `Err` carries the first rejection.
type StepOutcome = std::result::Result<(), Rejection>;

/// A new issue as entered in the report form.
#[derive(Debug, Clone)]
pub struct IssueCandidate {
    pub title: String,
    pub description: String,
    pub image: Option<ImageUpload>,
    /// Where the pin was dropped
    pub location: Coordinates,
}

/// A new comment as entered under an issue.
#[derive(Debug, Clone)]
pub struct CommentCandidate {
    pub issue_id: String,
    pub text: String,
    pub author: String,
}

/// Orchestrates every anti-abuse check.
#[derive(Debug, Clone)]
pub struct SubmissionGate {
    config: GateConfig,
    limiter: RateLimiter,
    content: ContentValidator,
    images: ImageValidator,
    geofence: GeofenceValidator,
    duplicates: DuplicateDetector,
    issues: IssueLog,
}

impl SubmissionGate {
    /// Create a gate over `store` using the system clock and [`PixelDecoder`].
    pub fn new(config: GateConfig, store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_parts(config, store, Arc::new(SystemClock), Arc::new(PixelDecoder))
    }

    /// Create a gate with explicit clock and image decoder.
    pub fn with_parts(
        config: GateConfig,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        decoder: Arc<dyn ImageDecoder>,
    ) -> Self {
        Self {
            limiter: RateLimiter::new(config.rate_limit.clone(), store.clone(), clock),
            content: ContentValidator::new(config.content.clone()),
            images: ImageValidator::with_decoder(config.image.clone(), decoder),
            geofence: GeofenceValidator::new(config.geofence.clone()),
            duplicates: DuplicateDetector::new(config.duplicates.clone()),
            issues: IssueLog::new(store),
            config,
        }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn issues(&self) -> &IssueLog {
        &self.issues
    }

    /// Run the full pipeline for a new issue.
    ///
    /// On `Accepted` the issue rate counters have been bumped; persisting the
    /// issue itself is the caller's job.
    pub async fn check_issue(
        &self,
        candidate: &IssueCandidate,
        user_location: Coordinates,
    ) -> Result<Verdict> {
        let verdict: Verdict = self.run_issue_steps(candidate, user_location).await?.into();

        match verdict.rejection() {
            Some(rejection) => {
                info!(code = rejection.code(), reason = %rejection, "Issue rejected");
            }
            None => {
                self.limiter.record(RateCategory::Issue)?;
                debug!("Issue accepted");
            }
        }

        Ok(verdict)
    }

    /// Returns `Ok(Err(_))` for a rejection and `Err(_)` for a store failure.
    async fn run_issue_steps(
        &self,
        candidate: &IssueCandidate,
        user_location: Coordinates,
    ) -> std::result::Result<StepOutcome, StoreError> {
        if let Verdict::Rejected(r) = self.limiter.check(RateCategory::Issue)? {
            return Ok(Err(r));
        }

        if let Verdict::Rejected(r) = self
            .content
            .validate_issue(&candidate.title, &candidate.description)
        {
            return Ok(Err(r));
        }

        match &candidate.image {
            Some(upload) => {
                if let Verdict::Rejected(r) = self.images.validate(upload).await {
                    return Ok(Err(r));
                }
            }
            None if self.config.image.required => return Ok(Err(Rejection::ImageMissing)),
            None => {}
        }

        if let Verdict::Rejected(r) = self.geofence.validate(candidate.location, user_location) {
            return Ok(Err(r));
        }

        let recent = self.issues.recent(self.duplicates.window())?;
        Ok(self
            .duplicates
            .check(&candidate.title, &candidate.description, &recent)
            .into_result())
    }

    /// Run the pipeline for a new comment.
    ///
    /// On `Accepted` the comment rate counter has been bumped and the target
    /// issue was present in the store.
    pub fn check_comment(&self, candidate: &CommentCandidate) -> Result<Verdict> {
        let mut verdict = self.limiter.check(RateCategory::Comment)?;
        if verdict.is_accepted() {
            verdict = self
                .content
                .validate_comment(&candidate.text, &candidate.author);
        }
        if verdict.is_accepted() && !self.issues.contains(&candidate.issue_id)? {
            verdict = Verdict::Rejected(Rejection::IssueNotFound {
                issue_id: candidate.issue_id.clone(),
            });
        }

        match verdict.rejection() {
            Some(rejection) => {
                info!(
                    issue_id = %candidate.issue_id,
                    code = rejection.code(),
                    reason = %rejection,
                    "Comment rejected"
                );
            }
            None => {
                self.limiter.record(RateCategory::Comment)?;
                debug!(issue_id = %candidate.issue_id, "Comment accepted");
            }
        }

        Ok(verdict)
    }

    /// Check a category's limits and count the action if allowed.
    pub fn check_and_increment(&self, category: RateCategory) -> Result<Verdict> {
        Ok(self.limiter.check_and_increment(category)?)
    }

    /// Validate a photo on its own.
    pub async fn validate_image(&self, upload: &ImageUpload) -> Verdict {
        self.images.validate(upload).await
    }

    /// Validate an issue title and description on their own.
    pub fn validate_content(&self, title: &str, description: &str) -> Verdict {
        self.content.validate_issue(title, description)
    }

    /// Validate comment text and author name on their own.
    pub fn validate_comment(&self, text: &str, author: &str) -> Verdict {
        self.content.validate_comment(text, author)
    }

    /// Check that an issue pin is within range of the reporter.
    pub fn validate_location(&self, issue: Coordinates, user: Coordinates) -> Verdict {
        self.geofence.validate(issue, user)
    }

    /// Compare against the most recent stored issues.
    pub fn check_for_duplicates(&self, title: &str, description: &str) -> Result<Verdict> {
        let recent = self.issues.recent(self.duplicates.window())?;
        Ok(self.duplicates.check(title, description, &recent))
    }

    /// Drop stale rate counters. Returns how many were removed.
    pub fn cleanup_rate_limit_data(&self) -> Result<usize> {
        Ok(self.limiter.cleanup()?)
    }
}

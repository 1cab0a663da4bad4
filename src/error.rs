// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Rejection and error types for the submission gate.
//!
//! A [`Rejection`] is an expected outcome: the submission broke a rule and the
//! user has to correct it. [`StoreError`] and [`GateError`] are infrastructure
//! failures that are not the user's fault.

use crate::limiter::{RateCategory, WindowScope};
use thiserror::Error;

/// Why a submission was turned away.
///
/// `Display` yields the message shown to the user.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Rejection {
    #[error("{}", rate_limit_message(.scope, .category, .limit))]
    RateLimitExceeded {
        scope: WindowScope,
        category: RateCategory,
        limit: u32,
    },

    #[error("Title must be at least {min} characters long. Please be more descriptive.")]
    TitleTooShort { min: usize },

    #[error("Title too long. Please keep it under {max} characters.")]
    TitleTooLong { max: usize },

    #[error("Description must be at least {min} characters long. Please provide more details.")]
    DescriptionTooShort { min: usize },

    #[error("Description too long. Please keep it under {max} characters.")]
    DescriptionTooLong { max: usize },

    #[error("Comment must be at least {min} characters long.")]
    CommentTooShort { min: usize },

    #[error("Comment too long. Please keep it under {max} characters.")]
    CommentTooLong { max: usize },

    #[error("Name must be at least {min} characters long.")]
    AuthorNameTooShort { min: usize },

    #[error("Name too long. Please keep it under {max} characters.")]
    AuthorNameTooLong { max: usize },

    #[error("Content appears to contain spam. Please review your submission.")]
    SpamDetected,

    #[error("Content contains too many repetitive characters.")]
    RepetitiveContent,

    #[error("Please avoid excessive use of capital letters.")]
    ExcessiveCapitalization,

    #[error("Please attach a photo of the issue.")]
    ImageMissing,

    #[error("Image must be under {}MB. Please compress your image or choose a smaller one.", megabytes(.max_bytes))]
    ImageTooLarge { max_bytes: u64, actual_bytes: u64 },

    #[error("Only JPEG, PNG, and WebP images are allowed.")]
    ImageInvalidType { mime_type: String },

    #[error("Invalid image file.")]
    ImageDecodeFailed,

    #[error("Image dimensions too large. Maximum size: {max_width}x{max_height} pixels.")]
    ImageDimensionsTooLarge {
        max_width: u32,
        max_height: u32,
        width: u32,
        height: u32,
    },

    #[error("Image too small. Minimum size: {min_side}x{min_side} pixels.")]
    ImageDimensionsTooSmall { min_side: u32, width: u32, height: u32 },

    #[error("Issues can only be reported within {max_distance_m}m of your location. This helps ensure reports are authentic and local.")]
    LocationOutOfRange { max_distance_m: f64, distance_m: f64 },

    #[error("A similar issue was recently reported. Please check existing reports before submitting.")]
    DuplicateContent,

    #[error("The issue you are commenting on no longer exists.")]
    IssueNotFound { issue_id: String },
}

impl Rejection {
    /// Stable machine-readable code for the rejection cause.
    pub fn code(&self) -> &'static str {
        match self {
            Self::RateLimitExceeded { .. } => "RATE_LIMITED",
            Self::TitleTooShort { .. } => "TITLE_TOO_SHORT",
            Self::TitleTooLong { .. } => "TITLE_TOO_LONG",
            Self::DescriptionTooShort { .. } => "DESCRIPTION_TOO_SHORT",
            Self::DescriptionTooLong { .. } => "DESCRIPTION_TOO_LONG",
            Self::CommentTooShort { .. } => "COMMENT_TOO_SHORT",
            Self::CommentTooLong { .. } => "COMMENT_TOO_LONG",
            Self::AuthorNameTooShort { .. } => "AUTHOR_NAME_TOO_SHORT",
            Self::AuthorNameTooLong { .. } => "AUTHOR_NAME_TOO_LONG",
            Self::SpamDetected => "SPAM_DETECTED",
            Self::RepetitiveContent => "REPETITIVE_CONTENT",
            Self::ExcessiveCapitalization => "EXCESSIVE_CAPITALIZATION",
            Self::ImageMissing => "IMAGE_MISSING",
            Self::ImageTooLarge { .. } => "IMAGE_TOO_LARGE",
            Self::ImageInvalidType { .. } => "IMAGE_INVALID_TYPE",
            Self::ImageDecodeFailed => "IMAGE_DECODE_FAILED",
            Self::ImageDimensionsTooLarge { .. } => "IMAGE_DIMENSIONS_TOO_LARGE",
            Self::ImageDimensionsTooSmall { .. } => "IMAGE_DIMENSIONS_TOO_SMALL",
            Self::LocationOutOfRange { .. } => "LOCATION_OUT_OF_RANGE",
            Self::DuplicateContent => "DUPLICATE_CONTENT",
            Self::IssueNotFound { .. } => "ISSUE_NOT_FOUND",
        }
    }
}

fn megabytes(bytes: &u64) -> f64 {
    *bytes as f64 / (1024.0 * 1024.0)
}

fn rate_limit_message(scope: &WindowScope, category: &RateCategory, limit: &u32) -> String {
    let (verb, noun) = match category {
        RateCategory::Issue => ("report", "issues"),
        RateCategory::Comment => ("add", "comments"),
    };
    match scope {
        WindowScope::Hourly => format!(
            "Rate limit exceeded. You can only {} {} {} per hour.",
            verb, limit, noun
        ),
        WindowScope::Daily => format!(
            "Daily limit exceeded. You can only {} {} {} per day.",
            verb, limit, noun
        ),
    }
}

/// Outcome of a validation step.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Submission passes
    Accepted,
    /// Submission is turned away
    Rejected(Rejection),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Verdict::Accepted => None,
            Verdict::Rejected(r) => Some(r),
        }
    }

    /// Convert into a `Result` so steps can be chained with `?`.
    pub fn into_result(self) -> std::result::Result<(), Rejection> {
        match self {
            Verdict::Accepted => Ok(()),
            Verdict::Rejected(r) => Err(r),
        }
    }
}

impl From<std::result::Result<(), Rejection>> for Verdict {
    fn from(result: std::result::Result<(), Rejection>) -> Self {
        match result {
            Ok(()) => Verdict::Accepted,
            Err(r) => Verdict::Rejected(r),
        }
    }
}

/// Key-value store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store lock poisoned")]
    Poisoned,

    #[error("Corrupt value for key {key}: {value:?}")]
    CorruptValue { key: String, value: String },
}

/// Gate failures that are not rejections.
#[derive(Debug, Error)]
pub enum GateError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, GateError>;

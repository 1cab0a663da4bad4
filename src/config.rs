// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the submission gate.
//!
//! Defaults are the published anti-abuse policy: 3 reports per hour, 10 per
//! day, 5 comments per hour, 2MB images and a 1km reporting radius.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the whole gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    /// Path of the JSON store file used by the CLI (default: report-gate.json)
    #[serde(default = "default_store_path")]
    pub store_path: String,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Text heuristics configuration
    #[serde(default)]
    pub content: ContentConfig,

    /// Image upload constraints
    #[serde(default)]
    pub image: ImageConfig,

    /// Reporting radius
    #[serde(default)]
    pub geofence: GeofenceConfig,

    /// Duplicate detection window
    #[serde(default)]
    pub duplicates: DuplicateConfig,
}

/// Fixed-window rate limits per action category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Issues per hourly window (default: 3)
    #[serde(default = "default_issues_per_hour")]
    pub issues_per_hour: u32,

    /// Issues per daily window (default: 10)
    #[serde(default = "default_issues_per_day")]
    pub issues_per_day: u32,

    /// Comments per hourly window (default: 5)
    #[serde(default = "default_comments_per_hour")]
    pub comments_per_hour: u32,

    /// Hourly windows kept before cleanup removes them (default: 24)
    #[serde(default = "default_hourly_retention")]
    pub hourly_retention: i64,

    /// Daily windows kept before cleanup removes them (default: 7)
    #[serde(default = "default_daily_retention")]
    pub daily_retention: i64,
}

/// Length bounds and heuristics for free text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    #[serde(default = "default_title_min")]
    pub title_min: usize,
    #[serde(default = "default_title_max")]
    pub title_max: usize,
    #[serde(default = "default_description_min")]
    pub description_min: usize,
    #[serde(default = "default_description_max")]
    pub description_max: usize,
    #[serde(default = "default_comment_min")]
    pub comment_min: usize,
    #[serde(default = "default_comment_max")]
    pub comment_max: usize,
    #[serde(default = "default_author_min")]
    pub author_min: usize,
    #[serde(default = "default_author_max")]
    pub author_max: usize,

    /// Case-insensitive substrings that mark a submission as spam
    #[serde(default = "default_spam_keywords")]
    pub spam_keywords: Vec<String>,

    /// A run of this many identical characters is rejected (default: 11)
    #[serde(default = "default_max_repeat_run")]
    pub repeat_run_limit: usize,

    /// Uppercase ratio above which text is rejected (default: 0.5)
    #[serde(default = "default_uppercase_ratio")]
    pub max_uppercase_ratio: f64,

    /// Capitalization check only applies to text longer than this (default: 20)
    #[serde(default = "default_uppercase_min_len")]
    pub uppercase_min_length: usize,
}

/// Image upload constraints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Reject issues without a photo (default: true)
    #[serde(default = "default_true")]
    pub required: bool,

    /// Maximum upload size in bytes (default: 2 MiB)
    #[serde(default = "default_max_image_bytes")]
    pub max_bytes: u64,

    /// Accepted MIME types, compared case-insensitively
    #[serde(default = "default_allowed_types")]
    pub allowed_types: Vec<String>,

    #[serde(default = "default_max_width")]
    pub max_width: u32,
    #[serde(default = "default_max_height")]
    pub max_height: u32,

    /// Minimum for both width and height (default: 100)
    #[serde(default = "default_min_side")]
    pub min_side: u32,
}

/// Reporting radius around the reporter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeofenceConfig {
    /// Maximum distance between reporter and pin in meters (default: 1000)
    #[serde(default = "default_max_distance_m")]
    pub max_distance_m: f64,
}

/// Duplicate detection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateConfig {
    /// How many of the most recent issues are compared (default: 10)
    #[serde(default = "default_recent_window")]
    pub recent_window: usize,

    /// Description prefix length used for the similarity check (default: 50)
    #[serde(default = "default_description_prefix")]
    pub description_prefix: usize,
}

// Default value functions
fn default_store_path() -> String {
    "report-gate.json".to_string()
}

fn default_issues_per_hour() -> u32 {
    3
}

fn default_issues_per_day() -> u32 {
    10
}

fn default_comments_per_hour() -> u32 {
    5
}

fn default_hourly_retention() -> i64 {
    24
}

fn default_daily_retention() -> i64 {
    7
}

fn default_title_min() -> usize {
    10
}

fn default_title_max() -> usize {
    100
}

fn default_description_min() -> usize {
    20
}

fn default_description_max() -> usize {
    1000
}

fn default_comment_min() -> usize {
    5
}

fn default_comment_max() -> usize {
    500
}

fn default_author_min() -> usize {
    2
}

fn default_author_max() -> usize {
    50
}

fn default_spam_keywords() -> Vec<String> {
    [
        "viagra",
        "casino",
        "lottery",
        "free money",
        "click here",
        "buy now",
        "limited time",
        "act now",
        "congratulations",
        "winner",
        "prize",
        "investment",
        "cryptocurrency",
        "bitcoin",
        "make money fast",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_max_repeat_run() -> usize {
    11
}

fn default_uppercase_ratio() -> f64 {
    0.5
}

fn default_uppercase_min_len() -> usize {
    20
}

fn default_true() -> bool {
    true
}

fn default_max_image_bytes() -> u64 {
    2 * 1024 * 1024
}

fn default_allowed_types() -> Vec<String> {
    ["image/jpeg", "image/jpg", "image/png", "image/webp"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_max_width() -> u32 {
    1920
}

fn default_max_height() -> u32 {
    1080
}

fn default_min_side() -> u32 {
    100
}

fn default_max_distance_m() -> f64 {
    1000.0
}

fn default_recent_window() -> usize {
    10
}

fn default_description_prefix() -> usize {
    50
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            rate_limit: RateLimitConfig::default(),
            content: ContentConfig::default(),
            image: ImageConfig::default(),
            geofence: GeofenceConfig::default(),
            duplicates: DuplicateConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            issues_per_hour: default_issues_per_hour(),
            issues_per_day: default_issues_per_day(),
            comments_per_hour: default_comments_per_hour(),
            hourly_retention: default_hourly_retention(),
            daily_retention: default_daily_retention(),
        }
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            title_min: default_title_min(),
            title_max: default_title_max(),
            description_min: default_description_min(),
            description_max: default_description_max(),
            comment_min: default_comment_min(),
            comment_max: default_comment_max(),
            author_min: default_author_min(),
            author_max: default_author_max(),
            spam_keywords: default_spam_keywords(),
            repeat_run_limit: default_max_repeat_run(),
            max_uppercase_ratio: default_uppercase_ratio(),
            uppercase_min_length: default_uppercase_min_len(),
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            required: default_true(),
            max_bytes: default_max_image_bytes(),
            allowed_types: default_allowed_types(),
            max_width: default_max_width(),
            max_height: default_max_height(),
            min_side: default_min_side(),
        }
    }
}

impl Default for GeofenceConfig {
    fn default() -> Self {
        Self {
            max_distance_m: default_max_distance_m(),
        }
    }
}

impl Default for DuplicateConfig {
    fn default() -> Self {
        Self {
            recent_window: default_recent_window(),
            description_prefix: default_description_prefix(),
        }
    }
}

impl GateConfig {
    /// Load configuration from a JSON file. Missing fields take defaults.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Apply environment variable overrides on top of the current values.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(path) = std::env::var("REPORT_GATE_STORE") {
            self.store_path = path;
        }
        if let Some(v) = env_parse("ISSUES_PER_HOUR") {
            self.rate_limit.issues_per_hour = v;
        }
        if let Some(v) = env_parse("ISSUES_PER_DAY") {
            self.rate_limit.issues_per_day = v;
        }
        if let Some(v) = env_parse("COMMENTS_PER_HOUR") {
            self.rate_limit.comments_per_hour = v;
        }
        if let Some(v) = env_parse("GEOFENCE_RADIUS_M") {
            self.geofence.max_distance_m = v;
        }
        self
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

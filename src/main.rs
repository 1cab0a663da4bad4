// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Report Gate CLI
//!
//! Runs the anti-abuse gate against a JSON store file, the way the map UI
//! would before saving a report or a comment. Accepted submissions are
//! written to the store; every run prints a JSON verdict.
//!
//! ## Configuration
//!
//! An optional JSON config file (`--config`) is read first, then
//! environment variables override it:
//!
//! - `REPORT_GATE_STORE`: store file path (default: report-gate.json)
//! - `ISSUES_PER_HOUR`: max issues per hour (default: 3)
//! - `ISSUES_PER_DAY`: max issues per day (default: 10)
//! - `COMMENTS_PER_HOUR`: max comments per hour (default: 5)
//! - `GEOFENCE_RADIUS_M`: reporting radius in meters (default: 1000)

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

use report_gate::{
    distance_meters,
    issues::{Comment, Issue},
    photo::ImageUpload,
    CommentCandidate, Coordinates, FileStore, GateConfig, IssueCandidate, RateCategory,
    SubmissionGate, Verdict,
};

#[derive(Parser)]
#[command(name = "report-gate", about = "Anti-abuse gate for community issue reports")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Store file (overrides config and REPORT_GATE_STORE)
    #[arg(long, global = true)]
    store: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Check a new issue and save it if accepted
    Issue {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        /// Pin latitude
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        /// Pin longitude
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        /// Reporter latitude
        #[arg(long, allow_hyphen_values = true)]
        user_lat: f64,
        /// Reporter longitude
        #[arg(long, allow_hyphen_values = true)]
        user_lng: f64,
        /// Photo file
        #[arg(long)]
        image: Option<PathBuf>,
        /// Photo MIME type (guessed from the file extension if omitted)
        #[arg(long)]
        mime: Option<String>,
    },
    /// Check a new comment and save it if accepted
    Comment {
        #[arg(long)]
        issue_id: String,
        #[arg(long)]
        text: String,
        #[arg(long)]
        author: String,
    },
    /// Remove stale rate limit counters
    Cleanup,
    /// Show current rate limit usage
    Usage,
    /// Print the distance in meters between two points
    Distance {
        #[arg(allow_hyphen_values = true)]
        lat1: f64,
        #[arg(allow_hyphen_values = true)]
        lng1: f64,
        #[arg(allow_hyphen_values = true)]
        lat2: f64,
        #[arg(allow_hyphen_values = true)]
        lng2: f64,
    },
}

/// Verdict printed for `issue` and `comment`.
#[derive(Debug, Serialize)]
struct CheckResponse {
    allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
}

impl CheckResponse {
    fn from_verdict(verdict: &Verdict, id: Option<String>) -> Self {
        match verdict.rejection() {
            None => Self {
                allowed: true,
                code: None,
                reason: None,
                id,
            },
            Some(rejection) => Self {
                allowed: false,
                code: Some(rejection.code()),
                reason: Some(rejection.to_string()),
                id: None,
            },
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::registry()
        .with(fmt::layer().json().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let args = Args::parse();

    let config = load_config(args.config.as_deref(), args.store)?;
    let store = Arc::new(
        FileStore::open(&config.store_path)
            .with_context(|| format!("opening store {}", config.store_path))?,
    );
    info!(
        store = %config.store_path,
        issues_per_hour = config.rate_limit.issues_per_hour,
        issues_per_day = config.rate_limit.issues_per_day,
        comments_per_hour = config.rate_limit.comments_per_hour,
        "Starting report gate"
    );

    let gate = SubmissionGate::new(config, store);

    match args.command {
        Command::Issue {
            title,
            description,
            lat,
            lng,
            user_lat,
            user_lng,
            image,
            mime,
        } => {
            let image_url = image
                .as_ref()
                .map(|path| path.display().to_string())
                .unwrap_or_default();
            let image = image
                .map(|path| read_upload(&path, mime.as_deref()))
                .transpose()?;
            let candidate = IssueCandidate {
                title: title.trim().to_string(),
                description: description.trim().to_string(),
                image,
                location: Coordinates::new(lat, lng),
            };

            let verdict = gate
                .check_issue(&candidate, Coordinates::new(user_lat, user_lng))
                .await?;

            let id = if verdict.is_accepted() {
                let id = Uuid::new_v4().to_string();
                gate.issues().append(Issue {
                    id: id.clone(),
                    latitude: lat,
                    longitude: lng,
                    title: candidate.title,
                    description: candidate.description,
                    image_url,
                    created_at: Utc::now(),
                    comments: Vec::new(),
                })?;
                info!(%id, "Issue saved");
                Some(id)
            } else {
                None
            };

            print_response(&CheckResponse::from_verdict(&verdict, id))
        }
        Command::Comment {
            issue_id,
            text,
            author,
        } => {
            let candidate = CommentCandidate {
                issue_id: issue_id.clone(),
                text: text.trim().to_string(),
                author: author.trim().to_string(),
            };

            let verdict = gate.check_comment(&candidate)?;

            let id = if verdict.is_accepted() {
                let id = Uuid::new_v4().to_string();
                let saved = gate.issues().add_comment(Comment {
                    id: id.clone(),
                    issue_id: issue_id.clone(),
                    text: candidate.text,
                    author: candidate.author,
                    created_at: Utc::now(),
                })?;
                anyhow::ensure!(saved, "no issue with id {}", issue_id);
                info!(%id, %issue_id, "Comment saved");
                Some(id)
            } else {
                None
            };

            print_response(&CheckResponse::from_verdict(&verdict, id))
        }
        Command::Cleanup => {
            let removed = gate.cleanup_rate_limit_data()?;
            println!("{}", serde_json::json!({ "removed": removed }));
            Ok(ExitCode::SUCCESS)
        }
        Command::Usage => {
            let usage = [
                gate.limiter().usage(RateCategory::Issue)?,
                gate.limiter().usage(RateCategory::Comment)?,
            ];
            println!("{}", serde_json::to_string_pretty(&usage)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Distance {
            lat1,
            lng1,
            lat2,
            lng2,
        } => {
            let meters = distance_meters(Coordinates::new(lat1, lng1), Coordinates::new(lat2, lng2));
            println!("{:.1}", meters);
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Load configuration from an optional file plus environment overrides.
fn load_config(path: Option<&Path>, store: Option<PathBuf>) -> anyhow::Result<GateConfig> {
    let base = match path {
        Some(path) => GateConfig::from_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => GateConfig::default(),
    };

    let mut config = base.with_env_overrides();
    if let Some(store) = store {
        config.store_path = store.display().to_string();
    }
    Ok(config)
}

fn read_upload(path: &Path, mime: Option<&str>) -> anyhow::Result<ImageUpload> {
    let bytes =
        std::fs::read(path).with_context(|| format!("reading image {}", path.display()))?;
    let mime = match mime {
        Some(m) => m.to_string(),
        None => guess_mime(path).to_string(),
    };
    Ok(ImageUpload::new(mime, bytes))
}

fn guess_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}

fn print_response(response: &CheckResponse) -> anyhow::Result<ExitCode> {
    println!("{}", serde_json::to_string(response)?);
    Ok(if response.allowed {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}

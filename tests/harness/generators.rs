// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Submission generators for abuse simulation.

use chrono::{TimeZone, Utc};
use image::{ImageFormat, RgbImage};
use report_gate::issues::Issue;
use report_gate::photo::ImageUpload;
use report_gate::{CommentCandidate, Coordinates, IssueCandidate};
use std::io::Cursor;

/// Trafalgar Square, London.
pub const HOME: Coordinates = Coordinates {
    latitude: 51.5080,
    longitude: -0.1281,
};

/// Meters per degree of latitude on the haversine sphere.
const METERS_PER_DEGREE: f64 = 111_194.93;

/// A point `meters` due north of `origin`.
pub fn north_of(origin: Coordinates, meters: f64) -> Coordinates {
    Coordinates::new(origin.latitude + meters / METERS_PER_DEGREE, origin.longitude)
}

/// Encode a blank RGB PNG.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    RgbImage::new(width, height)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("PNG encoding");
    bytes
}

/// A photo that passes every image rule.
pub fn valid_photo() -> ImageUpload {
    ImageUpload::new("image/png", png(200, 150))
}

/// The `n`th distinct, well-formed issue report pinned at [`HOME`].
pub fn valid_issue(n: usize) -> IssueCandidate {
    IssueCandidate {
        title: format!("Cracked pavement #{}", n),
        description: format!(
            "Report {:04}: the pavement outside house {} has cracked and lifted near the kerb.",
            n, n
        ),
        image: Some(valid_photo()),
        location: HOME,
    }
}

/// The `n`th report padded with a spam keyword.
pub fn spam_issue(n: usize, keywords: &[String]) -> IssueCandidate {
    let keyword = &keywords[n % keywords.len()];
    IssueCandidate {
        title: format!("Local notice {}", n),
        description: format!("Neighbours, please read this: {} details inside the flyer.", keyword),
        ..valid_issue(n)
    }
}

/// The same report every time.
pub fn repeated_issue() -> IssueCandidate {
    IssueCandidate {
        title: "Overflowing bin by the bus stop".to_string(),
        description: "The bin at the Strand bus stop has not been emptied for a week and is overflowing."
            .to_string(),
        image: Some(valid_photo()),
        location: HOME,
    }
}

/// The `n`th distinct comment on `issue_id`.
pub fn valid_comment(issue_id: &str, n: usize) -> CommentCandidate {
    CommentCandidate {
        issue_id: issue_id.to_string(),
        text: format!("Still a problem this morning, update {}.", n),
        author: "Priya".to_string(),
    }
}

/// Build the record the UI would persist for an accepted candidate.
pub fn to_issue(id: &str, candidate: &IssueCandidate) -> Issue {
    Issue {
        id: id.to_string(),
        latitude: candidate.location.latitude,
        longitude: candidate.location.longitude,
        title: candidate.title.clone(),
        description: candidate.description.clone(),
        image_url: String::new(),
        created_at: Utc
            .with_ymd_and_hms(2024, 3, 5, 10, 0, 0)
            .single()
            .expect("valid timestamp"),
        comments: Vec::new(),
    }
}

/// MIME types an uploader might send, and whether each should pass.
pub fn mime_types() -> Vec<(&'static str, bool)> {
    vec![
        ("image/jpeg", true),
        ("image/jpg", true),
        ("image/png", true),
        ("image/webp", true),
        ("IMAGE/PNG", true),
        ("image/png; charset=binary", true),
        ("image/gif", false),
        ("image/svg+xml", false),
        ("image/bmp", false),
        ("application/pdf", false),
        ("text/html", false),
        ("", false),
    ]
}

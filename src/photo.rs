// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Photo upload validation.
//!
//! Validation happens in two phases. [`ImageValidator::precheck`] applies the
//! size and MIME type rules synchronously and hands back a [`PendingDecode`].
//! Awaiting [`PendingDecode::finish`] checks the dimensions declared in the
//! header, then decodes the image on the blocking pool and checks again.
//! The decode is the only suspension point in the gate; it has no timeout,
//! and dropping the future abandons it.

use crate::config::ImageConfig;
use crate::error::{Rejection, Verdict};
use std::fmt::Debug;
use std::io::Cursor;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// An uploaded photo as received from the form.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Declared MIME type, e.g. `image/png`
    pub mime_type: String,
    /// Raw file contents
    pub bytes: Arc<[u8]>,
}

impl ImageUpload {
    pub fn new(mime_type: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Decoded pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Image decoding failure.
#[derive(Debug, Error)]
#[error("image decode failed: {0}")]
pub struct DecodeError(pub String);

/// Port for turning raw bytes into pixel dimensions.
///
/// Called on the blocking thread pool, so implementations may do CPU-heavy
/// work.
pub trait ImageDecoder: Send + Sync + Debug {
    /// Dimensions as declared by the file header, without decoding pixels.
    ///
    /// Checked before [`decode_dimensions`](Self::decode_dimensions) so an
    /// oversized image is refused before its pixel buffer is allocated.
    fn probe_dimensions(&self, bytes: &[u8]) -> Result<Dimensions, DecodeError> {
        self.decode_dimensions(bytes)
    }

    /// Dimensions after a full decode of the pixel data.
    fn decode_dimensions(&self, bytes: &[u8]) -> Result<Dimensions, DecodeError>;
}

/// Decoder backed by the `image` crate (JPEG, PNG, WebP).
///
/// Fully decodes the pixel data so truncated or corrupt files are caught,
/// not only broken headers.
#[derive(Debug, Clone, Copy, Default)]
pub struct PixelDecoder;

impl PixelDecoder {
    fn reader(bytes: &[u8]) -> Result<image::ImageReader<Cursor<&[u8]>>, DecodeError> {
        image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| DecodeError(e.to_string()))
    }
}

impl ImageDecoder for PixelDecoder {
    fn probe_dimensions(&self, bytes: &[u8]) -> Result<Dimensions, DecodeError> {
        let (width, height) = Self::reader(bytes)?
            .into_dimensions()
            .map_err(|e| DecodeError(e.to_string()))?;
        Ok(Dimensions { width, height })
    }

    fn decode_dimensions(&self, bytes: &[u8]) -> Result<Dimensions, DecodeError> {
        let decoded = Self::reader(bytes)?
            .decode()
            .map_err(|e| DecodeError(e.to_string()))?;
        Ok(Dimensions {
            width: decoded.width(),
            height: decoded.height(),
        })
    }
}

/// Validates uploaded photos.
#[derive(Debug, Clone)]
pub struct ImageValidator {
    config: ImageConfig,
    decoder: Arc<dyn ImageDecoder>,
}

/// An upload that passed the synchronous checks and still needs decoding.
#[derive(Debug)]
#[must_use = "the dimension check only runs when finish() is awaited"]
pub struct PendingDecode {
    bytes: Arc<[u8]>,
    config: ImageConfig,
    decoder: Arc<dyn ImageDecoder>,
}

impl ImageValidator {
    /// Create a validator using [`PixelDecoder`].
    pub fn new(config: ImageConfig) -> Self {
        Self::with_decoder(config, Arc::new(PixelDecoder))
    }

    pub fn with_decoder(config: ImageConfig, decoder: Arc<dyn ImageDecoder>) -> Self {
        Self { config, decoder }
    }

    /// Phase one: size and declared type.
    pub fn precheck(&self, upload: &ImageUpload) -> Result<PendingDecode, Rejection> {
        let size = upload.size();
        if size > self.config.max_bytes {
            debug!(size, max = self.config.max_bytes, "Image too large");
            return Err(Rejection::ImageTooLarge {
                max_bytes: self.config.max_bytes,
                actual_bytes: size,
            });
        }

        let mime = normalize_mime(&upload.mime_type);
        if !self
            .config
            .allowed_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(&mime))
        {
            debug!(mime_type = %upload.mime_type, "Image type not allowed");
            return Err(Rejection::ImageInvalidType {
                mime_type: upload.mime_type.clone(),
            });
        }

        Ok(PendingDecode {
            bytes: upload.bytes.clone(),
            config: self.config.clone(),
            decoder: self.decoder.clone(),
        })
    }

    /// Run both phases.
    pub async fn validate(&self, upload: &ImageUpload) -> Verdict {
        match self.precheck(upload) {
            Ok(pending) => pending.finish().await.map(|_| ()).into(),
            Err(rejection) => Verdict::Rejected(rejection),
        }
    }
}

impl PendingDecode {
    /// Phase two: check the declared dimensions, then decode and check again.
    pub async fn finish(self) -> Result<Dimensions, Rejection> {
        let decoder = self.decoder;
        let bytes = self.bytes;
        let config = self.config;
        let decoded = tokio::task::spawn_blocking(move || {
            let declared = decoder.probe_dimensions(&bytes)?;
            if let Err(rejection) = check_dimensions(&config, declared) {
                return Ok(Err(rejection));
            }
            decoder
                .decode_dimensions(&bytes)
                .map(|dims| check_dimensions(&config, dims).map(|()| dims))
        })
        .await;

        match decoded {
            Ok(Ok(checked)) => checked,
            Ok(Err(e)) => {
                debug!(error = %e, "Image decode failed");
                Err(Rejection::ImageDecodeFailed)
            }
            Err(e) => {
                warn!(error = %e, "Image decode task failed");
                Err(Rejection::ImageDecodeFailed)
            }
        }
    }
}

fn check_dimensions(config: &ImageConfig, dims: Dimensions) -> Result<(), Rejection> {
    let Dimensions { width, height } = dims;

    if width > config.max_width || height > config.max_height {
        debug!(width, height, "Image dimensions too large");
        return Err(Rejection::ImageDimensionsTooLarge {
            max_width: config.max_width,
            max_height: config.max_height,
            width,
            height,
        });
    }

    if width < config.min_side || height < config.min_side {
        debug!(width, height, "Image dimensions too small");
        return Err(Rejection::ImageDimensionsTooSmall {
            min_side: config.min_side,
            width,
            height,
        });
    }

    Ok(())
}

/// Extract the bare media type, ignoring parameters and whitespace.
fn normalize_mime(mime: &str) -> String {
    mime.split(';').next().unwrap_or(mime).trim().to_lowercase()
}

//! Translate service boundary.
//!
//! The service takes one PNG and answers with a transformed PNG. It caps the
//! resolution it works at ([`ImageSize`]), which is why inputs are packed onto
//! sheets of at most that size.
//!
//! # Components
//!
//! - [`Translator`]: async trait for anything that can translate an image
//! - [`HttpTranslator`]: JSON-over-HTTP implementation
//! - [`RateLimiter`]: serializing gate enforcing a minimum spacing between calls
//! - [`Throttled`]: wraps a translator so every call passes the gate

mod client;
mod limiter;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::ServiceError;

pub use client::{decode_response, HttpTranslator, DEFAULT_TIMEOUT};
pub use limiter::{RateLimiter, Throttled, DEFAULT_MIN_INTERVAL};

// =============================================================================
// Image Size
// =============================================================================

/// Resolution tier requested from the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageSize {
    OneK,
    #[default]
    TwoK,
    FourK,
}

impl ImageSize {
    /// Edge length in pixels of the largest square the tier covers.
    pub fn edge(self) -> u32 {
        match self {
            ImageSize::OneK => 1024,
            ImageSize::TwoK => 2048,
            ImageSize::FourK => 4096,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ImageSize::OneK => "1K",
            ImageSize::TwoK => "2K",
            ImageSize::FourK => "4K",
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "1K" => Ok(ImageSize::OneK),
            "2K" => Ok(ImageSize::TwoK),
            "4K" => Ok(ImageSize::FourK),
            other => Err(format!("unknown image size '{other}', expected 1K, 2K or 4K")),
        }
    }
}

// =============================================================================
// Aspect Ratio
// =============================================================================

/// Reduced `width:height` ratio hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AspectRatio {
    pub width: u32,
    pub height: u32,
}

impl AspectRatio {
    pub const SQUARE: AspectRatio = AspectRatio {
        width: 1,
        height: 1,
    };

    /// Ratio of a `width x height` image in lowest terms.
    ///
    /// Returns `None` if either side is zero.
    pub fn of(width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        let divisor = gcd(width, height);
        Some(Self {
            width: width / divisor,
            height: height / divisor,
        })
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

// =============================================================================
// Translator
// =============================================================================

/// Something that can translate one PNG image.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `image` (PNG bytes) and return the result as PNG bytes.
    async fn translate(
        &self,
        image: Bytes,
        size: ImageSize,
        aspect_ratio: Option<AspectRatio>,
    ) -> Result<Bytes, ServiceError>;
}

#[async_trait]
impl<T: Translator + ?Sized> Translator for Arc<T> {
    async fn translate(
        &self,
        image: Bytes,
        size: ImageSize,
        aspect_ratio: Option<AspectRatio>,
    ) -> Result<Bytes, ServiceError> {
        (**self).translate(image, size, aspect_ratio).await
    }
}

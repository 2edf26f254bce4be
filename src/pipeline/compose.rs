//! Canvas compositing: paint positioned image buffers onto one canvas.
//!
//! The compositor is the only stage whose failure aborts a run. It never
//! learns which slots failed upstream; it just paints whatever it is handed
//! onto a canvas whose size is fixed by [`CompositeSpec`], so a card with a
//! missing panel keeps its full two-panel width.
//!
//! Decoding and encoding are CPU-bound, so [`BlendCompositor`] runs them on
//! the blocking thread pool rather than on a Tokio worker.

use crate::config::{OutputFormat, RenderParams};
use crate::error::CardError;
use crate::pipeline::encode::encode_canvas;
use async_trait::async_trait;
use image::{imageops, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Upper bound on the RGBA canvas allocation, matching `image::Limits`'
/// default `max_alloc` of 512 MiB.
pub const MAX_CANVAS_BYTES: u64 = 512 * 1024 * 1024;

/// Bytes needed for a `width × height` RGBA canvas, or `None` on overflow.
pub fn canvas_bytes(width: u32, height: u32) -> Option<u64> {
    u64::from(width)
        .checked_mul(u64::from(height))
        .and_then(|px| px.checked_mul(4))
}

/// One fetched image and the top-left corner it is painted at.
#[derive(Clone, PartialEq, Eq)]
pub struct PlacedImage {
    pub buffer: Vec<u8>,
    pub x: u32,
    pub y: u32,
}

impl std::fmt::Debug for PlacedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlacedImage")
            .field("buffer", &format_args!("<{} bytes>", self.buffer.len()))
            .field("x", &self.x)
            .field("y", &self.y)
            .finish()
    }
}

/// Target canvas: dimensions and output encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeSpec {
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
}

impl CompositeSpec {
    /// Two panels side by side: twice the panel width, the panel height.
    pub fn for_params(params: &RenderParams, format: OutputFormat) -> Self {
        Self {
            width: params.canvas_width(),
            height: params.height,
            format,
        }
    }
}

/// Paints [`PlacedImage`]s onto a canvas and encodes the result.
#[async_trait]
pub trait Compositor: Send + Sync {
    /// Compose `images` in order (later images are painted over earlier ones).
    async fn compose(
        &self,
        images: Vec<PlacedImage>,
        spec: &CompositeSpec,
    ) -> Result<Vec<u8>, CardError>;
}

/// [`Compositor`] built on the `image` crate.
#[derive(Debug, Clone)]
pub struct BlendCompositor {
    /// Fill colour for canvas areas no image covers. Default: opaque white.
    pub background: Rgba<u8>,
}

impl Default for BlendCompositor {
    fn default() -> Self {
        Self {
            background: Rgba([255, 255, 255, 255]),
        }
    }
}

#[async_trait]
impl Compositor for BlendCompositor {
    async fn compose(
        &self,
        images: Vec<PlacedImage>,
        spec: &CompositeSpec,
    ) -> Result<Vec<u8>, CardError> {
        let spec = *spec;
        let background = self.background;
        tokio::task::spawn_blocking(move || blend(&images, &spec, background))
            .await
            .map_err(|e| CardError::Internal(format!("Compose task panicked: {}", e)))?
    }
}

/// Blocking implementation of compositing.
///
/// An empty `images` slice yields the bare background canvas.
pub fn blend(
    images: &[PlacedImage],
    spec: &CompositeSpec,
    background: Rgba<u8>,
) -> Result<Vec<u8>, CardError> {
    if spec.width == 0 || spec.height == 0 {
        return Err(CardError::EmptyCanvas {
            width: spec.width,
            height: spec.height,
        });
    }

    match canvas_bytes(spec.width, spec.height) {
        Some(bytes) if bytes <= MAX_CANVAS_BYTES => {}
        _ => {
            return Err(CardError::CanvasTooLarge {
                width: spec.width,
                height: spec.height,
                limit: MAX_CANVAS_BYTES,
            })
        }
    }

    let mut canvas = RgbaImage::from_pixel(spec.width, spec.height, background);

    for placed in images {
        if placed.x >= spec.width || placed.y >= spec.height {
            return Err(CardError::PlacementOutOfBounds {
                x: placed.x,
                y: placed.y,
                width: spec.width,
                height: spec.height,
            });
        }

        let decoded = image::load_from_memory(&placed.buffer).map_err(|e| CardError::DecodeFailed {
            x: placed.x,
            y: placed.y,
            detail: e.to_string(),
        })?;
        debug!(
            "Painting {}x{} image at ({}, {})",
            decoded.width(),
            decoded.height(),
            placed.x,
            placed.y
        );

        // Parts extending past the canvas edge are clipped.
        imageops::overlay(&mut canvas, &decoded.to_rgba8(), placed.x as i64, placed.y as i64);
    }

    encode_canvas(canvas, spec.format).map_err(|e| CardError::EncodeFailed {
        format: spec.format.to_string(),
        detail: e.to_string(),
    })
}

//! Image graphic for embedding raster images.

use super::{Frame, GraphicId, GraphicKind, GraphicStyle, GraphicTrait};
use base64::{Engine, engine::general_purpose::STANDARD};
use kurbo::{BezPath, Point, Shape as KurboShape};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Image format for embedded image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
    Gif,
}

impl ImageFormat {
    /// Get MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Gif => "image/gif",
        }
    }

    /// Detect format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 4 {
            return None;
        }

        // PNG: 89 50 4E 47
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(ImageFormat::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }

        // GIF: "GIF8"
        if data.starts_with(b"GIF8") {
            return Some(ImageFormat::Gif);
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }

        None
    }

    /// Encode raw bytes as a `data:` URL usable as an image source.
    pub fn data_url(&self, data: &[u8]) -> String {
        format!("data:{};base64,{}", self.mime_type(), STANDARD.encode(data))
    }
}

/// Decode the payload of a base64 `data:` URL.
pub fn decode_data_url(source: &str) -> Option<Vec<u8>> {
    let (_, payload) = source.strip_prefix("data:")?.split_once(";base64,")?;
    STANDARD.decode(payload).ok()
}

/// An image, referenced by URL or embedded as a data URL.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub(crate) id: GraphicId,
    pub origin: Point,
    /// Display width.
    pub width: f64,
    /// Display height.
    pub height: f64,
    /// Rotation in degrees (around center).
    pub rotation: f64,
    pub source: String,
    /// Style properties (stroke used for optional border).
    pub style: GraphicStyle,
}

impl Image {
    pub fn new(origin: Point, width: f64, height: f64, source: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            origin,
            width,
            height,
            rotation: 0.0,
            source: source.into(),
            style: GraphicStyle::default(),
        }
    }

    pub(crate) fn reconstruct(
        id: GraphicId,
        origin: Point,
        width: f64,
        height: f64,
        rotation: f64,
        source: String,
        style: GraphicStyle,
    ) -> Self {
        Self {
            id,
            origin,
            width,
            height,
            rotation,
            source,
            style,
        }
    }

    /// Embedded bytes, if the source is a base64 data URL.
    pub fn data(&self) -> Option<Vec<u8>> {
        decode_data_url(&self.source)
    }
}

/// Scale `(width, height)` to fit within max dimensions, preserving aspect ratio.
/// Sizes that already fit are returned unchanged.
pub fn fit_within(width: f64, height: f64, max_width: f64, max_height: f64) -> (f64, f64) {
    if width <= 0.0 || height <= 0.0 || (width <= max_width && height <= max_height) {
        return (width, height);
    }
    let aspect = width / height;
    let target_aspect = max_width / max_height;

    if aspect > target_aspect {
        // Wider than target - fit to width
        (max_width, max_width / aspect)
    } else {
        // Taller than target - fit to height
        (max_height * aspect, max_height)
    }
}

impl GraphicTrait for Image {
    fn id(&self) -> GraphicId {
        self.id
    }

    fn kind(&self) -> GraphicKind {
        GraphicKind::Image
    }

    fn frame(&self) -> Frame {
        Frame::new(self.origin, self.width, self.height, self.rotation)
    }

    fn set_frame(&mut self, frame: Frame) {
        self.origin = frame.origin;
        self.width = frame.width;
        self.height = frame.height;
        self.rotation = frame.rotation;
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.frame().contains(point, tolerance)
    }

    fn to_path(&self) -> BezPath {
        // Bounding box as path (for selection rendering)
        let frame = self.frame();
        let mut path = frame.rect().to_path(0.1);
        path.apply_affine(frame.transform());
        path
    }

    fn style(&self) -> &GraphicStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut GraphicStyle {
        &mut self.style
    }
}

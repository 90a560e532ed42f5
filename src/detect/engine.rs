use anyhow::Result;

use crate::video::{FrameBitmap, RasterSurface, VideoSource};

use super::error::DecodeError;
use super::symbology::Symbology;

/// One structured detection reported by the native backend.
#[derive(Clone, Debug, Default)]
pub struct Detection {
    pub raw_value: String,
    pub display_value: String,
    pub symbology: Option<Symbology>,
}

impl Detection {
    /// Candidate result text: the raw value, falling back to the display
    /// value; `None` when both are empty.
    pub fn value(&self) -> Option<&str> {
        if !self.raw_value.is_empty() {
            Some(&self.raw_value)
        } else if !self.display_value.is_empty() {
            Some(&self.display_value)
        } else {
            None
        }
    }
}

/// Frame handed to the native detector, in acquisition priority order.
pub enum FramePayload<'a> {
    /// The live frame handle itself, no copy.
    Live(&'a dyn VideoSource),
    /// A one-shot snapshot bitmap.
    Bitmap(&'a FrameBitmap),
    /// The persistent raster surface.
    Surface(&'a RasterSurface),
}

impl FramePayload<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            FramePayload::Live(_) => "live",
            FramePayload::Bitmap(_) => "bitmap",
            FramePayload::Surface(_) => "surface",
        }
    }
}

/// Platform-native structured barcode detector.
pub trait NativeDetector {
    fn detect(&mut self, payload: FramePayload<'_>) -> Result<Vec<Detection>, DecodeError>;
}

/// Constructor seam for the native backend.
///
/// Probed once per session by the engine selector; when `available` is
/// false or `create` fails, native is permanently out for the session.
pub trait NativeProvider {
    /// Whether the environment exposes the native capability at all.
    fn available(&self) -> bool;

    /// Formats the native backend reports supporting. Queried at most once
    /// per session.
    fn supported_symbologies(&self) -> Result<Vec<Symbology>>;

    /// Construct a detector restricted to `symbologies`.
    fn create(&self, symbologies: &[Symbology]) -> Result<Box<dyn NativeDetector>>;
}

/// Configuration handed to the fallback decoder on construction.
#[derive(Clone, Debug)]
pub struct FallbackConfig {
    /// Cadence between decode attempts, same value the scan loop throttles
    /// on.
    pub attempt_interval_ms: u64,
    /// Allow-list in the fallback library's own naming scheme.
    pub formats: Vec<String>,
    /// Enable the library's try-harder heuristics where supported.
    pub try_harder: bool,
}

/// Software fallback decoder, single-frame interface.
pub trait FallbackDecoder {
    fn decode(&mut self, surface: &RasterSurface) -> Result<String, DecodeError>;
}

/// Constructor seam for the fallback decoder. Resolved lazily, at most once
/// per session.
pub trait FallbackProvider {
    fn create(&self, config: FallbackConfig) -> Result<Box<dyn FallbackDecoder>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detection_value_prefers_raw_over_display() {
        let det = Detection {
            raw_value: "raw".into(),
            display_value: "display".into(),
            symbology: None,
        };
        assert_eq!(det.value(), Some("raw"));

        let det = Detection {
            raw_value: String::new(),
            display_value: "display".into(),
            symbology: None,
        };
        assert_eq!(det.value(), Some("display"));

        assert_eq!(Detection::default().value(), None);
    }
}

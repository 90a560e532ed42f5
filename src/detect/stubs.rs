//! Stub backends for tests and the demo bin.
//!
//! `SyntheticVideoSource` embeds a shown code into row 0 of its frames;
//! the stubs here read it back, so a full session can run end-to-end with
//! no camera and no decoder library.

use std::sync::{Arc, Mutex};

use anyhow::Result;

use crate::video::{embedded_code, RasterSurface};

use super::engine::{
    Detection, FallbackConfig, FallbackDecoder, FallbackProvider, FramePayload, NativeDetector,
    NativeProvider,
};
use super::error::DecodeError;
use super::symbology::{Symbology, DECLARED_SYMBOLOGIES};

/// Environment without any native detection capability. Forces the
/// selector straight onto the fallback path.
#[derive(Clone, Copy, Debug, Default)]
pub struct AbsentNativeProvider;

impl NativeProvider for AbsentNativeProvider {
    fn available(&self) -> bool {
        false
    }

    fn supported_symbologies(&self) -> Result<Vec<Symbology>> {
        Ok(Vec::new())
    }

    fn create(&self, _symbologies: &[Symbology]) -> Result<Box<dyn NativeDetector>> {
        Err(anyhow::anyhow!("native detection not present"))
    }
}

/// Native detector that reads codes embedded by `SyntheticVideoSource`.
///
/// The live frame handle carries no pixels, so that strategy reports
/// unsupported and the acquisition chain latches it on the way to the
/// bitmap and surface strategies.
pub struct EmbeddedCodeNativeDetector;

impl NativeDetector for EmbeddedCodeNativeDetector {
    fn detect(&mut self, payload: FramePayload<'_>) -> Result<Vec<Detection>, DecodeError> {
        let pixels = match payload {
            FramePayload::Live(_) => {
                return Err(DecodeError::Unsupported("live frame handle".into()))
            }
            FramePayload::Bitmap(bitmap) => bitmap.pixels(),
            FramePayload::Surface(surface) => surface.pixels(),
        };
        Ok(match embedded_code(pixels) {
            Some(text) => vec![Detection {
                raw_value: text,
                display_value: String::new(),
                symbology: None,
            }],
            None => Vec::new(),
        })
    }
}

/// Provider for `EmbeddedCodeNativeDetector`.
#[derive(Clone, Debug)]
pub struct EmbeddedCodeNativeProvider {
    symbologies: Vec<Symbology>,
}

impl EmbeddedCodeNativeProvider {
    pub fn new() -> Self {
        Self {
            symbologies: DECLARED_SYMBOLOGIES.to_vec(),
        }
    }

    pub fn with_symbologies(symbologies: Vec<Symbology>) -> Self {
        Self { symbologies }
    }
}

impl NativeProvider for EmbeddedCodeNativeProvider {
    fn available(&self) -> bool {
        true
    }

    fn supported_symbologies(&self) -> Result<Vec<Symbology>> {
        Ok(self.symbologies.clone())
    }

    fn create(&self, _symbologies: &[Symbology]) -> Result<Box<dyn NativeDetector>> {
        Ok(Box::new(EmbeddedCodeNativeDetector))
    }
}

/// Fallback decoder over embedded codes; a frame with nothing embedded is
/// the expected not-found condition.
pub struct EmbeddedCodeFallbackDecoder;

impl FallbackDecoder for EmbeddedCodeFallbackDecoder {
    fn decode(&mut self, surface: &RasterSurface) -> Result<String, DecodeError> {
        embedded_code(surface.pixels()).ok_or(DecodeError::NotFound)
    }
}

/// Provider for `EmbeddedCodeFallbackDecoder`; records the config it was
/// resolved with so callers can inspect the negotiated format list.
#[derive(Clone, Debug, Default)]
pub struct EmbeddedCodeFallbackProvider {
    last_config: Arc<Mutex<Option<FallbackConfig>>>,
}

impl EmbeddedCodeFallbackProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// The config from the most recent `create` call, if any.
    pub fn last_config(&self) -> Option<FallbackConfig> {
        self.last_config.lock().ok().and_then(|cfg| cfg.clone())
    }
}

impl FallbackProvider for EmbeddedCodeFallbackProvider {
    fn create(&self, config: FallbackConfig) -> Result<Box<dyn FallbackDecoder>> {
        if let Ok(mut last) = self.last_config.lock() {
            *last = Some(config);
        }
        Ok(Box::new(EmbeddedCodeFallbackDecoder))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::{SyntheticVideoSource, VideoSource};

    #[test]
    fn embedded_fallback_roundtrip() {
        let mut video = SyntheticVideoSource::new(64, 4);
        video.show_code(Some("750123"));
        let mut surface = RasterSurface::new();
        video.draw_onto(&mut surface).unwrap();

        let mut decoder = EmbeddedCodeFallbackDecoder;
        assert_eq!(decoder.decode(&surface).unwrap(), "750123");
    }

    #[test]
    fn native_stub_rejects_live_payload() {
        let video = SyntheticVideoSource::new(64, 4);
        let mut detector = EmbeddedCodeNativeDetector;
        let err = detector
            .detect(FramePayload::Live(&video))
            .expect_err("live payload must be unsupported");
        assert!(!err.is_expected());
    }
}

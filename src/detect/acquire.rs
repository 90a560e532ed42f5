use crate::video::{source_ready, RasterSurface, VideoSource};

use super::capability::Capability;
use super::engine::{Detection, FramePayload, NativeDetector};

/// Ordered frame-acquisition chain for the native backend.
///
/// Three ways to hand a frame over, tried cheapest first:
///   1. the live frame handle itself,
///   2. a snapshot bitmap (released whatever happens),
///   3. the persistent raster surface, always last, never disabled.
///
/// A strategy that raises is latched `Unsupported` for the rest of the
/// session and skipped from then on. Errors are swallowed and logged here;
/// nothing propagates out of an acquisition pass.
#[derive(Default)]
pub struct FrameAcquisition {
    live: Capability,
    bitmap: Capability,
}

impl FrameAcquisition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_capability(&self) -> Capability {
        self.live
    }

    pub fn bitmap_capability(&self) -> Capability {
        self.bitmap
    }

    /// Run the chain until one strategy yields a non-empty value.
    pub fn detect(
        &mut self,
        detector: &mut dyn NativeDetector,
        video: &mut dyn VideoSource,
        surface: &mut RasterSurface,
    ) -> Option<String> {
        if !source_ready(video) {
            return None;
        }

        if self.live.usable() {
            match detector.detect(FramePayload::Live(&*video)) {
                Ok(detections) => {
                    self.live.mark_supported();
                    if let Some(value) = primary_value(&detections) {
                        return Some(value);
                    }
                }
                Err(err) => {
                    self.live.mark_unsupported();
                    log::debug!("live-frame detection unsupported: {err}");
                }
            }
        }

        if video.supports_bitmap_capture() && self.bitmap.usable() {
            match video.capture_bitmap() {
                Ok(bitmap) => {
                    // Bitmap drops (and releases) on every path out of this
                    // block.
                    match detector.detect(FramePayload::Bitmap(&bitmap)) {
                        Ok(detections) => {
                            self.bitmap.mark_supported();
                            if let Some(value) = primary_value(&detections) {
                                return Some(value);
                            }
                        }
                        Err(err) => {
                            self.bitmap.mark_unsupported();
                            log::warn!("bitmap detection failed: {err}");
                        }
                    }
                }
                Err(err) => {
                    self.bitmap.mark_unsupported();
                    log::warn!("bitmap capture failed: {err:#}");
                }
            }
        }

        surface.ensure_size(video.width(), video.height());
        if let Err(err) = video.draw_onto(surface) {
            log::warn!("rasterizing frame failed: {err:#}");
            return None;
        }
        match detector.detect(FramePayload::Surface(surface)) {
            Ok(detections) => primary_value(&detections),
            Err(err) => {
                log::warn!("surface detection failed: {err}");
                None
            }
        }
    }

    /// Forget all latches; the next session re-probes every strategy.
    pub fn reset(&mut self) {
        self.live = Capability::Unknown;
        self.bitmap = Capability::Unknown;
    }
}

/// Only the first reported detection is considered; an empty value falls
/// through to the next strategy.
fn primary_value(detections: &[Detection]) -> Option<String> {
    detections
        .first()
        .and_then(|d| d.value())
        .map(|v| v.to_string())
}

use crate::status::StatusSink;
use crate::video::{source_ready, RasterSurface, VideoSource};

use super::acquire::FrameAcquisition;
use super::engine::{FallbackProvider, NativeProvider};
use super::error::DecodeError;
use super::selector::{EngineSelector, EngineState};

/// A successfully decoded code, consumed immediately by the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetectionResult {
    pub text: String,
}

/// Orchestrates engine selection, frame acquisition and result
/// normalization into one `attempt_detect` operation, shared by the scan
/// loop and the manual one-shot trigger.
///
/// Owns every piece of per-session engine state: the selector's backend
/// caches, the acquisition latches and the shared raster surface. `reset`
/// returns all of it to the fresh-session state.
pub struct DetectionCoordinator {
    selector: EngineSelector,
    acquisition: FrameAcquisition,
    surface: RasterSurface,
    status: Box<dyn StatusSink>,
}

impl DetectionCoordinator {
    pub fn new(
        native_provider: Box<dyn NativeProvider>,
        fallback_provider: Box<dyn FallbackProvider>,
        attempt_interval_ms: u64,
        status: Box<dyn StatusSink>,
    ) -> Self {
        Self {
            selector: EngineSelector::new(native_provider, fallback_provider, attempt_interval_ms),
            acquisition: FrameAcquisition::new(),
            surface: RasterSurface::new(),
            status,
        }
    }

    pub fn engine_state(&self) -> EngineState {
        self.selector.state()
    }

    pub fn acquisition(&self) -> &FrameAcquisition {
        &self.acquisition
    }

    /// Run one detection attempt against the current frame.
    ///
    /// Recoverable conditions (no engine, video not ready, nothing in the
    /// frame, expected decode errors) come back as `Ok(None)`. A real
    /// decoder failure is returned only when `manual` is set; in loop mode
    /// it is logged and swallowed so the loop lives on. Blank decoded text
    /// is never a detection.
    pub fn attempt_detect(
        &mut self,
        video: &mut dyn VideoSource,
        manual: bool,
    ) -> Result<Option<DetectionResult>, DecodeError> {
        let Self {
            selector,
            acquisition,
            surface,
            status,
        } = self;

        match selector.ensure(status.as_mut()) {
            EngineState::NativeActive => {
                let Some(detector) = selector.native_mut() else {
                    return Ok(None);
                };
                let value = acquisition.detect(detector, video, surface);
                Ok(value
                    .filter(|text| !text.trim().is_empty())
                    .map(|text| DetectionResult { text }))
            }
            EngineState::FallbackActive => {
                if !source_ready(video) {
                    return Ok(None);
                }
                surface.ensure_size(video.width(), video.height());
                if let Err(err) = video.draw_onto(surface) {
                    log::warn!("rasterizing frame for fallback decode failed: {err:#}");
                    return Ok(None);
                }
                let Some(decoder) = selector.fallback_mut() else {
                    return Ok(None);
                };
                match decoder.decode(surface) {
                    Ok(text) if !text.trim().is_empty() => Ok(Some(DetectionResult { text })),
                    Ok(_) => Ok(None),
                    Err(err) if err.is_expected() => Ok(None),
                    Err(err) => {
                        log::warn!("fallback decode failed: {err}");
                        if manual {
                            Err(err)
                        } else {
                            Ok(None)
                        }
                    }
                }
            }
            EngineState::Unavailable | EngineState::Uninitialized => Ok(None),
        }
    }

    /// Discard all engine and capability state; the next attempt re-probes
    /// from scratch.
    pub fn reset(&mut self) {
        self.selector.reset();
        self.acquisition.reset();
        self.surface = RasterSurface::new();
    }
}

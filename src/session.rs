//! Scan session lifecycle.
//!
//! A `ScanSession` owns one camera's worth of scanning state: the
//! coordinator (engine + capability caches), the loop scheduler, the dedup
//! memo and, while scanning, the video source itself. Stopping a session
//! stops scheduling, resets all engine state so the next start re-probes
//! (another camera may be behind it), and drops the video source.

use crate::clock::Clock;
use crate::config::StationConfig;
use crate::detect::{
    DecodeError, DetectionCoordinator, DetectionResult, EngineState, FallbackProvider,
    NativeProvider, ScanDebouncer, ScanLoopScheduler, Tick,
};
use crate::status::StatusSink;
use crate::video::VideoSource;

pub struct ScanSession {
    coordinator: DetectionCoordinator,
    scheduler: ScanLoopScheduler,
    debouncer: ScanDebouncer,
    video: Option<Box<dyn VideoSource>>,
}

impl ScanSession {
    pub fn new(
        config: &StationConfig,
        native_provider: Box<dyn NativeProvider>,
        fallback_provider: Box<dyn FallbackProvider>,
        status: Box<dyn StatusSink>,
    ) -> Self {
        Self {
            coordinator: DetectionCoordinator::new(
                native_provider,
                fallback_provider,
                config.timing.detect_interval_ms,
                status,
            ),
            scheduler: ScanLoopScheduler::new(config.scan_timing()),
            debouncer: ScanDebouncer::new(config.timing.dedup_window_ms),
            video: None,
        }
    }

    pub fn is_scanning(&self) -> bool {
        self.scheduler.is_scanning()
    }

    pub fn engine_state(&self) -> EngineState {
        self.coordinator.engine_state()
    }

    /// Begin scanning `video`. A session that is already scanning keeps its
    /// current source.
    pub fn start(&mut self, video: Box<dyn VideoSource>) {
        if self.scheduler.is_scanning() {
            return;
        }
        self.video = Some(video);
        self.scheduler.start();
        log::info!("scan session started");
    }

    /// Stop scanning: no more ticks, engine and capability state reset,
    /// video source released. The dedup memo is not cleared.
    pub fn stop(&mut self) {
        self.scheduler.stop();
        self.coordinator.reset();
        self.video = None;
        log::info!("scan session stopped");
    }

    /// Drive one display-frame tick. Accepted (deduplicated) codes reach
    /// `on_accept` before the tick returns.
    pub fn tick(&mut self, now_ms: u64, on_accept: &mut dyn FnMut(&str)) -> Tick {
        let Some(video) = self.video.as_deref_mut() else {
            return Tick::Stop;
        };
        let debouncer = &mut self.debouncer;
        self.scheduler.tick(&mut self.coordinator, video, now_ms, &mut |result| {
            if let Some(code) = debouncer.accept(&result.text, now_ms) {
                on_accept(&code);
            }
        })
    }

    /// One-shot detection outside the loop. The raw result comes back for
    /// the caller's "found / nothing / error" display; the accepted code,
    /// if it survives dedup, reaches `on_accept` like any loop detection.
    pub fn manual_scan(
        &mut self,
        clock: &dyn Clock,
        on_accept: &mut dyn FnMut(&str),
    ) -> Result<Option<DetectionResult>, DecodeError> {
        let Some(video) = self.video.as_deref_mut() else {
            return Ok(None);
        };
        let outcome = self
            .scheduler
            .manual_scan(&mut self.coordinator, video, clock)?;
        if let Some(result) = &outcome {
            if let Some(code) = self.debouncer.accept(&result.text, clock.now_ms()) {
                on_accept(&code);
            }
        }
        Ok(outcome)
    }
}

//! End-to-end session behavior against stub backends: engine fallback,
//! capability latching, loop throttling, manual-mode error propagation and
//! the one-per-session unavailable notice.

use std::cell::{Cell, RefCell};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::anyhow;

use scanstation::detect::stubs::{
    AbsentNativeProvider, EmbeddedCodeFallbackProvider, EmbeddedCodeNativeProvider,
};
use scanstation::detect::Capability;
use scanstation::{
    Clock, DecodeError, DetectionCoordinator, EngineStatus, FallbackConfig, FallbackDecoder,
    FallbackProvider, NativeDetector, NativeProvider, RasterSurface, RecordingStatusSink,
    ScanLoopScheduler, ScanSession, StationConfig, Symbology, SyntheticVideoSource, Tick,
};

struct ManualClock {
    now_ms: Cell<u64>,
    slept: RefCell<Vec<u64>>,
}

impl ManualClock {
    fn new() -> Self {
        Self {
            now_ms: Cell::new(0),
            slept: RefCell::new(Vec::new()),
        }
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }

    fn sleep_ms(&self, ms: u64) {
        self.slept.borrow_mut().push(ms);
        self.now_ms.set(self.now_ms.get() + ms);
    }
}

/// Native provider that counts construction attempts.
struct CountingNativeProvider {
    available: bool,
    creations: Arc<AtomicUsize>,
}

impl NativeProvider for CountingNativeProvider {
    fn available(&self) -> bool {
        self.available
    }

    fn supported_symbologies(&self) -> anyhow::Result<Vec<Symbology>> {
        Ok(Vec::new())
    }

    fn create(&self, _symbologies: &[Symbology]) -> anyhow::Result<Box<dyn NativeDetector>> {
        self.creations.fetch_add(1, Ordering::SeqCst);
        Err(anyhow!("should not be constructed in these tests"))
    }
}

/// Fallback provider whose decoder always raises a real (unexpected)
/// error.
struct BrokenFallbackProvider;

struct BrokenDecoder;

impl FallbackDecoder for BrokenDecoder {
    fn decode(&mut self, _surface: &RasterSurface) -> Result<String, DecodeError> {
        Err(DecodeError::Backend("decoder wedged".into()))
    }
}

impl FallbackProvider for BrokenFallbackProvider {
    fn create(&self, _config: FallbackConfig) -> anyhow::Result<Box<dyn FallbackDecoder>> {
        Ok(Box::new(BrokenDecoder))
    }
}

/// Fallback provider that fails to construct, leaving no engine at all.
struct UnloadableFallbackProvider;

impl FallbackProvider for UnloadableFallbackProvider {
    fn create(&self, _config: FallbackConfig) -> anyhow::Result<Box<dyn FallbackDecoder>> {
        Err(anyhow!("library failed to load"))
    }
}

fn shown_video(code: &str) -> Box<SyntheticVideoSource> {
    let mut video = SyntheticVideoSource::new(64, 8);
    video.show_code(Some(code));
    Box::new(video)
}

#[test]
fn native_absent_uses_fallback_without_constructing_native() {
    let creations = Arc::new(AtomicUsize::new(0));
    let fallback = EmbeddedCodeFallbackProvider::new();
    let config = StationConfig::default();
    let mut session = ScanSession::new(
        &config,
        Box::new(CountingNativeProvider {
            available: false,
            creations: creations.clone(),
        }),
        Box::new(fallback.clone()),
        Box::new(RecordingStatusSink::new()),
    );

    session.start(shown_video("750"));
    let mut accepted = Vec::new();
    session.tick(0, &mut |code| accepted.push(code.to_string()));

    assert_eq!(accepted, vec!["750"]);
    assert_eq!(creations.load(Ordering::SeqCst), 0);

    // The decoder was configured with the translated declared list and the
    // loop cadence.
    let cfg = fallback.last_config().expect("fallback constructed");
    assert_eq!(cfg.attempt_interval_ms, 160);
    assert!(cfg.try_harder);
    assert_eq!(cfg.formats.len(), 13);
    assert!(cfg.formats.contains(&"QR_CODE".to_string()));
}

#[test]
fn loop_throttles_attempts_to_the_interval() {
    let config = StationConfig::default();
    let mut coordinator = DetectionCoordinator::new(
        Box::new(AbsentNativeProvider),
        Box::new(EmbeddedCodeFallbackProvider::new()),
        config.timing.detect_interval_ms,
        Box::new(RecordingStatusSink::new()),
    );
    let mut scheduler = ScanLoopScheduler::new(config.scan_timing());
    let mut video = SyntheticVideoSource::new(64, 8);
    video.show_code(Some("750"));

    scheduler.start();
    let mut detections = 0usize;
    // Display-frame ticks at ~60 Hz for half a second.
    let mut now_ms = 0;
    while now_ms < 500 {
        let tick = scheduler.tick(&mut coordinator, &mut video, now_ms, &mut |_| {
            detections += 1;
        });
        assert_eq!(tick, Tick::Continue);
        now_ms += 16;
    }
    // Attempts land at 0, 160, 320 and 480 ms only.
    assert_eq!(detections, 4);
}

#[test]
fn not_ready_video_reschedules_without_attempting() {
    let config = StationConfig::default();
    let mut coordinator = DetectionCoordinator::new(
        Box::new(AbsentNativeProvider),
        Box::new(EmbeddedCodeFallbackProvider::new()),
        config.timing.detect_interval_ms,
        Box::new(RecordingStatusSink::new()),
    );
    let mut scheduler = ScanLoopScheduler::new(config.scan_timing());
    let mut video = SyntheticVideoSource::new(64, 8);
    video.show_code(Some("750"));
    video.set_ready(false);

    scheduler.start();
    let mut detections = 0usize;
    for i in 0..20 {
        let tick = scheduler.tick(&mut coordinator, &mut video, i * 16, &mut |_| {
            detections += 1;
        });
        assert_eq!(tick, Tick::Continue);
    }
    assert_eq!(detections, 0);

    // Stop ends rescheduling.
    scheduler.stop();
    assert_eq!(
        scheduler.tick(&mut coordinator, &mut video, 1000, &mut |_| {}),
        Tick::Stop
    );
}

#[test]
fn dedup_window_filters_repeats_through_the_session() {
    let config = StationConfig::default();
    let mut session = ScanSession::new(
        &config,
        Box::new(AbsentNativeProvider),
        Box::new(EmbeddedCodeFallbackProvider::new()),
        Box::new(RecordingStatusSink::new()),
    );
    session.start(shown_video("750"));

    let mut accepted = Vec::new();
    let mut now_ms = 0;
    while now_ms <= 3200 {
        session.tick(now_ms, &mut |code| accepted.push((now_ms, code.to_string())));
        now_ms += 16;
    }
    // Accepted at t=0, deduped until the window elapses, accepted again on
    // the first attempt at or after 3000 ms.
    assert_eq!(accepted.len(), 2);
    assert_eq!(accepted[0].0, 0);
    assert!(accepted[1].0 >= 3000);
}

#[test]
fn native_live_strategy_latches_and_detection_still_works() {
    let config = StationConfig::default();
    let mut coordinator = DetectionCoordinator::new(
        Box::new(EmbeddedCodeNativeProvider::new()),
        Box::new(EmbeddedCodeFallbackProvider::new()),
        config.timing.detect_interval_ms,
        Box::new(RecordingStatusSink::new()),
    );
    let mut video = SyntheticVideoSource::new(64, 8).with_bitmap_capture(true);
    video.show_code(Some("ABC"));

    // The stub native detector rejects the live handle; acquisition
    // latches it and lands on the bitmap snapshot.
    let result = coordinator.attempt_detect(&mut video, false).unwrap();
    assert_eq!(result.unwrap().text, "ABC");
    assert_eq!(
        coordinator.acquisition().live_capability(),
        Capability::Unsupported
    );

    let result = coordinator.attempt_detect(&mut video, false).unwrap();
    assert_eq!(result.unwrap().text, "ABC");

    // Reset clears the latch for the next session.
    coordinator.reset();
    assert_eq!(
        coordinator.acquisition().live_capability(),
        Capability::Unknown
    );
}

#[test]
fn manual_mode_propagates_real_errors_loop_mode_swallows_them() {
    let config = StationConfig::default();
    let mut session = ScanSession::new(
        &config,
        Box::new(AbsentNativeProvider),
        Box::new(BrokenFallbackProvider),
        Box::new(RecordingStatusSink::new()),
    );
    session.start(shown_video("750"));

    // Loop mode: the broken decoder never kills the loop.
    assert_eq!(session.tick(0, &mut |_| {}), Tick::Continue);
    assert_eq!(session.tick(160, &mut |_| {}), Tick::Continue);

    // Manual mode: the same failure reaches the caller.
    let clock = ManualClock::new();
    let err = session
        .manual_scan(&clock, &mut |_| {})
        .expect_err("manual attempt must surface the decoder failure");
    assert!(!err.is_expected());
}

#[test]
fn manual_scan_waits_for_readiness_once() {
    let config = StationConfig::default();
    let mut session = ScanSession::new(
        &config,
        Box::new(AbsentNativeProvider),
        Box::new(EmbeddedCodeFallbackProvider::new()),
        Box::new(RecordingStatusSink::new()),
    );
    let mut video = SyntheticVideoSource::new(64, 8);
    video.show_code(Some("750"));
    video.ready_after(1);
    session.start(Box::new(video));

    let clock = ManualClock::new();
    let result = session.manual_scan(&clock, &mut |_| {}).unwrap();
    assert_eq!(result.unwrap().text, "750");
    assert_eq!(*clock.slept.borrow(), vec![120]);
}

#[test]
fn manual_scan_is_a_noop_when_not_scanning() {
    let config = StationConfig::default();
    let mut session = ScanSession::new(
        &config,
        Box::new(AbsentNativeProvider),
        Box::new(EmbeddedCodeFallbackProvider::new()),
        Box::new(RecordingStatusSink::new()),
    );
    let clock = ManualClock::new();
    assert!(session.manual_scan(&clock, &mut |_| {}).unwrap().is_none());
    assert!(clock.slept.borrow().is_empty());
}

#[test]
fn unavailable_notice_fires_once_per_session() {
    let sink = RecordingStatusSink::new();
    let config = StationConfig::default();
    let mut session = ScanSession::new(
        &config,
        Box::new(AbsentNativeProvider),
        Box::new(UnloadableFallbackProvider),
        Box::new(sink.clone()),
    );
    session.start(shown_video("750"));

    for i in 0..5 {
        session.tick(i * 160, &mut |_| panic!("nothing should be detected"));
    }
    assert_eq!(sink.snapshot(), vec![EngineStatus::Unavailable]);

    // A fresh session re-probes and notifies again.
    session.stop();
    session.start(shown_video("750"));
    session.tick(10_000, &mut |_| {});
    assert_eq!(
        sink.snapshot(),
        vec![EngineStatus::Unavailable, EngineStatus::Unavailable]
    );
}

#[test]
fn dedup_memo_survives_session_restart() {
    let config = StationConfig::default();
    let mut session = ScanSession::new(
        &config,
        Box::new(AbsentNativeProvider),
        Box::new(EmbeddedCodeFallbackProvider::new()),
        Box::new(RecordingStatusSink::new()),
    );
    session.start(shown_video("750"));
    let mut accepted = Vec::new();
    session.tick(0, &mut |code| accepted.push(code.to_string()));
    assert_eq!(accepted, vec!["750"]);

    // Restart within the window: the same code stays debounced.
    session.stop();
    session.start(shown_video("750"));
    session.tick(1000, &mut |code| accepted.push(code.to_string()));
    assert_eq!(accepted, vec!["750"]);

    session.tick(3500, &mut |code| accepted.push(code.to_string()));
    assert_eq!(accepted, vec!["750", "750"]);
}

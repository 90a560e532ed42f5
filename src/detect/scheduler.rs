use crate::clock::Clock;
use crate::video::{source_ready, VideoSource};

use super::coordinator::{DetectionCoordinator, DetectionResult};
use super::error::DecodeError;

/// What the driving loop should do after a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    /// Scanning stopped; do not reschedule.
    Stop,
    /// Reschedule for the next display frame.
    Continue,
}

/// Timing knobs for the scan loop, taken from `StationConfig`.
#[derive(Clone, Copy, Debug)]
pub struct ScanTiming {
    /// Minimum spacing between detection attempts.
    pub detect_interval_ms: u64,
    /// Grace wait before a manual attempt when the video is not ready yet.
    pub manual_delay_ms: u64,
}

/// Cooperative scan loop.
///
/// `tick` is called roughly once per display frame. The interval throttles
/// *attempts*, not scheduling: a not-yet-due tick still returns
/// `Continue`. The attempt timestamp moves on every attempt, successful or
/// not. Loop-mode detection failures are logged and swallowed; the loop
/// must outlive any single bad frame.
pub struct ScanLoopScheduler {
    timing: ScanTiming,
    scanning: bool,
    last_attempt_ms: Option<u64>,
    manual_busy: bool,
}

impl ScanLoopScheduler {
    pub fn new(timing: ScanTiming) -> Self {
        Self {
            timing,
            scanning: false,
            last_attempt_ms: None,
            manual_busy: false,
        }
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning
    }

    /// Begin a session: the first due tick attempts immediately.
    pub fn start(&mut self) {
        self.scanning = true;
        self.last_attempt_ms = None;
    }

    /// End the session; the next tick reports `Stop`.
    pub fn stop(&mut self) {
        self.scanning = false;
        self.manual_busy = false;
    }

    /// Drive one display-frame tick at `now_ms`.
    pub fn tick(
        &mut self,
        coordinator: &mut DetectionCoordinator,
        video: &mut dyn VideoSource,
        now_ms: u64,
        on_detect: &mut dyn FnMut(&DetectionResult),
    ) -> Tick {
        if !self.scanning {
            return Tick::Stop;
        }
        if !source_ready(video) {
            return Tick::Continue;
        }
        let due = self
            .last_attempt_ms
            .map_or(true, |last| now_ms.saturating_sub(last) >= self.timing.detect_interval_ms);
        if due {
            self.last_attempt_ms = Some(now_ms);
            match coordinator.attempt_detect(video, false) {
                Ok(Some(result)) => on_detect(&result),
                Ok(None) => {}
                Err(err) => log::warn!("scan loop attempt failed: {err}"),
            }
        }
        Tick::Continue
    }

    /// One-shot detection outside the loop.
    ///
    /// Serialized by a busy flag: a trigger while one is in flight is a
    /// no-op. When the video is not ready, waits `manual_delay_ms` once and
    /// re-checks. Unlike loop mode, a real decoder failure propagates so
    /// the caller can show an error distinct from "nothing found". The
    /// loop's attempt timestamp refreshes on the way out while scanning.
    pub fn manual_scan(
        &mut self,
        coordinator: &mut DetectionCoordinator,
        video: &mut dyn VideoSource,
        clock: &dyn Clock,
    ) -> Result<Option<DetectionResult>, DecodeError> {
        if self.manual_busy || !self.scanning {
            return Ok(None);
        }
        self.manual_busy = true;

        if !source_ready(video) {
            clock.sleep_ms(self.timing.manual_delay_ms);
        }
        let outcome = if source_ready(video) {
            coordinator.attempt_detect(video, true)
        } else {
            Ok(None)
        };

        if self.scanning {
            self.last_attempt_ms = Some(clock.now_ms());
        }
        self.manual_busy = false;
        outcome
    }
}

/// Short-window dedup applied by the result consumer.
///
/// A code identical to the immediately previous accepted code within the
/// window is discarded; anything else is accepted and becomes the new
/// memo. Codes are trimmed first; blank codes never pass. The memo
/// survives session stop: re-scanning the same item right after a restart
/// still debounces.
pub struct ScanDebouncer {
    window_ms: u64,
    last: Option<LastScan>,
}

struct LastScan {
    code: String,
    at_ms: u64,
}

impl ScanDebouncer {
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            last: None,
        }
    }

    /// Accept or discard `code` observed at `now_ms`; returns the
    /// normalized code on acceptance.
    pub fn accept(&mut self, code: &str, now_ms: u64) -> Option<String> {
        let normalized = code.trim();
        if normalized.is_empty() {
            return None;
        }
        if let Some(last) = &self.last {
            if last.code == normalized && now_ms.saturating_sub(last.at_ms) < self.window_ms {
                return None;
            }
        }
        self.last = Some(LastScan {
            code: normalized.to_string(),
            at_ms: now_ms,
        });
        Some(normalized.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeat_within_window_is_discarded() {
        let mut debounce = ScanDebouncer::new(3000);
        assert_eq!(debounce.accept("X", 0).as_deref(), Some("X"));
        assert_eq!(debounce.accept("X", 2000), None);
    }

    #[test]
    fn repeat_after_window_is_accepted() {
        let mut debounce = ScanDebouncer::new(3000);
        assert_eq!(debounce.accept("X", 0).as_deref(), Some("X"));
        assert_eq!(debounce.accept("X", 3500).as_deref(), Some("X"));
    }

    #[test]
    fn different_code_resets_the_memo() {
        let mut debounce = ScanDebouncer::new(3000);
        assert_eq!(debounce.accept("X", 0).as_deref(), Some("X"));
        assert_eq!(debounce.accept("Y", 100).as_deref(), Some("Y"));
        // X is no longer the memo, so it is accepted again immediately.
        assert_eq!(debounce.accept("X", 200).as_deref(), Some("X"));
    }

    #[test]
    fn codes_are_trimmed_and_blanks_rejected() {
        let mut debounce = ScanDebouncer::new(3000);
        assert_eq!(debounce.accept("  X  ", 0).as_deref(), Some("X"));
        assert_eq!(debounce.accept("X", 100), None);
        assert_eq!(debounce.accept("   ", 5000), None);
    }

    #[test]
    fn window_boundary_is_exclusive() {
        let mut debounce = ScanDebouncer::new(3000);
        debounce.accept("X", 0);
        assert_eq!(debounce.accept("X", 3000).as_deref(), Some("X"));
    }
}

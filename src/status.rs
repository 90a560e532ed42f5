//! Engine status notifications.
//!
//! The UI layer renders which detection engine is active and, once per
//! session, that no engine is available. The library only emits the
//! transitions; how they are shown is the embedder's business.

/// Engine status transitions worth telling the user about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineStatus {
    /// The platform-native detector is active.
    NativeActive,
    /// The software fallback decoder is active.
    FallbackActive,
    /// Neither backend is usable; manual entry is the only option. Emitted
    /// at most once per session.
    Unavailable,
}

/// Receiver for status transitions.
pub trait StatusSink {
    fn engine_status(&mut self, status: EngineStatus);
}

/// Default sink: routes transitions to the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogStatusSink;

impl StatusSink for LogStatusSink {
    fn engine_status(&mut self, status: EngineStatus) {
        match status {
            EngineStatus::NativeActive => log::info!("detection engine: native"),
            EngineStatus::FallbackActive => log::info!("detection engine: fallback decoder"),
            EngineStatus::Unavailable => {
                log::error!("no detection engine available; manual entry only")
            }
        }
    }
}

/// Sink that records every transition behind a shared handle; used by
/// tests and the demo bin to observe transitions after handing the sink
/// off.
#[derive(Clone, Debug, Default)]
pub struct RecordingStatusSink {
    seen: std::sync::Arc<std::sync::Mutex<Vec<EngineStatus>>>,
}

impl RecordingStatusSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<EngineStatus> {
        self.seen
            .lock()
            .map(|seen| seen.clone())
            .unwrap_or_default()
    }
}

impl StatusSink for RecordingStatusSink {
    fn engine_status(&mut self, status: EngineStatus) {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(status);
        }
    }
}

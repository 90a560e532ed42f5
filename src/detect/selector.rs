use crate::status::{EngineStatus, StatusSink};

use super::engine::{
    FallbackConfig, FallbackDecoder, FallbackProvider, NativeDetector, NativeProvider,
};
use super::symbology::{fallback_format_names, Symbology, DECLARED_SYMBOLOGIES};

/// Which backend, if any, is active for the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    NativeActive,
    FallbackActive,
    Unavailable,
}

/// Lazily resolves and caches the detection backend for one scan session.
///
/// Probing happens on first use: the native provider first, then the
/// fallback provider. Construction happens at most once per backend per
/// session; the providers are the injection seam, so concurrent resolution
/// is simply memoization in this single-threaded model. `Unavailable` is
/// sticky until `reset`, and its status notice fires exactly once per
/// session.
pub struct EngineSelector {
    native_provider: Box<dyn NativeProvider>,
    fallback_provider: Box<dyn FallbackProvider>,
    attempt_interval_ms: u64,
    state: EngineState,
    native: Option<Box<dyn NativeDetector>>,
    symbologies: Vec<Symbology>,
    fallback: Option<Box<dyn FallbackDecoder>>,
}

impl EngineSelector {
    pub fn new(
        native_provider: Box<dyn NativeProvider>,
        fallback_provider: Box<dyn FallbackProvider>,
        attempt_interval_ms: u64,
    ) -> Self {
        Self {
            native_provider,
            fallback_provider,
            attempt_interval_ms,
            state: EngineState::Uninitialized,
            native: None,
            symbologies: Vec::new(),
            fallback: None,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// The symbology list the native detector was constructed with.
    pub fn negotiated_symbologies(&self) -> &[Symbology] {
        &self.symbologies
    }

    /// Resolve the active engine, probing backends on first use.
    pub fn ensure(&mut self, status: &mut dyn StatusSink) -> EngineState {
        if self.state != EngineState::Uninitialized {
            return self.state;
        }

        if self.native_provider.available() {
            let symbologies = self.negotiate();
            match self.native_provider.create(&symbologies) {
                Ok(detector) => {
                    self.native = Some(detector);
                    self.symbologies = symbologies;
                    self.state = EngineState::NativeActive;
                    status.engine_status(EngineStatus::NativeActive);
                    return self.state;
                }
                Err(err) => {
                    log::warn!("native detector construction failed, trying fallback: {err:#}");
                }
            }
        }

        let config = FallbackConfig {
            attempt_interval_ms: self.attempt_interval_ms,
            formats: fallback_format_names(&DECLARED_SYMBOLOGIES),
            try_harder: true,
        };
        match self.fallback_provider.create(config) {
            Ok(decoder) => {
                self.fallback = Some(decoder);
                self.state = EngineState::FallbackActive;
                status.engine_status(EngineStatus::FallbackActive);
            }
            Err(err) => {
                log::error!("fallback decoder unavailable: {err:#}");
                self.state = EngineState::Unavailable;
                status.engine_status(EngineStatus::Unavailable);
            }
        }
        self.state
    }

    /// Intersect the backend's supported formats with the declared list.
    ///
    /// Empty intersection falls back to the full queried list; a failed or
    /// empty query falls back to the full declared list.
    fn negotiate(&self) -> Vec<Symbology> {
        match self.native_provider.supported_symbologies() {
            Ok(supported) if !supported.is_empty() => {
                let declared: Vec<Symbology> = DECLARED_SYMBOLOGIES
                    .iter()
                    .copied()
                    .filter(|s| supported.contains(s))
                    .collect();
                if declared.is_empty() {
                    supported
                } else {
                    declared
                }
            }
            Ok(_) => DECLARED_SYMBOLOGIES.to_vec(),
            Err(err) => {
                log::warn!("symbology query failed, using declared list: {err:#}");
                DECLARED_SYMBOLOGIES.to_vec()
            }
        }
    }

    pub fn native_mut(&mut self) -> Option<&mut (dyn NativeDetector + 'static)> {
        self.native.as_deref_mut()
    }

    pub fn fallback_mut(&mut self) -> Option<&mut (dyn FallbackDecoder + 'static)> {
        self.fallback.as_deref_mut()
    }

    /// Drop all cached backends and return to `Uninitialized`. A new
    /// session re-probes from scratch; a different camera or device may be
    /// behind it.
    pub fn reset(&mut self) {
        self.state = EngineState::Uninitialized;
        self.native = None;
        self.fallback = None;
        self.symbologies.clear();
    }
}

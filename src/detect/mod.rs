//! Barcode detection pipeline.
//!
//! Two incompatible backends hide behind one coordinator: a
//! platform-native structured detector (probed, capability-negotiated,
//! fed through an ordered frame-acquisition chain) and a software fallback
//! decoder (lazily constructed, single-frame interface). The scan loop
//! drives the coordinator on a throttled cadence; the debouncer filters
//! repeated codes on the way to the consumer.
//!
//! - `engine`: backend trait seams + provider injection points
//! - `symbology`: declared format set + fallback naming translation
//! - `capability`: monotonic per-strategy support latch
//! - `selector`: engine state machine and caches
//! - `acquire`: live -> bitmap -> surface acquisition chain
//! - `coordinator`: `attempt_detect`, error classification
//! - `scheduler`: scan loop, manual one-shot, dedup window
//! - `stubs`: camera-free backends for tests and the demo

mod acquire;
mod capability;
mod coordinator;
mod engine;
mod error;
mod scheduler;
mod selector;
pub mod stubs;
mod symbology;

pub use acquire::FrameAcquisition;
pub use capability::Capability;
pub use coordinator::{DetectionCoordinator, DetectionResult};
pub use engine::{
    Detection, FallbackConfig, FallbackDecoder, FallbackProvider, FramePayload, NativeDetector,
    NativeProvider,
};
pub use error::DecodeError;
pub use scheduler::{ScanDebouncer, ScanLoopScheduler, ScanTiming, Tick};
pub use selector::{EngineSelector, EngineState};
pub use symbology::{fallback_format_names, Symbology, DECLARED_SYMBOLOGIES};

//! scanstation
//!
//! Core of an inventory scan station: import a CSV inventory in whatever
//! dialect the exporting tool produced, then scan barcodes against it with
//! whichever detection backend the platform offers.
//!
//! # Architecture
//!
//! Two halves meet in the middle:
//!
//! 1. **CSV import**: delimiter sniffing, a quote-aware streaming
//!    tokenizer, header cleanup, and inventory hydration with a guessed
//!    key column and code index.
//! 2. **Detection**: a coordinator reconciling a platform-native
//!    structured detector and a software fallback decoder behind one
//!    `attempt_detect`, with an ordered frame-acquisition chain, monotonic
//!    capability latches, expected-vs-real error classification, a
//!    throttled cooperative scan loop and short-window dedup.
//!
//! Confirmed codes land in a persistent log (SQLite or in-memory) that
//! renders itself back out as CSV.
//!
//! # Module Structure
//!
//! - `csv`: dialect detection, parsing, column cleanup
//! - `inventory`: hydration, key guessing, code index
//! - `confirm`: confirmed-scan log + stores + export
//! - `video`: frame source seam, bitmaps, raster surface
//! - `detect`: engines, selector, acquisition, coordinator, scheduler
//! - `session`: per-camera lifecycle tying the above together
//! - `config`, `clock`, `status`: ambient plumbing

pub mod clock;
pub mod config;
pub mod confirm;
pub mod csv;
pub mod detect;
pub mod inventory;
pub mod session;
pub mod status;
pub mod video;

pub use clock::{Clock, SystemClock};
pub use config::{StationConfig, TimingSettings, VideoSettings};
pub use confirm::{
    ConfirmOutcome, ConfirmedLog, ConfirmedRecord, ConfirmedStore, InMemoryConfirmedStore,
    SqliteConfirmedStore,
};
pub use csv::{detect_delimiter, parse, parse_auto, unique_column_names, ParsedTable};
pub use detect::{
    DecodeError, Detection, DetectionCoordinator, DetectionResult, EngineState, FallbackConfig,
    FallbackDecoder, FallbackProvider, FramePayload, NativeDetector, NativeProvider,
    ScanDebouncer, ScanLoopScheduler, ScanTiming, Symbology, Tick, DECLARED_SYMBOLOGIES,
};
pub use inventory::{HydrateError, Inventory};
pub use session::ScanSession;
pub use status::{EngineStatus, LogStatusSink, RecordingStatusSink, StatusSink};
pub use video::{
    source_ready, FrameBitmap, RasterSurface, SyntheticVideoSource, VideoSource,
};

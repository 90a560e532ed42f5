use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::Path;

use crate::detect::ScanTiming;

const DEFAULT_DB_PATH: &str = "scanstation.db";
const DEFAULT_DETECT_INTERVAL_MS: u64 = 160;
const DEFAULT_MANUAL_DELAY_MS: u64 = 120;
const DEFAULT_DEDUP_WINDOW_MS: u64 = 3000;
const DEFAULT_VIDEO_WIDTH: u32 = 1280;
const DEFAULT_VIDEO_HEIGHT: u32 = 720;

#[derive(Debug, Deserialize, Default)]
struct StationConfigFile {
    db_path: Option<String>,
    timing: Option<TimingConfigFile>,
    video: Option<VideoConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct TimingConfigFile {
    detect_interval_ms: Option<u64>,
    manual_delay_ms: Option<u64>,
    dedup_window_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct VideoConfigFile {
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct StationConfig {
    pub db_path: String,
    pub timing: TimingSettings,
    pub video: VideoSettings,
}

#[derive(Debug, Clone)]
pub struct TimingSettings {
    /// Minimum spacing between detection attempts.
    pub detect_interval_ms: u64,
    /// Readiness grace wait before a manual attempt.
    pub manual_delay_ms: u64,
    /// Window inside which a repeated identical code is discarded.
    pub dedup_window_ms: u64,
}

#[derive(Debug, Clone)]
pub struct VideoSettings {
    /// Ideal capture resolution requested from the camera.
    pub width: u32,
    pub height: u32,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            detect_interval_ms: DEFAULT_DETECT_INTERVAL_MS,
            manual_delay_ms: DEFAULT_MANUAL_DELAY_MS,
            dedup_window_ms: DEFAULT_DEDUP_WINDOW_MS,
        }
    }
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            width: DEFAULT_VIDEO_WIDTH,
            height: DEFAULT_VIDEO_HEIGHT,
        }
    }
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            db_path: DEFAULT_DB_PATH.to_string(),
            timing: TimingSettings::default(),
            video: VideoSettings::default(),
        }
    }
}

impl StationConfig {
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("SCANSTATION_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: StationConfigFile) -> Self {
        let db_path = file.db_path.unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
        let timing = TimingSettings {
            detect_interval_ms: file
                .timing
                .as_ref()
                .and_then(|t| t.detect_interval_ms)
                .unwrap_or(DEFAULT_DETECT_INTERVAL_MS),
            manual_delay_ms: file
                .timing
                .as_ref()
                .and_then(|t| t.manual_delay_ms)
                .unwrap_or(DEFAULT_MANUAL_DELAY_MS),
            dedup_window_ms: file
                .timing
                .as_ref()
                .and_then(|t| t.dedup_window_ms)
                .unwrap_or(DEFAULT_DEDUP_WINDOW_MS),
        };
        let video = VideoSettings {
            width: file
                .video
                .as_ref()
                .and_then(|v| v.width)
                .unwrap_or(DEFAULT_VIDEO_WIDTH),
            height: file
                .video
                .as_ref()
                .and_then(|v| v.height)
                .unwrap_or(DEFAULT_VIDEO_HEIGHT),
        };
        Self {
            db_path,
            timing,
            video,
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(path) = std::env::var("SCANSTATION_DB_PATH") {
            if !path.trim().is_empty() {
                self.db_path = path;
            }
        }
        if let Some(value) = env_u64("SCANSTATION_DETECT_INTERVAL_MS")? {
            self.timing.detect_interval_ms = value;
        }
        if let Some(value) = env_u64("SCANSTATION_MANUAL_DELAY_MS")? {
            self.timing.manual_delay_ms = value;
        }
        if let Some(value) = env_u64("SCANSTATION_DEDUP_WINDOW_MS")? {
            self.timing.dedup_window_ms = value;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.timing.detect_interval_ms == 0 {
            return Err(anyhow!("detect interval must be greater than zero"));
        }
        if self.timing.dedup_window_ms == 0 {
            return Err(anyhow!("dedup window must be greater than zero"));
        }
        if self.video.width == 0 || self.video.height == 0 {
            return Err(anyhow!("video dimensions must be greater than zero"));
        }
        Ok(())
    }

    pub fn scan_timing(&self) -> ScanTiming {
        ScanTiming {
            detect_interval_ms: self.timing.detect_interval_ms,
            manual_delay_ms: self.timing.manual_delay_ms,
        }
    }
}

fn env_u64(key: &str) -> Result<Option<u64>> {
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => {
            let value: u64 = raw
                .trim()
                .parse()
                .map_err(|_| anyhow!("{key} must be an integer number of milliseconds"))?;
            Ok(Some(value))
        }
        _ => Ok(None),
    }
}

fn read_config_file(path: &Path) -> Result<StationConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}

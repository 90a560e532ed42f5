//! Video frame boundary.
//!
//! Detection never talks to a camera directly. It sees a `VideoSource`
//! trait object that reports readiness and dimensions and can hand frames
//! over in two shapes: a one-shot in-memory bitmap snapshot, or a raster
//! onto the persistent detection surface. Platform integrations implement
//! the trait; the library ships `SyntheticVideoSource` for tests and the
//! demo bin.
//!
//! Pixel buffers are 8-bit luma, row-major, `width * height` bytes.

use std::cell::Cell;

use anyhow::{anyhow, Result};

/// A live video source.
///
/// `has_frame` must be true and both dimensions positive before any
/// acquisition is attempted; `source_ready` bundles that check.
pub trait VideoSource {
    /// True once the source is delivering current frames.
    fn has_frame(&self) -> bool;

    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Whether the platform can snapshot frames into bitmaps at all.
    /// Runtime capture failures are latched separately by the acquisition
    /// chain.
    fn supports_bitmap_capture(&self) -> bool;

    /// Snapshot the current frame into an in-memory bitmap.
    fn capture_bitmap(&mut self) -> Result<FrameBitmap>;

    /// Rasterize the current frame onto `surface`, resizing it to the
    /// source's native resolution first.
    fn draw_onto(&mut self, surface: &mut RasterSurface) -> Result<()>;
}

/// Readiness gate shared by the acquisition chain and the scan loop.
pub fn source_ready(video: &dyn VideoSource) -> bool {
    video.has_frame() && video.width() > 0 && video.height() > 0
}

/// One-shot frame snapshot. The backing buffer is released when the bitmap
/// drops, so an early return out of a detect attempt cannot leak it.
pub struct FrameBitmap {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl FrameBitmap {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.data
    }
}

impl Drop for FrameBitmap {
    fn drop(&mut self) {
        self.data.clear();
        self.data.shrink_to_fit();
    }
}

/// Persistent, reusable drawing surface for rasterized frames.
///
/// Sized lazily: the buffer is only reallocated when the source dimensions
/// change, so a steady stream of same-sized frames reuses one allocation.
#[derive(Clone, Debug, Default)]
pub struct RasterSurface {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl RasterSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ensure_size(&mut self, width: u32, height: u32) {
        if self.width == width && self.height == height {
            return;
        }
        self.width = width;
        self.height = height;
        self.data = vec![0u8; (width as usize) * (height as usize)];
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.data
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

// ----------------------------------------------------------------------------
// Synthetic source for tests and the demo bin
// ----------------------------------------------------------------------------

/// Deterministic video source.
///
/// Generates a rolling gradient pattern and, when a code is "shown", embeds
/// it into row 0 of every frame (`[len, bytes...]`) where the stub decoders
/// in `detect::stubs` can read it back. The same code stays visible across
/// frames until replaced, like a physical barcode held in front of a
/// camera.
pub struct SyntheticVideoSource {
    width: u32,
    height: u32,
    ready: bool,
    bitmap_capture: bool,
    frame_count: u64,
    current_code: Option<String>,
    not_ready_checks: Cell<u32>,
}

impl SyntheticVideoSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ready: true,
            bitmap_capture: false,
            frame_count: 0,
            current_code: None,
            not_ready_checks: Cell::new(0),
        }
    }

    /// Toggle readiness (a camera that is still warming up).
    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    /// Report not-ready for the next `checks` readiness probes, then ready.
    /// Models a camera that warms up while the caller waits.
    pub fn ready_after(&mut self, checks: u32) {
        self.ready = true;
        self.not_ready_checks.set(checks);
    }

    /// Advertise bitmap-snapshot capability.
    pub fn with_bitmap_capture(mut self, supported: bool) -> Self {
        self.bitmap_capture = supported;
        self
    }

    /// Put a code in front of the camera (or clear it with `None`).
    pub fn show_code(&mut self, code: Option<&str>) {
        self.current_code = code.map(|c| c.to_string());
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frame_count
    }

    fn render(&mut self, out: &mut [u8]) {
        self.frame_count += 1;
        for (i, pixel) in out.iter_mut().enumerate() {
            *pixel = ((i as u64 + self.frame_count) % 256) as u8;
        }
        if let Some(code) = &self.current_code {
            let bytes = code.as_bytes();
            let max = (self.width as usize).saturating_sub(1).min(255);
            let len = bytes.len().min(max);
            if !out.is_empty() {
                out[0] = len as u8;
                out[1..1 + len].copy_from_slice(&bytes[..len]);
            }
        }
    }
}

impl VideoSource for SyntheticVideoSource {
    fn has_frame(&self) -> bool {
        let pending = self.not_ready_checks.get();
        if pending > 0 {
            self.not_ready_checks.set(pending - 1);
            return false;
        }
        self.ready
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn supports_bitmap_capture(&self) -> bool {
        self.bitmap_capture
    }

    fn capture_bitmap(&mut self) -> Result<FrameBitmap> {
        if !self.bitmap_capture {
            return Err(anyhow!("synthetic source has no bitmap capture"));
        }
        let mut data = vec![0u8; (self.width as usize) * (self.height as usize)];
        self.render(&mut data);
        Ok(FrameBitmap::new(self.width, self.height, data))
    }

    fn draw_onto(&mut self, surface: &mut RasterSurface) -> Result<()> {
        surface.ensure_size(self.width, self.height);
        self.render(surface.pixels_mut());
        Ok(())
    }
}

/// Decode a code embedded by `SyntheticVideoSource::show_code`, if any.
pub(crate) fn embedded_code(pixels: &[u8]) -> Option<String> {
    let len = *pixels.first()? as usize;
    if len == 0 || pixels.len() < 1 + len {
        return None;
    }
    std::str::from_utf8(&pixels[1..1 + len])
        .ok()
        .map(|s| s.to_string())
}

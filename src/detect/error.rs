use thiserror::Error;

/// Errors raised by decode attempts.
///
/// The first four variants are expected outcomes of pointing a camera at
/// nothing in particular; they are swallowed everywhere. `Unsupported`
/// latches the frame-acquisition strategy that raised it. `Backend` is a
/// real failure: logged and swallowed in loop mode, returned to the caller
/// from a manual attempt.
#[derive(Clone, Debug, Error)]
pub enum DecodeError {
    #[error("no code found in frame")]
    NotFound,
    #[error("checksum mismatch")]
    Checksum,
    #[error("format mismatch")]
    Format,
    #[error("decode attempt timed out")]
    Timeout,
    #[error("unsupported frame payload: {0}")]
    Unsupported(String),
    #[error("decoder failure: {0}")]
    Backend(String),
}

impl DecodeError {
    /// Whether this is a recognized no-result condition rather than a real
    /// failure.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            DecodeError::NotFound | DecodeError::Checksum | DecodeError::Format | DecodeError::Timeout
        )
    }
}

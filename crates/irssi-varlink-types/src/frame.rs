//! NUL-terminated JSON framing.

use serde::Serialize;
use thiserror::Error;

/// Byte terminating every frame on the wire.
pub const TERMINATOR: u8 = 0x00;

/// Upper bound for a single unterminated frame held in a decoder.
pub const MAX_FRAME_BYTES: usize = 1024 * 1024;

/// Errors raised while framing messages.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The peer sent more than the permitted number of bytes without a
    /// terminator.
    #[error("unterminated frame of {size} bytes exceeds the {limit} byte limit")]
    TooLarge {
        /// Bytes buffered when the limit was crossed.
        size: usize,
        /// Configured limit.
        limit: usize,
    },
    /// Serialising an outbound document failed.
    #[error("failed to serialise frame: {0}")]
    Serialise(#[from] serde_json::Error),
}

/// Incremental splitter for NUL-terminated frames.
///
/// Bytes are appended with [`FrameDecoder::feed`], which returns every frame
/// completed by the new data, in order, and keeps the trailing partial
/// fragment for the next call. A frame may arrive across any number of reads
/// and a single read may carry any number of frames.
#[derive(Debug)]
pub struct FrameDecoder {
    pending: Vec<u8>,
    limit: usize,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder {
    /// Creates a decoder capped at [`MAX_FRAME_BYTES`].
    #[must_use]
    pub const fn new() -> Self {
        Self::with_limit(MAX_FRAME_BYTES)
    }

    /// Creates a decoder with a custom cap on unterminated input.
    #[must_use]
    pub const fn with_limit(limit: usize) -> Self {
        Self {
            pending: Vec::new(),
            limit,
        }
    }

    /// Appends `bytes` and returns the frames they complete.
    ///
    /// Returned frames exclude the terminator.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::TooLarge`] when the unterminated remainder grows
    /// beyond the decoder's limit. The buffer is discarded in that case.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<Vec<Vec<u8>>, FrameError> {
        self.pending.extend_from_slice(bytes);

        let mut frames = Vec::new();
        let mut consumed = 0;
        while let Some(offset) = self
            .pending
            .get(consumed..)
            .and_then(|rest| rest.iter().position(|byte| *byte == TERMINATOR))
        {
            let end = consumed + offset;
            frames.push(
                self.pending
                    .get(consumed..end)
                    .map(<[u8]>::to_vec)
                    .unwrap_or_default(),
            );
            consumed = end + 1;
        }
        self.pending.drain(..consumed);

        if self.pending.len() > self.limit {
            let size = self.pending.len();
            self.pending.clear();
            return Err(FrameError::TooLarge {
                size,
                limit: self.limit,
            });
        }
        Ok(frames)
    }

    /// Bytes received after the last terminator.
    #[must_use]
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    /// Drops any buffered partial frame.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

/// Serialises `value` as compact JSON followed by the frame terminator.
///
/// Strings are written as UTF-8 without escaping non-ASCII characters, so
/// text already held as UTF-8 reaches the peer byte-for-byte.
///
/// # Errors
///
/// Returns [`FrameError::Serialise`] if `value` cannot be represented as
/// JSON.
pub fn encode_frame<T>(value: &T) -> Result<Vec<u8>, FrameError>
where
    T: Serialize + ?Sized,
{
    let mut bytes = serde_json::to_vec(value)?;
    bytes.push(TERMINATOR);
    Ok(bytes)
}

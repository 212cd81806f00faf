//! Error handling for the codec library
//!
//! Numerical degeneracy and frame erasure are handled inside the codec and
//! never show up here. What remains are framing and configuration problems
//! the caller has to fix.

#![allow(missing_docs)]

use std::fmt;
use thiserror::Error;

/// Result type alias for codec operations
pub type Result<T> = std::result::Result<T, CodecError>;

/// Error type for codec operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodecError {
    /// Unsupported codec type
    #[error("Unsupported codec type: {codec_type}")]
    UnsupportedCodec { codec_type: String },

    /// Invalid frame size
    #[error("Invalid frame size: expected {expected}, got {actual}")]
    InvalidFrameSize { expected: usize, actual: usize },

    /// Invalid sample rate
    #[error("Invalid sample rate: {rate}Hz (supported: {supported:?})")]
    InvalidSampleRate { rate: u32, supported: Vec<u32> },

    /// Invalid channel count
    #[error("Invalid channel count: {channels} (supported: {supported:?})")]
    InvalidChannelCount { channels: u8, supported: Vec<u8> },

    /// Serial bitstream frame shorter or longer than the fixed frame length
    #[error("Insufficient data: need {needed} words, got {actual}")]
    InsufficientData { needed: usize, actual: usize },

    /// Buffer too small for operation
    #[error("Buffer too small: need {needed} bytes, got {actual}")]
    BufferTooSmall { needed: usize, actual: usize },

    /// Invalid payload data
    #[error("Invalid payload data: {details}")]
    InvalidPayload { details: String },
}

impl CodecError {
    /// Create a new unsupported codec error
    pub fn unsupported_codec(codec_type: impl Into<String>) -> Self {
        Self::UnsupportedCodec {
            codec_type: codec_type.into(),
        }
    }

    /// Create a new invalid payload error
    pub fn invalid_payload(details: impl Into<String>) -> Self {
        Self::InvalidPayload {
            details: details.into(),
        }
    }

    /// Create a new insufficient data error
    pub fn insufficient_data(needed: usize, actual: usize) -> Self {
        Self::InsufficientData { needed, actual }
    }

    /// Check if this error is recoverable
    ///
    /// Framing errors are recoverable: the stream can continue with the next
    /// frame, typically after concealing the broken one.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::UnsupportedCodec { .. }
            | Self::InvalidSampleRate { .. }
            | Self::InvalidChannelCount { .. } => false,

            Self::InvalidFrameSize { .. }
            | Self::InsufficientData { .. }
            | Self::BufferTooSmall { .. }
            | Self::InvalidPayload { .. } => true,
        }
    }

    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnsupportedCodec { .. }
            | Self::InvalidSampleRate { .. }
            | Self::InvalidChannelCount { .. } => ErrorCategory::Configuration,

            Self::InvalidFrameSize { .. }
            | Self::InsufficientData { .. }
            | Self::InvalidPayload { .. } => ErrorCategory::Framing,

            Self::BufferTooSmall { .. } => ErrorCategory::Memory,
        }
    }
}

/// Error category for grouping related errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Configuration and parameter errors
    Configuration,
    /// Malformed frames handed to the codec
    Framing,
    /// Caller supplied buffers
    Memory,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "Configuration"),
            Self::Framing => write!(f, "Framing"),
            Self::Memory => write!(f, "Memory"),
        }
    }
}

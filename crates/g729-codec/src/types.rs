//! Core types and traits for the codec library
//!
//! This module defines the codec trait the G.729 implementation plugs into
//! and the configuration it is built from.

use crate::error::{CodecError, Result};
use std::fmt;

/// Primary trait for audio codecs
///
/// One instance carries the state of one logical audio stream. Instances
/// are `Send + Sync` so they can be moved to whichever thread services the
/// stream, but a single instance must never be shared between streams.
pub trait AudioCodec: Send + Sync {
    /// Encode audio samples to compressed data
    ///
    /// # Arguments
    ///
    /// * `samples` - Input audio samples as 16-bit PCM
    ///
    /// # Returns
    ///
    /// Compressed audio data as bytes
    ///
    /// # Errors
    ///
    /// Returns an error if the input does not have the codec frame size
    fn encode(&mut self, samples: &[i16]) -> Result<Vec<u8>>;

    /// Decode compressed data to audio samples
    ///
    /// # Arguments
    ///
    /// * `data` - Compressed audio data
    ///
    /// # Returns
    ///
    /// Decoded audio samples as 16-bit PCM
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is malformed
    fn decode(&mut self, data: &[u8]) -> Result<Vec<i16>>;

    /// Get codec information
    fn info(&self) -> CodecInfo;

    /// Reset codec state
    ///
    /// This clears all internal state and prepares the codec for fresh input.
    /// Useful for handling stream discontinuities.
    fn reset(&mut self) -> Result<()>;

    /// Get the expected frame size in samples
    fn frame_size(&self) -> usize;

    /// Check if the codec supports variable frame sizes
    fn supports_variable_frame_size(&self) -> bool {
        false
    }
}

/// Extended trait for codecs with advanced features
pub trait AudioCodecExt: AudioCodec {
    /// Encode with pre-allocated output buffer
    ///
    /// Returns the number of bytes written to `output`.
    fn encode_to_buffer(&mut self, samples: &[i16], output: &mut [u8]) -> Result<usize>;

    /// Decode with pre-allocated output buffer
    ///
    /// Returns the number of samples written to `output`.
    fn decode_to_buffer(&mut self, data: &[u8], output: &mut [i16]) -> Result<usize>;

    /// Get maximum encoded size for a given input size
    fn max_encoded_size(&self, input_samples: usize) -> usize;

    /// Get maximum decoded size for a given input size
    fn max_decoded_size(&self, input_bytes: usize) -> usize;
}

/// Audio codec information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecInfo {
    /// Codec name
    pub name: &'static str,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u8,
    /// Bitrate in bits per second
    pub bitrate: u32,
    /// Frame size in samples
    pub frame_size: usize,
    /// RTP payload type (if standard)
    pub payload_type: Option<u8>,
}

/// Sample rate enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleRate {
    /// 8 kHz (narrowband)
    Rate8000,
    /// 16 kHz (wideband)
    Rate16000,
    /// 48 kHz (professional)
    Rate48000,
    /// Custom sample rate
    Custom(u32),
}

impl SampleRate {
    /// Get the sample rate value in Hz
    pub fn hz(self) -> u32 {
        match self {
            Self::Rate8000 => 8000,
            Self::Rate16000 => 16000,
            Self::Rate48000 => 48000,
            Self::Custom(rate) => rate,
        }
    }

    /// Create from Hz value
    pub fn from_hz(hz: u32) -> Self {
        match hz {
            8000 => Self::Rate8000,
            16000 => Self::Rate16000,
            48000 => Self::Rate48000,
            rate => Self::Custom(rate),
        }
    }
}

impl fmt::Display for SampleRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Hz", self.hz())
    }
}

/// Codec configuration
#[derive(Debug, Clone, PartialEq)]
pub struct CodecConfig {
    /// Sample rate
    pub sample_rate: SampleRate,
    /// Number of channels
    pub channels: u8,
    /// G.729 specific parameters
    pub g729: G729Parameters,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self::g729()
    }
}

impl CodecConfig {
    /// Sample rates G.729 accepts
    pub const SUPPORTED_SAMPLE_RATES: &'static [u32] = &[8000];

    /// Channel counts G.729 accepts
    pub const SUPPORTED_CHANNELS: &'static [u8] = &[1];

    /// Create the standard G.729 configuration (8 kHz mono)
    pub fn g729() -> Self {
        Self {
            sample_rate: SampleRate::Rate8000,
            channels: 1,
            g729: G729Parameters::default(),
        }
    }

    /// Set sample rate
    pub fn with_sample_rate(mut self, sample_rate: SampleRate) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Set channel count
    pub fn with_channels(mut self, channels: u8) -> Self {
        self.channels = channels;
        self
    }

    /// Enable or disable the decoder postfilter
    pub fn with_postfilter(mut self, enabled: bool) -> Self {
        self.g729.postfilter = enabled;
        self
    }

    /// Enable or disable the encoder input high-pass filter
    pub fn with_pre_process(mut self, enabled: bool) -> Self {
        self.g729.pre_process = enabled;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !Self::SUPPORTED_SAMPLE_RATES.contains(&self.sample_rate.hz()) {
            return Err(CodecError::InvalidSampleRate {
                rate: self.sample_rate.hz(),
                supported: Self::SUPPORTED_SAMPLE_RATES.to_vec(),
            });
        }

        if !Self::SUPPORTED_CHANNELS.contains(&self.channels) {
            return Err(CodecError::InvalidChannelCount {
                channels: self.channels,
                supported: Self::SUPPORTED_CHANNELS.to_vec(),
            });
        }

        Ok(())
    }
}

/// G.729 codec parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct G729Parameters {
    /// Run the adaptive postfilter on decoder output
    pub postfilter: bool,
    /// Run the 140 Hz high-pass filter on encoder input
    pub pre_process: bool,
}

impl Default for G729Parameters {
    fn default() -> Self {
        Self {
            postfilter: true,
            pre_process: true,
        }
    }
}

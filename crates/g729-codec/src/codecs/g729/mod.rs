//! G.729 Low-Bitrate Audio Codec Implementation
//!
//! This module implements the floating-point G.729 codec (Annex C), a low
//! bit-rate speech codec standardized by ITU-T and commonly used in VoIP.
//! G.729 uses CS-ACELP (Conjugate-Structure Algebraic Code Excited Linear
//! Prediction) to reach 8 kbit/s: every 10 ms frame of 80 samples becomes
//! 80 bits.
//!
//! ## Frame layout
//!
//! | Parameter | Bits | Meaning |
//! |-----------|------|---------|
//! | L0..L3    | 18   | LSP predictor mode and codebook indices |
//! | P1, P0    | 8+1  | First subframe lag and its parity |
//! | C1, S1    | 13+4 | First subframe pulse positions and signs |
//! | GA1, GB1  | 7    | First subframe gains |
//! | P2        | 5    | Second subframe lag, relative to P1 |
//! | C2, S2    | 13+4 | Second subframe pulse positions and signs |
//! | GA2, GB2  | 7    | Second subframe gains |
//!
//! ## Usage
//!
//! ```rust
//! use g729_codec::codecs::g729::G729Codec;
//! use g729_codec::{AudioCodec, CodecConfig};
//!
//! let mut codec = G729Codec::new(CodecConfig::g729())?;
//! let payload = codec.encode(&[0i16; 80])?;
//! let pcm = codec.decode(&payload)?;
//! assert_eq!(pcm.len(), 80);
//! # Ok::<(), g729_codec::CodecError>(())
//! ```
//!
//! Frame erasure concealment is reachable through [`G729Decoder`], which
//! accepts serial frames with an erasure flag.

use crate::error::{CodecError, Result};
use crate::types::{AudioCodec, AudioCodecExt, CodecConfig, CodecInfo, G729Parameters};
use crate::utils::validation::{validate_output_buffer, validate_payload};
use tracing::{debug, trace};

pub mod acelp;
pub mod bitstream;
pub mod constants;
pub mod decoder;
pub mod encoder;
pub mod filter;
pub mod gain;
pub mod lpc;
pub mod lsp_dec;
pub mod lsp_quant;
pub mod pitch;
pub mod postfilter;
pub mod preproc;
pub mod pwf;
pub mod tables;
pub mod taming;

pub use decoder::G729Decoder;
pub use encoder::G729Encoder;

use constants::{L_FRAME, PAYLOAD_SIZE};

/// Force the lookup tables that are computed on first use
pub fn init_tables() {
    once_cell::sync::Lazy::force(&tables::HAMWINDOW);
    once_cell::sync::Lazy::force(&tables::LAG_WINDOW);
    once_cell::sync::Lazy::force(&tables::GRID);
    once_cell::sync::Lazy::force(&tables::LSPCB1);
    once_cell::sync::Lazy::force(&tables::LSPCB2);
    once_cell::sync::Lazy::force(&tables::FG);
    once_cell::sync::Lazy::force(&tables::FG_SUM);
    once_cell::sync::Lazy::force(&tables::FG_SUM_INV);
    once_cell::sync::Lazy::force(&tables::FREQ_PREV_RESET);
    once_cell::sync::Lazy::force(&tables::TAB_HUP_S);
    once_cell::sync::Lazy::force(&tables::TAB_HUP_L);
}

/// G.729 codec implementation
///
/// Pairs an encoder and a decoder for one stream. Payloads carry one or
/// more 10-byte frames back to back, as in RTP.
pub struct G729Codec {
    /// Sample rate (fixed at 8kHz)
    sample_rate: u32,
    /// Number of channels (fixed at 1)
    channels: u8,
    /// Codec parameters
    params: G729Parameters,
    /// Encoder state
    encoder: G729Encoder,
    /// Decoder state
    decoder: G729Decoder,
}

impl G729Codec {
    /// Create a new G.729 codec from a validated configuration
    pub fn new(config: CodecConfig) -> Result<Self> {
        config.validate()?;

        debug!(
            "Creating G.729 codec: {}Hz, {}ch, postfilter={}, pre_process={}",
            config.sample_rate.hz(),
            config.channels,
            config.g729.postfilter,
            config.g729.pre_process
        );

        Ok(Self {
            sample_rate: config.sample_rate.hz(),
            channels: config.channels,
            encoder: G729Encoder::with_parameters(&config.g729),
            decoder: G729Decoder::with_parameters(&config.g729),
            params: config.g729,
        })
    }

    /// Create a codec with the default parameters
    pub fn new_default() -> Result<Self> {
        Self::new(CodecConfig::g729())
    }

    /// Get the compression ratio (160 PCM bytes to 10 coded bytes)
    pub fn compression_ratio(&self) -> f32 {
        PAYLOAD_SIZE as f32 / (2 * L_FRAME) as f32
    }

    /// Current codec parameters
    pub fn parameters(&self) -> &G729Parameters {
        &self.params
    }

    /// Frame-level encoder
    pub fn encoder_mut(&mut self) -> &mut G729Encoder {
        &mut self.encoder
    }

    /// Frame-level decoder, for concealment and serial input
    pub fn decoder_mut(&mut self) -> &mut G729Decoder {
        &mut self.decoder
    }

    fn validate_samples(samples: &[i16]) -> Result<()> {
        if samples.is_empty() || samples.len() % L_FRAME != 0 {
            return Err(CodecError::InvalidFrameSize {
                expected: L_FRAME,
                actual: samples.len(),
            });
        }
        Ok(())
    }
}

impl AudioCodec for G729Codec {
    fn encode(&mut self, samples: &[i16]) -> Result<Vec<u8>> {
        Self::validate_samples(samples)?;

        let mut encoded = Vec::with_capacity(samples.len() / L_FRAME * PAYLOAD_SIZE);
        for frame in samples.chunks_exact(L_FRAME) {
            encoded.extend_from_slice(&self.encoder.encode(frame)?);
        }

        trace!("G.729 encoded {} samples to {} bytes", samples.len(), encoded.len());
        Ok(encoded)
    }

    fn decode(&mut self, data: &[u8]) -> Result<Vec<i16>> {
        validate_payload(PAYLOAD_SIZE, data)?;

        let mut decoded = Vec::with_capacity(data.len() / PAYLOAD_SIZE * L_FRAME);
        for frame in data.chunks_exact(PAYLOAD_SIZE) {
            decoded.extend_from_slice(&self.decoder.decode_payload(frame)?);
        }

        trace!("G.729 decoded {} bytes to {} samples", data.len(), decoded.len());
        Ok(decoded)
    }

    fn info(&self) -> CodecInfo {
        CodecInfo {
            name: "G729",
            sample_rate: self.sample_rate,
            channels: self.channels,
            bitrate: 8000,
            frame_size: L_FRAME,
            payload_type: Some(18),
        }
    }

    fn reset(&mut self) -> Result<()> {
        self.encoder.reset();
        self.decoder.reset();

        debug!("G.729 codec reset");
        Ok(())
    }

    fn frame_size(&self) -> usize {
        L_FRAME
    }
}

impl AudioCodecExt for G729Codec {
    fn encode_to_buffer(&mut self, samples: &[i16], output: &mut [u8]) -> Result<usize> {
        Self::validate_samples(samples)?;
        let needed = self.max_encoded_size(samples.len());
        validate_output_buffer(needed, output.len())?;

        for (frame, out) in samples
            .chunks_exact(L_FRAME)
            .zip(output.chunks_exact_mut(PAYLOAD_SIZE))
        {
            out.copy_from_slice(&self.encoder.encode(frame)?);
        }

        trace!("G.729 encoded {} samples to {} bytes (zero-alloc)", samples.len(), needed);
        Ok(needed)
    }

    fn decode_to_buffer(&mut self, data: &[u8], output: &mut [i16]) -> Result<usize> {
        validate_payload(PAYLOAD_SIZE, data)?;
        let needed = self.max_decoded_size(data.len());
        validate_output_buffer(needed, output.len())?;

        for (frame, out) in data
            .chunks_exact(PAYLOAD_SIZE)
            .zip(output.chunks_exact_mut(L_FRAME))
        {
            out.copy_from_slice(&self.decoder.decode_payload(frame)?);
        }

        trace!("G.729 decoded {} bytes to {} samples (zero-alloc)", data.len(), needed);
        Ok(needed)
    }

    fn max_encoded_size(&self, input_samples: usize) -> usize {
        input_samples.div_ceil(L_FRAME).max(1) * PAYLOAD_SIZE
    }

    fn max_decoded_size(&self, input_bytes: usize) -> usize {
        input_bytes.div_ceil(PAYLOAD_SIZE).max(1) * L_FRAME
    }
}

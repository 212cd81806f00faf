//! # G729-Codec: ITU-T G.729 Annex C Floating-Point Speech Codec
//!
//! This library implements the 8 kbit/s CS-ACELP speech codec of ITU-T
//! Recommendation G.729 in its floating-point rendition (Annex C). Every
//! 10 ms frame of 8 kHz, 16-bit PCM is reduced to 80 bits and back.
//!
//! ## Features
//!
//! - **Encoder**: LPC analysis, two-stage predictive LSP quantization,
//!   open and closed-loop pitch search, algebraic codebook search and
//!   conjugate-structure gain quantization
//! - **Decoder**: parameter decoding, frame erasure concealment, adaptive
//!   postfilter and output high-pass filter
//! - **Bitstream**: ITU serial frames (82 words) and packed 10-byte RTP payloads
//!
//! ## Usage
//!
//! ```rust
//! use g729_codec::{AudioCodec, CodecConfig, CodecFactory};
//!
//! let mut codec = CodecFactory::create(CodecConfig::g729())?;
//!
//! // One 10 ms frame at 8 kHz
//! let samples = vec![0i16; 80];
//! let encoded = codec.encode(&samples)?;
//! assert_eq!(encoded.len(), 10);
//!
//! let decoded = codec.decode(&encoded)?;
//! assert_eq!(decoded.len(), 80);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! The frame-level [`G729Encoder`] and [`G729Decoder`] are available for
//! callers that work with serial frames or need erasure concealment.

#![deny(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::excessive_precision)]
#![allow(clippy::unreadable_literal)]

pub mod codecs;
pub mod error;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use codecs::g729::{G729Codec, G729Decoder, G729Encoder};
pub use codecs::CodecFactory;
pub use error::{CodecError, Result};
pub use types::{AudioCodec, AudioCodecExt, CodecConfig, CodecInfo, G729Parameters, SampleRate};

/// Version information for the codec library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Supported codec types
pub const SUPPORTED_CODECS: &[&str] = &["G729"];

/// Initialize the codec library
///
/// Installs a `tracing` subscriber honouring `RUST_LOG` (if none is
/// installed yet) and forces the computed lookup tables. It's safe to call
/// multiple times.
///
/// # Errors
///
/// Currently infallible; the `Result` is kept for API stability
pub fn init() -> Result<()> {
    // Initialize logging if not already done
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    codecs::g729::init_tables();

    tracing::info!("G729-Codec v{} initialized", VERSION);
    tracing::info!("Supported codecs: {:?}", SUPPORTED_CODECS);

    Ok(())
}

/// Get library information
pub fn info() -> LibraryInfo {
    LibraryInfo {
        version: VERSION,
        supported_codecs: SUPPORTED_CODECS.to_vec(),
    }
}

/// Library information structure
#[derive(Debug, Clone)]
pub struct LibraryInfo {
    /// Library version
    pub version: &'static str,
    /// List of supported codec names
    pub supported_codecs: Vec<&'static str>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init() {
        assert!(init().is_ok());
        assert!(init().is_ok());
    }

    #[test]
    fn test_info() {
        let info = info();
        assert_eq!(info.version, VERSION);
        assert_eq!(info.supported_codecs, vec!["G729"]);
    }
}

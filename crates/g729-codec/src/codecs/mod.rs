//! Codec implementations and factory

use crate::error::{CodecError, Result};
use crate::types::{AudioCodec, CodecConfig};

pub mod g729;

/// Codec factory for creating codec instances
pub struct CodecFactory;

impl CodecFactory {
    /// Create a codec instance from configuration
    pub fn create(config: CodecConfig) -> Result<Box<dyn AudioCodec>> {
        // Validate configuration first
        config.validate()?;

        let codec = g729::G729Codec::new(config)?;
        Ok(Box::new(codec))
    }

    /// Create a codec by name
    pub fn create_by_name(name: &str, config: CodecConfig) -> Result<Box<dyn AudioCodec>> {
        match name.to_uppercase().replace('.', "").as_str() {
            "G729" => Self::create(config),
            _ => Err(CodecError::unsupported_codec(name)),
        }
    }

    /// Create a codec by RTP payload type
    pub fn create_by_payload_type(payload_type: u8, config: CodecConfig) -> Result<Box<dyn AudioCodec>> {
        match payload_type {
            18 => Self::create(config),
            _ => Err(CodecError::unsupported_codec(format!("PT{}", payload_type))),
        }
    }

    /// Get all supported codec names
    pub fn supported_codecs() -> Vec<&'static str> {
        crate::SUPPORTED_CODECS.to_vec()
    }

    /// Check if a codec is supported
    pub fn is_supported(name: &str) -> bool {
        Self::supported_codecs().contains(&name.to_uppercase().as_str())
    }
}

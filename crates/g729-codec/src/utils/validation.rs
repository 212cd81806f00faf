//! Input validation utilities for codec operations

use crate::error::{CodecError, Result};

/// Validate that a PCM buffer holds exactly one frame
pub fn validate_frame_size(expected: usize, samples: &[i16]) -> Result<()> {
    if samples.len() != expected {
        return Err(CodecError::InvalidFrameSize {
            expected,
            actual: samples.len(),
        });
    }

    Ok(())
}

/// Validate the length of a serial bitstream frame
pub fn validate_serial_len(expected: usize, words: &[i16]) -> Result<()> {
    if words.len() != expected {
        return Err(CodecError::insufficient_data(expected, words.len()));
    }

    Ok(())
}

/// Validate a packed payload
///
/// The payload must be a whole number of frames.
pub fn validate_payload(frame_bytes: usize, data: &[u8]) -> Result<()> {
    if data.is_empty() {
        return Err(CodecError::invalid_payload("Encoded data cannot be empty"));
    }

    if data.len() % frame_bytes != 0 {
        return Err(CodecError::invalid_payload(format!(
            "Payload of {} bytes is not a multiple of the {}-byte frame",
            data.len(),
            frame_bytes
        )));
    }

    Ok(())
}

/// Validate that an output buffer can hold `needed` elements
pub fn validate_output_buffer(needed: usize, actual: usize) -> Result<()> {
    if actual < needed {
        return Err(CodecError::BufferTooSmall { needed, actual });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_frame_size() {
        assert!(validate_frame_size(80, &[0i16; 80]).is_ok());
        assert_eq!(
            validate_frame_size(80, &[0i16; 79]),
            Err(CodecError::InvalidFrameSize {
                expected: 80,
                actual: 79
            })
        );
    }

    #[test]
    fn test_validate_serial_len() {
        assert!(validate_serial_len(82, &[0i16; 82]).is_ok());
        let err = validate_serial_len(82, &[0i16; 81]).unwrap_err();
        assert_eq!(err, CodecError::insufficient_data(82, 81));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_validate_payload() {
        assert!(validate_payload(10, &[0u8; 20]).is_ok());
        assert!(validate_payload(10, &[]).is_err());
        assert!(validate_payload(10, &[0u8; 15]).is_err());
    }

    #[test]
    fn test_validate_output_buffer() {
        assert!(validate_output_buffer(10, 10).is_ok());
        assert!(matches!(
            validate_output_buffer(10, 4),
            Err(CodecError::BufferTooSmall {
                needed: 10,
                actual: 4
            })
        ));
    }
}

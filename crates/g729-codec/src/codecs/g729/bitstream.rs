//! Parameter framing
//!
//! A frame carries 11 parameters totalling 80 bits. They travel either
//! packed into 10 bytes, MSB first, or as the 82-word serial format where
//! every bit takes one 16-bit word.

use super::constants::{
    BIT_0, BIT_1, BITS_PER_FRAME, BITSNO, PAYLOAD_SIZE, PRM_SIZE, SERIAL_SIZE, SIZE_WORD,
    SYNC_WORD,
};
use crate::error::{CodecError, Result};
use crate::utils::validation::validate_serial_len;

/// The parameters of one frame, in transmission order
pub type Params = [u16; PRM_SIZE];

/// Serialize parameters into the 82-word soft-bit format
pub fn prm_to_serial(prm: &Params) -> [i16; SERIAL_SIZE] {
    let mut serial = [BIT_0; SERIAL_SIZE];
    serial[0] = SYNC_WORD;
    serial[1] = SIZE_WORD;

    let mut pos = 2;
    for (&value, &bits) in prm.iter().zip(BITSNO.iter()) {
        for b in (0..bits).rev() {
            if (value >> b) & 1 == 1 {
                serial[pos] = BIT_1;
            }
            pos += 1;
        }
    }
    serial
}

/// Parse an 82-word serial frame
///
/// Returns the parameters and whether the frame is erased, which is the
/// case when any bit slot holds 0. Slots other than `BIT_0` read as 1.
pub fn serial_to_prm(serial: &[i16]) -> Result<(Params, bool)> {
    validate_serial_len(SERIAL_SIZE, serial)?;

    let bits = &serial[2..];
    let erased = bits.contains(&0);

    let mut prm = [0u16; PRM_SIZE];
    let mut pos = 0;
    for (p, &n) in prm.iter_mut().zip(BITSNO.iter()) {
        for &word in &bits[pos..pos + n] {
            *p = (*p << 1) | u16::from(word == BIT_1);
        }
        pos += n;
    }
    Ok((prm, erased))
}

/// Pack parameters into a 10-byte payload
pub fn prm_to_bytes(prm: &Params) -> [u8; PAYLOAD_SIZE] {
    let mut acc: u128 = 0;
    for (&value, &bits) in prm.iter().zip(BITSNO.iter()) {
        acc = (acc << bits) | u128::from(value & ((1u16 << bits) - 1));
    }

    let mut out = [0u8; PAYLOAD_SIZE];
    out.copy_from_slice(&acc.to_be_bytes()[16 - PAYLOAD_SIZE..]);
    out
}

/// Unpack a 10-byte payload
pub fn bytes_to_prm(data: &[u8]) -> Result<Params> {
    if data.len() != PAYLOAD_SIZE {
        return Err(CodecError::invalid_payload(format!(
            "G.729 frame must be {} bytes, got {}",
            PAYLOAD_SIZE,
            data.len()
        )));
    }

    let acc = data.iter().fold(0u128, |acc, &b| (acc << 8) | u128::from(b));

    let mut prm = [0u16; PRM_SIZE];
    let mut shift = BITS_PER_FRAME;
    for (p, &bits) in prm.iter_mut().zip(BITSNO.iter()) {
        shift -= bits;
        *p = ((acc >> shift) & ((1u128 << bits) - 1)) as u16;
    }
    Ok(prm)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KNOWN: Params = [
        0x8f, 0x2b3, 0x51, 1, 0x1abc, 0x9, 0x55, 0x13, 0x0f0f, 0x6, 0x7e,
    ];

    #[test]
    fn test_serial_layout() {
        let serial = prm_to_serial(&KNOWN);
        assert_eq!(serial[0], SYNC_WORD);
        assert_eq!(serial[1], SIZE_WORD);
        // 0x8f = 1000_1111, MSB first
        assert_eq!(
            &serial[2..10],
            &[BIT_1, BIT_0, BIT_0, BIT_0, BIT_1, BIT_1, BIT_1, BIT_1]
        );
        assert!(serial[2..].iter().all(|&w| w == BIT_0 || w == BIT_1));
    }

    #[test]
    fn test_serial_recovers_parameters() {
        let (prm, erased) = serial_to_prm(&prm_to_serial(&KNOWN)).unwrap();
        assert_eq!(prm, KNOWN);
        assert!(!erased);
    }

    #[test]
    fn test_zero_slot_marks_erasure() {
        let mut serial = prm_to_serial(&KNOWN);
        serial[40] = 0;
        let (_, erased) = serial_to_prm(&serial).unwrap();
        assert!(erased);
    }

    #[test]
    fn test_only_bit_1_reads_as_one() {
        let mut serial = prm_to_serial(&KNOWN);
        assert_eq!(serial[2], BIT_1);
        serial[2] = 0x1234;
        serial[3] = -1;

        let (prm, erased) = serial_to_prm(&serial).unwrap();
        assert!(!erased);
        assert_eq!(prm[0], KNOWN[0] & 0x7f);
        assert_eq!(prm[1..], KNOWN[1..]);
    }

    #[test]
    fn test_serial_length_is_checked() {
        let serial = prm_to_serial(&KNOWN);
        let err = serial_to_prm(&serial[..81]).unwrap_err();
        assert_eq!(err, CodecError::insufficient_data(SERIAL_SIZE, 81));
    }

    #[test]
    fn test_payload_layout() {
        let mut prm = [0u16; PRM_SIZE];
        prm[0] = 0xff;
        let bytes = prm_to_bytes(&prm);
        assert_eq!(bytes[0], 0xff);
        assert!(bytes[1..].iter().all(|&b| b == 0));

        let mut prm = [0u16; PRM_SIZE];
        prm[10] = 0x7f;
        let bytes = prm_to_bytes(&prm);
        assert_eq!(bytes[9], 0x7f);
    }

    #[test]
    fn test_payload_recovers_parameters() {
        assert_eq!(bytes_to_prm(&prm_to_bytes(&KNOWN)).unwrap(), KNOWN);
    }

    #[test]
    fn test_payload_length_is_checked() {
        assert!(matches!(
            bytes_to_prm(&[0u8; 9]),
            Err(CodecError::InvalidPayload { .. })
        ));
    }

    #[test]
    fn test_bit_budget() {
        assert_eq!(BITSNO.iter().sum::<usize>(), BITS_PER_FRAME);
        assert_eq!(SERIAL_SIZE, BITS_PER_FRAME + 2);
    }
}

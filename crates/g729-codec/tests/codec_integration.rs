//! End-to-end G.729 encoder/decoder tests
//!
//! This suite runs whole streams through the codec:
//! - LSP stability of the decoded spectrum on sine, silence and noise
//! - Frame erasure and parity concealment
//! - Arbitrary payloads never break the decoder

use g729_codec::codecs::g729::bitstream::{prm_to_serial, serial_to_prm};
use g729_codec::codecs::g729::constants::{GAP3, L_FRAME, M, M_LIMIT, SERIAL_SIZE};
use g729_codec::{AudioCodec, CodecConfig, CodecError, CodecFactory, G729Decoder, G729Encoder};
use proptest::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

fn sine(frames: usize, freq: f32, amp: f32) -> Vec<i16> {
    (0..frames * L_FRAME)
        .map(|n| (amp * (2.0 * std::f32::consts::PI * freq * n as f32 / 8000.0).sin()) as i16)
        .collect()
}

fn noise(frames: usize, seed: u64) -> Vec<i16> {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..frames * L_FRAME).map(|_| rng.gen_range(-6000..6000)).collect()
}

fn assert_stable(lsf: &[f32; M]) {
    assert!(lsf[0] > 0.0, "{:?}", lsf);
    assert!(lsf[M - 1] <= M_LIMIT + 1e-4, "{:?}", lsf);
    for pair in lsf.windows(2) {
        assert!(pair[1] - pair[0] >= GAP3 - 1e-4, "{:?}", lsf);
    }
}

fn run_stream(pcm: &[i16]) -> (G729Decoder, Vec<i16>) {
    let mut encoder = G729Encoder::new();
    let mut decoder = G729Decoder::new();
    let mut out = Vec::with_capacity(pcm.len());

    for frame in pcm.chunks_exact(L_FRAME) {
        let payload = encoder.encode(frame).unwrap();
        out.extend_from_slice(&decoder.decode_payload(&payload).unwrap());
        assert_stable(&decoder.last_lsf());
    }
    (decoder, out)
}

#[test]
fn test_lsp_stability_on_sine() {
    let (decoder, out) = run_stream(&sine(40, 200.0, 8000.0));
    assert_eq!(decoder.frame_count(), 40);
    assert!(out.iter().any(|&s| s.unsigned_abs() > 1000));
}

#[test]
fn test_lsp_stability_on_silence() {
    let (_, out) = run_stream(&vec![0i16; 20 * L_FRAME]);
    assert!(out.iter().all(|&s| s.unsigned_abs() < 256));
}

#[test]
fn test_lsp_stability_on_noise() {
    let (_, out) = run_stream(&noise(40, 42));
    assert_eq!(out.len(), 40 * L_FRAME);
}

#[test]
fn test_full_scale_input_does_not_overflow() {
    let pcm: Vec<i16> = (0..20 * L_FRAME)
        .map(|n| if (n / 20) % 2 == 0 { i16::MAX } else { i16::MIN })
        .collect();
    let (_, out) = run_stream(&pcm);
    assert_eq!(out.len(), pcm.len());
}

#[test]
fn test_erasure_concealment_and_recovery() {
    let pcm = sine(30, 300.0, 6000.0);
    let mut encoder = G729Encoder::new();
    let mut decoder = G729Decoder::new();

    for (n, frame) in pcm.chunks_exact(L_FRAME).enumerate() {
        let serial = encoder.encode_serial(frame).unwrap();
        let lost = (10..14).contains(&n);

        let before = decoder.last_lsf();
        let history = decoder.lsp_history().clone();
        let out = decoder.decode_serial(&serial, lost).unwrap();

        if lost {
            assert_eq!(decoder.last_lsf(), before);
            assert_ne!(decoder.lsp_history(), &history);
        }
        assert_stable(&decoder.last_lsf());
        assert_eq!(out.len(), L_FRAME);
    }
    assert_eq!(decoder.frame_count(), 30);
}

#[test]
fn test_concealed_energy_decays() {
    let pcm = sine(20, 250.0, 8000.0);
    let mut encoder = G729Encoder::new();
    let mut decoder = G729Decoder::new();
    for frame in pcm.chunks_exact(L_FRAME) {
        let payload = encoder.encode(frame).unwrap();
        decoder.decode_payload(&payload).unwrap();
    }

    let energy = |pcm: &[i16]| pcm.iter().map(|&s| f64::from(s) * f64::from(s)).sum::<f64>();
    let first = energy(&decoder.conceal());
    let mut last = first;
    for _ in 0..40 {
        last = energy(&decoder.conceal());
    }
    assert!(last < first, "{} !< {}", last, first);
}

#[test]
fn test_bad_parity_is_concealed() {
    let pcm = sine(8, 180.0, 7000.0);
    let mut encoder = G729Encoder::new();
    let mut decoder = G729Decoder::new();

    for (n, frame) in pcm.chunks_exact(L_FRAME).enumerate() {
        let mut serial = encoder.encode_serial(frame).unwrap();
        if n == 5 {
            // parity bit follows the 18 LSP bits and the 8 bit lag
            let slot = 2 + 18 + 8;
            serial[slot] = if serial[slot] == 0x7f { 0x81 } else { 0x7f };
            let before = decoder.pitch_delay();
            decoder.decode_serial(&serial, false).unwrap();
            let delay = decoder.pitch_delay();
            assert!((20..=143).contains(&delay));
            assert!(delay + 9 >= before, "{} after {}", delay, before);
        } else {
            decoder.decode_serial(&serial, false).unwrap();
        }
    }
}

#[test]
fn test_serial_frame_layout() {
    let mut encoder = G729Encoder::new();
    let serial = encoder.encode_serial(&sine(1, 440.0, 5000.0)).unwrap();
    assert_eq!(serial.len(), SERIAL_SIZE);
    assert_eq!(serial[0], 0x6b21);
    assert_eq!(serial[1], 80);
    assert!(serial[2..].iter().all(|&w| w == 0x7f || w == 0x81));

    let (prm, erased) = serial_to_prm(&serial).unwrap();
    assert!(!erased);
    assert_eq!(prm_to_serial(&prm), serial);
}

#[test]
fn test_short_serial_frame_is_an_error() {
    let mut decoder = G729Decoder::new();
    assert_eq!(
        decoder.decode_serial(&[0x7f; 40], false),
        Err(CodecError::InsufficientData {
            needed: 82,
            actual: 40
        })
    );
}

#[test]
fn test_factory_codec_round_trip() {
    let mut codec = CodecFactory::create(CodecConfig::g729()).unwrap();
    let pcm = sine(10, 440.0, 8000.0);
    let payload = codec.encode(&pcm).unwrap();
    assert_eq!(payload.len(), 100);
    let out = codec.decode(&payload).unwrap();
    assert_eq!(out.len(), pcm.len());
}

proptest! {
    #[test]
    fn prop_arbitrary_payloads_decode(frames in prop::collection::vec(prop::array::uniform10(any::<u8>()), 1..8)) {
        let mut decoder = G729Decoder::new();
        for payload in &frames {
            let out = decoder.decode_payload(payload).unwrap();
            prop_assert_eq!(out.len(), L_FRAME);
            assert_stable(&decoder.last_lsf());
        }
    }

    #[test]
    fn prop_arbitrary_pcm_encodes(pcm in prop::collection::vec(any::<i16>(), L_FRAME * 3)) {
        let mut encoder = G729Encoder::new();
        for frame in pcm.chunks_exact(L_FRAME) {
            let payload = encoder.encode(frame).unwrap();
            prop_assert_eq!(payload.len(), 10);
        }
    }
}

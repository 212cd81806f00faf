//! G.729 Decoder
//!
//! Rebuilds speech from the 11 frame parameters and hides lost frames:
//! - An erased frame repeats the last LSFs and draws random codebook indices
//! - A bad pitch parity or an erasure reuses the previous lag, stepping it by
//!   one sample per subframe
//! - The last postfilter voicing decision selects which gain survives an
//!   erasure

use bytes::{BufMut, Bytes, BytesMut};
use tracing::{debug, trace, warn};

use super::acelp::{decod_acelp, sharpen};
use super::bitstream::{bytes_to_prm, serial_to_prm, Params};
use super::constants::{
    INIT_SEED, INIT_T0, L_FRAME, L_INTERPOL, L_SUBFR, LSP_INIT, M, PIT_MAX, PRM_SIZE, SHARPMAX,
    SHARPMIN,
};
use super::filter::{int_qlpc, syn_filt};
use super::gain::GainDecoder;
use super::lsp_dec::LspDecoderState;
use super::lsp_quant::MaHistory;
use super::pitch::{check_parity_pitch, dec_lag3, pred_lt_3};
use super::postfilter::PostFilter;
use super::preproc::HighPass;
use crate::error::Result;
use crate::types::G729Parameters;

/// First sample of the current frame in the excitation buffer
const EXC: usize = PIT_MAX + L_INTERPOL;

/// G.729 decoder state for one stream
#[derive(Debug, Clone)]
pub struct G729Decoder {
    /// Excitation with enough history for the longest interpolated lag
    old_exc: [f32; L_FRAME + PIT_MAX + L_INTERPOL],
    /// Synthesis output with the `M` previous samples in front
    synth_buf: [f32; L_FRAME + M],
    /// LSPs of the previous frame
    lsp_old: [f32; M],
    lsp_decoder: LspDecoderState,
    gain_decoder: GainDecoder,
    post_filter: PostFilter,
    post_proc: HighPass,
    postfilter: bool,
    /// Pitch sharpening factor of the previous subframe
    sharp: f32,
    /// Integer lag reused by concealment
    old_t0: usize,
    /// Last voicing decision of the postfilter, 0 when unvoiced
    voicing: usize,
    seed: i16,
    frame_count: u64,
}

impl Default for G729Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl G729Decoder {
    /// Create a decoder with the default parameters
    pub fn new() -> Self {
        Self::with_parameters(&G729Parameters::default())
    }

    /// Create a decoder honouring `params.postfilter`
    pub fn with_parameters(params: &G729Parameters) -> Self {
        debug!("Creating G.729 decoder: postfilter={}", params.postfilter);

        Self {
            old_exc: [0.0; L_FRAME + PIT_MAX + L_INTERPOL],
            synth_buf: [0.0; L_FRAME + M],
            lsp_old: LSP_INIT,
            lsp_decoder: LspDecoderState::new(),
            gain_decoder: GainDecoder::default(),
            post_filter: PostFilter::new(),
            post_proc: HighPass::post_process(),
            postfilter: params.postfilter,
            sharp: SHARPMIN,
            old_t0: INIT_T0,
            voicing: INIT_T0,
            seed: INIT_SEED,
            frame_count: 0,
        }
    }

    /// Return to the initial state, keeping the parameters
    pub fn reset(&mut self) {
        *self = Self::with_parameters(&G729Parameters {
            postfilter: self.postfilter,
            ..G729Parameters::default()
        });
        debug!("G.729 decoder reset");
    }

    /// Number of frames decoded since creation or the last reset
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// LSF vector (radians) of the last correctly received frame
    pub fn last_lsf(&self) -> [f32; M] {
        *self.lsp_decoder.prev_lsf()
    }

    /// MA prediction history of the LSP decoder
    pub fn lsp_history(&self) -> &MaHistory {
        self.lsp_decoder.history()
    }

    /// Integer lag that concealment would use next
    pub fn pitch_delay(&self) -> usize {
        self.old_t0
    }

    /// Last voicing decision, 0 when unvoiced
    pub fn voicing(&self) -> usize {
        self.voicing
    }

    /// Decode an 82-word serial frame
    ///
    /// The frame is treated as erased when `erased` is set or when any bit
    /// slot holds 0.
    pub fn decode_serial(&mut self, serial: &[i16], erased: bool) -> Result<[i16; L_FRAME]> {
        let (prm, lost) = serial_to_prm(serial)?;
        Ok(self.decode_params(&prm, erased || lost))
    }

    /// Decode a packed 10-byte payload
    pub fn decode_payload(&mut self, data: &[u8]) -> Result<[i16; L_FRAME]> {
        let prm = bytes_to_prm(data)?;
        Ok(self.decode_params(&prm, false))
    }

    /// Decode a packed payload into 160 little-endian bytes
    pub fn decode_to_bytes(&mut self, data: &[u8]) -> Result<Bytes> {
        let pcm = self.decode_payload(data)?;

        let mut out = BytesMut::with_capacity(2 * L_FRAME);
        for &s in pcm.iter() {
            out.put_i16_le(s);
        }
        Ok(out.freeze())
    }

    /// Produce one frame for a packet that never arrived
    pub fn conceal(&mut self) -> [i16; L_FRAME] {
        self.decode_params(&[0u16; PRM_SIZE], true)
    }

    /// Decode one frame of parameters
    pub fn decode_params(&mut self, prm: &Params, erased: bool) -> [i16; L_FRAME] {
        self.frame_count += 1;

        let bad_pitch = erased || check_parity_pitch(prm[2], prm[3]);
        if erased {
            warn!("G.729 frame {} erased, concealing", self.frame_count);
        } else if bad_pitch {
            warn!(
                "G.729 pitch parity error in frame {}, repeating lag {}",
                self.frame_count, self.old_t0
            );
        }

        let lsp_new = self.lsp_decoder.d_lsp([prm[0], prm[1]], erased);
        let az = int_qlpc(&self.lsp_old, &lsp_new);
        self.lsp_old = lsp_new;

        let mut t0_first = self.old_t0;
        let mut ana = 2;
        for (k, i_subfr) in (0..L_FRAME).step_by(L_SUBFR).enumerate() {
            let index = prm[ana];
            ana += 1;

            let (t0, frac) = if k == 0 {
                ana += 1;
                if bad_pitch {
                    self.repeat_lag()
                } else {
                    let (t0, frac) = dec_lag3(index, i_subfr, 0);
                    self.old_t0 = t0;
                    (t0, frac)
                }
            } else if erased {
                self.repeat_lag()
            } else {
                let (t0, frac) = dec_lag3(index, i_subfr, t0_first);
                self.old_t0 = t0;
                (t0, frac)
            };
            if k == 0 {
                t0_first = t0;
            }

            let exc = EXC + i_subfr;
            pred_lt_3(&mut self.old_exc, exc, t0, frac);

            let (position, sign) = if erased {
                let position = self.random() & 0x1fff;
                let sign = self.random() & 0x000f;
                (position as u16, sign as u16)
            } else {
                (prm[ana], prm[ana + 1])
            };
            ana += 2;

            let mut code = decod_acelp(sign, position);
            sharpen(&mut code, t0, self.sharp);

            let (gain_pit, gain_code) = self.gain_decoder.dec_gain(prm[ana], &code, erased);
            ana += 1;
            self.sharp = gain_pit.clamp(SHARPMIN, SHARPMAX);

            let excitation = &mut self.old_exc[exc..exc + L_SUBFR];
            for (e, &c) in excitation.iter_mut().zip(code.iter()) {
                *e = if !erased {
                    gain_pit * *e + gain_code * c
                } else if self.voicing == 0 {
                    gain_code * c
                } else {
                    gain_pit * *e
                };
            }

            let mut mem = [0.0f32; M];
            mem.copy_from_slice(&self.synth_buf[i_subfr..i_subfr + M]);
            let mut synth = [0.0f32; L_SUBFR];
            syn_filt(&az[k], &self.old_exc[exc..exc + L_SUBFR], &mut synth, &mem);
            self.synth_buf[M + i_subfr..M + i_subfr + L_SUBFR].copy_from_slice(&synth);
        }

        let mut pst_out = [0.0f32; L_FRAME];
        if self.postfilter {
            let mut voicing = 0;
            for (k, i_subfr) in (0..L_FRAME).step_by(L_SUBFR).enumerate() {
                let mut out = [0.0f32; L_SUBFR];
                let vo = self.post_filter.post(
                    t0_first,
                    &self.synth_buf[i_subfr..i_subfr + M + L_SUBFR],
                    &az[k],
                    &mut out,
                );
                if vo != 0 {
                    voicing = vo;
                }
                pst_out[i_subfr..i_subfr + L_SUBFR].copy_from_slice(&out);
            }
            self.voicing = voicing;
        } else {
            pst_out.copy_from_slice(&self.synth_buf[M..]);
        }

        self.synth_buf.copy_within(L_FRAME.., 0);
        self.old_exc.copy_within(L_FRAME.., 0);

        self.post_proc.filter(&mut pst_out);

        let mut pcm = [0i16; L_FRAME];
        for (dst, &s) in pcm.iter_mut().zip(pst_out.iter()) {
            *dst = s.round().clamp(-32768.0, 32767.0) as i16;
        }

        trace!(
            "G.729 decoded frame {}: t0={} voicing={}",
            self.frame_count, t0_first, self.voicing
        );
        pcm
    }

    fn repeat_lag(&mut self) -> (usize, i32) {
        let t0 = self.old_t0;
        self.old_t0 = (self.old_t0 + 1).min(PIT_MAX);
        (t0, 0)
    }

    /// Linear congruential generator of the concealment codebook indices
    fn random(&mut self) -> i16 {
        self.seed = self.seed.wrapping_mul(31821).wrapping_add(13849);
        self.seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codecs::g729::bitstream::{prm_to_bytes, prm_to_serial};
    use crate::codecs::g729::constants::{BIT_1, PIT_MIN, SERIAL_SIZE};
    use crate::codecs::g729::encoder::G729Encoder;
    use crate::codecs::g729::pitch::parity_pitch;
    use crate::error::CodecError;

    fn speech_like(frames: usize) -> Vec<[i16; L_FRAME]> {
        (0..frames)
            .map(|f| {
                let mut frame = [0i16; L_FRAME];
                for (i, s) in frame.iter_mut().enumerate() {
                    let t = (f * L_FRAME + i) as f32 / 8000.0;
                    let v = 5000.0 * (2.0 * std::f32::consts::PI * 220.0 * t).sin()
                        + 2000.0 * (2.0 * std::f32::consts::PI * 660.0 * t).sin();
                    *s = v as i16;
                }
                frame
            })
            .collect()
    }

    fn encoded(frames: usize) -> Vec<Params> {
        let mut encoder = G729Encoder::new();
        speech_like(frames)
            .iter()
            .map(|f| encoder.analyze(f).unwrap())
            .collect()
    }

    #[test]
    fn test_random_sequence() {
        let mut decoder = G729Decoder::new();
        assert_eq!(decoder.random(), 3242);
        assert_eq!(decoder.random(), 23867);
    }

    #[test]
    fn test_silent_payload_decodes_to_small_output() {
        let mut encoder = G729Encoder::new();
        let mut decoder = G729Decoder::new();
        for _ in 0..5 {
            let payload = encoder.encode(&[0i16; L_FRAME]).unwrap();
            let pcm = decoder.decode_payload(&payload).unwrap();
            assert!(pcm.iter().all(|s| s.unsigned_abs() < 256), "{:?}", pcm);
        }
        assert_eq!(decoder.frame_count(), 5);
    }

    #[test]
    fn test_serial_and_payload_paths_agree() {
        let mut by_serial = G729Decoder::new();
        let mut by_payload = G729Decoder::new();
        for prm in encoded(6) {
            let a = by_serial.decode_serial(&prm_to_serial(&prm), false).unwrap();
            let b = by_payload.decode_payload(&prm_to_bytes(&prm)).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_zero_slot_marks_frame_erased() {
        let prms = encoded(4);
        let mut flagged = G729Decoder::new();
        let mut zeroed = G729Decoder::new();

        for (n, prm) in prms.iter().enumerate() {
            let mut serial = prm_to_serial(prm);
            let erase = n == 3;
            if erase {
                serial[20] = 0;
            }
            let a = flagged.decode_serial(&prm_to_serial(prm), erase).unwrap();
            let b = zeroed.decode_serial(&serial, false).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_malformed_input_is_rejected() {
        let mut decoder = G729Decoder::new();
        assert_eq!(
            decoder.decode_serial(&[BIT_1; SERIAL_SIZE - 1], false),
            Err(CodecError::insufficient_data(SERIAL_SIZE, SERIAL_SIZE - 1))
        );
        assert!(matches!(
            decoder.decode_payload(&[0u8; 9]),
            Err(CodecError::InvalidPayload { .. })
        ));
        assert_eq!(decoder.frame_count(), 0);
    }

    #[test]
    fn test_erasure_repeats_lsf_and_advances_history() {
        let mut decoder = G729Decoder::new();
        for prm in encoded(5) {
            decoder.decode_params(&prm, false);
        }

        let lsf = decoder.last_lsf();
        let history = decoder.lsp_history().clone();
        let pcm = decoder.conceal();

        assert_eq!(decoder.last_lsf(), lsf);
        assert_ne!(decoder.lsp_history().rows(), history.rows());
        assert!(pcm.iter().any(|&s| s != 0));
    }

    #[test]
    fn test_bad_parity_repeats_lag() {
        let mut decoder = G729Decoder::new();
        let mut prm = [0u16; PRM_SIZE];
        // first subframe lag 60 at fraction 0
        prm[2] = 3 * 60 - 58;
        prm[3] = parity_pitch(prm[2]);
        prm[7] = 2;
        decoder.decode_params(&prm, false);
        assert_eq!(decoder.pitch_delay(), 55);

        prm[2] = 3 * 70 - 58;
        prm[3] = 1 - parity_pitch(prm[2]);
        decoder.decode_params(&prm, false);
        // the first subframe repeats 55, the second decodes around it
        assert_eq!(decoder.pitch_delay(), 50);
    }

    #[test]
    fn test_second_lag_below_window_decodes() {
        let mut decoder = G729Decoder::new();
        let mut prm = [0u16; PRM_SIZE];
        prm[2] = 3 * 60 - 58;
        prm[3] = parity_pitch(prm[2]);
        prm[7] = 0;

        let payload = prm_to_bytes(&prm);
        assert!(decoder.decode_payload(&payload).is_ok());
        assert_eq!(decoder.pitch_delay(), 54);

        // same thing with the window pinned at the bottom of the lag range
        prm[2] = 3 * 20 - 58;
        prm[3] = parity_pitch(prm[2]);
        decoder.decode_params(&prm, false);
        assert_eq!(decoder.pitch_delay(), PIT_MIN - 1);
    }

    #[test]
    fn test_erased_lags_count_up_to_pit_max() {
        let mut decoder = G729Decoder::new();
        assert_eq!(decoder.pitch_delay(), INIT_T0);
        decoder.conceal();
        assert_eq!(decoder.pitch_delay(), INIT_T0 + 2);

        for _ in 0..60 {
            decoder.conceal();
        }
        assert_eq!(decoder.pitch_delay(), PIT_MAX);
    }

    #[test]
    fn test_decode_to_bytes_is_little_endian_pcm() {
        let prms = encoded(3);
        let mut a = G729Decoder::new();
        let mut b = G729Decoder::new();
        for prm in prms {
            let payload = prm_to_bytes(&prm);
            let pcm = a.decode_payload(&payload).unwrap();
            let bytes = b.decode_to_bytes(&payload).unwrap();
            assert_eq!(bytes.len(), 2 * L_FRAME);
            for (i, s) in pcm.iter().enumerate() {
                assert_eq!(i16::from_le_bytes([bytes[2 * i], bytes[2 * i + 1]]), *s);
            }
        }
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let prms = encoded(4);
        let mut decoder = G729Decoder::new();
        let first: Vec<_> = prms.iter().map(|p| decoder.decode_params(p, false)).collect();

        decoder.reset();
        assert_eq!(decoder.voicing(), INIT_T0);
        let second: Vec<_> = prms.iter().map(|p| decoder.decode_params(p, false)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_without_postfilter_voicing_is_kept() {
        let mut decoder = G729Decoder::with_parameters(&G729Parameters {
            postfilter: false,
            ..G729Parameters::default()
        });
        for prm in encoded(4) {
            decoder.decode_params(&prm, false);
        }
        assert_eq!(decoder.voicing(), INIT_T0);
    }
}

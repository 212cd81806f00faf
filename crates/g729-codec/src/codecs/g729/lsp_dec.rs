//! LSP decoding (decoder side)

use super::constants::{M, NC0, NC0_B, NC1, NC1_B};
use super::lpc::lsf_lsp;
use super::lsp_quant::{lsp_get_quant, MaHistory};
use super::tables::FREQ_PREV_RESET;

/// Decoder side LSP state
///
/// Keeps the MA history plus the last good LSF vector and predictor mode,
/// which stand in for lost frames.
#[derive(Debug, Clone)]
pub struct LspDecoderState {
    history: MaHistory,
    prev_lsf: [f32; M],
    prev_ma: usize,
}

impl Default for LspDecoderState {
    fn default() -> Self {
        Self {
            history: MaHistory::default(),
            prev_lsf: *FREQ_PREV_RESET,
            prev_ma: 0,
        }
    }
}

impl LspDecoderState {
    /// Create a decoder with a freshly reset MA history
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset (`lsp_decw_reset`)
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// MA history, for inspection
    pub fn history(&self) -> &MaHistory {
        &self.history
    }

    /// Last decoded LSF vector (radians)
    pub fn prev_lsf(&self) -> &[f32; M] {
        &self.prev_lsf
    }

    /// Decode the LSF vector of one frame (radians)
    ///
    /// On erasure the previous LSFs are repeated and the MA history is
    /// advanced with the residual that would have produced them.
    pub fn lsp_iqua_cs(&mut self, codes: [u16; 2], erased: bool) -> [f32; M] {
        if erased {
            let buf = self.history.extract(&self.prev_lsf, self.prev_ma);
            self.history.update(&buf);
            return self.prev_lsf;
        }

        let code0 = usize::from(codes[0]);
        let code1 = usize::from(codes[1]);
        let mode = (code0 >> NC0_B) & 1;
        let cand = code0 & (NC0 - 1);
        let idx1 = (code1 >> NC1_B) & (NC1 - 1);
        let idx2 = code1 & (NC1 - 1);

        let lsf = lsp_get_quant(&mut self.history, mode, cand, idx1, idx2);
        self.prev_lsf = lsf;
        self.prev_ma = mode;
        lsf
    }

    /// Decode the LSPs of one frame (cosine domain)
    pub fn d_lsp(&mut self, codes: [u16; 2], erased: bool) -> [f32; M] {
        lsf_lsp(&self.lsp_iqua_cs(codes, erased))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codecs::g729::constants::{GAP3, L_LIMIT, M_LIMIT};
    use crate::codecs::g729::lpc::lsp_lsf;
    use crate::codecs::g729::lsp_quant::LspEncoderState;

    #[test]
    fn test_erasure_repeats_lsf_and_advances_history() {
        let mut dec = LspDecoderState::new();
        let good = dec.lsp_iqua_cs([0x25, 0x1a3], false);
        let history_before = dec.history().clone();

        let concealed = dec.lsp_iqua_cs([0, 0], true);
        assert_eq!(concealed, good);
        assert_ne!(dec.history(), &history_before);
        assert_eq!(dec.history().rows()[1], history_before.rows()[0]);
    }

    #[test]
    fn test_decoder_mirrors_encoder() {
        let mut enc = LspEncoderState::new();
        let mut dec = LspDecoderState::new();
        let lsf = [0.2, 0.35, 0.7, 1.0, 1.3, 1.65, 1.95, 2.3, 2.55, 2.85];
        for _ in 0..4 {
            let (lsp_q, codes) = enc.qua_lsp(&lsf_lsp(&lsf));
            let lsp_d = dec.d_lsp(codes, false);
            assert_eq!(lsp_q, lsp_d);
        }
        assert_eq!(enc.history(), dec.history());
    }

    #[test]
    fn test_every_index_decodes_to_a_stable_vector() {
        let mut dec = LspDecoderState::new();
        for code0 in (0u16..256).step_by(7) {
            for code1 in (0u16..1024).step_by(97) {
                let lsf = lsp_lsf(&dec.d_lsp([code0, code1], false));
                assert!(lsf[0] >= L_LIMIT * 0.999);
                assert!(lsf[M - 1] <= M_LIMIT * 1.001);
                for j in 1..M {
                    assert!(lsf[j] > lsf[j - 1] + GAP3 * 0.99);
                }
            }
        }
    }
}

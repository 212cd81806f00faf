//! LSP quantization (encoder side)
//!
//! Two-stage split vector quantization of the LSFs with a switched 4th
//! order moving-average predictor:
//! 1. For both predictor modes, remove the MA prediction from the target
//! 2. Pick the nearest first stage vector (128 entries)
//! 3. Refine the lower and upper halves with the 32-entry second stage
//! 4. Keep the mode with the lower weighted distortion
//!
//! The reconstruction helpers are shared with the decoder.

use super::constants::*;
use super::lpc::{lsf_lsp, lsp_lsf};
use super::tables::{FG, FG_SUM, FG_SUM_INV, FREQ_PREV_RESET, LSPCB1, LSPCB2};

/// Moving-average prediction history: the last `MA_NP` quantizer residuals
#[derive(Debug, Clone, PartialEq)]
pub struct MaHistory {
    freq_prev: [[f32; M]; MA_NP],
}

impl Default for MaHistory {
    fn default() -> Self {
        Self {
            freq_prev: [*FREQ_PREV_RESET; MA_NP],
        }
    }
}

impl MaHistory {
    /// Reset every row to the equally spaced LSF vector
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Past residuals, most recent first
    pub fn rows(&self) -> &[[f32; M]; MA_NP] {
        &self.freq_prev
    }

    /// Add the MA prediction of `mode` to a residual
    pub fn compose(&self, buf: &[f32; M], mode: usize) -> [f32; M] {
        let mut lsf = [0.0f32; M];
        for j in 0..M {
            let mut v = buf[j] * FG_SUM[mode][j];
            for k in 0..MA_NP {
                v += self.freq_prev[k][j] * FG[mode][k][j];
            }
            lsf[j] = v;
        }
        lsf
    }

    /// Recover the residual that `compose` would turn into `lsf`
    pub fn extract(&self, lsf: &[f32; M], mode: usize) -> [f32; M] {
        let mut buf = [0.0f32; M];
        for j in 0..M {
            let mut v = lsf[j];
            for k in 0..MA_NP {
                v -= self.freq_prev[k][j] * FG[mode][k][j];
            }
            buf[j] = v * FG_SUM_INV[mode][j];
        }
        buf
    }

    /// Shift a new residual into the history
    pub fn update(&mut self, buf: &[f32; M]) {
        for k in (1..MA_NP).rev() {
            self.freq_prev[k] = self.freq_prev[k - 1];
        }
        self.freq_prev[0] = *buf;
    }
}

/// Push apart neighbours in `buf[range]` closer than `gap`
fn expand(buf: &mut [f32; M], gap: f32, range: std::ops::Range<usize>) {
    for j in range {
        let tmp = (buf[j - 1] - buf[j] + gap) * 0.5;
        if tmp > 0.0 {
            buf[j - 1] -= tmp;
            buf[j] += tmp;
        }
    }
}

fn expand_1(buf: &mut [f32; M], gap: f32) {
    expand(buf, gap, 1..NC);
}

fn expand_2(buf: &mut [f32; M], gap: f32) {
    expand(buf, gap, NC..M);
}

fn expand_1_2(buf: &mut [f32; M], gap: f32) {
    expand(buf, gap, 1..M);
}

/// Make an LSF vector ordered, bounded and well separated
///
/// After this pass the vector is strictly increasing, lies in
/// `[L_LIMIT, M_LIMIT]` and neighbours are at least `GAP3` apart.
pub fn lsp_stability(buf: &mut [f32; M]) {
    for j in 0..M - 1 {
        if buf[j + 1] - buf[j] < 0.0 {
            buf.swap(j, j + 1);
        }
    }

    if buf[0] < L_LIMIT {
        buf[0] = L_LIMIT;
        tracing::trace!("LSF clamped at the low limit");
    }

    for j in 0..M - 1 {
        if buf[j + 1] - buf[j] < GAP3 {
            buf[j + 1] = buf[j] + GAP3;
        }
    }

    if buf[M - 1] > M_LIMIT {
        buf[M - 1] = M_LIMIT;
        tracing::trace!("LSF clamped at the high limit");
        for j in (1..M).rev() {
            if buf[j] - buf[j - 1] < GAP3 {
                buf[j - 1] = buf[j] - GAP3;
            }
        }
    }
}

/// Rebuild a quantized LSF vector from its codebook indices
///
/// Updates the MA history with the reconstructed residual.
pub fn lsp_get_quant(
    history: &mut MaHistory,
    mode: usize,
    code0: usize,
    code1: usize,
    code2: usize,
) -> [f32; M] {
    let cb1 = &LSPCB1[code0];
    let mut buf = [0.0f32; M];
    for j in 0..NC {
        buf[j] = cb1[j] + LSPCB2[code1][j];
    }
    for j in NC..M {
        buf[j] = cb1[j] + LSPCB2[code2][j];
    }

    expand_1_2(&mut buf, GAP1);
    expand_1_2(&mut buf, GAP2);

    let mut lsf = history.compose(&buf, mode);
    history.update(&buf);
    lsp_stability(&mut lsf);
    lsf
}

/// Perceptual weights of the quantization error
///
/// Coefficients next to closely spaced neighbours weigh more.
fn get_wegt(flsp: &[f32; M]) -> [f32; M] {
    let weight = |tmp: f32| if tmp > 0.0 { 1.0 } else { tmp * tmp * CONST10 + 1.0 };

    let mut wegt = [0.0f32; M];
    wegt[0] = weight(flsp[1] - PI04 - 1.0);
    for i in 1..M - 1 {
        wegt[i] = weight(flsp[i + 1] - flsp[i - 1] - 1.0);
    }
    wegt[M - 1] = weight(PI92 - flsp[M - 2] - 1.0);

    wegt[4] *= CONST12;
    wegt[5] *= CONST12;
    wegt
}

/// Nearest first stage entry by unweighted squared error
fn pre_select(rbuf: &[f32; M]) -> usize {
    let mut cand = 0;
    let mut dmin = f32::MAX;
    for (i, row) in LSPCB1.iter().enumerate() {
        let dist: f32 = rbuf.iter().zip(row.iter()).map(|(r, c)| (r - c) * (r - c)).sum();
        if dist < dmin {
            dmin = dist;
            cand = i;
        }
    }
    cand
}

/// Best second stage entry for `range` by weighted squared error
fn select_split(
    rbuf: &[f32; M],
    cb1: &[f32; M],
    wegt: &[f32; M],
    range: std::ops::Range<usize>,
) -> usize {
    let mut index = 0;
    let mut dmin = f32::MAX;
    for (k, row) in LSPCB2.iter().enumerate() {
        let mut dist = 0.0f32;
        for j in range.clone() {
            let tmp = rbuf[j] - cb1[j] - row[j];
            dist += wegt[j] * tmp * tmp;
        }
        if dist < dmin {
            dmin = dist;
            index = k;
        }
    }
    index
}

/// Encoder side LSP quantizer state
#[derive(Debug, Clone, Default)]
pub struct LspEncoderState {
    history: MaHistory,
}

impl LspEncoderState {
    /// Create a quantizer with a freshly reset MA history
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the MA history (`lsp_encw_reset`)
    pub fn reset(&mut self) {
        self.history.reset();
    }

    /// MA history, for inspection
    pub fn history(&self) -> &MaHistory {
        &self.history
    }

    /// Quantize a cosine domain LSP vector
    ///
    /// Returns the quantized LSPs and the two codes `L0|L1` (8 bits) and
    /// `L2|L3` (10 bits).
    pub fn qua_lsp(&mut self, lsp: &[f32; M]) -> ([f32; M], [u16; 2]) {
        let lsf = lsp_lsf(lsp);
        let wegt = get_wegt(&lsf);

        let mut cand = [0usize; MODE];
        let mut tindex1 = [0usize; MODE];
        let mut tindex2 = [0usize; MODE];
        let mut tdist = [0.0f32; MODE];

        for mode in 0..MODE {
            let rbuf = self.history.extract(&lsf, mode);

            let c = pre_select(&rbuf);
            let cb1 = &LSPCB1[c];
            cand[mode] = c;

            let mut buf = [0.0f32; M];
            let idx1 = select_split(&rbuf, cb1, &wegt, 0..NC);
            tindex1[mode] = idx1;
            for j in 0..NC {
                buf[j] = cb1[j] + LSPCB2[idx1][j];
            }
            expand_1(&mut buf, GAP1);

            let idx2 = select_split(&rbuf, cb1, &wegt, NC..M);
            tindex2[mode] = idx2;
            for j in NC..M {
                buf[j] = cb1[j] + LSPCB2[idx2][j];
            }
            expand_2(&mut buf, GAP1);
            expand_1_2(&mut buf, GAP2);

            tdist[mode] = (0..M)
                .map(|j| {
                    let tmp = (buf[j] - rbuf[j]) * FG_SUM[mode][j];
                    wegt[j] * tmp * tmp
                })
                .sum();
        }

        let mode = usize::from(tdist[1] < tdist[0]);

        let code0 = (mode << NC0_B) | cand[mode];
        let code1 = (tindex1[mode] << NC1_B) | tindex2[mode];

        let lsf_q = lsp_get_quant(&mut self.history, mode, cand[mode], tindex1[mode], tindex2[mode]);
        (lsf_lsp(&lsf_q), [code0 as u16, code1 as u16])
    }
}

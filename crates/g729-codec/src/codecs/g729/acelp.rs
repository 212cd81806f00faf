//! Algebraic (fixed) codebook
//!
//! A codeword has four unit pulses on interleaved tracks of a 40 sample
//! subframe. Track 3 covers both positions `5k+3` and `5k+4`.
//!
//! ```text
//! track 0: 0, 5, 10, 15, 20, 25, 30, 35
//! track 1: 1, 6, 11, 16, 21, 26, 31, 36
//! track 2: 2, 7, 12, 17, 22, 27, 32, 37
//! track 3: 3, 8, 13, 18, 23, 28, 33, 38
//!          4, 9, 14, 19, 24, 29, 34, 39
//! ```

use super::constants::{EXTRA_TIME, L_SUBFR, MAX_TIME, NB_PULSE, STEP, THRESHFCB};

/// Selected codeword of one subframe
#[derive(Debug, Clone)]
pub struct FixedCodeword {
    /// Pulse vector, pitch sharpened when the lag is below 40
    pub code: [f32; L_SUBFR],
    /// Codeword filtered by the weighted synthesis filter
    pub y: [f32; L_SUBFR],
    /// 13 bit position index
    pub index: u16,
    /// 4 bit sign index
    pub sign: u16,
}

/// Fixed codebook search with a complexity budget shared by both
/// subframes of a frame
#[derive(Debug, Clone)]
pub struct AcelpSearch {
    extra: i32,
}

impl Default for AcelpSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl AcelpSearch {
    /// Create a search with the full budget
    pub fn new() -> Self {
        Self { extra: EXTRA_TIME }
    }

    /// Restore the initial budget
    pub fn reset(&mut self) {
        self.extra = EXTRA_TIME;
    }

    /// Search the codeword that best matches the target `x`
    ///
    /// `h` is the impulse response of the weighted synthesis filter. When
    /// `t0` is shorter than the subframe both `h` and the resulting code are
    /// sharpened with `pitch_sharp`.
    pub fn codebook(
        &mut self,
        x: &[f32; L_SUBFR],
        h: &[f32; L_SUBFR],
        t0: usize,
        pitch_sharp: f32,
        i_subfr: usize,
    ) -> FixedCodeword {
        let mut h = *h;
        sharpen(&mut h, t0, pitch_sharp);

        let rr = cor_h(&h);
        let dn = cor_h_x(&h, x);
        let mut cw = self.d4i40_17(dn, rr, &h, i_subfr);

        sharpen(&mut cw.code, t0, pitch_sharp);
        cw
    }

    fn d4i40_17(
        &mut self,
        mut dn: [f32; L_SUBFR],
        mut rr: Box<[[f32; L_SUBFR]; L_SUBFR]>,
        h: &[f32; L_SUBFR],
        i_subfr: usize,
    ) -> FixedCodeword {
        if i_subfr == 0 {
            self.extra = EXTRA_TIME;
        }

        let mut p_sign = [1.0f32; L_SUBFR];
        for i in 0..L_SUBFR {
            if dn[i] < 0.0 {
                p_sign[i] = -1.0;
                dn[i] = -dn[i];
            }
        }

        // threshold on the first three tracks
        let mut average = 0.0f32;
        let mut max = [dn[0], dn[1], dn[2]];
        for i in (0..L_SUBFR).step_by(STEP) {
            for t in 0..3 {
                average += dn[i + t];
                if dn[i + t] > max[t] {
                    max[t] = dn[i + t];
                }
            }
        }
        let max0: f32 = max.iter().sum();
        let average = average * 0.125;
        let thres = average + (max0 - average) * THRESHFCB;

        for i in 0..L_SUBFR {
            for j in 0..L_SUBFR {
                rr[i][j] *= p_sign[i] * p_sign[j];
            }
        }

        let (mut ip0, mut ip1, mut ip2, mut ip3) = (0usize, 1usize, 2usize, 3usize);
        let mut psc = 0.0f32;
        let mut alpha = 1_000_000.0f32;
        let mut time = MAX_TIME + self.extra;

        'search: for i0 in (0..L_SUBFR).step_by(STEP) {
            let ps0 = dn[i0];
            let alp0 = rr[i0][i0];

            for i1 in (1..L_SUBFR).step_by(STEP) {
                let ps1 = ps0 + dn[i1];
                let alp1 = alp0 + rr[i1][i1] + 2.0 * rr[i0][i1];

                for i2 in (2..L_SUBFR).step_by(STEP) {
                    let ps2 = ps1 + dn[i2];
                    let alp2 = alp1 + rr[i2][i2] + 2.0 * (rr[i0][i2] + rr[i1][i2]);
                    if ps2 <= thres {
                        continue;
                    }

                    for i3 in (3..L_SUBFR).step_by(STEP).chain((4..L_SUBFR).step_by(STEP)) {
                        let ps3 = ps2 + dn[i3];
                        let alp3 =
                            alp2 + rr[i3][i3] + 2.0 * (rr[i1][i3] + rr[i0][i3] + rr[i2][i3]);
                        let ps3c = ps3 * ps3;
                        if ps3c * alpha > psc * alp3 {
                            psc = ps3c;
                            alpha = alp3;
                            (ip0, ip1, ip2, ip3) = (i0, i1, i2, i3);
                        }
                    }

                    time -= 1;
                    if time <= 0 {
                        break 'search;
                    }
                }
            }
        }
        self.extra = time;

        let pos = [ip0, ip1, ip2, ip3];
        let mut code = [0.0f32; L_SUBFR];
        let mut y = [0.0f32; L_SUBFR];
        let mut sign = 0u16;
        for (k, &p) in pos.iter().enumerate() {
            code[p] = p_sign[p];
            for (j, i) in (p..L_SUBFR).enumerate() {
                y[i] += p_sign[p] * h[j];
            }
            if p_sign[p] > 0.0 {
                sign |= 1 << k;
            }
        }

        let track3 = ((ip3 / 5) << 1) + (ip3 % 5 - 3);
        let index = (ip0 / 5) + ((ip1 / 5) << 3) + ((ip2 / 5) << 6) + (track3 << 9);

        FixedCodeword {
            code,
            y,
            index: index as u16,
            sign,
        }
    }
}

/// Pitch sharpening `v[n] += β·v[n - t0]`, a no-op for lags of a
/// subframe or more
pub fn sharpen(v: &mut [f32; L_SUBFR], t0: usize, pitch_sharp: f32) {
    for i in t0..L_SUBFR {
        v[i] += pitch_sharp * v[i - t0];
    }
}

/// Correlations of the impulse response truncated to the subframe
///
/// `rr[i][j] = Σ h[n] h[n + |i - j|]` for `n` up to `39 - max(i, j)`.
fn cor_h(h: &[f32; L_SUBFR]) -> Box<[[f32; L_SUBFR]; L_SUBFR]> {
    let mut rr = Box::new([[0.0f32; L_SUBFR]; L_SUBFR]);
    for d in 0..L_SUBFR {
        // walk the diagonal from the end so the sum grows one term per step
        let mut cor = 0.0f32;
        for n in 0..L_SUBFR - d {
            cor += h[n] * h[n + d];
            let j = L_SUBFR - 1 - n;
            let i = j - d;
            rr[i][j] = cor;
            rr[j][i] = cor;
        }
    }
    rr
}

/// Backward filtered target: `dn[n] = Σ x[i] h[i - n]` for `i >= n`
pub fn cor_h_x(h: &[f32; L_SUBFR], x: &[f32; L_SUBFR]) -> [f32; L_SUBFR] {
    let mut dn = [0.0f32; L_SUBFR];
    for (n, d) in dn.iter_mut().enumerate() {
        *d = (n..L_SUBFR).map(|i| x[i] * h[i - n]).sum();
    }
    dn
}

/// Rebuild the pulse vector from its indices
pub fn decod_acelp(sign: u16, index: u16) -> [f32; L_SUBFR] {
    let index = index as usize;
    let pos = [
        (index & 7) * 5,
        ((index >> 3) & 7) * 5 + 1,
        ((index >> 6) & 7) * 5 + 2,
        ((index >> 10) & 7) * 5 + 3 + ((index >> 9) & 1),
    ];

    let mut code = [0.0f32; L_SUBFR];
    for (k, &p) in pos.iter().enumerate().take(NB_PULSE) {
        code[p] = if (sign >> k) & 1 == 1 { 1.0 } else { -1.0 };
    }
    code
}

//! Adaptive postfilter
//!
//! Applied to each decoded subframe:
//!
//! 1. harmonic (long-term) filter on the `A(z/γ2)` residual, with the delay
//!    searched around the decoded pitch at 1/8 sample resolution
//! 2. short-term filter `A(z/γ2) / A(z/γ1)`, normalised by the sum of its
//!    impulse response
//! 3. tilt compensation `(1 + μz⁻¹) / (1 - |μ|)`
//! 4. gain control matching the output level to the input level
//!
//! Degenerate energies never fail: they switch the harmonic filter off or
//! zero the gain.

use super::constants::{
    AGC_FAC, AGC_FAC1, F_UP_PST, GAMMA1_PST, GAMMA2_PST, GAMMA3_MINUS, GAMMA3_PLUS, GAMMA_G,
    L_SUBFR, LH2_L, LH2_S, LH_UP_L, LH_UP_S, LONG_H_ST, M, MEM_RES2, MIN_ENER, MIN_GPLT, MP1,
    SIZ_RES2, THRESCRIT,
};
use super::filter::{residu, syn_filt, weight_az};
use super::tables::{TAB_HUP_L, TAB_HUP_S};

/// Postfilter state of one decoder
#[derive(Debug, Clone)]
pub struct PostFilter {
    /// Numerator coefficients, zero padded to the impulse response length
    apond2: [f32; LONG_H_ST],
    /// Memory of `1/A(z/γ1)`
    mem_stp: [f32; M],
    /// Null memory used for the impulse response
    mem_zero: [f32; M],
    /// `A(z/γ2)` residual with its history
    res2: [f32; SIZ_RES2],
    gain_prec: f32,
}

impl Default for PostFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of the harmonic delay search
struct LtpDelay {
    /// Integer part of the delay
    ltpdel: usize,
    /// Fractional part in 1/8 samples, subtracted from `ltpdel`
    phase: usize,
    num: f32,
    den: f32,
    /// Short filter outputs of every phase, one sample longer than a
    /// subframe so both neighbouring integer delays can be read
    y_up: [[f32; L_SUBFR + 1]; F_UP_PST - 1],
    off_yup: usize,
}

impl PostFilter {
    /// Create a postfilter with cleared memories and unit gain
    pub fn new() -> Self {
        Self {
            apond2: [0.0; LONG_H_ST],
            mem_stp: [0.0; M],
            mem_zero: [0.0; M],
            res2: [0.0; SIZ_RES2],
            gain_prec: 1.0,
        }
    }

    /// Clear all memories
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Gain applied to the last output sample
    pub fn gain_prec(&self) -> f32 {
        self.gain_prec
    }

    /// Postfilter one subframe
    ///
    /// `signal` holds `M` samples of history followed by the subframe.
    /// Returns the harmonic delay, or 0 when the subframe is unvoiced.
    pub fn post(
        &mut self,
        t0: usize,
        signal: &[f32],
        az: &[f32; MP1],
        out: &mut [f32; L_SUBFR],
    ) -> usize {
        debug_assert_eq!(signal.len(), M + L_SUBFR);

        let apond1 = weight_az(az, GAMMA1_PST);
        let apond2 = weight_az(az, GAMMA2_PST);
        self.apond2[..MP1].copy_from_slice(&apond2);

        residu(&apond2, signal, &mut self.res2[MEM_RES2..]);

        // sig_ltp[0] is the last output of 1/A(z/γ1)
        let mut sig_ltp = [0.0f32; L_SUBFR + 1];
        let vo = self.pst_ltp(t0, &mut sig_ltp[1..]);
        sig_ltp[0] = self.mem_stp[M - 1];

        let parcor0 = self.calc_st_filt(&apond1, &mut sig_ltp[1..]);

        let input = sig_ltp;
        self.mem_stp = syn_filt(&apond1, &input[1..], &mut sig_ltp[1..], &self.mem_stp);

        filt_mu(&sig_ltp, out, parcor0);
        self.gain_prec = scale_st(&signal[M..], out, self.gain_prec);

        self.res2.copy_within(L_SUBFR.., 0);
        vo
    }

    /// Harmonic filtering of the current residual into `out`
    fn pst_ltp(&self, t0: usize, out: &mut [f32]) -> usize {
        let cur = &self.res2[MEM_RES2..];

        let Some(del) = search_del(t0, &self.res2) else {
            out.copy_from_slice(cur);
            return 0;
        };

        let mut num = del.num;
        let mut den = del.den;
        let long;
        let y_up: &[f32] = if del.phase == 0 {
            &self.res2[MEM_RES2 - del.ltpdel..][..L_SUBFR]
        } else {
            let (y, num2, den2) = compute_ltp_l(&self.res2, del.ltpdel, del.phase);
            long = y;
            if select_ltp(num, den, num2, den2) {
                num = num2;
                den = den2;
                &long
            } else {
                &del.y_up[del.phase - 1][del.off_yup..][..L_SUBFR]
            }
        };

        filt_plt(cur, y_up, out, ltp_gain(num, den));
        del.ltpdel
    }

    /// Impulse response of `A(z/γ2) / A(z/γ1)`: scales `sig` by its
    /// absolute sum when above 1 and returns the first reflection
    /// coefficient
    fn calc_st_filt(&self, apond1: &[f32; MP1], sig: &mut [f32]) -> f32 {
        let mut h = [0.0f32; LONG_H_ST];
        syn_filt(apond1, &self.apond2, &mut h, &self.mem_zero);

        let parcor0 = calc_rc0_h(&h);

        let g0: f32 = h.iter().map(|v| v.abs()).sum();
        if g0 > 1.0 {
            let temp = 1.0 / g0;
            for v in sig.iter_mut() {
                *v *= temp;
            }
        }
        parcor0
    }
}

/// Harmonic filter weight of the input: `1 / (1 + γ_g·num/den)`, the LTP
/// gain being bounded to 1
///
/// Always within `[MIN_GPLT, 1]` for a non-negative numerator.
pub fn ltp_gain(num: f32, den: f32) -> f32 {
    if num > den {
        MIN_GPLT
    } else {
        den / (den + GAMMA_G * num)
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Best delay around `t0`: integer search over `t0 - 1 ..= t0 + 1`, then
/// the fractional phases around the winner
fn search_del(t0: usize, s: &[f32; SIZ_RES2]) -> Option<LtpDelay> {
    let cur = &s[MEM_RES2..];

    let ener = dot(cur, cur);
    if ener < MIN_ENER {
        return None;
    }

    let mut lambda = t0 - 1;
    let mut num_int = -1.0e30f32;
    let mut i_max = 0;
    for i in 0..3 {
        let num = dot(cur, &s[MEM_RES2 - lambda - i..][..L_SUBFR]);
        if num > num_int {
            i_max = i;
            num_int = num;
        }
    }
    if num_int <= 0.0 {
        return None;
    }

    lambda += i_max;
    let past = &s[MEM_RES2 - lambda..][..L_SUBFR];
    let den_int = dot(past, past);
    if den_int < MIN_ENER {
        return None;
    }

    // y_up[phi - 1][off + n] estimates sample n delayed by lambda + 1 - off - phi/8
    let mut y_up = [[0.0f32; L_SUBFR + 1]; F_UP_PST - 1];
    let mut tab_den0 = [0.0f32; F_UP_PST - 1];
    let mut tab_den1 = [0.0f32; F_UP_PST - 1];
    let mut den_max = den_int;
    let base = MEM_RES2 + LH_UP_S - 1 - lambda;

    for phi in 1..F_UP_PST {
        let h = &TAB_HUP_S[phi - 1];
        let row = &mut y_up[phi - 1];
        for (n, y) in row.iter_mut().enumerate() {
            let p = base + n;
            *y = (0..LH2_S).map(|i| h[i] * s[p - i]).sum();
        }

        let common: f32 = row[1..L_SUBFR].iter().map(|v| v * v).sum();
        let den0 = common + row[0] * row[0];
        let den1 = common + row[L_SUBFR] * row[L_SUBFR];
        tab_den0[phi - 1] = den0;
        tab_den1[phi - 1] = den1;

        let den = if row[0].abs() > row[L_SUBFR].abs() { den0 } else { den1 };
        if den > den_max {
            den_max = den;
        }
    }
    if den_max < MIN_ENER {
        return None;
    }

    let mut num_max = num_int;
    let mut den_max = den_int;
    let mut numsq_max = num_max * num_max;
    let mut phi_max = 0;
    let mut ioff = 1;

    for phi in 1..F_UP_PST {
        let row = &y_up[phi - 1];
        for (off, den) in [(0, tab_den0[phi - 1]), (1, tab_den1[phi - 1])] {
            let num = dot(cur, &row[off..off + L_SUBFR]).max(0.0);
            let numsq = num * num;
            if numsq * den_max > numsq_max * den {
                num_max = num;
                numsq_max = numsq;
                den_max = den;
                ioff = off;
                phi_max = phi;
            }
        }
    }

    if num_max == 0.0 || den_max <= MIN_ENER {
        return None;
    }
    if numsq_max < den_max * ener * THRESCRIT {
        return None;
    }

    Some(LtpDelay {
        ltpdel: lambda + 1 - ioff,
        phase: phi_max,
        num: num_max,
        den: den_max,
        y_up,
        off_yup: ioff,
    })
}

/// Signal at the fractional delay `ltpdel - phase/8` through the long
/// interpolation filter, with the numerator and denominator of its gain
fn compute_ltp_l(s: &[f32; SIZ_RES2], ltpdel: usize, phase: usize) -> ([f32; L_SUBFR], f32, f32) {
    let h = &TAB_HUP_L[phase - 1];
    let base = MEM_RES2 + LH_UP_L - ltpdel;

    let mut y = [0.0f32; L_SUBFR];
    for (n, v) in y.iter_mut().enumerate() {
        let p = base + n;
        *v = (0..LH2_L).map(|i| h[i] * s[p - i]).sum();
    }

    let num = dot(&y, &s[MEM_RES2..]).max(0.0);
    let den = dot(&y, &y);
    (y, num, den)
}

/// `true` when the long filter gain `num2/den2` beats the short one
fn select_ltp(num1: f32, den1: f32, num2: f32, den2: f32) -> bool {
    if den2 == 0.0 {
        return false;
    }
    num2 * num2 * den1 > num1 * num1 * den2
}

/// `out = g·s_in + (1 - g)·s_ltp`
fn filt_plt(s_in: &[f32], s_ltp: &[f32], out: &mut [f32], gain_plt: f32) {
    let gain_plt_1 = 1.0 - gain_plt;
    for ((o, x), y) in out.iter_mut().zip(s_in.iter()).zip(s_ltp.iter()) {
        *o = gain_plt * x + gain_plt_1 * y;
    }
}

/// First reflection coefficient of the impulse response `h`
fn calc_rc0_h(h: &[f32; LONG_H_ST]) -> f32 {
    let acf0: f32 = h.iter().map(|v| v * v).sum();
    let acf1: f32 = h.windows(2).map(|w| w[0] * w[1]).sum();

    if acf0 == 0.0 || acf0 < acf1.abs() {
        return 0.0;
    }
    -acf1 / acf0
}

/// Tilt compensation; `sig_in` starts one sample before the subframe
fn filt_mu(sig_in: &[f32; L_SUBFR + 1], out: &mut [f32; L_SUBFR], parcor0: f32) {
    let mu = if parcor0 > 0.0 {
        parcor0 * GAMMA3_PLUS
    } else {
        parcor0 * GAMMA3_MINUS
    };
    let ga = 1.0 / (1.0 - mu.abs());

    for (n, o) in out.iter_mut().enumerate() {
        *o = ga * (mu * sig_in[n] + sig_in[n + 1]);
    }
}

/// Smooth the output level towards the input level, sample by sample
///
/// A silent input or output drives the gain, and so the output, to zero.
fn scale_st(sig_in: &[f32], sig_out: &mut [f32; L_SUBFR], mut gain_prec: f32) -> f32 {
    let gain_in: f32 = sig_in.iter().map(|v| v.abs()).sum();
    let g0 = if gain_in == 0.0 {
        gain_prec = 0.0;
        0.0
    } else {
        let gain_out: f32 = sig_out.iter().map(|v| v.abs()).sum();
        if gain_out == 0.0 {
            return 0.0;
        }
        gain_in / gain_out * AGC_FAC1
    };

    for v in sig_out.iter_mut() {
        gain_prec = gain_prec * AGC_FAC + g0;
        *v *= gain_prec;
    }
    gain_prec
}

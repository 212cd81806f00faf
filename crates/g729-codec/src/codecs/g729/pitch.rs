//! Pitch analysis for G.729
//!
//! Open-loop search on the weighted speech, closed-loop search at 1/3
//! sample resolution, lag coding and the adaptive codebook interpolation.
//!
//! Buffers carry their history in front: `start` is the index of the first
//! sample of the current frame or subframe and the lags reach back from it.

use super::constants::{
    GAIN_PIT_MAX, L_FRAME, L_INTER10, L_INTER4, L_SUBFR, PIT_MAX, PIT_MIN, THRESHPIT, UP_SAMP,
};
use super::filter::convolve;
use super::tables::{INTER_3, INTER_3L};

/// Closed-loop lag search window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PitchWindow {
    /// Smallest codable lag
    pub t0_min: usize,
    /// Largest codable lag
    pub t0_max: usize,
}

impl PitchWindow {
    /// Ten lags around `t0`, shifted to stay inside `[PIT_MIN, PIT_MAX]`
    ///
    /// The lower bound is clamped first, then the upper one, which may pull
    /// the lower bound down again.
    pub fn around(t0: usize) -> Self {
        let mut t0_min = t0.saturating_sub(5).max(PIT_MIN);
        let mut t0_max = t0_min + 9;
        if t0_max > PIT_MAX {
            t0_max = PIT_MAX;
            t0_min = t0_max - 9;
        }
        Self { t0_min, t0_max }
    }

    /// Seven lags around the open-loop estimate, searched on the first
    /// subframe
    pub fn open_loop(t_op: usize) -> Self {
        let mut t0_min = t_op.saturating_sub(3).max(PIT_MIN);
        let mut t0_max = t0_min + 6;
        if t0_max > PIT_MAX {
            t0_max = PIT_MAX;
            t0_min = t0_max - 6;
        }
        Self { t0_min, t0_max }
    }
}

/// Open-loop pitch estimate of one frame of weighted speech
///
/// The lag range is split into three sections so that no section holds a
/// multiple of another's lag. Shorter lags win unless a longer one
/// correlates clearly better.
pub fn pitch_ol(signal: &[f32], start: usize) -> usize {
    debug_assert!(start >= PIT_MAX);

    let (mut p_max1, mut max1) = lag_max(signal, start, PIT_MAX, 80);
    let (p_max2, max2) = lag_max(signal, start, 79, 40);
    let (p_max3, max3) = lag_max(signal, start, 39, PIT_MIN);

    if max1 * THRESHPIT < max2 {
        max1 = max2;
        p_max1 = p_max2;
    }
    if max1 * THRESHPIT < max3 {
        p_max1 = p_max3;
    }
    p_max1
}

/// Best lag in `[lagmin, lagmax]` and its normalised correlation
fn lag_max(signal: &[f32], start: usize, lagmax: usize, lagmin: usize) -> (usize, f32) {
    let cur = &signal[start..start + L_FRAME];

    let mut max = f32::MIN;
    let mut p_max = lagmax;
    for i in (lagmin..=lagmax).rev() {
        let past = &signal[start - i..start - i + L_FRAME];
        let t0: f32 = cur.iter().zip(past.iter()).map(|(a, b)| a * b).sum();
        if t0 >= max {
            max = t0;
            p_max = i;
        }
    }

    let past = &signal[start - p_max..start - p_max + L_FRAME];
    let energy = 0.01 + past.iter().map(|v| v * v).sum::<f32>();
    (p_max, max / energy.sqrt())
}

/// Normalised correlation between the target and the filtered past
/// excitation for every lag in `[t_min, t_max]`
fn norm_corr(
    exc: &[f32],
    start: usize,
    xn: &[f32; L_SUBFR],
    h: &[f32; L_SUBFR],
    t_min: usize,
    t_max: usize,
) -> Vec<f32> {
    let mut corr = Vec::with_capacity(t_max - t_min + 1);

    let mut k = start - t_min;
    let mut excf = [0.0f32; L_SUBFR];
    convolve(&exc[k..k + L_SUBFR], h, &mut excf);

    for i in t_min..=t_max {
        let alp = 0.01 + excf.iter().map(|v| v * v).sum::<f32>();
        let s: f32 = xn.iter().zip(excf.iter()).map(|(a, b)| a * b).sum();
        corr.push(s / alp.sqrt());

        if i != t_max {
            k -= 1;
            for j in (1..L_SUBFR).rev() {
                excf[j] = excf[j - 1] + exc[k] * h[j];
            }
            excf[0] = exc[k];
        }
    }
    corr
}

/// Interpolate the correlation at `x + frac/3`
fn interpol_3(corr: &[f32], x: usize, frac: i32) -> f32 {
    let (x, frac) = if frac < 0 {
        (x - 1, (frac + UP_SAMP as i32) as usize)
    } else {
        (x, frac as usize)
    };

    let mut s = 0.0f32;
    for i in 0..L_INTER4 {
        s += corr[x - i] * INTER_3[frac + UP_SAMP * i];
        s += corr[x + 1 + i] * INTER_3[UP_SAMP - frac + UP_SAMP * i];
    }
    s
}

/// Closed-loop fractional pitch search
///
/// Returns the integer lag and the fraction in `{-1, 0, 1}` thirds. On the
/// first subframe lags above 84 are searched at integer resolution only.
pub fn pitch_fr3(
    exc: &[f32],
    start: usize,
    xn: &[f32; L_SUBFR],
    h: &[f32; L_SUBFR],
    window: PitchWindow,
    i_subfr: usize,
) -> (usize, i32) {
    let PitchWindow { t0_min, t0_max } = window;
    let t_min = t0_min - L_INTER4;
    let t_max = t0_max + L_INTER4;
    let corr = norm_corr(exc, start, xn, h, t_min, t_max);
    let at = |lag: usize| lag - t_min;

    let mut max = corr[at(t0_min)];
    let mut lag = t0_min;
    for i in t0_min + 1..=t0_max {
        if corr[at(i)] >= max {
            max = corr[at(i)];
            lag = i;
        }
    }

    if i_subfr == 0 && lag > 84 {
        return (lag, 0);
    }

    let mut max = interpol_3(&corr, at(lag), -2);
    let mut frac = -2;
    for i in -1..=2 {
        let corr_int = interpol_3(&corr, at(lag), i);
        if corr_int > max {
            max = corr_int;
            frac = i;
        }
    }

    match frac {
        -2 => (lag - 1, 1),
        2 => (lag + 1, -1),
        _ => (lag, frac),
    }
}

/// Adaptive codebook vector: the past excitation interpolated at
/// `t0 + frac/3`, written over `exc[start..start + L_SUBFR]`
///
/// Lags shorter than the subframe repeat the samples produced so far.
pub fn pred_lt_3(exc: &mut [f32], start: usize, t0: usize, frac: i32) {
    let mut x0 = start - t0;
    let mut frac = -frac;
    if frac < 0 {
        frac += UP_SAMP as i32;
        x0 -= 1;
    }
    let frac = frac as usize;

    for j in 0..L_SUBFR {
        let x1 = x0 + j;
        let x2 = x1 + 1;
        let mut s = 0.0f32;
        for i in 0..L_INTER10 {
            s += exc[x1 - i] * INTER_3L[frac + UP_SAMP * i];
            s += exc[x2 + i] * INTER_3L[UP_SAMP - frac + UP_SAMP * i];
        }
        exc[start + j] = s;
    }
}

/// Adaptive codebook gain, bounded to `[0, 1.2]`
///
/// Also returns `<y1,y1>` and `-2<xn,y1>` for the gain quantizer.
pub fn g_pitch(xn: &[f32; L_SUBFR], y1: &[f32; L_SUBFR]) -> (f32, [f32; 2]) {
    let yy = 0.01 + y1.iter().map(|v| v * v).sum::<f32>();
    let xy: f32 = xn.iter().zip(y1.iter()).map(|(a, b)| a * b).sum();

    let gain = (xy / yy).clamp(0.0, GAIN_PIT_MAX);
    (gain, [yy, -2.0 * xy + 0.01])
}

/// Encode a lag
///
/// The first subframe is coded absolutely and sets the window of the
/// second, which is coded relative to it.
pub fn enc_lag3(t0: usize, frac: i32, window: &mut PitchWindow, i_subfr: usize) -> u16 {
    if i_subfr == 0 {
        let index = if t0 <= 85 {
            3 * t0 as i32 - 58 + frac
        } else {
            t0 as i32 + 112
        };
        *window = PitchWindow::around(t0);
        index as u16
    } else {
        let index = 3 * (t0 as i32 - window.t0_min as i32) + 2 + frac;
        index as u16
    }
}

/// Decode a lag
///
/// `t0_prev` is the integer lag of the first subframe and only matters for
/// the second.
pub fn dec_lag3(index: u16, i_subfr: usize, t0_prev: usize) -> (usize, i32) {
    let index = i32::from(index);
    if i_subfr == 0 {
        if index < 197 {
            let t0 = (index + 2) / 3 + 19;
            (t0 as usize, index - 3 * t0 + 58)
        } else {
            ((index - 112) as usize, 0)
        }
    } else {
        let window = PitchWindow::around(t0_prev);
        // index 0 codes one third below the window: (t0_min - 1, +1)
        let i = (index + 2) / 3 - 1;
        ((window.t0_min as i32 + i) as usize, index - 2 - 3 * i)
    }
}

fn parity_sum(index: u16) -> u16 {
    let mut temp = index >> 1;
    let mut sum = 1;
    for _ in 0..6 {
        temp >>= 1;
        sum += temp & 1;
    }
    sum
}

/// Parity bit over the six most significant bits of the first lag
pub fn parity_pitch(index: u16) -> u16 {
    parity_sum(index) & 1
}

/// `true` when the received parity does not match the lag
pub fn check_parity_pitch(index: u16, parity: u16) -> bool {
    (parity_sum(index) + parity) & 1 == 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codecs::g729::constants::L_INTERPOL;

    #[test]
    fn test_boundary_indices() {
        assert_eq!(dec_lag3(196, 0, 0), (85, -1));
        assert_eq!(dec_lag3(197, 0, 0), (85, 0));
        assert_eq!(dec_lag3(0, 0, 0), (19, 1));
        assert_eq!(dec_lag3(255, 0, 0), (143, 0));
    }

    #[test]
    fn test_first_subframe_round_trip() {
        let mut window = PitchWindow::around(60);
        for t0 in PIT_MIN..=PIT_MAX {
            let fracs: &[i32] = if t0 < 85 { &[-1, 0, 1] } else { &[0] };
            for &frac in fracs {
                let index = enc_lag3(t0, frac, &mut window, 0);
                assert!(index < 256);
                assert_eq!(dec_lag3(index, 0, 0), (t0, frac));
            }
        }
    }

    #[test]
    fn test_second_subframe_round_trip() {
        for t0_first in PIT_MIN..=PIT_MAX {
            let mut window = PitchWindow::around(PIT_MIN);
            enc_lag3(t0_first, 0, &mut window, 0);
            assert_eq!(window.t0_max - window.t0_min, 9);
            assert!(window.t0_min >= PIT_MIN && window.t0_max <= PIT_MAX);

            let below = (window.t0_min - 1, 1);
            let lags = (window.t0_min..=window.t0_max)
                .flat_map(|t0| (-1..=1).map(move |frac| (t0, frac)));
            for (t0, frac) in std::iter::once(below).chain(lags) {
                let index = enc_lag3(t0, frac, &mut window, 1);
                assert!(index < 32);
                assert_eq!(dec_lag3(index, 1, t0_first), (t0, frac));
            }
        }
    }

    #[test]
    fn test_second_subframe_index_zero() {
        let mut window = PitchWindow { t0_min: 55, t0_max: 64 };
        assert_eq!(enc_lag3(54, 1, &mut window, 1), 0);
        assert_eq!(dec_lag3(0, 1, 60), (54, 1));

        // window pinned at PIT_MIN
        assert_eq!(dec_lag3(0, 1, PIT_MIN), (PIT_MIN - 1, 1));
    }

    #[test]
    fn test_window_clamping_order() {
        assert_eq!(PitchWindow::around(22), PitchWindow { t0_min: 20, t0_max: 29 });
        assert_eq!(PitchWindow::around(140), PitchWindow { t0_min: 134, t0_max: 143 });
        assert_eq!(PitchWindow::around(19), PitchWindow { t0_min: 20, t0_max: 29 });

        assert_eq!(PitchWindow::open_loop(60), PitchWindow { t0_min: 57, t0_max: 63 });
        assert_eq!(PitchWindow::open_loop(21), PitchWindow { t0_min: 20, t0_max: 26 });
        assert_eq!(PitchWindow::open_loop(142), PitchWindow { t0_min: 137, t0_max: 143 });
    }

    #[test]
    fn test_parity() {
        for index in 0u16..256 {
            let p = parity_pitch(index);
            assert!(!check_parity_pitch(index, p));
            assert!(check_parity_pitch(index, p ^ 1));
        }
        // bit 0 and bit 1 are not covered
        assert_eq!(parity_pitch(0b0000_0011), parity_pitch(0));
        assert_ne!(parity_pitch(0b0000_0100), parity_pitch(0));
    }

    #[test]
    fn test_pitch_ol_finds_period() {
        let period = 57;
        let signal: Vec<f32> = (0..PIT_MAX + L_FRAME)
            .map(|n| if n % period == 0 { 1000.0 } else { 0.0 })
            .collect();
        assert_eq!(pitch_ol(&signal, PIT_MAX), period);
    }

    #[test]
    fn test_pitch_fr3_on_pulse_train() {
        let period = 50;
        let start = PIT_MAX + L_INTERPOL;
        let exc: Vec<f32> = (0..start + L_SUBFR)
            .map(|n| if n % period == 10 { 1000.0 } else { 0.0 })
            .collect();
        let mut xn = [0.0f32; L_SUBFR];
        xn.copy_from_slice(&exc[start..start + L_SUBFR]);
        let mut h = [0.0f32; L_SUBFR];
        h[0] = 1.0;

        let window = PitchWindow { t0_min: 45, t0_max: 54 };
        assert_eq!(pitch_fr3(&exc, start, &xn, &h, window, 1), (50, 0));
    }

    #[test]
    fn test_pred_lt_3_preserves_dc() {
        let start = PIT_MAX + L_INTERPOL;
        let mut exc = vec![100.0f32; start + L_SUBFR];
        for frac in -1..=1 {
            pred_lt_3(&mut exc, start, 37, frac);
            for &v in &exc[start..] {
                assert!((v - 100.0).abs() < 2.0, "frac {}: {}", frac, v);
            }
        }
    }

    #[test]
    fn test_g_pitch_is_bounded() {
        let y1 = [1.0f32; L_SUBFR];
        let (g, coeff) = g_pitch(&[5.0; L_SUBFR], &y1);
        assert_eq!(g, GAIN_PIT_MAX);
        assert!((coeff[0] - 40.01).abs() < 1e-3);

        let (g, _) = g_pitch(&[-1.0; L_SUBFR], &y1);
        assert_eq!(g, 0.0);
    }
}

//! Linear Predictive Coding (LPC) Analysis for G.729
//!
//! LPC analysis extracts the spectral envelope of speech by modeling
//! it as an all-pole filter. The process includes:
//! 1. Autocorrelation computation with windowing
//! 2. Lag windowing with white noise correction
//! 3. Levinson-Durbin algorithm to solve for LPC coefficients
//! 4. Conversion to Line Spectral Pairs (LSP) for robust quantization
//!
//! LSPs live in the cosine domain. `lsp_lsf` and `lsf_lsp` convert to and
//! from the angular (LSF) domain used by the quantizer.

use super::constants::{GRID_POINTS, L_WINDOW, M, MP1, NC};
use super::tables::{GRID, HAMWINDOW, LAG_WINDOW};

/// Compute the windowed autocorrelation `r[0..=M]` of one analysis window
///
/// `r[0]` is floored at 1.0 so that an all-zero window still yields a
/// usable (flat) predictor.
pub fn autocorr(x: &[f32]) -> [f32; MP1] {
    debug_assert_eq!(x.len(), L_WINDOW);

    let mut y = [0.0f32; L_WINDOW];
    for ((dst, &s), &w) in y.iter_mut().zip(x.iter()).zip(HAMWINDOW.iter()) {
        *dst = s * w;
    }

    let mut r = [0.0f32; MP1];
    for (i, ri) in r.iter_mut().enumerate() {
        *ri = (i..L_WINDOW).map(|j| y[j] * y[j - i]).sum();
    }
    if r[0] < 1.0 {
        r[0] = 1.0;
    }
    r
}

/// Apply the lag window to `r[1..=M]`
pub fn lag_window(r: &mut [f32; MP1]) {
    for (ri, &w) in r[1..].iter_mut().zip(LAG_WINDOW.iter()) {
        *ri *= w;
    }
}

/// Levinson-Durbin recursion
///
/// Returns the predictor `a` (with `a[0] = 1`), the reflection coefficients
/// and the final prediction error. A non-positive error is clamped to 0.001.
pub fn levinson(r: &[f32; MP1]) -> ([f32; MP1], [f32; M], f32) {
    let mut a = [0.0f32; MP1];
    let mut rc = [0.0f32; M];

    a[0] = 1.0;
    rc[0] = -r[1] / r[0];
    a[1] = rc[0];
    let mut err = r[0] + r[1] * rc[0];

    for i in 2..=M {
        let s: f32 = (0..i).map(|j| r[i - j] * a[j]).sum();
        let k = -s / err;
        rc[i - 1] = k;

        for j in 1..=i / 2 {
            let l = i - j;
            let at = a[j] + k * a[l];
            a[l] += k * a[j];
            a[j] = at;
        }
        a[i] = k;

        err += k * s;
        if err <= 0.0 {
            err = 0.001;
        }
    }

    (a, rc, err)
}

/// Evaluate the Chebyshev series `f` of degree `NC` at `x`
fn chebyshev(x: f32, f: &[f32; NC + 1]) -> f32 {
    let x2 = 2.0 * x;
    let mut b2 = 1.0f32;
    let mut b1 = x2 + f[1];
    for &fi in &f[2..NC] {
        let b0 = x2 * b1 - b2 + fi;
        b2 = b1;
        b1 = b0;
    }
    x * b1 - b2 + 0.5 * f[NC]
}

/// Convert LPC coefficients to LSPs
///
/// Roots of the symmetric and antisymmetric polynomials are searched on a
/// fixed cosine grid, alternating between the two. After each root the
/// search resumes from the root inside the same grid interval, so close
/// pairs sharing an interval are both found. When fewer than `M`
/// roots are found the previous LSP vector is returned unchanged.
pub fn az_lsp(a: &[f32; MP1], old_lsp: &[f32; M]) -> [f32; M] {
    let mut f1 = [0.0f32; NC + 1];
    let mut f2 = [0.0f32; NC + 1];
    f1[0] = 1.0;
    f2[0] = 1.0;
    for i in 1..=NC {
        let j = M + 1 - i;
        f1[i] = a[i] + a[j] - f1[i - 1];
        f2[i] = a[i] - a[j] + f2[i - 1];
    }

    let mut lsp = [0.0f32; M];
    let mut nf = 0;
    let mut use_f2 = false;
    let mut coef = &f1;

    let mut xlow = GRID[0];
    let mut ylow = chebyshev(xlow, coef);
    let mut j = 0;

    while nf < M && j < GRID_POINTS {
        j += 1;
        let mut xhigh = xlow;
        let mut yhigh = ylow;
        xlow = GRID[j];
        ylow = chebyshev(xlow, coef);

        if ylow * yhigh <= 0.0 {
            // search the rest of this interval again with the other polynomial
            j -= 1;
            for _ in 0..4 {
                let xmid = 0.5 * (xlow + xhigh);
                let ymid = chebyshev(xmid, coef);
                if ylow * ymid <= 0.0 {
                    yhigh = ymid;
                    xhigh = xmid;
                } else {
                    ylow = ymid;
                    xlow = xmid;
                }
            }

            let x = if yhigh == ylow {
                xlow
            } else {
                xlow - ylow * (xhigh - xlow) / (yhigh - ylow)
            };
            lsp[nf] = x;
            nf += 1;

            use_f2 = !use_f2;
            coef = if use_f2 { &f2 } else { &f1 };
            xlow = x;
            ylow = chebyshev(xlow, coef);
        }
    }

    if nf < M {
        tracing::trace!("LSP root search found {} of {} roots, reusing previous LSP", nf, M);
        return *old_lsp;
    }
    lsp
}

/// Expand the LSPs at even (or odd) positions into polynomial coefficients
fn get_lsp_pol(lsp: &[f32; M], first: usize) -> [f32; NC + 1] {
    let mut f = [0.0f32; NC + 1];
    f[0] = 1.0;
    f[1] = -2.0 * lsp[first];
    for i in 2..=NC {
        let b = -2.0 * lsp[first + 2 * i - 2];
        f[i] = b * f[i - 1] + 2.0 * f[i - 2];
        for j in (2..i).rev() {
            f[j] += b * f[j - 1] + f[j - 2];
        }
        f[1] += b;
    }
    f
}

/// Convert LSPs back to LPC coefficients
pub fn lsp_az(lsp: &[f32; M]) -> [f32; MP1] {
    let mut f1 = get_lsp_pol(lsp, 0);
    let mut f2 = get_lsp_pol(lsp, 1);

    for i in (1..=NC).rev() {
        f1[i] += f1[i - 1];
        f2[i] -= f2[i - 1];
    }

    let mut a = [0.0f32; MP1];
    a[0] = 1.0;
    for i in 1..=NC {
        a[i] = 0.5 * (f1[i] + f2[i]);
        a[M + 1 - i] = 0.5 * (f1[i] - f2[i]);
    }
    a
}

/// Cosine domain to angular domain
pub fn lsp_lsf(lsp: &[f32; M]) -> [f32; M] {
    lsp.map(f32::acos)
}

/// Angular domain to cosine domain
pub fn lsf_lsp(lsf: &[f32; M]) -> [f32; M] {
    lsf.map(f32::cos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn sine_window(freq: f32, amplitude: f32) -> Vec<f32> {
        (0..L_WINDOW)
            .map(|n| amplitude * (2.0 * PI * freq * n as f32 / 8000.0).sin())
            .collect()
    }

    #[test]
    fn test_autocorr_floors_silence() {
        let r = autocorr(&[0.0; L_WINDOW]);
        assert_eq!(r[0], 1.0);
        assert!(r[1..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_levinson_first_reflection_coefficient() {
        let mut r = [0.0f32; MP1];
        r[0] = 1.0;
        r[1] = 0.5;
        let (a, rc, err) = levinson(&r);
        assert_eq!(a[0], 1.0);
        assert!((rc[0] + 0.5).abs() < 1e-6);
        assert!(rc.iter().all(|k| k.abs() < 1.0));
        assert!(err > 0.0 && err < 1.0);
    }

    #[test]
    fn test_lpc_lsp_round_trip_on_sine() {
        let x = sine_window(200.0, 8000.0);
        let mut r = autocorr(&x);
        lag_window(&mut r);
        let (a, _, _) = levinson(&r);

        let sentinel = [0.0f32; M];
        let lsp = az_lsp(&a, &sentinel);
        assert_ne!(lsp, sentinel, "root search fell back");
        for i in 1..M {
            assert!(lsp[i] < lsp[i - 1], "LSPs must be descending in the cosine domain");
        }

        let a2 = lsp_az(&lsp);
        for i in 0..MP1 {
            assert!((a[i] - a2[i]).abs() < 1e-3, "a[{}]: {} vs {}", i, a[i], a2[i]);
        }
    }

    #[test]
    fn test_flat_predictor_gives_equally_spaced_lsf() {
        let mut a = [0.0f32; MP1];
        a[0] = 1.0;
        let lsp = az_lsp(&a, &[0.0; M]);
        let lsf = lsp_lsf(&lsp);
        for (i, &w) in lsf.iter().enumerate() {
            let expected = (i + 1) as f32 * PI / (M + 1) as f32;
            assert!((w - expected).abs() < 1e-3);
        }
    }

    #[test]
    fn test_ill_conditioned_predictor_reuses_old_lsp() {
        // (1 + z^-1)^10 has every root at z = -1, outside the search grid
        let a: [f32; MP1] = [
            1.0, 10.0, 45.0, 120.0, 210.0, 252.0, 210.0, 120.0, 45.0, 10.0, 1.0,
        ];
        let old = [0.9595, 0.8413, 0.6549, 0.4154, 0.1423, -0.1423, -0.4154, -0.6549, -0.8413, -0.9595];
        assert_eq!(az_lsp(&a, &old), old);
    }

    #[test]
    fn test_close_roots_sharing_a_grid_interval() {
        // 1.0 and 1.02 fall between grid points 19 and 20, 1.06 and 1.08
        // between 20 and 21
        let lsf = [0.3, 0.6, 1.0, 1.02, 1.06, 1.08, 1.6, 2.0, 2.4, 2.8];
        let step = PI / GRID_POINTS as f32;
        assert_eq!((lsf[2] / step) as usize, (lsf[3] / step) as usize);
        assert_eq!((lsf[4] / step) as usize, (lsf[5] / step) as usize);

        let a = lsp_az(&lsf_lsp(&lsf));
        let back = lsp_lsf(&az_lsp(&a, &[0.0; M]));
        for i in 0..M {
            assert!((lsf[i] - back[i]).abs() < 3e-3, "lsf[{}]: {} vs {}", i, lsf[i], back[i]);
        }
    }

    #[test]
    fn test_lsf_conversion_round_trip() {
        let lsf = [0.2, 0.5, 0.8, 1.1, 1.4, 1.7, 2.0, 2.3, 2.6, 2.9];
        let back = lsp_lsf(&lsf_lsp(&lsf));
        for i in 0..M {
            assert!((lsf[i] - back[i]).abs() < 1e-4);
        }
    }
}

//! LPC filtering primitives shared by the encoder, decoder and postfilter
//!
//! Filters that need past input take it in front of the current block: a
//! slice of `M + n` samples produces `n` outputs. Recursive filters take
//! their memory explicitly and return the memory after the block, so the
//! caller decides whether to keep it.

use super::constants::{L_FRAME, M, MP1};
use super::lpc::{lsp_az, lsp_lsf};

/// Inverse (analysis) filter: `y[n] = x[n] + Σ a[j] x[n-j]`
///
/// `x` carries `M` samples of history before the `y.len()` current ones.
pub fn residu(a: &[f32; MP1], x: &[f32], y: &mut [f32]) {
    debug_assert_eq!(x.len(), y.len() + M);
    for (i, out) in y.iter_mut().enumerate() {
        let n = i + M;
        let mut s = x[n];
        for j in 1..=M {
            s += a[j] * x[n - j];
        }
        *out = s;
    }
}

/// Synthesis filter `1/A(z)`
///
/// Filters `x` into `y` starting from `mem` (the last `M` outputs, oldest
/// first) and returns the memory after the block.
pub fn syn_filt(a: &[f32; MP1], x: &[f32], y: &mut [f32], mem: &[f32; M]) -> [f32; M] {
    debug_assert_eq!(x.len(), y.len());
    debug_assert!(x.len() <= L_FRAME);

    let l = x.len();
    let mut yy = [0.0f32; M + L_FRAME];
    yy[..M].copy_from_slice(mem);

    for i in 0..l {
        let mut s = x[i];
        for j in 1..=M {
            s -= a[j] * yy[M + i - j];
        }
        yy[M + i] = s;
    }
    y.copy_from_slice(&yy[M..M + l]);

    let mut out = [0.0f32; M];
    out.copy_from_slice(&yy[l..l + M]);
    out
}

/// Convolution of `x` with the impulse response `h`, truncated to `y.len()`
pub fn convolve(x: &[f32], h: &[f32], y: &mut [f32]) {
    for (n, out) in y.iter_mut().enumerate() {
        *out = (0..=n).map(|i| x[i] * h[n - i]).sum();
    }
}

/// Bandwidth expansion: `ap[i] = a[i] * gamma^i`
pub fn weight_az(a: &[f32; MP1], gamma: f32) -> [f32; MP1] {
    let mut ap = [0.0f32; MP1];
    ap[0] = a[0];
    let mut fac = gamma;
    for i in 1..MP1 {
        ap[i] = fac * a[i];
        fac *= gamma;
    }
    ap
}

fn mid_point(lsp_old: &[f32; M], lsp_new: &[f32; M]) -> [f32; M] {
    let mut lsp = [0.0f32; M];
    for i in 0..M {
        lsp[i] = 0.5 * (lsp_old[i] + lsp_new[i]);
    }
    lsp
}

/// Per-subframe LPC filters from the quantized LSPs
///
/// The first subframe uses the mean of the previous and current LSPs.
pub fn int_qlpc(lsp_old: &[f32; M], lsp_new: &[f32; M]) -> [[f32; MP1]; 2] {
    let lsp = mid_point(lsp_old, lsp_new);
    [lsp_az(&lsp), lsp_az(lsp_new)]
}

/// Per-subframe LPC filters from the unquantized LSPs
///
/// Also returns the interpolated and current LSFs, which drive the
/// perceptual weighting adaptation.
pub fn int_lpc(
    lsp_old: &[f32; M],
    lsp_new: &[f32; M],
) -> ([[f32; MP1]; 2], [f32; M], [f32; M]) {
    let lsp = mid_point(lsp_old, lsp_new);
    let az = [lsp_az(&lsp), lsp_az(lsp_new)];
    (az, lsp_lsf(&lsp), lsp_lsf(lsp_new))
}

//! Adaptive perceptual weighting filter
//!
//! `W(z) = A(z/γ1) / A(z/γ2)`. Flat spectra use fixed factors. Steep
//! spectra sharpen the filter with a γ2 that follows the closest pair of
//! LSFs. The flat/steep decision uses the first two log-area ratios with
//! hysteresis.

use super::constants::{
    ALPHA, BETA, GAMMA1_0, GAMMA1_1, GAMMA2_0_H, GAMMA2_0_L, GAMMA2_1, M, THRESH_H1, THRESH_H2,
    THRESH_L1, THRESH_L2,
};

/// Weighting factors for the two subframes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightingFactors {
    /// Numerator factor per subframe
    pub gamma1: [f32; 2],
    /// Denominator factor per subframe
    pub gamma2: [f32; 2],
}

/// State of the weighting adaptation
#[derive(Debug, Clone)]
pub struct PerceptualWeighting {
    lar_old: [f32; 2],
    /// Flat/steep decision, carried from one subframe to the next
    smooth: bool,
}

impl Default for PerceptualWeighting {
    fn default() -> Self {
        Self {
            lar_old: [0.0; 2],
            smooth: true,
        }
    }
}

impl PerceptualWeighting {
    /// Restore the initial state
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// `true` while the spectrum is classified as flat
    pub fn is_smooth(&self) -> bool {
        self.smooth
    }

    /// Compute the factors of both subframes
    ///
    /// `lsf_int` and `lsf_new` are the unquantized LSFs of the first and
    /// second subframes, `rc` the reflection coefficients of the frame.
    pub fn perc_var(&mut self, lsf_int: &[f32; M], lsf_new: &[f32; M], rc: &[f32; M]) -> WeightingFactors {
        let lar_new = [lar(rc[0]), lar(rc[1])];
        let lar = [
            0.5 * (lar_new[0] + self.lar_old[0]),
            0.5 * (lar_new[1] + self.lar_old[1]),
            lar_new[0],
            lar_new[1],
        ];
        self.lar_old = lar_new;

        let mut factors = WeightingFactors {
            gamma1: [GAMMA1_1; 2],
            gamma2: [GAMMA2_1; 2],
        };

        for k in 0..2 {
            let critlar0 = lar[2 * k];
            let critlar1 = lar[2 * k + 1];

            if self.smooth {
                if critlar0 < THRESH_L1 && critlar1 > THRESH_H1 {
                    self.smooth = false;
                }
            } else if critlar0 > THRESH_L2 || critlar1 < THRESH_H2 {
                self.smooth = true;
            }

            if !self.smooth {
                let lsf = if k == 0 { lsf_int } else { lsf_new };
                let d_min = lsf
                    .windows(2)
                    .map(|w| w[1] - w[0])
                    .fold(f32::MAX, f32::min);

                factors.gamma1[k] = GAMMA1_0;
                factors.gamma2[k] = (ALPHA * d_min + BETA).clamp(GAMMA2_0_L, GAMMA2_0_H);
            }
        }
        factors
    }
}

/// Log-area ratio of a reflection coefficient
fn lar(rc: f32) -> f32 {
    ((1.0 + rc) / (1.0 - rc)).log10()
}

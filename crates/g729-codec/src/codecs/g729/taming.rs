//! Taming of the pitch loop
//!
//! Tracks a worst-case bound of the excitation error per 40 sample zone so
//! the encoder can keep the pitch gain below 1 when past errors could blow
//! up through the long-term predictor.

use super::constants::{L_INTER10, L_SUBFR, L_THRESH_ERR};

/// Excitation error bounds of the last four subframes, newest first
#[derive(Debug, Clone, PartialEq)]
pub struct Taming {
    exc_err: [f32; 4],
}

impl Default for Taming {
    fn default() -> Self {
        Self { exc_err: [1.0; 4] }
    }
}

impl Taming {
    /// Restore the initial bounds
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// `true` when the error reachable through lag `t0 + frac/3` exceeds the
    /// threshold
    pub fn test_err(&self, t0: usize, frac: i32) -> bool {
        let t1 = if frac > 0 { t0 + 1 } else { t0 };

        let zone1 = t1.saturating_sub(L_SUBFR + L_INTER10) / L_SUBFR;
        let zone2 = (t1 + L_INTER10 - 2) / L_SUBFR;

        let maxloc = self.exc_err[zone1..=zone2]
            .iter()
            .fold(-1.0f32, |m, &e| m.max(e));
        maxloc > L_THRESH_ERR
    }

    /// Push the error bound of the subframe just coded
    pub fn update_exc_err(&mut self, gain_pit: f32, t0: usize) {
        let mut worst = -1.0f32;

        if t0 < L_SUBFR {
            let temp = 1.0 + gain_pit * self.exc_err[0];
            worst = worst.max(temp);
            let temp = 1.0 + gain_pit * temp;
            worst = worst.max(temp);
        } else {
            let zone1 = (t0 - L_SUBFR) / L_SUBFR;
            let zone2 = (t0 - 1) / L_SUBFR;
            for &e in &self.exc_err[zone1..=zone2] {
                worst = worst.max(1.0 + gain_pit * e);
            }
        }

        self.exc_err.copy_within(0..3, 1);
        self.exc_err[0] = worst;
    }

    /// Current bounds, newest first
    pub fn errors(&self) -> &[f32; 4] {
        &self.exc_err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codecs::g729::constants::{PIT_MAX, PIT_MIN};

    #[test]
    fn test_fresh_state_never_tames() {
        let taming = Taming::default();
        for t0 in PIT_MIN..=PIT_MAX {
            for frac in -1..=1 {
                assert!(!taming.test_err(t0, frac));
            }
        }
    }

    #[test]
    fn test_unit_gain_accumulates_until_taming() {
        let mut taming = Taming::default();
        let mut frames = 0;
        while !taming.test_err(30, 0) {
            taming.update_exc_err(1.2, 30);
            frames += 1;
            assert!(frames < 200);
        }
        assert!(taming.errors()[0] > L_THRESH_ERR);
    }

    #[test]
    fn test_short_lag_update_chains_twice() {
        let mut taming = Taming::default();
        taming.update_exc_err(0.5, 25);
        // 1 + 0.5 * (1 + 0.5 * 1)
        assert!((taming.errors()[0] - 1.75).abs() < 1e-6);
        assert_eq!(taming.errors()[1], 1.0);
    }

    #[test]
    fn test_long_lag_uses_zone_maximum() {
        let mut taming = Taming::default();
        taming.exc_err = [1.0, 3.0, 2.0, 1.0];
        taming.update_exc_err(1.0, 100);
        // zones 1 and 2
        assert_eq!(taming.errors()[0], 4.0);
    }
}

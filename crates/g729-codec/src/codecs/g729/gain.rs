//! Gain prediction and the two-stage conjugate gain quantizer
//!
//! The code gain is transmitted as a correction factor of an energy
//! prediction made from the last four quantized corrections.

use super::constants::{
    GP0999, GPCLIP2, L_SUBFR, MEAN_ENER, MIN_QUA_ENER, NCAN1, NCAN2, NCODE1, NCODE2, NCODE2_B,
};
use super::tables::{COEF, GBK1, GBK2, IMAP1, IMAP2, INV_COEF, MAP1, MAP2, PRED, THR1, THR2};

/// MA predictor of the code gain energy
#[derive(Debug, Clone, PartialEq)]
pub struct GainPredictor {
    past_qua_en: [f32; 4],
}

impl Default for GainPredictor {
    fn default() -> Self {
        Self {
            past_qua_en: [MIN_QUA_ENER; 4],
        }
    }
}

impl GainPredictor {
    /// Forget all past energies
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Past quantized energies in dB, newest first
    pub fn past_energies(&self) -> &[f32; 4] {
        &self.past_qua_en
    }

    /// Predicted code gain for the pulse vector `code`
    pub fn predict(&self, code: &[f32; L_SUBFR]) -> f32 {
        let ener_code = 0.01 + code.iter().map(|c| c * c).sum::<f32>();
        let ener_code = 10.0 * (ener_code / L_SUBFR as f32).log10();

        let mut gcode0 = MEAN_ENER - ener_code;
        for (p, e) in PRED.iter().zip(self.past_qua_en.iter()) {
            gcode0 += p * e;
        }
        10.0f32.powf(gcode0 / 20.0)
    }

    fn push(&mut self, energy: f32) {
        self.past_qua_en.copy_within(0..3, 1);
        self.past_qua_en[0] = energy;
    }

    /// Record the quantized correction factor of the current subframe
    pub fn update(&mut self, g_code: f32) {
        self.push(20.0 * g_code.log10());
    }

    /// Record an erased subframe: the mean past energy lowered by 4 dB
    pub fn update_erasure(&mut self) {
        let av = self.past_qua_en.iter().sum::<f32>() * 0.25 - 4.0;
        self.push(av.max(MIN_QUA_ENER));
    }
}

/// Correlations needed by the gain quantizer besides `<y1,y1>` and
/// `-2<xn,y1>`
///
/// `y1` is the filtered adaptive codebook vector and `y2` the filtered
/// fixed codeword.
pub fn corr_xy2(xn: &[f32; L_SUBFR], y1: &[f32; L_SUBFR], y2: &[f32; L_SUBFR]) -> [f32; 3] {
    let dot = |a: &[f32; L_SUBFR], b: &[f32; L_SUBFR]| -> f32 {
        a.iter().zip(b.iter()).map(|(u, v)| u * v).sum()
    };
    let y2y2 = 0.01 + dot(y2, y2);
    let xny2 = 0.01 + dot(xn, y2);
    let y1y2 = 0.01 + dot(y1, y2);
    [y2y2, -2.0 * xny2, 2.0 * y1y2]
}

/// Encoder side of the gain codebook
#[derive(Debug, Clone, Default)]
pub struct GainQuantizer {
    predictor: GainPredictor,
}

impl GainQuantizer {
    /// Restore the initial predictor
    pub fn reset(&mut self) {
        self.predictor.reset();
    }

    /// Predictor state
    pub fn predictor(&self) -> &GainPredictor {
        &self.predictor
    }

    /// Jointly quantize the pitch and code gains
    ///
    /// `coeff` holds the five terms of the weighted error as a quadratic in
    /// the two gains. With `tame` set the pitch gain stays below 1.
    /// Returns the 7 bit index with the quantized pitch and code gains.
    pub fn qua_gain(&mut self, code: &[f32; L_SUBFR], coeff: &[f32; 5], tame: bool) -> (u16, f32, f32) {
        let gcode0 = self.predictor.predict(code);

        let tmp = -1.0 / (4.0 * coeff[0] * coeff[2] - coeff[4] * coeff[4]);
        let mut best_gain = [
            (2.0 * coeff[2] * coeff[1] - coeff[3] * coeff[4]) * tmp,
            (2.0 * coeff[0] * coeff[3] - coeff[1] * coeff[4]) * tmp,
        ];
        if tame && best_gain[0] > GPCLIP2 {
            best_gain[0] = GPCLIP2;
        }

        let (cand1, cand2) = gbk_presel(&best_gain, gcode0);

        let mut dist_min = f32::MAX;
        let mut index1 = cand1;
        let mut index2 = cand2;
        for i in cand1..cand1 + NCAN1 {
            for j in cand2..cand2 + NCAN2 {
                let g_pitch = GBK1[i][0] + GBK2[j][0];
                if tame && g_pitch >= GP0999 {
                    continue;
                }
                let g_code = gcode0 * (GBK1[i][1] + GBK2[j][1]);
                let dist = g_pitch * g_pitch * coeff[0]
                    + g_pitch * coeff[1]
                    + g_code * g_code * coeff[2]
                    + g_code * coeff[3]
                    + g_pitch * g_code * coeff[4];
                if dist < dist_min {
                    dist_min = dist;
                    index1 = i;
                    index2 = j;
                }
            }
        }

        let gain_pit = GBK1[index1][0] + GBK2[index2][0];
        let g_code = GBK1[index1][1] + GBK2[index2][1];
        self.predictor.update(g_code);

        let index = MAP1[index1] * NCODE2 + MAP2[index2];
        (index as u16, gain_pit, g_code * gcode0)
    }
}

/// First rows of the `NCAN1 x NCAN2` window searched in each codebook
fn gbk_presel(best_gain: &[f32; 2], gcode0: f32) -> (usize, usize) {
    let x = (best_gain[1] - (COEF[0][0] * best_gain[0] + COEF[1][1]) * gcode0) * INV_COEF;
    let y = (COEF[1][0] * (-COEF[0][1] + best_gain[0] * COEF[0][0]) * gcode0
        - COEF[0][0] * best_gain[1])
        * INV_COEF;

    let above = |v: f32, thr: f32| {
        if gcode0 > 0.0 {
            v > thr * gcode0
        } else {
            v < thr * gcode0
        }
    };

    let mut cand1 = 0;
    while cand1 < NCODE1 - NCAN1 && above(y, THR1[cand1]) {
        cand1 += 1;
    }
    let mut cand2 = 0;
    while cand2 < NCODE2 - NCAN2 && above(x, THR2[cand2]) {
        cand2 += 1;
    }
    (cand1, cand2)
}

/// Decoder side of the gain codebook
#[derive(Debug, Clone)]
pub struct GainDecoder {
    predictor: GainPredictor,
    gain_pit: f32,
    gain_code: f32,
}

impl Default for GainDecoder {
    fn default() -> Self {
        Self {
            predictor: GainPredictor::default(),
            gain_pit: 0.0,
            gain_code: 0.0,
        }
    }
}

impl GainDecoder {
    /// Restore the initial state
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Predictor state
    pub fn predictor(&self) -> &GainPredictor {
        &self.predictor
    }

    /// Decode both gains of a subframe
    ///
    /// On an erased subframe the previous gains are attenuated and the
    /// predictor is fed a lowered energy instead.
    pub fn dec_gain(&mut self, index: u16, code: &[f32; L_SUBFR], erased: bool) -> (f32, f32) {
        if erased {
            self.gain_pit = (self.gain_pit * 0.9).min(0.9);
            self.gain_code *= 0.98;
            self.predictor.update_erasure();
            return (self.gain_pit, self.gain_code);
        }

        let index = index as usize;
        let index1 = IMAP1[index >> NCODE2_B];
        let index2 = IMAP2[index & (NCODE2 - 1)];

        self.gain_pit = GBK1[index1][0] + GBK2[index2][0];
        let gcode0 = self.predictor.predict(code);
        let g_code = GBK1[index1][1] + GBK2[index2][1];
        self.gain_code = g_code * gcode0;
        self.predictor.update(g_code);

        (self.gain_pit, self.gain_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pulses() -> [f32; L_SUBFR] {
        let mut code = [0.0f32; L_SUBFR];
        code[0] = 1.0;
        code[11] = -1.0;
        code[22] = 1.0;
        code[38] = -1.0;
        code
    }

    #[test]
    fn test_initial_prediction() {
        let predictor = GainPredictor::default();
        let gcode0 = predictor.predict(&pulses());
        // 36 - 10 log10(4.01 / 40) - 14 * 1.79
        let expected_db = 36.0 - 10.0 * (4.01f32 / 40.0).log10() - 14.0 * 1.79;
        assert!((20.0 * gcode0.log10() - expected_db).abs() < 1e-3);
    }

    #[test]
    fn test_erasure_update_floor() {
        let mut predictor = GainPredictor::default();
        predictor.update_erasure();
        assert_eq!(predictor.past_energies(), &[MIN_QUA_ENER; 4]);

        predictor.update(10.0);
        assert!((predictor.past_energies()[0] - 20.0).abs() < 1e-5);
        predictor.update_erasure();
        let expected = ((20.0 - 3.0 * 14.0) * 0.25 - 4.0f32).max(MIN_QUA_ENER);
        assert!((predictor.past_energies()[0] - expected).abs() < 1e-5);
        assert!((predictor.past_energies()[1] - 20.0).abs() < 1e-5);
    }

    #[test]
    fn test_decoder_mirrors_quantizer() {
        let code = pulses();
        let mut quantizer = GainQuantizer::default();
        let mut decoder = GainDecoder::default();

        let coeffs = [
            [10.0, -8.0, 4.0, -30.0, 2.0],
            [25.0, -45.0, 4.0, -10.0, 1.0],
            [3.0, -0.5, 4.0, -200.0, 0.5],
        ];
        for coeff in coeffs.iter() {
            for &tame in &[false, true] {
                let (index, gp, gc) = quantizer.qua_gain(&code, coeff, tame);
                assert!(index < 128);
                let (dgp, dgc) = decoder.dec_gain(index, &code, false);
                assert_eq!(dgp, gp);
                assert!((dgc - gc).abs() <= 1e-4 * gc.abs().max(1.0));
                assert_eq!(decoder.predictor(), quantizer.predictor());
                if tame {
                    assert!(gp < GP0999);
                }
            }
        }
    }

    #[test]
    fn test_erased_gains_decay() {
        let code = pulses();
        let mut decoder = GainDecoder::default();
        // largest pitch gain in the codebook
        let (gp, gc) = decoder.dec_gain(5, &code, false);
        assert!(gp > 0.9);

        let (egp, egc) = decoder.dec_gain(0, &code, true);
        assert!(egp <= 0.9);
        assert!((egc - gc * 0.98).abs() < 1e-6 * gc.max(1.0));

        let (egp2, _) = decoder.dec_gain(0, &code, true);
        assert!((egp2 - egp * 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_presel_stays_in_range() {
        for &gp in &[-1.0f32, 0.0, 0.5, 1.2, 5.0] {
            for &gc in &[-100.0f32, 0.0, 10.0, 1000.0] {
                for &g0 in &[0.1f32, 1.0, 50.0] {
                    let (c1, c2) = gbk_presel(&[gp, gc], g0);
                    assert!(c1 <= NCODE1 - NCAN1);
                    assert!(c2 <= NCODE2 - NCAN2);
                }
            }
        }
    }

    #[test]
    fn test_corr_xy2_terms() {
        let xn = [1.0f32; L_SUBFR];
        let y1 = [0.5f32; L_SUBFR];
        let y2 = [2.0f32; L_SUBFR];
        let c = corr_xy2(&xn, &y1, &y2);
        assert!((c[0] - 160.01).abs() < 1e-3);
        assert!((c[1] + 160.02).abs() < 1e-3);
        assert!((c[2] - 80.02).abs() < 1e-3);
    }
}

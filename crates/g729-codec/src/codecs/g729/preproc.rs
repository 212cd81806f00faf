//! Second order high-pass filters at the codec boundaries

use super::tables::{A100, A140, B100, B140};

/// Direct form I biquad with its four memory taps
#[derive(Debug, Clone)]
pub struct HighPass {
    b: [f32; 3],
    a: [f32; 3],
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl HighPass {
    fn with_coefficients(b: [f32; 3], a: [f32; 3]) -> Self {
        Self {
            b,
            a,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// 140 Hz cutoff, applied to the encoder input
    pub fn pre_process() -> Self {
        Self::with_coefficients(B140, A140)
    }

    /// 100 Hz cutoff, applied to the decoder output
    pub fn post_process() -> Self {
        Self::with_coefficients(B100, A100)
    }

    /// Clear the filter memory
    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }

    /// Filter `signal` in place
    pub fn filter(&mut self, signal: &mut [f32]) {
        for s in signal.iter_mut() {
            let x0 = *s;
            let y0 = self.y1 * self.a[1]
                + self.y2 * self.a[2]
                + x0 * self.b[0]
                + self.x1 * self.b[1]
                + self.x2 * self.b[2];
            *s = y0;

            self.x2 = self.x1;
            self.x1 = x0;
            self.y2 = self.y1;
            self.y1 = y0;
        }
    }
}

//! G.729 Constants
//!
//! Frame geometry, search limits and tuning constants of the floating-point
//! G.729 coder. Sample-domain quantities are `usize`, everything numeric is
//! `f32`.

use std::f32::consts::PI;

/// Frame size in samples (10ms at 8kHz)
pub const L_FRAME: usize = 80;

/// Subframe size in samples (5ms at 8kHz)
pub const L_SUBFR: usize = 40;

/// Total speech buffer size
pub const L_TOTAL: usize = 240;

/// LPC analysis window size
pub const L_WINDOW: usize = 240;

/// Lookahead samples for LP analysis
pub const L_NEXT: usize = 40;

/// LPC filter order
pub const M: usize = 10;

/// LPC filter order + 1
pub const MP1: usize = M + 1;

/// Half the LPC order, the degree of the sum/difference polynomials
pub const NC: usize = M / 2;

/// Minimum pitch lag
pub const PIT_MIN: usize = 20;

/// Maximum pitch lag
pub const PIT_MAX: usize = 143;

/// Length of interpolation filter
pub const L_INTERPOL: usize = 11;

/// Number of analysis parameters per frame
pub const PRM_SIZE: usize = 11;

/// Serial frame size in words (80 bits + 2 header words)
pub const SERIAL_SIZE: usize = 82;

/// Number of coded bits per frame
pub const BITS_PER_FRAME: usize = 80;

/// Packed payload size in bytes
pub const PAYLOAD_SIZE: usize = 10;

/// Serial frame synchronisation word
pub const SYNC_WORD: i16 = 0x6b21;

/// Serial frame size word
pub const SIZE_WORD: i16 = 80;

/// Soft bit for a 0
pub const BIT_0: i16 = 0x007f;

/// Soft bit for a 1
pub const BIT_1: i16 = 0x0081;

/// Bit widths of the 11 parameters, in transmission order
pub const BITSNO: [usize; PRM_SIZE] = [8, 10, 8, 1, 13, 4, 7, 5, 13, 4, 7];

// LSP quantizer

/// First stage codebook size
pub const NC0: usize = 128;
/// First stage index width
pub const NC0_B: u32 = 7;
/// Second stage codebook size
pub const NC1: usize = 32;
/// Second stage index width
pub const NC1_B: u32 = 5;
/// MA predictor order
pub const MA_NP: usize = 4;
/// Number of MA predictor modes
pub const MODE: usize = 2;

/// Lowest allowed LSF (radians)
pub const L_LIMIT: f32 = 0.005;
/// Highest allowed LSF (radians)
pub const M_LIMIT: f32 = 3.135;
/// Gap used when expanding the first split
pub const GAP1: f32 = 0.0012;
/// Gap used when expanding the second split
pub const GAP2: f32 = 0.0006;
/// Minimum distance between neighbouring LSFs
pub const GAP3: f32 = 0.0392;
/// Weighting threshold
pub const PI04: f32 = PI * 0.04;
/// Upper weighting threshold
pub const PI92: f32 = PI * 0.92;
/// Weighting scale
pub const CONST10: f32 = 10.0;
/// Extra weight of coefficients 4 and 5
pub const CONST12: f32 = 1.2;

/// Number of cosine grid intervals for the LSP root search
pub const GRID_POINTS: usize = 60;

// Pitch

/// Open-loop preference factor for shorter lags
pub const THRESHPIT: f32 = 0.85;
/// Upsampling factor of the fractional pitch interpolation
pub const UP_SAMP: usize = 3;
/// Half length of the correlation interpolation filter
pub const L_INTER4: usize = 4;
/// Half length of the excitation interpolation filter
pub const L_INTER10: usize = 10;

// Gains

/// Maximum adaptive codebook gain
pub const GAIN_PIT_MAX: f32 = 1.2;
/// Pitch gain clip when the pitch loop risks resonance
pub const GPCLIP: f32 = 0.95;
/// Unquantized pitch gain clip used by the gain presearch when taming
pub const GPCLIP2: f32 = 0.94;
/// Quantized pitch gain bound when taming
pub const GP0999: f32 = 0.9999;
/// Maximum pitch sharpening
pub const SHARPMAX: f32 = 0.7945;
/// Minimum pitch sharpening
pub const SHARPMIN: f32 = 0.2;
/// First gain codebook size
pub const NCODE1: usize = 8;
/// Second gain codebook size
pub const NCODE2: usize = 16;
/// Second gain index width
pub const NCODE2_B: u32 = 4;
/// Candidates kept from the first gain codebook
pub const NCAN1: usize = 4;
/// Candidates kept from the second gain codebook
pub const NCAN2: usize = 8;
/// Mean innovation energy (dB)
pub const MEAN_ENER: f32 = 36.0;
/// Initial and minimum past quantized energy (dB)
pub const MIN_QUA_ENER: f32 = -14.0;

// Taming

/// Excitation error threshold
pub const L_THRESH_ERR: f32 = 60000.0;

// Fixed codebook

/// Number of pulses in the algebraic codebook
pub const NB_PULSE: usize = 4;
/// Number of tracks
pub const NB_TRACK: usize = 5;
/// Positions per track
pub const STEP: usize = 5;
/// Search depth budget per subframe
pub const MAX_TIME: i32 = 75;
/// Extra budget granted on the first subframe
pub const EXTRA_TIME: i32 = 30;
/// Relative threshold of the focused search
pub const THRESHFCB: f32 = 0.40;

// Perceptual weighting

/// γ1 for steep spectra
pub const GAMMA1_0: f32 = 0.98;
/// Upper bound of the adaptive γ2 for steep spectra
pub const GAMMA2_0_H: f32 = 0.7;
/// Lower bound of the adaptive γ2 for steep spectra
pub const GAMMA2_0_L: f32 = 0.4;
/// γ1 for flat spectra
pub const GAMMA1_1: f32 = 0.94;
/// γ2 for flat spectra
pub const GAMMA2_1: f32 = 0.6;
/// Slope of γ2 against the minimum LSF distance
pub const ALPHA: f32 = -6.0;
/// Offset of γ2 against the minimum LSF distance
pub const BETA: f32 = 1.0;
/// First log-area ratio below which the spectrum turns steep
pub const THRESH_L1: f32 = -1.74;
/// First log-area ratio above which the spectrum turns flat again
pub const THRESH_L2: f32 = -1.52;
/// Second log-area ratio above which the spectrum turns steep
pub const THRESH_H1: f32 = 0.65;
/// Second log-area ratio below which the spectrum turns flat again
pub const THRESH_H2: f32 = 0.43;

// Postfilter

/// Numerator weighting of the short-term postfilter
pub const GAMMA2_PST: f32 = 0.55;
/// Denominator weighting of the short-term postfilter
pub const GAMMA1_PST: f32 = 0.7;
/// Harmonic postfilter factor
pub const GAMMA_G: f32 = 0.5;
/// Tilt factor for positive reflection coefficients
pub const GAMMA3_PLUS: f32 = 0.2;
/// Tilt factor for negative reflection coefficients
pub const GAMMA3_MINUS: f32 = 0.9;
/// Smallest harmonic weight
pub const MIN_GPLT: f32 = 1.0 / (1.0 + GAMMA_G);
/// Normalised correlation threshold of the fractional delay search
pub const THRESCRIT: f32 = 0.5;
/// AGC leak factor
pub const AGC_FAC: f32 = 0.9875;
/// AGC input factor
pub const AGC_FAC1: f32 = 1.0 - AGC_FAC;
/// Length of the truncated short-term impulse response
pub const LONG_H_ST: usize = 20;
/// Fractional delay resolution of the postfilter
pub const F_UP_PST: usize = 8;
/// Taps of the short interpolation filter
pub const LH2_S: usize = 4;
/// Taps of the long interpolation filter
pub const LH2_L: usize = 16;
/// Taps of the long filter ahead of the interpolated sample
pub const LH_UP_L: usize = LH2_L / 2;
/// Taps of the short filter ahead of the interpolated sample
pub const LH_UP_S: usize = LH2_S / 2;
/// History kept in front of the postfilter residual
pub const MEM_RES2: usize = PIT_MAX + 1 + LH_UP_L;
/// Postfilter residual buffer size
pub const SIZ_RES2: usize = MEM_RES2 + L_SUBFR;
/// Floor under which the signal energy is treated as unvoiced
pub const MIN_ENER: f32 = 0.1;

/// LSPs assumed before the first frame (cosine domain)
pub const LSP_INIT: [f32; M] = [
    0.9595, 0.8413, 0.6549, 0.4154, 0.1423, -0.1423, -0.4154, -0.6549, -0.8413, -0.9595,
];

/// Initial pitch delay of the decoder
pub const INIT_T0: usize = 60;

/// Seed of the concealment random generator
pub const INIT_SEED: i16 = 21845;

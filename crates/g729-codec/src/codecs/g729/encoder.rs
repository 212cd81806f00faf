//! G.729 Encoder
//!
//! Frame-level driver of the analysis-by-synthesis loop:
//! - 140 Hz high-pass pre-processing
//! - LP analysis, LSP quantization and interpolation
//! - Adaptive perceptual weighting and open-loop pitch
//! - Per subframe: closed-loop pitch, algebraic codebook and gain quantization
//!
//! Speech, weighted speech and excitation are kept in buffers with their
//! history in front and shifted by one frame at the end of each call.

use bytes::Buf;
use tracing::{debug, trace};

use super::acelp::AcelpSearch;
use super::bitstream::{prm_to_bytes, prm_to_serial, Params};
use super::constants::{
    GPCLIP, L_FRAME, L_INTERPOL, L_NEXT, L_SUBFR, L_TOTAL, L_WINDOW, LSP_INIT, M, MP1,
    PAYLOAD_SIZE, PIT_MAX, PRM_SIZE, SERIAL_SIZE, SHARPMAX, SHARPMIN,
};
use super::filter::{convolve, int_lpc, int_qlpc, residu, syn_filt, weight_az};
use super::gain::{corr_xy2, GainQuantizer};
use super::lpc::{autocorr, az_lsp, lag_window, levinson};
use super::lsp_quant::LspEncoderState;
use super::pitch::{enc_lag3, g_pitch, parity_pitch, pitch_fr3, pitch_ol, pred_lt_3, PitchWindow};
use super::preproc::HighPass;
use super::pwf::PerceptualWeighting;
use super::taming::Taming;
use crate::error::{CodecError, Result};
use crate::types::G729Parameters;
use crate::utils::validation::validate_frame_size;

/// First sample of the current frame in the speech buffer
const SPEECH: usize = L_TOTAL - L_FRAME - L_NEXT;
/// First new sample in the speech buffer
const NEW_SPEECH: usize = L_TOTAL - L_FRAME;
/// First sample of the analysis window
const WINDOW: usize = L_TOTAL - L_WINDOW;
/// First sample of the current frame in the weighted speech buffer
const WSP: usize = PIT_MAX;
/// First sample of the current frame in the excitation buffer
const EXC: usize = PIT_MAX + L_INTERPOL;

/// G.729 encoder state for one stream
#[derive(Debug, Clone)]
pub struct G729Encoder {
    /// Input speech: history, current frame and lookahead
    old_speech: [f32; L_TOTAL],
    /// Weighted speech with `PIT_MAX` samples of history
    old_wsp: [f32; L_FRAME + PIT_MAX],
    /// Excitation with enough history for the longest interpolated lag
    old_exc: [f32; L_FRAME + PIT_MAX + L_INTERPOL],
    /// Unquantized LSPs of the previous frame
    lsp_old: [f32; M],
    /// Quantized LSPs of the previous frame
    lsp_old_q: [f32; M],
    /// Synthesis filter memory
    mem_syn: [f32; M],
    /// Weighting filter memory of the weighted speech
    mem_w: [f32; M],
    /// Weighting filter memory of the target
    mem_w0: [f32; M],
    /// Error filter memory of the target
    mem_err: [f32; M],
    /// Pitch sharpening factor of the previous subframe
    sharp: f32,
    pre_filter: HighPass,
    pre_process: bool,
    lsp_quantizer: LspEncoderState,
    weighting: PerceptualWeighting,
    acelp: AcelpSearch,
    gain_quantizer: GainQuantizer,
    taming: Taming,
    frame_count: u64,
}

impl Default for G729Encoder {
    fn default() -> Self {
        Self::new()
    }
}

impl G729Encoder {
    /// Create an encoder with the default parameters
    pub fn new() -> Self {
        Self::with_parameters(&G729Parameters::default())
    }

    /// Create an encoder honouring `params.pre_process`
    pub fn with_parameters(params: &G729Parameters) -> Self {
        debug!(
            "Creating G.729 encoder: pre_process={}",
            params.pre_process
        );

        Self {
            old_speech: [0.0; L_TOTAL],
            old_wsp: [0.0; L_FRAME + PIT_MAX],
            old_exc: [0.0; L_FRAME + PIT_MAX + L_INTERPOL],
            lsp_old: LSP_INIT,
            lsp_old_q: LSP_INIT,
            mem_syn: [0.0; M],
            mem_w: [0.0; M],
            mem_w0: [0.0; M],
            mem_err: [0.0; M],
            sharp: SHARPMIN,
            pre_filter: HighPass::pre_process(),
            pre_process: params.pre_process,
            lsp_quantizer: LspEncoderState::new(),
            weighting: PerceptualWeighting::default(),
            acelp: AcelpSearch::new(),
            gain_quantizer: GainQuantizer::default(),
            taming: Taming::default(),
            frame_count: 0,
        }
    }

    /// Return to the initial state, keeping the parameters
    pub fn reset(&mut self) {
        *self = Self::with_parameters(&G729Parameters {
            pre_process: self.pre_process,
            ..G729Parameters::default()
        });
        debug!("G.729 encoder reset");
    }

    /// Number of frames analysed since creation or the last reset
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Encode one frame into a packed 10-byte payload
    pub fn encode(&mut self, pcm: &[i16]) -> Result<[u8; PAYLOAD_SIZE]> {
        let prm = self.analyze(pcm)?;
        Ok(prm_to_bytes(&prm))
    }

    /// Encode one frame into an 82-word serial frame
    pub fn encode_serial(&mut self, pcm: &[i16]) -> Result<[i16; SERIAL_SIZE]> {
        let prm = self.analyze(pcm)?;
        Ok(prm_to_serial(&prm))
    }

    /// Encode one frame given as 160 little-endian bytes
    pub fn encode_bytes(&mut self, data: &[u8]) -> Result<[u8; PAYLOAD_SIZE]> {
        if data.len() != 2 * L_FRAME {
            return Err(CodecError::InvalidFrameSize {
                expected: 2 * L_FRAME,
                actual: data.len(),
            });
        }

        let mut buf = data;
        let mut pcm = [0i16; L_FRAME];
        for s in pcm.iter_mut() {
            *s = buf.get_i16_le();
        }
        self.encode(&pcm)
    }

    /// Analyse one frame of 80 samples into its 11 parameters
    pub fn analyze(&mut self, pcm: &[i16]) -> Result<Params> {
        validate_frame_size(L_FRAME, pcm)?;

        let new_speech = &mut self.old_speech[NEW_SPEECH..];
        for (dst, &s) in new_speech.iter_mut().zip(pcm.iter()) {
            *dst = f32::from(s);
        }
        if self.pre_process {
            self.pre_filter.filter(new_speech);
        }

        let prm = self.coder();
        self.frame_count += 1;

        trace!(
            "G.729 encoded frame {}: lsp={:?} lags=({}, {})",
            self.frame_count,
            &prm[..2],
            prm[2],
            prm[7]
        );
        Ok(prm)
    }

    fn coder(&mut self) -> Params {
        let mut prm = [0u16; PRM_SIZE];

        // LP analysis and LSP quantization
        let mut r = autocorr(&self.old_speech[WINDOW..WINDOW + L_WINDOW]);
        lag_window(&mut r);
        let (a, rc, _) = levinson(&r);
        let lsp_new = az_lsp(&a, &self.lsp_old);

        let (lsp_new_q, codes) = self.lsp_quantizer.qua_lsp(&lsp_new);
        prm[0] = codes[0];
        prm[1] = codes[1];

        let (a_t, lsf_int, lsf_new) = int_lpc(&self.lsp_old, &lsp_new);
        let aq_t = int_qlpc(&self.lsp_old_q, &lsp_new_q);
        self.lsp_old = lsp_new;
        self.lsp_old_q = lsp_new_q;

        let gammas = self.weighting.perc_var(&lsf_int, &lsf_new, &rc);

        // weighted speech of the whole frame
        for (k, a_k) in a_t.iter().enumerate() {
            let ap1 = weight_az(a_k, gammas.gamma1[k]);
            let ap2 = weight_az(a_k, gammas.gamma2[k]);
            let sub = SPEECH + k * L_SUBFR;
            let wsp = WSP + k * L_SUBFR;

            let mut res = [0.0f32; L_SUBFR];
            residu(&ap1, &self.old_speech[sub - M..sub + L_SUBFR], &mut res);
            self.mem_w = syn_filt(
                &ap2,
                &res,
                &mut self.old_wsp[wsp..wsp + L_SUBFR],
                &self.mem_w,
            );
        }

        let t_op = pitch_ol(&self.old_wsp, WSP);
        let mut window = PitchWindow::open_loop(t_op);

        let mut ana = 2;
        for (k, i_subfr) in (0..L_FRAME).step_by(L_SUBFR).enumerate() {
            let aq = &aq_t[k];
            let ap1 = weight_az(&a_t[k], gammas.gamma1[k]);
            let ap2 = weight_az(&a_t[k], gammas.gamma2[k]);
            let sub = SPEECH + i_subfr;
            let exc = EXC + i_subfr;

            let h1 = impulse_response(aq, &ap1, &ap2);

            // LPC residual as the first guess of the excitation
            residu(
                aq,
                &self.old_speech[sub - M..sub + L_SUBFR],
                &mut self.old_exc[exc..exc + L_SUBFR],
            );

            // target of the pitch search
            let mut error = [0.0f32; M + L_SUBFR];
            error[..M].copy_from_slice(&self.mem_err);
            syn_filt(
                aq,
                &self.old_exc[exc..exc + L_SUBFR],
                &mut error[M..],
                &self.mem_err,
            );
            let mut res = [0.0f32; L_SUBFR];
            residu(&ap1, &error, &mut res);
            let mut xn = [0.0f32; L_SUBFR];
            syn_filt(&ap2, &res, &mut xn, &self.mem_w0);

            // adaptive codebook
            let (t0, frac) = pitch_fr3(&self.old_exc, exc, &xn, &h1, window, i_subfr);
            let index = enc_lag3(t0, frac, &mut window, i_subfr);
            prm[ana] = index;
            ana += 1;
            if i_subfr == 0 {
                prm[ana] = parity_pitch(index);
                ana += 1;
            }

            pred_lt_3(&mut self.old_exc, exc, t0, frac);
            let mut y1 = [0.0f32; L_SUBFR];
            convolve(&self.old_exc[exc..exc + L_SUBFR], &h1, &mut y1);

            let (mut gain_pit, g_coeff) = g_pitch(&xn, &y1);
            let tame = self.taming.test_err(t0, frac);
            if tame && gain_pit > GPCLIP {
                gain_pit = GPCLIP;
            }

            // fixed codebook
            let mut xn2 = [0.0f32; L_SUBFR];
            for i in 0..L_SUBFR {
                xn2[i] = xn[i] - y1[i] * gain_pit;
            }
            let cw = self.acelp.codebook(&xn2, &h1, t0, self.sharp, i_subfr);
            prm[ana] = cw.index;
            prm[ana + 1] = cw.sign;
            ana += 2;

            // gains
            let [y2y2, xny2, y1y2] = corr_xy2(&xn, &y1, &cw.y);
            let coeff = [g_coeff[0], g_coeff[1], y2y2, xny2, y1y2];
            let (gain_index, gain_pit, gain_code) =
                self.gain_quantizer.qua_gain(&cw.code, &coeff, tame);
            prm[ana] = gain_index;
            ana += 1;

            self.sharp = gain_pit.clamp(SHARPMIN, SHARPMAX);

            // excitation and memory updates
            for (e, &c) in self.old_exc[exc..exc + L_SUBFR].iter_mut().zip(cw.code.iter()) {
                *e = gain_pit * *e + gain_code * c;
            }
            self.taming.update_exc_err(gain_pit, t0);

            let mut synth = [0.0f32; L_SUBFR];
            self.mem_syn = syn_filt(
                aq,
                &self.old_exc[exc..exc + L_SUBFR],
                &mut synth,
                &self.mem_syn,
            );

            for j in 0..M {
                let i = L_SUBFR - M + j;
                self.mem_err[j] = self.old_speech[sub + i] - synth[i];
                self.mem_w0[j] = xn[i] - gain_pit * y1[i] - gain_code * cw.y[i];
            }
        }

        self.old_speech.copy_within(L_FRAME.., 0);
        self.old_wsp.copy_within(L_FRAME.., 0);
        self.old_exc.copy_within(L_FRAME.., 0);

        prm
    }
}

/// Impulse response of the weighted synthesis filter
/// `A(z/γ1) / (Â(z) A(z/γ2))`
fn impulse_response(aq: &[f32; MP1], ap1: &[f32; MP1], ap2: &[f32; MP1]) -> [f32; L_SUBFR] {
    let mut x = [0.0f32; L_SUBFR];
    x[..MP1].copy_from_slice(ap1);

    let mut tmp = [0.0f32; L_SUBFR];
    syn_filt(aq, &x, &mut tmp, &[0.0; M]);
    let mut h1 = [0.0f32; L_SUBFR];
    syn_filt(ap2, &tmp, &mut h1, &[0.0; M]);
    h1
}

use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Response of the region magnetization at the drive frequency.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ResonanceResponse {
    /// Amplitude of the Fourier component of `m_R(t)` at the drive frequency.
    pub amplitude: f64,
    /// Lag of the response behind the drive, in radians, wrapped to `(-pi, pi]`.
    pub phase_lag: f64,
    /// `amplitude / drive amplitude`; 0 when the drive is switched off.
    pub spectral_amplification: f64,
}

/// Streaming projection of a per-epoch series onto `exp(-i(2*pi*f*t + phase))`.
///
/// The series mean is removed from the projection so that a finite window
/// that is not a whole number of periods does not leak the DC level into
/// the response.
#[derive(Clone, Debug)]
pub struct ResonanceAccum {
    frequency: f64,
    phase: f64,
    n: usize,
    sum: f64,
    /// Sum of `x(t) * exp(-i theta(t))`.
    proj_re: f64,
    proj_im: f64,
    /// Sum of `exp(-i theta(t))`.
    basis_re: f64,
    basis_im: f64,
}

impl ResonanceAccum {
    pub fn new(frequency: f64, phase: f64) -> Self {
        Self {
            frequency,
            phase,
            n: 0,
            sum: 0.0,
            proj_re: 0.0,
            proj_im: 0.0,
            basis_re: 0.0,
            basis_im: 0.0,
        }
    }

    pub fn push(&mut self, epoch: u64, value: f64) {
        let theta = TAU * self.frequency * epoch as f64 + self.phase;
        let (sin, cos) = theta.sin_cos();
        self.n += 1;
        self.sum += value;
        self.proj_re += value * cos;
        self.proj_im -= value * sin;
        self.basis_re += cos;
        self.basis_im -= sin;
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn finish(&self, drive_amplitude: f64) -> ResonanceResponse {
        if self.n == 0 {
            return ResonanceResponse::default();
        }
        let n = self.n as f64;
        let mean = self.sum / n;
        let re = 2.0 * (self.proj_re - mean * self.basis_re) / n;
        let im = 2.0 * (self.proj_im - mean * self.basis_im) / n;
        let amplitude = re.hypot(im);

        // A response A*sin(theta - lag) projects to A*exp(-i(lag + pi/2)).
        let phase_lag = if amplitude > 0.0 {
            wrap_angle(-im.atan2(re) - FRAC_PI_2)
        } else {
            0.0
        };
        let spectral_amplification = if drive_amplitude != 0.0 {
            amplitude / drive_amplitude.abs()
        } else {
            0.0
        };

        ResonanceResponse {
            amplitude,
            phase_lag,
            spectral_amplification,
        }
    }
}

fn wrap_angle(a: f64) -> f64 {
    let w = a.rem_euclid(TAU);
    if w > PI {
        w - TAU
    } else {
        w
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Antenna channels: a body-frame location, a complex polarization, a pair of
//! interpolated radiation-pattern cuts and optional per-pulse / waveform-time
//! modulations.

use glam::DVec3;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use crate::math::{db_to_amplitude, CVec3};

fn default_polarization() -> [Complex64; 3] {
    [
        Complex64::new(0.0, 0.0),
        Complex64::new(0.0, 0.0),
        Complex64::new(1.0, 0.0),
    ]
}

fn default_enabled() -> bool {
    true
}

/// The serialisable description of one antenna channel. Shared by transmitter
/// and receiver channel lists; the receiver ignores the modulation fields.
/// Angles in degrees, gains in dB.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelConfig {
    /// Body-frame location \[m\].
    #[serde(default)]
    pub location: [f64; 3],

    /// Complex polarization vector in the body frame. Defaults to vertical.
    #[serde(default = "default_polarization")]
    pub polarization: [Complex64; 3],

    /// Azimuth pattern angles \[deg\]; empty means isotropic.
    #[serde(default)]
    pub az_angles: Vec<f64>,

    /// Azimuth pattern gains \[dB\].
    #[serde(default)]
    pub az_patterns: Vec<f64>,

    /// Elevation pattern angles \[deg\]; empty means isotropic.
    #[serde(default)]
    pub el_angles: Vec<f64>,

    /// Elevation pattern gains \[dB\].
    #[serde(default)]
    pub el_patterns: Vec<f64>,

    /// Boresight antenna gain \[dB\].
    #[serde(default)]
    pub antenna_gain: f64,

    /// Channel delay \[s\]. Only meaningful on transmit channels.
    #[serde(default)]
    pub delay: f64,

    /// Per-pulse complex modulation weights; length must equal the pulse
    /// count. Only meaningful on transmit channels.
    #[serde(default)]
    pub pulse_mod: Option<Vec<Complex64>>,

    /// Piecewise-constant modulation over waveform time. Only meaningful on
    /// transmit channels.
    #[serde(default)]
    pub waveform_mod: Option<WaveformModConfig>,

    /// Ray-grid spacing override for this channel \[deg\]. When unset the grid
    /// spacing follows the ray density.
    #[serde(default)]
    pub grid: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WaveformModConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub t: Vec<f64>,
    pub var: Vec<Complex64>,
}

/// One radiation-pattern cut: gain in dB over sorted angles, linearly
/// interpolated. Angles outside the tabulated range radiate nothing (−∞ dB).
#[derive(Clone, Debug)]
pub(crate) struct AntennaPattern {
    angles_rad: Vec<f64>,
    gains_db: Vec<f64>,
}

impl AntennaPattern {
    pub(crate) fn new(angles_deg: &[f64], gains_db: &[f64]) -> Result<AntennaPattern, ConfigError> {
        if angles_deg.len() != gains_db.len() {
            return Err(ConfigError::PatternLength {
                angles: angles_deg.len(),
                gains: gains_db.len(),
            });
        }
        for (i, pair) in angles_deg.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(ConfigError::PatternNotSorted { index: i + 1 });
            }
        }
        Ok(AntennaPattern {
            angles_rad: angles_deg.iter().map(|a| a.to_radians()).collect(),
            gains_db: gains_db.to_vec(),
        })
    }

    /// Gain at an angle \[dB\]. An empty pattern is isotropic.
    pub(crate) fn gain_db(&self, angle_rad: f64) -> f64 {
        if self.angles_rad.is_empty() {
            return 0.0;
        }
        let n = self.angles_rad.len();
        if angle_rad < self.angles_rad[0] || angle_rad > self.angles_rad[n - 1] {
            return f64::NEG_INFINITY;
        }
        if n == 1 {
            return self.gains_db[0];
        }
        let k = self
            .angles_rad
            .partition_point(|&a| a <= angle_rad)
            .saturating_sub(1)
            .min(n - 2);
        let span = self.angles_rad[k + 1] - self.angles_rad[k];
        let frac = (angle_rad - self.angles_rad[k]) / span;
        self.gains_db[k] + (self.gains_db[k + 1] - self.gains_db[k]) * frac
    }
}

/// Piecewise-constant complex modulation over waveform time.
#[derive(Clone, Debug)]
pub(crate) struct WaveformMod {
    times_s: Vec<f64>,
    weights: Vec<Complex64>,
}

impl WaveformMod {
    fn new(config: &WaveformModConfig) -> Result<WaveformMod, ConfigError> {
        if config.t.len() != config.var.len() {
            return Err(ConfigError::WaveformModLength {
                times: config.t.len(),
                weights: config.var.len(),
            });
        }
        for (i, pair) in config.t.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(ConfigError::WaveformModNotSorted { index: i + 1 });
            }
        }
        Ok(WaveformMod {
            times_s: config.t.clone(),
            weights: config.var.clone(),
        })
    }

    /// The weight in force at local time τ. Before the first knot the signal
    /// is unmodulated.
    pub(crate) fn weight(&self, tau: f64) -> Complex64 {
        match self.times_s.partition_point(|&t| t <= tau) {
            0 => Complex64::new(1.0, 0.0),
            k => self.weights[k - 1],
        }
    }
}

/// A validated transmit channel.
#[derive(Clone, Debug)]
pub(crate) struct TxChannel {
    pub location: DVec3,
    pub polarization: CVec3,
    pub azimuth: AntennaPattern,
    pub elevation: AntennaPattern,
    pub antenna_gain_db: f64,
    pub delay_s: f64,
    pub pulse_mod: Option<Vec<Complex64>>,
    pub waveform_mod: Option<WaveformMod>,
    pub grid_rad: Option<f64>,
}

impl TxChannel {
    pub(crate) fn new(config: &ChannelConfig, num_pulses: usize) -> Result<TxChannel, ConfigError> {
        if let Some(weights) = &config.pulse_mod {
            if weights.len() != num_pulses {
                return Err(ConfigError::PulseModCount {
                    got: weights.len(),
                    pulses: num_pulses,
                });
            }
        }
        let waveform_mod = match &config.waveform_mod {
            Some(wm) if wm.enabled => Some(WaveformMod::new(wm)?),
            _ => None,
        };
        Ok(TxChannel {
            location: DVec3::from(config.location),
            polarization: CVec3::from(config.polarization).normalize(),
            azimuth: AntennaPattern::new(&config.az_angles, &config.az_patterns)?,
            elevation: AntennaPattern::new(&config.el_angles, &config.el_patterns)?,
            antenna_gain_db: config.antenna_gain,
            delay_s: config.delay,
            pulse_mod: config.pulse_mod.clone(),
            waveform_mod,
            grid_rad: config.grid.map(|g| g.to_radians()),
        })
    }

    /// Amplitude gain toward a body-frame direction given as (azimuth,
    /// elevation) \[rad\]. Zero outside the pattern.
    pub(crate) fn gain_amplitude(&self, az: f64, el: f64) -> f64 {
        let db = self.antenna_gain_db + self.azimuth.gain_db(az) + self.elevation.gain_db(el);
        if db.is_finite() {
            db_to_amplitude(db)
        } else {
            0.0
        }
    }

    pub(crate) fn pulse_weight(&self, pulse: usize) -> Complex64 {
        match &self.pulse_mod {
            Some(weights) => weights[pulse],
            None => Complex64::new(1.0, 0.0),
        }
    }

    pub(crate) fn waveform_weight(&self, tau: f64) -> Complex64 {
        match &self.waveform_mod {
            Some(wm) => wm.weight(tau),
            None => Complex64::new(1.0, 0.0),
        }
    }
}

/// A validated receive channel.
#[derive(Clone, Debug)]
pub(crate) struct RxChannel {
    pub location: DVec3,
    pub polarization: CVec3,
    pub azimuth: AntennaPattern,
    pub elevation: AntennaPattern,
    pub antenna_gain_db: f64,
}

impl RxChannel {
    pub(crate) fn new(config: &ChannelConfig) -> Result<RxChannel, ConfigError> {
        Ok(RxChannel {
            location: DVec3::from(config.location),
            polarization: CVec3::from(config.polarization).normalize(),
            azimuth: AntennaPattern::new(&config.az_angles, &config.az_patterns)?,
            elevation: AntennaPattern::new(&config.el_angles, &config.el_patterns)?,
            antenna_gain_db: config.antenna_gain,
        })
    }

    pub(crate) fn gain_amplitude(&self, az: f64, el: f64) -> f64 {
        let db = self.antenna_gain_db + self.azimuth.gain_db(az) + self.elevation.gain_db(el);
        if db.is_finite() {
            db_to_amplitude(db)
        } else {
            0.0
        }
    }
}

impl Default for ChannelConfig {
    fn default() -> ChannelConfig {
        ChannelConfig {
            location: [0.0; 3],
            polarization: default_polarization(),
            az_angles: vec![],
            az_patterns: vec![],
            el_angles: vec![],
            el_patterns: vec![],
            antenna_gain: 0.0,
            delay: 0.0,
            pulse_mod: None,
            waveform_mod: None,
            grid: None,
        }
    }
}

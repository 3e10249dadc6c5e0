// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The radar state model: transmitter chain, receiver chain and platform
//! motion, validated from their serialisable configs into the internal
//! radians/metres/linear representation.

mod channel;
mod error;
mod waveform;

pub use channel::{ChannelConfig, WaveformModConfig};
pub(crate) use channel::{RxChannel, TxChannel};
pub use error::ConfigError;
pub(crate) use waveform::Waveform;

use glam::{DMat3, DVec3};
use ndarray::Array3;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use vec1::Vec1;

use crate::math::{dbm_to_watts, EulerZyx};
use crate::motion::{Attitude, Kinematic};

fn default_density() -> f64 {
    1.0
}

fn default_load_resistor() -> f64 {
    500.0
}

/// Transmitter description. Powers in dBm, frequencies in Hz, times in
/// seconds.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransmitterConfig {
    /// Transmit power \[dBm\].
    pub tx_power: f64,

    /// Frequency grid of one pulse \[Hz\].
    pub f: Vec<f64>,

    /// Time grid of one pulse \[s\].
    pub t: Vec<f64>,

    /// Per-pulse frequency offsets \[Hz\]; empty means all zero.
    #[serde(default)]
    pub f_offset: Vec<f64>,

    /// Start time of each pulse within a frame \[s\].
    pub pulse_start_time: Vec<f64>,

    /// Optional explicit pulse count; must agree with `pulse_start_time`.
    #[serde(default)]
    pub pulses: Option<usize>,

    /// Ray density for mesh targets \[rays per wavelength\].
    #[serde(default = "default_density")]
    pub density: f64,

    pub channels: Vec<ChannelConfig>,
}

/// How baseband samples are produced: complex I/Q or real only.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BasebandType {
    #[default]
    Complex,
    Real,
}

/// Receiver description. Gains in dB, resistance in ohms.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReceiverConfig {
    /// Sampling frequency \[Hz\].
    pub fs: f64,

    /// RF chain power gain \[dB\].
    #[serde(default)]
    pub rf_gain: f64,

    /// Detector load resistance \[Ω\].
    #[serde(default = "default_load_resistor")]
    pub load_resistor: f64,

    /// Baseband amplifier voltage gain \[dB\].
    #[serde(default)]
    pub baseband_gain: f64,

    /// Baseband bandwidth \[Hz\]. Sets the noise bandwidth.
    pub baseband_bw: f64,

    /// Receiver noise figure \[dB\].
    #[serde(default)]
    pub noise_figure: f64,

    #[serde(default)]
    pub bb_type: BasebandType,

    /// Fast-time samples per pulse. Defaults to ⌊pulse duration × fs⌋.
    #[serde(default)]
    pub samples: Option<usize>,

    pub channels: Vec<ChannelConfig>,
}

/// Platform motion. Scalars here; per-sample tensors attach through
/// [Radar::with_sampled_motion]. Angles in degrees.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlatformConfig {
    #[serde(default)]
    pub location: [f64; 3],

    #[serde(default)]
    pub speed: [f64; 3],

    /// (yaw, pitch, roll) \[deg\].
    #[serde(default)]
    pub rotation: [f64; 3],

    /// (yaw, pitch, roll) rates \[deg/s\].
    #[serde(default)]
    pub rotation_rate: [f64; 3],
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RadarConfig {
    pub transmitter: TransmitterConfig,
    pub receiver: ReceiverConfig,
    #[serde(default)]
    pub motion: PlatformConfig,
}

/// Receiver chain parameters after validation.
#[derive(Clone, Debug)]
pub(crate) struct Receiver {
    pub fs: f64,
    pub rf_gain_db: f64,
    pub load_resistor: f64,
    pub baseband_gain_db: f64,
    pub baseband_bw: f64,
    pub noise_figure_db: f64,
    pub bb_type: BasebandType,
    pub channels: Vec1<RxChannel>,
}

impl Receiver {
    /// Received power → baseband voltage: an incident power P becomes an
    /// amplitude `sqrt(P · G_rf · R_load) · 10^(G_bb/20)` \[V/√W\].
    pub(crate) fn chain_amplitude(&self) -> f64 {
        (crate::math::db_to_power(self.rf_gain_db) * self.load_resistor).sqrt()
            * crate::math::db_to_amplitude(self.baseband_gain_db)
    }
}

/// How the flattened channel axis maps to (frame, tx, rx).
#[derive(Clone, Copy, Debug)]
pub(crate) struct ChannelLayout {
    pub frames: usize,
    pub num_tx: usize,
    pub num_rx: usize,
}

impl ChannelLayout {
    pub(crate) fn num_channels(&self) -> usize {
        self.frames * self.num_tx * self.num_rx
    }

    pub(crate) fn decompose(&self, ch: usize) -> (usize, usize, usize) {
        let frame = ch / (self.num_tx * self.num_rx);
        let tx = (ch / self.num_rx) % self.num_tx;
        let rx = ch % self.num_rx;
        (frame, tx, rx)
    }

    pub(crate) fn flat(&self, frame: usize, tx: usize, rx: usize) -> usize {
        frame * self.num_tx * self.num_rx + tx * self.num_rx + rx
    }
}

/// The platform's pose at one instant.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PlatformPose {
    pub rotation: DMat3,
    pub rotation_inv: DMat3,
    pub location: DVec3,
    pub velocity: DVec3,
    pub omega: DVec3,
}

impl PlatformPose {
    pub(crate) fn antenna_position(&self, body_location: DVec3) -> DVec3 {
        self.location + self.rotation * body_location
    }

    pub(crate) fn antenna_velocity(&self, body_location: DVec3) -> DVec3 {
        self.velocity + self.omega.cross(self.rotation * body_location)
    }

    /// A world direction expressed in the body frame.
    pub(crate) fn dir_to_body(&self, d_world: DVec3) -> DVec3 {
        self.rotation_inv * d_world
    }
}

/// A fully validated radar: waveform, channels, receiver chain and platform
/// motion. Construct with [Radar::new]; the engine borrows it immutably for
/// the duration of a simulation call.
#[derive(Clone, Debug)]
pub struct Radar {
    pub(crate) waveform: Waveform,
    pub(crate) tx_power_w: f64,
    pub(crate) density: f64,
    pub(crate) tx: Vec1<TxChannel>,
    pub(crate) rx: Receiver,
    pub(crate) samples_per_pulse: usize,
    pub(crate) kinematic: Kinematic,
    pub(crate) attitude: Attitude,
    pub(crate) phase_noise: Option<Array3<Complex64>>,
}

impl Radar {
    pub fn new(config: &RadarConfig) -> Result<Radar, ConfigError> {
        let txc = &config.transmitter;
        let rxc = &config.receiver;

        let waveform = Waveform::new(
            txc.f.clone(),
            txc.t.clone(),
            txc.f_offset.clone(),
            txc.pulse_start_time.clone(),
        )?;
        if let Some(stated) = txc.pulses {
            if stated != waveform.num_pulses() {
                return Err(ConfigError::PulseCountMismatch {
                    stated,
                    got: waveform.num_pulses(),
                });
            }
        }
        if txc.density <= 0.0 {
            return Err(ConfigError::NonPositiveDensity(txc.density));
        }

        let tx_channels: Vec<TxChannel> = txc
            .channels
            .iter()
            .map(|c| TxChannel::new(c, waveform.num_pulses()))
            .collect::<Result<_, _>>()?;
        let tx = Vec1::try_from_vec(tx_channels).map_err(|_| ConfigError::NoTxChannels)?;

        if rxc.fs <= 0.0 {
            return Err(ConfigError::NonPositiveSampleRate(rxc.fs));
        }
        let samples_per_pulse = match rxc.samples {
            Some(s) => s,
            None => (waveform.duration() * rxc.fs).floor() as usize,
        };
        if samples_per_pulse == 0 {
            return Err(ConfigError::ZeroSamples);
        }
        let rx_channels: Vec<RxChannel> = rxc
            .channels
            .iter()
            .map(RxChannel::new)
            .collect::<Result<_, _>>()?;
        let rx_channels = Vec1::try_from_vec(rx_channels).map_err(|_| ConfigError::NoRxChannels)?;

        let kinematic = Kinematic::Uniform {
            position: DVec3::from(config.motion.location),
            velocity: DVec3::from(config.motion.speed),
        };
        let attitude = Attitude::Uniform {
            euler: EulerZyx::from_degrees(
                config.motion.rotation[0],
                config.motion.rotation[1],
                config.motion.rotation[2],
            ),
            rate: EulerZyx::from_degrees(
                config.motion.rotation_rate[0],
                config.motion.rotation_rate[1],
                config.motion.rotation_rate[2],
            ),
        };
        if !kinematic.is_finite() || !attitude.is_finite() {
            return Err(ConfigError::NonFiniteMotion);
        }

        Ok(Radar {
            waveform,
            tx_power_w: dbm_to_watts(txc.tx_power),
            density: txc.density,
            tx,
            rx: Receiver {
                fs: rxc.fs,
                rf_gain_db: rxc.rf_gain,
                load_resistor: rxc.load_resistor,
                baseband_gain_db: rxc.baseband_gain,
                baseband_bw: rxc.baseband_bw,
                noise_figure_db: rxc.noise_figure,
                bb_type: rxc.bb_type,
                channels: rx_channels,
            },
            samples_per_pulse,
            kinematic,
            attitude,
            phase_noise: None,
        })
    }

    /// Replace the platform's uniform motion with per-sample tables. Shapes
    /// are validated against the timestamp tensor at simulation entry.
    pub fn with_sampled_motion(
        mut self,
        positions: Array3<DVec3>,
        velocity: DVec3,
        eulers: Array3<EulerZyx>,
        rate: EulerZyx,
    ) -> Radar {
        self.kinematic = Kinematic::Sampled {
            positions,
            velocity,
        };
        self.attitude = Attitude::Sampled { eulers, rate };
        self
    }

    /// Attach a per-sample complex phase-noise multiplier with the shape of
    /// the timestamp tensor. Validated at simulation entry.
    pub fn with_phase_noise(mut self, phase_noise: Array3<Complex64>) -> Radar {
        self.phase_noise = Some(phase_noise);
        self
    }

    pub(crate) fn tx_channels(&self) -> &Vec1<TxChannel> {
        &self.tx
    }

    pub(crate) fn rx_channels(&self) -> &Vec1<RxChannel> {
        &self.rx.channels
    }

    pub(crate) fn num_samples(&self) -> usize {
        self.samples_per_pulse
    }

    pub(crate) fn layout(&self, frames: usize) -> ChannelLayout {
        ChannelLayout {
            frames,
            num_tx: self.tx.len(),
            num_rx: self.rx.channels.len(),
        }
    }

    /// The timestamp tensor `ts[ch, p, s]` \[s\]:
    /// `frame_start[frame(ch)] + pulse_start[p] + s/fs + tx_delay[ch]`.
    pub(crate) fn timestamps(&self, frame_times: &[f64]) -> Result<Array3<f64>, ConfigError> {
        if frame_times.is_empty() {
            return Err(ConfigError::FrameTimesEmpty);
        }
        for (i, pair) in frame_times.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(ConfigError::FrameTimesNotIncreasing { index: i + 1 });
            }
        }
        let layout = self.layout(frame_times.len());
        let num_pulses = self.waveform.num_pulses();
        let mut ts = Array3::zeros((layout.num_channels(), num_pulses, self.samples_per_pulse));
        for ch in 0..layout.num_channels() {
            let (frame, tx, _) = layout.decompose(ch);
            let delay = self.tx[tx].delay_s;
            for p in 0..num_pulses {
                let base = frame_times[frame] + self.waveform.pulse_start(p) + delay;
                for s in 0..self.samples_per_pulse {
                    ts[[ch, p, s]] = base + s as f64 / self.rx.fs;
                }
                for s in 1..self.samples_per_pulse {
                    if ts[[ch, p, s]] <= ts[[ch, p, s - 1]] {
                        return Err(ConfigError::TimestampsNotMonotone {
                            channel: ch,
                            pulse: p,
                        });
                    }
                }
            }
        }
        Ok(ts)
    }

    pub(crate) fn platform_pose(&self, idx: (usize, usize, usize), t: f64) -> PlatformPose {
        let rotation = self.attitude.euler(idx, t).matrix();
        PlatformPose {
            rotation,
            rotation_inv: rotation.transpose(),
            location: self.kinematic.position(idx, t),
            velocity: self.kinematic.velocity(),
            omega: self.attitude.omega(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    pub(crate) fn simple_radar_config() -> RadarConfig {
        RadarConfig {
            transmitter: TransmitterConfig {
                tx_power: 10.0,
                f: vec![77e9 - 250e6, 77e9 + 250e6],
                t: vec![0.0, 50e-6],
                f_offset: vec![],
                pulse_start_time: (0..4).map(|p| p as f64 * 100e-6).collect(),
                pulses: Some(4),
                density: 1.0,
                channels: vec![ChannelConfig::default()],
            },
            receiver: ReceiverConfig {
                fs: 20e6,
                rf_gain: 20.0,
                load_resistor: 500.0,
                baseband_gain: 30.0,
                baseband_bw: 20e6,
                noise_figure: 0.0,
                bb_type: BasebandType::Complex,
                samples: Some(128),
                channels: vec![ChannelConfig::default()],
            },
            motion: PlatformConfig::default(),
        }
    }

    #[test]
    fn layout_round_trip() {
        let layout = ChannelLayout {
            frames: 2,
            num_tx: 3,
            num_rx: 4,
        };
        for ch in 0..layout.num_channels() {
            let (f, t, r) = layout.decompose(ch);
            assert_eq!(layout.flat(f, t, r), ch);
        }
    }

    #[test]
    fn timestamps_follow_the_layout() {
        let radar = Radar::new(&simple_radar_config()).unwrap();
        let ts = radar.timestamps(&[0.0, 1.0]).unwrap();
        assert_eq!(ts.dim(), (2, 4, 128));
        // Second frame, second pulse, third sample.
        assert_abs_diff_eq!(ts[[1, 1, 2]], 1.0 + 100e-6 + 2.0 / 20e6, epsilon = 1e-12);
        // Monotone in fast time.
        assert!(ts[[0, 0, 1]] > ts[[0, 0, 0]]);
    }

    #[test]
    fn samples_default_to_pulse_length() {
        let mut config = simple_radar_config();
        config.receiver.samples = None;
        let radar = Radar::new(&config).unwrap();
        assert_eq!(radar.num_samples(), 1000);
    }

    #[test]
    fn rejects_pulse_count_mismatch() {
        let mut config = simple_radar_config();
        config.transmitter.pulses = Some(5);
        assert!(matches!(
            Radar::new(&config),
            Err(ConfigError::PulseCountMismatch { stated: 5, got: 4 })
        ));
    }

    #[test]
    fn rejects_empty_channel_lists() {
        let mut config = simple_radar_config();
        config.receiver.channels.clear();
        assert!(matches!(
            Radar::new(&config),
            Err(ConfigError::NoRxChannels)
        ));
    }

    #[test]
    fn rejects_bad_frame_times() {
        let radar = Radar::new(&simple_radar_config()).unwrap();
        assert!(radar.timestamps(&[]).is_err());
        assert!(radar.timestamps(&[0.0, 0.0]).is_err());
    }
}

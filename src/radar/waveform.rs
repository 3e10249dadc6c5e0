// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The transmit waveform: a piecewise-linear frequency-vs-time profile of one
//! pulse, repeated at the pulse start times with per-pulse frequency offsets.

use crate::constants::TAU;

use super::error::ConfigError;

/// A validated waveform. The instantaneous phase of pulse `p` at local time
/// τ ∈ \[t\[0\], t\[K−1\]\] is 2π·∫(f(τ′) + f_off\[p\]) dτ′, with f linearly
/// interpolated on the grid. The cumulative integral is precomputed once in
/// O(K) so each phase evaluation is a binary search plus one trapezoid.
#[derive(Clone, Debug)]
pub(crate) struct Waveform {
    freq_hz: Vec<f64>,
    time_s: Vec<f64>,
    /// ∫ f dt from t\[0\] to t\[k\] \[cycles\].
    cum_cycles: Vec<f64>,
    freq_offset_hz: Vec<f64>,
    pulse_start_time_s: Vec<f64>,
}

impl Waveform {
    pub(crate) fn new(
        freq_hz: Vec<f64>,
        time_s: Vec<f64>,
        freq_offset_hz: Vec<f64>,
        pulse_start_time_s: Vec<f64>,
    ) -> Result<Waveform, ConfigError> {
        if freq_hz.len() != time_s.len() {
            return Err(ConfigError::WaveformGridLength {
                freq: freq_hz.len(),
                time: time_s.len(),
            });
        }
        if freq_hz.len() < 2 {
            return Err(ConfigError::WaveformTooShort(freq_hz.len()));
        }
        if freq_hz.iter().chain(time_s.iter()).any(|v| !v.is_finite()) {
            return Err(ConfigError::NonFiniteWaveform);
        }
        for (i, pair) in time_s.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(ConfigError::TimeGridNotIncreasing { index: i + 1 });
            }
        }
        if pulse_start_time_s.is_empty() {
            return Err(ConfigError::NoPulses);
        }
        for (i, pair) in pulse_start_time_s.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(ConfigError::PulseStartNotIncreasing { index: i + 1 });
            }
        }
        let freq_offset_hz = if freq_offset_hz.is_empty() {
            vec![0.0; pulse_start_time_s.len()]
        } else if freq_offset_hz.len() == pulse_start_time_s.len() {
            freq_offset_hz
        } else {
            return Err(ConfigError::FreqOffsetCount {
                got: freq_offset_hz.len(),
                pulses: pulse_start_time_s.len(),
            });
        };
        if freq_offset_hz
            .iter()
            .chain(pulse_start_time_s.iter())
            .any(|v| !v.is_finite())
        {
            return Err(ConfigError::NonFiniteWaveform);
        }

        let mut cum_cycles = Vec::with_capacity(time_s.len());
        cum_cycles.push(0.0);
        for k in 1..time_s.len() {
            let dt = time_s[k] - time_s[k - 1];
            let segment = 0.5 * (freq_hz[k] + freq_hz[k - 1]) * dt;
            cum_cycles.push(cum_cycles[k - 1] + segment);
        }

        Ok(Waveform {
            freq_hz,
            time_s,
            cum_cycles,
            freq_offset_hz,
            pulse_start_time_s,
        })
    }

    pub(crate) fn num_pulses(&self) -> usize {
        self.pulse_start_time_s.len()
    }

    pub(crate) fn pulse_start(&self, pulse: usize) -> f64 {
        self.pulse_start_time_s[pulse]
    }

    /// Length of the pulse window \[s\].
    pub(crate) fn duration(&self) -> f64 {
        self.time_s[self.time_s.len() - 1] - self.time_s[0]
    }

    /// First grid time: local time of the first fast-time sample \[s\].
    pub(crate) fn start_time(&self) -> f64 {
        self.time_s[0]
    }

    /// The pulse whose window contains the frame-relative time `t`, with the
    /// local time into that pulse. Pulses are searched latest-first, so
    /// overlapping windows resolve to the most recent pulse.
    pub(crate) fn pulse_containing(&self, t: f64) -> Option<(usize, f64)> {
        let k = self
            .pulse_start_time_s
            .partition_point(|&start| start + self.time_s[0] <= t);
        if k == 0 {
            return None;
        }
        let pulse = k - 1;
        let tau = t - self.pulse_start_time_s[pulse];
        self.in_window(tau).then_some((pulse, tau))
    }

    /// Carrier frequency of a pulse: the first grid frequency plus the pulse's
    /// offset \[Hz\].
    pub(crate) fn carrier(&self, pulse: usize) -> f64 {
        self.freq_hz[0] + self.freq_offset_hz[pulse]
    }

    /// Whether a local time lies inside the pulse window.
    pub(crate) fn in_window(&self, tau: f64) -> bool {
        tau >= self.time_s[0] && tau <= self.time_s[self.time_s.len() - 1]
    }

    /// Instantaneous phase of pulse `p` at local time τ \[rad\]. τ is clamped
    /// to the grid; callers gate amplitudes to the window separately.
    pub(crate) fn phase(&self, pulse: usize, tau: f64) -> f64 {
        let tau = tau.clamp(self.time_s[0], self.time_s[self.time_s.len() - 1]);
        let (k, frac) = self.locate(tau);
        let dt = (self.time_s[k + 1] - self.time_s[k]) * frac;
        let f_tau = self.freq_hz[k] + (self.freq_hz[k + 1] - self.freq_hz[k]) * frac;
        let cycles = self.cum_cycles[k] + 0.5 * (self.freq_hz[k] + f_tau) * dt;
        TAU * (cycles + self.freq_offset_hz[pulse] * (tau - self.time_s[0]))
    }

    /// The grid segment containing τ and the fractional position within it.
    fn locate(&self, tau: f64) -> (usize, f64) {
        let k = self
            .time_s
            .partition_point(|&t| t <= tau)
            .saturating_sub(1)
            .min(self.time_s.len() - 2);
        let span = self.time_s[k + 1] - self.time_s[k];
        let frac = ((tau - self.time_s[k]) / span).clamp(0.0, 1.0);
        (k, frac)
    }
}

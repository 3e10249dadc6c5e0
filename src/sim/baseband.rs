// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The coherent baseband synthesizer.
//!
//! For every (channel, pulse, sample) tuple, the synthesizer sums the complex
//! contribution of every point scatterer and every ray-tracer contribution
//! under the instantaneous waveform and platform state. The mixing convention
//! is reference times conjugated echo, so the baseband phase of a scatterer at
//! delay Δt is Φ(τ) − Φ(τ − Δt); a closing target therefore lands at a
//! negative Doppler frequency.
//!
//! Parallelism is over the flattened (channel, pulse) axis; each worker owns
//! its fast-time row, which fixes the floating-point reduction order and makes
//! runs bit-for-bit reproducible.

use ndarray::{Array3, Axis, Zip};
use num_complex::Complex64;

use crate::constants::{PI, VEL_C};
use crate::math::{cexp, unit_to_azel};
use crate::radar::{BasebandType, ChannelLayout, Radar};
use crate::sbr::Contribution;
use crate::sim::FidelityLevel;
use crate::target::PointTarget;

/// Ranges below this value are degenerate (a scatterer inside an antenna) and
/// contribute nothing \[m\].
const MIN_RANGE: f64 = 1e-6;

/// The ray-tracer output pinned to one snapshot.
pub(crate) struct SnapshotResult {
    pub time: f64,
    pub contributions: Vec<Contribution>,
}

/// All snapshots of a run, indexed by (frame, tx, pulse, sample) according to
/// the fidelity level.
pub(crate) struct SnapshotSet {
    pub level: FidelityLevel,
    pub samples_per_pulse: usize,
    /// Indexed \[frame\]\[tx\]\[snapshot\].
    pub table: Vec<Vec<Vec<SnapshotResult>>>,
}

impl SnapshotSet {
    pub(crate) fn get(&self, frame: usize, tx: usize, pulse: usize, sample: usize) -> &SnapshotResult {
        let index = match self.level {
            FidelityLevel::Frame => 0,
            FidelityLevel::Pulse => pulse,
            FidelityLevel::Sample => pulse * self.samples_per_pulse + sample,
        };
        &self.table[frame][tx][index]
    }
}

pub(crate) struct SynthInputs<'a> {
    pub radar: &'a Radar,
    pub layout: ChannelLayout,
    pub ts: &'a Array3<f64>,
    pub points: &'a [&'a PointTarget],
    pub snapshots: &'a SnapshotSet,
}

/// Fill the baseband tensor. `bb` must have the timestamp tensor's shape and
/// is written exactly once per element.
pub(crate) fn synthesize(inputs: &SynthInputs, bb: &mut Array3<Complex64>) {
    let radar = inputs.radar;
    let wf = &radar.waveform;
    let fs = radar.rx.fs;
    let chain = radar.rx.chain_amplitude();
    let sqrt_tx_power = radar.tx_power_w.sqrt();
    // (4π)^(3/2) of the radar equation, in amplitude.
    let spreading = (4.0 * PI).powf(1.5);

    Zip::indexed(bb.lanes_mut(Axis(2))).par_for_each(|(ch, pulse), mut lane| {
        let (frame, tx_i, rx_i) = inputs.layout.decompose(ch);
        let tx = &radar.tx[tx_i];
        let rx = &radar.rx.channels[rx_i];
        let lambda = VEL_C / wf.carrier(pulse);

        for s in 0..lane.len() {
            let idx = (ch, pulse, s);
            let t = inputs.ts[[ch, pulse, s]];
            let tau = wf.start_time() + s as f64 / fs;
            // Past the pulse window the mixing reference is off.
            if !wf.in_window(tau) {
                continue;
            }
            let pose = radar.platform_pose(idx, t);
            let tx_pos = pose.antenna_position(tx.location);
            let rx_pos = pose.antenna_position(rx.location);
            let rx_pol_world = rx.polarization.rotate(pose.rotation);

            let mut acc = Complex64::new(0.0, 0.0);

            for pt in inputs.points {
                let target_pos = pt.kinematic().position(idx, t);
                let to_target = target_pos - tx_pos;
                let r_tx = to_target.length();
                let from_target = rx_pos - target_pos;
                let r_rx = from_target.length();
                if r_tx < MIN_RANGE || r_rx < MIN_RANGE {
                    continue;
                }
                let delay = (r_tx + r_rx) / VEL_C;
                let tau_tx = tau - delay;
                if !wf.in_window(tau_tx) {
                    continue;
                }
                let (az_t, el_t) = unit_to_azel(pose.dir_to_body(to_target / r_tx));
                let g_tx = tx.gain_amplitude(az_t, el_t);
                let (az_r, el_r) = unit_to_azel(pose.dir_to_body(-from_target / r_rx));
                let g_rx = rx.gain_amplitude(az_r, el_r);
                if g_tx == 0.0 || g_rx == 0.0 {
                    continue;
                }
                let sigma = pt.rcs().at(idx);
                let amplitude = sqrt_tx_power * g_tx * g_rx * lambda * sigma.sqrt() * chain
                    / (spreading * r_tx * r_rx);
                let phase = wf.phase(pulse, tau) - wf.phase(pulse, tau_tx) + pt.phase().at(idx);
                let mods = tx.pulse_weight(pulse) * tx.waveform_weight(tau_tx);
                acc += mods * cexp(phase) * amplitude;
            }

            let snapshot = inputs.snapshots.get(frame, tx_i, pulse, s);
            let dt_snap = t - snapshot.time;
            for c in &snapshot.contributions {
                let point = c.point + c.velocity * dt_snap;
                let path_tx = c.path + c.rate * dt_snap;
                if path_tx < MIN_RANGE {
                    continue;
                }
                let from_point = rx_pos - point;
                let r_rx = from_point.length();
                if r_rx < MIN_RANGE {
                    continue;
                }
                let delay = (path_tx + r_rx) / VEL_C;
                let tau_tx = tau - delay;
                if !wf.in_window(tau_tx) {
                    continue;
                }
                let (az_t, el_t) = unit_to_azel(pose.dir_to_body(c.launch_dir));
                let g_tx = tx.gain_amplitude(az_t, el_t);
                let (az_r, el_r) = unit_to_azel(pose.dir_to_body(-from_point / r_rx));
                let g_rx = rx.gain_amplitude(az_r, el_r);
                if g_tx == 0.0 || g_rx == 0.0 {
                    continue;
                }
                // √σ of the contribution, complex: √(4π)/λ · footprint · pm.
                let sqrt_rcs = c.pol.dot(rx_pol_world) * ((4.0 * PI).sqrt() / lambda * c.footprint);
                let amplitude = sqrt_tx_power * g_tx * g_rx * lambda * chain
                    / (spreading * path_tx * r_rx);
                let phase = wf.phase(pulse, tau) - wf.phase(pulse, tau_tx);
                let mods = tx.pulse_weight(pulse) * tx.waveform_weight(tau_tx);
                acc += sqrt_rcs * mods * cexp(phase) * amplitude;
            }

            if let Some(pn) = &radar.phase_noise {
                acc *= pn[[ch, pulse, s]];
            }
            lane[s] = match radar.rx.bb_type {
                BasebandType::Complex => acc,
                BasebandType::Real => Complex64::new(2.0 * acc.re, 0.0),
            };
        }
    });
}

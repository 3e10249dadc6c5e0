// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Radar-to-radar interference.
//!
//! The interfering radar's transmitter is treated as a direct-path emitter
//! into the victim's receiver; there is no scene reflection. The victim mixes
//! what it receives against its own reference, so chirps that cross in
//! frequency produce the characteristic sweeping beat. The interferer's pulse
//! start times are on the shared simulation clock, with its first frame at
//! t = 0.

use ndarray::{Array3, Axis, Zip};
use num_complex::Complex64;

use crate::constants::{PI, VEL_C};
use crate::error::EchosimError;
use crate::math::{cexp, unit_to_azel};
use crate::radar::{BasebandType, ChannelLayout, ConfigError, Radar};

const MIN_RANGE: f64 = 1e-6;

pub(crate) fn simulate(
    victim: &Radar,
    interf: &Radar,
    ts: &Array3<f64>,
    layout: ChannelLayout,
) -> Result<Array3<Complex64>, EchosimError> {
    if interf.kinematic.table_shape().is_some() || interf.attitude.table_shape().is_some() {
        return Err(ConfigError::InterfererMotionSampled.into());
    }

    let wf_v = &victim.waveform;
    let fs = victim.rx.fs;
    let chain = victim.rx.chain_amplitude();
    let sqrt_tx_power = interf.tx_power_w.sqrt();

    let mut out = Array3::from_elem(ts.raw_dim(), Complex64::new(0.0, 0.0));
    Zip::indexed(out.lanes_mut(Axis(2))).par_for_each(|(ch, pulse), mut lane| {
        let (_, _, rx_i) = layout.decompose(ch);
        let rx = &victim.rx.channels[rx_i];

        for s in 0..lane.len() {
            let idx = (ch, pulse, s);
            let t = ts[[ch, pulse, s]];
            let tau_v = wf_v.start_time() + s as f64 / fs;
            // Past the pulse window the victim's mixing reference is off.
            if !wf_v.in_window(tau_v) {
                continue;
            }
            let pose_v = victim.platform_pose(idx, t);
            let rx_pos = pose_v.antenna_position(rx.location);
            // The interferer's motion is uniform, so any index works.
            let pose_i = interf.platform_pose((0, 0, 0), t);

            let mut acc = Complex64::new(0.0, 0.0);
            for tx in interf.tx_channels().iter() {
                let tx_pos = pose_i.antenna_position(tx.location);
                let leg = rx_pos - tx_pos;
                let range = leg.length();
                if range < MIN_RANGE {
                    continue;
                }
                let delay = range / VEL_C;
                let emission = t - delay - tx.delay_s;
                let (p_i, tau_i) = match interf.waveform.pulse_containing(emission) {
                    Some(hit) => hit,
                    None => continue,
                };
                let (az_t, el_t) = unit_to_azel(pose_i.dir_to_body(leg / range));
                let g_tx = tx.gain_amplitude(az_t, el_t);
                let (az_r, el_r) = unit_to_azel(pose_v.dir_to_body(-leg / range));
                let g_rx = rx.gain_amplitude(az_r, el_r);
                if g_tx == 0.0 || g_rx == 0.0 {
                    continue;
                }
                let lambda = VEL_C / interf.waveform.carrier(p_i);
                // One-way link budget.
                let amplitude =
                    sqrt_tx_power * g_tx * g_rx * lambda * chain / (4.0 * PI * range);
                let phase = wf_v.phase(pulse, tau_v) - interf.waveform.phase(p_i, tau_i);
                let mods = tx.pulse_weight(p_i) * tx.waveform_weight(tau_i);
                acc += mods * cexp(phase) * amplitude;
            }
            lane[s] = match victim.rx.bb_type {
                BasebandType::Complex => acc,
                BasebandType::Real => Complex64::new(2.0 * acc.re, 0.0),
            };
        }
    });

    if !out.iter().all(|v| v.is_finite()) {
        return Err(EchosimError::Numeric {
            stage: "interference synthesis",
        });
    }
    Ok(out)
}

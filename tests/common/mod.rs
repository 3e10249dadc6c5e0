// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Shared builders for the integration tests: a 77 GHz FMCW radar and a few
//! canonical meshes, plus a small DFT (no FFT crate needed at test scale).

// Not every test binary uses every helper.
#![allow(dead_code)]

use num_complex::Complex64;

use echosim::{
    ChannelConfig, LengthUnit, MeshTargetConfig, PlatformConfig, Radar, RadarConfig,
    ReceiverConfig, Permittivity, TransmitterConfig,
};

/// A single-channel 77 GHz FMCW radar: 500 MHz over 50 µs, 64 pulses at
/// 100 µs, fs = 20 MHz, 128 samples, unity gain chain.
pub fn fmcw_77ghz() -> RadarConfig {
    RadarConfig {
        transmitter: TransmitterConfig {
            tx_power: 30.0, // 1 W
            f: vec![77.0e9, 77.5e9],
            t: vec![0.0, 50e-6],
            f_offset: vec![],
            pulse_start_time: (0..64).map(|p| p as f64 * 100e-6).collect(),
            pulses: Some(64),
            density: 1.0,
            channels: vec![ChannelConfig::default()],
        },
        receiver: ReceiverConfig {
            fs: 20e6,
            rf_gain: 0.0,
            load_resistor: 1.0,
            baseband_gain: 0.0,
            baseband_bw: 20e6,
            noise_figure: 0.0,
            bb_type: Default::default(),
            samples: Some(128),
            channels: vec![ChannelConfig::default()],
        },
        motion: PlatformConfig::default(),
    }
}

pub fn radar(config: &RadarConfig) -> Radar {
    Radar::new(config).expect("radar config must validate")
}

/// A square PEC plate in the yz plane at `x`, `side` metres across, wound so
/// the normal faces −x (toward a sensor at the origin).
pub fn plate_config(x: f64, side: f64) -> MeshTargetConfig {
    let h = side / 2.0;
    MeshTargetConfig {
        vertices: vec![[x, -h, -h], [x, h, -h], [x, h, h], [x, -h, h]],
        triangles: vec![[0, 2, 1], [0, 3, 2]],
        origin: [0.0; 3],
        location: [0.0; 3],
        speed: [0.0; 3],
        rotation: [0.0; 3],
        rotation_rate: [0.0; 3],
        unit: LengthUnit::M,
        permittivity: Permittivity::Pec,
        permeability: Complex64::new(1.0, 0.0),
        skip_diffusion: false,
    }
}

/// A closed cube of side `side` centred at `centre`, faces wound outward.
pub fn cube_config(centre: [f64; 3], side: f64) -> MeshTargetConfig {
    let h = side / 2.0;
    let [cx, cy, cz] = centre;
    let vertices: Vec<[f64; 3]> = [
        [-h, -h, -h],
        [h, -h, -h],
        [h, h, -h],
        [-h, h, -h],
        [-h, -h, h],
        [h, -h, h],
        [h, h, h],
        [-h, h, h],
    ]
    .iter()
    .map(|v| [v[0] + cx, v[1] + cy, v[2] + cz])
    .collect();
    MeshTargetConfig {
        vertices,
        triangles: vec![
            [0, 2, 1],
            [0, 3, 2],
            [4, 5, 6],
            [4, 6, 7],
            [0, 1, 5],
            [0, 5, 4],
            [2, 3, 7],
            [2, 7, 6],
            [1, 2, 6],
            [1, 6, 5],
            [3, 0, 4],
            [3, 4, 7],
        ],
        origin: [0.0; 3],
        location: [0.0; 3],
        speed: [0.0; 3],
        rotation: [0.0; 3],
        rotation_rate: [0.0; 3],
        unit: LengthUnit::M,
        permittivity: Permittivity::Pec,
        permeability: Complex64::new(1.0, 0.0),
        skip_diffusion: false,
    }
}

/// Magnitude spectrum by direct DFT. O(N²), fine at test sizes.
pub fn spectrum(samples: &[Complex64]) -> Vec<f64> {
    let n = samples.len();
    (0..n)
        .map(|k| {
            samples
                .iter()
                .enumerate()
                .map(|(i, v)| {
                    let arg = -2.0 * std::f64::consts::PI * (k * i) as f64 / n as f64;
                    v * Complex64::new(arg.cos(), arg.sin())
                })
                .sum::<Complex64>()
                .norm()
        })
        .collect()
}

/// Hann-windowed DFT amplitude at an arbitrary normalized frequency
/// (cycles per sample). Kills the scalloping and leakage a bin-locked DFT
/// suffers from, so amplitude comparisons are meaningful.
pub fn windowed_amplitude(samples: &[Complex64], freq_norm: f64) -> f64 {
    let n = samples.len();
    samples
        .iter()
        .enumerate()
        .map(|(s, v)| {
            let w = (std::f64::consts::PI * s as f64 / (n - 1) as f64).sin().powi(2);
            let arg = -2.0 * std::f64::consts::PI * freq_norm * s as f64;
            v * Complex64::new(arg.cos(), arg.sin()) * w
        })
        .sum::<Complex64>()
        .norm()
}

pub fn peak_bin(spectrum: &[f64]) -> usize {
    spectrum
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
        .map(|(i, _)| i)
        .unwrap()
}

/// Convert a DFT bin of an N-point spectrum at sample rate `fs` to a signed
/// frequency.
pub fn signed_freq(bin: usize, n: usize, fs: f64) -> f64 {
    let k = if bin > n / 2 {
        bin as f64 - n as f64
    } else {
        bin as f64
    };
    k * fs / n as f64
}

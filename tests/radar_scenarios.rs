// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! End-to-end radar simulations against closed-form expectations.

mod common;

use approx::{assert_abs_diff_eq, assert_relative_eq};
use num_complex::Complex64;

use common::{fmcw_77ghz, peak_bin, plate_config, radar, signed_freq, spectrum};
use echosim::{
    sim_radar, BasebandType, EchosimError, FidelityLevel, MeshTarget, PointTarget,
    PointTargetConfig, SimOptions, Target, Tier,
};

const VEL_C: f64 = 299792458.0;

fn point_target(location: [f64; 3], speed: [f64; 3], rcs: f64) -> Target {
    Target::Point(
        PointTarget::new(&PointTargetConfig {
            location,
            speed,
            rcs,
            phase: 0.0,
        })
        .unwrap(),
    )
}

/// The fast-time DFT bin a target at `range` lands in, for the common test
/// radar (beat frequency K·Δt over fs, N samples).
fn range_bin(range: f64, slope: f64, fs: f64, n: usize) -> f64 {
    let delay = 2.0 * range / VEL_C;
    slope * delay * n as f64 / fs
}

#[test]
fn single_point_target_range_and_doppler() {
    let radar = radar(&fmcw_77ghz());
    let targets = [point_target([100.0, 0.0, 0.0], [0.0; 3], 10.0)];
    let out = sim_radar(&radar, &targets, &[0.0], &SimOptions::default(), None).unwrap();

    assert_eq!(out.baseband.dim(), (1, 64, 128));
    assert!(out.baseband.iter().all(|v| v.is_finite()));

    // Range: the beat peak must land within one bin of the 100 m prediction.
    let row: Vec<Complex64> = out.baseband.slice(ndarray::s![0, 0, ..]).to_vec();
    let mag = spectrum(&row);
    let peak = peak_bin(&mag[..64]) as f64;
    let expected = range_bin(100.0, 500e6 / 50e-6, 20e6, 128);
    assert!(
        (peak - expected).abs() <= 1.0,
        "range peak at bin {peak}, expected {expected:.2}"
    );

    // Doppler: a static target stays in slow-time bin 0.
    let slow: Vec<Complex64> = (0..64).map(|p| out.baseband[[0, p, 64]]).collect();
    let doppler = spectrum(&slow);
    assert_eq!(peak_bin(&doppler), 0);
}

#[test]
fn point_target_power_matches_the_radar_equation() {
    let radar = radar(&fmcw_77ghz());
    let sigma = 10.0;
    let range = 100.0;
    let targets = [point_target([range, 0.0, 0.0], [0.0; 3], sigma)];
    let out = sim_radar(&radar, &targets, &[0.0], &SimOptions::default(), None).unwrap();

    // P_tx = 1 W, G = 1, chain = 1: A = √(P·λ²σ/((4π)³R⁴)).
    let lambda = VEL_C / 77.0e9;
    let expected = (lambda * lambda * sigma
        / ((4.0 * std::f64::consts::PI).powi(3) * range.powi(4)))
    .sqrt();
    // Sample 64 is well inside the echo window.
    let got = out.baseband[[0, 0, 64]].norm();
    let error_db = (20.0 * (got / expected).log10()).abs();
    assert!(
        error_db < 0.5,
        "per-sample amplitude {got:.3e} vs closed form {expected:.3e}"
    );
    // Samples before the two-way delay hold nothing.
    assert_abs_diff_eq!(out.baseband[[0, 0, 0]].norm(), 0.0);
}

#[test]
fn two_point_targets_power_ratio() {
    let radar = radar(&fmcw_77ghz());
    let targets = [
        point_target([50.0, 0.0, 0.0], [0.0; 3], 1.0),
        point_target([80.0, 0.0, 0.0], [0.0; 3], 10.0),
    ];
    let out = sim_radar(&radar, &targets, &[0.0], &SimOptions::default(), None).unwrap();

    let row: Vec<Complex64> = out.baseband.slice(ndarray::s![0, 0, ..]).to_vec();
    let mag = spectrum(&row);
    let slope = 500e6 / 50e-6;
    let bin_50 = range_bin(50.0, slope, 20e6, 128);
    let bin_80 = range_bin(80.0, slope, 20e6, 128);
    assert!(mag[bin_50.round() as usize] > 0.0 && mag[bin_80.round() as usize] > 0.0);

    // Evaluate each beat line at its exact frequency with a Hann window, then
    // compensate the R⁴ spreading: what remains is the 10 dB RCS ratio.
    let p50 = common::windowed_amplitude(&row, bin_50 / 128.0);
    let p80 = common::windowed_amplitude(&row, bin_80 / 128.0);
    let compensated_db =
        20.0 * (p80 / p50).log10() + 40.0 * (80.0_f64 / 50.0).log10();
    assert!(
        (compensated_db - 10.0).abs() < 0.5,
        "range-compensated ratio {compensated_db:.2} dB"
    );
}

#[test]
fn approaching_target_lands_at_negative_doppler() {
    // A faster PRF so −15.4 kHz is unambiguous: 20 µs chirps every 25 µs,
    // 150 MHz bandwidth.
    let mut config = fmcw_77ghz();
    config.transmitter.f = vec![77.0e9, 77.15e9];
    config.transmitter.t = vec![0.0, 20e-6];
    config.transmitter.pulse_start_time = (0..64).map(|p| p as f64 * 25e-6).collect();
    let radar = radar(&config);

    let targets = [point_target([100.0, 0.0, 0.0], [-30.0, 0.0, 0.0], 10.0)];
    let out = sim_radar(&radar, &targets, &[0.0], &SimOptions::default(), None).unwrap();

    let slow: Vec<Complex64> = (0..64).map(|p| out.baseband[[0, p, 64]]).collect();
    let doppler = spectrum(&slow);
    let prf = 1.0 / 25e-6;
    let bin = peak_bin(&doppler);
    let freq = signed_freq(bin, 64, prf);

    let expected = -2.0 * 30.0 * 77.0e9 / VEL_C; // −15.41 kHz
    let bin_width = prf / 64.0;
    assert!(
        (freq - expected).abs() <= bin_width,
        "Doppler peak at {freq:.0} Hz, expected {expected:.0} Hz"
    );
}

#[test]
fn mesh_target_echo_appears_at_its_range() {
    let radar = radar(&fmcw_77ghz());
    let plate = MeshTarget::new(&plate_config(20.0, 1.0)).unwrap();
    let targets = [Target::Mesh(plate)];
    let out = sim_radar(&radar, &targets, &[0.0], &SimOptions::default(), None).unwrap();

    let row: Vec<Complex64> = out.baseband.slice(ndarray::s![0, 0, ..]).to_vec();
    assert!(row.iter().any(|v| v.norm() > 0.0), "plate must echo");
    let mag = spectrum(&row);
    let peak = peak_bin(&mag[..64]) as f64;
    let expected = range_bin(20.0, 500e6 / 50e-6, 20e6, 128);
    assert!(
        (peak - expected).abs() <= 1.0,
        "mesh peak at bin {peak}, expected {expected:.2}"
    );
}

#[test]
fn fidelity_levels_agree_for_a_static_scene() {
    let radar = radar(&fmcw_77ghz());
    let targets = [Target::Mesh(MeshTarget::new(&plate_config(20.0, 1.0)).unwrap())];
    let frame = sim_radar(&radar, &targets, &[0.0], &SimOptions::default(), None).unwrap();
    let pulse = sim_radar(
        &radar,
        &targets,
        &[0.0],
        &SimOptions {
            level: FidelityLevel::Pulse,
            ..Default::default()
        },
        None,
    )
    .unwrap();
    // Nothing moves, so per-pulse snapshots must reproduce the per-frame run.
    for (a, b) in frame.baseband.iter().zip(pulse.baseband.iter()) {
        assert_relative_eq!(a.re, b.re, max_relative = 1e-9, epsilon = 1e-30);
        assert_relative_eq!(a.im, b.im, max_relative = 1e-9, epsilon = 1e-30);
    }
}

#[test]
fn runs_are_deterministic() {
    let radar = radar(&fmcw_77ghz());
    let targets = [
        point_target([70.0, 5.0, 0.0], [10.0, 0.0, 0.0], 3.0),
        Target::Mesh(MeshTarget::new(&plate_config(30.0, 0.5)).unwrap()),
    ];
    let a = sim_radar(&radar, &targets, &[0.0], &SimOptions::default(), None).unwrap();
    let b = sim_radar(&radar, &targets, &[0.0], &SimOptions::default(), None).unwrap();
    assert_eq!(a.baseband, b.baseband);
    assert_eq!(a.timestamp, b.timestamp);
}

#[test]
fn real_mode_doubles_the_real_part() {
    let mut config = fmcw_77ghz();
    let targets = [point_target([100.0, 0.0, 0.0], [0.0; 3], 10.0)];
    let complex_out = sim_radar(
        &radar(&config),
        &targets,
        &[0.0],
        &SimOptions::default(),
        None,
    )
    .unwrap();
    config.receiver.bb_type = BasebandType::Real;
    let real_out = sim_radar(
        &radar(&config),
        &targets,
        &[0.0],
        &SimOptions::default(),
        None,
    )
    .unwrap();
    for (c, r) in complex_out.baseband.iter().zip(real_out.baseband.iter()) {
        assert_abs_diff_eq!(r.im, 0.0);
        assert_relative_eq!(r.re, 2.0 * c.re, max_relative = 1e-12, epsilon = 1e-30);
    }
}

#[test]
fn phase_noise_multiplies_the_baseband() {
    let config = fmcw_77ghz();
    let clean = radar(&config);
    let targets = [point_target([100.0, 0.0, 0.0], [0.0; 3], 10.0)];
    let reference = sim_radar(&clean, &targets, &[0.0], &SimOptions::default(), None).unwrap();

    let rot = Complex64::from_polar(1.0, 0.7);
    let noisy = radar(&config)
        .with_phase_noise(ndarray::Array3::from_elem((1, 64, 128), rot));
    let out = sim_radar(&noisy, &targets, &[0.0], &SimOptions::default(), None).unwrap();
    for (a, b) in reference.baseband.iter().zip(out.baseband.iter()) {
        let rotated = a * rot;
        assert_relative_eq!(b.re, rotated.re, max_relative = 1e-12, epsilon = 1e-30);
        assert_relative_eq!(b.im, rotated.im, max_relative = 1e-12, epsilon = 1e-30);
    }
}

#[test]
fn noise_sigma_reports_the_receiver_budget() {
    let mut config = fmcw_77ghz();
    config.receiver.rf_gain = 20.0;
    config.receiver.baseband_gain = 30.0;
    config.receiver.noise_figure = 10.0;
    config.receiver.load_resistor = 500.0;
    let out = sim_radar(
        &radar(&config),
        &[],
        &[0.0],
        &SimOptions::default(),
        None,
    )
    .unwrap();
    let p: f64 = 1.380649e-23 * 290.0 * 20e6 * 10.0 * 100.0;
    let expected = (p * 500.0).sqrt() * 10_f64.powf(1.5);
    assert_relative_eq!(out.noise_sigma, expected, max_relative = 1e-12);
}

#[test]
fn free_tier_caps_are_enforced() {
    let mut config = fmcw_77ghz();
    config.transmitter.channels.push(Default::default());
    let two_tx = radar(&config);
    let opts = SimOptions {
        tier: Tier::Free,
        ..Default::default()
    };
    let err = sim_radar(&two_tx, &[], &[0.0], &opts, None).unwrap_err();
    assert!(matches!(err, EchosimError::Tier(_)), "got {err:?}");

    let three_targets = [
        point_target([10.0, 0.0, 0.0], [0.0; 3], 1.0),
        point_target([20.0, 0.0, 0.0], [0.0; 3], 1.0),
        point_target([30.0, 0.0, 0.0], [0.0; 3], 1.0),
    ];
    let err = sim_radar(&radar(&fmcw_77ghz()), &three_targets, &[0.0], &opts, None).unwrap_err();
    assert!(matches!(err, EchosimError::Tier(_)), "got {err:?}");
}

#[test]
fn interference_couples_into_the_victim() {
    let victim = radar(&fmcw_77ghz());
    // The interferer chirps over a slightly shifted band, 10 m away.
    let mut other = fmcw_77ghz();
    other.motion.location = [10.0, 0.0, 0.0];
    let interferer = radar(&other);

    let out = sim_radar(
        &victim,
        &[],
        &[0.0],
        &SimOptions::default(),
        Some(&interferer),
    )
    .unwrap();
    let interference = out.interference.expect("tensor must be present");
    assert_eq!(interference.dim(), out.baseband.dim());
    assert!(interference.iter().any(|v| v.norm() > 0.0));
    // The direct path does not touch the scene output.
    assert!(out.baseband.iter().all(|v| v.norm() == 0.0));
}

#[test]
fn ray_log_records_every_primary_ray() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rays.ndjson");
    let radar = radar(&fmcw_77ghz());
    let targets = [Target::Mesh(MeshTarget::new(&plate_config(20.0, 1.0)).unwrap())];
    let opts = SimOptions {
        log_path: Some(path.clone()),
        ..Default::default()
    };
    sim_radar(&radar, &targets, &[0.0], &opts, None).unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    let mut lines = 0;
    for line in contents.lines() {
        let v: serde_json::Value = serde_json::from_str(line).unwrap();
        assert!(v.get("reflections").is_some());
        assert!(v.get("origin").is_some());
        lines += 1;
    }
    assert!(lines > 0, "the log must contain one record per ray");
}

#[test]
fn sampled_motion_shape_mismatch_is_rejected() {
    let bad = radar(&fmcw_77ghz()).with_sampled_motion(
        ndarray::Array3::from_elem((1, 2, 3), glam::DVec3::ZERO),
        glam::DVec3::ZERO,
        ndarray::Array3::from_elem((1, 2, 3), echosim::EulerZyx::default()),
        echosim::EulerZyx::default(),
    );
    let err = sim_radar(&bad, &[], &[0.0], &SimOptions::default(), None).unwrap_err();
    assert!(matches!(err, EchosimError::InvalidConfig(_)), "got {err:?}");
}
